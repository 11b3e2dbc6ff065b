// Copyright 2018 Chris Pearce
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::ReadError;
use crate::item::{Item, Support};
use crate::itemizer::Itemizer;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;

/// Reads one transaction per line. Items are separated by blanks, tabs or
/// commas; lines starting with `#` are comments. In weighted mode the last
/// field of each line is the integer transaction weight. Items are yielded
/// in input order; `TransactionDb` sorts and deduplicates them. The weights
/// read so far always sum to a valid `Support`.
pub struct TransactionReader<'a, R> {
    reader: R,
    itemizer: &'a mut Itemizer,
    weighted: bool,
    line_number: usize,
    total_weight: Support,
}

impl<'a> TransactionReader<'a, BufReader<File>> {
    pub fn open<P: AsRef<Path>>(
        path: P,
        itemizer: &'a mut Itemizer,
        weighted: bool,
    ) -> Result<TransactionReader<'a, BufReader<File>>, ReadError> {
        let file = File::open(path)?;
        Ok(TransactionReader::new(BufReader::new(file), itemizer, weighted))
    }
}

impl<'a, R: BufRead> TransactionReader<'a, R> {
    pub fn new(reader: R, itemizer: &'a mut Itemizer, weighted: bool) -> TransactionReader<'a, R> {
        TransactionReader {
            reader,
            itemizer,
            weighted,
            line_number: 0,
            total_weight: 0,
        }
    }

    fn parse(&mut self, line: &str) -> Result<(Vec<Item>, Support), ReadError> {
        let mut fields: Vec<&str> = line
            .split(|c: char| c == ',' || c == ' ' || c == '\t')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        let mut weight = 1;
        if self.weighted {
            if let Some(field) = fields.pop() {
                weight = field.parse::<Support>().map_err(|_| ReadError::InvalidWeight {
                    line: self.line_number,
                    field: field.to_owned(),
                })?;
            }
        }
        self.total_weight = self
            .total_weight
            .checked_add(weight)
            .ok_or(ReadError::WeightOverflow {
                line: self.line_number,
            })?;
        let items = fields.iter().map(|s| self.itemizer.id_of(s)).collect();
        Ok((items, weight))
    }
}

impl<'a, R: BufRead> Iterator for TransactionReader<'a, R> {
    type Item = Result<(Vec<Item>, Support), ReadError>;
    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        loop {
            line.clear();
            let len = match self.reader.read_line(&mut line) {
                Ok(len) => len,
                Err(err) => return Some(Err(err.into())),
            };
            if len == 0 {
                return None;
            }
            self.line_number += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(self.parse(trimmed));
        }
    }
}
