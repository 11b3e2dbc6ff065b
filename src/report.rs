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

//! Item set reporters. The search pushes items onto a reporter's current
//! set, asks it to report the set and pops the items again; reporters
//! decide which of the reported sets pass their filters and where the
//! accepted sets go.

use crate::error::ReportError;
use crate::item::{Item, Support};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::io::Write;

pub trait Reporter {
    /// Extends the current set by `item`, giving the support of the
    /// extended set.
    fn push(&mut self, item: Item, support: Support) -> Result<(), ReportError>;

    /// Removes the `count` most recently pushed items.
    fn pop(&mut self, count: usize);

    /// Reports the current set with an associated p-value.
    fn report(&mut self, value: f64) -> Result<(), ReportError>;

    /// Number of items in the current set.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the current set may still grow by `n` items.
    fn can_accept_more(&self, n: usize) -> bool;
}

/// Size and support limits for reported sets. `border[i]` is an additional
/// minimum support for sets of size `min_size + i`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ReportFilter {
    pub min_size: usize,
    pub max_size: Option<usize>,
    pub min_support: Support,
    pub max_support: Option<Support>,
    pub border: Vec<Support>,
}

impl ReportFilter {
    pub fn with_border(mut self, border: Vec<Support>) -> ReportFilter {
        self.border = border;
        self
    }

    pub fn accepts(&self, size: usize, support: Support) -> bool {
        if size < self.min_size || self.max_size.map_or(false, |max| size > max) {
            return false;
        }
        if support < self.min_support || self.max_support.map_or(false, |max| support > max) {
            return false;
        }
        match self.border.get(size - self.min_size) {
            Some(&border) => support >= border,
            None => true,
        }
    }
}

/// The current item set as an explicit stack, shared by the reporters.
#[derive(Clone, Debug)]
pub struct ItemsetStack {
    items: Vec<Item>,
    supports: Vec<Support>,
    // Support of the empty set, i.e. the total transaction weight.
    base_support: Support,
    filter: ReportFilter,
    size_counts: Vec<usize>,
}

impl ItemsetStack {
    pub fn new(base_support: Support, filter: ReportFilter) -> ItemsetStack {
        ItemsetStack {
            items: vec![],
            supports: vec![],
            base_support,
            filter,
            size_counts: vec![],
        }
    }

    pub fn push(&mut self, item: Item, support: Support) {
        debug_assert!(support <= self.support());
        self.items.push(item);
        self.supports.push(support);
    }

    pub fn pop(&mut self, count: usize) {
        let len = self.items.len().saturating_sub(count);
        self.items.truncate(len);
        self.supports.truncate(len);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn support(&self) -> Support {
        self.supports.last().cloned().unwrap_or(self.base_support)
    }

    pub fn base_support(&self) -> Support {
        self.base_support
    }

    pub fn can_accept_more(&self, n: usize) -> bool {
        self.filter.max_size.map_or(true, |max| self.items.len() + n <= max)
    }

    pub fn accepts(&self) -> bool {
        self.filter.accepts(self.items.len(), self.support())
    }

    /// Counts the current set as reported.
    pub fn record(&mut self) {
        let size = self.items.len();
        if self.size_counts.len() <= size {
            self.size_counts.resize(size + 1, 0);
        }
        self.size_counts[size] += 1;
    }

    /// Number of reported sets per size.
    pub fn size_counts(&self) -> &[usize] {
        &self.size_counts
    }

    pub fn reported(&self) -> usize {
        self.size_counts.iter().sum()
    }
}

/// Number of reported sets per (size, support) signature.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatternSpectrum {
    counts: BTreeMap<(usize, Support), u64>,
}

impl PatternSpectrum {
    pub fn add(&mut self, size: usize, support: Support) {
        *self.counts.entry((size, support)).or_insert(0) += 1;
    }

    pub fn frequency(&self, size: usize, support: Support) -> u64 {
        self.counts.get(&(size, support)).cloned().unwrap_or(0)
    }

    pub fn signatures(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Support, u64)> + '_ {
        self.counts.iter().map(|(&(size, support), &count)| (size, support, count))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FoundItemset {
    /// Items in the order they were added.
    pub items: Vec<Item>,
    pub support: Support,
    pub value: f64,
}

/// Keeps accepted sets in memory.
pub struct ItemsetCollector {
    stack: ItemsetStack,
    found: Vec<FoundItemset>,
    spectrum: PatternSpectrum,
}

impl ItemsetCollector {
    pub fn new(base_support: Support, filter: ReportFilter) -> ItemsetCollector {
        ItemsetCollector {
            stack: ItemsetStack::new(base_support, filter),
            found: vec![],
            spectrum: PatternSpectrum::default(),
        }
    }

    pub fn found(&self) -> &[FoundItemset] {
        &self.found
    }

    /// The distinct reported sets, items sorted, with their supports. The
    /// search may reach the same set along different orders of its items.
    pub fn distinct(&self) -> BTreeMap<Vec<Item>, Support> {
        self.found
            .iter()
            .map(|f| (f.items.iter().cloned().sorted().collect(), f.support))
            .collect()
    }

    pub fn spectrum(&self) -> &PatternSpectrum {
        &self.spectrum
    }

    pub fn size_counts(&self) -> &[usize] {
        self.stack.size_counts()
    }
}

impl Reporter for ItemsetCollector {
    fn push(&mut self, item: Item, support: Support) -> Result<(), ReportError> {
        self.stack.push(item, support);
        Ok(())
    }

    fn pop(&mut self, count: usize) {
        self.stack.pop(count);
    }

    fn report(&mut self, value: f64) -> Result<(), ReportError> {
        if !self.stack.accepts() {
            return Ok(());
        }
        self.stack.record();
        let support = self.stack.support();
        self.spectrum.add(self.stack.len(), support);
        self.found.push(FoundItemset {
            items: self.stack.items().to_vec(),
            support,
            value,
        });
        Ok(())
    }

    fn len(&self) -> usize {
        self.stack.len()
    }

    fn can_accept_more(&self, n: usize) -> bool {
        self.stack.can_accept_more(n)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SupportFormat {
    Absolute,
    /// Percentage of the total transaction weight.
    Percent,
}

/// Writes accepted sets as text, one per line:
/// `item item ... (support,p-value%)`.
pub struct ItemsetWriter<W: Write> {
    stack: ItemsetStack,
    out: W,
    names: Vec<String>,
    separator: String,
    format: SupportFormat,
}

impl<W: Write> ItemsetWriter<W> {
    pub fn new(
        out: W,
        names: Vec<String>,
        base_support: Support,
        filter: ReportFilter,
        format: SupportFormat,
    ) -> ItemsetWriter<W> {
        ItemsetWriter {
            stack: ItemsetStack::new(base_support, filter),
            out,
            names,
            separator: String::from(" "),
            format,
        }
    }

    pub fn with_separator(mut self, separator: &str) -> ItemsetWriter<W> {
        self.separator = separator.to_owned();
        self
    }

    pub fn size_counts(&self) -> &[usize] {
        self.stack.size_counts()
    }

    pub fn reported(&self) -> usize {
        self.stack.reported()
    }

    pub fn flush(&mut self) -> Result<(), ReportError> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ItemsetWriter<W> {
    fn push(&mut self, item: Item, support: Support) -> Result<(), ReportError> {
        self.stack.push(item, support);
        Ok(())
    }

    fn pop(&mut self, count: usize) {
        self.stack.pop(count);
    }

    fn report(&mut self, value: f64) -> Result<(), ReportError> {
        if !self.stack.accepts() {
            return Ok(());
        }
        self.stack.record();
        let names = &self.names;
        let items = self
            .stack
            .items()
            .iter()
            .map(|item| names[item.as_index()].as_str())
            .join(&self.separator);
        let support = self.stack.support();
        match self.format {
            SupportFormat::Absolute => {
                writeln!(self.out, "{} ({},{:.4})", items, support, 100.0 * value)?
            }
            SupportFormat::Percent => {
                let base = self.stack.base_support().max(1) as f64;
                writeln!(
                    self.out,
                    "{} ({:.3},{:.4})",
                    items,
                    100.0 * support as f64 / base,
                    100.0 * value
                )?
            }
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.stack.len()
    }

    fn can_accept_more(&self, n: usize) -> bool {
        self.stack.can_accept_more(n)
    }
}
