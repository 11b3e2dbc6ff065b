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

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Fatal failures of a mining run. Item sets reported before the failure
/// stand; nothing is rolled back.
#[derive(Error, Debug)]
pub enum MineError {
    /// A conditional database buffer could not be allocated.
    #[error("not enough memory for a conditional database: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// The item set reporter rejected an item set.
    #[error("item set reporter failed: {0}")]
    Reporter(#[from] ReportError),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("write error on item set output: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid item set size range [{min}, {max}]")]
    InvalidSize { min: usize, max: usize },

    #[error("invalid minimum support {0}")]
    InvalidSupport(f64),

    #[error("invalid significance level/p-value {0}")]
    InvalidSignificance(f64),

    #[error("maximum number of extensions must be at least 1")]
    InvalidExtensions,

    #[error("invalid target type '{0}'")]
    UnknownTarget(char),

    #[error("invalid test statistic '{0}'")]
    UnknownStatistic(char),

    #[error("invalid support border entry '{0}'")]
    InvalidBorder(String),
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("read error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid transaction weight '{field}' on line {line}")]
    InvalidWeight { line: usize, field: String },

    #[error("total transaction weight overflows on line {line}")]
    WeightOverflow { line: usize },
}
