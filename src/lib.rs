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

//! Accretion mining of frequent, closed and maximal item sets.
//!
//! Extensions of an item set are only followed if a statistical test finds
//! the extended set significantly more frequent than its parts would be
//! under independence.

pub mod accretion;
pub mod config;
pub mod error;
pub mod item;
pub mod item_counter;
pub mod itemizer;
pub mod report;
pub mod significance;
pub mod tidlist;
pub mod transaction_db;
pub mod transaction_reader;

pub use crate::accretion::{Accretion, CancelToken, MineOutcome, MineStatus};
pub use crate::config::{MinSupport, MinerConfig, Target};
pub use crate::error::{ConfigError, MineError, ReadError, ReportError};
pub use crate::item::{Item, Support};
pub use crate::report::{ItemsetCollector, ItemsetWriter, ReportFilter, Reporter, SupportFormat};
pub use crate::significance::Statistic;
pub use crate::transaction_db::TransactionDb;
