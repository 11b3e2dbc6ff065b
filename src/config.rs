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

use crate::error::ConfigError;
use crate::item::Support;
use crate::report::ReportFilter;
use crate::significance::Statistic;
use std::iter;

/// Which of the frequent item sets are reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    All,
    Closed,
    Maximal,
}

impl Target {
    pub fn from_code(code: char) -> Result<Target, ConfigError> {
        match code {
            's' => Ok(Target::All),
            'c' => Ok(Target::Closed),
            'm' => Ok(Target::Maximal),
            _ => Err(ConfigError::UnknownTarget(code)),
        }
    }

    /// Decides whether a set with support `own` is reported, given the
    /// largest support `extended` seen among the sets found by extending it.
    pub fn qualifies(self, extended: Support, own: Support, min_support: Support) -> bool {
        match self {
            Target::All => true,
            Target::Maximal => extended < min_support,
            Target::Closed => extended < own,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MinSupport {
    Absolute(Support),
    /// Percentage of the total transaction weight.
    Percent(f64),
}

impl MinSupport {
    /// Positive values are percentages, negative values absolute counts.
    pub fn from_arg(value: f64) -> MinSupport {
        if value < 0.0 {
            MinSupport::Absolute((-value).ceil() as Support)
        } else {
            MinSupport::Percent(value)
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self, MinSupport::Absolute(_))
    }

    /// Absolute minimum support for a database of the given weight. Never
    /// below 1, so transactions that do not contain a set never support it.
    pub fn resolve(&self, total_weight: Support) -> Support {
        let support = match *self {
            MinSupport::Absolute(count) => count,
            MinSupport::Percent(percent) => {
                ((percent / 100.0) * total_weight as f64 * (1.0 - f64::EPSILON)).ceil() as Support
            }
        };
        support.max(1)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MinerConfig {
    pub target: Target,
    pub min_support: MinSupport,
    /// Largest support of a reported set; `None` means no limit.
    pub max_support: Option<MinSupport>,
    pub min_size: usize,
    pub max_size: Option<usize>,
    pub statistic: Statistic,
    /// Largest p-value of an extension that is still pursued.
    pub significance: f64,
    /// Score extensions whose joint support does not exceed the support
    /// expected under independence as not significant.
    pub invalidate_below_expectation: bool,
    /// Number of extensions tried per set beyond the single items;
    /// `None` means no limit.
    pub max_extensions: Option<usize>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        MinerConfig {
            target: Target::Maximal,
            min_support: MinSupport::Percent(1.0),
            max_support: None,
            min_size: 2,
            max_size: None,
            statistic: Statistic::ChiSquare,
            significance: 0.01,
            invalidate_below_expectation: false,
            max_extensions: Some(2),
        }
    }
}

impl MinerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(max) = self.max_size {
            if max < self.min_size {
                return Err(ConfigError::InvalidSize {
                    min: self.min_size,
                    max,
                });
            }
        }
        for support in iter::once(&self.min_support).chain(self.max_support.iter()) {
            if let MinSupport::Percent(percent) = *support {
                if !(0.0..=100.0).contains(&percent) {
                    return Err(ConfigError::InvalidSupport(percent));
                }
            }
        }
        if !(self.significance > 0.0 && self.significance <= 1.0) {
            return Err(ConfigError::InvalidSignificance(self.significance));
        }
        if self.max_extensions == Some(0) {
            return Err(ConfigError::InvalidExtensions);
        }
        Ok(())
    }

    /// Reporter filter matching this configuration.
    pub fn report_filter(&self, total_weight: Support) -> ReportFilter {
        ReportFilter {
            min_size: self.min_size,
            max_size: self.max_size,
            min_support: self.min_support.resolve(total_weight),
            max_support: self.max_support.map(|max| max.resolve(total_weight)),
            ..ReportFilter::default()
        }
    }
}
