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

//! Accretion: depth-first search over transaction id lists in which every
//! extension of the current set is scored by a statistical test, and only
//! the most significant extensions are followed.
//!
//! Each recursion level holds the lists of all items that may still extend
//! the current set. For each candidate the other lists are projected onto
//! the candidate's transactions (by intersection when only one other list
//! remains, otherwise by marking the candidate's transactions once and
//! filtering every other list), rescored, and searched recursively.

use crate::config::{MinerConfig, Target};
use crate::error::{ConfigError, MineError, ReportError};
use crate::item::Support;
use crate::report::Reporter;
use crate::significance::{below_expectation, Statistic};
use crate::tidlist::{build_root, Frame, OccurrenceList, TransactionWeights};
use crate::transaction_db::TransactionDb;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Cooperative cancellation, checked on entry to every recursion level.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MineStatus {
    Completed,
    /// Stopped early on request; sets reported so far stand.
    Cancelled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MineOutcome {
    pub status: MineStatus,
    /// Number of report requests issued to the reporter.
    pub reported: usize,
    /// Absolute minimum support used for the run.
    pub min_support: Support,
}

// Ways a recursion can end early.
enum Stop {
    Cancelled,
    Failed(MineError),
}

impl From<MineError> for Stop {
    fn from(err: MineError) -> Stop {
        Stop::Failed(err)
    }
}

impl From<ReportError> for Stop {
    fn from(err: ReportError) -> Stop {
        Stop::Failed(err.into())
    }
}

/// Parameters that stay fixed for a whole run.
struct Params<'a> {
    target: Target,
    min_support: Support,
    significance: f64,
    invalidate_below_expectation: bool,
    max_extensions: Option<usize>,
    statistic: Statistic,
    total_weight: Support,
    // Support of each single item, indexed by item id.
    item_supports: &'a [Support],
}

impl<'a> Params<'a> {
    fn score(&self, joint: Support, prefix: Support, other: Support) -> f64 {
        if self.invalidate_below_expectation
            && below_expectation(joint, prefix, other, self.total_weight)
        {
            return 1.0;
        }
        self.statistic.evaluate(joint, prefix, other, self.total_weight)
    }

    // Keeps a freshly projected list if it is frequent, scoring it as an
    // extension of the set ending in `prefix`.
    fn admit(&self, child: &mut Frame, mut list: OccurrenceList, prefix: &OccurrenceList) {
        if list.support < self.min_support {
            child.discard(list);
            return;
        }
        let other = self.item_supports[list.item.as_index()];
        list.significance = self.score(list.support, prefix.support, other);
        child.commit(list);
    }
}

// Builds the conditional database for extending the current set by the
// `pivot`-th list of `frame`.
fn project(
    params: &Params,
    weights: &mut TransactionWeights,
    frame: &Frame,
    pivot: usize,
    child: &mut Frame,
) {
    child.clear();
    let lists = frame.lists();
    let prefix = lists[pivot];
    let prefix_tids = frame.tids(&prefix);
    if lists.len() <= 2 {
        for (j, other) in lists.iter().enumerate() {
            if j == pivot {
                continue;
            }
            let list = child.intersect_into(other.item, frame.tids(other), prefix_tids, weights);
            params.admit(child, list, &prefix);
        }
    } else {
        let marked = weights.mark(prefix_tids);
        for (j, other) in lists.iter().enumerate() {
            if j == pivot {
                continue;
            }
            let list = child.filter_into(other.item, frame.tids(other), &marked);
            params.admit(child, list, &prefix);
        }
    }
}

struct Search<'a, R: Reporter> {
    params: Params<'a>,
    weights: TransactionWeights,
    reporter: &'a mut R,
    cancel: &'a CancelToken,
    reported: usize,
}

impl<'a, R: Reporter> Search<'a, R> {
    // Searches the sets extending the reporter's current set by the items
    // of `frame`. Returns the largest support among the extensions
    // reported or found below them.
    fn recurse(&mut self, frame: &mut Frame) -> Result<Support, Stop> {
        if self.cancel.is_cancelled() {
            return Err(Stop::Cancelled);
        }
        let k = frame.len();
        debug_assert!(k > 0);
        let mut child = if k > 1 && self.reporter.can_accept_more(2) {
            Some(Frame::try_with_capacity(k - 1, frame.total_tids()).map_err(MineError::from)?)
        } else {
            None
        };
        frame.sort_by_significance();
        let branches = match self.params.max_extensions {
            Some(max) if !self.reporter.is_empty() => k.min(max),
            _ => k,
        };

        let mut max_support = 0;
        for i in 0..branches {
            let candidate = frame.lists()[i];
            // Later candidates are no more significant.
            if candidate.significance > self.params.significance {
                break;
            }
            self.reporter.push(candidate.item, candidate.support)?;
            let mut extended = 0;
            if let Some(child) = child.as_mut() {
                project(&self.params, &mut self.weights, frame, i, child);
                if !child.is_empty() {
                    extended = self.recurse(child)?;
                    max_support = max_support.max(extended);
                }
            }
            if self
                .params
                .target
                .qualifies(extended, candidate.support, self.params.min_support)
            {
                max_support = max_support.max(candidate.support);
                self.reporter.report(candidate.significance)?;
                self.reported += 1;
            }
            self.reporter.pop(1);
        }
        Ok(max_support)
    }
}

/// The accretion miner.
pub struct Accretion {
    config: MinerConfig,
}

impl Accretion {
    pub fn new(config: MinerConfig) -> Result<Accretion, ConfigError> {
        config.validate()?;
        Ok(Accretion { config })
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Reports the sets of `db` selected by the configuration to `reporter`.
    /// Item ids of `db` must be dense. The reporter's current set must be
    /// empty.
    pub fn mine<R: Reporter>(
        &self,
        db: &TransactionDb,
        reporter: &mut R,
        cancel: &CancelToken,
    ) -> Result<MineOutcome, MineError> {
        let timer = Instant::now();
        let total_weight = db.total_weight();
        let min_support = self.config.min_support.resolve(total_weight);
        debug!(
            target_type = ?self.config.target,
            min_support,
            statistic = ?self.config.statistic,
            significance = self.config.significance,
            max_extensions = ?self.config.max_extensions,
            "starting accretion"
        );

        let mut outcome = MineOutcome {
            status: MineStatus::Completed,
            reported: 0,
            min_support,
        };
        let mut extended = 0;
        if min_support <= total_weight {
            if db.item_count() == 0 {
                reporter.report(1.0)?;
                outcome.reported = 1;
                return Ok(outcome);
            }
            let (mut root, weights) = build_root(db)?;
            let item_supports: Vec<Support> = root.lists().iter().map(|l| l.support).collect();
            root.retain(|l| l.support >= min_support);
            let mut search = Search {
                params: Params {
                    target: self.config.target,
                    min_support,
                    significance: self.config.significance,
                    invalidate_below_expectation: self.config.invalidate_below_expectation,
                    max_extensions: self.config.max_extensions,
                    statistic: self.config.statistic,
                    total_weight,
                    item_supports: &item_supports,
                },
                weights,
                reporter: &mut *reporter,
                cancel,
                reported: 0,
            };
            if !root.is_empty() {
                let result = search.recurse(&mut root);
                outcome.reported = search.reported;
                match result {
                    Ok(support) => extended = support,
                    Err(Stop::Cancelled) => {
                        outcome.status = MineStatus::Cancelled;
                        info!(reported = outcome.reported, "accretion cancelled");
                        return Ok(outcome);
                    }
                    Err(Stop::Failed(err)) => return Err(err),
                }
            }
        }

        if self
            .config
            .target
            .qualifies(extended, total_weight, min_support)
        {
            reporter.report(1.0)?;
            outcome.reported += 1;
        }
        info!(
            reported = outcome.reported,
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "accretion finished"
        );
        Ok(outcome)
    }
}
