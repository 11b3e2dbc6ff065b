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

use crate::item::{Item, Support};
use crate::item_counter::ItemCounter;
use itertools::Itertools;
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

/// A weighted transaction: sorted, duplicate free items.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transaction {
    items: Vec<Item>,
    weight: Support,
}

impl Transaction {
    pub fn new(mut items: Vec<Item>, weight: Support) -> Transaction {
        items.sort_unstable();
        items.dedup();
        Transaction { items, weight }
    }
    pub fn items(&self) -> &[Item] {
        &self.items
    }
    pub fn weight(&self) -> Support {
        self.weight
    }
}

/// The transaction multiset mined by the search. Transaction ids are
/// positions in insertion order.
#[derive(Clone, Debug, Default)]
pub struct TransactionDb {
    transactions: Vec<Transaction>,
    // Number of transactions containing each item, indexed by item id.
    occurrences: Vec<usize>,
    total_weight: Support,
}

impl TransactionDb {
    pub fn new() -> TransactionDb {
        TransactionDb::default()
    }

    pub fn with_item_count(item_count: usize) -> TransactionDb {
        TransactionDb {
            transactions: vec![],
            occurrences: vec![0; item_count],
            total_weight: 0,
        }
    }

    /// Adds a transaction. The total weight must stay within `Support`;
    /// `TransactionReader` rejects input for which it would not.
    pub fn add(&mut self, items: Vec<Item>, weight: Support) {
        self.push(Transaction::new(items, weight));
    }

    fn push(&mut self, transaction: Transaction) {
        for item in transaction.items() {
            let index = item.as_index();
            if index >= self.occurrences.len() {
                self.occurrences.resize(index + 1, 0);
            }
            self.occurrences[index] += 1;
        }
        self.total_weight += transaction.weight();
        self.transactions.push(transaction);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn total_weight(&self) -> Support {
        self.total_weight
    }

    pub fn item_count(&self) -> usize {
        self.occurrences.len()
    }

    pub fn occurrences(&self, item: Item) -> usize {
        self.occurrences.get(item.as_index()).cloned().unwrap_or(0)
    }

    /// Total number of item instances over all transactions.
    pub fn extent(&self) -> usize {
        self.occurrences.iter().sum()
    }

    pub fn transaction(&self, tid: usize) -> &Transaction {
        &self.transactions[tid]
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn item_supports(&self) -> ItemCounter {
        let mut counter = ItemCounter::with_items(self.item_count());
        for transaction in &self.transactions {
            for item in transaction.items() {
                counter.add(item, transaction.weight());
            }
        }
        counter
    }

    /// Drops items with support below `min_support`, recodes the remaining
    /// items densely in ascending order of support, and merges identical
    /// transactions by summing their weights. Empty transactions are kept
    /// so the total weight is unchanged. Returns the recoded database and,
    /// for each recoded item, the item it was recoded from.
    pub fn recode(&self, min_support: Support) -> (TransactionDb, Vec<Item>) {
        let timer = Instant::now();
        let counter = self.item_supports();
        let mut frequent = counter.items_with_count_at_least(min_support.max(1));
        counter.sort_ascending(&mut frequent);

        let mut map: Vec<Option<Item>> = vec![None; self.item_count()];
        for (new_id, item) in frequent.iter().enumerate() {
            map[item.as_index()] = Some(Item::with_id(new_id as u32));
        }

        let mut transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .map(|t| {
                let items = t.items.iter().filter_map(|i| map[i.as_index()]).collect();
                Transaction::new(items, t.weight)
            })
            .collect();
        transactions.par_sort_unstable();

        let mut recoded = TransactionDb::with_item_count(frequent.len());
        transactions
            .into_iter()
            .coalesce(|a, b| {
                // Merged weights are bounded by the total weight.
                if a.items == b.items {
                    Ok(Transaction {
                        items: a.items,
                        weight: a.weight + b.weight,
                    })
                } else {
                    Err((a, b))
                }
            })
            .for_each(|t| recoded.push(t));

        info!(
            items = recoded.item_count(),
            transactions = recoded.len(),
            weight = recoded.total_weight(),
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "filtered, recoded and reduced transactions"
        );
        (recoded, frequent)
    }
}

impl FromIterator<(Vec<Item>, Support)> for TransactionDb {
    fn from_iter<I: IntoIterator<Item = (Vec<Item>, Support)>>(iter: I) -> Self {
        let mut db = TransactionDb::new();
        for (items, weight) in iter {
            db.add(items, weight);
        }
        db
    }
}
