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

//! Transaction id lists and the two operations that project them.
//!
//! Transaction ids within a list are strictly decreasing. A [`Frame`] holds
//! all lists of one recursion level in a single contiguous buffer.

use crate::item::{Item, Support};
use crate::transaction_db::TransactionDb;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::TryReserveError;

pub type Tid = u32;

/// Writes the ids common to `a` and `b` to the end of `dst` and returns the
/// sum of their weights.
pub fn intersect(dst: &mut Vec<Tid>, a: &[Tid], b: &[Tid], weights: &[Support]) -> Support {
    // Probe with the shorter list.
    let (probe, table) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut support = 0;
    let mut pp = 0;
    let mut tp = 0;
    while pp < probe.len() && tp < table.len() {
        if probe[pp] > table[tp] {
            pp += 1;
        } else if table[tp] > probe[pp] {
            tp += 1;
        } else {
            let tid = probe[pp];
            support += weights[tid as usize];
            dst.push(tid);
            pp += 1;
            tp += 1;
        }
    }
    support
}

/// Per-transaction weights plus the mark table used by [`MarkedTransactions`].
pub struct TransactionWeights {
    weights: Vec<Support>,
    marks: Vec<Support>,
}

impl TransactionWeights {
    pub fn new(weights: Vec<Support>) -> TransactionWeights {
        let marks = vec![0; weights.len()];
        TransactionWeights { weights, marks }
    }

    pub fn as_slice(&self) -> &[Support] {
        &self.weights
    }

    /// Marks the transactions of `pivot` with their weights. The marks are
    /// cleared again when the returned guard is dropped.
    pub fn mark<'a>(&'a mut self, pivot: &'a [Tid]) -> MarkedTransactions<'a> {
        for &tid in pivot {
            self.marks[tid as usize] = self.weights[tid as usize];
        }
        MarkedTransactions {
            marks: &mut self.marks,
            pivot,
        }
    }
}

pub struct MarkedTransactions<'a> {
    marks: &'a mut [Support],
    pivot: &'a [Tid],
}

impl<'a> MarkedTransactions<'a> {
    /// Writes the ids of `src` that belong to the pivot to the end of `dst`
    /// and returns the sum of their weights.
    pub fn filter(&self, dst: &mut Vec<Tid>, src: &[Tid]) -> Support {
        let mut support = 0;
        for &tid in src {
            let mark = self.marks[tid as usize];
            if mark > 0 {
                support += mark;
                dst.push(tid);
            }
        }
        support
    }
}

impl<'a> Drop for MarkedTransactions<'a> {
    fn drop(&mut self) {
        for &tid in self.pivot {
            self.marks[tid as usize] = 0;
        }
    }
}

/// Header of an occurrence list: the item it extends the current set with,
/// the weighted support, the p-value of the extension and the location of
/// its transaction ids in the owning frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OccurrenceList {
    pub item: Item,
    pub support: Support,
    pub significance: f64,
    start: usize,
    len: usize,
}

/// The conditional database of one recursion level.
#[derive(Debug, Default)]
pub struct Frame {
    lists: Vec<OccurrenceList>,
    tids: Vec<Tid>,
}

impl Frame {
    pub fn new() -> Frame {
        Frame::default()
    }

    pub fn try_with_capacity(lists: usize, tids: usize) -> Result<Frame, TryReserveError> {
        let mut frame = Frame::new();
        frame.lists.try_reserve_exact(lists)?;
        frame.tids.try_reserve_exact(tids)?;
        Ok(frame)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn lists(&self) -> &[OccurrenceList] {
        &self.lists
    }

    pub fn tids(&self, list: &OccurrenceList) -> &[Tid] {
        &self.tids[list.start..list.start + list.len]
    }

    /// Number of transaction ids over all lists of the frame.
    pub fn total_tids(&self) -> usize {
        self.lists.iter().map(|l| l.len).sum()
    }

    pub fn clear(&mut self) {
        self.lists.clear();
        self.tids.clear();
    }

    /// Orders lists by p-value ascending, ties by support descending.
    pub fn sort_by_significance(&mut self) {
        self.lists
            .sort_by_key(|l| (OrderedFloat(l.significance), Reverse(l.support)));
    }

    pub fn retain<F: FnMut(&OccurrenceList) -> bool>(&mut self, keep: F) {
        self.lists.retain(keep);
    }

    /// Appends the intersection of `a` and `b` as a pending list.
    pub fn intersect_into(
        &mut self,
        item: Item,
        a: &[Tid],
        b: &[Tid],
        weights: &TransactionWeights,
    ) -> OccurrenceList {
        let start = self.tids.len();
        let support = intersect(&mut self.tids, a, b, weights.as_slice());
        self.pending(item, support, start)
    }

    /// Appends the marked part of `src` as a pending list.
    pub fn filter_into(&mut self, item: Item, src: &[Tid], marked: &MarkedTransactions) -> OccurrenceList {
        let start = self.tids.len();
        let support = marked.filter(&mut self.tids, src);
        self.pending(item, support, start)
    }

    fn pending(&self, item: Item, support: Support, start: usize) -> OccurrenceList {
        OccurrenceList {
            item,
            support,
            significance: 1.0,
            start,
            len: self.tids.len() - start,
        }
    }

    /// Keeps the most recently appended pending list.
    pub fn commit(&mut self, list: OccurrenceList) {
        debug_assert_eq!(list.start + list.len, self.tids.len());
        debug_assert!(self.tids(&list).windows(2).all(|w| w[0] > w[1]));
        self.lists.push(list);
    }

    /// Gives the space of the most recently appended pending list back.
    pub fn discard(&mut self, list: OccurrenceList) {
        debug_assert_eq!(list.start + list.len, self.tids.len());
        self.tids.truncate(list.start);
    }
}

/// Builds one occurrence list per item of `db` in a single pass over the
/// transactions, together with the transaction weight table. List ids are
/// decreasing because transactions are visited from last to first. Root
/// lists have significance 0.
pub fn build_root(db: &TransactionDb) -> Result<(Frame, TransactionWeights), TryReserveError> {
    let item_count = db.item_count();
    let mut frame = Frame::try_with_capacity(item_count, db.extent())?;
    let mut next: Vec<usize> = Vec::with_capacity(item_count);
    let mut start = 0;
    for i in 0..item_count {
        next.push(start);
        start += db.occurrences(Item::with_id(i as u32));
    }
    frame.tids.resize(start, 0);
    let mut supports: Vec<Support> = vec![0; item_count];
    let mut weights: Vec<Support> = vec![0; db.len()];
    for tid in (0..db.len()).rev() {
        let transaction = db.transaction(tid);
        let weight = transaction.weight();
        weights[tid] = weight;
        for item in transaction.items() {
            let index = item.as_index();
            supports[index] += weight;
            frame.tids[next[index]] = tid as Tid;
            next[index] += 1;
        }
    }
    let mut start = 0;
    for (i, &support) in supports.iter().enumerate() {
        let len = db.occurrences(Item::with_id(i as u32));
        frame.lists.push(OccurrenceList {
            item: Item::with_id(i as u32),
            support,
            significance: 0.0,
            start,
            len,
        });
        start += len;
    }
    Ok((frame, TransactionWeights::new(weights)))
}

#[cfg(test)]
mod tests {
    use super::{build_root, intersect, Frame, OccurrenceList, Tid, TransactionWeights};
    use crate::item::Item;
    use crate::transaction_db::TransactionDb;
    use proptest::prelude::*;

    impl Frame {
        // Appends a pending list holding a copy of `tids`.
        fn push_list(&mut self, item: Item, tids: &[Tid], weights: &TransactionWeights) -> OccurrenceList {
            let start = self.tids.len();
            self.tids.extend_from_slice(tids);
            let support = tids.iter().map(|&t| weights.as_slice()[t as usize]).sum();
            self.pending(item, support, start)
        }
    }

    impl TransactionWeights {
        fn is_unmarked(&self) -> bool {
            self.marks.iter().all(|&m| m == 0)
        }
    }

    fn descending(mut v: Vec<Tid>) -> Vec<Tid> {
        v.sort_unstable_by(|a, b| b.cmp(a));
        v.dedup();
        v
    }

    #[test]
    fn test_intersect() {
        let weights = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let cases: Vec<(Vec<Tid>, Vec<Tid>, Vec<Tid>, u32)> = vec![
            (vec![7, 5, 3, 1], vec![6, 5, 4, 1, 0], vec![5, 1], 8),
            (vec![7, 6], vec![5, 4], vec![], 0),
            (vec![], vec![3, 2, 1], vec![], 0),
            (vec![4], vec![7, 6, 5, 4, 3], vec![4], 5),
            (vec![2, 1, 0], vec![2, 1, 0], vec![2, 1, 0], 6),
        ];
        for (a, b, expected, support) in cases.into_iter() {
            let mut dst = vec![];
            assert_eq!(intersect(&mut dst, &a, &b, &weights), support);
            assert_eq!(dst, expected);
            let mut dst = vec![];
            assert_eq!(intersect(&mut dst, &b, &a, &weights), support);
            assert_eq!(dst, expected);
        }
    }

    #[test]
    fn test_filter_clears_marks() {
        let mut weights = TransactionWeights::new(vec![1, 1, 2, 1, 3]);
        let pivot: Vec<Tid> = vec![4, 2, 1];
        {
            let marked = weights.mark(&pivot);
            let mut dst = vec![];
            assert_eq!(marked.filter(&mut dst, &[4, 3, 2, 0]), 5);
            assert_eq!(dst, vec![4, 2]);
            let mut dst = vec![];
            assert_eq!(marked.filter(&mut dst, &[3, 0]), 0);
            assert!(dst.is_empty());
        }
        assert!(weights.is_unmarked());
    }

    #[test]
    fn test_frame_commit_and_discard() {
        let weights = TransactionWeights::new(vec![1; 6]);
        let mut frame = Frame::try_with_capacity(2, 8).unwrap();
        let a: Vec<Tid> = vec![5, 3, 1];
        let b: Vec<Tid> = vec![4, 3, 1, 0];
        let kept = frame.intersect_into(Item::with_id(0), &a, &b, &weights);
        frame.commit(kept);
        let dropped = frame.intersect_into(Item::with_id(1), &a, &[4, 2], &weights);
        assert_eq!(dropped.support, 0);
        frame.discard(dropped);
        let copied = frame.push_list(Item::with_id(2), &b, &weights);
        frame.commit(copied);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.tids(&frame.lists()[0]), &[3, 1]);
        assert_eq!(frame.tids(&frame.lists()[1]), &[4, 3, 1, 0]);
        assert_eq!(frame.lists()[1].support, 4);
        assert_eq!(frame.total_tids(), 6);
        frame.clear();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_sort_by_significance() {
        let weights = TransactionWeights::new(vec![1; 4]);
        let mut frame = Frame::new();
        for &(id, ref tids, significance) in
            [(0, vec![1], 0.5), (1, vec![3, 2], 0.5), (2, vec![0], 0.1)].iter()
        {
            let mut list = frame.push_list(Item::with_id(id), tids, &weights);
            list.significance = significance;
            frame.commit(list);
        }
        frame.sort_by_significance();
        let order: Vec<u32> = frame.lists().iter().map(|l| l.item.id()).collect();
        assert_eq!(order, vec![2, 1, 0]);
        assert_eq!(frame.tids(&frame.lists()[1]), &[3, 2]);
    }

    #[test]
    fn test_build_root() {
        let db: TransactionDb = vec![
            (vec![Item::with_id(0), Item::with_id(1)], 2),
            (vec![Item::with_id(1)], 1),
            (vec![Item::with_id(0), Item::with_id(2)], 3),
        ]
        .into_iter()
        .collect();
        let (frame, weights) = build_root(&db).unwrap();
        assert_eq!(weights.as_slice(), &[2, 1, 3]);
        let lists = frame.lists();
        assert_eq!(lists.len(), 3);
        assert_eq!(frame.tids(&lists[0]), &[2, 0]);
        assert_eq!(lists[0].support, 5);
        assert_eq!(frame.tids(&lists[1]), &[1, 0]);
        assert_eq!(lists[1].support, 3);
        assert_eq!(frame.tids(&lists[2]), &[2]);
        assert_eq!(lists[2].significance, 0.0);
    }

    proptest! {
        #[test]
        fn intersect_with_itself_is_identity(
            tids in proptest::collection::vec(0u32..64, 0..40),
            weights in proptest::collection::vec(1u32..5, 64),
        ) {
            let a = descending(tids);
            let expected: u32 = a.iter().map(|&t| weights[t as usize]).sum();
            let mut dst = vec![];
            prop_assert_eq!(intersect(&mut dst, &a, &a, &weights), expected);
            prop_assert_eq!(dst, a);
        }

        #[test]
        fn filter_by_own_marks_is_identity(
            tids in proptest::collection::vec(0u32..64, 0..40),
            weights in proptest::collection::vec(1u32..5, 64),
        ) {
            let a = descending(tids);
            let expected: u32 = a.iter().map(|&t| weights[t as usize]).sum();
            let mut table = TransactionWeights::new(weights);
            let mut dst = vec![];
            let support = table.mark(&a).filter(&mut dst, &a);
            prop_assert_eq!(support, expected);
            prop_assert_eq!(dst, a);
            prop_assert!(table.is_unmarked());
        }

        #[test]
        fn filter_agrees_with_intersect(
            a in proptest::collection::vec(0u32..64, 0..40),
            b in proptest::collection::vec(0u32..64, 0..40),
            weights in proptest::collection::vec(1u32..5, 64),
        ) {
            let a = descending(a);
            let b = descending(b);
            let mut expected = vec![];
            let support = intersect(&mut expected, &a, &b, &weights);
            let mut table = TransactionWeights::new(weights);
            let mut dst = vec![];
            prop_assert_eq!(table.mark(&a).filter(&mut dst, &b), support);
            prop_assert_eq!(dst, expected);
        }
    }
}
