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

/// Dense per-item weight counter, indexed by item id.
pub struct ItemCounter {
    counter: Vec<Support>,
}

impl ItemCounter {
    pub fn new() -> ItemCounter {
        ItemCounter { counter: vec![] }
    }
    pub fn with_items(item_count: usize) -> ItemCounter {
        ItemCounter {
            counter: vec![0; item_count],
        }
    }
    pub fn add(&mut self, item: &Item, count: Support) {
        let index = item.as_index();
        if self.counter.len() <= index {
            self.counter.resize(index + 1, 0);
        }
        self.counter[index] += count;
    }
    pub fn get(&self, item: &Item) -> Support {
        let index = item.as_index();
        if index >= self.counter.len() {
            0
        } else {
            self.counter[index]
        }
    }
    pub fn len(&self) -> usize {
        self.counter.len()
    }
    pub fn items_with_count_at_least(&self, min_count: Support) -> Vec<Item> {
        let mut v: Vec<Item> = vec![];
        for i in 0..self.counter.len() {
            if self.counter[i] >= min_count {
                v.push(Item::with_id(i as u32));
            }
        }
        v
    }
    // Least frequent first; ties keep the lower id first.
    pub fn sort_ascending(&self, v: &mut Vec<Item>) {
        v.sort_by(|a, b| self.get(a).cmp(&self.get(b)).then(a.cmp(b)));
    }
}

impl Default for ItemCounter {
    fn default() -> Self {
        ItemCounter::new()
    }
}
