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

use crate::item::Item;
use fnv::FnvHashMap;

/// Interns item names into dense ids starting at zero.
pub struct Itemizer {
    next_item_id: u32,
    item_str_to_id: FnvHashMap<String, Item>,
    item_id_to_str: Vec<String>,
}

impl Itemizer {
    pub fn new() -> Itemizer {
        Itemizer {
            next_item_id: 0,
            item_str_to_id: FnvHashMap::default(),
            item_id_to_str: vec![],
        }
    }
    pub fn id_of(&mut self, item: &str) -> Item {
        if let Some(id) = self.item_str_to_id.get(item) {
            return *id;
        }
        let id = self.next_item_id;
        self.next_item_id += 1;
        self.item_str_to_id
            .insert(String::from(item), Item::with_id(id));
        self.item_id_to_str.push(String::from(item));
        debug_assert_eq!(self.item_id_to_str.len(), id as usize + 1);
        Item::with_id(id)
    }
    pub fn str_of(&self, id: Item) -> &str {
        &self.item_id_to_str[id.as_index()]
    }
    pub fn len(&self) -> usize {
        self.item_id_to_str.len()
    }
    pub fn is_empty(&self) -> bool {
        self.item_id_to_str.is_empty()
    }
    // Names in the order of a recoded item base: entry i names recoded item i.
    pub fn names_of(&self, items: &[Item]) -> Vec<String> {
        items.iter().map(|&item| self.str_of(item).to_owned()).collect()
    }
}

impl Default for Itemizer {
    fn default() -> Self {
        Itemizer::new()
    }
}
