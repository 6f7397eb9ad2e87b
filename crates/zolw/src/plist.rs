use std::collections::{BTreeMap, BTreeSet};

use crate::typ::Value;

/// Property lists: a namespace of their own, separate from variables and procedures.
///
/// Names of lists and of properties are case-insensitive. Properties keep the order they were
/// first added in.
#[derive(Clone, Debug, Default)]
pub struct PropLists {
    lists: BTreeMap<String, Vec<(String, Value)>>,
    buried: BTreeSet<String>,
}

impl PropLists {
    pub fn put(&mut self, owner: &str, prop: &str, value: Value) {
        let props = self.lists.entry(owner.to_lowercase()).or_default();
        let prop = prop.to_lowercase();
        match props.iter_mut().find(|(p, _)| *p == prop) {
            Some((_, v)) => *v = value,
            None => props.push((prop, value)),
        }
    }

    /// The value of a property, or the empty list if there isn't one.
    pub fn get(&self, owner: &str, prop: &str) -> Value {
        let prop = prop.to_lowercase();
        self.lists
            .get(&owner.to_lowercase())
            .and_then(|props| props.iter().find(|(p, _)| *p == prop))
            .map_or_else(Value::empty_list, |(_, v)| v.clone())
    }

    pub fn remove(&mut self, owner: &str, prop: &str) {
        let owner = owner.to_lowercase();
        let prop = prop.to_lowercase();
        if let Some(props) = self.lists.get_mut(&owner) {
            props.retain(|(p, _)| *p != prop);
            if props.is_empty() {
                self.lists.remove(&owner);
            }
        }
    }

    /// A property list as a flat list of names and values.
    pub fn list(&self, owner: &str) -> Value {
        let items = self
            .lists
            .get(&owner.to_lowercase())
            .into_iter()
            .flatten()
            .flat_map(|(p, v)| [Value::text(p.as_str()), v.clone()])
            .collect();
        Value::list(items)
    }

    pub fn contains(&self, owner: &str) -> bool {
        self.lists.contains_key(&owner.to_lowercase())
    }

    pub fn erase(&mut self, owner: &str) {
        self.lists.remove(&owner.to_lowercase());
    }

    /// The names of all property lists that aren't buried.
    pub fn names(&self) -> Vec<String> {
        self.lists
            .keys()
            .filter(|k| !self.buried.contains(*k))
            .cloned()
            .collect()
    }

    pub fn bury(&mut self, owner: &str) {
        self.buried.insert(owner.to_lowercase());
    }

    pub fn unbury(&mut self, owner: &str) {
        self.buried.remove(&owner.to_lowercase());
    }

    pub fn unbury_all(&mut self) {
        self.buried.clear();
    }

    pub fn is_buried(&self, owner: &str) -> bool {
        self.buried.contains(&owner.to_lowercase())
    }
}
