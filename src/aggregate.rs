//! Counts and sums keyed by a record field, in first-seen key order.

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::AddAssign;

/// Ordered key -> value mapping. Iteration order is the order in which keys
/// were first added.
#[derive(Debug, Clone)]
pub struct Tally<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for Tally<K, V> {
    fn default() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for Tally<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq + Hash + Clone, V> Tally<K, V> {
    /// Set the value for `key`. A new key goes to the end; an existing key
    /// keeps its position.
    pub fn insert(&mut self, key: K, value: V) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }
}

impl<K: Eq + Hash + Clone, V: AddAssign + Default> Tally<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K, value: V) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                let mut initial = V::default();
                initial += value;
                self.entries.push((key, initial));
            }
        }
    }
}

impl<K: Eq + Hash, V> Tally<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

impl<K: std::fmt::Display, V: Serialize> Serialize for Tally<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}

struct TallyVisitor<K, V>(PhantomData<(K, V)>);

impl<'de, K, V> Visitor<'de> for TallyVisitor<K, V>
where
    K: Deserialize<'de> + Eq + Hash + Clone,
    V: Deserialize<'de>,
{
    type Value = Tally<K, V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut tally = Tally::default();
        while let Some((key, value)) = access.next_entry()? {
            tally.insert(key, value);
        }
        Ok(tally)
    }
}

/// Keys keep the order in which they appear in the payload.
impl<'de, K, V> Deserialize<'de> for Tally<K, V>
where
    K: Deserialize<'de> + Eq + Hash + Clone,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TallyVisitor(PhantomData))
    }
}

/// Number of records per key. Records whose key is `None` are skipped.
pub fn count_by<R, K, F>(records: &[R], key: F) -> Tally<K, u64>
where
    K: Eq + Hash + Clone,
    F: Fn(&R) -> Option<K>,
{
    let mut tally = Tally::new();
    for record in records {
        if let Some(k) = key(record) {
            tally.add(k, 1);
        }
    }
    tally
}

/// Sum of `value` per key. Records whose key is `None` are skipped.
pub fn sum_by<R, K, V, F, G>(records: &[R], key: F, value: G) -> Tally<K, V>
where
    K: Eq + Hash + Clone,
    V: AddAssign + Default,
    F: Fn(&R) -> Option<K>,
    G: Fn(&R) -> V,
{
    let mut tally = Tally::new();
    for record in records {
        if let Some(k) = key(record) {
            tally.add(k, value(record));
        }
    }
    tally
}

/// `part / total * 100`, with `0 / 0 = 0`, clamped to `[0, 100]`.
pub fn percentage(part: f64, total: f64) -> f64 {
    if total <= 0.0 || !total.is_finite() || !part.is_finite() {
        return 0.0;
    }
    (part / total * 100.0).clamp(0.0, 100.0)
}

/// Mean of the values, 0 for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values.into_iter().fold((0.0, 0u64), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}
