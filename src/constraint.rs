//! Partial filters over parameter sets and their canonical names.

use crate::params::{ParamValue, ParameterSet, SEGMENT_DELIMITER, VALUE_DELIMITER};
use std::collections::BTreeMap;
use std::fmt;

/// A set of `name=value` pairs that a result must contain to match.
///
/// Names are unique within a set. Unconstrained names match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    pairs: BTreeMap<String, ParamValue>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.pairs.insert(name.into(), value.into());
    }

    /// Union of two sets. Where both constrain the same name, `other` wins.
    pub fn union(&self, other: &ConstraintSet) -> ConstraintSet {
        let mut pairs = self.pairs.clone();
        for (name, value) in &other.pairs {
            pairs.insert(name.clone(), value.clone());
        }
        ConstraintSet { pairs }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.pairs.get(name)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Superset test: every constrained pair is present and equal in `params`.
    pub fn is_satisfied_by(&self, params: &ParameterSet) -> bool {
        self.pairs
            .iter()
            .all(|(name, value)| params.contains(name, value))
    }

    /// Canonical `name1=value1_name2=value2` rendering, names sorted.
    pub fn grouping_key(&self) -> String {
        grouping_key(self)
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ConstraintSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

impl From<&ParameterSet> for ConstraintSet {
    fn from(params: &ParameterSet) -> Self {
        params.iter().map(|(k, v)| (k, v.clone())).collect()
    }
}

/// Render a constraint set as a filesystem-safe identifier.
///
/// Equal sets always produce the same key regardless of how they were built.
pub fn grouping_key(constraints: &ConstraintSet) -> String {
    let mut key = String::new();
    for (name, value) in constraints.iter() {
        if !key.is_empty() {
            key.push(SEGMENT_DELIMITER);
        }
        key.push_str(name);
        key.push(VALUE_DELIMITER);
        key.push_str(&value.to_string());
    }
    key
}

/// Inverse of [`grouping_key`]. Values are re-typed the same way filenames
/// are; segments without a `=` are ignored.
pub fn parse_grouping_key(key: &str) -> ConstraintSet {
    key.split(SEGMENT_DELIMITER)
        .filter_map(|segment| segment.split_once(VALUE_DELIMITER))
        .map(|(name, raw)| (name, ParamValue::parse(raw)))
        .collect()
}
