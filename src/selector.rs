//! Discovery and selection of result files.
//!
//! A [`ResultSet`] holds every result file of one experiment directory along
//! with its parsed parameters. Selection is a linear scan with a superset
//! test; result sets are tens to hundreds of files so no index is kept.

use crate::constraint::ConstraintSet;
use crate::error::{Error, Result};
use crate::params::{ParamValue, ParameterSet, parse_filename};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// One result file and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub params: ParameterSet,
    pub filename: String,
}

impl ResultEntry {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }
}

/// A parameter name and every value it takes across a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub name: String,
    pub values: BTreeSet<ParamValue>,
}

/// Ordering applied to a selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Order {
    /// Keep discovery order.
    #[default]
    Discovery,
    Ascending(String),
    Descending(String),
}

impl Order {
    pub fn ascending(axis: impl Into<String>) -> Self {
        Order::Ascending(axis.into())
    }

    pub fn descending(axis: impl Into<String>) -> Self {
        Order::Descending(axis.into())
    }

    // Entries lacking the axis always go last, whatever the direction.
    fn compare(&self, a: &ResultEntry, b: &ResultEntry) -> Ordering {
        let (axis, reverse) = match self {
            Order::Discovery => return Ordering::Equal,
            Order::Ascending(axis) => (axis, false),
            Order::Descending(axis) => (axis, true),
        };
        match (a.get(axis), b.get(axis)) {
            (Some(x), Some(y)) if reverse => y.cmp(x),
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// A filter on derived relationships between parameters that a flat
/// constraint set cannot express.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `target == factor * multiplier`, both integers.
    ProductEquals {
        target: String,
        factor: String,
        multiplier: i64,
    },
    /// The parameter is present and equal to one of `values`.
    OneOf {
        name: String,
        values: Vec<ParamValue>,
    },
    Custom(fn(&ParameterSet) -> bool),
}

impl Predicate {
    pub fn product_equals(
        target: impl Into<String>,
        factor: impl Into<String>,
        multiplier: i64,
    ) -> Self {
        Predicate::ProductEquals {
            target: target.into(),
            factor: factor.into(),
            multiplier,
        }
    }

    pub fn one_of<V: Into<ParamValue>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Predicate::OneOf {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, params: &ParameterSet) -> bool {
        match self {
            Predicate::ProductEquals {
                target,
                factor,
                multiplier,
            } => {
                let target = params.get(target).and_then(ParamValue::as_int);
                let factor = params.get(factor).and_then(ParamValue::as_int);
                match (target, factor) {
                    (Some(t), Some(f)) => f.checked_mul(*multiplier) == Some(t),
                    _ => false,
                }
            }
            Predicate::OneOf { name, values } => params
                .get(name)
                .map(|v| values.contains(v))
                .unwrap_or(false),
            Predicate::Custom(f) => f(params),
        }
    }
}

/// Every result file of one experiment directory.
#[derive(Debug, Clone)]
pub struct ResultSet {
    label: String,
    entries: Vec<ResultEntry>,
}

impl ResultSet {
    /// Build a result set from filenames, in the order given.
    ///
    /// The first filename fixes the label every other file must share.
    pub fn from_filenames<I, S>(filenames: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        for filename in filenames {
            let filename = filename.as_ref();
            let (label, params) = parse_filename(filename)?;
            parsed.push((
                label,
                ResultEntry {
                    params,
                    filename: filename.to_string(),
                },
            ));
        }

        let label = validate_labels(&parsed)?;
        let entries = parsed.into_iter().map(|(_, entry)| entry).collect();

        Ok(Self { label, entries })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct values of one parameter. Empty if no entry carries it.
    pub fn axis_values(&self, name: &str) -> BTreeSet<ParamValue> {
        self.entries
            .iter()
            .filter_map(|e| e.get(name).cloned())
            .collect()
    }

    /// Every parameter name present in the set, with its values.
    pub fn axes(&self) -> Vec<Axis> {
        let mut axes: BTreeMap<&str, BTreeSet<ParamValue>> = BTreeMap::new();
        for entry in &self.entries {
            for (name, value) in entry.params.iter() {
                axes.entry(name).or_default().insert(value.clone());
            }
        }
        axes.into_iter()
            .map(|(name, values)| Axis {
                name: name.to_string(),
                values,
            })
            .collect()
    }

    /// Entries whose parameters are a superset of `constraints`, stably
    /// sorted by `order`. No match is an empty vector.
    pub fn select(&self, constraints: &ConstraintSet, order: &Order) -> Vec<&ResultEntry> {
        self.select_where(constraints, None, order)
    }

    /// As [`ResultSet::select`], additionally filtered by `predicate`.
    pub fn select_where(
        &self,
        constraints: &ConstraintSet,
        predicate: Option<&Predicate>,
        order: &Order,
    ) -> Vec<&ResultEntry> {
        let mut selected: Vec<&ResultEntry> = self
            .entries
            .iter()
            .filter(|e| constraints.is_satisfied_by(&e.params))
            .filter(|e| predicate.map(|p| p.matches(&e.params)).unwrap_or(true))
            .collect();
        // sort_by is stable, ties keep discovery order
        selected.sort_by(|a, b| order.compare(a, b));
        selected
    }
}

fn validate_labels(parsed: &[(String, ResultEntry)]) -> Result<String> {
    let Some((expected, _)) = parsed.first() else {
        return Ok(String::new());
    };
    for (label, entry) in parsed {
        if label != expected {
            return Err(Error::InconsistentLabel {
                filename: entry.filename.clone(),
                expected: expected.clone(),
                found: label.clone(),
            });
        }
    }
    Ok(expected.clone())
}

/// Read every result file in `directory`.
///
/// Files are taken in lexicographic filename order so repeated runs see the
/// same discovery order. Hidden files and subdirectories are ignored; symlinked
/// result files are followed.
pub fn discover(directory: &Path) -> Result<ResultSet> {
    if !directory.is_dir() {
        return Err(Error::MissingDirectory(directory.to_path_buf()));
    }

    let mut filenames = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        // follows symlinks; a dangling link is an error
        if fs::metadata(entry.path())?.is_dir() {
            continue;
        }
        let filename = entry
            .file_name()
            .into_string()
            .map_err(|raw| Error::MalformedSegment {
                filename: raw.to_string_lossy().into_owned(),
                segment: "non-UTF-8 filename".to_string(),
            })?;
        if filename.starts_with('.') {
            continue;
        }
        filenames.push(filename);
    }

    if filenames.is_empty() {
        return Err(Error::EmptyResultSet(directory.to_path_buf()));
    }

    filenames.sort();
    let results = ResultSet::from_filenames(&filenames)?;

    tracing::debug!(
        "discovered {} '{}' results in {}",
        results.len(),
        results.label(),
        directory.display()
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ResultSet {
        ResultSet::from_filenames(["x_rate=100_w=1", "x_rate=200_w=1", "x_rate=100_w=2"]).unwrap()
    }

    fn names(entries: &[&ResultEntry]) -> Vec<String> {
        entries.iter().map(|e| e.filename.clone()).collect()
    }

    #[test]
    fn select_sorts_by_axis() {
        let results = scenario();
        let selected = results.select(
            &ConstraintSet::new().with("w", 1),
            &Order::ascending("rate"),
        );
        assert_eq!(names(&selected), vec!["x_rate=100_w=1", "x_rate=200_w=1"]);
    }

    #[test]
    fn select_without_match_is_empty() {
        let results = scenario();
        let selected = results.select(&ConstraintSet::new().with("w", 3), &Order::Discovery);
        assert!(selected.is_empty());
    }

    #[test]
    fn empty_constraints_select_everything() {
        let results = scenario();
        let selected = results.select(&ConstraintSet::new(), &Order::Discovery);
        assert_eq!(selected.len(), results.len());
    }

    #[test]
    fn select_is_exactly_the_superset_matches() {
        let results = ResultSet::from_filenames([
            "x_comp=count_rate=100_w=1",
            "x_comp=count_rate=100_w=2",
            "x_comp=arrange_rate=100_w=1",
            "x_comp=count_w=1",
        ])
        .unwrap();
        let c = ConstraintSet::new().with("comp", "count").with("w", 1);
        let selected = results.select(&c, &Order::Discovery);
        assert_eq!(
            names(&selected),
            vec!["x_comp=count_rate=100_w=1", "x_comp=count_w=1"]
        );
        for entry in results.entries() {
            let expected = c.iter().all(|(k, v)| entry.get(k) == Some(v));
            assert_eq!(selected.contains(&entry), expected);
        }
    }

    #[test]
    fn ties_keep_discovery_order() {
        let results = ResultSet::from_filenames([
            "x_rate=200_w=1_z=a",
            "x_rate=100_w=1_z=b",
            "x_rate=200_w=1_z=c",
            "x_rate=100_w=1_z=d",
        ])
        .unwrap();
        let first = results.select(&ConstraintSet::new(), &Order::ascending("rate"));
        assert_eq!(
            names(&first),
            vec![
                "x_rate=100_w=1_z=b",
                "x_rate=100_w=1_z=d",
                "x_rate=200_w=1_z=a",
                "x_rate=200_w=1_z=c",
            ]
        );
        for _ in 0..5 {
            let again = results.select(&ConstraintSet::new(), &Order::ascending("rate"));
            assert_eq!(names(&again), names(&first));
        }
    }

    #[test]
    fn descending_order_and_missing_axis() {
        let results =
            ResultSet::from_filenames(["x_w=1", "x_other=5", "x_w=4", "x_w=2"]).unwrap();
        let selected = results.select(&ConstraintSet::new(), &Order::descending("w"));
        assert_eq!(names(&selected), vec!["x_w=4", "x_w=2", "x_w=1", "x_other=5"]);
        let selected = results.select(&ConstraintSet::new(), &Order::ascending("w"));
        assert_eq!(names(&selected), vec!["x_w=1", "x_w=2", "x_w=4", "x_other=5"]);
    }

    #[test]
    fn axis_values_are_distinct() {
        let results = scenario();
        let values: Vec<ParamValue> = results.axis_values("w").into_iter().collect();
        assert_eq!(values, vec![ParamValue::Int(1), ParamValue::Int(2)]);
        assert!(results.axis_values("missing").is_empty());
    }

    #[test]
    fn axes_cover_every_parameter() {
        let axes = scenario().axes();
        let names: Vec<&str> = axes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["rate", "w"]);
        assert_eq!(axes[0].values.len(), 2);
    }

    #[test]
    fn inconsistent_labels_are_fatal() {
        let err = ResultSet::from_filenames(["x_w=1", "y_w=2"]).unwrap_err();
        match err {
            Error::InconsistentLabel {
                filename,
                expected,
                found,
            } => {
                assert_eq!(filename, "y_w=2");
                assert_eq!(expected, "x");
                assert_eq!(found, "y");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_filename_is_fatal() {
        assert!(matches!(
            ResultSet::from_filenames(["x_w=1", "x_w"]),
            Err(Error::MalformedSegment { .. })
        ));
    }

    #[test]
    fn product_predicate() {
        let p = Predicate::product_equals("rate", "w", 1_000_000);
        let (_, ok) = parse_filename("x_rate=1000000_w=1").unwrap();
        let (_, bad) = parse_filename("x_rate=1000000_w=2").unwrap();
        let (_, missing) = parse_filename("x_rate=1000000").unwrap();
        assert!(p.matches(&ok));
        assert!(!p.matches(&bad));
        assert!(!p.matches(&missing));
    }

    #[test]
    fn one_of_predicate() {
        let p = Predicate::one_of("w", [1, 32]);
        let (_, one) = parse_filename("x_w=1").unwrap();
        let (_, four) = parse_filename("x_w=4").unwrap();
        assert!(p.matches(&one));
        assert!(!p.matches(&four));
    }

    #[test]
    fn select_where_applies_predicate() {
        let results = ResultSet::from_filenames([
            "x_rate=1000000_w=1",
            "x_rate=1000000_w=2",
            "x_rate=2000000_w=2",
        ])
        .unwrap();
        let p = Predicate::product_equals("rate", "w", 1_000_000);
        let selected = results.select_where(&ConstraintSet::new(), Some(&p), &Order::ascending("w"));
        assert_eq!(
            names(&selected),
            vec!["x_rate=1000000_w=1", "x_rate=2000000_w=2"]
        );
    }
}
