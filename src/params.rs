//! Parameter sets encoded in result filenames.
//!
//! A result file is named `<label>_<key>=<value>_<key>=<value>...`, for
//! example `arrange_comp=count_rate=1000000_w=4`. Values made only of
//! decimal digits are integers, everything else is kept as text.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Separates the label and the `key=value` segments of a filename.
pub const SEGMENT_DELIMITER: char = '_';

/// Separates a parameter name from its value.
pub const VALUE_DELIMITER: char = '=';

/// A single parameter value.
///
/// Integers order before text so that mixed axes still sort deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

impl ParamValue {
    /// Interpret a raw value. Digits-only strings that fit in an `i64` become
    /// integers; anything else (including the empty string) stays text.
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty()
            && raw.bytes().all(|b| b.is_ascii_digit())
            && let Ok(value) = raw.parse::<i64>()
        {
            return ParamValue::Int(value);
        }
        ParamValue::Text(raw.to_string())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Int(_) => None,
            ParamValue::Text(v) => Some(v),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Named parameters of one result file, kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str, value: &ParamValue) -> bool {
        self.values.get(name) == Some(value)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// Split a result filename into its label and parameter set.
pub fn parse_filename(filename: &str) -> Result<(String, ParameterSet)> {
    let mut segments = filename.split(SEGMENT_DELIMITER);
    // split always yields at least one item
    let label = segments.next().unwrap_or_default().to_string();

    let mut params = ParameterSet::new();
    for segment in segments {
        let (name, raw) = parse_segment(filename, segment)?;
        if params.get(name).is_some() {
            return Err(Error::DuplicateParameter {
                filename: filename.to_string(),
                name: name.to_string(),
            });
        }
        params.insert(name, ParamValue::parse(raw));
    }

    Ok((label, params))
}

fn parse_segment<'a>(filename: &str, segment: &'a str) -> Result<(&'a str, &'a str)> {
    let malformed = || Error::MalformedSegment {
        filename: filename.to_string(),
        segment: segment.to_string(),
    };

    let (name, raw) = segment.split_once(VALUE_DELIMITER).ok_or_else(malformed)?;
    if raw.contains(VALUE_DELIMITER) {
        return Err(malformed());
    }
    Ok((name, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_parameters() {
        let (label, params) = parse_filename("x_rate=100_w=1").unwrap();
        assert_eq!(label, "x");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("rate"), Some(&ParamValue::Int(100)));
        assert_eq!(params.get("w"), Some(&ParamValue::Int(1)));
    }

    #[test]
    fn keeps_non_numeric_values_as_text() {
        let (label, params) = parse_filename("x_name=abc").unwrap();
        assert_eq!(label, "x");
        assert_eq!(params.get("name"), Some(&ParamValue::Text("abc".into())));
    }

    #[test]
    fn signed_and_empty_values_are_text() {
        let (_, params) = parse_filename("x_a=-3_b=_c=1e6").unwrap();
        assert_eq!(params.get("a"), Some(&ParamValue::Text("-3".into())));
        assert_eq!(params.get("b"), Some(&ParamValue::Text("".into())));
        assert_eq!(params.get("c"), Some(&ParamValue::Text("1e6".into())));
    }

    #[test]
    fn overflowing_digits_are_text() {
        let raw = "99999999999999999999999";
        assert_eq!(ParamValue::parse(raw), ParamValue::Text(raw.into()));
    }

    #[test]
    fn parameters_are_sorted_by_name() {
        let (_, params) = parse_filename("x_w=1_comp=count_rate=5").unwrap();
        let names: Vec<&str> = params.names().collect();
        assert_eq!(names, vec!["comp", "rate", "w"]);
    }

    #[test]
    fn label_only_filename_has_no_parameters() {
        let (label, params) = parse_filename("baseline").unwrap();
        assert_eq!(label, "baseline");
        assert!(params.is_empty());
    }

    #[test]
    fn segment_without_equals_is_rejected() {
        let err = parse_filename("x_rate=100_oops").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedSegment { ref segment, .. } if segment == "oops"
        ));
    }

    #[test]
    fn segment_with_two_equals_is_rejected() {
        assert!(matches!(
            parse_filename("x_a=b=c"),
            Err(Error::MalformedSegment { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        assert!(matches!(
            parse_filename("x_w=1_w=2"),
            Err(Error::DuplicateParameter { ref name, .. }) if name == "w"
        ));
    }

    #[test]
    fn integers_order_before_text() {
        let mut values = vec![
            ParamValue::from("abc"),
            ParamValue::from(10),
            ParamValue::from(2),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                ParamValue::Int(2),
                ParamValue::Int(10),
                ParamValue::Text("abc".into())
            ]
        );
    }
}
