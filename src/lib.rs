//! Benchmark result plotting.
//!
//! Result files are named by the parameters of the run that produced them
//! (`<label>_<key>=<value>_...`). This crate discovers those files, selects
//! subsets by partial parameter constraints, orders them along an axis and
//! renders grouped comparison plots through gnuplot.

pub mod catalog;
pub mod config;
pub mod constraint;
pub mod driver;
pub mod error;
pub mod extract;
pub mod logging;
pub mod params;
pub mod render;
pub mod selector;
pub mod variant;

pub use constraint::{ConstraintSet, grouping_key, parse_grouping_key};
pub use driver::{Driver, RunContext};
pub use error::{Error, Result};
pub use extract::{Extract, TagExtractor, WriteMode};
pub use params::{ParamValue, ParameterSet, parse_filename};
pub use render::{Gnuplot, PlotScript, Render};
pub use selector::{Axis, Order, Predicate, ResultEntry, ResultSet, discover};
pub use variant::{EmptyPolicy, PlotTemplate, PlotVariant, SeriesLayout, SeriesTitle};
