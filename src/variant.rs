//! Configuration of one grouped comparison plot.
//!
//! A [`PlotVariant`] describes which results go into which plot and how the
//! plot looks. The driver turns it into one output file per combination of
//! outer axis values.

use crate::constraint::ConstraintSet;
use crate::extract::LATENCY_TAG;
use crate::params::{ParamValue, ParameterSet};
use crate::render::PlotScript;
use crate::selector::{Order, Predicate, ResultSet};

/// What to do when a grouping selects no results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPolicy {
    /// Produce no script and no output file.
    #[default]
    Skip,
    /// Render anyway, yielding an empty plot.
    Emit,
}

/// An axis iterated outside the plot, producing one plot per value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OuterAxis {
    /// Every value the axis takes in the result set.
    Discovered(String),
    /// A fixed list of values, whether or not they are present.
    Values(String, Vec<ParamValue>),
}

impl OuterAxis {
    pub fn name(&self) -> &str {
        match self {
            OuterAxis::Discovered(name) | OuterAxis::Values(name, _) => name,
        }
    }

    pub fn values(&self, results: &ResultSet) -> Vec<ParamValue> {
        match self {
            OuterAxis::Discovered(name) => results.axis_values(name).into_iter().collect(),
            OuterAxis::Values(_, values) => values.clone(),
        }
    }
}

/// Title of a per-entry series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesTitle {
    /// The value of a single parameter, e.g. `100`.
    Value(String),
    /// `name=value` pairs joined by `, `, e.g. `w=1, work=4`.
    Pairs(Vec<String>),
}

impl SeriesTitle {
    pub fn format(&self, params: &ParameterSet) -> String {
        let value = |name: &str| {
            params
                .get(name)
                .map(ToString::to_string)
                .unwrap_or_default()
        };
        match self {
            SeriesTitle::Value(name) => value(name),
            SeriesTitle::Pairs(names) => names
                .iter()
                .map(|name| format!("{}={}", name, value(name)))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// How matched results map onto plot series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesLayout {
    /// One series per matched result, dash type increasing from 2.
    PerEntry { order: Order, title: SeriesTitle },
    /// One series per value of `axis`; its data concatenates every result
    /// matching that value, in `order`.
    PerGroup {
        axis: String,
        values: Vec<ParamValue>,
        order: Order,
    },
}

impl SeriesLayout {
    pub fn per_entry(order: Order, title: SeriesTitle) -> Self {
        SeriesLayout::PerEntry { order, title }
    }

    pub fn per_group<V: Into<ParamValue>>(
        axis: impl Into<String>,
        values: impl IntoIterator<Item = V>,
        order: Order,
    ) -> Self {
        SeriesLayout::PerGroup {
            axis: axis.into(),
            values: values.into_iter().map(Into::into).collect(),
            order,
        }
    }
}

/// First dash type used for per-entry series.
pub const FIRST_DASH_TYPE: usize = 2;

/// Terminal, axes and key directives of a plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotTemplate {
    pub size: String,
    pub logscale_x: bool,
    pub logscale_y: bool,
    pub bottom_margin: Option<String>,
    pub xrange: Option<String>,
    pub yrange: Option<String>,
    pub format_x: Option<String>,
    pub format_y: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub key: Option<String>,
}

impl Default for PlotTemplate {
    fn default() -> Self {
        Self {
            size: "6cm,4cm".to_string(),
            logscale_x: false,
            logscale_y: false,
            bottom_margin: Some("screen 0.2".to_string()),
            xrange: None,
            yrange: None,
            format_x: None,
            format_y: None,
            xlabel: None,
            ylabel: None,
            key: None,
        }
    }
}

impl PlotTemplate {
    /// Log-log complementary CDF of latency in nanoseconds.
    pub fn latency_ccdf() -> Self {
        Self {
            logscale_x: true,
            logscale_y: true,
            xrange: Some("[50000:5000000000.0]".to_string()),
            yrange: Some("[*:1.01]".to_string()),
            format_x: Some("10^{%T}".to_string()),
            xlabel: Some("nanoseconds".to_string()),
            ylabel: Some("complementary cdf".to_string()),
            key: Some("left bottom Left reverse font \",10\"".to_string()),
            ..Self::default()
        }
    }

    /// Linear throughput against core count.
    pub fn throughput() -> Self {
        Self {
            xrange: Some("[2:34]".to_string()),
            xlabel: Some("cores".to_string()),
            ylabel: Some("throughput (records/s)".to_string()),
            key: Some("left top Left reverse font \",10\"".to_string()),
            ..Self::default()
        }
    }

    pub fn with_yrange(mut self, range: impl Into<String>) -> Self {
        self.yrange = Some(range.into());
        self
    }

    pub fn with_format_y(mut self, format: impl Into<String>) -> Self {
        self.format_y = Some(format.into());
        self
    }

    /// Start a script with this template's directives.
    pub fn script(&self) -> PlotScript {
        let mut script = PlotScript::new();
        script.directive(format!("set terminal pdf size {}", self.size));
        if self.logscale_x {
            script.directive("set logscale x");
        }
        if self.logscale_y {
            script.directive("set logscale y");
        }
        if let Some(margin) = &self.bottom_margin {
            script.directive(format!("set bmargin at {}", margin));
        }
        if let Some(range) = &self.xrange {
            script.directive(format!("set xrange {}", range));
        }
        if let Some(format) = &self.format_x {
            script.directive(format!("set format x \"{}\"", format));
        }
        if let Some(range) = &self.yrange {
            script.directive(format!("set yrange {}", range));
        }
        if let Some(format) = &self.format_y {
            script.directive(format!("set format y \"{}\"", format));
        }
        if let Some(label) = &self.xlabel {
            script.directive(format!("set xlabel \"{}\"", label));
        }
        if let Some(label) = &self.ylabel {
            script.directive(format!("set ylabel \"{}\"", label));
        }
        if let Some(key) = &self.key {
            script.directive(format!("set key {}", key));
        }
        script
    }
}

/// A grouped comparison plot.
#[derive(Debug, Clone)]
pub struct PlotVariant {
    name: String,
    base: ConstraintSet,
    outer_axes: Vec<OuterAxis>,
    layout: SeriesLayout,
    predicate: Option<Predicate>,
    template: PlotTemplate,
    empty_policy: EmptyPolicy,
    tag: String,
}

impl PlotVariant {
    pub fn builder(name: impl Into<String>) -> PlotVariantBuilder {
        PlotVariantBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> &ConstraintSet {
        &self.base
    }

    pub fn outer_axes(&self) -> &[OuterAxis] {
        &self.outer_axes
    }

    pub fn layout(&self) -> &SeriesLayout {
        &self.layout
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn template(&self) -> &PlotTemplate {
        &self.template
    }

    pub fn empty_policy(&self) -> EmptyPolicy {
        self.empty_policy
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Constraint sets of every plot this variant produces: the base
    /// unioned with each combination of outer axis values, first axis
    /// outermost.
    pub fn groupings(&self, results: &ResultSet) -> Vec<ConstraintSet> {
        let mut groupings = vec![self.base.clone()];
        for axis in &self.outer_axes {
            let values = axis.values(results);
            let expanded: Vec<ConstraintSet> = groupings
                .iter()
                .flat_map(|g| {
                    values.iter().map(move |v| {
                        g.union(&ConstraintSet::new().with(axis.name(), v.clone()))
                    })
                })
                .collect();
            groupings = expanded;
        }
        groupings
    }
}

/// Builder for [`PlotVariant`].
pub struct PlotVariantBuilder {
    variant: PlotVariant,
}

impl PlotVariantBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            variant: PlotVariant {
                name: name.into(),
                base: ConstraintSet::new(),
                outer_axes: Vec::new(),
                layout: SeriesLayout::per_entry(Order::Discovery, SeriesTitle::Pairs(Vec::new())),
                predicate: None,
                template: PlotTemplate::latency_ccdf(),
                empty_policy: EmptyPolicy::default(),
                tag: LATENCY_TAG.to_string(),
            },
        }
    }

    /// Add a fixed constraint shared by every grouping.
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.variant.base.insert(name, value);
        self
    }

    /// Iterate every discovered value of `name`.
    pub fn over_discovered(mut self, name: impl Into<String>) -> Self {
        self.variant
            .outer_axes
            .push(OuterAxis::Discovered(name.into()));
        self
    }

    /// Iterate a fixed list of values of `name`.
    pub fn over_values<V: Into<ParamValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.variant.outer_axes.push(OuterAxis::Values(
            name.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn layout(mut self, layout: SeriesLayout) -> Self {
        self.variant.layout = layout;
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.variant.predicate = Some(predicate);
        self
    }

    pub fn template(mut self, template: PlotTemplate) -> Self {
        self.variant.template = template;
        self
    }

    pub fn empty_policy(mut self, policy: EmptyPolicy) -> Self {
        self.variant.empty_policy = policy;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.variant.tag = tag.into();
        self
    }

    pub fn build(self) -> PlotVariant {
        self.variant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::parse_filename;

    #[test]
    fn groupings_are_base_times_outer_axes() {
        let results = ResultSet::from_filenames([
            "x_comp=count_w=1_work=1",
            "x_comp=count_w=1_work=4",
            "x_comp=count_w=2_work=4",
        ])
        .unwrap();

        let variant = PlotVariant::builder("v")
            .filter("w", 1)
            .over_discovered("work")
            .over_values("comp", ["arrange", "count"])
            .build();

        let keys: Vec<String> = variant
            .groupings(&results)
            .iter()
            .map(|g| g.grouping_key())
            .collect();
        assert_eq!(
            keys,
            vec![
                "comp=arrange_w=1_work=1",
                "comp=count_w=1_work=1",
                "comp=arrange_w=1_work=4",
                "comp=count_w=1_work=4",
            ]
        );
    }

    #[test]
    fn no_outer_axes_is_a_single_grouping() {
        let results = ResultSet::from_filenames(["x_w=1"]).unwrap();
        let variant = PlotVariant::builder("v").filter("rate", 10000).build();
        assert_eq!(
            variant.groupings(&results),
            vec![ConstraintSet::new().with("rate", 10000)]
        );
    }

    #[test]
    fn discovered_axis_with_no_values_yields_nothing() {
        let results = ResultSet::from_filenames(["x_w=1"]).unwrap();
        let variant = PlotVariant::builder("v").over_discovered("work").build();
        assert!(variant.groupings(&results).is_empty());
    }

    #[test]
    fn series_titles() {
        let (_, params) = parse_filename("x_rate=100_w=1_work=4").unwrap();
        assert_eq!(SeriesTitle::Value("rate".into()).format(&params), "100");
        assert_eq!(
            SeriesTitle::Pairs(vec!["w".into(), "work".into()]).format(&params),
            "w=1, work=4"
        );
    }

    #[test]
    fn latency_template_directives() {
        let script = PlotTemplate::latency_ccdf().script().render();
        assert!(script.starts_with("set terminal pdf size 6cm,4cm; set logscale x; set logscale y; "));
        assert!(script.contains("set xrange [50000:5000000000.0]; "));
        assert!(script.contains("set format x \"10^{%T}\"; "));
        assert!(script.contains("set ylabel \"complementary cdf\"; "));
        assert!(!script.contains("set format y"));
        assert!(script.ends_with("plot \n"));
    }

    #[test]
    fn throughput_template_is_linear() {
        let script = PlotTemplate::throughput().script().render();
        assert!(!script.contains("logscale"));
        assert!(script.contains("set xlabel \"cores\"; "));
        assert!(script.contains("set key left top Left reverse font \",10\"; "));
    }
}
