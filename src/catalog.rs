//! The built-in views of an open-loop dataflow microbenchmark sweep.
//!
//! Results are expected to carry `comp` (component under test), `work`,
//! `w` (workers), `rate` (offered load), `keys` and `recs` parameters.

use crate::error::{Error, Result};
use crate::extract::THROUGHPUT_TAG;
use crate::selector::{Order, Predicate};
use crate::variant::{EmptyPolicy, PlotTemplate, PlotVariant, SeriesLayout, SeriesTitle};

const COMPONENTS: [&str; 3] = ["arrange", "count", "maintain"];

/// Latency under increasing offered load, single worker.
pub fn load_varies() -> PlotVariant {
    PlotVariant::builder("i_load_varies")
        .filter("w", 1)
        .over_discovered("work")
        .over_values("comp", COMPONENTS)
        .layout(SeriesLayout::per_entry(
            Order::ascending("rate"),
            SeriesTitle::Value("rate".into()),
        ))
        .empty_policy(EmptyPolicy::Emit)
        .build()
}

/// Latency at a fixed load as workers are added.
pub fn strong_scaling() -> PlotVariant {
    PlotVariant::builder("ii_strong_scaling")
        .filter("rate", 1_000_000)
        .over_discovered("work")
        .over_values("comp", ["maintain"])
        .layout(SeriesLayout::per_entry(
            Order::ascending("w"),
            SeriesTitle::Value("w".into()),
        ))
        .template(PlotTemplate::latency_ccdf().with_format_y("10^{%T}"))
        .empty_policy(EmptyPolicy::Emit)
        .build()
}

/// Latency with load growing in proportion to workers.
pub fn weak_scaling() -> PlotVariant {
    PlotVariant::builder("iii_weak_scaling")
        .filter("keys", 10_000_000)
        .filter("recs", 32_000_000)
        .over_discovered("work")
        .over_values("comp", COMPONENTS)
        .predicate(Predicate::product_equals("rate", "w", 1_000_000))
        .layout(SeriesLayout::per_entry(
            Order::ascending("w"),
            SeriesTitle::Value("w".into()),
        ))
        .empty_policy(EmptyPolicy::Skip)
        .build()
}

/// Throughput against cores, one line per component.
pub fn throughput() -> PlotVariant {
    PlotVariant::builder("iv_throughput")
        .filter("rate", 10_000)
        .filter("work", 4)
        .layout(SeriesLayout::per_group(
            "comp",
            COMPONENTS,
            Order::ascending("w"),
        ))
        .template(PlotTemplate::throughput())
        .tag(THROUGHPUT_TAG)
        .empty_policy(EmptyPolicy::Emit)
        .build()
}

/// Latency of the smallest and largest worker counts across work levels.
pub fn amortization() -> PlotVariant {
    PlotVariant::builder("v_amortization")
        .filter("keys", 10_000_000)
        .filter("recs", 32_000_000)
        .filter("rate", 1_000_000)
        .over_values("comp", COMPONENTS)
        .predicate(Predicate::one_of("w", [1, 32]))
        .layout(SeriesLayout::per_entry(
            Order::ascending("w"),
            SeriesTitle::Pairs(vec!["w".into(), "work".into()]),
        ))
        .template(PlotTemplate::latency_ccdf().with_yrange("[0.001:1.01]"))
        .empty_policy(EmptyPolicy::Skip)
        .build()
}

pub fn all() -> Vec<PlotVariant> {
    vec![
        load_varies(),
        strong_scaling(),
        weak_scaling(),
        throughput(),
        amortization(),
    ]
}

pub fn names() -> Vec<String> {
    all().iter().map(|v| v.name().to_string()).collect()
}

pub fn by_name(name: &str) -> Result<PlotVariant> {
    all()
        .into_iter()
        .find(|v| v.name() == name)
        .ok_or_else(|| Error::UnknownVariant(name.to_string()))
}
