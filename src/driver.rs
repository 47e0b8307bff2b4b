//! Renders grouped comparison plots.
//!
//! For every grouping of a [`PlotVariant`] the driver selects the matching
//! results, extracts their data into a per-variant temporary directory,
//! builds a plot script and hands it to the renderer. Any extraction or
//! render failure aborts the variant; the temporary directory is removed
//! either way.

use crate::constraint::ConstraintSet;
use crate::error::Result;
use crate::extract::{Extract, WriteMode};
use crate::render::{PlotScript, Render};
use crate::selector::ResultSet;
use crate::variant::{EmptyPolicy, FIRST_DASH_TYPE, PlotVariant, SeriesLayout};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Identifies the run whose results are plotted.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub results_dir: PathBuf,
    pub plots_dir: PathBuf,
    pub run_id: String,
    pub experiment_id: String,
}

impl RunContext {
    pub fn new(
        results_dir: impl Into<PathBuf>,
        plots_dir: impl Into<PathBuf>,
        run_id: impl Into<String>,
        experiment_id: impl Into<String>,
    ) -> Self {
        Self {
            results_dir: results_dir.into(),
            plots_dir: plots_dir.into(),
            run_id: run_id.into(),
            experiment_id: experiment_id.into(),
        }
    }

    /// `<results_dir>/<run-id>/<experiment-id>`
    pub fn results_path(&self) -> PathBuf {
        self.results_dir
            .join(&self.run_id)
            .join(&self.experiment_id)
    }

    /// `<plots_dir>/<run-id>/<experiment-id>`
    pub fn plots_path(&self) -> PathBuf {
        self.plots_dir.join(&self.run_id).join(&self.experiment_id)
    }

    /// `<plots_dir>/<run-id>/<experiment-id>/<variant>_<grouping key>.pdf`
    pub fn output_path(&self, variant: &str, grouping: &ConstraintSet) -> PathBuf {
        self.plots_path()
            .join(format!("{}_{}.pdf", variant, grouping.grouping_key()))
    }
}

pub struct Driver<'a> {
    ctx: &'a RunContext,
    extractor: &'a dyn Extract,
    renderer: &'a dyn Render,
    dry_run: bool,
}

impl<'a> Driver<'a> {
    pub fn new(ctx: &'a RunContext, extractor: &'a dyn Extract, renderer: &'a dyn Render) -> Self {
        Self {
            ctx,
            extractor,
            renderer,
            dry_run: false,
        }
    }

    /// Build and log scripts without rendering or creating output directories.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Render every grouping of `variant`, returning the output paths in
    /// the order they were produced.
    pub fn render_grouped_plot(
        &self,
        results: &ResultSet,
        variant: &PlotVariant,
    ) -> Result<Vec<PathBuf>> {
        let tempdir = tempfile::Builder::new()
            .prefix(&format!("{}-", variant.name()))
            .suffix(&format!("-{}-{}", self.ctx.experiment_id, self.ctx.run_id))
            .tempdir()?;

        let mut outputs = Vec::new();
        for grouping in variant.groupings(results) {
            tracing::info!("{}: {}", variant.name(), grouping);

            let Some(script) = self.build_script(results, variant, &grouping, tempdir.path())?
            else {
                tracing::debug!(
                    "{}: no results match {}, skipping",
                    variant.name(),
                    grouping
                );
                continue;
            };

            let output = self.ctx.output_path(variant.name(), &grouping);
            let script = script.render();
            tracing::debug!("{}", script.trim_end());

            if self.dry_run {
                tracing::info!("[DRY RUN] {}", output.display());
            } else {
                fs::create_dir_all(self.ctx.plots_path())?;
                self.renderer.render(&script, &output)?;
                tracing::info!("{}", output.display());
            }
            outputs.push(output);
        }

        Ok(outputs)
    }

    /// Extract the data of one grouping and build its script. `None` when
    /// nothing matched and the variant skips empty groupings.
    fn build_script(
        &self,
        results: &ResultSet,
        variant: &PlotVariant,
        grouping: &ConstraintSet,
        tempdir: &Path,
    ) -> Result<Option<PlotScript>> {
        let source_dir = self.ctx.results_path();
        let mut script = variant.template().script();
        let mut matched = 0;

        match variant.layout() {
            SeriesLayout::PerEntry { order, title } => {
                let entries = results.select_where(grouping, variant.predicate(), order);
                matched += entries.len();
                for (i, entry) in entries.iter().enumerate() {
                    let datafile = tempdir.join(format!("{}_{}", variant.name(), entry.filename));
                    self.extractor.extract(
                        &source_dir.join(&entry.filename),
                        variant.tag(),
                        &datafile,
                        WriteMode::Truncate,
                    )?;
                    script.series(
                        &datafile,
                        &format!("using 1:2 with lines lw 2 dt {}", FIRST_DASH_TYPE + i),
                        &title.format(&entry.params),
                    );
                }
            }
            SeriesLayout::PerGroup {
                axis,
                values,
                order,
            } => {
                for value in values {
                    let group = grouping.union(&ConstraintSet::new().with(axis, value.clone()));
                    let datafile =
                        tempdir.join(format!("{}_{}", variant.name(), group.grouping_key()));
                    File::create(&datafile)?;

                    let entries = results.select_where(&group, variant.predicate(), order);
                    matched += entries.len();
                    for entry in entries {
                        self.extractor.extract(
                            &source_dir.join(&entry.filename),
                            variant.tag(),
                            &datafile,
                            WriteMode::Append,
                        )?;
                    }
                    script.series(
                        &datafile,
                        "using 1:2:xtic(1) with linespoints",
                        &value.to_string(),
                    );
                }
            }
        }

        if matched == 0 && variant.empty_policy() == EmptyPolicy::Skip {
            return Ok(None);
        }
        Ok(Some(script))
    }
}
