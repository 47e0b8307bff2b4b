use benchplot::config::Config;
use benchplot::{Driver, Gnuplot, RunContext, TagExtractor, catalog, discover, logging};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "benchplot")]
#[command(about = "Plot latency and throughput comparisons from benchmark result sweeps")]
#[command(version)]
struct Cli {
    /// Run whose results are plotted (for example a commit hash)
    #[arg(long, visible_alias = "commit")]
    run_id: String,

    /// Experiment within the run
    #[arg(long)]
    experiment: String,

    /// Path to configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the results root directory
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Override the plots root directory
    #[arg(long)]
    plots_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render plots (the default)
    Plot {
        /// Variants to render, all when omitted
        #[arg(long = "variant", short)]
        variants: Vec<String>,

        /// Only build and log plot scripts, don't render
        #[arg(long)]
        dry_run: bool,
    },

    /// Print every parameter axis and its values
    Axes,

    /// List the built-in plot variants
    Variants,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.results_dir {
        config.paths.results_dir = dir.clone();
    }
    if let Some(dir) = &cli.plots_dir {
        config.paths.plots_dir = dir.clone();
    }

    logging::init(&config.logging);

    let ctx = RunContext::new(
        &config.paths.results_dir,
        &config.paths.plots_dir,
        &cli.run_id,
        &cli.experiment,
    );
    tracing::info!("run {}, experiment {}", ctx.run_id, ctx.experiment_id);

    match cli.command.unwrap_or(Commands::Plot {
        variants: Vec::new(),
        dry_run: false,
    }) {
        Commands::Variants => {
            for name in catalog::names() {
                println!("{}", name);
            }
        }

        Commands::Axes => {
            let results = discover(&ctx.results_path())?;
            println!("label: {}", results.label());
            for axis in results.axes() {
                let values: Vec<String> = axis.values.iter().map(ToString::to_string).collect();
                println!("  {:<12} {}", axis.name, values.join(", "));
            }
        }

        Commands::Plot { variants, dry_run } => {
            // resolve names before touching the filesystem
            let variants = if variants.is_empty() {
                catalog::all()
            } else {
                variants
                    .iter()
                    .map(|name| catalog::by_name(name))
                    .collect::<Result<Vec<_>, _>>()?
            };

            let results = discover(&ctx.results_path())?;
            for axis in results.axes() {
                tracing::debug!("axis {}: {:?}", axis.name, axis.values);
            }

            let extractor = TagExtractor;
            let renderer = Gnuplot::new(&config.render.program);
            let driver = Driver::new(&ctx, &extractor, &renderer).dry_run(dry_run);

            let mut total = 0;
            for variant in &variants {
                let outputs = driver.render_grouped_plot(&results, variant)?;
                for output in &outputs {
                    println!("{}", output.display());
                }
                total += outputs.len();
            }

            tracing::info!(
                "{} plots from {} variants{}",
                total,
                variants.len(),
                if dry_run { " (DRY RUN)" } else { "" }
            );
        }
    }

    Ok(())
}
