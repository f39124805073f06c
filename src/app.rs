//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs selection + classification
//! - prints reports/plots
//! - writes optional charts and exports

use std::path::Path;

use clap::Parser;
use log::info;

use crate::cli::{Cli, Command, DbArgs, GenerateArgs, RunArgs, ShowArgs};
use crate::data::{SampleConfig, generate_dataset, write_dataset};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::io::{SqliteStore, TableStore};
use crate::plot::PlotStyle;

pub mod pipeline;

/// Entry point for the `idealfit` binary.
pub fn run() -> Result<(), AppError> {
    // Before parsing, so `IDEALFIT_DB` from `.env` feeds the `--db` default.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Run(args) => handle_run(&args),
        Command::Generate(args) => handle_generate(&args),
        Command::Show(args) => handle_show(&args),
        Command::Tables(args) => handle_tables(&args),
    }
}

/// `RUST_LOG` wins over the flags when set.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn handle_run(args: &RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args);
    let run = pipeline::run_pipeline(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.training, &run.ideal, &run.test, &run.best, &run.summary)
    );

    if config.plot {
        println!(
            "{}",
            crate::plot::render_fit_plot(&run.training, &run.ideal, &run.best, config.plot_width, config.plot_height)
        );
        println!(
            "{}",
            crate::plot::render_classification_plot(
                &run.results,
                &run.ideal,
                &run.best,
                config.plot_width,
                config.plot_height
            )
        );
    }

    if let Some(dir) = &config.plot_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| AppError::new(4, format!("Failed to create plot directory '{}': {e}", dir.display())))?;
        let style = PlotStyle::default();
        crate::plot::write_fit_chart(&dir.join("fit.svg"), &run.training, &run.ideal, &run.best, &style)?;
        crate::plot::write_classification_chart(
            &dir.join("classification.svg"),
            &run.results,
            &run.ideal,
            &run.best,
            &style,
        )?;
        info!("Wrote charts to {}", dir.display());
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::write_results_csv(path, &run.results)?;
        info!("Exported results to {}", path.display());
    }
    if let Some(path) = &config.export_selection {
        crate::io::write_selection_json(path, &run.best)?;
        info!("Exported selection to {}", path.display());
    }

    Ok(())
}

fn handle_generate(args: &GenerateArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        seed: args.seed,
        rows: args.rows,
        test_rows: args.test_rows,
        noise: args.noise,
        outlier_prob: args.outlier_prob,
        ..SampleConfig::default()
    };
    let data = generate_dataset(&config)?;
    write_dataset(&args.out_dir, &data)?;

    println!(
        "Wrote train.csv, ideal.csv and test.csv to {} (hidden truths: {})",
        args.out_dir.display(),
        data.truths.join(", ")
    );
    Ok(())
}

fn handle_show(args: &ShowArgs) -> Result<(), AppError> {
    let store = open_existing(&args.db.db)?;
    let table = store.load_table(&args.table)?;
    print!("{}", crate::report::format_stored_table(&table, args.limit));
    Ok(())
}

fn handle_tables(args: &DbArgs) -> Result<(), AppError> {
    let store = open_existing(&args.db)?;
    for name in store.table_names()? {
        println!("{name}");
    }
    Ok(())
}

/// Read-only commands must not create an empty database as a side effect.
fn open_existing(path: &Path) -> Result<SqliteStore, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("Database '{}' does not exist.", path.display())));
    }
    Ok(SqliteStore::open(path)?)
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        train_path: args.train.clone(),
        ideal_path: args.ideal.clone(),
        test_path: args.test.clone(),
        db_path: (!args.no_store).then(|| args.db.db.clone()),
        plot: args.plot,
        plot_dir: args.plot_dir.clone(),
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_selection: args.export_selection.clone(),
    }
}
