mod cleanup;
mod cli;
mod commands;
mod config;
mod error;
mod processing;
mod prompt;

use clap::Parser;
use rand::Rng;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::subscriber::set_global_default;
use tracing::{
    error,
    info,
    info_span,
    warn,
};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::EnvFilter;

use crate::cleanup::{
    install_interrupt_handler,
    CleanupRegistry,
};
use crate::cli::{
    Args,
    Commands,
};
use crate::commands::{
    main_sliding_window,
    main_statistics,
    main_write_template,
    RunContext,
    PROGRAM_NAME,
    PROGRAM_VERSION,
    REPORT_TARGET,
};
use crate::config::Config;
use crate::error::CliError;

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Console log on stderr plus an appending, uncoloured copy in
/// `<outdir>/fmrs.log`.
fn init_logging(outdir: &Path) -> Result<(), CliError> {
    let log_path = outdir.join(format!("{}.log", PROGRAM_NAME));
    let log_file = std::fs::create_dir_all(outdir)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&log_path))
        .map_err(|source| CliError::LogFile {
            path: log_path.clone(),
            source,
        })?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter_fn(|meta| meta.target() != REPORT_TARGET)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        );
    set_global_default(subscriber)
        .map_err(|e| CliError::Config(format!("setting default subscriber failed: {}", e)))
}

fn build_context(command: &Commands) -> Result<RunContext, CliError> {
    let mut config = Config::load(command.config().map(|p| p.as_path()))?
        .with_window(command.window())?
        .with_outdir(command.outdir());
    match command {
        Commands::SlidingWindow(args) => {
            config = config.with_tarquin(args.tarquin.as_ref());
        }
        Commands::Statistics(args) => {
            config = config.with_max_shift(args.max_shift)?;
        }
        Commands::WriteTemplate(_) => {}
    }
    let outdir = config.output_directory()?;
    Ok(RunContext {
        config,
        outdir,
        run_id: rand::thread_rng().gen_range(100..1000),
        cleanup: CleanupRegistry::default(),
    })
}

fn run(command: Commands, ctx: &RunContext) -> Result<(), CliError> {
    match command {
        Commands::SlidingWindow(args) => main_sliding_window(args, ctx),
        Commands::Statistics(args) => main_statistics(args, ctx),
        Commands::WriteTemplate(args) => main_write_template(args),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let Some(command) = args.command else {
        eprintln!("No command provided, see `{} --help`", PROGRAM_NAME);
        return ExitCode::from(2);
    };

    let ctx = match build_context(&command) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };
    if let Err(e) = init_logging(&ctx.outdir) {
        eprintln!("ERROR: {}", e);
        return ExitCode::from(e.exit_code());
    }

    let span = info_span!("run", id = ctx.run_id);
    let _guard = span.enter();
    if let Err(e) = install_interrupt_handler(ctx.cleanup.clone()) {
        warn!("Unable to install the interrupt handler: {}", e);
    }
    info!(
        "{} {} started, output directory {}",
        PROGRAM_NAME,
        PROGRAM_VERSION,
        ctx.outdir.display()
    );
    match run(command, &ctx) {
        Ok(()) => {
            info!("{} finished", PROGRAM_NAME);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
