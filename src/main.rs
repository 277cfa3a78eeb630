#[cfg(not(feature = "cli"))]
compile_error!("The `nbu` binary requires the `cli` feature. Build with `--features cli`.");

use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::process;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nbu::cli;
use nbu::cli::app::{Cli, ColorMode, Commands};
use nbu::NbuError;

/// Environment variable that overrides the `-v` derived log filter.
const LOG_ENV: &str = "NBU_LOG";

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "nbu=warn",
        1 => "nbu=info",
        2 => "nbu=debug",
        _ => "nbu=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {} // colored auto-detects tty
    }

    let writer_result: Result<Box<dyn Write>, NbuError> = match &cli.output {
        Some(path) => File::create(path)
            .map(|f| Box::new(f) as Box<dyn Write>)
            .map_err(|e| NbuError::Io(format!("Cannot create {}: {}", path, e))),
        None => Ok(Box::new(std::io::stdout()) as Box<dyn Write>),
    };

    let mut writer = match writer_result {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Info { file, json } => {
            cli::info::execute(&cli::info::InfoOptions { file, json }, &mut writer)
        }

        Commands::List {
            file,
            category,
            json,
        } => cli::list::execute(
            &cli::list::ListOptions {
                file,
                category,
                json,
            },
            &mut writer,
        ),

        Commands::Dump {
            file,
            category,
            index,
            folder,
            raw,
        } => cli::dump::execute(
            &cli::dump::DumpOptions {
                file,
                category,
                index,
                folder,
                raw,
            },
            &mut writer,
        ),

        Commands::Export { file, dir } => {
            cli::export::execute(&cli::export::ExportOptions { file, dir }, &mut writer)
        }

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "nbu", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
