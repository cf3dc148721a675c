//! Replays a JSON form fixture through the validation engine and prints
//! the resulting field states.

mod error;
mod fixture;
mod replay;
mod report;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, error};
use simplelog::{Config, WriteLogger};

use crate::error::CliError;
use crate::fixture::Fixture;

#[derive(Parser)]
#[command(name = "formguard")]
#[command(about = "Replay form events against the validation engine", long_about = None)]
struct Args {
    /// Path to a JSON fixture
    fixture: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Exit with a failure status when any field ends invalid
    #[arg(long)]
    fail_on_invalid: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<(), CliError> {
    let level = level(verbose);
    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => WriteLogger::init(level, Config::default(), std::io::stderr())?,
    }
    Ok(())
}

async fn run(args: &Args) -> Result<ExitCode, CliError> {
    let fixture = Fixture::load(&args.fixture)?;
    let report = replay::replay(&fixture).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }

    if args.fail_on_invalid && !report.all_valid() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = init_logging(args.verbose, args.log_file.as_deref()) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    match run(&args).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
