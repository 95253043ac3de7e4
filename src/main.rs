//! fsqca CLI - Command-line interface
//!
//! Commands:
//!   check        - Validate a config (and optionally a data file against it)
//!   schema       - Print JSON schemas for the config and reports
//!   calibrate    - Write calibrated memberships as CSV
//!   necessity    - Analysis of necessary conditions
//!   truth-table  - Build and print the truth table
//!   solve        - Full run: truth table and minimized solution

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "fsqca")]
#[command(bin_name = "fsqca")]
#[command(version, about = "Fuzzy-set Qualitative Comparative Analysis", long_about = None)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a config, and a data file against it when given
    Check {
        config: PathBuf,

        #[arg(short, long)]
        data: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Print a JSON schema: config (default), necessity, truth-table, solution
    Schema { name: Option<String> },

    /// Calibrate raw scores into fuzzy memberships (CSV)
    Calibrate {
        config: PathBuf,
        data: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Necessity and single-condition sufficiency fit
    Necessity {
        config: PathBuf,
        data: PathBuf,

        #[arg(long)]
        json: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the truth table
    TruthTable {
        config: PathBuf,
        data: PathBuf,

        #[arg(long)]
        json: bool,

        /// Also list remainder rows without cases
        #[arg(long)]
        all: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Minimize the truth table into a solution
    Solve {
        config: PathBuf,
        data: PathBuf,

        #[arg(long)]
        json: bool,

        /// Also list remainder rows without cases in the written truth table
        #[arg(long)]
        all: bool,

        /// Use remainders as don't-cares regardless of the config
        #[arg(long)]
        parsimonious: bool,

        /// Write every artifact into this directory instead of printing the solution
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = Cli::parse();
    cli::util::init_logging(args.verbose);

    let result = match args.command {
        Command::Check { config, data, json } => cli::cmd_check(&config, data.as_deref(), json),
        Command::Schema { name } => cli::cmd_schema(name.as_deref()),
        Command::Calibrate {
            config,
            data,
            output,
        } => cli::cmd_calibrate(&config, &data, output.as_deref()),
        Command::Necessity {
            config,
            data,
            json,
            output,
        } => cli::cmd_necessity(&config, &data, json, output.as_deref()),
        Command::TruthTable {
            config,
            data,
            json,
            all,
            output,
        } => cli::cmd_truth_table(&config, &data, json, all, output.as_deref()),
        Command::Solve {
            config,
            data,
            json,
            all,
            parsimonious,
            output_dir,
        } => cli::cmd_solve(
            &config,
            &data,
            cli::SolveOptions {
                json,
                all,
                parsimonious,
                output_dir,
            },
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
