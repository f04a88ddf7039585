//! CLI definitions and entry point

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use super::commands;
use vigil::config::RunOverrides;
use vigil::output::OutputMode;

/// Exit code when configuration or usage is wrong
pub const EXIT_USAGE: u8 = 2;

/// vigil - Infrastructure validation with priority-gated alerting
#[derive(Parser, Debug)]
#[command(
    name = "vigil",
    version,
    about = "Infrastructure validation with priority-gated alerting",
    long_about = "Run black-box checks against live infrastructure and publish the results.\n\n\
                  Validations run in ordered tiers, optionally in parallel worker processes.\n\
                  Publishers notify only about results at or above their priority threshold."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run validations and publish the results
    Run(RunArgs),

    /// Show which publishers would notify on which validations
    DryRun {
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Environment to target
        #[arg(short, long)]
        environment: Option<String>,
    },

    /// List configured validations and publishers
    List {
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Environment to target
        #[arg(short, long)]
        environment: Option<String>,
    },

    /// Perform one validation in isolation (used by parallel runs)
    #[command(hide = true)]
    Worker {
        /// Configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Environment to target
        #[arg(short, long)]
        environment: Option<String>,

        /// Request file written by the coordinator
        #[arg(long)]
        request: PathBuf,
    },

    /// Show version
    Version,
}

/// Arguments of `vigil run`
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only show which publishers would notify on which validations
    #[arg(long)]
    pub dry_run: bool,

    /// Attempts in flight at once (1 runs sequentially)
    #[arg(short, long)]
    pub processes: Option<usize>,

    /// Per-attempt timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<f64>,

    /// Total attempts before a timing-out validation fails
    #[arg(long)]
    pub timeout_attempts: Option<u32>,

    /// Environment to target
    #[arg(short, long)]
    pub environment: Option<String>,
}

impl RunArgs {
    /// Overrides of the `[run]` table
    #[must_use]
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            processes: self.processes,
            timeout: self.timeout,
            timeout_attempts: self.timeout_attempts,
            environment: self.environment.clone(),
        }
    }
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let outcome = match cli.command {
        Some(Command::Run(args)) => commands::run(&args, output_mode),
        Some(Command::DryRun { config, environment }) => {
            let args = RunArgs {
                config,
                dry_run: true,
                environment,
                ..RunArgs::default()
            };
            commands::run(&args, output_mode)
        },
        Some(Command::List { config, environment }) => {
            commands::list(config.as_deref(), environment, output_mode)
        },
        Some(Command::Worker {
            config,
            environment,
            request,
        }) => commands::worker(&config, environment, &request),
        Some(Command::Version) => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION")
                    })
                );
            } else {
                println!("vigil v{}", env!("CARGO_PKG_VERSION"));
            }
            Ok(ExitCode::SUCCESS)
        },
        None => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "hint": "Use --help for usage"
                    })
                );
            } else {
                println!("vigil v{}", env!("CARGO_PKG_VERSION"));
                println!("\nRun 'vigil --help' for usage");
                println!("Run 'vigil dry-run' to see what would be published");
            }
            Ok(ExitCode::SUCCESS)
        },
    };

    outcome.unwrap_or_else(|err| {
        log::debug!("{err:?}");
        eprintln!("error: {err:#}");
        ExitCode::from(EXIT_USAGE)
    })
}
