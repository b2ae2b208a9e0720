use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxq::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxq::AppCommand {
    fn from(cmd: Commands) -> fxq::AppCommand {
        match cmd {
            Commands::Ask { queries, trace } => fxq::AppCommand::Ask {
                queries,
                show_trace: trace,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Answer one or more conversion questions, e.g. "convert 100 usd to eur"
    Ask {
        #[arg(required = true)]
        queries: Vec<String>,

        /// Print how each query was parsed and resolved
        #[arg(long)]
        trace: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxq::cli::setup::setup(),
        Some(cmd) => fxq::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
