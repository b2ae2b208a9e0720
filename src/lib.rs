pub mod cli;
pub mod core;
pub mod engine;
pub mod format;
pub mod parser;
pub mod providers;
pub mod tool;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

pub use engine::{ConversionEngine, ConversionResult};
pub use parser::{ParsedIntent, QueryParser};
pub use tool::{CurrencyTool, ToolOutcome, ToolReply};

pub enum AppCommand {
    Ask {
        queries: Vec<String>,
        show_trace: bool,
    },
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxq starting...");
    let config = load_config(config_path)?;
    let tool = CurrencyTool::from_config(&config);

    match command {
        AppCommand::Ask {
            queries,
            show_trace,
        } => cli::ask::run(&tool, &queries, show_trace).await,
    }
}
