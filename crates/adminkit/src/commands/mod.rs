//! Command dispatch: bridges CLI args -> screen engine -> output formatting.

pub mod config_cmd;
pub mod delete;
pub mod list;
pub mod records;
pub mod select;
pub mod tree;
pub mod util;

use std::sync::Arc;

use adminkit_config::{Config, load_config, load_config_from};
use adminkit_core::{EngineConfig, LoadStatus, Notifier, Orchestrator};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output::TermNotifier;
use crate::service::JsonFileService;

/// The engine specialised to the JSON data file.
pub type Screen = Orchestrator<JsonFileService>;

/// Dispatch a data-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let config = load_settings(global)?.screen_config(&global.screen)?;
    tracing::debug!(screen = %global.screen, item_type = %config.item_type, "screen configured");

    match cmd {
        Command::List(args) => list::handle(args, global, config).await,
        Command::Tree(args) => tree::handle(args, global, config).await,
        Command::Create(args) => records::create(args, global, config).await,
        Command::Update(args) => records::update(args, global, config).await,
        Command::Delete(args) => delete::handle(args, global, config).await,
        Command::Select(args) => select::handle(args, global, config).await,
        // Config and Completions are handled before dispatch
        Command::Config | Command::Completions(_) => unreachable!(),
    }
}

/// Load the config file named by `--config`, or the platform default.
pub fn load_settings(global: &GlobalOpts) -> Result<Config, CliError> {
    let config = match &global.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Build a screen over the `--data` file.
///
/// Hierarchical screens list with children and prune vanished ids from
/// the selection on every load.
pub fn open_screen(
    global: &GlobalOpts,
    config: EngineConfig,
    hierarchical: bool,
) -> Result<Screen, CliError> {
    let path = global.data.clone().ok_or(CliError::NoData)?;
    let service = JsonFileService::new(path);
    let notifier: Arc<dyn Notifier> = Arc::new(TermNotifier::new(global.quiet, global.color));
    Ok(if hierarchical {
        Orchestrator::new_tree(service, notifier, config)
    } else {
        Orchestrator::new(service, notifier, config)
    })
}

/// Screen config that fetches every root in a single page.
pub fn whole_collection(config: EngineConfig) -> EngineConfig {
    EngineConfig {
        page_size: u32::MAX,
        ..config
    }
}

/// Run the initial load and wait for any follow-up reloads.
pub async fn load(screen: &Screen) -> Result<(), CliError> {
    screen.load().await;
    ensure_loaded(screen).await
}

/// Wait for pending reloads, then surface a failed load as an error.
pub async fn ensure_loaded(screen: &Screen) -> Result<(), CliError> {
    screen.settled().await;
    match screen.status() {
        LoadStatus::Failed(message) => Err(CliError::LoadFailed { message }),
        _ => Ok(()),
    }
}
