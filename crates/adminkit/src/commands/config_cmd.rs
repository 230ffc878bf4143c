//! `config`: show the effective settings for the selected screen.

use serde::Serialize;

use adminkit_config::{ScreenSettings, config_path};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct EffectiveConfig {
    path: String,
    screen: String,
    settings: ScreenSettings,
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_settings(global)?;
    // Validate the same way a data command would.
    config.screen_config(&global.screen)?;

    let effective = EffectiveConfig {
        path: global
            .config
            .clone()
            .unwrap_or_else(config_path)
            .display()
            .to_string(),
        screen: global.screen.clone(),
        settings: config.screen_settings(&global.screen),
    };

    let out = output::render_single(
        global.output,
        &effective,
        |e| {
            let body = toml::to_string_pretty(&e.settings)
                .unwrap_or_else(|err| format!("# could not render settings: {err}\n"));
            format!("# {}\n# screen: {}\n{body}", e.path, e.screen)
        },
        |e| e.screen.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
