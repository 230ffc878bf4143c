//! `select`: compute a selection the way a tree screen would.

use serde::Serialize;
use tabled::Tabled;

use adminkit_core::EngineConfig;

use crate::cli::{GlobalOpts, SelectArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize, Tabled)]
struct SelectedRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn handle(
    args: SelectArgs,
    global: &GlobalOpts,
    mut config: EngineConfig,
) -> Result<(), CliError> {
    if config.selection_disabled {
        return Err(CliError::Validation {
            field: "screen".into(),
            reason: format!("selection is disabled for screen '{}'", global.screen),
        });
    }
    if args.propagate {
        config.propagate_to_ancestors = true;
    }
    let screen = super::open_screen(global, super::whole_collection(config), true)?;
    super::load(&screen).await?;

    if args.all {
        screen.select_all();
    } else {
        let ids = util::unique_ids(args.ids);
        util::require_known(&screen, &ids)?;
        screen.toggle_selection(ids);
    }

    let rows: Vec<SelectedRow> = screen
        .selected()
        .iter()
        .map(|id| SelectedRow {
            id: id.to_string(),
            name: util::name_of(&screen, id),
        })
        .collect();

    let out = output::render_list(
        global.output,
        &rows,
        |r| SelectedRow {
            id: r.id.clone(),
            name: r.name.clone(),
        },
        |r| r.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
