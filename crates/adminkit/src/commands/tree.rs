//! `tree`: indented view of every record, honoring expand state.

use serde::Serialize;
use tabled::Tabled;

use adminkit_core::{EngineConfig, ItemId, Record, ScreenState};

use crate::cli::{GlobalOpts, TreeArgs};
use crate::error::CliError;
use crate::output;
use crate::service::JsonRecord;

use super::util;

#[derive(Debug, Serialize)]
struct TreeLine {
    id: String,
    name: String,
    depth: usize,
    has_children: bool,
    expanded: bool,
}

#[derive(Tabled)]
struct TreeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&TreeLine> for TreeRow {
    fn from(line: &TreeLine) -> Self {
        let marker = match (line.has_children, line.expanded) {
            (true, true) => "▾",
            (true, false) => "▸",
            (false, _) => "•",
        };
        Self {
            name: format!("{}{marker} {}", "  ".repeat(line.depth), line.name),
            id: line.id.clone(),
        }
    }
}

pub async fn handle(
    args: TreeArgs,
    global: &GlobalOpts,
    mut config: EngineConfig,
) -> Result<(), CliError> {
    if args.collapse_all {
        config.tree_expanded = false;
    } else if args.expand_all {
        config.tree_expanded = true;
    }
    let screen = super::open_screen(global, super::whole_collection(config), true)?;
    super::load(&screen).await?;

    if let Some(term) = args.search {
        screen.commit_search_now(term);
        super::ensure_loaded(&screen).await?;
    }

    let collapse = util::unique_ids(args.collapse);
    util::require_known(&screen, &collapse)?;
    for id in &collapse {
        if screen.snapshot().tree.is_expanded(id) {
            screen.toggle_expanded(id);
        }
    }

    let state = screen.snapshot();
    let lines: Vec<TreeLine> = state
        .visible_rows()
        .into_iter()
        .map(|row| TreeLine {
            name: name_in(&state, &row.id),
            id: row.id.to_string(),
            depth: row.depth,
            has_children: row.has_children,
            expanded: row.expanded,
        })
        .collect();

    let out = output::render_list(
        global.output,
        &lines,
        |l| TreeRow::from(l),
        |l| l.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn name_in(state: &ScreenState<JsonRecord>, id: &ItemId) -> String {
    state
        .find(id)
        .map_or_else(|| id.to_string(), Record::display_name)
}
