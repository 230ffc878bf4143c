//! `list`: one page of top-level records.

use serde_json::Value;
use tabled::Tabled;

use adminkit_core::{EngineConfig, Record};

use crate::cli::{GlobalOpts, ListArgs, OutputFormat};
use crate::error::CliError;
use crate::output;
use crate::service::JsonRecord;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Children")]
    children: usize,
    #[tabled(rename = "Fields")]
    fields: String,
}

impl From<&JsonRecord> for RecordRow {
    fn from(r: &JsonRecord) -> Self {
        let fields = r
            .fields
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{k}={s}"),
                other => format!("{k}={other}"),
            })
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            id: r.id.to_string(),
            name: r.display_name(),
            children: r.children.len(),
            fields: output::truncate(&fields, 48),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: ListArgs,
    global: &GlobalOpts,
    config: EngineConfig,
) -> Result<(), CliError> {
    let screen = super::open_screen(global, config, false)?;
    super::load(&screen).await?;

    if let Some(page_size) = args.page_size {
        screen.change_page_size(page_size)?;
    }
    if let Some(term) = args.search {
        screen.commit_search_now(term);
    }
    super::ensure_loaded(&screen).await?;

    if let Some(page) = args.page {
        screen.change_page(page)?;
        super::ensure_loaded(&screen).await?;
    }

    let items = screen.items();
    let out = output::render_list(
        global.output,
        items.as_slice(),
        |r| RecordRow::from(r),
        |r| r.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);

    if global.output == OutputFormat::Table {
        let page = screen.pagination().page_state();
        output::print_output(
            &format!(
                "Page {} of {} ({} {})",
                page.page,
                page.last_page(),
                page.items_count,
                plural(&screen.config().item_type, page.items_count),
            ),
            global.quiet,
        );
    }
    Ok(())
}

fn plural(item_type: &str, count: u64) -> String {
    if count == 1 {
        item_type.to_owned()
    } else {
        format!("{item_type}s")
    }
}
