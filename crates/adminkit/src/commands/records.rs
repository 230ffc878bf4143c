//! `create` / `update`: single-record mutations through the screen.

use adminkit_core::{EngineConfig, ItemId, Record};

use crate::cli::{CreateArgs, GlobalOpts, UpdateArgs};
use crate::error::CliError;
use crate::output;
use crate::service::JsonRecord;

use super::util;

fn detail(r: &JsonRecord) -> String {
    let mut lines = vec![
        format!("ID:       {}", r.id),
        format!("Name:     {}", r.display_name()),
    ];
    if !r.children.is_empty() {
        lines.push(format!("Children: {}", r.children.len()));
    }
    for (key, value) in &r.fields {
        let shown = value
            .as_str()
            .map_or_else(|| value.to_string(), str::to_owned);
        lines.push(format!("  {key}: {shown}"));
    }
    lines.join("\n")
}

pub async fn create(
    args: CreateArgs,
    global: &GlobalOpts,
    config: EngineConfig,
) -> Result<(), CliError> {
    let data = util::parse_object(&args.json)?;
    let screen = super::open_screen(global, config, false)?;

    screen.open_create();
    let record = screen.create(data).await?;

    let out = output::render_single(global.output, &record, detail, |r| r.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn update(
    args: UpdateArgs,
    global: &GlobalOpts,
    config: EngineConfig,
) -> Result<(), CliError> {
    let patch = util::parse_object(&args.json)?;
    let screen = super::open_screen(global, config, false)?;
    let id = ItemId::from(args.id);

    screen.open_edit(id.clone());
    let record = screen.update(&id, patch).await?;

    let out = output::render_single(global.output, &record, detail, |r| r.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
