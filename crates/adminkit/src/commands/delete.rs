//! `delete`: single or batch delete through the confirmation gate.

use tabled::Tabled;

use adminkit_core::{EngineConfig, ExecuteOutcome};

use crate::cli::{DeleteArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

pub async fn handle(
    args: DeleteArgs,
    global: &GlobalOpts,
    config: EngineConfig,
) -> Result<(), CliError> {
    let screen = super::open_screen(global, super::whole_collection(config), true)?;
    super::load(&screen).await?;

    let ids = util::unique_ids(args.ids);
    util::require_known(&screen, &ids)?;

    let single = match ids.as_slice() {
        [only] => screen.snapshot().find(only).cloned(),
        _ => None,
    };
    match single {
        Some(item) => screen.delete(&item)?,
        None => screen.delete_selected(ids)?,
    }

    let Some(prompt) = screen.gate().prompt() else {
        return Err(CliError::ActionFailed {
            action: "Delete".into(),
        });
    };
    let message = format!("{} {}", prompt.title, prompt.description);
    if !util::confirm("delete", &message, global.yes)? {
        screen.cancel();
        output::print_output("Cancelled.", global.quiet);
        return Ok(());
    }

    match screen.confirm().await {
        ExecuteOutcome::Succeeded => Ok(()),
        ExecuteOutcome::Failed => match screen.snapshot().last_batch {
            Some(report) => {
                let failures: Vec<FailureRow> = report
                    .failed()
                    .map(|(id, reason)| FailureRow {
                        id: id.to_string(),
                        reason: reason.to_owned(),
                    })
                    .collect();
                let table = tabled::Table::new(&failures)
                    .with(tabled::settings::Style::rounded())
                    .to_string();
                output::print_output(&table, global.quiet);
                let failed = report.failed_count();
                let total = report.total();
                Err(CliError::PartialFailure {
                    succeeded: total - failed,
                    failed,
                    total,
                })
            }
            None => Err(CliError::ActionFailed {
                action: "Delete".into(),
            }),
        },
        ExecuteOutcome::Ignored => Err(CliError::Busy),
    }
}
