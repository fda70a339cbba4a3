use anyhow::Result;
use reorgify_core::{undo_operation, Journal, OutputFormat, OutputFormatter, UndoRequest};

use crate::dissolve::ensure_newline;
use crate::sinks::ConsoleSink;

pub fn handle_undo(
    id: Option<&str>,
    output: OutputFormat,
    quiet: bool,
    journal: &Journal,
) -> Result<i32> {
    let req = UndoRequest {
        batch_id: match id {
            None | Some("latest") => None,
            Some(id) => Some(id.to_string()),
        },
    };

    let sink = ConsoleSink::new(quiet);
    let result = undo_operation(&req, journal, &sink)?;
    print!("{}", ensure_newline(&result.format(output)));
    Ok(i32::from(!result.success))
}
