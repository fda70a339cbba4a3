use anyhow::Result;
use reorgify_core::{history_operation, HistoryRequest, Journal, OutputFormat, OutputFormatter};

use crate::dissolve::ensure_newline;

pub fn handle_history(limit: usize, output: OutputFormat, journal: &Journal) -> Result<i32> {
    let result = history_operation(&HistoryRequest { limit }, journal)?;
    print!("{}", ensure_newline(&result.format(output)));
    Ok(0)
}
