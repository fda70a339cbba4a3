use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write;
use std::path::PathBuf;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String;
    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

/// Result of a dissolve operation
#[derive(Debug, Serialize, Deserialize)]
pub struct DissolveResult {
    pub success: bool,
    pub message: String,
    pub nested_count: usize,
    pub media_count: usize,
    pub archive_count: usize,
    pub direct_files: usize,
    pub direct_dirs: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    pub preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

impl DissolveResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            nested_count: 0,
            media_count: 0,
            archive_count: 0,
            direct_files: 0,
            direct_dirs: 0,
            skipped_count: 0,
            error_count: 0,
            preview: false,
            operation_id: None,
        }
    }
}

impl OutputFormatter for DissolveResult {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }

    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.success,
            "operation": "dissolve",
            "message": self.message,
            "preview": self.preview,
            "summary": {
                "nested_count": self.nested_count,
                "media_count": self.media_count,
                "archive_count": self.archive_count,
                "direct_files": self.direct_files,
                "direct_dirs": self.direct_dirs,
                "skipped_count": self.skipped_count,
                "error_count": self.error_count,
            },
            "operation_id": self.operation_id,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        writeln!(output, "{}", self.message).unwrap();
        if self.skipped_count > 0 {
            writeln!(output, "Skipped: {}", self.skipped_count).unwrap();
        }
        if self.error_count > 0 {
            writeln!(output, "Errors: {}", self.error_count).unwrap();
        }
        if let Some(ref id) = self.operation_id {
            writeln!(output, "Undo with: reorgify undo {}", id).unwrap();
        }
        output
    }
}

/// Result of a migrate operation
#[derive(Debug, Serialize, Deserialize)]
pub struct MigrateResult {
    pub success: bool,
    pub message: String,
    pub migrated_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    pub total_count: usize,
    pub preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

impl MigrateResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            migrated_count: 0,
            skipped_count: 0,
            error_count: 0,
            total_count: 0,
            preview: false,
            operation_id: None,
        }
    }
}

impl OutputFormatter for MigrateResult {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }

    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.success,
            "operation": "migrate",
            "message": self.message,
            "preview": self.preview,
            "summary": {
                "migrated_count": self.migrated_count,
                "skipped_count": self.skipped_count,
                "error_count": self.error_count,
                "total_count": self.total_count,
            },
            "operation_id": self.operation_id,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        writeln!(output, "{}", self.message).unwrap();
        if let Some(ref id) = self.operation_id {
            writeln!(output, "Undo with: reorgify undo {}", id).unwrap();
        }
        output
    }
}

/// Result of a batch-rename operation
#[derive(Debug, Serialize, Deserialize)]
pub struct RenameResult {
    pub success: bool,
    pub message: String,
    pub total_items: usize,
    pub renamed_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    pub preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

impl RenameResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            total_items: 0,
            renamed_count: 0,
            failed_count: 0,
            skipped_count: 0,
            preview: false,
            operation_id: None,
        }
    }
}

impl OutputFormatter for RenameResult {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }

    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.success,
            "operation": "rename",
            "message": self.message,
            "preview": self.preview,
            "summary": {
                "total_items": self.total_items,
                "renamed_count": self.renamed_count,
                "failed_count": self.failed_count,
                "skipped_count": self.skipped_count,
            },
            "operation_id": self.operation_id,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        writeln!(output, "{}", self.message).unwrap();
        if let Some(ref id) = self.operation_id {
            writeln!(output, "Undo with: reorgify undo {}", id).unwrap();
        }
        output
    }
}

/// Result of an undo operation
#[derive(Debug, Serialize, Deserialize)]
pub struct UndoResult {
    pub success: bool,
    pub message: String,
    pub batch_id: String,
    pub success_count: usize,
    pub failed_count: usize,
}

impl OutputFormatter for UndoResult {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }

    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.success,
            "operation": "undo",
            "message": self.message,
            "batch_id": self.batch_id,
            "summary": {
                "success_count": self.success_count,
                "failed_count": self.failed_count,
            },
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        writeln!(output, "{}", self.message).unwrap();
        writeln!(
            output,
            "Reverted {} operations, {} failed",
            self.success_count, self.failed_count
        )
        .unwrap();
        output
    }
}

/// One row of the journal listing
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: String,
    pub mode: String,
    pub path: PathBuf,
    pub count: usize,
}

/// Result of a history operation
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResult {
    pub entries: Vec<HistoryItem>,
}

impl OutputFormatter for HistoryResult {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }

    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "history",
            "entries": self.entries,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        if self.entries.is_empty() {
            return "No batches in the journal\n".to_string();
        }

        use comfy_table::{Cell, Color, Table};

        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Date").fg(Color::Cyan),
            Cell::new("Mode").fg(Color::Cyan),
            Cell::new("Path").fg(Color::Cyan),
            Cell::new("Ops").fg(Color::Cyan),
        ]);

        for entry in &self.entries {
            let date = entry
                .timestamp
                .split('T')
                .next()
                .unwrap_or(&entry.timestamp);
            table.add_row(vec![
                entry.id.clone(),
                date.to_string(),
                entry.mode.clone(),
                entry.path.display().to_string(),
                entry.count.to_string(),
            ]);
        }

        table.to_string()
    }
}
