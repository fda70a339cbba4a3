use clap::ValueEnum;
use reorgify_core::{ConflictPolicy, MigrateAction, MigrateMode, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Summary,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Summary => Self::Summary,
            OutputFormatArg::Json => Self::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConflictArg {
    /// Rename files, merge directories
    Auto,
    Skip,
    Overwrite,
    Rename,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Auto => Self::Auto,
            ConflictArg::Skip => Self::Skip,
            ConflictArg::Overwrite => Self::Overwrite,
            ConflictArg::Rename => Self::Rename,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MigrateModeArg {
    /// Keep each source's directory structure under the target
    Preserve,
    /// Immediate child files only, flattened into the target
    Flat,
    /// Each source moves as one unit, like mv
    Direct,
}

impl From<MigrateModeArg> for MigrateMode {
    fn from(arg: MigrateModeArg) -> Self {
        match arg {
            MigrateModeArg::Preserve => Self::Preserve,
            MigrateModeArg::Flat => Self::Flat,
            MigrateModeArg::Direct => Self::Direct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    Move,
    Copy,
}

impl From<ActionArg> for MigrateAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Move => Self::Move,
            ActionArg::Copy => Self::Copy,
        }
    }
}
