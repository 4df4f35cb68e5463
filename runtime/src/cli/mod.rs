//! CLI subcommand implementations for the pagesift binary.

pub mod doctor;
pub mod run_cmd;
