//! CLI subcommand implementations.

pub mod commit;
pub mod sections;
pub mod status;
pub mod verify;

mod walk;
