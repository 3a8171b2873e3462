//! CLI subcommand implementations.

pub mod discount;
