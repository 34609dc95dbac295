//! Terminal display utilities for the CLI.
//!
//! Provides styled tables and a shared color theme.

pub mod tables;
pub mod theme;

pub use tables::{
    TableBuilder, create_hierarchy_table, create_members_table, create_summary_table,
};
pub use theme::{THEME, Theme};
