//! Display formatting for terminal output
//!
//! Provides utilities for formatting entries as tables and detail views.

pub mod entry;

pub use entry::{format_entry_details, format_entry_list};
