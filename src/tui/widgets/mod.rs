//! TUI widgets for the NEO dashboard.
//!
//! Contains reusable UI components.

pub mod chart;
pub mod filters;
pub mod header;
pub mod help;
pub mod metrics;
pub mod sidebar;
pub mod table;
