//! NEO Tracker - a terminal dashboard for NASA near-Earth object close approaches.
//!
//! This library exposes the core modules for use by the binary and integration tests.

pub mod catalog;
pub mod chart;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod filter;
pub mod logging;
pub mod query;
pub mod safety;
pub mod secrets;
pub mod tui;
