//! Query execution for NEO Tracker.
//!
//! Connections are opened per query through a [`ConnectionFactory`] and the
//! [`QueryRunner`] guarantees they are closed again whatever the outcome.

mod runner;

pub use runner::{ConnectionFactory, QueryRunner};
