//! Headless-mode tests.

pub mod headless_test;
