//! Sheetcount front ends.
//!
//! The HTTP surface lives here so the binary and the integration tests build
//! the exact same router.

pub mod web;
