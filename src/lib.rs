//! Dashboard authentication core
//!
//! Credential verification, signed session tokens carried in a cookie,
//! session materialization and per-request route authorization for the
//! dashboard web application.

pub mod app;
pub mod core;
