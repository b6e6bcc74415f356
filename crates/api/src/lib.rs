//! HTTP API: bearer authentication, role guards and a demonstration router.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
