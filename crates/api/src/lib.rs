//! HTTP API: configuration, router, and request/response mapping.

pub mod app;
pub mod config;
