//! Shared helpers for providers

pub mod debug;
pub mod http;
