//! HTTP request handlers.

pub mod liveness;
