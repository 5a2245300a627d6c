//! HTTP server for Refuge

pub mod http;

pub use http::{run, AppState};
