//! The volley controller: everything between the CLI and the dispatch engine
//!
//! This crate provides:
//! - Configuration discovery and parsing for the `volley` binary
//! - Campaign file import (validated addresses, seeded store)
//! - The controller wiring store, renderer, transport, and engine together,
//!   with graceful shutdown at batch boundaries

pub mod config;
pub mod controller;
pub mod import;

pub use config::{TransportChoice, VolleyConfig};
pub use controller::{Controller, SHUTDOWN_BROADCAST};
pub use import::ImportError;
