//! # certboot-cli
//!
//! Command-line interface for the certboot bootstrap client.
//!
//! ## Features
//!
//! - **fetch**: capture a server's leaf certificate and summarize it
//! - **connect**: full bootstrap, liveness check and clean close
//! - **config**: inspect the persistent retry and output defaults
//! - **Output formats**: pretty tables or JSON

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
