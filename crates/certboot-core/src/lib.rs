//! Core types and errors for certificate bootstrapping.
//!
//! This crate provides the foundational types shared by the bootstrap client:
//!
//! - **Types**: [`Address`] targets and the [`TrustedCertificate`] captured
//!   from a raw handshake
//! - **Errors**: Phase-aware error handling with [`BootstrapError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use certboot_core::{Address, Result};
//!
//! fn target() -> Result<String> {
//!     let address = Address::new("svc.internal", "443")?;
//!     Ok(address.to_string())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/certboot-core/0.1.0")]

mod error;
pub mod types;

pub use error::{BootstrapError, Phase, Result};
pub use types::*;
