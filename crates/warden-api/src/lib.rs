//! Boundary types for warden
//!
//! This crate defines the stable surface between the duty core and whatever
//! request-handling layer sits in front of it (HTTP or otherwise):
//! - Duty views for serialization
//! - Structured fault codes the boundary maps to transport failures
//! - Versioning

mod types;

pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
