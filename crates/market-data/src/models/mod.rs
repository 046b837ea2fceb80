//! Market data models
//!
//! - `quote` - The ephemeral quote sample produced by one adapter call

mod quote;

pub use quote::QuoteSample;
