//! Common utilities module
//!
//! This module contains the error type shared across the gap-fill modules.

pub mod error;

pub use error::{GapFillError, Result};
