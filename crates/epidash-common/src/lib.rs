//! epidash-common: Shared error taxonomy used across all epidash crates.

pub mod error;

pub use error::{EpidashError, Result};
