//! Shared types

pub mod error;

pub use error::{FieldErrors, IdeagramError, Result};
