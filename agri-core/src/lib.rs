//! Agri Core - Fundamental types
//!
//! This crate provides the core types shared by every Agri crate:
//! - `Value`: Runtime values (numbers, text, records, errors)
//! - `AgriError`: Structured errors with codes and suggestions

mod value;
mod error;

pub use value::Value;
pub use error::{AgriError, ErrorContext, Severity, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Value, AgriError, Severity};
    pub use crate::error::codes;
}
