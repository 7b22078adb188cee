//! Agri Plugin System
//!
//! Every public calculation is exposed as a named function plugin so callers
//! can discover, document and invoke it uniformly.

mod traits;
mod registry;
pub mod helpers;

pub use traits::{FunctionPlugin, FunctionMeta, ArgMeta};
pub use registry::PluginRegistry;

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{FunctionPlugin, FunctionMeta, ArgMeta, PluginRegistry};
    pub use crate::helpers::{
        require_args, extract_number, extract_text, extract_object, extract_optional_text,
    };
    pub use agri_core::prelude::*;
}
