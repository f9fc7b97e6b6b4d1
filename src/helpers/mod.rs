//! Helper functions for templates and rendering
//!
//! URL generation, date formatting, HTML utilities and markup sanitization.

mod date;
mod html;
mod sanitize;
mod url;

pub use date::*;
pub use html::*;
pub use sanitize::Sanitizer;
pub use url::*;
