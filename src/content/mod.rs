//! Content module - post models and the content service wire format

mod post;
pub mod query;

pub use post::{parse_timestamp, Category, Post, SlugIndex};
