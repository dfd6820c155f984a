//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `artifacts` - Stored artifact download and deletion
//! - `speak` - Whole-text synthesis
//! - `splice` - Placeholder splicing into an uploaded recording

pub mod api;
pub mod artifacts;
pub mod speak;
pub mod splice;
