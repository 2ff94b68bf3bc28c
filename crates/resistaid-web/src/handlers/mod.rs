//! HTTP handlers for all API routes.

pub mod analyze;
pub mod catalog;
pub mod results;
pub mod system;
