//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `test_call` - Outbound test call initiation

pub mod api;
pub mod test_call;

pub use test_call::{initiate_test_call, test_call_preflight};
