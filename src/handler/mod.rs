//! Request handler module
//!
//! Routes each request to its fragment endpoint and renders the HTML that
//! HTMX swaps into the page.

mod endpoints;
mod fragments;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
