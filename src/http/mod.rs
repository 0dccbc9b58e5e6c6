//! HTTP protocol layer module
//!
//! Request body decoding and response builders, decoupled from the
//! fragment handlers that use them.

pub mod form;
pub mod response;

// Re-export commonly used types
pub use form::FormData;
pub use response::{
    build_404_response, build_405_response, build_413_response, build_health_response,
    build_html_response, build_html_with_status, build_options_response, build_text_response,
    HttpResponse,
};
