//! Domain module
//!
//! The computations behind each fragment endpoint, free of any HTTP types:
//! BMI classification, user search, email validation, profile storage and
//! the drifting price.

pub mod bmi;
pub mod directory;
pub mod email;
pub mod price;
pub mod profile;

pub use bmi::{classify, Reading};
pub use directory::{DirectoryError, User, UserDirectory};
pub use email::is_valid_email;
pub use price::PriceTicker;
pub use profile::{Profile, ProfileStore};
