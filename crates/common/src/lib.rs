//! Wire types, error kinds, and field validation shared across the SocialAid
//! registry crates.

pub mod error;
pub mod protocol;
pub mod validation;

pub use error::ErrorKind;
pub use validation::{FieldErrors, Validator};
