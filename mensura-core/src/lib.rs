//! Mensura Core - Fundamental types
//!
//! This crate provides the core types used throughout Mensura:
//! - `Factor`: Exact rational scale factors with a cached f64 form
//! - `UnitConverter`: Composable, invertible conversion functions
//! - `ReciprocalConverter`: Non-linear `a / (x + b)` transforms (API gravity)
//! - `UnitError`: Structured errors for parsing and conversion

mod converter;
mod error;
mod factor;
mod reciprocal;

pub use converter::{AffineMap, UnitConverter};
pub use error::{codes, Bracket, UnitError};
pub use factor::Factor;
pub use reciprocal::ReciprocalConverter;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Factor, UnitConverter, UnitError};
    pub use crate::error::codes;
}
