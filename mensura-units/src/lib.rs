//! Mensura Units - Unit expression parsing and conversion
//!
//! Parses unit expressions such as `N/(kg·h)` or `kg*m/s^2` against a
//! registry of known units, renders units in a canonical form, and builds
//! converters between commensurable units.
//!
//! - `/`, `*` and `·` fold strictly left to right: `N/kg/h` is `N/(kg·h)`
//! - Parentheses group; exponents (`^2`, `²`) bind to a single symbol
//! - Error positions are character indices into the whole input
//! - Converters between the same pair of units compare equal regardless of
//!   how the units were spelled
//!
//! Categories in the standard catalog:
//! - SI base and derived (m, kg, s, N, Pa, J, W, V, T, ...)
//! - Length, mass, time, volume (ft, lb, h, L, cc, micron, ...)
//! - Pressure (bar, atm, psi)
//! - Temperature (K, °C, °F)
//! - Miscellaneous (%, SG, API, ppm, ppb, ppmv, ppmw)

mod cache;
mod catalog;
mod config;
mod dimension;
mod format;
mod parse;
mod registry;
mod system;
mod unit;

pub use cache::{CacheStatsSnapshot, ConverterCache, DEFAULT_MAX_ENTRIES};
pub use config::UnitSystemConfig;
pub use dimension::Dimension;
pub use format::{superscript, superscript_digit};
pub use parse::{extract_subexpression, parse_product_unit, parse_unit, SubExpression};
pub use registry::UnitRegistry;
pub use system::UnitSystem;
pub use unit::{Term, Unit, UnitDef, MAX_EXPONENT};

pub use mensura_core::{AffineMap, Bracket, Factor, ReciprocalConverter, UnitConverter, UnitError};
