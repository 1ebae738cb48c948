//! Cadence value model: JSON-Cadence arguments, event payloads and the
//! native fixed-point amount type.

pub mod ufix64;
pub mod value;

pub use ufix64::{UFix64, UFIX64_DECIMALS};
pub use value::{CadenceValue, Composite, Field};
