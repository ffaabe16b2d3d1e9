//! lt-core: shared foundation for the LoRa TDMA results pipeline.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + sample helpers)
//! - ids (node indices and node counts)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
