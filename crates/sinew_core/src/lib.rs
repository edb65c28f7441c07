//! Sinew Core
//!
//! Foundational types shared by every Sinew crate:
//!
//! - [`Transform`]: translation / rotation / non-uniform scale value type
//! - [`interner`]: process-wide string interning for bone names ([`Symbol`])
//! - [`errors`]: the [`SinewError`] type and [`Result`] alias

pub mod errors;
pub mod interner;
pub mod transform;

pub use errors::{Result, SinewError};
pub use interner::Symbol;
pub use transform::Transform;
