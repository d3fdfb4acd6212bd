//! Puppet Core
//!
//! Foundational types shared by every Puppet crate:
//!
//! - [`errors`]: load-time error taxonomy and the [`Result`] alias
//! - [`math`]: small glam helpers used by FK, IK and easing

pub mod errors;
pub mod math;

pub use errors::{LoadError, PuppetError, Result};
