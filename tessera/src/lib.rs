#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub use tessera_format::*;

/// Derive [`Model`](trait@Model) for a struct or enum.
///
/// See the crate documentation for the supported `#[tessera(...)]` attributes.
pub use tessera_macros::Model;
