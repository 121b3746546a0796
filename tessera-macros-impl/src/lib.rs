#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod derive;
mod emit_enum;
mod emit_struct;
mod parse;
mod rename;

pub use derive::derive_model;
pub use rename::RenameRule;
