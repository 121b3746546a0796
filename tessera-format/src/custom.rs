use std::any::Any;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};

use crate::{FormatReader, ReadError, Result, debug};

/// Opt-in hook for types that build themselves from a single node.
///
/// A type deriving `Model` with `#[tessera(custom)]` is read exclusively
/// through this hook; its fields are never looked up individually.
pub trait CustomConstructor: Sized {
    /// Build the value from `var`.
    ///
    /// Any error is accepted; reader errors convert with `?`.
    fn from_var<'de, R: FormatReader<'de>>(
        reader: &R,
        var: R::Var,
    ) -> core::result::Result<Self, Box<dyn Error + Send + Sync>>;
}

pub(crate) fn construct<'de, T, R>(reader: &R, var: R::Var) -> Result<T>
where
    T: CustomConstructor,
    R: FormatReader<'de>,
{
    let type_name = core::any::type_name::<T>();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| T::from_var(reader, var)));
    let message = match outcome {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(err)) => err.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };
    debug!(type_name, %message, "custom constructor failed");
    Err(ReadError::custom_constructor(type_name, message))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "constructor panicked".to_owned()
    }
}
