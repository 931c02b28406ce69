#![doc = include_str!("../README.md")]

pub mod encode;
pub mod error;
pub mod manager;
pub mod number;
pub mod options;
pub mod reflection;
pub mod ser;
pub mod types;
pub mod value;

pub use crate::error::{Error, Result};
pub use crate::manager::{
    Converter, DefaultReflectionController, Interceptor, JsonItem, Manager, ReflectionController,
};
pub use crate::options::{NamingStrategy, Options};
pub use crate::reflection::{DataKind, TypeDescriptor};
pub use crate::ser::{to_string, to_writer};
pub use crate::types::{MemberAttributes, Type};
pub use crate::value::Value;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Encodes any `Serialize` value with the process-wide manager.
#[cfg(feature = "serde")]
pub fn serialize<T: Serialize + ?Sized>(value: &T, options: &Options) -> Result<String> {
    let manager = Manager::global();
    let v = crate::ser::bridge::to_value(value, manager)?;
    manager.to_string(&v, options)
}

#[cfg(feature = "serde")]
pub fn serialize_to_writer<W: std::io::Write, T: Serialize + ?Sized>(
    writer: W,
    value: &T,
    options: &Options,
) -> Result<()> {
    let manager = Manager::global();
    let v = crate::ser::bridge::to_value(value, manager)?;
    manager.to_writer(writer, &v, options)
}
