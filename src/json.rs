//! Conversion of schema records into JSON.
//!
//! Every record type implements [`serde::Serialize`], so it can also be passed to any other serde
//! format directly. The functions here wrap [`serde_json`] and report failures as [`Error`].

use serde::Serialize;

use crate::Error;

/// Converts a record, such as a [`ProtoFile`](crate::ProtoFile), into a [`serde_json::Value`].
pub fn to_value<T>(value: &T) -> Result<serde_json::Value, Error>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_value(value)?)
}

/// Encodes a record as compact JSON text.
pub fn to_string<T>(value: &T) -> Result<String, Error>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_string(value)?)
}

/// Encodes a record as indented JSON text.
pub fn to_string_pretty<T>(value: &T) -> Result<String, Error>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_string_pretty(value)?)
}
