//! Parsing of proto3 schema files into a queryable set of records, and conversion of those
//! records to JSON.
//!
//! See the documentation for [`parse()`] for details.
#![warn(missing_debug_implementations, missing_docs)]
#![deny(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/proto-parser/0.1.0/")]

use std::{fs, path::Path};

#[allow(dead_code)]
mod ast;
mod build;
mod comments;
mod error;
mod lex;
mod model;
mod parse;
#[cfg(test)]
mod tests;

pub mod json;

pub use self::comments::{Comment, TagValue};
pub use self::error::{Error, ParseError};
pub use self::model::{Enum, Field, FieldKind, Message, ProtoFile, RpcFunc, Service};

/// Parses a single proto3 source file.
///
/// The source must begin with `syntax = "proto3";`. Comments made of `//` lines directly before a
/// message, enum, field or enumerator are attached to it, and any `@key=value` tags in them are
/// extracted (see [`Comment`]).
///
/// Only the first error is reported. Package declarations, options, reserved ranges and oneof
/// groupings are checked for syntax but not kept in the output.
///
/// # Examples
///
/// ```
/// # use proto_parser::*;
/// let source = r#"
///     syntax = "proto3";
///     import "dep.proto";
///
///     message Foo {
///         // @max=10
///         repeated Bar bar = 1;
///     }
/// "#;
/// let file = parse(source).unwrap();
///
/// assert_eq!(file.imports, vec!["dep.proto".to_owned()]);
/// let field = &file.messages["Foo"].fields[0];
/// assert_eq!(field.name, "bar");
/// assert_eq!(field.number, 1);
/// assert_eq!(field.kind, FieldKind::Repeated { ty: "Bar".to_owned() });
/// assert_eq!(field.comment.tags["max"], TagValue::Value("10".to_owned()));
/// ```
pub fn parse(source: &str) -> Result<ProtoFile, ParseError> {
    parse_named(source, "")
}

/// Reads and parses the proto3 file at `path`.
///
/// Returns `Ok(None)` if the file is empty. Parse errors are reported with the file path as the
/// source name.
pub fn parse_from_file(path: impl AsRef<Path>) -> Result<Option<ProtoFile>, Error> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|err| Error::open_file(path, err))?;
    if source.is_empty() {
        return Ok(None);
    }

    let file = parse_named(&source, &path.display().to_string())?;
    Ok(Some(file))
}

/// Parses a proto3 source file and encodes the result as JSON.
///
/// The output has the shape `{"messages": {..}, "enums": {..}, "services": {..}, "imports": [..]}`.
/// See the [`json`] module for converting records to JSON directly.
pub fn serialize_to_json(source: &str) -> Result<String, Error> {
    let file = parse(source)?;
    json::to_string(&file)
}

/// Reads and parses the proto3 file at `path`, then encodes the result as JSON.
///
/// Returns `Ok(None)` if the file is empty.
pub fn serialize_to_json_from_file(path: impl AsRef<Path>) -> Result<Option<String>, Error> {
    match parse_from_file(path)? {
        Some(file) => Ok(Some(json::to_string(&file)?)),
        None => Ok(None),
    }
}

fn parse_named(source: &str, name: &str) -> Result<ProtoFile, ParseError> {
    let ast = parse::parse_file(source)
        .map_err(|kind| ParseError::new(kind, name, source.to_owned()))?;
    Ok(build::build_file(ast))
}
