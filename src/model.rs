//! The schema records produced from a parsed file.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::Comment;

/// The top-level definitions of a proto3 source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProtoFile {
    /// Top-level messages, keyed by name. Nested messages are found in their parent.
    pub messages: BTreeMap<String, Message>,
    /// Top-level enums, keyed by name.
    pub enums: BTreeMap<String, Enum>,
    /// Services, keyed by name.
    pub services: BTreeMap<String, Service>,
    /// The imported file paths, in source order.
    pub imports: Vec<String>,
}

/// A message definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message {
    /// The comment preceding the `message` keyword.
    pub comment: Comment,
    /// The unqualified message name.
    pub name: String,
    /// The fields of this message in declaration order, including the members of any oneofs.
    pub fields: Vec<Field>,
    /// Messages nested inside this message, keyed by name.
    pub messages: BTreeMap<String, Message>,
    /// Enums nested inside this message, keyed by name.
    pub enums: BTreeMap<String, Enum>,
}

/// An enum definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enum {
    /// The comment preceding the `enum` keyword.
    pub comment: Comment,
    /// The unqualified enum name.
    pub name: String,
    /// The enumerators, keyed by name. Each has kind [`FieldKind::EnumValue`].
    pub fields: BTreeMap<String, Field>,
}

/// A message field or an enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// The comment preceding the field.
    pub comment: Comment,
    /// The field name.
    pub name: String,
    /// The field number, or the value of an enumerator.
    pub number: i64,
    /// The kind of field, with its declared types.
    pub kind: FieldKind,
}

/// Describes the shape of a [`Field`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A singular field. This includes proto3 `optional` fields and members of a oneof.
    Scalar {
        /// The declared type, as written in the source (e.g. `string` or `.foo.Bar`).
        ty: String,
    },
    /// A `repeated` field.
    Repeated {
        /// The declared element type.
        ty: String,
    },
    /// A `map<K, V>` field.
    Map {
        /// The declared key type.
        key_ty: String,
        /// The declared value type.
        val_ty: String,
    },
    /// An enumerator.
    EnumValue,
}

/// A service definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Service {
    /// The service name.
    pub name: String,
    /// The methods of this service, in declaration order.
    pub functions: Vec<RpcFunc>,
}

/// A method of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RpcFunc {
    /// The method name.
    pub name: String,
    /// The request type, as written in the source.
    pub in_type: String,
    /// The response type, as written in the source.
    pub out_type: String,
    /// The `post` path of the method's `google.api.http` option, or an empty string.
    pub uri: String,
}

impl Field {
    /// Gets the type of this field.
    ///
    /// This is `"map"` for map fields and `"enum"` for enumerators.
    pub fn ty(&self) -> &str {
        match &self.kind {
            FieldKind::Scalar { ty } | FieldKind::Repeated { ty } => ty,
            FieldKind::Map { .. } => "map",
            FieldKind::EnumValue => "enum",
        }
    }

    /// Gets the key type of a map field. For other kinds this is the same as [`ty`](Field::ty).
    pub fn key_type(&self) -> &str {
        match &self.kind {
            FieldKind::Map { key_ty, .. } => key_ty,
            _ => self.ty(),
        }
    }

    /// Gets the value type of a map field. For other kinds this is the same as [`ty`](Field::ty).
    pub fn val_type(&self) -> &str {
        match &self.kind {
            FieldKind::Map { val_ty, .. } => val_ty,
            _ => self.ty(),
        }
    }
}

impl FieldKind {
    /// The name of this kind as it appears in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Scalar { .. } => "scalar",
            FieldKind::Repeated { .. } => "repeated",
            FieldKind::Map { .. } => "map",
            FieldKind::EnumValue => "enum-value",
        }
    }
}

impl Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct FieldObj<'a> {
            comment: &'a Comment,
            kind: &'static str,
            #[serde(rename = "type")]
            ty: &'a str,
            key_type: &'a str,
            val_type: &'a str,
            name: &'a str,
            number: i64,
        }

        FieldObj {
            comment: &self.comment,
            kind: self.kind.as_str(),
            ty: self.ty(),
            key_type: self.key_type(),
            val_type: self.val_type(),
            name: &self.name,
            number: self.number,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: FieldKind) -> Field {
        Field {
            comment: Comment::default(),
            name: "f".to_owned(),
            number: 1,
            kind,
        }
    }

    #[test]
    fn scalar_types() {
        let field = field(FieldKind::Scalar {
            ty: "string".to_owned(),
        });
        assert_eq!(field.ty(), "string");
        assert_eq!(field.key_type(), "string");
        assert_eq!(field.val_type(), "string");
    }

    #[test]
    fn map_types() {
        let field = field(FieldKind::Map {
            key_ty: "uint64".to_owned(),
            val_ty: "StoreItem".to_owned(),
        });
        assert_eq!(field.ty(), "map");
        assert_eq!(field.key_type(), "uint64");
        assert_eq!(field.val_type(), "StoreItem");
    }

    #[test]
    fn enum_value_types() {
        let field = field(FieldKind::EnumValue);
        assert_eq!(field.ty(), "enum");
        assert_eq!(field.key_type(), "enum");
        assert_eq!(field.val_type(), "enum");
        assert_eq!(field.kind.as_str(), "enum-value");
    }

    #[test]
    fn serialize_field() {
        let field = Field {
            comment: Comment::from_text("//@required\n"),
            name: "AppVerHistory".to_owned(),
            number: 7,
            kind: FieldKind::Repeated {
                ty: "string".to_owned(),
            },
        };
        assert_eq!(
            serde_json::to_string(&field).unwrap(),
            r#"{"comment":{"content":"//@required\n","tags":{"required":true}},"kind":"repeated","type":"string","key_type":"string","val_type":"string","name":"AppVerHistory","number":7}"#
        );
    }
}
