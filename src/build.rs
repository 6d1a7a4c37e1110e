//! Conversion of the parse tree into schema records.

use crate::{
    ast,
    model::{Enum, Field, FieldKind, Message, ProtoFile, RpcFunc, Service},
    Comment,
};

const HTTP_OPTION: &str = "google.api.http";

/// Collects the top-level definitions and imports of a file. Definitions sharing a name
/// overwrite earlier ones.
pub(crate) fn build_file(file: ast::File) -> ProtoFile {
    let mut result = ProtoFile::default();

    for statement in file.statements {
        match statement {
            ast::Statement::Import(import) => result.imports.push(import.value.value),
            ast::Statement::Package(_) | ast::Statement::Option(_) => {}
            ast::Statement::Definition(ast::Definition::Message(message)) => {
                let message = build_message(message);
                result.messages.insert(message.name.clone(), message);
            }
            ast::Statement::Definition(ast::Definition::Enum(enu)) => {
                let enu = build_enum(enu);
                result.enums.insert(enu.name.clone(), enu);
            }
            ast::Statement::Definition(ast::Definition::Service(service)) => {
                let service = build_service(service);
                result.services.insert(service.name.clone(), service);
            }
        }
    }

    result
}

fn build_comment(comments: Option<ast::Comments>) -> Comment {
    match comments {
        Some(comments) => Comment::from_lines(comments.lines.iter().map(String::as_str)),
        None => Comment::default(),
    }
}

fn build_message(message: ast::Message) -> Message {
    let mut result = Message {
        comment: build_comment(message.comments),
        name: message.name.value,
        ..Default::default()
    };

    for item in message.body.items {
        match item {
            ast::MessageItem::Field(field) => result.fields.push(build_field(field)),
            ast::MessageItem::RepeatedField(field) => {
                result.fields.push(build_repeated_field(field))
            }
            ast::MessageItem::MapField(field) => result.fields.push(build_map_field(field)),
            ast::MessageItem::Oneof(oneof) => {
                result.fields.extend(oneof.fields.into_iter().map(build_field))
            }
            ast::MessageItem::Enum(enu) => {
                let enu = build_enum(enu);
                result.enums.insert(enu.name.clone(), enu);
            }
            ast::MessageItem::Message(nested) => {
                let nested = build_message(nested);
                result.messages.insert(nested.name.clone(), nested);
            }
            ast::MessageItem::Option(_) | ast::MessageItem::Reserved(_) => {}
        }
    }

    result
}

fn build_field(field: ast::Field) -> Field {
    Field {
        comment: build_comment(field.comments),
        name: field.name.value,
        number: int_value(&field.number),
        kind: FieldKind::Scalar {
            ty: field.ty.to_string(),
        },
    }
}

fn build_repeated_field(repeated: ast::RepeatedField) -> Field {
    let field = build_field(repeated.field);
    Field {
        comment: build_comment(repeated.comments),
        kind: FieldKind::Repeated {
            ty: field.ty().to_owned(),
        },
        ..field
    }
}

fn build_map_field(field: ast::MapField) -> Field {
    Field {
        comment: build_comment(field.comments),
        name: field.name.value,
        number: int_value(&field.number),
        kind: FieldKind::Map {
            key_ty: field.key_ty.value,
            val_ty: field.ty.to_string(),
        },
    }
}

fn build_enum(enu: ast::Enum) -> Enum {
    let fields = enu
        .body
        .values
        .into_iter()
        .map(|value| {
            let field = Field {
                comment: build_comment(value.comments),
                name: value.name.value,
                number: int_value(&value.value),
                kind: FieldKind::EnumValue,
            };
            (field.name.clone(), field)
        })
        .collect();

    Enum {
        comment: build_comment(enu.comments),
        name: enu.name.value,
        fields,
    }
}

fn build_service(service: ast::Service) -> Service {
    Service {
        name: service.name.value,
        functions: service.rpcs.into_iter().map(build_rpc).collect(),
    }
}

fn build_rpc(rpc: ast::Rpc) -> RpcFunc {
    RpcFunc {
        uri: http_uri(&rpc.options),
        name: rpc.name.value,
        in_type: rpc.input_ty.to_string(),
        out_type: rpc.output_ty.to_string(),
    }
}

/// Finds the `post` path of the last `google.api.http` option that has one.
fn http_uri(options: &[ast::OptionStatement]) -> String {
    options
        .iter()
        .filter(|option| option.body.is_extension(HTTP_OPTION))
        .filter_map(|option| option.body.value.field("post")?.as_str())
        .last()
        .unwrap_or_default()
        .to_owned()
}

fn int_value(int: &ast::Int) -> i64 {
    int.as_i64()
        .expect("integer range is checked by the parser")
}
