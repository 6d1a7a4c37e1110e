use insta::assert_snapshot;
use miette::Diagnostic;

use crate::{error::ParseErrorKind, parse, Comment, FieldKind, TagValue};

const PLAYER: &str = r#"syntax = "proto3";
package service;
option go_package = "example.com/backend/pkg/gen/service";
import "msg/job_file.proto";
import "google/api/annotations.proto";

message MessageItem {
    string Title = 1;
    string Content = 2;//trailing
}

//bag type
enum BagType {
  Other = 0;
  Bag = 1;
  Store = 2;
}

//@entry
//@schema
message Player {
    //player id
    uint64 PlayerId = 1;//Player ID
    //@max=1000
    int32 Level = 3;
    repeated string AppVerHistory = 7;
    message StoreItem {
        uint32 Num = 1;
    }
    //@ title =Warehouse
    map<uint64, StoreItem> Storage = 9;
    oneof contact {
        string Email = 10;
        string Phone = 0x10;
    }
    enum InnerType {
        TEST = 0;
        NEG = -1;
    }
}

service JobFileService {
    rpc GDriveFileList (msg.GDriveFileListReq) returns(msg.FileListRep) {
        option (google.api.http) = {
            post: "/api/files/gdrive"
            body: "*"
        };
    }
    rpc Ping (.msg.Empty) returns (stream msg.Empty);
}
"#;

#[test]
fn parse_sample() {
    let file = parse(PLAYER).unwrap();

    assert_eq!(
        file.imports,
        vec![
            "msg/job_file.proto".to_owned(),
            "google/api/annotations.proto".to_owned()
        ]
    );
    assert_eq!(
        file.messages.keys().collect::<Vec<_>>(),
        vec!["MessageItem", "Player"]
    );
    assert_eq!(file.enums.keys().collect::<Vec<_>>(), vec!["BagType"]);
    assert_eq!(
        file.services.keys().collect::<Vec<_>>(),
        vec!["JobFileService"]
    );

    let player = &file.messages["Player"];
    assert_eq!(player.comment.content, "//@entry\n//@schema\n");
    assert_eq!(player.comment.tags["entry"], TagValue::Flag);
    assert_eq!(player.comment.tags["schema"], TagValue::Flag);

    let names: Vec<_> = player.fields.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["PlayerId", "Level", "AppVerHistory", "Storage", "Email", "Phone"]
    );

    assert_eq!(player.fields[0].comment.content, "//player id\n");
    assert_eq!(player.fields[0].number, 1);
    assert_eq!(
        player.fields[0].kind,
        FieldKind::Scalar {
            ty: "uint64".to_owned()
        }
    );

    // a trailing comment belongs to the next declaration
    assert_eq!(
        player.fields[1].comment.content,
        "//Player ID\n//@max=1000\n"
    );
    assert_eq!(
        player.fields[1].comment.tags["max"],
        TagValue::Value("1000".to_owned())
    );

    assert_eq!(
        player.fields[2].kind,
        FieldKind::Repeated {
            ty: "string".to_owned()
        }
    );
    assert_eq!(player.fields[2].number, 7);
    assert!(player.fields[2].comment.is_empty());

    assert_eq!(
        player.fields[3].kind,
        FieldKind::Map {
            key_ty: "uint64".to_owned(),
            val_ty: "StoreItem".to_owned()
        }
    );
    assert_eq!(player.fields[3].ty(), "map");
    assert_eq!(player.fields[3].number, 9);
    assert_eq!(
        player.fields[3].comment.tags["title"],
        TagValue::Value("warehouse".to_owned())
    );

    assert_eq!(player.fields[5].number, 16);

    assert_eq!(
        player.messages.keys().collect::<Vec<_>>(),
        vec!["StoreItem"]
    );
    let inner = &player.enums["InnerType"];
    assert_eq!(inner.fields["NEG"].number, -1);
    assert_eq!(inner.fields["NEG"].kind, FieldKind::EnumValue);

    let bag_type = &file.enums["BagType"];
    assert_eq!(bag_type.comment, Comment::from_text("//bag type\n"));
    assert_eq!(
        bag_type.fields.keys().collect::<Vec<_>>(),
        vec!["Bag", "Other", "Store"]
    );
    assert_eq!(bag_type.fields["Store"].number, 2);

    let service = &file.services["JobFileService"];
    assert_eq!(service.functions.len(), 2);
    assert_eq!(service.functions[0].name, "GDriveFileList");
    assert_eq!(service.functions[0].in_type, "msg.GDriveFileListReq");
    assert_eq!(service.functions[0].out_type, "msg.FileListRep");
    assert_eq!(service.functions[0].uri, "/api/files/gdrive");
    assert_eq!(service.functions[1].in_type, ".msg.Empty");
    assert_eq!(service.functions[1].uri, "");
}

#[test]
fn message_item_trailing_comment_is_dropped() {
    let file = parse(PLAYER).unwrap();

    let item = &file.messages["MessageItem"];
    assert_eq!(item.fields.len(), 2);
    assert!(item.fields[0].comment.is_empty());
    assert!(item.fields[1].comment.is_empty());
}

#[test]
fn last_definition_wins() {
    let file = parse(
        r#"syntax = "proto3";
        message Foo { int32 a = 1; }
        message Foo { int32 b = 2; }
        enum E { A = 0; A = 1; }
        "#,
    )
    .unwrap();

    assert_eq!(file.messages.len(), 1);
    assert_eq!(file.messages["Foo"].fields[0].name, "b");
    assert_eq!(file.enums["E"].fields.len(), 1);
    assert_eq!(file.enums["E"].fields["A"].number, 1);
}

#[test]
fn octal_field_number() {
    let file = parse("syntax = \"proto3\"; message Foo { int32 a = 010; }").unwrap();
    assert_eq!(file.messages["Foo"].fields[0].number, 8);
}

#[test]
fn last_http_post_wins() {
    let file = parse(
        r#"syntax = "proto3";
        service S {
            rpc A (Req) returns (Rep) {
                option (google.api.http) = { post: "/first" };
                option (google.api.http) = { get: "/ignored" };
                option (other.http) = { post: "/other" };
            }
            rpc B (Req) returns (Rep) {
                option (google.api.http) = { post: "/first" };
                option (google.api.http) = { post: "/second" body: "*" };
            }
            rpc C (Req) returns (Rep) {
                option (google.api.http) = { get: "/get" };
            }
        }"#,
    )
    .unwrap();

    let functions = &file.services["S"].functions;
    assert_eq!(functions[0].uri, "/first");
    assert_eq!(functions[1].uri, "/second");
    assert_eq!(functions[2].uri, "");
}

#[test]
fn crlf_comment_tags() {
    let file = parse(
        "syntax = \"proto3\";\r\nmessage M {\r\n  // @max=1000\r\n  //@required\r\n  int32 a = 1;\r\n}\r\n",
    )
    .unwrap();

    let field = &file.messages["M"].fields[0];
    assert_eq!(field.comment.content, "// @max=1000\r\n//@required\r\n");
    assert_eq!(field.comment.tags["max"], TagValue::Value("1000".to_owned()));
    assert_eq!(field.comment.tags["required"], TagValue::Flag);
    assert_eq!(field.comment.tags.len(), 2);
}

#[test]
fn tab_separated_comment_tags() {
    let file =
        parse("syntax = \"proto3\";\nmessage M {\n\t//\t@max=1000\n\tint32 a = 1;\n}\n").unwrap();

    let field = &file.messages["M"].fields[0];
    assert_eq!(field.comment.tags.len(), 1);
    assert_eq!(field.comment.tags["max"], TagValue::Value("1000".to_owned()));
}

#[test]
fn error_messages() {
    let err = parse("message Foo {}").unwrap_err();
    assert_snapshot!(err.to_string(), @"expected 'syntax', but found 'message'");
    assert_snapshot!(format!("{:?}", err), @"1:1: expected 'syntax', but found 'message'");
    assert!(err.is_syntax());
    assert_eq!(err.offset(), Some(0));

    let err = parse("syntax = \"proto2\";").unwrap_err();
    assert_snapshot!(err.to_string(), @"unknown syntax 'proto2'");
    assert_eq!(err.span(), Some(9..17));

    let err =
        parse("syntax = \"proto3\";\nmessage Foo {\n  map<float, int32> m = 1;\n}").unwrap_err();
    assert_snapshot!(format!("{:?}", err), @"3:7: a map field key type must be an integer, boolean or string");

    let err = parse("syntax = \"proto3\";\nmessage Foo {").unwrap_err();
    assert_snapshot!(format!("{:?}", err), @"expected a message field, oneof, reserved range, enum, message, option or '}', but reached end of file");
    assert_eq!(err.span(), None);
    assert_eq!(err.offset(), None);

    let err = parse("").unwrap_err();
    assert_snapshot!(err.to_string(), @"expected 'syntax', but reached end of file");
}

#[test]
fn lexical_errors() {
    let err = parse("syntax = \"proto3\"; message Foo { int32 x = 1abc; }").unwrap_err();
    assert!(err.is_lexical());
    assert!(!err.is_syntax());
    assert_eq!(
        err.into_inner(),
        ParseErrorKind::NoSpaceBetweenIntAndIdent { span: 43..47 }
    );

    let err = parse("syntax = \"proto3\"; /* unterminated").unwrap_err();
    assert!(err.is_lexical());
    assert_snapshot!(err.to_string(), @"unterminated block comment");

    let err = parse("syntax = \"proto3\"; import \"foo\\xff\";").unwrap_err();
    assert_snapshot!(err.to_string(), @"string is not valid utf-8");
}

#[test]
fn diagnostic_labels() {
    let err = parse("syntax = \"proto3\"; message Foo { int32 x = 1abc; }").unwrap_err();

    let labels: Vec<_> = err.labels().unwrap().collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].offset(), 43);
    assert_eq!(labels[0].len(), 4);
    assert!(err.source_code().is_some());
}
