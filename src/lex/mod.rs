
use std::{ascii, fmt, num::IntErrorKind};

use logos::{Lexer, Logos};

use crate::error::ParseErrorKind;

#[derive(Debug, Clone, Logos, PartialEq)]
#[logos(extras = TokenExtras)]
#[logos(skip r"[\t\v\f\r\n ]+")]
#[logos(subpattern exponent = r"[eE][+\-]?[0-9]+")]
pub(crate) enum Token<'a> {
    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Ident(&'a str),
    #[regex("0", |_| 0)]
    #[regex("0[0-7]+", |lex| int(lex, 8, 1))]
    #[regex("[1-9][0-9]*", |lex| int(lex, 10, 0))]
    #[regex("0[xX][0-9A-Fa-f]+", |lex| int(lex, 16, 2))]
    IntLiteral(u64),
    #[regex(r#"[0-9]+\.[0-9]*(?&exponent)?"#, float)]
    #[regex(r#"[0-9]+(?&exponent)"#, float)]
    #[regex(r#"\.[0-9]+(?&exponent)?"#, float)]
    FloatLiteral(f64),
    #[regex(r#"'|""#, string)]
    StringLiteral(Vec<u8>),
    #[token(".")]
    Dot,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("<")]
    LeftAngleBracket,
    #[token(">")]
    RightAngleBracket,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    /// A `//` comment, including the marker and the terminating newline.
    #[regex(r#"//[^\n]*\n?"#)]
    LineComment(&'a str),
    #[token("/*", block_comment)]
    BlockComment,
}

impl Token<'_> {
    pub const SYNTAX: Token<'static> = Token::Ident("syntax");
    pub const PACKAGE: Token<'static> = Token::Ident("package");
    pub const IMPORT: Token<'static> = Token::Ident("import");
    pub const ENUM: Token<'static> = Token::Ident("enum");
    pub const OPTION: Token<'static> = Token::Ident("option");
    pub const SERVICE: Token<'static> = Token::Ident("service");
    pub const RPC: Token<'static> = Token::Ident("rpc");
    pub const STREAM: Token<'static> = Token::Ident("stream");
    pub const RETURNS: Token<'static> = Token::Ident("returns");
    pub const MESSAGE: Token<'static> = Token::Ident("message");
    pub const REPEATED: Token<'static> = Token::Ident("repeated");
    pub const MAP: Token<'static> = Token::Ident("map");
    pub const ONEOF: Token<'static> = Token::Ident("oneof");
    pub const RESERVED: Token<'static> = Token::Ident("reserved");

    pub fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment(_) | Token::BlockComment)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(value) => write!(f, "{}", value),
            Token::IntLiteral(value) => write!(f, "{}", value),
            Token::FloatLiteral(value) => {
                if value.fract() == 0.0 {
                    write!(f, "{:.1}", value)
                } else {
                    write!(f, "{}", value)
                }
            }
            Token::StringLiteral(bytes) => {
                write!(f, "\"")?;
                for &ch in bytes {
                    write!(f, "{}", ascii::escape_default(ch))?;
                }
                write!(f, "\"")
            }
            Token::Dot => write!(f, "."),
            Token::Minus => write!(f, "-"),
            Token::Plus => write!(f, "+"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftAngleBracket => write!(f, "<"),
            Token::RightAngleBracket => write!(f, ">"),
            Token::Comma => write!(f, ","),
            Token::Equals => write!(f, "="),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::LineComment(value) => write!(f, "{}", value.trim_end()),
            Token::BlockComment => write!(f, "/* */"),
        }
    }
}

/// Errors found inside otherwise well-formed tokens, such as a bad escape in a
/// string literal. The parser stops at the first one.
#[derive(Default)]
pub(crate) struct TokenExtras {
    pub errors: Vec<ParseErrorKind>,
}

fn int<'a>(lex: &mut Lexer<'a, Token<'a>>, radix: u32, prefix_len: usize) -> Result<u64, ()> {
    debug_assert!(lex.slice().len() > prefix_len);
    let span = lex.span().start + prefix_len..lex.span().end;

    if matches!(lex.remainder().chars().next(), Some(ch) if ch.is_ascii_alphabetic() || ch == '_') {
        let mut end = span.end + 1;
        while end < lex.source().len() && lex.source().as_bytes()[end].is_ascii_alphanumeric() {
            end += 1;
        }
        lex.extras
            .errors
            .push(ParseErrorKind::NoSpaceBetweenIntAndIdent {
                span: lex.span().start..end,
            })
    }

    match u64::from_str_radix(&lex.source()[span.clone()], radix) {
        Ok(value) => Ok(value),
        Err(err) => {
            debug_assert_eq!(err.kind(), &IntErrorKind::PosOverflow);
            lex.extras
                .errors
                .push(ParseErrorKind::IntegerOutOfRange { span: lex.span() });
            Ok(Default::default())
        }
    }
}

fn float<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Result<f64, ()> {
    lex.slice().parse().map_err(drop)
}

/// The pieces of a string literal after its opening quote.
#[derive(Logos)]
#[logos(subpattern hex = r"[0-9A-Fa-f]")]
enum StringPart<'a> {
    #[regex(r#"[^\x00\n\\'"]+"#)]
    Text(&'a str),
    #[regex(r#"['"]"#, |lex| lex.slice().as_bytes()[0])]
    Quote(u8),
    #[regex(
        r#"\\[xX](?&hex)(?&hex)?"#,
        |lex| u8::from_str_radix(&lex.slice()[2..], 16).ok()
    )]
    // '\777' does not fit in a byte
    #[regex(
        r#"\\[0-7][0-7]?[0-7]?"#,
        |lex| u8::from_str_radix(&lex.slice()[1..], 8).ok()
    )]
    #[regex(r#"\\[abfnrtv?\\'"]"#, |lex| simple_escape(lex.slice().as_bytes()[1]))]
    Byte(u8),
    #[regex(r#"\\u(?&hex)(?&hex)(?&hex)(?&hex)"#, unicode_escape)]
    #[regex(
        r#"\\U(?&hex)(?&hex)(?&hex)(?&hex)(?&hex)(?&hex)(?&hex)(?&hex)"#,
        unicode_escape
    )]
    Char(char),
}

fn simple_escape(ch: u8) -> Option<u8> {
    Some(match ch {
        b'a' => b'\x07',
        b'b' => b'\x08',
        b'f' => b'\x0c',
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => b'\x0b',
        b'?' | b'\\' | b'\'' | b'"' => ch,
        _ => return None,
    })
}

fn unicode_escape<'a>(lex: &mut Lexer<'a, StringPart<'a>>) -> Option<char> {
    u32::from_str_radix(&lex.slice()[2..], 16)
        .ok()
        .and_then(char::from_u32)
}

fn string<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Vec<u8> {
    let quote = lex.slice().as_bytes()[0];
    let body_start = lex.span().end;
    let mut parts = StringPart::lexer(lex.remainder());
    let mut value = Vec::new();

    let error = loop {
        match parts.next() {
            Some(Ok(StringPart::Quote(ch))) if ch == quote => break None,
            Some(Ok(StringPart::Text(text))) => value.extend_from_slice(text.as_bytes()),
            Some(Ok(StringPart::Quote(byte) | StringPart::Byte(byte))) => value.push(byte),
            Some(Ok(StringPart::Char(ch))) => {
                value.extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes())
            }
            Some(Err(())) => {
                let span = body_start + parts.span().start..body_start + parts.span().end;
                // a newline ends the literal early
                break Some(if parts.slice().contains('\n') {
                    ParseErrorKind::UnterminatedString {
                        span: lex.span().start..span.start,
                    }
                } else if parts.slice().starts_with('\\') {
                    ParseErrorKind::InvalidStringEscape { span }
                } else {
                    ParseErrorKind::InvalidStringCharacters { span }
                });
            }
            None => {
                break Some(ParseErrorKind::UnterminatedString {
                    span: lex.span().start..lex.source().len(),
                })
            }
        }
    };

    lex.extras.errors.extend(error);
    lex.bump(parts.span().end);
    value
}

fn block_comment<'a>(lex: &mut Lexer<'a, Token<'a>>) {
    match lex.remainder().find("*/") {
        Some(end) => lex.bump(end + 2),
        None => {
            lex.extras.errors.push(ParseErrorKind::UnterminatedComment { span: lex.span() });
            lex.bump(lex.remainder().len());
        }
    }
}
