use logos::{Lexer, Logos, Span};


use crate::{ast, error::ParseErrorKind, lex::Token};

const MAP_KEY_TYPES: &[&str] = &[
    "int32", "int64", "uint32", "uint64", "sint32", "sint64", "fixed32", "fixed64", "sfixed32",
    "sfixed64", "bool", "string",
];

pub(crate) fn parse_file(source: &str) -> Result<ast::File, ParseErrorKind> {
    let mut parser = Parser::new(source);
    match parser.parse_file() {
        Ok(file) if parser.lexer.extras.errors.is_empty() => Ok(file),
        _ => {
            debug_assert!(!parser.lexer.extras.errors.is_empty());
            Err(parser.lexer.extras.errors.remove(0))
        }
    }
}

struct Parser<'a> {
    lexer: Lexer<'a, Token<'a>>,
    peek: Option<(Token<'a>, Span)>,
    /// Line comments between the previous significant token and `peek`.
    comments: Vec<(&'a str, Span)>,
    last_end: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Parser {
            lexer: Token::lexer(source),
            peek: None,
            comments: Vec::new(),
            last_end: 0,
        }
    }

    fn parse_file(&mut self) -> Result<ast::File, ()> {
        let syntax = self.parse_syntax()?;

        let mut statements = Vec::new();
        loop {
            let statement = match self.peek() {
                Some((Token::Semicolon, _)) => {
                    self.bump();
                    continue;
                }
                Some((Token::Ident("import"), _)) => ast::Statement::Import(self.parse_import()?),
                Some((Token::Ident("package"), _)) => {
                    ast::Statement::Package(self.parse_package()?)
                }
                Some((Token::Ident("option"), _)) => {
                    ast::Statement::Option(self.parse_option_statement()?)
                }
                Some((Token::Ident("message"), _)) => {
                    ast::Statement::Definition(ast::Definition::Message(self.parse_message()?))
                }
                Some((Token::Ident("enum"), _)) => {
                    ast::Statement::Definition(ast::Definition::Enum(self.parse_enum()?))
                }
                Some((Token::Ident("service"), _)) => {
                    ast::Statement::Definition(ast::Definition::Service(self.parse_service()?))
                }
                None => break,
                _ => self.unexpected_token(
                    "'import', 'package', 'option', 'message', 'enum', 'service' or ';'",
                )?,
            };
            statements.push(statement);
        }

        Ok(ast::File { syntax, statements })
    }

    fn parse_syntax(&mut self) -> Result<ast::Syntax, ()> {
        let start = self.expect_eq(Token::SYNTAX)?;
        self.expect_eq(Token::Equals)?;

        let syntax = self.parse_string()?;
        if syntax.value != "proto3" {
            self.add_error(ParseErrorKind::UnknownSyntax {
                syntax: syntax.value,
                span: syntax.span,
            });
            return Err(());
        }

        self.expect_eq(Token::Semicolon)?;

        Ok(ast::Syntax {
            value: syntax.value,
            span: start.start..self.last_end,
        })
    }

    fn parse_import(&mut self) -> Result<ast::Import, ()> {
        let start = self.expect_eq(Token::IMPORT)?;

        let kind = match self.peek() {
            Some((Token::Ident("weak"), _)) => {
                self.bump();
                Some(ast::ImportKind::Weak)
            }
            Some((Token::Ident("public"), _)) => {
                self.bump();
                Some(ast::ImportKind::Public)
            }
            Some((Token::StringLiteral(_), _)) => None,
            _ => self.unexpected_token("a string literal, 'public' or 'weak'")?,
        };

        let value = self.parse_string()?;

        self.expect_eq(Token::Semicolon)?;

        Ok(ast::Import {
            kind,
            value,
            span: start.start..self.last_end,
        })
    }

    fn parse_package(&mut self) -> Result<ast::Package, ()> {
        let start = self.expect_eq(Token::PACKAGE)?;

        let name = self.parse_full_ident()?;

        self.expect_eq(Token::Semicolon)?;

        Ok(ast::Package {
            name,
            span: start.start..self.last_end,
        })
    }

    fn parse_message(&mut self) -> Result<ast::Message, ()> {
        let comments = self.take_comments();
        let start = self.expect_eq(Token::MESSAGE)?;

        let name = self.parse_ident()?;

        let body = self.parse_message_body()?;

        Ok(ast::Message {
            comments,
            name,
            body,
            span: start.start..self.last_end,
        })
    }

    fn parse_message_body(&mut self) -> Result<ast::MessageBody, ()> {
        self.expect_eq(Token::LeftBrace)?;

        let mut items = Vec::new();
        loop {
            let item = match self.peek() {
                Some((Token::Ident("repeated"), _)) => {
                    ast::MessageItem::RepeatedField(self.parse_repeated_field()?)
                }
                Some((Token::Ident("map"), _)) => {
                    ast::MessageItem::MapField(self.parse_map_field()?)
                }
                Some((Token::Ident("oneof"), _)) => ast::MessageItem::Oneof(self.parse_oneof()?),
                Some((Token::Ident("enum"), _)) => ast::MessageItem::Enum(self.parse_enum()?),
                Some((Token::Ident("message"), _)) => {
                    ast::MessageItem::Message(self.parse_message()?)
                }
                Some((Token::Ident("option"), _)) => {
                    ast::MessageItem::Option(self.parse_option_statement()?)
                }
                Some((Token::Ident("reserved"), _)) => {
                    ast::MessageItem::Reserved(self.parse_reserved()?)
                }
                Some((Token::Ident(_) | Token::Dot, _)) => {
                    ast::MessageItem::Field(self.parse_field()?)
                }
                Some((Token::Semicolon, _)) => {
                    self.bump();
                    continue;
                }
                Some((Token::RightBrace, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token(
                    "a message field, oneof, reserved range, enum, message, option or '}'",
                )?,
            };
            items.push(item);
        }

        Ok(ast::MessageBody { items })
    }

    fn parse_field(&mut self) -> Result<ast::Field, ()> {
        let comments = self.take_comments();
        let start = self.peek_start();

        let optional = match self.peek() {
            Some((Token::Ident("optional"), span)) => {
                self.bump();
                Some(span)
            }
            _ => None,
        };

        let ty = self.parse_type_name()?;

        let name = self.parse_ident()?;

        self.expect_eq(Token::Equals)?;

        let number = self.parse_positive_int()?;

        let options = self.parse_field_end()?;

        Ok(ast::Field {
            comments,
            optional,
            ty,
            name,
            number,
            options,
            span: start..self.last_end,
        })
    }

    fn parse_repeated_field(&mut self) -> Result<ast::RepeatedField, ()> {
        let comments = self.take_comments();
        let start = self.expect_eq(Token::REPEATED)?;

        let field = self.parse_field()?;

        Ok(ast::RepeatedField {
            comments,
            field,
            span: start.start..self.last_end,
        })
    }

    fn parse_map_field(&mut self) -> Result<ast::MapField, ()> {
        let comments = self.take_comments();
        let start = self.expect_eq(Token::MAP)?;

        self.expect_eq(Token::LeftAngleBracket)?;
        let key_ty = self.parse_key_type()?;
        self.expect_eq(Token::Comma)?;
        let ty = self.parse_type_name()?;
        self.expect_eq(Token::RightAngleBracket)?;

        let name = self.parse_ident()?;

        self.expect_eq(Token::Equals)?;

        let number = self.parse_positive_int()?;

        let options = self.parse_field_end()?;

        Ok(ast::MapField {
            comments,
            key_ty,
            ty,
            name,
            number,
            options,
            span: start.start..self.last_end,
        })
    }

    fn parse_key_type(&mut self) -> Result<ast::Ident, ()> {
        let ty = self.parse_ident()?;
        if !MAP_KEY_TYPES.contains(&ty.value.as_str()) {
            self.add_error(ParseErrorKind::InvalidMapKeyType { span: ty.span });
            return Err(());
        }
        Ok(ty)
    }

    /// Parses the optional `[...]` options list and the terminating `;` of a field.
    fn parse_field_end(&mut self) -> Result<Vec<ast::OptionBody>, ()> {
        match self.peek() {
            Some((Token::LeftBracket, _)) => {
                let options = self.parse_options_list()?;
                self.expect_eq(Token::Semicolon)?;
                Ok(options)
            }
            Some((Token::Semicolon, _)) => {
                self.bump();
                Ok(vec![])
            }
            _ => self.unexpected_token("';' or '['"),
        }
    }

    fn parse_oneof(&mut self) -> Result<ast::Oneof, ()> {
        let start = self.expect_eq(Token::ONEOF)?;

        let name = self.parse_ident()?;

        self.expect_eq(Token::LeftBrace)?;

        let mut fields = Vec::new();
        let mut options = Vec::new();
        loop {
            match self.peek() {
                Some((Token::Ident("option"), _)) => {
                    options.push(self.parse_option_statement()?);
                }
                Some((Token::Ident("repeated" | "map" | "optional"), _)) => {
                    self.unexpected_token("a oneof field")?
                }
                Some((Token::Ident(_) | Token::Dot, _)) => {
                    fields.push(self.parse_field()?);
                }
                Some((Token::Semicolon, _)) => {
                    self.bump();
                }
                Some((Token::RightBrace, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token("a oneof field, option or '}'")?,
            }
        }

        Ok(ast::Oneof {
            name,
            fields,
            options,
            span: start.start..self.last_end,
        })
    }

    fn parse_enum(&mut self) -> Result<ast::Enum, ()> {
        let comments = self.take_comments();
        let start = self.expect_eq(Token::ENUM)?;

        let name = self.parse_ident()?;

        let body = self.parse_enum_body()?;

        Ok(ast::Enum {
            comments,
            name,
            body,
            span: start.start..self.last_end,
        })
    }

    fn parse_enum_body(&mut self) -> Result<ast::EnumBody, ()> {
        self.expect_eq(Token::LeftBrace)?;

        let mut body = ast::EnumBody::default();
        loop {
            match self.peek() {
                Some((Token::Ident("option"), _)) => {
                    body.options.push(self.parse_option_statement()?);
                }
                Some((Token::Ident("reserved"), _)) => {
                    body.reserved.push(self.parse_reserved()?);
                }
                Some((Token::Ident(_), _)) => {
                    body.values.push(self.parse_enum_field()?);
                }
                Some((Token::Semicolon, _)) => {
                    self.bump();
                }
                Some((Token::RightBrace, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token("an enum value, option, reserved range or '}'")?,
            }
        }

        Ok(body)
    }

    fn parse_enum_field(&mut self) -> Result<ast::EnumField, ()> {
        let comments = self.take_comments();
        let start = self.peek_start();

        let name = self.parse_ident()?;

        self.expect_eq(Token::Equals)?;

        let negative = self.bump_if_eq(Token::Minus);
        let value = self.parse_int(negative)?;

        let options = self.parse_field_end()?;

        Ok(ast::EnumField {
            comments,
            name,
            value,
            options,
            span: start..self.last_end,
        })
    }

    fn parse_reserved(&mut self) -> Result<ast::Reserved, ()> {
        self.expect_eq(Token::RESERVED)?;

        match self.peek() {
            Some((Token::IntLiteral(_), _)) => {
                Ok(ast::Reserved::Ranges(self.parse_reserved_ranges()?))
            }
            Some((Token::StringLiteral(_) | Token::Ident(_), _)) => {
                Ok(ast::Reserved::Names(self.parse_reserved_names()?))
            }
            _ => self.unexpected_token("a positive integer, string or identifier"),
        }
    }

    fn parse_reserved_names(&mut self) -> Result<Vec<ast::Ident>, ()> {
        let mut names = vec![self.parse_reserved_name()?];

        loop {
            match self.peek() {
                Some((Token::Comma, _)) => {
                    self.bump();
                    names.push(self.parse_reserved_name()?);
                }
                Some((Token::Semicolon, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token("',' or ';'")?,
            }
        }

        Ok(names)
    }

    fn parse_reserved_name(&mut self) -> Result<ast::Ident, ()> {
        match self.peek() {
            Some((Token::StringLiteral(_), _)) => {
                let string = self.parse_string()?;
                Ok(ast::Ident::new(string.value, string.span))
            }
            _ => self.parse_ident(),
        }
    }

    fn parse_reserved_ranges(&mut self) -> Result<Vec<ast::ReservedRange>, ()> {
        let mut ranges = vec![self.parse_reserved_range()?];

        loop {
            match self.peek() {
                Some((Token::Comma, _)) => {
                    self.bump();
                    ranges.push(self.parse_reserved_range()?);
                }
                Some((Token::Semicolon, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token("',' or ';'")?,
            }
        }

        Ok(ranges)
    }

    fn parse_reserved_range(&mut self) -> Result<ast::ReservedRange, ()> {
        let start = self.parse_positive_int()?;

        let end = match self.peek() {
            Some((Token::Ident("to"), _)) => {
                self.bump();
                match self.peek() {
                    Some((Token::IntLiteral(_), _)) => {
                        ast::ReservedRangeEnd::Int(self.parse_positive_int()?)
                    }
                    Some((Token::Ident("max"), _)) => {
                        self.bump();
                        ast::ReservedRangeEnd::Max
                    }
                    _ => self.unexpected_token("an integer or 'max'")?,
                }
            }
            Some((Token::Comma | Token::Semicolon, _)) => ast::ReservedRangeEnd::None,
            _ => self.unexpected_token("'to', ',' or ';'")?,
        };

        Ok(ast::ReservedRange { start, end })
    }

    fn parse_service(&mut self) -> Result<ast::Service, ()> {
        let start = self.expect_eq(Token::SERVICE)?;

        let name = self.parse_ident()?;

        self.expect_eq(Token::LeftBrace)?;

        let mut rpcs = Vec::new();
        let mut options = Vec::new();
        loop {
            match self.peek() {
                Some((Token::Ident("rpc"), _)) => {
                    rpcs.push(self.parse_rpc()?);
                }
                Some((Token::Ident("option"), _)) => {
                    options.push(self.parse_option_statement()?);
                }
                Some((Token::Semicolon, _)) => {
                    self.bump();
                }
                Some((Token::RightBrace, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token("'rpc', 'option', ';' or '}'")?,
            }
        }

        Ok(ast::Service {
            name,
            rpcs,
            options,
            span: start.start..self.last_end,
        })
    }

    fn parse_rpc(&mut self) -> Result<ast::Rpc, ()> {
        let start = self.expect_eq(Token::RPC)?;

        let name = self.parse_ident()?;

        self.expect_eq(Token::LeftParen)?;
        let is_client_streaming = self.bump_if_eq(Token::STREAM);
        let input_ty = self.parse_type_name()?;
        self.expect_eq(Token::RightParen)?;

        self.expect_eq(Token::RETURNS)?;

        self.expect_eq(Token::LeftParen)?;
        let is_server_streaming = self.bump_if_eq(Token::STREAM);
        let output_ty = self.parse_type_name()?;
        self.expect_eq(Token::RightParen)?;

        let mut options = Vec::new();
        match self.peek() {
            Some((Token::Semicolon, _)) => {
                self.bump();
            }
            Some((Token::LeftBrace, _)) => {
                self.bump();
                loop {
                    match self.peek() {
                        Some((Token::Ident("option"), _)) => {
                            options.push(self.parse_option_statement()?);
                        }
                        Some((Token::Semicolon, _)) => {
                            self.bump();
                        }
                        Some((Token::RightBrace, _)) => {
                            self.bump();
                            break;
                        }
                        _ => self.unexpected_token("'option', ';' or '}'")?,
                    }
                }
            }
            _ => self.unexpected_token("';' or '{'")?,
        }

        Ok(ast::Rpc {
            name,
            input_ty,
            is_client_streaming,
            output_ty,
            is_server_streaming,
            options,
            span: start.start..self.last_end,
        })
    }

    fn parse_option_statement(&mut self) -> Result<ast::OptionStatement, ()> {
        let start = self.expect_eq(Token::OPTION)?;

        let body = self.parse_option_body()?;

        self.expect_eq(Token::Semicolon)?;

        Ok(ast::OptionStatement {
            body,
            span: start.start..self.last_end,
        })
    }

    fn parse_options_list(&mut self) -> Result<Vec<ast::OptionBody>, ()> {
        self.expect_eq(Token::LeftBracket)?;

        let mut options = vec![self.parse_option_body()?];
        loop {
            match self.peek() {
                Some((Token::Comma, _)) => {
                    self.bump();
                    options.push(self.parse_option_body()?);
                }
                Some((Token::RightBracket, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token("',' or ']'")?,
            }
        }

        Ok(options)
    }

    fn parse_option_body(&mut self) -> Result<ast::OptionBody, ()> {
        let mut name = vec![self.parse_option_name_part()?];
        loop {
            match self.peek() {
                Some((Token::Dot, _)) => {
                    self.bump();
                    name.push(self.parse_option_name_part()?);
                }
                Some((Token::Equals, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token("'.' or '='")?,
            }
        }

        let value = self.parse_option_value()?;

        Ok(ast::OptionBody { name, value })
    }

    fn parse_option_name_part(&mut self) -> Result<ast::OptionNamePart, ()> {
        match self.peek() {
            Some((Token::LeftParen, _)) => {
                self.bump();
                let ty = self.parse_type_name()?;
                self.expect_eq(Token::RightParen)?;
                Ok(ast::OptionNamePart::Extension(ty))
            }
            Some((Token::Ident(_), _)) => Ok(ast::OptionNamePart::Ident(self.parse_ident()?)),
            _ => self.unexpected_token("an identifier or '('"),
        }
    }

    fn parse_option_value(&mut self) -> Result<ast::OptionValue, ()> {
        match self.peek() {
            Some((Token::LeftBrace, _)) => Ok(ast::OptionValue::Aggregate(self.parse_aggregate()?)),
            _ => Ok(ast::OptionValue::Constant(self.parse_constant()?)),
        }
    }

    /// Parses a text-format message literal such as `{ post: "/foo" body: "*" }`.
    fn parse_aggregate(&mut self) -> Result<Vec<ast::AggregateEntry>, ()> {
        self.expect_eq(Token::LeftBrace)?;

        let mut entries = Vec::new();
        loop {
            match self.peek() {
                Some((Token::Ident(_) | Token::LeftBracket, _)) => {
                    entries.push(self.parse_aggregate_entry()?);
                }
                Some((Token::Comma | Token::Semicolon, _)) => {
                    self.bump();
                }
                Some((Token::RightBrace, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token("a field name or '}'")?,
            }
        }

        Ok(entries)
    }

    fn parse_aggregate_entry(&mut self) -> Result<ast::AggregateEntry, ()> {
        let name = match self.peek() {
            Some((Token::LeftBracket, _)) => {
                self.bump();
                let ty = self.parse_type_name()?;
                self.expect_eq(Token::RightBracket)?;
                ast::AggregateName::Extension(ty)
            }
            _ => ast::AggregateName::Field(self.parse_ident()?),
        };

        let value = match self.peek() {
            Some((Token::Colon, _)) => {
                self.bump();
                match self.peek() {
                    Some((Token::LeftBracket, _)) => {
                        ast::OptionValue::List(self.parse_aggregate_list()?)
                    }
                    _ => self.parse_option_value()?,
                }
            }
            Some((Token::LeftBrace, _)) => ast::OptionValue::Aggregate(self.parse_aggregate()?),
            _ => self.unexpected_token("':' or '{'")?,
        };

        Ok(ast::AggregateEntry { name, value })
    }

    fn parse_aggregate_list(&mut self) -> Result<Vec<ast::OptionValue>, ()> {
        self.expect_eq(Token::LeftBracket)?;

        let mut values = Vec::new();
        if self.bump_if_eq(Token::RightBracket) {
            return Ok(values);
        }

        values.push(self.parse_option_value()?);
        loop {
            match self.peek() {
                Some((Token::Comma, _)) => {
                    self.bump();
                    values.push(self.parse_option_value()?);
                }
                Some((Token::RightBracket, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token("',' or ']'")?,
            }
        }

        Ok(values)
    }

    fn parse_constant(&mut self) -> Result<ast::Constant, ()> {
        match self.peek() {
            Some((Token::Ident("true"), _)) => {
                self.bump();
                Ok(ast::Constant::Bool(true))
            }
            Some((Token::Ident("false"), _)) => {
                self.bump();
                Ok(ast::Constant::Bool(false))
            }
            Some((Token::Ident("inf" | "nan"), _)) => self.parse_number(false),
            Some((Token::Ident(_), _)) => Ok(ast::Constant::FullIdent(self.parse_full_ident()?)),
            Some((Token::Minus, _)) => {
                self.bump();
                self.parse_number(true)
            }
            Some((Token::Plus, _)) => {
                self.bump();
                self.parse_number(false)
            }
            Some((Token::IntLiteral(_) | Token::FloatLiteral(_), _)) => self.parse_number(false),
            Some((Token::StringLiteral(_), _)) => {
                let mut string = self.parse_string()?;
                // adjacent string literals are concatenated
                while let Some((Token::StringLiteral(_), _)) = self.peek() {
                    let next = self.parse_string()?;
                    string.value.push_str(&next.value);
                    string.span = string.span.start..next.span.end;
                }
                Ok(ast::Constant::String(string))
            }
            _ => self.unexpected_token("a constant"),
        }
    }

    fn parse_number(&mut self, negative: bool) -> Result<ast::Constant, ()> {
        let sign = if negative { -1.0 } else { 1.0 };
        match self.peek() {
            Some((Token::IntLiteral(_), _)) => Ok(ast::Constant::Int(self.parse_int(negative)?)),
            Some((Token::FloatLiteral(value), _)) => {
                self.bump();
                Ok(ast::Constant::Float(sign * value))
            }
            Some((Token::Ident("inf"), _)) => {
                self.bump();
                Ok(ast::Constant::Float(sign * f64::INFINITY))
            }
            Some((Token::Ident("nan"), _)) => {
                self.bump();
                Ok(ast::Constant::Float(f64::NAN))
            }
            _ => self.unexpected_token("a numeric literal"),
        }
    }

    fn parse_type_name(&mut self) -> Result<ast::TypeName, ()> {
        let leading_dot = match self.peek() {
            Some((Token::Dot, span)) => {
                self.bump();
                Some(span)
            }
            Some((Token::Ident(_), _)) => None,
            _ => self.unexpected_token("a type name")?,
        };

        let name = self.parse_full_ident()?;

        Ok(ast::TypeName { leading_dot, name })
    }

    fn parse_full_ident(&mut self) -> Result<ast::FullIdent, ()> {
        let mut parts = vec![self.parse_ident()?];
        while self.bump_if_eq(Token::Dot) {
            parts.push(self.parse_ident()?);
        }
        Ok(ast::FullIdent::from(parts))
    }

    fn parse_ident(&mut self) -> Result<ast::Ident, ()> {
        match self.peek() {
            Some((Token::Ident(value), span)) => {
                self.bump();
                Ok(ast::Ident::new(value, span))
            }
            _ => self.unexpected_token("an identifier"),
        }
    }

    fn parse_positive_int(&mut self) -> Result<ast::Int, ()> {
        self.parse_int(false)
    }

    fn parse_int(&mut self, negative: bool) -> Result<ast::Int, ()> {
        match self.peek() {
            Some((Token::IntLiteral(value), span)) => {
                self.bump();
                let int = ast::Int {
                    negative,
                    value,
                    span,
                };
                if int.as_i64().is_none() {
                    self.add_error(ParseErrorKind::IntegerOutOfRange { span: int.span });
                    return Err(());
                }
                Ok(int)
            }
            _ => self.unexpected_token("an integer"),
        }
    }

    fn parse_string(&mut self) -> Result<ast::String, ()> {
        match self.peek() {
            Some((Token::StringLiteral(value), span)) => {
                self.bump();
                match String::from_utf8(value) {
                    Ok(value) => Ok(ast::String { value, span }),
                    Err(_) => {
                        self.add_error(ParseErrorKind::InvalidUtf8String { span });
                        Err(())
                    }
                }
            }
            _ => self.unexpected_token("a string literal"),
        }
    }

    /// Takes the comment lines directly preceding the next token, leaving none behind.
    fn take_comments(&mut self) -> Option<ast::Comments> {
        self.peek();

        let span = match (self.comments.first(), self.comments.last()) {
            (Some((_, first)), Some((_, last))) => first.start..last.end,
            _ => return None,
        };
        let lines = self
            .comments
            .drain(..)
            .map(|(line, _)| line.to_owned())
            .collect();

        Some(ast::Comments { lines, span })
    }

    fn peek_start(&mut self) -> usize {
        match self.peek() {
            Some((_, span)) => span.start,
            None => self.last_end,
        }
    }

    fn expect_eq(&mut self, t: Token) -> Result<Span, ()> {
        match self.peek() {
            Some((tok, span)) if tok == t => {
                self.bump();
                Ok(span)
            }
            _ => self.unexpected_token(format!("'{}'", t)),
        }
    }

    fn bump_if_eq(&mut self, t: Token) -> bool {
        match self.peek() {
            Some((tok, _)) if tok == t => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    fn bump(&mut self) -> (Token<'a>, Span) {
        let (tok, span) = self
            .peek
            .take()
            .expect("called bump without peek returning Some()");
        self.last_end = span.end;
        (tok, span)
    }

    fn peek(&mut self) -> Option<(Token<'a>, Span)> {
        if self.peek.is_none() {
            self.peek = self.next();
        }
        self.peek.clone()
    }

    fn next(&mut self) -> Option<(Token<'a>, Span)> {
        self.comments.clear();
        loop {
            let tok = self.lexer.next();
            if !self.lexer.extras.errors.is_empty() {
                return None;
            }

            match tok {
                Some(Ok(Token::LineComment(line))) => {
                    self.comments.push((line, self.lexer.span()));
                }
                Some(Ok(tok)) if tok.is_comment() => continue,
                Some(Ok(tok)) => return Some((tok, self.lexer.span())),
                Some(Err(())) => {
                    self.add_error(ParseErrorKind::InvalidToken {
                        span: self.lexer.span(),
                    });
                    return None;
                }
                None => return None,
            }
        }
    }

    fn unexpected_token<T>(&mut self, expected: impl ToString) -> Result<T, ()> {
        // a lexical error has already been reported for this position
        if !self.lexer.extras.errors.is_empty() {
            return Err(());
        }

        match self.peek() {
            Some((found, span)) => self.add_error(ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: found.to_string(),
                span,
            }),
            None => self.add_error(ParseErrorKind::UnexpectedEof {
                expected: expected.to_string(),
            }),
        }
        Err(())
    }

    fn add_error(&mut self, err: ParseErrorKind) {
        self.lexer.extras.errors.push(err);
    }
}
