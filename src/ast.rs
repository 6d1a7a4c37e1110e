//! The concrete parse tree produced by [`crate::parse`].
//!
//! Each node corresponds to one production of the proto3 grammar and keeps the
//! source spans of its significant tokens. Nothing here is interpreted yet; the
//! conversion into schema records happens in [`crate::build`].

use logos::Span;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct File {
    pub syntax: Syntax,
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Statement {
    Import(Import),
    Package(Package),
    Option(OptionStatement),
    Definition(Definition),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Definition {
    Message(Message),
    Enum(Enum),
    Service(Service),
}

/// A run of `//` comment lines directly preceding a declaration.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Comments {
    pub lines: Vec<std::string::String>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Syntax {
    pub value: std::string::String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Ident {
    pub value: std::string::String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FullIdent {
    pub parts: Vec<Ident>,
}

/// A possibly-qualified type reference such as `string` or `.foo.Bar`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TypeName {
    pub leading_dot: Option<Span>,
    pub name: FullIdent,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Int {
    pub negative: bool,
    pub value: u64,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct String {
    pub value: std::string::String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Constant {
    FullIdent(FullIdent),
    Int(Int),
    Float(f64),
    String(String),
    Bool(bool),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ImportKind {
    Weak,
    Public,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Import {
    pub kind: Option<ImportKind>,
    pub value: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Package {
    pub name: FullIdent,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OptionStatement {
    pub body: OptionBody,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OptionBody {
    pub name: Vec<OptionNamePart>,
    pub value: OptionValue,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum OptionNamePart {
    Ident(Ident),
    Extension(TypeName),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum OptionValue {
    Constant(Constant),
    Aggregate(Vec<AggregateEntry>),
    List(Vec<OptionValue>),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AggregateEntry {
    pub name: AggregateName,
    pub value: OptionValue,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum AggregateName {
    Field(Ident),
    Extension(TypeName),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Message {
    pub comments: Option<Comments>,
    pub name: Ident,
    pub body: MessageBody,
    pub span: Span,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct MessageBody {
    pub items: Vec<MessageItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum MessageItem {
    Field(Field),
    RepeatedField(RepeatedField),
    MapField(MapField),
    Oneof(Oneof),
    Enum(Enum),
    Message(Message),
    Option(OptionStatement),
    Reserved(Reserved),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Field {
    pub comments: Option<Comments>,
    pub optional: Option<Span>,
    pub ty: TypeName,
    pub name: Ident,
    pub number: Int,
    pub options: Vec<OptionBody>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RepeatedField {
    pub comments: Option<Comments>,
    pub field: Field,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MapField {
    pub comments: Option<Comments>,
    pub key_ty: Ident,
    pub ty: TypeName,
    pub name: Ident,
    pub number: Int,
    pub options: Vec<OptionBody>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Oneof {
    pub name: Ident,
    pub fields: Vec<Field>,
    pub options: Vec<OptionStatement>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Enum {
    pub comments: Option<Comments>,
    pub name: Ident,
    pub body: EnumBody,
    pub span: Span,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct EnumBody {
    pub values: Vec<EnumField>,
    pub options: Vec<OptionStatement>,
    pub reserved: Vec<Reserved>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EnumField {
    pub comments: Option<Comments>,
    pub name: Ident,
    pub value: Int,
    pub options: Vec<OptionBody>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Reserved {
    Ranges(Vec<ReservedRange>),
    Names(Vec<Ident>),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ReservedRange {
    pub start: Int,
    pub end: ReservedRangeEnd,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ReservedRangeEnd {
    None,
    Int(Int),
    Max,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Service {
    pub name: Ident,
    pub rpcs: Vec<Rpc>,
    pub options: Vec<OptionStatement>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Rpc {
    pub name: Ident,
    pub input_ty: TypeName,
    pub is_client_streaming: bool,
    pub output_ty: TypeName,
    pub is_server_streaming: bool,
    pub options: Vec<OptionStatement>,
    pub span: Span,
}

impl Ident {
    pub fn new(value: impl Into<std::string::String>, span: Span) -> Self {
        Ident {
            value: value.into(),
            span,
        }
    }
}

impl From<Ident> for FullIdent {
    fn from(value: Ident) -> Self {
        FullIdent { parts: vec![value] }
    }
}

impl From<Vec<Ident>> for FullIdent {
    fn from(parts: Vec<Ident>) -> Self {
        debug_assert!(!parts.is_empty());
        FullIdent { parts }
    }
}

impl FullIdent {
    pub fn span(&self) -> Span {
        match (self.parts.first(), self.parts.last()) {
            (Some(first), Some(last)) => first.span.start..last.span.end,
            _ => 0..0,
        }
    }
}

impl std::fmt::Display for FullIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i != 0 {
                f.write_str(".")?;
            }
            f.write_str(&part.value)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.leading_dot.is_some() {
            f.write_str(".")?;
        }
        self.name.fmt(f)
    }
}

impl TypeName {
    pub fn span(&self) -> Span {
        let name_span = self.name.span();
        match &self.leading_dot {
            Some(dot) => dot.start..name_span.end,
            None => name_span,
        }
    }
}

impl Int {
    /// The signed value of this literal, or `None` if it does not fit in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        let value = i128::from(self.value);
        i64::try_from(if self.negative { -value } else { value }).ok()
    }
}

impl OptionBody {
    /// Returns `true` if this option's name is the single extension `(name)`.
    pub fn is_extension(&self, name: &str) -> bool {
        match self.name.as_slice() {
            [OptionNamePart::Extension(ty)] => {
                ty.leading_dot.is_none() && ty.name.to_string() == name
            }
            _ => false,
        }
    }
}

impl OptionValue {
    /// Looks up a field of an aggregate value by name. If the field occurs more than
    /// once, the last occurrence is returned.
    pub fn field(&self, name: &str) -> Option<&OptionValue> {
        match self {
            OptionValue::Aggregate(entries) => entries
                .iter()
                .rev()
                .find(|entry| {
                    matches!(&entry.name, AggregateName::Field(ident) if ident.value == name)
                })
                .map(|entry| &entry.value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Constant(Constant::String(string)) => Some(&string.value),
            _ => None,
        }
    }
}
