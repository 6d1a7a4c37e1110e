use std::{fmt, io, path::PathBuf};

use logos::Span;
use miette::{Diagnostic, NamedSource, SourceCode};
use thiserror::Error;

/// An error that may occur while parsing a proto3 source file.
///
/// Lexical errors (malformed literals, stray characters) and syntax errors
/// (unexpected tokens, premature end of input) are both reported through this
/// type. The first error encountered aborts parsing.
#[derive(Error, Diagnostic)]
#[error("{}", kind)]
#[diagnostic(forward(kind))]
pub struct ParseError {
    kind: Box<ParseErrorKind>,
    #[source_code]
    source_code: NamedSource,
}

#[derive(Error, Debug, Diagnostic, PartialEq)]
pub(crate) enum ParseErrorKind {
    #[error("invalid token")]
    InvalidToken {
        #[label("found here")]
        span: Span,
    },
    #[error("integer is too large")]
    IntegerOutOfRange {
        #[label("integer defined here")]
        span: Span,
    },
    #[error("whitespace is required between an integer literal and an identifier")]
    NoSpaceBetweenIntAndIdent {
        #[label("found here")]
        span: Span,
    },
    #[error("invalid string character")]
    InvalidStringCharacters {
        #[label("invalid characters")]
        span: Span,
    },
    #[error("unterminated string")]
    UnterminatedString {
        #[label("string starts here")]
        span: Span,
    },
    #[error("invalid string escape")]
    InvalidStringEscape {
        #[label("defined here")]
        span: Span,
    },
    #[error("string is not valid utf-8")]
    InvalidUtf8String {
        #[label("defined here")]
        span: Span,
    },
    #[error("unterminated block comment")]
    UnterminatedComment {
        #[label("comment starts here")]
        span: Span,
    },
    #[error("unknown syntax '{syntax}'")]
    #[diagnostic(help("only 'proto3' is supported"))]
    UnknownSyntax {
        syntax: String,
        #[label("defined here")]
        span: Span,
    },
    #[error("a map field key type must be an integer, boolean or string")]
    InvalidMapKeyType {
        #[label("defined here")]
        span: Span,
    },
    #[error("expected {expected}, but found '{found}'")]
    UnexpectedToken {
        expected: String,
        found: String,
        #[label("found here")]
        span: Span,
    },
    #[error("expected {expected}, but reached end of file")]
    UnexpectedEof { expected: String },
}

impl ParseErrorKind {
    fn span(&self) -> Option<Span> {
        match self {
            ParseErrorKind::InvalidToken { span }
            | ParseErrorKind::IntegerOutOfRange { span }
            | ParseErrorKind::NoSpaceBetweenIntAndIdent { span }
            | ParseErrorKind::InvalidStringCharacters { span }
            | ParseErrorKind::UnterminatedString { span }
            | ParseErrorKind::InvalidStringEscape { span }
            | ParseErrorKind::InvalidUtf8String { span }
            | ParseErrorKind::UnterminatedComment { span }
            | ParseErrorKind::UnknownSyntax { span, .. }
            | ParseErrorKind::InvalidMapKeyType { span }
            | ParseErrorKind::UnexpectedToken { span, .. } => Some(span.clone()),
            ParseErrorKind::UnexpectedEof { .. } => None,
        }
    }

    fn is_lexical(&self) -> bool {
        matches!(
            self,
            ParseErrorKind::InvalidToken { .. }
                | ParseErrorKind::IntegerOutOfRange { .. }
                | ParseErrorKind::NoSpaceBetweenIntAndIdent { .. }
                | ParseErrorKind::InvalidStringCharacters { .. }
                | ParseErrorKind::UnterminatedString { .. }
                | ParseErrorKind::InvalidStringEscape { .. }
                | ParseErrorKind::InvalidUtf8String { .. }
                | ParseErrorKind::UnterminatedComment { .. }
        )
    }
}

impl ParseError {
    pub(crate) fn new(
        kind: ParseErrorKind,
        name: &str,
        source: impl SourceCode + Send + Sync + 'static,
    ) -> Self {
        ParseError {
            kind: Box::new(kind),
            source_code: NamedSource::new(name, source),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> ParseErrorKind {
        *self.kind
    }

    /// Gets the source code span of the offending token, if any.
    ///
    /// Errors caused by reaching the end of the input have no span.
    pub fn span(&self) -> Option<Span> {
        self.kind.span()
    }

    /// Gets the byte offset into the source at which the error occurred, if any.
    pub fn offset(&self) -> Option<usize> {
        self.span().map(|span| span.start)
    }

    /// Returns `true` if this error was raised while splitting the input into tokens,
    /// for example an unterminated string or an invalid escape sequence.
    pub fn is_lexical(&self) -> bool {
        self.kind.is_lexical()
    }

    /// Returns `true` if the input was tokenized successfully but does not match the
    /// proto3 grammar.
    pub fn is_syntax(&self) -> bool {
        !self.is_lexical()
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = self.span() {
            if let Ok(span_contents) = self.source_code.read_span(&span.into(), 0, 0) {
                if let Some(file_name) = span_contents.name().filter(|name| !name.is_empty()) {
                    write!(f, "{}:", file_name)?;
                }

                write!(
                    f,
                    "{}:{}: ",
                    span_contents.line() + 1,
                    span_contents.column() + 1
                )?;
            }
        }

        write!(f, "{}", self)
    }
}

/// An error that can occur when parsing a file or serializing it to JSON.
#[derive(Debug, Diagnostic, Error)]
#[error(transparent)]
#[diagnostic(transparent)]
pub struct Error {
    kind: ErrorKind,
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum ErrorKind {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(ParseError),
    #[error("error opening file '{path}'")]
    OpenFile {
        path: PathBuf,
        #[source]
        err: io::Error,
    },
    #[error("failed to encode JSON")]
    Json(#[source] serde_json::Error),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Error { kind }
    }

    pub(crate) fn open_file(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Error::new(ErrorKind::OpenFile {
            path: path.into(),
            err,
        })
    }

    /// Returns the underlying parse error, if the input failed to parse.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match &self.kind {
            ErrorKind::Parse(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the I/O error reported by the platform, if the input file could not be read.
    pub fn as_io_error(&self) -> Option<&io::Error> {
        match &self.kind {
            ErrorKind::OpenFile { err, .. } => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::new(ErrorKind::Parse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorKind::Json(err))
    }
}
