use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// The leading `//` comment of a declaration, together with any `@key=value` tags it contains.
///
/// Tags are written as `@key=value` or a bare `@key` anywhere in a comment line. Keys and
/// values are lower-cased, and a key containing a space is ignored. For example:
///
/// ```
/// use proto_parser::{Comment, TagValue};
///
/// let comment = Comment::from_text("// @title=Warehouse\n//@required\n");
/// assert_eq!(comment.tags["title"], TagValue::Value("warehouse".to_owned()));
/// assert_eq!(comment.tags["required"], TagValue::Flag);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// The raw comment lines, including the `//` markers and line endings.
    pub content: String,
    /// Tags extracted from the comment, keyed by lower-cased name.
    pub tags: BTreeMap<String, TagValue>,
}

/// The value of a comment tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// A tag written as `@key=value`. The value is lower-cased.
    Value(String),
    /// A tag written as a bare `@key`.
    Flag,
}

impl Comment {
    /// Parses the comment lines of a single comment group, extracting any tags.
    ///
    /// The text is split into lines, and each line containing `@` is scanned for tags. Tags from
    /// later lines overwrite tags of the same name from earlier lines.
    pub fn from_text(text: &str) -> Self {
        Comment::from_lines(text.split_inclusive('\n'))
    }

    pub(crate) fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut comment = Comment::default();
        for line in lines {
            comment.content.push_str(line);
            if line.contains('@') {
                parse_tags(line, &mut comment.tags);
            }
        }
        comment
    }

    /// Returns `true` if there was no comment.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Gets the value of the tag named `key`, if present.
    pub fn tag(&self, key: &str) -> Option<&TagValue> {
        self.tags.get(key)
    }
}

impl TagValue {
    /// Gets the string value of this tag, or `None` for a bare flag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Value(value) => Some(value),
            TagValue::Flag => None,
        }
    }
}

impl Serialize for TagValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TagValue::Value(value) => serializer.serialize_str(value),
            TagValue::Flag => serializer.serialize_bool(true),
        }
    }
}

fn trim_comment(s: &str) -> &str {
    s.trim_matches(|ch: char| ch.is_whitespace() || ch == '/')
}

fn parse_tags(line: &str, tags: &mut BTreeMap<String, TagValue>) {
    for fragment in trim_comment(line).split('@') {
        let fragment = trim_comment(fragment);
        if fragment.is_empty() {
            continue;
        }

        let mut parts = fragment.split('=');
        let key = match parts.next() {
            Some(key) => trim_comment(key).to_lowercase(),
            None => continue,
        };
        if key.contains(char::is_whitespace) {
            continue;
        }

        // only the text up to a second '=' is kept
        let value = match parts.next() {
            Some(value) => TagValue::Value(value.to_lowercase()),
            None => TagValue::Flag,
        };
        tags.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn tags<const N: usize>(entries: [(&str, TagValue); N]) -> BTreeMap<String, TagValue> {
        entries
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value))
            .collect()
    }

    fn value(s: &str) -> TagValue {
        TagValue::Value(s.to_owned())
    }

    #[test]
    fn no_tags() {
        let comment = Comment::from_text("//player id\n");
        assert_eq!(comment.content, "//player id\n");
        assert_eq!(comment.tags, BTreeMap::new());

        let comment = Comment::from_text("///YYY\n");
        assert_eq!(comment.content, "///YYY\n");
        assert!(comment.tags.is_empty());
    }

    #[test]
    fn empty() {
        let comment = Comment::from_text("");
        assert!(comment.is_empty());
        assert_eq!(comment, Comment::default());
    }

    #[test]
    fn value_tag() {
        let comment = Comment::from_text("    //@max=1000\n");
        assert_eq!(comment.tags, tags([("max", value("1000"))]));
        assert_eq!(comment.tag("max").and_then(TagValue::as_str), Some("1000"));
    }

    #[test]
    fn flag_tag() {
        let comment = Comment::from_text("//@required\n");
        assert_eq!(comment.tags, tags([("required", TagValue::Flag)]));
        assert_eq!(comment.tag("required").and_then(TagValue::as_str), None);
    }

    #[test]
    fn tags_accumulate_across_lines() {
        let comment = Comment::from_text("//@fmt=date\n//@desc=Player's birthday\n");
        assert_eq!(comment.content, "//@fmt=date\n//@desc=Player's birthday\n");
        assert_eq!(
            comment.tags,
            tags([("fmt", value("date")), ("desc", value("player's birthday"))])
        );
    }

    #[test]
    fn later_tag_overwrites() {
        let comment = Comment::from_text("//@title=first\n//@title\n");
        assert_eq!(comment.tags, tags([("title", TagValue::Flag)]));
    }

    #[test]
    fn multiple_tags_on_one_line() {
        let comment = Comment::from_text("//@entry @schema @Kind=Root\n");
        assert_eq!(
            comment.tags,
            tags([
                ("entry", TagValue::Flag),
                ("schema", TagValue::Flag),
                ("kind", value("root")),
            ])
        );
    }

    #[test]
    fn key_is_trimmed_and_lower_cased() {
        let comment = Comment::from_text("    //@ title =Warehouse\n");
        assert_eq!(comment.tags, tags([("title", value("warehouse"))]));

        let comment = Comment::from_text("// @TITLE=App version history\n");
        assert_eq!(comment.tags, tags([("title", value("app version history"))]));
    }

    #[test]
    fn key_with_space_is_skipped() {
        let comment = Comment::from_text("// @foo bar=baz\n");
        assert!(comment.tags.is_empty());
    }

    #[test]
    fn text_before_at_is_a_key() {
        let comment = Comment::from_text("//note @max=5\n");
        assert_eq!(
            comment.tags,
            tags([("note", TagValue::Flag), ("max", value("5"))])
        );
    }

    #[test]
    fn crlf_line_endings() {
        let comment = Comment::from_text("// @max=1000\r\n//@required\r\n");
        assert_eq!(comment.content, "// @max=1000\r\n//@required\r\n");
        assert_eq!(
            comment.tags,
            tags([("max", value("1000")), ("required", TagValue::Flag)])
        );
    }

    #[test]
    fn tab_after_slashes() {
        let comment = Comment::from_text("//\t@max=1000\n");
        assert_eq!(comment.tags, tags([("max", value("1000"))]));

        let comment = Comment::from_text("//@foo\tbar=baz\n");
        assert!(comment.tags.is_empty());
    }

    #[test]
    fn value_stops_at_second_equals() {
        let comment = Comment::from_text("//@expr=a=b\n");
        assert_eq!(comment.tags, tags([("expr", value("a"))]));
    }

    #[test]
    fn lines_without_at_are_not_scanned() {
        let comment = Comment::from_text("//fmt =email\n");
        assert!(comment.tags.is_empty());
    }

    #[test]
    fn serialize() {
        let comment = Comment::from_text("//@max=10\n//@required\n");
        assert_eq!(
            serde_json::to_value(&comment).unwrap(),
            serde_json::json!({
                "content": "//@max=10\n//@required\n",
                "tags": { "max": "10", "required": true },
            })
        );
    }

    proptest! {
        #[test]
        fn value_tags_round_trip(key in "[a-z][a-z0-9_]{0,8}", val in "[A-Za-z0-9_]{1,8}") {
            let comment = Comment::from_text(&format!("// @{}={}\n", key, val));
            prop_assert_eq!(comment.tags, tags([(key.as_str(), TagValue::Value(val.to_lowercase()))]));
        }

        #[test]
        fn content_is_preserved(text in "(//[^\n@]*\n){0,4}") {
            let comment = Comment::from_text(&text);
            prop_assert_eq!(&comment.content, &text);
            prop_assert!(comment.tags.is_empty());
        }
    }
}
