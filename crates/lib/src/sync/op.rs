//! Change events and their type tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SyncError;
use crate::navigate::Shape;
use crate::path::{PathError, join_path, parse_path};
use crate::reflect::Value;

/// What an event does to the addressed child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OpKind {
    Create,
    Replace,
    Delete,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Create => "create",
            OpKind::Replace => "replace",
            OpKind::Delete => "delete",
        }
    }

    /// Single-letter code used on the wire (`c`, `r`, `d`).
    pub fn code(&self) -> char {
        match self {
            OpKind::Create => 'c',
            OpKind::Replace => 'r',
            OpKind::Delete => 'd',
        }
    }
}

impl FromStr for OpKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" | "create" => Ok(OpKind::Create),
            "r" | "replace" => Ok(OpKind::Replace),
            "d" | "delete" => Ok(OpKind::Delete),
            _ => Err(SyncError::UnknownOperation { op: s.to_string() }),
        }
    }
}

impl TryFrom<String> for OpKind {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OpKind> for String {
    fn from(kind: OpKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subtype of a scalar tag; decides the variant stored in dynamic slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ScalarTag {
    #[default]
    Str,
    Int,
    Float,
    Bool,
    Null,
    /// Any other tag (`!!timestamp`, `!!binary`, application tags). Stored as text.
    Other(String),
}

impl ScalarTag {
    /// Interprets `literal` for a dynamic slot. Literals that do not parse as
    /// the tagged type are kept as text.
    pub fn to_value(&self, literal: &str) -> Value {
        match self {
            ScalarTag::Int => literal
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or_else(|_| Value::from(literal)),
            ScalarTag::Float => literal
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::from(literal)),
            ScalarTag::Bool => match literal.to_ascii_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::from(literal),
            },
            ScalarTag::Null => Value::Null,
            ScalarTag::Str | ScalarTag::Other(_) => Value::from(literal),
        }
    }
}

/// Type tag of an event, in YAML core schema spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tag {
    Map,
    /// Ordered map.
    Omap,
    /// Insertion-ordered map.
    Imap,
    /// Set: members are keys without values.
    Set,
    Seq,
    Scalar(ScalarTag),
}

const LONG_PREFIX: &str = "tag:yaml.org,2002:";

impl Tag {
    /// Parses a tag. Unknown tags are scalars; an empty tag is `!!str`.
    pub fn parse(tag: &str) -> Self {
        let name = tag
            .strip_prefix("!!")
            .or_else(|| tag.strip_prefix(LONG_PREFIX))
            .unwrap_or(tag);
        match name {
            "map" => Tag::Map,
            "omap" => Tag::Omap,
            "imap" => Tag::Imap,
            "set" => Tag::Set,
            "seq" => Tag::Seq,
            "" | "str" => Tag::Scalar(ScalarTag::Str),
            "int" => Tag::Scalar(ScalarTag::Int),
            "float" => Tag::Scalar(ScalarTag::Float),
            "bool" => Tag::Scalar(ScalarTag::Bool),
            "null" => Tag::Scalar(ScalarTag::Null),
            _ => Tag::Scalar(ScalarTag::Other(tag.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tag::Map => "!!map",
            Tag::Omap => "!!omap",
            Tag::Imap => "!!imap",
            Tag::Set => "!!set",
            Tag::Seq => "!!seq",
            Tag::Scalar(ScalarTag::Str) => "!!str",
            Tag::Scalar(ScalarTag::Int) => "!!int",
            Tag::Scalar(ScalarTag::Float) => "!!float",
            Tag::Scalar(ScalarTag::Bool) => "!!bool",
            Tag::Scalar(ScalarTag::Null) => "!!null",
            Tag::Scalar(ScalarTag::Other(tag)) => tag,
        }
    }

    /// Container shape for map-like and sequence tags, `None` for scalars.
    pub fn shape(&self) -> Option<Shape> {
        match self {
            Tag::Map | Tag::Omap | Tag::Imap | Tag::Set => Some(Shape::Map),
            Tag::Seq => Some(Shape::Seq),
            Tag::Scalar(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Tag::Scalar(_))
    }

    /// The value a dynamic slot receives for `literal` under this tag.
    pub fn to_value(&self, literal: &str) -> Value {
        match self {
            Tag::Scalar(scalar) => scalar.to_value(literal),
            Tag::Seq => Value::Seq(Vec::new()),
            _ => Value::Map(Default::default()),
        }
    }
}

impl Default for Tag {
    fn default() -> Self {
        Tag::Scalar(ScalarTag::Str)
    }
}

impl From<String> for Tag {
    fn from(tag: String) -> Self {
        Tag::parse(&tag)
    }
}

impl From<&str> for Tag {
    fn from(tag: &str) -> Self {
        Tag::parse(tag)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change event: an operation on `key` beneath `path`.
///
/// An empty `path` addresses children of the root. An empty `path` together
/// with an empty `key` addresses the root itself. `parent_tag` is the tag of
/// the node holding `key`, when the source knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeOp {
    #[serde(rename = "op")]
    pub kind: OpKind,
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub tag: Tag,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_tag: Option<Tag>,
}

impl ChangeOp {
    pub fn new(
        kind: OpKind,
        path: &[&str],
        key: impl Into<String>,
        tag: Tag,
        value: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            path: path.iter().map(|segment| segment.to_string()).collect(),
            key: key.into(),
            tag,
            value: value.into(),
            parent_tag: None,
        }
    }

    pub fn create(path: &[&str], key: impl Into<String>, tag: Tag, value: impl Into<String>) -> Self {
        Self::new(OpKind::Create, path, key, tag, value)
    }

    pub fn replace(
        path: &[&str],
        key: impl Into<String>,
        tag: Tag,
        value: impl Into<String>,
    ) -> Self {
        Self::new(OpKind::Replace, path, key, tag, value)
    }

    pub fn delete(path: &[&str], key: impl Into<String>) -> Self {
        Self::new(OpKind::Delete, path, key, Tag::default(), "")
    }

    /// Builds an event from a full slash path whose last segment is the leaf key.
    ///
    /// `"/"` (or `""`) yields a root event.
    pub fn from_path(
        kind: OpKind,
        path: &str,
        tag: Tag,
        value: impl Into<String>,
    ) -> Result<Self, PathError> {
        let mut segments = parse_path(path)?;
        let key = segments.pop().unwrap_or_default();
        Ok(Self {
            kind,
            path: segments,
            key,
            tag,
            value: value.into(),
            parent_tag: None,
        })
    }

    /// Records the tag of the node holding `key`.
    pub fn with_parent_tag(mut self, tag: Tag) -> Self {
        self.parent_tag = Some(tag);
        self
    }

    /// True when `key` is a member of a `!!set` node rather than a map key.
    pub fn is_set_member(&self) -> bool {
        self.parent_tag == Some(Tag::Set)
    }

    /// True when the event addresses the root value itself.
    pub fn is_root(&self) -> bool {
        self.path.is_empty() && self.key.is_empty()
    }

    /// The full slash path of the addressed child, leaf key included.
    pub fn full_path(&self) -> String {
        let mut segments: Vec<&str> = self.path.iter().map(String::as_str).collect();
        if !self.key.is_empty() {
            segments.push(&self.key);
        }
        join_path(&segments)
    }
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OpKind::Delete => write!(f, "{} {}", self.kind, self.full_path()),
            _ => write!(
                f,
                "{} {} ({}) = {:?}",
                self.kind,
                self.full_path(),
                self.tag,
                self.value
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_kind_parsing() {
        assert_eq!("c".parse::<OpKind>().unwrap(), OpKind::Create);
        assert_eq!("R".parse::<OpKind>().unwrap(), OpKind::Replace);
        assert_eq!("delete".parse::<OpKind>().unwrap(), OpKind::Delete);

        let err = "x".parse::<OpKind>().unwrap_err();
        assert!(matches!(err, SyncError::UnknownOperation { ref op } if op == "x"));
        assert_eq!(err.kind(), crate::ErrorKind::UnknownOperation);
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!(Tag::parse("!!map"), Tag::Map);
        assert_eq!(Tag::parse("!!set").shape(), Some(Shape::Map));
        assert_eq!(Tag::parse("!!omap").shape(), Some(Shape::Map));
        assert_eq!(Tag::parse("tag:yaml.org,2002:seq"), Tag::Seq);
        assert_eq!(Tag::parse("!!int"), Tag::Scalar(ScalarTag::Int));
        assert_eq!(Tag::parse(""), Tag::Scalar(ScalarTag::Str));
        assert_eq!(
            Tag::parse("!custom"),
            Tag::Scalar(ScalarTag::Other("!custom".to_string()))
        );
        assert_eq!(Tag::parse("!custom").as_str(), "!custom");
        assert!(Tag::parse("!!timestamp").is_scalar());
    }

    #[test]
    fn test_scalar_tag_values() {
        assert_eq!(ScalarTag::Int.to_value("42"), Value::Int(42));
        assert_eq!(ScalarTag::Int.to_value("forty"), Value::from("forty"));
        assert_eq!(ScalarTag::Float.to_value("0.5"), Value::Float(0.5));
        assert_eq!(ScalarTag::Bool.to_value("True"), Value::Bool(true));
        assert_eq!(ScalarTag::Null.to_value("~"), Value::Null);
        assert_eq!(ScalarTag::Str.to_value("42"), Value::from("42"));
    }

    #[test]
    fn test_change_op_json() {
        let op: ChangeOp =
            serde_json::from_str(r#"{"op":"c","path":["system"],"key":"cpu","tag":"!!int","value":"4"}"#)
                .unwrap();
        assert_eq!(op, ChangeOp::create(&["system"], "cpu", Tag::Scalar(ScalarTag::Int), "4"));

        let minimal: ChangeOp = serde_json::from_str(r#"{"op":"delete","key":"cpu"}"#).unwrap();
        assert_eq!(minimal, ChangeOp::delete(&[], "cpu"));

        let text = serde_json::to_string(&ChangeOp::create(&[], "list", Tag::Seq, "")).unwrap();
        assert_eq!(
            text,
            r#"{"op":"create","path":[],"key":"list","tag":"!!seq","value":""}"#
        );

        assert!(serde_json::from_str::<ChangeOp>(r#"{"op":"upsert","key":"a"}"#).is_err());
    }

    #[test]
    fn test_from_path() {
        let op = ChangeOp::from_path(OpKind::Create, "/a/b[k=/x]/leaf", Tag::default(), "v").unwrap();
        assert_eq!(op.path, vec!["a", "b[k=/x]"]);
        assert_eq!(op.key, "leaf");
        assert_eq!(op.full_path(), "/a/b[k=/x]/leaf");

        let root = ChangeOp::from_path(OpKind::Replace, "/", Tag::default(), "v").unwrap();
        assert!(root.is_root());
        assert_eq!(root.full_path(), "/");

        assert!(ChangeOp::from_path(OpKind::Create, "/a[b", Tag::default(), "").is_err());
    }

    #[test]
    fn test_display() {
        let op = ChangeOp::create(&["system"], "cpu", Tag::Scalar(ScalarTag::Int), "4");
        assert_eq!(op.to_string(), r#"create /system/cpu (!!int) = "4""#);
        assert_eq!(ChangeOp::delete(&["a"], "b").to_string(), "delete /a/b");
    }
}
