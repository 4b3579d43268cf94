//! Structured keys: `Name[field=value][field=value]...`.
//!
//! A structured key addresses a list entry by the content of its fields
//! instead of by position. The leading name is informational. Each bracketed
//! qualifier constrains one field. A qualifier value may itself be a
//! structured key (`Sub=[I=20][S=hello]`); such values are kept verbatim and
//! only decomposed when that field is navigated into.

use std::fmt;
use std::ops::Range;

use super::{PathError, unbalanced};

/// A decomposed structured key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredKey {
    /// Text before the first qualifier.
    pub name: String,
    /// Qualifier pairs in the order they were written.
    pub fields: Vec<(String, String)>,
}

impl StructuredKey {
    /// Decomposes every `[field=value]` qualifier of `token`.
    ///
    /// One layer of matching quotes around a value is removed, and `\]` in a
    /// plain value becomes `]`. Values that are themselves bracketed keys are
    /// returned untouched.
    ///
    /// ```
    /// use ysync::path::StructuredKey;
    ///
    /// let key = StructuredKey::parse("multikeylist[str=STR][integer=10]").unwrap();
    /// assert_eq!(key.name, "multikeylist");
    /// assert_eq!(key.get("integer"), Some("10"));
    /// ```
    pub fn parse(token: &str) -> Result<Self, PathError> {
        let (name_end, spans) = scan(token)?;
        let mut fields = Vec::with_capacity(spans.len());
        for span in spans {
            let qualifier = &token[span];
            let Some((field, value)) = qualifier.split_once('=') else {
                return Err(PathError::MissingEquals {
                    input: token.to_string(),
                    qualifier: qualifier.to_string(),
                });
            };
            fields.push((field.to_string(), clean_value(value)));
        }
        Ok(Self {
            name: token[..name_end].to_string(),
            fields,
        })
    }

    /// Returns the literal bound to `field`, if the key constrains it.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// True when the key carries no qualifiers.
    pub fn is_plain(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for StructuredKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (field, value) in &self.fields {
            if value.starts_with('[') || !value.contains(']') {
                write!(f, "[{field}={value}]")?;
            } else {
                write!(f, "[{field}='{value}']")?;
            }
        }
        Ok(())
    }
}

/// Splits `token` into its leading name and the raw qualifier text.
///
/// Used when searching: the remainder is handed to the next level down and
/// re-parsed there.
///
/// ```
/// use ysync::path::extract_name_and_substring;
///
/// let (name, rest) = extract_name_and_substring("list[a=1][b=[c=2]]").unwrap();
/// assert_eq!(name, "list");
/// assert_eq!(rest, "[a=1][b=[c=2]]");
/// ```
pub fn extract_name_and_substring(token: &str) -> Result<(String, String), PathError> {
    let (name_end, spans) = scan(token)?;
    let rest = match (spans.first(), spans.last()) {
        (Some(first), Some(last)) => &token[first.start - 1..last.end + 1],
        _ => "",
    };
    Ok((token[..name_end].to_string(), rest.to_string()))
}

/// True when `token` contains a bracketed qualifier.
pub fn is_structured(token: &str) -> bool {
    token.contains('[')
}

/// Finds the end of the name and the byte ranges of every depth-1 qualifier.
fn scan(token: &str) -> Result<(usize, Vec<Range<usize>>), PathError> {
    let mut name_end = None;
    let mut spans = Vec::new();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = token.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match stack.last().map(|(delim, _)| *delim) {
            None => match c {
                '[' => {
                    name_end.get_or_insert(offset);
                    stack.push((c, offset));
                }
                ']' => return Err(unbalanced(token, offset)),
                _ => {}
            },
            Some('[') => match c {
                '\\' if matches!(chars.peek(), Some((_, ']'))) => {
                    chars.next();
                }
                '[' | '\'' | '"' => stack.push((c, offset)),
                ']' => {
                    if let Some((_, open)) = stack.pop()
                        && stack.is_empty()
                    {
                        spans.push(open + 1..offset);
                    }
                }
                _ => {}
            },
            Some(quote) => {
                if c == quote {
                    stack.pop();
                }
            }
        }
    }

    if let Some((_, offset)) = stack.last() {
        return Err(unbalanced(token, *offset));
    }
    Ok((name_end.unwrap_or(token.len()), spans))
}

fn clean_value(raw: &str) -> String {
    if raw.starts_with('[') {
        return raw.to_string();
    }
    let bytes = raw.as_bytes();
    let unquoted = match (bytes.first(), bytes.last()) {
        (Some(b'\''), Some(b'\'')) | (Some(b'"'), Some(b'"')) if raw.len() >= 2 => {
            &raw[1..raw.len() - 1]
        }
        _ => raw,
    };
    unquoted.replace("\\]", "]")
}
