//! Slash-separated paths and structured list-entry keys.
//!
//! A change event addresses its target with a path such as
//! `/interfaces/interface[name=eth0]/mtu`. [`parse_path`] splits it into
//! segments while keeping bracketed qualifiers intact, so a `/` inside a
//! qualifier value never splits a segment. Each segment can then be decomposed
//! with [`StructuredKey`].

mod errors;
mod key;

pub use errors::PathError;
pub use key::{StructuredKey, extract_name_and_substring, is_structured};

/// Splits a slash-separated path into its segments.
///
/// `/` separates segments only outside of brackets. Inside a bracketed
/// qualifier, quotes open literal spans and `\]` is an escaped `]`. Empty
/// segments (leading, trailing or doubled slashes) are dropped, so `""` and
/// `"/"` both yield an empty list.
///
/// # Examples
///
/// ```
/// use ysync::path::parse_path;
///
/// assert_eq!(parse_path("/a/b/c").unwrap(), vec!["a", "b", "c"]);
/// assert_eq!(parse_path("/a/b[k=v]/").unwrap(), vec!["a", "b[k=v]"]);
/// assert!(parse_path("/a]/").is_err());
/// ```
pub fn parse_path(path: &str) -> Result<Vec<String>, PathError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = path.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match stack.last().map(|(delim, _)| *delim) {
            None => match c {
                '/' => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                    continue;
                }
                '[' => stack.push((c, offset)),
                ']' => return Err(unbalanced(path, offset)),
                _ => {}
            },
            Some('[') => match c {
                '\\' if matches!(chars.peek(), Some((_, ']'))) => {
                    // Keep the escape so the segment can be re-parsed as a key.
                    current.push(c);
                    if let Some((_, escaped)) = chars.next() {
                        current.push(escaped);
                    }
                    continue;
                }
                '[' | '\'' | '"' => stack.push((c, offset)),
                ']' => {
                    stack.pop();
                }
                _ => {}
            },
            Some(quote) => {
                if c == quote {
                    stack.pop();
                }
            }
        }
        current.push(c);
    }

    if let Some((_, offset)) = stack.last() {
        return Err(unbalanced(path, *offset));
    }
    if !current.is_empty() {
        segments.push(current);
    }
    Ok(segments)
}

/// Renders segments back into a slash path. The empty list renders as `/`.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(segment.as_ref());
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

pub(crate) fn unbalanced(input: &str, offset: usize) -> PathError {
    PathError::Unbalanced {
        input: input.to_string(),
        offset,
    }
}
