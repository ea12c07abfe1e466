use std::fmt;
use std::sync::Arc;

use crate::loader::error::LoaderError;

/// Custom mapping from a root-relative path to its namespace segments.
pub type CaseFn = dyn Fn(&str) -> Vec<String> + Send + Sync;

/// How the first character of each derived segment is cased.
#[derive(Clone, Default)]
pub enum CaseStyle {
    /// Keep the segment as produced by the camel merge.
    #[default]
    Camel,
    /// Force the first character to lowercase.
    Lower,
    /// Force the first character to uppercase.
    Upper,
    /// Receive the raw relative path and return the full segment list.
    Custom(Arc<CaseFn>),
}

impl CaseStyle {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        CaseStyle::Custom(Arc::new(f))
    }
}

impl fmt::Debug for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStyle::Camel => write!(f, "Camel"),
            CaseStyle::Lower => write!(f, "Lower"),
            CaseStyle::Upper => write!(f, "Upper"),
            CaseStyle::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

/// Convert a root-relative file path into namespace segments.
///
/// `app/service/foo_bar.json` relative to `app/service` is `foo_bar.json`,
/// which becomes `["fooBar"]` under [`CaseStyle::Camel`] and `["FooBar"]`
/// under [`CaseStyle::Upper`].
pub fn derive_segments(relative_path: &str, style: &CaseStyle) -> Result<Vec<String>, LoaderError> {
    if let CaseStyle::Custom(f) = style {
        let segments = f(relative_path);
        if segments.is_empty() {
            return Err(LoaderError::InvalidSegments { path: relative_path.to_string() });
        }
        return Ok(segments);
    }

    strip_extension(relative_path)
        .split(['/', '\\'])
        .map(|segment| {
            if !is_identifier(segment) {
                return Err(LoaderError::Format {
                    segment: segment.to_string(),
                    path: relative_path.to_string(),
                });
            }
            Ok(apply_case(&camel_merge(segment), style))
        })
        .collect()
}

fn strip_extension(path: &str) -> &str {
    let file_start = path.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match path[file_start..].rfind('.') {
        Some(dot) => &path[..file_start + dot],
        None => path,
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}

// `foo_bar` / `foo-bar` -> `fooBar`
fn camel_merge(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut merged = String::with_capacity(segment.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if (c == '_' || c == '-') && chars.get(i + 1).is_some_and(|n| n.is_ascii_alphabetic()) {
            merged.push(chars[i + 1].to_ascii_uppercase());
            i += 2;
        } else {
            merged.push(c);
            i += 1;
        }
    }
    merged
}

fn apply_case(segment: &str, style: &CaseStyle) -> String {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let first = match style {
        CaseStyle::Lower => first.to_ascii_lowercase(),
        CaseStyle::Upper => first.to_ascii_uppercase(),
        CaseStyle::Camel | CaseStyle::Custom(_) => first,
    };
    std::iter::once(first).chain(chars).collect()
}
