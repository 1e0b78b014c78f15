//! Named-parameter template rendering
//!
//! Placeholders are written `:name;`. A `:` that is not followed by an
//! identifier and a `;` is literal text, so `s3://` and `field : STRING`
//! pass through untouched.

use crate::error::TemplateError;
use std::collections::{BTreeMap, BTreeSet};

/// Characters a parameter value may never contain
const FORBIDDEN: &[char] = &['`', '"', '\'', ';', '\n', '\r'];

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Named parameters for [`render`]
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: BTreeMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Placeholder names in order of first appearance, without duplicates.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    scan(template)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Placeholder(name) if seen.insert(name) => Some(name),
            _ => None,
        })
        .collect()
}

/// Substitute every placeholder in `template`.
///
/// Fails if a placeholder has no value, if a parameter is never referenced, or
/// if a value contains a quoting or statement-terminating character.
pub fn render(template: &str, params: &Params) -> Result<String, TemplateError> {
    for (name, value) in &params.values {
        if let Some(found) = value.chars().find(|c| FORBIDDEN.contains(c)) {
            return Err(TemplateError::UnsafeValue {
                name: name.to_string(),
                found,
            });
        }
    }

    let pieces = scan(template);
    let mut used = BTreeSet::new();
    let mut out = String::with_capacity(template.len());

    for piece in pieces {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Placeholder(name) => {
                let value =
                    params
                        .get(name)
                        .ok_or_else(|| TemplateError::UnresolvedPlaceholder {
                            name: name.to_string(),
                        })?;
                used.insert(name);
                out.push_str(value);
            }
        }
    }

    if let Some(unused) = params.names().find(|name| !used.contains(name)) {
        return Err(TemplateError::UnusedParameter {
            name: unused.to_string(),
        });
    }

    Ok(out)
}

fn scan(template: &str) -> Vec<Piece<'_>> {
    let bytes = template.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b':' {
            if let Some(len) = placeholder_len(&bytes[i + 1..]) {
                if start < i {
                    pieces.push(Piece::Literal(&template[start..i]));
                }
                pieces.push(Piece::Placeholder(&template[i + 1..i + 1 + len]));
                // skip ':' + name + ';'
                i += len + 2;
                start = i;
                continue;
            }
        }
        i += 1;
    }

    if start < bytes.len() {
        pieces.push(Piece::Literal(&template[start..]));
    }

    pieces
}

/// Length of the identifier at the start of `rest` if it is terminated by `;`.
fn placeholder_len(rest: &[u8]) -> Option<usize> {
    let first = *rest.first()?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }

    let len = rest
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();

    (rest.get(len) == Some(&b';')).then_some(len)
}
