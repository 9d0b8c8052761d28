//! Field-name sanitization and uniqueness checks for view types.

use crate::error::{NameStage, ViewError};
use std::collections::HashSet;

/// Turns `name` into an identifier-shaped field name.
///
/// Characters that are neither alphanumeric nor `_` become `_`, runs of `_`
/// collapse to one, and a leading character that cannot start an identifier
/// (a digit, or nothing at all) gets a `_` prefix. Non-ASCII letters are
/// kept.
pub fn sanitize_field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    for c in name.chars() {
        let c = if c.is_alphanumeric() || c == '_' { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    match out.chars().next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => out.insert(0, '_'),
    }
    out
}

/// Names that occur more than once, each listed once, in first-seen order.
pub(crate) fn duplicates<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(names.len());
    let mut reported = HashSet::new();
    let mut dups = Vec::new();
    for n in names {
        let n = n.as_ref();
        if !seen.insert(n) && reported.insert(n) {
            dups.push(n.to_string());
        }
    }
    dups
}

pub(crate) fn ensure_unique<S: AsRef<str>>(names: &[S], stage: NameStage) -> Result<(), ViewError> {
    let duplicates = duplicates(names);
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ViewError::DuplicateField { stage, duplicates })
    }
}
