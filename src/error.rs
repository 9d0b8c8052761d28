//! Error types for the map, the named views and the solver seam.

use crate::solver::SolverId;
use thiserror::Error;

/// Lookup miss in an [`EqualToMap`](crate::EqualToMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("key not found (hash {hash:#018x})")]
pub struct KeyNotFound {
    pub hash: u64,
}

/// Failures when defining a view type or wrapping a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// Raw field names repeat, or sanitization mapped distinct names onto
    /// the same identifier.
    #[error("field names must be unique; duplicated {stage} names: {}", format_names(.duplicates))]
    DuplicateField {
        stage: NameStage,
        duplicates: Vec<String>,
    },
    #[error("buffer length {actual} does not match the {expected} declared fields")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("'{name}' is not a field of {type_name}; the fields are {}", format_names(.fields))]
    UndeclaredField {
        type_name: String,
        name: String,
        fields: Vec<String>,
    },
}

/// Which set of names a duplicate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStage {
    Raw,
    Sanitized,
}

impl core::fmt::Display for NameStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NameStage::Raw => f.write_str("raw"),
            NameStage::Sanitized => f.write_str("sanitized"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("solver {0} is not available")]
    Unavailable(SolverId),
}

/// Renders names as a tuple literal: `('a', 'b')`.
pub(crate) fn format_names<S: AsRef<str>>(names: &[S]) -> String {
    let mut out = String::from("(");
    for (i, n) in names.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('\'');
        out.push_str(n.as_ref());
        out.push('\'');
    }
    if names.len() == 1 {
        out.push(',');
    }
    out.push(')');
    out
}
