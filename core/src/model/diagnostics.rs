#![deny(missing_docs)]

//! # Diagnostics
//!
//! Structured, non-fatal findings accumulated during a run.
//!
//! Diagnostics are returned alongside the document rather than thrown: a
//! single malformed input file must not abort processing of the remaining
//! files. The CLI collaborator decides how to surface them.

use std::fmt;

/// A single recoverable finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// One input file could not be parsed as JSON/YAML; the file was
    /// skipped and the run continued.
    ParseFailure {
        /// Source label of the failing file.
        label: String,
        /// Parser error message.
        message: String,
    },
    /// A `$ref` could not be located within its scope; a placeholder node
    /// was substituted. Reported once per distinct pointer per file.
    UnresolvedReference {
        /// Source label of the file containing the reference.
        label: String,
        /// The original pointer string.
        pointer: String,
    },
    /// Two differently-shaped schemas shared a name during a merge; the
    /// newcomer was renamed deterministically.
    NameCollision {
        /// The colliding schema name.
        name: String,
        /// Label of the file that registered the name first.
        existing_source: String,
        /// Label of the file whose schema was renamed.
        new_source: String,
        /// The disambiguated name the newcomer received.
        renamed_to: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ParseFailure { label, message } => {
                write!(f, "{}: parse failure: {}", label, message)
            }
            Diagnostic::UnresolvedReference { label, pointer } => {
                write!(f, "{}: unresolved reference '{}'", label, pointer)
            }
            Diagnostic::NameCollision {
                name,
                existing_source,
                new_source,
                renamed_to,
            } => write!(
                f,
                "schema '{}' from {} collides with {}; renamed to '{}'",
                name, new_source, existing_source, renamed_to
            ),
        }
    }
}
