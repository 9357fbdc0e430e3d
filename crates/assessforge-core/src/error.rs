//! Delivery error types.
//!
//! Setup failures (unresolvable references, unknown scoring models or test
//! kinds) are fatal for the attempt. Lifecycle misuse is reported through the
//! same enum so callers can match on it instead of parsing strings.

use thiserror::Error;

/// Errors raised while configuring or driving an assessment attempt.
#[derive(Debug, Error, PartialEq)]
pub enum DeliveryError {
    /// A section reference did not name any section in the document.
    #[error("unresolved section reference: {0}")]
    UnresolvedSectionRef(String),

    /// An item reference did not name any item in the document.
    #[error("unresolved item reference: {0}")]
    UnresolvedItemRef(String),

    /// The outcomes processing names a scoring model we do not implement.
    #[error("unsupported scoring algorithm: {0}")]
    UnsupportedScoreModel(String),

    /// A feedback condition uses a node kind outside the supported set.
    #[error("unsupported test node: {0}")]
    UnsupportedTestKind(String),

    /// A `variable_test` uses an unknown comparison operator.
    #[error("unsupported test operator: {0}")]
    UnsupportedOperator(String),

    /// A test node is missing a required part (operand, child).
    #[error("malformed {kind} node: {reason}")]
    MalformedTest { kind: String, reason: String },

    /// The assessment does not contain any section.
    #[error("assessment {0} has no sections")]
    NoSections(String),

    /// `setup` was called on an already configured context.
    #[error("assessment context is already configured")]
    AlreadyConfigured,

    /// An operation that needs a resolved tree ran before `setup`.
    #[error("assessment context is not configured")]
    NotConfigured,

    /// Responses are only accepted while the attempt is running and open.
    #[error("attempt is not accepting responses: {0}")]
    Closed(&'static str),

    /// Section index out of range.
    #[error("no section at position {0}")]
    NoSuchSection(usize),

    /// Item index out of range within a section.
    #[error("no item at position {item} in section {section}")]
    NoSuchItem { section: usize, item: usize },

    /// Lookup by identifier failed.
    #[error("unknown identifier: {0}")]
    UnknownIdent(String),
}

impl DeliveryError {
    /// Returns `true` if this error comes from the definition itself rather
    /// than from how the attempt is being driven.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DeliveryError::UnresolvedSectionRef(_)
                | DeliveryError::UnresolvedItemRef(_)
                | DeliveryError::UnsupportedScoreModel(_)
                | DeliveryError::UnsupportedTestKind(_)
                | DeliveryError::UnsupportedOperator(_)
                | DeliveryError::MalformedTest { .. }
                | DeliveryError::NoSections(_)
        )
    }
}
