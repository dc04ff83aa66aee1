use og_json::JsonError;
use thiserror::Error;

/// Errors raised while building, encoding, decoding or evaluating expressions.
#[derive(Debug, Error)]
pub enum ExprError {
    #[error(transparent)]
    Json(#[from] JsonError),
    /// A type name is not known to the type catalog.
    #[error("unknown type `{name}`")]
    TypeResolution { name: String },
    /// The declaring type has no such member.
    #[error("type `{type_path}` has no member `{member}`")]
    MemberResolution { type_path: String, member: String },
    /// No method of the catalog matches the recorded signature.
    #[error("no method `{type_path}::{method}` accepts ({parameters})")]
    MethodResolution {
        type_path: String,
        method: String,
        parameters: String,
    },
    /// The node kind is valid but cannot be reconstructed.
    #[error("`{kind}` nodes cannot be decoded")]
    UnsupportedNode { kind: String },
    /// The document does not describe an expression tree.
    #[error("malformed expression document: {message}")]
    Malformed { message: String },
    /// An expression failed while being evaluated.
    #[error("evaluation failed: {message}")]
    Evaluation { message: String },
}

impl ExprError {
    /// Creates an [`ExprError::Malformed`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates an [`ExprError::Evaluation`].
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }
}

pub type Result<T, E = ExprError> = core::result::Result<T, E>;
