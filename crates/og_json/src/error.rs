use og_reflect::ops::ScalarError;
use thiserror::Error;

/// Errors raised while encoding or decoding JSON.
#[derive(Debug, Error)]
pub enum JsonError {
    /// The text does not follow the JSON grammar, or a writer was misused.
    #[error("JSON grammar error at line {line}, column {column}: {message}")]
    Grammar {
        line: usize,
        column: usize,
        message: String,
    },
    /// A composite value contains itself.
    #[error("cycle detected while encoding a value of type `{type_path}`")]
    Cycle { type_path: &'static str },
    /// `null` was read for a type that cannot be absent.
    #[error("`null` cannot be decoded into non-nullable type `{type_path}`")]
    Nullability { type_path: &'static str },
    /// A value could not be converted into the target type.
    #[error("cannot convert `{value}` to `{target}`")]
    Conversion { value: String, target: String },
    /// A type name could not be resolved.
    #[error("unknown type `{name}`")]
    TypeResolution { name: String },
    /// A converter, or the serde bridge, failed or is missing.
    #[error("converter for `{type_path}` failed: {message}")]
    Converter { type_path: String, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Fmt(#[from] core::fmt::Error),
}

impl JsonError {
    /// Creates a [`JsonError::Conversion`].
    pub fn conversion(value: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Conversion {
            value: value.into(),
            target: target.into(),
        }
    }

    /// Creates a [`JsonError::Converter`].
    pub fn converter(type_path: impl Into<String>, message: impl ToString) -> Self {
        Self::Converter {
            type_path: type_path.into(),
            message: message.to_string(),
        }
    }
}

impl From<ScalarError> for JsonError {
    fn from(error: ScalarError) -> Self {
        Self::Conversion {
            value: error.value,
            target: error.target.to_owned(),
        }
    }
}

pub type Result<T, E = JsonError> = core::result::Result<T, E>;
