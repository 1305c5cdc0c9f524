use pb_reflect::ReflectError;
use thiserror::Error;

/// Failure categories. Every [`Error`] maps onto exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// JSON text does not parse, or the top level is not an object.
    MalformedInput,
    /// The message or its descriptors cannot be used as asked.
    Schema,
    /// A key matches neither a field nor a known extension.
    UnknownField,
    /// The JSON value's kind does not fit the field.
    TypeMismatch,
    /// The kind fits but the value does not (range, enum lookup, base64).
    Value,
    /// Invalid options.
    Configuration,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("Load failed: {message} (line {line}, column {column})")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Malformed JSON: not an object")]
    NotAnObject,

    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error("{field}: cannot use \"{key}\" as an extension namespace, it holds a non-object value")]
    NamespaceConflict { field: String, key: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("{field}: Not array")]
    NotArray { field: String },

    #[error("{field}: Not a string")]
    NotString { field: String },

    #[error("{field}: Not an object")]
    NotObject { field: String },

    #[error("{field}: Not an integer or string")]
    NotIntegerOrString { field: String },

    #[error("{field}: null is not allowed for a required field")]
    RequiredNull { field: String },

    #[error("{field}: Failed to unpack: {reason}")]
    Unpack { field: String, reason: String },

    #[error("{field}: Enum value not found: {value}")]
    EnumValueNotFound { field: String, value: String },

    #[error("{field}: invalid base64: {source}")]
    Base64 {
        field: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("{field}: Fail to convert to json")]
    CannotConvert { field: String },

    #[error("real precision {0} is out of range 0..=31")]
    InvalidPrecision(u32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse { .. } | Error::NotAnObject => ErrorKind::MalformedInput,
            Error::Reflect(_) | Error::NamespaceConflict { .. } | Error::CannotConvert { .. } => {
                ErrorKind::Schema
            }
            Error::UnknownField(_) => ErrorKind::UnknownField,
            Error::NotArray { .. }
            | Error::NotString { .. }
            | Error::NotObject { .. }
            | Error::NotIntegerOrString { .. }
            | Error::RequiredNull { .. } => ErrorKind::TypeMismatch,
            Error::Unpack { .. } | Error::EnumValueNotFound { .. } | Error::Base64 { .. } => {
                ErrorKind::Value
            }
            Error::InvalidPrecision(_) | Error::InvalidConfig(_) => ErrorKind::Configuration,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
