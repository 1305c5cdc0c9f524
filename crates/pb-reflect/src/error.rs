use thiserror::Error;

/// Errors raised while building a descriptor pool or mutating a message
/// through reflection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReflectError {
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    #[error("{message}: duplicate field number {number}")]
    DuplicateFieldNumber { message: String, number: u32 },

    #[error("{field}: invalid field number {number}")]
    InvalidFieldNumber { field: String, number: u32 },

    #[error("{field}: unresolved type {type_name}")]
    UnresolvedType { field: String, type_name: String },

    #[error("{extension}: unknown extendee {extendee}")]
    UnknownExtendee { extension: String, extendee: String },

    #[error("{0}: enum has no values")]
    EmptyEnum(String),

    #[error("{field}: not a field of {message}")]
    FieldNotInMessage { field: String, message: String },

    #[error("{field}: value does not match the field type")]
    TypeMismatch { field: String },

    #[error("{field}: not a repeated field")]
    NotRepeated { field: String },

    #[error("{field}: not a message field")]
    NotAMessage { field: String },
}

pub type Result<T> = std::result::Result<T, ReflectError>;
