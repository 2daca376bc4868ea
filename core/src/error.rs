use std::fmt::Display;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone)]
pub enum Error {
    Message(String),
    /// Input text could not be parsed into a document tree.
    MalformedDocument(String),
    /// Named field absent from the expected object.
    FieldNotFound(String),
    /// (expected kind, found kind)
    TypeMismatch(&'static str, &'static str),
    /// (declared element count, document array length)
    ShapeMismatch(usize, usize),
    /// Integer representation outside the enum's declared value set.
    InvalidEnumValue(i64),
    /// Polymorphic object carries no type tag key.
    MissingTypeTag,
    /// Type tag read from the document is absent from the registry.
    UnknownTag(String),
    /// Runtime type was never registered under any tag.
    UnregisteredType(&'static str),
}

impl Display for Error {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Message(msg) => formatter.write_str(msg),
            Error::MalformedDocument(msg) => {
                write!(formatter, "malformed document: {}", msg)
            }
            Error::FieldNotFound(name) => {
                write!(formatter, "field not found: {:?}", name)
            }
            Error::TypeMismatch(expected, found) => {
                write!(formatter, "expected {} node, found {}", expected, found)
            }
            Error::ShapeMismatch(expected, found) => {
                write!(formatter, "expected {} elements, found {}", expected, found)
            }
            Error::InvalidEnumValue(value) => {
                write!(formatter, "invalid enum value: {}", value)
            }
            Error::MissingTypeTag => formatter.write_str("missing type tag"),
            Error::UnknownTag(tag) => {
                write!(formatter, "unknown type tag: {:?}", tag)
            }
            Error::UnregisteredType(name) => {
                write!(formatter, "unregistered type: {}", name)
            }
        }
    }
}

impl std::error::Error for Error {}
