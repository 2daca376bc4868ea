pub mod codec;
pub mod de;
pub mod document;
pub mod error;
pub mod ser;

mod context;

#[cfg(test)]
mod tests;

pub use crate::{
    codec::{Category, Codec, Describe, Visitor},
    de::{from_document, from_reader, from_str, Decoder},
    document::{parse, print},
    error::{Error, Result},
    ser::{to_document, to_string, to_string_pretty, to_writer, Config, Encoder},
};
pub use serde_json::{Map, Value};
