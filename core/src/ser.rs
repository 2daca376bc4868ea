use crate::{
    codec::{Category, Codec, Visitor},
    context::{Context, Label},
    document,
    error::{Error, Result},
};
use serde_json::Value;
use std::io::Write;

/// Session construction parameters shared by encode and decode. The version
/// number is handed to every `describe` call and otherwise ignored by the
/// codec; the pretty flag affects printed whitespace only.
#[derive(Debug, Default, Clone, Copy)]
pub struct Config {
    pub version: u32,
    pub pretty: bool,
}

impl Config {
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

pub fn to_document<T>(name: &str, value: &mut T) -> Result<Value>
where
    T: Codec,
{
    Encoder::new(Config::default()).encode(name, value)
}

pub fn to_string<T>(name: &str, value: &mut T) -> Result<String>
where
    T: Codec,
{
    to_string_config(name, value, Config::default())
}

pub fn to_string_pretty<T>(name: &str, value: &mut T) -> Result<String>
where
    T: Codec,
{
    to_string_config(name, value, Config::default().with_pretty(true))
}

pub fn to_string_config<T>(name: &str, value: &mut T, config: Config) -> Result<String>
where
    T: Codec,
{
    let document = Encoder::new(config).encode(name, value)?;
    document::print(&document, config.pretty)
}

pub fn to_writer<T, W>(writer: &mut W, name: &str, value: &mut T, config: Config) -> Result<()>
where
    T: Codec,
    W: Write,
{
    let text = to_string_config(name, value, config)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|error| Error::Message(error.to_string()))
}

/// One encode session. Owns the cursor stack, rooted at an empty object, and
/// produces exactly one top-level node; any error aborts the session with no
/// partial document.
pub struct Encoder {
    ctx: Context,
    version: u32,
    emitted: Option<Value>,
}

impl Encoder {
    pub fn new(config: Config) -> Self {
        Self {
            ctx: Context::with_root(Value::Object(serde_json::Map::new())),
            version: config.version,
            emitted: None,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Encodes one root value under `name` and returns the finished document:
    /// an object holding exactly that one key.
    pub fn encode<T: Codec>(mut self, name: &str, value: &mut T) -> Result<Value> {
        self.entry(Label::Name(name.to_owned()), value)?;
        self.ctx.into_root()
    }

    /// Receives the finished node from a scalar strategy.
    pub fn emit(&mut self, node: Value) {
        self.emitted = Some(node);
    }

    /// Writes `node` under `name` into the object at the cursor top. Used by
    /// strategies that place keys besides visited fields, such as type tags.
    pub fn put_field(&mut self, name: &str, node: Value) -> Result<()> {
        self.ctx.put(Label::Name(name.to_owned()), node)
    }

    /// Encodes one sequence element into the array at the cursor top.
    pub fn element<T: Codec>(&mut self, index: usize, item: &mut T) -> Result<()> {
        self.entry(Label::Index(index), item)
    }

    /// Encodes one map entry as a two-field pair record appended to the array
    /// at the cursor top.
    pub fn pair<K: Codec, V: Codec>(
        &mut self,
        index: usize,
        key: &mut K,
        value: &mut V,
    ) -> Result<()> {
        self.ctx
            .push(Label::Index(index), Value::Object(serde_json::Map::new()));
        let result = self
            .field("first", key)
            .and_then(|()| self.field("second", value));
        match result {
            Ok(()) => self.ctx.pop_merge(),
            Err(error) => {
                self.ctx.pop_discard();
                Err(error)
            }
        }
    }

    fn entry<T: Codec>(&mut self, label: Label, value: &mut T) -> Result<()> {
        match value.category() {
            Category::Scalar => {
                self.emitted = None;
                value.encode(self)?;
                let node = self
                    .emitted
                    .take()
                    .ok_or_else(|| Error::Message("scalar strategy emitted no node".to_owned()))?;
                self.ctx.put(label, node)
            }
            category => {
                self.ctx.push(label, category.empty_node());
                match value.encode(self) {
                    Ok(()) => self.ctx.pop_merge(),
                    Err(error) => {
                        self.ctx.pop_discard();
                        Err(error)
                    }
                }
            }
        }
    }
}

impl Visitor for Encoder {
    fn field<T: Codec>(&mut self, name: &str, value: &mut T) -> Result<()> {
        self.entry(Label::Name(name.to_owned()), value)
    }
}
