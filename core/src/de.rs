use crate::{
    codec::{Codec, Visitor},
    context::{Context, Label},
    document,
    error::{Error, Result},
    ser::Config,
};
use serde_json::Value;
use std::io::Read;

pub fn from_document<T>(document: Value, name: &str) -> Result<T>
where
    T: Codec + Default,
{
    from_document_config(document, name, Config::default())
}

pub fn from_document_config<T>(document: Value, name: &str, config: Config) -> Result<T>
where
    T: Codec + Default,
{
    let mut value = T::default();
    Decoder::new(document, config).decode(name, &mut value)?;
    Ok(value)
}

pub fn from_str<T>(text: &str, name: &str) -> Result<T>
where
    T: Codec + Default,
{
    from_document(document::parse(text)?, name)
}

pub fn from_reader<R, T>(reader: &mut R, name: &str) -> Result<T>
where
    R: Read,
    T: Codec + Default,
{
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|error| Error::MalformedDocument(error.to_string()))?;
    from_str(&text, name)
}

/// One decode session. Consumes the document; nodes are taken out of their
/// parents as the traversal reaches them, and the whole session aborts on the
/// first failure.
pub struct Decoder {
    ctx: Context,
    version: u32,
    pending: Option<Value>,
}

impl Decoder {
    pub fn new(document: Value, config: Config) -> Self {
        Self {
            ctx: Context::with_root(document),
            version: config.version,
            pending: None,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Decodes the value stored under `name` in the document's top-level
    /// object. Fails with [`Error::FieldNotFound`] before touching `value`
    /// when the name is absent.
    pub fn decode<T: Codec>(mut self, name: &str, value: &mut T) -> Result<()> {
        if !matches!(self.ctx.current(), Value::Object(_)) {
            return Err(Error::TypeMismatch(
                "object",
                document::kind_name(self.ctx.current()),
            ));
        }
        let node = self.take_field(name)?;
        self.entry(Label::Name(name.to_owned()), node, value)
    }

    /// Takes the scalar node routed to the current scalar strategy.
    pub fn scalar(&mut self, expected: &'static str) -> Result<Value> {
        match self.pending.take() {
            Some(node) => Ok(node),
            None => Err(Error::TypeMismatch(
                expected,
                document::kind_name(self.ctx.current()),
            )),
        }
    }

    pub fn scalar_i64(&mut self) -> Result<i64> {
        let node = self.scalar("integer")?;
        node.as_i64()
            .ok_or_else(|| Error::TypeMismatch("integer", document::kind_name(&node)))
    }

    /// True when the node routed to the current strategy is a document Null,
    /// meaning an absent pointer.
    pub fn is_null(&self) -> bool {
        matches!(self.pending, Some(Value::Null))
    }

    /// Consumes the pending Null of an absent pointer.
    pub fn take_null(&mut self) {
        self.pending = None;
    }

    /// Number of elements in the array at the cursor top.
    pub fn array_len(&self) -> Result<usize> {
        if let Some(node) = &self.pending {
            return Err(Error::TypeMismatch("array", document::kind_name(node)));
        }
        match self.ctx.current() {
            Value::Array(items) => Ok(items.len()),
            node => Err(Error::TypeMismatch("array", document::kind_name(node))),
        }
    }

    /// Decodes one sequence element out of the array at the cursor top.
    pub fn element<T: Codec>(&mut self, index: usize, item: &mut T) -> Result<()> {
        let node = self.take_element(index)?;
        self.entry(Label::Index(index), node, item)
    }

    /// Decodes one map entry from the pair record at `index` in the array at
    /// the cursor top.
    pub fn pair<K: Codec, V: Codec>(
        &mut self,
        index: usize,
        key: &mut K,
        value: &mut V,
    ) -> Result<()> {
        let node = self.take_element(index)?;
        if !matches!(node, Value::Object(_)) {
            return Err(Error::TypeMismatch("object", document::kind_name(&node)));
        }
        self.ctx.push(Label::Index(index), node);
        let result = self
            .field("first", key)
            .and_then(|()| self.field("second", value));
        self.ctx.pop_discard();
        result
    }

    /// Takes the tag key written next to a polymorphic aggregate's fields.
    /// Fails with [`Error::MissingTypeTag`] when the object carries none.
    pub fn take_type_tag(&mut self, key: &str) -> Result<String> {
        if let Some(node) = &self.pending {
            return Err(Error::TypeMismatch("object", document::kind_name(node)));
        }
        match self.ctx.current_mut() {
            Value::Object(fields) => match fields.remove(key) {
                Some(Value::String(tag)) => Ok(tag),
                Some(node) => Err(Error::TypeMismatch("string", document::kind_name(&node))),
                None => Err(Error::MissingTypeTag),
            },
            node => Err(Error::TypeMismatch("object", document::kind_name(node))),
        }
    }

    fn take_field(&mut self, name: &str) -> Result<Value> {
        if let Some(node) = &self.pending {
            return Err(Error::TypeMismatch("object", document::kind_name(node)));
        }
        match self.ctx.current_mut() {
            Value::Object(fields) => fields
                .remove(name)
                .ok_or_else(|| Error::FieldNotFound(name.to_owned())),
            node => Err(Error::TypeMismatch("object", document::kind_name(node))),
        }
    }

    fn take_element(&mut self, index: usize) -> Result<Value> {
        if let Some(node) = &self.pending {
            return Err(Error::TypeMismatch("array", document::kind_name(node)));
        }
        match self.ctx.current_mut() {
            Value::Array(items) => items
                .get_mut(index)
                .map(std::mem::take)
                .ok_or_else(|| Error::Message(format!("array index {} out of bounds", index))),
            node => Err(Error::TypeMismatch("array", document::kind_name(node))),
        }
    }

    fn entry<T: Codec>(&mut self, label: Label, node: Value, value: &mut T) -> Result<()> {
        match node {
            node @ (Value::Array(_) | Value::Object(_)) => {
                self.ctx.push(label, node);
                let result = value.decode(self);
                self.ctx.pop_discard();
                result
            }
            node => {
                self.pending = Some(node);
                let result = value.decode(self);
                self.pending = None;
                result
            }
        }
    }
}

impl Visitor for Decoder {
    fn field<T: Codec>(&mut self, name: &str, value: &mut T) -> Result<()> {
        let node = self.take_field(name)?;
        self.entry(Label::Name(name.to_owned()), node, value)
    }
}
