
use json_archive::{Category, Codec, Decoder, Describe, Encoder, Error, Result, Value};
use std::{
    any::{type_name, Any, TypeId},
    sync::{Arc, RwLock},
};

/// Key under which a polymorphic aggregate's resolved type tag is written,
/// next to its visited fields.
pub const TYPE_TAG_KEY: &str = "class_name";

lazy_static::lazy_static! {
    static ref FACTORIES: Arc<RwLock<Vec<Factory>>> = Default::default();
}

struct Factory {
    type_tag: &'static str,
    type_id: TypeId,
    construct: fn() -> Box<dyn Polymorphic>,
}

fn construct_default<T: Describe + Default + 'static>() -> Box<dyn Polymorphic> {
    Box::new(T::default())
}

/// Object-safe facet over [`Describe`] for slots whose concrete type is only
/// known at runtime. Blanket-implemented for every describable type.
pub trait Polymorphic: Any {
    fn describe_encode(&mut self, enc: &mut Encoder) -> Result<()>;
    fn describe_decode(&mut self, dec: &mut Decoder) -> Result<()>;
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Describe + Any> Polymorphic for T {
    fn describe_encode(&mut self, enc: &mut Encoder) -> Result<()> {
        let version = enc.version();
        self.describe(enc, version)
    }

    fn describe_decode(&mut self, dec: &mut Decoder) -> Result<()> {
        let version = dec.version();
        self.describe(dec, version)
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Associates a stable tag with a concrete type. Call once per concrete
/// polymorphic type, single-threaded, before any session touches the type;
/// the registry is treated as immutable afterwards. Registering an already
/// registered type is a no-op.
pub fn register<T>(type_tag: &'static str)
where
    T: Describe + Default + 'static,
{
    if let Ok(mut factories) = FACTORIES.write() {
        let type_id = TypeId::of::<T>();
        if factories.iter().any(|factory| factory.type_id == type_id) {
            return;
        }
        factories.push(Factory {
            type_tag,
            type_id,
            construct: construct_default::<T>,
        });
    }
}

pub fn is_registered<T: 'static>() -> bool {
    if let Ok(factories) = FACTORIES.read() {
        let type_id = TypeId::of::<T>();
        return factories.iter().any(|factory| factory.type_id == type_id);
    }
    false
}

/// Resolves the tag registered for a value's runtime type.
pub fn tag_for(value: &dyn Polymorphic) -> Result<&'static str> {
    let type_id = value.as_any().type_id();
    if let Ok(factories) = FACTORIES.read() {
        if let Some(factory) = factories.iter().find(|factory| factory.type_id == type_id) {
            return Ok(factory.type_tag);
        }
    }
    Err(Error::UnregisteredType(value.type_name()))
}

/// Constructs an empty instance of the concrete type registered under `tag`.
pub fn construct(type_tag: &str) -> Result<Box<dyn Polymorphic>> {
    if let Ok(factories) = FACTORIES.read() {
        if let Some(factory) = factories.iter().find(|factory| factory.type_tag == type_tag) {
            return Ok((factory.construct)());
        }
    }
    Err(Error::UnknownTag(type_tag.to_owned()))
}

/// Pointer slot whose pointee's concrete type is resolved through the
/// registry at runtime. Encodes as an object carrying the resolved tag under
/// [`TYPE_TAG_KEY`] next to the aggregate's fields, or as Null when empty.
#[derive(Default)]
pub struct Poly(Option<Box<dyn Polymorphic>>);

impl Poly {
    pub fn new<T: Describe + Any>(value: T) -> Self {
        Self(Some(Box::new(value)))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<&dyn Polymorphic> {
        self.0.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut dyn Polymorphic> {
        self.0.as_deref_mut()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_ref().and_then(|value| value.as_any().downcast_ref())
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0
            .as_mut()
            .and_then(|value| value.as_any_mut().downcast_mut())
    }
}

impl std::fmt::Debug for Poly {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.0 {
            Some(value) => write!(formatter, "Poly({})", value.type_name()),
            None => formatter.write_str("Poly(None)"),
        }
    }
}

impl Codec for Poly {
    fn category(&self) -> Category {
        match &self.0 {
            Some(_) => Category::Aggregate,
            None => Category::Scalar,
        }
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        match &mut self.0 {
            Some(value) => {
                let type_tag = tag_for(value.as_ref())?;
                enc.put_field(TYPE_TAG_KEY, Value::from(type_tag))?;
                value.describe_encode(enc)
            }
            None => {
                enc.emit(Value::Null);
                Ok(())
            }
        }
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        if dec.is_null() {
            dec.take_null();
            self.0 = None;
            return Ok(());
        }
        let type_tag = dec.take_type_tag(TYPE_TAG_KEY)?;
        let mut value = construct(&type_tag)?;
        value.describe_decode(dec)?;
        self.0 = Some(value);
        Ok(())
    }
}
