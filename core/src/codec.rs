use crate::{
    de::Decoder,
    document,
    error::{Error, Result},
    ser::Encoder,
};
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
    rc::Rc,
    sync::Arc,
};

/// Encode/decode strategy selected for a value.
///
/// Pointer slots report their pointee's category when occupied and `Scalar`
/// when absent, so a null pointer lands in the document as a plain Null.
/// Enums report `Scalar` and travel as their discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Scalar,
    Sequence,
    FixedVector,
    Map,
    Aggregate,
}

impl Category {
    /// Empty document node of the shape this category fills in.
    pub(crate) fn empty_node(self) -> Value {
        match self {
            Category::Scalar => Value::Null,
            Category::Sequence | Category::FixedVector | Category::Map => Value::Array(Vec::new()),
            Category::Aggregate => Value::Object(serde_json::Map::new()),
        }
    }
}

/// A type the archive knows how to move in and out of a document node.
///
/// `encode` takes `&mut self` because the shared [`Describe`] entry point
/// does; encode strategies must not observably mutate the value.
pub trait Codec {
    fn category(&self) -> Category;
    fn encode(&mut self, enc: &mut Encoder) -> Result<()>;
    fn decode(&mut self, dec: &mut Decoder) -> Result<()>;
}

/// The external field-visitation protocol: an aggregate enumerates its named
/// fields, in declaration order, once per call. One `describe` body serves
/// both directions since [`Encoder`] and [`Decoder`] both implement
/// [`Visitor`].
pub trait Describe {
    fn describe<V: Visitor>(&mut self, visitor: &mut V, version: u32) -> Result<()>;
}

pub trait Visitor {
    fn field<T: Codec>(&mut self, name: &str, value: &mut T) -> Result<()>;
}

/// Implements [`Codec`] for aggregate types exposing [`Describe`].
#[macro_export]
macro_rules! aggregate_codec {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Codec for $ty {
            fn category(&self) -> $crate::Category {
                $crate::Category::Aggregate
            }

            fn encode(&mut self, enc: &mut $crate::Encoder) -> $crate::Result<()> {
                let version = enc.version();
                $crate::Describe::describe(self, enc, version)
            }

            fn decode(&mut self, dec: &mut $crate::Decoder) -> $crate::Result<()> {
                let version = dec.version();
                $crate::Describe::describe(self, dec, version)
            }
        }
    )+};
}

/// Implements [`Codec`] for C-like `Copy` enums, written to the document as
/// their integer discriminant. Decoding an integer outside the declared
/// variant set fails with [`Error::InvalidEnumValue`].
#[macro_export]
macro_rules! enum_codec {
    ($ty:ty { $($variant:ident),+ $(,)? }) => {
        impl $crate::Codec for $ty {
            fn category(&self) -> $crate::Category {
                $crate::Category::Scalar
            }

            fn encode(&mut self, enc: &mut $crate::Encoder) -> $crate::Result<()> {
                enc.emit($crate::Value::from(*self as i64));
                Ok(())
            }

            fn decode(&mut self, dec: &mut $crate::Decoder) -> $crate::Result<()> {
                let raw = dec.scalar_i64()?;
                *self = match raw {
                    $(value if value == <$ty>::$variant as i64 => <$ty>::$variant,)+
                    value => return Err($crate::Error::InvalidEnumValue(value)),
                };
                Ok(())
            }
        }
    };
}

macro_rules! impl_codec_signed {
    ($($ty:ty => $expected:literal),+ $(,)?) => {$(
        impl Codec for $ty {
            fn category(&self) -> Category {
                Category::Scalar
            }

            fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
                enc.emit(Value::from(*self));
                Ok(())
            }

            fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
                let node = dec.scalar($expected)?;
                *self = node
                    .as_i64()
                    .and_then(|raw| <$ty>::try_from(raw).ok())
                    .ok_or_else(|| Error::TypeMismatch($expected, document::kind_name(&node)))?;
                Ok(())
            }
        }
    )+};
}

macro_rules! impl_codec_unsigned {
    ($($ty:ty => $expected:literal),+ $(,)?) => {$(
        impl Codec for $ty {
            fn category(&self) -> Category {
                Category::Scalar
            }

            fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
                enc.emit(Value::from(*self));
                Ok(())
            }

            fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
                let node = dec.scalar($expected)?;
                *self = node
                    .as_u64()
                    .and_then(|raw| <$ty>::try_from(raw).ok())
                    .ok_or_else(|| Error::TypeMismatch($expected, document::kind_name(&node)))?;
                Ok(())
            }
        }
    )+};
}

impl_codec_signed!(i8 => "i8", i16 => "i16", i32 => "i32", i64 => "i64");
impl_codec_unsigned!(u8 => "u8", u16 => "u16", u32 => "u32", u64 => "u64");

impl Codec for bool {
    fn category(&self) -> Category {
        Category::Scalar
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        enc.emit(Value::Bool(*self));
        Ok(())
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        let node = dec.scalar("bool")?;
        *self = node
            .as_bool()
            .ok_or_else(|| Error::TypeMismatch("bool", document::kind_name(&node)))?;
        Ok(())
    }
}

impl Codec for f32 {
    fn category(&self) -> Category {
        Category::Scalar
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        enc.emit(Value::from(*self));
        Ok(())
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        let node = dec.scalar("f32")?;
        *self = node
            .as_f64()
            .ok_or_else(|| Error::TypeMismatch("f32", document::kind_name(&node)))?
            as f32;
        Ok(())
    }
}

impl Codec for f64 {
    fn category(&self) -> Category {
        Category::Scalar
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        enc.emit(Value::from(*self));
        Ok(())
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        let node = dec.scalar("f64")?;
        *self = node
            .as_f64()
            .ok_or_else(|| Error::TypeMismatch("f64", document::kind_name(&node)))?;
        Ok(())
    }
}

impl Codec for String {
    fn category(&self) -> Category {
        Category::Scalar
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        enc.emit(Value::String(self.clone()));
        Ok(())
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        let node = dec.scalar("string")?;
        *self = node
            .as_str()
            .ok_or_else(|| Error::TypeMismatch("string", document::kind_name(&node)))?
            .to_owned();
        Ok(())
    }
}

impl<T: Codec + Default> Codec for Vec<T> {
    fn category(&self) -> Category {
        Category::Sequence
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        for (index, item) in self.iter_mut().enumerate() {
            enc.element(index, item)?;
        }
        Ok(())
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        let len = dec.array_len()?;
        self.clear();
        self.reserve(len);
        for index in 0..len {
            let mut item = T::default();
            dec.element(index, &mut item)?;
            self.push(item);
        }
        Ok(())
    }
}

impl<T: Codec, const N: usize> Codec for [T; N] {
    fn category(&self) -> Category {
        Category::FixedVector
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        for (index, item) in self.iter_mut().enumerate() {
            enc.element(index, item)?;
        }
        Ok(())
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        let len = dec.array_len()?;
        if len != N {
            return Err(Error::ShapeMismatch(N, len));
        }
        for (index, item) in self.iter_mut().enumerate() {
            dec.element(index, item)?;
        }
        Ok(())
    }
}

// Maps travel as arrays of two-field pair records, never as native objects,
// since key types are not guaranteed to be strings. Iteration order of the
// source container is preserved; decode inserts in array order, so duplicate
// keys resolve last-write-wins.

impl<K, V> Codec for BTreeMap<K, V>
where
    K: Codec + Default + Clone + Ord,
    V: Codec + Default,
{
    fn category(&self) -> Category {
        Category::Map
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        for (index, (key, value)) in self.iter_mut().enumerate() {
            let mut key = key.clone();
            enc.pair(index, &mut key, value)?;
        }
        Ok(())
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        let len = dec.array_len()?;
        self.clear();
        for index in 0..len {
            let mut key = K::default();
            let mut value = V::default();
            dec.pair(index, &mut key, &mut value)?;
            self.insert(key, value);
        }
        Ok(())
    }
}

impl<K, V, S> Codec for HashMap<K, V, S>
where
    K: Codec + Default + Clone + Eq + Hash,
    V: Codec + Default,
    S: BuildHasher + Default,
{
    fn category(&self) -> Category {
        Category::Map
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        for (index, (key, value)) in self.iter_mut().enumerate() {
            let mut key = key.clone();
            enc.pair(index, &mut key, value)?;
        }
        Ok(())
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        let len = dec.array_len()?;
        self.clear();
        for index in 0..len {
            let mut key = K::default();
            let mut value = V::default();
            dec.pair(index, &mut key, &mut value)?;
            self.insert(key, value);
        }
        Ok(())
    }
}

// Pointers are owned values with optional absence. Occupied pointers are
// dereferenced transparently and encoded inline, with no identity
// deduplication: aliased shared pointers each encode an independent full
// copy, and decode produces distinct allocations. Cyclic graphs will not
// terminate; callers must keep owned graphs acyclic.

impl<T: Codec> Codec for Box<T> {
    fn category(&self) -> Category {
        (**self).category()
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        (**self).encode(enc)
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        (**self).decode(dec)
    }
}

impl<T: Codec + Default + Clone> Codec for Rc<T> {
    fn category(&self) -> Category {
        (**self).category()
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        match Rc::get_mut(self) {
            Some(value) => value.encode(enc),
            None => {
                // Aliased pointee; encode a detached copy.
                let mut copy = (**self).clone();
                copy.encode(enc)
            }
        }
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        let mut value = T::default();
        value.decode(dec)?;
        *self = Rc::new(value);
        Ok(())
    }
}

impl<T: Codec + Default + Clone> Codec for Arc<T> {
    fn category(&self) -> Category {
        (**self).category()
    }

    fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
        match Arc::get_mut(self) {
            Some(value) => value.encode(enc),
            None => {
                let mut copy = (**self).clone();
                copy.encode(enc)
            }
        }
    }

    fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
        let mut value = T::default();
        value.decode(dec)?;
        *self = Arc::new(value);
        Ok(())
    }
}

macro_rules! impl_codec_option_pointer {
    ($($pointer:ident [$($bound:ident),*]),+ $(,)?) => {$(
        impl<T: Codec + Default $(+ $bound)*> Codec for Option<$pointer<T>> {
            fn category(&self) -> Category {
                match self {
                    Some(value) => value.category(),
                    None => Category::Scalar,
                }
            }

            fn encode(&mut self, enc: &mut Encoder) -> Result<()> {
                match self {
                    Some(value) => value.encode(enc),
                    None => {
                        enc.emit(Value::Null);
                        Ok(())
                    }
                }
            }

            fn decode(&mut self, dec: &mut Decoder) -> Result<()> {
                if dec.is_null() {
                    dec.take_null();
                    *self = None;
                    return Ok(());
                }
                let mut value = T::default();
                value.decode(dec)?;
                *self = Some($pointer::new(value));
                Ok(())
            }
        }
    )+};
}

impl_codec_option_pointer!(Box [], Rc [Clone], Arc [Clone]);
