//! Key Module
//!
//! Builds hashable cache keys from heterogeneous call arguments.
//!
//! Argument values are converted through `serde::Serialize` into a
//! [`KeyValue`] tree compared and hashed structurally. Values that cannot take
//! part in a key (maps nested inside arguments, NaN floats) are rejected with
//! [`CacheError::Unhashable`] rather than coerced.
//!
//! Named arguments keep the order they are supplied in. The same names given
//! in a different order produce a different key.

mod serializer;

use serde::Serialize;

use crate::error::{CacheError, Result};
use serializer::{to_key_value, KeyValueSerializer};

// == Key Value ==
/// One argument value in hashable form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    /// `()` and unit structs
    Unit,
    /// An absent `Option`
    None,
    /// A present `Option`, tagged so `Some(x)` never equals `x`
    Some(Box<KeyValue>),
    Bool(bool),
    /// Any integer that fits in an `i64`, regardless of its source type
    Int(i64),
    /// Unsigned integers above `i64::MAX`
    UInt(u64),
    /// Bit pattern of a non-NaN float, with -0.0 folded into 0.0
    Float(u64),
    Str(String),
    Bytes(Vec<u8>),
    /// Sequences and tuples
    Seq(Vec<KeyValue>),
    /// Struct fields in declaration order
    Record(Vec<(String, KeyValue)>),
    /// Enum variant name and its payload
    Variant(String, Box<KeyValue>),
}

// == Key ==
/// Cache key made of positional values and ordered (name, value) pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Key {
    positional: Vec<KeyValue>,
    named: Vec<(String, KeyValue)>,
}

impl Key {
    // == Builder ==
    /// Starts an empty [`KeyBuilder`].
    pub fn builder() -> KeyBuilder {
        KeyBuilder::default()
    }

    // == Accessors ==
    /// Positional values in call order.
    pub fn positional(&self) -> &[KeyValue] {
        &self.positional
    }

    /// Named (name, value) pairs in the order they were supplied.
    pub fn named(&self) -> &[(String, KeyValue)] {
        &self.named
    }
}

// == Build Key ==
/// Builds a key from a positional argument list and a named argument set.
///
/// `positional` is usually a tuple; each element becomes one positional
/// value. A sequence contributes its elements, `()` contributes none and any
/// other value (including `None`) is a single positional value.
///
/// `named` must serialize to a struct or a map with string keys (or `()` for
/// none). Pairs are kept in serialization order: declaration order for
/// structs, iteration order for maps.
///
/// # Errors
/// - `CacheError::Unhashable` if an argument holds unhashable material
/// - `CacheError::InvalidArgument` if `named` is not a struct or map
pub fn build_key<P, N>(positional: &P, named: &N) -> Result<Key>
where
    P: Serialize + ?Sized,
    N: Serialize + ?Sized,
{
    let positional = match to_key_value(positional)? {
        KeyValue::Unit => Vec::new(),
        KeyValue::Seq(items) => items,
        other => vec![other],
    };

    let named = match named.serialize(KeyValueSerializer { allow_map: true })? {
        KeyValue::Unit => Vec::new(),
        KeyValue::Record(pairs) => pairs,
        other => {
            return Err(CacheError::InvalidArgument(format!(
                "named arguments must be a struct or map, got {:?}",
                other
            )))
        }
    };

    Ok(Key { positional, named })
}

// == Key Builder ==
/// Incremental key construction, one argument at a time.
///
/// ```
/// use power_cache::key::Key;
///
/// let key = Key::builder()
///     .arg(&3)?
///     .arg("x")?
///     .named("verbose", &true)?
///     .build();
/// assert_eq!(key.positional().len(), 2);
/// # Ok::<(), power_cache::CacheError>(())
/// ```
#[derive(Debug, Default)]
pub struct KeyBuilder {
    key: Key,
}

impl KeyBuilder {
    // == Arg ==
    /// Appends one positional value.
    ///
    /// # Errors
    /// `CacheError::Unhashable` if `value` holds unhashable material.
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.key.positional.push(to_key_value(value)?);
        Ok(self)
    }

    // == Named ==
    /// Appends one named value after any already added.
    ///
    /// # Errors
    /// `CacheError::Unhashable` if `value` holds unhashable material.
    pub fn named<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Result<Self> {
        self.key.named.push((name.into(), to_key_value(value)?));
        Ok(self)
    }

    // == Build ==
    /// Finishes the key.
    pub fn build(self) -> Key {
        self.key
    }
}

// == Call Arguments ==
/// Argument value accepted by memoized callables.
///
/// Implemented for `()`, tuples of up to eight serializable values (all
/// positional) and [`Args`] (positional plus named).
pub trait CallArgs {
    /// Builds the cache key for this argument value.
    fn to_key(&self) -> Result<Key>;
}

impl CallArgs for () {
    fn to_key(&self) -> Result<Key> {
        Ok(Key::default())
    }
}

macro_rules! impl_call_args_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: Serialize),+> CallArgs for ($($name,)+) {
            fn to_key(&self) -> Result<Key> {
                build_key(self, &())
            }
        }
    };
}

impl_call_args_for_tuple!(A);
impl_call_args_for_tuple!(A, B);
impl_call_args_for_tuple!(A, B, C);
impl_call_args_for_tuple!(A, B, C, D);
impl_call_args_for_tuple!(A, B, C, D, E);
impl_call_args_for_tuple!(A, B, C, D, E, F);
impl_call_args_for_tuple!(A, B, C, D, E, F, G);
impl_call_args_for_tuple!(A, B, C, D, E, F, G, H);

/// Positional and named arguments for one call.
///
/// `positional` is typically a tuple and `named` a struct whose fields are
/// the argument names.
#[derive(Debug, Clone, PartialEq)]
pub struct Args<P, N> {
    pub positional: P,
    pub named: N,
}

impl<P, N> Args<P, N> {
    /// Positional and named arguments together.
    pub fn new(positional: P, named: N) -> Self {
        Self { positional, named }
    }
}

impl<N> Args<(), N> {
    /// Named arguments only.
    pub fn named(named: N) -> Self {
        Self::new((), named)
    }
}

impl<P: Serialize, N: Serialize> CallArgs for Args<P, N> {
    fn to_key(&self) -> Result<Key> {
        build_key(&self.positional, &self.named)
    }
}
