//! Key Serializer
//!
//! A `serde::Serializer` turning argument values into [`KeyValue`] trees.
//! Shapes with no structural equality (maps, NaN) are rejected.

use serde::ser::{self, Serialize};

use crate::error::CacheError;
use crate::key::KeyValue;

/// Serializes one argument value.
///
/// `allow_map` is only set for the top-level named-argument value, where a map
/// supplies the (name, value) pairs. Everywhere else a map is unhashable.
pub(crate) struct KeyValueSerializer {
    pub allow_map: bool,
}

impl KeyValueSerializer {
    pub fn nested() -> Self {
        Self { allow_map: false }
    }
}

pub(crate) fn to_key_value<T: Serialize + ?Sized>(value: &T) -> Result<KeyValue, CacheError> {
    value.serialize(KeyValueSerializer::nested())
}

impl ser::Serializer for KeyValueSerializer {
    type Ok = KeyValue;
    type Error = CacheError;

    type SerializeSeq = SeqCollector;
    type SerializeTuple = SeqCollector;
    type SerializeTupleStruct = SeqCollector;
    type SerializeTupleVariant = SeqCollector;
    type SerializeMap = MapCollector;
    type SerializeStruct = RecordCollector;
    type SerializeStructVariant = RecordCollector;

    fn serialize_bool(self, v: bool) -> Result<KeyValue, CacheError> {
        Ok(KeyValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<KeyValue, CacheError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<KeyValue, CacheError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<KeyValue, CacheError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<KeyValue, CacheError> {
        Ok(KeyValue::Int(v))
    }

    fn serialize_u8(self, v: u8) -> Result<KeyValue, CacheError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<KeyValue, CacheError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<KeyValue, CacheError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<KeyValue, CacheError> {
        // Same integer, same key, whatever its width or signedness
        Ok(match i64::try_from(v) {
            Ok(v) => KeyValue::Int(v),
            Err(_) => KeyValue::UInt(v),
        })
    }

    fn serialize_f32(self, v: f32) -> Result<KeyValue, CacheError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<KeyValue, CacheError> {
        if v.is_nan() {
            return Err(CacheError::Unhashable(
                "NaN is not equal to itself".to_string(),
            ));
        }
        // -0.0 == 0.0, so both must hash alike
        let v = if v == 0.0 { 0.0 } else { v };
        Ok(KeyValue::Float(v.to_bits()))
    }

    fn serialize_char(self, v: char) -> Result<KeyValue, CacheError> {
        Ok(KeyValue::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<KeyValue, CacheError> {
        Ok(KeyValue::Str(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<KeyValue, CacheError> {
        Ok(KeyValue::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<KeyValue, CacheError> {
        Ok(KeyValue::None)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<KeyValue, CacheError> {
        Ok(KeyValue::Some(Box::new(to_key_value(value)?)))
    }

    fn serialize_unit(self) -> Result<KeyValue, CacheError> {
        Ok(KeyValue::Unit)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<KeyValue, CacheError> {
        Ok(KeyValue::Unit)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<KeyValue, CacheError> {
        Ok(KeyValue::Variant(variant.to_owned(), Box::new(KeyValue::Unit)))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<KeyValue, CacheError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<KeyValue, CacheError> {
        let inner = to_key_value(value)?;
        Ok(KeyValue::Variant(variant.to_owned(), Box::new(inner)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqCollector, CacheError> {
        Ok(SeqCollector::new(len, None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqCollector, CacheError> {
        Ok(SeqCollector::new(Some(len), None))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqCollector, CacheError> {
        Ok(SeqCollector::new(Some(len), None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqCollector, CacheError> {
        Ok(SeqCollector::new(Some(len), Some(variant)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapCollector, CacheError> {
        if !self.allow_map {
            return Err(CacheError::Unhashable(
                "map values cannot be part of a key".to_string(),
            ));
        }
        Ok(MapCollector {
            pairs: Vec::with_capacity(len.unwrap_or(0)),
            pending: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<RecordCollector, CacheError> {
        Ok(RecordCollector::new(len, None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<RecordCollector, CacheError> {
        Ok(RecordCollector::new(len, Some(variant)))
    }
}

// == Collectors ==

pub(crate) struct SeqCollector {
    items: Vec<KeyValue>,
    variant: Option<&'static str>,
}

impl SeqCollector {
    fn new(len: Option<usize>, variant: Option<&'static str>) -> Self {
        Self {
            items: Vec::with_capacity(len.unwrap_or(0)),
            variant,
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CacheError> {
        self.items.push(to_key_value(value)?);
        Ok(())
    }

    fn finish(self) -> KeyValue {
        let seq = KeyValue::Seq(self.items);
        match self.variant {
            Some(variant) => KeyValue::Variant(variant.to_owned(), Box::new(seq)),
            None => seq,
        }
    }
}

impl ser::SerializeSeq for SeqCollector {
    type Ok = KeyValue;
    type Error = CacheError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CacheError> {
        self.push(value)
    }

    fn end(self) -> Result<KeyValue, CacheError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqCollector {
    type Ok = KeyValue;
    type Error = CacheError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CacheError> {
        self.push(value)
    }

    fn end(self) -> Result<KeyValue, CacheError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqCollector {
    type Ok = KeyValue;
    type Error = CacheError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CacheError> {
        self.push(value)
    }

    fn end(self) -> Result<KeyValue, CacheError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqCollector {
    type Ok = KeyValue;
    type Error = CacheError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CacheError> {
        self.push(value)
    }

    fn end(self) -> Result<KeyValue, CacheError> {
        Ok(self.finish())
    }
}

/// Collects a top-level map of named arguments. Names must be strings.
pub(crate) struct MapCollector {
    pairs: Vec<(String, KeyValue)>,
    pending: Option<String>,
}

impl ser::SerializeMap for MapCollector {
    type Ok = KeyValue;
    type Error = CacheError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), CacheError> {
        match to_key_value(key)? {
            KeyValue::Str(name) => {
                self.pending = Some(name);
                Ok(())
            }
            other => Err(CacheError::InvalidArgument(format!(
                "argument names must be strings, got {:?}",
                other
            ))),
        }
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CacheError> {
        let name = self.pending.take().ok_or_else(|| {
            CacheError::InvalidArgument("map value serialized before its key".to_string())
        })?;
        self.pairs.push((name, to_key_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<KeyValue, CacheError> {
        Ok(KeyValue::Record(self.pairs))
    }
}

pub(crate) struct RecordCollector {
    fields: Vec<(String, KeyValue)>,
    variant: Option<&'static str>,
}

impl RecordCollector {
    fn new(len: usize, variant: Option<&'static str>) -> Self {
        Self {
            fields: Vec::with_capacity(len),
            variant,
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), CacheError> {
        self.fields.push((name.to_owned(), to_key_value(value)?));
        Ok(())
    }

    fn finish(self) -> KeyValue {
        let record = KeyValue::Record(self.fields);
        match self.variant {
            Some(variant) => KeyValue::Variant(variant.to_owned(), Box::new(record)),
            None => record,
        }
    }
}

impl ser::SerializeStruct for RecordCollector {
    type Ok = KeyValue;
    type Error = CacheError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CacheError> {
        self.push(key, value)
    }

    fn end(self) -> Result<KeyValue, CacheError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for RecordCollector {
    type Ok = KeyValue;
    type Error = CacheError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CacheError> {
        self.push(key, value)
    }

    fn end(self) -> Result<KeyValue, CacheError> {
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize)]
    enum Shape {
        Empty,
        Circle(u32),
        Rect { w: u32, h: u32 },
    }

    #[test]
    fn test_integers_normalize_across_widths() {
        assert_eq!(to_key_value(&7u8).unwrap(), to_key_value(&7i64).unwrap());
        assert_eq!(to_key_value(&u64::MAX).unwrap(), KeyValue::UInt(u64::MAX));
    }

    #[test]
    fn test_signed_zero_floats_are_equal() {
        assert_eq!(to_key_value(&0.0f64).unwrap(), to_key_value(&-0.0f64).unwrap());
    }

    #[test]
    fn test_nan_is_unhashable() {
        let err = to_key_value(&f64::NAN).unwrap_err();
        assert!(matches!(err, CacheError::Unhashable(_)));
    }

    #[test]
    fn test_nested_map_is_unhashable() {
        let mut map = BTreeMap::new();
        map.insert("a", 1);
        let err = to_key_value(&vec![map]).unwrap_err();
        assert!(matches!(err, CacheError::Unhashable(_)));
    }

    #[test]
    fn test_structs_and_enums_are_structural() {
        let point = to_key_value(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(
            point,
            KeyValue::Record(vec![
                ("x".to_string(), KeyValue::Int(1)),
                ("y".to_string(), KeyValue::Int(2)),
            ])
        );

        assert_eq!(
            to_key_value(&Shape::Empty).unwrap(),
            KeyValue::Variant("Empty".to_string(), Box::new(KeyValue::Unit))
        );
        assert_ne!(
            to_key_value(&Shape::Circle(1)).unwrap(),
            to_key_value(&Shape::Rect { w: 1, h: 1 }).unwrap()
        );
    }

    #[test]
    fn test_options_are_tagged() {
        assert_eq!(
            to_key_value(&Some(3)).unwrap(),
            KeyValue::Some(Box::new(KeyValue::Int(3)))
        );
        assert_eq!(to_key_value(&None::<i32>).unwrap(), KeyValue::None);
    }

    #[test]
    fn test_nested_options_stay_distinct() {
        let none = to_key_value(&None::<Option<i32>>).unwrap();
        let some_none = to_key_value(&Some(None::<i32>)).unwrap();
        let some_unit = to_key_value(&Some(())).unwrap();
        let unit = to_key_value(&()).unwrap();

        assert_ne!(none, some_none);
        assert_ne!(some_unit, unit);
        assert_ne!(to_key_value(&None::<()>).unwrap(), unit);
        assert_ne!(to_key_value(&Some(3)).unwrap(), to_key_value(&3).unwrap());
    }
}
