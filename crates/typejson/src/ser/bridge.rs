//! Builds runtime [`Value`]s from `serde::Serialize` types.
//!
//! Structs become composite objects of a type synthesized per struct name
//! and field list, so they get cycle tracking, `$type` and the member
//! policies like any registered type. Maps become `Map<string, object>`
//! when every key is a string, sequences become `List<object>`.

use serde::Serialize;
use serde::ser::*;

use crate::error::Error;
use crate::manager::Manager;
use crate::types::Type;
use crate::value::{List, Map, ObjectRef, Value};

pub fn to_value<T: Serialize + ?Sized>(value: &T, manager: &Manager) -> crate::Result<Value> {
    value.serialize(ValueSerializer { manager })
}

/// Parses JSON text into the runtime value model.
pub fn from_json_str(s: &str, manager: &Manager) -> crate::Result<Value> {
    let json: serde_json::Value = serde_json::from_str(s)?;
    to_value(&json, manager)
}

#[derive(Clone, Copy)]
struct ValueSerializer<'m> {
    manager: &'m Manager,
}

fn untyped_list(items: Vec<Value>) -> Value {
    Value::List(List::of(&Type::any(), items))
}

fn single_entry(key: &str, value: Value) -> Value {
    let mut m = Map::new(&Type::string(), &Type::any());
    m.insert(key, value);
    Value::Map(m)
}

impl<'m> Serializer for ValueSerializer<'m> {
    type Ok = Value;
    type Error = Error;
    type SerializeSeq = SeqSerializer<'m>;
    type SerializeTuple = SeqSerializer<'m>;
    type SerializeTupleStruct = SeqSerializer<'m>;
    type SerializeTupleVariant = SeqSerializer<'m>;
    type SerializeMap = MapSerializer<'m>;
    type SerializeStruct = StructSerializer<'m>;
    type SerializeStructVariant = StructSerializer<'m>;

    fn serialize_bool(self, v: bool) -> Result<Value, Error> { Ok(Value::Bool(v)) }
    fn serialize_i8(self, v: i8) -> Result<Value, Error> { Ok(Value::I8(v)) }
    fn serialize_i16(self, v: i16) -> Result<Value, Error> { Ok(Value::I16(v)) }
    fn serialize_i32(self, v: i32) -> Result<Value, Error> { Ok(Value::I32(v)) }
    fn serialize_i64(self, v: i64) -> Result<Value, Error> { Ok(Value::I64(v)) }
    fn serialize_u8(self, v: u8) -> Result<Value, Error> { Ok(Value::U8(v)) }
    fn serialize_u16(self, v: u16) -> Result<Value, Error> { Ok(Value::U16(v)) }
    fn serialize_u32(self, v: u32) -> Result<Value, Error> { Ok(Value::U32(v)) }
    fn serialize_u64(self, v: u64) -> Result<Value, Error> { Ok(Value::U64(v)) }
    fn serialize_f32(self, v: f32) -> Result<Value, Error> { Ok(Value::F32(v)) }
    fn serialize_f64(self, v: f64) -> Result<Value, Error> { Ok(Value::F64(v)) }
    fn serialize_char(self, v: char) -> Result<Value, Error> { Ok(Value::Char(v)) }
    fn serialize_str(self, v: &str) -> Result<Value, Error> { Ok(Value::String(v.to_string())) }
    fn serialize_bytes(self, v: &[u8]) -> Result<Value, Error> { Ok(Value::Bytes(v.to_vec())) }
    fn serialize_none(self) -> Result<Value, Error> { Ok(Value::Null) }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, Error> { value.serialize(self) }
    fn serialize_unit(self) -> Result<Value, Error> { Ok(Value::Null) }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Error> { Ok(Value::Null) }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, Error> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, Error> {
        Ok(single_entry(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Error> {
        Ok(SeqSerializer {
            ser: self,
            elems: Vec::with_capacity(len.unwrap_or(0)),
            variant: None,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Error> {
        Ok(SeqSerializer {
            ser: self,
            elems: Vec::with_capacity(len),
            variant: Some(variant),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Error> {
        Ok(MapSerializer {
            ser: self,
            entries: Vec::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Error> {
        Ok(StructSerializer {
            ser: self,
            name: name.to_string(),
            fields: Vec::with_capacity(len),
            variant: None,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Error> {
        Ok(StructSerializer {
            ser: self,
            name: format!("{name}::{variant}"),
            fields: Vec::with_capacity(len),
            variant: Some(variant),
        })
    }
}

pub struct SeqSerializer<'m> {
    ser: ValueSerializer<'m>,
    elems: Vec<Value>,
    variant: Option<&'static str>,
}

impl SerializeSeq for SeqSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.elems.push(value.serialize(self.ser)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        let list = untyped_list(self.elems);
        Ok(match self.variant {
            Some(variant) => single_entry(variant, list),
            None => list,
        })
    }
}

impl SerializeTuple for SeqSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        SerializeSeq::serialize_element(self, value)
    }
    fn end(self) -> Result<Value, Error> {
        SerializeSeq::end(self)
    }
}

impl SerializeTupleStruct for SeqSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        SerializeSeq::serialize_element(self, value)
    }
    fn end(self) -> Result<Value, Error> {
        SerializeSeq::end(self)
    }
}

impl SerializeTupleVariant for SeqSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        SerializeSeq::serialize_element(self, value)
    }
    fn end(self) -> Result<Value, Error> {
        SerializeSeq::end(self)
    }
}

pub struct MapSerializer<'m> {
    ser: ValueSerializer<'m>,
    entries: Vec<(Value, Value)>,
    next_key: Option<Value>,
}

impl SerializeMap for MapSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Error> {
        self.next_key = Some(key.serialize(self.ser)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::Message("map value serialized before its key".into()))?;
        self.entries.push((key, value.serialize(self.ser)?));
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        let string_keys = self
            .entries
            .iter()
            .all(|(k, _)| matches!(k, Value::String(_)));
        let key_type = if string_keys { Type::string() } else { Type::any() };
        let mut map = Map::new(&key_type, &Type::any());
        map.entries = self.entries;
        Ok(Value::Map(map))
    }
}

pub struct StructSerializer<'m> {
    ser: ValueSerializer<'m>,
    name: String,
    fields: Vec<(&'static str, Value)>,
    variant: Option<&'static str>,
}

impl SerializeStruct for StructSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.fields.push((key, value.serialize(self.ser)?));
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        let names: Vec<&str> = self.fields.iter().map(|(k, _)| *k).collect();
        let ty = self.ser.manager.struct_type(&self.name, &names);
        let obj = ObjectRef::new(&ty);
        for (key, value) in self.fields {
            obj.set(key, value);
        }
        Ok(match self.variant {
            Some(variant) => single_entry(variant, Value::Object(obj)),
            None => Value::Object(obj),
        })
    }
}

impl SerializeStructVariant for StructSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        SerializeStruct::serialize_field(self, key, value)
    }
    fn end(self) -> Result<Value, Error> {
        SerializeStruct::end(self)
    }
}
