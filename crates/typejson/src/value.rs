use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::types::{Primitive, Shape, Type};

/// Fixed-point decimal: `mantissa * 10^-scale`, printed with all `scale` digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    pub fn new(mantissa: i128, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if self.mantissa < 0 {
            f.write_str("-")?;
        }
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{int}.{frac}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}

/// Value with a runtime type tag, as handed to the encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    /// Database null marker; encoded exactly like `Null`.
    DbNull,
    Bool(bool),
    Char(char),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    String(String),
    DateTime(DateTime<FixedOffset>),
    TimeSpan(TimeDelta),
    Guid(Uuid),
    Bytes(Vec<u8>),
    Enum(EnumValue),
    /// Random-access list.
    List(List),
    /// Forward-only sequence.
    Sequence(List),
    Array(Array),
    Map(Map),
    StringDictionary(StringDictionary),
    NameValue(NameValueCollection),
    DataSet(DataSet),
    DataTable(DataTable),
    Object(ObjectRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::DbNull)
    }

    /// Runtime type of the value; `None` for the null markers.
    pub fn type_of(&self) -> Option<Type> {
        let t = match self {
            Value::Null | Value::DbNull => return None,
            Value::Bool(_) => Type::bool(),
            Value::Char(_) => Type::char(),
            Value::I8(_) => Type::i8(),
            Value::U8(_) => Type::u8(),
            Value::I16(_) => Type::i16(),
            Value::U16(_) => Type::u16(),
            Value::I32(_) => Type::i32(),
            Value::U32(_) => Type::u32(),
            Value::I64(_) => Type::i64(),
            Value::U64(_) => Type::u64(),
            Value::F32(_) => Type::f32(),
            Value::F64(_) => Type::f64(),
            Value::Decimal(_) => Type::decimal(),
            Value::String(_) => Type::string(),
            Value::DateTime(_) => Type::datetime(),
            Value::TimeSpan(_) => Type::timespan(),
            Value::Guid(_) => Type::guid(),
            Value::Bytes(_) => Type::bytes(),
            Value::Enum(e) => e.ty.clone(),
            Value::List(l) | Value::Sequence(l) => l.ty.clone(),
            Value::Array(a) => a.ty.clone(),
            Value::Map(m) => m.ty.clone(),
            Value::StringDictionary(_) => Type::string_dictionary(),
            Value::NameValue(_) => Type::name_value_collection(),
            Value::DataSet(_) => Type::data_set(),
            Value::DataTable(_) => Type::data_table(),
            Value::Object(o) => o.type_of().clone(),
        };
        Some(t)
    }

    /// Element count for countable containers.
    pub fn collection_len(&self) -> Option<usize> {
        match self {
            Value::Bytes(b) => Some(b.len()),
            Value::List(l) | Value::Sequence(l) => Some(l.items.len()),
            Value::Array(a) => Some(a.items.len()),
            Value::Map(m) => Some(m.entries.len()),
            Value::StringDictionary(d) => Some(d.len()),
            Value::NameValue(n) => Some(n.len()),
            _ => None,
        }
    }

    /// Items in iteration order, for values that can be enumerated.
    pub fn iter_items(&self) -> Option<Box<dyn Iterator<Item = Value> + '_>> {
        match self {
            Value::Bytes(b) => Some(Box::new(b.iter().map(|x| Value::U8(*x)))),
            Value::List(l) | Value::Sequence(l) => Some(Box::new(l.items.iter().cloned())),
            Value::Array(a) => Some(Box::new(a.items.iter().cloned())),
            _ => None,
        }
    }

    /// Zero value for `ty`: numeric zero, `false`, or null for reference-like types.
    pub fn default_for(ty: &Type) -> Value {
        match ty.shape() {
            Shape::Primitive(p) => match p {
                Primitive::Bool => Value::Bool(false),
                Primitive::Char => Value::Char('\0'),
                Primitive::I8 => Value::I8(0),
                Primitive::U8 => Value::U8(0),
                Primitive::I16 => Value::I16(0),
                Primitive::U16 => Value::U16(0),
                Primitive::I32 => Value::I32(0),
                Primitive::U32 => Value::U32(0),
                Primitive::I64 => Value::I64(0),
                Primitive::U64 => Value::U64(0),
                Primitive::F32 => Value::F32(0.0),
                Primitive::F64 => Value::F64(0.0),
                Primitive::Decimal => Value::Decimal(Decimal::new(0, 0)),
                Primitive::TimeSpan => Value::TimeSpan(TimeDelta::zero()),
                Primitive::Guid => Value::Guid(Uuid::nil()),
                Primitive::DateTime | Primitive::String | Primitive::Any => Value::Null,
            },
            Shape::Enum(_) => Value::Enum(EnumValue::new(ty, 0)),
            _ => Value::Null,
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v)
            }
        })*
    };
}

value_from! {
    bool => Bool,
    char => Char,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    String => String,
    DateTime<FixedOffset> => DateTime,
    TimeDelta => TimeSpan,
    Uuid => Guid,
    Vec<u8> => Bytes,
    EnumValue => Enum,
    Array => Array,
    Map => Map,
    StringDictionary => StringDictionary,
    NameValueCollection => NameValue,
    DataSet => DataSet,
    DataTable => DataTable,
    ObjectRef => Object,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v.fixed_offset())
    }
}

/// Wall-clock time with no zone; treated as UTC.
impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v.and_utc().fixed_offset())
    }
}

impl From<List> for Value {
    fn from(v: List) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub ty: Type,
    pub value: i64,
}

impl EnumValue {
    pub fn new(ty: &Type, value: i64) -> Self {
        Self {
            ty: ty.clone(),
            value,
        }
    }

    /// Value of the member called `name`, if the type declares one.
    pub fn named(ty: &Type, name: &str) -> Option<Self> {
        let info = ty.enum_info()?;
        let m = info.members.iter().find(|m| m.name == name)?;
        Some(Self::new(ty, m.value))
    }
}

/// List or forward-only sequence; `ty` is the container type.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ty: Type,
    pub items: Vec<Value>,
}

impl List {
    pub fn new(ty: &Type) -> Self {
        Self {
            ty: ty.clone(),
            items: Vec::new(),
        }
    }

    /// List of `element` holding `items`.
    pub fn of<I, V>(element: &Type, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            ty: Type::list_of(element),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// `List<object>` holding `items`.
    pub fn untyped<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::of(&Type::any(), items)
    }

    pub fn push(&mut self, v: impl Into<Value>) {
        self.items.push(v.into());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Array of rank 1 or more, items in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    pub ty: Type,
    pub lower_bounds: Vec<i64>,
    pub lengths: Vec<usize>,
    pub items: Vec<Value>,
}

impl Array {
    /// Rank-1 array of `element` starting at index 0.
    pub fn of<I, V>(element: &Type, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let items: Vec<Value> = items.into_iter().map(Into::into).collect();
        Self {
            ty: Type::array_of(element, 1),
            lower_bounds: vec![0],
            lengths: vec![items.len()],
            items,
        }
    }

    /// Array of `element` with `lengths.len()` dimensions, zero-based, items row-major.
    /// Returns `None` when the item count does not match the dimensions.
    pub fn with_shape(element: &Type, lengths: &[usize], items: Vec<Value>) -> Option<Self> {
        Self::with_bounds(element, &vec![0; lengths.len()], lengths, items)
    }

    /// Like [`Array::with_shape`] with explicit lower bounds. Also `None` when the
    /// element count or any `lower + len` overflows.
    pub fn with_bounds(
        element: &Type,
        lower_bounds: &[i64],
        lengths: &[usize],
        items: Vec<Value>,
    ) -> Option<Self> {
        if lengths.is_empty() || lower_bounds.len() != lengths.len() {
            return None;
        }
        let count = lengths
            .iter()
            .try_fold(1usize, |acc, &len| acc.checked_mul(len))?;
        if count != items.len() {
            return None;
        }
        // every index in lower..lower+len must stay representable
        for (&lower, &len) in lower_bounds.iter().zip(lengths) {
            lower.checked_add(i64::try_from(len).ok()?)?;
        }
        Some(Self {
            ty: Type::array_of(element, lengths.len()),
            lower_bounds: lower_bounds.to_vec(),
            lengths: lengths.to_vec(),
            items,
        })
    }

    pub fn rank(&self) -> usize {
        self.lengths.len()
    }

    pub fn lower_bound(&self, dim: usize) -> i64 {
        self.lower_bounds[dim]
    }

    /// Exclusive upper bound of `dim`.
    pub fn upper_bound(&self, dim: usize) -> i64 {
        self.lower_bounds[dim] + self.lengths[dim] as i64
    }

    /// Element at bound-relative `indices`.
    pub fn get(&self, indices: &[i64]) -> Option<&Value> {
        if indices.len() != self.rank() {
            return None;
        }
        let mut flat = 0usize;
        for (dim, &idx) in indices.iter().enumerate() {
            let offset = idx.checked_sub(self.lower_bounds[dim])?;
            if offset < 0 || offset as usize >= self.lengths[dim] {
                return None;
            }
            flat = flat * self.lengths[dim] + offset as usize;
        }
        self.items.get(flat)
    }
}

/// Map with entries in insertion order; `ty` carries the key and value types.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub ty: Type,
    pub entries: Vec<(Value, Value)>,
}

impl Map {
    pub fn new(key: &Type, value: &Type) -> Self {
        Self {
            ty: Type::map_of(key, value),
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Declared key type is exactly `string`.
    pub fn has_string_keys(&self) -> bool {
        matches!(self.ty.shape(), Shape::Map { key, .. } if key.as_primitive() == Some(Primitive::String))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Legacy string-to-string dictionary; keys are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringDictionary {
    entries: Vec<(String, Option<String>)>,
}

impl StringDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: Option<&str>) {
        let key = key.to_lowercase();
        let value = value.map(str::to_string);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn entries(&self) -> &[(String, Option<String>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered multimap from string keys to zero or more string values.
/// A key whose value list is `None` holds a null entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameValueCollection {
    entries: Vec<(String, Option<Vec<String>>)>,
}

impl NameValueCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the values already held for `key`.
    pub fn add(&mut self, key: &str, value: Option<&str>) {
        let pos = self.entries.iter().position(|(k, _)| k == key);
        let slot = match pos {
            Some(i) => &mut self.entries[i].1,
            None => {
                self.entries.push((key.to_string(), None));
                let last = self.entries.len() - 1;
                &mut self.entries[last].1
            }
        };
        if let Some(v) = value {
            slot.get_or_insert_with(Vec::new).push(v.to_string());
        }
    }

    /// Registers `key` with an empty value list.
    pub fn add_empty(&mut self, key: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => {
                entry.1.get_or_insert_with(Vec::new);
            }
            None => self.entries.push((key.to_string(), Some(Vec::new()))),
        }
    }

    pub fn entries(&self) -> &[(String, Option<Vec<String>>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub name: String,
    pub columns: Vec<DataColumn>,
    pub rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn column(mut self, name: &str, ty: Type) -> Self {
        self.columns.push(DataColumn {
            name: name.to_string(),
            ty,
        });
        self
    }

    /// Appends a row; missing trailing cells are filled with `DbNull`.
    pub fn row<I, V>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut row: Vec<Value> = cells.into_iter().map(Into::into).collect();
        row.resize(self.columns.len(), Value::DbNull);
        self.rows.push(row);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    pub name: String,
    pub tables: Vec<DataTable>,
}

impl DataSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    pub fn table(mut self, table: DataTable) -> Self {
        self.tables.push(table);
        self
    }
}

pub struct Object {
    ty: Type,
    slots: RwLock<Vec<Value>>,
}

/// Shared handle to a composite object. Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Arc<Object>);

impl ObjectRef {
    /// New instance of `ty` with every storage slot at its type's zero value.
    pub fn new(ty: &Type) -> Self {
        let slots = ty
            .object_info()
            .map(|info| info.slots.iter().map(|(_, t)| Value::default_for(t)).collect())
            .unwrap_or_default();
        ObjectRef(Arc::new(Object {
            ty: ty.clone(),
            slots: RwLock::new(slots),
        }))
    }

    pub fn type_of(&self) -> &Type {
        &self.0.ty
    }

    /// Identity of the underlying object.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn slot(&self, index: usize) -> Value {
        self.0.slots.read().get(index).cloned().unwrap_or(Value::Null)
    }

    /// Stores `value` in the slot backing member `name`. Returns false if there is none.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> bool {
        let Some(index) = self.0.ty.object_info().and_then(|i| i.slot_of(name)) else {
            return false;
        };
        let mut slots = self.0.slots.write();
        match slots.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn with(self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Reads member `name` through its accessor.
    pub fn get(&self, name: &str) -> Option<Value> {
        let info = self.0.ty.object_info()?;
        let member = info.members.iter().find(|m| m.name == name)?;
        Some(member.get(self))
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({} @ {:#x})", self.0.ty.name(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_keeps_scale_digits() {
        assert_eq!(Decimal::new(150, 2).to_string(), "1.50");
        assert_eq!(Decimal::new(-5, 3).to_string(), "-0.005");
        assert_eq!(Decimal::new(42, 0).to_string(), "42");
    }

    #[test]
    fn array_indices_respect_lower_bounds() {
        let items = (1..=4).map(Value::I32).collect();
        let a = Array::with_bounds(&Type::i32(), &[5, 0], &[2, 2], items).unwrap();
        assert_eq!(a.get(&[5, 1]), Some(&Value::I32(2)));
        assert_eq!(a.get(&[6, 0]), Some(&Value::I32(3)));
        assert_eq!(a.get(&[0, 0]), None);
        assert_eq!(a.get(&[i64::MIN, 0]), None);
    }

    #[test]
    fn overflowing_bounds_are_rejected() {
        let two = || vec![Value::I32(1), Value::I32(2)];
        assert!(Array::with_bounds(&Type::i32(), &[i64::MAX - 1, 0], &[2, 1], two()).is_none());
        assert!(Array::with_bounds(&Type::i32(), &[i64::MAX - 2, 0], &[2, 1], two()).is_some());
        assert!(Array::with_shape(&Type::i32(), &[usize::MAX, 2], two()).is_none());
        assert!(Array::with_bounds(&Type::i32(), &[i64::MIN, -3], &[1, 2], two()).is_some());
    }

    #[test]
    fn name_value_groups_by_key() {
        let mut n = NameValueCollection::new();
        n.add("a", Some("1"));
        n.add("b", None);
        n.add("a", Some("2"));
        assert_eq!(n.entries()[0].1, Some(vec!["1".to_string(), "2".to_string()]));
        assert_eq!(n.entries()[1].1, None);
    }
}
