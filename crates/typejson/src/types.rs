//! Runtime type descriptions.
//!
//! A [`Type`] is a cheap handle with pointer identity: two handles are the
//! same type only when they come from the same construction. Built-in
//! primitives and constructed container types (`list_of`, `array_of`,
//! `map_of`, ...) are interned so that repeated construction yields the same
//! handle. Composite and enumeration types come from [`TypeBuilder`] and
//! [`EnumBuilder`] and are unique per `build()`.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::value::{ObjectRef, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    String,
    DateTime,
    TimeSpan,
    Guid,
    /// The universal declared type; any value may be stored in it.
    Any,
}

impl Primitive {
    const ALL: [Primitive; 18] = [
        Primitive::Bool,
        Primitive::Char,
        Primitive::I8,
        Primitive::U8,
        Primitive::I16,
        Primitive::U16,
        Primitive::I32,
        Primitive::U32,
        Primitive::I64,
        Primitive::U64,
        Primitive::F32,
        Primitive::F64,
        Primitive::Decimal,
        Primitive::String,
        Primitive::DateTime,
        Primitive::TimeSpan,
        Primitive::Guid,
        Primitive::Any,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::I8 => "i8",
            Primitive::U8 => "u8",
            Primitive::I16 => "i16",
            Primitive::U16 => "u16",
            Primitive::I32 => "i32",
            Primitive::U32 => "u32",
            Primitive::I64 => "i64",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Decimal => "decimal",
            Primitive::String => "string",
            Primitive::DateTime => "datetime",
            Primitive::TimeSpan => "timespan",
            Primitive::Guid => "guid",
            Primitive::Any => "object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    NonPublic,
}

/// Constructor capability reported by introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Constructor {
    /// Public and parameterless.
    #[default]
    Public,
    /// Parameterless but not publicly visible.
    NonPublic,
    /// Only constructors that take arguments exist.
    Parametric,
    None,
}

/// Three-way inclusion switch for a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    #[default]
    Default,
    True,
    False,
}

pub type Getter = Arc<dyn Fn(&ObjectRef) -> Value + Send + Sync>;

#[derive(Clone)]
pub enum Accessor {
    /// Instance storage slot.
    Slot(usize),
    Computed(Getter),
    Static(Value),
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Slot(i) => write!(f, "Slot({i})"),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
            Accessor::Static(v) => write!(f, "Static({v:?})"),
        }
    }
}

/// Declarative member annotations, read by the default reflection controller.
#[derive(Debug, Clone, Default)]
pub struct MemberAttributes {
    pub serialized_name: Option<String>,
    pub include: TriState,
    pub default_value: Option<Value>,
    /// Output name chosen by the runtime type of the member's value.
    pub typed_names: Vec<(Type, String)>,
}

impl MemberAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.serialized_name = Some(name.into());
        self
    }

    pub fn include(mut self) -> Self {
        self.include = TriState::True;
        self
    }

    pub fn exclude(mut self) -> Self {
        self.include = TriState::False;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn typed_name(mut self, ty: &Type, name: impl Into<String>) -> Self {
        self.typed_names.push((ty.clone(), name.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub name: String,
    pub ty: Type,
    pub is_property: bool,
    pub is_static: bool,
    /// Property without a setter, or an init-only field.
    pub is_read_only: bool,
    pub accessor: Accessor,
    pub attributes: MemberAttributes,
}

impl MemberInfo {
    pub fn get(&self, obj: &ObjectRef) -> Value {
        match &self.accessor {
            Accessor::Slot(i) => obj.slot(*i),
            Accessor::Computed(g) => g(obj),
            Accessor::Static(v) => v.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
    /// Configured output name, if different from `name`.
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnumInfo {
    pub members: Vec<EnumMember>,
    pub flags: bool,
}

#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub members: Vec<MemberInfo>,
    pub constructor: Constructor,
    /// Storage slot declarations in slot order.
    pub slots: Vec<(String, Type)>,
}

impl ObjectInfo {
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|(n, _)| n == name)
    }
}

#[derive(Debug, Clone)]
pub enum Shape {
    Primitive(Primitive),
    Enum(EnumInfo),
    /// Raw byte sequence.
    Bytes,
    Array { element: Type, rank: usize },
    /// Random-access list.
    List { element: Type },
    /// Forward-only sequence.
    Sequence { element: Type },
    Map { key: Type, value: Type },
    Nullable(Type),
    /// Legacy string-to-string map with lower-cased keys.
    StringDictionary,
    /// Ordered string multimap.
    NameValueCollection,
    DataSet,
    DataTable,
    Object(ObjectInfo),
}

#[derive(Debug)]
pub struct TypeInfo {
    name: String,
    assembly: String,
    qualified_name: String,
    visibility: Visibility,
    shape: Shape,
}

#[derive(Clone)]
pub struct Type(Arc<TypeInfo>);

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.0.name)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

const CORE_ASSEMBLY: &str = "core";

static PRIMITIVES: LazyLock<Vec<Type>> = LazyLock::new(|| {
    Primitive::ALL
        .iter()
        .map(|p| Type::new(p.name(), CORE_ASSEMBLY, Visibility::Public, Shape::Primitive(*p)))
        .collect()
});

static INTERNED: LazyLock<RwLock<HashMap<String, Type>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

fn interned(key: String, make: impl FnOnce() -> Type) -> Type {
    if let Some(t) = INTERNED.read().get(&key) {
        return t.clone();
    }
    INTERNED.write().entry(key).or_insert_with(make).clone()
}

impl Type {
    fn new(name: &str, assembly: &str, visibility: Visibility, shape: Shape) -> Self {
        let qualified_name = if assembly.is_empty() {
            name.to_string()
        } else {
            format!("{name}, {assembly}")
        };
        Type(Arc::new(TypeInfo {
            name: name.to_string(),
            assembly: assembly.to_string(),
            qualified_name,
            visibility,
            shape,
        }))
    }

    pub fn primitive(p: Primitive) -> Self {
        PRIMITIVES[p as usize].clone()
    }

    pub fn bool() -> Self {
        Self::primitive(Primitive::Bool)
    }
    pub fn char() -> Self {
        Self::primitive(Primitive::Char)
    }
    pub fn i8() -> Self {
        Self::primitive(Primitive::I8)
    }
    pub fn u8() -> Self {
        Self::primitive(Primitive::U8)
    }
    pub fn i16() -> Self {
        Self::primitive(Primitive::I16)
    }
    pub fn u16() -> Self {
        Self::primitive(Primitive::U16)
    }
    pub fn i32() -> Self {
        Self::primitive(Primitive::I32)
    }
    pub fn u32() -> Self {
        Self::primitive(Primitive::U32)
    }
    pub fn i64() -> Self {
        Self::primitive(Primitive::I64)
    }
    pub fn u64() -> Self {
        Self::primitive(Primitive::U64)
    }
    pub fn f32() -> Self {
        Self::primitive(Primitive::F32)
    }
    pub fn f64() -> Self {
        Self::primitive(Primitive::F64)
    }
    pub fn decimal() -> Self {
        Self::primitive(Primitive::Decimal)
    }
    pub fn string() -> Self {
        Self::primitive(Primitive::String)
    }
    pub fn datetime() -> Self {
        Self::primitive(Primitive::DateTime)
    }
    pub fn timespan() -> Self {
        Self::primitive(Primitive::TimeSpan)
    }
    pub fn guid() -> Self {
        Self::primitive(Primitive::Guid)
    }
    pub fn any() -> Self {
        Self::primitive(Primitive::Any)
    }

    pub fn bytes() -> Self {
        interned("bytes".into(), || {
            Type::new("u8[]", CORE_ASSEMBLY, Visibility::Public, Shape::Bytes)
        })
    }

    /// Array of `rank` dimensions. A rank-1 array of `u8` is the byte-array type.
    pub fn array_of(element: &Type, rank: usize) -> Self {
        let rank = rank.max(1);
        if rank == 1 && *element == Type::u8() {
            return Type::bytes();
        }
        interned(format!("array:{:x}:{rank}", element.id()), || {
            let commas = ",".repeat(rank - 1);
            let name = format!("{}[{commas}]", element.name());
            Type::new(
                &name,
                CORE_ASSEMBLY,
                element.visibility(),
                Shape::Array {
                    element: element.clone(),
                    rank,
                },
            )
        })
    }

    pub fn list_of(element: &Type) -> Self {
        interned(format!("list:{:x}", element.id()), || {
            let name = format!("List<{}>", element.name());
            Type::new(
                &name,
                CORE_ASSEMBLY,
                element.visibility(),
                Shape::List {
                    element: element.clone(),
                },
            )
        })
    }

    pub fn sequence_of(element: &Type) -> Self {
        interned(format!("seq:{:x}", element.id()), || {
            let name = format!("Sequence<{}>", element.name());
            Type::new(
                &name,
                CORE_ASSEMBLY,
                element.visibility(),
                Shape::Sequence {
                    element: element.clone(),
                },
            )
        })
    }

    pub fn map_of(key: &Type, value: &Type) -> Self {
        interned(format!("map:{:x}:{:x}", key.id(), value.id()), || {
            let name = format!("Map<{}, {}>", key.name(), value.name());
            Type::new(
                &name,
                CORE_ASSEMBLY,
                Visibility::Public,
                Shape::Map {
                    key: key.clone(),
                    value: value.clone(),
                },
            )
        })
    }

    pub fn nullable(inner: &Type) -> Self {
        interned(format!("nullable:{:x}", inner.id()), || {
            let name = format!("{}?", inner.name());
            Type::new(&name, CORE_ASSEMBLY, inner.visibility(), Shape::Nullable(inner.clone()))
        })
    }

    pub fn string_dictionary() -> Self {
        interned("string-dictionary".into(), || {
            Type::new("StringDictionary", CORE_ASSEMBLY, Visibility::Public, Shape::StringDictionary)
        })
    }

    pub fn name_value_collection() -> Self {
        interned("name-value".into(), || {
            Type::new(
                "NameValueCollection",
                CORE_ASSEMBLY,
                Visibility::Public,
                Shape::NameValueCollection,
            )
        })
    }

    pub fn data_set() -> Self {
        interned("data-set".into(), || {
            Type::new("DataSet", CORE_ASSEMBLY, Visibility::Public, Shape::DataSet)
        })
    }

    pub fn data_table() -> Self {
        interned("data-table".into(), || {
            Type::new("DataTable", CORE_ASSEMBLY, Visibility::Public, Shape::DataTable)
        })
    }

    /// Start describing a composite type named `name` (e.g. `"Demo.Person"`).
    pub fn object(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name.into())
    }

    pub fn enumeration(name: impl Into<String>) -> EnumBuilder {
        EnumBuilder::new(name.into())
    }

    /// Identity of this handle, stable for the life of the process.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn assembly(&self) -> &str {
        &self.0.assembly
    }

    /// `"<name>, <assembly>"`, the identifier written for `$type`.
    pub fn qualified_name(&self) -> &str {
        &self.0.qualified_name
    }

    pub fn visibility(&self) -> Visibility {
        self.0.visibility
    }

    pub fn shape(&self) -> &Shape {
        &self.0.shape
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self.0.shape {
            Shape::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn object_info(&self) -> Option<&ObjectInfo> {
        match &self.0.shape {
            Shape::Object(info) => Some(info),
            _ => None,
        }
    }

    pub fn enum_info(&self) -> Option<&EnumInfo> {
        match &self.0.shape {
            Shape::Enum(info) => Some(info),
            _ => None,
        }
    }

    /// Element type for arrays, lists, sequences and nullables.
    pub fn element(&self) -> Option<&Type> {
        match &self.0.shape {
            Shape::Array { element, .. }
            | Shape::List { element }
            | Shape::Sequence { element }
            | Shape::Nullable(element) => Some(element),
            _ => None,
        }
    }

    /// Countable container other than a byte sequence.
    pub fn is_collection(&self) -> bool {
        matches!(
            self.0.shape,
            Shape::Array { .. }
                | Shape::List { .. }
                | Shape::Sequence { .. }
                | Shape::Map { .. }
                | Shape::StringDictionary
                | Shape::NameValueCollection
        )
    }

    pub fn is_enumerable(&self) -> bool {
        self.is_collection() || matches!(self.0.shape, Shape::Bytes)
    }

    /// Types whose instances accept appended items.
    pub fn can_append(&self) -> bool {
        matches!(
            self.0.shape,
            Shape::List { .. }
                | Shape::Sequence { .. }
                | Shape::Map { .. }
                | Shape::StringDictionary
                | Shape::NameValueCollection
        )
    }
}

pub struct TypeBuilder {
    name: String,
    assembly: String,
    visibility: Visibility,
    constructor: Constructor,
    members: Vec<MemberInfo>,
    slots: Vec<(String, Type)>,
}

impl TypeBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            assembly: String::new(),
            visibility: Visibility::Public,
            constructor: Constructor::Public,
            members: Vec::new(),
            slots: Vec::new(),
        }
    }

    pub fn assembly(mut self, assembly: impl Into<String>) -> Self {
        self.assembly = assembly.into();
        self
    }

    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = constructor;
        self
    }

    fn push_slot(&mut self, name: &str, ty: &Type) -> usize {
        self.slots.push((name.to_string(), ty.clone()));
        self.slots.len() - 1
    }

    fn push_member(&mut self, name: &str, ty: &Type, is_property: bool, is_read_only: bool, accessor: Accessor) {
        self.members.push(MemberInfo {
            name: name.to_string(),
            ty: ty.clone(),
            is_property,
            is_static: matches!(accessor, Accessor::Static(_)),
            is_read_only,
            accessor,
            attributes: MemberAttributes::default(),
        });
    }

    /// Writable instance field.
    pub fn field(mut self, name: &str, ty: Type) -> Self {
        let slot = self.push_slot(name, &ty);
        self.push_member(name, &ty, false, false, Accessor::Slot(slot));
        self
    }

    /// Init-only instance field.
    pub fn readonly_field(mut self, name: &str, ty: Type) -> Self {
        let slot = self.push_slot(name, &ty);
        self.push_member(name, &ty, false, true, Accessor::Slot(slot));
        self
    }

    /// Property with a getter and setter over its own storage slot.
    pub fn property(mut self, name: &str, ty: Type) -> Self {
        let slot = self.push_slot(name, &ty);
        self.push_member(name, &ty, true, false, Accessor::Slot(slot));
        self
    }

    /// Getter-only property computed from the instance.
    pub fn computed<F>(mut self, name: &str, ty: Type, getter: F) -> Self
    where
        F: Fn(&ObjectRef) -> Value + Send + Sync + 'static,
    {
        self.push_member(name, &ty, true, true, Accessor::Computed(Arc::new(getter)));
        self
    }

    pub fn static_field(mut self, name: &str, ty: Type, value: impl Into<Value>) -> Self {
        self.push_member(name, &ty, false, false, Accessor::Static(value.into()));
        self
    }

    /// Annotates the most recently declared member.
    pub fn attributes(mut self, attributes: MemberAttributes) -> Self {
        if let Some(m) = self.members.last_mut() {
            m.attributes = attributes;
        }
        self
    }

    pub fn build(self) -> Type {
        Type::new(
            &self.name,
            &self.assembly,
            self.visibility,
            Shape::Object(ObjectInfo {
                members: self.members,
                constructor: self.constructor,
                slots: self.slots,
            }),
        )
    }
}

pub struct EnumBuilder {
    name: String,
    assembly: String,
    members: Vec<EnumMember>,
    flags: bool,
}

impl EnumBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            assembly: String::new(),
            members: Vec::new(),
            flags: false,
        }
    }

    pub fn assembly(mut self, assembly: impl Into<String>) -> Self {
        self.assembly = assembly.into();
        self
    }

    /// Values combine as bit flags.
    pub fn flags(mut self) -> Self {
        self.flags = true;
        self
    }

    pub fn variant(mut self, name: &str, value: i64) -> Self {
        self.members.push(EnumMember {
            name: name.to_string(),
            value,
            display_name: None,
        });
        self
    }

    pub fn variant_named(mut self, name: &str, value: i64, display_name: &str) -> Self {
        self.members.push(EnumMember {
            name: name.to_string(),
            value,
            display_name: Some(display_name.to_string()),
        });
        self
    }

    pub fn build(self) -> Type {
        Type::new(
            &self.name,
            &self.assembly,
            Visibility::Public,
            Shape::Enum(EnumInfo {
                members: self.members,
                flags: self.flags,
            }),
        )
    }
}
