//! Type descriptor cache.
//!
//! A [`TypeDescriptor`] is built once per [`Type`] and never changes
//! afterwards. Lookups take a shared lock; a miss builds the descriptor
//! outside the lock and publishes it under the write lock, keeping whichever
//! descriptor was published first.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::manager::{Converter, Interceptor, Manager};
use crate::ser::dispatch::{WriteFn, writer_for};
use crate::types::{Constructor, MemberInfo, Primitive, Shape, TriState, Type, Visibility};
use crate::value::{List, Map, ObjectRef, Value};

/// Coarse classification of a type, used for first-level writer dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// Catch-all for primitives without their own tag; resolved by exact type.
    Primitive,
    Int,
    Long,
    String,
    Bool,
    Single,
    Double,
    DateTime,
    Enum,
    Guid,
    TimeSpan,
    Array,
    List,
    ByteArray,
    MultiDimensionalArray,
    Dictionary,
    StringKeyDictionary,
    NameValue,
    StringDictionary,
    DataSet,
    DataTable,
    Custom,
    /// Composite object.
    Object,
}

impl DataKind {
    pub const COUNT: usize = DataKind::Object as usize + 1;

    /// Classifies `ty`. `custom` marks types with a registered custom encoder.
    pub fn of(ty: &Type, custom: bool) -> DataKind {
        if custom && !matches!(ty.shape(), Shape::Array { .. } | Shape::Bytes) {
            return DataKind::Custom;
        }
        match ty.shape() {
            Shape::Primitive(p) => match p {
                Primitive::I32 => DataKind::Int,
                Primitive::I64 => DataKind::Long,
                Primitive::String => DataKind::String,
                Primitive::Bool => DataKind::Bool,
                Primitive::F32 => DataKind::Single,
                Primitive::F64 => DataKind::Double,
                Primitive::DateTime => DataKind::DateTime,
                Primitive::Guid => DataKind::Guid,
                Primitive::TimeSpan => DataKind::TimeSpan,
                _ => DataKind::Primitive,
            },
            Shape::Enum(_) => DataKind::Enum,
            Shape::Bytes => DataKind::ByteArray,
            Shape::Array { rank: 1, .. } => DataKind::Array,
            Shape::Array { .. } => DataKind::MultiDimensionalArray,
            Shape::List { .. } | Shape::Sequence { .. } => DataKind::List,
            Shape::Map { key, .. } if key.as_primitive() == Some(Primitive::String) => {
                DataKind::StringKeyDictionary
            }
            Shape::Map { .. } => DataKind::Dictionary,
            Shape::Nullable(inner) => DataKind::of(inner, false),
            Shape::StringDictionary => DataKind::StringDictionary,
            Shape::NameValueCollection => DataKind::NameValue,
            Shape::DataSet => DataKind::DataSet,
            Shape::DataTable => DataKind::DataTable,
            Shape::Object(_) => DataKind::Object,
        }
    }
}

/// Generic shape marker for container types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComplexType {
    #[default]
    General,
    Array,
    MultiDimensionalArray,
    Dictionary,
    List,
    Nullable,
}

/// Constructor capability flags; the empty set means public and parameterless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstructorTypes(u8);

impl ConstructorTypes {
    pub const DEFAULT: ConstructorTypes = ConstructorTypes(0);
    pub const NON_PUBLIC: ConstructorTypes = ConstructorTypes(1);
    pub const PARAMETRIC: ConstructorTypes = ConstructorTypes(2);

    pub fn contains(self, other: ConstructorTypes) -> bool {
        self.0 & other.0 == other.0
    }

    fn insert(&mut self, other: ConstructorTypes) {
        self.0 |= other.0;
    }
}

/// How one member of a composite type is read and written.
pub struct MemberDescriptor {
    pub member_name: String,
    pub member_type: Type,
    pub info: MemberInfo,
    pub is_static: bool,
    pub is_property: bool,
    /// Read-only and not list-like; list-like members stay writable through their items.
    pub is_read_only: bool,
    pub is_collection: bool,
    /// Writer pre-resolved for the declared type.
    pub writer: WriteFn,
    pub specific_name: bool,
    pub serialized_name: String,
    pub default_value: Option<Value>,
    pub typed_names: HashMap<Type, String>,
    pub converter: Option<Converter>,
    pub item_converter: Option<Converter>,
    pub serializable: TriState,
}

impl MemberDescriptor {
    fn build(owner: &Type, info: &MemberInfo, manager: &Manager) -> Self {
        let controller = manager.controller();
        let ty = info.ty.clone();
        let is_collection = ty.is_collection();
        let is_list_like = matches!(
            ty.shape(),
            Shape::Array { .. } | Shape::List { .. } | Shape::Bytes
        );

        let renamed = controller.serialized_name(owner, info);
        let typed_names: HashMap<Type, String> =
            controller.typed_names(owner, info).into_iter().collect();
        let specific_name = renamed.is_some() || !typed_names.is_empty();

        MemberDescriptor {
            member_name: info.name.clone(),
            writer: writer_for(manager, &ty),
            member_type: ty,
            is_static: info.is_static,
            is_property: info.is_property,
            is_read_only: info.is_read_only && !is_list_like,
            is_collection,
            specific_name,
            serialized_name: renamed.unwrap_or_else(|| info.name.clone()),
            default_value: controller.default_value(owner, info),
            typed_names,
            converter: controller.converter(owner, info),
            item_converter: controller.item_converter(owner, info),
            serializable: controller.serializable(owner, info),
            info: info.clone(),
        }
    }

    pub fn get(&self, obj: &ObjectRef) -> Value {
        self.info.get(obj)
    }

    /// Output name for `value`: a typed name keyed by the value's runtime type wins.
    pub fn name_for(&self, value: &Value) -> &str {
        if self.specific_name && !self.typed_names.is_empty() {
            if let Some(name) = value.type_of().and_then(|t| self.typed_names.get(&t)) {
                return name;
            }
        }
        &self.serialized_name
    }
}

/// Cached, immutable metadata for one runtime type.
pub struct TypeDescriptor {
    pub ty: Type,
    pub type_name: String,
    /// Qualified identifier written by the type extension.
    pub assembly_name: String,
    pub kind: DataKind,

    pub generic_definition: ComplexType,
    pub argument_types: Vec<Type>,
    pub writer: Option<WriteFn>,
    pub item_writer: Option<WriteFn>,
    /// Element type items are read back as.
    pub item_type: Option<Type>,
    pub can_append: bool,

    pub constructor_info: ConstructorTypes,
    has_constructor: bool,
    pub always_deserializable: bool,
    pub interceptor: Option<Arc<dyn Interceptor>>,
    pub members: Vec<MemberDescriptor>,

    pub is_flagged_enum: bool,
    /// Output name and value of each enum member, in declaration order.
    pub enum_names: Vec<(String, i64)>,
}

impl TypeDescriptor {
    pub(crate) fn build(ty: &Type, manager: &Manager) -> Self {
        let controller = manager.controller();
        let kind = DataKind::of(ty, manager.is_type_registered(ty));
        let mut d = TypeDescriptor {
            ty: ty.clone(),
            type_name: ty.name().to_string(),
            assembly_name: ty.qualified_name().to_string(),
            kind,
            generic_definition: ComplexType::General,
            argument_types: Vec::new(),
            writer: None,
            item_writer: None,
            item_type: None,
            can_append: false,
            constructor_info: ConstructorTypes::DEFAULT,
            has_constructor: false,
            always_deserializable: false,
            interceptor: None,
            members: Vec::new(),
            is_flagged_enum: false,
            enum_names: Vec::new(),
        };

        if let Some(info) = ty.enum_info() {
            d.is_flagged_enum = info.flags;
            d.enum_names = info
                .members
                .iter()
                .map(|m| (controller.enum_value_name(ty, m), m.value))
                .collect();
            tracing::debug!(type_name = ty.name(), kind = ?kind, "built enum descriptor");
            return d;
        }

        d.writer = Some(writer_for(manager, ty));
        match ty.shape() {
            Shape::List { element } | Shape::Sequence { element } => {
                d.generic_definition = ComplexType::List;
                d.argument_types = vec![element.clone()];
            }
            Shape::Map { key, value } => {
                d.generic_definition = ComplexType::Dictionary;
                d.argument_types = vec![key.clone(), value.clone()];
            }
            Shape::Nullable(inner) => {
                d.generic_definition = ComplexType::Nullable;
                d.argument_types = vec![inner.clone()];
                d.writer = Some(writer_for(manager, inner));
            }
            Shape::Array { element, rank } => {
                d.generic_definition = if *rank == 1 {
                    ComplexType::Array
                } else {
                    ComplexType::MultiDimensionalArray
                };
                d.argument_types = vec![element.clone()];
            }
            _ => {}
        }
        if let [element] = d.argument_types.as_slice() {
            d.item_writer = Some(writer_for(manager, element));
            d.item_type = Some(element.clone());
        }
        d.can_append = ty.can_append();
        d.always_deserializable = controller.is_always_deserializable(ty);
        d.interceptor = controller.interceptor(ty);

        if !matches!(d.generic_definition, ComplexType::Array | ComplexType::Nullable) {
            if ty.visibility() == Visibility::NonPublic {
                d.constructor_info.insert(ConstructorTypes::NON_PUBLIC);
            }
            match ty.object_info().map(|o| o.constructor) {
                None | Some(Constructor::Public) => d.has_constructor = true,
                Some(Constructor::NonPublic) => {
                    d.has_constructor = true;
                    d.constructor_info.insert(ConstructorTypes::NON_PUBLIC);
                }
                Some(Constructor::Parametric) => {
                    d.constructor_info.insert(ConstructorTypes::PARAMETRIC);
                }
                Some(Constructor::None) => {}
            }
        }

        if kind == DataKind::Object && !ty.is_enumerable() {
            if let Some(info) = ty.object_info() {
                d.members = info
                    .members
                    .iter()
                    .map(|m| MemberDescriptor::build(ty, m, manager))
                    .collect();
            }
        }
        tracing::debug!(
            type_name = ty.name(),
            kind = ?kind,
            members = d.members.len(),
            "built type descriptor"
        );
        d
    }

    pub fn find_member(&self, member_name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.member_name == member_name)
    }

    /// Output name for an enum value: the exact member, or for flag
    /// enumerations the comma-separated members covering every set bit.
    pub fn enum_name(&self, value: i64) -> Option<String> {
        if let Some((name, _)) = self.enum_names.iter().find(|(_, v)| *v == value) {
            return Some(name.clone());
        }
        if !self.is_flagged_enum || value == 0 {
            return None;
        }
        let mut remaining = value;
        let mut parts = Vec::new();
        for (name, v) in self.enum_names.iter().rev() {
            if *v != 0 && value & v == *v && remaining & v != 0 {
                remaining &= !v;
                parts.push(name.as_str());
            }
        }
        if remaining != 0 {
            return None;
        }
        parts.reverse();
        Some(parts.join(", "))
    }

    /// Creates an empty instance. Fails when no parameterless constructor
    /// exists, or when the constructor is not public and the type is not
    /// marked always-deserializable.
    pub fn instantiate(&self) -> Result<Value> {
        if !self.has_constructor {
            return Err(self.construction_error("no parameterless constructor"));
        }
        if self.constructor_info != ConstructorTypes::DEFAULT && !self.always_deserializable {
            return Err(self.construction_error("the constructor is not publicly visible"));
        }
        let value = match self.ty.shape() {
            Shape::Object(_) => Value::Object(ObjectRef::new(&self.ty)),
            Shape::List { .. } => Value::List(List::new(&self.ty)),
            Shape::Sequence { .. } => Value::Sequence(List::new(&self.ty)),
            Shape::Map { .. } => Value::Map(Map {
                ty: self.ty.clone(),
                entries: Vec::new(),
            }),
            Shape::Bytes => Value::Bytes(Vec::new()),
            Shape::StringDictionary => Value::StringDictionary(Default::default()),
            Shape::NameValueCollection => Value::NameValue(Default::default()),
            Shape::DataSet => Value::DataSet(crate::value::DataSet::new("")),
            Shape::DataTable => Value::DataTable(crate::value::DataTable::new("")),
            _ => Value::default_for(&self.ty),
        };
        Ok(value)
    }

    /// Appends `item` to a list or sequence instance of this type.
    pub fn append_item(&self, target: &mut Value, item: Value) -> Result<()> {
        match target {
            Value::List(l) | Value::Sequence(l) if self.can_append => {
                l.items.push(item);
                Ok(())
            }
            _ => Err(Error::Message(format!(
                "type \"{}\" does not support appending items",
                self.type_name
            ))),
        }
    }

    fn construction_error(&self, reason: &str) -> Error {
        Error::Construction {
            type_name: self.type_name.clone(),
            assembly: self.ty.assembly().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Default)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<Type, Arc<TypeDescriptor>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ty: &Type) -> Option<Arc<TypeDescriptor>> {
        self.entries.read().get(ty).cloned()
    }

    pub fn contains(&self, ty: &Type) -> bool {
        self.entries.read().contains_key(ty)
    }

    /// Returns the cached descriptor for `ty`, building it with `build` on first use.
    pub fn resolve_with<F>(&self, ty: &Type, build: F) -> Arc<TypeDescriptor>
    where
        F: FnOnce(&Type) -> TypeDescriptor,
    {
        if let Some(d) = self.get(ty) {
            return d;
        }
        let built = Arc::new(build(ty));
        self.entries
            .write()
            .entry(ty.clone())
            .or_insert(built)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
