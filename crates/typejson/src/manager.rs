use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::{Mutex, RwLock};

use crate::error::Result;
use crate::options::Options;
use crate::reflection::{DescriptorCache, TypeDescriptor};
use crate::ser::Encoder;
use crate::types::{EnumMember, MemberInfo, TriState, Type};
use crate::value::{EnumValue, ObjectRef, Value};

/// A member name and value passed through interceptors and converters.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonItem {
    pub name: String,
    pub value: Value,
}

impl JsonItem {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        JsonItem {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Rewrites a member (or one item of a member) before it is encoded.
pub type Converter = Arc<dyn Fn(JsonItem) -> JsonItem + Send + Sync>;

/// Produces the text written, quoted and unescaped, for a custom-registered type.
pub type CustomEncoder = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Per-type hooks around encoding a composite object.
pub trait Interceptor: Send + Sync {
    /// Returning false skips the object entirely.
    fn on_serializing(&self, _obj: &ObjectRef) -> bool {
        true
    }

    /// Called for each member before it is written. `None` skips the member.
    fn on_serializing_member(&self, _obj: &ObjectRef, item: JsonItem) -> Option<JsonItem> {
        Some(item)
    }

    /// Extra name/value pairs appended after the regular members.
    fn serialize_extra_values(&self, _obj: &ObjectRef) -> Vec<JsonItem> {
        Vec::new()
    }

    fn on_serialized(&self, _obj: &ObjectRef) {}
}

/// Supplies per-member and per-type metadata when descriptors are built.
///
/// The default implementation reads the [`MemberAttributes`](crate::types::MemberAttributes)
/// attached to each member and installs no interceptors or converters.
pub trait ReflectionController: Send + Sync {
    fn serializable(&self, _owner: &Type, member: &MemberInfo) -> TriState {
        member.attributes.include
    }

    fn serialized_name(&self, _owner: &Type, member: &MemberInfo) -> Option<String> {
        member.attributes.serialized_name.clone()
    }

    fn typed_names(&self, _owner: &Type, member: &MemberInfo) -> Vec<(Type, String)> {
        member.attributes.typed_names.clone()
    }

    fn default_value(&self, _owner: &Type, member: &MemberInfo) -> Option<Value> {
        member.attributes.default_value.clone()
    }

    fn converter(&self, _owner: &Type, _member: &MemberInfo) -> Option<Converter> {
        None
    }

    fn item_converter(&self, _owner: &Type, _member: &MemberInfo) -> Option<Converter> {
        None
    }

    fn interceptor(&self, _ty: &Type) -> Option<Arc<dyn Interceptor>> {
        None
    }

    fn is_always_deserializable(&self, _ty: &Type) -> bool {
        false
    }

    fn enum_value_name(&self, _ty: &Type, member: &EnumMember) -> String {
        member
            .display_name
            .clone()
            .unwrap_or_else(|| member.name.clone())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultReflectionController;

impl ReflectionController for DefaultReflectionController {}

static GLOBAL: LazyLock<Manager> = LazyLock::new(Manager::new);

/// Owns the descriptor cache and the custom encoder registry.
pub struct Manager {
    controller: Arc<dyn ReflectionController>,
    cache: DescriptorCache,
    custom: RwLock<HashMap<Type, CustomEncoder>>,
    synthesized: Mutex<HashMap<(String, Vec<String>), Type>>,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("descriptors", &self.cache.len())
            .field("custom_types", &self.custom.read().len())
            .finish()
    }
}

impl Manager {
    pub fn new() -> Self {
        Self::with_controller(Arc::new(DefaultReflectionController))
    }

    pub fn with_controller(controller: Arc<dyn ReflectionController>) -> Self {
        Manager {
            controller,
            cache: DescriptorCache::new(),
            custom: RwLock::new(HashMap::new()),
            synthesized: Mutex::new(HashMap::new()),
        }
    }

    /// Process-wide manager used by the free encoding functions.
    pub fn global() -> &'static Manager {
        &GLOBAL
    }

    pub fn controller(&self) -> &dyn ReflectionController {
        self.controller.as_ref()
    }

    pub fn descriptor(&self, ty: &Type) -> Arc<TypeDescriptor> {
        self.cache
            .resolve_with(ty, |t| TypeDescriptor::build(t, self))
    }

    /// Registers a custom encoder for `ty`. Descriptors already built for
    /// `ty` keep their previous writer, so register before first use.
    pub fn register_custom_type<F>(&self, ty: &Type, encoder: F)
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        if self.cache.contains(ty) {
            tracing::warn!(
                type_name = ty.name(),
                "custom encoder registered after the type descriptor was cached"
            );
        }
        self.custom.write().insert(ty.clone(), Arc::new(encoder));
    }

    pub fn is_type_registered(&self, ty: &Type) -> bool {
        self.custom.read().contains_key(ty)
    }

    pub(crate) fn custom_encoder(&self, ty: &Type) -> Option<CustomEncoder> {
        self.custom.read().get(ty).cloned()
    }

    /// Output name for an enum value, or `None` when only its number can be written.
    pub fn enum_name(&self, value: &EnumValue) -> Option<String> {
        self.descriptor(&value.ty).enum_name(value.value)
    }

    pub fn to_string(&self, value: &Value, options: &Options) -> Result<String> {
        Encoder::new(self, options).encode(value)
    }

    pub fn to_writer<W: std::io::Write>(
        &self,
        mut writer: W,
        value: &Value,
        options: &Options,
    ) -> Result<()> {
        let text = self.to_string(value, options)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Composite type for a struct shape seen through serde; every field is untyped.
    pub(crate) fn struct_type(&self, name: &str, fields: &[&str]) -> Type {
        let key = (
            name.to_string(),
            fields.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
        );
        let mut synthesized = self.synthesized.lock();
        synthesized
            .entry(key)
            .or_insert_with(|| {
                fields
                    .iter()
                    .fold(Type::object(name), |b, f| b.field(f, Type::any()))
                    .build()
            })
            .clone()
    }
}
