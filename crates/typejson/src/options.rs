use std::fmt;
use std::sync::Arc;

/// Transform applied to member names and string map keys before they are written.
#[derive(Clone, Default)]
pub enum NamingStrategy {
    /// Names are written as declared.
    #[default]
    Default,
    LowerCase,
    UpperCase,
    /// First character lowered (`FirstName` -> `firstName`).
    CamelCase,
    /// `FirstName` -> `first_name`
    SnakeCase,
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl NamingStrategy {
    pub fn rename(&self, name: &str) -> String {
        match self {
            NamingStrategy::Default => name.to_string(),
            NamingStrategy::LowerCase => name.to_lowercase(),
            NamingStrategy::UpperCase => name.to_uppercase(),
            NamingStrategy::CamelCase => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            NamingStrategy::SnakeCase => {
                let mut out = String::with_capacity(name.len() + 4);
                let mut prev_lower = false;
                for c in name.chars() {
                    if c.is_uppercase() {
                        if prev_lower {
                            out.push('_');
                        }
                        out.extend(c.to_lowercase());
                        prev_lower = false;
                    } else {
                        out.push(c);
                        prev_lower = c.is_lowercase() || c.is_ascii_digit();
                    }
                }
                out
            }
            NamingStrategy::Custom(f) => f(name),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, NamingStrategy::Default)
    }
}

impl fmt::Debug for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingStrategy::Default => f.write_str("Default"),
            NamingStrategy::LowerCase => f.write_str("LowerCase"),
            NamingStrategy::UpperCase => f.write_str("UpperCase"),
            NamingStrategy::CamelCase => f.write_str("CamelCase"),
            NamingStrategy::SnakeCase => f.write_str("SnakeCase"),
            NamingStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Output policy for one encode call.
#[derive(Debug, Clone)]
pub struct Options {
    /// Emit `$type` / `$types` / `$i` / `$schema` extension members.
    pub use_extensions: bool,
    /// With extensions on, write small integer type ids and one shared `$types` block.
    pub using_global_types: bool,
    /// Re-encode already visited objects instead of writing `{"$i":n}` markers.
    pub inline_circular_references: bool,
    pub serializer_max_depth: usize,
    pub serialize_null_values: bool,
    pub serialize_empty_collections: bool,
    pub show_read_only_properties: bool,
    pub show_read_only_fields: bool,
    pub serialize_static_members: bool,
    /// Write string-keyed maps as `[{"k":..,"v":..}]` like any other map.
    pub kv_style_string_dictionary: bool,
    pub use_utc_date_time: bool,
    pub date_time_milliseconds: bool,
    /// Write unique identifiers as base64 of their bytes.
    pub use_fast_guid: bool,
    pub use_values_of_enums: bool,
    /// Escape every non-ASCII or non-printable character as `\uXXXX`.
    pub use_escaped_unicode: bool,
    /// Tabular `$schema` as a table/column/type list rather than a schema document.
    pub use_optimized_dataset_schema: bool,
    /// Include read-only members regardless of the two read-only switches.
    pub enable_anonymous_types: bool,
    pub naming_strategy: NamingStrategy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            use_extensions: true,
            using_global_types: true,
            inline_circular_references: false,
            serializer_max_depth: 20,
            serialize_null_values: true,
            serialize_empty_collections: true,
            show_read_only_properties: false,
            show_read_only_fields: false,
            serialize_static_members: false,
            kv_style_string_dictionary: false,
            use_utc_date_time: true,
            date_time_milliseconds: false,
            use_fast_guid: true,
            use_values_of_enums: false,
            use_escaped_unicode: true,
            use_optimized_dataset_schema: true,
            enable_anonymous_types: false,
            naming_strategy: NamingStrategy::Default,
        }
    }
}

impl Options {
    /// Profile for plain data output: no extension members and read-only members included.
    pub fn relaxed() -> Self {
        Self {
            use_extensions: false,
            using_global_types: false,
            enable_anonymous_types: true,
            ..Self::default()
        }
    }

    pub(crate) fn global_types_active(&self) -> bool {
        self.use_extensions && self.using_global_types
    }

    pub(crate) fn read_only_properties_visible(&self) -> bool {
        self.show_read_only_properties || self.enable_anonymous_types
    }

    pub(crate) fn read_only_fields_visible(&self) -> bool {
        self.show_read_only_fields || self.enable_anonymous_types
    }
}
