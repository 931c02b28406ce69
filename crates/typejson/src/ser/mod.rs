//! Encoding engine: one [`Encoder`] per top-level encode call.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::encode::primitives;
use crate::encode::writer::JsonWriter;
use crate::error::Result;
use crate::manager::Manager;
use crate::number;
use crate::options::Options;
use crate::types::Type;
use crate::value::{ObjectRef, Value};

#[cfg(feature = "serde")]
pub mod bridge;
mod collections;
pub(crate) mod dispatch;
mod object;
mod tabular;

pub(crate) const EXT_TYPE: &str = "$type";
pub(crate) const EXT_TYPES: &str = "$types";
pub(crate) const EXT_REF: &str = "$i";
pub(crate) const EXT_SCHEMA: &str = "$schema";

/// Encodes `value` with the process-wide [`Manager`].
pub fn to_string(value: &Value, options: &Options) -> Result<String> {
    Manager::global().to_string(value, options)
}

pub fn to_writer<W: std::io::Write>(writer: W, value: &Value, options: &Options) -> Result<()> {
    Manager::global().to_writer(writer, value, options)
}

/// Per-call encoding state. Never shared between calls.
pub struct Encoder<'a> {
    manager: &'a Manager,
    opts: &'a Options,
    w: JsonWriter,
    depth: usize,
    /// Object identity to 1-based visitation order; holds each object alive
    /// so identities stay unique for the whole call.
    visited: HashMap<usize, (usize, ObjectRef)>,
    global_types: Vec<String>,
    global_index: HashMap<String, usize>,
    /// Set when an interceptor vetoed the object just written.
    skipped: bool,
}

impl<'a> Encoder<'a> {
    pub fn new(manager: &'a Manager, opts: &'a Options) -> Self {
        Encoder {
            manager,
            opts,
            w: JsonWriter::new(),
            depth: 0,
            visited: HashMap::new(),
            global_types: Vec::new(),
            global_index: HashMap::new(),
            skipped: false,
        }
    }

    /// Writes `value` through its type's cached writer and returns the document.
    pub fn encode(mut self, value: &Value) -> Result<String> {
        tracing::trace!(max_depth = self.opts.serializer_max_depth, "encode start");
        match value.type_of() {
            Some(ty) => {
                let descriptor = self.manager.descriptor(&ty);
                match descriptor.writer {
                    Some(write) => write(&mut self, value)?,
                    None => self.write_value(value)?,
                }
            }
            None => self.w.push_str(primitives::format_null()),
        }
        let block = self.global_types_block();
        let out = self.w.finish(block.as_deref());
        tracing::trace!(
            len = out.len(),
            objects = self.visited.len(),
            global_types = self.global_types.len(),
            "encode done"
        );
        Ok(out)
    }

    fn global_types_block(&self) -> Option<String> {
        if !self.opts.global_types_active() || self.global_types.is_empty() {
            return None;
        }
        let mut block = String::new();
        primitives::escape_and_quote_into(&mut block, EXT_TYPES);
        block.push_str(":{");
        for (i, name) in self.global_types.iter().enumerate() {
            if i > 0 {
                block.push(',');
            }
            primitives::escape_and_quote_into(&mut block, name);
            block.push(':');
            block.push('"');
            number::push_u64(&mut block, i as u64 + 1);
            block.push('"');
        }
        block.push_str("},");
        Some(block)
    }

    /// 1-based id of `ty` in the shared type block, registering it on first sight.
    fn global_type_id(&mut self, qualified_name: &str) -> usize {
        if let Some(&id) = self.global_index.get(qualified_name) {
            return id;
        }
        self.global_types.push(qualified_name.to_string());
        let id = self.global_types.len();
        self.global_index.insert(qualified_name.to_string(), id);
        id
    }

    fn take_skipped(&mut self) -> bool {
        std::mem::take(&mut self.skipped)
    }

    /// Runs `write` as one element of a container, handling the separator.
    /// An element vetoed by an interceptor leaves no trace, separator included.
    fn write_element<F>(&mut self, first: &mut bool, write: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let start = self.w.len();
        if !*first {
            self.w.push(',');
        }
        write(self)?;
        if self.take_skipped() {
            self.w.truncate(start);
        } else {
            *first = false;
        }
        Ok(())
    }

    /// Full runtime dispatch on the value's variant.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null | Value::DbNull => self.w.push_str(primitives::format_null()),
            Value::String(s) => self.write_string(s),
            Value::Char(c) => self.write_string(c.encode_utf8(&mut [0u8; 4])),
            Value::Bool(b) => self.w.push_str(primitives::format_bool(*b)),
            Value::I8(n) => number::push_i32(self.w.buffer_mut(), i32::from(*n)),
            Value::U8(n) => number::push_i32(self.w.buffer_mut(), i32::from(*n)),
            Value::I16(n) => number::push_i32(self.w.buffer_mut(), i32::from(*n)),
            Value::U16(n) => number::push_i32(self.w.buffer_mut(), i32::from(*n)),
            Value::I32(n) => number::push_i32(self.w.buffer_mut(), *n),
            Value::U32(n) => number::push_i64(self.w.buffer_mut(), i64::from(*n)),
            Value::I64(n) => number::push_i64(self.w.buffer_mut(), *n),
            Value::U64(n) => number::push_u64(self.w.buffer_mut(), *n),
            Value::F32(f) => self.w.push_str(&number::format_f32(*f)),
            Value::F64(f) => self.w.push_str(&number::format_f64(*f)),
            Value::Decimal(d) => self.w.push_str(&d.to_string()),
            Value::DateTime(_) => dispatch::write_date_time(self, value)?,
            Value::Guid(_) => dispatch::write_guid(self, value)?,
            Value::TimeSpan(_) => dispatch::write_time_span(self, value)?,
            Value::Map(m) if !self.opts.kv_style_string_dictionary && m.has_string_keys() => {
                self.write_string_keyed_map(m)?
            }
            Value::Map(m) => self.write_kv_map(m)?,
            Value::DataSet(ds) => self.write_data_set(ds)?,
            Value::DataTable(dt) => self.write_data_table(dt)?,
            Value::Bytes(b) => self.write_bytes(b),
            Value::StringDictionary(sd) => self.write_string_dictionary(sd),
            Value::NameValue(nv) => self.write_name_value(nv),
            Value::List(_) | Value::Sequence(_) | Value::Array(_) => {
                collections::write_array(self, value)?
            }
            Value::Enum(_) => dispatch::write_enum(self, value)?,
            Value::Object(o) if self.manager.is_type_registered(o.type_of()) => {
                self.write_custom(o.type_of(), value)
            }
            Value::Object(o) => self.write_object(o)?,
        }
        Ok(())
    }

    /// Escaped, quoted string honoring the unicode escaping policy.
    pub(crate) fn write_string(&mut self, s: &str) {
        if s.is_empty() {
            self.w.push_str("\"\"");
        } else if self.opts.use_escaped_unicode {
            primitives::escape_unicode_and_quote_into(self.w.buffer_mut(), s);
        } else {
            primitives::escape_and_quote_into(self.w.buffer_mut(), s);
        }
    }

    /// Quoted with no escaping, for text known not to need it.
    pub(crate) fn write_string_fast(&mut self, s: &str) {
        self.w.push('"');
        self.w.push_str(s);
        self.w.push('"');
    }

    /// Member or key name after the naming transform, followed by `:`.
    pub(crate) fn write_name(&mut self, name: &str) {
        if self.opts.naming_strategy.is_identity() {
            self.write_string(name);
        } else {
            let renamed = self.opts.naming_strategy.rename(name);
            self.write_string(&renamed);
        }
        self.w.push(':');
    }

    pub(crate) fn write_pair(&mut self, name: &str, value: &Value) -> Result<()> {
        self.write_string_fast(name);
        self.w.push(':');
        self.write_value(value)
    }

    pub(crate) fn write_pair_fast(&mut self, name: &str, value: &str) {
        self.write_string_fast(name);
        self.w.push(':');
        self.write_string_fast(value);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.w.push('"');
        BASE64.encode_string(bytes, self.w.buffer_mut());
        self.w.push('"');
    }

    fn write_custom(&mut self, ty: &Type, value: &Value) {
        match self.manager.custom_encoder(ty) {
            Some(encode) => {
                let text = encode(value);
                self.write_string_fast(&text);
            }
            None => self.w.push_str(primitives::format_null()),
        }
    }
}
