use super::Encoder;
use super::dispatch::{WriteFn, writer_for};
use crate::encode::primitives;
use crate::error::Result;
use crate::types::Type;
use crate::value::{Array, Map, NameValueCollection, StringDictionary, Value};

pub(crate) fn write_array(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::List(l) => enc.write_indexable(&l.ty, &l.items),
        Value::Array(a) if a.rank() > 1 => enc.write_multi_dimensional(a),
        Value::Array(a) => enc.write_indexable(&a.ty, &a.items),
        Value::Sequence(l) => enc.write_forward(&l.items),
        _ => enc.write_value(v),
    }
}

pub(crate) fn write_dictionary(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::Map(m) if !enc.opts.kv_style_string_dictionary && m.has_string_keys() => {
            enc.write_string_keyed_map(m)
        }
        Value::Map(m) => enc.write_kv_map(m),
        _ => enc.write_value(v),
    }
}

pub(crate) fn write_name_value(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::NameValue(nv) => {
            enc.write_name_value(nv);
            Ok(())
        }
        _ => enc.write_value(v),
    }
}

pub(crate) fn write_string_dictionary(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::StringDictionary(sd) => {
            enc.write_string_dictionary(sd);
            Ok(())
        }
        _ => enc.write_value(v),
    }
}

impl Encoder<'_> {
    /// Arrays and lists: the element type's writer is resolved once through
    /// the container's descriptor; nulls are written directly.
    fn write_indexable(&mut self, ty: &Type, items: &[Value]) -> Result<()> {
        if items.is_empty() {
            self.w.push_str("[]");
            return Ok(());
        }
        let item_writer = self.manager.descriptor(ty).item_writer;
        self.w.push('[');
        let mut first = true;
        for item in items {
            self.write_element(&mut first, |enc| match (item, item_writer) {
                (v, _) if v.is_null() => {
                    enc.w.push_str(primitives::format_null());
                    Ok(())
                }
                (v, Some(write)) => write(enc, v),
                (v, None) => enc.write_value(v),
            })?;
        }
        self.w.push(']');
        Ok(())
    }

    /// Forward-only sequences: each item goes through runtime dispatch.
    fn write_forward(&mut self, items: &[Value]) -> Result<()> {
        self.w.push('[');
        let mut first = true;
        for item in items {
            self.write_element(&mut first, |enc| enc.write_value(item))?;
        }
        self.w.push(']');
        Ok(())
    }

    fn write_multi_dimensional(&mut self, a: &Array) -> Result<()> {
        let element = a.ty.element().cloned().unwrap_or_else(Type::any);
        let write = writer_for(self.manager, &element);
        let mut index: Vec<i64> = (0..a.rank()).map(|d| a.lower_bound(d)).collect();
        self.write_dimension(write, a, &mut index, 0)
    }

    fn write_dimension(
        &mut self,
        write: WriteFn,
        a: &Array,
        index: &mut [i64],
        dim: usize,
    ) -> Result<()> {
        self.w.push('[');
        let mut first = true;
        for i in a.lower_bound(dim)..a.upper_bound(dim) {
            index[dim] = i;
            if dim + 1 < a.rank() {
                if !first {
                    self.w.push(',');
                }
                first = false;
                self.write_dimension(write, a, index, dim + 1)?;
            } else {
                let value = a.get(index).cloned().unwrap_or(Value::Null);
                self.write_element(&mut first, |enc| {
                    if value.is_null() {
                        enc.w.push_str(primitives::format_null());
                        Ok(())
                    } else {
                        write(enc, &value)
                    }
                })?;
            }
        }
        self.w.push(']');
        Ok(())
    }

    /// `{"key":value,...}`; null values are dropped unless nulls are serialized.
    pub(super) fn write_string_keyed_map(&mut self, m: &Map) -> Result<()> {
        self.w.push('{');
        let mut first = true;
        for (key, value) in &m.entries {
            if !self.opts.serialize_null_values && value.is_null() {
                continue;
            }
            self.write_element(&mut first, |enc| {
                match key {
                    Value::String(k) => enc.write_name(k),
                    other => enc.write_name(&display_key(other)),
                }
                enc.write_value(value)
            })?;
        }
        self.w.push('}');
        Ok(())
    }

    /// `[{"k":key,"v":value},...]`; nulls are always kept.
    pub(super) fn write_kv_map(&mut self, m: &Map) -> Result<()> {
        self.w.push('[');
        let mut first = true;
        for (key, value) in &m.entries {
            self.write_element(&mut first, |enc| {
                enc.w.push('{');
                enc.write_pair("k", key)?;
                if !enc.skipped {
                    enc.w.push(',');
                    enc.write_pair("v", value)?;
                    enc.w.push('}');
                }
                Ok(())
            })?;
        }
        self.w.push(']');
        Ok(())
    }

    pub(super) fn write_string_dictionary(&mut self, sd: &StringDictionary) {
        self.w.push('{');
        let mut first = true;
        for (key, value) in sd.entries() {
            if !self.opts.serialize_null_values && value.is_none() {
                continue;
            }
            if !first {
                self.w.push(',');
            }
            first = false;
            self.write_name(key);
            match value {
                Some(v) => self.write_string(v),
                None => self.w.push_str(primitives::format_null()),
            }
        }
        self.w.push('}');
    }

    /// Each key once: `null`, `""` for no values, a string for one, an array for several.
    pub(super) fn write_name_value(&mut self, nv: &NameValueCollection) {
        self.w.push('{');
        let mut first = true;
        for (key, values) in nv.entries() {
            if !self.opts.serialize_null_values && values.is_none() {
                continue;
            }
            if !first {
                self.w.push(',');
            }
            first = false;
            self.write_name(key);
            match values.as_deref() {
                None => self.w.push_str(primitives::format_null()),
                Some([]) => self.w.push_str("\"\""),
                Some([single]) => self.write_string(single),
                Some(many) => {
                    self.w.push('[');
                    for (i, v) in many.iter().enumerate() {
                        if i > 0 {
                            self.w.push(',');
                        }
                        self.write_string(v);
                    }
                    self.w.push(']');
                }
            }
        }
        self.w.push('}');
    }
}

fn display_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Char(c) => c.to_string(),
        other => format!("{other:?}"),
    }
}
