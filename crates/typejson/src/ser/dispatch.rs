//! Two-level writer dispatch.
//!
//! Every tag except [`DataKind::Primitive`] maps to a writer in a fixed
//! table. The catch-all tag is resolved by exact primitive type, then the
//! enum and array special cases, then the full runtime dispatch.
//!
//! Typed writers fall back to [`Encoder::write_value`] when handed a value
//! of a different variant, so a declared type never has to match exactly.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{Datelike, Timelike};

use super::{Encoder, collections};
use crate::error::Result;
use crate::manager::Manager;
use crate::number;
use crate::reflection::DataKind;
use crate::types::{Primitive, Shape, Type};
use crate::value::Value;

pub(crate) type WriteFn = fn(&mut Encoder<'_>, &Value) -> Result<()>;

const WRITERS: [Option<WriteFn>; DataKind::COUNT] = {
    let mut t: [Option<WriteFn>; DataKind::COUNT] = [None; DataKind::COUNT];
    t[DataKind::Int as usize] = Some(write_i32 as WriteFn);
    t[DataKind::Long as usize] = Some(write_i64 as WriteFn);
    t[DataKind::String as usize] = Some(write_string as WriteFn);
    t[DataKind::Bool as usize] = Some(write_bool as WriteFn);
    t[DataKind::Single as usize] = Some(write_f32 as WriteFn);
    t[DataKind::Double as usize] = Some(write_f64 as WriteFn);
    t[DataKind::DateTime as usize] = Some(write_date_time as WriteFn);
    t[DataKind::Enum as usize] = Some(write_enum as WriteFn);
    t[DataKind::Guid as usize] = Some(write_guid as WriteFn);
    t[DataKind::TimeSpan as usize] = Some(write_time_span as WriteFn);
    t[DataKind::Array as usize] = Some(collections::write_array as WriteFn);
    t[DataKind::List as usize] = Some(collections::write_array as WriteFn);
    t[DataKind::ByteArray as usize] = Some(write_bytes as WriteFn);
    t[DataKind::MultiDimensionalArray as usize] = Some(collections::write_array as WriteFn);
    t[DataKind::Dictionary as usize] = Some(collections::write_dictionary as WriteFn);
    t[DataKind::StringKeyDictionary as usize] = Some(collections::write_dictionary as WriteFn);
    t[DataKind::NameValue as usize] = Some(collections::write_name_value as WriteFn);
    t[DataKind::StringDictionary as usize] = Some(collections::write_string_dictionary as WriteFn);
    t[DataKind::DataSet as usize] = Some(write_unknown as WriteFn);
    t[DataKind::DataTable as usize] = Some(write_unknown as WriteFn);
    t[DataKind::Custom as usize] = Some(write_unknown as WriteFn);
    t[DataKind::Object as usize] = Some(write_object as WriteFn);
    t
};

/// Writer for values declared as `ty`.
pub(crate) fn writer_for(manager: &Manager, ty: &Type) -> WriteFn {
    let ty = match ty.shape() {
        Shape::Nullable(inner) => inner,
        _ => ty,
    };
    let kind = DataKind::of(ty, manager.is_type_registered(ty));
    if let Some(write) = WRITERS[kind as usize] {
        return write;
    }
    match ty.shape() {
        Shape::Primitive(p) => exact_writer(*p),
        Shape::Enum(_) => write_enum,
        Shape::Array { .. } => collections::write_array,
        _ => write_unknown,
    }
}

fn exact_writer(p: Primitive) -> WriteFn {
    match p {
        Primitive::Char => write_char,
        Primitive::I8 | Primitive::U8 | Primitive::I16 | Primitive::U16 => write_small_int,
        Primitive::U32 => write_u32,
        Primitive::U64 => write_u64,
        Primitive::Decimal => write_decimal,
        _ => write_unknown,
    }
}

pub(crate) fn write_unknown(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    enc.write_value(v)
}

fn write_object(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::Object(o) if !enc.manager.is_type_registered(o.type_of()) => enc.write_object(o),
        _ => enc.write_value(v),
    }
}

fn write_i32(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::I32(n) => number::push_i32(enc.w.buffer_mut(), *n),
        _ => return enc.write_value(v),
    }
    Ok(())
}

fn write_i64(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::I64(n) => number::push_i64(enc.w.buffer_mut(), *n),
        _ => return enc.write_value(v),
    }
    Ok(())
}

fn write_small_int(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    let n = match v {
        Value::I8(n) => i32::from(*n),
        Value::U8(n) => i32::from(*n),
        Value::I16(n) => i32::from(*n),
        Value::U16(n) => i32::from(*n),
        _ => return enc.write_value(v),
    };
    number::push_i32(enc.w.buffer_mut(), n);
    Ok(())
}

fn write_u32(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::U32(n) => number::push_i64(enc.w.buffer_mut(), i64::from(*n)),
        _ => return enc.write_value(v),
    }
    Ok(())
}

fn write_u64(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::U64(n) => number::push_u64(enc.w.buffer_mut(), *n),
        _ => return enc.write_value(v),
    }
    Ok(())
}

fn write_f32(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::F32(f) => enc.w.push_str(&number::format_f32(*f)),
        _ => return enc.write_value(v),
    }
    Ok(())
}

fn write_f64(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::F64(f) => enc.w.push_str(&number::format_f64(*f)),
        _ => return enc.write_value(v),
    }
    Ok(())
}

fn write_decimal(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::Decimal(d) => enc.w.push_str(&d.to_string()),
        _ => return enc.write_value(v),
    }
    Ok(())
}

fn write_bool(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::Bool(b) => enc.w.push_str(crate::encode::primitives::format_bool(*b)),
        _ => return enc.write_value(v),
    }
    Ok(())
}

fn write_string(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::String(s) => enc.write_string(s),
        _ => return enc.write_value(v),
    }
    Ok(())
}

fn write_char(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::Char(c) => enc.write_string(c.encode_utf8(&mut [0u8; 4])),
        _ => return enc.write_value(v),
    }
    Ok(())
}

fn write_bytes(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    match v {
        Value::Bytes(b) => enc.write_bytes(b),
        _ => return enc.write_value(v),
    }
    Ok(())
}

/// Four digits inside 0..=9999, otherwise signed and unpadded beyond four digits.
fn push_year(out: &mut String, year: i32) {
    if (0..=9999).contains(&year) {
        number::push_fixed_width(out, year as u32, 4);
        return;
    }
    out.push(if year < 0 { '-' } else { '+' });
    let magnitude = year.unsigned_abs();
    if magnitude > 9999 {
        number::push_u64(out, u64::from(magnitude));
    } else {
        number::push_fixed_width(out, magnitude, 4);
    }
}

/// `"YYYY-MM-DDTHH:mm:ss[.fff][Z]"`; UTC adds the `Z`, local keeps the wall time.
pub(crate) fn write_date_time(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    let Value::DateTime(dt) = v else {
        return enc.write_value(v);
    };
    let dt = if enc.opts.use_utc_date_time {
        dt.naive_utc()
    } else {
        dt.naive_local()
    };
    let out = enc.w.buffer_mut();
    out.push('"');
    push_year(out, dt.year());
    out.push('-');
    number::push_fixed_width(out, dt.month(), 2);
    out.push('-');
    number::push_fixed_width(out, dt.day(), 2);
    out.push('T');
    number::push_fixed_width(out, dt.hour(), 2);
    out.push(':');
    number::push_fixed_width(out, dt.minute(), 2);
    out.push(':');
    number::push_fixed_width(out, dt.second(), 2);
    if enc.opts.date_time_milliseconds {
        out.push('.');
        number::push_fixed_width(out, dt.nanosecond() / 1_000_000, 3);
    }
    if enc.opts.use_utc_date_time {
        out.push('Z');
    }
    out.push('"');
    Ok(())
}

pub(crate) fn write_guid(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    let Value::Guid(g) = v else {
        return enc.write_value(v);
    };
    let out = enc.w.buffer_mut();
    out.push('"');
    if enc.opts.use_fast_guid {
        BASE64.encode_string(g.to_bytes_le(), out);
    } else {
        out.push_str(g.hyphenated().encode_lower(&mut uuid::Uuid::encode_buffer()));
    }
    out.push('"');
    Ok(())
}

pub(crate) fn write_time_span(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    let Value::TimeSpan(t) = v else {
        return enc.write_value(v);
    };
    let text = number::format_time_span(*t);
    enc.write_string_fast(&text);
    Ok(())
}

pub(crate) fn write_enum(enc: &mut Encoder<'_>, v: &Value) -> Result<()> {
    let Value::Enum(e) = v else {
        return enc.write_value(v);
    };
    if enc.opts.use_values_of_enums {
        number::push_i64(enc.w.buffer_mut(), e.value);
        return Ok(());
    }
    match enc.manager.enum_name(e) {
        Some(name) => enc.write_string_fast(&name),
        None => number::push_i64(enc.w.buffer_mut(), e.value),
    }
    Ok(())
}
