use chrono::{DateTime, NaiveDate, TimeDelta};
use typejson::value::{Decimal, EnumValue, List};
use typejson::{Options, Type, Value};
use uuid::Uuid;

fn plain() -> Options {
    Options {
        use_extensions: false,
        ..Options::default()
    }
}

fn enc(v: impl Into<Value>, opts: &Options) -> Result<String, typejson::Error> {
    typejson::to_string(&v.into(), opts)
}

#[test]
fn integer_boundaries() -> Result<(), Box<dyn std::error::Error>> {
    let o = plain();
    assert_eq!(enc(i32::MIN, &o)?, "-2147483648");
    assert_eq!(enc(i32::MAX, &o)?, "2147483647");
    assert_eq!(enc(i64::MIN, &o)?, "-9223372036854775808");
    assert_eq!(enc(i64::MAX, &o)?, "9223372036854775807");
    assert_eq!(enc(u64::MAX, &o)?, "18446744073709551615");
    assert_eq!(enc(0i32, &o)?, "0");
    assert_eq!(enc(-7i8, &o)?, "-7");
    assert_eq!(enc(i8::MIN, &o)?, "-128");
    assert_eq!(enc(i16::MIN, &o)?, "-32768");
    assert_eq!(enc(u8::MAX, &o)?, "255");
    assert_eq!(enc(65535u16, &o)?, "65535");
    assert_eq!(enc(u32::MAX, &o)?, "4294967295");
    Ok(())
}

#[test]
fn floats_and_decimals() -> Result<(), Box<dyn std::error::Error>> {
    let o = plain();
    assert_eq!(enc(1.5f64, &o)?, "1.5");
    assert_eq!(enc(-0.25f32, &o)?, "-0.25");
    assert_eq!(enc(1e21f64, &o)?, "1000000000000000000000");
    assert_eq!(enc(f64::NAN, &o)?, r#""NaN""#);
    assert_eq!(enc(f64::NEG_INFINITY, &o)?, r#""-Infinity""#);
    assert_eq!(enc(Decimal::new(150, 2), &o)?, "1.50");
    Ok(())
}

#[test]
fn scalars_and_null() -> Result<(), Box<dyn std::error::Error>> {
    let o = plain();
    assert_eq!(enc(true, &o)?, "true");
    assert_eq!(enc(Value::Null, &o)?, "null");
    assert_eq!(enc(Value::DbNull, &o)?, "null");
    assert_eq!(enc('x', &o)?, r#""x""#);
    assert_eq!(enc("", &o)?, r#""""#);
    assert_eq!(enc(vec![1u8, 2, 3], &o)?, r#""AQID""#);
    Ok(())
}

#[test]
fn string_escaping_follows_unicode_policy() -> Result<(), Box<dyn std::error::Error>> {
    let escaped = plain();
    assert_eq!(enc("a\"b\\c\n", &escaped)?, r#""a\"b\\c\n""#);
    assert_eq!(enc("héllo", &escaped)?, r#""h\u00E9llo""#);
    assert_eq!(enc("\u{1}", &escaped)?, r#""\u0001""#);

    let raw = Options {
        use_escaped_unicode: false,
        ..plain()
    };
    assert_eq!(enc("héllo", &raw)?, "\"héllo\"");
    assert_eq!(enc("tab\there", &raw)?, r#""tab\there""#);
    Ok(())
}

#[test]
fn date_times_in_utc_and_local() -> Result<(), Box<dyn std::error::Error>> {
    let naive = NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_milli_opt(3, 4, 5, 678))
        .ok_or("bad date")?;
    assert_eq!(enc(naive, &plain())?, r#""2024-01-02T03:04:05Z""#);

    let millis = Options {
        date_time_milliseconds: true,
        ..plain()
    };
    assert_eq!(enc(naive, &millis)?, r#""2024-01-02T03:04:05.678Z""#);

    let offset = DateTime::parse_from_rfc3339("2024-01-02T05:04:05+02:00")?;
    assert_eq!(enc(offset, &plain())?, r#""2024-01-02T03:04:05Z""#);
    let local = Options {
        use_utc_date_time: false,
        ..plain()
    };
    assert_eq!(enc(offset, &local)?, r#""2024-01-02T05:04:05""#);
    Ok(())
}

#[test]
fn years_outside_four_digits_keep_every_digit() -> Result<(), Box<dyn std::error::Error>> {
    let at = |y: i32| {
        NaiveDate::from_ymd_opt(y, 1, 2)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or("bad date")
    };
    assert_eq!(enc(at(12345)?, &plain())?, r#""+12345-01-02T00:00:00Z""#);
    assert_eq!(enc(at(-44)?, &plain())?, r#""-0044-01-02T00:00:00Z""#);
    assert_eq!(enc(at(7)?, &plain())?, r#""0007-01-02T00:00:00Z""#);
    Ok(())
}

#[test]
fn guids_and_time_spans() -> Result<(), Box<dyn std::error::Error>> {
    let g = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff")?;
    assert_eq!(enc(g, &plain())?, r#""MyIRAFVEd2aImaq7zN3u/w==""#);
    let slow = Options {
        use_fast_guid: false,
        ..plain()
    };
    assert_eq!(enc(g, &slow)?, r#""00112233-4455-6677-8899-aabbccddeeff""#);

    assert_eq!(enc(TimeDelta::seconds(3_723), &plain())?, r#""01:02:03""#);
    Ok(())
}

#[test]
fn enums_by_name_value_and_flags() -> Result<(), Box<dyn std::error::Error>> {
    let color = Type::enumeration("Color")
        .variant("Red", 1)
        .variant_named("Green", 2, "green")
        .build();
    let o = plain();
    assert_eq!(enc(EnumValue::new(&color, 1), &o)?, r#""Red""#);
    assert_eq!(enc(EnumValue::new(&color, 2), &o)?, r#""green""#);
    assert_eq!(enc(EnumValue::new(&color, 9), &o)?, "9");

    let numeric = Options {
        use_values_of_enums: true,
        ..plain()
    };
    assert_eq!(enc(EnumValue::new(&color, 1), &numeric)?, "1");

    let perms = Type::enumeration("Perms")
        .flags()
        .variant("Read", 1)
        .variant("Write", 2)
        .variant("Exec", 4)
        .build();
    assert_eq!(enc(EnumValue::new(&perms, 3), &o)?, r#""Read, Write""#);
    assert_eq!(enc(EnumValue::new(&perms, 4), &o)?, r#""Exec""#);
    assert_eq!(enc(EnumValue::new(&perms, 8), &o)?, "8");
    Ok(())
}

#[test]
fn lists_and_sequences() -> Result<(), Box<dyn std::error::Error>> {
    let o = plain();
    assert_eq!(enc(List::of(&Type::i32(), Vec::<i32>::new()), &o)?, "[]");
    assert_eq!(enc(List::of(&Type::i32(), [1, 2, 3]), &o)?, "[1,2,3]");
    assert_eq!(
        enc(List::untyped([Value::I32(1), Value::Null, Value::from("x")]), &o)?,
        r#"[1,null,"x"]"#
    );
    let seq = Value::Sequence(List::untyped([true, false]));
    assert_eq!(enc(seq, &o)?, "[true,false]");
    Ok(())
}

#[test]
fn writer_output_matches_string_output() -> Result<(), Box<dyn std::error::Error>> {
    let v = Value::from(List::of(&Type::string(), ["a", "b"]));
    let mut buf = Vec::new();
    typejson::to_writer(&mut buf, &v, &plain())?;
    assert_eq!(String::from_utf8(buf)?, typejson::to_string(&v, &plain())?);
    Ok(())
}
