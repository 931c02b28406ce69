use typejson::value::{
    Array, DataSet, DataTable, List, Map, NameValueCollection, ObjectRef, StringDictionary,
};
use typejson::{NamingStrategy, Options, Type, Value};

fn plain() -> Options {
    Options {
        use_extensions: false,
        ..Options::default()
    }
}

fn ints(range: std::ops::RangeInclusive<i32>) -> Vec<Value> {
    range.map(Value::I32).collect()
}

#[test]
fn rank_two_array_nests_rows() -> Result<(), Box<dyn std::error::Error>> {
    let a = Array::with_shape(&Type::i32(), &[2, 3], ints(1..=6)).ok_or("shape")?;
    assert_eq!(typejson::to_string(&a.into(), &plain())?, "[[1,2,3],[4,5,6]]");
    Ok(())
}

#[test]
fn lower_bounds_do_not_change_layout() -> Result<(), Box<dyn std::error::Error>> {
    let a = Array::with_bounds(&Type::i32(), &[1, -3], &[2, 2], ints(1..=4)).ok_or("shape")?;
    assert_eq!(typejson::to_string(&a.into(), &plain())?, "[[1,2],[3,4]]");
    Ok(())
}

#[test]
fn bounds_at_the_edge_of_the_index_range() -> Result<(), Box<dyn std::error::Error>> {
    let near_max = Array::with_bounds(&Type::i32(), &[i64::MAX - 2, 0], &[2, 1], ints(1..=2));
    let a = near_max.ok_or("shape")?;
    assert_eq!(typejson::to_string(&a.into(), &plain())?, "[[1],[2]]");

    let past_max = Array::with_bounds(&Type::i32(), &[i64::MAX - 1, 0], &[2, 1], ints(1..=2));
    assert!(past_max.is_none());
    assert!(Array::with_shape(&Type::i32(), &[usize::MAX, 2], ints(1..=2)).is_none());
    Ok(())
}

#[test]
fn rank_three_array_and_null_cells() -> Result<(), Box<dyn std::error::Error>> {
    let a = Array::with_shape(&Type::i32(), &[2, 1, 2], ints(1..=4)).ok_or("shape")?;
    assert_eq!(typejson::to_string(&a.into(), &plain())?, "[[[1,2]],[[3,4]]]");

    let cells = vec![Value::from("a"), Value::Null, Value::Null, Value::from("d")];
    let a = Array::with_shape(&Type::string(), &[2, 2], cells).ok_or("shape")?;
    assert_eq!(
        typejson::to_string(&a.into(), &plain())?,
        r#"[["a",null],[null,"d"]]"#
    );
    Ok(())
}

#[test]
fn rank_one_arrays() -> Result<(), Box<dyn std::error::Error>> {
    let a = Array::of(&Type::f64(), [0.5, 2.0]);
    assert_eq!(typejson::to_string(&a.into(), &plain())?, "[0.5,2]");
    let empty = Array::of(&Type::string(), Vec::<String>::new());
    assert_eq!(typejson::to_string(&empty.into(), &plain())?, "[]");
    Ok(())
}

#[test]
fn string_keyed_maps() -> Result<(), Box<dyn std::error::Error>> {
    let m = Map::new(&Type::string(), &Type::any())
        .with("a", 1)
        .with("b", Value::Null);
    assert_eq!(
        typejson::to_string(&m.clone().into(), &plain())?,
        r#"{"a":1,"b":null}"#
    );

    let no_nulls = Options {
        serialize_null_values: false,
        ..plain()
    };
    assert_eq!(typejson::to_string(&m.clone().into(), &no_nulls)?, r#"{"a":1}"#);

    let kv = Options {
        kv_style_string_dictionary: true,
        ..plain()
    };
    assert_eq!(
        typejson::to_string(&m.into(), &kv)?,
        r#"[{"k":"a","v":1},{"k":"b","v":null}]"#
    );
    Ok(())
}

#[test]
fn empty_string_keyed_map_is_empty_object() -> Result<(), Box<dyn std::error::Error>> {
    let m = Map::new(&Type::string(), &Type::i32());
    assert_eq!(typejson::to_string(&m.clone().into(), &plain())?, "{}");
    assert_eq!(typejson::to_string(&m.into(), &Options::default())?, "{}");
    Ok(())
}

#[test]
fn map_keys_use_naming_strategy() -> Result<(), Box<dyn std::error::Error>> {
    let m = Map::new(&Type::string(), &Type::i32()).with("FirstKey", 1);
    let camel = Options {
        naming_strategy: NamingStrategy::CamelCase,
        ..plain()
    };
    assert_eq!(typejson::to_string(&m.into(), &camel)?, r#"{"firstKey":1}"#);
    Ok(())
}

#[test]
fn other_maps_are_key_value_arrays() -> Result<(), Box<dyn std::error::Error>> {
    let m = Map::new(&Type::i32(), &Type::string())
        .with(1, "x")
        .with(2, Value::Null);
    let no_nulls = Options {
        serialize_null_values: false,
        ..plain()
    };
    assert_eq!(
        typejson::to_string(&m.into(), &no_nulls)?,
        r#"[{"k":1,"v":"x"},{"k":2,"v":null}]"#
    );
    Ok(())
}

#[test]
fn map_member_of_object() -> Result<(), Box<dyn std::error::Error>> {
    let scores = Type::map_of(&Type::string(), &Type::i32());
    let ty = Type::object("Board").field("Scores", scores).build();
    let board = ObjectRef::new(&ty).with(
        "Scores",
        Map::new(&Type::string(), &Type::i32()).with("ann", 3),
    );
    assert_eq!(
        typejson::to_string(&Value::Object(board), &plain())?,
        r#"{"Scores":{"ann":3}}"#
    );
    Ok(())
}

#[test]
fn name_value_collection_shapes() -> Result<(), Box<dyn std::error::Error>> {
    let mut nv = NameValueCollection::new();
    nv.add("a", Some("1"));
    nv.add("a", Some("2"));
    nv.add("b", Some("x"));
    nv.add_empty("c");
    nv.add("d", None);
    assert_eq!(
        typejson::to_string(&nv.clone().into(), &plain())?,
        r#"{"a":["1","2"],"b":"x","c":"","d":null}"#
    );
    let no_nulls = Options {
        serialize_null_values: false,
        ..plain()
    };
    assert_eq!(
        typejson::to_string(&nv.into(), &no_nulls)?,
        r#"{"a":["1","2"],"b":"x","c":""}"#
    );
    Ok(())
}

#[test]
fn string_dictionary_lowercases_keys() -> Result<(), Box<dyn std::error::Error>> {
    let mut sd = StringDictionary::new();
    sd.insert("Key", Some("V"));
    sd.insert("Gone", None);
    assert_eq!(
        typejson::to_string(&sd.clone().into(), &plain())?,
        r#"{"key":"V","gone":null}"#
    );
    let no_nulls = Options {
        serialize_null_values: false,
        ..plain()
    };
    assert_eq!(typejson::to_string(&sd.into(), &no_nulls)?, r#"{"key":"V"}"#);
    Ok(())
}

fn people() -> DataTable {
    DataTable::new("People")
        .column("Name", Type::string())
        .column("Age", Type::i32())
        .row(vec![Value::from("Ann"), Value::I32(41)])
        .row(vec![Value::from("Bob")])
}

#[test]
fn data_table_rows_and_schema() -> Result<(), Box<dyn std::error::Error>> {
    assert_eq!(
        typejson::to_string(&people().into(), &plain())?,
        r#"{"People":[["Ann",41],["Bob",null]]}"#
    );
    assert_eq!(
        typejson::to_string(&people().into(), &Options::default())?,
        r#"{"$schema":{"Info":["People","Name","string","People","Age","i32"],"Name":"People"},"People":[["Ann",41],["Bob",null]]}"#
    );
    Ok(())
}

#[test]
fn data_set_writes_each_table() -> Result<(), Box<dyn std::error::Error>> {
    let ds = DataSet::new("Db")
        .table(people())
        .table(DataTable::new("Empty").column("X", Type::bool()));
    assert_eq!(
        typejson::to_string(&ds.clone().into(), &plain())?,
        r#"{"People":[["Ann",41],["Bob",null]],"Empty":[]}"#
    );

    let xml = Options {
        use_optimized_dataset_schema: false,
        ..Options::default()
    };
    let out = typejson::to_string(&ds.into(), &xml)?;
    let parsed: serde_json::Value = serde_json::from_str(&out)?;
    let schema = parsed["$schema"].as_str().ok_or("schema string")?;
    assert!(schema.starts_with(r#"<xs:schema id="Db">"#));
    assert!(schema.contains(r#"<xs:element name="Age" type="i32" minOccurs="0" />"#));
    assert_eq!(parsed["Empty"], serde_json::json!([]));
    Ok(())
}

#[test]
fn empty_data_set_with_schema_is_valid_json() -> Result<(), Box<dyn std::error::Error>> {
    let out = typejson::to_string(&DataSet::new("Db").into(), &Options::default())?;
    assert_eq!(out, r#"{"$schema":{"Info":[],"Name":"Db"}}"#);
    Ok(())
}

#[test]
fn forward_only_sequence_member() -> Result<(), Box<dyn std::error::Error>> {
    let seq_ty = Type::sequence_of(&Type::i32());
    let ty = Type::object("Feed").field("Items", seq_ty.clone()).build();
    let mut items = List::new(&seq_ty);
    items.push(1);
    items.push(2);
    let feed = ObjectRef::new(&ty).with("Items", Value::Sequence(items));
    assert_eq!(
        typejson::to_string(&Value::Object(feed), &plain())?,
        r#"{"Items":[1,2]}"#
    );
    Ok(())
}
