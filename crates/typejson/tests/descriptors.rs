use std::sync::Arc;

use typejson::reflection::{ComplexType, ConstructorTypes};
use typejson::types::{Constructor, MemberInfo};
use typejson::value::{List, ObjectRef};
use typejson::{DataKind, Error, Manager, ReflectionController, Type, Value};

#[test]
fn classification_of_common_types() {
    let person = Type::object("Person").build();
    let color = Type::enumeration("Color").variant("Red", 0).build();
    let cases = [
        (Type::i32(), DataKind::Int),
        (Type::i64(), DataKind::Long),
        (Type::string(), DataKind::String),
        (Type::bool(), DataKind::Bool),
        (Type::f32(), DataKind::Single),
        (Type::f64(), DataKind::Double),
        (Type::datetime(), DataKind::DateTime),
        (Type::guid(), DataKind::Guid),
        (Type::timespan(), DataKind::TimeSpan),
        (Type::u16(), DataKind::Primitive),
        (Type::decimal(), DataKind::Primitive),
        (Type::any(), DataKind::Primitive),
        (color, DataKind::Enum),
        (Type::bytes(), DataKind::ByteArray),
        (Type::array_of(&Type::u8(), 1), DataKind::ByteArray),
        (Type::array_of(&Type::i32(), 1), DataKind::Array),
        (Type::array_of(&Type::i32(), 2), DataKind::MultiDimensionalArray),
        (Type::list_of(&person), DataKind::List),
        (Type::map_of(&Type::string(), &Type::i32()), DataKind::StringKeyDictionary),
        (Type::map_of(&Type::i32(), &Type::i32()), DataKind::Dictionary),
        (Type::nullable(&Type::i32()), DataKind::Int),
        (Type::string_dictionary(), DataKind::StringDictionary),
        (Type::name_value_collection(), DataKind::NameValue),
        (Type::data_set(), DataKind::DataSet),
        (Type::data_table(), DataKind::DataTable),
        (person.clone(), DataKind::Object),
    ];
    for (ty, kind) in cases {
        assert_eq!(DataKind::of(&ty, false), kind, "{ty:?}");
    }
    assert_eq!(DataKind::of(&person, true), DataKind::Custom);
}

#[test]
fn descriptors_are_cached_per_type() {
    let manager = Manager::new();
    let ty = Type::object("Thing").field("A", Type::i32()).build();
    let a = manager.descriptor(&ty);
    let b = manager.descriptor(&ty);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.members.len(), 1);
    assert_eq!(a.assembly_name, "Thing");
}

#[test]
fn concurrent_lookups_share_one_descriptor() {
    let manager = Manager::new();
    let ty = Type::object("Shared")
        .field("A", Type::i32())
        .field("B", Type::string())
        .build();
    let found: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| manager.descriptor(&ty))).collect();
        handles.into_iter().filter_map(|h| h.join().ok()).collect()
    });
    assert_eq!(found.len(), 8);
    assert!(found.iter().all(|d| Arc::ptr_eq(d, &found[0])));
}

#[test]
fn container_descriptors_carry_no_members() {
    let manager = Manager::new();
    let person = Type::object("Person").field("Name", Type::string()).build();

    let list = manager.descriptor(&Type::list_of(&person));
    assert!(list.members.is_empty());
    assert_eq!(list.generic_definition, ComplexType::List);
    assert_eq!(list.item_type.as_ref(), Some(&person));
    assert!(list.item_writer.is_some());
    assert!(list.can_append);

    let grid = manager.descriptor(&Type::array_of(&Type::i32(), 2));
    assert!(grid.members.is_empty());
    assert_eq!(grid.generic_definition, ComplexType::MultiDimensionalArray);

    let opt = manager.descriptor(&Type::nullable(&Type::i32()));
    assert_eq!(opt.generic_definition, ComplexType::Nullable);
    assert!(opt.members.is_empty());

    let map = manager.descriptor(&Type::map_of(&Type::string(), &person));
    assert_eq!(map.generic_definition, ComplexType::Dictionary);
    assert_eq!(map.argument_types.len(), 2);
}

#[test]
fn member_lookup_and_read_only_rules() -> Result<(), Box<dyn std::error::Error>> {
    let manager = Manager::new();
    let ty = Type::object("Box")
        .readonly_field("Items", Type::list_of(&Type::i32()))
        .readonly_field("Label", Type::string())
        .build();
    let d = manager.descriptor(&ty);
    let items = d.find_member("Items").ok_or("Items")?;
    assert!(!items.is_read_only);
    assert!(items.is_collection);
    let label = d.find_member("Label").ok_or("Label")?;
    assert!(label.is_read_only);
    assert!(d.find_member("Missing").is_none());
    Ok(())
}

#[test]
fn instantiate_respects_constructor_capability() -> Result<(), Box<dyn std::error::Error>> {
    let manager = Manager::new();

    let public = Type::object("Open").field("A", Type::i32()).build();
    match manager.descriptor(&public).instantiate()? {
        Value::Object(o) => assert_eq!(o.get("A"), Some(Value::I32(0))),
        other => panic!("unexpected {other:?}"),
    }

    let none = Type::object("Sealed").constructor(Constructor::None).build();
    let err = manager.descriptor(&none).instantiate().unwrap_err();
    assert!(matches!(err, Error::Construction { ref type_name, .. } if type_name == "Sealed"));

    let hidden = Type::object("Hidden")
        .assembly("Internals")
        .constructor(Constructor::NonPublic)
        .build();
    let d = manager.descriptor(&hidden);
    assert!(d.constructor_info.contains(ConstructorTypes::NON_PUBLIC));
    let err = d.instantiate().unwrap_err();
    assert!(err.to_string().contains("Internals"));

    let parametric = Type::object("Args").constructor(Constructor::Parametric).build();
    let d = manager.descriptor(&parametric);
    assert!(d.constructor_info.contains(ConstructorTypes::PARAMETRIC));
    assert!(d.instantiate().is_err());

    let list = manager.descriptor(&Type::list_of(&Type::string())).instantiate()?;
    assert_eq!(list.collection_len(), Some(0));
    Ok(())
}

struct Trusting;

impl ReflectionController for Trusting {
    fn is_always_deserializable(&self, ty: &Type) -> bool {
        ty.assembly() == "Internals"
    }

    fn serialized_name(&self, _owner: &Type, member: &MemberInfo) -> Option<String> {
        Some(member.name.to_lowercase())
    }
}

#[test]
fn controller_overrides_apply_at_build_time() -> Result<(), Box<dyn std::error::Error>> {
    let manager = Manager::with_controller(Arc::new(Trusting));
    let hidden = Type::object("Hidden")
        .assembly("Internals")
        .non_public()
        .constructor(Constructor::NonPublic)
        .field("Value", Type::i32())
        .build();
    let d = manager.descriptor(&hidden);
    assert!(d.always_deserializable);
    assert!(matches!(d.instantiate()?, Value::Object(_)));

    let member = d.find_member("Value").ok_or("Value")?;
    assert!(member.specific_name);
    assert_eq!(member.serialized_name, "value");

    let obj = ObjectRef::new(&hidden).with("Value", 3);
    let opts = typejson::Options::relaxed();
    assert_eq!(manager.to_string(&Value::Object(obj), &opts)?, r#"{"value":3}"#);
    Ok(())
}

#[test]
fn append_item_on_lists() -> Result<(), Box<dyn std::error::Error>> {
    let manager = Manager::new();
    let ty = Type::list_of(&Type::i32());
    let d = manager.descriptor(&ty);
    let mut list = d.instantiate()?;
    d.append_item(&mut list, Value::I32(4))?;
    assert_eq!(list, Value::List(List::of(&Type::i32(), [4])));

    let scalar = manager.descriptor(&Type::i32());
    assert!(scalar.append_item(&mut Value::I32(1), Value::I32(2)).is_err());
    Ok(())
}
