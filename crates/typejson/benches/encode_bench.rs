use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use typejson::value::{Array, DataTable, List, Map, ObjectRef};
use typejson::{Manager, Options, Type, Value};

fn order_types() -> (Type, Type) {
    let line = Type::object("Line")
        .assembly("Bench")
        .property("Sku", Type::string())
        .property("Qty", Type::i32())
        .property("Price", Type::f64())
        .build();
    let order = Type::object("Order")
        .assembly("Bench")
        .property("Id", Type::i64())
        .property("Customer", Type::string())
        .property("Placed", Type::datetime())
        .property("Lines", Type::list_of(&line))
        .property("Notes", Type::string())
        .build();
    (order, line)
}

fn orders(count: usize) -> Value {
    let (order, line) = order_types();
    let placed = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .map(Value::from)
        .unwrap_or(Value::Null);
    let items = (0..count).map(|i| {
        let lines = (0..4).map(|j| {
            Value::Object(
                ObjectRef::new(&line)
                    .with("Sku", format!("SKU-{j:04}"))
                    .with("Qty", j as i32 + 1)
                    .with("Price", 9.99 * (j + 1) as f64),
            )
        });
        Value::Object(
            ObjectRef::new(&order)
                .with("Id", i as i64)
                .with("Customer", format!("customer \"{i}\""))
                .with("Placed", placed.clone())
                .with("Lines", List::of(&line, lines)),
        )
    });
    Value::List(List::of(&order, items))
}

fn grid(side: usize) -> Value {
    let cells = (0..side * side).map(|i| Value::F64(i as f64 / 7.0)).collect();
    Array::with_shape(&Type::f64(), &[side, side], cells)
        .map(Value::Array)
        .unwrap_or(Value::Null)
}

fn lookup(entries: usize) -> Value {
    let map = (0..entries).fold(Map::new(&Type::string(), &Type::i64()), |m, i| {
        m.with(format!("key_{i}"), i as i64)
    });
    Value::Map(map)
}

fn table(rows: usize) -> Value {
    let t = (0..rows).fold(
        DataTable::new("Events")
            .column("Id", Type::i32())
            .column("Name", Type::string())
            .column("Ok", Type::bool()),
        |t, i| t.row(vec![Value::I32(i as i32), Value::from(format!("e{i}")), Value::Bool(i % 2 == 0)]),
    );
    Value::DataTable(t)
}

pub fn encode_benchmarks(c: &mut Criterion) {
    let manager = Manager::new();
    let cases = [
        ("orders_100", orders(100)),
        ("grid_64", grid(64)),
        ("map_1k", lookup(1000)),
        ("table_1k", table(1000)),
    ];
    let profiles = [
        ("extensions", Options::default()),
        ("relaxed", Options::relaxed()),
    ];

    let mut group = c.benchmark_group("encode");
    for (name, value) in &cases {
        for (profile, opts) in &profiles {
            let len = manager.to_string(value, opts).map(|s| s.len()).unwrap_or(0);
            group.throughput(Throughput::Bytes(len as u64));
            group.bench_function(format!("{profile}::{name}"), |b| {
                b.iter(|| black_box(manager.to_string(black_box(value), opts)))
            });
        }
    }
    group.finish();
}

pub fn descriptor_benchmarks(c: &mut Criterion) {
    let manager = Manager::new();
    let (order, _) = order_types();
    manager.descriptor(&order);
    c.bench_function("descriptor_cache_hit", |b| {
        b.iter(|| black_box(manager.descriptor(black_box(&order))))
    });
}

criterion_group!(benches, encode_benchmarks, descriptor_benchmarks);
criterion_main!(benches);
