#![no_main]
use libfuzzer_sys::{arbitrary, fuzz_target};
use arbitrary::Arbitrary;
use typejson::value::{List, Map, ObjectRef};
use typejson::{Error, Options, Type, Value};

const MAX_DEPTH: usize = 8;
const MAX_ITEMS: usize = 12;

#[derive(Arbitrary, Debug)]
struct FuzzOptions {
    use_extensions: bool,
    using_global_types: bool,
    inline_circular_references: bool,
    serialize_null_values: bool,
    serialize_empty_collections: bool,
    use_escaped_unicode: bool,
    max_depth: u8,
}

impl FuzzOptions {
    fn options(&self) -> Options {
        Options {
            use_extensions: self.use_extensions,
            using_global_types: self.using_global_types,
            inline_circular_references: self.inline_circular_references,
            serialize_null_values: self.serialize_null_values,
            serialize_empty_collections: self.serialize_empty_collections,
            use_escaped_unicode: self.use_escaped_unicode,
            serializer_max_depth: usize::from(self.max_depth % 24) + 1,
            ..Options::default()
        }
    }
}

/// Builds values over a single node type whose `Link` member may point back
/// at any node created so far, producing shared and cyclic graphs.
struct Builder {
    node: Type,
    nodes: Vec<ObjectRef>,
}

impl Builder {
    fn value(&mut self, u: &mut arbitrary::Unstructured, depth: usize) -> arbitrary::Result<Value> {
        if depth >= MAX_DEPTH {
            return Ok(Value::Null);
        }
        Ok(match u.int_in_range(0..=8u8)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => Value::I64(u.arbitrary()?),
            3 => Value::F64(u.arbitrary()?),
            4 => Value::String(u.arbitrary()?),
            5 => {
                let n = u.int_in_range(0..=MAX_ITEMS)?;
                let mut items = Vec::with_capacity(n);
                for _ in 0..n {
                    items.push(self.value(u, depth + 1)?);
                }
                Value::List(List::untyped(items))
            }
            6 => {
                let n = u.int_in_range(0..=MAX_ITEMS)?;
                let mut m = Map::new(&Type::string(), &Type::any());
                for _ in 0..n {
                    let key: String = u.arbitrary()?;
                    let v = self.value(u, depth + 1)?;
                    m.insert(key, v);
                }
                Value::Map(m)
            }
            7 if !self.nodes.is_empty() => {
                let i = u.choose_index(self.nodes.len())?;
                Value::Object(self.nodes[i].clone())
            }
            _ => {
                let n = ObjectRef::new(&self.node).with("Name", u.arbitrary::<String>()?);
                self.nodes.push(n.clone());
                let child = self.value(u, depth + 1)?;
                n.set("Child", child);
                let link = self.value(u, depth + 1)?;
                n.set("Link", link);
                Value::Object(n)
            }
        })
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = arbitrary::Unstructured::new(data);
    let Ok(fo) = u.arbitrary::<FuzzOptions>() else {
        return;
    };
    let node = Type::object("Node")
        .field("Name", Type::string())
        .field("Child", Type::any())
        .field("Link", Type::any())
        .build();
    let mut b = Builder { node, nodes: Vec::new() };
    let Ok(value) = b.value(&mut u, 0) else {
        return;
    };

    match typejson::to_string(&value, &fo.options()) {
        Ok(out) if out.is_empty() => {}
        Ok(out) => {
            if let Err(e) = serde_json::from_str::<serde_json::Value>(&out) {
                panic!("invalid JSON output: {e}\noutput: {out}");
            }
        }
        Err(Error::DepthExceeded { .. }) => {}
        Err(e) => panic!("unexpected error: {e}"),
    }

    // Cycles hold strong references; break them so the graph is freed.
    for n in &b.nodes {
        n.set("Child", Value::Null);
        n.set("Link", Value::Null);
    }
});
