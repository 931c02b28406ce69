#![no_main]
use libfuzzer_sys::fuzz_target;
use typejson::ser::bridge::from_json_str;
use typejson::{Manager, NamingStrategy, Options};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let manager = Manager::global();
    let Ok(value) = from_json_str(s, manager) else {
        return;
    };

    // Relaxed output over plain JSON input must parse back as JSON.
    if let Ok(out) = manager.to_string(&value, &Options::relaxed()) {
        if let Err(e) = serde_json::from_str::<serde_json::Value>(&out) {
            panic!("invalid JSON output: {e}\ninput: {s}\noutput: {out}");
        }
    }

    let _ = manager.to_string(&value, &Options::default());

    let snake = Options {
        naming_strategy: NamingStrategy::SnakeCase,
        use_escaped_unicode: false,
        serialize_null_values: false,
        ..Options::default()
    };
    let _ = manager.to_string(&value, &snake);
});
