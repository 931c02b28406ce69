use predicates::prelude::*;
use std::io::Write;
use assert_cmd::Command;
use tempfile::NamedTempFile;

#[test]
fn help_works() -> Result<(), Box<dyn std::error::Error>> {
    Command::new(assert_cmd::cargo::cargo_bin!("typejson-cli"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-extensions"));
    Ok(())
}

#[test]
fn reencodes_file_input() -> Result<(), Box<dyn std::error::Error>> {
    let input = "{\n  \"a\": 1,\n  \"b\": [true, \"x\", null]\n}\n";
    let mut tmp = NamedTempFile::new()?;
    write!(tmp, "{}", input)?;

    let output = Command::new(assert_cmd::cargo::cargo_bin!("typejson-cli"))
        .arg(tmp.path())
        .output()?;
    assert!(output.status.success());
    let out = String::from_utf8(output.stdout)?;
    assert_eq!(out.trim_end(), r#"{"a":1,"b":[true,"x",null]}"#);
    Ok(())
}

#[test]
fn policy_flags_shape_output() -> Result<(), Box<dyn std::error::Error>> {
    Command::new(assert_cmd::cargo::cargo_bin!("typejson-cli"))
        .args(["--skip-nulls", "--naming", "snake"])
        .write_stdin(r#"{"FirstName":"Ann","Gone":null,"Note":"héllo"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"first_name":"Ann","note":"h\u00E9llo"}"#,
        ));
    Ok(())
}

#[test]
fn unicode_escaping_can_be_disabled() -> Result<(), Box<dyn std::error::Error>> {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("typejson-cli"))
        .args(["--escape-unicode", "false"])
        .write_stdin(r#"["héllo"]"#)
        .output()?;
    assert!(output.status.success());
    let out = String::from_utf8(output.stdout)?;
    let parsed: serde_json::Value = serde_json::from_str(&out)?;
    assert_eq!(parsed, serde_json::json!(["héllo"]));
    assert!(out.contains('é'));
    Ok(())
}

#[test]
fn invalid_json_fails() -> Result<(), Box<dyn std::error::Error>> {
    Command::new(assert_cmd::cargo::cargo_bin!("typejson-cli"))
        .write_stdin("{nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("parsing input"));
    Ok(())
}
