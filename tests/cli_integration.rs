use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_binary_renders_invoice_file() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("factura.pdf");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("invoice2pdf");
    cmd.arg("-i")
        .arg(fixture("invoice.json"))
        .arg("-o")
        .arg(&output);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Successfully saved PDF"));

    let bytes = fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_binary_default_output_name() {
    let dir = tempdir().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("invoice2pdf");
    cmd.current_dir(dir.path())
        .arg("-i")
        .arg(fixture("invoice.json"))
        .arg("-q");
    cmd.assert().success().stdout(predicate::str::is_empty());
    assert!(dir.path().join("factura.pdf").exists());
}

#[test]
fn test_binary_rejects_invalid_email() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("never.pdf");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("invoice2pdf");
    cmd.env("RUST_LOG", "error")
        .arg("-i")
        .arg(fixture("invalid_email.json"))
        .arg("-o")
        .arg(&output);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("customer.email"));
    assert!(!output.exists());
}

#[test]
fn test_binary_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("dry.pdf");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("invoice2pdf");
    cmd.arg("-i")
        .arg(fixture("invoice.json"))
        .arg("-o")
        .arg(&output)
        .arg("--dry-run");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No PDF generated"));
    assert!(!output.exists());
}

#[test]
fn test_binary_dumps_layout() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.pdf");
    let layout = dir.path().join("layout.json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("invoice2pdf");
    cmd.arg("-i")
        .arg(fixture("invoice.json"))
        .arg("-o")
        .arg(&output)
        .arg("--dump-layout")
        .arg(&layout);
    cmd.assert().success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&layout).unwrap()).unwrap();
    let blocks = json.as_array().unwrap();
    assert_eq!(blocks[0]["text"], "FACTURA ELECTRÓNICA");
    assert!(blocks.iter().any(|b| b["kind"] == "item_table"));
    assert!(output.exists());
}

#[test]
fn test_binary_accepts_string_input_and_config() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("themed.pdf");
    let theme = dir.path().join("theme.toml");
    fs::write(&theme, "[title]\nsize = 20\n").unwrap();
    let json = fs::read_to_string(fixture("invoice.json")).unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("invoice2pdf");
    cmd.arg("-s")
        .arg(json)
        .arg("-c")
        .arg(&theme)
        .arg("-o")
        .arg(&output);
    cmd.assert().success();
    assert!(output.exists());
}

#[test]
fn test_binary_rejects_malformed_json() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("invoice2pdf");
    cmd.env("RUST_LOG", "error").arg("-s").arg("{\"customer\":").arg("--dry-run");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid invoice JSON"));
}

#[test]
fn test_binary_returns_failure_when_no_input() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("invoice2pdf");
    cmd.assert().failure();
}

#[test]
fn test_binary_prints_default_configuration() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("invoice2pdf");
    cmd.arg("--get-default-configuration");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[table.header]").and(predicate::str::contains("[colors]")));
}

#[test]
fn test_binary_lists_embedded_fonts() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("invoice2pdf");
    cmd.arg("-E");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("DejaVu Sans Condensed"));
}
