use assert_cmd::Command;

#[test]
fn settings_prints_resolved_json() {
    let output = Command::cargo_bin("folio")
        .unwrap()
        .arg("settings")
        .env("FOLIO_ENV", "local")
        .env("FOLIO_CONFIG_DIR", env!("CARGO_MANIFEST_DIR"))
        .env("FOLIO_CACHE__TTL_SECS", "42")
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["cache"]["ttl_secs"], 42);
    assert_eq!(value["events"]["channel"], "book_events");
}

#[test]
fn unknown_environment_fails() {
    Command::cargo_bin("folio")
        .unwrap()
        .arg("settings")
        .env("FOLIO_ENV", "moon")
        .env("FOLIO_CONFIG_DIR", env!("CARGO_MANIFEST_DIR"))
        .assert()
        .failure();
}
