use locale_link_cli::{ConfigFormat, load_user_config};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn locale_link_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("locale-link"));
    cmd.env_remove("APP_ENV").env_remove("NODE_ENV");
    cmd
}

fn write_project(root: &Path) -> std::path::PathBuf {
    let en_dir = root.join("static/locales/en");
    fs::create_dir_all(&en_dir).unwrap();
    fs::write(en_dir.join("common.json"), "{}").unwrap();
    fs::write(en_dir.join("footer.json"), "{}").unwrap();

    let config = root.join("i18n.json");
    fs::write(
        &config,
        r#"{ "defaultLanguage": "en", "otherLanguages": ["de"], "localeSubpaths": "foreign" }"#,
    )
    .unwrap();
    config
}

#[test]
fn test_config_format_from_path() {
    assert_eq!(ConfigFormat::from_path(Path::new("a.json")), Ok(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), Ok(ConfigFormat::Yaml));
    assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")), Ok(ConfigFormat::Toml));
    assert!(ConfigFormat::from_path(Path::new("a.ini")).is_err());
    assert!(ConfigFormat::from_path(Path::new("noext")).is_err());
}

#[test]
fn test_load_yaml_and_toml_configs() {
    let temp_dir = TempDir::new().unwrap();

    let yaml = temp_dir.path().join("i18n.yaml");
    fs::write(&yaml, "defaultLanguage: de\notherLanguages: [en]\nlocaleSubpaths: all\n").unwrap();
    let user = load_user_config(&yaml, None).unwrap();
    assert_eq!(user.get("defaultLanguage"), Some(&serde_json::json!("de")));

    let toml = temp_dir.path().join("i18n.toml");
    fs::write(&toml, "defaultLanguage = \"fr\"\nlocaleSubpaths = \"none\"\n").unwrap();
    let user = load_user_config(&toml, None).unwrap();
    assert_eq!(user.get("localeSubpaths"), Some(&serde_json::json!("none")));
}

#[test]
fn test_load_rejects_non_object_config() {
    let temp_dir = TempDir::new().unwrap();
    let json = temp_dir.path().join("i18n.json");
    fs::write(&json, "[1, 2]").unwrap();
    assert!(load_user_config(&json, None).is_err());
}

#[test]
fn test_resolve_command_prints_effective_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_project(temp_dir.path());

    let output = locale_link_cmd()
        .args(["resolve", "-c", config.to_str().unwrap(), "--root"])
        .arg(temp_dir.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["allLanguages"], serde_json::json!(["de", "en"]));
    assert_eq!(v["ns"], serde_json::json!(["common", "footer"]));
    assert_eq!(v["fallbackLng"], serde_json::json!(false));
}

#[test]
fn test_resolve_command_production_flag() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_project(temp_dir.path());

    let output = locale_link_cmd()
        .args(["resolve", "-c", config.to_str().unwrap(), "--client", "--production"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["fallbackLng"], serde_json::json!("en"));
    assert!(v.get("backend").is_none());
}

#[test]
fn test_resolve_command_rejects_boolean_locale_subpaths() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("i18n.json");
    fs::write(&config, r#"{ "localeSubpaths": true }"#).unwrap();

    let output = locale_link_cmd()
        .args(["resolve", "-c", config.to_str().unwrap(), "--client"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\"foreign\""), "stderr: {}", stderr);
}

#[test]
fn test_rewrite_command() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_project(temp_dir.path());

    let output = locale_link_cmd()
        .args([
            "rewrite",
            "-c",
            config.to_str().unwrap(),
            "--client",
            "--href",
            "/foo/bar?baz",
            "--lng",
            "de",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        v["href"],
        serde_json::json!({ "pathname": "/foo/bar", "query": { "baz": "", "lng": "de" } })
    );
    assert_eq!(v["as"], serde_json::json!("/de/foo/bar?baz"));
}

#[test]
fn test_rewrite_command_structured_query() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_project(temp_dir.path());

    let output = locale_link_cmd()
        .args([
            "rewrite",
            "-c",
            config.to_str().unwrap(),
            "--client",
            "--href",
            "/foo/bar",
            "-q",
            "baz",
            "--lng",
            "de",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["as"], serde_json::json!("/de/foo/bar?baz="));
}

#[test]
fn test_paths_command() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_project(temp_dir.path());

    let output = locale_link_cmd()
        .args(["paths", "-c", config.to_str().unwrap(), "-l", "de", "-n", "footer", "--root"])
        .arg(temp_dir.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let load_path = v["loadPath"].as_str().unwrap();
    let add_path = v["addPath"].as_str().unwrap();
    assert!(load_path.ends_with("static/locales/de/footer.json"));
    assert!(add_path.ends_with("static/locales/de/footer.missing.json"));
}
