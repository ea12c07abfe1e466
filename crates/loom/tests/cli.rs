use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{TempDir, tempdir};

fn write(path: PathBuf, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// An app with one framework: `orm` depends on the disabled `pool`.
fn project() -> (TempDir, PathBuf, PathBuf) {
    let temp = tempdir().unwrap();
    let framework = temp.path().join("framework");
    let app = temp.path().join("app");

    write(
        framework.join("config/plugin.default.json"),
        r#"{"orm": {"dependencies": ["pool"]}, "pool": false, "metrics": {"env": ["prod"]}}"#,
    );
    write(framework.join("modules/orm/package.json"), r#"{"version": "3.0.0", "framework-plugin": {}}"#);
    write(framework.join("modules/orm/service/model.json"), r#"{"owner": "orm"}"#);
    write(framework.join("modules/pool/package.json"), r#"{"framework-plugin": {}}"#);
    write(framework.join("modules/metrics/package.json"), r#"{"framework-plugin": {}}"#);
    write(app.join("service/user.json"), r#"{"owner": "app"}"#);
    write(app.join("service/model.json"), r#"{"owner": "app"}"#);

    (temp, framework, app)
}

fn loom(app: &Path, framework: &Path) -> Command {
    let mut cmd = Command::cargo_bin("loom").unwrap();
    cmd.arg("--base-dir")
        .arg(app)
        .arg("--framework")
        .arg(framework)
        .env_remove("LOOM_ENV")
        .env_remove("LOOM_SCOPE")
        .env_remove("LOOM_PLUGINS");
    cmd
}

#[test]
fn test_ping_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("loom")?;
    cmd.arg("--ping");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pong"));
    Ok(())
}

#[test]
fn test_no_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("loom")?;
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("no command given"))
        .stdout(predicate::str::contains("pong").not());
    Ok(())
}

#[test]
fn test_plugins_in_activation_order() {
    let (_temp, framework, app) = project();
    loom(&app, &framework)
        .arg("plugins")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)^pool\t-\t.*\t\(implicit\)\norm\t3\.0\.0\t").unwrap())
        .stdout(predicate::str::contains("metrics").not());
}

#[test]
fn test_plugins_all_and_env() {
    let (_temp, framework, app) = project();
    loom(&app, &framework)
        .args(["plugins", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("metrics\tdisabled"))
        .stdout(predicate::str::contains("pool\tenabled"));

    loom(&app, &framework)
        .args(["plugins", "--env", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("metrics"));
}

#[test]
fn test_plugins_env_override_variable() {
    let (_temp, framework, app) = project();
    loom(&app, &framework)
        .env("LOOM_PLUGINS", r#"{"orm": false}"#)
        .arg("plugins")
        .assert()
        .success()
        .stdout(predicate::str::contains("No plugins enabled."));
}

#[test]
fn test_units_json() {
    let (_temp, framework, app) = project();
    loom(&app, &framework)
        .args(["units", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type": "plugin""#))
        .stdout(predicate::str::contains(r#""type": "application""#));
}

#[test]
fn test_tree_application_wins() {
    let (_temp, framework, app) = project();
    loom(&app, &framework)
        .args(["tree", "service"])
        .assert()
        .success()
        .stdout(predicate::str::contains("model\t{\"owner\":\"app\"}"))
        .stdout(predicate::str::contains("user\t"));
}

#[test]
fn test_select_units() {
    let (_temp, framework, app) = project();
    loom(&app, &framework)
        .args(["select", "service", "user", "model"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("user\t"));

    loom(&app, &framework)
        .args(["select", "service", "user", "cache"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unit cache not found"));
}

#[test]
fn test_sequencing_failure_exits_non_zero() {
    let (_temp, framework, app) = project();
    write(app.join("config/plugin.default.json"), r#"{"orm": {"dependencies": ["metrics"]}}"#);
    loom(&app, &framework)
        .arg("plugins")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing: [metrics]"))
        .stderr(predicate::str::contains("required by [orm]"));
}

#[test]
fn test_unknown_plugin_directory() {
    let (_temp, framework, app) = project();
    write(app.join("config/plugin.default.json"), r#"{"ghost": true}"#);
    loom(&app, &framework)
        .arg("units")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Can not find plugin ghost"));
}
