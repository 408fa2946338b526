//! CLI integration tests for the flowrelay command-line interface.
//!
//! These tests cover argument parsing, help output and configuration
//! errors. None of them need a running n8n or Telegram server.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Settings the commands read from the environment.
const SETTINGS_ENV: &[&str] = &[
    "TELEGRAM_BOT_TOKEN",
    "OPWEBUI_URL",
    "OPWEBUI_MODEL",
    "OPWEBUI_API_KEY",
    "N8N_WEBHOOK_URL",
];

/// Get a command for the flowrelay binary, isolated from the host config.
fn flowrelay(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("flowrelay").unwrap();
    cmd.current_dir(config_dir.path())
        .env("FLOWRELAY_CONFIG_DIR", config_dir.path());
    for name in SETTINGS_ENV {
        cmd.env_remove(name);
    }
    cmd
}

/// Config with file logging off, so tests leave no `logs/` behind.
fn write_config(dir: &TempDir, extra: &str) {
    let contents = format!("[logging]\nfile = false\n\n{}", extra);
    std::fs::write(dir.path().join("config.toml"), contents).unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    flowrelay(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bot"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("tools"))
        .stdout(predicate::str::contains("call"))
        .stdout(predicate::str::contains("ask"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    flowrelay(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flowrelay"));
}

#[test]
fn test_verbose_flag_accepted() {
    let dir = TempDir::new().unwrap();
    flowrelay(&dir).args(["--verbose", "--help"]).assert().success();
}

#[test]
fn test_status_help_lists_handshake_flag() {
    let dir = TempDir::new().unwrap();
    flowrelay(&dir)
        .args(["status", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-H, --handshake"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_call_requires_tool_name() {
    let dir = TempDir::new().unwrap();
    flowrelay(&dir)
        .arg("call")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TOOL>"));
}

#[test]
fn test_ask_requires_text() {
    let dir = TempDir::new().unwrap();
    flowrelay(&dir).arg("ask").assert().failure();
}

#[test]
fn test_call_rejects_non_object_args() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "[mcp]\nwebhook_url = \"http://localhost:5678/mcp/abc\"\n");
    flowrelay(&dir)
        .args(["call", "Find_Emails", "--args", "[1, 2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a JSON object"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bot_reports_all_missing_settings() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "");
    flowrelay(&dir)
        .arg("bot")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "TELEGRAM_BOT_TOKEN, OPWEBUI_URL, OPWEBUI_API_KEY, N8N_WEBHOOK_URL",
        ));
}

#[test]
fn test_status_requires_webhook_url() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "");
    flowrelay(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("N8N_WEBHOOK_URL"));
}

#[test]
fn test_env_supplies_webhook_url() {
    let dir = TempDir::new().unwrap();
    // Port 1 on loopback refuses immediately, so the probe finishes fast.
    write_config(
        &dir,
        "[mcp]\ncandidate_hosts = [\"127.0.0.1\"]\nport = 1\nprobe_timeout_secs = 1\n",
    );
    flowrelay(&dir)
        .env("N8N_WEBHOOK_URL", "http://localhost:5678/mcp/abc")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("unreachable"))
        .stdout(predicate::str::contains("/mcp/abc"));
}
