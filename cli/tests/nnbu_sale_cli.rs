//! Runs the nnbu-sale binary against the sample deployment

use std::path::PathBuf;
use std::process::{Command, Output};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../demos")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nnbu-sale"))
        .arg("--config")
        .arg(demo("sale.toml"))
        .args(args)
        .output()
        .expect("failed to run nnbu-sale")
}

/// Output with terminal color codes removed
fn stdout(output: &Output) -> String {
    let raw = String::from_utf8_lossy(&output.stdout);
    let mut plain = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            plain.push(c);
        }
    }
    plain
}

#[test]
fn test_schedule_command() {
    let output = run(&["schedule"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("52500000"));
    assert!(text.contains("+60% bonus"));
}

#[test]
fn test_quote_in_presale() {
    let output = run(&["quote", "--at", "1700086400", "--value", "1000000000000000000"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("PreSale"));
    assert!(text.contains("80 BABY"));
}

#[test]
fn test_quote_after_end() {
    let output = run(&["quote", "--at", "1800000000", "--value", "1000000000000000000"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("not accepting purchases"));
}

#[test]
fn test_simulate_lifecycle() {
    let scenario = demo("lifecycle.json");
    let output = run(&["simulate", scenario.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    assert!(text.contains("\"event\":\"Finalized\""));
    assert!(text.contains("Minting closed:  true"));
}

#[test]
fn test_missing_config_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_nnbu-sale"))
        .arg("--config")
        .arg(demo("missing.toml"))
        .arg("schedule")
        .output()
        .expect("failed to run nnbu-sale");
    assert!(!output.status.success());
}
