// --json keeps stdout a single JSON document; logs go to stderr.

use std::process::Command;

fn megaverse_sim() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_megaverse-sim"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn parse_stdout(stdout: &[u8]) -> serde_json::Value {
    let text = String::from_utf8_lossy(stdout);
    serde_json::from_str(text.trim())
        .unwrap_or_else(|e| panic!("stdout must be valid JSON.\nParse error: {}\nstdout:\n{}", e, text))
}

#[test]
fn json_single_scenario_parses() {
    let output = megaverse_sim()
        .args(["--json", "--scenario", "fresh_cross", "-n", "5"])
        .output()
        .expect("megaverse-sim --json");

    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let summary = parse_stdout(&output.stdout);
    assert_eq!(summary["total"], 1);
    assert_eq!(summary["failed"], 0);
    assert_eq!(summary["results"][0]["scenario"], "fresh_cross");
    assert_eq!(summary["results"][0]["metrics"]["found"], 5);

    // Progress logging still happens, on stderr.
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Starting scenario"), "stderr: {}", stderr);
}

#[test]
fn json_verbose_all_scenarios_parses() {
    let output = megaverse_sim()
        .args(["--json", "--verbose", "-n", "4", "--interval-ms", "0"])
        .output()
        .expect("megaverse-sim --json --verbose");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let summary = parse_stdout(&output.stdout);
    assert_eq!(summary["total"], 7);
    assert_eq!(summary["results"].as_array().map(Vec::len), Some(7));
}

#[test]
fn zero_size_is_rejected() {
    let output = megaverse_sim()
        .args(["--json", "-n", "0"])
        .output()
        .expect("megaverse-sim -n 0");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
