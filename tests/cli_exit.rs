// tests/cli_exit.rs - Exit code tests for the adversa binary
use std::fs;
use std::process::Command;

fn adversa() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_adversa"));
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_exit_0_mutate_prints_variant() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.c");
    fs::write(&file, "int main() { int x = 1; return x; }").unwrap();

    let out = adversa()
        .args(["mutate", "--language", "c", "--strategy", "dead_code", "--file"])
        .arg(&file)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("return x;"));
}

#[test]
fn test_exit_2_unknown_language() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.rb");
    fs::write(&file, "puts 1").unwrap();

    let out = adversa()
        .args(["mutate", "--language", "ruby", "--strategy", "comment", "--file"])
        .arg(&file)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_exit_3_failed_variant() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.c");
    fs::write(&file, "int main( {").unwrap();

    let out = adversa()
        .args(["mutate", "--language", "c", "--strategy", "comment", "--file"])
        .arg(&file)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Malformed source"));
}

#[test]
fn test_generate_writes_dataset_and_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.jsonl");
    let output = dir.path().join("out.jsonl");
    fs::write(
        &input,
        "{\"code\":\"int main() { return 0; }\",\"label\":0,\"language\":\"c\"}\n",
    )
    .unwrap();

    let out = adversa()
        .current_dir(dir.path())
        .args(["generate", "--variants", "3", "--strategy", "comment", "--json", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["successful_variants"], 3);
    assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 4);
}

#[test]
fn test_generate_bad_strategy_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let out = adversa()
        .current_dir(dir.path())
        .args(["generate", "--strategy", "nope", "--input", "missing.jsonl", "--output", "o.jsonl"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(!dir.path().join("o.jsonl").exists());
}

#[test]
fn test_strategies_lists_aliases() {
    let out = adversa().arg("strategies").output().unwrap();
    assert_eq!(out.status.code(), Some(0));
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("dead_code"));
    assert!(text.contains("rename_variables"));
}

#[test]
fn test_mutate_infers_language_and_honours_reserve() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Main.java");
    fs::write(
        &file,
        "int twice(int limit) {\n    int r = limit * 2;\n    return r;\n}\n",
    )
    .unwrap();

    let out = adversa()
        .args(["mutate", "--strategy", "rename", "--reserve", "limit", "--file"])
        .arg(&file)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));
    let text = String::from_utf8_lossy(&out.stdout);
    assert_eq!(text.matches("limit").count(), 2);
    assert!(text.contains("adv_"));
}

#[test]
fn test_mutate_without_inferable_language_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("snippet.txt");
    fs::write(&file, "int main() { return 0; }").unwrap();

    let out = adversa()
        .args(["mutate", "--strategy", "comment", "--file"])
        .arg(&file)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}
