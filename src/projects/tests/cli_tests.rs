//! Tests for CLI command and flag parsing.

use super::{Command, get_command, get_flags, load_config};
use crate::compiler_frontend::Flag;
use crate::projects::settings::CONFIG_FILE_NAME;
use std::fs;
use tempfile::TempDir;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn build_collects_every_path() {
    let command = get_command(&args(&["build", "A.json", "B.json", "--optimize"]))
        .expect("command should parse");

    assert_eq!(
        command,
        Command::Build {
            paths: vec![String::from("A.json"), String::from("B.json")],
            output_dir: None,
        }
    );
}

#[test]
fn build_reads_the_output_directory() {
    let command = get_command(&args(&["build", "--out", "classes", "Fac.json"]))
        .expect("command should parse");

    assert_eq!(
        command,
        Command::Build {
            paths: vec![String::from("Fac.json")],
            output_dir: Some(String::from("classes")),
        }
    );
}

#[test]
fn build_rejects_a_missing_output_directory() {
    let error = get_command(&args(&["build", "Fac.json", "--out"]))
        .expect_err("--out without a value should fail");
    assert!(error.contains("--out"));
}

#[test]
fn build_needs_a_path() {
    assert!(get_command(&args(&["build", "--emit-ir"])).is_err());
}

#[test]
fn single_file_commands_take_exactly_one_path() {
    assert_eq!(
        get_command(&args(&["check", "Fac.json", "--hide-warnings"])),
        Ok(Command::Check(String::from("Fac.json")))
    );
    assert_eq!(
        get_command(&args(&["ir", "Fac.json"])),
        Ok(Command::Ir(String::from("Fac.json")))
    );
    assert_eq!(
        get_command(&args(&["jasmin", "Fac.ollir"])),
        Ok(Command::Jasmin(String::from("Fac.ollir")))
    );

    assert!(get_command(&args(&["check"])).is_err());
    assert!(get_command(&args(&["ir", "A.json", "B.json"])).is_err());
}

#[test]
fn unknown_commands_are_rejected() {
    let error = get_command(&args(&["run", "Fac.json"])).expect_err("run is not a command");
    assert_eq!(error, "Invalid command: 'run'");
}

#[test]
fn flags_are_read_from_anywhere_in_the_arguments() {
    let flags = get_flags(&args(&[
        "jmmc",
        "build",
        "-o",
        "Fac.json",
        "--emit-ir",
        "--hide-timers",
        "--json-diagnostics",
        "--hide-warnings",
    ]));

    assert_eq!(
        flags,
        vec![
            Flag::Optimize,
            Flag::EmitIr,
            Flag::DisableTimers,
            Flag::JsonDiagnostics,
            Flag::DisableWarnings,
        ]
    );
}

#[test]
fn config_comes_from_the_first_inputs_directory() {
    let dir = TempDir::new().expect("temp dir should be created");
    fs::write(dir.path().join(CONFIG_FILE_NAME), "emit_ir = true\n")
        .expect("config should be written");

    let config = load_config(Some(&dir.path().join("Fac.json")), &[Flag::DisableWarnings])
        .expect("config should load");

    assert!(config.emit_ir);
    assert!(!config.show_warnings);
}
