//! Command-line entrypoints for jmmc.
//!
//! Parses the command and flags, then hands off to the build system or the test runner.
//! Input files are the external parser's JSON syntax trees, or IR text for `jasmin`.

use crate::build_system::build::{BuildOutput, compile_ir, compile_units, read_unit};
use crate::build_system::output::write_build_output;
use crate::compiler_frontend::compiler_errors::CompilerMessages;
use crate::compiler_frontend::display_messages::{messages_to_json, print_compiler_messages};
use crate::compiler_frontend::{CompilerFrontend, Flag};
use crate::compiler_tests::integration_test_runner::run_all_test_cases;
use crate::projects::settings::Config;
use saying::say;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    // Full pipeline for each AST file, writing <Class>.j
    Build {
        paths: Vec<String>,
        output_dir: Option<String>,
    },

    Check(String),  // Symbol table and semantic checks only
    Ir(String),     // Prints the IR for an AST file
    Jasmin(String), // Assembles an IR file

    Help,
    CompilerTests, // Runs the fixtures under tests/cases
}

pub fn start_cli() {
    let compiler_args: Vec<String> = env::args().collect();

    if compiler_args.len() < 2 {
        print_help(false);
        return;
    }

    let command = match get_command(&compiler_args[1..]) {
        Ok(command) => command,
        Err(e) => {
            say!(Red e);
            print_help(true);
            return;
        }
    };

    // Gather a list of any additional flags
    let flags = get_flags(&compiler_args);

    match command {
        Command::Help => print_help(false),

        Command::Build { paths, output_dir } => {
            let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
            let Some(mut config) = load_config(paths.first().map(PathBuf::as_path), &flags) else {
                return;
            };
            if let Some(output_dir) = output_dir {
                config.output_dir = PathBuf::from(output_dir);
            }
            build_files(&paths, &config, &flags);
        }

        Command::Check(path) => {
            let path = PathBuf::from(path);
            let Some(config) = load_config(Some(&path), &flags) else {
                return;
            };
            check_file(&path, &config, &flags);
        }

        Command::Ir(path) => {
            let path = PathBuf::from(path);
            let Some(config) = load_config(Some(&path), &flags) else {
                return;
            };
            match compile_units(std::slice::from_ref(&path), &config, &flags).pop() {
                Some(Ok(output)) => {
                    report(warnings_only(&output), &config, &flags);
                    print!("{}", output.ir);
                }
                Some(Err(messages)) => report(messages, &config, &flags),
                None => {}
            }
        }

        Command::Jasmin(path) => {
            let path = PathBuf::from(path);
            let Some(config) = load_config(Some(&path), &flags) else {
                return;
            };
            let result = read_unit(&path)
                .map_err(CompilerMessages::from_error)
                .and_then(|ir| compile_ir(&ir, &path, &config, &flags));

            match result {
                Ok(output) => print!("{}", output.jasmin),
                Err(messages) => report(messages, &config, &flags),
            }
        }

        Command::CompilerTests => {
            run_all_test_cases(!flags.contains(&Flag::DisableWarnings));
        }
    }
}

fn get_command(args: &[String]) -> Result<Command, String> {
    let command = args.first().map(String::as_str);
    let rest = args.get(1..).unwrap_or_default();

    match command {
        Some("help") => Ok(Command::Help),

        Some("build") => {
            let mut paths = Vec::new();
            let mut output_dir = None;
            let mut index = 0;

            while let Some(arg) = rest.get(index) {
                match arg.as_str() {
                    "--out" => {
                        let Some(dir) = rest.get(index + 1).filter(|dir| !dir.starts_with('-'))
                        else {
                            return Err(String::from("Missing value for --out"));
                        };
                        output_dir = Some(dir.to_owned());
                        index += 2;
                    }
                    _ if arg.starts_with('-') => index += 1,
                    _ => {
                        paths.push(arg.to_owned());
                        index += 1;
                    }
                }
            }

            if paths.is_empty() {
                return Err(String::from("'build' needs at least one AST file"));
            }

            Ok(Command::Build { paths, output_dir })
        }

        Some("check") => single_path(rest, "check").map(Command::Check),
        Some("ir") => single_path(rest, "ir").map(Command::Ir),
        Some("jasmin") => single_path(rest, "jasmin").map(Command::Jasmin),

        Some("tests") => Ok(Command::CompilerTests),

        Some(other) => Err(format!("Invalid command: '{other}'")),
        None => Err(String::from("No command given")),
    }
}

fn single_path(args: &[String], command: &str) -> Result<String, String> {
    let mut paths = args.iter().filter(|arg| !arg.starts_with('-'));

    match (paths.next(), paths.next()) {
        (Some(path), None) => Ok(path.to_owned()),
        (None, _) => Err(format!("'{command}' needs a file path")),
        (Some(_), Some(_)) => Err(format!("'{command}' accepts exactly one file path")),
    }
}

fn get_flags(args: &[String]) -> Vec<Flag> {
    let mut flags = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--optimize" | "-o" => flags.push(Flag::Optimize),
            "--emit-ir" => flags.push(Flag::EmitIr),
            "--hide-warnings" => flags.push(Flag::DisableWarnings),
            "--hide-timers" => flags.push(Flag::DisableTimers),
            "--json-diagnostics" => flags.push(Flag::JsonDiagnostics),
            _ => {}
        }
    }

    flags
}

/// Config comes from `jmm.toml` next to the first input. Flags override it.
fn load_config(first_input: Option<&Path>, flags: &[Flag]) -> Option<Config> {
    let dir = first_input
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new(""));
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };

    match Config::load_from_dir(dir) {
        Ok(mut config) => {
            if flags.contains(&Flag::DisableWarnings) {
                config.show_warnings = false;
            }
            Some(config)
        }
        Err(error) => {
            report(
                CompilerMessages::from_error(error),
                &Config::default(),
                flags,
            );
            None
        }
    }
}

fn build_files(paths: &[PathBuf], config: &Config, flags: &[Flag]) {
    let time = Instant::now();
    let compiler = CompilerFrontend::new(config, flags);
    let mut built = 0;

    for result in compile_units(paths, config, flags) {
        let output = match result {
            Ok(output) => output,
            Err(messages) => {
                report(messages, config, flags);
                continue;
            }
        };

        let output_dir = config.output_dir_for(&output.source_path);
        match write_build_output(&output, &output_dir, compiler.should_emit_ir()) {
            Ok(written) => {
                report(warnings_only(&output), config, flags);
                for path in written {
                    say!(Green "Wrote ", Bright {path.to_string_lossy()});
                }
                built += 1;
            }
            Err(error) => report(CompilerMessages::from_error(error), config, flags),
        }
    }

    if !flags.contains(&Flag::DisableTimers) {
        say!("\nBuilt ", Yellow built, Reset " of ", {paths.len()}, " units in ", Green #time.elapsed());
    }
}

fn check_file(path: &Path, config: &Config, flags: &[Flag]) {
    let compiler = CompilerFrontend::new(config, flags);

    let source = match read_unit(path) {
        Ok(source) => source,
        Err(error) => {
            report(CompilerMessages::from_error(error), config, flags);
            return;
        }
    };

    let result = compiler
        .json_to_ast(&source, path)
        .and_then(|ast| compiler.analyse(&ast).map(|(_, messages)| messages));

    match result {
        Ok(messages) => {
            let warning_count = messages.warnings.len();
            report(messages, config, flags);
            say!(Green "No errors", Reset " (", Yellow warning_count, Reset " warnings)");
        }
        Err(messages) => report(messages, config, flags),
    }
}

fn warnings_only(output: &BuildOutput) -> CompilerMessages {
    CompilerMessages {
        errors: Vec::new(),
        warnings: output.warnings.to_owned(),
    }
}

fn report(messages: CompilerMessages, config: &Config, flags: &[Flag]) {
    if flags.contains(&Flag::JsonDiagnostics) {
        let json = messages_to_json(&messages);
        match serde_json::to_string_pretty(&json) {
            Ok(text) => println!("{text}"),
            Err(e) => say!(Red "Could not serialise diagnostics: ", e.to_string()),
        }
        return;
    }

    print_compiler_messages(messages, config.show_warnings);
}

fn print_help(commands_only: bool) {
    if !commands_only {
        say!(Bright Black "------------------------------------");
        say!(Green Bold "jmmc, the Java-- compiler back end");
        say!("Usage: ", Bold "<command>", Italic " <args>");
    }
    say!(Green Bold "\nCommands:");
    say!("  build <ast.json>...   - Compiles each AST to Jasmin (<Class>.j)");
    say!("  check <ast.json>      - Runs the symbol table and semantic checks only");
    say!("  ir <ast.json>         - Prints the generated IR");
    say!("  jasmin <file.ollir>   - Assembles IR text into Jasmin");
    say!("  tests                 - Runs the fixture test suite");
    say!("  help                  - Shows this message");

    say!(Green Bold "\nFlags:");
    say!("  --optimize, -o        - Removes redundant store/load pairs");
    say!("  --emit-ir             - Also writes <Class>.ollir");
    say!("  --out <dir>           - Output directory for build");
    say!("  --hide-warnings");
    say!("  --hide-timers");
    say!("  --json-diagnostics    - Prints diagnostics as JSON");
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
