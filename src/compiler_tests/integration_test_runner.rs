//! Test runner for the AST fixtures under tests/cases.
//!
//! `success/` holds programs that must compile all the way to Jasmin.
//! `failure/` holds programs that some stage of the pipeline must reject.
use crate::build_system::build::{compile_unit, read_unit};
use crate::compiler_frontend::Flag;
use crate::compiler_frontend::compiler_messages::compiler_errors::error_type_to_str;
use crate::compiler_frontend::compiler_messages::compiler_warnings::print_formatted_warning;
use crate::compiler_frontend::compiler_warnings::CompilerWarning;
use crate::compiler_frontend::display_messages::print_formatted_error;
use crate::projects::settings::{AST_FILE_EXTENSION, Config};
use saying::say;
use std::fs;
use std::path::{Path, PathBuf};

const INTEGRATION_TESTS_PATH: &str = "tests/cases";
const SEPARATOR_LINE_LENGTH: usize = 37;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub expected_failures: usize,
    pub unexpected_successes: usize,
}

impl TestSummary {
    pub fn correct(&self) -> usize {
        self.passed + self.expected_failures
    }

    pub fn incorrect(&self) -> usize {
        self.failed + self.unexpected_successes
    }
}

/// Run all test cases from the tests/cases directory
pub fn run_all_test_cases(show_warnings: bool) {
    let timer = std::time::Instant::now();
    let summary = run_test_cases(Path::new(INTEGRATION_TESTS_PATH), show_warnings);

    // Print summary
    println!("\n{}", "=".repeat(SEPARATOR_LINE_LENGTH));
    print!("Test Results Summary. Took: ");
    say!(Green #timer.elapsed());
    say!("  Total tests: ", Yellow summary.total);
    say!("  Successful compilations: ", Blue summary.passed);
    say!("  Failed compilations: ", Blue summary.failed);
    say!("  Expected failures: ", Blue summary.expected_failures);
    say!("  Unexpected successes: ", Blue summary.unexpected_successes);

    println!(
        "\n  Correct results: {} / {}",
        summary.correct(),
        summary.total
    );
    println!(
        "  Incorrect results: {} / {}",
        summary.incorrect(),
        summary.total
    );

    if summary.total == 0 {
        say!(Yellow "\nNo test cases found in ", INTEGRATION_TESTS_PATH);
    } else if summary.incorrect() == 0 {
        say!("\n🎉 All tests behaved as expected!");
    } else {
        let percentage = (summary.correct() as f64 / summary.total as f64) * 100.0;
        say!(Yellow "\n⚠ ", Bright Yellow format!("{:.1}", percentage), " %", Reset " of tests behaved as expected");
    }

    println!("{}", "=".repeat(SEPARATOR_LINE_LENGTH));
}

pub fn run_test_cases(cases_dir: &Path, show_warnings: bool) -> TestSummary {
    println!("Running all Java-- test cases...\n");

    // Flags set for all the integration tests
    let flags = [Flag::DisableTimers, Flag::DisableWarnings];
    let config = Config::default();
    let mut summary = TestSummary::default();

    // Test files that should succeed
    let success_cases = case_files(&cases_dir.join("success"));
    if !success_cases.is_empty() {
        say!(Cyan "Testing files that should succeed:");
        println!("{}", "-".repeat(SEPARATOR_LINE_LENGTH));
    }

    for path in success_cases {
        summary.total += 1;
        println!("  {}", file_name(&path));

        let result = read_unit(&path)
            .map_err(|error| vec![error])
            .and_then(|source| {
                compile_unit(&source, &path, &config, &flags).map_err(|messages| messages.errors)
            });

        match result {
            Ok(output) => {
                say!(Green "✓ PASS");
                print_warnings(output.warnings, show_warnings);
                summary.passed += 1;
            }
            Err(errors) => {
                say!(Red "✗ FAIL");
                summary.failed += 1;
                for error in errors {
                    print_formatted_error(error);
                }
            }
        }

        println!("{}", "-".repeat(SEPARATOR_LINE_LENGTH));
    }

    println!();

    // Test files that should fail
    let failure_cases = case_files(&cases_dir.join("failure"));
    if !failure_cases.is_empty() {
        say!(Cyan "Testing files that should fail:");
        println!("{}", "-".repeat(SEPARATOR_LINE_LENGTH));
    }

    for path in failure_cases {
        summary.total += 1;
        println!("  {}", file_name(&path));

        let source = match read_unit(&path) {
            Ok(source) => source,
            Err(error) => {
                say!(Red "✗ FAIL");
                summary.failed += 1;
                print_formatted_error(error);
                continue;
            }
        };

        match compile_unit(&source, &path, &config, &flags) {
            Ok(output) => {
                say!(Yellow "✗ UNEXPECTED SUCCESS");
                summary.unexpected_successes += 1;
                print_warnings(output.warnings, show_warnings);
            }
            Err(messages) => {
                say!(Green "✓ EXPECTED FAILURE");
                summary.expected_failures += 1;
                for error in messages.errors {
                    say!(Yellow error_type_to_str(&error.error_type), Reset ": ", error.msg);
                }
                print_warnings(messages.warnings, show_warnings);
            }
        }

        println!("{}", "-".repeat(SEPARATOR_LINE_LENGTH));
    }

    summary
}

// Sorted so the output order is stable between runs
fn case_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == AST_FILE_EXTENSION))
        .collect();
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn print_warnings(warnings: Vec<CompilerWarning>, show_warnings: bool) {
    if warnings.is_empty() {
        return;
    }

    say!(Yellow "With ", warnings.len().to_string(), " warnings");
    if show_warnings {
        for warning in warnings {
            print_formatted_warning(warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fixture_behaves_as_expected() {
        let cases_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(INTEGRATION_TESTS_PATH);
        let summary = run_test_cases(&cases_dir, false);

        assert!(summary.total > 0, "no fixtures found in {}", cases_dir.display());
        assert_eq!(summary.incorrect(), 0, "{summary:?}");
    }
}
