use crate::compiler_frontend::compiler_messages::compiler_errors::{
    CompilerError, CompilerMessages, ErrorType, error_type_to_str, stage_to_str,
};
use crate::compiler_frontend::compiler_messages::compiler_warnings::{
    print_formatted_warning, warning_kind_to_str,
};
use saying::say;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::{env, fs};

fn normalize_display_path(path: &Path) -> PathBuf {
    let path_string = path.to_string_lossy();
    if let Some(stripped) = path_string.strip_prefix(r"\\?\") {
        return PathBuf::from(stripped);
    }

    path.to_path_buf()
}

fn relative_display_path(scope: &Path) -> String {
    let normalized_scope = normalize_display_path(scope);

    match env::current_dir() {
        Ok(dir) => {
            let normalized_dir = normalize_display_path(&dir);
            normalized_scope
                .strip_prefix(&normalized_dir)
                .unwrap_or(&normalized_scope)
                .to_string_lossy()
                .to_string()
        }
        Err(_) => normalized_scope.to_string_lossy().to_string(),
    }
}

pub fn print_compiler_messages(messages: CompilerMessages, show_warnings: bool) {
    // Format and print out the messages:
    for err in messages.errors {
        print_formatted_error(err);
    }

    if !show_warnings {
        return;
    }

    for warning in messages.warnings {
        print_formatted_warning(warning);
    }
}

pub fn print_formatted_error(e: CompilerError) {
    let relative_dir = relative_display_path(&e.location.scope);

    // Parser lines are 1-based
    let line_number = e.location.start_pos.line_number.max(0) as usize;

    // The scope is the original .jmm file when the AST named one.
    // A missing or unreadable file just means no snippet.
    let line = match fs::read_to_string(normalize_display_path(&e.location.scope)) {
        Ok(file) if line_number > 0 => file
            .lines()
            .nth(line_number - 1)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    };

    match e.error_type {
        ErrorType::Syntax => {
            if !relative_dir.is_empty() {
                say!("\n(╯°□°)╯  🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥  Σ(°△°;) ");
            }

            say!(Red "Malformed AST");
            say!(Dark Magenta "Line ", Bright line_number);
        }

        ErrorType::Declaration => {
            if !relative_dir.is_empty() {
                say!("\n(ಠ_ಠ) ", Dark Magenta relative_dir);
            }

            say!(Red "Declared twice");
            say!(Dark Magenta "Line ", Bright line_number);
        }

        ErrorType::Resolution => {
            if !relative_dir.is_empty() {
                say!("\n(・_・ヾ ", Dark Magenta relative_dir);
            }

            say!(Red "Can't resolve");
            say!(Dark Magenta "Line ", Bright line_number);
        }

        ErrorType::Type => {
            if !relative_dir.is_empty() {
                say!("\n(ಠ_ಠ) ", Dark Magenta relative_dir);
                say!(Inline " ( ._. ) ");
            }

            say!(Red "Type Error");
            say!(Dark Magenta "Line ", Bright line_number);
        }

        ErrorType::Rule => {
            if !relative_dir.is_empty() {
                say!("\nヽ(˶°o°)ﾉ  🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥  ╰(°□°╰) ");
            }

            say!(Red "Rule");
            say!(Dark Magenta "Line ", Bright line_number);
        }

        ErrorType::File => {
            say!(Yellow "🏚 Can't find/read file or directory: ", relative_dir);
            say!(e.msg);
            return;
        }

        ErrorType::Config => {
            if !relative_dir.is_empty() {
                say!("\n (-_-)  🔥🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥🔥  <(^~^)/ ");
            }
            say!(Yellow "CONFIG FILE ISSUE- ");
            say!(Dark Yellow "Malformed jmm.toml, something doesn't make sense inside it");
            say!(e.msg);
            return;
        }

        ErrorType::Compiler => {
            if !relative_dir.is_empty() {
                say!("\nヽ༼☉ ‿ ⚆༽ﾉ  🔥🔥🔥🔥 ", Dark Magenta relative_dir, " 🔥🔥🔥🔥  ╰(° _ o╰) ");
            }
            say!(Yellow "COMPILER BUG (", stage_to_str(&e.stage), ") - ");
            say!(Dark Yellow "compiler developer skill issue (not your fault)");
        }
    }

    say!(Red e.msg);

    if line.is_empty() {
        return;
    }

    println!("\n{line}");

    // spaces before the relevant part of the line
    print!(
        "{}",
        " ".repeat((e.location.start_pos.char_column - 1).max(0) as usize)
    );

    let length_of_underline =
        (e.location.end_pos.char_column - e.location.start_pos.char_column + 1).max(1) as usize;
    say!(Red { "^".repeat(length_of_underline) });
}

/// Machine-readable diagnostics: `[{severity, stage, kind, line, column, message}]`
pub fn messages_to_json(messages: &CompilerMessages) -> Value {
    let mut entries = Vec::with_capacity(messages.errors.len() + messages.warnings.len());

    for error in &messages.errors {
        entries.push(json!({
            "severity": "ERROR",
            "stage": stage_to_str(&error.stage),
            "kind": error_type_to_str(&error.error_type),
            "line": error.location.start_pos.line_number,
            "column": error.location.start_pos.char_column,
            "message": error.msg,
        }));
    }

    for warning in &messages.warnings {
        entries.push(json!({
            "severity": "WARNING",
            "stage": "semantic",
            "kind": warning_kind_to_str(&warning.warning_kind),
            "line": warning.location.start_pos.line_number,
            "column": warning.location.start_pos.char_column,
            "message": warning.msg,
        }));
    }

    Value::Array(entries)
}
