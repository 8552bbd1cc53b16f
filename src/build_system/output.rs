use crate::build_system::build::BuildOutput;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::projects::settings::{IR_FILE_EXTENSION, JASMIN_FILE_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `<Class>.j`, and `<Class>.ollir` when `emit_ir` is set.
/// Returns the paths that were written.
pub fn write_build_output(
    output: &BuildOutput,
    output_dir: &Path,
    emit_ir: bool,
) -> Result<Vec<PathBuf>, CompilerError> {
    if !output_dir.as_os_str().is_empty() {
        fs::create_dir_all(output_dir).map_err(|e| {
            CompilerError::file_error(
                output_dir,
                format!("Could not create the output directory: {e}"),
            )
        })?;
    }

    let mut written = Vec::with_capacity(2);

    let jasmin_path = output_dir
        .join(&output.class_name)
        .with_extension(JASMIN_FILE_EXTENSION);
    write_file(&jasmin_path, &output.jasmin)?;
    written.push(jasmin_path);

    if emit_ir {
        let ir_path = output_dir
            .join(&output.class_name)
            .with_extension(IR_FILE_EXTENSION);
        write_file(&ir_path, &output.ir)?;
        written.push(ir_path);
    }

    Ok(written)
}

fn write_file(path: &Path, contents: &str) -> Result<(), CompilerError> {
    fs::write(path, contents)
        .map_err(|e| CompilerError::file_error(path, format!("Could not write the file: {e}")))
}
