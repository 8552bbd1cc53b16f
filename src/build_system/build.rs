use crate::compiler_frontend::compiler_errors::{CompilerError, CompilerMessages};
use crate::compiler_frontend::compiler_warnings::CompilerWarning;
use crate::compiler_frontend::{CompilerFrontend, Flag};
use crate::projects::settings::Config;
use crate::timer_log;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything one compilation unit produced
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub source_path: PathBuf,
    pub class_name: String,
    pub ir: String,
    pub jasmin: String,
    pub warnings: Vec<CompilerWarning>,
}

/// Runs the whole pipeline for one AST.
///
/// Stops before IR generation if the symbol table builder or the checker reported an error.
/// Every diagnostic from those two stages is returned together.
/// Later stages fail on their first error.
pub fn compile_unit(
    source_json: &str,
    path: &Path,
    config: &Config,
    flags: &[Flag],
) -> Result<BuildOutput, CompilerMessages> {
    let compiler = CompilerFrontend::new(config, flags);

    // ----------------------------------
    //          AST input
    // ----------------------------------
    let time = Instant::now();
    let ast = compiler.json_to_ast(source_json, path)?;
    timer_log!(time, "AST lowered in: ");

    // ----------------------------------
    //    Symbol table and semantics
    // ----------------------------------
    let time = Instant::now();
    let (table, messages) = compiler.analyse(&ast)?;
    timer_log!(time, "Checked in: ");

    let with_warnings = |error: CompilerError| CompilerMessages {
        errors: vec![error.with_file_path(path.to_path_buf())],
        warnings: messages.warnings.to_owned(),
    };

    // ----------------------------------
    //          IR generation
    // ----------------------------------
    let time = Instant::now();
    let ir = compiler.generate_ir(&ast, &table).map_err(with_warnings)?;
    timer_log!(time, "IR generated in: ");

    // ----------------------------------
    //      Jasmin from the IR text
    // ----------------------------------
    let time = Instant::now();
    let class = compiler.parse_ir(&ir).map_err(with_warnings)?;
    let module = compiler
        .lower_to_jasmin(&class, Some(&table))
        .map_err(with_warnings)?;
    let module = compiler.optimize(module);
    timer_log!(time, "Jasmin emitted in: ");

    Ok(BuildOutput {
        source_path: path.to_path_buf(),
        class_name: module.class_name,
        ir,
        jasmin: module.source,
        warnings: messages.warnings,
    })
}

/// Assembles hand-written IR text. There is no source program, so no symbol table.
pub fn compile_ir(
    ir: &str,
    path: &Path,
    config: &Config,
    flags: &[Flag],
) -> Result<BuildOutput, CompilerMessages> {
    let compiler = CompilerFrontend::new(config, flags);
    let tag = |error: CompilerError| {
        CompilerMessages::from_error(error.with_file_path(path.to_path_buf()))
    };

    let class = compiler.parse_ir(ir).map_err(tag)?;
    let module = compiler.lower_to_jasmin(&class, None).map_err(tag)?;
    let module = compiler.optimize(module);

    Ok(BuildOutput {
        source_path: path.to_path_buf(),
        class_name: module.class_name,
        ir: ir.to_owned(),
        jasmin: module.source,
        warnings: Vec::new(),
    })
}

/// Compiles independent units in parallel.
/// Each unit gets its own table and generator state, so nothing is shared between them.
/// Results come back in the order of `paths`.
pub fn compile_units(
    paths: &[PathBuf],
    config: &Config,
    flags: &[Flag],
) -> Vec<Result<BuildOutput, CompilerMessages>> {
    paths
        .par_iter()
        .map(|path| {
            let source = read_unit(path).map_err(CompilerMessages::from_error)?;
            compile_unit(&source, path, config, flags)
        })
        .collect()
}

pub fn read_unit(path: &Path) -> Result<String, CompilerError> {
    fs::read_to_string(path)
        .map_err(|e| CompilerError::file_error(path, format!("Could not read the file: {e}")))
}

#[cfg(test)]
#[path = "tests/build_tests.rs"]
mod tests;
