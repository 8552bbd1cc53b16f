pub mod ast;

pub mod compiler_messages {
    pub mod compiler_dev_logging;
    pub mod compiler_errors;
    pub mod compiler_warnings;
    pub mod display_messages;
}
pub use compiler_messages::compiler_errors;
pub use compiler_messages::compiler_warnings;
pub use compiler_messages::display_messages;

pub mod datatypes;
pub mod symbol_table;
pub mod analysis;
pub mod ir;

use crate::backends::jasmin::peephole::remove_redundant_store_loads;
use crate::backends::jasmin::{JasminModule, lower_ir_to_jasmin};
use crate::compiler_frontend::analysis::semantic_checker::check_semantics;
use crate::compiler_frontend::ast::ast::Ast;
use crate::compiler_frontend::ast::syntax_tree::parse_syntax_tree;
use crate::compiler_frontend::compiler_errors::{CompilerError, CompilerMessages};
use crate::compiler_frontend::ir::ir_builder::generate_ir;
use crate::compiler_frontend::ir::ir_display::ir_to_text;
use crate::compiler_frontend::ir::ir_nodes::IrClass;
use crate::compiler_frontend::ir::ir_parser::parse_ir;
use crate::compiler_frontend::symbol_table::SymbolTable;
use crate::compiler_frontend::symbol_table::symbol_table_builder::build_symbol_table;
use crate::projects::settings::Config;
use crate::{ast_log, ir_log, peephole_log, symbol_table_log};
use std::path::Path;

/// Flags change the behavior of the core pipeline for a single build.
/// For the built-in CLI these are added as cli flags.
/// Persistent settings live in the config instead.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Flag {
    DisableWarnings,
    DisableTimers,
    Optimize,
    EmitIr,
    JsonDiagnostics,
}

pub struct CompilerFrontend<'a> {
    pub(crate) config: &'a Config,
    pub(crate) flags: &'a [Flag],
}

impl<'a> CompilerFrontend<'a> {
    pub fn new(config: &'a Config, flags: &'a [Flag]) -> Self {
        Self { config, flags }
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn should_optimize(&self) -> bool {
        self.config.optimize || self.has_flag(Flag::Optimize)
    }

    pub fn should_emit_ir(&self) -> bool {
        self.config.emit_ir || self.has_flag(Flag::EmitIr)
    }

    /// -----------------------------
    /// AST INPUT
    /// -----------------------------
    /// Reads the parser's JSON tree into the arena.
    /// Every malformed node is reported, not just the first.
    pub fn json_to_ast(&self, json: &str, path: &Path) -> Result<Ast, CompilerMessages> {
        let syntax_tree = parse_syntax_tree(json, path).map_err(CompilerMessages::from_error)?;

        match Ast::from_syntax_tree(&syntax_tree) {
            Ok(ast) => {
                ast_log!("AST has ", {ast.len()}, " nodes");
                Ok(ast)
            }
            Err(errors) => Err(CompilerMessages {
                errors,
                warnings: Vec::new(),
            }
            .with_file_path(path)),
        }
    }

    /// -----------------------------
    /// SYMBOL TABLE
    /// -----------------------------
    /// Collects every declaration in the class.
    /// Conflicts are recorded and the first declaration is kept.
    pub fn build_symbol_table(&self, ast: &Ast) -> (SymbolTable, CompilerMessages) {
        let (table, errors) = build_symbol_table(ast);
        symbol_table_log!(Cyan "Symbol table for ", Bright {table.class_name.as_str()}, Reset ": ", {table.fields().len()}, " fields, ", {table.methods().len()}, " methods");

        (
            table,
            CompilerMessages {
                errors,
                warnings: Vec::new(),
            },
        )
    }

    /// -----------------------------
    /// SEMANTIC ANALYSIS
    /// -----------------------------
    /// Runs the symbol table builder and the checker, and reports everything both found.
    /// Nothing is generated from a unit with errors in it,
    /// or with warnings when they are treated as errors.
    pub fn analyse(&self, ast: &Ast) -> Result<(SymbolTable, CompilerMessages), CompilerMessages> {
        let (table, mut messages) = self.build_symbol_table(ast);
        messages.extend(check_semantics(ast, &table));

        // Diagnostics point at the original source when the parser named it
        if !ast.source_path.as_os_str().is_empty() {
            messages = messages.with_file_path(&ast.source_path);
        }

        let blocked_by_warnings = self.config.warnings_as_errors && !messages.warnings.is_empty();
        if messages.has_errors() || blocked_by_warnings {
            return Err(messages);
        }

        Ok((table, messages))
    }

    /// -----------------------------
    /// IR GENERATION
    /// -----------------------------
    /// Assumes a checked AST. Returns the IR text, which is the stage's real output.
    pub fn generate_ir(&self, ast: &Ast, table: &SymbolTable) -> Result<String, CompilerError> {
        let class = generate_ir(ast, table)?;
        let text = ir_to_text(&class);
        ir_log!(Dark {text.as_str()});
        Ok(text)
    }

    /// -----------------------------
    /// IR PARSING
    /// -----------------------------
    pub fn parse_ir(&self, text: &str) -> Result<IrClass, CompilerError> {
        parse_ir(text)
    }

    /// -----------------------------
    /// CODEGEN
    /// -----------------------------
    /// `table` is absent when assembling hand-written IR.
    pub fn lower_to_jasmin(
        &self,
        ir: &IrClass,
        table: Option<&SymbolTable>,
    ) -> Result<JasminModule, CompilerError> {
        lower_ir_to_jasmin(ir, table)
    }

    /// -----------------------------
    /// OPTIMIZATION
    /// -----------------------------
    /// Only runs when enabled by the config or a flag.
    pub fn optimize(&self, mut module: JasminModule) -> JasminModule {
        if !self.should_optimize() {
            return module;
        }

        let before = module.source.lines().count();
        module.source = remove_redundant_store_loads(&module.source);
        peephole_log!(Green "Peephole removed ", {before - module.source.lines().count()}, " lines from ", {module.class_name.as_str()});

        module
    }
}
