//! Jasmin backend for jmmc.
//!
//! Lowers a parsed IR class into Jasmin assembly for the JVM.
//! Every IR instruction maps to a fixed template that leaves the operand stack empty,
//! which is what keeps the per-instruction stack estimates in [`stack_limits`] sound.

mod jasmin_instruction;
mod jasmin_method;
pub mod peephole;
pub mod qualified_names;
pub mod stack_limits;

#[cfg(test)]
#[path = "tests/stack_machine.rs"]
pub(crate) mod stack_machine;

#[cfg(test)]
#[path = "tests/jasmin_tests.rs"]
mod tests;

use crate::backends::jasmin::qualified_names::QualifiedNames;
use crate::codegen_log;
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::compiler_frontend::ir::ir_nodes::IrClass;
use crate::compiler_frontend::symbol_table::SymbolTable;

/// Result of lowering an IR class to Jasmin.
#[derive(Debug, Clone, PartialEq)]
pub struct JasminModule {
    pub class_name: String,

    /// Complete Jasmin source.
    pub source: String,
}

/// `table` is optional so hand-written IR can be assembled without a source program.
/// When present, it is the authority for the signatures of this class's own methods.
pub fn lower_ir_to_jasmin(
    ir: &IrClass,
    table: Option<&SymbolTable>,
) -> Result<JasminModule, CompilerError> {
    let mut emitter = JasminEmitter::new(ir, table);
    emitter.lower_class()
}

pub(crate) struct JasminEmitter<'ir> {
    pub(crate) ir: &'ir IrClass,
    pub(crate) table: Option<&'ir SymbolTable>,
    pub(crate) names: QualifiedNames,

    pub(crate) out: String,
    pub(crate) indent: usize,

    // Suffix for the next cmp_true_N / cmp_end_N pair, unique across the class
    comparison_counter: usize,
}

impl<'ir> JasminEmitter<'ir> {
    pub(crate) fn new(ir: &'ir IrClass, table: Option<&'ir SymbolTable>) -> Self {
        Self {
            ir,
            table,
            names: QualifiedNames::for_class(ir),
            out: String::new(),
            indent: 0,
            comparison_counter: 0,
        }
    }

    fn lower_class(&mut self) -> Result<JasminModule, CompilerError> {
        let ir = self.ir;

        self.emit_line(&format!(".class public {}", ir.name));
        let superclass = self.names.superclass().to_owned();
        self.emit_line(&format!(".super {superclass}"));

        if !ir.fields.is_empty() {
            self.emit_line("");
        }
        for field in &ir.fields {
            let descriptor = self.names.descriptor(&field.ty)?;
            self.emit_line(&format!(".field private '{}' {}", field.name, descriptor));
        }

        self.emit_line("");
        self.emit_constructor();

        for method in ir.methods.iter().filter(|method| !method.is_constructor) {
            self.emit_line("");
            self.emit_method(method)?;
        }

        codegen_log!(Green "Emitted ", Bright {ir.name.as_str()}, Reset " (", {self.out.lines().count()}, " lines)");

        Ok(JasminModule {
            class_name: ir.name.to_owned(),
            source: std::mem::take(&mut self.out),
        })
    }

    fn emit_constructor(&mut self) {
        let superclass = self.names.superclass().to_owned();

        self.emit_line(".method public <init>()V");
        self.with_indent(|emitter| {
            emitter.emit_line("aload_0");
            emitter.emit_line(&format!("invokenonvirtual {superclass}/<init>()V"));
            emitter.emit_line("return");
        });
        self.emit_line(".end method");
    }

    pub(crate) fn next_comparison_suffix(&mut self) -> usize {
        let suffix = self.comparison_counter;
        self.comparison_counter += 1;
        suffix
    }

    pub(crate) fn emit_line(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("    ");
            }
        }

        self.out.push_str(line);
        self.out.push('\n');
    }

    pub(crate) fn with_indent<F>(&mut self, mut callback: F)
    where
        F: FnMut(&mut Self),
    {
        self.indent += 1;
        callback(self);
        self.indent -= 1;
    }
}
