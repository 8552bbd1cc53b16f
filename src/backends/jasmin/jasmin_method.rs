use crate::backends::jasmin::JasminEmitter;
use crate::backends::jasmin::stack_limits::{locals_limit, stack_limit};
use crate::codegen_log;
use crate::compiler_frontend::compiler_messages::compiler_errors::{
    CompilationStage, CompilerError,
};
use crate::compiler_frontend::ir::control_flow::ControlFlowGraph;
use crate::compiler_frontend::ir::ir_nodes::IrMethod;
use crate::return_compiler_error;

impl JasminEmitter<'_> {
    pub(crate) fn emit_method(&mut self, method: &IrMethod) -> Result<(), CompilerError> {
        let graph = ControlFlowGraph::build(method)?;
        if graph.falls_off_end() {
            return_compiler_error!(
                CompilationStage::Codegen,
                "Jasmin backend: method '{}' can run past its last instruction without returning",
                method.name
            );
        }

        let header = self.method_header(method)?;
        self.emit_line(&header);

        self.indent += 1;
        let body = self.emit_method_body(method);
        self.indent -= 1;
        body?;

        self.emit_line(".end method");

        codegen_log!(Dark "  ", {method.name.as_str()}, " stack ", {stack_limit(method)}, " locals ", {locals_limit(method)});
        Ok(())
    }

    fn method_header(&self, method: &IrMethod) -> Result<String, CompilerError> {
        let modifiers = if method.is_static {
            "public static"
        } else {
            "public"
        };

        let descriptor = self
            .names
            .method_descriptor(method.params.iter().map(|param| &param.ty), &method.return_type)?;

        Ok(format!(".method {} {}{}", modifiers, method.name, descriptor))
    }

    fn emit_method_body(&mut self, method: &IrMethod) -> Result<(), CompilerError> {
        self.emit_line(&format!(".limit stack {}", stack_limit(method)));
        self.emit_line(&format!(".limit locals {}", locals_limit(method)));

        for (index, instruction) in method.instructions.iter().enumerate() {
            self.emit_labels(method, index);
            self.emit_instruction(method, instruction)?;
        }
        self.emit_labels(method, method.instructions.len());

        Ok(())
    }

    fn emit_labels(&mut self, method: &IrMethod, position: usize) {
        for label in method.labels_at(position) {
            self.emit_label(label);
        }
    }

    /// Labels always start at column zero
    pub(crate) fn emit_label(&mut self, label: &str) {
        self.out.push_str(label);
        self.out.push_str(":\n");
    }
}
