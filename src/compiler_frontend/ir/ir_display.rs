//! Writes an [`IrClass`] out as IR text.
//! Indentation is only for people reading the output, the parser ignores it.

use crate::compiler_frontend::ir::ir_nodes::{IrClass, IrField, IrMethod};
use std::fmt;

const INDENT: &str = "    ";

pub fn ir_to_text(class: &IrClass) -> String {
    let mut writer = IrWriter {
        out: String::new(),
        indent: 0,
    };
    writer.write_class(class);
    writer.out
}

impl fmt::Display for IrClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ir_to_text(self))
    }
}

struct IrWriter {
    out: String,
    indent: usize,
}

impl IrWriter {
    fn write_class(&mut self, class: &IrClass) {
        for import in &class.imports {
            self.emit_line(&format!("import {import};"));
        }
        if !class.imports.is_empty() {
            self.emit_line("");
        }

        match &class.superclass {
            Some(superclass) => {
                self.emit_line(&format!("public {} extends {} {{", class.name, superclass))
            }
            None => self.emit_line(&format!("public {} {{", class.name)),
        }

        self.with_indent(|writer| {
            for field in &class.fields {
                writer.emit_line(&format!(".field private {}.{};", field.name, field.ty));
            }

            for method in &class.methods {
                writer.emit_line("");
                writer.write_method(method);
            }
        });

        self.emit_line("}");
    }

    fn write_method(&mut self, method: &IrMethod) {
        let params = join_params(&method.params);

        if method.is_constructor {
            self.emit_line(&format!(".construct {}({}).V {{", method.name, params));
        } else {
            let modifiers = if method.is_static {
                "public static"
            } else {
                "public"
            };
            self.emit_line(&format!(
                ".method {} {}({}).{} {{",
                modifiers, method.name, params, method.return_type
            ));
        }

        for (index, instruction) in method.instructions.iter().enumerate() {
            self.write_labels(method, index);
            self.with_indent(|writer| writer.emit_line(&format!("{instruction};")));
        }
        self.write_labels(method, method.instructions.len());

        self.emit_line("}");
    }

    fn write_labels(&mut self, method: &IrMethod, position: usize) {
        for label in method.labels_at(position) {
            self.emit_line(&format!("{label}:"));
        }
    }

    fn emit_line(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str(INDENT);
            }
        }

        self.out.push_str(line);
        self.out.push('\n');
    }

    fn with_indent<F>(&mut self, mut callback: F)
    where
        F: FnMut(&mut Self),
    {
        self.indent += 1;
        callback(self);
        self.indent -= 1;
    }
}

fn join_params(params: &[IrField]) -> String {
    params
        .iter()
        .map(|param| format!("{}.{}", param.name, param.ty))
        .collect::<Vec<_>>()
        .join(", ")
}
