//! Symbol Table Builder
//!
//! One pre-order walk over the AST. Each declaration goes into the region it sits in:
//! the class body or the method that owns it.
//!
//! Error tolerant: a second declaration of a name is reported and dropped,
//! the first one stays and the walk carries on.

use crate::compiler_frontend::ast::ast::Ast;
use crate::compiler_frontend::ast::ast_nodes::{NodeId, NodeKind};
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::compiler_frontend::datatypes::{Symbol, Type};
use crate::compiler_frontend::symbol_table::{MethodSignature, SymbolTable};
use crate::projects::settings::MAIN_METHOD_NAME;
use crate::symbol_table_log;
use rustc_hash::FxHashSet;

pub fn build_symbol_table(ast: &Ast) -> (SymbolTable, Vec<CompilerError>) {
    let mut builder = SymbolTableBuilder {
        ast,
        table: SymbolTable::new(),
        errors: Vec::new(),
        rejected_methods: FxHashSet::default(),
    };

    for id in ast.preorder() {
        builder.visit(id);
    }

    symbol_table_log!(Cyan "Symbol table:\n", Reset builder.table.to_string());

    (builder.table, builder.errors)
}

struct SymbolTableBuilder<'a> {
    ast: &'a Ast,
    table: SymbolTable,
    errors: Vec<CompilerError>,

    // A duplicate method is dropped along with everything declared inside it
    rejected_methods: FxHashSet<NodeId>,
}

impl SymbolTableBuilder<'_> {
    fn visit(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::ImportDeclaration { segments } => {
                self.table.add_import(segments.join("."));
            }

            NodeKind::ClassDeclaration { name, .. } => {
                self.table.class_name = name.to_owned();
            }

            NodeKind::Inheritance { superclass } => {
                self.table.superclass = Some(superclass.to_owned());
            }

            NodeKind::VarDeclaration { ty, name } => {
                let symbol = Symbol::new(name, ty.to_owned());
                match self.owning_method(id) {
                    Some(method) => self.declare_local(id, method, symbol),
                    None => self.declare_field(id, symbol),
                }
            }

            NodeKind::MainMethod { args_name, .. } => {
                let mut signature = MethodSignature::new(
                    MAIN_METHOD_NAME,
                    Type::void(),
                    ast.location(id).to_owned(),
                );
                signature.is_static = true;
                signature
                    .parameters
                    .push(Symbol::new(args_name, Type::string_array()));

                self.declare_method(id, signature);
            }

            NodeKind::InstanceMethod {
                name, return_type, ..
            } => {
                let signature = MethodSignature::new(
                    name,
                    return_type.to_owned(),
                    ast.location(id).to_owned(),
                );
                self.declare_method(id, signature);
            }

            NodeKind::Argument { ty, name } => {
                if let Some(method) = self.owning_method(id) {
                    self.declare_parameter(id, method, Symbol::new(name, ty.to_owned()));
                }
            }

            _ => {}
        }
    }

    /// The method this declaration belongs to, or None for the class body
    fn owning_method(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.ast.parent(id)?;
        self.ast.kind(parent).is_method().then_some(parent)
    }

    fn declare_field(&mut self, id: NodeId, symbol: Symbol) {
        let name = symbol.name.clone();
        if !self.table.add_field(symbol) {
            self.errors.push(CompilerError::new_declaration_error(
                format!(
                    "Field '{}' is already declared in class '{}'",
                    name, self.table.class_name
                ),
                self.ast.location(id).to_owned(),
            ));
        }
    }

    fn declare_method(&mut self, id: NodeId, signature: MethodSignature) {
        let name = signature.name.clone();
        if !self.table.add_method(signature) {
            self.rejected_methods.insert(id);
            self.errors.push(CompilerError::new_declaration_error(
                format!(
                    "Method '{}' is already declared in class '{}'",
                    name, self.table.class_name
                ),
                self.ast.location(id).to_owned(),
            ));
        }
    }

    fn declare_parameter(&mut self, id: NodeId, method: NodeId, symbol: Symbol) {
        if self.rejected_methods.contains(&method) {
            return;
        }
        let Some(method_name) = self.ast.method_name(method) else {
            return;
        };
        let Some(signature) = self.table.method_mut(method_name) else {
            return;
        };

        if signature.parameter(&symbol.name).is_some() {
            let msg = format!(
                "Parameter '{}' is already declared in method '{}'",
                symbol.name, method_name
            );
            self.errors.push(CompilerError::new_declaration_error(
                msg,
                self.ast.location(id).to_owned(),
            ));
            return;
        }

        signature.parameters.push(symbol);
    }

    fn declare_local(&mut self, id: NodeId, method: NodeId, symbol: Symbol) {
        if self.rejected_methods.contains(&method) {
            return;
        }
        let Some(method_name) = self.ast.method_name(method) else {
            return;
        };
        let Some(signature) = self.table.method_mut(method_name) else {
            return;
        };

        let conflict = if signature.local(&symbol.name).is_some() {
            Some("is already declared in")
        } else if signature.parameter(&symbol.name).is_some() {
            Some("shadows a parameter of")
        } else {
            None
        };

        if let Some(conflict) = conflict {
            let msg = format!(
                "Variable '{}' {} method '{}'",
                symbol.name, conflict, method_name
            );
            self.errors.push(CompilerError::new_declaration_error(
                msg,
                self.ast.location(id).to_owned(),
            ));
            return;
        }

        signature.locals.push(symbol);
    }
}

#[cfg(test)]
#[path = "tests/symbol_table_tests.rs"]
mod tests;
