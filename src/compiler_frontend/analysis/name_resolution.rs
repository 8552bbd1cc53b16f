//! Identifier resolution shared by the semantic checker and the IR builder.
//!
//! Lookup order: method locals, method parameters, class fields (not inside static `main`),
//! then imports, the superclass name and finally the class's own name.

use crate::compiler_frontend::ast::ast::Ast;
use crate::compiler_frontend::ast::ast_nodes::NodeId;
use crate::compiler_frontend::datatypes::{Symbol, Type};
use crate::compiler_frontend::symbol_table::{MethodSignature, SymbolTable};

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Local(&'a Symbol),

    // 1-based position in the parameter list
    Parameter { position: usize, symbol: &'a Symbol },
    Field(&'a Symbol),

    // Class references. These name a class, not a value.
    Import(&'a str),
    Superclass,
    OwnClass,
}

impl Resolution<'_> {
    pub fn variable_type(&self) -> Option<&Type> {
        match self {
            Resolution::Local(symbol)
            | Resolution::Parameter { symbol, .. }
            | Resolution::Field(symbol) => Some(&symbol.ty),
            _ => None,
        }
    }

    pub fn is_class_reference(&self) -> bool {
        matches!(
            self,
            Resolution::Import(_) | Resolution::Superclass | Resolution::OwnClass
        )
    }
}

/// What a name can see from one point in the program
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    pub table: &'a SymbolTable,
    pub method: Option<&'a MethodSignature>,
}

impl<'a> Scope<'a> {
    pub fn new(table: &'a SymbolTable, method: Option<&'a MethodSignature>) -> Self {
        Scope { table, method }
    }

    pub fn at_node(ast: &Ast, table: &'a SymbolTable, node: NodeId) -> Self {
        let method = ast
            .enclosing_method(node)
            .and_then(|method| ast.method_name(method))
            .and_then(|name| table.method(name));

        Scope { table, method }
    }

    pub fn is_static(&self) -> bool {
        self.method.is_some_and(|method| method.is_static)
    }

    pub fn resolve(&self, name: &str) -> Option<Resolution<'a>> {
        if let Some(variable) = self.resolve_variable(name) {
            return Some(variable);
        }

        if let Some(path) = self.table.import_named(name) {
            return Some(Resolution::Import(path));
        }

        if self.table.is_superclass(name) {
            return Some(Resolution::Superclass);
        }

        if self.table.class_name == name {
            return Some(Resolution::OwnClass);
        }

        None
    }

    /// Locals, parameters and fields only
    pub fn resolve_variable(&self, name: &str) -> Option<Resolution<'a>> {
        if let Some(method) = self.method {
            if let Some(symbol) = method.local(name) {
                return Some(Resolution::Local(symbol));
            }

            if let Some(position) = method.parameter_position(name) {
                return Some(Resolution::Parameter {
                    position,
                    symbol: &method.parameters[position - 1],
                });
            }
        }

        if self.is_static() {
            return None;
        }

        self.table.field(name).map(Resolution::Field)
    }
}
