//! ===== Symbol Table =====
//!
//! Built once per compilation unit by [`symbol_table_builder`], read-only afterward.
//! Holds the imports, the class and its superclass, the fields,
//! and one signature per method (`main` is the reserved static entry point).

pub mod symbol_table_builder;

use crate::compiler_frontend::ast::ast_nodes::TextLocation;
use crate::compiler_frontend::datatypes::{Symbol, Type};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    pub return_type: Type,
    pub parameters: Vec<Symbol>,
    pub locals: Vec<Symbol>,
    pub is_static: bool,
    pub location: TextLocation,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, return_type: Type, location: TextLocation) -> Self {
        MethodSignature {
            name: name.into(),
            return_type,
            parameters: Vec::new(),
            locals: Vec::new(),
            is_static: false,
            location,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&Symbol> {
        self.parameters.iter().find(|symbol| symbol.name == name)
    }

    /// 1-based position, which is also how parameters are referenced in the IR (`$1.x`)
    pub fn parameter_position(&self, name: &str) -> Option<usize> {
        self.parameters
            .iter()
            .position(|symbol| symbol.name == name)
            .map(|index| index + 1)
    }

    pub fn local(&self, name: &str) -> Option<&Symbol> {
        self.locals.iter().find(|symbol| symbol.name == name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub class_name: String,
    pub superclass: Option<String>,

    // Full dotted paths, in declaration order
    imports: Vec<String>,
    fields: Vec<Symbol>,
    methods: Vec<MethodSignature>,

    method_index_by_name: FxHashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn add_import(&mut self, path: String) {
        if !self.imports.contains(&path) {
            self.imports.push(path);
        }
    }

    /// Returns false (and inserts nothing) if the field already exists
    pub fn add_field(&mut self, symbol: Symbol) -> bool {
        if self.field(&symbol.name).is_some() {
            return false;
        }
        self.fields.push(symbol);
        true
    }

    /// Returns false (and inserts nothing) if a method with this signature already exists
    pub fn add_method(&mut self, signature: MethodSignature) -> bool {
        if self.method_index_by_name.contains_key(&signature.name) {
            return false;
        }
        self.method_index_by_name
            .insert(signature.name.clone(), self.methods.len());
        self.methods.push(signature);
        true
    }

    pub(crate) fn method_mut(&mut self, name: &str) -> Option<&mut MethodSignature> {
        let index = *self.method_index_by_name.get(name)?;
        self.methods.get_mut(index)
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn fields(&self) -> &[Symbol] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|symbol| symbol.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        let index = *self.method_index_by_name.get(name)?;
        self.methods.get(index)
    }

    pub fn return_type(&self, method: &str) -> Option<&Type> {
        self.method(method).map(|signature| &signature.return_type)
    }

    pub fn parameters(&self, method: &str) -> Option<&[Symbol]> {
        self.method(method)
            .map(|signature| signature.parameters.as_slice())
    }

    pub fn locals(&self, method: &str) -> Option<&[Symbol]> {
        self.method(method).map(|signature| signature.locals.as_slice())
    }

    /// Finds an import by the name code refers to it with: its last segment.
    pub fn import_named(&self, simple_name: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|path| path.rsplit('.').next() == Some(simple_name))
            .map(String::as_str)
    }

    pub fn is_superclass(&self, name: &str) -> bool {
        self.superclass.as_deref() == Some(name)
    }

    /// The class itself, its superclass, or anything imported
    pub fn is_known_class(&self, name: &str) -> bool {
        name == self.class_name || self.is_superclass(name) || self.import_named(name).is_some()
    }

    /// Every name the program declares, so generated temporaries can avoid them
    pub fn declared_names(&self) -> FxHashSet<String> {
        let mut names = FxHashSet::default();
        names.insert(self.class_name.clone());
        if let Some(superclass) = &self.superclass {
            names.insert(superclass.clone());
        }
        for import in &self.imports {
            if let Some(last) = import.rsplit('.').next() {
                names.insert(last.to_string());
            }
        }
        for field in &self.fields {
            names.insert(field.name.clone());
        }
        for method in &self.methods {
            for symbol in method.parameters.iter().chain(method.locals.iter()) {
                names.insert(symbol.name.clone());
            }
        }
        names
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "import {import}")?;
        }

        match &self.superclass {
            Some(superclass) => writeln!(f, "class {} extends {}", self.class_name, superclass)?,
            None => writeln!(f, "class {}", self.class_name)?,
        }

        for field in &self.fields {
            writeln!(f, "  field {field}")?;
        }

        for method in &self.methods {
            let parameters = method
                .parameters
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");

            let modifier = if method.is_static { "static " } else { "" };
            writeln!(
                f,
                "  {}{} {}({})",
                modifier, method.return_type, method.name, parameters
            )?;

            for local in &method.locals {
                writeln!(f, "    local {local}")?;
            }
        }

        Ok(())
    }
}
