//! Variable to register table for one method.
//!
//! `this` takes register 0 in instance methods, parameters follow in declaration order,
//! then every other variable in the order it first appears.
//! Class references (`io`, `this`) and literals are not variables.

use crate::compiler_frontend::ir::ir_nodes::{Element, IrMethod, IrType};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDescriptor {
    pub register: usize,
    pub ty: IrType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarTable {
    registers: FxHashMap<String, VarDescriptor>,
    has_receiver: bool,
}

impl VarTable {
    pub fn build(method: &IrMethod) -> Self {
        let mut table = VarTable {
            registers: FxHashMap::default(),
            has_receiver: !method.is_static,
        };

        for param in &method.params {
            table.insert(&param.name, &param.ty);
        }

        for instruction in &method.instructions {
            for element in instruction.elements() {
                table.insert_element(element);
            }
        }

        table
    }

    fn insert_element(&mut self, element: &Element) {
        match element {
            Element::Operand { .. } => {
                if let Some(name) = element.variable_name() {
                    self.insert(name, element.ty());
                }
            }
            Element::ArrayOperand {
                name,
                element_type,
                indexes,
                ..
            } => {
                self.insert(name, &IrType::Array(Box::new(element_type.to_owned())));
                for index in indexes {
                    self.insert_element(index);
                }
            }
            Element::Literal { .. } => {}
        }
    }

    fn insert(&mut self, name: &str, ty: &IrType) {
        if self.registers.contains_key(name) {
            return;
        }

        let register = self.first_free_register();
        self.registers.insert(
            name.to_owned(),
            VarDescriptor {
                register,
                ty: ty.to_owned(),
            },
        );
    }

    fn first_free_register(&self) -> usize {
        self.registers.len() + usize::from(self.has_receiver)
    }

    pub fn get(&self, name: &str) -> Option<&VarDescriptor> {
        self.registers.get(name)
    }

    pub fn register(&self, name: &str) -> Option<usize> {
        self.get(name).map(|descriptor| descriptor.register)
    }

    /// Variables, not counting `this`
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// The `.limit locals` value: every variable plus the receiver slot
    pub fn locals_limit(&self) -> usize {
        self.registers.len() + usize::from(self.has_receiver)
    }

    /// Names in register order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<(&str, usize)> = self
            .registers
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor.register))
            .collect();
        names.sort_by_key(|(_, register)| *register);
        names.into_iter().map(|(name, _)| name).collect()
    }
}

#[cfg(test)]
#[path = "tests/var_table_tests.rs"]
mod tests;
