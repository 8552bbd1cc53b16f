//! Simple class names to the slash-separated names the target expects.
//!
//! Seeded once per class from the class itself, its imports and its superclass.
//! Variables are added as assignments are emitted, so a receiver can be qualified
//! from the type its variable was first assigned.

use crate::compiler_frontend::compiler_messages::compiler_errors::{
    CompilationStage, CompilerError,
};
use crate::compiler_frontend::ir::ir_nodes::{Element, IrClass, IrType};
use crate::projects::settings::DEFAULT_SUPERCLASS;
use crate::return_compiler_error;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct QualifiedNames {
    classes: FxHashMap<String, String>,
    variables: FxHashMap<String, String>,
    own_class: String,
    superclass: String,
}

impl QualifiedNames {
    pub fn for_class(class: &IrClass) -> Self {
        let mut classes = FxHashMap::default();

        for import in &class.imports {
            if let Some(simple_name) = import.rsplit('.').next() {
                classes.insert(simple_name.to_owned(), import.replace('.', "/"));
            }
        }

        classes.insert(class.name.to_owned(), class.name.to_owned());

        let superclass = match &class.superclass {
            Some(superclass) => classes
                .get(superclass)
                .cloned()
                .unwrap_or_else(|| superclass.replace('.', "/")),
            None => DEFAULT_SUPERCLASS.to_owned(),
        };

        QualifiedNames {
            classes,
            variables: FxHashMap::default(),
            own_class: class.name.to_owned(),
            superclass,
        }
    }

    pub fn own_class(&self) -> &str {
        &self.own_class
    }

    pub fn superclass(&self) -> &str {
        &self.superclass
    }

    pub fn class(&self, simple_name: &str) -> Result<&str, CompilerError> {
        match self.classes.get(simple_name) {
            Some(qualified) => Ok(qualified),
            None => return_compiler_error!(
                CompilationStage::Codegen,
                "Jasmin backend: class '{}' has no qualified name. It is neither imported nor declared",
                simple_name
            ),
        }
    }

    /// Remembers the class a variable holds, if it holds an instance of a known class.
    /// The first assignment decides. Later ones don't change it.
    pub fn record_variable(&mut self, element: &Element) {
        let (Some(name), IrType::Object(class_name)) = (element.variable_name(), element.ty())
        else {
            return;
        };

        if let Some(qualified) = self.classes.get(class_name).cloned() {
            self.variables.entry(name.to_owned()).or_insert(qualified);
        }
    }

    /// The class that owns a method or field reached through `element`
    pub fn owner_of(&self, element: &Element) -> Result<String, CompilerError> {
        match element.ty() {
            IrType::This => return Ok(self.own_class.to_owned()),
            IrType::Class(name) => return self.class(name).map(str::to_owned),
            IrType::Object(class_name) => {
                if let Ok(qualified) = self.class(class_name) {
                    return Ok(qualified.to_owned());
                }
            }
            _ => {}
        }

        if let Some(qualified) = element
            .variable_name()
            .and_then(|name| self.variables.get(name))
        {
            return Ok(qualified.to_owned());
        }

        return_compiler_error!(
            CompilationStage::Codegen,
            "Jasmin backend: can't tell which class '{}' belongs to",
            element
        )
    }

    /// Type descriptor, e.g. `I`, `[I` or `Ljava/lang/String;`
    pub fn descriptor(&self, ty: &IrType) -> Result<String, CompilerError> {
        let descriptor = match ty {
            IrType::Int32 => String::from("I"),
            IrType::Boolean => String::from("Z"),
            IrType::Void => String::from("V"),
            IrType::String => String::from("Ljava/lang/String;"),
            IrType::Array(element) => format!("[{}", self.descriptor(element)?),
            IrType::Object(class_name) => format!("L{};", self.class(class_name)?),
            IrType::This => format!("L{};", self.own_class),
            IrType::Class(name) => return_compiler_error!(
                CompilationStage::Codegen,
                "Jasmin backend: the class reference '{}' has no value type",
                name
            ),
        };

        Ok(descriptor)
    }

    /// `(params)return`
    pub fn method_descriptor<'t>(
        &self,
        params: impl IntoIterator<Item = &'t IrType>,
        return_type: &IrType,
    ) -> Result<String, CompilerError> {
        let mut descriptor = String::from("(");
        for param in params {
            descriptor.push_str(&self.descriptor(param)?);
        }
        descriptor.push(')');
        descriptor.push_str(&self.descriptor(return_type)?);

        Ok(descriptor)
    }
}

#[cfg(test)]
#[path = "tests/qualified_names_tests.rs"]
mod tests;
