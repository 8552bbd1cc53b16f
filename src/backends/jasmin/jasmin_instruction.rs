//! One fixed template per IR instruction kind.
//!
//! `push_*` leaves exactly one value on the operand stack, `emit_instruction` leaves none.
//! Any shape without a template is a generator bug and aborts the compilation.

use crate::backends::jasmin::JasminEmitter;
use crate::compiler_frontend::compiler_messages::compiler_errors::{
    CompilationStage, CompilerError,
};
use crate::compiler_frontend::ir::ir_builder::ir_type;
use crate::compiler_frontend::ir::ir_nodes::{
    CallInstruction, CallKind, Element, Instruction, IrMethod, IrOperator, IrType,
};
use crate::return_compiler_error;

impl JasminEmitter<'_> {
    pub(crate) fn emit_instruction(
        &mut self,
        method: &IrMethod,
        instruction: &Instruction,
    ) -> Result<(), CompilerError> {
        match instruction {
            Instruction::Assign { dest, rhs, .. } => self.emit_assign(method, dest, rhs),

            Instruction::Call(call) => {
                self.emit_call(method, call)?;
                if call.return_type != IrType::Void {
                    self.emit_line("pop");
                }
                Ok(())
            }

            Instruction::GetField { .. } => {
                self.push_value(method, instruction)?;
                self.emit_line("pop");
                Ok(())
            }

            Instruction::PutField {
                object,
                field,
                value,
            } => {
                self.push_element(method, object)?;
                self.push_element(method, value)?;

                let owner = self.names.owner_of(object)?;
                let descriptor = self.names.descriptor(field.ty())?;
                self.emit_line(&format!(
                    "putfield {}/{} {}",
                    owner,
                    field_name(field)?,
                    descriptor
                ));
                Ok(())
            }

            Instruction::Return { ty, operand } => {
                match operand {
                    Some(operand) => {
                        self.push_element(method, operand)?;
                        self.emit_line(if ty.is_int_like() { "ireturn" } else { "areturn" });
                    }
                    None => self.emit_line("return"),
                }
                Ok(())
            }

            Instruction::Goto(label) => {
                self.emit_line(&format!("goto {label}"));
                Ok(())
            }

            Instruction::OpCondGoto { condition, label } => {
                self.emit_branch(method, condition, label)
            }

            Instruction::SingleOpCondGoto { condition, label } => {
                self.push_element(method, condition)?;
                self.emit_line(&format!("ifne {label}"));
                Ok(())
            }

            Instruction::BinaryOp { .. } | Instruction::UnaryOp { .. } | Instruction::SingleOp(_) => {
                return_compiler_error!(
                    CompilationStage::Codegen,
                    "Jasmin backend: a {} can't stand on its own in method '{}'",
                    instruction.kind_name(),
                    method.name
                )
            }
        }
    }

    fn emit_assign(
        &mut self,
        method: &IrMethod,
        dest: &Element,
        rhs: &Instruction,
    ) -> Result<(), CompilerError> {
        match dest {
            Element::ArrayOperand {
                name,
                element_type,
                indexes,
                ..
            } => {
                self.load_variable(method, name, &IrType::Array(Box::new(element_type.to_owned())))?;
                self.push_index(method, indexes)?;
                self.push_value(method, rhs)?;
                self.emit_line(if element_type.is_int_like() {
                    "iastore"
                } else {
                    "aastore"
                });
                Ok(())
            }

            Element::Operand { name, ty, .. } if dest.variable_name().is_some() => {
                self.push_value(method, rhs)?;
                self.names.record_variable(dest);
                self.store_variable(method, name, ty)
            }

            _ => return_compiler_error!(
                CompilationStage::Codegen,
                "Jasmin backend: can't assign to '{}' in method '{}'",
                dest,
                method.name
            ),
        }
    }

    /// Jumps to `label` when the condition holds
    fn emit_branch(
        &mut self,
        method: &IrMethod,
        condition: &Instruction,
        label: &str,
    ) -> Result<(), CompilerError> {
        match condition {
            Instruction::BinaryOp {
                left, op, right, ..
            } if op.is_comparison() => {
                self.push_element(method, left)?;
                self.push_element(method, right)?;
                self.emit_line(&format!("if_icmp{} {}", comparison_suffix(*op)?, label));
            }

            Instruction::UnaryOp {
                op: IrOperator::Not,
                operand,
                ..
            } => {
                self.push_element(method, operand)?;
                self.emit_line(&format!("ifeq {label}"));
            }

            _ => {
                self.push_value(method, condition)?;
                self.emit_line(&format!("ifne {label}"));
            }
        }

        Ok(())
    }

    /// Leaves the value of `instruction` on the stack
    fn push_value(
        &mut self,
        method: &IrMethod,
        instruction: &Instruction,
    ) -> Result<(), CompilerError> {
        match instruction {
            Instruction::SingleOp(element) => self.push_element(method, element),

            Instruction::BinaryOp {
                left, op, right, ..
            } => {
                self.push_element(method, left)?;
                self.push_element(method, right)?;

                match op {
                    IrOperator::Add => self.emit_line("iadd"),
                    IrOperator::Sub => self.emit_line("isub"),
                    IrOperator::Mul => self.emit_line("imul"),
                    IrOperator::Div => self.emit_line("idiv"),
                    IrOperator::And => self.emit_line("iand"),
                    IrOperator::Or => self.emit_line("ior"),
                    IrOperator::Not => return_compiler_error!(
                        CompilationStage::Codegen,
                        "Jasmin backend: '!' used as a binary operator in method '{}'",
                        method.name
                    ),
                    comparison => {
                        let branch = format!("if_icmp{}", comparison_suffix(*comparison)?);
                        self.materialize_boolean(&branch);
                    }
                }
                Ok(())
            }

            Instruction::UnaryOp {
                op: IrOperator::Not,
                operand,
                ..
            } => {
                self.push_element(method, operand)?;
                self.materialize_boolean("ifeq");
                Ok(())
            }

            Instruction::Call(call) => {
                if call.return_type == IrType::Void {
                    return_compiler_error!(
                        CompilationStage::Codegen,
                        "Jasmin backend: void call '{}' used as a value in method '{}'",
                        call,
                        method.name
                    );
                }
                self.emit_call(method, call)
            }

            Instruction::GetField { object, field, ty } => {
                self.push_element(method, object)?;

                let owner = self.names.owner_of(object)?;
                let descriptor = self.names.descriptor(ty)?;
                self.emit_line(&format!(
                    "getfield {}/{} {}",
                    owner,
                    field_name(field)?,
                    descriptor
                ));
                Ok(())
            }

            other => return_compiler_error!(
                CompilationStage::Codegen,
                "Jasmin backend: no value template for a {} in method '{}'",
                other.kind_name(),
                method.name
            ),
        }
    }

    /// Expects the branch operands on the stack and replaces them with 0 or 1
    fn materialize_boolean(&mut self, branch: &str) {
        let suffix = self.next_comparison_suffix();
        let true_label = format!("cmp_true_{suffix}");
        let end_label = format!("cmp_end_{suffix}");

        self.emit_line(&format!("{branch} {true_label}"));
        self.emit_line("iconst_0");
        self.emit_line(&format!("goto {end_label}"));
        self.emit_label(&true_label);
        self.emit_line("iconst_1");
        self.emit_label(&end_label);
    }

    // --------------------
    // Calls
    // --------------------

    /// Leaves the result on the stack unless the call returns void
    fn emit_call(
        &mut self,
        method: &IrMethod,
        call: &CallInstruction,
    ) -> Result<(), CompilerError> {
        match call.kind {
            CallKind::New => {
                let Element::Operand {
                    name: class_name, ..
                } = &call.first_arg
                else {
                    return_compiler_error!(
                        CompilationStage::Codegen,
                        "Jasmin backend: 'new' without a class in method '{}'",
                        method.name
                    );
                };
                let qualified = self.names.class(class_name)?.to_owned();
                self.emit_line(&format!("new {qualified}"));
            }

            CallKind::NewArray => {
                self.push_element(method, &call.first_arg)?;
                let line = match call.return_type.element_type() {
                    Some(IrType::Int32) => String::from("newarray int"),
                    Some(IrType::Boolean) => String::from("newarray boolean"),
                    Some(IrType::String) => String::from("anewarray java/lang/String"),
                    Some(IrType::Object(class_name)) => {
                        format!("anewarray {}", self.names.class(class_name)?)
                    }
                    _ => return_compiler_error!(
                        CompilationStage::Codegen,
                        "Jasmin backend: can't allocate an array of '{}'",
                        call.return_type
                    ),
                };
                self.emit_line(&line);
            }

            CallKind::ArrayLength => {
                self.push_element(method, &call.first_arg)?;
                self.emit_line("arraylength");
            }

            CallKind::Ldc => self.push_element(method, &call.first_arg)?,

            CallKind::InvokeStatic => {
                let owner = self.names.owner_of(&call.first_arg)?;
                self.push_arguments(method, call)?;
                let target = self.call_target(&owner, call)?;
                self.emit_line(&format!("invokestatic {target}"));
            }

            CallKind::InvokeVirtual | CallKind::InvokeInterface => {
                let owner = self.names.owner_of(&call.first_arg)?;
                self.push_element(method, &call.first_arg)?;
                self.push_arguments(method, call)?;
                let target = self.call_target(&owner, call)?;

                if call.kind == CallKind::InvokeInterface {
                    self.emit_line(&format!(
                        "invokeinterface {} {}",
                        target,
                        call.operands.len() + 1
                    ));
                } else {
                    self.emit_line(&format!("invokevirtual {target}"));
                }
            }

            CallKind::InvokeSpecial => {
                // On `this` it can only be the superclass constructor
                let owner = match call.first_arg.ty() {
                    IrType::This => self.names.superclass().to_owned(),
                    _ => self.names.owner_of(&call.first_arg)?,
                };
                self.push_element(method, &call.first_arg)?;
                self.push_arguments(method, call)?;
                let target = self.call_target(&owner, call)?;
                self.emit_line(&format!("invokespecial {target}"));
            }
        }

        Ok(())
    }

    fn push_arguments(
        &mut self,
        method: &IrMethod,
        call: &CallInstruction,
    ) -> Result<(), CompilerError> {
        for operand in &call.operands {
            self.push_element(method, operand)?;
        }
        Ok(())
    }

    /// `Owner/method(params)return`
    fn call_target(&self, owner: &str, call: &CallInstruction) -> Result<String, CompilerError> {
        let Some(method_name) = &call.method else {
            return_compiler_error!(
                CompilationStage::Codegen,
                "Jasmin backend: '{}' has no method name",
                call
            );
        };

        let descriptor = match self.local_signature(owner, method_name) {
            Some((params, return_type)) => self.names.method_descriptor(&params, &return_type)?,
            None => self.names.method_descriptor(
                call.operands.iter().map(Element::ty),
                &call.return_type,
            )?,
        };

        Ok(format!("{owner}/{method_name}{descriptor}"))
    }

    /// Declared parameter and return types, when the method belongs to this class
    fn local_signature(&self, owner: &str, method_name: &str) -> Option<(Vec<IrType>, IrType)> {
        if owner != self.names.own_class() {
            return None;
        }

        if let Some(signature) = self.table.and_then(|table| table.method(method_name)) {
            return Some((
                signature
                    .parameters
                    .iter()
                    .map(|param| ir_type(&param.ty))
                    .collect(),
                ir_type(&signature.return_type),
            ));
        }

        self.ir
            .methods
            .iter()
            .find(|method| !method.is_constructor && method.name == method_name)
            .map(|method| {
                (
                    method.params.iter().map(|param| param.ty.to_owned()).collect(),
                    method.return_type.to_owned(),
                )
            })
    }

    // --------------------
    // Elements
    // --------------------
    fn push_element(&mut self, method: &IrMethod, element: &Element) -> Result<(), CompilerError> {
        match element {
            Element::Literal { value, .. } => {
                self.push_int(*value);
                Ok(())
            }

            Element::Operand {
                ty: IrType::This, ..
            } => {
                if method.is_static {
                    return_compiler_error!(
                        CompilationStage::Codegen,
                        "Jasmin backend: 'this' used in the static method '{}'",
                        method.name
                    );
                }
                self.emit_line("aload_0");
                Ok(())
            }

            Element::Operand {
                ty: IrType::Class(name),
                ..
            } => return_compiler_error!(
                CompilationStage::Codegen,
                "Jasmin backend: the class '{}' can't be used as a value in method '{}'",
                name,
                method.name
            ),

            Element::Operand { name, ty, .. } => self.load_variable(method, name, ty),

            Element::ArrayOperand {
                name,
                element_type,
                indexes,
                ..
            } => {
                self.load_variable(method, name, &IrType::Array(Box::new(element_type.to_owned())))?;
                self.push_index(method, indexes)?;
                self.emit_line(if element_type.is_int_like() {
                    "iaload"
                } else {
                    "aaload"
                });
                Ok(())
            }
        }
    }

    fn push_index(&mut self, method: &IrMethod, indexes: &[Element]) -> Result<(), CompilerError> {
        match indexes {
            [index] => self.push_element(method, index),
            _ => return_compiler_error!(
                CompilationStage::Codegen,
                "Jasmin backend: arrays take exactly one index, found {} in method '{}'",
                indexes.len(),
                method.name
            ),
        }
    }

    fn push_int(&mut self, value: i32) {
        let line = match value {
            -1 => String::from("iconst_m1"),
            0..=5 => format!("iconst_{value}"),
            -128..=127 => format!("bipush {value}"),
            -32768..=32767 => format!("sipush {value}"),
            _ => format!("ldc {value}"),
        };
        self.emit_line(&line);
    }

    fn load_variable(
        &mut self,
        method: &IrMethod,
        name: &str,
        ty: &IrType,
    ) -> Result<(), CompilerError> {
        let register = register_of(method, name)?;
        self.emit_line(&format!("{}load {}", type_prefix(ty), register));
        Ok(())
    }

    fn store_variable(
        &mut self,
        method: &IrMethod,
        name: &str,
        ty: &IrType,
    ) -> Result<(), CompilerError> {
        let register = register_of(method, name)?;
        self.emit_line(&format!("{}store {}", type_prefix(ty), register));
        Ok(())
    }
}

fn register_of(method: &IrMethod, name: &str) -> Result<usize, CompilerError> {
    match method.var_table().register(name) {
        Some(register) => Ok(register),
        None => return_compiler_error!(
            CompilationStage::Codegen,
            "Jasmin backend: variable '{}' has no register in method '{}'",
            name,
            method.name
        ),
    }
}

fn type_prefix(ty: &IrType) -> &'static str {
    if ty.is_int_like() { "i" } else { "a" }
}

fn field_name(field: &Element) -> Result<&str, CompilerError> {
    match field {
        Element::Operand { name, .. } => Ok(name),
        _ => return_compiler_error!(
            CompilationStage::Codegen,
            "Jasmin backend: '{}' is not a field",
            field
        ),
    }
}

fn comparison_suffix(op: IrOperator) -> Result<&'static str, CompilerError> {
    let suffix = match op {
        IrOperator::Lt => "lt",
        IrOperator::Le => "le",
        IrOperator::Gt => "gt",
        IrOperator::Ge => "ge",
        IrOperator::Eq => "eq",
        IrOperator::Ne => "ne",
        other => return_compiler_error!(
            CompilationStage::Codegen,
            "Jasmin backend: '{}' is not a comparison",
            other.symbol()
        ),
    };

    Ok(suffix)
}
