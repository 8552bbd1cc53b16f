//! Expression and call lowering for the IR builder.
//!
//! Every expression lowers to a single [`Element`]. Any instructions needed to compute it
//! are emitted into the current method first, so the element is ready to use as an operand.
//! Array reads are always materialized, so elements handed back from here are never
//! array operands.

use crate::compiler_frontend::analysis::name_resolution::Resolution;
use crate::compiler_frontend::ast::ast_nodes::{
    BinaryOperator, LiteralValue, NewTarget, NodeId, NodeKind, UnaryOperator,
};
use crate::compiler_frontend::compiler_messages::compiler_errors::{
    CompilationStage, CompilerError,
};
use crate::compiler_frontend::ir::ir_builder::{IrBuilder, ir_type};
use crate::compiler_frontend::ir::ir_nodes::{
    CallInstruction, CallKind, Element, Instruction, IrOperator, IrType,
};
use crate::return_compiler_error;

impl IrBuilder<'_> {
    pub(crate) fn lower_expression(
        &mut self,
        id: NodeId,
        expected: &IrType,
    ) -> Result<Element, CompilerError> {
        self.lower_expression_into(id, expected, None)
    }

    /// `destination` is a hint: when the final instruction produces a value of the same type,
    /// it is written there instead of a fresh temporary.
    pub(crate) fn lower_expression_into(
        &mut self,
        id: NodeId,
        expected: &IrType,
        destination: Option<&Element>,
    ) -> Result<Element, CompilerError> {
        let ast = self.ast;

        match ast.kind(id) {
            NodeKind::Literal { value } => Ok(match value {
                LiteralValue::Int(value) => Element::int(*value),
                LiteralValue::Boolean(value) => Element::boolean(*value),
            }),

            NodeKind::Identifier { name } => self.lower_identifier(name, destination),

            NodeKind::ThisT => Ok(Element::this()),

            NodeKind::BinOp { op, left, right } => {
                let operand_type = ir_type(&op.operand_type());
                let left = self.lower_expression(*left, &operand_type)?;
                let right = self.lower_expression(*right, &operand_type)?;

                let ty = ir_type(&op.result_type());
                let instruction = Instruction::BinaryOp {
                    left,
                    op: binary_operator(*op),
                    right,
                    ty: ty.clone(),
                };
                Ok(self.assign_to_destination(destination, ty, instruction))
            }

            NodeKind::UnaryOp {
                op: UnaryOperator::Not,
                operand,
            } => {
                let operand = self.lower_expression(*operand, &IrType::Boolean)?;
                let instruction = Instruction::UnaryOp {
                    op: IrOperator::Not,
                    operand,
                    ty: IrType::Boolean,
                };
                Ok(self.assign_to_destination(destination, IrType::Boolean, instruction))
            }

            NodeKind::UnaryOp {
                op: UnaryOperator::Length,
                operand,
            } => {
                let array = self.lower_expression(*operand, &IrType::int_array())?;
                let call = CallInstruction::simple(CallKind::ArrayLength, array, IrType::Int32);
                Ok(self.assign_to_destination(destination, IrType::Int32, Instruction::Call(call)))
            }

            NodeKind::CallExpression { method, .. } => match self.lower_call(id, expected, destination)? {
                Some(value) => Ok(value),
                None => return_compiler_error!(
                    CompilationStage::IrGeneration,
                    "Call to '{}' at line {} produces no value but one is needed",
                    method,
                    ast.location(id).line()
                ),
            },

            NodeKind::Index { array, index } => {
                let element = self.array_operand(*array, *index)?;
                let ty = element.ty().to_owned();
                Ok(self.assign_to_destination(destination, ty, Instruction::SingleOp(element)))
            }

            NodeKind::NewExp {
                target: NewTarget::Object(class_name),
            } => {
                let ty = IrType::Object(class_name.to_owned());
                let allocation = Instruction::Call(CallInstruction::simple(
                    CallKind::New,
                    Element::class_reference(class_name),
                    ty.clone(),
                ));
                let object = self.assign_to_destination(destination, ty, allocation);

                self.emit(Instruction::Call(CallInstruction::invoke(
                    CallKind::InvokeSpecial,
                    object.clone(),
                    "<init>",
                    Vec::new(),
                    IrType::Void,
                )));

                Ok(object)
            }

            NodeKind::NewExp {
                target: NewTarget::IntArray { size },
            } => {
                let size = self.lower_expression(*size, &IrType::Int32)?;
                let ty = IrType::int_array();
                let allocation = Instruction::Call(CallInstruction::simple(
                    CallKind::NewArray,
                    size,
                    ty.clone(),
                ));
                Ok(self.assign_to_destination(destination, ty, allocation))
            }

            other => return_compiler_error!(
                CompilationStage::IrGeneration,
                "{} at line {} can't be lowered as an expression",
                other.kind_name(),
                ast.location(id).line()
            ),
        }
    }

    fn lower_identifier(
        &mut self,
        name: &str,
        destination: Option<&Element>,
    ) -> Result<Element, CompilerError> {
        match self.scope.resolve(name) {
            Some(Resolution::Local(symbol)) => Ok(Element::operand(name, ir_type(&symbol.ty))),

            Some(Resolution::Parameter { position, symbol }) => {
                Ok(Element::parameter(name, ir_type(&symbol.ty), position))
            }

            Some(Resolution::Field(symbol)) => {
                let ty = ir_type(&symbol.ty);
                let read = Instruction::GetField {
                    object: Element::this(),
                    field: Element::operand(name, ty.clone()),
                    ty: ty.clone(),
                };
                Ok(self.assign_to_destination(destination, ty, read))
            }

            Some(Resolution::Import(_) | Resolution::Superclass | Resolution::OwnClass) => {
                Ok(Element::class_reference(name))
            }

            None => return_compiler_error!(
                CompilationStage::IrGeneration,
                "'{}' has no declaration to lower against",
                name
            ),
        }
    }

    /// `array[index]` as an element, with the index forced into a variable
    pub(crate) fn array_operand(
        &mut self,
        array: NodeId,
        index: NodeId,
    ) -> Result<Element, CompilerError> {
        let base = self.lower_expression(array, &IrType::int_array())?;

        let Element::Operand {
            name,
            ty: IrType::Array(element_type),
            param_index,
        } = base
        else {
            return_compiler_error!(
                CompilationStage::IrGeneration,
                "Indexed value at line {} is not an array variable",
                self.ast.location(array).line()
            );
        };

        let index = self.lower_expression(index, &IrType::Int32)?;
        let index = self.into_variable(index, IrType::Int32);

        Ok(Element::ArrayOperand {
            name,
            element_type: *element_type,
            indexes: vec![index],
            param_index,
        })
    }

    fn into_variable(&mut self, element: Element, ty: IrType) -> Element {
        if !element.is_literal() {
            return element;
        }

        let temp = self.next_temp(ty.clone());
        self.emit(Instruction::Assign {
            dest: temp.clone(),
            ty,
            rhs: Box::new(Instruction::SingleOp(element)),
        });
        temp
    }

    /// Writes `rhs` into the destination when the types line up, otherwise into a new temporary
    fn assign_to_destination(
        &mut self,
        destination: Option<&Element>,
        ty: IrType,
        rhs: Instruction,
    ) -> Element {
        let dest = match destination {
            Some(destination) if destination.ty() == &ty => destination.clone(),
            _ => self.next_temp(ty.clone()),
        };

        self.emit(Instruction::Assign {
            dest: dest.clone(),
            ty,
            rhs: Box::new(rhs),
        });

        dest
    }

    // --------------------
    // Calls
    // --------------------

    /// Returns `None` when the call is emitted as a statement and its result is dropped.
    ///
    /// The return type comes from the symbol table when the method belongs to this class.
    /// Anything else (imports, the superclass, unknown receivers) takes the type the
    /// surrounding context expects.
    pub(crate) fn lower_call(
        &mut self,
        id: NodeId,
        expected: &IrType,
        destination: Option<&Element>,
    ) -> Result<Option<Element>, CompilerError> {
        let ast = self.ast;
        let table = self.table;

        let NodeKind::CallExpression {
            receiver,
            method,
            arguments,
        } = ast.kind(id)
        else {
            return_compiler_error!(
                CompilationStage::IrGeneration,
                "Expected a call, found {}",
                ast.kind(id).kind_name()
            );
        };

        let (kind, first_arg, is_local) = match receiver {
            None => (CallKind::InvokeVirtual, Element::this(), true),
            Some(receiver) => self.lower_receiver(*receiver)?,
        };

        let signature = if is_local { table.method(method) } else { None };

        let argument_ids: &[NodeId] = match ast.kind(*arguments) {
            NodeKind::Arguments { values } => values,
            _ => &[],
        };

        let mut operands = Vec::with_capacity(argument_ids.len());
        for (position, argument) in argument_ids.iter().enumerate() {
            let parameter_type = signature
                .and_then(|signature| signature.parameters.get(position))
                .map(|parameter| ir_type(&parameter.ty))
                .unwrap_or(IrType::Int32);

            operands.push(self.lower_expression(*argument, &parameter_type)?);
        }

        let return_type = match signature {
            Some(signature) => ir_type(&signature.return_type),
            None => expected.to_owned(),
        };

        let call = CallInstruction::invoke(kind, first_arg, method, operands, return_type.clone());

        if return_type == IrType::Void || *expected == IrType::Void {
            self.emit(Instruction::Call(call));
            return Ok(None);
        }

        Ok(Some(self.assign_to_destination(
            destination,
            return_type,
            Instruction::Call(call),
        )))
    }

    /// The invocation kind and first argument for an explicit receiver,
    /// plus whether the method is looked up in this class
    fn lower_receiver(
        &mut self,
        receiver: NodeId,
    ) -> Result<(CallKind, Element, bool), CompilerError> {
        let ast = self.ast;

        match ast.kind(receiver) {
            NodeKind::ThisT => return Ok((CallKind::InvokeVirtual, Element::this(), true)),

            NodeKind::Identifier { name } => match self.scope.resolve(name) {
                Some(Resolution::Import(_) | Resolution::Superclass) => {
                    return Ok((
                        CallKind::InvokeStatic,
                        Element::class_reference(name),
                        false,
                    ));
                }
                Some(Resolution::OwnClass) => {
                    return Ok((CallKind::InvokeStatic, Element::class_reference(name), true));
                }
                _ => {}
            },

            _ => {}
        }

        let assumed_class = self.chained_receiver_class(receiver);
        let value = self.lower_expression(receiver, &IrType::Object(assumed_class))?;
        let is_local =
            matches!(value.ty(), IrType::Object(class) if *class == self.table.class_name);

        Ok((CallKind::InvokeVirtual, value, is_local))
    }

    /// The class assumed for the result of a call whose type nothing declares.
    /// `A.make().run()` assumes `make` returns an `A`, anything else assumes this class.
    fn chained_receiver_class(&self, receiver: NodeId) -> String {
        let ast = self.ast;

        if let NodeKind::CallExpression {
            receiver: Some(inner),
            ..
        } = ast.kind(receiver)
            && let NodeKind::Identifier { name } = ast.kind(*inner)
            && self
                .scope
                .resolve(name)
                .is_some_and(|resolution| resolution.is_class_reference())
        {
            return name.to_owned();
        }

        self.table.class_name.to_owned()
    }
}

fn binary_operator(op: BinaryOperator) -> IrOperator {
    match op {
        BinaryOperator::Add => IrOperator::Add,
        BinaryOperator::Sub => IrOperator::Sub,
        BinaryOperator::Mul => IrOperator::Mul,
        BinaryOperator::Div => IrOperator::Div,
        BinaryOperator::LessThan => IrOperator::Lt,
        BinaryOperator::And => IrOperator::And,
    }
}
