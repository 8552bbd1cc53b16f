//! IR Generator
//!
//! Walks a checked AST and produces the three-address IR for its class.
//! Assumes the checker accepted the program, so anything it can't lower is an internal error.
//!
//! State is per compilation unit: a temporary counter and a label counter that never reset,
//! so every temporary and every `if`/`while` label suffix is unique across the whole class.

use crate::compiler_frontend::analysis::name_resolution::{Resolution, Scope};
use crate::compiler_frontend::ast::ast::Ast;
use crate::compiler_frontend::ast::ast_nodes::{
    BinaryOperator, LiteralValue, NodeId, NodeKind, UnaryOperator,
};
use crate::compiler_frontend::compiler_messages::compiler_errors::{
    CompilationStage, CompilerError,
};
use crate::compiler_frontend::datatypes::Type;
use crate::compiler_frontend::ir::ir_nodes::{
    CallInstruction, CallKind, Element, Instruction, IrClass, IrField, IrLabel, IrMethod,
    IrOperator, IrType,
};
use crate::compiler_frontend::symbol_table::SymbolTable;
use crate::projects::settings::TEMP_VAR_PREFIX;
use crate::{ir_log, return_compiler_error};
use rustc_hash::FxHashSet;

pub fn generate_ir(ast: &Ast, table: &SymbolTable) -> Result<IrClass, CompilerError> {
    let mut builder = IrBuilder::new(ast, table);
    builder.lower_class()
}

pub(crate) struct IrBuilder<'a> {
    pub(crate) ast: &'a Ast,
    pub(crate) table: &'a SymbolTable,

    // === Method being lowered ===
    pub(crate) scope: Scope<'a>,
    instructions: Vec<Instruction>,
    labels: Vec<IrLabel>,

    // === Unit-wide naming ===
    temp_counter: usize,
    label_counter: usize,
    reserved_names: FxHashSet<String>,
}

impl<'a> IrBuilder<'a> {
    pub(crate) fn new(ast: &'a Ast, table: &'a SymbolTable) -> Self {
        IrBuilder {
            ast,
            table,
            scope: Scope::new(table, None),
            instructions: Vec::new(),
            labels: Vec::new(),
            temp_counter: 0,
            label_counter: 0,
            reserved_names: table.declared_names(),
        }
    }

    fn lower_class(&mut self) -> Result<IrClass, CompilerError> {
        let ast = self.ast;

        let Some(class_id) = ast.class_declaration() else {
            return_compiler_error!(
                CompilationStage::IrGeneration,
                "AST has no class declaration to lower"
            );
        };
        let NodeKind::ClassDeclaration { methods, .. } = ast.kind(class_id) else {
            return_compiler_error!(
                CompilationStage::IrGeneration,
                "Expected a class declaration, found {}",
                ast.kind(class_id).kind_name()
            );
        };

        let mut class = IrClass {
            name: self.table.class_name.to_owned(),
            superclass: self.table.superclass.to_owned(),
            imports: self.table.imports().to_vec(),
            fields: self
                .table
                .fields()
                .iter()
                .map(|field| IrField {
                    name: field.name.to_owned(),
                    ty: ir_type(&field.ty),
                })
                .collect(),
            methods: Vec::new(),
        };

        class.methods.push(self.constructor());
        for method in methods {
            class.methods.push(self.lower_method(*method)?);
        }

        Ok(class)
    }

    fn constructor(&self) -> IrMethod {
        let mut constructor = IrMethod::new(&self.table.class_name, IrType::Void);
        constructor.is_constructor = true;
        constructor
            .instructions
            .push(Instruction::Call(CallInstruction::invoke(
                CallKind::InvokeSpecial,
                Element::this(),
                "<init>",
                Vec::new(),
                IrType::Void,
            )));
        constructor
    }

    fn lower_method(&mut self, id: NodeId) -> Result<IrMethod, CompilerError> {
        let ast = self.ast;
        let table = self.table;

        let body = match ast.kind(id) {
            NodeKind::MainMethod { body, .. } | NodeKind::InstanceMethod { body, .. } => body,
            other => return_compiler_error!(
                CompilationStage::IrGeneration,
                "Expected a method, found {}",
                other.kind_name()
            ),
        };

        let Some(signature) = ast.method_name(id).and_then(|name| table.method(name)) else {
            return_compiler_error!(
                CompilationStage::IrGeneration,
                "Method at line {} has no symbol table entry",
                ast.location(id).line()
            );
        };

        self.scope = Scope::new(table, Some(signature));

        for statement in body {
            self.lower_statement(*statement)?;
        }

        let return_type = ir_type(&signature.return_type);
        let position = self.instructions.len();
        let ends_with_return = matches!(self.instructions.last(), Some(Instruction::Return { .. }))
            && !self.labels.iter().any(|label| label.position == position);

        if !ends_with_return {
            if return_type != IrType::Void {
                return_compiler_error!(
                    CompilationStage::IrGeneration,
                    "Method '{}' can reach its end without returning a value",
                    signature.name
                );
            }

            self.emit(Instruction::Return {
                ty: IrType::Void,
                operand: None,
            });
        }

        let mut method = IrMethod::new(&signature.name, return_type);
        method.is_static = signature.is_static;
        method.params = signature
            .parameters
            .iter()
            .map(|param| IrField {
                name: param.name.to_owned(),
                ty: ir_type(&param.ty),
            })
            .collect();
        method.instructions = std::mem::take(&mut self.instructions);
        method.labels = std::mem::take(&mut self.labels);

        ir_log!(Cyan "Lowered ", Bright {method.name.as_str()}, Reset " (", {method.instructions.len()}, " instructions)");

        Ok(method)
    }

    // --------------------
    // Statements
    // --------------------
    pub(crate) fn lower_statement(&mut self, id: NodeId) -> Result<(), CompilerError> {
        let ast = self.ast;

        match ast.kind(id) {
            NodeKind::AssignmentStatement { target, value } => self.lower_assignment(*target, *value),

            NodeKind::IfStatement {
                condition,
                then_body,
                else_body,
            } => self.lower_if(*condition, then_body, else_body),

            NodeKind::WhileStatement { condition, body } => self.lower_while(*condition, body),

            NodeKind::UnaryOp {
                op: UnaryOperator::Return,
                operand,
            } => self.lower_return(*operand),

            NodeKind::CallExpression { .. } => {
                self.lower_call(id, &IrType::Void, None)?;
                Ok(())
            }

            // Anything else is evaluated for its effects and the value dropped
            _ => {
                self.lower_expression(id, &IrType::Void)?;
                Ok(())
            }
        }
    }

    fn lower_assignment(&mut self, target: NodeId, value: NodeId) -> Result<(), CompilerError> {
        let ast = self.ast;

        match ast.kind(target) {
            NodeKind::Identifier { name } => match self.scope.resolve(name) {
                Some(Resolution::Local(symbol)) => {
                    let dest = Element::operand(name, ir_type(&symbol.ty));
                    self.assign_into(dest, value)
                }
                Some(Resolution::Parameter { position, symbol }) => {
                    let dest = Element::parameter(name, ir_type(&symbol.ty), position);
                    self.assign_into(dest, value)
                }
                Some(Resolution::Field(symbol)) => {
                    let ty = ir_type(&symbol.ty);
                    let value = self.lower_expression(value, &ty)?;
                    self.emit(Instruction::PutField {
                        object: Element::this(),
                        field: Element::operand(name, ty),
                        value,
                    });
                    Ok(())
                }
                _ => return_compiler_error!(
                    CompilationStage::IrGeneration,
                    "'{}' at line {} is not an assignable variable",
                    name,
                    ast.location(target).line()
                ),
            },

            NodeKind::Index { array, index } => {
                let dest = self.array_operand(*array, *index)?;
                let element_type = dest.ty().to_owned();
                let value = self.lower_expression(value, &element_type)?;
                self.emit(Instruction::Assign {
                    dest,
                    ty: element_type,
                    rhs: Box::new(Instruction::SingleOp(value)),
                });
                Ok(())
            }

            other => return_compiler_error!(
                CompilationStage::IrGeneration,
                "A {} cannot be assigned to",
                other.kind_name()
            ),
        }
    }

    /// The value is computed straight into `dest` when its last instruction can target it
    fn assign_into(&mut self, dest: Element, value: NodeId) -> Result<(), CompilerError> {
        let ty = dest.ty().to_owned();
        let result = self.lower_expression_into(value, &ty, Some(&dest))?;

        if result != dest {
            self.emit(Instruction::Assign {
                dest,
                ty,
                rhs: Box::new(Instruction::SingleOp(result)),
            });
        }

        Ok(())
    }

    fn lower_return(&mut self, operand: NodeId) -> Result<(), CompilerError> {
        let ty = self
            .scope
            .method
            .map(|method| ir_type(&method.return_type))
            .unwrap_or(IrType::Void);

        if ty == IrType::Void {
            self.emit(Instruction::Return { ty, operand: None });
            return Ok(());
        }

        let value = self.lower_expression(operand, &ty)?;
        self.emit(Instruction::Return {
            ty,
            operand: Some(value),
        });
        Ok(())
    }

    fn lower_if(
        &mut self,
        condition: NodeId,
        then_body: &[NodeId],
        else_body: &[NodeId],
    ) -> Result<(), CompilerError> {
        let suffix = self.next_label_suffix();
        let else_label = format!("else_{suffix}");
        let end_label = format!("endif_{suffix}");

        let expression = self.condition_expression(condition);
        self.branch_if_false(expression, &else_label)?;

        for statement in then_body {
            self.lower_statement(*statement)?;
        }
        self.emit(Instruction::Goto(end_label.clone()));

        self.place_label(else_label);
        for statement in else_body {
            self.lower_statement(*statement)?;
        }
        self.place_label(end_label);

        Ok(())
    }

    fn lower_while(&mut self, condition: NodeId, body: &[NodeId]) -> Result<(), CompilerError> {
        let suffix = self.next_label_suffix();
        let loop_label = format!("Loop_{suffix}");
        let body_label = format!("Body_{suffix}");
        let end_label = format!("EndLoop_{suffix}");

        self.place_label(loop_label.clone());
        let expression = self.condition_expression(condition);
        self.branch_if_true(expression, &body_label)?;
        self.emit(Instruction::Goto(end_label.clone()));

        self.place_label(body_label);
        for statement in body {
            self.lower_statement(*statement)?;
        }
        self.emit(Instruction::Goto(loop_label));
        self.place_label(end_label);

        Ok(())
    }

    fn condition_expression(&self, condition: NodeId) -> NodeId {
        match self.ast.kind(condition) {
            NodeKind::IfCondition { expression } | NodeKind::WhileCondition { expression } => {
                *expression
            }
            _ => condition,
        }
    }

    /// Jumps to `label` when the condition is false, otherwise falls through
    fn branch_if_false(&mut self, expression: NodeId, label: &str) -> Result<(), CompilerError> {
        let ast = self.ast;

        let branch = match ast.kind(expression) {
            NodeKind::BinOp {
                op: BinaryOperator::LessThan,
                left,
                right,
            } => {
                let left = self.lower_expression(*left, &IrType::Int32)?;
                let right = self.lower_expression(*right, &IrType::Int32)?;
                op_cond_goto(
                    Instruction::BinaryOp {
                        left,
                        op: IrOperator::Ge,
                        right,
                        ty: IrType::Boolean,
                    },
                    label,
                )
            }

            // !(a && b) == !a || !b
            NodeKind::BinOp {
                op: BinaryOperator::And,
                left,
                right,
            } => {
                let left = self.lower_expression(*left, &IrType::Boolean)?;
                let right = self.lower_expression(*right, &IrType::Boolean)?;
                let left = self.negate(left);
                let right = self.negate(right);
                op_cond_goto(
                    Instruction::BinaryOp {
                        left,
                        op: IrOperator::Or,
                        right,
                        ty: IrType::Boolean,
                    },
                    label,
                )
            }

            NodeKind::UnaryOp {
                op: UnaryOperator::Not,
                operand,
            } => Instruction::SingleOpCondGoto {
                condition: self.lower_expression(*operand, &IrType::Boolean)?,
                label: label.to_owned(),
            },

            NodeKind::Literal {
                value: LiteralValue::Boolean(value),
            } => Instruction::SingleOpCondGoto {
                condition: Element::boolean(!value),
                label: label.to_owned(),
            },

            _ => {
                let value = self.lower_expression(expression, &IrType::Boolean)?;
                op_cond_goto(
                    Instruction::UnaryOp {
                        op: IrOperator::Not,
                        operand: value,
                        ty: IrType::Boolean,
                    },
                    label,
                )
            }
        };

        self.emit(branch);
        Ok(())
    }

    /// Jumps to `label` when the condition is true, otherwise falls through
    fn branch_if_true(&mut self, expression: NodeId, label: &str) -> Result<(), CompilerError> {
        let ast = self.ast;

        let branch = match ast.kind(expression) {
            NodeKind::BinOp { op, left, right }
                if matches!(op, BinaryOperator::LessThan | BinaryOperator::And) =>
            {
                let operand_type = ir_type(&op.operand_type());
                let left = self.lower_expression(*left, &operand_type)?;
                let right = self.lower_expression(*right, &operand_type)?;
                let op = match op {
                    BinaryOperator::LessThan => IrOperator::Lt,
                    _ => IrOperator::And,
                };
                op_cond_goto(
                    Instruction::BinaryOp {
                        left,
                        op,
                        right,
                        ty: IrType::Boolean,
                    },
                    label,
                )
            }

            NodeKind::UnaryOp {
                op: UnaryOperator::Not,
                operand,
            } => {
                let value = self.lower_expression(*operand, &IrType::Boolean)?;
                op_cond_goto(
                    Instruction::UnaryOp {
                        op: IrOperator::Not,
                        operand: value,
                        ty: IrType::Boolean,
                    },
                    label,
                )
            }

            _ => Instruction::SingleOpCondGoto {
                condition: self.lower_expression(expression, &IrType::Boolean)?,
                label: label.to_owned(),
            },
        };

        self.emit(branch);
        Ok(())
    }

    fn negate(&mut self, value: Element) -> Element {
        if let Element::Literal { value, .. } = value {
            return Element::boolean(value == 0);
        }

        let result = self.next_temp(IrType::Boolean);
        self.emit(Instruction::Assign {
            dest: result.clone(),
            ty: IrType::Boolean,
            rhs: Box::new(Instruction::UnaryOp {
                op: IrOperator::Not,
                operand: value,
                ty: IrType::Boolean,
            }),
        });
        result
    }

    // --------------------
    // Buffers and naming
    // --------------------
    pub(crate) fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn place_label(&mut self, name: String) {
        self.labels.push(IrLabel {
            name,
            position: self.instructions.len(),
        });
    }

    fn next_label_suffix(&mut self) -> usize {
        let suffix = self.label_counter;
        self.label_counter += 1;
        suffix
    }

    /// A fresh temporary that can't collide with any declared name
    pub(crate) fn next_temp(&mut self, ty: IrType) -> Element {
        loop {
            let name = format!("{}{}", TEMP_VAR_PREFIX, self.temp_counter);
            self.temp_counter += 1;

            if self.reserved_names.insert(name.clone()) {
                return Element::operand(name, ty);
            }
        }
    }
}

fn op_cond_goto(condition: Instruction, label: &str) -> Instruction {
    Instruction::OpCondGoto {
        condition: Box::new(condition),
        label: label.to_owned(),
    }
}

pub fn ir_type(ty: &Type) -> IrType {
    if ty.is_array {
        return IrType::Array(Box::new(ir_type(&ty.element_type())));
    }

    match ty.name.as_str() {
        "int" => IrType::Int32,
        "boolean" => IrType::Boolean,
        "void" => IrType::Void,
        "String" => IrType::String,
        class_name => IrType::Object(class_name.to_owned()),
    }
}

#[cfg(test)]
#[path = "tests/ir_builder_tests.rs"]
mod tests;
