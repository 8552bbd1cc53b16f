//! `.limit stack` and `.limit locals` for one method.
//!
//! The stack value is a static estimate per instruction, maximised over the method.
//! It over-approximates what the emitted code actually reaches and is never below it,
//! since every instruction starts and ends with an empty operand stack.

use crate::compiler_frontend::ir::ir_nodes::{CallKind, Element, Instruction, IrMethod};

pub fn stack_limit(method: &IrMethod) -> usize {
    method
        .instructions
        .iter()
        .map(instruction_estimate)
        .max()
        .unwrap_or(0)
}

pub fn locals_limit(method: &IrMethod) -> usize {
    method.var_table().locals_limit()
}

pub fn instruction_estimate(instruction: &Instruction) -> usize {
    match instruction {
        Instruction::Assign { dest, rhs, .. } => {
            let dest_estimate = match dest {
                Element::ArrayOperand { .. } => element_estimate(dest),
                _ => 0,
            };
            dest_estimate + instruction_estimate(rhs)
        }

        Instruction::BinaryOp { left, right, .. } => {
            element_estimate(left) + element_estimate(right)
        }

        Instruction::UnaryOp { operand, .. } => element_estimate(operand),

        Instruction::Call(call) => {
            let receiver = match call.kind {
                CallKind::InvokeStatic => 0,
                _ => element_estimate(&call.first_arg),
            };
            let arguments: usize = call.operands.iter().map(element_estimate).sum();

            // Receiver slot plus the result
            receiver.max(1) + arguments + 1
        }

        Instruction::SingleOp(element) => element_estimate(element),

        Instruction::Return { operand, .. } => operand.as_ref().map_or(0, element_estimate),

        Instruction::Goto(_) => 0,

        Instruction::OpCondGoto { condition, .. } => instruction_estimate(condition),
        Instruction::SingleOpCondGoto { condition, .. } => element_estimate(condition),

        Instruction::GetField { object, field, .. } => {
            element_estimate(object) + element_estimate(field)
        }
        Instruction::PutField {
            object,
            field,
            value,
        } => element_estimate(object) + element_estimate(field) + element_estimate(value),
    }
}

pub fn element_estimate(element: &Element) -> usize {
    match element {
        Element::Literal { .. } | Element::Operand { .. } => 1,
        Element::ArrayOperand { indexes, .. } => {
            1 + indexes.iter().map(element_estimate).sum::<usize>()
        }
    }
}
