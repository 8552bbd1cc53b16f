//! Successor edges between the instructions of one method.
//! Labels are resolved to instruction positions, so an edge is just an index.

use crate::compiler_frontend::compiler_messages::compiler_errors::{
    CompilationStage, CompilerError,
};
use crate::compiler_frontend::ir::ir_nodes::{Instruction, IrMethod};
use crate::return_compiler_error;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFlowGraph {
    successors: Vec<Vec<usize>>,

    // Position one past the last instruction. An edge to it falls off the end of the method.
    exit: usize,
}

impl ControlFlowGraph {
    pub fn build(method: &IrMethod) -> Result<Self, CompilerError> {
        let exit = method.instructions.len();
        let mut successors = Vec::with_capacity(exit);

        for (index, instruction) in method.instructions.iter().enumerate() {
            let next = index + 1;

            let edges = match instruction {
                Instruction::Return { .. } => Vec::new(),
                Instruction::Goto(label) => vec![resolve_label(method, label)?],
                Instruction::OpCondGoto { label, .. }
                | Instruction::SingleOpCondGoto { label, .. } => {
                    vec![next, resolve_label(method, label)?]
                }
                _ => vec![next],
            };

            successors.push(edges);
        }

        Ok(ControlFlowGraph { successors, exit })
    }

    pub fn successors(&self, index: usize) -> &[usize] {
        self.successors
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Instruction positions reachable from the entry, in visiting order
    pub fn reachable(&self) -> Vec<usize> {
        let mut order = Vec::new();
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([0]);

        while let Some(index) = queue.pop_front() {
            if index >= self.exit || !visited.insert(index) {
                continue;
            }

            order.push(index);
            queue.extend(self.successors(index).iter().copied());
        }

        order
    }

    /// True if some reachable path runs past the last instruction without returning
    pub fn falls_off_end(&self) -> bool {
        if self.exit == 0 {
            return true;
        }

        self.reachable()
            .into_iter()
            .any(|index| self.successors(index).contains(&self.exit))
    }
}

fn resolve_label(method: &IrMethod, label: &str) -> Result<usize, CompilerError> {
    match method.label_position(label) {
        Some(position) => Ok(position),
        None => return_compiler_error!(
            CompilationStage::IrParsing,
            "Label '{}' is not defined in method '{}'",
            label,
            method.name
        ),
    }
}
