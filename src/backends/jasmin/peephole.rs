//! Store/load elimination over finished Jasmin text.
//!
//! A `store R` directly followed by a `load R` is dropped when those two lines are the
//! only mentions of register `R` in the method. The value then stays on the stack.
//! Counting is textual and per `.method` block, and the pass runs to a fixpoint.

use crate::peephole_log;
use rustc_hash::FxHashMap;

pub fn remove_redundant_store_loads(assembly: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut method: Vec<&str> = Vec::new();
    let mut in_method = false;

    for line in assembly.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with(".method") {
            in_method = true;
        }

        if !in_method {
            out.push(line);
            continue;
        }

        method.push(line);

        if trimmed == ".end method" {
            out.extend(optimize_method(std::mem::take(&mut method)));
            in_method = false;
        }
    }

    // An unterminated method is passed through untouched
    out.extend(method);

    let mut optimized = out.join("\n");
    if assembly.ends_with('\n') {
        optimized.push('\n');
    }
    optimized
}

fn optimize_method(mut lines: Vec<&str>) -> Vec<&str> {
    loop {
        let counts = register_counts(&lines);

        let Some(index) = (0..lines.len().saturating_sub(1)).find(|&index| {
            is_redundant_pair(lines[index], lines[index + 1], &counts)
        }) else {
            return lines;
        };

        peephole_log!(Yellow "Removed ", {lines[index].trim()}, " / ", {lines[index + 1].trim()});
        lines.drain(index..index + 2);
    }
}

fn is_redundant_pair(first: &str, second: &str, counts: &FxHashMap<usize, usize>) -> bool {
    let (Some(store), Some(load)) = (register_access(first), register_access(second)) else {
        return false;
    };

    store.kind == AccessKind::Store
        && load.kind == AccessKind::Load
        && store.type_prefix == load.type_prefix
        && store.register == load.register
        && counts.get(&store.register) == Some(&2)
}

fn register_counts(lines: &[&str]) -> FxHashMap<usize, usize> {
    let mut counts = FxHashMap::default();
    for access in lines.iter().filter_map(|line| register_access(line)) {
        *counts.entry(access.register).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessKind {
    Load,
    Store,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RegisterAccess {
    kind: AccessKind,
    type_prefix: char,
    register: usize,
}

/// Reads `iload 3`, `astore 2`, `aload_0` and the like
fn register_access(line: &str) -> Option<RegisterAccess> {
    let mut words = line.split_whitespace();
    let opcode = words.next()?;

    let mut chars = opcode.chars();
    let type_prefix = chars.next()?;
    if !matches!(type_prefix, 'i' | 'a' | 'l' | 'f' | 'd') {
        return None;
    }
    let rest = chars.as_str();

    let (kind, operand) = if let Some(operand) = rest.strip_prefix("load") {
        (AccessKind::Load, operand)
    } else if let Some(operand) = rest.strip_prefix("store") {
        (AccessKind::Store, operand)
    } else {
        return None;
    };

    let register = match operand.strip_prefix('_') {
        Some(short_form) => short_form.parse().ok()?,
        None if operand.is_empty() => words.next()?.parse().ok()?,
        None => return None,
    };

    Some(RegisterAccess {
        kind,
        type_prefix,
        register,
    })
}

#[cfg(test)]
#[path = "tests/peephole_tests.rs"]
mod tests;
