//! JSON input boundary.
//!
//! The external parser hands over a nested tree of `{ "kind", "children", ...attributes }`
//! objects. This module deserialises that and lowers it into the typed arena,
//! reporting every malformed node it finds rather than stopping at the first one.

use crate::compiler_frontend::ast::ast::Ast;
use crate::compiler_frontend::ast::ast_nodes::{
    BinaryOperator, LiteralValue, NewTarget, NodeId, NodeKind, TextLocation, UnaryOperator,
};
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::compiler_frontend::datatypes::Type;
use crate::return_syntax_error;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SyntaxNode {
    pub kind: String,

    #[serde(default)]
    pub children: Vec<SyntaxNode>,

    #[serde(flatten)]
    pub attributes: FxHashMap<String, Value>,
}

impl SyntaxNode {
    pub fn new(kind: &str) -> Self {
        SyntaxNode {
            kind: kind.to_string(),
            children: Vec::new(),
            attributes: FxHashMap::default(),
        }
    }

    pub fn attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.attributes.get(key)? {
            Value::String(value) => Some(value.to_owned()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> bool {
        match self.attributes.get(key) {
            Some(Value::Bool(value)) => *value,
            Some(Value::String(value)) => value == "true",
            _ => false,
        }
    }

    pub fn get_i32(&self, key: &str) -> Option<i32> {
        match self.attributes.get(key)? {
            Value::Number(value) => value.as_i64().and_then(|n| i32::try_from(n).ok()),
            Value::String(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    fn location(&self) -> TextLocation {
        TextLocation::at(
            self.get_i32("line").unwrap_or_default(),
            self.get_i32("col").unwrap_or_default(),
        )
    }
}

pub fn parse_syntax_tree(json: &str, path: &Path) -> Result<SyntaxNode, CompilerError> {
    serde_json::from_str(json).map_err(|e| {
        CompilerError::new_syntax_error(
            format!("AST file is not a valid syntax tree: {e}"),
            TextLocation::at(e.line() as i32, e.column() as i32),
        )
        .with_file_path(path.to_path_buf())
    })
}

impl Ast {
    /// Lowers the parser's tree into the arena.
    /// Shape problems are all collected; the AST is only returned if there were none.
    pub fn from_syntax_tree(root: &SyntaxNode) -> Result<Ast, Vec<CompilerError>> {
        let mut lowering = SyntaxTreeLowering {
            ast: Ast::new(),
            errors: Vec::new(),
        };

        if let Some(source) = root.get_str("source") {
            lowering.ast.source_path = PathBuf::from(source);
        }

        let root_id = lowering.lower_root(root);

        match root_id {
            Some(root_id) if lowering.errors.is_empty() => {
                lowering.ast.set_root(root_id);
                Ok(lowering.ast)
            }
            _ => Err(lowering.errors),
        }
    }
}

struct SyntaxTreeLowering {
    ast: Ast,
    errors: Vec<CompilerError>,
}

impl SyntaxTreeLowering {
    fn lower_root(&mut self, root: &SyntaxNode) -> Option<NodeId> {
        match root.kind.as_str() {
            "Program" | "Start" => {
                let mut imports = Vec::new();
                let mut class = None;

                for child in &root.children {
                    match child.kind.as_str() {
                        "ImportDeclaration" | "ImportDec" => {
                            let import = lower_import(&mut self.ast, child);
                            if let Some(id) = self.record(import) {
                                imports.push(id);
                            }
                        }
                        "ClassDeclaration" if class.is_none() => {
                            class = self.lower_class(child);
                        }
                        other => self.errors.push(CompilerError::new_syntax_error(
                            format!("Unexpected '{other}' at the top level of the program"),
                            child.location(),
                        )),
                    }
                }

                let Some(class) = class else {
                    self.errors.push(CompilerError::new_syntax_error(
                        "Program has no class declaration",
                        root.location(),
                    ));
                    return None;
                };

                Some(
                    self.ast
                        .push(NodeKind::Program { imports, class }, root.location()),
                )
            }

            "ClassDeclaration" => {
                let class = self.lower_class(root)?;
                Some(self.ast.push(
                    NodeKind::Program {
                        imports: Vec::new(),
                        class,
                    },
                    root.location(),
                ))
            }

            other => {
                self.errors.push(CompilerError::new_syntax_error(
                    format!("AST root must be a Program, found '{other}'"),
                    root.location(),
                ));
                None
            }
        }
    }

    fn record(&mut self, result: Result<NodeId, CompilerError>) -> Option<NodeId> {
        match result {
            Ok(id) => Some(id),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    fn lower_class(&mut self, node: &SyntaxNode) -> Option<NodeId> {
        let Some(name) = node.get_str("name") else {
            self.errors.push(missing_attribute(node, "name"));
            return None;
        };

        let mut inheritance = None;
        let mut fields = Vec::new();
        let mut methods = Vec::new();

        for child in &node.children {
            match child.kind.as_str() {
                "Inheritance" | "Extends" => {
                    if inheritance.is_some() {
                        self.errors.push(CompilerError::new_syntax_error(
                            format!("Class '{name}' can only extend one class"),
                            child.location(),
                        ));
                        continue;
                    }
                    let Some(superclass) = child.get_str("name") else {
                        self.errors.push(missing_attribute(child, "name"));
                        continue;
                    };
                    inheritance = Some(
                        self.ast
                            .push(NodeKind::Inheritance { superclass }, child.location()),
                    );
                }
                "VarDeclaration" => {
                    let field = lower_declaration(&mut self.ast, child, false);
                    if let Some(id) = self.record(field) {
                        fields.push(id);
                    }
                }
                "MainMethod" | "InstanceMethod" => {
                    if let Some(id) = self.lower_method(child) {
                        methods.push(id);
                    }
                }
                other => self.errors.push(CompilerError::new_syntax_error(
                    format!("Unexpected '{other}' in the body of class '{name}'"),
                    child.location(),
                )),
            }
        }

        Some(self.ast.push(
            NodeKind::ClassDeclaration {
                name,
                inheritance,
                fields,
                methods,
            },
            node.location(),
        ))
    }

    fn lower_method(&mut self, node: &SyntaxNode) -> Option<NodeId> {
        let mut params = Vec::new();
        let mut locals = Vec::new();
        let mut body = Vec::new();

        for child in &node.children {
            match child.kind.as_str() {
                "Argument" | "MainArguments" if node.kind == "InstanceMethod" => {
                    let param = lower_declaration(&mut self.ast, child, true);
                    if let Some(id) = self.record(param) {
                        params.push(id);
                    }
                }
                // main's parameter is fixed, the node only carries its name
                "MainArguments" => {}
                "VarDeclaration" => {
                    let local = lower_declaration(&mut self.ast, child, false);
                    if let Some(id) = self.record(local) {
                        locals.push(id);
                    }
                }
                _ => self.lower_statements_into(child, &mut body),
            }
        }

        let kind = if node.kind == "MainMethod" {
            let args_name = node
                .get_str("args")
                .or_else(|| {
                    node.children
                        .iter()
                        .find(|child| child.kind == "MainArguments")
                        .and_then(|child| child.get_str("name"))
                })
                .unwrap_or_else(|| String::from("args"));

            NodeKind::MainMethod {
                args_name,
                locals,
                body,
            }
        } else {
            let Some(name) = node.get_str("name") else {
                self.errors.push(missing_attribute(node, "name"));
                return None;
            };
            let Some(return_type) = read_type(node) else {
                self.errors.push(missing_attribute(node, "type"));
                return None;
            };

            NodeKind::InstanceMethod {
                name,
                return_type,
                params,
                locals,
                body,
            }
        };

        Some(self.ast.push(kind, node.location()))
    }

    /// Blocks are flattened: `{ a; b; }` contributes `a` and `b` to the enclosing list
    fn lower_statements_into(&mut self, node: &SyntaxNode, out: &mut Vec<NodeId>) {
        if is_block(node) {
            for child in &node.children {
                self.lower_statements_into(child, out);
            }
            return;
        }

        if let Some(id) = self.lower_expression(node) {
            out.push(id);
        }
    }

    fn lower_body(&mut self, node: Option<&SyntaxNode>) -> Vec<NodeId> {
        let mut body = Vec::new();
        if let Some(node) = node {
            self.lower_statements_into(node, &mut body);
        }
        body
    }

    fn lower_children(&mut self, node: &SyntaxNode, expected: usize) -> Option<Vec<NodeId>> {
        if node.children.len() != expected {
            self.errors.push(CompilerError::new_syntax_error(
                format!(
                    "{} expects {} children, found {}",
                    node.kind,
                    expected,
                    node.children.len()
                ),
                node.location(),
            ));
            return None;
        }

        let mut ids = Vec::with_capacity(expected);
        for child in &node.children {
            ids.push(self.lower_expression(child));
        }

        ids.into_iter().collect()
    }

    /// Statements and expressions share one lowering, the checker decides what is allowed where
    fn lower_expression(&mut self, node: &SyntaxNode) -> Option<NodeId> {
        let location = node.location();

        let kind = match node.kind.as_str() {
            "Identifier" => {
                let Some(name) = node.get_str("name") else {
                    self.errors.push(missing_attribute(node, "name"));
                    return None;
                };
                NodeKind::Identifier { name }
            }

            "Literal" => {
                let value = self.record_literal(node)?;
                NodeKind::Literal { value }
            }

            "ThisT" | "This" => NodeKind::ThisT,

            "BinOp" => {
                let op_name = node.get_str("op").unwrap_or_default();
                let Some(op) = BinaryOperator::from_attribute(&op_name) else {
                    self.errors.push(CompilerError::new_syntax_error(
                        format!("Unknown binary operator '{op_name}'"),
                        location,
                    ));
                    return None;
                };
                let children = self.lower_children(node, 2)?;
                NodeKind::BinOp {
                    op,
                    left: children[0],
                    right: children[1],
                }
            }

            "UnaryOp" => {
                let op_name = node.get_str("op").unwrap_or_default();
                let Some(op) = UnaryOperator::from_attribute(&op_name) else {
                    self.errors.push(CompilerError::new_syntax_error(
                        format!("Unknown unary operator '{op_name}'"),
                        location,
                    ));
                    return None;
                };
                let children = self.lower_children(node, 1)?;
                NodeKind::UnaryOp {
                    op,
                    operand: children[0],
                }
            }

            "CallExpression" => {
                let Some(method) = node.get_str("method").or_else(|| node.get_str("name")) else {
                    self.errors.push(missing_attribute(node, "method"));
                    return None;
                };

                let mut receiver_nodes = Vec::new();
                let mut argument_node = None;
                for child in &node.children {
                    if child.kind == "Arguments" && argument_node.is_none() {
                        argument_node = Some(child);
                    } else {
                        receiver_nodes.push(child);
                    }
                }

                if receiver_nodes.len() > 1 {
                    self.errors.push(CompilerError::new_syntax_error(
                        format!("Call to '{method}' has more than one receiver"),
                        location,
                    ));
                    return None;
                }

                let receiver = match receiver_nodes.first() {
                    Some(receiver) => Some(self.lower_expression(receiver)?),
                    None => None,
                };

                let arguments = match argument_node {
                    Some(arguments) => self.lower_expression(arguments)?,
                    None => self.ast.push(
                        NodeKind::Arguments { values: Vec::new() },
                        location.clone(),
                    ),
                };

                NodeKind::CallExpression {
                    receiver,
                    method,
                    arguments,
                }
            }

            "Arguments" => {
                let values = self.lower_children(node, node.children.len())?;
                NodeKind::Arguments { values }
            }

            "Index" | "Array" | "ArrayAccess" => {
                let children = self.lower_children(node, 2)?;
                NodeKind::Index {
                    array: children[0],
                    index: children[1],
                }
            }

            "NewExp" => {
                let is_array = node.get_bool("array") || !node.children.is_empty();
                if is_array {
                    let children = self.lower_children(node, 1)?;
                    NodeKind::NewExp {
                        target: NewTarget::IntArray { size: children[0] },
                    }
                } else {
                    let Some(class_name) = node.get_str("type").or_else(|| node.get_str("name"))
                    else {
                        self.errors.push(missing_attribute(node, "type"));
                        return None;
                    };
                    NodeKind::NewExp {
                        target: NewTarget::Object(class_name),
                    }
                }
            }

            "AssignmentStatement" | "Assignment" => {
                let children = self.lower_children(node, 2)?;
                NodeKind::AssignmentStatement {
                    target: children[0],
                    value: children[1],
                }
            }

            "IfStatement" => {
                if node.children.len() < 2 || node.children.len() > 3 {
                    self.errors.push(CompilerError::new_syntax_error(
                        format!(
                            "IfStatement expects a condition, a body and an optional else, found {} children",
                            node.children.len()
                        ),
                        location,
                    ));
                    return None;
                }

                let condition = self.lower_condition(&node.children[0], true)?;
                let then_body = self.lower_body(node.children.get(1));
                let else_body = self.lower_body(node.children.get(2));

                NodeKind::IfStatement {
                    condition,
                    then_body,
                    else_body,
                }
            }

            "WhileStatement" => {
                if node.children.is_empty() || node.children.len() > 2 {
                    self.errors.push(CompilerError::new_syntax_error(
                        format!(
                            "WhileStatement expects a condition and a body, found {} children",
                            node.children.len()
                        ),
                        location,
                    ));
                    return None;
                }

                let condition = self.lower_condition(&node.children[0], false)?;
                let body = self.lower_body(node.children.get(1));

                NodeKind::WhileStatement { condition, body }
            }

            "IfCondition" | "WhileCondition" => {
                return self.lower_condition(node, node.kind == "IfCondition");
            }

            other => {
                self.errors.push(CompilerError::new_syntax_error(
                    format!("Unknown or misplaced AST node '{other}'"),
                    location,
                ));
                return None;
            }
        };

        Some(self.ast.push(kind, location))
    }

    /// Accepts both a wrapped condition node and a bare expression
    fn lower_condition(&mut self, node: &SyntaxNode, is_if: bool) -> Option<NodeId> {
        let location = node.location();

        let expression = if node.kind == "IfCondition" || node.kind == "WhileCondition" {
            let children = self.lower_children(node, 1)?;
            children[0]
        } else {
            self.lower_expression(node)?
        };

        let kind = if is_if {
            NodeKind::IfCondition { expression }
        } else {
            NodeKind::WhileCondition { expression }
        };

        Some(self.ast.push(kind, location))
    }

    fn record_literal(&mut self, node: &SyntaxNode) -> Option<LiteralValue> {
        match lower_literal(node) {
            Ok(value) => Some(value),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }
}

fn is_block(node: &SyntaxNode) -> bool {
    matches!(
        node.kind.as_str(),
        "Block" | "Body" | "Then" | "Else" | "ElseStatement" | "Statements"
    )
}

fn missing_attribute(node: &SyntaxNode, attribute: &str) -> CompilerError {
    CompilerError::new_syntax_error(
        format!("{} node is missing its '{}' attribute", node.kind, attribute),
        node.location(),
    )
}

/// `type` plus `array`, or a `type` written as `int[]`
fn read_type(node: &SyntaxNode) -> Option<Type> {
    let written = node.get_str("type")?;

    match written.strip_suffix("[]") {
        Some(base) => Some(Type::new(base.trim(), true)),
        None => Some(Type::new(written, node.get_bool("array"))),
    }
}

fn lower_import(ast: &mut Ast, node: &SyntaxNode) -> Result<NodeId, CompilerError> {
    let segments: Vec<String> = match node.get_str("path") {
        Some(path) => path.split('.').map(str::to_string).collect(),
        None => {
            let mut segments = Vec::new();
            collect_import_segments(node, &mut segments);
            segments
        }
    };

    if segments.is_empty() || segments.iter().any(|segment| segment.is_empty()) {
        return_syntax_error!("Import has no usable path", node.location());
    }

    Ok(ast.push(NodeKind::ImportDeclaration { segments }, node.location()))
}

// Parsers nest the trailing segments, so walk the whole subtree in document order
fn collect_import_segments(node: &SyntaxNode, segments: &mut Vec<String>) {
    let is_import_node = node.kind == "ImportDeclaration" || node.kind == "ImportDec";
    if !is_import_node {
        if let Some(name) = node.get_str("name") {
            segments.push(name);
        }
    }

    for child in &node.children {
        collect_import_segments(child, segments);
    }
}

fn lower_declaration(
    ast: &mut Ast,
    node: &SyntaxNode,
    is_parameter: bool,
) -> Result<NodeId, CompilerError> {
    let Some(name) = node.get_str("name") else {
        return Err(missing_attribute(node, "name"));
    };
    let Some(ty) = read_type(node) else {
        return Err(missing_attribute(node, "type"));
    };

    let kind = if is_parameter {
        NodeKind::Argument { ty, name }
    } else {
        NodeKind::VarDeclaration { ty, name }
    };

    Ok(ast.push(kind, node.location()))
}

fn lower_literal(node: &SyntaxNode) -> Result<LiteralValue, CompilerError> {
    let raw = node.get_str("value").unwrap_or_default();
    let literal_type = node.get_str("type").unwrap_or_else(|| {
        if raw == "true" || raw == "false" {
            String::from("boolean")
        } else {
            String::from("int")
        }
    });

    match literal_type.as_str() {
        "boolean" => match raw.as_str() {
            "true" => Ok(LiteralValue::Boolean(true)),
            "false" => Ok(LiteralValue::Boolean(false)),
            _ => return_syntax_error!(
                format!("'{raw}' is not a boolean literal"),
                node.location()
            ),
        },
        "int" => match raw.trim().parse::<i32>() {
            Ok(value) => Ok(LiteralValue::Int(value)),
            Err(_) => return_syntax_error!(
                format!("Integer literal '{raw}' is out of range or malformed"),
                node.location()
            ),
        },
        other => return_syntax_error!(
            format!("Unknown literal type '{other}'"),
            node.location()
        ),
    }
}

#[cfg(test)]
#[path = "tests/syntax_tree_tests.rs"]
mod tests;
