//! ===== AST Nodes =====
//!
//! One variant per node kind the external parser produces, with the node's attributes
//! as typed fields and its children as arena indices.

use crate::compiler_frontend::datatypes::Type;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharPosition {
    pub line_number: i32,
    pub char_column: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLocation {
    pub scope: PathBuf,
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl TextLocation {
    pub fn new(scope: PathBuf, start_pos: CharPosition, end_pos: CharPosition) -> Self {
        TextLocation {
            scope,
            start_pos,
            end_pos,
        }
    }

    pub fn new_just_line(line: i32) -> Self {
        TextLocation::at(line, 1)
    }

    pub fn at(line: i32, column: i32) -> Self {
        let position = CharPosition {
            line_number: line,
            char_column: column,
        };

        TextLocation {
            scope: PathBuf::new(),
            start_pos: position,
            end_pos: position,
        }
    }

    pub fn new_file(path: &Path) -> Self {
        TextLocation {
            scope: path.to_path_buf(),
            start_pos: CharPosition::default(),
            end_pos: CharPosition::default(),
        }
    }

    pub fn line(&self) -> i32 {
        self.start_pos.line_number
    }

    pub fn column(&self) -> i32 {
        self.start_pos.char_column
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    LessThan,
    And,
}

impl BinaryOperator {
    pub fn from_attribute(op: &str) -> Option<Self> {
        match op {
            "add" | "+" => Some(BinaryOperator::Add),
            "sub" | "-" => Some(BinaryOperator::Sub),
            "mult" | "mul" | "*" => Some(BinaryOperator::Mul),
            "div" | "/" => Some(BinaryOperator::Div),
            "lt" | "<" => Some(BinaryOperator::LessThan),
            "and" | "&&" => Some(BinaryOperator::And),
            _ => None,
        }
    }

    /// The name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            BinaryOperator::Add => "add",
            BinaryOperator::Sub => "sub",
            BinaryOperator::Mul => "mult",
            BinaryOperator::Div => "div",
            BinaryOperator::LessThan => "lt",
            BinaryOperator::And => "and",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::LessThan => "<",
            BinaryOperator::And => "&&",
        }
    }

    /// Both operands must have this type
    pub fn operand_type(self) -> Type {
        match self {
            BinaryOperator::And => Type::boolean(),
            _ => Type::int(),
        }
    }

    pub fn result_type(self) -> Type {
        match self {
            BinaryOperator::LessThan | BinaryOperator::And => Type::boolean(),
            _ => Type::int(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Length,
    Return,
}

impl UnaryOperator {
    pub fn from_attribute(op: &str) -> Option<Self> {
        match op {
            "not" | "!" => Some(UnaryOperator::Not),
            "length" => Some(UnaryOperator::Length),
            "return" => Some(UnaryOperator::Return),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UnaryOperator::Not => "not",
            UnaryOperator::Length => "length",
            UnaryOperator::Return => "return",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralValue {
    Int(i32),
    Boolean(bool),
}

impl LiteralValue {
    pub fn ty(&self) -> Type {
        match self {
            LiteralValue::Int(_) => Type::int(),
            LiteralValue::Boolean(_) => Type::boolean(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewTarget {
    Object(String),
    IntArray { size: NodeId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Program {
        imports: Vec<NodeId>,
        class: NodeId,
    },
    ImportDeclaration {
        segments: Vec<String>,
    },
    ClassDeclaration {
        name: String,
        inheritance: Option<NodeId>,
        fields: Vec<NodeId>,
        methods: Vec<NodeId>,
    },
    Inheritance {
        superclass: String,
    },
    VarDeclaration {
        ty: Type,
        name: String,
    },
    MainMethod {
        args_name: String,
        locals: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    InstanceMethod {
        name: String,
        return_type: Type,
        params: Vec<NodeId>,
        locals: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    Argument {
        ty: Type,
        name: String,
    },
    Identifier {
        name: String,
    },
    Literal {
        value: LiteralValue,
    },
    BinOp {
        op: BinaryOperator,
        left: NodeId,
        right: NodeId,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: NodeId,
    },

    // No receiver means a bare `method(...)` call
    CallExpression {
        receiver: Option<NodeId>,
        method: String,
        arguments: NodeId,
    },
    Arguments {
        values: Vec<NodeId>,
    },
    Index {
        array: NodeId,
        index: NodeId,
    },
    NewExp {
        target: NewTarget,
    },
    AssignmentStatement {
        target: NodeId,
        value: NodeId,
    },
    IfStatement {
        condition: NodeId,
        then_body: Vec<NodeId>,
        else_body: Vec<NodeId>,
    },
    IfCondition {
        expression: NodeId,
    },
    WhileStatement {
        condition: NodeId,
        body: Vec<NodeId>,
    },
    WhileCondition {
        expression: NodeId,
    },
    ThisT,
}

impl NodeKind {
    /// Children in document order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Program { imports, class } => {
                let mut children = imports.clone();
                children.push(*class);
                children
            }
            NodeKind::ClassDeclaration {
                inheritance,
                fields,
                methods,
                ..
            } => inheritance
                .iter()
                .chain(fields.iter())
                .chain(methods.iter())
                .copied()
                .collect(),
            NodeKind::MainMethod { locals, body, .. } => {
                locals.iter().chain(body.iter()).copied().collect()
            }
            NodeKind::InstanceMethod {
                params,
                locals,
                body,
                ..
            } => params
                .iter()
                .chain(locals.iter())
                .chain(body.iter())
                .copied()
                .collect(),
            NodeKind::BinOp { left, right, .. } => vec![*left, *right],
            NodeKind::UnaryOp { operand, .. } => vec![*operand],
            NodeKind::CallExpression {
                receiver,
                arguments,
                ..
            } => receiver.iter().copied().chain([*arguments]).collect(),
            NodeKind::Arguments { values } => values.clone(),
            NodeKind::Index { array, index } => vec![*array, *index],
            NodeKind::NewExp {
                target: NewTarget::IntArray { size },
            } => vec![*size],
            NodeKind::AssignmentStatement { target, value } => vec![*target, *value],
            NodeKind::IfStatement {
                condition,
                then_body,
                else_body,
            } => std::iter::once(*condition)
                .chain(then_body.iter().copied())
                .chain(else_body.iter().copied())
                .collect(),
            NodeKind::IfCondition { expression } | NodeKind::WhileCondition { expression } => {
                vec![*expression]
            }
            NodeKind::WhileStatement { condition, body } => std::iter::once(*condition)
                .chain(body.iter().copied())
                .collect(),
            NodeKind::ImportDeclaration { .. }
            | NodeKind::Inheritance { .. }
            | NodeKind::VarDeclaration { .. }
            | NodeKind::Argument { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::Literal { .. }
            | NodeKind::NewExp {
                target: NewTarget::Object(_),
            }
            | NodeKind::ThisT => Vec::new(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
            NodeKind::ClassDeclaration { .. } => "ClassDeclaration",
            NodeKind::Inheritance { .. } => "Inheritance",
            NodeKind::VarDeclaration { .. } => "VarDeclaration",
            NodeKind::MainMethod { .. } => "MainMethod",
            NodeKind::InstanceMethod { .. } => "InstanceMethod",
            NodeKind::Argument { .. } => "Argument",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::BinOp { .. } => "BinOp",
            NodeKind::UnaryOp { .. } => "UnaryOp",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::Arguments { .. } => "Arguments",
            NodeKind::Index { .. } => "Index",
            NodeKind::NewExp { .. } => "NewExp",
            NodeKind::AssignmentStatement { .. } => "AssignmentStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::IfCondition { .. } => "IfCondition",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::WhileCondition { .. } => "WhileCondition",
            NodeKind::ThisT => "ThisT",
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(
            self,
            NodeKind::MainMethod { .. } | NodeKind::InstanceMethod { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub location: TextLocation,
}
