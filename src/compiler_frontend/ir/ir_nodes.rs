//! ===== IR Nodes =====
//!
//! Structured form of the three-address IR.
//! The generator builds these, `ir_display` writes them out as text,
//! and `ir_parser` reads that text back into the same shapes for the backend.

use crate::compiler_frontend::ir::var_table::VarTable;
use std::cell::OnceCell;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    Int32,
    Boolean,
    Void,
    String,
    Array(Box<IrType>),

    // An instance of a class
    Object(String),

    // A class used as a namespace, e.g. the `io` in `invokestatic(io, ...)`
    Class(String),
    This,
}

impl IrType {
    pub fn int_array() -> Self {
        IrType::Array(Box::new(IrType::Int32))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, IrType::Array(_))
    }

    /// Int and boolean values live in int slots and use the `i` instructions
    pub fn is_int_like(&self) -> bool {
        matches!(self, IrType::Int32 | IrType::Boolean)
    }

    pub fn element_type(&self) -> Option<&IrType> {
        match self {
            IrType::Array(element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Int32 => write!(f, "i32"),
            IrType::Boolean => write!(f, "bool"),
            IrType::Void => write!(f, "V"),
            IrType::String => write!(f, "String"),
            IrType::Array(element) => write!(f, "array.{element}"),
            IrType::Object(name) | IrType::Class(name) => write!(f, "{name}"),
            IrType::This => write!(f, "this"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    // Booleans are 0 and 1
    Literal {
        value: i32,
        ty: IrType,
    },

    Operand {
        name: String,
        ty: IrType,

        // 1-based, written as the `$k.` prefix
        param_index: Option<usize>,
    },

    // `name[index].elementType`
    ArrayOperand {
        name: String,
        element_type: IrType,
        indexes: Vec<Element>,
        param_index: Option<usize>,
    },
}

impl Element {
    pub fn int(value: i32) -> Self {
        Element::Literal {
            value,
            ty: IrType::Int32,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Element::Literal {
            value: value as i32,
            ty: IrType::Boolean,
        }
    }

    pub fn operand(name: impl Into<String>, ty: IrType) -> Self {
        Element::Operand {
            name: name.into(),
            ty,
            param_index: None,
        }
    }

    pub fn parameter(name: impl Into<String>, ty: IrType, position: usize) -> Self {
        Element::Operand {
            name: name.into(),
            ty,
            param_index: Some(position),
        }
    }

    pub fn this() -> Self {
        Element::operand("this", IrType::This)
    }

    pub fn class_reference(name: impl Into<String>) -> Self {
        let name = name.into();
        Element::Operand {
            ty: IrType::Class(name.clone()),
            name,
            param_index: None,
        }
    }

    /// The type of the value this element produces
    pub fn ty(&self) -> &IrType {
        match self {
            Element::Literal { ty, .. } | Element::Operand { ty, .. } => ty,
            Element::ArrayOperand { element_type, .. } => element_type,
        }
    }

    /// The variable this element reads or writes, if it is one
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Element::Operand { ty, .. } if matches!(ty, IrType::Class(_) | IrType::This) => None,
            Element::Operand { name, .. } | Element::ArrayOperand { name, .. } => Some(name),
            Element::Literal { .. } => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Element::Literal { .. })
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Literal { value, ty } => write!(f, "{value}.{ty}"),

            Element::Operand { name, ty, .. } if matches!(ty, IrType::Class(_) | IrType::This) => {
                write!(f, "{name}")
            }

            Element::Operand {
                name,
                ty,
                param_index,
            } => {
                if let Some(position) = param_index {
                    write!(f, "${position}.")?;
                }
                write!(f, "{name}.{ty}")
            }

            Element::ArrayOperand {
                name,
                element_type,
                indexes,
                param_index,
            } => {
                if let Some(position) = param_index {
                    write!(f, "${position}.")?;
                }
                write!(f, "{name}")?;
                for index in indexes {
                    write!(f, "[{index}]")?;
                }
                write!(f, ".{element_type}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrOperator {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Not,
}

impl IrOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            IrOperator::Add => "+",
            IrOperator::Sub => "-",
            IrOperator::Mul => "*",
            IrOperator::Div => "/",
            IrOperator::Lt => "<",
            IrOperator::Le => "<=",
            IrOperator::Gt => ">",
            IrOperator::Ge => ">=",
            IrOperator::Eq => "==",
            IrOperator::Ne => "!=",
            IrOperator::And => "&&",
            IrOperator::Or => "||",
            IrOperator::Not => "!",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => IrOperator::Add,
            "-" => IrOperator::Sub,
            "*" => IrOperator::Mul,
            "/" => IrOperator::Div,
            "<" => IrOperator::Lt,
            "<=" => IrOperator::Le,
            ">" => IrOperator::Gt,
            ">=" => IrOperator::Ge,
            "==" => IrOperator::Eq,
            "!=" => IrOperator::Ne,
            "&&" => IrOperator::And,
            "||" => IrOperator::Or,
            "!" => IrOperator::Not,
            _ => return None,
        };
        Some(op)
    }

    /// Relational operators produce a boolean the target can't push directly
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            IrOperator::Lt
                | IrOperator::Le
                | IrOperator::Gt
                | IrOperator::Ge
                | IrOperator::Eq
                | IrOperator::Ne
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    InvokeStatic,
    InvokeVirtual,
    InvokeSpecial,
    InvokeInterface,
    New,
    NewArray,
    ArrayLength,
    Ldc,
}

impl CallKind {
    pub fn keyword(self) -> &'static str {
        match self {
            CallKind::InvokeStatic => "invokestatic",
            CallKind::InvokeVirtual => "invokevirtual",
            CallKind::InvokeSpecial => "invokespecial",
            CallKind::InvokeInterface => "invokeinterface",
            CallKind::New | CallKind::NewArray => "new",
            CallKind::ArrayLength => "arraylength",
            CallKind::Ldc => "ldc",
        }
    }

    pub fn is_invocation(self) -> bool {
        matches!(
            self,
            CallKind::InvokeStatic
                | CallKind::InvokeVirtual
                | CallKind::InvokeSpecial
                | CallKind::InvokeInterface
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInstruction {
    pub kind: CallKind,

    // The receiver or class for invocations, the class for `new`,
    // the size for `new(array, ..)` and the array for `arraylength`
    pub first_arg: Element,
    pub method: Option<String>,
    pub operands: Vec<Element>,
    pub return_type: IrType,
}

impl CallInstruction {
    pub fn invoke(
        kind: CallKind,
        first_arg: Element,
        method: impl Into<String>,
        operands: Vec<Element>,
        return_type: IrType,
    ) -> Self {
        CallInstruction {
            kind,
            first_arg,
            method: Some(method.into()),
            operands,
            return_type,
        }
    }

    pub fn simple(kind: CallKind, first_arg: Element, return_type: IrType) -> Self {
        CallInstruction {
            kind,
            first_arg,
            method: None,
            operands: Vec::new(),
            return_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Assign {
        dest: Element,
        ty: IrType,
        rhs: Box<Instruction>,
    },
    BinaryOp {
        left: Element,
        op: IrOperator,
        right: Element,
        ty: IrType,
    },
    UnaryOp {
        op: IrOperator,
        operand: Element,
        ty: IrType,
    },
    Call(CallInstruction),

    // An element used as a value on its own
    SingleOp(Element),
    Return {
        ty: IrType,
        operand: Option<Element>,
    },
    Goto(String),

    // `if (a <.bool b) goto L` or `if (!.bool a) goto L`
    OpCondGoto {
        condition: Box<Instruction>,
        label: String,
    },

    // `if (a.bool) goto L`
    SingleOpCondGoto {
        condition: Element,
        label: String,
    },
    GetField {
        object: Element,
        field: Element,
        ty: IrType,
    },
    PutField {
        object: Element,
        field: Element,
        value: Element,
    },
}

impl Instruction {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Instruction::Assign { .. } => "Assign",
            Instruction::BinaryOp { .. } => "BinaryOp",
            Instruction::UnaryOp { .. } => "UnaryOp",
            Instruction::Call(_) => "Call",
            Instruction::SingleOp(_) => "SingleOp",
            Instruction::Return { .. } => "Return",
            Instruction::Goto(_) => "Goto",
            Instruction::OpCondGoto { .. } => "OpCondGoto",
            Instruction::SingleOpCondGoto { .. } => "SingleOpCondGoto",
            Instruction::GetField { .. } => "GetField",
            Instruction::PutField { .. } => "PutField",
        }
    }

    /// The jump target, for gotos and conditional gotos
    pub fn branch_target(&self) -> Option<&str> {
        match self {
            Instruction::Goto(label)
            | Instruction::OpCondGoto { label, .. }
            | Instruction::SingleOpCondGoto { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Every value the instruction reads or writes, in the order it is written.
    /// The field of a getfield/putfield names a class member, not a value, so it is left out.
    pub fn elements(&self) -> Vec<&Element> {
        let mut elements = Vec::new();
        self.collect_elements(&mut elements);
        elements
    }

    fn collect_elements<'a>(&'a self, out: &mut Vec<&'a Element>) {
        match self {
            Instruction::Assign { dest, rhs, .. } => {
                out.push(dest);
                rhs.collect_elements(out);
            }
            Instruction::BinaryOp { left, right, .. } => {
                out.push(left);
                out.push(right);
            }
            Instruction::UnaryOp { operand, .. } => out.push(operand),
            Instruction::Call(call) => {
                out.push(&call.first_arg);
                out.extend(call.operands.iter());
            }
            Instruction::SingleOp(element) => out.push(element),
            Instruction::Return { operand, .. } => out.extend(operand.iter()),
            Instruction::Goto(_) => {}
            Instruction::OpCondGoto { condition, .. } => condition.collect_elements(out),
            Instruction::SingleOpCondGoto { condition, .. } => out.push(condition),
            Instruction::GetField { object, .. } => out.push(object),
            Instruction::PutField { object, value, .. } => {
                out.push(object);
                out.push(value);
            }
        }
    }
}

impl fmt::Display for CallInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind.keyword())?;

        match self.kind {
            CallKind::New => write!(f, "{}", class_name_of(&self.first_arg))?,
            CallKind::NewArray => write!(f, "array, {}", self.first_arg)?,
            _ => write!(f, "{}", self.first_arg)?,
        }

        if let Some(method) = &self.method {
            write!(f, ", \"{method}\"")?;
        }
        for operand in &self.operands {
            write!(f, ", {operand}")?;
        }

        write!(f, ").{}", self.return_type)
    }
}

fn class_name_of(element: &Element) -> &str {
    match element {
        Element::Operand { name, .. } | Element::ArrayOperand { name, .. } => name,
        Element::Literal { .. } => "",
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { dest, ty, rhs } => write!(f, "{dest} :=.{ty} {rhs}"),
            Instruction::BinaryOp {
                left,
                op,
                right,
                ty,
            } => write!(f, "{left} {}.{ty} {right}", op.symbol()),
            Instruction::UnaryOp { op, operand, ty } => write!(f, "{}.{ty} {operand}", op.symbol()),
            Instruction::Call(call) => write!(f, "{call}"),
            Instruction::SingleOp(element) => write!(f, "{element}"),
            Instruction::Return { ty, operand } => match operand {
                Some(operand) => write!(f, "ret.{ty} {operand}"),
                None => write!(f, "ret.{ty}"),
            },
            Instruction::Goto(label) => write!(f, "goto {label}"),
            Instruction::OpCondGoto { condition, label } => {
                write!(f, "if ({condition}) goto {label}")
            }
            Instruction::SingleOpCondGoto { condition, label } => {
                write!(f, "if ({condition}) goto {label}")
            }
            Instruction::GetField { object, field, ty } => {
                write!(f, "getfield({object}, {field}).{ty}")
            }
            Instruction::PutField {
                object,
                field,
                value,
            } => write!(f, "putfield({object}, {field}, {value}).V"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrField {
    pub name: String,
    pub ty: IrType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrLabel {
    pub name: String,

    // Index of the instruction the label sits in front of
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct IrMethod {
    pub name: String,
    pub is_static: bool,
    pub is_constructor: bool,
    pub params: Vec<IrField>,
    pub return_type: IrType,
    pub instructions: Vec<Instruction>,

    // In definition order
    pub labels: Vec<IrLabel>,

    var_table: OnceCell<VarTable>,
}

impl IrMethod {
    pub fn new(name: impl Into<String>, return_type: IrType) -> Self {
        IrMethod {
            name: name.into(),
            is_static: false,
            is_constructor: false,
            params: Vec::new(),
            return_type,
            instructions: Vec::new(),
            labels: Vec::new(),
            var_table: OnceCell::new(),
        }
    }

    pub fn label_position(&self, name: &str) -> Option<usize> {
        self.labels
            .iter()
            .find(|label| label.name == name)
            .map(|label| label.position)
    }

    pub fn labels_at(&self, position: usize) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .filter(move |label| label.position == position)
            .map(|label| label.name.as_str())
    }

    /// Built on first use and kept for the lifetime of the method
    pub fn var_table(&self) -> &VarTable {
        self.var_table.get_or_init(|| VarTable::build(self))
    }
}

impl PartialEq for IrMethod {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.is_static == other.is_static
            && self.is_constructor == other.is_constructor
            && self.params == other.params
            && self.return_type == other.return_type
            && self.instructions == other.instructions
            && self.labels == other.labels
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IrClass {
    pub name: String,
    pub superclass: Option<String>,

    // Dotted paths, as written in the source
    pub imports: Vec<String>,
    pub fields: Vec<IrField>,
    pub methods: Vec<IrMethod>,
}
