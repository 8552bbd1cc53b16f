//! Semantic Checker
//!
//! Walks the AST once and type-checks expressions, statements, assignments and calls
//! against the symbol table. Sub-expressions are typed before the operator that uses them,
//! and every inferred type is memoized per node so each node is judged exactly once.
//!
//! Never aborts early: every problem is recorded and the walk continues.
//! A node whose type could not be determined is marked invalid so its parents stay quiet,
//! which keeps one mistake down to one diagnostic.

use crate::checker_log;
use crate::compiler_frontend::analysis::name_resolution::{Resolution, Scope};
use crate::compiler_frontend::ast::ast::Ast;
use crate::compiler_frontend::ast::ast_nodes::{
    BinaryOperator, NewTarget, NodeId, NodeKind, TextLocation, UnaryOperator,
};
use crate::compiler_frontend::compiler_messages::compiler_errors::{
    CompilerError, CompilerMessages,
};
use crate::compiler_frontend::compiler_messages::compiler_warnings::{
    CompilerWarning, WarningKind,
};
use crate::compiler_frontend::datatypes::Type;
use crate::compiler_frontend::symbol_table::{MethodSignature, SymbolTable};
use rustc_hash::{FxHashMap, FxHashSet};

pub fn check_semantics(ast: &Ast, table: &SymbolTable) -> CompilerMessages {
    let mut checker = SemanticChecker::new(ast, table);

    if let Some(root) = ast.root() {
        checker.check_node(root);
    }

    checker.report_unused_declarations();
    checker.messages
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprType {
    Known(Type),

    // Value returned by a member of an external class.
    // It adopts whatever type its context needs.
    Unknown,

    // Already reported
    Invalid,
}

impl ExprType {
    pub fn is_invalid(&self) -> bool {
        matches!(self, ExprType::Invalid)
    }

    fn known_or(&self, fallback: &Type) -> Type {
        match self {
            ExprType::Known(ty) => ty.to_owned(),
            _ => fallback.to_owned(),
        }
    }
}

/// How a call's receiver was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallReceiver {
    OwnClass,
    External,
    Other,
}

pub struct SemanticChecker<'a> {
    ast: &'a Ast,
    table: &'a SymbolTable,

    // === Memoized per-node results ===
    expression_types: FxHashMap<NodeId, ExprType>,
    call_receivers: FxHashMap<NodeId, CallReceiver>,

    // === Assignment line heuristic ===
    // (method, variable) -> smallest line with an assignment to it
    first_assignment_lines: FxHashMap<(NodeId, String), i32>,
    reported_unassigned: FxHashSet<(NodeId, String)>,

    // === Usage tracking for warnings ===
    read_variables: FxHashSet<(NodeId, String)>,
    used_classes: FxHashSet<String>,

    messages: CompilerMessages,
}

impl<'a> SemanticChecker<'a> {
    pub fn new(ast: &'a Ast, table: &'a SymbolTable) -> Self {
        let mut first_assignment_lines: FxHashMap<(NodeId, String), i32> = FxHashMap::default();

        for id in ast.ids() {
            let NodeKind::AssignmentStatement { target, .. } = ast.kind(id) else {
                continue;
            };
            let NodeKind::Identifier { name } = ast.kind(*target) else {
                continue;
            };
            let Some(method) = ast.enclosing_method(id) else {
                continue;
            };

            let line = ast.location(id).line();
            first_assignment_lines
                .entry((method, name.to_owned()))
                .and_modify(|first| *first = (*first).min(line))
                .or_insert(line);
        }

        SemanticChecker {
            ast,
            table,
            expression_types: FxHashMap::default(),
            call_receivers: FxHashMap::default(),
            first_assignment_lines,
            reported_unassigned: FxHashSet::default(),
            read_variables: FxHashSet::default(),
            used_classes: FxHashSet::default(),
            messages: CompilerMessages::new(),
        }
    }

    /// Types inferred so far, by node
    pub fn expression_types(&self) -> &FxHashMap<NodeId, ExprType> {
        &self.expression_types
    }

    // --------------------
    // Declarations
    // --------------------
    pub fn check_node(&mut self, id: NodeId) {
        let ast = self.ast;

        match ast.kind(id) {
            NodeKind::Program { class, .. } => self.check_node(*class),

            NodeKind::ClassDeclaration {
                inheritance,
                fields,
                methods,
                ..
            } => {
                if let Some(inheritance) = inheritance {
                    self.check_superclass(*inheritance);
                }
                for field in fields {
                    self.check_declared_type(*field);
                }
                for method in methods {
                    self.check_node(*method);
                }
            }

            NodeKind::MainMethod { locals, body, .. } => {
                for local in locals {
                    self.check_declared_type(*local);
                }
                for statement in body {
                    self.check_statement(*statement);
                }
            }

            NodeKind::InstanceMethod {
                name,
                return_type,
                params,
                locals,
                body,
            } => {
                self.check_type_exists(return_type, ast.location(id));
                for declaration in params.iter().chain(locals.iter()) {
                    self.check_declared_type(*declaration);
                }
                for statement in body {
                    self.check_statement(*statement);
                }

                let ends_with_return = body.last().is_some_and(|last| {
                    matches!(
                        ast.kind(*last),
                        NodeKind::UnaryOp {
                            op: UnaryOperator::Return,
                            ..
                        }
                    )
                });

                if !return_type.is_void() && !ends_with_return {
                    self.report(CompilerError::new_rule_error(
                        format!("Method '{name}' must end with a return statement"),
                        ast.location(id).to_owned(),
                    ));
                }
            }

            _ => self.check_statement(id),
        }
    }

    fn check_superclass(&mut self, inheritance: NodeId) {
        let NodeKind::Inheritance { superclass } = self.ast.kind(inheritance) else {
            return;
        };

        self.used_classes.insert(superclass.to_owned());

        if self.table.import_named(superclass).is_none() {
            self.report(CompilerError::new_resolution_error(
                format!("Superclass '{superclass}' is not imported"),
                self.ast.location(inheritance).to_owned(),
            ));
        }
    }

    fn check_declared_type(&mut self, declaration: NodeId) {
        let ast = self.ast;
        match ast.kind(declaration) {
            NodeKind::VarDeclaration { ty, .. } | NodeKind::Argument { ty, .. } => {
                self.check_type_exists(ty, ast.location(declaration));
            }
            _ => {}
        }
    }

    fn check_type_exists(&mut self, ty: &Type, location: &TextLocation) {
        if ty.is_builtin_base() {
            return;
        }

        self.used_classes.insert(ty.name.to_owned());

        if !self.table.is_known_class(&ty.name) {
            self.report(CompilerError::new_resolution_error(
                format!(
                    "Unknown type '{}'. Classes must be imported before they are used",
                    ty.name
                ),
                location.to_owned(),
            ));
        }
    }

    // --------------------
    // Statements
    // --------------------
    fn check_statement(&mut self, id: NodeId) {
        let ast = self.ast;

        match ast.kind(id) {
            NodeKind::AssignmentStatement { target, value } => {
                self.check_assignment(id, *target, *value);
            }

            NodeKind::IfStatement {
                condition,
                then_body,
                else_body,
            } => {
                self.check_condition(*condition);
                for statement in then_body.iter().chain(else_body.iter()) {
                    self.check_statement(*statement);
                }
            }

            NodeKind::WhileStatement { condition, body } => {
                self.check_condition(*condition);
                for statement in body {
                    self.check_statement(*statement);
                }
            }

            _ => {
                self.type_of(id);
            }
        }
    }

    fn check_condition(&mut self, condition: NodeId) {
        let ast = self.ast;
        let (expression, construct) = match ast.kind(condition) {
            NodeKind::IfCondition { expression } => (*expression, "If"),
            NodeKind::WhileCondition { expression } => (*expression, "While"),
            _ => (condition, "If"),
        };

        if let ExprType::Known(ty) = self.type_of(expression)
            && !ty.is_boolean()
        {
            self.report(CompilerError::new_type_error(
                format!("{construct} condition must be 'boolean', found '{ty}'"),
                ast.location(condition).to_owned(),
            ));
        }
    }

    fn check_assignment(&mut self, id: NodeId, target: NodeId, value: NodeId) {
        let ast = self.ast;

        let target_type = match ast.kind(target) {
            NodeKind::Literal { .. } => {
                self.report(CompilerError::new_rule_error(
                    "Literal cannot be assigned",
                    ast.location(target).to_owned(),
                ));
                self.type_of(value);
                return;
            }

            NodeKind::Identifier { name } => {
                let target_type = self.assignment_target_type(target, name);
                self.expression_types.insert(target, target_type.clone());
                target_type
            }

            NodeKind::Index { .. } => self.type_of(target),

            other => {
                let msg = format!("A {} cannot be assigned to", other.kind_name());
                self.report(CompilerError::new_rule_error(
                    msg,
                    ast.location(target).to_owned(),
                ));
                self.type_of(value);
                return;
            }
        };

        let value_type = self.type_of(value);

        if let (ExprType::Known(target_type), ExprType::Known(value_type)) =
            (&target_type, &value_type)
            && target_type != value_type
            && !self.are_opaque_compatible(target_type, value_type)
        {
            self.report(CompilerError::new_type_error(
                format!("Invalid assignment: cannot assign '{value_type}' to '{target_type}'"),
                ast.location(id).to_owned(),
            ));
        }
    }

    fn assignment_target_type(&mut self, target: NodeId, name: &str) -> ExprType {
        let scope = self.scope(target);

        match scope.resolve(name) {
            None => self.report_unresolved(target, name, &scope),
            Some(resolution) if resolution.is_class_reference() => {
                self.report(CompilerError::new_rule_error(
                    format!("Cannot assign to class '{name}'"),
                    self.ast.location(target).to_owned(),
                ))
            }
            Some(resolution) => resolution
                .variable_type()
                .map(|ty| ExprType::Known(ty.to_owned()))
                .unwrap_or(ExprType::Invalid),
        }
    }

    // --------------------
    // Expressions
    // --------------------
    pub fn type_of(&mut self, id: NodeId) -> ExprType {
        if let Some(ty) = self.expression_types.get(&id) {
            return ty.clone();
        }

        let ty = self.infer(id);

        checker_log!(
            Dark "  ", { self.ast.kind(id).kind_name() },
            " (line ", { self.ast.location(id).line() }, ") : ", #ty
        );

        self.expression_types.insert(id, ty.clone());
        ty
    }

    fn infer(&mut self, id: NodeId) -> ExprType {
        let ast = self.ast;

        match ast.kind(id) {
            NodeKind::Literal { value } => ExprType::Known(value.ty()),

            NodeKind::Identifier { name } => self.infer_identifier(id, name),

            NodeKind::ThisT => {
                if self.scope(id).is_static() {
                    return self.report(CompilerError::new_rule_error(
                        "'this' cannot be used inside the static method 'main'",
                        ast.location(id).to_owned(),
                    ));
                }
                ExprType::Known(Type::object(&self.table.class_name))
            }

            NodeKind::BinOp { op, left, right } => self.infer_binary(id, *op, *left, *right),

            NodeKind::UnaryOp { op, operand } => self.infer_unary(id, *op, *operand),

            NodeKind::CallExpression {
                receiver,
                method,
                arguments,
            } => self.infer_call(id, *receiver, method, *arguments),

            NodeKind::Index { array, index } => self.infer_index(*array, *index),

            NodeKind::NewExp { target } => self.infer_new(id, target),

            NodeKind::Arguments { values } => {
                for value in values {
                    self.type_of(*value);
                }
                ExprType::Known(Type::void())
            }

            NodeKind::AssignmentStatement { .. }
            | NodeKind::IfStatement { .. }
            | NodeKind::WhileStatement { .. } => {
                self.check_statement(id);
                ExprType::Known(Type::void())
            }

            _ => ExprType::Known(Type::void()),
        }
    }

    fn infer_identifier(&mut self, id: NodeId, name: &str) -> ExprType {
        let scope = self.scope(id);

        let Some(resolution) = scope.resolve(name) else {
            return self.report_unresolved(id, name, &scope);
        };

        match resolution {
            Resolution::Local(symbol) => {
                self.mark_read(id, name);
                self.check_assigned_before(id, name);
                ExprType::Known(symbol.ty.to_owned())
            }
            Resolution::Parameter { symbol, .. } | Resolution::Field(symbol) => {
                self.mark_read(id, name);
                ExprType::Known(symbol.ty.to_owned())
            }
            Resolution::Import(_) | Resolution::Superclass | Resolution::OwnClass => {
                self.used_classes.insert(name.to_owned());
                ExprType::Known(Type::object(name))
            }
        }
    }

    fn infer_binary(
        &mut self,
        id: NodeId,
        op: BinaryOperator,
        left: NodeId,
        right: NodeId,
    ) -> ExprType {
        let left_type = self.type_of(left);
        let right_type = self.type_of(right);

        if left_type.is_invalid() || right_type.is_invalid() {
            return ExprType::Invalid;
        }

        let required = op.operand_type();
        let left_type = left_type.known_or(&required);
        let right_type = right_type.known_or(&required);
        let location = self.ast.location(id).to_owned();

        if left_type.is_array || right_type.is_array {
            return self.report(CompilerError::new_type_error(
                format!("Array operands are not supported for operator '{}'", op.name()),
                location,
            ));
        }

        if left_type != right_type {
            return self.report(CompilerError::new_type_error(
                format!("Operation with different operand types: '{left_type}' and '{right_type}'"),
                location,
            ));
        }

        if left_type != required {
            return self.report(CompilerError::new_type_error(
                format!(
                    "Operator '{}' is not allowed for type '{}'",
                    op.name(),
                    left_type
                ),
                location,
            ));
        }

        ExprType::Known(op.result_type())
    }

    fn infer_unary(&mut self, id: NodeId, op: UnaryOperator, operand: NodeId) -> ExprType {
        let ast = self.ast;
        let location = ast.location(id).to_owned();

        match op {
            UnaryOperator::Not => match self.type_of(operand) {
                ExprType::Invalid => ExprType::Invalid,
                ExprType::Known(ty) if !ty.is_boolean() => {
                    self.report(CompilerError::new_type_error(
                        format!("Operator 'not' requires a 'boolean' operand, found '{ty}'"),
                        location,
                    ))
                }
                _ => ExprType::Known(Type::boolean()),
            },

            UnaryOperator::Length => {
                if matches!(ast.kind(operand), NodeKind::Literal { .. }) {
                    return self.report(CompilerError::new_type_error(
                        "Cannot take the length of a literal",
                        location,
                    ));
                }

                match self.type_of(operand) {
                    ExprType::Invalid => ExprType::Invalid,
                    ExprType::Known(ty) if !ty.is_array => {
                        let msg = format!("{} is not an array", self.describe(operand));
                        self.report(CompilerError::new_type_error(msg, location))
                    }
                    _ => ExprType::Known(Type::int()),
                }
            }

            UnaryOperator::Return => {
                self.check_return(id, operand);
                ExprType::Known(Type::void())
            }
        }
    }

    fn check_return(&mut self, id: NodeId, operand: NodeId) {
        let Some(method) = self.scope(id).method else {
            return;
        };
        let expected = method.return_type.to_owned();
        let actual = self.type_of(operand);

        // Members of the class itself or of an external class are taken on trust here
        let tolerated = matches!(
            self.call_receivers.get(&operand),
            Some(CallReceiver::OwnClass | CallReceiver::External)
        );

        if let ExprType::Known(actual) = actual
            && !tolerated
            && actual != expected
            && !self.are_opaque_compatible(&expected, &actual)
        {
            self.report(CompilerError::new_type_error(
                format!("Invalid return type: expected '{expected}', found '{actual}'"),
                self.ast.location(id).to_owned(),
            ));
        }
    }

    fn infer_call(
        &mut self,
        id: NodeId,
        receiver: Option<NodeId>,
        method: &str,
        arguments: NodeId,
    ) -> ExprType {
        let ast = self.ast;
        let table = self.table;

        let argument_nodes = match ast.kind(arguments) {
            NodeKind::Arguments { values } => values.to_owned(),
            _ => Vec::new(),
        };
        let argument_types: Vec<ExprType> = argument_nodes
            .iter()
            .map(|argument| self.type_of(*argument))
            .collect();

        let scope = self.scope(id);

        let (receiver_kind, result) = match receiver {
            None => {
                if scope.resolve_variable(method).is_some() {
                    let error = CompilerError::new_rule_error(
                        format!("'{method}' is a variable and cannot be called"),
                        ast.location(id).to_owned(),
                    );
                    (CallReceiver::Other, self.report(error))
                } else if scope.is_static() && table.method(method).is_some() {
                    let error = CompilerError::new_rule_error(
                        format!("Cannot call instance method '{method}' from the static method 'main'"),
                        ast.location(id).to_owned(),
                    );
                    (CallReceiver::OwnClass, self.report(error))
                } else {
                    let result = self.call_local_method(id, method, &argument_types);
                    (CallReceiver::OwnClass, result)
                }
            }

            Some(receiver) => {
                let receiver_type = self.type_of(receiver);
                let class_reference = match ast.kind(receiver) {
                    NodeKind::Identifier { name } => scope
                        .resolve(name)
                        .filter(|resolution| resolution.is_class_reference()),
                    _ => None,
                };

                match (class_reference, receiver_type) {
                    // Java-- has no static methods besides main, so `Q.f()` never has a target
                    (Some(Resolution::OwnClass), _)
                        if table.method(method).is_some_and(|signature| !signature.is_static) =>
                    {
                        let error = CompilerError::new_rule_error(
                            format!(
                                "Instance method '{method}' must be called on an object, not on the class '{}'",
                                table.class_name
                            ),
                            ast.location(id).to_owned(),
                        );
                        (CallReceiver::OwnClass, self.report(error))
                    }
                    (Some(Resolution::OwnClass), _) => {
                        let result = self.call_local_method(id, method, &argument_types);
                        (CallReceiver::OwnClass, result)
                    }
                    (Some(_), _) => (CallReceiver::External, ExprType::Unknown),
                    (None, ExprType::Invalid) => (CallReceiver::Other, ExprType::Invalid),
                    (None, ExprType::Unknown) => (CallReceiver::External, ExprType::Unknown),
                    (None, ExprType::Known(ty)) => {
                        if ty.is_array || ty.is_builtin_base() {
                            let error = CompilerError::new_type_error(
                                format!("Cannot call method '{method}' on a value of type '{ty}'"),
                                ast.location(id).to_owned(),
                            );
                            (CallReceiver::Other, self.report(error))
                        } else if ty.name == table.class_name {
                            let result = self.call_local_method(id, method, &argument_types);
                            (CallReceiver::OwnClass, result)
                        } else {
                            // An import or the superclass. Unknown classes were reported where they were declared.
                            (CallReceiver::External, ExprType::Unknown)
                        }
                    }
                }
            }
        };

        self.call_receivers.insert(id, receiver_kind);
        result
    }

    fn call_local_method(
        &mut self,
        id: NodeId,
        method: &str,
        argument_types: &[ExprType],
    ) -> ExprType {
        let table = self.table;

        match table.method(method) {
            Some(signature) if signature.is_static => {
                self.report(CompilerError::new_rule_error(
                    format!("The static method '{method}' cannot be called"),
                    self.ast.location(id).to_owned(),
                ))
            }
            Some(signature) => {
                self.check_arguments(id, signature, argument_types);
                ExprType::Known(signature.return_type.to_owned())
            }

            // The superclass is assumed to supply anything the class doesn't declare
            None if table.superclass.is_some() => ExprType::Unknown,

            None => self.report(CompilerError::new_resolution_error(
                format!(
                    "Method '{}' is not declared in class '{}'",
                    method, table.class_name
                ),
                self.ast.location(id).to_owned(),
            )),
        }
    }

    fn check_arguments(
        &mut self,
        id: NodeId,
        signature: &MethodSignature,
        argument_types: &[ExprType],
    ) {
        let location = self.ast.location(id);

        if argument_types.len() != signature.parameters.len() {
            self.report(CompilerError::new_type_error(
                format!(
                    "Invalid number of arguments for '{}': expected {}, found {}",
                    signature.name,
                    signature.parameters.len(),
                    argument_types.len()
                ),
                location.to_owned(),
            ));
            return;
        }

        for (position, (argument, parameter)) in argument_types
            .iter()
            .zip(signature.parameters.iter())
            .enumerate()
        {
            if let ExprType::Known(found) = argument
                && *found != parameter.ty
                && !self.are_opaque_compatible(&parameter.ty, found)
            {
                self.report(CompilerError::new_type_error(
                    format!(
                        "Invalid argument type for '{}' at position {}: expected '{}', found '{}'",
                        signature.name,
                        position + 1,
                        parameter.ty,
                        found
                    ),
                    location.to_owned(),
                ));
            }
        }
    }

    fn infer_index(&mut self, array: NodeId, index: NodeId) -> ExprType {
        let array_type = self.type_of(array);
        let index_type = self.type_of(index);
        let mut result = ExprType::Known(Type::int());

        if let ExprType::Known(ty) = &index_type
            && !ty.is_int()
        {
            result = self.report(CompilerError::new_type_error(
                format!("Array index must be 'int', found '{ty}'"),
                self.ast.location(index).to_owned(),
            ));
        }

        if let ExprType::Known(ty) = &array_type
            && !ty.is_array
        {
            let msg = format!("{} is not an array", self.describe(array));
            result = self.report(CompilerError::new_type_error(
                msg,
                self.ast.location(array).to_owned(),
            ));
        }

        if array_type.is_invalid() || index_type.is_invalid() {
            return ExprType::Invalid;
        }

        result
    }

    fn infer_new(&mut self, id: NodeId, target: &NewTarget) -> ExprType {
        match target {
            NewTarget::Object(class_name) => {
                self.used_classes.insert(class_name.to_owned());

                if !self.table.is_known_class(class_name) {
                    return self.report(CompilerError::new_resolution_error(
                        format!("Class '{class_name}' is not declared or imported"),
                        self.ast.location(id).to_owned(),
                    ));
                }

                ExprType::Known(Type::object(class_name))
            }

            NewTarget::IntArray { size } => match self.type_of(*size) {
                ExprType::Invalid => ExprType::Invalid,
                ExprType::Known(ty) if !ty.is_int() => {
                    self.report(CompilerError::new_type_error(
                        format!("Array size must be 'int', found '{ty}'"),
                        self.ast.location(*size).to_owned(),
                    ))
                }
                _ => ExprType::Known(Type::int_array()),
            },
        }
    }

    // --------------------
    // Helpers
    // --------------------
    fn scope(&self, id: NodeId) -> Scope<'a> {
        Scope::at_node(self.ast, self.table, id)
    }

    fn report(&mut self, error: CompilerError) -> ExprType {
        self.messages.errors.push(error);
        ExprType::Invalid
    }

    fn report_unresolved(&mut self, id: NodeId, name: &str, scope: &Scope) -> ExprType {
        let location = self.ast.location(id).to_owned();

        if scope.is_static() && self.table.field(name).is_some() {
            return self.report(CompilerError::new_rule_error(
                format!("Field '{name}' cannot be used inside the static method 'main'"),
                location,
            ));
        }

        self.report(CompilerError::new_resolution_error(
            format!("'{name}' is not declared"),
            location,
        ))
    }

    /// Two class types the checker can't see inside are assumed to be compatible
    fn are_opaque_compatible(&self, left: &Type, right: &Type) -> bool {
        left.is_object()
            && right.is_object()
            && self.table.is_known_class(&left.name)
            && self.table.is_known_class(&right.name)
    }

    fn describe(&self, id: NodeId) -> String {
        match self.ast.kind(id) {
            NodeKind::Identifier { name } => format!("'{name}'"),
            other => format!("The {}", other.kind_name()),
        }
    }

    fn mark_read(&mut self, id: NodeId, name: &str) {
        if let Some(method) = self.ast.enclosing_method(id) {
            self.read_variables.insert((method, name.to_owned()));
        }
    }

    // Line based. Any assignment on an earlier line counts, whatever branch it sits in.
    fn check_assigned_before(&mut self, id: NodeId, name: &str) {
        let line = self.ast.location(id).line();
        if line <= 0 {
            return;
        }
        let Some(method) = self.ast.enclosing_method(id) else {
            return;
        };

        let key = (method, name.to_owned());
        let assigned_earlier = self
            .first_assignment_lines
            .get(&key)
            .is_some_and(|first| *first < line);

        if assigned_earlier || self.reported_unassigned.contains(&key) {
            return;
        }

        self.messages.warnings.push(CompilerWarning::new(
            format!("Variable '{name}' may be used before it is assigned"),
            self.ast.location(id).to_owned(),
            WarningKind::PossiblyUnassigned,
        ));
        self.reported_unassigned.insert(key);
    }

    fn report_unused_declarations(&mut self) {
        let ast = self.ast;

        for id in ast.ids() {
            match ast.kind(id) {
                NodeKind::VarDeclaration { name, .. } => {
                    let Some(method) = ast.parent(id).filter(|parent| ast.kind(*parent).is_method())
                    else {
                        continue;
                    };

                    if !self.read_variables.contains(&(method, name.to_owned())) {
                        self.messages.warnings.push(CompilerWarning::new(
                            format!("Variable '{name}' is never read"),
                            ast.location(id).to_owned(),
                            WarningKind::UnusedVariable,
                        ));
                    }
                }

                NodeKind::ImportDeclaration { segments } => {
                    let Some(last) = segments.last() else {
                        continue;
                    };

                    if !self.used_classes.contains(last) {
                        self.messages.warnings.push(CompilerWarning::new(
                            format!("Import '{}' is never used", segments.join(".")),
                            ast.location(id).to_owned(),
                            WarningKind::UnusedImport,
                        ));
                    }
                }

                _ => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/semantic_checker_tests.rs"]
mod tests;
