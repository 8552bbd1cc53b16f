//! Builders for the parser's JSON tree, so tests can write programs as nested calls.
//! Line numbers are filled in by [`lower`], one per declaration or statement.

use crate::compiler_frontend::ast::ast::Ast;
use crate::compiler_frontend::ast::syntax_tree::SyntaxNode;

pub(crate) fn program(imports: &[&str], class: SyntaxNode) -> SyntaxNode {
    let mut root = SyntaxNode::new("Program");
    for import in imports {
        root = root.child(SyntaxNode::new("ImportDeclaration").attr("path", *import));
    }
    root.child(class)
}

pub(crate) fn class(name: &str, superclass: Option<&str>) -> SyntaxNode {
    let node = SyntaxNode::new("ClassDeclaration").attr("name", name);
    match superclass {
        Some(superclass) => node.child(SyntaxNode::new("Inheritance").attr("name", superclass)),
        None => node,
    }
}

pub(crate) fn field(ty: &str, name: &str) -> SyntaxNode {
    local(ty, name)
}

pub(crate) fn local(ty: &str, name: &str) -> SyntaxNode {
    SyntaxNode::new("VarDeclaration")
        .attr("type", ty)
        .attr("name", name)
}

pub(crate) fn param(ty: &str, name: &str) -> SyntaxNode {
    SyntaxNode::new("Argument")
        .attr("type", ty)
        .attr("name", name)
}

pub(crate) fn main_method() -> SyntaxNode {
    SyntaxNode::new("MainMethod").attr("args", "args")
}

pub(crate) fn method(name: &str, return_type: &str) -> SyntaxNode {
    SyntaxNode::new("InstanceMethod")
        .attr("name", name)
        .attr("type", return_type)
}

pub(crate) fn ident(name: &str) -> SyntaxNode {
    SyntaxNode::new("Identifier").attr("name", name)
}

pub(crate) fn int(value: i32) -> SyntaxNode {
    SyntaxNode::new("Literal")
        .attr("type", "int")
        .attr("value", value.to_string())
}

pub(crate) fn boolean(value: bool) -> SyntaxNode {
    SyntaxNode::new("Literal")
        .attr("type", "boolean")
        .attr("value", value.to_string())
}

pub(crate) fn this() -> SyntaxNode {
    SyntaxNode::new("ThisT")
}

pub(crate) fn binop(op: &str, left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new("BinOp")
        .attr("op", op)
        .child(left)
        .child(right)
}

pub(crate) fn not(operand: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new("UnaryOp").attr("op", "not").child(operand)
}

pub(crate) fn length(operand: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new("UnaryOp").attr("op", "length").child(operand)
}

pub(crate) fn ret(operand: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new("UnaryOp").attr("op", "return").child(operand)
}

pub(crate) fn call(receiver: Option<SyntaxNode>, method: &str, arguments: Vec<SyntaxNode>) -> SyntaxNode {
    let mut node = SyntaxNode::new("CallExpression").attr("method", method);
    if let Some(receiver) = receiver {
        node = node.child(receiver);
    }

    let mut argument_list = SyntaxNode::new("Arguments");
    for argument in arguments {
        argument_list = argument_list.child(argument);
    }
    node.child(argument_list)
}

pub(crate) fn index(array: SyntaxNode, position: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new("Index").child(array).child(position)
}

pub(crate) fn new_object(class_name: &str) -> SyntaxNode {
    SyntaxNode::new("NewExp").attr("type", class_name)
}

pub(crate) fn new_int_array(size: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new("NewExp").attr("array", true).child(size)
}

pub(crate) fn assign(target: SyntaxNode, value: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new("AssignmentStatement")
        .child(target)
        .child(value)
}

pub(crate) fn if_else(
    condition: SyntaxNode,
    then_body: Vec<SyntaxNode>,
    else_body: Vec<SyntaxNode>,
) -> SyntaxNode {
    SyntaxNode::new("IfStatement")
        .child(SyntaxNode::new("IfCondition").child(condition))
        .child(block(then_body))
        .child(block(else_body))
}

pub(crate) fn while_loop(condition: SyntaxNode, body: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::new("WhileStatement")
        .child(SyntaxNode::new("WhileCondition").child(condition))
        .child(block(body))
}

pub(crate) fn block(statements: Vec<SyntaxNode>) -> SyntaxNode {
    let mut node = SyntaxNode::new("Block");
    for statement in statements {
        node = node.child(statement);
    }
    node
}

pub(crate) fn with_children(mut node: SyntaxNode, children: Vec<SyntaxNode>) -> SyntaxNode {
    node.children.extend(children);
    node
}

/// Numbers the lines and lowers the tree. Panics on a malformed tree.
pub(crate) fn lower(mut root: SyntaxNode) -> Ast {
    let mut next_line = 1;
    number_lines(&mut root, 0, true, &mut next_line);

    match Ast::from_syntax_tree(&root) {
        Ok(ast) => ast,
        Err(errors) => panic!("test program did not lower: {errors:?}"),
    }
}

fn number_lines(node: &mut SyntaxNode, current: i32, starts_line: bool, next_line: &mut i32) {
    let line = match node.get_i32("line") {
        Some(line) => line,
        None if starts_line => {
            let line = *next_line;
            *next_line += 1;
            line
        }
        None => current,
    };
    node.attributes.insert(String::from("line"), line.into());
    node.attributes.insert(String::from("col"), 1.into());

    let children_start_lines = matches!(
        node.kind.as_str(),
        "Program"
            | "ClassDeclaration"
            | "MainMethod"
            | "InstanceMethod"
            | "Block"
            | "IfStatement"
            | "WhileStatement"
    );

    for child in &mut node.children {
        number_lines(child, line, children_start_lines, next_line);
    }
}

/// The classic recursive factorial, printing 10!
pub(crate) fn factorial_program() -> SyntaxNode {
    let comp_fac = with_children(
        method("compFac", "int"),
        vec![
            param("int", "num"),
            local("int", "num_aux"),
            if_else(
                binop("lt", ident("num"), int(1)),
                vec![assign(ident("num_aux"), int(1))],
                vec![assign(
                    ident("num_aux"),
                    binop(
                        "mult",
                        ident("num"),
                        call(
                            Some(this()),
                            "compFac",
                            vec![binop("sub", ident("num"), int(1))],
                        ),
                    ),
                )],
            ),
            ret(ident("num_aux")),
        ],
    );

    let main = with_children(
        main_method(),
        vec![call(
            Some(ident("io")),
            "println",
            vec![call(Some(new_object("Fac")), "compFac", vec![int(10)])],
        )],
    );

    program(&["io"], with_children(class("Fac", None), vec![comp_fac, main]))
}

/// A class with a field, an array, a loop and a static import call
pub(crate) fn array_sum_program() -> SyntaxNode {
    let sum = with_children(
        method("sum", "int"),
        vec![
            param("int[]", "values"),
            local("int", "i"),
            local("int", "total"),
            assign(ident("i"), int(0)),
            assign(ident("total"), int(0)),
            while_loop(
                binop("lt", ident("i"), length(ident("values"))),
                vec![
                    assign(
                        ident("total"),
                        binop("add", ident("total"), index(ident("values"), ident("i"))),
                    ),
                    assign(ident("i"), binop("add", ident("i"), int(1))),
                ],
            ),
            assign(ident("count"), ident("i")),
            ret(ident("total")),
        ],
    );

    let main = with_children(
        main_method(),
        vec![
            local("int[]", "a"),
            local("Summer", "s"),
            assign(ident("a"), new_int_array(int(3))),
            assign(index(ident("a"), int(0)), int(4)),
            assign(index(ident("a"), int(1)), int(5)),
            assign(index(ident("a"), int(2)), int(6)),
            assign(ident("s"), new_object("Summer")),
            call(
                Some(ident("io")),
                "println",
                vec![call(Some(ident("s")), "sum", vec![ident("a")])],
            ),
        ],
    );

    program(
        &["io"],
        with_children(
            class("Summer", None),
            vec![field("int", "count"), sum, main],
        ),
    )
}
