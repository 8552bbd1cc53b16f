use super::*;
use crate::compiler_frontend::ast::test_support::*;
use crate::compiler_frontend::compiler_messages::compiler_errors::ErrorType;
use crate::compiler_frontend::ast::syntax_tree::SyntaxNode;

fn table_for(root: SyntaxNode) -> (SymbolTable, Vec<CompilerError>) {
    let ast = lower(root);
    build_symbol_table(&ast)
}

#[test]
fn records_imports_class_fields_and_methods() {
    let adder = with_children(
        method("add", "int"),
        vec![
            param("int", "a"),
            param("boolean", "flag"),
            local("int[]", "scratch"),
            ret(ident("a")),
        ],
    );
    let root = program(
        &["io", "java.util.List"],
        with_children(
            class("Calc", Some("List")),
            vec![field("int", "total"), field("Calc", "next"), adder, main_method()],
        ),
    );

    let (table, errors) = table_for(root);

    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(table.imports(), &["io".to_string(), "java.util.List".to_string()]);
    assert_eq!(table.class_name, "Calc");
    assert_eq!(table.superclass.as_deref(), Some("List"));
    assert_eq!(
        table.fields(),
        &[
            Symbol::new("total", Type::int()),
            Symbol::new("next", Type::object("Calc")),
        ]
    );

    assert_eq!(table.return_type("add"), Some(&Type::int()));
    assert_eq!(
        table.parameters("add"),
        Some(&[Symbol::new("a", Type::int()), Symbol::new("flag", Type::boolean())][..])
    );
    assert_eq!(
        table.locals("add"),
        Some(&[Symbol::new("scratch", Type::int_array())][..])
    );

    let main = table.method("main").expect("main should be recorded");
    assert!(main.is_static);
    assert_eq!(main.return_type, Type::void());
    assert_eq!(main.parameters, vec![Symbol::new("args", Type::string_array())]);
}

#[test]
fn parameter_positions_are_one_based() {
    let root = program(
        &[],
        with_children(
            class("K", None),
            vec![with_children(
                method("pick", "int"),
                vec![param("int", "first"), param("int", "second"), ret(int(0))],
            )],
        ),
    );

    let (table, _) = table_for(root);
    let pick = table.method("pick").expect("pick");

    assert_eq!(pick.parameter_position("first"), Some(1));
    assert_eq!(pick.parameter_position("second"), Some(2));
    assert_eq!(pick.parameter_position("third"), None);
}

#[test]
fn duplicate_field_keeps_the_first_declaration() {
    let root = program(
        &[],
        with_children(
            class("K", None),
            vec![field("int", "x"), field("boolean", "x")],
        ),
    );

    let (table, errors) = table_for(root);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type, ErrorType::Declaration);
    assert_eq!(errors[0].msg, "Field 'x' is already declared in class 'K'");
    assert_eq!(errors[0].location.line(), 4);
    assert_eq!(table.fields(), &[Symbol::new("x", Type::int())]);
}

#[test]
fn duplicate_method_is_dropped_with_its_contents() {
    let first = with_children(method("m", "int"), vec![param("int", "a"), ret(ident("a"))]);
    let second = with_children(
        method("m", "boolean"),
        vec![param("int", "b"), local("int", "c"), ret(boolean(true))],
    );
    let root = program(&[], with_children(class("K", None), vec![first, second]));

    let (table, errors) = table_for(root);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].msg, "Method 'm' is already declared in class 'K'");

    let method = table.method("m").expect("first m survives");
    assert_eq!(method.return_type, Type::int());
    assert_eq!(method.parameters, vec![Symbol::new("a", Type::int())]);
    assert!(method.locals.is_empty());
}

#[test]
fn local_conflicts_are_reported_and_the_walk_continues() {
    let body = with_children(
        method("m", "int"),
        vec![
            param("int", "a"),
            param("int", "a"),
            local("int", "a"),
            local("int", "b"),
            local("boolean", "b"),
            local("int", "c"),
            ret(ident("c")),
        ],
    );
    let root = program(&[], with_children(class("K", None), vec![body]));

    let (table, errors) = table_for(root);
    let messages: Vec<&str> = errors.iter().map(|e| e.msg.as_str()).collect();

    assert_eq!(
        messages,
        vec![
            "Parameter 'a' is already declared in method 'm'",
            "Variable 'a' shadows a parameter of method 'm'",
            "Variable 'b' is already declared in method 'm'",
        ]
    );
    assert_eq!(
        table.locals("m"),
        Some(&[Symbol::new("b", Type::int()), Symbol::new("c", Type::int())][..])
    );
}

#[test]
fn locals_may_reuse_field_names() {
    let body = with_children(
        method("m", "int"),
        vec![local("int", "x"), ret(int(0))],
    );
    let root = program(
        &[],
        with_children(class("K", None), vec![field("boolean", "x"), body]),
    );

    let (table, errors) = table_for(root);

    assert!(errors.is_empty());
    assert_eq!(table.field("x").map(|f| &f.ty), Some(&Type::boolean()));
    assert_eq!(table.locals("m").map(|l| l.len()), Some(1));
}

#[test]
fn imports_are_found_by_their_last_segment() {
    let root = program(
        &["a.b.Helper", "io"],
        with_children(class("K", Some("Helper")), vec![]),
    );

    let (table, _) = table_for(root);

    assert_eq!(table.import_named("Helper"), Some("a.b.Helper"));
    assert_eq!(table.import_named("b"), None);
    assert!(table.is_known_class("K"));
    assert!(table.is_known_class("io"));
    assert!(!table.is_known_class("Missing"));
}

#[test]
fn declared_names_cover_every_kind_of_declaration() {
    let (table, _) = table_for(factorial_program());
    let names = table.declared_names();

    for name in ["io", "Fac", "num", "num_aux", "args"] {
        assert!(names.contains(name), "{name} should be declared");
    }
}
