use super::*;
use crate::compiler_frontend::analysis::semantic_checker::check_semantics;
use crate::compiler_frontend::ast::syntax_tree::SyntaxNode;
use crate::compiler_frontend::ast::test_support::*;
use crate::compiler_frontend::symbol_table::symbol_table_builder::build_symbol_table;

fn lower_program(root: SyntaxNode) -> IrClass {
    let ast = lower(root);
    let (table, errors) = build_symbol_table(&ast);
    assert!(errors.is_empty(), "declarations should be valid: {errors:?}");

    let messages = check_semantics(&ast, &table);
    assert!(!messages.has_errors(), "{:?}", messages.errors);

    generate_ir(&ast, &table).expect("checked program should lower")
}

fn method_lines(class: &IrClass, name: &str) -> Vec<String> {
    let method = class
        .methods
        .iter()
        .find(|method| method.name == name && !method.is_constructor)
        .expect("method should exist");

    method
        .instructions
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn single_method(method: SyntaxNode) -> SyntaxNode {
    program(&["io"], with_children(class("K", None), vec![method]))
}

#[test]
fn constructor_comes_first_and_calls_super_init() {
    let class = lower_program(factorial_program());

    let constructor = &class.methods[0];
    assert!(constructor.is_constructor);
    assert_eq!(constructor.name, "Fac");
    assert_eq!(
        constructor.instructions,
        vec![Instruction::Call(CallInstruction::invoke(
            CallKind::InvokeSpecial,
            Element::this(),
            "<init>",
            Vec::new(),
            IrType::Void,
        ))]
    );
}

#[test]
fn literals_lower_to_typed_constants() {
    let ast = lower(program(
        &[],
        with_children(
            class("K", None),
            vec![with_children(
                main_method(),
                vec![
                    local("int", "a"),
                    local("boolean", "b"),
                    local("boolean", "c"),
                    assign(ident("a"), int(5)),
                    assign(ident("b"), boolean(true)),
                    assign(ident("c"), boolean(false)),
                ],
            )],
        ),
    ));
    let (table, _) = build_symbol_table(&ast);
    let mut builder = IrBuilder::new(&ast, &table);

    let literals: Vec<String> = ast
        .preorder()
        .into_iter()
        .filter(|id| {
            matches!(
                ast.kind(*id),
                crate::compiler_frontend::ast::ast_nodes::NodeKind::Literal { .. }
            )
        })
        .map(|id| {
            builder
                .lower_expression(id, &IrType::Int32)
                .expect("literals always lower")
                .to_string()
        })
        .collect();

    assert_eq!(literals, vec!["5.i32", "1.bool", "0.bool"]);
    assert!(builder.instructions.is_empty());
}

#[test]
fn factorial_method_lowers_to_expected_instructions() {
    let class = lower_program(factorial_program());

    assert_eq!(
        method_lines(&class, "compFac"),
        vec![
            "if ($1.num.i32 >=.bool 1.i32) goto else_0",
            "num_aux.i32 :=.i32 1.i32",
            "goto endif_0",
            "t0.i32 :=.i32 $1.num.i32 -.i32 1.i32",
            "t1.i32 :=.i32 invokevirtual(this, \"compFac\", t0.i32).i32",
            "num_aux.i32 :=.i32 $1.num.i32 *.i32 t1.i32",
            "ret.i32 num_aux.i32",
        ]
    );

    let method = &class.methods[1];
    assert_eq!(method.label_position("else_0"), Some(3));
    assert_eq!(method.label_position("endif_0"), Some(6));
}

#[test]
fn main_calls_import_statically_and_appends_return() {
    let class = lower_program(factorial_program());

    assert_eq!(
        method_lines(&class, "main"),
        vec![
            "t2.Fac :=.Fac new(Fac).Fac",
            "invokespecial(t2.Fac, \"<init>\").V",
            "t3.i32 :=.i32 invokevirtual(t2.Fac, \"compFac\", 10.i32).i32",
            "invokestatic(io, \"println\", t3.i32).V",
            "ret.V",
        ]
    );

    let main = &class.methods[2];
    assert!(main.is_static);
    assert_eq!(main.params[0].ty, IrType::Array(Box::new(IrType::String)));
}

#[test]
fn loops_fields_and_arrays_lower_in_order() {
    let class = lower_program(array_sum_program());

    assert_eq!(
        class.fields,
        vec![IrField {
            name: String::from("count"),
            ty: IrType::Int32,
        }]
    );

    assert_eq!(
        method_lines(&class, "sum"),
        vec![
            "i.i32 :=.i32 0.i32",
            "total.i32 :=.i32 0.i32",
            "t0.i32 :=.i32 arraylength($1.values.array.i32).i32",
            "if (i.i32 <.bool t0.i32) goto Body_0",
            "goto EndLoop_0",
            "t1.i32 :=.i32 $1.values[i.i32].i32",
            "total.i32 :=.i32 total.i32 +.i32 t1.i32",
            "i.i32 :=.i32 i.i32 +.i32 1.i32",
            "goto Loop_0",
            "putfield(this, count.i32, i.i32).V",
            "ret.i32 total.i32",
        ]
    );

    let sum = &class.methods[1];
    assert_eq!(sum.label_position("Loop_0"), Some(2));
    assert_eq!(sum.label_position("Body_0"), Some(5));
    assert_eq!(sum.label_position("EndLoop_0"), Some(9));
}

#[test]
fn literal_array_indexes_are_moved_into_temporaries() {
    let class = lower_program(array_sum_program());
    let main = method_lines(&class, "main");

    assert_eq!(main[0], "a.array.i32 :=.array.i32 new(array, 3.i32).array.i32");
    assert_eq!(main[1], "t2.i32 :=.i32 0.i32");
    assert_eq!(main[2], "a[t2.i32].i32 :=.i32 4.i32");
    assert!(main.contains(&String::from("s.Summer :=.Summer new(Summer).Summer")));
    assert!(main.contains(&String::from("invokespecial(s.Summer, \"<init>\").V")));
    assert!(main.contains(&String::from(
        "t5.i32 :=.i32 invokevirtual(s.Summer, \"sum\", a.array.i32).i32"
    )));
}

#[test]
fn and_condition_branches_on_negated_operands() {
    let method = with_children(
        method("pick", "int"),
        vec![
            param("boolean", "a"),
            param("boolean", "b"),
            local("int", "x"),
            if_else(
                binop("and", ident("a"), ident("b")),
                vec![assign(ident("x"), int(1))],
                vec![assign(ident("x"), int(2))],
            ),
            ret(ident("x")),
        ],
    );

    let lines = method_lines(&lower_program(single_method(method)), "pick");
    assert_eq!(
        &lines[..3],
        &[
            "t0.bool :=.bool !.bool $1.a.bool",
            "t1.bool :=.bool !.bool $2.b.bool",
            "if (t0.bool ||.bool t1.bool) goto else_0",
        ]
    );
}

#[test]
fn not_condition_branches_on_the_operand_itself() {
    let method = with_children(
        method("flip", "int"),
        vec![
            param("boolean", "a"),
            local("int", "x"),
            if_else(
                not(ident("a")),
                vec![assign(ident("x"), int(1))],
                vec![assign(ident("x"), int(0))],
            ),
            ret(ident("x")),
        ],
    );

    let lines = method_lines(&lower_program(single_method(method)), "flip");
    assert_eq!(lines[0], "if ($1.a.bool) goto else_0");
}

#[test]
fn literal_while_condition_branches_on_a_constant() {
    let method = with_children(
        method("spin", "int"),
        vec![
            local("int", "x"),
            assign(ident("x"), int(0)),
            while_loop(boolean(true), vec![assign(ident("x"), int(1))]),
            ret(ident("x")),
        ],
    );

    let lines = method_lines(&lower_program(single_method(method)), "spin");
    assert_eq!(lines[1], "if (1.bool) goto Body_0");
}

#[test]
fn temporaries_skip_declared_names() {
    let method = with_children(
        method("f", "int"),
        vec![
            param("int", "t0"),
            local("int", "x"),
            assign(ident("x"), binop("add", binop("mult", ident("t0"), int(2)), int(1))),
            ret(ident("x")),
        ],
    );

    let lines = method_lines(&lower_program(single_method(method)), "f");
    assert_eq!(lines[0], "t1.i32 :=.i32 $1.t0.i32 *.i32 2.i32");
    assert_eq!(lines[1], "x.i32 :=.i32 t1.i32 +.i32 1.i32");
}

#[test]
fn field_reads_go_through_getfield() {
    let reader = with_children(
        method("read", "int"),
        vec![local("int", "x"), assign(ident("x"), ident("count")), ret(ident("count"))],
    );
    let root = program(
        &["io"],
        with_children(class("K", None), vec![field("int", "count"), reader]),
    );

    assert_eq!(
        method_lines(&lower_program(root), "read"),
        vec![
            "x.i32 :=.i32 getfield(this, count.i32).i32",
            "t0.i32 :=.i32 getfield(this, count.i32).i32",
            "ret.i32 t0.i32",
        ]
    );
}

#[test]
fn label_suffixes_are_unique_across_methods() {
    let first = with_children(
        method("first", "int"),
        vec![
            param("int", "a"),
            while_loop(binop("lt", ident("a"), int(3)), vec![assign(ident("a"), int(3))]),
            ret(ident("a")),
        ],
    );
    let second = with_children(
        method("second", "int"),
        vec![
            param("int", "a"),
            while_loop(binop("lt", ident("a"), int(5)), vec![assign(ident("a"), int(5))]),
            ret(ident("a")),
        ],
    );
    let root = program(&["io"], with_children(class("K", None), vec![first, second]));
    let class = lower_program(root);

    assert!(class.methods[1].label_position("Loop_0").is_some());
    assert!(class.methods[2].label_position("Loop_1").is_some());
    assert!(class.methods[2].label_position("Loop_0").is_none());
}

#[test]
fn discarded_call_results_stay_standalone_calls() {
    let helper = with_children(method("helper", "int"), vec![ret(int(7))]);
    let caller = with_children(
        method("caller", "void"),
        vec![call(None, "helper", Vec::new())],
    );
    let root = program(&["io"], with_children(class("K", None), vec![helper, caller]));

    assert_eq!(
        method_lines(&lower_program(root), "caller"),
        vec!["invokevirtual(this, \"helper\").i32", "ret.V"]
    );
}

#[test]
fn ir_type_maps_source_types() {
    assert_eq!(ir_type(&Type::int()), IrType::Int32);
    assert_eq!(ir_type(&Type::boolean()), IrType::Boolean);
    assert_eq!(ir_type(&Type::void()), IrType::Void);
    assert_eq!(ir_type(&Type::int_array()), IrType::int_array());
    assert_eq!(ir_type(&Type::object("Fac")), IrType::Object(String::from("Fac")));
}
