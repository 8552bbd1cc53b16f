use super::*;
use crate::backends::jasmin::peephole::remove_redundant_store_loads;
use crate::backends::jasmin::stack_machine::run_main;
use crate::compiler_frontend::analysis::semantic_checker::check_semantics;
use crate::compiler_frontend::ast::syntax_tree::SyntaxNode;
use crate::compiler_frontend::ast::test_support::*;
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilationStage;
use crate::compiler_frontend::ir::ir_builder::generate_ir;
use crate::compiler_frontend::ir::ir_display::ir_to_text;
use crate::compiler_frontend::ir::ir_parser::parse_ir;
use crate::compiler_frontend::ir::property_tests::statement;
use crate::compiler_frontend::symbol_table::symbol_table_builder::build_symbol_table;
use proptest::prelude::*;

/// Goes through the IR text form, the same way the build does
fn assemble(root: SyntaxNode) -> JasminModule {
    let ast = lower(root);
    let (table, errors) = build_symbol_table(&ast);
    assert!(errors.is_empty(), "declarations should be valid: {errors:?}");

    let messages = check_semantics(&ast, &table);
    assert!(!messages.has_errors(), "{:?}", messages.errors);

    let ir = generate_ir(&ast, &table).expect("checked program should lower");
    let parsed = parse_ir(&ir_to_text(&ir)).expect("generated IR should parse");

    lower_ir_to_jasmin(&parsed, Some(&table)).expect("IR should lower to Jasmin")
}

fn assemble_ir(text: &str) -> Result<JasminModule, CompilerError> {
    let ir = parse_ir(text).expect("IR should parse");
    lower_ir_to_jasmin(&ir, None)
}

fn method_section<'a>(source: &'a str, header: &str) -> &'a str {
    let start = source.find(header).expect("method should be emitted");
    let length = source[start..]
        .find(".end method")
        .expect("method should be closed");
    &source[start..start + length]
}

fn printing(class_name: &str, method_name: &str, arguments: Vec<i32>) -> SyntaxNode {
    call(
        Some(ident("io")),
        "println",
        vec![call(
            Some(new_object(class_name)),
            method_name,
            arguments.into_iter().map(int).collect(),
        )],
    )
}

fn max_program() -> SyntaxNode {
    let max = with_children(
        method("max", "int"),
        vec![
            param("int", "x"),
            param("int", "y"),
            local("int", "r"),
            if_else(
                binop("lt", ident("x"), ident("y")),
                vec![assign(ident("r"), ident("y"))],
                vec![assign(ident("r"), ident("x"))],
            ),
            ret(ident("r")),
        ],
    );

    let main = with_children(
        main_method(),
        vec![printing("K", "max", vec![3, 9]), printing("K", "max", vec![12, 5])],
    );

    program(&["io"], with_children(class("K", None), vec![max, main]))
}

fn counting_program() -> SyntaxNode {
    let count = with_children(
        method("count", "int"),
        vec![
            param("int", "n"),
            local("int", "i"),
            local("int", "c"),
            assign(ident("i"), int(0)),
            assign(ident("c"), int(0)),
            while_loop(
                binop("and", binop("lt", ident("i"), ident("n")), boolean(true)),
                vec![
                    assign(ident("c"), binop("add", ident("c"), int(2))),
                    assign(ident("i"), binop("add", ident("i"), int(1))),
                ],
            ),
            ret(ident("c")),
        ],
    );

    let main = with_children(main_method(), vec![printing("K", "count", vec![4])]);

    program(&["io"], with_children(class("K", None), vec![count, main]))
}

fn comparisons_program() -> SyntaxNode {
    let less = with_children(
        method("less", "boolean"),
        vec![
            param("int", "x"),
            param("int", "y"),
            ret(binop("lt", ident("x"), ident("y"))),
        ],
    );
    let flip = with_children(
        method("flip", "boolean"),
        vec![param("boolean", "f"), ret(not(ident("f")))],
    );

    program(&["io"], with_children(class("K", None), vec![less, flip]))
}

// --------------------
// End to end
// --------------------

#[test]
fn factorial_prints_ten_factorial() {
    let module = assemble(factorial_program());

    assert_eq!(module.class_name, "Fac");
    assert_eq!(run_main(&module.source), Ok(String::from("3628800\n")));
}

#[test]
fn array_sum_prints_fifteen() {
    let module = assemble(array_sum_program());

    assert_eq!(run_main(&module.source), Ok(String::from("15\n")));
}

#[test]
fn branches_pick_the_right_side() {
    let module = assemble(max_program());

    assert_eq!(run_main(&module.source), Ok(String::from("9\n12\n")));
}

#[test]
fn loops_with_combined_conditions_run_to_completion() {
    let module = assemble(counting_program());

    assert_eq!(run_main(&module.source), Ok(String::from("8\n")));
}

#[test]
fn optimized_output_prints_the_same() {
    for program in [factorial_program(), array_sum_program(), max_program()] {
        let module = assemble(program);
        let optimized = remove_redundant_store_loads(&module.source);

        assert!(optimized.lines().count() < module.source.lines().count());
        assert_eq!(run_main(&optimized), run_main(&module.source));
    }
}

// --------------------
// Text shape
// --------------------

#[test]
fn class_starts_with_header_fields_and_constructor() {
    let module = assemble(array_sum_program());

    let expected = "\
.class public Summer
.super java/lang/Object

.field private 'count' I

.method public <init>()V
    aload_0
    invokenonvirtual java/lang/Object/<init>()V
    return
.end method
";
    assert!(
        module.source.starts_with(expected),
        "unexpected header:\n{}",
        module.source
    );
}

#[test]
fn method_headers_carry_descriptors_and_limits() {
    let module = assemble(factorial_program());

    let comp_fac = method_section(&module.source, ".method public compFac(I)I");
    assert!(comp_fac.contains("    .limit stack "));
    assert!(comp_fac.contains("    .limit locals 5\n"));
    assert!(comp_fac.contains("if_icmpge else_0"));
    assert!(comp_fac.contains("invokevirtual Fac/compFac(I)I"));
    assert!(comp_fac.contains("\nelse_0:\n"));

    let main = method_section(&module.source, ".method public static main([Ljava/lang/String;)V");
    assert!(main.contains("new Fac"));
    assert!(main.contains("invokespecial Fac/<init>()V"));
    assert!(main.contains("invokestatic io/println(I)V"));
    assert!(main.trim_end().ends_with("return"));
}

#[test]
fn field_access_uses_the_owner_and_descriptor() {
    let module = assemble(array_sum_program());
    let sum = method_section(&module.source, ".method public sum([I)I");

    assert!(sum.contains("putfield Summer/count I"));
    assert!(sum.contains("arraylength"));
    assert!(sum.contains("iaload"));
}

#[test]
fn fields_do_not_take_local_registers() {
    let get = with_children(
        method("get", "int"),
        vec![ret(binop("add", ident("a"), ident("b")))],
    );
    let main = with_children(main_method(), vec![printing("P", "get", vec![])]);
    let module = assemble(program(
        &["io"],
        with_children(
            class("P", None),
            vec![field("int", "a"), field("int", "b"), get, main],
        ),
    ));

    // this plus the two field reads and the sum
    let get = method_section(&module.source, ".method public get()I");
    assert!(get.contains("    .limit locals 4\n"), "{get}");
    assert!(get.contains("getfield P/a I"));
    assert!(get.contains("getfield P/b I"));
    assert_eq!(run_main(&module.source), Ok(String::from("0\n")));
}

#[test]
fn comparison_labels_are_numbered_across_the_class() {
    let module = assemble(comparisons_program());

    let less = method_section(&module.source, ".method public less(II)Z");
    assert!(less.contains("if_icmplt cmp_true_0"));
    assert!(less.contains("\ncmp_true_0:\n"));
    assert!(less.contains("\ncmp_end_0:\n"));

    let flip = method_section(&module.source, ".method public flip(Z)Z");
    assert!(flip.contains("ifeq cmp_true_1"));
    assert!(flip.contains("\ncmp_end_1:\n"));
}

#[test]
fn assembles_hand_written_ir_without_a_table() {
    let text = "\
import io;
import java.util.List;

public Counter extends List {
    .field private total.i32;

    .construct Counter().V {
        invokespecial(this, \"<init>\").V;
    }

    .method public add($1.n.i32, values.array.i32).bool {
        t0.i32 :=.i32 getfield(this, total.i32).i32;
        t1.i32 :=.i32 t0.i32 +.i32 $1.n.i32;
        putfield(this, total.i32, t1.i32).V;
        if (t1.i32 <.bool 10.i32) goto small;
        ret.bool 0.bool;
    small:
        ret.bool 1.bool;
    }
}
";
    let module = assemble_ir(text).expect("IR should assemble");

    assert!(module.source.contains(".super java/util/List\n"));
    assert!(module.source.contains("invokenonvirtual java/util/List/<init>()V"));
    assert!(module.source.contains(".method public add(I[I)Z"));
    assert!(module.source.contains("getfield Counter/total I"));
    assert!(module.source.contains("if_icmplt small"));
    assert!(module.source.contains("\nsmall:\n"));
}

#[test]
fn small_integers_use_the_shortest_push() {
    let text = "\
public Pushes {
    .construct Pushes().V {
        invokespecial(this, \"<init>\").V;
    }

    .method public static main(args.array.String).V {
        a.i32 :=.i32 -1.i32;
        a.i32 :=.i32 5.i32;
        a.i32 :=.i32 100.i32;
        a.i32 :=.i32 1000.i32;
        a.i32 :=.i32 100000.i32;
        ret.V;
    }
}
";
    let module = assemble_ir(text).expect("IR should assemble");

    for push in ["iconst_m1", "iconst_5", "bipush 100", "sipush 1000", "ldc 100000"] {
        assert!(module.source.contains(push), "missing '{push}'");
    }
}

// --------------------
// Rejections
// --------------------

#[test]
fn rejects_methods_that_fall_off_their_end() {
    let text = "\
public Broken {
    .construct Broken().V {
        invokespecial(this, \"<init>\").V;
    }

    .method public value().i32 {
        a.i32 :=.i32 1.i32;
    }
}
";
    let error = assemble_ir(text).expect_err("method without a return should be rejected");

    assert_eq!(error.stage, CompilationStage::Codegen);
    assert!(error.msg.contains("'value'"), "{}", error.msg);
}

#[test]
fn rejects_classes_that_are_neither_imported_nor_declared() {
    let text = "\
public Lonely {
    .construct Lonely().V {
        invokespecial(this, \"<init>\").V;
    }

    .method public static main(args.array.String).V {
        t0.Stranger :=.Stranger new(Stranger).Stranger;
        ret.V;
    }
}
";
    let error = assemble_ir(text).expect_err("unknown class should be rejected");

    assert_eq!(error.stage, CompilationStage::Codegen);
    assert!(error.msg.contains("Stranger"), "{}", error.msg);
}

// --------------------
// Properties
// --------------------

fn runnable_program(statements: Vec<SyntaxNode>) -> SyntaxNode {
    let mut members = vec![
        param("int", "a"),
        local("int", "b"),
        assign(ident("b"), int(0)),
    ];
    members.extend(statements);
    members.push(ret(binop("add", ident("a"), ident("b"))));

    let run = with_children(method("run", "int"), members);
    let main = with_children(main_method(), vec![printing("P", "run", vec![7])]);

    program(&["io"], with_children(class("P", None), vec![run, main]))
}

fn finished_or_out_of_fuel(result: &Result<String, String>) -> bool {
    match result {
        Ok(_) => true,
        Err(message) => message.contains("out of fuel"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn declared_limits_cover_every_execution(
        statements in prop::collection::vec(statement(), 0..4)
    ) {
        let module = assemble(runnable_program(statements));
        let result = run_main(&module.source);

        prop_assert!(finished_or_out_of_fuel(&result), "{:?}\n{}", result, module.source);
    }

    #[test]
    fn store_load_removal_keeps_behaviour(
        statements in prop::collection::vec(statement(), 0..4)
    ) {
        let module = assemble(runnable_program(statements));
        let optimized = remove_redundant_store_loads(&module.source);

        let before = run_main(&module.source);
        let after = run_main(&optimized);

        prop_assert!(finished_or_out_of_fuel(&after), "{:?}\n{}", after, optimized);
        if before.is_ok() {
            prop_assert_eq!(before, after);
        }
    }
}
