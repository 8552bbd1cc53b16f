use crate::compiler_frontend::analysis::semantic_checker::check_semantics;
use crate::compiler_frontend::ast::syntax_tree::SyntaxNode;
use crate::compiler_frontend::ast::test_support::*;
use crate::compiler_frontend::ir::control_flow::ControlFlowGraph;
use crate::compiler_frontend::ir::ir_builder::generate_ir;
use crate::compiler_frontend::ir::ir_display::ir_to_text;
use crate::compiler_frontend::ir::ir_nodes::IrClass;
use crate::compiler_frontend::ir::ir_parser::parse_ir;
use crate::compiler_frontend::symbol_table::symbol_table_builder::build_symbol_table;
use proptest::prelude::*;
use rustc_hash::FxHashSet;

pub(crate) fn int_expression() -> impl Strategy<Value = SyntaxNode> {
    let leaf = prop_oneof![
        Just(ident("a")),
        Just(ident("b")),
        (0..100i32).prop_map(int),
    ];

    leaf.prop_recursive(3, 16, 2, |inner| {
        (
            prop::sample::select(vec!["add", "sub", "mult"]),
            inner.clone(),
            inner,
        )
            .prop_map(|(op, left, right)| binop(op, left, right))
    })
}

pub(crate) fn condition() -> impl Strategy<Value = SyntaxNode> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(boolean),
        (int_expression(), int_expression()).prop_map(|(left, right)| binop("lt", left, right)),
    ];

    leaf.prop_recursive(2, 8, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(not),
            (inner.clone(), inner).prop_map(|(left, right)| binop("and", left, right)),
        ]
    })
}

pub(crate) fn statement() -> impl Strategy<Value = SyntaxNode> {
    let leaf = (prop::sample::select(vec!["a", "b"]), int_expression())
        .prop_map(|(target, value)| assign(ident(target), value));

    leaf.prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            (
                condition(),
                prop::collection::vec(inner.clone(), 1..3),
                prop::collection::vec(inner.clone(), 1..3),
            )
                .prop_map(|(condition, then_body, else_body)| if_else(
                    condition, then_body, else_body
                )),
            (condition(), prop::collection::vec(inner, 1..3))
                .prop_map(|(condition, body)| while_loop(condition, body)),
        ]
    })
}

fn program_with(statements: Vec<SyntaxNode>) -> SyntaxNode {
    let mut members = vec![
        param("int", "a"),
        local("int", "b"),
        assign(ident("b"), int(0)),
    ];
    members.extend(statements);
    members.push(ret(binop("add", ident("a"), ident("b"))));

    let run = with_children(method("run", "int"), members);
    program(&["io"], with_children(class("P", None), vec![run]))
}

fn generated(root: SyntaxNode) -> IrClass {
    let ast = lower(root);
    let (table, errors) = build_symbol_table(&ast);
    assert!(errors.is_empty(), "{errors:?}");
    assert!(!check_semantics(&ast, &table).has_errors());
    generate_ir(&ast, &table).expect("generated program should lower")
}

proptest! {
    #[test]
    fn labels_are_unique_and_every_branch_resolves(
        statements in prop::collection::vec(statement(), 0..4)
    ) {
        let class = generated(program_with(statements));

        for method in &class.methods {
            let mut seen = FxHashSet::default();
            for label in &method.labels {
                prop_assert!(seen.insert(label.name.as_str()), "label '{}' repeated", label.name);
            }

            for instruction in &method.instructions {
                if let Some(target) = instruction.branch_target() {
                    prop_assert!(method.label_position(target).is_some(), "'{}' is undefined", target);
                }
            }
        }
    }

    #[test]
    fn generated_methods_never_fall_off_the_end(
        statements in prop::collection::vec(statement(), 0..4)
    ) {
        let class = generated(program_with(statements));

        // Constructors are a fixed template with no explicit return
        for method in class.methods.iter().filter(|method| !method.is_constructor) {
            let graph = ControlFlowGraph::build(method).expect("labels should resolve");
            prop_assert!(!graph.falls_off_end(), "'{}' can fall off its end", method.name);
        }
    }

    #[test]
    fn text_form_reads_back_to_the_same_class(
        statements in prop::collection::vec(statement(), 0..4)
    ) {
        let class = generated(program_with(statements));
        let text = ir_to_text(&class);
        let parsed = parse_ir(&text).expect("generated IR should parse");

        prop_assert_eq!(parsed, class);
    }
}
