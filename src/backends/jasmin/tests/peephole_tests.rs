use super::*;
use proptest::prelude::*;

fn method_block(body: &[&str]) -> String {
    let mut text = String::from(".class public T\n.super java/lang/Object\n\n");
    text.push_str(".method public static run()I\n");
    for line in body {
        text.push_str("    ");
        text.push_str(line);
        text.push('\n');
    }
    text.push_str(".end method\n");
    text
}

#[test]
fn drops_a_store_load_pair_on_a_single_use_register() {
    let input = method_block(&["iconst_5", "istore 1", "iload 1", "ireturn"]);
    let expected = method_block(&["iconst_5", "ireturn"]);

    assert_eq!(remove_redundant_store_loads(&input), expected);
}

#[test]
fn keeps_pairs_when_the_register_is_read_again() {
    let input = method_block(&["iconst_5", "istore 1", "iload 1", "iload 1", "iadd", "ireturn"]);

    assert_eq!(remove_redundant_store_loads(&input), input);
}

#[test]
fn keeps_pairs_that_are_not_adjacent() {
    let input = method_block(&["iconst_5", "istore 1", "iconst_1", "pop", "iload 1", "ireturn"]);

    assert_eq!(remove_redundant_store_loads(&input), input);
}

#[test]
fn keeps_pairs_with_mismatched_registers_or_kinds() {
    let input = method_block(&[
        "iconst_1",
        "istore 1",
        "iload 2",
        "aconst_null",
        "astore 3",
        "iload 3",
        "ireturn",
    ]);

    assert_eq!(remove_redundant_store_loads(&input), input);
}

#[test]
fn short_register_forms_count_as_uses() {
    // aload_0 mentions register 0, so the pair on register 0 is not the only use
    let input = method_block(&["aload_0", "astore 0", "aload 0", "areturn"]);

    assert_eq!(remove_redundant_store_loads(&input), input);
}

#[test]
fn repeats_until_nothing_changes() {
    let input = method_block(&[
        "iconst_1",
        "istore 1",
        "iload 1",
        "istore 2",
        "iload 2",
        "ireturn",
    ]);
    let expected = method_block(&["iconst_1", "ireturn"]);

    assert_eq!(remove_redundant_store_loads(&input), expected);
}

#[test]
fn counts_registers_per_method() {
    let first = ".method public static a()I\n    iconst_1\n    istore 1\n    iload 1\n    ireturn\n.end method\n";
    let second = ".method public static b()I\n    iload 1\n    ireturn\n.end method\n";
    let input = format!(".class public T\n.super java/lang/Object\n\n{first}\n{second}");

    let output = remove_redundant_store_loads(&input);

    assert!(!output.contains("istore 1"));
    assert!(output.contains(second));
}

#[test]
fn leaves_text_outside_methods_alone() {
    let input = ".class public T\n.super java/lang/Object\n.field private 'x' I\n";
    assert_eq!(remove_redundant_store_loads(input), input);
}

#[test]
fn recognises_register_accesses() {
    assert_eq!(
        register_access("    iload 4"),
        Some(RegisterAccess {
            kind: AccessKind::Load,
            type_prefix: 'i',
            register: 4
        })
    );
    assert_eq!(
        register_access("astore_2"),
        Some(RegisterAccess {
            kind: AccessKind::Store,
            type_prefix: 'a',
            register: 2
        })
    );
    assert_eq!(register_access("iaload"), None);
    assert_eq!(register_access("iastore"), None);
    assert_eq!(register_access("invokestatic io/println(I)V"), None);
    assert_eq!(register_access("Loop_0:"), None);
}

fn body_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (0..4usize).prop_map(|register| format!("istore {register}")),
        (0..4usize).prop_map(|register| format!("iload {register}")),
        Just(String::from("iconst_1")),
        Just(String::from("iadd")),
        Just(String::from("pop")),
    ]
}

proptest! {
    #[test]
    fn pass_is_idempotent(lines in prop::collection::vec(body_line(), 0..24)) {
        let body: Vec<&str> = lines.iter().map(String::as_str).collect();
        let input = method_block(&body);

        let once = remove_redundant_store_loads(&input);
        let twice = remove_redundant_store_loads(&once);

        prop_assert_eq!(&once, &twice);
        prop_assert!(once.lines().count() <= input.lines().count());
    }
}
