use super::*;

fn shapes_class() -> IrClass {
    IrClass {
        name: String::from("Canvas"),
        superclass: Some(String::from("Widget")),
        imports: vec![
            String::from("shapes.Circle"),
            String::from("shapes.Square"),
            String::from("ui.Widget"),
        ],
        ..IrClass::default()
    }
}

#[test]
fn imports_are_seeded_with_slash_separated_names() {
    let names = QualifiedNames::for_class(&shapes_class());

    assert_eq!(names.own_class(), "Canvas");
    assert_eq!(names.superclass(), "ui/Widget");
    assert_eq!(names.class("Circle").ok(), Some("shapes/Circle"));
    assert!(names.class("Triangle").is_err());
}

#[test]
fn a_variable_keeps_the_class_it_was_first_assigned() {
    let mut names = QualifiedNames::for_class(&shapes_class());

    names.record_variable(&Element::operand("shape", IrType::Object(String::from("Circle"))));
    names.record_variable(&Element::operand("shape", IrType::Object(String::from("Square"))));

    // A use whose annotation names no known class falls back to the recorded one
    let later_use = Element::operand("shape", IrType::Object(String::from("Blob")));
    assert_eq!(names.owner_of(&later_use).ok().as_deref(), Some("shapes/Circle"));
}

#[test]
fn unknown_owners_are_codegen_errors() {
    let names = QualifiedNames::for_class(&shapes_class());

    let error = names
        .owner_of(&Element::operand("ghost", IrType::Object(String::from("Blob"))))
        .expect_err("nothing was recorded for 'ghost'");
    assert_eq!(error.stage, CompilationStage::Codegen);
}

#[test]
fn descriptors_use_qualified_names() {
    let names = QualifiedNames::for_class(&shapes_class());

    assert_eq!(
        names
            .method_descriptor(
                &[IrType::int_array(), IrType::Object(String::from("Square"))],
                &IrType::Boolean,
            )
            .ok()
            .as_deref(),
        Some("([ILshapes/Square;)Z")
    );
}
