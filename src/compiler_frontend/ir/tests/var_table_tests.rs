use super::*;
use crate::compiler_frontend::ir::ir_parser::parse_ir;

fn method_from(text: &str) -> IrMethod {
    let mut class = parse_ir(text).expect("IR should parse");
    class.methods.remove(0)
}

#[test]
fn instance_methods_reserve_register_zero_for_this() {
    let method = method_from(
        "\
import io;
public A {
    .method public f(x.i32, xs.array.i32).i32 {
        y.i32 :=.i32 $1.x.i32 +.i32 1.i32;
        z.i32 :=.i32 $2.xs[y.i32].i32;
        invokestatic(io, \"println\", z.i32).V;
        ret.i32 y.i32;
    }
}
",
    );
    let table = VarTable::build(&method);

    assert_eq!(table.register("x"), Some(1));
    assert_eq!(table.register("xs"), Some(2));
    assert_eq!(table.register("y"), Some(3));
    assert_eq!(table.register("z"), Some(4));
    assert_eq!(table.register("this"), None);
    assert_eq!(table.register("io"), None);

    assert_eq!(table.len(), 4);
    assert_eq!(table.locals_limit(), 5);
    assert_eq!(table.names(), vec!["x", "xs", "y", "z"]);
}

#[test]
fn static_methods_start_at_register_zero() {
    let method = method_from(
        "\
public A {
    .method public static main(args.array.String).V {
        a.i32 :=.i32 2.i32;
        ret.V;
    }
}
",
    );
    let table = method.var_table();

    assert_eq!(table.register("args"), Some(0));
    assert_eq!(table.register("a"), Some(1));
    assert_eq!(table.locals_limit(), 2);
}

#[test]
fn types_come_from_the_first_appearance() {
    let method = method_from(
        "\
public A {
    .method public static g().V {
        arr.array.i32 :=.array.i32 new(array, 3.i32).array.i32;
        i.i32 :=.i32 0.i32;
        arr[i.i32].i32 :=.i32 9.i32;
        ret.V;
    }
}
",
    );
    let table = VarTable::build(&method);

    assert_eq!(
        table.get("arr"),
        Some(&VarDescriptor {
            register: 0,
            ty: IrType::int_array(),
        })
    );
    assert_eq!(table.get("i").map(|descriptor| &descriptor.ty), Some(&IrType::Int32));
}

#[test]
fn empty_static_method_has_no_locals() {
    let method = method_from(
        "\
public A {
    .method public static h().V {
        ret.V;
    }
}
",
    );
    let table = VarTable::build(&method);

    assert!(table.is_empty());
    assert_eq!(table.locals_limit(), 0);
}

#[test]
fn field_names_never_take_a_register() {
    let method = method_from(
        "\
public P {
    .field private a.i32;
    .field private b.i32;
    .method public get().i32 {
        t0.i32 :=.i32 getfield(this, a.i32).i32;
        t1.i32 :=.i32 getfield(this, b.i32).i32;
        t2.i32 :=.i32 t0.i32 +.i32 t1.i32;
        putfield(this, a.i32, t2.i32).V;
        ret.i32 t2.i32;
    }
}
",
    );
    let table = VarTable::build(&method);

    assert_eq!(table.names(), vec!["t0", "t1", "t2"]);
    assert_eq!(table.register("a"), None);
    assert_eq!(table.register("b"), None);
    assert_eq!(table.locals_limit(), 4);
}
