use javelin_ast::{
    AssignOp, AstBuilder, BinaryOp, Import, LiteralKind, Modifiers, Node, TypeDecl, TypeDeclKind,
    TypeRef,
};
use javelin_resolve::{ResolveError, Resolver, TypeSolver};
use pretty_assertions::assert_eq;

use super::support::{class_with_method, node, solver_for, ty};

#[test]
fn implicit_superclass_is_object() {
    let mut b = AstBuilder::new();
    let this = b.this();
    let decl = b.local_var(ty("Object"), "o", Some(this));
    let target = b.name("o");
    let again = b.this();
    let assign = b.alloc(Node::Assign {
        op: AssignOp::Assign,
        target,
        value: again,
    });
    let stmt = b.expr_stmt(assign);
    let ast = class_with_method(b, Vec::new(), "Foo", Vec::new(), vec![decl, stmt]);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert_eq!(resolver.type_of(&node(&ast, assign)).unwrap().describe(), "java.lang.Object");
    assert_eq!(resolver.type_of(&node(&ast, this)).unwrap().describe(), "demo.Foo");

    let foo = solver.solve_type("demo.Foo").unwrap();
    let ancestors: Vec<String> = foo
        .all_ancestors(&solver)
        .unwrap()
        .iter()
        .map(|ancestor| ancestor.describe())
        .collect();
    assert_eq!(ancestors, ["java.lang.Object"]);
    let object = solver.solve_type("java.lang.Object").unwrap();
    assert!(object.is_assignable_by(&foo, &solver).unwrap());
}

#[test]
fn literals_have_their_primitive_kind() {
    let mut b = AstBuilder::new();
    let literals = [
        b.int(42),
        b.literal(LiteralKind::Long, "42L"),
        b.literal(LiteralKind::Float, "1.5f"),
        b.literal(LiteralKind::Double, "1.5"),
        b.literal(LiteralKind::Char, "'c'"),
        b.boolean(true),
        b.string("text"),
        b.null(),
    ];
    let statements = literals.iter().map(|id| b.expr_stmt(*id)).collect();
    let ast = class_with_method(b, Vec::new(), "Demo", Vec::new(), statements);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let types: Vec<String> = literals
        .iter()
        .map(|id| resolver.type_of(&node(&ast, *id)).unwrap().describe())
        .collect();
    assert_eq!(
        types,
        ["int", "long", "float", "double", "char", "boolean", "java.lang.String", "null"]
    );
}

#[test]
fn comparisons_and_logic_are_boolean() {
    let ops = [
        BinaryOp::Less,
        BinaryOp::LessEquals,
        BinaryOp::Greater,
        BinaryOp::GreaterEquals,
        BinaryOp::Equals,
        BinaryOp::NotEquals,
        BinaryOp::And,
        BinaryOp::Or,
    ];
    let mut b = AstBuilder::new();
    let mut exprs = Vec::new();
    for op in ops {
        let left = b.string("a");
        let right = b.int(1);
        exprs.push(b.binary(op, left, right));
    }
    let statements = exprs.iter().map(|id| b.expr_stmt(*id)).collect();
    let ast = class_with_method(b, Vec::new(), "Demo", Vec::new(), statements);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    for (op, expr) in ops.iter().zip(&exprs) {
        assert_eq!(
            resolver.type_of(&node(&ast, *expr)).unwrap().describe(),
            "boolean",
            "{op:?}"
        );
    }
}

#[test]
fn arithmetic_takes_the_left_operand() {
    let mut b = AstBuilder::new();
    let text = b.string("a");
    let one = b.int(1);
    let text_first = b.binary(BinaryOp::Plus, text, one);
    let two = b.int(2);
    let more = b.string("b");
    let int_first = b.binary(BinaryOp::Plus, two, more);
    let long = b.literal(LiteralKind::Long, "8L");
    let three = b.int(3);
    let shift = b.binary(BinaryOp::LeftShift, long, three);
    let statements = vec![b.expr_stmt(text_first), b.expr_stmt(int_first), b.expr_stmt(shift)];
    let ast = class_with_method(b, Vec::new(), "Demo", Vec::new(), statements);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let describe = |id| resolver.type_of(&node(&ast, id)).unwrap().describe();
    assert_eq!(describe(text_first), "java.lang.String");
    assert_eq!(describe(int_first), "int");
    assert_eq!(describe(shift), "long");
}

#[test]
fn undeclared_names_are_reported() {
    let mut b = AstBuilder::new();
    let missing = b.name("missing");
    let stmt = b.expr_stmt(missing);
    let ast = class_with_method(b, Vec::new(), "Demo", Vec::new(), vec![stmt]);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let err = resolver.type_of(&node(&ast, missing)).unwrap_err();
    assert_eq!(
        err,
        ResolveError::UnresolvedSymbol {
            name: "missing".into(),
            context: "block".into(),
        }
    );
    assert!(!resolver.solve_name(&node(&ast, missing)).unwrap().is_solved());
}

#[test]
fn locals_are_visible_only_after_their_declaration() {
    let mut b = AstBuilder::new();
    let early = b.name("count");
    let early_stmt = b.expr_stmt(early);
    let zero = b.int(0);
    let decl = b.local_var(ty("int"), "count", Some(zero));
    let late = b.name("count");
    let late_stmt = b.expr_stmt(late);
    let statements = vec![early_stmt, decl, late_stmt];
    let ast = class_with_method(b, Vec::new(), "Demo", Vec::new(), statements);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert!(resolver.type_of(&node(&ast, early)).unwrap_err().is_unresolved());
    assert_eq!(resolver.type_of(&node(&ast, late)).unwrap().describe(), "int");
    let symbol = resolver.solve_name(&node(&ast, late)).unwrap().solved().unwrap();
    assert!(symbol.is_variable());
    assert_eq!(symbol.name(), "count");
}

#[test]
fn static_fields_and_qualified_type_names() {
    let mut b = AstBuilder::new();
    let out = b.qualified_name("System.out");
    let qualified = b.qualified_name("java.lang.System.out");
    let hello = b.string("hi");
    let println = b.call(Some(out), "println", vec![hello]);
    let pi = b.qualified_name("Math.PI");
    let statements = vec![b.expr_stmt(println), b.expr_stmt(qualified), b.expr_stmt(pi)];
    let ast = class_with_method(b, Vec::new(), "Demo", Vec::new(), statements);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let describe = |id| resolver.type_of(&node(&ast, id)).unwrap().describe();
    assert_eq!(describe(out), "java.io.PrintStream");
    assert_eq!(describe(qualified), "java.io.PrintStream");
    assert_eq!(describe(println), "void");
    assert_eq!(describe(pi), "double");

    let method = resolver
        .solve_method_call(&node(&ast, println))
        .unwrap()
        .solved()
        .unwrap();
    assert_eq!(
        method.signature(&solver).unwrap(),
        "java.io.PrintStream.println(java.lang.String)"
    );
}

#[test]
fn arrays_and_class_literals() {
    let mut b = AstBuilder::new();
    let two = b.int(2);
    let three = b.int(3);
    let grid = b.alloc(Node::ArrayCreation {
        element: ty("int"),
        dims: 2,
        sizes: vec![two, three],
    });
    let decl = b.local_var(ty("int[][]"), "grid", Some(grid));
    let read = b.name("grid");
    let zero = b.int(0);
    let row = b.alloc(Node::ArrayAccess {
        array: read,
        index: zero,
    });
    let length = b.field_access(row, "length");
    let string_class = b.alloc(Node::ClassLiteral { ty: ty("String") });
    let int_class = b.alloc(Node::ClassLiteral { ty: ty("int") });
    let statements = vec![
        decl,
        b.expr_stmt(length),
        b.expr_stmt(string_class),
        b.expr_stmt(int_class),
    ];
    let ast = class_with_method(b, Vec::new(), "Demo", Vec::new(), statements);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let describe = |id| resolver.type_of(&node(&ast, id)).unwrap().describe();
    assert_eq!(describe(grid), "int[][]");
    assert_eq!(describe(row), "int[]");
    assert_eq!(describe(length), "int");
    assert_eq!(describe(string_class), "java.lang.Class<java.lang.String>");
    assert_eq!(describe(int_class), "java.lang.Class<java.lang.Integer>");
}

#[test]
fn casts_conditionals_and_instanceof() {
    let mut b = AstBuilder::new();
    let text = b.string("x");
    let cast = b.alloc(Node::Cast {
        ty: ty("Object"),
        expr: text,
    });
    let value = b.string("y");
    let check = b.alloc(Node::InstanceOf {
        expr: value,
        ty: ty("String"),
    });
    let flag = b.boolean(true);
    let yes = b.string("a");
    let no = b.string("b");
    let pick = b.alloc(Node::Conditional {
        condition: flag,
        then_expr: yes,
        else_expr: no,
    });
    let inner = b.int(1);
    let enclosed = b.alloc(Node::Enclosed { inner });
    let created = b.new_object(ty("java.util.ArrayList<String>"), Vec::new());
    let statements = [cast, check, pick, enclosed, created]
        .map(|id| b.expr_stmt(id))
        .to_vec();
    let ast = class_with_method(b, Vec::new(), "Demo", Vec::new(), statements);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let describe = |id| resolver.type_of(&node(&ast, id)).unwrap().describe();
    assert_eq!(describe(cast), "java.lang.Object");
    assert_eq!(describe(check), "boolean");
    assert_eq!(describe(pick), "java.lang.String");
    assert_eq!(describe(enclosed), "int");
    assert_eq!(describe(created), "java.util.ArrayList<java.lang.String>");

    let ctor = resolver
        .solve_constructor_call(&node(&ast, created))
        .unwrap()
        .solved()
        .unwrap();
    assert!(ctor.param_types().is_empty());
}

#[test]
fn fields_see_the_declaring_type_arguments() {
    let mut b = AstBuilder::new();
    let names = b.field(Modifiers::PRIVATE, ty("List<String>"), "names");
    let read = b.name("names");
    let zero = b.int(0);
    let first = b.call(Some(read), "get", vec![zero]);
    let stmt = b.expr_stmt(first);
    let body = b.block(vec![stmt]);
    let method = b.method(Modifiers::NONE, TypeRef::Void, "run", Vec::new(), Some(body));
    let class = b.class("Demo", vec![names, method]);
    let cu = b.compilation_unit(Some("demo"), vec![Import::single("java.util.List")], vec![class]);
    let ast = b.finish(cu);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert_eq!(
        resolver.type_of(&node(&ast, read)).unwrap().describe(),
        "java.util.List<java.lang.String>"
    );
    assert_eq!(resolver.type_of(&node(&ast, first)).unwrap().describe(), "java.lang.String");
    let symbol = resolver.solve_name(&node(&ast, read)).unwrap().solved().unwrap();
    assert!(symbol.is_field());
}

#[test]
fn qualified_this_names_the_outer_type() {
    let mut b = AstBuilder::new();
    let outer_this = b.alloc(Node::This {
        qualifier: Some("Outer".into()),
    });
    let inner_this = b.this();
    let statements = vec![b.expr_stmt(outer_this), b.expr_stmt(inner_this)];
    let body = b.block(statements);
    let method = b.method(Modifiers::NONE, TypeRef::Void, "run", Vec::new(), Some(body));
    let inner = b.class("Inner", vec![method]);
    let outer = b.alloc(Node::TypeDecl(TypeDecl {
        kind: TypeDeclKind::Class,
        name: "Outer".into(),
        modifiers: Modifiers::PUBLIC,
        type_params: Vec::new(),
        extends: Vec::new(),
        implements: Vec::new(),
        members: vec![inner],
    }));
    let cu = b.compilation_unit(Some("demo"), Vec::new(), vec![outer]);
    let ast = b.finish(cu);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert_eq!(resolver.type_of(&node(&ast, outer_this)).unwrap().describe(), "demo.Outer");
    assert_eq!(resolver.this_type(&node(&ast, inner_this)).unwrap().describe(), "demo.Outer.Inner");
}

#[test]
fn unmodelled_nodes_are_unsupported() {
    let mut b = AstBuilder::new();
    let ret = b.return_stmt(None);
    let ast = class_with_method(b, Vec::new(), "Demo", Vec::new(), vec![ret]);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert_eq!(
        resolver.type_of(&node(&ast, ret)).unwrap_err(),
        ResolveError::UnsupportedConstruct {
            construct: "return statement".into(),
        }
    );
}
