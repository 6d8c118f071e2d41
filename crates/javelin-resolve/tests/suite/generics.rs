use javelin_ast::{
    AstBuilder, BinaryOp, Import, Modifiers, Node, TypeDecl, TypeDeclKind, TypeRef,
};
use javelin_resolve::{functional_method, ResolveError, Resolver, TypeUsage};
use pretty_assertions::assert_eq;

use super::support::{class_with_method, node, solver_for, ty};

fn list_import() -> Vec<Import> {
    vec![Import::single("java.util.List")]
}

#[test]
fn lambda_parameter_takes_the_stream_element_type() {
    let mut b = AstBuilder::new();
    let list_param = b.param(Some(ty("List<Integer>")), "list");
    let list = b.name("list");
    let stream = b.call(Some(list), "stream", Vec::new());
    let x_param = b.param(None, "x");
    let x = b.name("x");
    let zero = b.int(0);
    let positive = b.binary(BinaryOp::Greater, x, zero);
    let lambda = b.lambda(vec![x_param], positive);
    let filter = b.call(Some(stream), "filter", vec![lambda]);
    let stmt = b.expr_stmt(filter);
    let ast = class_with_method(b, list_import(), "Demo", vec![list_param], vec![stmt]);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert_eq!(resolver.type_of(&node(&ast, x)).unwrap().describe(), "java.lang.Integer");
    assert_eq!(
        resolver.type_of(&node(&ast, stream)).unwrap().describe(),
        "java.util.stream.Stream<java.lang.Integer>"
    );
    assert_eq!(
        resolver.type_of(&node(&ast, lambda)).unwrap().describe(),
        "java.util.function.Predicate<java.lang.Integer>"
    );
    assert_eq!(
        resolver.type_of(&node(&ast, filter)).unwrap().describe(),
        "java.util.stream.Stream<java.lang.Integer>"
    );
    let symbol = resolver.solve_name(&node(&ast, x)).unwrap().solved().unwrap();
    assert!(symbol.is_parameter());
}

#[test]
fn lambda_arguments_without_lambda_solving_are_placeholders() {
    let mut b = AstBuilder::new();
    let list_param = b.param(Some(ty("List<Integer>")), "list");
    let list = b.name("list");
    let stream = b.call(Some(list), "stream", Vec::new());
    let x_param = b.param(None, "x");
    let x = b.name("x");
    let lambda = b.lambda(vec![x_param], x);
    let filter = b.call(Some(stream), "filter", vec![lambda]);
    let stmt = b.expr_stmt(filter);
    let ast = class_with_method(b, list_import(), "Demo", vec![list_param], vec![stmt]);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let placeholder = resolver.type_of_with(&node(&ast, lambda), false).unwrap();
    let TypeUsage::LambdaPlaceholder(placeholder) = placeholder else {
        panic!("expected a placeholder, got {placeholder:?}");
    };
    assert_eq!(placeholder.index(), 0);

    let usage = resolver.solve_method_as_usage(&node(&ast, filter)).unwrap().unwrap();
    assert_eq!(
        usage.to_string(),
        "filter(java.util.function.Predicate<? super java.lang.Integer>) -> java.util.stream.Stream<java.lang.Integer>"
    );
}

#[test]
fn map_binds_its_result_from_the_lambda_body() {
    let mut b = AstBuilder::new();
    let list_param = b.param(Some(ty("List<Integer>")), "list");
    let list = b.name("list");
    let stream = b.call(Some(list), "stream", Vec::new());
    let x_param = b.param(None, "x");
    let x = b.name("x");
    let text = b.call(Some(x), "toString", Vec::new());
    let lambda = b.lambda(vec![x_param], text);
    let map = b.call(Some(stream), "map", vec![lambda]);
    let stmt = b.expr_stmt(map);
    let ast = class_with_method(b, list_import(), "Demo", vec![list_param], vec![stmt]);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert_eq!(
        resolver.type_of(&node(&ast, lambda)).unwrap().describe(),
        "java.util.function.Function<java.lang.Integer, java.lang.String>"
    );
    assert_eq!(
        resolver.type_of(&node(&ast, map)).unwrap().describe(),
        "java.util.stream.Stream<java.lang.String>"
    );
    // Overload resolution alone cannot see the lambda body.
    assert_eq!(
        resolver.type_of_with(&node(&ast, map), false).unwrap().describe(),
        "java.util.stream.Stream<R>"
    );
}

#[test]
fn block_lambdas_with_one_return_are_typed() {
    let mut b = AstBuilder::new();
    let list_param = b.param(Some(ty("List<Integer>")), "list");
    let list = b.name("list");
    let stream = b.call(Some(list), "stream", Vec::new());
    let x_param = b.param(None, "x");
    let text = b.string("v");
    let ret = b.return_stmt(Some(text));
    let body = b.block(vec![ret]);
    let lambda = b.lambda(vec![x_param], body);
    let map = b.call(Some(stream), "map", vec![lambda]);

    let y_param = b.param(None, "y");
    let first = b.string("a");
    let first_stmt = b.expr_stmt(first);
    let second = b.string("b");
    let second_ret = b.return_stmt(Some(second));
    let long_body = b.block(vec![first_stmt, second_ret]);
    let long_lambda = b.lambda(vec![y_param], long_body);
    let list_again = b.name("list");
    let stream_again = b.call(Some(list_again), "stream", Vec::new());
    let long_map = b.call(Some(stream_again), "map", vec![long_lambda]);

    let statements = vec![b.expr_stmt(map), b.expr_stmt(long_map)];
    let ast = class_with_method(b, list_import(), "Demo", vec![list_param], statements);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert_eq!(
        resolver.type_of(&node(&ast, map)).unwrap().describe(),
        "java.util.stream.Stream<java.lang.String>"
    );
    assert!(matches!(
        resolver.type_of(&node(&ast, long_map)),
        Err(ResolveError::UnsupportedConstruct { .. })
    ));
}

#[test]
fn varargs_bind_the_boxed_element_type() {
    let mut b = AstBuilder::new();
    let arrays = b.name("Arrays");
    let one = b.int(1);
    let two = b.int(2);
    let as_list = b.call(Some(arrays), "asList", vec![one, two]);
    let list = b.name("List");
    let a = b.string("a");
    let of = b.call(Some(list), "of", vec![a]);
    let statements = vec![b.expr_stmt(as_list), b.expr_stmt(of)];
    let imports = vec![Import::single("java.util.Arrays"), Import::single("java.util.List")];
    let ast = class_with_method(b, imports, "Demo", Vec::new(), statements);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert_eq!(
        resolver.type_of(&node(&ast, as_list)).unwrap().describe(),
        "java.util.List<java.lang.Integer>"
    );
    assert_eq!(
        resolver.type_of(&node(&ast, of)).unwrap().describe(),
        "java.util.List<java.lang.String>"
    );
}

#[test]
fn lambda_initializer_uses_the_declared_type() {
    let mut b = AstBuilder::new();
    let s_param = b.param(None, "s");
    let s = b.name("s");
    let empty = b.call(Some(s), "isEmpty", Vec::new());
    let lambda = b.lambda(vec![s_param], empty);
    let decl = b.local_var(ty("Predicate<String>"), "blank", Some(lambda));
    let imports = vec![Import::single("java.util.function.Predicate")];
    let ast = class_with_method(b, imports, "Demo", Vec::new(), vec![decl]);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert_eq!(resolver.type_of(&node(&ast, s)).unwrap().describe(), "java.lang.String");
    assert_eq!(resolver.type_of(&node(&ast, empty)).unwrap().describe(), "boolean");
    let predicate = resolver.type_of(&node(&ast, lambda)).unwrap();
    assert_eq!(predicate.describe(), "java.util.function.Predicate<java.lang.String>");
    let test = functional_method(&predicate, &solver).unwrap().unwrap();
    assert_eq!(test.to_string(), "test(java.lang.String) -> boolean");
}

#[test]
fn receiver_arguments_answer_type_variable_lookups() {
    let mut b = AstBuilder::new();
    let list_param = b.param(Some(ty("List<Integer>")), "list");
    let list = b.name("list");
    let stream = b.call(Some(list), "stream", Vec::new());
    let stmt = b.expr_stmt(stream);
    let ast = class_with_method(b, list_import(), "Demo", vec![list_param], vec![stmt]);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let call = node(&ast, stream);
    assert_eq!(resolver.solve_type_usage("E", &call).unwrap().describe(), "java.lang.Integer");
    assert_eq!(resolver.solve_type_usage("String", &call).unwrap().describe(), "java.lang.String");
    assert!(resolver.solve_type_usage("Nope", &call).unwrap_err().is_unresolved());
}

#[test]
fn source_generics_substitute_through_members() {
    let mut b = AstBuilder::new();
    let t = b.type_param("T", Vec::new());
    let value = b.field(Modifiers::PRIVATE, ty("T"), "value");
    let get = b.method(Modifiers::PUBLIC, ty("T"), "get", Vec::new(), None);
    let boxed = b.alloc(Node::TypeDecl(TypeDecl {
        kind: TypeDeclKind::Class,
        name: "Box".into(),
        modifiers: Modifiers::PUBLIC,
        type_params: vec![t],
        extends: Vec::new(),
        implements: Vec::new(),
        members: vec![value, get],
    }));

    let param = b.param(Some(ty("Box<String>")), "box");
    let receiver = b.name("box");
    let call = b.call(Some(receiver), "get", Vec::new());
    let field_receiver = b.name("box");
    let read = b.field_access(field_receiver, "value");
    let statements = vec![b.expr_stmt(call), b.expr_stmt(read)];
    let body = b.block(statements);
    let run = b.method(Modifiers::NONE, TypeRef::Void, "run", vec![param], Some(body));
    let user = b.class("User", vec![run]);
    let cu = b.compilation_unit(Some("demo"), Vec::new(), vec![boxed, user]);
    let ast = b.finish(cu);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert_eq!(resolver.type_of(&node(&ast, call)).unwrap().describe(), "java.lang.String");
    assert_eq!(resolver.type_of(&node(&ast, read)).unwrap().describe(), "java.lang.String");
    assert_eq!(
        resolver.convert_type(&ty("Box<Box<String>>"), &node(&ast, call)).unwrap().describe(),
        "demo.Box<demo.Box<java.lang.String>>"
    );
    assert!(matches!(
        resolver.convert_type(&ty("Box<String, String>"), &node(&ast, call)),
        Err(ResolveError::TypeArgumentCount { .. })
    ));
}

#[test]
fn calls_typed_by_their_lambdas_bind_the_enclosing_call() {
    let mut b = AstBuilder::new();
    let list_param = b.param(Some(ty("List<Integer>")), "list");
    let list = b.name("list");
    let stream = b.call(Some(list), "stream", Vec::new());
    let x_param = b.param(None, "x");
    let x = b.name("x");
    let text = b.call(Some(x), "toString", Vec::new());
    let lambda = b.lambda(vec![x_param], text);
    let map = b.call(Some(stream), "map", vec![lambda]);
    let optional = b.name("Optional");
    let of = b.call(Some(optional), "of", vec![map]);
    let stmt = b.expr_stmt(of);
    let imports = vec![Import::single("java.util.List"), Import::single("java.util.Optional")];
    let ast = class_with_method(b, imports, "Demo", vec![list_param], vec![stmt]);
    let solver = solver_for(&ast);

    // Outer call first, so nothing about `map` is cached yet.
    let resolver = Resolver::new(&solver);
    assert_eq!(
        resolver.type_of(&node(&ast, of)).unwrap().describe(),
        "java.util.Optional<java.util.stream.Stream<java.lang.String>>"
    );
    assert_eq!(
        resolver.type_of_with(&node(&ast, of), false).unwrap().describe(),
        "java.util.Optional<java.util.stream.Stream<R>>"
    );

    let resolver = Resolver::new(&solver);
    assert_eq!(
        resolver.type_of(&node(&ast, map)).unwrap().describe(),
        "java.util.stream.Stream<java.lang.String>"
    );
    assert_eq!(
        resolver.type_of(&node(&ast, of)).unwrap().describe(),
        "java.util.Optional<java.util.stream.Stream<java.lang.String>>"
    );
}
