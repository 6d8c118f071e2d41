use std::sync::Arc;

use javelin_ast::{AstBuilder, Import};
use javelin_resolve::{
    CombinedTypeSolver, ReflectionTypeSolver, Resolver, RuntimeClass, RuntimeRegistry,
    SourceTypeSolver,
};
use pretty_assertions::assert_eq;

use super::support::{class_with_method, node};

#[test]
fn host_classes_name_platform_types_by_simple_name() {
    let greeter = RuntimeClass::parse(
        "public class lib.Greeter",
        &[
            "public static String greet(Object who)",
            "public static int size(CharSequence text)",
            "public static Comparable<String> key(String text)",
        ],
    )
    .unwrap();

    let mut b = AstBuilder::new();
    let class_name = b.name("Greeter");
    let one = b.int(1);
    let greet = b.call(Some(class_name), "greet", vec![one]);
    let class_name = b.name("Greeter");
    let text = b.string("abc");
    let size = b.call(Some(class_name), "size", vec![text]);
    let class_name = b.name("Greeter");
    let text = b.string("abc");
    let key = b.call(Some(class_name), "key", vec![text]);
    let statements = vec![b.expr_stmt(greet), b.expr_stmt(size), b.expr_stmt(key)];
    let imports = vec![Import::single("lib.Greeter")];
    let ast = class_with_method(b, imports, "Demo", Vec::new(), statements);

    let solver = CombinedTypeSolver::new()
        .with(SourceTypeSolver::new().with_unit(Arc::clone(&ast)))
        .with(ReflectionTypeSolver::new(RuntimeRegistry::from_classes([greeter])))
        .with(ReflectionTypeSolver::jdk());
    let resolver = Resolver::new(&solver);

    assert_eq!(resolver.type_of(&node(&ast, greet)).unwrap().describe(), "java.lang.String");
    assert_eq!(resolver.type_of(&node(&ast, size)).unwrap().describe(), "int");
    assert_eq!(
        resolver.type_of(&node(&ast, key)).unwrap().describe(),
        "java.lang.Comparable<java.lang.String>"
    );
}
