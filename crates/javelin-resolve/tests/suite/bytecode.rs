use std::sync::Arc;

use javelin_ast::{Ast, AstBuilder, Import, NodeId};
use javelin_classfile::{ClassWriter, MemberSpec, ACC_PUBLIC, ACC_STATIC, ACC_SUPER};
use javelin_resolve::{
    BytecodeTypeSolver, CombinedTypeSolver, ReflectionTypeSolver, ResolveError, Resolver,
    SourceTypeSolver,
};
use pretty_assertions::assert_eq;

use super::support::{class_with_method, node, ty};

/// `lib.Box<T>` with `T get()`, plus a static `make` whose generic signature
/// does not parse next to a well-formed `String make(String)`.
fn box_class(with_good_make: bool) -> Vec<u8> {
    let mut class = ClassWriter::new(ACC_PUBLIC | ACC_SUPER, "lib/Box")
        .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
        .method(
            MemberSpec::new(ACC_PUBLIC, "get", "()Ljava/lang/Object;").with_signature("()TT;"),
        )
        .method(
            MemberSpec::new(
                ACC_PUBLIC | ACC_STATIC,
                "make",
                "(Ljava/lang/Object;)Ljava/lang/Object;",
            )
            .with_signature("(TU;"),
        );
    if with_good_make {
        class = class.method(MemberSpec::new(
            ACC_PUBLIC | ACC_STATIC,
            "make",
            "(Ljava/lang/String;)Ljava/lang/String;",
        ));
    }
    class.to_bytes()
}

fn solver(unit: &Arc<Ast>, class_bytes: &[u8]) -> CombinedTypeSolver {
    CombinedTypeSolver::new()
        .with(SourceTypeSolver::new().with_unit(Arc::clone(unit)))
        .with(BytecodeTypeSolver::new().with_class_bytes(class_bytes).unwrap())
        .with(ReflectionTypeSolver::jdk())
}

/// `void run(Box<String> b) { Box.make("x"); b.get(); }`
fn usage() -> (Arc<Ast>, NodeId, NodeId) {
    let mut b = AstBuilder::new();
    let param = b.param(Some(ty("Box<String>")), "b");
    let class_name = b.name("Box");
    let x = b.string("x");
    let make = b.call(Some(class_name), "make", vec![x]);
    let receiver = b.name("b");
    let get = b.call(Some(receiver), "get", Vec::new());
    let statements = vec![b.expr_stmt(make), b.expr_stmt(get)];
    let imports = vec![Import::single("lib.Box")];
    let ast = class_with_method(b, imports, "Demo", vec![param], statements);
    (ast, make, get)
}

#[test]
fn class_file_generics_flow_into_call_types() {
    let (ast, _, get) = usage();
    let solver = solver(&ast, &box_class(true));
    let resolver = Resolver::new(&solver);

    assert_eq!(resolver.type_of(&node(&ast, get)).unwrap().describe(), "java.lang.String");
    assert_eq!(
        resolver.convert_type(&ty("Box<Integer>"), &node(&ast, get)).unwrap().describe(),
        "lib.Box<java.lang.Integer>"
    );
}

#[test]
fn malformed_signatures_only_drop_their_own_member() {
    let (ast, make, _) = usage();
    let solver = solver(&ast, &box_class(true));
    let resolver = Resolver::new(&solver);

    assert_eq!(resolver.type_of(&node(&ast, make)).unwrap().describe(), "java.lang.String");
}

#[test]
fn a_lone_malformed_candidate_surfaces_its_error() {
    let (ast, make, get) = usage();
    let solver = solver(&ast, &box_class(false));
    let resolver = Resolver::new(&solver);

    let err = resolver.type_of(&node(&ast, make)).unwrap_err();
    let ResolveError::MalformedGenericSignature { signature, .. } = err else {
        panic!("expected a signature error, got {err:?}");
    };
    assert_eq!(signature, "(TU;");
    // The rest of the class is still usable.
    assert_eq!(resolver.type_of(&node(&ast, get)).unwrap().describe(), "java.lang.String");
}

#[test]
fn truncated_class_bytes_are_rejected() {
    let bytes = box_class(true);
    let err = BytecodeTypeSolver::new().with_class_bytes(&bytes[..12]).unwrap_err();
    assert!(matches!(err, ResolveError::ClassFile(_)), "{err:?}");
}
