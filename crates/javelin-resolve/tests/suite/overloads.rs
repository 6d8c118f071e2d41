use std::sync::Arc;

use javelin_ast::{Ast, AstBuilder, Modifiers, Node, NodeId, TypeRef};
use javelin_resolve::{ResolveError, Resolver};
use pretty_assertions::assert_eq;

use super::support::{node, solver_for, ty};

/// `class Demo { <overloads> void run() { <calls> } }`, with each overload
/// given as (return type, parameter types). A parameter type ending in
/// `...` is variadic.
fn with_overloads(
    name: &str,
    overloads: &[(&str, &[&str])],
    calls: &[&[&str]],
) -> (Arc<Ast>, Vec<NodeId>) {
    let mut b = AstBuilder::new();
    let mut members = Vec::new();
    for (ret, params) in overloads {
        let params = params
            .iter()
            .enumerate()
            .map(|(idx, param)| match param.strip_suffix("...") {
                Some(component) => b.alloc(Node::Parameter {
                    name: format!("p{idx}"),
                    ty: Some(ty(component)),
                    varargs: true,
                }),
                None => b.param(Some(ty(param)), &format!("p{idx}")),
            })
            .collect();
        members.push(b.method(Modifiers::NONE, ty(ret), name, params, None));
    }

    let mut call_ids = Vec::new();
    let mut statements = Vec::new();
    for args in calls {
        let args = args
            .iter()
            .map(|arg| match *arg {
                "null" => b.null(),
                "int" => b.int(1),
                text => b.string(text),
            })
            .collect();
        let call = b.call(None, name, args);
        call_ids.push(call);
        statements.push(b.expr_stmt(call));
    }
    let body = b.block(statements);
    members.push(b.method(Modifiers::NONE, TypeRef::Void, "run", Vec::new(), Some(body)));
    let class = b.class("Demo", members);
    let cu = b.compilation_unit(Some("demo"), Vec::new(), vec![class]);
    (b.finish(cu), call_ids)
}

#[test]
fn most_specific_overload_wins() {
    let (ast, calls) = with_overloads(
        "pick",
        &[("Object", &["Object"]), ("String", &["String"]), ("int", &["int"])],
        &[&["text"], &["int"], &["null"]],
    );
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let returns: Vec<String> = calls
        .iter()
        .map(|call| resolver.type_of(&node(&ast, *call)).unwrap().describe())
        .collect();
    assert_eq!(returns, ["java.lang.String", "int", "java.lang.String"]);
}

#[test]
fn declaration_order_does_not_change_the_winner() {
    let forward = with_overloads(
        "pick",
        &[("Object", &["Object"]), ("String", &["CharSequence"]), ("int", &["String"])],
        &[&["text"]],
    );
    let backward = with_overloads(
        "pick",
        &[("int", &["String"]), ("String", &["CharSequence"]), ("Object", &["Object"])],
        &[&["text"]],
    );
    for (ast, calls) in [forward, backward] {
        let solver = solver_for(&ast);
        let resolver = Resolver::new(&solver);
        assert_eq!(resolver.type_of(&node(&ast, calls[0])).unwrap().describe(), "int");
    }
}

#[test]
fn incomparable_candidates_are_ambiguous() {
    let (ast, calls) = with_overloads(
        "both",
        &[("void", &["Object", "String"]), ("void", &["String", "Object"])],
        &[&["a", "b"]],
    );
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let err = resolver.type_of(&node(&ast, calls[0])).unwrap_err();
    let ResolveError::AmbiguousOverload { name, candidates } = err else {
        panic!("expected an ambiguity, got {err:?}");
    };
    assert_eq!(name, "both");
    assert_eq!(candidates.len(), 2);
}

#[test]
fn fixed_arity_beats_varargs() {
    let (ast, calls) = with_overloads(
        "join",
        &[("int", &["String..."]), ("String", &["String", "String"])],
        &[&["a", "b"], &["a"], &["a", "b", "c"]],
    );
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let returns: Vec<String> = calls
        .iter()
        .map(|call| resolver.type_of(&node(&ast, *call)).unwrap().describe())
        .collect();
    assert_eq!(returns, ["java.lang.String", "int", "int"]);
}

#[test]
fn missing_methods_are_unresolved() {
    let (ast, calls) = with_overloads("present", &[("void", &[])], &[&["int"]]);
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    assert_eq!(
        resolver.type_of(&node(&ast, calls[0])).unwrap_err(),
        ResolveError::UnresolvedSymbol {
            name: "present".into(),
            context: "call to `present`".into(),
        }
    );
    assert!(!resolver.solve_method_call(&node(&ast, calls[0])).unwrap().is_solved());
}
