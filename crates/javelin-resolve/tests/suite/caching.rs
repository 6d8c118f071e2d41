use javelin_ast::{AstBuilder, BinaryOp, Import, NodeId};
use javelin_resolve::Resolver;
use pretty_assertions::assert_eq;

use super::support::{class_with_method, node, solver_for, ty, CountingSolver};

/// `void run(List<Integer> list) { list.stream().filter(x -> x > 0); }`
fn filtered_stream() -> (std::sync::Arc<javelin_ast::Ast>, NodeId) {
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
    let imports = vec![Import::single("java.util.List")];
    let ast = class_with_method(b, imports, "Demo", vec![list_param], vec![stmt]);
    (ast, filter)
}

#[test]
fn repeated_queries_do_not_reach_the_solver() {
    let (ast, filter) = filtered_stream();
    let solver = CountingSolver::new(solver_for(&ast));
    let resolver = Resolver::new(&solver);

    let first = resolver.type_of(&node(&ast, filter)).unwrap();
    assert!(solver.take() > 0);
    assert!(resolver.cached_types() > 0);

    let second = resolver.type_of(&node(&ast, filter)).unwrap();
    assert_eq!(second, first);
    assert_eq!(solver.take(), 0);
}

#[test]
fn clearing_forces_recomputation() {
    let (ast, filter) = filtered_stream();
    let solver = CountingSolver::new(solver_for(&ast));
    let resolver = Resolver::new(&solver);

    let before = resolver.type_of(&node(&ast, filter)).unwrap();
    solver.take();
    resolver.clear_caches();
    assert_eq!(resolver.cached_types(), 0);

    let after = resolver.type_of(&node(&ast, filter)).unwrap();
    assert_eq!(after, before);
    assert!(solver.take() > 0);
}

#[test]
fn modes_are_memoized_separately() {
    let (ast, filter) = filtered_stream();
    let solver = solver_for(&ast);
    let resolver = Resolver::new(&solver);

    let with = resolver.type_of(&node(&ast, filter)).unwrap();
    let cached = resolver.cached_types();
    let without = resolver.type_of_with(&node(&ast, filter), false).unwrap();

    assert_eq!(with.describe(), "java.util.stream.Stream<java.lang.Integer>");
    assert_eq!(without, with);
    assert!(resolver.cached_types() > cached);
}
