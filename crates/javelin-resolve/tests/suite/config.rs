use std::io::Write;

use javelin_ast::{AstBuilder, Import};
use javelin_resolve::{ConfigError, LoggingConfig, ResolveError, Resolver, ResolverConfig};
use pretty_assertions::assert_eq;

use super::support::{class_with_method, node, solver_for, ty};

#[test]
fn defaults_apply_to_an_empty_file() {
    let config = ResolverConfig::from_toml_str("").unwrap();
    assert_eq!(config, ResolverConfig::default());
    assert_eq!(config.max_depth, 256);
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json);
}

#[test]
fn config_is_loaded_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_depth = 8").unwrap();
    writeln!(file, "[logging]").unwrap();
    writeln!(file, "level = \"debug\"").unwrap();
    writeln!(file, "json = true").unwrap();

    let config = ResolverConfig::load(file.path()).unwrap();
    assert_eq!(
        config,
        ResolverConfig {
            max_depth: 8,
            logging: LoggingConfig {
                level: "debug".into(),
                json: true,
            },
        }
    );
}

#[test]
fn load_errors_name_their_cause() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("resolver.toml");
    let err = ResolverConfig::load(&missing).unwrap_err();
    let ConfigError::Io { path, .. } = &err else {
        panic!("expected an io error, got {err:?}");
    };
    assert_eq!(path, &missing.display().to_string());

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "max_depth = [").unwrap();
    assert!(matches!(ResolverConfig::load(&bad), Err(ConfigError::Toml(_))));
}

#[test]
fn max_depth_bounds_nested_queries() {
    let mut b = AstBuilder::new();
    let list_param = b.param(Some(ty("List<Integer>")), "list");
    let list = b.name("list");
    let stream = b.call(Some(list), "stream", Vec::new());
    let count = b.call(Some(stream), "count", Vec::new());
    let stmt = b.expr_stmt(count);
    let imports = vec![Import::single("java.util.List")];
    let ast = class_with_method(b, imports, "Demo", vec![list_param], vec![stmt]);
    let solver = solver_for(&ast);

    let shallow = Resolver::with_config(
        &solver,
        ResolverConfig {
            max_depth: 1,
            ..ResolverConfig::default()
        },
    );
    assert_eq!(
        shallow.type_of(&node(&ast, count)).unwrap_err(),
        ResolveError::ResolutionTooDeep { limit: 1 }
    );

    let resolver = Resolver::new(&solver);
    assert_eq!(resolver.type_of(&node(&ast, count)).unwrap().describe(), "long");
}
