//! # Argument Resolver Unit Tests / 参数解析器单元测试
//!
//! Covers the precedence rules between global, personal and per-item
//! arguments and the conflicts that make a group unbuildable.
//!
//! 覆盖全局、个人和条目级参数之间的优先级规则，以及导致组无法装配的冲突。

use cotest_runner::core::args::{ArgResolver, ArgSpec, expect_args, expect_kwargs};
use cotest_runner::core::models::{Args, Kwargs};
use cotest_runner::{BuildError, Params};
use serde_json::{Value, json};

fn kwargs(value: Value) -> Kwargs {
    value.as_object().cloned().unwrap_or_default()
}

fn resolver(spec: ArgSpec) -> ArgResolver {
    ArgResolver::new(spec).unwrap()
}

#[cfg(test)]
mod shared_argument_tests {
    use super::*;

    #[test]
    fn test_no_sources_yield_one_empty_binding() {
        let params = resolver(ArgSpec::default())
            .get("f", &Args::new(), &Kwargs::new())
            .unwrap();
        assert_eq!(params, vec![Params::default()]);
    }

    #[test]
    fn test_global_sources_are_used_by_default() {
        let spec = ArgSpec {
            global_args: vec![json!(1), json!(2)],
            global_kwargs: kwargs(json!({"a": 1})),
            ..ArgSpec::default()
        };
        let params = resolver(spec)
            .get("f", &Args::new(), &kwargs(json!({"b": 2})))
            .unwrap();

        assert_eq!(params.len(), 1);
        assert_eq!(params[0].args, vec![json!(1), json!(2)]);
        assert_eq!(params[0].kwargs, kwargs(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn test_item_args_replace_global_args() {
        let spec = ArgSpec {
            global_args: vec![json!(1)],
            ..ArgSpec::default()
        };
        let params = resolver(spec)
            .get("f", &vec![json!(9)], &Kwargs::new())
            .unwrap();
        assert_eq!(params[0].args, vec![json!(9)]);
    }

    #[test]
    fn test_item_kwargs_win_key_conflicts() {
        let spec = ArgSpec {
            global_kwargs: kwargs(json!({"a": 1, "keep": true})),
            ..ArgSpec::default()
        };
        let params = resolver(spec)
            .get("f", &Args::new(), &kwargs(json!({"a": 2})))
            .unwrap();
        assert_eq!(params[0].kwargs, kwargs(json!({"a": 2, "keep": true})));
    }
}

#[cfg(test)]
mod personal_argument_tests {
    use super::*;

    #[test]
    fn test_one_binding_per_personal_index() {
        let spec = ArgSpec {
            global_kwargs: kwargs(json!({"g": true, "k": "global"})),
            personal_args: vec![vec![json!(1)], vec![json!(2)]],
            personal_kwargs: vec![kwargs(json!({"k": "x"})), kwargs(json!({"k": "y"}))],
            ..ArgSpec::default()
        };
        let resolver = resolver(spec);
        assert!(resolver.is_personal());

        let params = resolver
            .get("f", &Args::new(), &kwargs(json!({"item": 0})))
            .unwrap();
        assert_eq!(
            params,
            vec![
                Params::new(vec![json!(1)], kwargs(json!({"g": true, "k": "x", "item": 0}))),
                Params::new(vec![json!(2)], kwargs(json!({"g": true, "k": "y", "item": 0}))),
            ]
        );
    }

    #[test]
    fn test_personal_kwargs_alone_reuse_global_args() {
        let spec = ArgSpec {
            global_args: vec![json!("shared")],
            personal_kwargs: vec![kwargs(json!({"n": 1})), kwargs(json!({"n": 2})), kwargs(json!({"n": 3}))],
            ..ArgSpec::default()
        };
        let params = resolver(spec).get("f", &Args::new(), &Kwargs::new()).unwrap();

        assert_eq!(params.len(), 3);
        assert!(params.iter().all(|p| p.args == vec![json!("shared")]));
        assert_eq!(params[2].kwarg::<u32>("n").unwrap(), 3);
    }

    #[test]
    fn test_item_args_conflict_with_personal_args() {
        let spec = ArgSpec {
            personal_args: vec![vec![json!(1)]],
            ..ArgSpec::default()
        };
        let error = resolver(spec)
            .get("f", &vec![json!(2)], &Kwargs::new())
            .unwrap_err();
        assert_eq!(error, BuildError::ArgsConflict { item: "f".into() });
        assert!(error.to_string().starts_with("args conflict"));
    }

    #[test]
    fn test_item_kwargs_merge_with_personal_kwargs() {
        let spec = ArgSpec {
            personal_kwargs: vec![kwargs(json!({"k": 1}))],
            ..ArgSpec::default()
        };
        let params = resolver(spec)
            .get("f", &Args::new(), &kwargs(json!({"k": 2})))
            .unwrap();
        assert_eq!(params[0].kwarg::<u32>("k").unwrap(), 2);
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_global_and_personal_args_conflict() {
        let spec = ArgSpec {
            global_args: vec![json!(1)],
            personal_args: vec![vec![json!(2)]],
            ..ArgSpec::default()
        };
        assert_eq!(ArgResolver::new(spec), Err(BuildError::GlobalPersonalConflict));
    }

    #[test]
    fn test_personal_lengths_must_match() {
        let spec = ArgSpec {
            personal_args: vec![vec![json!(1)], vec![json!(2)]],
            personal_kwargs: vec![kwargs(json!({"a": 1}))],
            ..ArgSpec::default()
        };
        assert_eq!(
            ArgResolver::new(spec),
            Err(BuildError::PersonalLengthMismatch { args: 2, kwargs: 1 })
        );
    }

    #[test]
    fn test_argument_shapes_are_checked() {
        assert_eq!(expect_args("f", Value::Null).unwrap(), Args::new());
        assert_eq!(expect_kwargs("f", Value::Null).unwrap(), Kwargs::new());
        assert!(matches!(
            expect_args("f", json!({"a": 1})),
            Err(BuildError::MalformedItem { .. })
        ));
        assert!(matches!(
            expect_kwargs("f", json!([1])),
            Err(BuildError::MalformedItem { .. })
        ));
    }
}
