//! # Case Unit Tests / 用例单元测试
//!
//! Runs single cases against a manual clock so every measured duration is
//! exact.
//!
//! 使用手动时钟运行单个用例，使每个测量结果都是精确的。

mod common;

use anyhow::anyhow;
use common::{CallLog, Counter, fixture, ticking};
use cotest_runner::core::case::{Case, CaseHooks};
use cotest_runner::core::models::Mode;
use cotest_runner::{Callable, Failure, Hook, Measurement, Params, Summary};
use futures::FutureExt;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

fn no_hooks() -> Arc<CaseHooks> {
    Arc::new(CaseHooks::default())
}

#[cfg(test)]
mod sync_case_tests {
    use super::*;

    #[test]
    fn test_single_run_reports_the_call_duration() {
        let fx = fixture();
        let body = Callable::sync(ticking(&fx.clock, Duration::from_millis(250)));
        let case = Case::new("quarter", body, vec![], no_hooks());

        let elapsed = case.run_test(&fx.ctx).unwrap();
        assert_eq!(elapsed, Duration::from_millis(250));
        assert_eq!(fx.output.contents(), "* quarter:ok - 250.000 ms\n");
    }

    #[test]
    fn test_bench_reduces_every_iteration() {
        let fx = fixture();
        let clock = fx.clock.clone();
        let step = Arc::new(AtomicU64::new(0));
        let body = Callable::sync(move |_| {
            let n = step.fetch_add(1, Ordering::SeqCst) + 1;
            clock.advance(Duration::from_millis(100 * n));
            Ok(())
        });
        let case = Case::new("growing", body, vec![], no_hooks());

        let measurement = case.run_bench(3, &fx.ctx).unwrap();
        assert_eq!(
            measurement,
            Measurement::Aggregate(Summary {
                total: Duration::from_millis(600),
                max: Duration::from_millis(300),
                min: Duration::from_millis(100),
                avg: Duration::from_millis(200),
            })
        );
    }

    #[test]
    fn test_single_iteration_bench_is_a_single_measurement() {
        let fx = fixture();
        let body = Callable::sync(ticking(&fx.clock, Duration::from_secs(1)));
        let case = Case::new("once", body, vec![], no_hooks());

        let measurement = case.run_bench(1, &fx.ctx).unwrap();
        assert_eq!(measurement, Measurement::Single(Duration::from_secs(1)));
    }

    #[test]
    fn test_hook_time_is_excluded() {
        let fx = fixture();
        let pre_clock = fx.clock.clone();
        let post_clock = fx.clock.clone();
        let hooks = Arc::new(CaseHooks {
            pre_test: Some(Hook::sync(move || {
                pre_clock.advance(Duration::from_secs(1));
                Ok(())
            })),
            post_test: Some(Hook::sync(move || {
                post_clock.advance(Duration::from_secs(2));
                Ok(())
            })),
        });
        let body = Callable::sync(ticking(&fx.clock, Duration::from_millis(5)));
        let case = Case::new("hooked", body, vec![], hooks);

        assert_eq!(case.run_test(&fx.ctx).unwrap(), Duration::from_millis(5));
    }

    #[test]
    fn test_hooks_wrap_every_bound_call() {
        let fx = fixture();
        let log = CallLog::default();
        let hooks = Arc::new(CaseHooks {
            pre_test: Some(log.hook("pre")),
            post_test: Some(log.hook("post")),
        });
        let params = vec![
            Params::new(vec![json!(1)], Default::default()),
            Params::new(vec![json!(2)], Default::default()),
        ];
        let case = Case::new("twice", Callable::sync(log.passing("body")), params, hooks);

        case.run_test(&fx.ctx).unwrap();
        assert_eq!(log.calls(), ["pre", "body", "post", "pre", "body", "post"]);
    }

    #[test]
    fn test_bound_durations_are_summed() {
        let fx = fixture();
        let clock = fx.clock.clone();
        let body = Callable::sync(move |params: &Params| {
            let millis: u64 = params.arg(0)?;
            clock.advance(Duration::from_millis(millis));
            Ok(())
        });
        let params = vec![
            Params::new(vec![json!(10)], Default::default()),
            Params::new(vec![json!(30)], Default::default()),
        ];
        let case = Case::new("summed", body, params, no_hooks());

        assert_eq!(case.bound_params().len(), 2);
        assert_eq!(case.run_test(&fx.ctx).unwrap(), Duration::from_millis(40));
    }

    #[test]
    fn test_errors_are_tagged_with_the_case_name() {
        let fx = fixture();
        let case = Case::new(
            "broken",
            Callable::sync(|_| Err(anyhow!("bad input"))),
            vec![],
            no_hooks(),
        );

        let Err(Failure::Leaf { origin, error }) = case.run_test(&fx.ctx) else {
            panic!("expected a leaf failure");
        };
        assert_eq!(origin.as_deref(), Some("broken"));
        assert_eq!(error.to_string(), "bad input");
        assert_eq!(fx.output.contents(), "* broken:error: bad input\n");
    }

    #[test]
    fn test_panics_become_failures() {
        let fx = fixture();
        let case = Case::new(
            "panicky",
            Callable::sync(|_| panic!("assertion failed")),
            vec![],
            no_hooks(),
        );

        let Err(Failure::Leaf { error, .. }) = case.run_test(&fx.ctx) else {
            panic!("expected a leaf failure");
        };
        assert_eq!(error.to_string(), "panicked: assertion failed");
    }

    #[test]
    fn test_failing_pre_hook_skips_the_body() {
        let fx = fixture();
        let counter = Counter::default();
        let body_counter = counter.clone();
        let hooks = Arc::new(CaseHooks {
            pre_test: Some(Hook::sync(|| Err(anyhow!("not ready")))),
            post_test: None,
        });
        let case = Case::new(
            "guarded",
            Callable::sync(move |_| {
                body_counter.bump();
                Ok(())
            }),
            vec![],
            hooks,
        );

        assert!(case.run_test(&fx.ctx).is_err());
        assert_eq!(counter.get(), 0);
    }
}

#[cfg(test)]
mod async_case_tests {
    use super::*;

    #[tokio::test]
    async fn test_async_body_is_awaited() {
        let fx = fixture();
        let clock = fx.clock.clone();
        let body = Callable::future(move |_| {
            let clock = clock.clone();
            async move {
                tokio::task::yield_now().await;
                clock.advance(Duration::from_millis(3));
                Ok::<(), anyhow::Error>(())
            }
        });
        let case = Case::new("awaited", body, vec![], no_hooks());
        assert!(case.is_async());

        let measurement = case.run_bench_async(2, &fx.ctx).await.unwrap();
        assert_eq!(measurement.headline(), Duration::from_millis(6));
    }

    #[tokio::test]
    async fn test_coroutine_runs_once() {
        let fx = fixture();
        let counter = Counter::default();
        let inner = counter.clone();
        let future = async move {
            inner.bump();
            Ok::<(), anyhow::Error>(())
        }
        .boxed();
        let case = Case::from_coroutine("co", future, no_hooks());

        assert!(case.is_coroutine());
        case.run_test_async(&fx.ctx).await.unwrap();
        assert_eq!(counter.get(), 1);

        let Err(Failure::Leaf { error, .. }) = case.run_test_async(&fx.ctx).await else {
            panic!("a coroutine can only be awaited once");
        };
        assert!(error.to_string().contains("cannot reuse coroutines"));
    }

    #[tokio::test]
    async fn test_coroutine_rejects_multiple_iterations() {
        let fx = fixture();
        let future = async { Ok::<(), anyhow::Error>(()) }.boxed();
        let case = Case::from_coroutine("co", future, no_hooks());

        let Err(Failure::Leaf { origin, error }) = case.run_bench_async(3, &fx.ctx).await else {
            panic!("expected a leaf failure");
        };
        assert_eq!(origin.as_deref(), Some("co"));
        assert_eq!(error.to_string(), "cannot reuse coroutines");
    }

    #[tokio::test]
    async fn test_async_hooks_are_awaited() {
        let fx = fixture();
        let log = CallLog::default();
        let pre_log = log.clone();
        let hooks = Arc::new(CaseHooks {
            pre_test: Some(Hook::future(move || {
                let log = pre_log.clone();
                async move {
                    log.push("async pre");
                    Ok::<(), anyhow::Error>(())
                }
            })),
            post_test: Some(log.hook("post")),
        });
        let case = Case::new("mixed", Callable::sync(log.passing("body")), vec![], hooks);
        assert!(case.is_async());

        case.run_test_async(&fx.ctx).await.unwrap();
        assert_eq!(log.calls(), ["async pre", "body", "post"]);
    }

    #[test]
    fn test_coroutine_runs_once_without_a_runtime() {
        let fx = fixture();
        let counter = Counter::default();
        let inner = counter.clone();
        let future = async move {
            inner.bump();
            Ok::<(), anyhow::Error>(())
        }
        .boxed();
        let case = Case::from_coroutine("co", future, no_hooks());

        assert!(case.run_test(&fx.ctx).is_ok());
        assert_eq!(counter.get(), 1);

        let Err(Failure::Leaf { error, .. }) = case.run_bench(2, &fx.ctx) else {
            panic!("a coroutine can only be driven once");
        };
        assert_eq!(error.to_string(), "cannot reuse coroutines");
    }

    #[test]
    fn test_async_body_runs_on_a_fresh_runtime() {
        let fx = fixture();
        let clock = fx.clock.clone();
        let body = Callable::future(move |_| {
            let clock = clock.clone();
            async move {
                tokio::task::yield_now().await;
                clock.advance(Duration::from_millis(4));
                Ok::<(), anyhow::Error>(())
            }
        });
        let case = Case::new("needs_runtime", body, vec![], no_hooks());

        assert_eq!(case.run_test(&fx.ctx).unwrap(), Duration::from_millis(4));
        assert_eq!(Mode::Test.iterations(), 1);
    }

    #[tokio::test]
    async fn test_sync_driver_refuses_async_bodies_inside_runtime() {
        let fx = fixture();
        let case = Case::new(
            "needs_await",
            Callable::future(|_| async { Ok::<(), anyhow::Error>(()) }),
            vec![],
            no_hooks(),
        );

        let Err(Failure::Leaf { origin, error }) = case.run_test(&fx.ctx) else {
            panic!("expected a leaf failure");
        };
        assert_eq!(origin.as_deref(), Some("needs_await"));
        assert!(error.to_string().contains("has to be awaited"));
        assert!(case.run_test_async(&fx.ctx).await.is_ok());
    }
}
