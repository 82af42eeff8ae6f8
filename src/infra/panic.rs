//! # Panic Guard Module / Panic 保护模块
//!
//! Test callables signal failure by returning `Err` or by panicking
//! (`assert!` and friends). Both end up as an [`anyhow::Error`] so a panic
//! in one case never tears down its siblings.
//!
//! 被测函数可以通过返回 `Err` 或 panic（如 `assert!`）来表示失败。
//! 两者都会被转换为 [`anyhow::Error`]，因此一个用例的 panic 不会影响其兄弟用例。

use anyhow::{Result, anyhow};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Converts a panic payload into a string.
///
/// `panic!` produces `&'static str` or `String` payloads; anything else is
/// reported with a generic placeholder.
pub fn payload_as_string(payload: Box<dyn Any + Send + 'static>) -> String {
    payload
        .downcast::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|payload| payload.downcast::<String>().map(|s| *s))
        .unwrap_or_else(|_| String::from("Box<dyn Any>"))
}

/// Runs `f`, turning a panic into an error.
/// 运行 `f`，并将 panic 转换为错误。
pub fn guard<F>(f: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(anyhow!("panicked: {}", payload_as_string(payload))),
    }
}

/// Awaits `fut`, turning a panic during any poll into an error.
/// 等待 `fut` 完成，并将任意一次 poll 中的 panic 转换为错误。
pub async fn guard_future<F>(fut: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(anyhow!("panicked: {}", payload_as_string(payload))),
    }
}
