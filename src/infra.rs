//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for the harness:
//! the monotonic clock, the hierarchical console logger, the progress
//! ticker and the panic guard that turns panics into case failures.
//!
//! 此模块为测试工具提供基础设施服务：
//! 单调时钟、分层控制台日志、进度条以及将 panic 转换为用例失败的保护器。

pub mod clock;
pub mod logger;
pub mod panic;
pub mod progress;

// Re-exports
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use logger::{CaptureBuffer, Logger};
pub use progress::ProgressBar;
