//! # Reporting Module / 报告模块
//!
//! This module handles everything the harness shows to people and tools:
//! colored console output through the hierarchical logger, bordered result
//! tables with per-column time units, and the JSON run report.
//!
//! 此模块负责测试工具向用户和工具展示的所有内容：
//! 通过分层日志器输出的彩色控制台信息、按列选择时间单位的带边框结果表，
//! 以及 JSON 运行报告。

pub mod console;
pub mod json;
pub mod table;

// Re-export common reporting functions
pub use json::write_json_report;
pub use table::format_duration;
