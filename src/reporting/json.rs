//! # JSON Report Module / JSON 报告模块
//!
//! Writes a [`RunReport`] as pretty-printed JSON, for CI systems and other
//! tools that want the numbers without scraping the console.
//!
//! 将 [`RunReport`] 写为格式化的 JSON，供 CI 系统和其他工具使用。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::RunReport;

pub fn to_json_string(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize run report")
}

/// Writes `report` to `path`, creating parent directories as needed.
///
/// 将 `report` 写入 `path`，必要时创建父目录。
pub fn write_json_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
    }
    let content = to_json_string(report)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write JSON report: {}", path.display()))
}
