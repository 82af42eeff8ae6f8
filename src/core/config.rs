//! # Configuration Module / 配置模块
//!
//! Run-wide settings of the harness, loadable from a TOML file. Every field
//! has a default, so an empty file (or no file at all) is a valid
//! configuration.
//!
//! 测试工具的全局运行设置，可从 TOML 文件加载。每个字段都有默认值，
//! 因此空文件（或不提供文件）也是合法配置。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings shared by every group and case of one run.
///
/// 一次运行中所有组和用例共享的设置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// When `true`, the first failing case aborts the run instead of being
    /// isolated from its siblings. Meant for debugging.
    /// 为 `true` 时，第一个失败的用例会中止运行，而不是与兄弟用例隔离。用于调试。
    #[serde(default)]
    pub fail_fast: bool,

    /// Maximum number of progress dots printed per benchmarked case.
    /// Zero disables the ticker.
    /// 每个基准用例最多打印的进度点数量。为零时禁用进度条。
    #[serde(default = "default_progress_width")]
    pub progress_width: usize,

    /// Whether console output may use ANSI colors. When `true` the terminal
    /// is still auto-detected; when `false` colors are always off.
    /// 控制台输出是否可以使用 ANSI 颜色。
    #[serde(default = "default_true")]
    pub color: bool,

    /// Print the structured error tree at the end of a failed run.
    /// 在失败的运行结束时打印结构化的错误树。
    #[serde(default = "default_true")]
    pub print_errors: bool,

    /// Where to write the JSON run report, if anywhere.
    /// JSON 运行报告的写入路径（可选）。
    #[serde(default)]
    pub json_report: Option<PathBuf>,
}

fn default_progress_width() -> usize {
    50
}

fn default_true() -> bool {
    true
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            progress_width: default_progress_width(),
            color: true,
            print_errors: true,
            json_report: None,
        }
    }
}

impl HarnessConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse harness configuration")
    }

    /// Reads and parses the configuration file at `path`.
    ///
    /// 读取并解析位于 `path` 的配置文件。
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }
}
