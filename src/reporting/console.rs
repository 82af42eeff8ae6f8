//! # Console Reporting Module / 控制台报告模块
//!
//! Everything the harness prints goes through here: group banners, the
//! per-case status line, benchmark tables and the final error dump. All
//! output is written through the level-aware [`Logger`], so nesting shows
//! up as indentation.
//!
//! 测试工具打印的所有内容都经过此模块：组横幅、每个用例的状态行、
//! 基准表格以及最终的错误转储。所有输出都通过感知层级的 [`Logger`] 写出，
//! 因此嵌套关系表现为缩进。

use colored::*;
use std::fmt::Display;
use std::time::Duration;

use crate::core::error::AggregateError;
use crate::core::models::{GroupTable, Mode};
use crate::infra::Logger;
use crate::reporting::table::{self, format_duration};

const BANNER_LINE: usize = 14;

/// Printed once by [`crate::test_groups`] before the root group starts.
///
/// ```text
/// +---------------------+
/// |    Start CoTests    |
/// +---------------------+
/// ```
pub fn print_greeting(logger: &Logger) {
    logger.log("+---------------------+");
    logger.log(format!("|    {}    |", "Start CoTests".bold()));
    logger.log("+---------------------+");
}

/// `⌌-------------- Start CoTest <name> --------------`
pub fn print_group_header(logger: &Logger, mode: Mode, name: &str) {
    let line = "-".repeat(BANNER_LINE);
    logger.blank();
    logger.log(format!(
        "⌌{line} Start {} {} {line}",
        mode.greeting(),
        name.bold()
    ));
}

pub fn print_tests_not_found(logger: &Logger) {
    logger.log(format!("⌎ {}", "Tests not found".yellow()));
}

pub fn print_group_footer(logger: &Logger, elapsed: Duration) {
    logger.log(format!("⌎-- Full time: {}", format_duration(elapsed)));
}

/// Prints `table` one level deeper than the group's banner.
pub fn print_table(logger: &Logger, table: &GroupTable) {
    let rows: Vec<(String, Vec<f64>)> = table
        .rows
        .iter()
        .map(|row| (row.name.clone(), row.values.clone()))
        .collect();
    let child = logger.child();
    for line in table::render(&table.headers, &rows) {
        child.log(line);
    }
}

/// Opens a case's status line: `* name:`
pub fn print_case_start(logger: &Logger, name: &str) {
    logger.begin(format!("* {}:", name.cyan()));
}

pub fn print_progress_tick(logger: &Logger) {
    logger.raw(crate::infra::progress::TICK);
}

/// Closes a case's status line with `ok - <time>`.
pub fn print_case_ok(logger: &Logger, elapsed: Duration) {
    logger.end(format!("{} - {}", "ok".green(), format_duration(elapsed)));
}

/// Closes a case's status line with `error: <message>`.
pub fn print_case_error(logger: &Logger, error: impl Display) {
    logger.end(format!("{} {error}", "error:".red()));
}

/// Reports a failing `constructor` / `destructor` hook.
pub fn print_hook_error(logger: &Logger, hook: &str, error: impl Display) {
    logger.log(format!("{} {error}", format!("! {hook} error:").red()));
}

/// Prints the structured dump of every collected failure, each leaf with
/// its full ancestor path.
///
/// 打印所有收集到的失败的结构化转储，每个叶子都带有完整的祖先路径。
pub fn print_failures(logger: &Logger, error: &AggregateError) {
    for line in error.render().lines() {
        logger.log(line.red());
    }
}
