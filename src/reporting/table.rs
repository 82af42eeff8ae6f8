//! # Table Rendering Module / 表格渲染模块
//!
//! Renders a group's results as a bordered text table. Every value column
//! picks one time unit for all of its cells, based on the column's largest
//! value, so the numbers line up and stay comparable.
//!
//! 将组的结果渲染为带边框的文本表格。每个数值列根据该列的最大值
//! 为所有单元格选择同一个时间单位，使数字对齐且便于比较。

use std::time::Duration;

/// Scale (in seconds) and label of every supported unit, largest first.
const UNITS: [(f64, &str); 7] = [
    (60.0, "min"),
    (1.0, "sec"),
    (1e-3, "ms"),
    (1e-6, "µs"),
    (1e-9, "ns"),
    (1e-12, "ps"),
    (1e-15, "fs"),
];

/// Picks the unit for a value of `secs` seconds.
///
/// 为 `secs` 秒的数值选择合适的单位。
pub fn unit_for(secs: f64) -> (f64, &'static str) {
    UNITS
        .iter()
        .copied()
        .find(|(scale, _)| secs > *scale)
        .unwrap_or(UNITS[UNITS.len() - 1])
}

/// Formats `secs` with three decimals in its own best unit.
pub fn format_secs(secs: f64) -> String {
    let (scale, unit) = unit_for(secs);
    format!("{:.3} {unit}", secs / scale)
}

pub fn format_duration(duration: Duration) -> String {
    format_secs(duration.as_secs_f64())
}

/// Renders `rows` (name, one value in seconds per header) under `headers`.
/// The case name is the last column.
///
/// ```text
/// +----------+----------+------+
/// |   full   |   max    | name |
/// +----------+----------+------+
/// | 1.500 ms | 1.200 ms | t0   |
/// +----------+----------+------+
/// ```
pub fn render(headers: &[String], rows: &[(String, Vec<f64>)]) -> Vec<String> {
    let units: Vec<(f64, &str)> = (0..headers.len())
        .map(|col| {
            let max = rows
                .iter()
                .filter_map(|(_, values)| values.get(col).copied())
                .fold(0.0_f64, f64::max);
            unit_for(max)
        })
        .collect();

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|(name, values)| {
            let mut line: Vec<String> = units
                .iter()
                .enumerate()
                .map(|(col, (scale, unit))| {
                    let value = values.get(col).copied().unwrap_or_default();
                    format!("{:.3} {unit}", value / scale)
                })
                .collect();
            line.push(name.clone());
            line
        })
        .collect();

    let mut titles: Vec<String> = headers.to_vec();
    titles.push("name".to_string());

    let widths: Vec<usize> = titles
        .iter()
        .enumerate()
        .map(|(col, title)| {
            cells
                .iter()
                .map(|line| line[col].chars().count())
                .chain(std::iter::once(title.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let name_col = titles.len() - 1;

    let mut out = vec![border.clone()];
    out.push(format!(
        "| {} |",
        titles
            .iter()
            .zip(&widths)
            .map(|(title, w)| format!("{title:^w$}", w = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    ));
    out.push(border.clone());
    for line in &cells {
        out.push(format!(
            "| {} |",
            line.iter()
                .zip(&widths)
                .enumerate()
                .map(|(col, (cell, w))| match col == name_col {
                    true => format!("{cell:<w$}", w = *w),
                    false => format!("{cell:>w$}", w = *w),
                })
                .collect::<Vec<_>>()
                .join(" | ")
        ));
    }
    out.push(border);
    out
}
