//! # Reporting Unit Tests / 报告单元测试
//!
//! Tests console banners, the results table and the JSON report.
//!
//! 测试控制台横幅、结果表以及 JSON 报告。

use chrono::Utc;
use cotest_runner::core::models::{FailureRecord, GroupTable, TableRow};
use cotest_runner::reporting::{console, json, table};
use cotest_runner::{Logger, Mode, RunReport};
use std::time::Duration;
use tempfile::tempdir;

fn sample_report() -> RunReport {
    RunReport {
        name: "suite".to_string(),
        mode: Mode::Bench { iterations: 3 },
        started_at: Utc::now(),
        elapsed_secs: 1.5,
        tables: vec![GroupTable {
            group: "suite".to_string(),
            headers: vec!["full".into(), "max".into(), "min".into(), "avg".into()],
            rows: vec![TableRow {
                name: "fast".to_string(),
                values: vec![0.6, 0.3, 0.1, 0.2],
            }],
        }],
        failures: vec![FailureRecord {
            path: "suite".to_string(),
            origin: Some("slow".to_string()),
            message: "boom".to_string(),
        }],
        error: None,
    }
}

#[cfg(test)]
mod console_tests {
    use super::*;

    #[test]
    fn test_banners() {
        colored::control::set_override(false);
        let (logger, output) = Logger::capture();

        console::print_group_header(&logger, Mode::Test, "alpha");
        console::print_group_header(&logger.child(), Mode::Bench { iterations: 2 }, "beta");
        console::print_group_footer(&logger, Duration::from_millis(1500));

        assert_eq!(
            output.lines(),
            [
                "",
                "⌌-------------- Start CoTest alpha --------------",
                "¦ ",
                "¦ ⌌-------------- Start CoBench beta --------------",
                "⌎-- Full time: 1.500 sec",
            ]
        );
    }

    #[test]
    fn test_table_is_indented_one_level() {
        colored::control::set_override(false);
        let (logger, output) = Logger::capture();
        let report = sample_report();

        console::print_table(&logger, &report.tables[0]);
        let lines = output.lines();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|line| line.starts_with("¦ +") || line.starts_with("¦ |")));
        assert!(lines[3].contains("600.000 ms"));
        assert!(lines[3].contains("300.000 ms"));
    }
}

#[cfg(test)]
mod table_tests {
    use super::*;

    #[test]
    fn test_each_column_picks_its_unit() {
        let lines = table::render(
            &["full".to_string(), "avg".to_string()],
            &[("t".to_string(), vec![2.5, 0.000_004])],
        );
        assert!(lines[3].contains("2.500 sec"));
        assert!(lines[3].contains("4.000 µs"));
    }

    #[test]
    fn test_header_row_names_every_column() {
        let lines = table::render(&["time".to_string()], &[("only".to_string(), vec![0.01])]);
        assert!(lines[1].contains("time"));
        assert!(lines[1].contains("name"));
        assert_eq!(table::format_duration(Duration::from_secs(120)), "2.000 min");
    }
}

#[cfg(test)]
mod json_tests {
    use super::*;

    #[test]
    fn test_report_serializes_its_results() {
        let text = json::to_json_string(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["name"], "suite");
        assert_eq!(value["mode"]["bench"]["iterations"], 3);
        assert_eq!(value["tables"][0]["rows"][0]["name"], "fast");
        assert_eq!(value["failures"][0]["origin"], "slow");
        assert!(value["started_at"].is_string());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_report_file_and_directories_are_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        json::write_json_report(&sample_report(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"elapsed_secs\": 1.5"));
    }
}
