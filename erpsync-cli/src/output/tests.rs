//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::json::CheckOutput;
    use super::super::text::TextFormatter;
    use chrono::{TimeZone, Utc};
    use erpsync_core::{ExportFormat, ExportResult, RecordCount, Resource, ResourceOrigin};
    use erpsync_export::{ExportReport, PRESETS};
    use erpsync_fetch::RepositoryInfo;
    use erpsync_store::{ExportHistory, HistoryEntry};

    fn committed(resource: &str, second: u32, sha: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, second).unwrap(),
            resource: resource.to_string(),
            record_count: 5,
            path: format!("exports/{resource}.csv"),
            format: ExportFormat::Csv,
            commit_sha: sha.map(str::to_string),
        }
    }

    fn report() -> ExportReport {
        let started_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap();
        ExportReport {
            results: vec![
                ExportResult::success(
                    "CustomersV3",
                    5,
                    "exports/CustomersV3_2024-05-01T10-20-30-123Z.csv",
                    Some("0123456789abcdef".into()),
                ),
                ExportResult::skipped("VendorsV2", "No records"),
                ExportResult::error("Workers", 200, "HTTP 503: Service Unavailable"),
            ],
            format: ExportFormat::Csv,
            started_at,
            finished_at: started_at + chrono::Duration::milliseconds(2500),
        }
    }

    #[test]
    fn test_format_report() {
        let formatter = TextFormatter::new(false);
        let history = ExportHistory::new();
        let output = formatter.format_report(&report(), &history, "acme/erp-data", "main");

        assert!(output.starts_with("Export → acme/erp-data@main (csv)"));
        assert!(output.contains("CustomersV3"));
        assert!(output.contains("exports/CustomersV3_2024-05-01T10-20-30-123Z.csv"));
        assert!(output.contains("0123456"));
        assert!(!output.contains("0123456789"));
        assert!(output.contains("No records"));
        assert!(output.contains("HTTP 503"));
        assert!(output.contains("1 succeeded, 1 skipped, 1 failed; 5 records in 2.5s"));
        assert!(!output.contains("Commits"));
    }

    #[test]
    fn test_format_report_lists_history_within_limit() {
        let mut history = ExportHistory::with_limit(2);
        history.record(committed("CustomersV3", 30, Some("0123456789abcdef")));
        history.record(committed("VendorsV2", 31, None));
        history.record(committed("Workers", 32, Some("fedcba9876543210")));

        let output =
            TextFormatter::new(false).format_report(&report(), &history, "acme/erp-data", "main");
        let tail: Vec<&str> = output
            .lines()
            .skip_while(|line| *line != "Commits (newest first)")
            .collect();

        assert_eq!(tail.len(), 3);
        assert!(tail[1].starts_with("  10:20:32 Workers"));
        assert!(tail[1].ends_with("exports/Workers.csv fedcba9"));
        assert!(tail[2].starts_with("  10:20:31 VendorsV2"));
        assert!(tail[2].ends_with("exports/VendorsV2.csv"));
        assert!(!output.contains("exports/CustomersV3.csv"));
    }

    #[test]
    fn test_format_report_no_colors() {
        let history = ExportHistory::new();
        let output = TextFormatter::new(false).format_report(&report(), &history, "acme/x", "main");
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_format_report_colors_failures_red() {
        let history = ExportHistory::new();
        let output = TextFormatter::new(true).format_report(&report(), &history, "acme/x", "main");
        assert!(output.contains("\x1b[31m"), "failures should be red");
    }

    #[test]
    fn test_format_counts_distinguishes_empty_and_unavailable() {
        let mut empty = Resource::new("VendorsV2", ResourceOrigin::Preset).unwrap();
        empty.record_count = Some(RecordCount::Known(0));
        let mut unknown = Resource::new("Custom_Entity", ResourceOrigin::Manual).unwrap();
        unknown.record_count = Some(RecordCount::Unavailable);
        let mut known = Resource::new("CustomersV3", ResourceOrigin::Preset).unwrap();
        known.record_count = Some(RecordCount::Known(1234));

        let output = TextFormatter::new(false).format_counts([&empty, &unknown, &known]);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("0 (empty)"));
        assert!(lines[2].contains("unavailable"));
        assert!(lines[2].contains("manual"));
        assert!(lines[3].ends_with("1234"));
    }

    #[test]
    fn test_format_presets_groups_by_category() {
        let presets: Vec<_> = PRESETS.iter().collect();
        let output = TextFormatter::new(false).format_presets(&presets);

        assert!(output.starts_with("Organization"));
        assert!(output.contains("\nFinance\n"));
        assert!(output.contains("  CustomersV3"));
    }

    #[test]
    fn test_format_repositories() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.format_repositories(&[]), "No repositories with push access");

        let repos = vec![RepositoryInfo {
            full_name: "acme/erp-data".into(),
            default_branch: Some("main".into()),
            private: true,
            permissions: None,
        }];
        let output = formatter.format_repositories(&repos);
        assert!(output.contains("acme/erp-data"));
        assert!(output.contains("private"));
    }

    #[test]
    fn test_format_checks() {
        let checks = vec![
            CheckOutput::ok("ERP", "contoso (12 entity sets)"),
            CheckOutput::failed("GitHub", "no token"),
        ];
        let output = TextFormatter::new(false).format_checks(&checks);
        assert!(output.contains("ERP        ✓ contoso (12 entity sets)"));
        assert!(output.contains("GitHub     ✗ no token"));
    }

    #[test]
    fn test_format_settings() {
        let entries = vec![
            ("erp.url", "(unset)".to_string()),
            ("repo.branch", "main".to_string()),
        ];
        let output = TextFormatter::new(false).format_settings(&entries);
        assert!(output.contains("erp.url              (unset)"));
        assert!(output.contains("repo.branch          main"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use chrono::{TimeZone, Utc};
    use erpsync_core::{ExportFormat, ExportResult, RecordCount, Resource, ResourceOrigin};
    use erpsync_export::ExportReport;
    use erpsync_fetch::RepositoryInfo;
    use erpsync_store::{ExportHistory, HistoryEntry};
    use serde_json::Value;

    #[test]
    fn test_format_report() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap();
        let report = ExportReport {
            results: vec![
                ExportResult::success("CustomersV3", 5, "exports/a.json", None),
                ExportResult::error("VendorsV2", 0, "boom"),
            ],
            format: ExportFormat::Json,
            started_at: at,
            finished_at: at,
        };

        let mut history = ExportHistory::with_limit(5);
        history.record(HistoryEntry {
            timestamp: at,
            resource: "CustomersV3".into(),
            record_count: 5,
            path: "exports/a.json".into(),
            format: ExportFormat::Json,
            commit_sha: Some("abc123".into()),
        });

        let output = JsonFormatter::new(false)
            .format_report(&report, &history, "acme/erp-data", "main")
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["repository"], "acme/erp-data");
        assert_eq!(value["format"], "json");
        assert_eq!(value["succeeded"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["totalRecords"], 5);
        assert_eq!(value["startedAt"], "2024-05-01T10:20:30+00:00");
        assert_eq!(value["results"][0]["status"], "success");
        assert_eq!(value["results"][0]["recordCount"], 5);
        assert!(value["results"][0].get("commitSha").is_none());
        assert_eq!(value["results"][1]["message"], "boom");
        assert_eq!(value["history"].as_array().unwrap().len(), 1);
        assert_eq!(value["history"][0]["resource"], "CustomersV3");
        assert_eq!(value["history"][0]["path"], "exports/a.json");
        assert_eq!(value["history"][0]["recordCount"], 5);
        assert_eq!(value["history"][0]["commitSha"], "abc123");
    }

    #[test]
    fn test_format_counts_uses_null_for_unavailable() {
        let mut a = Resource::new("CustomersV3", ResourceOrigin::Preset).unwrap();
        a.record_count = Some(RecordCount::Known(0));
        let mut b = Resource::new("VendorsV2", ResourceOrigin::Discovered).unwrap();
        b.record_count = Some(RecordCount::Unavailable);

        let output = JsonFormatter::new(false).format_counts([&a, &b]).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value[0]["count"], 0);
        assert_eq!(value[1]["count"], Value::Null);
        assert_eq!(value[1]["origin"], "discovered");
    }

    #[test]
    fn test_format_repositories() {
        let repos = vec![RepositoryInfo {
            full_name: "acme/erp-data".into(),
            default_branch: None,
            private: false,
            permissions: None,
        }];
        let output = JsonFormatter::new(false).format_repositories(&repos).unwrap();
        assert_eq!(output, r#"[{"fullName":"acme/erp-data","private":false}]"#);
    }
}
