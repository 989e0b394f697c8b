//! Report rendering for the terminal and for machine consumers

use serde::Serialize;

use crate::audit::types::{AuditEntry, AuditReport};

const NOT_FOUND: &str = "Not Found";

const HEADERS: [&str; 7] = [
    "Package", "Type", "Version", "Latest", "Target", "Outdated", "Link",
];

/// JSON document printed by `--format json`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a AuditReport,
    upgrade_command: &'a str,
}

fn row(entry: &AuditEntry) -> [String; 7] {
    let kind = if entry.instance.is_dev { "dev" } else { "dep" };
    let (latest, link) = match &entry.package {
        Some(package) => (
            package.latest_version.clone(),
            package.npm_page.clone().unwrap_or_default(),
        ),
        None => (NOT_FOUND.to_string(), NOT_FOUND.to_string()),
    };

    [
        entry.package_name.clone(),
        kind.to_string(),
        entry.instance.version.clone(),
        latest,
        entry.instance.target_version.clone(),
        entry.instance.outdated.to_string(),
        link,
    ]
}

/// Render the report as an aligned table followed by the upgrade command
pub fn render_text(report: &AuditReport, command: &str) -> String {
    let rows: Vec<[String; 7]> = report.records.iter().map(row).collect();

    let mut widths = HEADERS.map(str::len);
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[&str]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = format!("{}\n\n", report.project_name);
    out.push_str(&format_line(&HEADERS));
    out.push('\n');
    for cells in &rows {
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        out.push_str(&format_line(&cells));
        out.push('\n');
    }

    let outdated = report.outdated_entries().len();
    out.push_str(&format!(
        "\n{} of {} dependencies outdated\n",
        outdated,
        report.records.len()
    ));
    if !command.is_empty() {
        out.push_str(&format!("\n{}\n", command));
    }

    out
}

/// Render the report and the upgrade command as pretty-printed JSON
pub fn render_json(report: &AuditReport, command: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport {
        report,
        upgrade_command: command,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::types::DependencyDeclaration;
    use crate::version::types::PackageRecord;
    use chrono::Utc;

    fn report() -> AuditReport {
        let now = Utc::now();
        AuditReport {
            project_name: "my-app".to_string(),
            records: vec![
                AuditEntry::from_record(
                    &DependencyDeclaration {
                        name: "left-pad".to_string(),
                        version_range: "1.0.0".to_string(),
                        is_dev: false,
                    },
                    PackageRecord {
                        id: 1,
                        name: "left-pad".to_string(),
                        latest_version: "1.3.0".to_string(),
                        versions: vec!["1.3.0".to_string()],
                        npm_page: Some("https://www.npmjs.com/package/left-pad".to_string()),
                        created_at: now,
                        updated_at: now,
                    },
                ),
                AuditEntry::not_found(&DependencyDeclaration {
                    name: "ghost".to_string(),
                    version_range: "^2.0.0".to_string(),
                    is_dev: true,
                }),
            ],
        }
    }

    #[test]
    fn render_text_aligns_columns() {
        let text = render_text(&report(), "npm i left-pad@latest");

        let expected = "\
my-app

Package   Type  Version  Latest     Target  Outdated  Link
left-pad  dep   1.0.0    1.3.0      1.3.0   minor     https://www.npmjs.com/package/left-pad
ghost     dev   ^2.0.0   Not Found  ^2.0.0  ok        Not Found

1 of 2 dependencies outdated

npm i left-pad@latest
";
        assert_eq!(text, expected);
    }

    #[test]
    fn render_text_omits_empty_command() {
        let text = render_text(&report(), "");

        assert!(text.ends_with("1 of 2 dependencies outdated\n"));
    }

    #[test]
    fn render_json_includes_records_and_command() {
        let json = render_json(&report(), "npm i left-pad@latest").unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["projectName"], "my-app");
        assert_eq!(value["upgradeCommand"], "npm i left-pad@latest");
        assert_eq!(value["records"][0]["instance"]["outdated"], "minor");
        assert_eq!(value["records"][1]["package"], serde_json::Value::Null);
    }
}
