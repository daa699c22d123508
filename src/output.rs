//! Rendering of GPOs and policy settings as table, JSON or CSV text

use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::cli::OutputFormat;
use crate::domain::{GroupPolicyInfo, PolicySettingInfo};
use crate::error::AppResult;

/// Values longer than this are truncated in table output
const MAX_TABLE_VALUE_LEN: usize = 48;

/// Table row for GPOs
#[derive(Tabled)]
struct GpoRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "Settings")]
    settings: usize,
}

/// Table row for policy settings
#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    policy_type: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Value Type")]
    value_type: String,
    #[tabled(rename = "Registry Path")]
    registry_path: String,
}

pub fn render_gpos(gpos: &[GroupPolicyInfo], format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => to_json(gpos),
        OutputFormat::Csv => Ok(to_csv(
            &["Id", "Name", "Domain", "CreatedTime", "ModifiedTime", "Status", "SettingsCount"],
            gpos.iter().map(|gpo| {
                vec![
                    gpo.id.clone(),
                    gpo.name.clone(),
                    gpo.domain.clone(),
                    gpo.created_time.clone(),
                    gpo.modified_time.clone(),
                    gpo.status.clone(),
                    gpo.settings_count.to_string(),
                ]
            }),
        )),
        OutputFormat::Table => {
            if gpos.is_empty() {
                return Ok("No GPOs found.".to_string());
            }
            let rows: Vec<GpoRow> = gpos
                .iter()
                .map(|gpo| GpoRow {
                    id: gpo.id.clone(),
                    name: gpo.name.clone(),
                    domain: gpo.domain.clone(),
                    status: gpo.status.clone(),
                    modified: gpo.modified_time.clone(),
                    settings: gpo.settings_count,
                })
                .collect();
            Ok(to_table(&rows))
        }
    }
}

pub fn render_settings(settings: &[PolicySettingInfo], format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => to_json(settings),
        OutputFormat::Csv => Ok(to_csv(
            &[
                "Name",
                "Description",
                "Type",
                "Value",
                "IsEnabled",
                "RegistryPath",
                "RegistryKey",
                "ValueType",
            ],
            settings.iter().map(|s| {
                vec![
                    s.name.clone(),
                    s.description.clone(),
                    s.policy_type.clone(),
                    s.value.clone(),
                    s.is_enabled.to_string(),
                    s.registry_path.clone(),
                    s.registry_key.clone(),
                    s.value_type.clone(),
                ]
            }),
        )),
        OutputFormat::Table => {
            if settings.is_empty() {
                return Ok("No policy settings found.".to_string());
            }
            let rows: Vec<SettingRow> = settings
                .iter()
                .map(|s| SettingRow {
                    name: s.name.clone(),
                    policy_type: s.policy_type.clone(),
                    value: truncate(&s.value, MAX_TABLE_VALUE_LEN),
                    value_type: s.value_type.clone(),
                    registry_path: s.registry_path.clone(),
                })
                .collect();
            Ok(format!("Found {} setting(s):\n\n{}", rows.len(), to_table(&rows)))
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn to_table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}

fn to_csv(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut lines = vec![header.iter().map(|h| csv_field(h)).collect::<Vec<_>>().join(",")];
    lines.extend(rows.map(|row| row.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",")));
    lines.join("\n")
}

/// Quote a CSV field when it contains a delimiter, quote or line break
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_info() -> GroupPolicyInfo {
        GroupPolicyInfo {
            id: "LOCAL_COMPUTER_POLICY".to_string(),
            name: "Local Computer Policy".to_string(),
            domain: "WS-042".to_string(),
            created_time: "0001-01-01T00:00:00+00:00".to_string(),
            modified_time: "2026-10-01T08:00:00+00:00".to_string(),
            status: "Enabled".to_string(),
            settings_count: 0,
        }
    }

    #[test]
    fn test_json_round_trip() {
        let json = render_gpos(&[local_info()], OutputFormat::Json).unwrap();
        let parsed: Vec<GroupPolicyInfo> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![local_info()]);
    }

    #[test]
    fn test_csv_quoting() {
        let setting = PolicySettingInfo {
            name: "Banner".to_string(),
            description: String::new(),
            policy_type: "AdministrativeTemplates".to_string(),
            value: "Hello, \"world\"".to_string(),
            is_enabled: true,
            registry_path: r"SOFTWARE\Policies\TestApp".to_string(),
            registry_key: "Banner".to_string(),
            value_type: "String".to_string(),
        };
        let csv = render_settings(&[setting], OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Name,Description,Type,Value"));
        assert_eq!(
            lines[1],
            r#"Banner,,AdministrativeTemplates,"Hello, ""world""",true,SOFTWARE\Policies\TestApp,Banner,String"#
        );
    }

    #[test]
    fn test_table_contains_rows() {
        let table = render_gpos(&[local_info()], OutputFormat::Table).unwrap();
        assert!(table.contains("LOCAL_COMPUTER_POLICY"));
        assert!(table.contains("Local Computer Policy"));
    }

    #[test]
    fn test_empty_table_message() {
        assert_eq!(
            render_settings(&[], OutputFormat::Table).unwrap(),
            "No policy settings found."
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
