//! Output formatting for loaded tables
//!
//! Renders any [`LoadedTable`] in one of the [`OutputFormat`]s, for the command
//! line tool and for callers that want a printable snapshot.

use std::fmt;
use std::str::FromStr;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::database::{LoadedTable, Record};

/// Output format for table snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON array
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// JSON Lines format (one JSON object per line)
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    /// Get a list of all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &[
            "table",
            "markdown",
            "json",
            "json-pretty",
            "json-line",
            "psv",
        ]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
            Self::JsonLine => write!(f, "json-line"),
            Self::Psv => write!(f, "psv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "markdown" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "json-pretty" => Ok(Self::JsonPretty),
            "json-line" => Ok(Self::JsonLine),
            "psv" => Ok(Self::Psv),
            _ => Err(format!(
                "Unknown output format '{}'. Valid formats: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Render a table snapshot in the given format
pub fn render<R: Record>(
    table: &LoadedTable<R>,
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Table => Ok(render_grid(table, false)),
        OutputFormat::Markdown => Ok(render_grid(table, true)),
        OutputFormat::Json => serde_json::to_string(table.rows()),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(table.rows()),
        OutputFormat::JsonLine => {
            let lines = table
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines.join("\n"))
        }
        OutputFormat::Psv => {
            let mut lines = vec![table.columns().join("|")];
            lines.extend(table.iter().map(|row| row.cells().join("|")));
            Ok(lines.join("\n"))
        }
    }
}

fn render_grid<R: Record>(table: &LoadedTable<R>, markdown: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.columns().iter().cloned());
    for row in table {
        builder.push_record(row.cells());
    }

    let mut grid = builder.build();
    if markdown {
        grid.with(Style::markdown());
    } else {
        grid.with(Style::rounded());
    }
    grid.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{user_table, UserRow, USER_TABLE};

    fn users() -> LoadedTable<UserRow> {
        LoadedTable::new(
            USER_TABLE,
            user_table().key_names(),
            vec![UserRow {
                user_id: 1,
                user_name: "alice".to_string(),
                email: Some("a@x.com".to_string()),
                password: "pw1".to_string(),
            }],
        )
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("table").unwrap(), OutputFormat::Table);
        assert_eq!(
            OutputFormat::from_str("JSON-LINE").unwrap(),
            OutputFormat::JsonLine
        );
        assert!(OutputFormat::from_str("md").is_err());
        assert!(OutputFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_output_format_display_round_trips_names() {
        for name in OutputFormat::all_names() {
            let format = OutputFormat::from_str(name).unwrap();
            assert_eq!(&format.to_string(), name);
        }
    }

    #[test]
    fn test_render_psv() {
        let out = render(&users(), OutputFormat::Psv).unwrap();
        assert_eq!(
            out,
            "user_id|user_name|email|password\n1|alice|a@x.com|pw1"
        );
    }

    #[test]
    fn test_render_json() {
        let out = render(&users(), OutputFormat::Json).unwrap();
        assert_eq!(
            out,
            r#"[{"user_id":1,"user_name":"alice","email":"a@x.com","password":"pw1"}]"#
        );
    }

    #[test]
    fn test_render_table_has_header() {
        let out = render(&users(), OutputFormat::Markdown).unwrap();
        assert!(out.contains("user_name"));
        assert!(out.contains("alice"));
    }
}
