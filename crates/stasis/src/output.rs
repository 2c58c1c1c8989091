//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one key per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use stasis_core::{DomainObject, Promoted};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views don't use
/// `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Domain objects ───────────────────────────────────────────────────

/// Serializes as the object's snapshot.
pub struct ObjectView<'a>(pub &'a DomainObject);

impl Serialize for ObjectView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.json().serialize(serializer)
    }
}

#[derive(Tabled)]
pub struct ObjectRow {
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "State")]
    pub state: String,
}

fn field_or_dash(object: &DomainObject, field: &str) -> String {
    match object.get(field) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null | Value::String(_)) | None => "-".into(),
        Some(other) => other.to_string(),
    }
}

fn object_row(view: &ObjectView<'_>) -> ObjectRow {
    let object = view.0;
    ObjectRow {
        kind: object.kind().to_owned(),
        key: object.key().to_string(),
        name: field_or_dash(object, "name"),
        state: field_or_dash(object, "state"),
    }
}

fn object_detail(view: &ObjectView<'_>, color: bool) -> String {
    let header = view.0.to_string();
    let header = if color {
        header.bold().cyan().to_string()
    } else {
        header
    };
    format!("{header}\n{}", render_json_pretty(view.0.json()))
}

/// Render any promotion outcome.
pub fn render_promoted(format: &OutputFormat, promoted: &Promoted, color: bool) -> String {
    match promoted {
        Promoted::Empty => String::new(),
        Promoted::Object(object) => render_single(
            format,
            &ObjectView(object),
            |view| object_detail(view, color),
            |view| view.0.key().to_string(),
        ),
        Promoted::List(objects) => {
            let views: Vec<ObjectView<'_>> = objects.iter().map(ObjectView).collect();
            render_list(format, &views, object_row, |view| view.0.key().to_string())
        }
        Promoted::Json(value) => render_single(format, value, render_json_pretty::<Value>, plain_value),
    }
}

fn plain_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(plain_value).collect::<Vec<_>>().join("\n"),
        other => other.to_string(),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    if compact {
        render_json_compact(data)
    } else {
        render_json_pretty(data)
    }
}

/// YAML output.
pub(crate) fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn plain_value_flattens_arrays() {
        assert_eq!(plain_value(&json!(["a", "b", 3])), "a\nb\n3");
        assert_eq!(plain_value(&json!("x")), "x");
    }

    #[test]
    fn empty_renders_nothing() {
        assert!(render_promoted(&OutputFormat::Json, &Promoted::Empty, false).is_empty());
    }

    #[test]
    fn json_passthrough_renders_as_json() {
        let out = render_promoted(
            &OutputFormat::JsonCompact,
            &Promoted::Json(json!({"system": {"version": "20"}})),
            false,
        );
        assert_eq!(out, r#"{"system":{"version":"20"}}"#);
    }
}
