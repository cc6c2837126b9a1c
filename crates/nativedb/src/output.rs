//! Output formatting for listings and record details

use eyre::{Result, WrapErr};
use nativedb_core::{GroupMatches, GroupSummary, Record, display_group};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

fn to_json(value: &impl Serialize) -> Result<String> {
    let mut json =
        serde_json::to_string_pretty(value).wrap_err("Failed to serialize output")?;
    json.push('\n');
    Ok(json)
}

/// Render the group listing with per-group record counts
pub fn render_groups(groups: &[GroupSummary<'_>], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(&groups);
    }

    let mut output = String::new();
    if groups.is_empty() {
        output.push_str(&format!("{}\n", "No matching groups".dimmed()));
        return Ok(output);
    }

    let width = groups.iter().map(|g| g.group.len()).max().unwrap_or(0);
    for summary in groups {
        let count = if summary.count == 0 {
            "empty".dimmed().to_string()
        } else {
            summary.count.to_string().green().to_string()
        };
        output.push_str(&format!(
            "  {:<width$}  {}\n",
            summary.group.cyan().bold(),
            count,
            width = width
        ));
    }
    Ok(output)
}

#[derive(Serialize)]
struct GroupListing<'a> {
    group: &'a str,
    records: &'a [&'a Record],
}

/// Render the matching records of one group
pub fn render_group(
    group: &str,
    records: &[&Record],
    format: OutputFormat,
    verbose: bool,
) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(&GroupListing { group, records });
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{} {} ({})\n",
        "##".bold(),
        display_group(group).cyan().bold(),
        records.len()
    ));
    if records.is_empty() {
        output.push_str(&format!("  {}\n", "No matching records".dimmed()));
    }
    for record in records {
        push_record_line(&mut output, record, verbose);
    }
    Ok(output)
}

/// Render a cross-group search result
pub fn render_matches(
    matches: &[GroupMatches<'_>],
    format: OutputFormat,
    verbose: bool,
) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(&matches);
    }

    let mut output = String::new();
    if matches.is_empty() {
        output.push_str(&format!("{}\n", "No matching records".dimmed()));
        return Ok(output);
    }

    let total: usize = matches.iter().map(|m| m.records.len()).sum();
    for m in matches {
        output.push_str(&format!(
            "{} {} ({})\n",
            "##".bold(),
            display_group(m.group).cyan().bold(),
            m.records.len()
        ));
        for record in &m.records {
            push_record_line(&mut output, record, verbose);
        }
        output.push('\n');
    }
    output.push_str(&format!(
        "{} records in {} groups\n",
        total.to_string().green(),
        matches.len()
    ));
    Ok(output)
}

fn push_record_line(output: &mut String, record: &Record, verbose: bool) {
    let detail = if !record.has_default_hash() {
        record.hash.dimmed().to_string()
    } else if let Some(price) = record.extra.get("price") {
        format_price(price).yellow().to_string()
    } else {
        "-".dimmed().to_string()
    };
    output.push_str(&format!("  {} {}\n", record.key.green(), detail));
    if verbose {
        output.push_str(&format!(
            "      {} {}\n",
            return_type_or_dash(record).yellow(),
            record.signature()
        ));
    }
}

/// `$1,500` for whole numbers, the raw value after `$` otherwise
fn format_price(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(whole) => format!("${}", group_thousands(whole)),
            None => format!("${}", n),
        },
        Value::String(s) => format!("${}", s),
        other => other.to_string(),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

fn return_type_or_dash(record: &Record) -> &str {
    if record.return_type.is_empty() {
        "-"
    } else {
        &record.return_type
    }
}

/// Render every field of a single record
pub fn render_record(record: &Record, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(record);
    }

    let mut output = String::new();
    output.push_str(&format!("{}\n", record.key.cyan().bold()));
    push_field(&mut output, "Hash", &record.hash);
    if !record.secondary_hash.is_empty() {
        push_field(&mut output, "Secondary hash", &record.secondary_hash);
    }
    let groups: Vec<&str> = record.groups.iter().map(|g| display_group(g)).collect();
    push_field(&mut output, "Group", &groups.join(" > "));
    if !record.return_type.is_empty() || !record.parameters.is_empty() {
        push_field(
            &mut output,
            "Signature",
            &format!("{} {}", return_type_or_dash(record), record.signature()),
        );
    }
    if !record.comment.is_empty() {
        push_field(&mut output, "Comment", &record.comment);
    }
    for (name, value) in &record.extra {
        let text = match value {
            _ if name == "price" => format_price(value),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        push_field(&mut output, name, &text);
    }
    Ok(output)
}

fn push_field(output: &mut String, label: &str, value: &str) {
    output.push_str(&format!("  {:<16}{}\n", format!("{}:", label).dimmed(), value));
}
