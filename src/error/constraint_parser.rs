use std::sync::LazyLock;

use regex::Regex;

/// Extracts structured details from PostgreSQL constraint violation reports.
///
/// PostgreSQL reports the offending table, column and constraint as separate
/// fields of the error, and puts the offending key in the `DETAIL` line
/// (`Key (email)=(a@b.c) already exists.`). The parser prefers those fields
/// and falls back to the message text when a driver leaves them empty.
pub struct ConstraintParser;

/// Structured view of a single violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub table: String,
    pub field: String,
    pub value: Option<String>,
}

static KEY_VALUE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").ok());
static COLUMN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r#"column "([^"]+)""#).ok());
static RELATION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?:table|relation) "([^"]+)""#).ok());

/// Suffixes PostgreSQL appends to generated constraint names.
const CONSTRAINT_SUFFIXES: &[&str] = &["_key", "_fkey", "_check", "_pkey", "_idx", "_not_null"];

impl ConstraintParser {
    /// Builds a violation from the error fields reported by the server.
    ///
    /// `text` is the message with the detail line appended, if any.
    pub fn parse(
        text: &str,
        table_name: Option<&str>,
        column_name: Option<&str>,
        constraint_name: Option<&str>,
    ) -> Option<Violation> {
        let key_value = Self::extract_key_value(text);

        let table = table_name
            .map(str::to_string)
            .or_else(|| Self::extract_relation(text))
            .or_else(|| {
                constraint_name
                    .and_then(|c| Self::split_constraint_name(c, None))
                    .map(|(table, _)| table)
            })?;

        let field = column_name
            .map(str::to_string)
            .or_else(|| key_value.as_ref().map(|(field, _)| field.clone()))
            .or_else(|| Self::extract_column(text))
            .or_else(|| {
                constraint_name
                    .and_then(|c| Self::split_constraint_name(c, Some(&table)))
                    .map(|(_, field)| field)
            })?;

        Some(Violation {
            table,
            field,
            value: key_value.map(|(_, value)| value),
        })
    }

    /// Splits a generated constraint name such as `users_email_key` into
    /// `("users", "email")`.
    ///
    /// When the table is already known it is stripped as a prefix, which
    /// keeps multi-word columns intact (`employees_first_name_key`).
    pub fn split_constraint_name(
        constraint: &str,
        table: Option<&str>,
    ) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint.strip_suffix(suffix))
            .unwrap_or(constraint);

        if let Some(table) = table {
            let rest = stem.strip_prefix(table)?.strip_prefix('_')?;
            if rest.is_empty() {
                return None;
            }
            return Some((table.to_string(), rest.to_string()));
        }

        let (table, field) = stem.split_once('_')?;
        if table.is_empty() || field.is_empty() {
            return None;
        }
        Some((table.to_string(), field.to_string()))
    }

    /// Extracts `(field, value)` from a `Key (field)=(value)` fragment.
    pub fn extract_key_value(text: &str) -> Option<(String, String)> {
        let captures = KEY_VALUE.as_ref()?.captures(text)?;
        Some((
            captures.get(1)?.as_str().to_string(),
            captures.get(2)?.as_str().to_string(),
        ))
    }

    /// Extracts a quoted column name from the message.
    pub fn extract_column(text: &str) -> Option<String> {
        COLUMN
            .as_ref()?
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Extracts a quoted table or relation name from the message.
    pub fn extract_relation(text: &str) -> Option<String> {
        RELATION
            .as_ref()?
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}
