//! Import rows for bulk reconciliation.
//!
//! Two input shapes are supported:
//!
//! - delimited text (TSV/CSV) whose first line is a header, with columns
//!   `group`, `name`, `isActive`
//! - JSON lines, one `{"group": .., "name": .., "isActive": ..}` per line
//!
//! Parsing only produces [`ImportRow`]s. Feed them to
//! [`Reconciler::reconcile_rows`](crate::Reconciler::reconcile_rows).

use crate::error::{Error, Result};
use masterdata_core::{Audit, MasterValue, RowId};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

/// One parsed input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    /// Key-group the value belongs to
    pub group: String,
    /// Value name
    pub name: String,
    /// Whether the value is active
    #[serde(rename = "isActive", default)]
    pub is_active: bool,
}

impl ImportRow {
    /// Build a row directly
    pub fn new(group: impl Into<String>, name: impl Into<String>, is_active: bool) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            is_active,
        }
    }

    /// Candidate value with a fresh row id, not deleted, stamped by `actor`
    pub fn into_candidate(self, actor: &str) -> MasterValue {
        MasterValue {
            group: self.group,
            row_id: RowId::generate(),
            name: self.name,
            is_active: self.is_active,
            is_deleted: false,
            audit: Audit::created_by(actor),
        }
    }
}

/// Input file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Tab-separated, header line first
    Tsv,
    /// Comma-separated, header line first
    Csv,
    /// One JSON object per line
    JsonLines,
}

impl ImportFormat {
    /// Infer the format from a file extension (`tsv`, `csv`, `jsonl`/`ndjson`)
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        Self::from_name(&ext)
    }

    /// Parse a format name as given on a command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tsv" | "txt" => Some(ImportFormat::Tsv),
            "csv" => Some(ImportFormat::Csv),
            "jsonl" | "ndjson" | "json" => Some(ImportFormat::JsonLines),
            _ => None,
        }
    }

    /// Parse every row from `reader`
    pub fn parse<R: BufRead>(self, reader: R) -> Result<Vec<ImportRow>> {
        match self {
            ImportFormat::Tsv => parse_delimited(reader, '\t'),
            ImportFormat::Csv => parse_delimited(reader, ','),
            ImportFormat::JsonLines => parse_json_lines(reader),
        }
    }
}

/// Parse delimited text. The first line is a header and is skipped.
///
/// Extra columns are ignored. Unquoted fields are trimmed. A field wrapped
/// in double quotes is taken verbatim and may contain the delimiter; `""`
/// inside it stands for one quote. Quoted fields cannot span lines.
pub fn parse_delimited<R: BufRead>(reader: R, delimiter: char) -> Result<Vec<ImportRow>> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line_no == 1 || line.trim().is_empty() {
            continue;
        }

        let mut fields = split_fields(&line, delimiter, line_no)?.into_iter();
        let mut next = |column: &str| {
            fields.next().ok_or_else(|| Error::Import {
                line: line_no,
                message: format!("missing column {}", column),
            })
        };
        let group = next("group")?;
        let name = next("name")?;
        let is_active = parse_bool(&next("isActive")?, line_no)?;

        rows.push(ImportRow {
            group,
            name,
            is_active,
        });
    }
    Ok(rows)
}

fn split_fields(line: &str, delimiter: char, line_no: usize) -> Result<Vec<String>> {
    let malformed = |message: &str| Error::Import {
        line: line_no,
        message: message.to_string(),
    };
    let is_padding = |c: &char| *c != delimiter && c.is_whitespace();

    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();
    loop {
        while chars.next_if(is_padding).is_some() {}

        let field = if chars.next_if_eq(&'"').is_some() {
            let mut field = String::new();
            loop {
                match chars.next() {
                    Some('"') if chars.next_if_eq(&'"').is_some() => field.push('"'),
                    Some('"') => break,
                    Some(c) => field.push(c),
                    None => return Err(malformed("unterminated quoted field")),
                }
            }
            while chars.next_if(is_padding).is_some() {}
            if chars.peek().map_or(false, |c| *c != delimiter) {
                return Err(malformed("unexpected text after closing quote"));
            }
            field
        } else {
            let mut field = String::new();
            while let Some(c) = chars.next_if(|c| *c != delimiter) {
                field.push(c);
            }
            field.trim().to_string()
        };
        fields.push(field);

        // either the delimiter or end of line
        if chars.next().is_none() {
            return Ok(fields);
        }
    }
}

/// Parse JSON lines. Blank lines are skipped.
pub fn parse_json_lines<R: BufRead>(reader: R) -> Result<Vec<ImportRow>> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|e| Error::Import {
            line: idx + 1,
            message: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn parse_bool(field: &str, line: usize) -> Result<bool> {
    if field.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if field.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Error::Import {
            line,
            message: format!("isActive must be true or false, got {:?}", field),
        })
    }
}
