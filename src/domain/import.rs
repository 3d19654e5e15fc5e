//! Bulk meeting import. Turns an uploaded text file into meeting drafts.
//!
//! One meeting per line: `<date> <title...>`. Parsing is pure; persisting the
//! drafts is the job of `usecases::ImportService`.
//!
//! Accepted date tokens (checked in this order):
//! - `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DDTHH:MM` (explicit time is kept)
//! - `YYYY-MM-DD` (documented format)
//! - `YYYY/MM/DD`, `DD.MM.YYYY`, `MM/DD/YYYY` (best effort)
//!
//! Lines without an explicit time start at [`DEFAULT_START_HOUR`]:00.

use crate::domain::errors::{ImportErrorKind, LineError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Hour of day given to imported meetings whose date token has no time.
pub const DEFAULT_START_HOUR: u32 = 9;

/// Max characters of the offending line quoted in an error.
pub const SNIPPET_MAX_CHARS: usize = 60;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];

/// One physical line of the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLine {
    /// 1-based.
    pub number: usize,
    pub raw: String,
}

/// A meeting candidate built from one line, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMeetingDraft {
    pub line: usize,
    /// Trimmed source line, quoted when the draft cannot be saved.
    pub source: String,
    pub title: String,
    /// Local wall-clock start.
    pub date: NaiveDateTime,
    /// False when the time was defaulted.
    pub explicit_time: bool,
}

impl ParsedMeetingDraft {
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// What happened to a single line. Silent skips and recorded errors are kept apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Empty after trimming.
    Blank,
    /// Fewer than two tokens (headers, stray words). Counted and logged, never reported.
    Malformed(LineError),
    Draft(ParsedMeetingDraft),
    Rejected(LineError),
}

/// Aggregate result of parsing a whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Valid drafts in source order.
    pub drafts: Vec<ParsedMeetingDraft>,
    /// Recorded per-line errors in source order.
    pub errors: Vec<LineError>,
    /// Lines skipped silently for having fewer than two tokens.
    pub malformed: Vec<LineError>,
    /// Literal first line of the file, quoted when nothing matched.
    pub first_line: Option<String>,
}

impl ImportOutcome {
    /// True iff at least one valid draft was produced.
    pub fn success(&self) -> bool {
        !self.drafts.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.drafts.len()
    }
}

/// Split text on `\n`, `\r\n` or bare `\r`, numbering lines from 1.
pub fn split_lines(text: &str) -> Vec<ImportLine> {
    let mut lines = Vec::new();
    let mut rest = text;
    let mut number = 1;

    while let Some(pos) = rest.find(|c: char| c == '\r' || c == '\n') {
        lines.push(ImportLine {
            number,
            raw: rest[..pos].to_string(),
        });
        let sep_len = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[pos + sep_len..];
        number += 1;
    }
    if !rest.is_empty() {
        lines.push(ImportLine {
            number,
            raw: rest.to_string(),
        });
    }
    lines
}

/// Parse a date token. Returns the date and the time when the token carried one.
pub fn parse_date_token(token: &str) -> Option<(NaiveDate, Option<NaiveTime>)> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(token, fmt) {
            return Some((dt.date(), Some(dt.time())));
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
        .map(|date| (date, None))
}

fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(DEFAULT_START_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Truncate a line for quoting in an error message.
pub fn snippet(raw: &str) -> String {
    let t = raw.trim();
    if t.chars().count() <= SNIPPET_MAX_CHARS {
        t.to_string()
    } else {
        let cut: String = t.chars().take(SNIPPET_MAX_CHARS).collect();
        format!("{}...", cut)
    }
}

/// Classify one line. `today` only feeds the hint of an invalid-date error.
pub fn parse_line(line: &ImportLine, today: NaiveDate) -> LineOutcome {
    let trimmed = line.raw.trim();
    if trimmed.is_empty() {
        return LineOutcome::Blank;
    }

    let mut tokens = trimmed.split_whitespace();
    let (Some(date_token), Some(first_word)) = (tokens.next(), tokens.next()) else {
        return LineOutcome::Malformed(LineError {
            line: line.number,
            kind: ImportErrorKind::MalformedLine,
            snippet: snippet(trimmed),
        });
    };
    let title = std::iter::once(first_word)
        .chain(tokens)
        .collect::<Vec<_>>()
        .join(" ");

    let Some((date, time)) = parse_date_token(date_token) else {
        return LineOutcome::Rejected(LineError {
            line: line.number,
            kind: ImportErrorKind::InvalidDate {
                token: date_token.to_string(),
                expected: today.format("%Y-%m-%d").to_string(),
            },
            snippet: snippet(trimmed),
        });
    };

    LineOutcome::Draft(ParsedMeetingDraft {
        line: line.number,
        source: trimmed.to_string(),
        title,
        date: date.and_time(time.unwrap_or_else(default_start_time)),
        explicit_time: time.is_some(),
    })
}

/// Parse every line of `text`. Never stops early.
pub fn parse_import(text: &str, today: NaiveDate) -> ImportOutcome {
    let lines = split_lines(text);
    let mut outcome = ImportOutcome {
        first_line: lines.first().map(|l| l.raw.clone()),
        ..Default::default()
    };

    for line in &lines {
        match parse_line(line, today) {
            LineOutcome::Blank => {}
            LineOutcome::Malformed(err) => outcome.malformed.push(err),
            LineOutcome::Draft(draft) if draft.is_valid() => outcome.drafts.push(draft),
            LineOutcome::Draft(draft) => outcome.malformed.push(LineError {
                line: draft.line,
                kind: ImportErrorKind::MalformedLine,
                snippet: snippet(&draft.source),
            }),
            LineOutcome::Rejected(err) => outcome.errors.push(err),
        }
    }
    outcome
}
