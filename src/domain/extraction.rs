//! Action-item extraction from free-form meeting notes.
//!
//! Two passes. The strict pass only accepts lines starting with a marker
//! (`todo:`, `úkol:`, `ukol:`, `- [ ]`, `- []`). If it finds nothing, the
//! loose pass treats bullets and short sentences as tasks. Results are never
//! merged: exactly one pass supplies the items.

/// Prefixes that unambiguously mark an action item. Matched case-insensitively.
pub const STRICT_MARKERS: &[&str] = &["todo:", "úkol:", "ukol:", "- [ ]", "- []"];

/// Loose pass: a plain line must be longer than this many characters...
pub const LOOSE_MIN_CHARS: usize = 5;
/// ...and shorter than this one.
pub const LOOSE_MAX_CHARS: usize = 150;

/// Which pass produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPass {
    Strict,
    LooseFallback,
}

impl std::fmt::Display for ExtractionPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::LooseFallback => write!(f, "loose"),
        }
    }
}

/// A candidate action item, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionItemDraft {
    pub description: String,
    /// 1-based line in the notes.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub pass: ExtractionPass,
    pub items: Vec<ActionItemDraft>,
}

impl ExtractionOutcome {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Run the strict pass, falling back to the loose pass when it finds nothing.
pub fn extract_action_items(notes: &str) -> ExtractionOutcome {
    let strict = strict_pass(notes);
    if !strict.is_empty() {
        return ExtractionOutcome {
            pass: ExtractionPass::Strict,
            items: strict,
        };
    }
    ExtractionOutcome {
        pass: ExtractionPass::LooseFallback,
        items: loose_pass(notes),
    }
}

/// Lines carrying a strict marker, marker stripped from the original-case text.
pub fn strict_pass(notes: &str) -> Vec<ActionItemDraft> {
    numbered_lines(notes)
        .filter_map(|(line, trimmed)| {
            let rest = strip_marker(trimmed)?;
            let description = rest.trim();
            (!description.is_empty()).then(|| ActionItemDraft {
                description: description.to_string(),
                line,
            })
        })
        .collect()
}

/// Bullets and sentences of plausible task length; `#` headers are ignored.
pub fn loose_pass(notes: &str) -> Vec<ActionItemDraft> {
    numbered_lines(notes)
        .filter_map(|(line, trimmed)| {
            if trimmed.starts_with('#') {
                return None;
            }
            let description = if trimmed.starts_with("- ") || trimmed.starts_with("* ") {
                trimmed[1..].trim()
            } else {
                let len = trimmed.chars().count();
                if len <= LOOSE_MIN_CHARS || len >= LOOSE_MAX_CHARS {
                    return None;
                }
                trimmed
            };
            Some(ActionItemDraft {
                description: description.to_string(),
                line,
            })
        })
        .collect()
}

/// Non-blank lines, trimmed, with their 1-based numbers.
fn numbered_lines(notes: &str) -> impl Iterator<Item = (usize, &str)> {
    notes
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
}

/// If `line` starts with a strict marker (ignoring case), return what follows it.
fn strip_marker(line: &str) -> Option<&str> {
    STRICT_MARKERS.iter().find_map(|marker| {
        let n = marker.chars().count();
        if line.chars().count() < n {
            return None;
        }
        let end = line
            .char_indices()
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        let head = &line[..end];
        (head.to_lowercase() == *marker).then(|| &line[end..])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptions(outcome: &ExtractionOutcome) -> Vec<&str> {
        outcome
            .items
            .iter()
            .map(|i| i.description.as_str())
            .collect()
    }

    #[test]
    fn test_single_todo_line() {
        let outcome = extract_action_items("Todo: call client");
        assert_eq!(outcome.pass, ExtractionPass::Strict);
        assert_eq!(outcome.count(), 1);
        assert_eq!(outcome.items[0].description, "call client");
        assert_eq!(outcome.items[0].line, 1);
    }

    #[test]
    fn test_strict_markers_keep_original_case() {
        let notes = "Discussed roadmap\nÚKOL: Poslat nabídku\nukol:  Zavolat Petrovi \n- [ ] Update Wiki\n- [] Book room\nTODO:";
        let outcome = extract_action_items(notes);
        assert_eq!(outcome.pass, ExtractionPass::Strict);
        assert_eq!(
            descriptions(&outcome),
            vec!["Poslat nabídku", "Zavolat Petrovi", "Update Wiki", "Book room"]
        );
        let lines: Vec<_> = outcome.items.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_strict_hit_disables_loose_pass() {
        let notes = "- buy milk\nTodo: send minutes\nThis sentence would be a loose candidate.";
        let outcome = extract_action_items(notes);
        assert_eq!(outcome.pass, ExtractionPass::Strict);
        assert_eq!(descriptions(&outcome), vec!["send minutes"]);
    }

    #[test]
    fn test_loose_fallback_bullet_and_sentence_in_order() {
        let sentence = "We agreed that the supplier contract must be renegotiated before the Q3 closing.";
        assert_eq!(sentence.chars().count(), 80);
        let notes = format!("- buy milk\n{}", sentence);
        let outcome = extract_action_items(&notes);
        assert_eq!(outcome.pass, ExtractionPass::LooseFallback);
        assert_eq!(descriptions(&outcome), vec!["buy milk", sentence]);
    }

    #[test]
    fn test_loose_length_bounds() {
        let too_long = "y".repeat(150);
        let just_fits = "z".repeat(149);
        let notes = format!("abcd\nabcde\nabcdef\n{}\n{}", too_long, just_fits);
        let outcome = extract_action_items(&notes);
        assert_eq!(outcome.pass, ExtractionPass::LooseFallback);
        assert_eq!(descriptions(&outcome), vec!["abcdef", just_fits.as_str()]);
    }

    #[test]
    fn test_four_char_line_not_emitted() {
        let outcome = extract_action_items("fine");
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_headers_skipped_and_star_bullets_accepted() {
        let notes = "# Decisions\n## Next steps\n* ship it\n*bold claim here";
        let outcome = extract_action_items(notes);
        assert_eq!(descriptions(&outcome), vec!["ship it", "*bold claim here"]);
    }

    #[test]
    fn test_empty_notes() {
        let outcome = extract_action_items("   \n\n");
        assert_eq!(outcome.pass, ExtractionPass::LooseFallback);
        assert_eq!(outcome.count(), 0);
    }
}
