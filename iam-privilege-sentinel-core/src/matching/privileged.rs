//! Shell-glob matching of policy actions against the privileged-action list

use crate::error::{SentinelError, SentinelResult};
use crate::types::MatchResult;
use glob::{MatchOptions, Pattern};
use log::{debug, warn};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct Entry {
    text: String,
    pattern: Option<Pattern>,
}

impl Entry {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            pattern: compile(text),
        }
    }

    fn matches(&self, action: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.matches_with(action, MATCH_OPTIONS),
            None => self.text == action,
        }
    }
}

/// Compile a glob, falling back to literal comparison when the text is not a valid pattern.
fn compile(text: &str) -> Option<Pattern> {
    match Pattern::new(text) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            warn!("'{}' is not a valid glob ({}), comparing literally", text, e);
            None
        }
    }
}

fn has_wildcard(action: &str) -> bool {
    action.contains(['*', '?', '['])
}

/// Glob patterns naming high-impact API actions, e.g. `iam:Put*Policy`.
///
/// Always non-empty. Patterns are kept exactly as written apart from
/// surrounding whitespace; no case folding is applied.
#[derive(Debug, Clone)]
pub struct PrivilegedActionList {
    entries: Vec<Entry>,
}

impl PrivilegedActionList {
    /// Parse a newline-delimited list, skipping blank lines.
    pub fn parse(text: &str) -> SentinelResult<Self> {
        Self::from_patterns(text.lines())
    }

    pub fn from_patterns<I, S>(patterns: I) -> SentinelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<Entry> = patterns
            .into_iter()
            .filter_map(|p| {
                let trimmed = p.as_ref().trim();
                (!trimmed.is_empty()).then(|| Entry::new(trimmed))
            })
            .collect();
        if entries.is_empty() {
            return Err(SentinelError::invalid_pattern_list(
                "no privileged action patterns found",
            ));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.text.as_str())
    }

    /// Every list pattern that makes `action` privileged, in list order.
    ///
    /// A list pattern matches when it globs the action. A wildcard action
    /// (`iam:*`, `*`) also matches every list entry it covers, since granting
    /// it grants those entries.
    pub fn matching_patterns(&self, action: &str) -> Vec<String> {
        let action_pattern = if has_wildcard(action) {
            Pattern::new(action).ok()
        } else {
            None
        };

        self.entries
            .iter()
            .filter(|entry| {
                entry.matches(action)
                    || action_pattern
                        .as_ref()
                        .is_some_and(|p| p.matches_with(&entry.text, MATCH_OPTIONS))
            })
            .map(|entry| entry.text.clone())
            .collect()
    }
}

/// Test every extracted action; one result per privileged action, in input order.
pub fn match_actions<S: AsRef<str>>(
    actions: &[S],
    list: &PrivilegedActionList,
) -> Vec<MatchResult> {
    actions
        .iter()
        .filter_map(|action| {
            let action = action.as_ref();
            let matched_patterns = list.matching_patterns(action);
            debug!("Action {} matched {:?}", action, matched_patterns);
            (!matched_patterns.is_empty()).then(|| MatchResult {
                action: action.to_string(),
                matched_patterns,
            })
        })
        .collect()
}
