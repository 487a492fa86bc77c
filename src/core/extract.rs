//! Keyword-based parameter extraction from raw utterances. Pure functions:
//! no model calls, no prompting, no side effects. When a required parameter
//! cannot be found the extractor returns `None` and the executor answers with
//! a clarification request instead of touching the task tool.

use chrono::{Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskParams {
    pub description: String,
    pub due_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyParams {
    pub id: String,
    pub description: Option<String>,
    pub due_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteParams {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    pub after: NaiveDate,
    pub before: NaiveDate,
}

static ADD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:add|create|new)\s+(?:a\s+)?(?:task|todo)\b:?\s*(.+)$").unwrap()
});

/// First occurrence of a due-text separator. Everything before it is the
/// description, everything after it is forwarded verbatim as the due text.
static DUE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:on|at|by|for)\s+").unwrap());

static MODIFY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:modify|change|reschedule|update|move)\b.*?\btask\s+(\d+)\b\s*(.*)$")
        .unwrap()
});

static MODIFY_DUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:to be|to|due|on|at|for)\s+(.+)$").unwrap());

static COMPLETE_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:complete|completed|finish|finished|done|close|mark)\b").unwrap()
});

static TASK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btask\s+(\d+)\b").unwrap());

static BARE_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d+)\b").unwrap());

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfrom\s+(\d{4}-\d{2}-\d{2})\s+to\s+(\d{4}-\d{2}-\d{2})\b").unwrap()
});

/// Extract description and due text for an add-task utterance. Both are
/// required: a task without a due date cannot be submitted to the tool.
pub fn extract_add(utterance: &str) -> Option<TaskParams> {
    let caps = ADD_RE.captures(utterance)?;
    let rest = caps.get(1)?.as_str().trim();
    let sep = DUE_SPLIT_RE.find(rest)?;
    let description = rest[..sep.start()].trim();
    let due_text = rest[sep.end()..].trim();
    if description.is_empty() || due_text.is_empty() {
        return None;
    }
    Some(TaskParams {
        description: description.to_string(),
        due_text: due_text.to_string(),
    })
}

/// Extract a task id plus at least one changed field for a modify utterance.
pub fn extract_modify(utterance: &str) -> Option<ModifyParams> {
    let caps = MODIFY_RE.captures(utterance)?;
    let id = caps.get(1)?.as_str().to_string();
    let rest = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");

    let (description, due_text) = match MODIFY_DUE_RE.captures(rest) {
        Some(due) => (None, Some(due.get(1)?.as_str().trim().to_string())),
        None if !rest.is_empty() => (Some(rest.to_string()), None),
        None => (None, None),
    };

    if description.is_none() && due_text.is_none() {
        return None;
    }
    Some(ModifyParams {
        id,
        description,
        due_text,
    })
}

/// Extract the task id for a complete utterance. A completion verb must be
/// present so stray numbers in unrelated text do not count.
pub fn extract_complete(utterance: &str) -> Option<CompleteParams> {
    if !COMPLETE_VERB_RE.is_match(utterance) {
        return None;
    }
    let id = TASK_ID_RE
        .captures(utterance)
        .or_else(|| BARE_ID_RE.captures(utterance))?
        .get(1)?
        .as_str()
        .to_string();
    Some(CompleteParams { id })
}

/// Extract an explicit `from YYYY-MM-DD to YYYY-MM-DD` range, defaulting to
/// today through tomorrow. Total: always yields a usable range.
pub fn extract_query_range(utterance: &str, today: NaiveDate) -> QueryRange {
    if let Some(caps) = RANGE_RE.captures(utterance)
        && let (Some(a), Some(b)) = (caps.get(1), caps.get(2))
        && let (Ok(after), Ok(before)) = (
            NaiveDate::parse_from_str(a.as_str(), "%Y-%m-%d"),
            NaiveDate::parse_from_str(b.as_str(), "%Y-%m-%d"),
        )
    {
        return QueryRange { after, before };
    }
    QueryRange {
        after: today,
        before: today.checked_add_days(Days::new(1)).unwrap_or(today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn add_with_date_and_time() {
        let params = extract_add("Add task Buy groceries on 2024-07-03 at 15:00").unwrap();
        assert_eq!(params.description, "Buy groceries");
        assert_eq!(params.due_text, "2024-07-03 at 15:00");
    }

    #[test]
    fn add_with_fuzzy_due_text() {
        let params = extract_add("add todo water the plants by tomorrow noonish").unwrap();
        assert_eq!(params.description, "water the plants");
        assert_eq!(params.due_text, "tomorrow noonish");
    }

    #[test]
    fn add_without_due_is_incomplete() {
        assert_eq!(extract_add("Add task Buy groceries"), None);
    }

    #[test]
    fn add_without_description_is_incomplete() {
        assert_eq!(extract_add("add task on friday"), None);
        assert_eq!(extract_add("please list my tasks"), None);
    }

    #[test]
    fn modify_due_text() {
        let params = extract_modify("reschedule task 12 to next monday 9am").unwrap();
        assert_eq!(params.id, "12");
        assert_eq!(params.due_text.as_deref(), Some("next monday 9am"));
        assert_eq!(params.description, None);
    }

    #[test]
    fn modify_description() {
        let params = extract_modify("change task 3 call the dentist instead").unwrap();
        assert_eq!(params.id, "3");
        assert_eq!(params.description.as_deref(), Some("call the dentist instead"));
        assert_eq!(params.due_text, None);
    }

    #[test]
    fn modify_without_change_is_incomplete() {
        assert_eq!(extract_modify("modify task 3"), None);
        assert_eq!(extract_modify("modify something"), None);
    }

    #[test]
    fn complete_by_task_number() {
        let params = extract_complete("mark task 7 as done").unwrap();
        assert_eq!(params.id, "7");
        let params = extract_complete("complete 4").unwrap();
        assert_eq!(params.id, "4");
    }

    #[test]
    fn complete_without_id_or_verb_is_incomplete() {
        assert_eq!(extract_complete("complete the report task"), None);
        assert_eq!(extract_complete("task 9"), None);
    }

    #[test]
    fn query_range_explicit() {
        let range =
            extract_query_range("show tasks from 2024-07-01 to 2024-07-08", date("2024-06-01"));
        assert_eq!(range.after, date("2024-07-01"));
        assert_eq!(range.before, date("2024-07-08"));
    }

    #[test]
    fn query_range_defaults_to_one_day() {
        let range = extract_query_range("what's on my plate?", date("2024-07-03"));
        assert_eq!(range.after, date("2024-07-03"));
        assert_eq!(range.before, date("2024-07-04"));
    }
}
