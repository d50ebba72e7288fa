//! Lenient parsing of model completions.
//!
//! Models asked for JSON still wrap it in markdown fences, leave trailing
//! commas, or stop one brace short of a full object. Models asked for a bare
//! score still narrate. These helpers recover the useful part without ever
//! panicking on arbitrary input.

use regex::Regex;
use serde_json::Value;

use crate::error::{LlmError, Result};

/// Extract a JSON object from a completion.
///
/// Looks for a fenced ```json block first, then falls back to the outermost
/// `{`..`}` span. Trailing commas are stripped before parsing. If parsing
/// still fails, one retry appends a closing brace to recover truncated
/// objects.
pub fn extract_json_object(completion: &str) -> Result<Value> {
    let candidate = fenced_json(completion)
        .or_else(|| brace_span(completion))
        .ok_or_else(|| LlmError::Parse("no JSON object in completion".into()))?;

    let cleaned = remove_trailing_commas(candidate);

    match serde_json::from_str(&cleaned) {
        Ok(value) => Ok(value),
        // Truncated completion: try closing the object.
        Err(_) => serde_json::from_str(&format!("{}}}", cleaned))
            .map_err(|e| LlmError::Parse(format!("invalid JSON in completion: {}", e))),
    }
}

fn fenced_json(text: &str) -> Option<&str> {
    let start = text.find("```json").map(|i| i + "```json".len())?;
    let rest = &text[start..];
    let end = rest.rfind("```")?;
    Some(rest[..end].trim())
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        // Truncated mid-object; hand back everything from the first brace.
        return Some(text[start..].trim());
    }
    Some(text[start..=end].trim())
}

/// Remove trailing commas before a closing bracket or brace.
fn remove_trailing_commas(json_like: &str) -> String {
    let pattern = Regex::new(r",\s*([}\]])").unwrap();
    pattern.replace_all(json_like, "$1").into_owned()
}

/// Extract the first integer in a completion, expected in `[min, max]`.
///
/// Out-of-range values clamp to `min` (a score prompt that came back with
/// "10/10" reads as the floor, not a panic). Returns `None` when there is no
/// digit at all.
pub fn extract_score(completion: &str, min: i64, max: i64) -> Option<i64> {
    let pattern = Regex::new(r"\d+").unwrap();
    let value: i64 = pattern.find(completion)?.as_str().parse().ok()?;
    if (min..=max).contains(&value) {
        Some(value)
    } else {
        Some(min)
    }
}

/// Strip a leading "Here is ...:" / "Here are ...:" preamble.
///
/// Claude prefixes summaries and tag lists with a sentence like
/// "Here is a 50 word summary of the article:" before the content.
pub fn strip_assistant_preamble(completion: &str) -> String {
    let pattern = Regex::new(r"(?s)Here (is|are).*?:\s*").unwrap();
    pattern.replace(completion, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_block() {
        let completion = "Sure, here you go:\n```json\n{\"a\": 1}\n```\nAnything else?";
        let value = extract_json_object(completion).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_trailing_commas() {
        let completion = r#"{"names": ["A", "B",], "count": 2,}"#;
        let value = extract_json_object(completion).unwrap();
        assert_eq!(value["names"].as_array().unwrap().len(), 2);
        assert_eq!(value["count"], 2);
    }

    #[test]
    fn test_truncated_object_recovered() {
        let completion = r#"{"issue_price": {"Series A": 1.25}"#;
        let value = extract_json_object(completion).unwrap();
        assert_eq!(value["issue_price"]["Series A"], 1.25);
    }

    #[test]
    fn test_no_json_is_error() {
        assert!(extract_json_object("I could not find any data.").is_err());
    }

    #[test]
    fn test_score_in_range() {
        assert_eq!(extract_score("The score is 4.", 1, 5), Some(4));
    }

    #[test]
    fn test_score_out_of_range_clamps() {
        assert_eq!(extract_score("I'd give it a 9", 1, 5), Some(1));
    }

    #[test]
    fn test_score_missing() {
        assert_eq!(extract_score("no number here", 1, 5), None);
    }

    #[test]
    fn test_preamble_stripped() {
        let completion = "Here is a 50 word summary of the article:\nRevenue grew.";
        assert_eq!(strip_assistant_preamble(completion), "Revenue grew.");
    }

    #[test]
    fn test_preamble_absent_is_noop() {
        assert_eq!(strip_assistant_preamble("Revenue grew."), "Revenue grew.");
    }
}
