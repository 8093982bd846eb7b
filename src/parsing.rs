//! Pure parsers for free-text model output.
//!
//! Model output is unstructured text; these parsers are best-effort, not a
//! strict grammar. Lines that match no expected marker are silently
//! dropped — intentional lossy behavior, preserved as such. Keeping the
//! parsers free of any capability call makes their heuristics independently
//! testable.

use serde::{Deserialize, Serialize};

/// Marker characters stripped from the front of an insight line.
const INSIGHT_MARKERS: &str = "0123456789.-•) ";

/// Parse a model's insight list: keep lines beginning with a digit, `-`,
/// or `•`, strip the leading marker, and truncate to `max_insights`.
pub fn parse_insights(text: &str, max_insights: usize) -> Vec<String> {
    let mut insights = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        let is_list_item = line
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '•');
        if !is_list_item {
            continue;
        }

        let insight = line.trim_start_matches(|c: char| INSIGHT_MARKERS.contains(c)).trim();
        if !insight.is_empty() {
            insights.push(insight.to_string());
        }
        if insights.len() == max_insights {
            break;
        }
    }

    insights
}

/// A generated test case, kept as accumulated free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// The full text of the test case: its marker line plus every
    /// following line up to the next marker.
    pub full_text: String,
}

/// Parse a model's test-case output: a new record starts at every line
/// containing `"Test ID"` or `"Test Case"`, and subsequent lines accumulate
/// into that record until the next marker or end of text. Text before the
/// first marker is dropped.
pub fn parse_test_cases(text: &str) -> Vec<TestCase> {
    let mut test_cases = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.contains("Test ID") || line.contains("Test Case") {
            if let Some(full_text) = current.take() {
                test_cases.push(TestCase { full_text });
            }
            current = Some(line.to_string());
        } else if let Some(full_text) = current.as_mut() {
            full_text.push('\n');
            full_text.push_str(line);
        }
    }

    if let Some(full_text) = current {
        test_cases.push(TestCase { full_text });
    }

    test_cases
}
