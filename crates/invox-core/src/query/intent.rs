//! Deterministic intent classification for natural-language queries.

use chrono::{Datelike, NaiveDate};

/// A month filter, optionally pinned to a year.
///
/// A bare month ("in August") matches that month in any year; phrases
/// like "this month" pin the year as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub month: u32,
    pub year: Option<i32>,
}

impl TimeWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && self.year.map_or(true, |y| date.year() == y)
    }
}

/// What the user is asking for, resolved from keywords before any model
/// is consulted.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryIntent {
    /// Sum of invoice amounts, optionally within a window.
    AggregateTotal { window: Option<TimeWindow> },
    /// Invoices at or above the risky fraud threshold.
    ListRisky { window: Option<TimeWindow> },
    /// CSV export of matching invoices.
    ExportCsv { window: Option<TimeWindow> },
    /// Totals for one named vendor.
    VendorBreakdown {
        vendor: String,
        window: Option<TimeWindow>,
    },
    /// No deterministic match; handed to the language model.
    Freeform,
}

const RISKY_CUES: &[&str] = &["risky", "suspicious", "fraud", "fraudulent", "flagged"];
const EXPORT_CUES: &[&str] = &["export", "csv", "tax summary", "report", "download", "spreadsheet"];
const TOTAL_CUES: &[&str] = &["total", "spent", "spend", "sum", "how much", "paid"];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Classify a question against the user's known vendors.
///
/// Matchers run in a fixed order; the first hit wins. `today` anchors
/// relative phrases like "last month".
pub fn classify(question: &str, vendors: &[String], today: NaiveDate) -> QueryIntent {
    let lower = question.to_lowercase();
    let padded = padded_tokens(&lower);
    let window = extract_window(&lower, today);

    if contains_any(&padded, RISKY_CUES) {
        return QueryIntent::ListRisky { window };
    }
    if contains_any(&padded, EXPORT_CUES) {
        return QueryIntent::ExportCsv { window };
    }
    if let Some(vendor) = mentioned_vendor(&lower, vendors) {
        return QueryIntent::VendorBreakdown { vendor, window };
    }
    if contains_any(&padded, TOTAL_CUES) {
        return QueryIntent::AggregateTotal { window };
    }
    QueryIntent::Freeform
}

/// Question reduced to space-joined tokens with leading and trailing
/// spaces. Cues are matched against this form so they fire on whole
/// words only ("spend" does not fire on "spending"); multi-word cues
/// match across token boundaries.
fn padded_tokens(lower: &str) -> String {
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    format!(" {} ", tokens.join(" "))
}

fn contains_any(padded: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| padded.contains(&format!(" {cue} ")))
}

/// First known vendor mentioned in the question, case-insensitive.
fn mentioned_vendor(lower: &str, vendors: &[String]) -> Option<String> {
    vendors
        .iter()
        .find(|v| !v.is_empty() && lower.contains(&v.to_lowercase()))
        .cloned()
}

fn extract_window(lower: &str, today: NaiveDate) -> Option<TimeWindow> {
    if lower.contains("this month") {
        return Some(TimeWindow {
            month: today.month(),
            year: Some(today.year()),
        });
    }
    if lower.contains("last month") {
        let (month, year) = if today.month() == 1 {
            (12, today.year() - 1)
        } else {
            (today.month() - 1, today.year())
        };
        return Some(TimeWindow {
            month,
            year: Some(year),
        });
    }

    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let month = tokens.iter().find_map(|t| month_number(t))?;
    let year = tokens
        .iter()
        .find_map(|t| t.parse::<i32>().ok().filter(|y| (2000..2100).contains(y)));
    Some(TimeWindow { month, year })
}

/// Month number for a full name or its three-letter abbreviation,
/// matched on whole tokens only.
fn month_number(token: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| token == *m || (token.len() == 3 && m.starts_with(token)))
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 15).unwrap()
    }

    fn no_vendors() -> Vec<String> {
        vec![]
    }

    #[test]
    fn test_total_with_bare_month() {
        let intent = classify("Total spent in August", &no_vendors(), today());
        assert_eq!(
            intent,
            QueryIntent::AggregateTotal {
                window: Some(TimeWindow {
                    month: 8,
                    year: None
                })
            }
        );
    }

    #[test]
    fn test_bare_month_matches_any_year() {
        let window = TimeWindow {
            month: 8,
            year: None,
        };
        assert!(window.contains(NaiveDate::from_ymd_opt(2023, 8, 1).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 8, 31).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 7, 31).unwrap()));
    }

    #[test]
    fn test_month_with_explicit_year() {
        let intent = classify("how much did I spend in March 2024?", &no_vendors(), today());
        assert_eq!(
            intent,
            QueryIntent::AggregateTotal {
                window: Some(TimeWindow {
                    month: 3,
                    year: Some(2024)
                })
            }
        );
    }

    #[test]
    fn test_this_month_pins_year() {
        let intent = classify("total this month", &no_vendors(), today());
        assert_eq!(
            intent,
            QueryIntent::AggregateTotal {
                window: Some(TimeWindow {
                    month: 9,
                    year: Some(2024)
                })
            }
        );
    }

    #[test]
    fn test_last_month_rolls_over_january() {
        let jan = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let intent = classify("spent last month", &no_vendors(), jan);
        assert_eq!(
            intent,
            QueryIntent::AggregateTotal {
                window: Some(TimeWindow {
                    month: 12,
                    year: Some(2024)
                })
            }
        );
    }

    #[test]
    fn test_risky_wins_over_total() {
        let intent = classify("total of my risky invoices", &no_vendors(), today());
        assert_eq!(intent, QueryIntent::ListRisky { window: None });
    }

    #[test]
    fn test_export_request() {
        let intent = classify("export a tax summary for august", &no_vendors(), today());
        assert_eq!(
            intent,
            QueryIntent::ExportCsv {
                window: Some(TimeWindow {
                    month: 8,
                    year: None
                })
            }
        );
    }

    #[test]
    fn test_vendor_mention_beats_total() {
        let vendors = vec!["ACME Corp".to_string()];
        let intent = classify("how much did I pay acme corp?", &vendors, today());
        assert_eq!(
            intent,
            QueryIntent::VendorBreakdown {
                vendor: "ACME Corp".to_string(),
                window: None
            }
        );
    }

    #[test]
    fn test_month_abbreviation() {
        let intent = classify("total for aug", &no_vendors(), today());
        assert_eq!(
            intent,
            QueryIntent::AggregateTotal {
                window: Some(TimeWindow {
                    month: 8,
                    year: None
                })
            }
        );
    }

    #[test]
    fn test_maybe_is_not_may() {
        let intent = classify("maybe show me the total", &no_vendors(), today());
        assert_eq!(intent, QueryIntent::AggregateTotal { window: None });
    }

    #[test]
    fn test_spending_habits_is_freeform() {
        // "spending" must not fire the "spend" cue.
        let intent = classify("What are my spending habits?", &no_vendors(), today());
        assert_eq!(intent, QueryIntent::Freeform);
    }

    #[test]
    fn test_reported_is_not_an_export() {
        let intent = classify("anything reported as unusual?", &no_vendors(), today());
        assert_eq!(intent, QueryIntent::Freeform);
    }

    #[test]
    fn test_unmatched_question_is_freeform() {
        let intent = classify("what should I do about overdue bills?", &no_vendors(), today());
        assert_eq!(intent, QueryIntent::Freeform);
    }
}
