//! Date extraction with locale-agnostic day/month disambiguation.

use chrono::NaiveDate;

use super::patterns::{DATE_DMY, DATE_LABEL, DATE_YMD};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // YYYY-MM-DD first: unambiguous.
        for caps in DATE_YMD.captures_iter(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let full_match = caps.get(0).unwrap();
                results.push(
                    ExtractionMatch::new(date, 0.95, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        // DD/MM/YYYY and friends. If the first token exceeds 12 it must be
        // the day; if the second exceeds 12 the order is month-first;
        // otherwise day-first is assumed.
        for caps in DATE_DMY.captures_iter(text) {
            let a: u32 = caps[1].parse().unwrap_or(0);
            let b: u32 = caps[2].parse().unwrap_or(0);
            let year = parse_year(&caps[3]);

            let (day, month) = if a > 12 { (a, b) } else if b > 12 { (b, a) } else { (a, b) };

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                if results.iter().any(|r: &ExtractionMatch<NaiveDate>| r.value == date) {
                    continue;
                }

                let full_match = caps.get(0).unwrap();
                results.push(
                    ExtractionMatch::new(date, 0.9, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Extract the invoice date from text lines.
///
/// A date on a line carrying a date label ("Date:", "Issued", ...) is
/// preferred over the first date found anywhere.
pub fn extract_date(lines: &[String]) -> Option<ExtractionMatch<NaiveDate>> {
    let extractor = DateExtractor::new();

    for line in lines {
        if DATE_LABEL.is_match(line) {
            if let Some(m) = extractor.extract(line) {
                return Some(ExtractionMatch::new(m.value, 0.95, m.source));
            }
        }
    }

    let joined = lines.join("\n");
    extractor.extract(&joined)
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: 00-69 is 2000s, 70-99 is 1900s.
        if year < 70 { 2000 + year } else { 1900 + year }
    } else {
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_first_when_first_token_large() {
        let extractor = DateExtractor::new();
        let result = extractor.extract("14/03/2024").unwrap();
        assert_eq!(result.value, date(2024, 3, 14));
    }

    #[test]
    fn test_month_first_when_second_token_large() {
        let extractor = DateExtractor::new();
        let result = extractor.extract("03/14/2024").unwrap();
        assert_eq!(result.value, date(2024, 3, 14));
    }

    #[test]
    fn test_ambiguous_defaults_to_day_first() {
        let extractor = DateExtractor::new();
        let result = extractor.extract("05.04.2024").unwrap();
        assert_eq!(result.value, date(2024, 4, 5));
    }

    #[test]
    fn test_iso_format() {
        let extractor = DateExtractor::new();
        let result = extractor.extract("2024-03-14").unwrap();
        assert_eq!(result.value, date(2024, 3, 14));
    }

    #[test]
    fn test_two_digit_year() {
        let extractor = DateExtractor::new();
        let result = extractor.extract("14-03-24").unwrap();
        assert_eq!(result.value, date(2024, 3, 14));
    }

    #[test]
    fn test_labeled_line_preferred() {
        let lines = vec![
            "Delivery: 20.03.2024".to_string(),
            "Date: 14/03/2024".to_string(),
        ];
        let result = extract_date(&lines).unwrap();
        assert_eq!(result.value, date(2024, 3, 14));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let extractor = DateExtractor::new();
        assert!(extractor.extract("32/13/2024").is_none());
    }
}
