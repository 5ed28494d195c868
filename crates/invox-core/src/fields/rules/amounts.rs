//! Amount and currency extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{
    AMOUNT_CANDIDATE, AMOUNT_PLAIN_INT, CURRENCY_CODE, DATE_DMY, DATE_YMD, TOTAL_LABEL,
};
use super::{ExtractionMatch, FieldExtractor};

const CURRENCY_SIGNS: &[(char, &str)] = &[('€', "EUR"), ('£', "GBP"), ('$', "USD")];

/// Amount field extractor.
///
/// Matches are taken from space-compacted text so that `1 200,00` and
/// `1200,00` parse identically.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for line in text.lines() {
            let compact = compact_digit_spaces(line);
            let labeled = TOTAL_LABEL.is_match(line);
            let dates = date_spans(&compact);
            let confidence = if labeled { 0.9 } else { 0.7 };

            let mut taken: Vec<(usize, usize)> = Vec::new();
            for caps in AMOUNT_CANDIDATE.captures_iter(&compact) {
                let m = caps.get(1).unwrap();
                // Date digits are never amounts.
                if overlaps(&dates, m.start(), m.end()) {
                    continue;
                }
                if let Some(amount) = normalize_amount(m.as_str()) {
                    taken.push((m.start(), m.end()));
                    results.push(ExtractionMatch::new(amount, confidence, m.as_str()));
                }
            }

            // Labeled lines may carry an unseparated integer total
            // ("Total: 1200 EUR").
            if labeled {
                for m in AMOUNT_PLAIN_INT.find_iter(&compact) {
                    if overlaps(&dates, m.start(), m.end())
                        || overlaps(&taken, m.start(), m.end())
                    {
                        continue;
                    }
                    if let Some(amount) = normalize_amount(m.as_str()) {
                        results.push(ExtractionMatch::new(amount, 0.8, m.as_str()));
                    }
                }
            }
        }

        results
    }
}

fn date_spans(line: &str) -> Vec<(usize, usize)> {
    DATE_DMY
        .find_iter(line)
        .chain(DATE_YMD.find_iter(line))
        .map(|m| (m.start(), m.end()))
        .collect()
}

fn overlaps(spans: &[(usize, usize)], start: usize, end: usize) -> bool {
    spans.iter().any(|(s, e)| start < *e && end > *s)
}

/// Amount and currency extracted together.
#[derive(Debug, Clone, Default)]
pub struct AmountMatch {
    /// Winning amount candidate.
    pub amount: Option<ExtractionMatch<Decimal>>,
    /// Detected ISO-4217 currency code.
    pub currency: Option<String>,
}

/// Extract the invoice total and its currency from text.
///
/// When multiple amount candidates exist the numerically largest wins, on
/// the assumption that it is the invoice total rather than a line item.
pub fn extract_amount(text: &str) -> AmountMatch {
    let candidates = AmountExtractor::new().extract_all(text);

    let amount = candidates
        .into_iter()
        .max_by(|a, b| a.value.cmp(&b.value));

    AmountMatch {
        amount,
        currency: detect_currency(text),
    }
}

/// Detect a currency from symbols or ISO codes in the text.
pub fn detect_currency(text: &str) -> Option<String> {
    for (sign, code) in CURRENCY_SIGNS {
        if text.contains(*sign) {
            return Some(code.to_string());
        }
    }

    CURRENCY_CODE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Remove spaces acting as thousands separators, i.e. spaces with digits
/// on both sides, leaving all other spacing intact.
fn compact_digit_spaces(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());

    for (i, c) in chars.iter().enumerate() {
        if (*c == ' ' || *c == '\u{00a0}')
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())
        {
            continue;
        }
        out.push(*c);
    }

    out
}

/// Normalize a separator-formatted amount into a `Decimal`.
///
/// Supports `1,200.00`, `1.200,00`, `1 200,00` (pre-compacted), `50,000`
/// and plain `1200.00`. With both separators present, the one appearing
/// last is the decimal mark. A single separator followed by exactly three
/// digits is a thousands separator.
pub fn normalize_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let comma = cleaned.rfind(',');
    let dot = cleaned.rfind('.');

    let normalized = match (comma, dot) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => normalize_single_separator(&cleaned, ','),
        (None, Some(_)) => normalize_single_separator(&cleaned, '.'),
        (None, None) => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

fn normalize_single_separator(s: &str, sep: char) -> String {
    let parts: Vec<&str> = s.split(sep).collect();

    // Multiple occurrences or a three-digit tail mean thousands grouping.
    let is_thousands = parts.len() > 2 || parts.last().is_some_and(|t| t.len() == 3);

    if is_thousands {
        parts.concat()
    } else {
        parts.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_normalize_amount_formats() {
        assert_eq!(normalize_amount("1,200.00"), Some(dec("1200.00")));
        assert_eq!(normalize_amount("1.200,00"), Some(dec("1200.00")));
        assert_eq!(normalize_amount("1200.00"), Some(dec("1200.00")));
        assert_eq!(normalize_amount("1200,00"), Some(dec("1200.00")));
        assert_eq!(normalize_amount("50,000"), Some(dec("50000")));
        assert_eq!(normalize_amount("1.234.567,89"), Some(dec("1234567.89")));
        assert_eq!(normalize_amount("45"), Some(dec("45")));
        assert_eq!(normalize_amount("45,5"), Some(dec("45.5")));
    }

    #[test]
    fn test_largest_candidate_wins() {
        let text = "Item: 100.00\nShipping: 15.50\nTotal: 1,200.00 EUR";
        let result = extract_amount(text);

        assert_eq!(result.amount.unwrap().value, dec("1200.00"));
        assert_eq!(result.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_currency_from_symbol() {
        assert_eq!(detect_currency("Betrag: €1.200,00").as_deref(), Some("EUR"));
        assert_eq!(detect_currency("Total: $99.00").as_deref(), Some("USD"));
        assert_eq!(detect_currency("no money here"), None);
    }

    #[test]
    fn test_spaced_thousands() {
        let text = "Razem: 12 345 678,90 PLN";
        let result = extract_amount(text);
        assert_eq!(result.amount.unwrap().value, dec("12345678.90"));
        assert_eq!(result.currency.as_deref(), Some("PLN"));
    }

    #[test]
    fn test_dates_and_tax_ids_are_not_amounts() {
        let text = "Date: 14/03/2024\nVAT ID: DE123456789\nTotal: 720.00 EUR";
        let result = extract_amount(text);
        assert_eq!(result.amount.unwrap().value, dec("720.00"));
    }

    #[test]
    fn test_plain_integer_total_on_labeled_line() {
        let result = extract_amount("Total: 1200 EUR");
        assert_eq!(result.amount.unwrap().value, dec("1200"));
        assert_eq!(result.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_date_digits_never_fabricate_an_amount() {
        let result = extract_amount("Date: 14/03/2024\nPayable in EUR");
        assert!(result.amount.is_none());
        assert_eq!(result.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_no_candidates() {
        let result = extract_amount("nothing numeric here");
        assert!(result.amount.is_none());
        assert!(result.currency.is_none());
    }
}
