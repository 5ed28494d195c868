//! Vendor name extraction heuristics.

use super::patterns::{AMOUNT_CANDIDATE, COMPANY_SUFFIX, NUMERIC_LINE, VENDOR_CUE};

/// Extract the vendor name from text lines.
///
/// Heuristic order: an explicit sender cue ("From:", "Seller:"), then a
/// line carrying a company suffix (Ltd, GmbH, Inc, ...), then the first
/// non-numeric line above the amount block.
pub fn extract_vendor(lines: &[String]) -> Option<String> {
    for line in lines {
        if let Some(caps) = VENDOR_CUE.captures(line.trim()) {
            let name = caps[1].trim().to_string();
            if !name.is_empty() {
                return Some(name);
            }
        }
    }

    for line in lines {
        let line = line.trim();
        if COMPANY_SUFFIX.is_match(line) && !NUMERIC_LINE.is_match(line) {
            return Some(line.to_string());
        }
    }

    first_line_above_amounts(lines)
}

/// First plausible name line above the first line containing an amount.
fn first_line_above_amounts(lines: &[String]) -> Option<String> {
    let amount_idx = lines
        .iter()
        .position(|l| AMOUNT_CANDIDATE.is_match(l))
        .unwrap_or(lines.len());

    lines[..amount_idx]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty() && !NUMERIC_LINE.is_match(l))
        .map(|l| l.to_string())
        .or_else(|| {
            // Degenerate layout: no amount-free prefix; take the first
            // non-numeric line anywhere.
            lines
                .iter()
                .map(|l| l.trim())
                .find(|l| !l.is_empty() && !NUMERIC_LINE.is_match(l))
                .map(|l| l.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_cue_wins() {
        let text = lines(&["Invoice #42", "From: Initech Solutions", "Total: 100.00 EUR"]);
        assert_eq!(extract_vendor(&text).as_deref(), Some("Initech Solutions"));
    }

    #[test]
    fn test_company_suffix_line() {
        let text = lines(&["Invoice", "Globex GmbH", "Total: 100.00 EUR"]);
        assert_eq!(extract_vendor(&text).as_deref(), Some("Globex GmbH"));
    }

    #[test]
    fn test_first_line_above_amounts() {
        let text = lines(&["ACME Corp", "Invoice total: 1,200.00 EUR", "Date: 14/03/2024"]);
        assert_eq!(extract_vendor(&text).as_deref(), Some("ACME Corp"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_vendor(&[]), None);
    }
}
