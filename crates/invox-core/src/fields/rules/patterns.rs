//! Common regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Amount candidates, matched against space-compacted text:
    // "1,200.00" / "1.200,00" / "1200.00" / "50,000" / "45"
    pub static ref AMOUNT_CANDIDATE: Regex = Regex::new(
        r"\b(\d{1,3}(?:[.,]\d{3})+(?:[.,]\d{2})?|\d{4,}[.,]\d{2}|\d{1,3}(?:[.,]\d{1,2})?)\b"
    ).unwrap();

    // Unseparated integer totals ("Total: 1200 EUR"), accepted on
    // labeled lines only.
    pub static ref AMOUNT_PLAIN_INT: Regex = Regex::new(r"\b\d{4,}\b").unwrap();

    // ISO-4217 currency codes commonly seen on invoices.
    pub static ref CURRENCY_CODE: Regex = Regex::new(
        r"\b(EUR|USD|GBP|PLN|TRY|CHF|SEK|NOK|DKK|AED|SAR)\b"
    ).unwrap();

    // Lines that label the invoice total.
    pub static ref TOTAL_LABEL: Regex = Regex::new(
        r"(?i)\b(?:total|amount\s+due|grand\s+total|balance\s+due|sum)\b"
    ).unwrap();

    // Day-first or month-first numeric dates: 14/03/2024, 14-03-24, 14.03.2024
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    // ISO-style dates: 2024-03-14, 2024/03/14
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    // Lines that label the invoice date.
    pub static ref DATE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:date|dated|issued)\b"
    ).unwrap();

    // Labeled tax id: "VAT ID: DE123456789", "Tax number GB 123456789"
    pub static ref TAX_ID_LABELED: Regex = Regex::new(
        r"(?i)(?:vat|tax|ust)[\s.\-]*(?:id|no|nr|number|reg(?:istration)?)?[\s.:]*([A-Za-z]{2}\s?[0-9A-Za-z]{8,12})"
    ).unwrap();

    // Standalone country-prefixed tax id.
    pub static ref TAX_ID_STANDALONE: Regex = Regex::new(
        r"\b([A-Z]{2}\d{8,12})\b"
    ).unwrap();

    // Vendor cue: explicit sender label.
    pub static ref VENDOR_CUE: Regex = Regex::new(
        r"(?i)^(?:from|seller|issued\s+by|billed\s+from|vendor)[\s:]+(.+)$"
    ).unwrap();

    // Company-name suffixes used as vendor-line hints.
    pub static ref COMPANY_SUFFIX: Regex = Regex::new(
        r"(?i)\b(?:ltd|limited|inc|llc|gmbh|corp|co\.|company|s\.?a\.?|sp\.\s*z\s*o\.?o\.?|oy|ab|bv)\b"
    ).unwrap();

    // A line that is mostly digits/punctuation (not a vendor name).
    pub static ref NUMERIC_LINE: Regex = Regex::new(
        r"^[\d\s.,:/\-#%€£$]+$"
    ).unwrap();
}
