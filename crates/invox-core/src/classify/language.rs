//! Lightweight statistical language detection.
//!
//! A single pass over the tokenized text counts hits against per-language
//! stopword tables and picks the language with the highest proportion of
//! hits. Deliberately small: invoices carry little prose, so a handful of
//! function words plus domain terms per language is enough to separate the
//! supported set.

/// Languages the detector can distinguish, as ISO 639-1 codes.
const LANGUAGES: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "of", "to", "for", "with", "from", "invoice", "total", "amount",
            "date", "payment", "due", "tax",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "für", "mit", "von", "rechnung", "betrag", "gesamt",
            "datum", "zahlung", "steuer", "brutto",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "et", "pour", "avec", "de", "facture", "montant", "total",
            "date", "paiement", "taxe",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "y", "para", "con", "de", "factura", "importe", "total",
            "fecha", "pago", "impuesto",
        ],
    ),
    (
        "pl",
        &[
            "i", "oraz", "do", "na", "faktura", "kwota", "razem", "brutto", "netto", "data",
            "zapłaty", "podatek", "sprzedawca",
        ],
    ),
    (
        "tr",
        &[
            "ve", "için", "bir", "fatura", "tutar", "toplam", "tarih", "vergi", "ödeme",
            "tutarı",
        ],
    ),
];

/// Minimum distinct stopword hits before a language is accepted.
const MIN_HITS: usize = 2;

/// Detect the dominant language of the text.
///
/// Returns an ISO 639-1 code, or `"unknown"` when the text is shorter than
/// `min_len` characters or no language scores enough hits. The length gate
/// avoids false positives on near-empty OCR output.
pub fn detect_language(text: &str, min_len: usize) -> String {
    if text.trim().len() < min_len {
        return "unknown".to_string();
    }

    let tokens: Vec<String> = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();

    if tokens.is_empty() {
        return "unknown".to_string();
    }

    let mut best: Option<(&str, usize)> = None;
    for (code, stopwords) in LANGUAGES {
        let hits = tokens
            .iter()
            .filter(|t| stopwords.contains(&t.as_str()))
            .count();

        if hits >= MIN_HITS && best.is_none_or(|(_, b)| hits > b) {
            best = Some((code, hits));
        }
    }

    best.map(|(code, _)| code.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
