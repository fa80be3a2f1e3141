// ── Tickers ───────────────────────────────────────────────────────────────────

/// Yahoo Finance suffix for NSE-listed equities.
pub const MARKET_SUFFIX: &str = ".NS";

/// Derive the market-data ticker from a raw company symbol.
/// "RELIANCE" → "RELIANCE.NS" | "RELIANCE.NS" → "RELIANCE.NS" | "" → ".NS"
pub fn normalise_ticker(raw: &str) -> String {
    let raw = raw.trim();
    if raw.ends_with(MARKET_SUFFIX) {
        raw.to_string()
    } else {
        format!("{raw}{MARKET_SUFFIX}")
    }
}

// ── Cells and headers ─────────────────────────────────────────────────────────

/// Collapse runs of whitespace (including non-breaking spaces) and trim.
pub fn clean_cell(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop wiki footnote markers: "Sector[18]" → "Sector".
pub fn strip_footnotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Comparison key for header matching: footnotes stripped, whitespace
/// collapsed, lowercase.
pub fn header_key(s: &str) -> String {
    clean_cell(&strip_footnotes(s)).to_lowercase()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_ticker() {
        assert_eq!(normalise_ticker("RELIANCE"), "RELIANCE.NS");
        assert_eq!(normalise_ticker("RELIANCE.NS"), "RELIANCE.NS");
        assert_eq!(normalise_ticker(""), ".NS");
        assert_eq!(normalise_ticker(" TCS\n"), "TCS.NS");
    }

    #[test]
    fn test_normalise_ticker_is_idempotent() {
        for raw in ["M&M", "BAJAJ-AUTO", "", "INFY.NS"] {
            let once = normalise_ticker(raw);
            assert_eq!(normalise_ticker(&once), once);
        }
    }

    #[test]
    fn test_header_key() {
        assert_eq!(header_key("Sector[18]"), "sector");
        assert_eq!(header_key("Company\u{a0} Name"), "company name");
        assert_eq!(header_key(" Symbol "), "symbol");
    }

    #[test]
    fn test_clean_cell() {
        assert_eq!(clean_cell("  Tata\n Motors "), "Tata Motors");
        assert_eq!(clean_cell(""), "");
    }
}
