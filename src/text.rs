use scraper::ElementRef;

/// Collapse runs of whitespace into a single space and trim both ends.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All text below `el`, normalized.
pub fn element_text(el: &ElementRef) -> String {
    normalize_ws(&el.text().collect::<String>())
}
