use std::sync::LazyLock;

use regex::Regex;

static BIB_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"doss="(\d+)""#).unwrap());

/// Bib numbers of a ranking page, in page order. Duplicates are kept.
pub fn extract(markup: &str) -> Vec<String> {
    BIB_RE
        .captures_iter(markup)
        .map(|c| c[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_page_order_and_duplicates() {
        let xml = std::fs::read_to_string("tests/fixtures/ranking_2023.xml").unwrap();
        assert_eq!(extract(&xml), ["1042", "87", "2210", "87"]);
    }

    #[test]
    fn no_bibs_is_empty() {
        assert!(extract("<html><body>Course annulée</body></html>").is_empty());
        assert!(extract(r#"<c doss="" nom="X"/><c doss="A12"/>"#).is_empty());
    }
}
