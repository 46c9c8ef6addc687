//! Text normalization shared by track dedup and video matching

/// Lowercase and keep only alphanumeric characters
///
/// `"Popular (with Playboi Carti & Madonna)"` → `"popularwithplayboicartimadonna"`
pub fn normalize_key(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation_and_case() {
        assert_eq!(normalize_key("The Weeknd"), "theweeknd");
        assert_eq!(normalize_key("  AC/DC "), "acdc");
        assert_eq!(
            normalize_key("Popular (with Playboi Carti & Madonna)"),
            "popularwithplayboicartimadonna"
        );
    }

    #[test]
    fn test_keeps_non_ascii_letters() {
        assert_eq!(normalize_key("Beyoncé"), "beyoncé");
        assert_eq!(normalize_key("Sigur Rós"), "sigurrós");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("!!! ---"), "");
    }
}
