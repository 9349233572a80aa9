//! Header and address clean-up helpers

/// Turn a raw column header into a property key.
///
/// `" Black Doris "` becomes `black_doris` and `"Nana's Apples"` becomes
/// `nanas_apples`.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    raw.trim().replace(' ', "_").replace('\'', "").to_lowercase()
}

/// Append the locality context to an address so the geocoder can
/// disambiguate street names.
#[must_use]
pub fn contextualise(address: &str, context: &str) -> String {
    format!("{},{}", address, context.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Plums ", "plums")]
    #[case("Black Doris ", "black_doris")]
    #[case("  Nana's Apples", "nanas_apples")]
    #[case("Address", "address")]
    #[case("", "")]
    fn test_normalize_key(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_key(raw), expected);
    }

    #[test]
    fn test_contextualise_trims_context_only() {
        assert_eq!(
            contextualise("123 Beach Rd", "  Waiheke Island, NZ "),
            "123 Beach Rd,Waiheke Island, NZ"
        );
    }
}
