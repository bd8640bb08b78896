//! Address helpers.

use std::sync::LazyLock;

use regex::Regex;

use tapkit_core::Member;

static FULL_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("full address regex"));

static SHORTENED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"0x[a-fA-F0-9]+(?:…|\.{2,3})[a-fA-F0-9]+").expect("shortened address regex")
});

static SHORTENED_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0x[a-fA-F0-9]+)(?:…|\.{2,3})([a-fA-F0-9]+)$").expect("shortened parts regex")
});

/// `true` for exactly `0x` followed by 40 hex digits.
pub fn is_full_address(identifier: &str) -> bool {
    FULL_ADDRESS.is_match(identifier)
}

/// `true` if `identifier` contains an abbreviated address such as `0xabc1…f002`.
pub fn is_shortened_address(identifier: &str) -> bool {
    SHORTENED.is_match(identifier)
}

/// Finds the full address an abbreviation stands for.
///
/// The prefix and suffix are compared case-insensitively; the first matching
/// address is returned as given.
pub fn match_shortened_address<S: AsRef<str>>(shortened: &str, addresses: &[S]) -> Option<String> {
    let caps = SHORTENED_PARTS.captures(shortened)?;
    let prefix = caps[1].to_lowercase();
    let suffix = caps[2].to_lowercase();

    addresses
        .iter()
        .map(AsRef::as_ref)
        .find(|address| {
            let normalized = address.to_lowercase();
            normalized.starts_with(&prefix) && normalized.ends_with(&suffix)
        })
        .map(str::to_string)
}

/// The Ethereum address of every member that has one.
pub fn extract_member_addresses(members: &[Member]) -> Vec<String> {
    members
        .iter()
        .filter_map(Member::ethereum_address)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapkit_core::{AccountIdentifier, IdentifierKind};

    #[test]
    fn test_match_shortened_case_insensitive() {
        let addresses = ["0xABC5d41...f002", "0x000...000"];
        assert_eq!(
            match_shortened_address("0xabc5…f002", &addresses).as_deref(),
            Some("0xABC5d41...f002")
        );
    }

    #[test]
    fn test_match_shortened_first_wins() {
        let addresses = vec![
            format!("0xabc5{}f002", "1".repeat(32)),
            format!("0xabc5{}f002", "2".repeat(32)),
        ];
        assert_eq!(
            match_shortened_address("0xabc5...f002", &addresses),
            Some(addresses[0].clone())
        );
    }

    #[test]
    fn test_match_shortened_no_match() {
        let addresses = [format!("0x{}", "1".repeat(40))];
        assert_eq!(match_shortened_address("0xabc5…f002", &addresses), None);
        assert_eq!(match_shortened_address("not-short", &addresses), None);
    }

    #[test]
    fn test_address_shapes() {
        let full = format!("0x{}", "a".repeat(40));
        assert!(is_full_address(&full));
        assert!(!is_full_address(&format!("{full}0")));
        assert!(is_shortened_address("0xabc…def"));
        assert!(!is_shortened_address("alice.eth"));
    }

    #[test]
    fn test_extract_member_addresses() {
        let members = vec![
            Member::with_address("inbox-1", "0x1111"),
            Member {
                inbox_id: "inbox-2".into(),
                account_identifiers: vec![AccountIdentifier {
                    identifier: "passkey".into(),
                    identifier_kind: IdentifierKind::Passkey,
                }],
            },
            Member::with_address("inbox-3", "0x3333"),
        ];
        assert_eq!(extract_member_addresses(&members), ["0x1111", "0x3333"]);
    }
}
