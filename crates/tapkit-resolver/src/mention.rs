//! Mention extraction.
//!
//! Finds the substrings of a chat message that refer to an account:
//!
//! 1. full addresses (`0x` + 40 hex digits)
//! 2. `@`-prefixed shortened addresses (`@0xabc1…f002`, `@0xabc1...f002`)
//! 3. `@`-mentions that do not start with `0x` (`@alice`, `@alice.base.eth`)
//! 4. bare `.eth` domains not preceded by `@` (`vitalik.eth`)
//!
//! Results keep first-seen order without duplicates. A mention that is the
//! parent domain of another mention (`base.eth` next to `alice.base.eth`) is
//! dropped.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static FULL_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0x[a-fA-F0-9]{40}(?-u:\b)").expect("full address regex"));

static SHORTENED_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(0x[a-fA-F0-9]+(?:…|\.{2,3})[a-fA-F0-9]+)").expect("shortened mention regex")
});

static AT_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([A-Za-z0-9_.-]+\.eth|[A-Za-z0-9_.-]+)").expect("at mention regex")
});

static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)([A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)*\.eth)(?-u:\b)").expect("domain regex")
});

/// Extracts account mentions from `message`.
///
/// ```
/// use tapkit_resolver::extract_mentions;
///
/// let mentions = extract_mentions("gm @alice and vitalik.eth, also @alice");
/// assert_eq!(mentions, ["alice", "vitalik.eth"]);
/// ```
pub fn extract_mentions(message: &str) -> Vec<String> {
    let mut found: Vec<&str> = Vec::new();

    found.extend(FULL_ADDRESS.find_iter(message).map(|m| m.as_str()));

    found.extend(
        SHORTENED_MENTION
            .captures_iter(message)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str()),
    );

    found.extend(
        AT_MENTION
            .captures_iter(message)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .filter(|m| !m.starts_with("0x")),
    );

    found.extend(bare_domains(message));

    let mut seen = HashSet::new();
    let unique: Vec<&str> = found.into_iter().filter(|m| seen.insert(*m)).collect();

    unique
        .iter()
        .filter(|mention| !is_parent_of_any(mention, &unique))
        .map(|m| m.to_string())
        .collect()
}

/// `.eth` domains whose first character does not follow an `@`.
///
/// A candidate starting right after `@` is skipped and the search resumes one
/// character later, so `@alice.base.eth` still yields `base.eth`.
fn bare_domains(message: &str) -> Vec<&str> {
    let mut domains = Vec::new();
    let mut pos = 0;

    while let Some(m) = DOMAIN.find_at(message, pos) {
        if message[..m.start()].ends_with('@') {
            // Matches start at an ASCII character.
            pos = m.start() + 1;
            continue;
        }
        domains.push(m.as_str());
        pos = m.end();
    }

    domains
}

fn is_parent_of_any(mention: &str, all: &[&str]) -> bool {
    let suffix = format!(".{mention}");
    all.iter()
        .any(|other| *other != mention && other.ends_with(&suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortened_and_domain() {
        let mentions = extract_mentions("hi @0xabc123…f002 and alice.eth, @0xabc123…f002 again");
        assert_eq!(mentions, ["0xabc123…f002", "alice.eth"]);
    }

    #[test]
    fn test_shortened_with_dots() {
        assert_eq!(extract_mentions("send to @0xabc1...f002"), ["0xabc1...f002"]);
        assert_eq!(extract_mentions("send to @0xabc1..f002"), ["0xabc1..f002"]);
    }

    #[test]
    fn test_full_address_first() {
        let address = format!("0x{}", "aB".repeat(20));
        let mentions = extract_mentions(&format!("pay @bob and {address} now"));
        assert_eq!(mentions, [address.as_str(), "bob"]);
    }

    #[test]
    fn test_overlong_hex_is_not_an_address() {
        let text = format!("0x{}", "a".repeat(41));
        assert!(extract_mentions(&text).is_empty());
    }

    #[test]
    fn test_at_mention_skips_hex_prefix() {
        assert!(extract_mentions("ping @0xdeadbeef").is_empty());
        assert_eq!(extract_mentions("ping @0xdeadbeef @carol"), ["carol"]);
    }

    #[test]
    fn test_non_ascii_neighbours() {
        let address = format!("0x{}", "b".repeat(40));
        assert_eq!(extract_mentions(&format!("转账给{address}谢谢")), [address.as_str()]);
        assert_eq!(extract_mentions("打赏vitalik.eth"), ["vitalik.eth"]);
        assert_eq!(extract_mentions("éalice.eth"), ["alice.eth"]);
        assert_eq!(extract_mentions("ありがとうbob.base.eth!"), ["bob.base.eth"]);
    }

    #[test]
    fn test_parent_domain_suppressed() {
        assert_eq!(extract_mentions("base.eth and sub.base.eth"), ["sub.base.eth"]);
    }

    #[test]
    fn test_at_subdomain_drops_inner_parent() {
        assert_eq!(extract_mentions("tip @byteai.base.eth"), ["byteai.base.eth"]);
    }

    #[test]
    fn test_at_domain_is_not_repeated_as_bare() {
        assert_eq!(extract_mentions("hey @alice.eth"), ["alice.eth"]);
    }

    #[test]
    fn test_no_mentions() {
        assert!(extract_mentions("nothing to see here").is_empty());
        assert!(extract_mentions("").is_empty());
    }
}
