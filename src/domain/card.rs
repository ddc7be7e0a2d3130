use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBrand {
    Visa,
    Master,
    Amex,
    Elo,
    Hipercard,
    Diners,
}

impl CardBrand {
    /// Brand name in the form the acquirer expects on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::Master => "Master",
            CardBrand::Amex => "Amex",
            CardBrand::Elo => "Elo",
            CardBrand::Hipercard => "Hipercard",
            CardBrand::Diners => "Diners",
        }
    }
}

pub fn digits_of(number: &str) -> String {
    number.chars().filter(|c| c.is_ascii_digit()).collect()
}

// Elo shares the 4/5/6 leading digits with Visa/Master, so its prefixes must
// be checked first.
const ELO_PREFIXES: &[&str] = &[
    "401178", "401179", "431274", "438935", "451416", "457393", "457631", "457632", "504175",
    "506699", "509", "627780", "636297", "636368", "6516", "6550",
];

pub fn detect_brand(number: &str) -> Option<CardBrand> {
    let digits = digits_of(number);
    if digits.len() < 13 {
        return None;
    }

    if ELO_PREFIXES.iter().any(|p| digits.starts_with(p)) {
        return Some(CardBrand::Elo);
    }
    if digits.starts_with("606282") || digits.starts_with("3841") {
        return Some(CardBrand::Hipercard);
    }
    if digits.starts_with("301")
        || digits.starts_with("305")
        || digits.starts_with("36")
        || digits.starts_with("38")
    {
        return Some(CardBrand::Diners);
    }
    if digits.starts_with("34") || digits.starts_with("37") {
        return Some(CardBrand::Amex);
    }
    let two: u32 = digits[..2].parse().unwrap_or(0);
    if (51..=55).contains(&two) || (22..=27).contains(&two) {
        return Some(CardBrand::Master);
    }
    if digits.starts_with('4') {
        return Some(CardBrand::Visa);
    }

    None
}

pub fn luhn_valid(number: &str) -> bool {
    let digits = digits_of(number);
    if digits.len() < 13 {
        return false;
    }

    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let mut d = c.to_digit(10).unwrap_or(0);
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// Stable identifier for a card that never exposes the PAN.
pub fn fingerprint(number: &str) -> String {
    let digits = digits_of(number);
    let hash = Sha256::digest(digits.as_bytes());
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn mask(number: &str) -> String {
    let digits = digits_of(number);
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }
    let last4 = &digits[digits.len() - 4..];
    format!("{}{}", "*".repeat(digits.len() - 4), last4)
}

pub fn last_digits(number: &str) -> String {
    let digits = digits_of(number);
    if digits.len() <= 4 {
        return digits;
    }
    digits[digits.len() - 4..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_brands() {
        assert_eq!(detect_brand("4111111111111111"), Some(CardBrand::Visa));
        assert_eq!(detect_brand("5555666677778884"), Some(CardBrand::Master));
        assert_eq!(detect_brand("2223000148400010"), Some(CardBrand::Master));
        assert_eq!(detect_brand("376449047333005"), Some(CardBrand::Amex));
        assert_eq!(detect_brand("6362970000457013"), Some(CardBrand::Elo));
        assert_eq!(detect_brand("6062825624254001"), Some(CardBrand::Hipercard));
        assert_eq!(detect_brand("36490102462661"), Some(CardBrand::Diners));
    }

    #[test]
    fn elo_wins_over_visa_on_shared_prefix() {
        assert_eq!(detect_brand("4011780000000000"), Some(CardBrand::Elo));
    }

    #[test]
    fn rejects_short_or_unknown_numbers() {
        assert_eq!(detect_brand("1234"), None);
        assert_eq!(detect_brand("9999999999999999"), None);
    }

    #[test]
    fn luhn_accepts_valid_and_rejects_tampered() {
        assert!(luhn_valid("4111 1111 1111 1111"));
        assert!(!luhn_valid("4111111111111112"));
        assert!(!luhn_valid("4111"));
    }

    #[test]
    fn mask_keeps_only_last_four() {
        assert_eq!(mask("4111111111111111"), "************1111");
        assert!(!mask("4111111111111111").contains("41111111"));
    }

    #[test]
    fn fingerprint_ignores_formatting() {
        assert_eq!(fingerprint("4111 1111 1111 1111"), fingerprint("4111111111111111"));
        assert_ne!(fingerprint("4111111111111111"), fingerprint("5555666677778884"));
    }
}
