//! Parsing of locale-formatted RSD price strings.
//!
//! Serbian retail sites format prices with `.` as the thousands separator,
//! `,` as the decimal separator, and a trailing currency suffix:
//! `"10.000,00 RSD"`, `"4.500,00 din."`, `"1.234.567,89"`. Listed prices
//! are whole dinars in practice; the fractional part is rounded half-up.

/// Parses a locale-formatted price string into whole RSD.
///
/// Returns `None` for anything that does not contain a positive amount —
/// callers drop such records rather than defaulting them to zero.
#[must_use]
pub fn parse_rsd(raw: &str) -> Option<i64> {
    let bytes = raw.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;

    let mut integer = String::new();
    let mut fraction = String::new();
    let mut in_fraction = false;

    for &b in &bytes[start..] {
        match b {
            b'0'..=b'9' => {
                if in_fraction {
                    fraction.push(char::from(b));
                } else {
                    integer.push(char::from(b));
                }
            }
            // Thousands separator; also tolerated inside a malformed
            // fraction, where extra digits are simply ignored below.
            b'.' => {
                if in_fraction {
                    break;
                }
            }
            b',' => {
                if in_fraction {
                    break;
                }
                in_fraction = true;
            }
            b' ' | 0xA0 => break,
            _ => break,
        }
    }

    let mut value: i64 = integer.parse().ok()?;

    // Round half-up on the first two fractional digits.
    if fraction.len() >= 2 {
        let cents: i64 = fraction[..2].parse().ok()?;
        if cents >= 50 {
            value += 1;
        }
    }

    if value > 0 {
        Some(value)
    } else {
        None
    }
}

/// Parses a discount badge like `"-55%"` or `"55 %"` into a percentage.
///
/// Badges are advisory: list scrapers recompute the discount from the price
/// pair, and only use the badge for early pagination stops on feeds sorted
/// by discount.
#[must_use]
pub fn parse_discount_badge(text: &str) -> Option<i16> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    let value: i16 = digits.parse().ok()?;
    (1..=100).contains(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thousands_and_decimal() {
        assert_eq!(parse_rsd("10.000,00 RSD"), Some(10_000));
        assert_eq!(parse_rsd("4.500,00 RSD"), Some(4_500));
        assert_eq!(parse_rsd("1.234.567,89"), Some(1_234_568));
    }

    #[test]
    fn parses_plain_integers() {
        assert_eq!(parse_rsd("5000"), Some(5_000));
        assert_eq!(parse_rsd("5.000"), Some(5_000));
    }

    #[test]
    fn parses_currency_suffix_variants() {
        assert_eq!(parse_rsd("2.990,00 din."), Some(2_990));
        assert_eq!(parse_rsd("2990 RSD"), Some(2_990));
    }

    #[test]
    fn ignores_leading_label() {
        assert_eq!(parse_rsd("Cena: 1.990,00 RSD"), Some(1_990));
    }

    #[test]
    fn rounds_fraction_half_up() {
        assert_eq!(parse_rsd("99,50"), Some(100));
        assert_eq!(parse_rsd("99,49"), Some(99));
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert_eq!(parse_rsd("0,00 RSD"), None);
        assert_eq!(parse_rsd("cena na upit"), None);
        assert_eq!(parse_rsd(""), None);
    }

    #[test]
    fn badge_parses_with_and_without_sign() {
        assert_eq!(parse_discount_badge("-55%"), Some(55));
        assert_eq!(parse_discount_badge("55 %"), Some(55));
        assert_eq!(parse_discount_badge("do -70%"), Some(70));
    }

    #[test]
    fn badge_rejects_nonsense() {
        assert_eq!(parse_discount_badge("novo"), None);
        assert_eq!(parse_discount_badge("-0%"), None);
        assert_eq!(parse_discount_badge("-250%"), None);
    }
}
