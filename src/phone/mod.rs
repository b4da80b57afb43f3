// Russian mobile number formatting, applied to every keystroke of a phone field.

const MAX_DIGITS: usize = 11;

/// Extracts the canonical digit string (`7` followed by up to ten digits).
pub fn extract_digits(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }

    let mut out = digits;
    if out.starts_with('8') {
        out.replace_range(0..1, "7");
    }
    if !out.starts_with('7') {
        out = if out.len() >= 10 {
            format!("7{}", &out[out.len() - 10..])
        } else {
            format!("7{}", out)
        };
    }
    out.truncate(MAX_DIGITS);
    out
}

/// Formats partial input as `+7 XXX XXX XX XX`, growing groups only as far as
/// digits are available. Idempotent.
pub fn format_ru_phone(raw: &str) -> String {
    let digits = extract_digits(raw);
    if digits.is_empty() {
        return String::new();
    }

    let rest = &digits[1..];
    let mut res = String::from("+7");
    for (start, end) in [(0, 3), (3, 6), (6, 8), (8, 10)] {
        if rest.len() <= start {
            break;
        }
        res.push(' ');
        res.push_str(&rest[start..end.min(rest.len())]);
    }
    res
}

/// True when the trimmed input is non-empty and made only of digits, `+`, `-`,
/// parentheses and whitespace.
pub fn is_phone_like(input: &str) -> bool {
    let trimmed = input.trim();
    !trimmed.is_empty() && trimmed.chars().all(is_phone_symbol)
}

/// Same symbol set as [`is_phone_like`] but accepts the empty string; search input
/// matching this is reformatted while typing.
pub fn is_phone_input(input: &str) -> bool {
    input.chars().all(is_phone_symbol)
}

fn is_phone_symbol(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')') || c.is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_full_numbers() {
        assert_eq!(format_ru_phone("89991234567"), "+7 999 123 45 67");
        assert_eq!(format_ru_phone("+7(999)123-45-67"), "+7 999 123 45 67");
        assert_eq!(format_ru_phone("1234567890"), "+7 123 456 78 90");
        assert_eq!(format_ru_phone(""), "");
        assert_eq!(format_ru_phone("abc"), "");
    }

    #[test]
    fn test_format_partial_input() {
        assert_eq!(format_ru_phone("8"), "+7");
        assert_eq!(format_ru_phone("79"), "+7 9");
        assert_eq!(format_ru_phone("7999"), "+7 999");
        assert_eq!(format_ru_phone("79991"), "+7 999 1");
        assert_eq!(format_ru_phone("7999123"), "+7 999 123");
        assert_eq!(format_ru_phone("79991234"), "+7 999 123 4");
        assert_eq!(format_ru_phone("7999123456"), "+7 999 123 45 6");
    }

    #[test]
    fn test_short_foreign_prefix_is_prepended() {
        assert_eq!(extract_digits("999"), "7999");
        assert_eq!(extract_digits("5551234567890"), "71234567890");
    }

    #[test]
    fn test_truncates_to_eleven_digits() {
        assert_eq!(format_ru_phone("799912345678888"), "+7 999 123 45 67");
    }

    #[test]
    fn test_format_is_idempotent() {
        let inputs = [
            "",
            "8",
            "9",
            "89991234567",
            "+7(999)123-45-67",
            "12345",
            "+7 999 12",
            "5551234567890",
            "hello 42",
            "  +7 (912) 000 ",
        ];
        for input in inputs {
            let once = format_ru_phone(input);
            assert_eq!(format_ru_phone(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_phone_likeness() {
        assert!(is_phone_like("+7 999 123 45 67"));
        assert!(is_phone_like("89991234567"));
        assert!(is_phone_like(" (999) 12-34 "));
        assert!(!is_phone_like("Pizza Hut"));
        assert!(!is_phone_like("   "));
        assert!(!is_phone_like("7-Eleven"));
        assert!(is_phone_input(""));
    }
}
