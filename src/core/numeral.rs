//! Numeral-system conversion between binary, octal, decimal and
//! hexadecimal. The source base comes from an explicit `bin:`/`oct:`/
//! `dec:`/`hex:` prefix or is detected from the literal's shape; binary and
//! octal output is grouped into 4-digit clusters.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberBase {
    Binary,
    Octal,
    Decimal,
    Hexadecimal,
}

impl NumberBase {
    fn radix(self) -> u32 {
        match self {
            NumberBase::Binary => 2,
            NumberBase::Octal => 8,
            NumberBase::Decimal => 10,
            NumberBase::Hexadecimal => 16,
        }
    }

    fn from_keyword(token: &str) -> Option<Self> {
        match token {
            "bin" | "binary" => Some(NumberBase::Binary),
            "oct" | "octal" => Some(NumberBase::Octal),
            "dec" | "decimal" => Some(NumberBase::Decimal),
            "hex" | "hexadecimal" => Some(NumberBase::Hexadecimal),
            _ => None,
        }
    }
}

static RE_BASE_CONVERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(bin|oct|dec|hex):\s*)?([0-9a-fx ]+?)\s+(?:to|in)\s+([a-z]+)$").unwrap()
});

static RE_HEX_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[xX][0-9a-fA-F]+$").unwrap());

/// Recognize a whole line of the form `[base:] <literal> to <base>`.
/// Unresolvable targets and malformed literals fall through to the next
/// recognizer by returning `None`.
pub fn recognize(line: &str) -> Option<String> {
    let caps = RE_BASE_CONVERSION.captures(line)?;
    let target = NumberBase::from_keyword(&caps[3].to_lowercase())?;
    let explicit = caps
        .get(1)
        .and_then(|m| NumberBase::from_keyword(&m.as_str().to_lowercase()));
    let (value, _) = parse_literal(caps[2].trim(), explicit)?;
    Some(render(value, target))
}

/// Re-render a bare hex literal with its digits uppercased.
pub fn normalize_hex_literal(line: &str) -> Option<String> {
    if !RE_HEX_LITERAL.is_match(line) {
        return None;
    }
    let (value, _) = parse_literal(line, Some(NumberBase::Hexadecimal))?;
    Some(render(value, NumberBase::Hexadecimal))
}

/// Re-group a spaced run of binary or octal digits into canonical 4-digit
/// clusters. Unspaced runs are left to the plain-number path.
pub fn normalize_grouping(line: &str) -> Option<String> {
    if !line.contains(' ') {
        return None;
    }
    let compact = line.replace(' ', "");
    if compact.is_empty() {
        return None;
    }
    if compact.chars().all(|c| c == '0' || c == '1') {
        let value = u64::from_str_radix(&compact, 2).ok()?;
        return Some(render(value, NumberBase::Binary));
    }
    if compact.starts_with('0') && compact.chars().all(|c| ('0'..='7').contains(&c)) {
        let value = u64::from_str_radix(&compact, 8).ok()?;
        return Some(render(value, NumberBase::Octal));
    }
    None
}

/// Parse a literal in the explicit base or detect the base from shape.
fn parse_literal(text: &str, explicit: Option<NumberBase>) -> Option<(u64, NumberBase)> {
    let base = explicit.or_else(|| detect_base(text))?;
    let digits = match base {
        NumberBase::Hexadecimal => {
            let stripped = text
                .strip_prefix("0x")
                .or_else(|| text.strip_prefix("0X"))
                .unwrap_or(text);
            stripped.replace(' ', "")
        }
        NumberBase::Binary | NumberBase::Octal => text.replace(' ', ""),
        NumberBase::Decimal => text.to_string(),
    };
    if digits.is_empty() {
        return None;
    }
    let value = u64::from_str_radix(&digits, base.radix()).ok()?;
    Some((value, base))
}

/// Shape detection prefers the most specific reading: `0x` marks hex,
/// nibble-grouped 0/1 digits are binary, a zero-led run of octal digits is
/// octal, and any other digit run is decimal. Hex digits without the `0x`
/// or `hex:` marker are never guessed.
fn detect_base(text: &str) -> Option<NumberBase> {
    if text.starts_with("0x") || text.starts_with("0X") {
        return Some(NumberBase::Hexadecimal);
    }
    if is_nibble_grouped_binary(text) {
        return Some(NumberBase::Binary);
    }
    if text.len() > 1 && text.starts_with('0') && text.chars().all(|c| ('0'..='7').contains(&c)) {
        return Some(NumberBase::Octal);
    }
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        return Some(NumberBase::Decimal);
    }
    None
}

fn is_nibble_grouped_binary(text: &str) -> bool {
    let groups: Vec<&str> = text.split(' ').collect();
    if groups
        .iter()
        .any(|g| g.is_empty() || g.chars().any(|c| c != '0' && c != '1'))
    {
        return false;
    }
    if groups.len() == 1 {
        let len = groups[0].len();
        return len > 0 && len % 4 == 0;
    }
    groups[0].len() <= 4 && groups[1..].iter().all(|g| g.len() == 4)
}

fn render(value: u64, base: NumberBase) -> String {
    match base {
        NumberBase::Decimal => value.to_string(),
        NumberBase::Hexadecimal => format!("0x{:X}", value),
        NumberBase::Binary => group_digits(&format!("{:b}", value)),
        NumberBase::Octal => group_digits(&format!("{:o}", value)),
    }
}

/// Left-pad with zeros to a multiple of four digits and insert a space
/// between clusters.
fn group_digits(digits: &str) -> String {
    let pad = (4 - digits.len() % 4) % 4;
    let mut out = String::with_capacity(digits.len() + pad + digits.len() / 4);
    for (i, c) in std::iter::repeat('0')
        .take(pad)
        .chain(digits.chars())
        .enumerate()
    {
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_to_decimal() {
        assert_eq!(recognize("1010 to dec").unwrap(), "10");
        assert_eq!(recognize("1010 0011 to dec").unwrap(), "163");
        assert_eq!(recognize("10 1010 to dec").unwrap(), "42");
        assert_eq!(recognize("bin:101 to dec").unwrap(), "5");
    }

    #[test]
    fn test_decimal_to_hex_uppercases() {
        assert_eq!(recognize("255 to hex").unwrap(), "0xFF");
        assert_eq!(recognize("dec:255 to hex").unwrap(), "0xFF");
    }

    #[test]
    fn test_hex_sources() {
        assert_eq!(recognize("0xff to dec").unwrap(), "255");
        assert_eq!(recognize("hex:3C2 to dec").unwrap(), "962");
        assert_eq!(recognize("0x10 to bin").unwrap(), "0001 0000");
    }

    #[test]
    fn test_octal_shapes() {
        assert_eq!(recognize("0755 to dec").unwrap(), "493");
        assert_eq!(recognize("255 to oct").unwrap(), "0377");
        // A bare digit run without the leading zero is decimal
        assert_eq!(recognize("755 to dec").unwrap(), "755");
    }

    #[test]
    fn test_binary_output_grouping() {
        assert_eq!(recognize("255 to bin").unwrap(), "1111 1111");
        assert_eq!(recognize("300 to bin").unwrap(), "0001 0010 1100");
        assert_eq!(recognize("0 to bin").unwrap(), "0000");
    }

    #[test]
    fn test_short_runs_read_as_decimal() {
        // Two binary-looking digits do not form a nibble group
        assert_eq!(recognize("11 to dec").unwrap(), "11");
        assert_eq!(recognize("11 to bin").unwrap(), "1011");
    }

    #[test]
    fn test_unrelated_lines_fall_through() {
        assert_eq!(recognize("10 mb to kb"), None);
        assert_eq!(recognize("255 to b"), None);
        assert_eq!(recognize("100 C to F"), None);
        assert_eq!(recognize("hello to dec"), None);
    }

    #[test]
    fn test_overflowing_literal_falls_through() {
        assert_eq!(recognize("0xFFFFFFFFFFFFFFFFF to dec"), None);
    }

    #[test]
    fn test_normalizers() {
        assert_eq!(normalize_hex_literal("0xff").unwrap(), "0xFF");
        assert_eq!(normalize_hex_literal("255"), None);
        assert_eq!(normalize_grouping("10 1010").unwrap(), "0010 1010");
        assert_eq!(normalize_grouping("07 55").unwrap(), "0755");
        assert_eq!(normalize_grouping("1010"), None);
    }
}
