use std::sync::OnceLock;

use regex::Regex;

static GROUP_LIST_RE: OnceLock<Regex> = OnceLock::new();

fn group_list_pattern() -> &'static Regex {
    GROUP_LIST_RE.get_or_init(|| {
        Regex::new(r"(?i)groups\s+([^:;\[\](){}]+)").expect("invalid group list regex")
    })
}

/// Decides whether an event title addresses the configured group.
///
/// A title matches when it contains `group <n>` anywhere, or when any
/// `Groups <list>` segment lists the number, the number with the configured
/// subgroup letter, the number with `ab`, or a range that contains it.
#[derive(Debug, Clone)]
pub struct GroupMatcher {
    number: u32,
    direct_needle: String,
    accepted_tokens: [String; 3],
}

impl GroupMatcher {
    pub fn new(number: u32, subgroup: &str) -> Self {
        let subgroup = subgroup.trim().to_lowercase();
        Self {
            number,
            direct_needle: format!("group {number}"),
            accepted_tokens: [
                number.to_string(),
                format!("{number}{subgroup}"),
                format!("{number}ab"),
            ],
        }
    }

    pub fn matches(&self, title: &str) -> bool {
        let lowered = title.to_lowercase();

        if lowered.contains(&self.direct_needle) {
            return true;
        }

        group_list_pattern()
            .captures_iter(&lowered)
            .filter_map(|caps| caps.get(1))
            .flat_map(|list| list.as_str().split(','))
            .any(|token| self.token_matches(token.trim()))
    }

    fn token_matches(&self, token: &str) -> bool {
        if token.contains('-') {
            let mut bounds = token.split('-').map(parse_leading_int);
            let start = bounds.next().flatten();
            let end = bounds.next().flatten();
            return match (start, end) {
                (Some(start), Some(end)) => {
                    let number = i64::from(self.number);
                    start <= number && number <= end
                }
                _ => false,
            };
        }

        self.accepted_tokens.iter().any(|accepted| accepted == token)
    }
}

/// Reads the integer at the start of `text`, ignoring leading whitespace and
/// anything after the digits: `" 20abc"` reads as 20, `"abc"` as nothing.
/// Digit runs too long for `i64` saturate at `i64::MAX`.
fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let digits = text.strip_prefix('+').unwrap_or(text);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse().unwrap_or(i64::MAX))
}
