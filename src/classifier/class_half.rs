use std::sync::OnceLock;

use regex::Regex;

static FIRST_HALF_RE: OnceLock<Regex> = OnceLock::new();
static SECOND_HALF_RE: OnceLock<Regex> = OnceLock::new();

fn first_half_pattern() -> &'static Regex {
    FIRST_HALF_RE.get_or_init(|| Regex::new(r"\bm1\b").expect("invalid m1 regex"))
}

fn second_half_pattern() -> &'static Regex {
    SECOND_HALF_RE.get_or_init(|| Regex::new(r"\bm2\b").expect("invalid m2 regex"))
}

/// `m1` as a standalone word keeps the event, `m2` alone drops it, and a
/// title with neither marker is kept. Matching runs on the lowercased title.
pub fn pertains_to_half(title: &str) -> bool {
    let lowered = title.to_lowercase();

    if first_half_pattern().is_match(&lowered) {
        return true;
    }

    !second_half_pattern().is_match(&lowered)
}
