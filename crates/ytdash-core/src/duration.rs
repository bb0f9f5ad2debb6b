//! Compact `PT#H#M#S` duration parsing.
//!
//! The provider reports video length as an ISO-8601-style duration limited to
//! hours, minutes and seconds. Anything that does not start with a recognizable
//! `PT` prefix degrades to zero seconds; this function never fails.

use std::sync::LazyLock;

use regex::Regex;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("valid duration regex")
});

/// Parses `PT[nH][nM][nS]` into total seconds.
///
/// Missing components count as zero. Empty input, `"PT"` alone and
/// unrecognized text all return `0`. Components too large for `u64` are
/// treated as zero rather than wrapping.
#[must_use]
pub fn parse_duration(text: &str) -> u64 {
    let Some(caps) = DURATION_RE.captures(text.trim()) else {
        return 0;
    };

    let component = |idx: usize| -> u64 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    component(1)
        .saturating_mul(3600)
        .saturating_add(component(2).saturating_mul(60))
        .saturating_add(component(3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_duration() {
        assert_eq!(parse_duration("PT1H2M3S"), 3723);
    }

    #[test]
    fn components_are_optional() {
        assert_eq!(parse_duration("PT45S"), 45);
        assert_eq!(parse_duration("PT10M"), 600);
        assert_eq!(parse_duration("PT2H"), 7200);
        assert_eq!(parse_duration("PT1H30S"), 3630);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(parse_duration(""), 0);
    }

    #[test]
    fn bare_prefix_is_zero() {
        assert_eq!(parse_duration("PT"), 0);
    }

    #[test]
    fn garbage_is_zero() {
        assert_eq!(parse_duration("garbage"), 0);
        assert_eq!(parse_duration("1H2M3S"), 0);
    }

    #[test]
    fn day_designator_is_not_understood() {
        // Day-length live streams come back as P1DT2H; only the PT form is supported.
        assert_eq!(parse_duration("P1DT2H"), 0);
    }

    #[test]
    fn grid_of_components_matches_formula() {
        for h in [0u64, 1, 7, 25] {
            for m in [0u64, 1, 59] {
                for s in [0u64, 9, 59] {
                    let text = format!("PT{h}H{m}M{s}S");
                    assert_eq!(parse_duration(&text), h * 3600 + m * 60 + s, "{text}");
                }
            }
        }
    }

    #[test]
    fn oversized_component_does_not_panic() {
        assert_eq!(parse_duration("PT99999999999999999999999H5S"), 5);
    }
}
