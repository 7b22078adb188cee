//! Unit string normalization
//!
//! Records carry units the way people typed them: `"per ton"`,
//! `"units - 140k"`, `"fl oz"`, `"litres"`. Every unit string goes through
//! `parse_unit` before it reaches the registry.
//!
//! Each transform is applied until the string stops changing, so running a
//! transform on its own output is a no-op.

/// Rewrites applied by `normalize_unit`
fn normalize_step(s: &str) -> String {
    let s = s.trim();
    let s = s.strip_prefix("per ").unwrap_or(s);
    s.replace("fl oz", "floz")
        .replace(" - ", "")
        .replace("metric ton", "tonne")
        .trim()
        .to_string()
}

/// Rewrites applied by `normalize_legacy_unit`
fn legacy_step(s: &str) -> String {
    s.replace("fl oz", "floz").replace("litres", "liters")
}

fn fixed_point(s: &str, step: impl Fn(&str) -> String) -> String {
    let mut current = step(s);
    // Every rewrite shortens the string or removes a "litres", so this
    // settles well within the bound.
    for _ in 0..=s.len() {
        let next = step(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Canonical spelling of a free-form unit
///
/// - `"per ton"` → `"ton"`
/// - `"fl oz"` → `"floz"`
/// - `"units - 130k"` → `"units130k"`
/// - `"metric tons"` → `"tonnes"`
pub fn normalize_unit(s: &str) -> String {
    fixed_point(s, normalize_step)
}

/// Rewrite spellings stored by older records
///
/// Only `"fl oz"` and `"litres"` are rewritten; anything else comes back
/// unchanged.
pub fn normalize_legacy_unit(s: &str) -> String {
    fixed_point(s, legacy_step)
}

/// Full normalization used before every registry lookup
pub fn parse_unit(s: &str) -> String {
    fixed_point(s, |s| normalize_step(&legacy_step(s)))
}

/// Whether a unit names the per-product custom unit
pub fn is_custom_unit(s: &str) -> bool {
    parse_unit(s) == "custom"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_per() {
        assert_eq!(normalize_unit("per ton"), "ton");
        assert_eq!(normalize_unit("  per gallons "), "gallons");
        assert_eq!(normalize_unit("per per bag"), "bag");
        assert_eq!(normalize_unit("percent"), "percent");
    }

    #[test]
    fn test_normalize_rewrites() {
        assert_eq!(normalize_unit("fl oz"), "floz");
        assert_eq!(normalize_unit("units - 130k"), "units130k");
        assert_eq!(normalize_unit("per units - 140k"), "units140k");
        assert_eq!(normalize_unit("metric tons"), "tonnes");
        assert_eq!(normalize_unit("metric ton"), "tonne");
    }

    #[test]
    fn test_already_normalized_unchanged() {
        for unit in ["gallons", "milliliters", "floz", "units130k", "tonnes", "bushels", "custom"] {
            assert_eq!(normalize_unit(unit), unit);
            assert_eq!(parse_unit(unit), unit);
        }
    }

    #[test]
    fn test_legacy() {
        assert_eq!(normalize_legacy_unit("litres"), "liters");
        assert_eq!(normalize_legacy_unit("fl oz"), "floz");
        for unit in ["milliliters", "units - 140k", "metric tons", "per ton"] {
            assert_eq!(normalize_legacy_unit(unit), unit);
        }
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "per fl oz", "litres", "per metric tons", "units - 130k", "lit - res",
            "fl - oz", "per  per ton", " - ", "", "per litres",
        ];
        for input in inputs {
            let once = parse_unit(input);
            assert_eq!(parse_unit(&once), once, "parse_unit({:?})", input);

            let once = normalize_unit(input);
            assert_eq!(normalize_unit(&once), once, "normalize_unit({:?})", input);

            let once = normalize_legacy_unit(input);
            assert_eq!(normalize_legacy_unit(&once), once, "normalize_legacy_unit({:?})", input);
        }
    }

    #[test]
    fn test_legacy_and_current_spellings_agree() {
        assert_eq!(parse_unit("litres"), parse_unit("liters"));
        assert_eq!(parse_unit("fl oz"), parse_unit("floz"));
        assert_eq!(parse_unit("lit - res"), "liters");
    }

    #[test]
    fn test_is_custom_unit() {
        assert!(is_custom_unit("custom"));
        assert!(is_custom_unit("per custom"));
        assert!(!is_custom_unit("customs"));
    }
}
