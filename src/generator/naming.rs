//! Output file naming.

use crate::model::BuildingStorey;

/// Replace every character that is not ASCII alphanumeric with `_`.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "storey".to_string()
    } else {
        cleaned
    }
}

/// Expand `{index}` (zero-padded to two digits) and `{name}` in a pattern.
pub fn expand_pattern(pattern: &str, storey: &BuildingStorey) -> String {
    pattern
        .replace("{index}", &format!("{:02}", storey.index))
        .replace("{name}", &sanitize_name(storey.display_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Level 1 / Mezz."), "Level_1___Mezz_");
        assert_eq!(sanitize_name("Étage"), "_tage");
        assert_eq!(sanitize_name("   "), "storey");
    }

    #[test]
    fn test_expand_pattern() {
        let storey = BuildingStorey::new("S3", "First Floor", 3, 3.5, 1.2);
        insta::assert_snapshot!(expand_pattern("{index}_{name}.svg", &storey), @"03_First_Floor.svg");
    }

    #[test]
    fn test_expand_pattern_falls_back_to_id() {
        let storey = BuildingStorey::new("S-12", "", 12, 0.0, 1.2);
        assert_eq!(expand_pattern("plan_{index}_{name}.geojson", &storey), "plan_12_S_12.geojson");
    }
}
