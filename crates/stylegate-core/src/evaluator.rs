//! Computed-style conformance evaluation
//!
//! Pure functions over a [`StyleRuleTable`] and element snapshots. Nothing
//! here fails: a missing computed value is a mismatch against any active
//! constraint and irrelevant to an absent one.

use crate::rules::{StyleRule, StyleRuleTable};
use crate::types::{
    ElementMismatches, ElementStyleSnapshot, MismatchReport, PropertyMismatch, StyleProperty,
};

/// CSS font-weight keywords and the numeric weight they stand for
const FONT_WEIGHT_KEYWORDS: &[(&str, &str)] = &[
    ("thin", "100"),
    ("hairline", "100"),
    ("extralight", "200"),
    ("ultralight", "200"),
    ("light", "300"),
    ("normal", "400"),
    ("regular", "400"),
    ("medium", "500"),
    ("semibold", "600"),
    ("demibold", "600"),
    ("bold", "700"),
    ("extrabold", "800"),
    ("ultrabold", "800"),
    ("black", "900"),
    ("heavy", "900"),
];

static UNCONSTRAINED: StyleRule = StyleRule {
    color: None,
    font_family: None,
    font_size: None,
    font_style: None,
    line_height: None,
    font_weight: None,
    text_transform: None,
    letter_spacing: None,
};

/// Rule for a tag: its own entry, else `default`, else no constraints
pub fn resolve_rule<'a>(tag_name: &str, table: &'a StyleRuleTable) -> &'a StyleRule {
    table
        .get(tag_name)
        .or_else(|| table.default_rule())
        .unwrap_or(&UNCONSTRAINED)
}

/// Check the primary (first) family of a computed `font-family` list
///
/// Both sides are lowercased and stripped of quotes. Only the first computed
/// family counts, so a page that renders in a fallback font fails.
pub fn check_font_family(computed: Option<&str>, expected: Option<&[String]>) -> bool {
    let expected = match expected {
        Some(values) if !values.is_empty() => values,
        _ => return true,
    };
    let computed = match computed {
        Some(value) if !value.is_empty() => value,
        _ => return false,
    };

    let primary = normalize_font_name(computed)
        .split(',')
        .map(|family| family.trim().to_string())
        .next()
        .unwrap_or_default();

    expected
        .iter()
        .any(|family| normalize_font_name(family) == primary)
}

fn normalize_font_name(name: &str) -> String {
    name.to_lowercase().replace(['"', '\''], "")
}

/// Check a computed value against the accepted list by exact string equality
///
/// Font-weight keywords (`bold`, `light`, ...) are mapped to their numeric
/// weight first, whatever the property.
pub fn check_style_value(computed: Option<&str>, expected: Option<&[String]>) -> bool {
    let expected = match expected {
        Some(values) if !values.is_empty() => values,
        _ => return true,
    };
    let computed = match computed {
        Some(value) if !value.is_empty() => value,
        _ => return false,
    };

    let normalized = normalize_font_weight(computed);
    expected.iter().any(|value| value == normalized)
}

/// Map a font-weight keyword to its numeric string; other values pass through untouched
pub fn normalize_font_weight(value: &str) -> &str {
    let lowered = value.to_lowercase();
    FONT_WEIGHT_KEYWORDS
        .iter()
        .find(|(keyword, _)| *keyword == lowered)
        .map(|(_, weight)| *weight)
        .unwrap_or(value)
}

/// Check one property of a snapshot against a rule
pub fn check_property(
    property: StyleProperty,
    snapshot: &ElementStyleSnapshot,
    rule: &StyleRule,
) -> bool {
    let computed = snapshot.value(property);
    let expected = rule.expected(property);
    match property {
        StyleProperty::FontFamily => check_font_family(computed, expected),
        _ => check_style_value(computed, expected),
    }
}

/// All failing properties of one element, in [`StyleProperty::ALL`] order
pub fn evaluate_element(
    snapshot: &ElementStyleSnapshot,
    table: &StyleRuleTable,
) -> Vec<PropertyMismatch> {
    let rule = resolve_rule(&snapshot.tag_name, table);

    StyleProperty::ALL
        .into_iter()
        .filter(|property| !check_property(*property, snapshot, rule))
        .map(|property| PropertyMismatch {
            property,
            expected: rule.expected(property).unwrap_or_default().join(" or "),
            found: snapshot.value(property).unwrap_or_default().to_string(),
        })
        .collect()
}

/// Evaluate every snapshot in order and keep the elements that failed
pub fn evaluate_page<'a, I>(snapshots: I, table: &StyleRuleTable) -> MismatchReport
where
    I: IntoIterator<Item = &'a ElementStyleSnapshot>,
{
    let mut report = MismatchReport::new();
    for snapshot in snapshots {
        let mismatches = evaluate_element(snapshot, table);
        if !mismatches.is_empty() {
            report.push(ElementMismatches {
                tag: snapshot.tag_name.clone(),
                text: snapshot.text_content.clone(),
                mismatches,
            });
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_font_family_unconstrained() {
        assert!(check_font_family(None, None));
        assert!(check_font_family(Some("Arial"), Some(&[][..])));
        assert!(check_font_family(Some(""), None));
    }

    #[test]
    fn test_font_family_missing_computed() {
        let expected = list(&["Inter"]);
        assert!(!check_font_family(None, Some(expected.as_slice())));
        assert!(!check_font_family(Some(""), Some(expected.as_slice())));
    }

    #[test]
    fn test_font_family_primary_only() {
        let expected = list(&["Saira"]);
        assert!(check_font_family(Some("\"Saira\", sans-serif"), Some(expected.as_slice())));
        assert!(!check_font_family(Some("sans-serif, \"Saira\""), Some(expected.as_slice())));
    }

    #[test]
    fn test_font_family_case_and_quotes() {
        let expected = list(&["'Be Vietnam Pro'"]);
        assert!(check_font_family(Some("be vietnam pro, Arial"), Some(expected.as_slice())));
        assert!(check_font_family(Some("\"BE VIETNAM PRO\""), Some(expected.as_slice())));
    }

    #[test]
    fn test_font_family_expected_not_trimmed() {
        let expected = list(&[" Inter"]);
        assert!(!check_font_family(Some("Inter"), Some(expected.as_slice())));
    }

    #[test]
    fn test_style_value_exact_match() {
        let expected = list(&["72px", "50px"]);
        assert!(check_style_value(Some("50px"), Some(expected.as_slice())));
        assert!(!check_style_value(Some("50.0px"), Some(expected.as_slice())));
        assert!(!check_style_value(Some("50px "), Some(expected.as_slice())));
    }

    #[test]
    fn test_style_value_missing_computed() {
        let expected = list(&["italic"]);
        assert!(!check_style_value(None, Some(expected.as_slice())));
        assert!(!check_style_value(Some(""), Some(expected.as_slice())));
        assert!(check_style_value(None, None));
    }

    #[test]
    fn test_font_weight_keywords() {
        assert_eq!(normalize_font_weight("bold"), "700");
        assert_eq!(normalize_font_weight("BOLD"), "700");
        assert_eq!(normalize_font_weight("Hairline"), "100");
        assert_eq!(normalize_font_weight("heavy"), "900");
        assert_eq!(normalize_font_weight("650"), "650");
        assert_eq!(normalize_font_weight(" bold"), " bold");
    }

    #[test]
    fn test_keyword_normalization_ignores_property() {
        // "normal" is a font-style keyword too; it still maps to 400.
        let expected = list(&["normal"]);
        assert!(!check_style_value(Some("normal"), Some(expected.as_slice())));
        let numeric = list(&["400"]);
        assert!(check_style_value(Some("normal"), Some(numeric.as_slice())));
    }

    #[test]
    fn test_resolve_rule_fallbacks() {
        let h1 = StyleRule::unconstrained().with(StyleProperty::FontSize, ["72px"]);
        let default = StyleRule::unconstrained().with(StyleProperty::FontSize, ["15px"]);
        let table = StyleRuleTable::new()
            .with_rule("h1", h1.clone())
            .with_rule("default", default.clone());

        assert_eq!(resolve_rule("h1", &table), &h1);
        assert_eq!(resolve_rule("td", &table), &default);

        let bare = StyleRuleTable::new().with_rule("h1", h1);
        assert_eq!(resolve_rule("td", &bare), &StyleRule::unconstrained());
    }

    #[test]
    fn test_evaluate_element_collects_in_order() {
        let rule = StyleRule::unconstrained()
            .with(StyleProperty::Color, ["rgb(35, 31, 32)"])
            .with(StyleProperty::FontFamily, ["Inter"])
            .with(StyleProperty::LetterSpacing, ["0.6px"]);
        let table = StyleRuleTable::new().with_rule("h6", rule);

        let snapshot = ElementStyleSnapshot::new("h6", "Free shipping")
            .with(StyleProperty::Color, "rgb(0, 0, 0)")
            .with(StyleProperty::FontFamily, "Arial, sans-serif");

        let mismatches = evaluate_element(&snapshot, &table);
        let properties: Vec<StyleProperty> = mismatches.iter().map(|m| m.property).collect();
        assert_eq!(
            properties,
            vec![
                StyleProperty::Color,
                StyleProperty::FontFamily,
                StyleProperty::LetterSpacing
            ]
        );
        assert_eq!(mismatches[1].found, "Arial, sans-serif");
        assert_eq!(mismatches[2].expected, "0.6px");
        assert_eq!(mismatches[2].found, "");
    }

    #[test]
    fn test_evaluate_element_expected_joined() {
        let table = StyleRuleTable::new().with_rule(
            "p",
            StyleRule::unconstrained().with(StyleProperty::LineHeight, ["27.2px", "24px"]),
        );
        let snapshot =
            ElementStyleSnapshot::new("p", "Body").with(StyleProperty::LineHeight, "normal");

        let mismatches = evaluate_element(&snapshot, &table);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].expected, "27.2px or 24px");
        assert_eq!(mismatches[0].found, "normal");
    }

    #[test]
    fn test_evaluate_page_keeps_failures_only() {
        let table = StyleRuleTable::new().with_rule(
            "default",
            StyleRule::unconstrained().with(StyleProperty::FontStyle, ["italic"]),
        );
        let snapshots = vec![
            ElementStyleSnapshot::new("p", "ok").with(StyleProperty::FontStyle, "italic"),
            ElementStyleSnapshot::new("li", "bad").with(StyleProperty::FontStyle, "oblique"),
            ElementStyleSnapshot::new("td", "also ok").with(StyleProperty::FontStyle, "italic"),
        ];

        let report = evaluate_page(&snapshots, &table);
        assert_eq!(report.len(), 1);
        assert_eq!(report.elements()[0].tag, "li");
        assert_eq!(report.elements()[0].text, "bad");
        assert_eq!(report.elements()[0].mismatches[0].found, "oblique");
    }
}
