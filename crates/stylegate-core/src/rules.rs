//! Style rule tables: which computed values each tag may render with
//!
//! A table maps lowercase tag names to a [`StyleRule`]. Tags without an
//! entry use the `default` rule. Within a rule, each property is either
//! unconstrained (`null`, `[]` or missing) or a list of accepted values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::StyleProperty;

/// Key of the fallback rule in a [`StyleRuleTable`]
pub const DEFAULT_RULE_KEY: &str = "default";

/// Accepted values per property for one tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    #[serde(default)]
    pub color: Option<Vec<String>>,
    #[serde(default)]
    pub font_family: Option<Vec<String>>,
    #[serde(default)]
    pub font_size: Option<Vec<String>>,
    #[serde(default)]
    pub font_style: Option<Vec<String>>,
    #[serde(default)]
    pub line_height: Option<Vec<String>>,
    #[serde(default)]
    pub font_weight: Option<Vec<String>>,
    #[serde(default)]
    pub text_transform: Option<Vec<String>>,
    #[serde(default)]
    pub letter_spacing: Option<Vec<String>>,
}

impl StyleRule {
    /// Rule with no constraints; every element passes it
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Builder-style setter; an empty list clears the constraint
    pub fn with<I, S>(mut self, property: StyleProperty, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.set(property, if values.is_empty() { None } else { Some(values) });
        self
    }

    pub fn set(&mut self, property: StyleProperty, values: Option<Vec<String>>) {
        let slot = match property {
            StyleProperty::Color => &mut self.color,
            StyleProperty::FontFamily => &mut self.font_family,
            StyleProperty::FontSize => &mut self.font_size,
            StyleProperty::FontStyle => &mut self.font_style,
            StyleProperty::LineHeight => &mut self.line_height,
            StyleProperty::FontWeight => &mut self.font_weight,
            StyleProperty::TextTransform => &mut self.text_transform,
            StyleProperty::LetterSpacing => &mut self.letter_spacing,
        };
        *slot = values;
    }

    /// Accepted values for a property; `None` when the property is unconstrained
    pub fn expected(&self, property: StyleProperty) -> Option<&[String]> {
        let values = match property {
            StyleProperty::Color => &self.color,
            StyleProperty::FontFamily => &self.font_family,
            StyleProperty::FontSize => &self.font_size,
            StyleProperty::FontStyle => &self.font_style,
            StyleProperty::LineHeight => &self.line_height,
            StyleProperty::FontWeight => &self.font_weight,
            StyleProperty::TextTransform => &self.text_transform,
            StyleProperty::LetterSpacing => &self.letter_spacing,
        };
        values.as_deref().filter(|v| !v.is_empty())
    }

    /// Properties this rule actually constrains
    pub fn active_properties(&self) -> impl Iterator<Item = StyleProperty> + '_ {
        StyleProperty::ALL
            .into_iter()
            .filter(move |p| self.expected(*p).is_some())
    }
}

/// Tag name → [`StyleRule`], with a `default` fallback entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleRuleTable {
    rules: BTreeMap<String, StyleRule>,
}

impl StyleRuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from its JSON object form
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_pretty_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Insert or replace the rule for a tag (stored lowercase)
    pub fn insert(&mut self, tag: impl AsRef<str>, rule: StyleRule) {
        self.rules.insert(tag.as_ref().to_lowercase(), rule);
    }

    pub fn with_rule(mut self, tag: impl AsRef<str>, rule: StyleRule) -> Self {
        self.insert(tag, rule);
        self
    }

    /// Exact lookup without fallback
    pub fn get(&self, tag: &str) -> Option<&StyleRule> {
        self.rules.get(tag)
    }

    pub fn default_rule(&self) -> Option<&StyleRule> {
        self.rules.get(DEFAULT_RULE_KEY)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The style guide used when no external rule table is configured
    pub fn builtin() -> Self {
        Self::new()
            // Saira display headings run at 110% line height.
            .with_rule("h1", display_heading(&["72px", "50px"], &["79.2px", "55px"]))
            .with_rule("h2", display_heading(&["36px"], &["39.6px"]))
            .with_rule("h3", display_heading(&["30px"], &["33px"]))
            .with_rule("h4", display_heading(&["26px"], &["28.6px"]))
            .with_rule(
                "h5",
                body_text(&["20px"], &["26px"], "700").with(StyleProperty::TextTransform, ["none"]),
            )
            .with_rule(
                "h6",
                body_text(&["15px"], &["18px"], "500")
                    .with(StyleProperty::LetterSpacing, ["0.6px"])
                    .with(StyleProperty::TextTransform, ["uppercase"]),
            )
            .with_rule(
                "p",
                body_text(&["17px", "15px"], &["27.2px", "24px"], "400")
                    .with(StyleProperty::TextTransform, ["none"]),
            )
            .with_rule(DEFAULT_RULE_KEY, StyleRule::unconstrained())
    }
}

const BUILTIN_INK: &str = "rgb(35, 31, 32)";

fn display_heading(sizes: &[&str], line_heights: &[&str]) -> StyleRule {
    StyleRule::unconstrained()
        .with(StyleProperty::Color, [BUILTIN_INK])
        .with(StyleProperty::FontFamily, ["Saira"])
        .with(StyleProperty::FontSize, sizes.iter().copied())
        .with(StyleProperty::FontStyle, ["italic"])
        .with(StyleProperty::FontWeight, ["900"])
        .with(StyleProperty::LineHeight, line_heights.iter().copied())
        .with(StyleProperty::TextTransform, ["uppercase"])
}

fn body_text(sizes: &[&str], line_heights: &[&str], weight: &str) -> StyleRule {
    StyleRule::unconstrained()
        .with(StyleProperty::Color, [BUILTIN_INK])
        .with(StyleProperty::FontFamily, ["Inter"])
        .with(StyleProperty::FontSize, sizes.iter().copied())
        .with(StyleProperty::FontStyle, ["normal"])
        .with(StyleProperty::FontWeight, [weight])
        .with(StyleProperty::LineHeight, line_heights.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_and_empty_are_unconstrained() {
        let json = r#"{ "fontSize": null, "fontWeight": [], "color": ["red"] }"#;
        let rule: StyleRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.expected(StyleProperty::FontSize), None);
        assert_eq!(rule.expected(StyleProperty::FontWeight), None);
        assert_eq!(rule.expected(StyleProperty::LetterSpacing), None);
        assert_eq!(
            rule.expected(StyleProperty::Color),
            Some(&["red".to_string()][..])
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let json = r#"{ "fontSize": ["12px"], "margin": ["0"] }"#;
        let rule: StyleRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.active_properties().collect::<Vec<_>>(), vec![StyleProperty::FontSize]);
    }

    #[test]
    fn test_with_empty_clears_constraint() {
        let rule = StyleRule::unconstrained()
            .with(StyleProperty::FontStyle, ["italic"])
            .with(StyleProperty::FontStyle, Vec::<String>::new());
        assert_eq!(rule.expected(StyleProperty::FontStyle), None);
    }

    #[test]
    fn test_table_from_json() {
        let json = r#"{
            "h1": { "fontFamily": ["Be Vietnam Pro"], "fontWeight": ["800"] },
            "default": { "fontSize": ["18px", "16px", "14px"] }
        }"#;
        let table = StyleRuleTable::from_json(json).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get("h1").is_some());
        assert!(table.default_rule().is_some());
        assert_eq!(
            table.default_rule().unwrap().expected(StyleProperty::FontSize).map(|v| v.len()),
            Some(3)
        );
    }

    #[test]
    fn test_table_from_malformed_json() {
        assert!(StyleRuleTable::from_json("{ not json").is_err());
        assert!(StyleRuleTable::from_json(r#"["h1"]"#).is_err());
    }

    #[test]
    fn test_insert_lowercases_tag() {
        let table = StyleRuleTable::new().with_rule("H2", StyleRule::unconstrained());
        assert!(table.get("h2").is_some());
        assert!(table.get("H2").is_none());
    }

    #[test]
    fn test_builtin_table() {
        let table = StyleRuleTable::builtin();
        let tags: Vec<&str> = table.tags().collect();
        assert_eq!(tags, vec!["default", "h1", "h2", "h3", "h4", "h5", "h6", "p"]);

        let h1 = table.get("h1").unwrap();
        assert_eq!(
            h1.expected(StyleProperty::FontSize),
            Some(&["72px".to_string(), "50px".to_string()][..])
        );
        assert_eq!(h1.expected(StyleProperty::LetterSpacing), None);

        let h6 = table.get("h6").unwrap();
        assert_eq!(
            h6.expected(StyleProperty::LetterSpacing),
            Some(&["0.6px".to_string()][..])
        );

        assert_eq!(table.default_rule().unwrap().active_properties().count(), 0);
    }

    #[test]
    fn test_builtin_round_trips_through_json() {
        let table = StyleRuleTable::builtin();
        let json = table.to_pretty_json().unwrap();
        assert_eq!(StyleRuleTable::from_json(&json).unwrap(), table);
    }
}
