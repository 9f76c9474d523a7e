//! Core type definitions for style conformance checks

use serde::{Deserialize, Serialize};

/// Maximum number of characters of element text kept for reporting
pub const MAX_REPORTED_TEXT_CHARS: usize = 80;

/// Computed style properties checked against the rule table
///
/// Variants are listed in evaluation order; mismatches are reported in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleProperty {
    Color,
    FontFamily,
    FontSize,
    FontStyle,
    LineHeight,
    FontWeight,
    TextTransform,
    LetterSpacing,
}

impl StyleProperty {
    /// Every recognized property, in evaluation order
    pub const ALL: [StyleProperty; 8] = [
        Self::Color,
        Self::FontFamily,
        Self::FontSize,
        Self::FontStyle,
        Self::LineHeight,
        Self::FontWeight,
        Self::TextTransform,
        Self::LetterSpacing,
    ];

    /// Key used in rule tables and snapshot JSON (`fontFamily`)
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::FontFamily => "fontFamily",
            Self::FontSize => "fontSize",
            Self::FontStyle => "fontStyle",
            Self::LineHeight => "lineHeight",
            Self::FontWeight => "fontWeight",
            Self::TextTransform => "textTransform",
            Self::LetterSpacing => "letterSpacing",
        }
    }

    /// CSS property name used in reports (`font-family`)
    pub fn css_name(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::FontFamily => "font-family",
            Self::FontSize => "font-size",
            Self::FontStyle => "font-style",
            Self::LineHeight => "line-height",
            Self::FontWeight => "font-weight",
            Self::TextTransform => "text-transform",
            Self::LetterSpacing => "letter-spacing",
        }
    }
}

impl std::fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.css_name())
    }
}

impl std::str::FromStr for StyleProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|p| p.config_key() == s || p.css_name() == s)
            .copied()
            .ok_or_else(|| format!("Unknown style property: {}", s))
    }
}

/// Computed style of one visible, text-bearing element
///
/// Produced by the browser layer. Any property may be missing; a missing
/// value fails every active constraint on that property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyleSnapshot {
    /// Lowercase tag name
    pub tag_name: String,
    /// Trimmed text, truncated for reporting
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_size: Option<String>,
    #[serde(default)]
    pub font_style: Option<String>,
    #[serde(default)]
    pub line_height: Option<String>,
    #[serde(default)]
    pub font_weight: Option<String>,
    #[serde(default)]
    pub text_transform: Option<String>,
    #[serde(default)]
    pub letter_spacing: Option<String>,
}

impl ElementStyleSnapshot {
    pub fn new(tag_name: impl Into<String>, text_content: impl AsRef<str>) -> Self {
        Self {
            tag_name: tag_name.into().to_lowercase(),
            text_content: truncate_text(text_content.as_ref()),
            ..Default::default()
        }
    }

    /// Builder-style setter for one computed value
    pub fn with(mut self, property: StyleProperty, value: impl Into<String>) -> Self {
        self.set(property, Some(value.into()));
        self
    }

    pub fn set(&mut self, property: StyleProperty, value: Option<String>) {
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
        *slot = value;
    }

    /// Computed value for a property, if the browser reported one
    pub fn value(&self, property: StyleProperty) -> Option<&str> {
        match property {
            StyleProperty::Color => self.color.as_deref(),
            StyleProperty::FontFamily => self.font_family.as_deref(),
            StyleProperty::FontSize => self.font_size.as_deref(),
            StyleProperty::FontStyle => self.font_style.as_deref(),
            StyleProperty::LineHeight => self.line_height.as_deref(),
            StyleProperty::FontWeight => self.font_weight.as_deref(),
            StyleProperty::TextTransform => self.text_transform.as_deref(),
            StyleProperty::LetterSpacing => self.letter_spacing.as_deref(),
        }
    }
}

/// Trim element text and cut it to [`MAX_REPORTED_TEXT_CHARS`], marking the cut with `...`
pub fn truncate_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_REPORTED_TEXT_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(MAX_REPORTED_TEXT_CHARS).collect();
    cut.push_str("...");
    cut
}

/// One property on one element that failed its rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMismatch {
    pub property: StyleProperty,
    /// Accepted values joined with `" or "`
    pub expected: String,
    /// Computed value, empty when the browser reported none
    pub found: String,
}

/// All failing properties of one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMismatches {
    pub tag: String,
    pub text: String,
    pub mismatches: Vec<PropertyMismatch>,
}

/// Elements of a page that failed at least one rule, in page order
///
/// An empty report means the page passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MismatchReport {
    elements: Vec<ElementMismatches>,
}

impl MismatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: ElementMismatches) {
        self.elements.push(element);
    }

    pub fn passed(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of failing elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Number of failing properties across all elements
    pub fn mismatch_count(&self) -> usize {
        self.elements.iter().map(|e| e.mismatches.len()).sum()
    }

    pub fn elements(&self) -> &[ElementMismatches] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ElementMismatches> {
        self.elements.iter()
    }

    pub fn to_pretty_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> IntoIterator for &'a MismatchReport {
    type Item = &'a ElementMismatches;
    type IntoIter = std::slice::Iter<'a, ElementMismatches>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
