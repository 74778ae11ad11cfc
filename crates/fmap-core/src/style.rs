//! Map style descriptors.
//!
//! A style is a JSON array of rules in the native format:
//!
//! ```json
//! [{"featureType": "water", "elementType": "geometry", "stylers": [{"color": "#193341"}]}]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Errors found while parsing a style descriptor.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("Invalid style JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Styler {styler} in rule {rule} must have exactly one property, found {found}")]
    MalformedStyler {
        rule: usize,
        styler: usize,
        found: usize,
    },

    #[error("Unknown styler '{name}' in rule {rule}")]
    UnknownStyler { rule: usize, name: String },

    #[error("Invalid value for '{name}' in rule {rule}: {value}")]
    InvalidValue {
        rule: usize,
        name: String,
        value: String,
    },
}

/// One styling rule: which features to target and how to restyle them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default)]
    pub stylers: Vec<Map<String, Value>>,
}

/// A parsed, validated style descriptor.
///
/// Keeps the source text so the native engine receives exactly what the
/// caller sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MapStyle {
    source: String,
    rules: Vec<StyleRule>,
}

impl MapStyle {
    /// Parse and validate a style descriptor.
    pub fn parse(source: &str) -> Result<Self, StyleError> {
        let rules: Vec<StyleRule> = serde_json::from_str(source)?;
        for (index, rule) in rules.iter().enumerate() {
            validate_rule(index, rule)?;
        }
        Ok(Self {
            source: source.to_string(),
            rules,
        })
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    pub fn as_json(&self) -> &str {
        &self.source
    }
}

impl TryFrom<String> for MapStyle {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MapStyle> for String {
    fn from(value: MapStyle) -> Self {
        value.source
    }
}

fn validate_rule(rule: usize, style: &StyleRule) -> Result<(), StyleError> {
    for (index, styler) in style.stylers.iter().enumerate() {
        let mut entries = styler.iter();
        let (name, value) = match (entries.next(), styler.len()) {
            (Some(entry), 1) => entry,
            (_, found) => {
                return Err(StyleError::MalformedStyler {
                    rule,
                    styler: index,
                    found,
                });
            }
        };
        let valid = match name.as_str() {
            "hue" | "color" => value.as_str().is_some_and(is_hex_color),
            "lightness" | "saturation" => in_range(value, -100.0, 100.0),
            "gamma" => in_range(value, 0.01, 10.0),
            "weight" => in_range(value, 0.0, f64::MAX),
            "invert_lightness" => value.is_boolean(),
            "visibility" => matches!(value.as_str(), Some("on" | "off" | "simplified")),
            _ => {
                return Err(StyleError::UnknownStyler {
                    rule,
                    name: name.clone(),
                });
            }
        };
        if !valid {
            return Err(StyleError::InvalidValue {
                rule,
                name: name.clone(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn in_range(value: &Value, min: f64, max: f64) -> bool {
    value.as_f64().is_some_and(|v| (min..=max).contains(&v))
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
