//! Data models for the quirk engine

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One incoming attribute report or cluster command, as delivered by
/// the host gateway
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub cluster_id: u16,
    /// Attribute id the host assigned to this report (0 for commands)
    pub attribute_id: u16,
    /// Cluster-specific command id, for command frames
    pub command_id: Option<u8>,
    /// Raw ZCL payload, including the attribute record header
    pub payload: Bytes,
}

impl ReportInput {
    /// Build an attribute report input
    #[must_use]
    pub fn attribute(cluster_id: u16, attribute_id: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            cluster_id,
            attribute_id,
            command_id: None,
            payload: payload.into(),
        }
    }

    /// Build a cluster command input
    #[must_use]
    pub fn command(cluster_id: u16, command_id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            cluster_id,
            attribute_id: 0,
            command_id: Some(command_id),
            payload: payload.into(),
        }
    }
}

/// A semantic item value
///
/// Numbers are f64 throughout, matching the numeric model of the
/// original scripting engine; structured values (the gradient
/// descriptor) are carried as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Struct(serde_json::Value),
}

impl ItemValue {
    /// Numeric view, if this value is a number
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ItemValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for ItemValue {
    fn from(v: f64) -> Self {
        ItemValue::Number(v)
    }
}

impl From<bool> for ItemValue {
    fn from(v: bool) -> Self {
        ItemValue::Bool(v)
    }
}

impl From<&str> for ItemValue {
    fn from(v: &str) -> Self {
        ItemValue::Text(v.to_string())
    }
}

/// The unit of output: one write against the host's item store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateWrite {
    /// Hierarchical item path, e.g. `state/temperature`
    pub path: String,
    pub value: ItemValue,
}

impl StateWrite {
    #[must_use]
    pub fn new(path: impl Into<String>, value: impl Into<ItemValue>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

/// A semantic transform from a decoded raw value to an item value
///
/// These are static data: each vendor table is a `const` list of
/// rules, the engine never synthesizes them at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Clamp into `[min, max]`, map linearly onto
    /// `[out_min, out_max]`, clamp and round. A result at or below
    /// zero emits 1, not 0 — the original battery mapping keeps a
    /// sliver of battery visible and marks the branch with `// ?`;
    /// preserved verbatim.
    Scale {
        min: f64,
        max: f64,
        out_min: f64,
        out_max: f64,
    },
    /// Multiply by a constant factor (centi-unit conversions)
    ScaleBy { factor: f64 },
    /// Divide (with rounding) then add a stored config value.
    /// The write is skipped when the config item is absent or the
    /// raw value equals the sentinel.
    Offset {
        by: &'static str,
        divisor: f64,
        skip_raw: Option<i64>,
    },
    /// Add a constant
    Bias { by: f64 },
    /// Index an ordered label list; out-of-range indexes yield a hex
    /// fallback label, never an error
    EnumLookup {
        labels: &'static [&'static str],
        one_based: bool,
    },
    /// Mask and shift the raw integer
    BitExtract { mask: u64, shift: u32 },
    /// Nonzero raw becomes `true`
    Flag,
    /// Low byte formatted as a `0.0.0_NNNN` firmware string
    SwVersion,
    /// Illuminance handling: emits the light level plus the
    /// dark/daylight companion booleans (see `transform` module)
    LightLevel { from_lux: bool },
    /// Raw value written unchanged
    Passthrough,
}

/// One output emission of a mapping rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emit {
    pub path: &'static str,
    pub transform: Transform,
}

/// Transform rule for one decoded field: one or more emissions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingRule {
    pub emits: &'static [Emit],
}

/// A mapping rule keyed by TLV tag (or struct element index)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagRule {
    pub tag: u16,
    pub rule: MappingRule,
}

/// Look up the rule for a tag in a vendor table
#[must_use]
pub fn resolve(rules: &'static [TagRule], tag: u16) -> Option<&'static MappingRule> {
    rules.iter().find(|r| r.tag == tag).map(|r| &r.rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[TagRule] = &[TagRule {
        tag: 0x0121,
        rule: MappingRule {
            emits: &[Emit {
                path: "config/battery",
                transform: Transform::Passthrough,
            }],
        },
    }];

    #[test]
    fn test_resolve_known_tag() {
        assert!(resolve(RULES, 0x0121).is_some());
    }

    #[test]
    fn test_resolve_unknown_tag() {
        assert!(resolve(RULES, 0x9A21).is_none());
    }

    #[test]
    fn test_item_value_serializes_untagged() {
        let json = serde_json::to_string(&ItemValue::Number(21.5)).unwrap();
        assert_eq!(json, "21.5");
        let json = serde_json::to_string(&ItemValue::Text("xy".into())).unwrap();
        assert_eq!(json, "\"xy\"");
    }
}
