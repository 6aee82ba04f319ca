//! Transform & emit pipeline
//!
//! Applies a mapping rule's transforms to one decoded raw value and
//! produces the resulting state writes. Every emission is gated on
//! the target item existing in the store, mirroring the
//! `R.item(path) != null` guards of the original scripts: a missing
//! item or missing config dependency skips the write, it is not an
//! error.

use crate::model::{Emit, ItemValue, MappingRule, StateWrite, Transform};
use crate::store::ItemStore;
use zcl_codec::FieldValue;

/// Config paths for the illuminance threshold pair
const THOLD_DARK: &str = "config/tholddark";
const THOLD_OFFSET: &str = "config/tholdoffset";

/// Apply a rule to a decoded raw value
pub fn apply_rule(rule: &MappingRule, raw: &FieldValue, store: &dyn ItemStore) -> Vec<StateWrite> {
    let mut writes = Vec::new();
    for emit in rule.emits {
        apply_emit(emit, raw, store, &mut writes);
    }
    writes
}

fn apply_emit(emit: &Emit, raw: &FieldValue, store: &dyn ItemStore, out: &mut Vec<StateWrite>) {
    if let Transform::LightLevel { from_lux } = emit.transform {
        if let Some(v) = raw.as_f64() {
            light_level_writes(emit.path, v, from_lux, store, out);
        }
        return;
    }

    // Target item must exist in the device profile
    if store.read(emit.path).is_none() {
        tracing::debug!(path = emit.path, "item not defined, skipping write");
        return;
    }

    if let Some(value) = transform_value(emit.transform, raw, store) {
        out.push(StateWrite::new(emit.path, value));
    }
}

fn transform_value(
    transform: Transform,
    raw: &FieldValue,
    store: &dyn ItemStore,
) -> Option<ItemValue> {
    match transform {
        Transform::Scale {
            min,
            max,
            out_min,
            out_max,
        } => {
            let v = raw.as_f64()?;
            Some(ItemValue::Number(scale(v, min, max, out_min, out_max)))
        }
        Transform::ScaleBy { factor } => Some(ItemValue::Number(raw.as_f64()? * factor)),
        Transform::Offset {
            by,
            divisor,
            skip_raw,
        } => offset_value(raw, by, divisor, skip_raw, store),
        Transform::Bias { by } => Some(ItemValue::Number(raw.as_f64()? + by)),
        Transform::EnumLookup { labels, one_based } => {
            let idx = raw.as_i64()?;
            Some(ItemValue::Text(lookup_label(labels, idx, one_based)))
        }
        Transform::BitExtract { mask, shift } => {
            let v = raw.as_i64()? as u64;
            Some(ItemValue::Number(((v & mask) >> shift) as f64))
        }
        Transform::Flag => Some(ItemValue::Bool(raw.as_i64()? != 0)),
        Transform::SwVersion => {
            let v = raw.as_i64()? as u64;
            Some(ItemValue::Text(format!("0.0.0_{:04}", v & 0xFF)))
        }
        Transform::Passthrough => match raw {
            FieldValue::Text(s) => Some(ItemValue::Text(s.clone())),
            other => other.as_f64().map(ItemValue::Number),
        },
        // Handled by apply_emit before reaching here
        Transform::LightLevel { .. } => None,
    }
}

/// Clamped linear range mapping with the battery quirk
///
/// A post-clamp result at or below zero comes out as 1, not 0: the
/// original battery scripts keep an almost-empty battery from showing
/// as dead and flag the branch with `// ?`.
fn scale(raw: f64, min: f64, max: f64, out_min: f64, out_max: f64) -> f64 {
    let v = raw.clamp(min, max);
    let mapped = (v - min) / (max - min) * (out_max - out_min) + out_min;
    let out = mapped.clamp(out_min, out_max).round();
    if out <= 0.0 {
        1.0
    } else {
        out
    }
}

fn offset_value(
    raw: &FieldValue,
    by: &str,
    divisor: f64,
    skip_raw: Option<i64>,
    store: &dyn ItemStore,
) -> Option<ItemValue> {
    if skip_raw.is_some() && raw.as_i64() == skip_raw {
        return None;
    }
    let Some(offset) = store.read(by).and_then(|v| v.as_f64()) else {
        tracing::debug!(config = by, "config item not defined, skipping rule");
        return None;
    };
    let mut v = raw.as_f64()?;
    if divisor != 1.0 {
        v = (v / divisor).round();
    }
    Some(ItemValue::Number(v + offset))
}

fn lookup_label(labels: &[&str], idx: i64, one_based: bool) -> String {
    let rel = idx - i64::from(one_based);
    usize::try_from(rel)
        .ok()
        .and_then(|i| labels.get(i))
        .map_or_else(|| format!("0x{idx:02x}"), |label| (*label).to_string())
}

/// Shared illuminance derivation
///
/// Emits the light level (capped at 0xFFFE), the derived or raw lux
/// value, and the `state/dark` / `state/daylight` companion booleans
/// compared against the configured threshold pair. This is the single
/// implementation of the pattern every illuminance-class device
/// repeats; profiles must not re-derive it.
pub fn light_level_writes(
    level_path: &str,
    raw: f64,
    from_lux: bool,
    store: &dyn ItemStore,
    out: &mut Vec<StateWrite>,
) {
    let (level, lux) = if from_lux {
        let lux = raw;
        let level = if lux > 0.0 && lux < 65535.0 {
            (10000.0 * lux.log10() + 1.0).round()
        } else {
            0.0
        };
        (level, lux)
    } else {
        let level = raw;
        let lux = 10f64.powf((level.clamp(0.0, 60001.0) - 1.0) / 10000.0).round();
        (level, lux)
    };
    let level = level.min(65534.0);

    if store.read(level_path).is_some() {
        out.push(StateWrite::new(level_path.to_string(), level));
    }

    let dark = store.read(THOLD_DARK).and_then(|v| v.as_f64());
    let offset = store.read(THOLD_OFFSET).and_then(|v| v.as_f64());
    if let (Some(tholddark), Some(tholdoffset)) = (dark, offset) {
        if store.read("state/dark").is_some() {
            out.push(StateWrite::new("state/dark", level <= tholddark));
        }
        if store.read("state/daylight").is_some() {
            out.push(StateWrite::new(
                "state/daylight",
                level >= tholddark + tholdoffset,
            ));
        }
    }

    if store.read("state/lux").is_some() {
        out.push(StateWrite::new("state/lux", lux));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Emit;
    use crate::store::MemoryStore;

    fn battery_rule() -> MappingRule {
        MappingRule {
            emits: &[Emit {
                path: "config/battery",
                transform: Transform::Scale {
                    min: 2700.0,
                    max: 3000.0,
                    out_min: 0.0,
                    out_max: 100.0,
                },
            }],
        }
    }

    #[test]
    fn test_scale_stays_in_output_range() {
        for raw in [0.0, 2699.0, 2700.0, 2850.0, 3000.0, 9999.0] {
            let out = scale(raw, 2700.0, 3000.0, 0.0, 100.0);
            assert!((1.0..=100.0).contains(&out), "raw {raw} -> {out}");
        }
    }

    #[test]
    fn test_battery_at_vmin_is_one_not_zero() {
        assert_eq!(scale(2700.0, 2700.0, 3000.0, 0.0, 100.0), 1.0);
    }

    #[test]
    fn test_battery_rounding() {
        assert_eq!(scale(2800.0, 2700.0, 3000.0, 0.0, 100.0), 33.0);
    }

    #[test]
    fn test_rule_skipped_without_item() {
        let store = MemoryStore::new();
        let writes = apply_rule(&battery_rule(), &FieldValue::Unsigned(2800), &store);
        assert!(writes.is_empty());
    }

    #[test]
    fn test_rule_applies_with_item() {
        let store = MemoryStore::with_items([("config/battery", ItemValue::Number(0.0))]);
        let writes = apply_rule(&battery_rule(), &FieldValue::Unsigned(2800), &store);
        assert_eq!(writes, vec![StateWrite::new("config/battery", 33.0)]);
    }

    #[test]
    fn test_offset_skips_without_config() {
        let rule = MappingRule {
            emits: &[Emit {
                path: "state/temperature",
                transform: Transform::Offset {
                    by: "config/offset",
                    divisor: 1.0,
                    skip_raw: Some(-10000),
                },
            }],
        };
        let store = MemoryStore::with_items([("state/temperature", ItemValue::Number(0.0))]);
        assert!(apply_rule(&rule, &FieldValue::Signed(2500), &store).is_empty());

        let store = MemoryStore::with_items([
            ("state/temperature", ItemValue::Number(0.0)),
            ("config/offset", ItemValue::Number(-50.0)),
        ]);
        assert_eq!(
            apply_rule(&rule, &FieldValue::Signed(2500), &store),
            vec![StateWrite::new("state/temperature", 2450.0)]
        );
        // Sentinel raw value is ignored
        assert!(apply_rule(&rule, &FieldValue::Signed(-10000), &store).is_empty());
    }

    #[test]
    fn test_enum_lookup_fallback_label() {
        let labels = &["excellent", "good", "moderate", "poor", "unhealthy"];
        assert_eq!(lookup_label(labels, 1, true), "excellent");
        assert_eq!(lookup_label(labels, 5, true), "unhealthy");
        assert_eq!(lookup_label(labels, 9, true), "0x09");
        assert_eq!(lookup_label(labels, 0, true), "0x00");
    }

    #[test]
    fn test_sw_version_format() {
        let rule = MappingRule {
            emits: &[Emit {
                path: "attr/swversion",
                transform: Transform::SwVersion,
            }],
        };
        let store = MemoryStore::with_items([("attr/swversion", ItemValue::Text(String::new()))]);
        let writes = apply_rule(&rule, &FieldValue::Unsigned(0x1219), &store);
        assert_eq!(
            writes,
            vec![StateWrite::new("attr/swversion", "0.0.0_0025")]
        );
    }

    fn illuminance_store() -> MemoryStore {
        MemoryStore::with_items([
            ("state/lightlevel", ItemValue::Number(0.0)),
            ("state/dark", ItemValue::Bool(true)),
            ("state/daylight", ItemValue::Bool(false)),
            ("config/tholddark", ItemValue::Number(1000.0)),
            ("config/tholdoffset", ItemValue::Number(500.0)),
        ])
    }

    #[test]
    fn test_dual_derivation_between_thresholds() {
        let store = illuminance_store();
        let mut out = Vec::new();
        light_level_writes("state/lightlevel", 1200.0, false, &store, &mut out);
        assert!(out.contains(&StateWrite::new("state/dark", false)));
        assert!(out.contains(&StateWrite::new("state/daylight", false)));
    }

    #[test]
    fn test_dual_derivation_daylight() {
        let store = illuminance_store();
        let mut out = Vec::new();
        light_level_writes("state/lightlevel", 1600.0, false, &store, &mut out);
        assert!(out.contains(&StateWrite::new("state/daylight", true)));
    }

    #[test]
    fn test_dual_derivation_dark() {
        let store = illuminance_store();
        let mut out = Vec::new();
        light_level_writes("state/lightlevel", 900.0, false, &store, &mut out);
        assert!(out.contains(&StateWrite::new("state/dark", true)));
    }

    #[test]
    fn test_booleans_skipped_without_thresholds() {
        let store = MemoryStore::with_items([
            ("state/lightlevel", ItemValue::Number(0.0)),
            ("state/dark", ItemValue::Bool(false)),
        ]);
        let mut out = Vec::new();
        light_level_writes("state/lightlevel", 1200.0, false, &store, &mut out);
        assert_eq!(out, vec![StateWrite::new("state/lightlevel", 1200.0)]);
    }

    #[test]
    fn test_lux_conversion_round_trip() {
        let store = MemoryStore::with_items([
            ("state/lightlevel", ItemValue::Number(0.0)),
            ("state/lux", ItemValue::Number(0.0)),
        ]);
        let mut out = Vec::new();
        // 100 lux -> level 20001 -> back to 100 lux
        light_level_writes("state/lightlevel", 100.0, true, &store, &mut out);
        assert_eq!(
            out,
            vec![
                StateWrite::new("state/lightlevel", 20001.0),
                StateWrite::new("state/lux", 100.0),
            ]
        );
    }

    #[test]
    fn test_zero_lux_maps_to_level_zero() {
        let store = MemoryStore::with_items([("state/lightlevel", ItemValue::Number(1.0))]);
        let mut out = Vec::new();
        light_level_writes("state/lightlevel", 0.0, true, &store, &mut out);
        assert_eq!(out, vec![StateWrite::new("state/lightlevel", 0.0)]);
    }
}
