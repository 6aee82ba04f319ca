//! Xiaomi/Aqara "special" attribute decoding
//!
//! Aqara devices report most of their state through manufacturer
//! attributes on the Basic cluster: 0xFF01 (character string blob)
//! and 0x00F7 (octet string blob) carry a TLV stream, 0xFF02 a
//! struct of untagged, index-addressed fields. One TLV tag maps to
//! one or more semantic items; unknown tags are skipped.

use crate::engine::{Binding, Handler, Selector};
use crate::model::{resolve, Emit, MappingRule, StateWrite, TagRule, Transform};
use crate::store::ItemStore;
use crate::transform::apply_rule;
use zcl_codec::{decode_value, read_report_header, Cursor, Datatype, TlvStream};

const AIR_QUALITY: &[&str] = &["excellent", "good", "moderate", "poor", "unhealthy"];
const DEVICE_MODE: &[&str] = &["undirected", "leftright"];
const TRIGGER_DISTANCE: &[&str] = &["far", "medium", "near"];

const BATTERY_SCALE: Transform = Transform::Scale {
    min: 2700.0,
    max: 3000.0,
    out_min: 0.0,
    out_max: 100.0,
};

/// Tag table for the 0xFF01/0x00F7 TLV stream
///
/// Tags follow the source convention: high byte is the vendor tag,
/// low byte the ZCL datatype.
pub const SPECIAL_RULES: &[TagRule] = &[
    // battery voltage (in 0.001 V)
    TagRule {
        tag: 0x0121,
        rule: MappingRule {
            emits: &[Emit {
                path: "config/battery",
                transform: BATTERY_SCALE,
            }],
        },
    },
    // device temperature (in °C)
    TagRule {
        tag: 0x0328,
        rule: MappingRule {
            emits: &[Emit {
                path: "config/temperature",
                transform: Transform::ScaleBy { factor: 100.0 },
            }],
        },
    },
    // firmware
    TagRule {
        tag: 0x0821,
        rule: MappingRule {
            emits: &[Emit {
                path: "attr/swversion",
                transform: Transform::SwVersion,
            }],
        },
    },
    // lightlevel (in lux)
    TagRule {
        tag: 0x0B20,
        rule: MappingRule {
            emits: &[Emit {
                path: "state/lightlevel",
                transform: Transform::LightLevel { from_lux: true },
            }],
        },
    },
    // firmware
    TagRule {
        tag: 0x0D23,
        rule: MappingRule {
            emits: &[Emit {
                path: "attr/swversion",
                transform: Transform::SwVersion,
            }],
        },
    },
    // on/off
    TagRule {
        tag: 0x6410,
        rule: MappingRule {
            emits: &[
                Emit {
                    path: "state/open",
                    transform: Transform::Flag,
                },
                Emit {
                    path: "state/water",
                    transform: Transform::Flag,
                },
            ],
        },
    },
    // lift (in % closed)
    TagRule {
        tag: 0x6420,
        rule: MappingRule {
            emits: &[Emit {
                path: "state/lift",
                transform: Transform::Passthrough,
            }],
        },
    },
    // temperature (in 0.01 °C), -10000 marks an invalid reading
    TagRule {
        tag: 0x6429,
        rule: MappingRule {
            emits: &[Emit {
                path: "state/temperature",
                transform: Transform::Offset {
                    by: "config/offset",
                    divisor: 1.0,
                    skip_raw: Some(-10000),
                },
            }],
        },
    },
    // battery level (in %)
    TagRule {
        tag: 0x6520,
        rule: MappingRule {
            emits: &[Emit {
                path: "state/battery",
                transform: Transform::Passthrough,
            }],
        },
    },
    // humidity (in 0.01 %)
    TagRule {
        tag: 0x6521,
        rule: MappingRule {
            emits: &[Emit {
                path: "state/humidity",
                transform: Transform::Offset {
                    by: "config/offset",
                    divisor: 1.0,
                    skip_raw: None,
                },
            }],
        },
    },
    // motion sensitivity, reported one above the configured value
    TagRule {
        tag: 0x6620,
        rule: MappingRule {
            emits: &[Emit {
                path: "config/sensitivity",
                transform: Transform::Bias { by: -1.0 },
            }],
        },
    },
    // tvoc level (in ppb)
    TagRule {
        tag: 0x6621,
        rule: MappingRule {
            emits: &[Emit {
                path: "state/airqualityppb",
                transform: Transform::Passthrough,
            }],
        },
    },
    // air pressure (in Pa)
    TagRule {
        tag: 0x662B,
        rule: MappingRule {
            emits: &[Emit {
                path: "state/pressure",
                transform: Transform::Offset {
                    by: "config/offset",
                    divisor: 100.0,
                    skip_raw: None,
                },
            }],
        },
    },
    // air quality (as 6 - #stars) / device mode
    TagRule {
        tag: 0x6720,
        rule: MappingRule {
            emits: &[
                Emit {
                    path: "state/airquality",
                    transform: Transform::EnumLookup {
                        labels: AIR_QUALITY,
                        one_based: true,
                    },
                },
                Emit {
                    path: "config/devicemode",
                    transform: Transform::EnumLookup {
                        labels: DEVICE_MODE,
                        one_based: false,
                    },
                },
            ],
        },
    },
    // battery charging / trigger distance
    TagRule {
        tag: 0x6920,
        rule: MappingRule {
            emits: &[
                Emit {
                    path: "state/charging",
                    transform: Transform::Flag,
                },
                Emit {
                    path: "config/triggerdistance",
                    transform: Transform::EnumLookup {
                        labels: TRIGGER_DISTANCE,
                        one_based: false,
                    },
                },
            ],
        },
    },
];

/// Element-index table for the 0xFF02 struct variant
pub const STRUCT_RULES: &[TagRule] = &[
    TagRule {
        tag: 1,
        rule: MappingRule {
            emits: &[Emit {
                path: "state/open",
                transform: Transform::Flag,
            }],
        },
    },
    TagRule {
        tag: 2,
        rule: MappingRule {
            emits: &[Emit {
                path: "config/battery",
                transform: BATTERY_SCALE,
            }],
        },
    },
];

/// Bindings of the Xiaomi sensor profile
pub const BINDINGS: &[Binding] = &[
    Binding {
        cluster: 0x0000,
        selector: Selector::Attribute(0xFF01),
        handler: Handler::XiaomiSpecial {
            rules: SPECIAL_RULES,
        },
    },
    Binding {
        cluster: 0x0000,
        selector: Selector::Attribute(0x00F7),
        handler: Handler::XiaomiSpecial {
            rules: SPECIAL_RULES,
        },
    },
    Binding {
        cluster: 0x0000,
        selector: Selector::Attribute(0x01FF),
        handler: Handler::XiaomiSpecial {
            rules: SPECIAL_RULES,
        },
    },
    Binding {
        cluster: 0x0000,
        selector: Selector::Attribute(0xFF02),
        handler: Handler::XiaomiStruct {
            rules: STRUCT_RULES,
        },
    },
];

/// Decode a 0xFF01/0x00F7 special attribute blob
pub fn decode_special(
    rules: &'static [TagRule],
    payload: &[u8],
    store: &dyn ItemStore,
) -> Vec<StateWrite> {
    let mut cursor = Cursor::new(payload);
    let Ok(header) = read_report_header(&mut cursor) else {
        return Vec::new();
    };
    if !matches!(header.attr_id, 0xFF01 | 0x01FF | 0x00F7) {
        tracing::debug!(attr = header.attr_id, "not a Xiaomi special attribute");
        return Vec::new();
    }
    // Blob is an octet or character string
    if !matches!(header.datatype_code, 0x41 | 0x42) {
        return Vec::new();
    }
    let Ok(len) = cursor.take_u8() else {
        return Vec::new();
    };
    let Ok(region) = cursor.sub_limit(usize::from(len)) else {
        return Vec::new();
    };

    let mut writes = Vec::new();
    for field in TlvStream::new(region) {
        let Some(tag) = field.tag else { continue };
        match resolve(rules, tag) {
            Some(rule) => writes.extend(apply_rule(rule, &field.value, store)),
            None => tracing::debug!(tag, "unknown Xiaomi tag"),
        }
    }
    writes
}

/// Decode the 0xFF02 struct attribute
///
/// Fields carry no tags; a leading element count is followed by
/// (datatype, value) pairs mapped by their 1-based index.
pub fn decode_struct(
    rules: &'static [TagRule],
    payload: &[u8],
    store: &dyn ItemStore,
) -> Vec<StateWrite> {
    let mut cursor = Cursor::new(payload);
    let Ok(header) = read_report_header(&mut cursor) else {
        return Vec::new();
    };
    // ZCL struct datatype
    if header.attr_id != 0xFF02 || header.datatype_code != 0x4C {
        return Vec::new();
    }
    let Ok(count) = cursor.take_u16_le() else {
        return Vec::new();
    };

    let mut writes = Vec::new();
    for index in 1..=count {
        let Ok(type_code) = cursor.take_u8() else {
            break;
        };
        let datatype = Datatype::from_code(type_code);
        let Ok(field) = decode_value(&mut cursor, datatype) else {
            break;
        };
        if let Some(rule) = resolve(rules, index) {
            writes.extend(apply_rule(rule, &field.value, store));
        }
    }
    writes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemValue;
    use crate::store::MemoryStore;

    fn weather_store() -> MemoryStore {
        MemoryStore::with_items([
            ("config/battery", ItemValue::Number(0.0)),
            ("state/temperature", ItemValue::Number(0.0)),
            ("state/humidity", ItemValue::Number(0.0)),
            ("state/pressure", ItemValue::Number(0.0)),
            ("config/offset", ItemValue::Number(0.0)),
        ])
    }

    #[test]
    fn test_weather_report() {
        // 0xFF01 blob: battery 2985 mV, temperature 21.69 °C,
        // humidity 48.23 %, pressure 92484 Pa
        let payload = vec![
            0x01, 0xFF, 0x41, 0x12, //
            0x01, 0x21, 0xA9, 0x0B, // 0x0121 uint16 2985
            0x64, 0x29, 0x79, 0x08, // 0x6429 int16 2169
            0x65, 0x21, 0xD7, 0x12, // 0x6521 uint16 4823
            0x66, 0x2B, 0x44, 0x69, 0x01, 0x00, // 0x662B int32 92484
        ];
        let store = weather_store();
        let writes = decode_special(SPECIAL_RULES, &payload, &store);
        assert_eq!(
            writes,
            vec![
                StateWrite::new("config/battery", 95.0),
                StateWrite::new("state/temperature", 2169.0),
                StateWrite::new("state/humidity", 4823.0),
                StateWrite::new("state/pressure", 925.0),
            ]
        );
    }

    #[test]
    fn test_unknown_tags_skipped() {
        // RSSI 0x0521 and parent NWK 0x0A21 have no rule
        let payload = vec![
            0x01, 0xFF, 0x41, 0x0C, //
            0x05, 0x21, 0x10, 0x00, //
            0x0A, 0x21, 0x34, 0x12, //
            0x01, 0x21, 0xF0, 0x0A, // battery 2800
        ];
        let store = weather_store();
        let writes = decode_special(SPECIAL_RULES, &payload, &store);
        assert_eq!(writes, vec![StateWrite::new("config/battery", 33.0)]);
    }

    #[test]
    fn test_declared_length_bounds_region() {
        // Length byte says 4: only the battery field is inside, the
        // temperature field past it must be ignored
        let payload = vec![
            0x01, 0xFF, 0x41, 0x04, //
            0x01, 0x21, 0xF0, 0x0A, //
            0x64, 0x29, 0x79, 0x08, //
        ];
        let store = weather_store();
        let writes = decode_special(SPECIAL_RULES, &payload, &store);
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].path, "config/battery");
    }

    #[test]
    fn test_truncated_region_keeps_earlier_writes() {
        // Region declares 7 bytes; the second field wants a uint16
        // but only one byte remains
        let payload = vec![
            0x01, 0xFF, 0x41, 0x07, //
            0x65, 0x20, 0x5F, // 0x6520 uint8 95
            0x01, 0x21, 0xF0, // truncated battery field
        ];
        let store = MemoryStore::with_items([("state/battery", ItemValue::Number(0.0))]);
        let writes = decode_special(SPECIAL_RULES, &payload, &store);
        assert_eq!(writes, vec![StateWrite::new("state/battery", 95.0)]);
    }

    #[test]
    fn test_wrong_attribute_rejected() {
        let payload = vec![0x05, 0x00, 0x42, 0x03, b'f', b'o', b'o'];
        let store = weather_store();
        assert!(decode_special(SPECIAL_RULES, &payload, &store).is_empty());
    }

    #[test]
    fn test_sensitivity_bias() {
        let payload = vec![
            0x01, 0xFF, 0x41, 0x03, //
            0x66, 0x20, 0x03, // sensitivity reported as 3
        ];
        let store = MemoryStore::with_items([("config/sensitivity", ItemValue::Number(0.0))]);
        let writes = decode_special(SPECIAL_RULES, &payload, &store);
        assert_eq!(writes, vec![StateWrite::new("config/sensitivity", 2.0)]);
    }

    #[test]
    fn test_air_quality_enum() {
        let payload = vec![
            0x01, 0xFF, 0x41, 0x03, //
            0x67, 0x20, 0x02, //
        ];
        let store = MemoryStore::with_items([("state/airquality", ItemValue::Text(String::new()))]);
        let writes = decode_special(SPECIAL_RULES, &payload, &store);
        assert_eq!(writes, vec![StateWrite::new("state/airquality", "good")]);
    }

    #[test]
    fn test_struct_variant_battery() {
        // 0xFF02 struct: bool on/off, uint16 battery voltage
        let payload = vec![
            0x02, 0xFF, 0x4C, 0x02, 0x00, // attr, struct type, 2 elements
            0x10, 0x01, // element 1: bool true
            0x21, 0xA9, 0x0B, // element 2: uint16 2985
        ];
        let store = MemoryStore::with_items([
            ("state/open", ItemValue::Bool(false)),
            ("config/battery", ItemValue::Number(0.0)),
        ]);
        let writes = decode_struct(STRUCT_RULES, &payload, &store);
        assert_eq!(
            writes,
            vec![
                StateWrite::new("state/open", true),
                StateWrite::new("config/battery", 95.0),
            ]
        );
    }
}
