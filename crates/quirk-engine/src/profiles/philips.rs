//! Philips Hue FC03 cluster decoding
//!
//! The manufacturer-specific 0xFC03 cluster reports the full light
//! state as one blob (attribute 0x0002) instead of individual ZCL
//! attributes, and gradient strips report their point list in the
//! same packed form the set-gradient command uses.

use crate::engine::{Binding, Handler, Selector};
use crate::model::{ItemValue, StateWrite};
use crate::store::ItemStore;
use zcl_codec::{read_report_header, ColorState, ColorStateMode, Cursor, Gradient};

const HUE_EFFECTS_CLUSTER: u16 = 0xFC03;

/// Wire selector for the gradient payload
const GRADIENT_ATTR: u16 = 0x0150;

/// Bindings of the Hue light profile
pub const LIGHT_BINDINGS: &[Binding] = &[
    Binding {
        cluster: HUE_EFFECTS_CLUSTER,
        selector: Selector::Attribute(0x0002),
        handler: Handler::HueColorState,
    },
    Binding {
        cluster: HUE_EFFECTS_CLUSTER,
        selector: Selector::Attribute(GRADIENT_ATTR),
        handler: Handler::HueGradient,
    },
];

/// Bindings of the Hue motion sensor profile: the Illuminance
/// Measurement cluster reports the log-scaled light level directly
pub const MOTION_BINDINGS: &[Binding] = &[Binding {
    cluster: 0x0400,
    selector: Selector::Attribute(0x0000),
    handler: Handler::Illuminance { from_lux: false },
}];

fn effect_name(code: u16) -> &'static str {
    match code {
        0x8001 => "candle",
        0x8002 => "fireplace",
        _ => "none",
    }
}

fn style_name(code: u8) -> String {
    match code {
        0x00 => "linear".to_string(),
        0x02 => "scattered".to_string(),
        0x04 => "mirrored".to_string(),
        other => format!("0x{other:02x}"),
    }
}

fn push_if(out: &mut Vec<StateWrite>, store: &dyn ItemStore, path: &str, value: ItemValue) {
    if store.read(path).is_some() {
        out.push(StateWrite {
            path: path.to_string(),
            value,
        });
    }
}

/// Decode the extended color state record (FC03 attribute 0x0002)
pub fn decode_color_state(payload: &[u8], store: &dyn ItemStore) -> Vec<StateWrite> {
    let mut cursor = Cursor::new(payload);
    let Ok(header) = read_report_header(&mut cursor) else {
        return Vec::new();
    };
    if header.attr_id != 0x0002 || header.datatype_code != 0x41 {
        return Vec::new();
    }
    let Ok(state) = ColorState::decode(&mut cursor) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    push_if(&mut out, store, "state/on", ItemValue::Bool(state.on));
    push_if(
        &mut out,
        store,
        "state/bri",
        ItemValue::Number(f64::from(state.bri)),
    );

    if let Some(x) = state.x {
        if let Some(mode) = state.mode {
            if mode == ColorStateMode::Ct {
                if let Some(ct) = state.ct {
                    push_if(&mut out, store, "state/ct", ItemValue::Number(f64::from(ct)));
                }
            }
            push_if(&mut out, store, "state/x", ItemValue::Number(f64::from(x)));
            if let Some(y) = state.y {
                push_if(&mut out, store, "state/y", ItemValue::Number(f64::from(y)));
            }
            let colormode = if mode == ColorStateMode::Ct { "ct" } else { "xy" };
            push_if(&mut out, store, "state/colormode", colormode.into());

            let effect = state.effect_code.map_or("none", effect_name);
            push_if(&mut out, store, "state/dynamic_effect", effect.into());
        }
    }

    out
}

/// Decode a gradient blob into one structured `state/gradient` write
pub fn decode_gradient(payload: &[u8], store: &dyn ItemStore) -> Vec<StateWrite> {
    let mut cursor = Cursor::new(payload);
    let Ok(header) = read_report_header(&mut cursor) else {
        return Vec::new();
    };
    if header.datatype_code != 0x41 {
        return Vec::new();
    }
    // The encoder declares the blob length through the point list
    // only (1 + 3*(count+1)); the trailing segments/offset bytes sit
    // past it, so the point-count nibble drives the decode and the
    // length byte is skipped.
    if cursor.take_u8().is_err() {
        return Vec::new();
    }
    let Ok(gradient) = Gradient::decode(&mut cursor) else {
        return Vec::new();
    };

    let points: Vec<serde_json::Value> = gradient
        .points
        .iter()
        .map(|p| serde_json::json!([p.x, p.y]))
        .collect();
    let descriptor = serde_json::json!({
        "points": points,
        "style": style_name(gradient.style_code),
        "segments": gradient.segments,
        "color_adjustment": gradient.color_adjustment,
        "offset": gradient.offset,
        "offset_adjustment": gradient.offset_adjustment,
    });

    let mut out = Vec::new();
    push_if(&mut out, store, "state/gradient", ItemValue::Struct(descriptor));
    push_if(&mut out, store, "state/colormode", "gradient".into());
    out
}
