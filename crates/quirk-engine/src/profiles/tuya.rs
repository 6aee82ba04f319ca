//! Tuya TS004F smart knob decoding
//!
//! The knob reports presses and rotation as cluster-specific commands
//! on the On/Off and Level Control clusters. In command mode a turn
//! arrives as a Level Control Step whose size encodes the relative
//! rotation angle; in event mode the 0xFC/0xFD commands carry the
//! gesture directly.

use crate::engine::{Binding, Handler, Selector};
use crate::model::StateWrite;
use crate::store::ItemStore;
use zcl_codec::{Cursor, KnobAction, KnobFrame};

/// Bindings of the smart-knob profile
pub const BINDINGS: &[Binding] = &[
    Binding {
        cluster: 0x0006,
        selector: Selector::AnyCommand,
        handler: Handler::TuyaKnob,
    },
    Binding {
        cluster: 0x0008,
        selector: Selector::Command(0x02),
        handler: Handler::TuyaKnob,
    },
];

/// Button event codes shared with the REST API: 1xxx for command
/// mode, 3xxx for event mode
mod button_event {
    pub const TOGGLE: f64 = 1002.0;
    pub const STEP_CW: f64 = 1030.0;
    pub const STEP_CCW: f64 = 1031.0;
    pub const SHORT_RELEASE: f64 = 3002.0;
    pub const LONG_RELEASE: f64 = 3003.0;
    pub const DOUBLE_PRESS: f64 = 3004.0;
    pub const ROTATE_CW: f64 = 3030.0;
    pub const ROTATE_CCW: f64 = 3031.0;
}

/// Degrees of knob rotation per step above the first
const DEGREES_PER_STEP: f64 = 1.5;

fn step_angle(steps: u8) -> f64 {
    (f64::from(steps) - 1.0) * DEGREES_PER_STEP
}

/// Decode one knob command frame
pub fn decode_knob(
    cluster_id: u16,
    command_id: u8,
    payload: &[u8],
    store: &dyn ItemStore,
) -> Vec<StateWrite> {
    let mut cursor = Cursor::new(payload);
    let Ok(Some(frame)) = KnobFrame::decode(cluster_id, command_id, &mut cursor) else {
        return Vec::new();
    };

    let (event, rotation) = match frame.action {
        KnobAction::Toggle => (button_event::TOGGLE, None),
        KnobAction::SingleClick => (button_event::SHORT_RELEASE, None),
        KnobAction::DoubleClick => (button_event::DOUBLE_PRESS, None),
        KnobAction::LongRelease => (button_event::LONG_RELEASE, None),
        KnobAction::RotateClockwise => (button_event::ROTATE_CW, None),
        KnobAction::RotateCounterClockwise => (button_event::ROTATE_CCW, None),
        KnobAction::StepUp {
            steps,
            transition_time,
        } => (
            button_event::STEP_CW,
            Some((step_angle(steps), transition_time)),
        ),
        KnobAction::StepDown {
            steps,
            transition_time,
        } => (
            button_event::STEP_CCW,
            Some((-step_angle(steps), transition_time)),
        ),
    };

    let mut out = Vec::new();
    if store.read("state/buttonevent").is_some() {
        out.push(StateWrite::new("state/buttonevent", event));
    }

    if let Some((angle, transition_time)) = rotation {
        // Relative signed angle of this turn, not an accumulated one
        if store.read("state/angle").is_some() {
            out.push(StateWrite::new("state/angle", angle));
        }
        if let Some(duration) = transition_time {
            if store.read("state/eventduration").is_some() {
                out.push(StateWrite::new("state/eventduration", f64::from(duration)));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemValue;
    use crate::store::MemoryStore;

    fn knob_store() -> MemoryStore {
        MemoryStore::with_items([
            ("state/buttonevent", ItemValue::Number(0.0)),
            ("state/angle", ItemValue::Number(0.0)),
            ("state/eventduration", ItemValue::Number(0.0)),
        ])
    }

    #[test]
    fn test_toggle_with_empty_payload() {
        // Command-mode single click: TOGGLE carries no payload bytes
        let store = knob_store();
        let writes = decode_knob(0x0006, 0x02, &[], &store);
        assert_eq!(writes, vec![StateWrite::new("state/buttonevent", 1002.0)]);
    }

    #[test]
    fn test_single_click_event_mode() {
        let store = knob_store();
        let writes = decode_knob(0x0006, 0xFD, &[0x00], &store);
        assert_eq!(writes, vec![StateWrite::new("state/buttonevent", 3002.0)]);
    }

    #[test]
    fn test_double_click_event_mode() {
        let store = knob_store();
        let writes = decode_knob(0x0006, 0xFD, &[0x01], &store);
        assert_eq!(writes, vec![StateWrite::new("state/buttonevent", 3004.0)]);
    }

    #[test]
    fn test_long_release_event_mode() {
        let store = knob_store();
        let writes = decode_knob(0x0006, 0xFD, &[0x02], &store);
        assert_eq!(writes, vec![StateWrite::new("state/buttonevent", 3003.0)]);
    }

    #[test]
    fn test_rotate_event_mode() {
        let store = knob_store();
        let writes = decode_knob(0x0006, 0xFC, &[0x00], &store);
        assert_eq!(writes, vec![StateWrite::new("state/buttonevent", 3030.0)]);
        let writes = decode_knob(0x0006, 0xFC, &[0x01], &store);
        assert_eq!(writes, vec![StateWrite::new("state/buttonevent", 3031.0)]);
    }

    #[test]
    fn test_step_writes_relative_angle_and_duration() {
        // 13 steps -> (13 - 1) * 1.5 = 18 degrees, transition 10
        let store = knob_store();
        let writes = decode_knob(0x0008, 0x02, &[0x00, 13, 0x0A, 0x00], &store);
        assert_eq!(
            writes,
            vec![
                StateWrite::new("state/buttonevent", 1030.0),
                StateWrite::new("state/angle", 18.0),
                StateWrite::new("state/eventduration", 10.0),
            ]
        );
    }

    #[test]
    fn test_step_down_angle_is_negative() {
        let store = knob_store();
        let writes = decode_knob(0x0008, 0x02, &[0x01, 13, 0x0A, 0x00], &store);
        assert_eq!(
            writes,
            vec![
                StateWrite::new("state/buttonevent", 1031.0),
                StateWrite::new("state/angle", -18.0),
                StateWrite::new("state/eventduration", 10.0),
            ]
        );
    }

    #[test]
    fn test_step_without_transition_time() {
        let store = knob_store();
        let writes = decode_knob(0x0008, 0x02, &[0x00, 13], &store);
        assert_eq!(
            writes,
            vec![
                StateWrite::new("state/buttonevent", 1030.0),
                StateWrite::new("state/angle", 18.0),
            ]
        );
    }

    #[test]
    fn test_unknown_command_ignored() {
        let store = knob_store();
        assert!(decode_knob(0x0006, 0x07, &[0x00], &store).is_empty());
    }
}
