//! Fixed-layout, selector-driven record formats
//!
//! Unlike the TLV stream these payloads have no per-field tags: a
//! leading mode/selector decides which fields are present and at what
//! offsets. Covered here: the shared attribute report header, the
//! Philips FC03 extended color state, the Philips gradient blob and
//! the Tuya smart-knob command frames.

use crate::cursor::Cursor;
use crate::types::DecodeError;

/// Leading header of an attribute report or read-attributes response
///
/// The original scripts sniff the third byte: zero means a read
/// response (success status, datatype follows), anything else is an
/// attribute report where that byte already is the datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportHeader {
    pub attr_id: u16,
    pub datatype_code: u8,
    /// True when the buffer carried a read-attributes status byte
    pub from_read_response: bool,
}

/// Parse the report header, leaving the cursor at the value bytes
pub fn read_report_header(cursor: &mut Cursor<'_>) -> Result<ReportHeader, DecodeError> {
    let attr_id = cursor.take_u16_le()?;
    let status = cursor.take_u8()?;
    if status == 0 {
        let datatype_code = cursor.take_u8()?;
        Ok(ReportHeader {
            attr_id,
            datatype_code,
            from_read_response: true,
        })
    } else {
        Ok(ReportHeader {
            attr_id,
            datatype_code: status,
            from_read_response: false,
        })
    }
}

/// Which variant of the extended color state record was present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorStateMode {
    /// Mode word 0x000B: xy color
    Xy,
    /// Mode word 0x000F: color temperature plus xy
    Ct,
    /// Mode word 0x00AB: xy color with a running dynamic effect
    XyEffect,
}

/// Philips FC03 attribute 0x0002 extended color state
///
/// Optional fields stay `None` when the mode/length combination does
/// not carry them or the record ends short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorState {
    pub on: bool,
    pub bri: u8,
    pub mode: Option<ColorStateMode>,
    pub x: Option<u16>,
    pub y: Option<u16>,
    pub ct: Option<u16>,
    pub effect_code: Option<u16>,
}

impl ColorState {
    /// Decode from the length-prefixed blob value
    pub fn decode(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        let len = usize::from(cursor.take_u8()?);
        let mut sub = cursor.sub_limit(len)?;

        let mode_word = sub.take_u16_le()?;
        let on = sub.take_u8()? != 0;
        let bri = sub.take_u8()?;

        let mut state = Self {
            on,
            bri,
            mode: None,
            x: None,
            y: None,
            ct: None,
            effect_code: None,
        };

        match (mode_word, len) {
            (0x000B, 8) if sub.remaining() >= 4 => {
                state.x = Some(sub.take_u16_le()?);
                state.y = Some(sub.take_u16_le()?);
                state.mode = Some(ColorStateMode::Xy);
            }
            (0x000F, 10) if sub.remaining() >= 6 => {
                state.ct = Some(sub.take_u16_le()?);
                state.x = Some(sub.take_u16_le()?);
                state.y = Some(sub.take_u16_le()?);
                state.mode = Some(ColorStateMode::Ct);
            }
            (0x00AB, 10) if sub.remaining() >= 6 => {
                state.x = Some(sub.take_u16_le()?);
                state.y = Some(sub.take_u16_le()?);
                state.effect_code = Some(sub.take_u16_le()?);
                state.mode = Some(ColorStateMode::XyEffect);
            }
            _ => {
                tracing::debug!(mode_word, len, "unrecognized color state mode");
            }
        }

        Ok(state)
    }
}

// CIE xy chromaticity bounds used by the 12-bit packed encoding,
// scaled by 10^4
const MAX_X_SCALED: u32 = 7347;
const MAX_Y_SCALED: u32 = 8431;

/// One gradient color point in CIE xy space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientPoint {
    pub x: f64,
    pub y: f64,
}

impl GradientPoint {
    /// Unpack a 3-byte `(x:12, y:12)` pair and rescale to CIE xy
    ///
    /// The rescale `ceil(raw * max / 0.4095) / 10000` is an exact
    /// numeric contract with the device. Since `0.4095 = 4095/10000`,
    /// the ceiling reduces to `ceil(raw * max_scaled / 4095)` and is
    /// computed in integer arithmetic; `max / 0.4095` has no exact
    /// float representation and would overshoot at full scale.
    #[must_use]
    pub fn from_packed(b: [u8; 3]) -> Self {
        let raw_x = u32::from(b[0]) | (u32::from(b[1] & 0x0F) << 8);
        let raw_y = u32::from(b[1] >> 4) | (u32::from(b[2]) << 4);
        Self {
            x: f64::from((raw_x * MAX_X_SCALED).div_ceil(4095)) / 10000.0,
            y: f64::from((raw_y * MAX_Y_SCALED).div_ceil(4095)) / 10000.0,
        }
    }
}

/// Philips gradient payload
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub points: Vec<GradientPoint>,
    pub style_code: u8,
    pub segments: u8,
    pub color_adjustment: u8,
    pub offset: u8,
    pub offset_adjustment: u8,
}

impl Gradient {
    /// Decode a gradient blob
    ///
    /// Layout: header byte (point count in the high nibble), style
    /// byte, two reserved bytes, `count` packed 3-byte points, then
    /// the segments/color-adjustment and offset/offset-adjustment
    /// bytes. A short buffer ends the point list cleanly and leaves
    /// the trailing scalars at zero.
    pub fn decode(cursor: &mut Cursor<'_>) -> Result<Self, DecodeError> {
        let count = usize::from(cursor.take_u8()? >> 4);
        let style_code = cursor.take_u8()?;
        cursor.skip(2)?;

        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            if cursor.remaining() < 3 {
                break;
            }
            let b = cursor.take(3)?;
            points.push(GradientPoint::from_packed([b[0], b[1], b[2]]));
        }

        let (mut segments, mut color_adjustment) = (0, 0);
        let (mut offset, mut offset_adjustment) = (0, 0);
        if let Ok(b) = cursor.take_u8() {
            segments = b >> 3;
            color_adjustment = b & 0x07;
        }
        if let Ok(b) = cursor.take_u8() {
            offset = b >> 3;
            offset_adjustment = b & 0x07;
        }

        Ok(Self {
            points,
            style_code,
            segments,
            color_adjustment,
            offset,
            offset_adjustment,
        })
    }
}

/// Decoded Tuya TS004F smart-knob gesture
///
/// Command-mode frames (On/Off TOGGLE, Level Control Step) are
/// distinct from the event-mode gestures the 0xFC/0xFD commands
/// carry; they map to different button events downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobAction {
    /// On/Off TOGGLE, command mode (no payload)
    Toggle,
    SingleClick,
    DoubleClick,
    LongRelease,
    RotateClockwise,
    RotateCounterClockwise,
    /// Level Control Step up, command mode
    StepUp {
        steps: u8,
        transition_time: Option<u16>,
    },
    /// Level Control Step down, command mode
    StepDown {
        steps: u8,
        transition_time: Option<u16>,
    },
}

/// Tuya smart-knob command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnobFrame {
    pub action: KnobAction,
}

impl KnobFrame {
    /// Decode a knob command payload for the given cluster/command
    ///
    /// Payload bytes are read only for the commands that carry them;
    /// the TOGGLE frame has none. Returns `Ok(None)` for combinations
    /// that do not map to a gesture (the script ignores them the same
    /// way).
    pub fn decode(
        cluster_id: u16,
        command_id: u8,
        cursor: &mut Cursor<'_>,
    ) -> Result<Option<Self>, DecodeError> {
        let action = match (cluster_id, command_id) {
            (0x0006, 0x02) => Some(KnobAction::Toggle),
            (0x0006, 0xFD) => match cursor.take_u8()? {
                0 => Some(KnobAction::SingleClick),
                1 => Some(KnobAction::DoubleClick),
                2 => Some(KnobAction::LongRelease),
                _ => None,
            },
            (0x0006, 0xFC) => match cursor.take_u8()? {
                0 => Some(KnobAction::RotateClockwise),
                1 => Some(KnobAction::RotateCounterClockwise),
                _ => None,
            },
            (0x0008, 0x02) => {
                let step_mode = cursor.take_u8()?;
                let steps = cursor.take_u8()?;
                // Transition time in 1/10 s; tolerate its absence
                let transition_time = cursor.take_u16_le().ok();
                match step_mode {
                    0 => Some(KnobAction::StepUp {
                        steps,
                        transition_time,
                    }),
                    1 => Some(KnobAction::StepDown {
                        steps,
                        transition_time,
                    }),
                    _ => None,
                }
            }
            _ => None,
        };

        Ok(action.map(|action| Self { action }))
    }
}
