//! ZCL (Zigbee Cluster Library) payload decoding primitives
//!
//! This crate implements the wire-level half of the vendor quirk
//! engine: a bounds-checked cursor over report payloads, ZCL
//! primitive type decoding, the Xiaomi-style tag/datatype TLV stream,
//! and the fixed-layout record formats used by Philips and Tuya
//! manufacturer-specific payloads.

pub mod cursor;
pub mod primitive;
pub mod record;
pub mod tlv;
pub mod types;

pub use cursor::Cursor;
pub use primitive::decode_value;
pub use record::{
    read_report_header, ColorState, ColorStateMode, Gradient, GradientPoint, KnobAction,
    KnobFrame, ReportHeader,
};
pub use tlv::TlvStream;
pub use types::{Datatype, DecodeError, DecodedField, FieldValue};
