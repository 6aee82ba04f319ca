//! Generic Illuminance Measurement cluster handling
//!
//! Standard ZCL devices report measured lux on cluster 0x0400; the
//! semantic light level is log-scaled from it. Philips sensors report
//! the already-scaled level on the same attribute, which is why the
//! handler is parameterized on `from_lux`.

use crate::engine::{Binding, Handler, Selector};
use crate::model::StateWrite;
use crate::store::ItemStore;
use crate::transform::light_level_writes;
use zcl_codec::{decode_value, read_report_header, Cursor, Datatype};

/// Bindings of the generic illuminance profile
pub const BINDINGS: &[Binding] = &[Binding {
    cluster: 0x0400,
    selector: Selector::Attribute(0x0000),
    handler: Handler::Illuminance { from_lux: true },
}];

/// Decode a measured-value report and derive the light level family
pub fn decode_illuminance(payload: &[u8], from_lux: bool, store: &dyn ItemStore) -> Vec<StateWrite> {
    let mut cursor = Cursor::new(payload);
    let Ok(header) = read_report_header(&mut cursor) else {
        return Vec::new();
    };
    let datatype = Datatype::from_code(header.datatype_code);
    let Ok(field) = decode_value(&mut cursor, datatype) else {
        return Vec::new();
    };
    let Some(value) = field.value.as_f64() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    light_level_writes("state/lightlevel", value, from_lux, store, &mut out);
    out
}
