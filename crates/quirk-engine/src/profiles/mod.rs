//! Vendor quirk profiles
//!
//! Each module holds the handler logic and static mapping tables for
//! one vendor's manufacturer-specific encodings. The ready-made
//! profiles below bundle them into the binding lists a host selects
//! per device.

pub mod generic;
pub mod philips;
pub mod tuya;
pub mod xiaomi;

use crate::engine::DeviceProfile;

/// Xiaomi/Aqara sensor: Basic-cluster special attributes
#[must_use]
pub fn xiaomi_sensor() -> DeviceProfile {
    DeviceProfile {
        name: "xiaomi-sensor",
        bindings: xiaomi::BINDINGS,
    }
}

/// Philips Hue light: FC03 extended color state and gradient
#[must_use]
pub fn hue_light() -> DeviceProfile {
    DeviceProfile {
        name: "hue-light",
        bindings: philips::LIGHT_BINDINGS,
    }
}

/// Philips Hue motion sensor: illuminance reported as light level
#[must_use]
pub fn hue_motion_sensor() -> DeviceProfile {
    DeviceProfile {
        name: "hue-motion-sensor",
        bindings: philips::MOTION_BINDINGS,
    }
}

/// Tuya TS004F smart knob
#[must_use]
pub fn tuya_knob() -> DeviceProfile {
    DeviceProfile {
        name: "tuya-knob",
        bindings: tuya::BINDINGS,
    }
}

/// Plain Illuminance Measurement cluster device (reports lux)
#[must_use]
pub fn generic_illuminance() -> DeviceProfile {
    DeviceProfile {
        name: "generic-illuminance",
        bindings: generic::BINDINGS,
    }
}
