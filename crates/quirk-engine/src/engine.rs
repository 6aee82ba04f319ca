//! Decode entry point
//!
//! A device profile is a static list of bindings from
//! (cluster, attribute or command) to a handler kind — a tagged
//! dispatch over "encoding kind" instead of per-device code. The
//! engine selects the first matching binding and runs its handler;
//! unmatched input produces no writes.

use crate::model::{ReportInput, StateWrite, TagRule};
use crate::profiles;
use crate::store::ItemStore;

/// What a binding matches on within its cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Attribute reports / read responses for one attribute
    Attribute(u16),
    /// One cluster-specific command
    Command(u8),
    /// Every cluster-specific command of the cluster
    AnyCommand,
}

/// How a bound payload is decoded and mapped
#[derive(Debug, Clone, Copy)]
pub enum Handler {
    /// Xiaomi 0xFF01/0x00F7 special attribute: TLV blob mapped
    /// through a tag rule table
    XiaomiSpecial { rules: &'static [TagRule] },
    /// Xiaomi 0xFF02 struct attribute: untagged fields mapped by
    /// element index
    XiaomiStruct { rules: &'static [TagRule] },
    /// Philips FC03 extended color state record
    HueColorState,
    /// Philips FC03 gradient blob
    HueGradient,
    /// Tuya TS004F smart-knob command frames
    TuyaKnob,
    /// Standard illuminance measurement report
    Illuminance { from_lux: bool },
}

/// One (cluster, selector) -> handler binding
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub cluster: u16,
    pub selector: Selector,
    pub handler: Handler,
}

impl Binding {
    fn matches(&self, input: &ReportInput) -> bool {
        if self.cluster != input.cluster_id {
            return false;
        }
        match (self.selector, input.command_id) {
            (Selector::Attribute(attr), None) => attr == input.attribute_id,
            (Selector::Command(cmd), Some(incoming)) => cmd == incoming,
            (Selector::AnyCommand, Some(_)) => true,
            _ => false,
        }
    }
}

/// A device's quirk bindings
#[derive(Debug, Clone, Copy)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub bindings: &'static [Binding],
}

/// The quirk decoding engine
///
/// Stateless across invocations: one raw buffer in, a finite list of
/// writes out. Safe to call concurrently as long as the item store's
/// own operations are.
pub struct QuirkEngine {
    profile: DeviceProfile,
}

impl QuirkEngine {
    /// Create an engine for one device profile
    #[must_use]
    pub fn new(profile: DeviceProfile) -> Self {
        Self { profile }
    }

    /// Decode one report/command into state writes
    ///
    /// Never fails for malformed-but-bounded input: decode errors cut
    /// the affected region short and keep the writes already
    /// produced. Unmatched input yields no writes.
    pub fn decode(&self, input: &ReportInput, store: &dyn ItemStore) -> Vec<StateWrite> {
        match self.try_decode(input, store) {
            Ok(writes) => writes,
            Err(err) => {
                tracing::debug!(profile = self.profile.name, %err, "report not decoded");
                Vec::new()
            }
        }
    }

    /// Like [`decode`](Self::decode), but reports why nothing matched
    pub fn try_decode(
        &self,
        input: &ReportInput,
        store: &dyn ItemStore,
    ) -> Result<Vec<StateWrite>, crate::QuirkError> {
        let Some(binding) = self.profile.bindings.iter().find(|b| b.matches(input)) else {
            return Err(crate::QuirkError::UnknownBinding {
                cluster: input.cluster_id,
                attribute: input.attribute_id,
            });
        };

        Ok(match binding.handler {
            Handler::XiaomiSpecial { rules } => {
                profiles::xiaomi::decode_special(rules, &input.payload, store)
            }
            Handler::XiaomiStruct { rules } => {
                profiles::xiaomi::decode_struct(rules, &input.payload, store)
            }
            Handler::HueColorState => profiles::philips::decode_color_state(&input.payload, store),
            Handler::HueGradient => profiles::philips::decode_gradient(&input.payload, store),
            Handler::TuyaKnob => profiles::tuya::decode_knob(
                input.cluster_id,
                input.command_id.unwrap_or(0),
                &input.payload,
                store,
            ),
            Handler::Illuminance { from_lux } => {
                profiles::generic::decode_illuminance(&input.payload, from_lux, store)
            }
        })
    }
}
