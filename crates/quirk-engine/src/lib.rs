//! Vendor quirk decoding engine
//!
//! Turns manufacturer-specific Zigbee attribute reports and commands
//! into normalized semantic state writes. The host gateway hands in
//! one raw payload per call and gets back a list of item writes; all
//! scheduling, persistence and change notification stay on the host
//! side behind the [`ItemStore`] interface.

pub mod engine;
pub mod error;
pub mod model;
pub mod profiles;
pub mod store;
pub mod transform;

pub use engine::{Binding, DeviceProfile, Handler, QuirkEngine, Selector};
pub use error::QuirkError;
pub use model::{Emit, ItemValue, MappingRule, ReportInput, StateWrite, TagRule, Transform};
pub use store::{ItemStore, MemoryStore};
