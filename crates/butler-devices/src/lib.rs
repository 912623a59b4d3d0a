//! Device state store: a JSON file of device records plus the control verb
//! that mutates it.

pub mod catalog;
pub mod display;
pub mod model;
pub mod policy;
pub mod store;

pub use catalog::{default_catalog, DeviceClass};
pub use display::{describe_device, format_attribute};
pub use model::{keys, AttrValue, Attributes, DeviceRecord, DeviceState, PowerState};
pub use policy::{LaundryPolicy, PolicyTable, TransitionPolicy};
pub use store::DeviceStore;
