use std::collections::HashMap;

use rand::{Rng, RngCore};
use tracing::debug;

use crate::catalog::{DeviceClass, WashMode};
use crate::model::{keys, AttrValue, Attributes};

/// Side effects a device class attaches to its power transitions.
///
/// Policies only write keys the record already has.
pub trait TransitionPolicy: Send + Sync {
    fn on_power_on(&self, _attributes: &mut Attributes, _updates: &Attributes, _rng: &mut dyn RngCore) {}

    fn on_power_off(&self, _attributes: &mut Attributes) {}
}

/// Starting a wash with a known programme picks a simulated remaining time;
/// switching off clears it.
#[derive(Debug, Clone, Copy)]
pub struct LaundryPolicy {
    pub min_minutes: i64,
    pub max_minutes: i64,
}

impl Default for LaundryPolicy {
    fn default() -> Self { Self { min_minutes: 30, max_minutes: 90 } }
}

impl TransitionPolicy for LaundryPolicy {
    fn on_power_on(&self, attributes: &mut Attributes, updates: &Attributes, rng: &mut dyn RngCore) {
        let Some(requested) = updates.get(keys::MODE) else { return };
        let Some(mode) = requested.as_text().and_then(|s| s.parse::<WashMode>().ok()) else {
            debug!("Ignoring unknown wash mode {}", requested);
            return;
        };
        if let Some(slot) = attributes.get_mut(keys::MODE) { *slot = mode.into(); }
        if let Some(slot) = attributes.get_mut(keys::REMAINING_TIME) {
            *slot = AttrValue::Int(rng.gen_range(self.min_minutes..=self.max_minutes));
        }
    }

    fn on_power_off(&self, attributes: &mut Attributes) {
        if let Some(slot) = attributes.get_mut(keys::REMAINING_TIME) { *slot = AttrValue::Int(0); }
    }
}

pub struct PolicyTable {
    policies: HashMap<DeviceClass, Box<dyn TransitionPolicy>>,
}

impl PolicyTable {
    /// A table with no policies: transitions only flip the power state.
    pub fn empty() -> Self { Self { policies: HashMap::new() } }

    /// Adds or replaces the policy for `class`.
    pub fn register(&mut self, class: DeviceClass, policy: impl TransitionPolicy + 'static) -> &mut Self {
        self.policies.insert(class, Box::new(policy));
        self
    }

    pub fn get(&self, class: DeviceClass) -> Option<&dyn TransitionPolicy> { self.policies.get(&class).map(|p| &**p) }
}

impl Default for PolicyTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register(DeviceClass::Laundry, LaundryPolicy::default());
        table
    }
}
