//! JSON-file device store.
//!
//! Every call re-reads the file, mutates the full state and writes it back.
//! There is no in-process cache and no locking: two writers racing on the same
//! file lose one update (last writer wins).

use std::fs;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};

use rand::RngCore;
use tracing::{debug, info, warn};

use butler_core::error::{Error, Result};

use crate::catalog::{default_catalog, DeviceClass};
use crate::model::{Attributes, DeviceState, PowerState};
use crate::policy::PolicyTable;

pub struct DeviceStore {
    path: PathBuf,
    policies: PolicyTable,
}

impl DeviceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self::with_policies(path, PolicyTable::default()) }

    pub fn with_policies(path: impl Into<PathBuf>, policies: PolicyTable) -> Self {
        Self { path: path.into(), policies }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Read the persisted state, surfacing corruption as [`Error::StateCorrupt`].
    ///
    /// A missing file is not an error: the default catalog is written and
    /// returned. A failed bootstrap write is logged and the catalog is still
    /// returned.
    pub fn try_load(&self) -> Result<DeviceState> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| self.corrupt(e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let catalog = default_catalog();
                match self.save(&catalog) {
                    Ok(()) => info!("Created device state file {} with default catalog", self.path.display()),
                    Err(e) => warn!("{}", e),
                }
                Ok(catalog)
            }
            Err(e) => Err(self.corrupt(e)),
        }
    }

    /// Like [`Self::try_load`], but a corrupt or unreadable file falls back to
    /// the default catalog with a warning. The file is left as it is.
    pub fn load(&self) -> DeviceState {
        self.try_load().unwrap_or_else(|e| {
            warn!("{}; falling back to default catalog", e);
            default_catalog()
        })
    }

    /// Persist the full state. Written to a sibling temp file then renamed over
    /// the target, so a failed write leaves the previous file intact.
    pub fn save(&self, state: &DeviceState) -> Result<()> {
        let content = serde_json::to_string_pretty(state).map_err(|e| self.write_error(e))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, content).map_err(|e| self.write_error(e))?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.write_error(e));
        }
        debug!("Saved {} devices to {}", state.len(), self.path.display());
        Ok(())
    }

    /// Switch `name` on or off and apply `updates`.
    ///
    /// Returns `Ok(false)` without writing if the device is unknown. Updates
    /// whose key is not already in the device's record, or whose value is not
    /// legal for the device's class, are dropped.
    pub fn control_device(&self, name: &str, action: PowerState, updates: &Attributes) -> Result<bool> {
        self.control_device_with_rng(name, action, updates, &mut rand::thread_rng())
    }

    pub fn control_device_with_rng<R: RngCore>(
        &self,
        name: &str,
        action: PowerState,
        updates: &Attributes,
        rng: &mut R,
    ) -> Result<bool> {
        let class = DeviceClass::of(name);
        if class.is_none() && !self.path.exists() {
            debug!("Ignoring control for unknown device {}", name);
            return Ok(false);
        }

        let mut state = self.load();
        let Some(record) = state.get_mut(name) else {
            debug!("Ignoring control for unknown device {}", name);
            return Ok(false);
        };

        record.state = action;
        if let Some(policy) = class.and_then(|class| self.policies.get(class)) {
            match action {
                PowerState::On => policy.on_power_on(&mut record.attributes, updates, rng),
                PowerState::Off => policy.on_power_off(&mut record.attributes),
            }
        }

        for (key, value) in updates {
            let Some(slot) = record.attributes.get_mut(key) else {
                debug!("Dropping unknown attribute {} for {}", key, name);
                continue;
            };
            let conforms = match class {
                Some(class) => class.accepts(key, value),
                None => mem::discriminant(&*slot) == mem::discriminant(value),
            };
            if conforms {
                *slot = value.clone();
            } else {
                warn!("Rejecting {} = {} for {}", key, value, name);
            }
        }

        self.save(&state)?;
        info!("{} -> {}", name, action);
        Ok(true)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn corrupt(&self, reason: impl ToString) -> Error {
        Error::StateCorrupt { path: self.path.clone(), reason: reason.to_string() }
    }

    fn write_error(&self, reason: impl ToString) -> Error {
        Error::StateWrite { path: self.path.clone(), reason: reason.to_string() }
    }
}
