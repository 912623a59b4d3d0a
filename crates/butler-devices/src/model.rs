//! Persisted shape of the device state file.
//!
//! The file is one JSON object keyed by device name. Each record carries its
//! power state under `"状态"` next to the device-specific attributes:
//!
//! ```json
//! { "洗衣机": { "状态": "关闭", "模式": "标准", "剩余时间": 0 } }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Attribute keys as they appear in the state file.
pub mod keys {
    pub const STATE: &str = "状态";
    pub const TEMPERATURE: &str = "温度";
    pub const MODE: &str = "模式";
    pub const FAN_SPEED: &str = "风速";
    pub const BRIGHTNESS: &str = "亮度";
    pub const COLOR_TEMPERATURE: &str = "色温";
    pub const REMAINING_TIME: &str = "剩余时间";
    pub const BATTERY: &str = "电量";
    pub const OPENNESS: &str = "开合度";
    pub const AIR_QUALITY: &str = "空气质量";
    pub const FILTER_LIFE: &str = "滤网寿命";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerState {
    #[serde(rename = "开启")]
    On,
    #[serde(rename = "关闭")]
    Off,
}

impl PowerState {
    pub fn as_str(self) -> &'static str {
        match self {
            PowerState::On => "开启",
            PowerState::Off => "关闭",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for PowerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "开启" => Ok(PowerState::On),
            "关闭" => Ok(PowerState::Off),
            other if other.eq_ignore_ascii_case("on") => Ok(PowerState::On),
            other if other.eq_ignore_ascii_case("off") => Ok(PowerState::Off),
            other => Err(format!("unknown power action '{}', expected on/off", other)),
        }
    }
}

/// Attribute value: integers for levels and percentages, text for enumerated settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Text(String),
}

impl AttrValue {
    /// Integer if `raw` parses as one, text otherwise.
    pub fn parse(raw: &str) -> Self {
        raw.trim().parse::<i64>().map_or_else(|_| AttrValue::Text(raw.to_string()), AttrValue::Int)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            AttrValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Int(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self { AttrValue::Int(v) }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self { AttrValue::Text(v.to_string()) }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self { AttrValue::Text(v) }
}

pub type Attributes = BTreeMap<String, AttrValue>;

/// One device. The attribute keys are fixed by the catalog; control only
/// changes their values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(rename = "状态")]
    pub state: PowerState,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl DeviceRecord {
    pub fn new(state: PowerState, attributes: impl IntoIterator<Item = (&'static str, AttrValue)>) -> Self {
        Self { state, attributes: attributes.into_iter().map(|(k, v)| (k.to_string(), v)).collect() }
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> { self.attributes.get(key) }

    pub fn is_on(&self) -> bool { self.state == PowerState::On }
}

/// Device name -> record.
pub type DeviceState = BTreeMap<String, DeviceRecord>;
