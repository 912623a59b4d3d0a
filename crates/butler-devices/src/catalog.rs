//! Built-in devices, their classes and the closed value sets of their
//! enumerated attributes.

use std::fmt;
use std::str::FromStr;

use crate::model::{keys, AttrValue, DeviceRecord, DeviceState, PowerState};

pub const AIR_CONDITIONER: &str = "空调";
pub const LIVING_ROOM_LIGHT: &str = "客厅灯";
pub const WASHING_MACHINE: &str = "洗衣机";
pub const ROBOT_VACUUM: &str = "扫地机器人";
pub const SMART_CURTAIN: &str = "智能窗帘";
pub const AIR_PURIFIER: &str = "空气净化器";

macro_rules! attribute_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name { $($variant),+ }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self { $($name::$variant => $text),+ }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} value '{}'", stringify!($name), other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
        }

        impl From<$name> for AttrValue {
            fn from(v: $name) -> Self { AttrValue::Text(v.as_str().to_string()) }
        }
    };
}

attribute_enum!(
    /// Air-conditioner mode.
    AcMode { Cold => "冷风", Warm => "暖风", Auto => "自动" }
);
attribute_enum!(FanSpeed { Low => "低速", Medium => "中速", High => "高速" });
attribute_enum!(ColorTemperature { Warm => "暖光", Neutral => "自然光", Cool => "冷光" });
attribute_enum!(
    /// Washing-machine programme.
    WashMode { Standard => "标准", Quick => "快洗" }
);
attribute_enum!(CleanMode { Auto => "自动清扫", Spot => "定点清扫", Edge => "沿边清扫" });
attribute_enum!(AirQuality { Excellent => "优", Good => "良好", Fair => "一般", Poor => "差" });

/// Behavioural class of a device; selects its transition policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    AirConditioner,
    Light,
    Laundry,
    RobotVacuum,
    Curtain,
    AirPurifier,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 6] = [
        DeviceClass::AirConditioner,
        DeviceClass::Light,
        DeviceClass::Laundry,
        DeviceClass::RobotVacuum,
        DeviceClass::Curtain,
        DeviceClass::AirPurifier,
    ];

    /// Class of a catalog device; `None` for names the catalog does not know.
    pub fn of(name: &str) -> Option<Self> {
        match name {
            AIR_CONDITIONER => Some(DeviceClass::AirConditioner),
            LIVING_ROOM_LIGHT => Some(DeviceClass::Light),
            WASHING_MACHINE => Some(DeviceClass::Laundry),
            ROBOT_VACUUM => Some(DeviceClass::RobotVacuum),
            SMART_CURTAIN => Some(DeviceClass::Curtain),
            AIR_PURIFIER => Some(DeviceClass::AirPurifier),
            _ => None,
        }
    }

    pub fn device_name(self) -> &'static str {
        match self {
            DeviceClass::AirConditioner => AIR_CONDITIONER,
            DeviceClass::Light => LIVING_ROOM_LIGHT,
            DeviceClass::Laundry => WASHING_MACHINE,
            DeviceClass::RobotVacuum => ROBOT_VACUUM,
            DeviceClass::Curtain => SMART_CURTAIN,
            DeviceClass::AirPurifier => AIR_PURIFIER,
        }
    }

    /// Whether `value` is a legal setting for `key` on this class: one of the
    /// closed set for enumerated keys, an integer for everything else.
    pub fn accepts(self, key: &str, value: &AttrValue) -> bool {
        match (self, key) {
            (DeviceClass::AirConditioner, keys::MODE) => parses_as::<AcMode>(value),
            (DeviceClass::AirConditioner, keys::FAN_SPEED) => parses_as::<FanSpeed>(value),
            (DeviceClass::Light, keys::COLOR_TEMPERATURE) => parses_as::<ColorTemperature>(value),
            (DeviceClass::Laundry, keys::MODE) => parses_as::<WashMode>(value),
            (DeviceClass::RobotVacuum, keys::MODE) => parses_as::<CleanMode>(value),
            (DeviceClass::AirPurifier, keys::AIR_QUALITY) => parses_as::<AirQuality>(value),
            _ => value.as_int().is_some(),
        }
    }

    pub fn default_record(self) -> DeviceRecord {
        match self {
            DeviceClass::AirConditioner => DeviceRecord::new(PowerState::Off, [
                (keys::TEMPERATURE, AttrValue::Int(27)),
                (keys::MODE, AcMode::Cold.into()),
                (keys::FAN_SPEED, FanSpeed::Medium.into()),
            ]),
            DeviceClass::Light => DeviceRecord::new(PowerState::On, [
                (keys::BRIGHTNESS, AttrValue::Int(80)),
                (keys::COLOR_TEMPERATURE, ColorTemperature::Warm.into()),
            ]),
            DeviceClass::Laundry => DeviceRecord::new(PowerState::Off, [
                (keys::MODE, WashMode::Standard.into()),
                (keys::REMAINING_TIME, AttrValue::Int(0)),
            ]),
            DeviceClass::RobotVacuum => DeviceRecord::new(PowerState::Off, [
                (keys::BATTERY, AttrValue::Int(85)),
                (keys::MODE, CleanMode::Auto.into()),
            ]),
            DeviceClass::Curtain => DeviceRecord::new(PowerState::Off, [
                (keys::OPENNESS, AttrValue::Int(0)),
            ]),
            DeviceClass::AirPurifier => DeviceRecord::new(PowerState::On, [
                (keys::AIR_QUALITY, AirQuality::Good.into()),
                (keys::FILTER_LIFE, AttrValue::Int(80)),
            ]),
        }
    }
}

fn parses_as<T: FromStr>(value: &AttrValue) -> bool { value.as_text().is_some_and(|s| s.parse::<T>().is_ok()) }

/// State written on first run.
pub fn default_catalog() -> DeviceState {
    DeviceClass::ALL.iter().map(|class| (class.device_name().to_string(), class.default_record())).collect()
}
