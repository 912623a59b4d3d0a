use crate::model::{keys, AttrValue, DeviceRecord};

/// Render a value with the unit the device panel shows for it.
pub fn format_attribute(key: &str, value: &AttrValue) -> String {
    match (key, value) {
        (keys::TEMPERATURE, AttrValue::Int(v)) => format!("{}°C", v),
        (keys::BRIGHTNESS | keys::BATTERY | keys::OPENNESS | keys::FILTER_LIFE, AttrValue::Int(v)) => format!("{}%", v),
        (keys::REMAINING_TIME, AttrValue::Int(v)) if *v > 0 => format!("{}分钟", v),
        _ => value.to_string(),
    }
}

/// Multi-line summary: name and power state, then one line per attribute.
pub fn describe_device(name: &str, record: &DeviceRecord) -> String {
    let marker = if record.is_on() { "🟢" } else { "🔴" };
    let mut out = format!("{} {}: {} {}", name, keys::STATE, marker, record.state);
    for (key, value) in &record.attributes {
        out.push_str(&format!("\n  {}: {}", key, format_attribute(key, value)));
    }
    out
}
