use std::fs;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use butler_core::error::Error;
use butler_devices::catalog::{AcMode, WashMode, WASHING_MACHINE, AIR_CONDITIONER, LIVING_ROOM_LIGHT, SMART_CURTAIN};
use butler_devices::{default_catalog, keys, AttrValue, Attributes, DeviceStore, PolicyTable, PowerState};

fn store_in(tmp: &TempDir) -> DeviceStore { DeviceStore::new(tmp.path().join("device_state.json")) }

fn updates(pairs: &[(&str, AttrValue)]) -> Attributes {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn load_bootstraps_missing_file_with_catalog() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    assert!(!store.path().exists());

    let state = store.load();

    assert_eq!(state, default_catalog());
    assert!(store.path().exists(), "bootstrap writes the catalog");
    let on_disk: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(on_disk[WASHING_MACHINE]["状态"], "关闭");
    assert_eq!(on_disk[WASHING_MACHINE]["剩余时间"], 0);
    assert_eq!(on_disk[AIR_CONDITIONER]["温度"], 27);
}

#[test]
fn state_file_is_written_as_readable_utf8() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    store.load();
    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"空调\""), "non-ASCII keys are not escaped");
    assert!(raw.contains('\n'), "pretty printed");
}

#[test]
fn save_then_load_round_trips() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let mut state = default_catalog();
    let light = state.get_mut(LIVING_ROOM_LIGHT).unwrap();
    light.state = PowerState::Off;
    light.attributes.insert(keys::BRIGHTNESS.to_string(), AttrValue::Int(15));

    store.save(&state).expect("save");
    assert_eq!(store.try_load().expect("load"), state);
    assert!(!tmp.path().join("device_state.json.tmp").exists(), "temp file is renamed away");
}

#[test]
fn save_load_save_keeps_bytes() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    store.load();
    let before = fs::read(store.path()).unwrap();
    let state = store.load();
    store.save(&state).unwrap();
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn corrupt_file_falls_back_to_catalog_without_overwriting() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    fs::write(store.path(), "{ not json").unwrap();

    assert!(matches!(store.try_load(), Err(Error::StateCorrupt { .. })));
    assert_eq!(store.load(), default_catalog());
    assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
}

#[test]
fn unknown_power_state_is_corrupt() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    fs::write(store.path(), r#"{"空调": {"状态": "未知", "温度": 27}}"#).unwrap();
    assert!(matches!(store.try_load(), Err(Error::StateCorrupt { .. })));
}

#[test]
fn save_failure_is_reported_and_keeps_previous_file() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    store.load();
    let before = fs::read(store.path()).unwrap();
    // a directory squatting on the temp path makes the write fail
    fs::create_dir(tmp.path().join("device_state.json.tmp")).unwrap();

    let err = store.save(&default_catalog()).unwrap_err();
    assert!(matches!(err, Error::StateWrite { .. }));
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn control_unknown_device_returns_false_and_does_not_write() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    store.load();
    fs::write(store.path(), serde_json::to_string(&default_catalog()).unwrap()).unwrap();
    let before = fs::read(store.path()).unwrap();

    let changed = store.control_device("unknown_device", PowerState::On, &Attributes::new()).unwrap();

    assert!(!changed);
    assert_eq!(fs::read(store.path()).unwrap(), before, "compact file left untouched");
}

#[test]
fn control_unknown_device_on_fresh_path_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);

    let changed = store.control_device("unknown_device", PowerState::On, &Attributes::new()).unwrap();

    assert!(!changed);
    assert!(!store.path().exists());
}

#[test]
fn control_switches_power_and_persists() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);

    assert!(store.control_device(AIR_CONDITIONER, PowerState::On, &Attributes::new()).unwrap());
    assert_eq!(store.load()[AIR_CONDITIONER].state, PowerState::On);

    assert!(store.control_device(AIR_CONDITIONER, PowerState::Off, &Attributes::new()).unwrap());
    assert_eq!(store.load()[AIR_CONDITIONER].state, PowerState::Off);
}

#[test]
fn laundry_on_with_mode_sets_remaining_time() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let ok = store
            .control_device_with_rng(WASHING_MACHINE, PowerState::On, &updates(&[(keys::MODE, WashMode::Standard.into())]), &mut rng)
            .unwrap();
        assert!(ok);
        let state = store.load();
        let washer = &state[WASHING_MACHINE];
        assert_eq!(washer.state, PowerState::On);
        assert_eq!(washer.get(keys::MODE), Some(&AttrValue::from("标准")));
        let minutes = washer.get(keys::REMAINING_TIME).and_then(AttrValue::as_int).unwrap();
        assert!((30..=90).contains(&minutes), "remaining time {minutes} out of range");
    }
}

#[test]
fn laundry_on_without_mode_keeps_remaining_time() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    store.control_device(WASHING_MACHINE, PowerState::On, &Attributes::new()).unwrap();
    assert_eq!(store.load()[WASHING_MACHINE].get(keys::REMAINING_TIME), Some(&AttrValue::Int(0)));
}

#[test]
fn laundry_off_resets_remaining_time() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    store.control_device(WASHING_MACHINE, PowerState::On, &updates(&[(keys::MODE, WashMode::Quick.into())])).unwrap();
    assert_ne!(store.load()[WASHING_MACHINE].get(keys::REMAINING_TIME), Some(&AttrValue::Int(0)));

    store.control_device(WASHING_MACHINE, PowerState::Off, &Attributes::new()).unwrap();
    let state = store.load();
    let washer = &state[WASHING_MACHINE];
    assert_eq!(washer.state, PowerState::Off);
    assert_eq!(washer.get(keys::REMAINING_TIME), Some(&AttrValue::Int(0)));
    assert_eq!(washer.get(keys::MODE), Some(&AttrValue::from("快洗")));
}

#[test]
fn unknown_update_keys_are_dropped() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    let schema: Vec<String> = default_catalog()[SMART_CURTAIN].attributes.keys().cloned().collect();

    let ok = store
        .control_device(SMART_CURTAIN, PowerState::On, &updates(&[(keys::OPENNESS, AttrValue::Int(60)), ("颜色", "红色".into())]))
        .unwrap();

    assert!(ok);
    let state = store.load();
    let curtain = &state[SMART_CURTAIN];
    assert_eq!(curtain.get(keys::OPENNESS), Some(&AttrValue::Int(60)));
    let keys_after: Vec<String> = curtain.attributes.keys().cloned().collect();
    assert_eq!(keys_after, schema);
}

#[test]
fn empty_policy_table_disables_side_effects() {
    let tmp = TempDir::new().unwrap();
    let store = DeviceStore::with_policies(tmp.path().join("state.json"), PolicyTable::empty());
    store.control_device(WASHING_MACHINE, PowerState::On, &updates(&[(keys::MODE, "快洗".into())])).unwrap();
    let state = store.load();
    let washer = &state[WASHING_MACHINE];
    assert_eq!(washer.get(keys::MODE), Some(&AttrValue::from("快洗")), "generic update still applies");
    assert_eq!(washer.get(keys::REMAINING_TIME), Some(&AttrValue::Int(0)));
}

#[test]
fn control_reports_write_failure() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    store.load();
    fs::create_dir(tmp.path().join("device_state.json.tmp")).unwrap();
    let result = store.control_device(AIR_CONDITIONER, PowerState::On, &Attributes::new());
    assert!(matches!(result, Err(Error::StateWrite { .. })));
    assert_eq!(store.load()[AIR_CONDITIONER].state, PowerState::Off, "previous state survives");
}

#[test]
fn laundry_rejects_unknown_wash_mode() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);

    let ok = store.control_device(WASHING_MACHINE, PowerState::On, &updates(&[(keys::MODE, "烘干".into())])).unwrap();

    assert!(ok);
    let state = store.load();
    let washer = &state[WASHING_MACHINE];
    assert_eq!(washer.state, PowerState::On);
    assert_eq!(washer.get(keys::MODE), Some(&AttrValue::from(WashMode::Standard)));
    assert_eq!(washer.get(keys::REMAINING_TIME), Some(&AttrValue::Int(0)), "no wash started");
}

#[test]
fn text_for_integer_attribute_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);

    let ok = store
        .control_device(AIR_CONDITIONER, PowerState::On, &updates(&[(keys::TEMPERATURE, "hot".into()), (keys::MODE, AcMode::Warm.into())]))
        .unwrap();

    assert!(ok);
    let state = store.load();
    let ac = &state[AIR_CONDITIONER];
    assert_eq!(ac.get(keys::TEMPERATURE), Some(&AttrValue::Int(27)));
    assert_eq!(ac.get(keys::MODE), Some(&AttrValue::from("暖风")), "valid updates in the same call still apply");
}

#[test]
fn mode_from_another_class_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);

    store.control_device(AIR_CONDITIONER, PowerState::On, &updates(&[(keys::MODE, WashMode::Quick.into()), (keys::TEMPERATURE, AttrValue::Int(22))])).unwrap();

    let state = store.load();
    let ac = &state[AIR_CONDITIONER];
    assert_eq!(ac.get(keys::MODE), Some(&AttrValue::from(AcMode::Cold)));
    assert_eq!(ac.get(keys::TEMPERATURE), Some(&AttrValue::Int(22)));
}

#[test]
fn devices_outside_catalog_keep_value_kinds() {
    let tmp = TempDir::new().unwrap();
    let store = store_in(&tmp);
    fs::write(store.path(), r#"{"加湿器": {"状态": "关闭", "湿度": 40, "档位": "低"}}"#).unwrap();

    let ok = store
        .control_device("加湿器", PowerState::On, &updates(&[("湿度", "high".into()), ("档位", "高".into())]))
        .unwrap();

    assert!(ok);
    let state = store.load();
    let humidifier = &state["加湿器"];
    assert_eq!(humidifier.get("湿度"), Some(&AttrValue::Int(40)));
    assert_eq!(humidifier.get("档位"), Some(&AttrValue::from("高")));
}
