use std::collections::HashMap;

use ysync::navigate::{
    SearchMode, Shape, child_direct_set, child_materialize, child_set, child_unset, find, find_or_init, find_ref,
    lookup_field,
};
use ysync::reflect::{Reflect, ReflectError, Struct};
use ysync::{Config, Value};

use crate::helpers::{Address, Device, Interface};

#[test]
fn test_field_lookup_honours_config() {
    let iface = Interface::default();
    let strict = Config::default().with_case_insensitive(false).with_tag_lookup(false);
    let loose = Config::default();

    assert!(lookup_field(&iface as &dyn Struct, "MTU", &strict).is_none());
    assert_eq!(lookup_field(&iface as &dyn Struct, "MTU", &loose).unwrap().info.name, "mtu");
    assert!(lookup_field(&iface as &dyn Struct, "address", &strict).is_none());
    assert_eq!(
        lookup_field(&iface as &dyn Struct, "address", &loose).unwrap().info.name,
        "addresses"
    );
}

#[test]
fn test_content_addressed_list_of_structs() {
    let config = Config::default();
    let mut device = Device::default();

    let interfaces = find_or_init(&mut device, "interface", SearchMode::None, &config).unwrap();
    child_set(interfaces, "[name=eth0][mtu=1500]", "", SearchMode::ByContent, &config).unwrap();
    let interfaces = find_or_init(&mut device, "interface", SearchMode::None, &config).unwrap();
    child_set(interfaces, "[name=eth0][mtu=1500]", "", SearchMode::ByContent, &config).unwrap();
    let interfaces = find_or_init(&mut device, "interface", SearchMode::None, &config).unwrap();
    child_set(interfaces, "[name=eth1]", "", SearchMode::ByContent, &config).unwrap();

    assert_eq!(device.interfaces.len(), 2);
    assert_eq!(device.interfaces[0].mtu, 1500);
    assert_eq!(device.interfaces[1].name, "eth1");

    let eth1 = find(&mut device, "interface[name=eth1]", SearchMode::None, &config).unwrap();
    child_set(eth1, "enabled", "true", SearchMode::None, &config).unwrap();
    assert!(device.interfaces[1].enabled);
}

#[test]
fn test_delete_then_find_for_every_container() {
    let config = Config::default();
    let mut device = Device::default();
    device.labels.insert("site".to_string(), "lab".to_string());
    device.interfaces.push(Interface {
        name: "eth0".to_string(),
        ..Default::default()
    });
    device.hostname = "router".to_string();

    let labels = find(&mut device, "labels", SearchMode::None, &config).unwrap();
    child_unset(labels, "site", SearchMode::None, &config).unwrap();
    let err = find(&mut device, "labels", SearchMode::None, &config)
        .and_then(|labels| find(labels, "site", SearchMode::None, &config))
        .err()
        .unwrap();
    assert!(err.is_not_found());

    let interfaces = find(&mut device, "interfaces", SearchMode::None, &config).unwrap();
    child_unset(interfaces, "[name=eth0]", SearchMode::ByContent, &config).unwrap();
    assert!(device.interfaces.is_empty());

    child_unset(&mut device, "hostname", SearchMode::None, &config).unwrap();
    assert!(device.hostname.is_empty());
}

#[test]
fn test_reads_never_allocate() {
    let config = Config::default();
    let mut device = Device::default();

    let err = find(&mut device, "system", SearchMode::None, &config).err().unwrap();
    assert!(matches!(err, ReflectError::NilPointer { .. }));
    assert!(device.system.is_none());

    let system = find_or_init(&mut device, "system", SearchMode::None, &config).unwrap();
    child_set(system, "cpu", "arm64", SearchMode::None, &config).unwrap();
    assert_eq!(device.system.as_ref().unwrap().cpu, "arm64");

    let cpu = find_ref(&device, "system", SearchMode::None, &config)
        .and_then(|system| find_ref(system, "cpu", SearchMode::None, &config))
        .unwrap();
    assert_eq!(cpu.downcast_ref::<String>().map(String::as_str), Some("arm64"));
}

#[test]
fn test_readonly_and_unknown_fields() {
    let config = Config::default();
    let mut iface = Interface::default();

    let err = child_set(&mut iface, "index", "3", SearchMode::None, &config).unwrap_err();
    assert!(matches!(err, ReflectError::NotSettable { .. }));
    let err = child_set(&mut iface, "speed", "10G", SearchMode::None, &config).unwrap_err();
    assert_eq!(err.field(), Some("speed"));
    assert_eq!(ysync::Error::from(err).kind(), ysync::ErrorKind::FieldNotFound);
}

#[test]
fn test_direct_set_typed_values() {
    let config = Config::default();
    let mut iface = Interface::default();
    let addresses = find_or_init(&mut iface, "addresses", SearchMode::None, &config).unwrap();
    let address = Address {
        ip: "10.0.0.1".to_string(),
        prefix_length: 24,
    };
    child_direct_set(addresses, "", Box::new(address.clone()), SearchMode::ByContent, &config).unwrap();
    let addresses = find_or_init(&mut iface, "addresses", SearchMode::None, &config).unwrap();
    child_direct_set(addresses, "", Box::new(address.clone()), SearchMode::ByContent, &config).unwrap();
    assert_eq!(iface.addresses, vec![address]);

    child_direct_set(&mut iface, "mtu", Box::new(9000u64), SearchMode::None, &config).unwrap();
    assert_eq!(iface.mtu, 9000);
    assert!(child_direct_set(&mut iface, "mtu", Box::new(u64::MAX), SearchMode::None, &config).is_err());
}

#[test]
fn test_hash_map_and_dynamic_containers() {
    let config = Config::default();

    let mut ports: HashMap<u16, String> = HashMap::new();
    child_set(&mut ports, "22", "ssh", SearchMode::None, &config).unwrap();
    assert_eq!(ports.get(&22).map(String::as_str), Some("ssh"));
    let err = child_set(&mut ports, "http", "80", SearchMode::None, &config).unwrap_err();
    assert!(matches!(err, ReflectError::KeyNotAddressable { .. }));

    let mut doc = Value::Map(Default::default());
    child_materialize(&mut doc, "routes", Shape::Seq, SearchMode::None, &config).unwrap();
    let routes = find(&mut doc, "routes", SearchMode::None, &config).unwrap();
    child_set(routes, "", "0.0.0.0/0", SearchMode::Last, &config).unwrap();
    assert_eq!(doc.to_string(), r#"{"routes":["0.0.0.0/0"]}"#);
}

#[test]
fn test_arrays_are_rejected() {
    let config = Config::default();
    let mut fixed = [0u8; 4];
    let err = child_set(&mut fixed as &mut dyn Reflect, "0", "1", SearchMode::ByIndex, &config).unwrap_err();
    assert!(err.is_permanent());
    assert_eq!(ysync::Error::from(err).kind(), ysync::ErrorKind::UnsupportedContainerKind);
}
