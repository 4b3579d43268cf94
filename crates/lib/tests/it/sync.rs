use ysync::sync::{DataUpdate, OpKind, SyncError, Updater, apply};
use ysync::{ChangeOp, Config, ErrorKind, Replica, Tag, Value, reflect_struct};

use crate::helpers::{Device, System, apply_ok, device_replica, document_replica, int, json, text};

#[derive(Debug, Default, PartialEq)]
struct Host {
    system: System,
}

reflect_struct!(Host { system });

#[test]
fn test_struct_target_end_to_end() {
    let mut replica = Replica::new(Host::default());
    apply_ok(
        &mut replica,
        [
            ChangeOp::create(&["system"], "cpu", text(), "pentium"),
            ChangeOp::create(&["system"], "memory", text(), "16"),
        ],
    );
    assert_eq!(replica.target().system.cpu, "pentium");
    assert_eq!(replica.target().system.memory, 16);
}

#[test]
fn test_generic_document_end_to_end() {
    let mut replica = document_replica();
    apply_ok(
        &mut replica,
        [
            ChangeOp::create(&[], "list", Tag::Seq, ""),
            ChangeOp::create(&["list"], "", Tag::Map, ""),
            ChangeOp::create(&["list", ""], "name", text(), "neoul"),
        ],
    );
    assert_eq!(*replica.target(), json(r#"{"list":[{"name":"neoul"}]}"#));
}

#[test]
fn test_create_is_idempotent() {
    let events = [
        ChangeOp::create(&[], "hostname", text(), "router1"),
        ChangeOp::create(&["interface[name=eth0]"], "mtu", text(), "1500"),
        ChangeOp::create(&["labels"], "site", text(), "lab"),
        ChangeOp::create(&["system"], "cpu", text(), "arm64"),
        ChangeOp::create(&["extra", "owner"], "team", text(), "netops"),
    ];

    let mut once = device_replica();
    apply_ok(&mut once, events.clone());

    let mut twice = device_replica();
    apply_ok(&mut twice, events.clone());
    apply_ok(&mut twice, events);

    assert_eq!(once.target(), twice.target());
    assert_eq!(twice.target().interfaces.len(), 1);
}

#[test]
fn test_partial_failure_is_isolated() {
    let mut replica = device_replica();
    let failures = replica.apply_all([
        ChangeOp::create(&[], "hostname", text(), "router1"),
        ChangeOp::create(&["interface[name=eth0]"], "speed", text(), "10G"),
        ChangeOp::create(&["interface[name=eth0]"], "mtu", text(), "9000"),
        ChangeOp::create(&["counters"], "rx", int(), "42"),
    ]);
    assert_eq!(failures, 1);
    assert_eq!(replica.journal().len(), 4);

    let errors: Vec<_> = replica.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].seq, 2);
    assert_eq!(errors[0].op.key, "speed");
    let error = errors[0].error.as_ref().unwrap();
    assert_eq!(error.kind(), ErrorKind::FieldNotFound);
    assert_eq!(error.module(), "sync");

    let device = replica.target();
    assert_eq!(device.hostname, "router1");
    assert_eq!(device.interfaces[0].mtu, 9000);
    assert_eq!(device.counters.get("rx"), Some(&42));
}

#[test]
fn test_path_errors_name_the_segment() {
    let mut replica = device_replica();
    let err = replica
        .apply(ChangeOp::create(&["nonexistent"], "x", text(), "1"))
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.kind(), ErrorKind::PathNotFound);
    match err {
        ysync::Error::Sync(sync_err) => assert_eq!(sync_err.segment(), Some("nonexistent")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_delete_never_fabricates() {
    let mut replica = document_replica();
    let err = replica.apply(ChangeOp::delete(&["a", "b"], "c")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PathNotFound);
    assert_eq!(*replica.target(), Value::Null);

    let mut device = device_replica();
    assert!(device.apply(ChangeOp::delete(&["system"], "cpu")).is_err());
    assert!(device.target().system.is_none());
}

#[test]
fn test_nested_create_on_empty_document() {
    let mut replica = document_replica();
    apply_ok(
        &mut replica,
        [
            ChangeOp::create(&["system"], "cpu", text(), "arm64"),
            ChangeOp::replace(&["system", "memory"], "total", int(), "4096"),
        ],
    );
    assert_eq!(
        *replica.target(),
        json(r#"{"system":{"cpu":"arm64","memory":{"total":4096}}}"#)
    );
    assert_eq!(replica.journal().error_count(), 0);
}

#[test]
fn test_create_then_delete_restores_shape() {
    let mut replica = document_replica();
    apply_ok(
        &mut replica,
        [
            ChangeOp::create(&["interfaces", "eth0"], "mtu", int(), "1500"),
            ChangeOp::create(&["interfaces", "eth1"], "mtu", int(), "9000"),
            ChangeOp::delete(&["interfaces"], "eth0"),
            ChangeOp::delete(&["interfaces"], "eth7"),
        ],
    );
    assert_eq!(*replica.target(), json(r#"{"interfaces":{"eth1":{"mtu":9000}}}"#));
}

#[test]
fn test_keyed_list_paths() {
    let mut replica = device_replica();
    apply_ok(
        &mut replica,
        [
            ChangeOp::create(&["interface[name=eth0]", "address[ip=10.0.0.1]"], "prefix-length", text(), "24"),
            ChangeOp::create(&["interface[name=eth0]", "address[ip=10.0.0.2]"], "prefix-length", text(), "25"),
            ChangeOp::replace(&["interface[name=eth0]", "address[ip=10.0.0.1]"], "prefix-length", text(), "16"),
            ChangeOp::delete(&["interface[name=eth0]"], "address[ip=10.0.0.2]"),
        ],
    );
    let interface = &replica.target().interfaces[0];
    assert_eq!(interface.name, "eth0");
    assert_eq!(interface.addresses.len(), 1);
    assert_eq!(interface.addresses[0].ip, "10.0.0.1");
    assert_eq!(interface.addresses[0].prefix_length, 16);
}

#[test]
fn test_replace_without_match_appends() {
    let mut replica = device_replica();
    apply_ok(
        &mut replica,
        [
            ChangeOp::create(&["interface[name=eth0]"], "mtu", text(), "1500"),
            ChangeOp::replace(&["interface[name=eth9]"], "mtu", text(), "9000"),
        ],
    );
    let names: Vec<&str> = replica.target().interfaces.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["eth0", "eth9"]);
}

#[test]
fn test_set_like_list_members() {
    let mut replica = device_replica();
    apply_ok(
        &mut replica,
        [
            ChangeOp::create(&[], "tags", Tag::Set, ""),
            ChangeOp::create(&["tags"], "core", text(), ""),
            ChangeOp::create(&["tags"], "edge", text(), ""),
            ChangeOp::create(&["tags"], "core", text(), ""),
        ],
    );
    assert_eq!(replica.target().tags, vec!["core", "edge"]);

    replica.apply(ChangeOp::delete(&["tags"], "core")).unwrap();
    assert_eq!(replica.target().tags, vec!["edge"]);
}

#[test]
fn test_tags_decide_dynamic_variants() {
    let mut replica = document_replica();
    apply_ok(
        &mut replica,
        [
            ChangeOp::create(&[], "count", int(), "3"),
            ChangeOp::create(&[], "ratio", Tag::parse("!!float"), "0.5"),
            ChangeOp::create(&[], "up", Tag::parse("!!bool"), "true"),
            ChangeOp::create(&[], "none", Tag::parse("!!null"), ""),
            ChangeOp::create(&[], "bad", int(), "three"),
        ],
    );
    assert_eq!(
        *replica.target(),
        json(r#"{"bad":"three","count":3,"none":null,"ratio":0.5,"up":true}"#)
    );
}

#[test]
fn test_root_events() {
    let mut counter = Replica::new(0u32);
    apply_ok(&mut counter, [ChangeOp::replace(&[], "", text(), "5")]);
    apply_ok(&mut counter, [ChangeOp::delete(&[], "")]);
    assert_eq!(*counter.target(), 5);

    let mut device = device_replica();
    apply_ok(&mut device, [ChangeOp::create(&[], "", Tag::Map, "")]);
    assert_eq!(*device.target(), Device::default());
}

#[test]
fn test_unknown_operation() {
    let err = "upsert".parse::<OpKind>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownOperation);
    let err: ysync::Error = err.into();
    assert!(err.is_permanent());

    let parsed = serde_json::from_str::<ChangeOp>(r#"{"op":"u","key":"a"}"#);
    assert!(parsed.is_err());
}

// ==========================
// OVERRIDES
// ==========================

#[derive(Debug, Default)]
struct Mirror {
    replica: Replica<Value>,
}

impl DataUpdate for Mirror {
    fn update_create(&mut self, path: &str, value: &str) -> Result<(), SyncError> {
        self.replica.update_create(path, value)
    }

    fn update_replace(&mut self, path: &str, value: &str) -> Result<(), SyncError> {
        self.replica.update_replace(path, value)
    }

    fn update_delete(&mut self, path: &str) -> Result<(), SyncError> {
        self.replica.update_delete(path)
    }
}

reflect_struct!(Mirror {}; paths);

#[derive(Debug, Default)]
struct Layered {
    mirror: Mirror,
    calls: Vec<String>,
}

impl Updater for Layered {
    fn create(&mut self, path: &[String], key: &str, tag: &Tag, value: &str) -> Result<(), SyncError> {
        self.calls.push(format!("create {path:?} {key} {tag} {value}"));
        Ok(())
    }

    fn replace(&mut self, path: &[String], key: &str, tag: &Tag, value: &str) -> Result<(), SyncError> {
        self.calls.push(format!("replace {path:?} {key} {tag} {value}"));
        Ok(())
    }

    fn delete(&mut self, _path: &[String], _key: &str) -> Result<(), SyncError> {
        Err(SyncError::rejected("deletes are not accepted"))
    }
}

reflect_struct!(Layered { mirror }; segments);

#[test]
fn test_deepest_override_wins() {
    let mut replica = Replica::new(Layered::default());
    apply_ok(
        &mut replica,
        [
            ChangeOp::create(&["mirror", "interfaces", "eth0"], "mtu", int(), "1500"),
            ChangeOp::replace(&["mirror", "interfaces", "eth0"], "mtu", int(), "9000"),
            ChangeOp::create(&["hostname"], "value", text(), "router1"),
        ],
    );

    let layered = replica.target();
    assert_eq!(
        *layered.mirror.replica.target(),
        json(r#"{"interfaces":{"eth0":{"mtu":"9000"}}}"#)
    );
    assert_eq!(layered.calls, vec![r#"create ["hostname"] value !!str router1"#]);

    let err = replica.apply(ChangeOp::delete(&["hostname"], "value")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(replica.journal().error_count(), 1);
}

#[test]
fn test_path_override_at_the_root() {
    let mut mirror = Mirror::default();
    apply(
        &mut mirror,
        &ChangeOp::create(&["system"], "cpu", text(), "arm64"),
        &Config::default(),
    )
    .unwrap();
    apply(&mut mirror, &ChangeOp::delete(&[], "system"), &Config::default()).unwrap();
    assert_eq!(*mirror.replica.target(), json("{}"));
    assert_eq!(mirror.replica.journal().len(), 2);
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<String>,
}

impl DataUpdate for Recorded {
    fn update_create(&mut self, path: &str, value: &str) -> Result<(), SyncError> {
        self.calls.push(format!("create {path} {value}"));
        Ok(())
    }

    fn update_replace(&mut self, path: &str, value: &str) -> Result<(), SyncError> {
        self.calls.push(format!("replace {path} {value}"));
        Ok(())
    }

    fn update_delete(&mut self, path: &str) -> Result<(), SyncError> {
        self.calls.push(format!("delete {path}"));
        Ok(())
    }
}

reflect_struct!(Recorded {}; paths);

#[test]
fn test_set_members_reach_path_override_as_values() {
    let config = Config::default();
    let mut recorded = Recorded::default();
    let ops = [
        ChangeOp::create(&["dns"], "8.8.8.8", text(), "").with_parent_tag(Tag::Set),
        ChangeOp::create(&[], "ntp", text(), "").with_parent_tag(Tag::Set),
        ChangeOp::create(&["dns"], "timeout", int(), "5").with_parent_tag(Tag::Map),
        ChangeOp::delete(&["dns"], "8.8.8.8").with_parent_tag(Tag::Set),
    ];
    for op in &ops {
        apply(&mut recorded, op, &config).unwrap();
    }
    assert_eq!(
        recorded.calls,
        vec!["create /dns 8.8.8.8", "create / ntp", "create /dns/timeout 5", "delete /dns"]
    );

    let parsed: ChangeOp =
        serde_json::from_str(r#"{"op":"c","path":["dns"],"key":"1.1.1.1","parent_tag":"!!set"}"#).unwrap();
    assert!(parsed.is_set_member());
}

// ==========================
// BATCHES
// ==========================

#[test]
fn test_buffered_batch_reports_failures() {
    let config = Config::default().with_buffer_batches(true);
    let mut replica = Replica::with_config(Device::default(), config);

    replica.begin_batch().unwrap();
    replica.apply(ChangeOp::create(&[], "hostname", text(), "router1")).unwrap();
    replica.apply(ChangeOp::create(&[], "uptime", text(), "10")).unwrap();
    replica.apply(ChangeOp::create(&["counters"], "rx", text(), "1")).unwrap();
    assert!(replica.target().hostname.is_empty());

    assert_eq!(replica.end_batch().unwrap(), 1);
    assert_eq!(replica.target().hostname, "router1");
    assert_eq!(replica.target().counters.get("rx"), Some(&1));
    assert_eq!(replica.journal().error_count(), 1);
}

#[test]
fn test_unbuffered_batch_applies_immediately() {
    let mut replica = device_replica();
    replica.begin_batch().unwrap();
    replica.apply(ChangeOp::create(&[], "hostname", text(), "router1")).unwrap();
    assert_eq!(replica.target().hostname, "router1");
    assert_eq!(replica.end_batch().unwrap(), 0);
    assert!(replica.end_batch().is_err());
}
