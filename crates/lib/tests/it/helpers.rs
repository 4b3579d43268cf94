use std::collections::BTreeMap;

use ysync::{ChangeOp, Config, Replica, Tag, Value, reflect_struct, sync::ScalarTag};

// ==========================
// TARGET FIXTURES
// ==========================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Address {
    pub ip: String,
    pub prefix_length: u8,
}

reflect_struct!(Address {
    ip,
    prefix_length as "prefix-length",
});

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Interface {
    pub name: String,
    pub mtu: u32,
    pub enabled: bool,
    pub addresses: Vec<Address>,
    pub description: Option<String>,
    pub index: u32,
}

reflect_struct!(Interface {
    name,
    mtu,
    enabled,
    addresses as "address",
    description,
    index: readonly,
});

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Device {
    pub hostname: String,
    pub interfaces: Vec<Interface>,
    pub labels: BTreeMap<String, String>,
    pub counters: BTreeMap<String, u64>,
    pub tags: Vec<String>,
    pub system: Option<Box<System>>,
    pub extra: Value,
}

reflect_struct!(Device {
    hostname,
    interfaces as "interface",
    labels,
    counters,
    tags,
    system,
    extra,
});

#[derive(Debug, Default, Clone, PartialEq)]
pub struct System {
    pub cpu: String,
    pub memory: i64,
}

reflect_struct!(System { cpu, memory });

// ==========================
// EVENT HELPERS
// ==========================

pub fn text() -> Tag {
    Tag::Scalar(ScalarTag::Str)
}

pub fn int() -> Tag {
    Tag::Scalar(ScalarTag::Int)
}

/// Creates a replica of an empty device with the default configuration.
pub fn device_replica() -> Replica<Device> {
    Replica::new(Device::default())
}

/// Creates a replica of an empty dynamic document.
pub fn document_replica() -> Replica<Value> {
    Replica::with_config(Value::Null, Config::default())
}

/// Applies `ops` and asserts that every one of them succeeded.
pub fn apply_ok<T: ysync::Reflect>(replica: &mut Replica<T>, ops: impl IntoIterator<Item = ChangeOp>) {
    for op in ops {
        let display = op.to_string();
        if let Err(err) = replica.apply(op) {
            panic!("{display} failed: {err}");
        }
    }
}

/// Parses a JSON literal into a dynamic value for comparisons.
pub fn json(text: &str) -> Value {
    Value::from(serde_json::from_str::<serde_json::Value>(text).unwrap())
}
