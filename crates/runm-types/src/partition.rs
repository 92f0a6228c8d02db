use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level isolation boundary. Names are globally unique.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub uuid: Uuid,
    pub name: String,
}

impl Partition {
    /// Create a partition with a freshly generated UUID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::now_v7(),
            name: name.into(),
        }
    }

    /// Create a partition with a known UUID (bootstrap, tests).
    pub fn with_uuid(uuid: Uuid, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_partitions_get_distinct_uuids() {
        let a = Partition::new("east");
        let b = Partition::new("east");
        assert_ne!(a.uuid, b.uuid);
        assert_eq!(a.name, b.name);
    }

    #[test]
    fn display_includes_name_and_uuid() {
        let p = Partition::with_uuid(Uuid::nil(), "west");
        let s = format!("{p}");
        assert!(s.starts_with("west"));
        assert!(s.contains(&Uuid::nil().to_string()));
    }

    #[test]
    fn serde_roundtrip() {
        let p = Partition::new("north");
        let json = serde_json::to_string(&p).unwrap();
        let parsed: Partition = serde_json::from_str(&json).unwrap();
        assert_eq!(p, parsed);
    }
}
