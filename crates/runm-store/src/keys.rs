//! Key layout of metadata records inside the ordered store.
//!
//! ```text
//! partitions/by-uuid/{uuid}                            -> Partition
//! partitions/by-name/{name}                            -> uuid
//! object-types/{code}                                  -> ObjectType
//! objects/by-uuid/{uuid}                               -> Object
//! objects/by-name/{partition}/{type}/{project}/{name}  -> uuid
//! property-definitions/by-uuid/{uuid}                  -> PropertyDefinition
//! property-definitions/by-key/{partition}/{type}/{key} -> uuid
//! ```
//!
//! Every segment is escaped so that user-supplied names containing `/`
//! cannot alias another key.

use uuid::Uuid;

/// Escapes one path segment (`%` -> `%25`, `/` -> `%2F`).
pub fn escape(segment: &str) -> String {
    segment.replace('%', "%25").replace('/', "%2F")
}

/// Builds store keys under a fixed prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyLayout {
    prefix: String,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self::new("runm-metadata/")
    }
}

impl KeyLayout {
    /// The prefix is normalized to end with exactly one `/`. An empty (or
    /// all-slash) prefix places keys at the root.
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim_end_matches('/');
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        };
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn partitions(&self) -> String {
        format!("{}partitions/by-uuid/", self.prefix)
    }

    pub fn partition(&self, uuid: &Uuid) -> String {
        format!("{}{uuid}", self.partitions())
    }

    pub fn partition_name(&self, name: &str) -> String {
        format!("{}partitions/by-name/{}", self.prefix, escape(name))
    }

    pub fn object_types(&self) -> String {
        format!("{}object-types/", self.prefix)
    }

    pub fn object_type(&self, code: &str) -> String {
        format!("{}{}", self.object_types(), escape(code))
    }

    pub fn objects(&self) -> String {
        format!("{}objects/by-uuid/", self.prefix)
    }

    pub fn object(&self, uuid: &Uuid) -> String {
        format!("{}{uuid}", self.objects())
    }

    /// Uniqueness key of an object. `project` is `None` for objects of
    /// partition-scoped types.
    pub fn object_name(
        &self,
        partition: &Uuid,
        object_type: &str,
        project: Option<&str>,
        name: &str,
    ) -> String {
        format!(
            "{}objects/by-name/{partition}/{}/{}/{}",
            self.prefix,
            escape(object_type),
            escape(project.unwrap_or("")),
            escape(name)
        )
    }

    pub fn property_definitions(&self) -> String {
        format!("{}property-definitions/by-uuid/", self.prefix)
    }

    pub fn property_definition(&self, uuid: &Uuid) -> String {
        format!("{}{uuid}", self.property_definitions())
    }

    pub fn property_definition_key(&self, partition: &Uuid, object_type: &str, key: &str) -> String {
        format!(
            "{}property-definitions/by-key/{partition}/{}/{}",
            self.prefix,
            escape(object_type),
            escape(key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn prefix_is_normalized() {
        assert_eq!(KeyLayout::new("runm").prefix(), "runm/");
        assert_eq!(KeyLayout::new("runm///").prefix(), "runm/");
        assert_eq!(KeyLayout::new("").prefix(), "");
        assert_eq!(KeyLayout::new("/").prefix(), "");
        assert_eq!(KeyLayout::default().prefix(), "runm-metadata/");
    }

    #[test]
    fn segments_are_escaped() {
        assert_eq!(escape("a/b%c"), "a%2Fb%25c");
        let keys = KeyLayout::new("x");
        let p = Uuid::nil();
        // "a/b" as a name must not collide with project "a", name "b".
        assert_ne!(
            keys.object_name(&p, "t", None, "a/b"),
            keys.object_name(&p, "t", Some("a"), "b")
        );
    }

    #[test]
    fn partition_scoped_objects_use_empty_project_segment() {
        let keys = KeyLayout::new("x");
        let key = keys.object_name(&Uuid::nil(), "runm.provider", None, "rack-1");
        assert!(key.ends_with("/runm.provider//rack-1"));
    }

    #[test]
    fn record_keys_live_under_their_range_prefix() {
        let keys = KeyLayout::default();
        let u = Uuid::from_u128(7);
        assert!(keys.object(&u).starts_with(&keys.objects()));
        assert!(keys.partition(&u).starts_with(&keys.partitions()));
        assert!(keys.object_type("runm.machine").starts_with(&keys.object_types()));
        assert!(keys.property_definition(&u).starts_with(&keys.property_definitions()));
        assert!(!keys.partition_name("p").starts_with(&keys.partitions()));
    }

    proptest! {
        #[test]
        fn escaped_segments_never_contain_separators(segment in "[a-z%/]{0,12}") {
            prop_assert!(!escape(&segment).contains('/'));
        }

        #[test]
        fn distinct_segments_escape_distinctly(a in "[a-z%/2F5]{0,8}", b in "[a-z%/2F5]{0,8}") {
            prop_assume!(a != b);
            prop_assert_ne!(escape(&a), escape(&b));
        }

        #[test]
        fn name_keys_are_distinct_per_identity(
            project in proptest::option::of("[a-z/]{1,6}"),
            name in "[a-z/]{1,6}",
            other in "[a-z/]{1,6}",
        ) {
            prop_assume!(name != other);
            let keys = KeyLayout::default();
            let p = Uuid::from_u128(1);
            prop_assert_ne!(
                keys.object_name(&p, "runm.machine", project.as_deref(), &name),
                keys.object_name(&p, "runm.machine", project.as_deref(), &other)
            );
        }
    }
}
