//! Predicate algebra over entity attributes.
//!
//! A [`Condition`] binds one attribute kind to an [`Op`] and an optional
//! comparison value. A condition without a value is a wildcard and matches
//! every entity. Conditions are grouped into a [`ConditionSet`], which is the
//! logical AND of its members; a slice of sets is evaluated as an OR.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::object_type::ObjectType;
use crate::partition::Partition;

/// Comparison operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    #[default]
    Equal,
    NotEqual,
}

impl Op {
    fn apply(self, hit: bool) -> bool {
        match self {
            Self::Equal => hit,
            Self::NotEqual => !hit,
        }
    }

    fn flip(self) -> Self {
        match self {
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
        }
    }
}

/// Borrowed view of the attributes a condition can inspect.
///
/// Entities leave attributes they do not carry as `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityView<'a> {
    pub partition: Option<&'a Uuid>,
    pub object_type: Option<&'a str>,
    pub uuid: Option<&'a Uuid>,
    pub name: Option<&'a str>,
    pub project: Option<&'a str>,
    pub property_key: Option<&'a str>,
}

/// Anything that can be evaluated against a [`Condition`].
pub trait Conditioned {
    fn view(&self) -> EntityView<'_>;
}

impl Conditioned for Partition {
    fn view(&self) -> EntityView<'_> {
        EntityView {
            partition: Some(&self.uuid),
            uuid: Some(&self.uuid),
            name: Some(&self.name),
            ..EntityView::default()
        }
    }
}

impl Conditioned for ObjectType {
    fn view(&self) -> EntityView<'_> {
        EntityView {
            object_type: Some(&self.code),
            ..EntityView::default()
        }
    }
}

/// Attribute kind a condition is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Partition,
    ObjectType,
    Uuid,
    Name,
    Project,
    PropertyKey,
}

/// A single predicate over one attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    Partition {
        op: Op,
        uuid: Option<Uuid>,
    },
    ObjectType {
        op: Op,
        code: Option<String>,
    },
    Uuid {
        op: Op,
        uuid: Option<Uuid>,
    },
    Name {
        op: Op,
        name: Option<String>,
        use_prefix: bool,
    },
    Project {
        op: Op,
        project: Option<String>,
        use_prefix: bool,
    },
    PropertyKey {
        op: Op,
        key: Option<String>,
        use_prefix: bool,
    },
}

impl Condition {
    pub fn partition_equal(partition: &Partition) -> Self {
        Self::Partition {
            op: Op::Equal,
            uuid: Some(partition.uuid),
        }
    }

    pub fn object_type_equal(object_type: &ObjectType) -> Self {
        Self::ObjectType {
            op: Op::Equal,
            code: Some(object_type.code.clone()),
        }
    }

    pub fn uuid_equal(uuid: Uuid) -> Self {
        Self::Uuid {
            op: Op::Equal,
            uuid: Some(uuid),
        }
    }

    pub fn name_equal(name: impl Into<String>) -> Self {
        Self::Name {
            op: Op::Equal,
            name: Some(name.into()),
            use_prefix: false,
        }
    }

    pub fn name_prefix(prefix: impl Into<String>) -> Self {
        Self::Name {
            op: Op::Equal,
            name: Some(prefix.into()),
            use_prefix: true,
        }
    }

    pub fn project_equal(project: impl Into<String>) -> Self {
        Self::Project {
            op: Op::Equal,
            project: Some(project.into()),
            use_prefix: false,
        }
    }

    pub fn property_key_equal(key: impl Into<String>) -> Self {
        Self::PropertyKey {
            op: Op::Equal,
            key: Some(key.into()),
            use_prefix: false,
        }
    }

    pub fn property_key_prefix(prefix: impl Into<String>) -> Self {
        Self::PropertyKey {
            op: Op::Equal,
            key: Some(prefix.into()),
            use_prefix: true,
        }
    }

    /// The same condition with its operator inverted.
    pub fn negate(mut self) -> Self {
        match &mut self {
            Self::Partition { op, .. }
            | Self::ObjectType { op, .. }
            | Self::Uuid { op, .. }
            | Self::Name { op, .. }
            | Self::Project { op, .. }
            | Self::PropertyKey { op, .. } => *op = op.flip(),
        }
        self
    }

    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::Partition { .. } => ConditionKind::Partition,
            Self::ObjectType { .. } => ConditionKind::ObjectType,
            Self::Uuid { .. } => ConditionKind::Uuid,
            Self::Name { .. } => ConditionKind::Name,
            Self::Project { .. } => ConditionKind::Project,
            Self::PropertyKey { .. } => ConditionKind::PropertyKey,
        }
    }

    /// Returns `true` when the condition has no comparison value.
    pub fn is_wildcard(&self) -> bool {
        match self {
            Self::Partition { uuid, .. } | Self::Uuid { uuid, .. } => uuid.is_none(),
            Self::ObjectType { code, .. } => code.is_none(),
            Self::Name { name, .. } => name.is_none(),
            Self::Project { project, .. } => project.is_none(),
            Self::PropertyKey { key, .. } => key.is_none(),
        }
    }

    /// Evaluate the predicate against an entity view.
    pub fn evaluate(&self, view: &EntityView<'_>) -> bool {
        match self {
            Self::Partition { op, uuid } => compare_exact(*op, uuid.as_ref(), view.partition),
            Self::Uuid { op, uuid } => compare_exact(*op, uuid.as_ref(), view.uuid),
            Self::ObjectType { op, code } => {
                compare_str(*op, code.as_deref(), view.object_type, false)
            }
            Self::Name {
                op,
                name,
                use_prefix,
            } => compare_str(*op, name.as_deref(), view.name, *use_prefix),
            Self::Project {
                op,
                project,
                use_prefix,
            } => compare_str(*op, project.as_deref(), view.project, *use_prefix),
            Self::PropertyKey {
                op,
                key,
                use_prefix,
            } => compare_str(*op, key.as_deref(), view.property_key, *use_prefix),
        }
    }

    /// Convenience wrapper around [`Self::evaluate`].
    pub fn matches<E: Conditioned + ?Sized>(&self, entity: &E) -> bool {
        self.evaluate(&entity.view())
    }
}

fn compare_exact<T: PartialEq>(op: Op, expected: Option<&T>, actual: Option<&T>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    op.apply(actual == Some(expected))
}

fn compare_str(op: Op, expected: Option<&str>, actual: Option<&str>, use_prefix: bool) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    let hit = match actual {
        Some(actual) if use_prefix => actual.starts_with(expected),
        Some(actual) => actual == expected,
        None => false,
    };
    op.apply(hit)
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn value<T: fmt::Display>(v: &Option<T>) -> String {
            v.as_ref().map_or_else(|| "*".to_string(), ToString::to_string)
        }
        fn star(use_prefix: bool) -> &'static str {
            if use_prefix {
                "*"
            } else {
                ""
            }
        }
        match self {
            Self::Partition { op, uuid } => write!(f, "partition{}{}", op.symbol(), value(uuid)),
            Self::ObjectType { op, code } => write!(f, "object_type{}{}", op.symbol(), value(code)),
            Self::Uuid { op, uuid } => write!(f, "uuid{}{}", op.symbol(), value(uuid)),
            Self::Name {
                op,
                name,
                use_prefix,
            } => write!(f, "name{}{}{}", op.symbol(), value(name), star(*use_prefix)),
            Self::Project {
                op,
                project,
                use_prefix,
            } => write!(f, "project{}{}{}", op.symbol(), value(project), star(*use_prefix)),
            Self::PropertyKey {
                op,
                key,
                use_prefix,
            } => write!(f, "key{}{}{}", op.symbol(), value(key), star(*use_prefix)),
        }
    }
}

/// Conjunction of conditions used to search storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// First condition of the given kind, if any.
    pub fn get(&self, kind: ConditionKind) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.kind() == kind)
    }

    /// AND of every member. An empty set matches everything.
    pub fn evaluate(&self, view: &EntityView<'_>) -> bool {
        self.conditions.iter().all(|c| c.evaluate(view))
    }

    pub fn matches<E: Conditioned + ?Sized>(&self, entity: &E) -> bool {
        self.evaluate(&entity.view())
    }
}

impl FromIterator<Condition> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConditionSet(")?;
        for (i, c) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str(")")
    }
}

/// OR across condition sets. An empty slice matches everything.
pub fn matches_any<E: Conditioned + ?Sized>(sets: &[ConditionSet], entity: &E) -> bool {
    if sets.is_empty() {
        return true;
    }
    let view = entity.view();
    sets.iter().any(|set| set.evaluate(&view))
}
