use serde::{Deserialize, Serialize};

/// Caller identity and default scope, supplied with every request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub project: String,
    /// Partition name or UUID the caller is working in.
    #[serde(default)]
    pub partition: String,
}

impl Session {
    pub fn new(
        user: impl Into<String>,
        project: impl Into<String>,
        partition: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            project: project.into(),
            partition: partition.into(),
        }
    }

    /// The session's project, if one was set.
    pub fn project(&self) -> Option<&str> {
        if self.project.is_empty() {
            None
        } else {
            Some(&self.project)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_project_is_none() {
        let s = Session::new("alice", "", "p1");
        assert!(s.project().is_none());
        let s = Session::new("alice", "acme", "p1");
        assert_eq!(s.project(), Some("acme"));
    }

    #[test]
    fn missing_fields_deserialize_empty() {
        let s: Session = serde_json::from_str(r#"{"user":"bob"}"#).unwrap();
        assert_eq!(s.user, "bob");
        assert!(s.partition.is_empty());
    }
}
