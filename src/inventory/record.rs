//! Repository records and the organization snapshot

use serde::Serialize;
use std::fmt;

use crate::hosting::RepositoryStub;

/// Outcome of a repository's branch fetch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// Branches were listed completely
    Ok,
    /// The branch listing failed; `branches` is empty
    Degraded,
}

impl FetchStatus {
    /// Returns the text representation of this status
    pub fn text(&self) -> &str {
        match self {
            FetchStatus::Ok => "ok",
            FetchStatus::Degraded => "degraded",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// One repository of the organization with its branch names
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RepositoryRecord {
    pub name: String,
    #[serde(rename = "giturl")]
    pub git_url: String,
    #[serde(rename = "cloneurl")]
    pub clone_url: String,
    /// Branch names in the order the provider returned them
    pub branches: Vec<String>,
    pub status: FetchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepositoryRecord {
    /// Creates a record with no branches yet
    pub fn from_stub(stub: RepositoryStub) -> Self {
        Self {
            name: stub.name,
            git_url: stub.git_url,
            clone_url: stub.clone_url,
            branches: Vec::new(),
            status: FetchStatus::Ok,
            error: None,
        }
    }

    /// Creates a record whose branch fetch failed
    pub fn degraded(stub: RepositoryStub, error: impl Into<String>) -> Self {
        let mut record = Self::from_stub(stub);
        record.degrade(error);
        record
    }

    /// Marks the record as degraded, dropping any branches gathered so far
    pub fn degrade(&mut self, error: impl Into<String>) {
        self.branches.clear();
        self.status = FetchStatus::Degraded;
        self.error = Some(error.into());
    }

    pub fn is_degraded(&self) -> bool {
        self.status == FetchStatus::Degraded
    }
}

/// Every repository record collected for one organization
///
/// Records appear in completion order, which differs between runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrganizationSnapshot {
    pub repos: Vec<RepositoryRecord>,
}

impl OrganizationSnapshot {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            repos: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: RepositoryRecord) {
        self.repos.push(record);
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Looks up a record by repository name
    pub fn get(&self, name: &str) -> Option<&RepositoryRecord> {
        self.repos.iter().find(|record| record.name == name)
    }

    pub fn degraded_count(&self) -> usize {
        self.repos.iter().filter(|record| record.is_degraded()).count()
    }

    /// Sorts records alphabetically by name (case-insensitive)
    pub fn sort_by_name(&mut self) {
        self.repos
            .sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(name: &str) -> RepositoryStub {
        RepositoryStub {
            name: name.to_string(),
            git_url: format!("git://github.com/acme/{name}.git"),
            clone_url: format!("https://github.com/acme/{name}.git"),
        }
    }

    #[test]
    fn test_from_stub_starts_empty_and_ok() {
        let record = RepositoryRecord::from_stub(stub("alpha"));
        assert_eq!(record.name, "alpha");
        assert_eq!(record.clone_url, "https://github.com/acme/alpha.git");
        assert!(record.branches.is_empty());
        assert_eq!(record.status, FetchStatus::Ok);
        assert!(record.error.is_none());
    }

    #[test]
    fn test_degrade_clears_branches() {
        let mut record = RepositoryRecord::from_stub(stub("alpha"));
        record.branches = vec!["main".to_string()];
        record.degrade("boom");
        assert!(record.branches.is_empty());
        assert!(record.is_degraded());
        assert_eq!(record.error.as_deref(), Some("boom"));
        assert_eq!(record.status.to_string(), "degraded");
    }

    #[test]
    fn test_status_display_matches_serialized_name() {
        assert_eq!(FetchStatus::Ok.to_string(), "ok");
        let yaml = serde_yaml::to_string(&FetchStatus::Degraded).unwrap();
        assert_eq!(yaml.trim(), FetchStatus::Degraded.text());
    }

    #[test]
    fn test_snapshot_lookup_and_counts() {
        let mut snapshot = OrganizationSnapshot::default();
        snapshot.push(RepositoryRecord::from_stub(stub("beta")));
        snapshot.push(RepositoryRecord::degraded(stub("Alpha"), "404"));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.degraded_count(), 1);
        assert!(snapshot.get("beta").is_some());
        assert!(snapshot.get("gamma").is_none());

        snapshot.sort_by_name();
        let names: Vec<&str> = snapshot.repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta"]);
    }
}
