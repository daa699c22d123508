use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a policy manager operates.
///
/// A domain scope always carries a non-empty domain name; an empty or
/// missing name means local scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyScope {
    Local,
    Domain(String),
}

impl PolicyScope {
    pub fn from_domain(domain: Option<&str>) -> Self {
        match domain.map(str::trim) {
            Some(name) if !name.is_empty() => PolicyScope::Domain(name.to_string()),
            _ => PolicyScope::Local,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, PolicyScope::Local)
    }

    /// Short label used in messages
    pub fn label(&self) -> &'static str {
        match self {
            PolicyScope::Local => "local",
            PolicyScope::Domain(_) => "domain",
        }
    }
}

impl fmt::Display for PolicyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyScope::Local => write!(f, "local"),
            PolicyScope::Domain(name) => write!(f, "domain '{}'", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_domain_is_local() {
        assert_eq!(PolicyScope::from_domain(None), PolicyScope::Local);
        assert_eq!(PolicyScope::from_domain(Some("")), PolicyScope::Local);
        assert_eq!(PolicyScope::from_domain(Some("   ")), PolicyScope::Local);
    }

    #[test]
    fn test_named_domain() {
        let scope = PolicyScope::from_domain(Some(" contoso.com "));
        assert_eq!(scope, PolicyScope::Domain("contoso.com".to_string()));
        assert!(!scope.is_local());
    }
}
