//! Per-client memoization of resolution-chain lookups.
//!
//! A [`ResolutionCache`] is owned by exactly one client, which lives for one
//! inbound request. The same request typically needs the org map, then the
//! app map within that org, then the environments within that app, so
//! memoizing by operation signature avoids redundant upstream round-trips
//! without an eviction policy or locking: the bounded lifetime does both
//! jobs. Entries are written only after a successful upstream round-trip;
//! failures are never cached. Mutation operations never touch the cache and
//! never invalidate it.

use std::collections::HashMap;

use crate::types::Environment;

/// A successfully resolved lookup result.
#[derive(Debug, Clone)]
pub enum CachedLookup {
    /// Name → UUID maps (org and app listings).
    Names(HashMap<String, String>),
    /// Environment listings for one (org, app) pair.
    Environments(Vec<Environment>),
}

/// Key → value memo table keyed by exact operation signatures.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, CachedLookup>,
}

impl ResolutionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry by operation signature.
    pub fn get(&self, key: &str) -> Option<&CachedLookup> {
        self.entries.get(key)
    }

    /// Store a successful lookup result.
    pub fn put(&mut self, key: impl Into<String>, value: CachedLookup) {
        self.entries.insert(key.into(), value);
    }

    /// Look up a cached name → UUID map.
    pub fn names(&self, key: &str) -> Option<&HashMap<String, String>> {
        match self.get(key)? {
            CachedLookup::Names(names) => Some(names),
            CachedLookup::Environments(_) => None,
        }
    }

    /// Look up a cached environment listing.
    pub fn environments(&self, key: &str) -> Option<&[Environment]> {
        match self.get(key)? {
            CachedLookup::Environments(envs) => Some(envs),
            CachedLookup::Names(_) => None,
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Signature key for the org listing.
pub fn orgs_key() -> String {
    "ListOrgs()".to_string()
}

/// Signature key for the app listing of one org.
pub fn apps_key(org_name: &str) -> String {
    format!(r#"ListApps("{org_name}")"#)
}

/// Signature key for the environment listing of one (org, app) pair.
pub fn envs_key(org_name: &str, app_name: &str) -> String {
    format!(r#"ListEnvs("{org_name}","{app_name}")"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_put() {
        let mut cache = ResolutionCache::new();
        assert!(cache.is_empty());
        assert!(cache.get(&orgs_key()).is_none());

        let mut orgs = HashMap::new();
        orgs.insert("org-one".to_string(), "ORGID01".to_string());
        cache.put(orgs_key(), CachedLookup::Names(orgs));

        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.names(&orgs_key()).unwrap()["org-one"],
            "ORGID01"
        );
    }

    #[test]
    fn test_typed_accessors_reject_mismatched_kind() {
        let mut cache = ResolutionCache::new();
        cache.put(orgs_key(), CachedLookup::Environments(Vec::new()));

        assert!(cache.names(&orgs_key()).is_none());
        assert!(cache.environments(&orgs_key()).is_some());
    }

    #[test]
    fn test_put_overwrites() {
        let mut cache = ResolutionCache::new();
        cache.put("k", CachedLookup::Names(HashMap::new()));

        let mut names = HashMap::new();
        names.insert("a".to_string(), "1".to_string());
        cache.put("k", CachedLookup::Names(names));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.names("k").unwrap().len(), 1);
    }

    #[test]
    fn test_keys_are_exact_signatures() {
        assert_eq!(orgs_key(), "ListOrgs()");
        assert_eq!(apps_key("org-one"), r#"ListApps("org-one")"#);
        assert_eq!(
            envs_key("org-one", "test-app-one"),
            r#"ListEnvs("org-one","test-app-one")"#
        );
    }

    #[test]
    fn test_keys_distinguish_arguments() {
        assert_ne!(apps_key("org-one"), apps_key("org-two"));
        assert_ne!(envs_key("a", "b"), envs_key("a", "c"));
    }
}
