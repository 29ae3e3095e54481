use std::fmt;

/// A family of cache keys that can be invalidated as one unit.
///
/// Every key belongs to exactly one namespace, and backends track membership
/// explicitly instead of matching key strings against patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace(&'static str);

impl Namespace {
    /// Namespace names must not contain `:`.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Key of the backend-side set holding this namespace's members.
    pub fn tracking_key(&self) -> String {
        format!("{}:_keys", self.0)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A fully qualified cache key: `{namespace}:{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: Namespace,
    rendered: String,
}

impl CacheKey {
    pub fn new(namespace: Namespace, id: impl fmt::Display) -> Self {
        Self {
            namespace,
            rendered: format!("{}:{}", namespace.as_str(), id),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGES: Namespace = Namespace::new("pages");

    #[test]
    fn renders_namespace_prefix() {
        let key = CacheKey::new(PAGES, "10:0");
        assert_eq!(key.as_str(), "pages:10:0");
        assert_eq!(key.namespace(), PAGES);
    }

    #[test]
    fn tracking_key_is_outside_member_keys() {
        assert_eq!(PAGES.tracking_key(), "pages:_keys");
    }

    #[test]
    fn same_id_in_different_namespaces_differs() {
        let a = CacheKey::new(Namespace::new("a"), 1);
        let b = CacheKey::new(Namespace::new("b"), 1);
        assert_ne!(a, b);
    }
}
