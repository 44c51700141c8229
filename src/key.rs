//! Cache key namespacing.

/// Builds store keys from caller keys.
///
/// With a prefix the format is `"{prefix}:{key}"`; without one the caller key
/// is used as is.
///
/// # Example
///
/// ```
/// use redis_cache_kit::key::CacheKeyBuilder;
///
/// let keys = CacheKeyBuilder::with_prefix("session");
/// assert_eq!(keys.build("abc"), "session:abc");
/// assert_eq!(keys.strip("session:abc"), Some("abc"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheKeyBuilder {
    prefix: Option<String>,
}

impl CacheKeyBuilder {
    /// Keys pass through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        CacheKeyBuilder {
            prefix: (!prefix.is_empty()).then_some(prefix),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn build(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    pub fn build_many(&self, keys: &[&str]) -> Vec<String> {
        keys.iter().map(|key| self.build(key)).collect()
    }

    /// Reverse of [`build`](Self::build); `None` if `store_key` lacks the prefix.
    pub fn strip<'a>(&self, store_key: &'a str) -> Option<&'a str> {
        match &self.prefix {
            Some(prefix) => store_key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':')),
            None => Some(store_key),
        }
    }
}
