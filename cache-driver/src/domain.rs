use std::fmt;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InvalidKey {
    #[error("cache key must not be empty")]
    Empty,
}

/// Non-empty cache key. Emptiness is rejected here so drivers never see it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Result<Self, InvalidKey> {
        let key = key.into();
        if key.is_empty() {
            return Err(InvalidKey::Empty);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CacheKey {
    type Error = InvalidKey;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for CacheKey {
    type Error = InvalidKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque payload stored under a key
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CacheValue(Vec<u8>);

impl CacheValue {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for CacheValue {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for CacheValue {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for CacheValue {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

/// Backend health as published on a client's notification channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionHealth {
    Healthy,
    Unreachable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_rejected() {
        assert_eq!(CacheKey::new(""), Err(InvalidKey::Empty));
        assert!(CacheKey::try_from(String::new()).is_err());
    }

    #[test]
    fn test_key_roundtrips_as_str() {
        let key = CacheKey::try_from("test_key").unwrap();
        assert_eq!(key.as_str(), "test_key");
        assert_eq!(key.to_string(), "test_key");
    }

    #[test]
    fn test_value_conversions() {
        let value = CacheValue::from("test_value");
        assert_eq!(value.as_bytes(), b"test_value");
        assert_eq!(value.len(), 10);
        assert_eq!(CacheValue::from(String::from("x")).into_bytes(), b"x".to_vec());
        assert!(CacheValue::default().is_empty());
    }
}
