use crate::arg::Arg;
use crate::error::RedwireResult;
use crate::reply::Reply;
use std::collections::HashMap;

/// Key types the read path accepts. Each coerces to the key's canonical
/// binary encoding before comparison.
pub trait IntoKey {
    fn into_key(self) -> RedwireResult<Vec<u8>>;
}

impl IntoKey for Vec<u8> {
    fn into_key(self) -> RedwireResult<Vec<u8>> {
        Ok(self)
    }
}

impl IntoKey for &[u8] {
    fn into_key(self) -> RedwireResult<Vec<u8>> {
        Ok(self.to_vec())
    }
}

impl IntoKey for &str {
    fn into_key(self) -> RedwireResult<Vec<u8>> {
        Ok(Arg::from(self).encode())
    }
}

impl IntoKey for i64 {
    fn into_key(self) -> RedwireResult<Vec<u8>> {
        Ok(Arg::Int(self).encode())
    }
}

impl IntoKey for f64 {
    fn into_key(self) -> RedwireResult<Vec<u8>> {
        Ok(Arg::Float(self).encode())
    }
}

impl IntoKey for &Arg {
    fn into_key(self) -> RedwireResult<Vec<u8>> {
        Ok(self.encode())
    }
}

/// Fallible: only scalar replies make valid keys.
impl IntoKey for &Reply {
    fn into_key(self) -> RedwireResult<Vec<u8>> {
        Ok(Arg::try_from(self)?.encode())
    }
}

/// A map keyed by raw bytes whose read path coerces text, integer and float
/// keys to their canonical binary encoding before comparison, so `b"12"`,
/// `"12"` and `12i64` all name the same entry.
///
/// Deliberate asymmetry, kept from the behavior this models: only lookups
/// and membership tests coerce. [`insert`](CoercedKeyMap::insert) and
/// [`remove`](CoercedKeyMap::remove) take pre-encoded binary keys, so a
/// caller that inserts under a non-canonical encoding will not find the
/// entry again through a coerced lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercedKeyMap<V> {
    inner: HashMap<Vec<u8>, V>,
}

impl<V> CoercedKeyMap<V> {
    pub fn new() -> Self {
        CoercedKeyMap {
            inner: HashMap::new(),
        }
    }

    /// Insert under a binary key, with no coercion.
    pub fn insert(&mut self, key: Vec<u8>, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    /// Remove by binary key, with no coercion.
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        self.inner.remove(key)
    }

    /// Look up by any supported key kind.
    pub fn get(&self, key: impl IntoKey) -> RedwireResult<Option<&V>> {
        Ok(self.inner.get(&key.into_key()?))
    }

    /// Membership test by any supported key kind.
    pub fn contains_key(&self, key: impl IntoKey) -> RedwireResult<bool> {
        Ok(self.inner.contains_key(&key.into_key()?))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &V)> {
        self.inner.iter().map(|(k, v)| (k.as_slice(), v))
    }
}

impl<V> IntoIterator for CoercedKeyMap<V> {
    type Item = (Vec<u8>, V);
    type IntoIter = std::collections::hash_map::IntoIter<Vec<u8>, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RedwireError;

    #[test]
    fn test_lookup_coerces_text_and_int() {
        let mut map = CoercedKeyMap::new();
        map.insert(b"12".to_vec(), "twelve");
        assert_eq!(map.get(b"12".as_slice()).unwrap(), Some(&"twelve"));
        assert_eq!(map.get("12").unwrap(), Some(&"twelve"));
        assert_eq!(map.get(12i64).unwrap(), Some(&"twelve"));
        assert!(map.contains_key("12").unwrap());
        assert!(map.contains_key(12i64).unwrap());
    }

    #[test]
    fn test_lookup_coerces_float() {
        let mut map = CoercedKeyMap::new();
        map.insert(b"1.5".to_vec(), ());
        assert!(map.contains_key(1.5f64).unwrap());
    }

    #[test]
    fn test_missing_key() {
        let map: CoercedKeyMap<()> = CoercedKeyMap::new();
        assert_eq!(map.get("nope").unwrap(), None);
        assert!(!map.contains_key("nope").unwrap());
    }

    #[test]
    fn test_unsupported_key_kind_fails() {
        let mut map = CoercedKeyMap::new();
        map.insert(b"x".to_vec(), 1);
        let nested = Reply::array(vec![Reply::Int(1)]);
        let err = map.get(&nested).unwrap_err();
        assert!(matches!(err, RedwireError::UnsupportedArgument(_)));
    }

    #[test]
    fn test_insert_does_not_coerce() {
        // The write path stores whatever bytes it is handed; only reads
        // canonicalize. Callers own insert-side canonicalization.
        let mut map = CoercedKeyMap::new();
        map.insert(b"007".to_vec(), "bond");
        assert_eq!(map.get(7i64).unwrap(), None);
        assert_eq!(map.get("007").unwrap(), Some(&"bond"));
    }

    #[test]
    fn test_remove_is_binary_only() {
        let mut map = CoercedKeyMap::new();
        map.insert(b"k".to_vec(), 1);
        assert_eq!(map.remove(b"k"), Some(1));
        assert!(map.is_empty());
    }
}
