//! EqualToMap: hash-indexed map whose key matching goes through `EqualTo`.

use crate::equal_to::EqualTo;
use crate::error::KeyNotFound;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;
use std::collections::HashMap;

/// Stable reference to an entry of an [`EqualToMap`]. Becomes stale once the
/// entry is removed; a stale handle never resolves to a later entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }

    /// The stored key object, exactly as it was inserted.
    pub fn key<'a, K, V, S>(&self, map: &'a EqualToMap<K, V, S>) -> Option<&'a K> {
        map.slots.get(self.0).map(|e| &e.key)
    }

    pub fn value<'a, K, V, S>(&self, map: &'a EqualToMap<K, V, S>) -> Option<&'a V> {
        map.slots.get(self.0).map(|e| &e.value)
    }

    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut EqualToMap<K, V, S>) -> Option<&'a mut V> {
        map.slots.get_mut(self.0).map(|e| &mut e.value)
    }
}

#[derive(Debug, Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

/// A map that places keys by `Hash` and matches them by [`EqualTo`].
///
/// Two keys denote the same entry iff their hashes are equal and the stored
/// key reports `equal_to` the query. Neither `PartialEq` nor `Eq` is required
/// of `K`, and the map never calls them. Keys that collide on hash without
/// being `EqualTo` each other are stored side by side.
#[derive(Clone)]
pub struct EqualToMap<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
}

impl<K, V> EqualToMap<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, V> Default for EqualToMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> EqualToMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::with_capacity(capacity),
            slots: SlotMap::with_capacity_and_key(capacity),
        }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
    }

    /// Entries in storage order. Without removals this is insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.slots.values().map(|e| &e.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.slots.values().map(|e| &e.value)
    }

    pub fn remove_handle(&mut self, handle: Handle) -> Option<(K, V)> {
        let k = handle.raw_handle();
        let entry = self.slots.remove(k)?;
        if let Ok(occupied) = self.index.find_entry(entry.hash, |&kk| kk == k) {
            occupied.remove();
        }
        Some((entry.key, entry.value))
    }
}

impl<K, V, S> EqualToMap<K, V, S>
where
    K: Hash,
    S: BuildHasher,
{
    /// Builds a map from `(key, value)` pairs. A later pair whose key is
    /// `EqualTo` an earlier one overwrites that entry's value.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: EqualTo,
        S: Default,
    {
        let mut map = Self::with_hasher(S::default());
        map.extend(pairs);
        tracing::trace!(len = map.len(), "built EqualToMap from pairs");
        map
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Slot of the first stored key with the same hash as `q` that reports
    /// `equal_to(q)`. `EqualTo` runs only on full-hash matches.
    fn probe<Q>(&self, hash: u64, q: &Q) -> Option<DefaultKey>
    where
        K: EqualTo<Q>,
        Q: ?Sized,
    {
        let slots = &self.slots;
        self.index
            .find(hash, |&k| {
                slots
                    .get(k)
                    .map(|e| e.hash == hash && e.key.equal_to(q))
                    .unwrap_or(false)
            })
            .copied()
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: EqualTo<Q>,
        Q: ?Sized + Hash,
    {
        let hash = self.make_hash(q);
        self.probe(hash, q).map(Handle::new)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: EqualTo<Q>,
        Q: ?Sized + Hash,
    {
        self.find(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: EqualTo<Q>,
        Q: ?Sized + Hash,
    {
        let k = self.probe(self.make_hash(q), q)?;
        self.slots.get(k).map(|e| &e.value)
    }

    /// Like [`get`](Self::get), reporting a miss as [`KeyNotFound`].
    pub fn try_get<Q>(&self, q: &Q) -> Result<&V, KeyNotFound>
    where
        K: EqualTo<Q>,
        Q: ?Sized + Hash,
    {
        let hash = self.make_hash(q);
        self.probe(hash, q)
            .and_then(|k| self.slots.get(k))
            .map(|e| &e.value)
            .ok_or(KeyNotFound { hash })
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: EqualTo<Q>,
        Q: ?Sized + Hash,
    {
        let k = self.probe(self.make_hash(q), q)?;
        self.slots.get_mut(k).map(|e| &mut e.value)
    }

    /// The stored key object equivalent to `q`.
    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: EqualTo<Q>,
        Q: ?Sized + Hash,
    {
        let k = self.probe(self.make_hash(q), q)?;
        self.slots.get(k).map(|e| (&e.key, &e.value))
    }

    /// Inserts `value` under `key`. If an equivalent key is already stored,
    /// its value is replaced and returned; the stored key object is kept.
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: EqualTo,
    {
        let hash = self.make_hash(&key);
        if let Some(k) = self.probe(hash, &key) {
            tracing::trace!(hash, "EqualToMap insert replaced existing value");
            return self
                .slots
                .get_mut(k)
                .map(|e| core::mem::replace(&mut e.value, value));
        }
        let k = self.slots.insert(Entry { key, value, hash });
        let slots = &self.slots;
        self.index.insert_unique(hash, k, |&kk| {
            slots.get(kk).map(|e| e.hash).unwrap_or(0)
        });
        None
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: EqualTo<Q>,
        Q: ?Sized + Hash,
    {
        let k = self.probe(self.make_hash(q), q)?;
        self.remove_handle(Handle::new(k))
    }

    /// A conventional `HashMap` holding clones of the stored key objects and
    /// values. From here on `K`'s native `Eq` governs lookups.
    pub fn raw(&self) -> HashMap<K, V, S>
    where
        K: Eq + Clone,
        V: Clone,
        S: Clone,
    {
        let mut out = HashMap::with_capacity_and_hasher(self.len(), self.hasher.clone());
        for e in self.slots.values() {
            out.insert(e.key.clone(), e.value.clone());
        }
        out
    }

    /// Consuming form of [`raw`](Self::raw); moves keys and values out.
    pub fn into_raw(self) -> HashMap<K, V, S>
    where
        K: Eq,
    {
        let mut out = HashMap::with_capacity_and_hasher(self.slots.len(), self.hasher);
        for (_, e) in self.slots {
            out.insert(e.key, e.value);
        }
        out
    }
}

impl<K, V, S> core::fmt::Debug for EqualToMap<K, V, S>
where
    K: core::fmt::Debug,
    V: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for EqualToMap<K, V, S>
where
    K: Hash + EqualTo,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for EqualToMap<K, V, S>
where
    K: Hash + EqualTo,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<K, V, S, Q> Index<&Q> for EqualToMap<K, V, S>
where
    K: Hash + EqualTo<Q>,
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, q: &Q) -> &V {
        match self.try_get(q) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

/// Iterator over immutable entries in `EqualToMap`.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Iterator over mutable entries in `EqualToMap`.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K, V, S> IntoIterator for &'a EqualToMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::hash::Hasher;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        } // force all keys into the same hash bucket
    }

    /// Invariant: inserting an equivalent key replaces the value and keeps
    /// the original key object.
    #[test]
    fn insert_replaces_value_keeps_key() {
        #[derive(Debug, Clone)]
        struct Tagged {
            id: u32,
            tag: &'static str,
        }
        impl Hash for Tagged {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
        impl EqualTo for Tagged {
            fn equal_to(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        let mut m: EqualToMap<Tagged, i32> = EqualToMap::new();
        assert_eq!(m.insert(Tagged { id: 1, tag: "first" }, 1), None);
        assert_eq!(m.insert(Tagged { id: 1, tag: "second" }, 2), Some(1));
        assert_eq!(m.len(), 1);
        let (k, v) = m.get_key_value(&Tagged { id: 1, tag: "query" }).unwrap();
        assert_eq!(k.tag, "first");
        assert_eq!(*v, 2);
    }

    /// Invariant: `find(k).is_some() == contains_key(k)` for present/absent keys.
    #[test]
    fn find_contains_parity() {
        let m: EqualToMap<String, i32> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, k)| (k.to_string(), i as i32))
            .collect();

        for k in ["a", "b", "c"] {
            assert!(m.find(k).is_some());
            assert!(m.contains_key(k));
        }
        for k in ["x", "y", "z"] {
            assert!(m.find(k).is_none());
            assert!(!m.contains_key(k));
        }
    }

    /// Invariant: entries sharing a hash but not `EqualTo` each other coexist
    /// and resolve to their own values.
    #[test]
    fn collision_handling_with_const_hasher() {
        let mut m: EqualToMap<String, i32, ConstBuildHasher> =
            EqualToMap::with_hasher(ConstBuildHasher);
        m.insert("a".to_string(), 1);
        m.insert("b".to_string(), 2);

        let ha = m.find("a").expect("find a");
        let hb = m.find("b").expect("find b");
        assert_ne!(ha, hb);
        assert_eq!(ha.value(&m), Some(&1));
        assert_eq!(hb.value(&m), Some(&2));
        assert!(!m.contains_key("c"));
    }

    /// Invariant: `EqualTo` is consulted only for candidates whose full hash
    /// matches the query.
    #[test]
    fn equal_to_runs_only_on_full_hash_match() {
        thread_local! {
            static CALLS: Cell<u32> = const { Cell::new(0) };
        }
        struct Counted(u64);
        impl Hash for Counted {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }
        impl EqualTo for Counted {
            fn equal_to(&self, other: &Self) -> bool {
                CALLS.with(|c| c.set(c.get() + 1));
                self.0 == other.0
            }
        }

        let mut m: EqualToMap<Counted, ()> = EqualToMap::new();
        for i in 0..64 {
            m.insert(Counted(i), ());
        }
        CALLS.with(|c| c.set(0));
        assert!(m.contains_key(&Counted(7)));
        assert_eq!(CALLS.with(Cell::get), 1);
        CALLS.with(|c| c.set(0));
        assert!(!m.contains_key(&Counted(1000)));
        assert_eq!(CALLS.with(Cell::get), 0);
    }

    /// Invariant: removal by key or handle unlinks the entry; the handle goes
    /// stale and does not alias a later entry.
    #[test]
    fn remove_invalidates_handle() {
        let mut m: EqualToMap<String, i32> = EqualToMap::new();
        m.insert("old".to_string(), 1);
        let h1 = m.find("old").unwrap();
        assert_eq!(m.remove("old"), Some(("old".to_string(), 1)));
        assert!(h1.value(&m).is_none());
        assert_eq!(m.remove("old"), None);

        m.insert("new".to_string(), 2);
        let h2 = m.find("new").unwrap();
        assert_ne!(h1, h2);
        assert!(h1.key(&m).is_none());
        assert_eq!(m.remove_handle(h2), Some(("new".to_string(), 2)));
        assert!(m.is_empty());
    }

    /// Invariant: `try_get` reports a miss with the query's hash.
    #[test]
    fn try_get_reports_key_not_found() {
        let m: EqualToMap<String, i32, ConstBuildHasher> = EqualToMap::with_hasher(ConstBuildHasher);
        let err = m.try_get("missing").unwrap_err();
        assert_eq!(err, KeyNotFound { hash: 0 });
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn index_panics_on_miss() {
        let m: EqualToMap<String, i32> = EqualToMap::new();
        let _v: i32 = m["missing"];
    }

    /// Invariant: mutation through `get_mut`, `iter_mut` and handles is
    /// visible to later lookups.
    #[test]
    fn mutation_paths_agree() {
        let mut m: EqualToMap<&'static str, i32> =
            EqualToMap::from_pairs([("k1", 0), ("k2", 1)]);
        *m.get_mut(&"k1").unwrap() += 5;
        for (_, v) in m.iter_mut() {
            *v += 10;
        }
        let h = m.find(&"k2").unwrap();
        *h.value_mut(&mut m).unwrap() += 100;
        assert_eq!(m[&"k1"], 15);
        assert_eq!(m[&"k2"], 111);
        let keys: Vec<_> = m.keys().copied().collect();
        assert_eq!(keys, vec!["k1", "k2"]);
    }

    /// Invariant: `len()` counts distinct entries; replacing a value does not
    /// change it, `clear` empties the map.
    #[test]
    fn len_and_clear() {
        let mut m: EqualToMap<u32, u32> = EqualToMap::with_capacity(4);
        assert!(m.is_empty());
        m.insert(1, 1);
        m.insert(1, 2);
        m.insert(2, 2);
        assert_eq!(m.len(), 2);
        m.clear();
        assert!(m.is_empty());
        assert!(!m.contains_key(&1));
    }
}
