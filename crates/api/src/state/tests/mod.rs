// Path: crates/api/src/state/tests/mod.rs
use crate::state::{
    prefix_upper_bound, registry_namespace_prefix, NamespacedStateAccess,
    ReadOnlyNamespacedStateAccess, StateAccess, StateKVPair, StateOverlay, StateScanIter,
};
use qgov_types::error::StateError;
use std::collections::BTreeMap;
use std::sync::Arc;

// Mock store: an ordered map, enough to exercise the wrappers.
#[derive(Debug, Clone, Default)]
struct MockStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl StateAccess for MockStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.data.get(key).cloned())
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.data.remove(key);
        Ok(())
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        for key in deletes {
            self.delete(key)?;
        }
        for (key, value) in inserts {
            self.insert(key, value)?;
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let results: Vec<Result<StateKVPair, StateError>> = self
            .data
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| Ok((Arc::from(k.as_slice()), Arc::from(v.as_slice()))))
            .collect();
        Ok(Box::new(results.into_iter()))
    }
}

fn collect_keys(iter: StateScanIter<'_>) -> Vec<Vec<u8>> {
    iter.map(|r| r.unwrap().0.to_vec()).collect()
}

#[test]
fn overlay_reads_its_own_writes_and_leaves_base_alone() {
    let mut base = MockStore::default();
    base.insert(b"entity::a", b"1").unwrap();
    base.insert(b"entity::b", b"2").unwrap();

    let mut overlay = StateOverlay::new(&base);
    overlay.insert(b"entity::a", b"10").unwrap();
    overlay.delete(b"entity::b").unwrap();
    overlay.insert(b"entity::c", b"3").unwrap();

    assert_eq!(overlay.get(b"entity::a").unwrap(), Some(b"10".to_vec()));
    assert_eq!(overlay.get(b"entity::b").unwrap(), None);
    assert_eq!(base.get(b"entity::a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(overlay.pending_writes(), 3);

    let changes = overlay.into_change_set();
    assert_eq!(
        changes.puts,
        vec![
            (b"entity::a".to_vec(), b"10".to_vec()),
            (b"entity::c".to_vec(), b"3".to_vec())
        ]
    );
    assert_eq!(changes.removes, vec![b"entity::b".to_vec()]);
}

#[test]
fn overlay_scan_merges_pending_writes_in_key_order() {
    let mut base = MockStore::default();
    base.insert(b"proposal::1", b"base-1").unwrap();
    base.insert(b"proposal::3", b"base-3").unwrap();
    base.insert(b"proposal::4", b"base-4").unwrap();
    base.insert(b"vote::1", b"other").unwrap();

    let mut overlay = StateOverlay::new(&base);
    overlay.insert(b"proposal::2", b"new-2").unwrap();
    overlay.insert(b"proposal::3", b"new-3").unwrap();
    overlay.delete(b"proposal::4").unwrap();

    let pairs: Vec<(Vec<u8>, Vec<u8>)> = overlay
        .prefix_scan(b"proposal::")
        .unwrap()
        .map(|r| {
            let (k, v) = r.unwrap();
            (k.to_vec(), v.to_vec())
        })
        .collect();
    assert_eq!(
        pairs,
        vec![
            (b"proposal::1".to_vec(), b"base-1".to_vec()),
            (b"proposal::2".to_vec(), b"new-2".to_vec()),
            (b"proposal::3".to_vec(), b"new-3".to_vec()),
        ]
    );
}

#[test]
fn namespaces_isolate_registries() {
    let mut store = MockStore::default();
    {
        let mut field = NamespacedStateAccess::new(&mut store, registry_namespace_prefix("field"));
        field.insert(b"entity::x", b"field-x").unwrap();
    }
    {
        let mut zone = NamespacedStateAccess::new(&mut store, registry_namespace_prefix("zone"));
        assert_eq!(zone.get(b"entity::x").unwrap(), None);
        zone.insert(b"entity::x", b"zone-x").unwrap();
    }

    assert_eq!(
        store.get(b"_registry::field::entity::x").unwrap(),
        Some(b"field-x".to_vec())
    );
    assert_eq!(
        store.get(b"_registry::zone::entity::x").unwrap(),
        Some(b"zone-x".to_vec())
    );
}

#[test]
fn namespaced_scan_returns_relative_keys() {
    let mut store = MockStore::default();
    store.insert(b"_registry::field::entity::a", b"1").unwrap();
    store.insert(b"_registry::field::entity::b", b"2").unwrap();
    store.insert(b"_registry::fieldx::entity::c", b"3").unwrap();

    let view = ReadOnlyNamespacedStateAccess::new(&store, registry_namespace_prefix("field"));
    let keys = collect_keys(view.prefix_scan(b"entity::").unwrap());
    assert_eq!(keys, vec![b"entity::a".to_vec(), b"entity::b".to_vec()]);
}

#[test]
fn raw_registry_keys_are_refused() {
    let mut store = MockStore::default();
    let mut ns = NamespacedStateAccess::new(&mut store, registry_namespace_prefix("field"));
    let err = ns.insert(b"_registry::zone::entity::x", b"evil").unwrap_err();
    assert!(matches!(err, StateError::PermissionDenied(_)));
}

#[test]
fn read_only_view_rejects_writes() {
    let store = MockStore::default();
    let mut view = ReadOnlyNamespacedStateAccess::new(&store, registry_namespace_prefix("field"));
    assert!(matches!(
        view.insert(b"entity::a", b"1"),
        Err(StateError::PermissionDenied(_))
    ));
    assert!(matches!(
        view.batch_apply(&[], &[b"entity::a".to_vec()]),
        Err(StateError::PermissionDenied(_))
    ));
}

#[test]
fn namespace_over_overlay_commits_as_one_batch() {
    let mut store = MockStore::default();
    let changes = {
        let mut overlay = StateOverlay::new(&store);
        {
            let mut ns = NamespacedStateAccess::new(&mut overlay, registry_namespace_prefix("duality"));
            ns.insert(b"entity::photon", b"wave").unwrap();
            ns.insert(b"proposal::p", b"open").unwrap();
        }
        overlay.into_change_set()
    };
    assert!(store.get(b"_registry::duality::entity::photon").unwrap().is_none());

    assert_eq!(changes.puts.len(), 2);
    changes.commit_to(&mut store).unwrap();
    assert_eq!(
        store.get(b"_registry::duality::entity::photon").unwrap(),
        Some(b"wave".to_vec())
    );
}

mod prop {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn overlay_scan_matches_a_committed_store(
            base_entries in proptest::collection::btree_map(0u8..16, any::<u8>(), 0..12),
            ops in proptest::collection::vec((0u8..16, proptest::option::of(any::<u8>())), 0..24),
        ) {
            let mut base = MockStore::default();
            for (k, v) in &base_entries {
                base.insert(&[b'k', *k], &[*v]).unwrap();
            }

            let mut overlay = StateOverlay::new(&base);
            for (k, v) in &ops {
                match v {
                    Some(v) => overlay.insert(&[b'k', *k], &[*v]).unwrap(),
                    None => overlay.delete(&[b'k', *k]).unwrap(),
                }
            }
            let merged: Vec<(Vec<u8>, Vec<u8>)> = overlay
                .prefix_scan(b"k")
                .unwrap()
                .map(|r| { let (k, v) = r.unwrap(); (k.to_vec(), v.to_vec()) })
                .collect();

            let changes = overlay.into_change_set();
            let mut committed = base.clone();
            changes.commit_to(&mut committed).unwrap();
            let expected: Vec<(Vec<u8>, Vec<u8>)> = committed
                .data
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();

            prop_assert_eq!(merged, expected);
        }
    }
}

#[test]
fn upper_bound_skips_trailing_ff() {
    assert_eq!(prefix_upper_bound(b"ab"), Some(b"ac".to_vec()));
    assert_eq!(prefix_upper_bound(&[0x01, 0xFF]), Some(vec![0x02]));
    assert_eq!(prefix_upper_bound(&[0xFF, 0xFF]), None);
    assert_eq!(prefix_upper_bound(b""), None);
}
