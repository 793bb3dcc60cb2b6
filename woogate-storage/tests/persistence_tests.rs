//! Persistence round-trip and restart tests for identifier maps.

use proptest::prelude::*;
use tempfile::tempdir;
use woogate_storage::{MapStore, PersistentIdCache, CATEGORY_MAP_FILE, PRODUCT_MAP_FILE};
use woogate_test_utils::generators::arb_id_map;
use woogate_test_utils::IdMap;

proptest! {
    #[test]
    fn prop_save_then_load_is_identity(map in arb_id_map()) {
        let dir = tempdir().expect("tempdir");
        let store = MapStore::new(dir.path().join(CATEGORY_MAP_FILE));

        store.try_save(&map).expect("save");
        prop_assert_eq!(store.try_load().expect("load"), Some(map));
    }

    #[test]
    fn prop_persistent_cache_survives_restart(map in arb_id_map()) {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(PRODUCT_MAP_FILE);

        let cache = PersistentIdCache::open(MapStore::new(&path));
        cache.replace_all(map.clone());
        drop(cache);

        let reopened = PersistentIdCache::open(MapStore::new(&path));
        prop_assert_eq!(&*reopened.snapshot(), &map);
    }
}

#[test]
fn empty_map_round_trips() {
    let dir = tempdir().expect("tempdir");
    let store = MapStore::new(dir.path().join(CATEGORY_MAP_FILE));

    store.save(&IdMap::new());
    assert_eq!(store.try_load().expect("load"), Some(IdMap::new()));
}

#[test]
fn category_and_product_maps_are_independent() {
    let dir = tempdir().expect("tempdir");
    let categories = PersistentIdCache::open(MapStore::new(dir.path().join(CATEGORY_MAP_FILE)));
    let products = PersistentIdCache::open(MapStore::new(dir.path().join(PRODUCT_MAP_FILE)));

    categories.record([("Widgets".to_string(), 7)]);
    products.record([("ABC-123".to_string(), 42), ("ABC Widget".to_string(), 42)]);

    assert_eq!(categories.len(), 1);
    assert_eq!(products.len(), 2);
    assert_eq!(products.lookup("Widgets"), None);

    let reloaded = MapStore::new(dir.path().join(PRODUCT_MAP_FILE)).load();
    assert_eq!(reloaded.get("ABC Widget"), Some(&42));
}

#[test]
fn concurrent_records_all_land_on_disk() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(PRODUCT_MAP_FILE);
    let cache = std::sync::Arc::new(PersistentIdCache::open(MapStore::new(&path)));

    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let cache = std::sync::Arc::clone(&cache);
            std::thread::spawn(move || cache.record([(format!("SKU-{i}"), i + 1)]))
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread");
    }

    let on_disk = MapStore::new(&path).load();
    assert_eq!(on_disk.len(), 8);
    assert_eq!(on_disk, *cache.snapshot());
}
