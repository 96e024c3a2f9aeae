// Process-wide, type-indexed registry of (multi-pool, mutex) pairs.
//
// spec.md's design notes ask for exactly this: "a lazily-initialized,
// type-indexed registry of (multi-pool, mutex) pairs; initialization is
// guarded so that the first handle construction for a type wins." A `static`
// item cannot reference the generic parameters of an enclosing generic
// function on stable Rust, so there is no way to get the compiler to mint a
// separate `static` per `(T, W)` instantiation. Instead, the first lookup
// for a given `(T, W)` leaks a `Box<Mutex<MultiPool<T, W>>>` into a
// `'static` reference (consistent with "lives for process lifetime") and
// files it in a `TypeId`-keyed map behind one outer registry mutex. Every
// later lookup for that `(T, W)` only touches the outer mutex long enough to
// clone the reference out of the map; the hot allocate/deallocate path never
// takes it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use super::bitword::BitWord;
use super::multi_pool::MultiPool;

type RegistryEntry = &'static (dyn Any + Send + Sync);

static REGISTRY: OnceLock<Mutex<HashMap<TypeId, RegistryEntry>>> = OnceLock::new();

/// Returns the process-wide `MultiPool` for `(T, W)`, creating it (and its
/// first block) on the first call for that pair.
pub(crate) fn singleton<T, W>() -> &'static Mutex<MultiPool<T, W>>
where
    T: Send + 'static,
    W: BitWord,
{
    let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
    let key = TypeId::of::<(T, W)>();

    let mut entries = registry.lock().expect("pool type registry mutex poisoned");
    if let Some(existing) = entries.get(&key) {
        return existing
            .downcast_ref::<Mutex<MultiPool<T, W>>>()
            .expect("pool type registry entry had an unexpected concrete type");
    }

    let entry: &'static Mutex<MultiPool<T, W>> = Box::leak(Box::new(Mutex::new(MultiPool::new())));
    entries.insert(key, entry);
    entry
}
