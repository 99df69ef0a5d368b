//! Keyed service container with lazy, memoized instantiation.

use crate::error::{DiError, DiResult};
use crate::key::DiKey;
use futures::future::{self, BoxFuture, FutureExt};
use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::OnceCell;
use tracing::debug;

type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Instance>> + Send + Sync>;

struct Registration {
    type_name: &'static str,
    factory: Factory,
    /// Claimed by the first `get`; concurrent callers wait on the same init.
    instance: OnceCell<Instance>,
}

impl Registration {
    fn lazy(type_name: &'static str, factory: Factory) -> Self {
        Self {
            type_name,
            factory,
            instance: OnceCell::new(),
        }
    }
}

/// Registry of named service factories with singleton-per-key semantics.
///
/// - `register*` is first-wins: a duplicate key is ignored.
/// - `get` invokes the factory at most once per key, even under concurrent
///   first access, and memoizes the result.
/// - A failing factory is not memoized; the next `get` retries it.
///
/// The map lock is never held across a factory invocation.
#[derive(Default)]
pub struct Container {
    entries: RwLock<HashMap<DiKey, Arc<Registration>>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    // ================================================================
    // Registration
    // ================================================================

    /// Registers a synchronous factory. Returns `false` if `key` was already
    /// registered, in which case the existing registration is kept.
    pub fn register<T, F>(&self, key: impl Into<DiKey>, factory: F) -> bool
    where
        T: Any + Send + Sync,
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || {
            let result = factory().map(|value| Arc::new(value) as Instance);
            future::ready(result).boxed()
        });
        self.insert(
            key.into(),
            Registration::lazy(std::any::type_name::<T>(), factory),
            false,
        )
    }

    /// Registers an asynchronous factory. Same first-wins contract as
    /// [`register`](Self::register).
    pub fn register_async<T, F, Fut>(&self, key: impl Into<DiKey>, factory: F) -> bool
    where
        T: Any + Send + Sync,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let factory: Factory = Arc::new(move || {
            let pending = factory();
            async move { pending.await.map(|value| Arc::new(value) as Instance) }.boxed()
        });
        self.insert(
            key.into(),
            Registration::lazy(std::any::type_name::<T>(), factory),
            false,
        )
    }

    /// Registers an already constructed instance.
    pub fn register_instance<T>(&self, key: impl Into<DiKey>, value: T) -> bool
    where
        T: Any + Send + Sync,
    {
        self.insert(key.into(), Self::eager(value), false)
    }

    /// Registers `factory` under `key`, discarding any existing registration
    /// and its memoized instance. This is the only way to override a key.
    pub fn replace<T, F>(&self, key: impl Into<DiKey>, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || {
            let result = factory().map(|value| Arc::new(value) as Instance);
            future::ready(result).boxed()
        });
        self.insert(
            key.into(),
            Registration::lazy(std::any::type_name::<T>(), factory),
            true,
        );
    }

    /// Registers a factory keyed by the service type `T`.
    pub fn register_type<T, F>(&self, factory: F) -> bool
    where
        T: Any + Send + Sync,
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.register(DiKey::of::<T>(), factory)
    }

    fn eager<T: Any + Send + Sync>(value: T) -> Registration {
        let instance: Instance = Arc::new(value);
        let shared = Arc::clone(&instance);
        let factory: Factory = Arc::new(move || future::ready(Ok(Arc::clone(&shared))).boxed());
        Registration {
            type_name: std::any::type_name::<T>(),
            factory,
            instance: OnceCell::new_with(Some(instance)),
        }
    }

    fn insert(&self, key: DiKey, registration: Registration, replace: bool) -> bool {
        let mut entries = self.write();
        match entries.entry(key) {
            MapEntry::Occupied(mut existing) if replace => {
                debug!(key = %existing.key(), "replacing dependency registration");
                existing.insert(Arc::new(registration));
                true
            }
            MapEntry::Occupied(existing) => {
                debug!(
                    key = %existing.key(),
                    "dependency already registered, keeping first registration"
                );
                false
            }
            MapEntry::Vacant(slot) => {
                debug!(key = %slot.key(), type_name = registration.type_name, "dependency registered");
                slot.insert(Arc::new(registration));
                true
            }
        }
    }

    // ================================================================
    // Resolution
    // ================================================================

    /// Resolves the service under `key`, instantiating it on first access.
    pub async fn get<T>(&self, key: impl Into<DiKey>) -> DiResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let key = key.into();
        let registration = self.registration(&key)?;
        let instance = registration
            .instance
            .get_or_try_init(|| (registration.factory)())
            .await
            .map_err(|source| DiError::FactoryFailed {
                key: key.to_string(),
                source,
            })?;
        Self::downcast(&key, &registration, Arc::clone(instance))
    }

    /// Resolves the service keyed by its type `T`.
    pub async fn get_type<T>(&self) -> DiResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.get(DiKey::of::<T>()).await
    }

    /// Returns the memoized instance without invoking the factory.
    ///
    /// `Ok(None)` means the key is registered but has not been instantiated.
    pub fn try_get<T>(&self, key: impl Into<DiKey>) -> DiResult<Option<Arc<T>>>
    where
        T: Any + Send + Sync,
    {
        let key = key.into();
        let registration = self.registration(&key)?;
        match registration.instance.get() {
            Some(instance) => Self::downcast(&key, &registration, Arc::clone(instance)).map(Some),
            None => Ok(None),
        }
    }

    fn registration(&self, key: &DiKey) -> DiResult<Arc<Registration>> {
        self.read()
            .get(key)
            .cloned()
            .ok_or_else(|| DiError::NotRegistered {
                key: key.to_string(),
            })
    }

    fn downcast<T: Any + Send + Sync>(
        key: &DiKey,
        registration: &Registration,
        instance: Instance,
    ) -> DiResult<Arc<T>> {
        instance.downcast::<T>().map_err(|_| DiError::TypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
            actual: registration.type_name,
        })
    }

    // ================================================================
    // Introspection / teardown
    // ================================================================

    pub fn contains(&self, key: impl Into<DiKey>) -> bool {
        self.read().contains_key(&key.into())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered keys, in no particular order.
    pub fn keys(&self) -> Vec<DiKey> {
        self.read().keys().cloned().collect()
    }

    /// Removes one registration. Instances already handed out stay alive
    /// with their holders.
    pub fn unregister(&self, key: impl Into<DiKey>) -> bool {
        self.write().remove(&key.into()).is_some()
    }

    /// Drops every registration.
    pub fn reset(&self) {
        let mut entries = self.write();
        debug!(count = entries.len(), "resetting container");
        entries.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<DiKey, Arc<Registration>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DiKey, Arc<Registration>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("keys", &self.keys())
            .finish()
    }
}
