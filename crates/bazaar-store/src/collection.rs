//! Cart and wishlist stores with a remote backend and a local fallback.
//!
//! Every operation is coordinated the same way: while the store is in
//! [`StoreMode::Remote`] it calls [`CollectionStore::try_remote`]; if that
//! fails for any reason the store downgrades for good and runs the same
//! logical operation once through [`CollectionStore::apply_local`].
//! Transport failures therefore never reach the caller. Local-store failures
//! do, and leave the cached snapshot untouched.
//!
//! Operations on one store are serialized by an async mutex, so a mode
//! transition and the cache write that follows it cannot interleave with
//! another call on the same instance.

use std::marker::PhantomData;
use std::sync::Arc;

use bazaar_core::{normalize_line_item, LineItem, UpstreamItem};
use tokio::sync::{watch, Mutex};

use crate::error::{StoreError, TransportError};
use crate::kind::{dedupe, merge_into, Cart, CollectionKind, Wishlist};
use crate::local::{read_items, write_items, LocalStore};
use crate::mode::{ModeState, StoreMode};
use crate::remote::{AddPayload, RemoteCollectionClient, RemovePayload, UpdatePayload};

pub type CartStore = CollectionStore<Cart>;
pub type WishlistStore = CollectionStore<Wishlist>;

/// One logical write, independent of which backend applies it.
#[derive(Debug, Clone)]
enum Mutation {
    Add(LineItem),
    SetQuantity(LineItem, i64),
    Remove(LineItem),
}

impl Mutation {
    fn name(&self) -> &'static str {
        match self {
            Mutation::Add(_) => "add",
            Mutation::SetQuantity(..) => "update_quantity",
            Mutation::Remove(_) => "remove",
        }
    }

    /// Applies the mutation to an in-memory collection.
    fn apply<K: CollectionKind>(&self, items: &mut Vec<LineItem>) {
        match self {
            Mutation::Add(item) => merge_into::<K>(items, item.clone()),
            Mutation::SetQuantity(item, quantity) => match target_quantity(*quantity) {
                Some(q) => {
                    if let Some(existing) = items.iter_mut().find(|i| i.id == item.id) {
                        existing.quantity = q;
                    }
                }
                None => items.retain(|i| i.id != item.id),
            },
            Mutation::Remove(item) => items.retain(|i| i.id != item.id),
        }
    }
}

/// Quantity a cart entry should end up with, or `None` if it should be
/// removed.
fn target_quantity(requested: i64) -> Option<u32> {
    (requested > 0).then(|| u32::try_from(requested).unwrap_or(u32::MAX))
}

/// Ordered collection of line items keyed by product id.
pub struct CollectionStore<K: CollectionKind> {
    remote: Option<RemoteCollectionClient>,
    local: Arc<dyn LocalStore>,
    mode: ModeState,
    /// Serializes operations on this instance.
    op_lock: Mutex<()>,
    /// Latest snapshot; also the subscriber channel.
    cache: watch::Sender<Vec<LineItem>>,
    _kind: PhantomData<K>,
}

impl<K: CollectionKind> CollectionStore<K> {
    /// Creates a store that starts in [`StoreMode::Remote`] if `remote` is
    /// `Some`, otherwise in [`StoreMode::LocalFallback`].
    #[must_use]
    pub fn new(remote: Option<RemoteCollectionClient>, local: Arc<dyn LocalStore>) -> Self {
        let mode = ModeState::new(remote.is_some());
        Self::with_mode(remote, local, mode)
    }

    /// Creates a store with an explicitly supplied mode state.
    ///
    /// A store without a remote client is always degraded, whatever `mode`
    /// says.
    #[must_use]
    pub fn with_mode(
        remote: Option<RemoteCollectionClient>,
        local: Arc<dyn LocalStore>,
        mode: ModeState,
    ) -> Self {
        if remote.is_none() {
            mode.downgrade();
        }
        let (cache, _) = watch::channel(Vec::new());
        Self {
            remote,
            local,
            mode,
            op_lock: Mutex::new(()),
            cache,
            _kind: PhantomData,
        }
    }

    #[must_use]
    pub fn mode(&self) -> StoreMode {
        self.mode.current()
    }

    /// `true` once the store runs on the local fallback.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.mode.is_degraded()
    }

    /// The most recent snapshot, without any I/O.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LineItem> {
        self.cache.borrow().clone()
    }

    /// Receives a new snapshot after every successful operation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<LineItem>> {
        self.cache.subscribe()
    }

    /// Loads the whole collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Local`] if the local store cannot be read.
    /// Remote failures are never returned.
    pub async fn fetch_all(&self) -> Result<Vec<LineItem>, StoreError> {
        let _guard = self.op_lock.lock().await;

        if let Some(remote) = self.active_remote() {
            match remote.fetch_items(K::ENDPOINT).await {
                Ok(items) => return Ok(self.publish(dedupe::<K>(items))),
                Err(err) => self.downgrade("fetch_all", &err),
            }
        }

        let items = read_items(self.local.as_ref(), K::STORAGE_KEY)?;
        Ok(self.publish(dedupe::<K>(items)))
    }

    /// Adds an item, merging with an existing entry of the same id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidItem`] if the item has no resolvable id.
    /// - [`StoreError::Local`] if the local fallback cannot be read or written.
    pub async fn add(&self, item: impl Into<UpstreamItem>) -> Result<Vec<LineItem>, StoreError> {
        let item = K::prepare(Self::normalize(item)?);
        self.coordinate(Mutation::Add(item)).await
    }

    /// Removes the entry with the item's id, if present.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidItem`] if the item has no resolvable id.
    /// - [`StoreError::Local`] if the local fallback cannot be read or written.
    pub async fn remove(&self, item: impl Into<UpstreamItem>) -> Result<Vec<LineItem>, StoreError> {
        let item = Self::normalize(item)?;
        self.coordinate(Mutation::Remove(item)).await
    }

    fn normalize(item: impl Into<UpstreamItem>) -> Result<LineItem, StoreError> {
        let item = normalize_line_item(item.into());
        if item.id.is_empty() {
            return Err(StoreError::InvalidItem {
                reason: format!("{} item has no product id", K::NAME),
            });
        }
        Ok(item)
    }

    fn active_remote(&self) -> Option<&RemoteCollectionClient> {
        match self.mode.current() {
            StoreMode::Remote => self.remote.as_ref(),
            StoreMode::LocalFallback => None,
        }
    }

    fn downgrade(&self, operation: &str, err: &TransportError) {
        if self.mode.downgrade() {
            tracing::warn!(
                collection = K::NAME,
                operation,
                error = %err,
                "remote collection call failed; switching to local fallback"
            );
        }
    }

    fn publish(&self, items: Vec<LineItem>) -> Vec<LineItem> {
        self.cache.send_replace(items.clone());
        items
    }

    /// Runs `mutation` remotely when possible, otherwise (or after a remote
    /// failure) exactly once against the local store.
    async fn coordinate(&self, mutation: Mutation) -> Result<Vec<LineItem>, StoreError> {
        let _guard = self.op_lock.lock().await;

        if let Some(remote) = self.active_remote() {
            match self.try_remote(remote, &mutation).await {
                Ok(items) => {
                    tracing::debug!(
                        collection = K::NAME,
                        operation = mutation.name(),
                        "remote write applied"
                    );
                    return Ok(self.publish(items));
                }
                Err(err) => self.downgrade(mutation.name(), &err),
            }
        }

        let items = self.apply_local(&mutation)?;
        tracing::debug!(
            collection = K::NAME,
            operation = mutation.name(),
            "local write applied"
        );
        Ok(self.publish(items))
    }

    /// Sends the write to the remote service, then re-reads the collection
    /// since the remote copy is authoritative after a successful write.
    async fn try_remote(
        &self,
        remote: &RemoteCollectionClient,
        mutation: &Mutation,
    ) -> Result<Vec<LineItem>, TransportError> {
        match mutation {
            Mutation::Add(item) => {
                remote
                    .post(K::ENDPOINT, "add", &AddPayload::new(item, K::TRACKS_QUANTITY))
                    .await?;
            }
            Mutation::SetQuantity(item, quantity) => match target_quantity(*quantity) {
                Some(q) => {
                    remote
                        .post(K::ENDPOINT, "update", &UpdatePayload::new(item, q))
                        .await?;
                }
                None => {
                    remote
                        .post(K::ENDPOINT, "remove", &RemovePayload::new(item))
                        .await?;
                }
            },
            Mutation::Remove(item) => {
                remote
                    .post(K::ENDPOINT, "remove", &RemovePayload::new(item))
                    .await?;
            }
        }
        let items = remote.fetch_items(K::ENDPOINT).await?;
        Ok(dedupe::<K>(items))
    }

    /// Applies the write to the local durable store.
    fn apply_local(&self, mutation: &Mutation) -> Result<Vec<LineItem>, StoreError> {
        let mut items = dedupe::<K>(read_items(self.local.as_ref(), K::STORAGE_KEY)?);
        mutation.apply::<K>(&mut items);
        write_items(self.local.as_ref(), K::STORAGE_KEY, &items)?;
        Ok(items)
    }
}

impl CollectionStore<Cart> {
    /// Sets the quantity of an existing cart entry. `quantity <= 0` removes
    /// it; ids not in the cart are left alone.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidItem`] if the item has no resolvable id.
    /// - [`StoreError::Local`] if the local fallback cannot be read or written.
    pub async fn update_quantity(
        &self,
        item: impl Into<UpstreamItem>,
        quantity: i64,
    ) -> Result<Vec<LineItem>, StoreError> {
        let item = Self::normalize(item)?;
        self.coordinate(Mutation::SetQuantity(item, quantity)).await
    }
}

#[cfg(test)]
#[path = "collection_test.rs"]
mod tests;
