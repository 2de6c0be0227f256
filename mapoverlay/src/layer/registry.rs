//! Shared bookkeeping for layer services.
//!
//! Both the plain and the clustering layer services keep one pending creation
//! per layer id. The first registration wins; later registrations with the
//! same id coalesce onto it instead of creating a second provider layer.

use std::future::Future;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use crate::error::{OverlayError, Result};
use crate::provider::{LayerHandle, ProviderError};

use super::id::LayerId;

/// Pending or resolved provider-side layer.
pub type SharedLayer<L> = Shared<BoxFuture<'static, std::result::Result<L, ProviderError>>>;

pub(crate) struct LayerRegistry<L: LayerHandle> {
    layers: DashMap<LayerId, SharedLayer<L>>,
}

impl<L: LayerHandle> LayerRegistry<L> {
    pub(crate) fn new() -> Self {
        Self {
            layers: DashMap::new(),
        }
    }

    /// Register `creation` for `id` unless the id is already registered.
    ///
    /// `creation` is only built for a new id.
    pub(crate) fn register<F, Fut>(&self, id: LayerId, creation: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<L, ProviderError>> + Send + 'static,
    {
        match self.layers.entry(id) {
            Entry::Occupied(_) => {
                debug!(layer_id = %id, "Layer already registered");
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(creation().boxed().shared());
                true
            }
        }
    }

    pub(crate) fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.layers.len()
    }

    pub(crate) fn future(&self, id: LayerId) -> Result<SharedLayer<L>> {
        self.layers
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(OverlayError::UnknownLayer(id))
    }

    /// Resolve the layer. The returned future does not borrow the registry.
    pub(crate) fn resolve(&self, id: LayerId) -> impl Future<Output = Result<L>> + Send + 'static {
        let pending = self.future(id);
        async move { Ok(pending?.await?) }
    }

    /// Unregister `id` and return its pending creation.
    pub(crate) fn remove(&self, id: LayerId) -> Result<SharedLayer<L>> {
        self.layers
            .remove(&id)
            .map(|(_, pending)| pending)
            .ok_or(OverlayError::UnknownLayer(id))
    }
}
