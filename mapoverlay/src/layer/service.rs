//! Provider-agnostic layer service.
//!
//! A layer is registered once per id with [`LayerService::add_layer`]. The
//! provider-side layer is represented by a shared future: every caller that
//! asks for the native layer awaits the same creation, and entity mutations
//! are expressed as continuations of that future. The future resolves once
//! the provider has materialised the layer, which may be long after
//! registration if the map SDK is still loading. Creation starts when the
//! future is first awaited.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::provider::{EntityOf, EventKind, EventSource, EventStream, LayerHandle, MapProvider};

use super::id::LayerId;
use super::options::{LayerOptions, LayerPatch};
use super::registry::{LayerRegistry, SharedLayer};

/// Owns the plain (non-clustering) layers of one provider.
pub struct LayerService<P: MapProvider> {
    provider: Arc<P>,
    registry: LayerRegistry<P::Layer>,
}

impl<P: MapProvider> LayerService<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            registry: LayerRegistry::new(),
        }
    }

    /// Register a layer. Idempotent per id: a second call with the same id
    /// keeps the first registration and returns `false`.
    pub fn add_layer(&self, options: LayerOptions) -> bool {
        let id = options.id;
        self.registry.register(id, || {
            let provider = Arc::clone(&self.provider);
            async move {
                let layer = provider.create_layer(options).await?;
                info!(layer_id = %id, provider = provider.name(), "Layer materialised");
                Ok(layer)
            }
        })
    }

    pub fn has_layer(&self, id: LayerId) -> bool {
        self.registry.contains(id)
    }

    pub fn layer_count(&self) -> usize {
        self.registry.len()
    }

    /// The shared creation future for `id`, for callers that chain several
    /// continuations off the same layer.
    pub fn layer_future(&self, id: LayerId) -> Result<SharedLayer<P::Layer>> {
        self.registry.future(id)
    }

    /// Resolve the provider-side layer, waiting for the provider if needed.
    pub fn get_native_layer(&self, id: LayerId) -> impl Future<Output = Result<P::Layer>> + Send {
        self.registry.resolve(id)
    }

    /// Replace the entities of a layer in one step.
    pub async fn set_entities(&self, id: LayerId, entities: Vec<EntityOf<P>>) -> Result<()> {
        let layer = self.get_native_layer(id).await?;
        debug!(layer_id = %id, count = entities.len(), "Replacing layer entities");
        layer.set_entities(entities);
        Ok(())
    }

    /// Append entities to a layer.
    pub async fn add_entities(&self, id: LayerId, entities: Vec<EntityOf<P>>) -> Result<()> {
        let layer = self.get_native_layer(id).await?;
        debug!(layer_id = %id, count = entities.len(), "Appending layer entities");
        layer.add_entities(entities);
        Ok(())
    }

    pub async fn set_options(&self, id: LayerId, patch: LayerPatch) -> Result<()> {
        let layer = self.get_native_layer(id).await?;
        layer.set_options(&patch);
        Ok(())
    }

    /// Events of one kind fired by any entity in the layer.
    pub async fn create_event_stream(&self, id: LayerId, kind: EventKind) -> Result<EventStream> {
        let layer = self.get_native_layer(id).await?;
        Ok(layer.event_stream(kind))
    }

    /// Unregister a layer and delete it on the provider.
    ///
    /// A layer that is still being created is deleted as soon as the creation
    /// resolves.
    pub async fn delete_layer(&self, id: LayerId) -> Result<()> {
        let pending = self.registry.remove(id)?;
        let layer = pending.await?;
        layer.delete();
        info!(layer_id = %id, "Layer deleted");
        Ok(())
    }
}
