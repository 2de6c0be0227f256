//! Overlay context: the composition root wiring one provider and one map to
//! every service the directives use.

use std::fmt;
use std::sync::Arc;

use crate::cluster::ClusterService;
use crate::entity::{MarkerService, PolygonService, PolylineService};
use crate::layer::{LayerId, LayerIdGenerator, LayerKind, LayerService};
use crate::map::MapService;
use crate::provider::MapProvider;

/// Services bound to the active provider and map.
///
/// Each context owns its own [`LayerIdGenerator`], so layer ids are unique
/// for the lifetime of the context and never reused.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use mapoverlay::coord::{LatLong, Size};
/// use mapoverlay::layer::LayerKind;
/// use mapoverlay::map::memory::MemoryMap;
/// use mapoverlay::provider::memory::MemoryProvider;
/// use mapoverlay::service::OverlayContext;
///
/// let map = MemoryMap::new(LatLong::new(47.6, -122.3), 10.0, Size::new(800.0, 600.0));
/// let ctx = OverlayContext::new(Arc::new(MemoryProvider::loaded()), Arc::new(map));
/// let first = ctx.next_layer_id(LayerKind::Marker);
/// let second = ctx.next_layer_id(LayerKind::Marker);
/// assert!(second > first);
/// ```
pub struct OverlayContext<P: MapProvider, M: MapService> {
    provider: Arc<P>,
    map: Arc<M>,
    ids: LayerIdGenerator,
    layers: LayerService<P>,
    clusters: ClusterService<P>,
    markers: MarkerService<P>,
    polygons: PolygonService<P>,
    polylines: PolylineService<P>,
}

impl<P: MapProvider, M: MapService> OverlayContext<P, M> {
    pub fn new(provider: Arc<P>, map: Arc<M>) -> Arc<Self> {
        Arc::new(Self {
            layers: LayerService::new(Arc::clone(&provider)),
            clusters: ClusterService::new(Arc::clone(&provider)),
            markers: MarkerService::new(Arc::clone(&provider)),
            polygons: PolygonService::new(Arc::clone(&provider)),
            polylines: PolylineService::new(Arc::clone(&provider)),
            ids: LayerIdGenerator::new(),
            provider,
            map,
        })
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn map(&self) -> &Arc<M> {
        &self.map
    }

    pub fn next_layer_id(&self, kind: LayerKind) -> LayerId {
        self.ids.next(kind)
    }

    pub fn layers(&self) -> &LayerService<P> {
        &self.layers
    }

    pub fn clusters(&self) -> &ClusterService<P> {
        &self.clusters
    }

    pub fn markers(&self) -> &MarkerService<P> {
        &self.markers
    }

    pub fn polygons(&self) -> &PolygonService<P> {
        &self.polygons
    }

    pub fn polylines(&self) -> &PolylineService<P> {
        &self.polylines
    }
}

impl<P: MapProvider, M: MapService> fmt::Debug for OverlayContext<P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayContext")
            .field("provider", &self.provider.name())
            .field("layers", &self.layers.layer_count())
            .field("cluster_layers", &self.clusters.layer_count())
            .finish()
    }
}
