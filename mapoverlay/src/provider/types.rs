//! Provider adapter contract.
//!
//! The core never talks to a mapping SDK directly. Everything it needs from a
//! provider is expressed by [`MapProvider`] and the handle traits below; each
//! supported SDK ships one implementation, selected when the
//! [`OverlayContext`](crate::service::OverlayContext) is composed.

use std::fmt;
use std::future::Future;

use crate::cluster::{ClusterOptions, ClusterPatch};
use crate::coord::LatLong;
use crate::entity::{
    IconInfo, MarkerOptions, MarkerPatch, PolygonOptions, PolygonPatch, PolylineOptions,
    PolylinePatch,
};
use crate::layer::{LayerId, LayerOptions, LayerPatch};

use super::events::EventSource;

/// Provider-assigned identity of a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity-{}", self.0)
    }
}

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Operation on an entity that was already deleted
    EntityDeleted(EntityId),
    /// Operation on a layer that was already deleted
    LayerDeleted(LayerId),
    /// Options rejected by the provider
    InvalidOptions(String),
    /// Provider-specific error
    ProviderSpecific(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::EntityDeleted(id) => write!(f, "{} has been deleted", id),
            ProviderError::LayerDeleted(id) => write!(f, "layer {} has been deleted", id),
            ProviderError::InvalidOptions(msg) => write!(f, "Invalid options: {}", msg),
            ProviderError::ProviderSpecific(msg) => write!(f, "Provider error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Operations common to every provider-side entity handle.
///
/// Handles are cheap to clone; all clones refer to the same entity.
pub trait EntityHandle: EventSource + Clone + fmt::Debug + 'static {
    fn entity_id(&self) -> EntityId;

    fn set_visible(&self, visible: bool);

    fn is_visible(&self) -> bool;

    /// Remove the entity from the map and release its listeners.
    fn delete(&self);

    fn is_deleted(&self) -> bool;
}

pub trait MarkerHandle: EntityHandle {
    /// Current options snapshot.
    fn options(&self) -> MarkerOptions;

    /// Apply a sparse patch; keys absent from the patch are left untouched.
    fn set_options(&self, patch: &MarkerPatch);

    fn location(&self) -> LatLong {
        self.options().position
    }
}

pub trait PolygonHandle: EntityHandle {
    fn options(&self) -> PolygonOptions;

    fn set_options(&self, patch: &PolygonPatch);

    /// Label anchor for the polygon.
    fn centroid(&self) -> Option<LatLong> {
        self.options().centroid()
    }
}

pub trait PolylineHandle: EntityHandle {
    fn options(&self) -> PolylineOptions;

    fn set_options(&self, patch: &PolylinePatch);
}

/// Any entity a layer can hold.
#[derive(Debug, Clone)]
pub enum LayerEntity<M, G, L> {
    Marker(M),
    Polygon(G),
    Polyline(L),
}

impl<M: EntityHandle, G: EntityHandle, L: EntityHandle> LayerEntity<M, G, L> {
    pub fn entity_id(&self) -> EntityId {
        match self {
            Self::Marker(m) => m.entity_id(),
            Self::Polygon(p) => p.entity_id(),
            Self::Polyline(l) => l.entity_id(),
        }
    }

    pub fn delete(&self) {
        match self {
            Self::Marker(m) => m.delete(),
            Self::Polygon(p) => p.delete(),
            Self::Polyline(l) => l.delete(),
        }
    }

    pub fn as_marker(&self) -> Option<&M> {
        match self {
            Self::Marker(m) => Some(m),
            _ => None,
        }
    }
}

/// Entity type of provider `P`'s layers.
pub type EntityOf<P> = LayerEntity<
    <P as MapProvider>::Marker,
    <P as MapProvider>::Polygon,
    <P as MapProvider>::Polyline,
>;

/// Provider-side layer.
///
/// Listeners attached to a layer receive the events of every entity the layer
/// holds, with [`MapEvent::target`](super::MapEvent::target) naming the entity.
pub trait LayerHandle: EventSource + Clone + fmt::Debug + 'static {
    type Marker: MarkerHandle;
    type Polygon: PolygonHandle;
    type Polyline: PolylineHandle;

    fn layer_id(&self) -> LayerId;

    fn options(&self) -> LayerOptions;

    fn set_options(&self, patch: &LayerPatch);

    fn set_visible(&self, visible: bool) {
        self.set_options(&LayerPatch {
            visible: Some(visible),
            ..LayerPatch::default()
        });
    }

    /// Replace the whole entity set in one step.
    ///
    /// Entities previously in the layer but absent from `entities` are deleted.
    fn set_entities(
        &self,
        entities: Vec<LayerEntity<Self::Marker, Self::Polygon, Self::Polyline>>,
    );

    /// Append entities, leaving the existing ones in place.
    fn add_entities(
        &self,
        entities: Vec<LayerEntity<Self::Marker, Self::Polygon, Self::Polyline>>,
    );

    fn entities(&self) -> Vec<LayerEntity<Self::Marker, Self::Polygon, Self::Polyline>>;

    /// Delete the layer and every entity it holds.
    fn delete(&self);

    fn is_deleted(&self) -> bool;
}

/// A group of markers rendered as one glyph.
#[derive(Debug, Clone)]
pub struct Cluster<M> {
    /// Where the cluster glyph is placed
    pub location: LatLong,
    pub members: Vec<M>,
    /// Icon markup produced by the layer's icon callback, if any
    pub icon: Option<String>,
    /// Icon metadata filled in by the icon callback
    pub icon_info: IconInfo,
}

impl<M> Cluster<M> {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Provider-side clustering layer.
pub trait ClusterLayerHandle: LayerHandle {
    fn cluster_options(&self) -> ClusterOptions;

    /// Clusters at the given zoom. Markers that do not fall into a cluster are
    /// not included.
    fn clusters(&self, zoom: f64) -> Vec<Cluster<Self::Marker>>;

    fn is_clustering(&self) -> bool;

    /// Apply live clustering changes. Only called when the provider reports
    /// [`MapProvider::reconfigurable_clusters`].
    fn set_cluster_options(&self, patch: &ClusterPatch);

    fn start_clustering(&self);

    fn stop_clustering(&self);
}

/// Async trait for map provider adapters.
///
/// Every creation call may suspend until the underlying SDK has finished
/// loading. Implementations must not fail a call because the SDK is still
/// initialising; they wait instead.
pub trait MapProvider: Send + Sync + 'static {
    type Marker: MarkerHandle;
    type Polygon: PolygonHandle;
    type Polyline: PolylineHandle;
    type Layer: LayerHandle<Marker = Self::Marker, Polygon = Self::Polygon, Polyline = Self::Polyline>;
    type ClusterLayer: ClusterLayerHandle<
        Marker = Self::Marker,
        Polygon = Self::Polygon,
        Polyline = Self::Polyline,
    >;

    /// Returns the provider's name for logging and identification.
    fn name(&self) -> &str;

    /// Whether cluster layers accept clustering changes after creation.
    fn reconfigurable_clusters(&self) -> bool;

    fn create_layer(
        &self,
        options: LayerOptions,
    ) -> impl Future<Output = Result<Self::Layer, ProviderError>> + Send;

    fn create_cluster_layer(
        &self,
        options: ClusterOptions,
    ) -> impl Future<Output = Result<Self::ClusterLayer, ProviderError>> + Send;

    /// Create markers in one batch. The result preserves input order.
    fn create_markers(
        &self,
        options: Vec<MarkerOptions>,
        icon: Option<IconInfo>,
    ) -> impl Future<Output = Result<Vec<Self::Marker>, ProviderError>> + Send;

    /// Create polygons in one batch. The result preserves input order.
    fn create_polygons(
        &self,
        options: Vec<PolygonOptions>,
    ) -> impl Future<Output = Result<Vec<Self::Polygon>, ProviderError>> + Send;

    /// Create polylines in one batch. The result preserves input order.
    fn create_polylines(
        &self,
        options: Vec<PolylineOptions>,
    ) -> impl Future<Output = Result<Vec<Self::Polyline>, ProviderError>> + Send;
}
