//! Polygon service.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::provider::{
    EntityHandle, EventKind, EventSource, EventStream, MapProvider, PolygonHandle,
};

use super::options::{PolygonOptions, PolygonPatch};

pub struct PolygonService<P: MapProvider> {
    provider: Arc<P>,
}

impl<P: MapProvider> PolygonService<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Create unbound polygons in one batch, in input order.
    pub async fn create_polygons(&self, options: Vec<PolygonOptions>) -> Result<Vec<P::Polygon>> {
        let requested = options.len();
        let polygons = self.provider.create_polygons(options).await?;
        debug!(requested, created = polygons.len(), "Polygons created");
        Ok(polygons)
    }

    pub fn set_options(&self, polygon: &P::Polygon, patch: &PolygonPatch) {
        if *patch == PolygonPatch::default() {
            return;
        }
        if polygon.is_deleted() {
            warn!(entity = %polygon.entity_id(), "Ignoring options for deleted polygon");
            return;
        }
        polygon.set_options(patch);
    }

    pub fn delete(&self, polygon: &P::Polygon) {
        polygon.delete();
    }

    pub fn create_event_stream(&self, kind: EventKind, polygon: &P::Polygon) -> EventStream {
        polygon.event_stream(kind)
    }
}
