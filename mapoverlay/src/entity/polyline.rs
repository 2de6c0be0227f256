//! Polyline service.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::provider::{EntityHandle, EventKind, EventSource, EventStream, MapProvider, PolylineHandle};

use super::options::{PolylineOptions, PolylinePatch};

pub struct PolylineService<P: MapProvider> {
    provider: Arc<P>,
}

impl<P: MapProvider> PolylineService<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub async fn create_polylines(&self, options: Vec<PolylineOptions>) -> Result<Vec<P::Polyline>> {
        let requested = options.len();
        let polylines = self.provider.create_polylines(options).await?;
        debug!(requested, created = polylines.len(), "Polylines created");
        Ok(polylines)
    }

    pub fn set_options(&self, polyline: &P::Polyline, patch: &PolylinePatch) {
        if *patch != PolylinePatch::default() && !polyline.is_deleted() {
            polyline.set_options(patch);
        }
    }

    pub fn delete(&self, polyline: &P::Polyline) {
        polyline.delete();
    }

    pub fn create_event_stream(&self, kind: EventKind, polyline: &P::Polyline) -> EventStream {
        polyline.event_stream(kind)
    }
}
