//! Marker service.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::provider::{
    EntityHandle, EventKind, EventSource, EventStream, Listener, ListenerHandle, MapProvider,
    MarkerHandle, ProviderError,
};

use super::options::{IconInfo, MarkerOptions, MarkerPatch};

/// Creates and updates markers on the active provider.
pub struct MarkerService<P: MapProvider> {
    provider: Arc<P>,
}

impl<P: MapProvider> MarkerService<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Create a batch of markers. The result is in input order.
    pub async fn create_markers(
        &self,
        options: Vec<MarkerOptions>,
        icon: Option<IconInfo>,
    ) -> Result<Vec<P::Marker>> {
        let requested = options.len();
        let markers = self.provider.create_markers(options, icon).await?;
        debug!(requested, created = markers.len(), "Markers created");
        Ok(markers)
    }

    pub async fn create_marker(&self, options: MarkerOptions, icon: Option<IconInfo>) -> Result<P::Marker> {
        let mut markers = self.create_markers(vec![options], icon).await?;
        markers
            .pop()
            .ok_or_else(|| ProviderError::ProviderSpecific("no marker returned".to_string()).into())
    }

    /// Send the keys present in `patch` to the provider. Empty patches are
    /// not sent.
    pub fn set_options(&self, marker: &P::Marker, patch: &MarkerPatch) {
        if patch.is_empty() {
            return;
        }
        if marker.is_deleted() {
            warn!(entity = %marker.entity_id(), "Ignoring options for deleted marker");
            return;
        }
        marker.set_options(patch);
    }

    pub fn delete(&self, marker: &P::Marker) {
        marker.delete();
    }

    pub fn add_listener(&self, kind: EventKind, marker: &P::Marker, listener: Listener) -> ListenerHandle {
        marker.add_listener(kind, listener)
    }

    pub fn create_event_stream(&self, kind: EventKind, marker: &P::Marker) -> EventStream {
        marker.event_stream(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLong;
    use crate::provider::memory::MemoryProvider;
    use crate::provider::MapEvent;
    use futures::StreamExt;

    fn service() -> MarkerService<MemoryProvider> {
        MarkerService::new(Arc::new(MemoryProvider::loaded()))
    }

    #[tokio::test]
    async fn test_create_markers_preserves_order() {
        let markers = service()
            .create_markers(
                vec![
                    MarkerOptions::at(LatLong::new(1.0, 1.0)).with_title("a"),
                    MarkerOptions::at(LatLong::new(2.0, 2.0)).with_title("b"),
                    MarkerOptions::at(LatLong::new(3.0, 3.0)).with_title("c"),
                ],
                None,
            )
            .await
            .unwrap();

        let titles: Vec<_> = markers
            .iter()
            .map(|m| m.options().title.unwrap_or_default())
            .collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_set_options_is_sparse() {
        let markers = service();
        let marker = markers
            .create_marker(MarkerOptions::at(LatLong::new(1.0, 1.0)).with_title("depot"), None)
            .await
            .unwrap();

        markers.set_options(
            &marker,
            &MarkerPatch {
                draggable: Some(true),
                ..MarkerPatch::default()
            },
        );

        let options = marker.options();
        assert!(options.draggable);
        assert_eq!(options.title.as_deref(), Some("depot"));
        assert_eq!(options.position, LatLong::new(1.0, 1.0));
    }

    #[tokio::test]
    async fn test_event_stream_receives_marker_events() {
        let markers = service();
        let marker = markers
            .create_marker(MarkerOptions::at(LatLong::new(1.0, 1.0)), None)
            .await
            .unwrap();
        let mut clicks = markers.create_event_stream(EventKind::Click, &marker);

        marker.fire(MapEvent::new(EventKind::Click));
        let event = clicks.next().await.unwrap();
        assert_eq!(event.kind, EventKind::Click);
        assert_eq!(event.target.map(|t| t.entity_id), Some(marker.entity_id()));
    }

    #[tokio::test]
    async fn test_delete_marks_deleted() {
        let markers = service();
        let marker = markers
            .create_marker(MarkerOptions::default(), None)
            .await
            .unwrap();
        markers.delete(&marker);
        assert!(marker.is_deleted());
    }
}
