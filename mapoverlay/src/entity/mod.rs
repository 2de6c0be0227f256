//! Map entities: option records and the services that materialise them on
//! the active provider.

mod marker;
mod options;
mod polygon;
mod polyline;

pub use marker::MarkerService;
pub use options::{
    IconInfo, MarkerOptions, MarkerPatch, MarkerTypeId, Metadata, PolygonOptions, PolygonPatch,
    PolylineOptions, PolylinePatch,
};
pub use polygon::PolygonService;
pub use polyline::PolylineService;
