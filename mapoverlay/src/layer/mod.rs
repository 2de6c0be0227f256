//! Layers: identity, options and the provider-agnostic layer service.

mod id;
mod options;
mod registry;
mod service;

pub use id::{LayerId, LayerIdGenerator, LayerKind, PARTITION_WIDTH};
pub use options::{LayerOptions, LayerPatch};
pub(crate) use registry::LayerRegistry;
pub use registry::SharedLayer;
pub use service::LayerService;
