// This file makes the 'ai' directory a module.
// It publicly exports the layer catalog and the in-memory network graphs.

pub mod activations;
pub mod catalog;
pub mod icons;
pub mod inputs;
pub mod layers;
pub mod network;
pub mod params;
pub mod store;

// Publicly use the primary types for easier access
pub use catalog::{LayerCatalog, LayerTypeInfo, SvgRepresentation};
pub use icons::IconLibrary;
pub use inputs::InputType;
pub use layers::{ConvolutionType, Layer, LayerCategory, LayerKind, LayerType, PoolingType};
pub use network::{Connection, LayerNode, NeuralNetwork};
pub use params::{ParamError, ParamKind, ParamSpec};
pub use store::NetworkStore;
