use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

use super::activations::{
    IdentityFunction, LeakyReLUFunction, ReLUFunction, SigmoidFunction, SoftMaxFunction, TanhFunction,
};
use super::inputs::{
    AudioInputLayer, ImageInputLayer, InputType, TabularInputLayer, TextInputLayer, VideoInputLayer,
};
use super::params::{param_enum, ParamError, ParamReader, ParamSpec};
use crate::error::BuilderError;

// Trait for any layer instance placed in a network
pub trait Layer: fmt::Debug + Send + Sync {
    fn kind(&self) -> LayerKind;

    // Current configuration, including fields inherited from the type's ancestors
    fn config(&self) -> Value;
}

/// A concrete layer type that can be built from client parameters.
pub trait LayerType: Layer + Sized + 'static {
    const KIND: LayerKind;

    /// Parameters declared directly on this type, not on its ancestors.
    fn param_specs() -> Vec<ParamSpec>;

    fn from_params(params: &ParamReader<'_>) -> Result<Self, ParamError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerCategory {
    Base,
    Input,
    Transformation,
    Activation,
}

/// Every node of the layer type hierarchy, abstract ones included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Layer,
    // Input family: the base dispatches to a modality on `input_type`
    InputLayer,
    ImageInputLayer,
    TextInputLayer,
    TabularInputLayer,
    AudioInputLayer,
    VideoInputLayer,
    // Transformations
    ConvolutionalLayer,
    PoolingLayer,
    DenseLayer,
    DropoutLayer,
    EmbeddingLayer,
    AttentionLayer,
    // Activations
    ActivationFunction,
    ReLUFunction,
    LeakyReLUFunction,
    TanhFunction,
    SigmoidFunction,
    SoftMaxFunction,
    IdentityFunction,
}

impl LayerKind {
    pub const ALL: &'static [LayerKind] = &[
        LayerKind::Layer,
        LayerKind::InputLayer,
        LayerKind::ImageInputLayer,
        LayerKind::TextInputLayer,
        LayerKind::TabularInputLayer,
        LayerKind::AudioInputLayer,
        LayerKind::VideoInputLayer,
        LayerKind::ConvolutionalLayer,
        LayerKind::PoolingLayer,
        LayerKind::DenseLayer,
        LayerKind::DropoutLayer,
        LayerKind::EmbeddingLayer,
        LayerKind::AttentionLayer,
        LayerKind::ActivationFunction,
        LayerKind::ReLUFunction,
        LayerKind::LeakyReLUFunction,
        LayerKind::TanhFunction,
        LayerKind::SigmoidFunction,
        LayerKind::SoftMaxFunction,
        LayerKind::IdentityFunction,
    ];

    // What the client's palette offers, in display order
    pub const CATALOG: &'static [LayerKind] = &[
        LayerKind::InputLayer,
        LayerKind::ConvolutionalLayer,
        LayerKind::PoolingLayer,
        LayerKind::DenseLayer,
        LayerKind::DropoutLayer,
        LayerKind::EmbeddingLayer,
        LayerKind::AttentionLayer,
        LayerKind::ReLUFunction,
        LayerKind::LeakyReLUFunction,
        LayerKind::TanhFunction,
        LayerKind::SigmoidFunction,
        LayerKind::SoftMaxFunction,
        LayerKind::IdentityFunction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Layer => "Layer",
            LayerKind::InputLayer => "InputLayer",
            LayerKind::ImageInputLayer => "ImageInputLayer",
            LayerKind::TextInputLayer => "TextInputLayer",
            LayerKind::TabularInputLayer => "TabularInputLayer",
            LayerKind::AudioInputLayer => "AudioInputLayer",
            LayerKind::VideoInputLayer => "VideoInputLayer",
            LayerKind::ConvolutionalLayer => "ConvolutionalLayer",
            LayerKind::PoolingLayer => "PoolingLayer",
            LayerKind::DenseLayer => "DenseLayer",
            LayerKind::DropoutLayer => "DropoutLayer",
            LayerKind::EmbeddingLayer => "EmbeddingLayer",
            LayerKind::AttentionLayer => "AttentionLayer",
            LayerKind::ActivationFunction => "ActivationFunction",
            LayerKind::ReLUFunction => "ReLUFunction",
            LayerKind::LeakyReLUFunction => "LeakyReLUFunction",
            LayerKind::TanhFunction => "TanhFunction",
            LayerKind::SigmoidFunction => "SigmoidFunction",
            LayerKind::SoftMaxFunction => "SoftMaxFunction",
            LayerKind::IdentityFunction => "IdentityFunction",
        }
    }

    pub fn from_name(name: &str) -> Option<LayerKind> {
        if name == "BaseInputLayer" {
            return Some(LayerKind::InputLayer);
        }
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn parent(self) -> Option<LayerKind> {
        match self {
            LayerKind::Layer => None,
            LayerKind::ImageInputLayer
            | LayerKind::TextInputLayer
            | LayerKind::TabularInputLayer
            | LayerKind::AudioInputLayer
            | LayerKind::VideoInputLayer => Some(LayerKind::InputLayer),
            LayerKind::ReLUFunction
            | LayerKind::LeakyReLUFunction
            | LayerKind::TanhFunction
            | LayerKind::SigmoidFunction
            | LayerKind::SoftMaxFunction
            | LayerKind::IdentityFunction => Some(LayerKind::ActivationFunction),
            _ => Some(LayerKind::Layer),
        }
    }

    /// The chain of types from the root down to (and including) `self`.
    pub fn ancestry(self) -> Vec<LayerKind> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent() {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    pub fn children(self) -> impl Iterator<Item = LayerKind> {
        Self::ALL.iter().copied().filter(move |kind| kind.parent() == Some(self))
    }

    pub fn is_abstract(self) -> bool {
        matches!(self, LayerKind::Layer | LayerKind::ActivationFunction)
    }

    pub fn category(self) -> LayerCategory {
        match self.ancestry().get(1).copied() {
            None => LayerCategory::Base,
            Some(LayerKind::InputLayer) => LayerCategory::Input,
            Some(LayerKind::ActivationFunction) => LayerCategory::Activation,
            Some(_) => LayerCategory::Transformation,
        }
    }

    pub fn own_params(self) -> Vec<ParamSpec> {
        match self {
            LayerKind::Layer | LayerKind::ActivationFunction => Vec::new(),
            LayerKind::InputLayer => vec![ParamSpec::choice::<InputType>("input_type")],
            LayerKind::ImageInputLayer => ImageInputLayer::param_specs(),
            LayerKind::TextInputLayer => TextInputLayer::param_specs(),
            LayerKind::TabularInputLayer => TabularInputLayer::param_specs(),
            LayerKind::AudioInputLayer => AudioInputLayer::param_specs(),
            LayerKind::VideoInputLayer => VideoInputLayer::param_specs(),
            LayerKind::ConvolutionalLayer => ConvolutionalLayer::param_specs(),
            LayerKind::PoolingLayer => PoolingLayer::param_specs(),
            LayerKind::DenseLayer => DenseLayer::param_specs(),
            LayerKind::DropoutLayer => DropoutLayer::param_specs(),
            LayerKind::EmbeddingLayer => EmbeddingLayer::param_specs(),
            LayerKind::AttentionLayer => AttentionLayer::param_specs(),
            LayerKind::ReLUFunction => ReLUFunction::param_specs(),
            LayerKind::LeakyReLUFunction => LeakyReLUFunction::param_specs(),
            LayerKind::TanhFunction => TanhFunction::param_specs(),
            LayerKind::SigmoidFunction => SigmoidFunction::param_specs(),
            LayerKind::SoftMaxFunction => SoftMaxFunction::param_specs(),
            LayerKind::IdentityFunction => IdentityFunction::param_specs(),
        }
    }

    // Asset path of the type's icon, relative to the assets directory
    pub fn icon(self) -> Option<&'static str> {
        let key = match self {
            LayerKind::Layer | LayerKind::ActivationFunction => return None,
            LayerKind::InputLayer | LayerKind::ImageInputLayer => InputType::Image.icon_key(),
            LayerKind::TextInputLayer => InputType::Text.icon_key(),
            LayerKind::TabularInputLayer => InputType::Tabular.icon_key(),
            LayerKind::AudioInputLayer => InputType::Audio.icon_key(),
            LayerKind::VideoInputLayer => InputType::Video.icon_key(),
            LayerKind::ConvolutionalLayer => "convolutional_layer.svg",
            LayerKind::PoolingLayer => "pooling_layer.svg",
            LayerKind::DenseLayer => "dense_layer.svg",
            LayerKind::DropoutLayer => "dropout_layer.svg",
            LayerKind::EmbeddingLayer => "embedding_layer.svg",
            LayerKind::AttentionLayer => "attention_layer.svg",
            LayerKind::ReLUFunction => "relu.svg",
            LayerKind::LeakyReLUFunction => "leaky_relu.svg",
            LayerKind::TanhFunction => "tanh.svg",
            LayerKind::SigmoidFunction => "sigmoid.svg",
            LayerKind::SoftMaxFunction => "softmax.svg",
            LayerKind::IdentityFunction => "identity.svg",
        };
        Some(key)
    }

    pub fn instantiate(self, params: &Map<String, Value>) -> Result<Box<dyn Layer>, BuilderError> {
        self.build(&ParamReader::new(params))
    }

    fn build(self, reader: &ParamReader<'_>) -> Result<Box<dyn Layer>, BuilderError> {
        match self {
            LayerKind::Layer | LayerKind::ActivationFunction => Err(BuilderError::AbstractLayerType(self.name())),
            LayerKind::InputLayer => reader.choice::<InputType>("input_type").layer_kind().build(reader),
            LayerKind::ImageInputLayer => boxed::<ImageInputLayer>(reader),
            LayerKind::TextInputLayer => boxed::<TextInputLayer>(reader),
            LayerKind::TabularInputLayer => boxed::<TabularInputLayer>(reader),
            LayerKind::AudioInputLayer => boxed::<AudioInputLayer>(reader),
            LayerKind::VideoInputLayer => boxed::<VideoInputLayer>(reader),
            LayerKind::ConvolutionalLayer => boxed::<ConvolutionalLayer>(reader),
            LayerKind::PoolingLayer => boxed::<PoolingLayer>(reader),
            LayerKind::DenseLayer => boxed::<DenseLayer>(reader),
            LayerKind::DropoutLayer => boxed::<DropoutLayer>(reader),
            LayerKind::EmbeddingLayer => boxed::<EmbeddingLayer>(reader),
            LayerKind::AttentionLayer => boxed::<AttentionLayer>(reader),
            LayerKind::ReLUFunction => boxed::<ReLUFunction>(reader),
            LayerKind::LeakyReLUFunction => boxed::<LeakyReLUFunction>(reader),
            LayerKind::TanhFunction => boxed::<TanhFunction>(reader),
            LayerKind::SigmoidFunction => boxed::<SigmoidFunction>(reader),
            LayerKind::SoftMaxFunction => boxed::<SoftMaxFunction>(reader),
            LayerKind::IdentityFunction => boxed::<IdentityFunction>(reader),
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn boxed<T: LayerType>(reader: &ParamReader<'_>) -> Result<Box<dyn Layer>, BuilderError> {
    Ok(Box::new(T::from_params(reader)?))
}

// --- Convolution and pooling ---

param_enum! {
    pub enum ConvolutionType {
        Standard => ("STANDARD", "Standard"),
        Transposed => ("TRANSPOSED", "Transposed"),
    }
    default = Standard;
}

param_enum! {
    pub enum PoolingType {
        Max => ("MAX", "Max"),
        Avg => ("AVG", "Avg"),
    }
    default = Max;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionalLayer {
    pub conv_type: ConvolutionType,
    pub filters: u64,
    pub stride: u64,
    pub kernel_size: u64,
}

impl ConvolutionalLayer {
    pub const DEFAULT_FILTERS: u64 = 32;
    pub const DEFAULT_STRIDE: u64 = 1;
    pub const DEFAULT_KERNEL_SIZE: u64 = 5;
}

impl Layer for ConvolutionalLayer {
    fn kind(&self) -> LayerKind {
        Self::KIND
    }

    fn config(&self) -> Value {
        json!({
            "conv_type": self.conv_type,
            "filters": self.filters,
            "stride": self.stride,
            "kernel_size": self.kernel_size,
        })
    }
}

impl LayerType for ConvolutionalLayer {
    const KIND: LayerKind = LayerKind::ConvolutionalLayer;

    fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::choice::<ConvolutionType>("conv_type"),
            ParamSpec::integer("filters", Self::DEFAULT_FILTERS).min(1.0),
            ParamSpec::integer("stride", Self::DEFAULT_STRIDE).min(1.0),
            ParamSpec::integer("kernel_size", Self::DEFAULT_KERNEL_SIZE).min(1.0),
        ]
    }

    fn from_params(params: &ParamReader<'_>) -> Result<Self, ParamError> {
        Ok(Self {
            conv_type: params.choice("conv_type"),
            filters: params.integer_at_least("filters", Self::DEFAULT_FILTERS, 1)?,
            stride: params.integer_at_least("stride", Self::DEFAULT_STRIDE, 1)?,
            kernel_size: params.integer_at_least("kernel_size", Self::DEFAULT_KERNEL_SIZE, 1)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolingLayer {
    pub pooling_type: PoolingType,
}

impl Layer for PoolingLayer {
    fn kind(&self) -> LayerKind {
        Self::KIND
    }

    fn config(&self) -> Value {
        json!({ "pooling_type": self.pooling_type })
    }
}

impl LayerType for PoolingLayer {
    const KIND: LayerKind = LayerKind::PoolingLayer;

    fn param_specs() -> Vec<ParamSpec> {
        vec![ParamSpec::choice::<PoolingType>("pooling_type")]
    }

    fn from_params(params: &ParamReader<'_>) -> Result<Self, ParamError> {
        Ok(Self { pooling_type: params.choice("pooling_type") })
    }
}

// --- Shape-only layers ---

// Dense, dropout, embedding and attention layers only carry an optional target shape
// for now.
macro_rules! shaped_layer {
    ($($ty:ident),+ $(,)?) => {
        $(
            #[derive(Debug, Clone, Default, PartialEq)]
            pub struct $ty {
                pub target_shape: Option<Vec<u64>>,
            }

            impl Layer for $ty {
                fn kind(&self) -> LayerKind {
                    Self::KIND
                }

                fn config(&self) -> Value {
                    json!({ "target_shape": self.target_shape })
                }
            }

            impl LayerType for $ty {
                const KIND: LayerKind = LayerKind::$ty;

                fn param_specs() -> Vec<ParamSpec> {
                    vec![ParamSpec::list("target_shape", Value::Null)]
                }

                fn from_params(params: &ParamReader<'_>) -> Result<Self, ParamError> {
                    Ok(Self { target_shape: params.optional_shape("target_shape")? })
                }
            }
        )+
    };
}

shaped_layer!(DenseLayer, DropoutLayer, EmbeddingLayer, AttentionLayer);
