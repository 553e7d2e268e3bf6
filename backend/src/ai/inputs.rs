use serde_json::{json, Value};

use super::layers::{Layer, LayerKind, LayerType};
use super::params::{check_minimum, param_enum, ParamError, ParamReader, ParamSpec};

param_enum! {
    pub enum InputType {
        Image => ("IMAGE", "Image"),
        Text => ("TEXT", "Text"),
        Tabular => ("TABULAR", "Tabular"),
        Audio => ("AUDIO", "Audio"),
        Video => ("VIDEO", "Video"),
    }
    default = Image;
}

impl InputType {
    pub fn layer_kind(self) -> LayerKind {
        match self {
            InputType::Image => LayerKind::ImageInputLayer,
            InputType::Text => LayerKind::TextInputLayer,
            InputType::Tabular => LayerKind::TabularInputLayer,
            InputType::Audio => LayerKind::AudioInputLayer,
            InputType::Video => LayerKind::VideoInputLayer,
        }
    }

    pub fn icon_key(self) -> &'static str {
        match self {
            InputType::Image => "input/input_image.svg",
            InputType::Text => "input/input_text.svg",
            InputType::Tabular => "input/input_tabular.svg",
            InputType::Audio => "input/input_audio.svg",
            InputType::Video => "input/input_video.svg",
        }
    }
}

// Every input config starts with the modality, which the family base declares.
fn input_config(input_type: InputType, fields: Value) -> Value {
    let mut config = json!({ "input_type": input_type });
    if let (Some(map), Value::Object(fields)) = (config.as_object_mut(), fields) {
        map.extend(fields);
    }
    config
}

// --- Image ---

#[derive(Debug, Clone, PartialEq)]
pub struct ImageInputLayer {
    pub shape: Vec<u64>,
    pub channels: u64,
    pub color_mode: String,
}

impl ImageInputLayer {
    pub const DEFAULT_SHAPE: [u64; 2] = [224, 224];
    pub const DEFAULT_CHANNELS: u64 = 3;
    pub const DEFAULT_COLOR_MODE: &'static str = "rgb";
}

impl Layer for ImageInputLayer {
    fn kind(&self) -> LayerKind {
        Self::KIND
    }

    fn config(&self) -> Value {
        input_config(
            InputType::Image,
            json!({
                "shape": self.shape,
                "channels": self.channels,
                "color_mode": self.color_mode,
            }),
        )
    }
}

impl LayerType for ImageInputLayer {
    const KIND: LayerKind = LayerKind::ImageInputLayer;

    fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::list("shape", json!(Self::DEFAULT_SHAPE)),
            ParamSpec::integer("channels", Self::DEFAULT_CHANNELS).min(1.0),
            ParamSpec::text("color_mode", Self::DEFAULT_COLOR_MODE),
        ]
    }

    fn from_params(params: &ParamReader<'_>) -> Result<Self, ParamError> {
        Ok(Self {
            shape: params.shape("shape", &Self::DEFAULT_SHAPE)?,
            channels: params.integer_at_least("channels", Self::DEFAULT_CHANNELS, 1)?,
            color_mode: params.text("color_mode", Self::DEFAULT_COLOR_MODE)?,
        })
    }
}

// --- Text ---

#[derive(Debug, Clone, PartialEq)]
pub struct TextInputLayer {
    pub vocab_size: u64,
    pub sequence_length: u64,
    pub embedding_dim: u64,
    pub tokenizer: String,
}

impl TextInputLayer {
    pub const DEFAULT_VOCAB_SIZE: u64 = 10_000;
    pub const DEFAULT_SEQUENCE_LENGTH: u64 = 100;
    pub const DEFAULT_EMBEDDING_DIM: u64 = 128;
    pub const DEFAULT_TOKENIZER: &'static str = "word";
}

impl Layer for TextInputLayer {
    fn kind(&self) -> LayerKind {
        Self::KIND
    }

    fn config(&self) -> Value {
        input_config(
            InputType::Text,
            json!({
                "vocab_size": self.vocab_size,
                "sequence_length": self.sequence_length,
                "embedding_dim": self.embedding_dim,
                "tokenizer": self.tokenizer,
            }),
        )
    }
}

impl LayerType for TextInputLayer {
    const KIND: LayerKind = LayerKind::TextInputLayer;

    fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::integer("vocab_size", Self::DEFAULT_VOCAB_SIZE).min(1.0),
            ParamSpec::integer("sequence_length", Self::DEFAULT_SEQUENCE_LENGTH).min(1.0),
            ParamSpec::integer("embedding_dim", Self::DEFAULT_EMBEDDING_DIM).min(1.0),
            ParamSpec::text("tokenizer", Self::DEFAULT_TOKENIZER),
        ]
    }

    fn from_params(params: &ParamReader<'_>) -> Result<Self, ParamError> {
        Ok(Self {
            vocab_size: params.integer_at_least("vocab_size", Self::DEFAULT_VOCAB_SIZE, 1)?,
            sequence_length: params.integer_at_least("sequence_length", Self::DEFAULT_SEQUENCE_LENGTH, 1)?,
            embedding_dim: params.integer_at_least("embedding_dim", Self::DEFAULT_EMBEDDING_DIM, 1)?,
            tokenizer: params.text("tokenizer", Self::DEFAULT_TOKENIZER)?,
        })
    }
}

// --- Tabular ---

#[derive(Debug, Clone, PartialEq)]
pub struct TabularInputLayer {
    // Unknown until the client tells us
    pub num_features: Option<u64>,
    pub feature_types: Vec<String>,
}

impl Layer for TabularInputLayer {
    fn kind(&self) -> LayerKind {
        Self::KIND
    }

    fn config(&self) -> Value {
        input_config(
            InputType::Tabular,
            json!({
                "num_features": self.num_features,
                "feature_types": self.feature_types,
            }),
        )
    }
}

impl LayerType for TabularInputLayer {
    const KIND: LayerKind = LayerKind::TabularInputLayer;

    fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::optional_integer("num_features").min(1.0),
            ParamSpec::list("feature_types", json!([])),
        ]
    }

    fn from_params(params: &ParamReader<'_>) -> Result<Self, ParamError> {
        let num_features = params.optional_integer("num_features")?;
        if let Some(n) = num_features {
            check_minimum("num_features", n as f64, 1.0)?;
        }
        Ok(Self { num_features, feature_types: params.string_list("feature_types")? })
    }
}

// --- Audio ---

#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputLayer {
    pub sampling_rate: u64,
    pub duration: f64,
    pub num_mfcc: u64,
    pub channels: u64,
}

impl AudioInputLayer {
    pub const DEFAULT_SAMPLING_RATE: u64 = 16_000;
    pub const DEFAULT_DURATION: f64 = 10.0;
    pub const DEFAULT_NUM_MFCC: u64 = 13;
    pub const DEFAULT_CHANNELS: u64 = 1;
}

impl Layer for AudioInputLayer {
    fn kind(&self) -> LayerKind {
        Self::KIND
    }

    fn config(&self) -> Value {
        input_config(
            InputType::Audio,
            json!({
                "sampling_rate": self.sampling_rate,
                "duration": self.duration,
                "num_mfcc": self.num_mfcc,
                "channels": self.channels,
            }),
        )
    }
}

impl LayerType for AudioInputLayer {
    const KIND: LayerKind = LayerKind::AudioInputLayer;

    fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::integer("sampling_rate", Self::DEFAULT_SAMPLING_RATE).min(1.0),
            ParamSpec::float("duration", Self::DEFAULT_DURATION).min(0.0),
            ParamSpec::integer("num_mfcc", Self::DEFAULT_NUM_MFCC).min(1.0),
            ParamSpec::integer("channels", Self::DEFAULT_CHANNELS).min(1.0),
        ]
    }

    fn from_params(params: &ParamReader<'_>) -> Result<Self, ParamError> {
        Ok(Self {
            sampling_rate: params.integer_at_least("sampling_rate", Self::DEFAULT_SAMPLING_RATE, 1)?,
            duration: params.float_at_least("duration", Self::DEFAULT_DURATION, 0.0)?,
            num_mfcc: params.integer_at_least("num_mfcc", Self::DEFAULT_NUM_MFCC, 1)?,
            channels: params.integer_at_least("channels", Self::DEFAULT_CHANNELS, 1)?,
        })
    }
}

// --- Video ---

#[derive(Debug, Clone, PartialEq)]
pub struct VideoInputLayer {
    pub frame_size: Vec<u64>,
    pub num_frames: u64,
    pub frame_rate: u64,
    pub channels: u64,
}

impl VideoInputLayer {
    pub const DEFAULT_FRAME_SIZE: [u64; 2] = [224, 224];
    pub const DEFAULT_NUM_FRAMES: u64 = 30;
    pub const DEFAULT_FRAME_RATE: u64 = 24;
    pub const DEFAULT_CHANNELS: u64 = 3;
}

impl Layer for VideoInputLayer {
    fn kind(&self) -> LayerKind {
        Self::KIND
    }

    fn config(&self) -> Value {
        input_config(
            InputType::Video,
            json!({
                "frame_size": self.frame_size,
                "num_frames": self.num_frames,
                "frame_rate": self.frame_rate,
                "channels": self.channels,
            }),
        )
    }
}

impl LayerType for VideoInputLayer {
    const KIND: LayerKind = LayerKind::VideoInputLayer;

    fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::list("frame_size", json!(Self::DEFAULT_FRAME_SIZE)),
            ParamSpec::integer("num_frames", Self::DEFAULT_NUM_FRAMES).min(1.0),
            ParamSpec::integer("frame_rate", Self::DEFAULT_FRAME_RATE).min(1.0),
            ParamSpec::integer("channels", Self::DEFAULT_CHANNELS).min(1.0),
        ]
    }

    fn from_params(params: &ParamReader<'_>) -> Result<Self, ParamError> {
        Ok(Self {
            frame_size: params.shape("frame_size", &Self::DEFAULT_FRAME_SIZE)?,
            num_frames: params.integer_at_least("num_frames", Self::DEFAULT_NUM_FRAMES, 1)?,
            frame_rate: params.integer_at_least("frame_rate", Self::DEFAULT_FRAME_RATE, 1)?,
            channels: params.integer_at_least("channels", Self::DEFAULT_CHANNELS, 1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn build<T: LayerType>(value: Value) -> Result<T, ParamError> {
        let map = value.as_object().cloned().unwrap_or_default();
        T::from_params(&ParamReader::new(&map))
    }

    #[test]
    fn image_defaults() {
        let layer = ImageInputLayer::from_params(&ParamReader::new(&Map::new())).unwrap();
        assert_eq!(
            layer.config(),
            json!({ "input_type": "IMAGE", "shape": [224, 224], "channels": 3, "color_mode": "rgb" })
        );
    }

    #[test]
    fn text_overrides() {
        let layer: TextInputLayer = build(json!({ "vocab_size": 500, "tokenizer": "char" })).unwrap();
        assert_eq!(layer.vocab_size, 500);
        assert_eq!(layer.sequence_length, TextInputLayer::DEFAULT_SEQUENCE_LENGTH);
        assert_eq!(layer.tokenizer, "char");
    }

    #[test]
    fn tabular_feature_count_is_optional_but_positive() {
        let layer: TabularInputLayer = build(json!({})).unwrap();
        assert_eq!(layer.config()["num_features"], Value::Null);
        assert_eq!(layer.config()["feature_types"], json!([]));

        let layer: TabularInputLayer =
            build(json!({ "num_features": 12, "feature_types": ["numeric", "categorical"] })).unwrap();
        assert_eq!(layer.num_features, Some(12));

        assert!(build::<TabularInputLayer>(json!({ "num_features": 0 })).is_err());
    }

    #[test]
    fn audio_keeps_mfcc_count_and_fractional_duration() {
        let layer: AudioInputLayer = build(json!({ "duration": 2.5, "num_mfcc": 20 })).unwrap();
        let config = layer.config();
        assert_eq!(config["duration"], 2.5);
        assert_eq!(config["num_mfcc"], 20);
        assert_eq!(config["channels"], 1);
    }

    #[test]
    fn video_frame_size_must_be_integers() {
        let err = build::<VideoInputLayer>(json!({ "frame_size": [128, "wide"] })).unwrap_err();
        assert!(matches!(err, ParamError::WrongType { .. }));
    }

    #[test]
    fn every_modality_maps_to_its_own_kind_and_icon() {
        use crate::ai::params::ParamEnum;
        for input_type in InputType::VARIANTS {
            let kind = input_type.layer_kind();
            assert_eq!(kind.parent(), Some(LayerKind::InputLayer));
            assert_eq!(kind.icon(), Some(input_type.icon_key()));
        }
    }
}
