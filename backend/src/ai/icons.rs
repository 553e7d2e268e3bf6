use std::collections::HashMap;
use std::fs;
use std::path::Path;

// Icons compiled into the binary, keyed by their path under `assets/`
const EMBEDDED: &[(&str, &str)] = &[
    ("convolutional_layer.svg", include_str!("../../assets/convolutional_layer.svg")),
    ("pooling_layer.svg", include_str!("../../assets/pooling_layer.svg")),
    ("dense_layer.svg", include_str!("../../assets/dense_layer.svg")),
    ("dropout_layer.svg", include_str!("../../assets/dropout_layer.svg")),
    ("embedding_layer.svg", include_str!("../../assets/embedding_layer.svg")),
    ("attention_layer.svg", include_str!("../../assets/attention_layer.svg")),
    ("relu.svg", include_str!("../../assets/relu.svg")),
    ("leaky_relu.svg", include_str!("../../assets/leaky_relu.svg")),
    ("tanh.svg", include_str!("../../assets/tanh.svg")),
    ("sigmoid.svg", include_str!("../../assets/sigmoid.svg")),
    ("softmax.svg", include_str!("../../assets/softmax.svg")),
    ("identity.svg", include_str!("../../assets/identity.svg")),
    ("input/input_image.svg", include_str!("../../assets/input/input_image.svg")),
    ("input/input_text.svg", include_str!("../../assets/input/input_text.svg")),
    ("input/input_tabular.svg", include_str!("../../assets/input/input_tabular.svg")),
    ("input/input_audio.svg", include_str!("../../assets/input/input_audio.svg")),
    ("input/input_video.svg", include_str!("../../assets/input/input_video.svg")),
];

/// SVG documents for the layer palette.
#[derive(Debug, Clone)]
pub struct IconLibrary {
    icons: HashMap<&'static str, String>,
}

impl IconLibrary {
    pub fn embedded() -> Self {
        let icons = EMBEDDED.iter().map(|(key, svg)| (*key, svg.to_string())).collect();
        Self { icons }
    }

    /// Loads icons from an asset directory laid out like `assets/`. Files that are
    /// missing or unreadable keep their embedded version.
    pub fn load(dir: &Path) -> Self {
        let mut library = Self::embedded();
        let mut loaded = 0;
        for (key, svg) in library.icons.iter_mut() {
            let path = dir.join(key);
            match fs::read_to_string(&path) {
                Ok(content) => {
                    *svg = content;
                    loaded += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to load icon {}: {}, using built-in copy", path.display(), e);
                }
            }
        }
        tracing::info!("🎨 Loaded {}/{} icons from {}", loaded, EMBEDDED.len(), dir.display());
        library
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.icons.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn remove(&mut self, key: &str) {
        self.icons.remove(key);
    }
}

impl Default for IconLibrary {
    fn default() -> Self {
        Self::embedded()
    }
}
