use serde::Serialize;
use std::collections::BTreeMap;

use super::icons::IconLibrary;
use super::inputs::InputType;
use super::layers::{LayerCategory, LayerKind};
use super::params::{ParamEnum, ParamSpec};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SvgRepresentation {
    pub svg_content: String,
    // Only the input family carries one icon per modality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_representations: Option<BTreeMap<&'static str, String>>,
}

/// What the client needs to offer a layer type in its palette and configure it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerTypeInfo {
    #[serde(rename = "type")]
    pub entry_type: &'static str,
    pub name: &'static str,
    pub category: LayerCategory,
    pub parent: Option<&'static str>,
    pub params: Vec<ParamSpec>,
    pub svg_representation: Option<SvgRepresentation>,
}

/// Parameter schema of `kind` with everything it inherits.
///
/// Ancestors are visited root first. A parameter re-declared further down replaces
/// the inherited entry in place, so names stay unique and keep their ancestor's
/// position. The input family base additionally advertises the parameters of every
/// modality, first declaration winning, since clients configure all modalities
/// through it.
pub fn merged_params(kind: LayerKind) -> Vec<ParamSpec> {
    let mut params = Vec::new();
    for ancestor in kind.ancestry() {
        for spec in ancestor.own_params() {
            merge_param(&mut params, spec, true);
        }
    }
    if kind == LayerKind::InputLayer {
        for modality in kind.children() {
            for spec in modality.own_params() {
                merge_param(&mut params, spec, false);
            }
        }
    }
    params
}

fn merge_param(params: &mut Vec<ParamSpec>, spec: ParamSpec, replace: bool) {
    match params.iter_mut().find(|p| p.name == spec.name) {
        Some(existing) if replace => *existing = spec,
        Some(_) => {}
        None => params.push(spec),
    }
}

pub struct LayerCatalog {
    icons: IconLibrary,
}

impl LayerCatalog {
    pub fn new(icons: IconLibrary) -> Self {
        Self { icons }
    }

    pub fn list(&self) -> Vec<LayerTypeInfo> {
        LayerKind::CATALOG.iter().map(|kind| self.describe(*kind)).collect()
    }

    pub fn lookup(&self, name: &str) -> Option<LayerTypeInfo> {
        LayerKind::from_name(name).map(|kind| self.describe(kind))
    }

    pub fn describe(&self, kind: LayerKind) -> LayerTypeInfo {
        LayerTypeInfo {
            entry_type: "layer",
            name: kind.name(),
            category: kind.category(),
            parent: kind.parent().map(LayerKind::name),
            params: merged_params(kind),
            svg_representation: self.svg_for(kind),
        }
    }

    fn svg_for(&self, kind: LayerKind) -> Option<SvgRepresentation> {
        let svg_content = self.icons.get(kind.icon()?)?.to_string();
        let all_representations = (kind == LayerKind::InputLayer).then(|| self.input_representations());
        Some(SvgRepresentation { svg_content, all_representations })
    }

    // Modalities without an icon of their own show the image icon
    fn input_representations(&self) -> BTreeMap<&'static str, String> {
        let fallback = self.icons.get(InputType::Image.icon_key());
        InputType::VARIANTS
            .iter()
            .filter_map(|input_type| {
                let svg = self.icons.get(input_type.icon_key()).or_else(|| {
                    tracing::warn!("No icon for {} input, using IMAGE", input_type.name());
                    fallback
                })?;
                Some((input_type.name(), svg.to_string()))
            })
            .collect()
    }
}

impl Default for LayerCatalog {
    fn default() -> Self {
        Self::new(IconLibrary::embedded())
    }
}
