use serde::Serialize;
use serde_json::{Map, Value};

// Semantic type reported to the client for each parameter. The client picks its
// input widget from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Boolean,
    Enum,
    List,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("parameter '{name}' expects {expected}, got {found}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: String,
    },
    #[error("parameter '{name}' must be at least {min}, got {value}")]
    BelowMinimum { name: String, value: f64, min: f64 },
}

/// A closed set of named choices for an `enum` parameter.
///
/// The upper-case `name` travels on the wire; `label` is for display only.
pub trait ParamEnum: Copy + PartialEq + Sized + 'static {
    const TYPE_NAME: &'static str;
    const VARIANTS: &'static [Self];

    fn name(self) -> &'static str;
    fn label(self) -> &'static str;
    fn default_variant() -> Self;

    fn from_name(name: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(name) || v.label().eq_ignore_ascii_case(name))
    }

    fn names() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|v| v.name()).collect()
    }
}

// Declares a `ParamEnum` with its wire names, labels and default variant.
macro_rules! param_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $ty:ident {
            $($variant:ident => ($name:literal, $label:literal)),+ $(,)?
        }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $ty {
            $($variant),+
        }

        impl $crate::ai::params::ParamEnum for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);
            const VARIANTS: &'static [Self] = &[$($ty::$variant),+];

            fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($ty::$variant => $label),+
                }
            }

            fn default_variant() -> Self {
                $ty::$default
            }
        }

        impl ::serde::Serialize for $ty {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::ai::params::ParamEnum::name(*self))
            }
        }
    };
}

pub(crate) use param_enum;

/// Schema entry for one configurable parameter of a layer type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    pub default: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl ParamSpec {
    fn new(name: &'static str, kind: ParamKind, default: Value) -> Self {
        Self {
            name,
            kind,
            default,
            enum_type: None,
            enum_values: Vec::new(),
            min: None,
            step: None,
        }
    }

    pub fn integer(name: &'static str, default: u64) -> Self {
        Self::new(name, ParamKind::Number, Value::from(default)).step(1.0)
    }

    pub fn optional_integer(name: &'static str) -> Self {
        Self::new(name, ParamKind::Number, Value::Null).step(1.0)
    }

    pub fn float(name: &'static str, default: f64) -> Self {
        Self::new(name, ParamKind::Number, Value::from(default))
    }

    pub fn text(name: &'static str, default: &str) -> Self {
        Self::new(name, ParamKind::String, Value::from(default))
    }

    pub fn list(name: &'static str, default: Value) -> Self {
        Self::new(name, ParamKind::List, default)
    }

    pub fn choice<E: ParamEnum>(name: &'static str) -> Self {
        let mut spec = Self::new(name, ParamKind::Enum, Value::from(E::default_variant().name()));
        spec.enum_type = Some(E::TYPE_NAME);
        spec.enum_values = E::names();
        spec
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }
}

pub fn check_minimum(name: &str, value: f64, min: f64) -> Result<(), ParamError> {
    if value < min {
        return Err(ParamError::BelowMinimum { name: name.to_string(), value, min });
    }
    Ok(())
}

// Largest float whose integer value is exact (2^53)
const MAX_EXACT_FLOAT_INTEGER: f64 = 9_007_199_254_740_992.0;

// Short description of a JSON value for error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}

/// Read access to the `params` object a client sends when adding a layer.
///
/// Missing keys, explicit `null`s and blank strings all resolve to the caller's default.
/// The client leaves untouched form fields as `""`, and numbers may arrive as strings
/// because form inputs produce text.
pub struct ParamReader<'a> {
    params: &'a Map<String, Value>,
}

impl<'a> ParamReader<'a> {
    pub fn new(params: &'a Map<String, Value>) -> Self {
        Self { params }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.params.get(name).filter(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
    }

    fn wrong_type(name: &str, expected: &'static str, found: &Value) -> ParamError {
        ParamError::WrongType { name: name.to_string(), expected, found: describe(found) }
    }

    fn as_integer(name: &str, value: &Value) -> Result<u64, ParamError> {
        let expected = "a non-negative integer";
        match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| (0.0..=MAX_EXACT_FLOAT_INTEGER).contains(f) && f.fract() == 0.0)
                        .map(|f| f as u64)
                })
                .ok_or_else(|| Self::wrong_type(name, expected, value)),
            Value::String(s) => s.trim().parse::<u64>().map_err(|_| Self::wrong_type(name, expected, value)),
            _ => Err(Self::wrong_type(name, expected, value)),
        }
    }

    pub fn optional_integer(&self, name: &str) -> Result<Option<u64>, ParamError> {
        self.get(name).map(|v| Self::as_integer(name, v)).transpose()
    }

    pub fn integer(&self, name: &str, default: u64) -> Result<u64, ParamError> {
        Ok(self.optional_integer(name)?.unwrap_or(default))
    }

    pub fn integer_at_least(&self, name: &str, default: u64, min: u64) -> Result<u64, ParamError> {
        let value = self.integer(name, default)?;
        check_minimum(name, value as f64, min as f64)?;
        Ok(value)
    }

    pub fn float(&self, name: &str, default: f64) -> Result<f64, ParamError> {
        let Some(value) = self.get(name) else {
            return Ok(default);
        };
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        };
        parsed.ok_or_else(|| Self::wrong_type(name, "a number", value))
    }

    pub fn float_at_least(&self, name: &str, default: f64, min: f64) -> Result<f64, ParamError> {
        let value = self.float(name, default)?;
        check_minimum(name, value, min)?;
        Ok(value)
    }

    pub fn text(&self, name: &str, default: &str) -> Result<String, ParamError> {
        match self.get(name) {
            None => Ok(default.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(Self::wrong_type(name, "a string", other)),
        }
    }

    pub fn optional_shape(&self, name: &str) -> Result<Option<Vec<u64>>, ParamError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let items = value
            .as_array()
            .ok_or_else(|| Self::wrong_type(name, "a list of integers", value))?;
        items
            .iter()
            .map(|item| Self::as_integer(name, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    pub fn shape(&self, name: &str, default: &[u64]) -> Result<Vec<u64>, ParamError> {
        Ok(self.optional_shape(name)?.unwrap_or_else(|| default.to_vec()))
    }

    pub fn string_list(&self, name: &str) -> Result<Vec<String>, ParamError> {
        let Some(value) = self.get(name) else {
            return Ok(Vec::new());
        };
        let expected = "a list of strings";
        let items = value.as_array().ok_or_else(|| Self::wrong_type(name, expected, value))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Self::wrong_type(name, expected, item))
            })
            .collect()
    }

    /// Reads an enum by wire name or label. Unrecognised values fall back to the
    /// enum's default rather than failing the request.
    pub fn choice<E: ParamEnum>(&self, name: &str) -> E {
        let Some(value) = self.get(name) else {
            return E::default_variant();
        };
        match value.as_str().and_then(E::from_name) {
            Some(variant) => variant,
            None => {
                let fallback = E::default_variant();
                tracing::warn!(
                    "Unknown {} value {} for '{}', using {}",
                    E::TYPE_NAME,
                    describe(value),
                    name,
                    fallback.name()
                );
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    param_enum! {
        enum Flavour {
            Plain => ("PLAIN", "Plain"),
            Spicy => ("SPICY", "Spicy"),
        }
        default = Plain;
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn missing_and_null_values_use_defaults() {
        let map = params(json!({ "stride": null }));
        let reader = ParamReader::new(&map);
        assert_eq!(reader.integer("stride", 1).unwrap(), 1);
        assert_eq!(reader.integer("filters", 32).unwrap(), 32);
        assert_eq!(reader.text("tokenizer", "word").unwrap(), "word");
        assert_eq!(reader.shape("shape", &[224, 224]).unwrap(), vec![224, 224]);
        assert!(reader.string_list("feature_types").unwrap().is_empty());
    }

    #[test]
    fn integers_accept_numeric_strings_and_integral_floats() {
        let map = params(json!({ "a": "64", "b": 3.0, "c": 7 }));
        let reader = ParamReader::new(&map);
        assert_eq!(reader.integer("a", 0).unwrap(), 64);
        assert_eq!(reader.integer("b", 0).unwrap(), 3);
        assert_eq!(reader.integer("c", 0).unwrap(), 7);
    }

    #[test]
    fn integers_reject_fractions_negatives_and_text() {
        let map = params(json!({ "a": 2.5, "b": -1, "c": "many", "d": true }));
        let reader = ParamReader::new(&map);
        for name in ["a", "b", "c", "d"] {
            let err = reader.integer(name, 0).unwrap_err();
            assert!(matches!(err, ParamError::WrongType { .. }), "{name}: {err}");
        }
    }

    #[test]
    fn integers_reject_floats_beyond_exact_range() {
        let map = params(json!({ "filters": 1e30, "stride": 9007199254740992.0 }));
        let reader = ParamReader::new(&map);
        let err = reader.integer("filters", 32).unwrap_err();
        assert!(matches!(err, ParamError::WrongType { .. }), "{err}");
        assert_eq!(reader.integer("stride", 1).unwrap(), 9_007_199_254_740_992);
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let map = params(json!({
            "shape": "",
            "target_shape": "  ",
            "feature_types": "",
            "channels": "",
            "duration": " ",
            "color_mode": "",
            "pooling_type": "",
        }));
        let reader = ParamReader::new(&map);
        assert_eq!(reader.shape("shape", &[224, 224]).unwrap(), vec![224, 224]);
        assert_eq!(reader.optional_shape("target_shape").unwrap(), None);
        assert!(reader.string_list("feature_types").unwrap().is_empty());
        assert_eq!(reader.integer("channels", 3).unwrap(), 3);
        assert_eq!(reader.float("duration", 10.0).unwrap(), 10.0);
        assert_eq!(reader.text("color_mode", "rgb").unwrap(), "rgb");
        assert_eq!(reader.choice::<Flavour>("pooling_type"), Flavour::Plain);
    }

    #[test]
    fn integer_at_least_enforces_minimum() {
        let map = params(json!({ "filters": 0 }));
        let err = ParamReader::new(&map).integer_at_least("filters", 32, 1).unwrap_err();
        assert_eq!(
            err,
            ParamError::BelowMinimum { name: "filters".into(), value: 0.0, min: 1.0 }
        );
    }

    #[test]
    fn float_at_least_parses_strings_before_checking() {
        let map = params(json!({ "duration": "-2.5" }));
        let err = ParamReader::new(&map).float_at_least("duration", 10.0, 0.0).unwrap_err();
        assert!(matches!(err, ParamError::BelowMinimum { .. }));
    }

    #[test]
    fn choice_matches_name_or_label_and_falls_back() {
        let map = params(json!({ "a": "SPICY", "b": "spicy", "c": "Sweet", "d": 3 }));
        let reader = ParamReader::new(&map);
        assert_eq!(reader.choice::<Flavour>("a"), Flavour::Spicy);
        assert_eq!(reader.choice::<Flavour>("b"), Flavour::Spicy);
        assert_eq!(reader.choice::<Flavour>("c"), Flavour::Plain);
        assert_eq!(reader.choice::<Flavour>("d"), Flavour::Plain);
        assert_eq!(reader.choice::<Flavour>("missing"), Flavour::Plain);
    }

    #[test]
    fn choice_spec_lists_enum_values() {
        let spec = ParamSpec::choice::<Flavour>("flavour");
        assert_eq!(spec.kind, ParamKind::Enum);
        assert_eq!(spec.enum_type, Some("Flavour"));
        assert_eq!(spec.enum_values, vec!["PLAIN", "SPICY"]);
        assert_eq!(spec.default, json!("PLAIN"));
    }

    #[test]
    fn spec_serializes_without_empty_fields() {
        let spec = ParamSpec::text("color_mode", "rgb");
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value, json!({ "name": "color_mode", "type": "string", "default": "rgb" }));
    }

    #[test]
    fn string_list_rejects_mixed_items() {
        let map = params(json!({ "feature_types": ["numeric", 4] }));
        let err = ParamReader::new(&map).string_list("feature_types").unwrap_err();
        assert!(err.to_string().contains("feature_types"));
    }
}
