use serde_json::{json, Value};

use super::layers::{Layer, LayerKind, LayerType};
use super::params::{ParamError, ParamReader, ParamSpec};

// Activation functions without any configuration of their own
macro_rules! plain_activation {
    ($($ty:ident),+ $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, Default, PartialEq)]
            pub struct $ty;

            impl Layer for $ty {
                fn kind(&self) -> LayerKind {
                    Self::KIND
                }

                fn config(&self) -> Value {
                    json!({})
                }
            }

            impl LayerType for $ty {
                const KIND: LayerKind = LayerKind::$ty;

                fn param_specs() -> Vec<ParamSpec> {
                    Vec::new()
                }

                fn from_params(_params: &ParamReader<'_>) -> Result<Self, ParamError> {
                    Ok($ty)
                }
            }
        )+
    };
}

plain_activation!(ReLUFunction, TanhFunction, SigmoidFunction, SoftMaxFunction, IdentityFunction);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeakyReLUFunction {
    pub negative_slope: f64,
}

impl LeakyReLUFunction {
    pub const DEFAULT_NEGATIVE_SLOPE: f64 = 0.01;
}

impl Layer for LeakyReLUFunction {
    fn kind(&self) -> LayerKind {
        Self::KIND
    }

    fn config(&self) -> Value {
        json!({ "negative_slope": self.negative_slope })
    }
}

impl LayerType for LeakyReLUFunction {
    const KIND: LayerKind = LayerKind::LeakyReLUFunction;

    fn param_specs() -> Vec<ParamSpec> {
        vec![ParamSpec::float("negative_slope", Self::DEFAULT_NEGATIVE_SLOPE)
            .min(0.0)
            .step(0.01)]
    }

    fn from_params(params: &ParamReader<'_>) -> Result<Self, ParamError> {
        Ok(Self {
            negative_slope: params.float_at_least("negative_slope", Self::DEFAULT_NEGATIVE_SLOPE, 0.0)?,
        })
    }
}
