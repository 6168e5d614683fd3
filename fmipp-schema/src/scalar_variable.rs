use yaserde_derive::{YaDeserialize, YaSerialize};

use crate::default_wrapper;

/// Enumeration that defines the causality of the variable.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, YaSerialize, YaDeserialize)]
pub enum Causality {
    #[yaserde(rename = "input")]
    Input,
    #[yaserde(rename = "output")]
    Output,
    #[default]
    #[yaserde(rename = "internal")]
    Internal,
    #[yaserde(rename = "none")]
    None,
}

/// Enumeration that defines the time dependency of the variable.
///
/// The default is [`Variability::Continuous`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, YaSerialize, YaDeserialize)]
pub enum Variability {
    /// The value of the variable never changes.
    #[yaserde(rename = "constant")]
    Constant,
    /// The value of the variable is fixed after initialization.
    #[yaserde(rename = "parameter")]
    Parameter,
    /// Only changes at event instants.
    #[yaserde(rename = "discrete")]
    Discrete,
    #[default]
    #[yaserde(rename = "continuous")]
    Continuous,
}

#[derive(Clone, Default, PartialEq, Debug, YaSerialize, YaDeserialize)]
pub struct RealType {
    #[yaserde(attribute = true, rename = "declaredType")]
    pub declared_type: Option<String>,

    #[yaserde(attribute = true)]
    pub start: Option<f64>,

    #[yaserde(attribute = true)]
    pub fixed: Option<bool>,

    #[yaserde(attribute = true)]
    pub nominal: Option<f64>,

    #[yaserde(attribute = true)]
    pub min: Option<f64>,

    #[yaserde(attribute = true)]
    pub max: Option<f64>,
}

#[derive(Clone, Default, PartialEq, Debug, YaSerialize, YaDeserialize)]
pub struct IntegerType {
    #[yaserde(attribute = true, rename = "declaredType")]
    pub declared_type: Option<String>,

    #[yaserde(attribute = true)]
    pub start: Option<i32>,

    #[yaserde(attribute = true)]
    pub fixed: Option<bool>,
}

#[derive(Clone, Default, PartialEq, Debug, YaSerialize, YaDeserialize)]
pub struct BooleanType {
    #[yaserde(attribute = true, rename = "declaredType")]
    pub declared_type: Option<String>,

    #[yaserde(attribute = true)]
    pub start: Option<bool>,

    #[yaserde(attribute = true)]
    pub fixed: Option<bool>,
}

#[derive(Clone, Default, PartialEq, Debug, YaSerialize, YaDeserialize)]
pub struct StringType {
    #[yaserde(attribute = true, rename = "declaredType")]
    pub declared_type: Option<String>,

    #[yaserde(attribute = true)]
    pub start: Option<String>,
}

/// A single `ScalarVariable` entry of the `ModelVariables` list.
///
/// Exactly one of the type children (`Real`, `Integer`, `Boolean`, `String`) is expected to be
/// present. `Enumeration` variables are not modelled and show up with all children empty.
#[derive(Clone, Default, Debug, PartialEq, YaSerialize, YaDeserialize)]
pub struct ScalarVariable {
    /// The full, unique name of the variable.
    #[yaserde(attribute = true)]
    pub name: String,

    /// A handle of the variable to efficiently identify the variable value in the model interface.
    #[yaserde(attribute = true, rename = "valueReference")]
    pub value_reference: u32,

    #[yaserde(attribute = true)]
    pub description: Option<String>,

    #[yaserde(attribute = true, default = "default_wrapper")]
    pub causality: Causality,

    #[yaserde(attribute = true, default = "default_wrapper")]
    pub variability: Variability,

    #[yaserde(rename = "Real")]
    pub real: Option<RealType>,

    #[yaserde(rename = "Integer")]
    pub integer: Option<IntegerType>,

    #[yaserde(rename = "Boolean")]
    pub boolean: Option<BooleanType>,

    #[yaserde(rename = "String")]
    pub string: Option<StringType>,
}

impl ScalarVariable {
    pub fn is_real(&self) -> bool {
        self.real.is_some()
    }

    pub fn is_continuous_input(&self) -> bool {
        self.is_real() && self.causality == Causality::Input
    }

    /// Start value of a `Real` variable, if one was declared.
    pub fn real_start(&self) -> Option<f64> {
        self.real.as_ref().and_then(|r| r.start)
    }
}
