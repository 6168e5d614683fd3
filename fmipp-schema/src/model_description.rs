use itertools::Itertools;
use yaserde_derive::{YaDeserialize, YaSerialize};

use crate::{default_wrapper, traits, Causality, Error, ScalarVariable, ValueReference};

/// Root element of an FMI 1.0 `modelDescription.xml`.
#[derive(Default, Debug, YaSerialize, YaDeserialize)]
#[yaserde(rename = "fmiModelDescription")]
pub struct Fmi1ModelDescription {
    /// Version of FMI, "1.0" for this schema.
    #[yaserde(attribute = true, rename = "fmiVersion")]
    pub fmi_version: String,

    #[yaserde(attribute = true, rename = "modelName")]
    pub model_name: String,

    /// Prefix of every exported C function of the shared library.
    #[yaserde(attribute = true, rename = "modelIdentifier")]
    pub model_identifier: String,

    /// Fingerprint of the xml-file content, passed to `fmiInstantiateModel`.
    #[yaserde(attribute = true)]
    pub guid: String,

    #[yaserde(attribute = true)]
    pub description: Option<String>,

    #[yaserde(attribute = true)]
    pub author: Option<String>,

    #[yaserde(attribute = true)]
    pub version: Option<String>,

    #[yaserde(attribute = true, rename = "generationTool")]
    pub generation_tool: Option<String>,

    #[yaserde(attribute = true, rename = "generationDateAndTime")]
    pub generation_date_and_time: Option<String>,

    #[yaserde(attribute = true, rename = "variableNamingConvention")]
    pub variable_naming_convention: Option<String>,

    #[yaserde(attribute = true, default = "default_wrapper", rename = "numberOfContinuousStates")]
    pub number_of_continuous_states: u32,

    #[yaserde(attribute = true, default = "default_wrapper", rename = "numberOfEventIndicators")]
    pub number_of_event_indicators: u32,

    #[yaserde(rename = "DefaultExperiment")]
    pub default_experiment: Option<DefaultExperiment>,

    #[yaserde(rename = "ModelVariables", default = "default_wrapper")]
    pub model_variables: ModelVariables,
}

#[derive(Default, Debug, PartialEq, YaSerialize, YaDeserialize)]
pub struct DefaultExperiment {
    #[yaserde(attribute = true, rename = "startTime")]
    pub start_time: Option<f64>,

    #[yaserde(attribute = true, rename = "stopTime")]
    pub stop_time: Option<f64>,

    #[yaserde(attribute = true)]
    pub tolerance: Option<f64>,
}

impl traits::DefaultExperiment for DefaultExperiment {
    fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    fn stop_time(&self) -> Option<f64> {
        self.stop_time
    }

    fn tolerance(&self) -> Option<f64> {
        self.tolerance
    }
}

#[derive(Default, Debug, PartialEq, YaSerialize, YaDeserialize)]
pub struct ModelVariables {
    #[yaserde(rename = "ScalarVariable")]
    pub variables: Vec<ScalarVariable>,
}

impl Fmi1ModelDescription {
    /// Number of continuous states (and derivatives)
    pub fn num_states(&self) -> usize {
        self.number_of_continuous_states as usize
    }

    pub fn num_event_indicators(&self) -> usize {
        self.number_of_event_indicators as usize
    }

    /// Total number of variables
    pub fn num_variables(&self) -> usize {
        self.model_variables.variables.len()
    }

    pub fn get_model_variables(&self) -> impl Iterator<Item = &ScalarVariable> {
        self.model_variables.variables.iter()
    }

    pub fn model_variable_by_name(&self, name: &str) -> Result<&ScalarVariable, Error> {
        self.model_variables
            .variables
            .iter()
            .find(|var| var.name == name)
            .ok_or_else(|| Error::VariableNotFound(name.to_owned()))
    }

    /// Look up the value reference of the variable called `name`.
    pub fn value_reference(&self, name: &str) -> Result<ValueReference, Error> {
        self.model_variable_by_name(name)
            .map(|var| var.value_reference)
    }

    /// Variables with the given causality, in declaration order.
    pub fn variables_with_causality(
        &self,
        causality: Causality,
    ) -> impl Iterator<Item = &ScalarVariable> {
        self.get_model_variables()
            .filter(move |var| var.causality == causality)
    }

    /// Check structural consistency of the description.
    ///
    /// Variable names must be unique and the model identifier must be set since every C symbol
    /// of the binary is prefixed with it.
    pub fn validate(&self) -> Result<(), Error> {
        if self.model_identifier.is_empty() {
            return Err(Error::Model("missing modelIdentifier".to_owned()));
        }
        if let Some(dup) = self
            .get_model_variables()
            .map(|var| var.name.as_str())
            .duplicates()
            .next()
        {
            return Err(Error::Model(format!("duplicate variable name '{dup}'")));
        }
        Ok(())
    }
}

impl traits::FmiModelDescription for Fmi1ModelDescription {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn version_string(&self) -> &str {
        &self.fmi_version
    }
}

impl std::str::FromStr for Fmi1ModelDescription {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::deserialize(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FmiModelDescription;

    #[test]
    fn test_default_experiment() {
        let s = r#"<DefaultExperiment startTime="0" stopTime="3" tolerance="0.0001"/>"#;
        let x: DefaultExperiment = yaserde::de::from_str(s).unwrap();
        assert_eq!(x.start_time, Some(0.0));
        assert_eq!(x.stop_time, Some(3.0));
        assert_eq!(x.tolerance, Some(0.0001));
    }

    #[test]
    fn test_duplicate_names() {
        let s = r#"<fmiModelDescription fmiVersion="1.0" modelName="dup" modelIdentifier="dup"
            guid="{0}" numberOfContinuousStates="0" numberOfEventIndicators="0">
            <ModelVariables>
                <ScalarVariable name="x" valueReference="0"><Real/></ScalarVariable>
                <ScalarVariable name="x" valueReference="1"><Real/></ScalarVariable>
            </ModelVariables>
        </fmiModelDescription>"#;
        let md: Fmi1ModelDescription = s.parse().unwrap();
        assert_eq!(md.major_version().unwrap(), crate::MajorVersion::FMI1);
        assert!(matches!(md.validate(), Err(Error::Model(_))));
    }
}
