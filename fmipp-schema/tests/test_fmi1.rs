use fmipp_schema::{
    traits::{DefaultExperiment, FmiModelDescription},
    Causality, Error, Fmi1ModelDescription, MajorVersion, Variability,
};

fn bouncing_ball() -> Fmi1ModelDescription {
    let _ = env_logger::builder().is_test(true).try_init();
    let xml = std::fs::read_to_string(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/BouncingBall.xml"),
    )
    .unwrap();
    fmipp_schema::deserialize(&xml).unwrap()
}

#[test]
fn test_model_attributes() {
    let md = bouncing_ball();
    assert_eq!(md.fmi_version, "1.0");
    assert_eq!(md.model_name(), "bouncingBall");
    assert_eq!(md.model_identifier, "bouncingBall");
    assert_eq!(md.guid, "{8c4e810f-3df3-4a00-8276-176fa3c9f003}");
    assert_eq!(md.num_states(), 2);
    assert_eq!(md.num_event_indicators(), 1);
    assert_eq!(md.num_variables(), 7);
    assert_eq!(md.major_version().unwrap(), MajorVersion::FMI1);
    md.validate().unwrap();
}

#[test]
fn test_default_experiment() {
    let md = bouncing_ball();
    let de = md.default_experiment.as_ref().unwrap();
    assert_eq!(de.start_time(), Some(0.0));
    assert_eq!(de.stop_time(), Some(3.0));
    assert_eq!(de.tolerance(), Some(1e-6));
}

#[test]
fn test_variable_lookup() {
    let md = bouncing_ball();
    assert_eq!(md.value_reference("v").unwrap(), 2);
    assert_eq!(md.value_reference("e").unwrap(), 5);
    assert_eq!(
        md.value_reference("nope"),
        Err(Error::VariableNotFound("nope".to_owned()))
    );

    let g = md.model_variable_by_name("g").unwrap();
    assert_eq!(g.variability, Variability::Parameter);
    assert_eq!(g.real_start(), Some(9.81));

    let outputs: Vec<_> = md
        .variables_with_causality(Causality::Output)
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(outputs, ["bounces"]);
}

#[test]
fn test_bad_version() {
    let md: Fmi1ModelDescription = r#"<fmiModelDescription fmiVersion="7.1" modelName="m"
        modelIdentifier="m" guid="" numberOfContinuousStates="0" numberOfEventIndicators="0">
        <ModelVariables/>
        </fmiModelDescription>"#
        .parse()
        .unwrap();
    assert!(matches!(
        md.major_version(),
        Err(Error::UnsupportedVersion(_))
    ));
}

#[test]
fn test_omitted_attributes_take_defaults() {
    let md = bouncing_ball();
    let h = md.model_variable_by_name("h").unwrap();
    assert_eq!(h.causality, Causality::Internal);
    assert_eq!(h.variability, Variability::Continuous);
    assert_eq!(h.real_start(), Some(1.0));

    let md: Fmi1ModelDescription = r#"<fmiModelDescription fmiVersion="1.0" modelName="m"
        modelIdentifier="m" guid="{1}"/>"#
        .parse()
        .unwrap();
    assert_eq!(md.num_states(), 0);
    assert_eq!(md.num_event_indicators(), 0);
    assert_eq!(md.num_variables(), 0);
}
