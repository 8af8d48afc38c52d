use mapsim::input_modeling::generator;
use mapsim::input_modeling::*;
use mapsim::output_analysis::IndependentSample;
use mapsim::utils::errors::{ParameterError, SimulationError};

fn epsilon() -> f64 {
    0.03
}

fn sample(variable: &mut ContinuousRandomVariable, seed: u64, count: usize) -> Vec<f64> {
    let mut uniform_rng = UniformRNG::new(seed);
    (0..count)
        .map(|_| variable.random_variate(&mut uniform_rng).unwrap())
        .collect()
}

#[test]
fn composite_variables_load_from_json() {
    let configurations = [
        r#"{"map": {"parameter": {"d0": [[-3.0, 1.0], [0.5, -1.5]], "d1": [[1.5, 0.5], [0.2, 0.8]]}}}"#,
        r#"{"mmpp2": {"parameter": {"lambda0": 2.0, "lambda1": 1.0, "sigma0": 1.0, "sigma1": 1.0}}}"#,
        r#"{"phaseType": {"parameter": {"alpha": [0.4, 0.6], "t": [[-2.0, 1.0], [0.0, -4.0]]}}}"#,
        r#"{"coxian": {"lambda0": 3.0, "lambda1": 0.5, "phi0": 0.4}}"#,
        r#"{"hyperExp": {"p": 0.25, "lambda1": 2.0, "lambda2": 0.5}}"#,
    ];
    for configuration in configurations.iter() {
        let mut variable: ContinuousRandomVariable = serde_json::from_str(configuration).unwrap();
        let expected = variable.mean().unwrap();
        let points = sample(&mut variable, 7, 50000);
        let sample = IndependentSample::post(points).unwrap();
        assert!(
            (sample.point_estimate_mean() - expected).abs() / expected < epsilon(),
            "{}",
            configuration
        );
    }
}

#[test]
fn elementary_variables_load_from_yaml() {
    let configuration = r#"
normal:
  mean: 11.0
  std_dev: 3.0
"#;
    let variable: ContinuousRandomVariable = serde_yaml::from_str(configuration).unwrap();
    assert_eq!(variable.mean().unwrap(), 11.0);
    assert_eq!(variable.variance().unwrap(), 9.0);

    let configuration = r#"
map:
  parameter:
    d0:
      - [-2.0, 2.0]
      - [0.0, -2.0]
    d1:
      - [0.0, 0.0]
      - [2.0, 0.0]
"#;
    let variable: ContinuousRandomVariable = serde_yaml::from_str(configuration).unwrap();
    assert!((variable.mean().unwrap() - 1.0).abs() < 1e-9);
    assert!((variable.variance().unwrap() - 0.5).abs() < 1e-9);
}

#[test]
fn invalid_generators_fail_loading() {
    // Row 0 of D0 sums to 2e-6, beyond the tolerance
    let configuration =
        r#"{"map": {"parameter": {"d0": [[-2.0, 2.000002], [1.0, -1.0]], "d1": [[0.0, 0.0], [0.0, 0.0]]}}}"#;
    let error = serde_json::from_str::<ContinuousRandomVariable>(configuration).unwrap_err();
    assert!(error.to_string().contains("Row 0"));

    assert!(matches!(
        MapParameter::new(
            &[vec![-2.0, 2.000002], vec![1.0, -1.0]],
            &[vec![0.0, 0.0], vec![0.0, 0.0]],
        ),
        Err(ParameterError::PositiveRowSum { row: 0, .. })
    ));

    let configuration = r#"{"phaseType": {"parameter": {"alpha": [0.5, 0.6], "t": [[-2.0, 1.0], [0.0, -4.0]]}}}"#;
    assert!(serde_json::from_str::<ContinuousRandomVariable>(configuration).is_err());
}

#[test]
fn stationary_vectors_are_distributions() {
    let generators = [
        (
            vec![vec![-2.0, 2.0], vec![0.0, -2.0]],
            vec![vec![0.0, 0.0], vec![2.0, 0.0]],
        ),
        (
            vec![vec![-3.0, 1.0], vec![0.5, -1.5]],
            vec![vec![1.5, 0.5], vec![0.2, 0.8]],
        ),
        (
            vec![
                vec![-5.0, 1.0, 1.0],
                vec![0.0, -2.0, 0.5],
                vec![0.2, 0.3, -1.0],
            ],
            vec![
                vec![1.0, 1.0, 1.0],
                vec![0.5, 0.5, 0.5],
                vec![0.0, 0.5, 0.0],
            ],
        ),
    ];
    for (d0, d1) in generators.iter() {
        let parameter = MapParameter::new(d0, d1).unwrap();
        let stationary = parameter.stationary();
        assert!(stationary.iter().all(|probability| *probability >= -1e-12));
        assert!((stationary.sum() - 1.0).abs() < 1e-6);
        // pi is invariant under the embedded chain
        let embedded = parameter.fundamental() * parameter.d1();
        let image = embedded.transpose() * stationary;
        assert!((image - stationary).norm() < 1e-9);
        let recomputed =
            generator::stationary_vector(parameter.fundamental(), parameter.d1()).unwrap();
        assert!((recomputed - stationary).norm() < 1e-12);
    }
}

#[test]
fn seeded_streams_are_reproducible() {
    let configuration = r#"{"mmpp2": {"parameter": {"lambda0": 5.0, "lambda1": 0.5, "sigma0": 0.2, "sigma1": 0.1}}}"#;
    let mut left: ContinuousRandomVariable = serde_json::from_str(configuration).unwrap();
    let mut right = left.clone();
    assert_eq!(sample(&mut left, 13, 1000), sample(&mut right, 13, 1000));
}

#[test]
fn sampler_state_survives_serialization() {
    let parameter = MapParameter::new(
        &[vec![-3.0, 1.0], vec![0.5, -1.5]],
        &[vec![1.5, 0.5], vec![0.2, 0.8]],
    )
    .unwrap();
    let mut map = ContinuousRandomVariable::Map(Map::new(parameter));
    let mut uniform_rng = UniformRNG::new(17);
    (0..10).for_each(|_| {
        map.random_variate(&mut uniform_rng).unwrap();
    });
    let saved_map = serde_json::to_string(&map).unwrap();
    let saved_rng = serde_json::to_string(&uniform_rng).unwrap();
    let mut resumed_map: ContinuousRandomVariable = serde_json::from_str(&saved_map).unwrap();
    let mut resumed_rng: UniformRNG = serde_json::from_str(&saved_rng).unwrap();
    (0..100).for_each(|_| {
        assert_eq!(
            map.random_variate(&mut uniform_rng).unwrap(),
            resumed_map.random_variate(&mut resumed_rng).unwrap()
        );
    });
}

#[test]
fn fitted_composites_match_requested_moments() {
    let coxian = ContinuousRandomVariable::Coxian(Coxian::from_mean_cv(3.0, 0.9).unwrap());
    let hyper_exp = ContinuousRandomVariable::HyperExp(HyperExp::from_mean_cv(3.0, 1.8).unwrap());
    for (variable, cv) in [(coxian, 0.9), (hyper_exp, 1.8)].iter() {
        let mean = variable.mean().unwrap();
        assert!((mean - 3.0).abs() < 1e-9);
        assert!((variable.variance().unwrap().sqrt() / mean - cv).abs() < 1e-9);
    }
}

#[test]
fn unsupported_queries_are_reported() {
    let empirical = ContinuousRandomVariable::Empirical {
        values: vec![1.0, 2.0],
        probabilities: vec![0.5, 0.5],
    };
    assert!(matches!(
        empirical.with_mean(3.0),
        Err(SimulationError::UnsupportedOperation(_))
    ));
    let mmpp2 = ContinuousRandomVariable::Mmpp2(Mmpp2::new(
        Mmpp2Parameter::new(5.0, 0.5, 0.2, 0.1).unwrap(),
    ));
    assert_eq!(mmpp2.pdf(1.0).unwrap(), 0.0);
    assert_eq!(mmpp2.cdf(1.0).unwrap(), 0.0);
}

#[test]
fn persisted_phases_outside_the_process_fail_loading() {
    let configurations = [
        r#"{"mmpp2": {"parameter": {"lambda0": 2.0, "lambda1": 1.0, "sigma0": 1.0, "sigma1": 1.0}, "phase": 5}}"#,
        r#"{"map": {"parameter": {"d0": [[-3.0, 1.0], [0.5, -1.5]], "d1": [[1.5, 0.5], [0.2, 0.8]]}, "phase": 9}}"#,
    ];
    for configuration in configurations.iter() {
        let error = serde_json::from_str::<ContinuousRandomVariable>(configuration).unwrap_err();
        assert!(error.to_string().contains("out of range"), "{}", configuration);
    }
}
