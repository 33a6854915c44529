use tig_hardness_predictor::{
    units::{heat_input_from_j_per_mm, HeatInputUnit},
    welding::{heat_input_j_per_mm, ValidationError, WeldingParameters},
};

fn assert_close(actual: f64, expected: f64) {
    let tol = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tol,
        "actual={actual} expected={expected}"
    );
}

#[test]
fn reference_points() {
    // 12 V, 150 A, 5 mm/s → 12·150·60/5
    assert_close(heat_input_j_per_mm(12.0, 150.0, 5.0).unwrap(), 21_600.0);
    assert_close(heat_input_j_per_mm(100.0, 100.0, 2.0).unwrap(), 300_000.0);
    assert_close(heat_input_j_per_mm(10.0, 80.0, 4.0).unwrap(), 12_000.0);
}

#[test]
fn display_units_scale_from_j_per_mm() {
    let q = heat_input_j_per_mm(12.0, 150.0, 5.0).unwrap();
    assert_close(heat_input_from_j_per_mm(q, HeatInputUnit::KilojoulePerMillimeter), 21.6);
    assert_close(heat_input_from_j_per_mm(q, HeatInputUnit::JoulePerInch), 21_600.0 * 25.4);
}

#[test]
fn monotonic_in_each_argument() {
    let base = heat_input_j_per_mm(12.0, 150.0, 5.0).unwrap();
    assert!(heat_input_j_per_mm(13.0, 150.0, 5.0).unwrap() > base);
    assert!(heat_input_j_per_mm(12.0, 160.0, 5.0).unwrap() > base);
    assert!(heat_input_j_per_mm(12.0, 150.0, 6.0).unwrap() < base);
}

#[test]
fn doubling_speed_halves_heat_input() {
    for &(v, i, s) in &[(10.0, 90.0, 1.5), (18.5, 220.0, 7.25), (100.0, 100.0, 0.1)] {
        let q = heat_input_j_per_mm(v, i, s).unwrap();
        assert_close(heat_input_j_per_mm(v, i, 2.0 * s).unwrap(), q / 2.0);
    }
}

#[test]
fn rejects_out_of_range_inputs() {
    assert!(matches!(
        heat_input_j_per_mm(12.0, 150.0, 0.0),
        Err(ValidationError::NotPositive { .. }) | Err(ValidationError::BelowMinimum { .. })
    ));
    assert!(heat_input_j_per_mm(0.0, 150.0, 5.0).is_err());
    assert!(heat_input_j_per_mm(12.0, -1.0, 5.0).is_err());
    assert!(heat_input_j_per_mm(f64::NAN, 150.0, 5.0).is_err());
}

#[test]
fn validated_parameters_carry_the_same_value() {
    let params = WeldingParameters {
        voltage_v: 12.0,
        current_a: 150.0,
        travel_speed_mm_s: 5.0,
        bead_width_mm: 6.0,
        ..Default::default()
    };
    let valid = params.validate().unwrap();
    assert_close(valid.heat_input_j_per_mm(), 21_600.0);
    assert_eq!(valid.get(), &params);
}

#[test]
fn minimum_speed_still_finite() {
    let params = WeldingParameters {
        voltage_v: 100.0,
        current_a: 100.0,
        travel_speed_mm_s: 0.1,
        ..Default::default()
    };
    let q = params.validate().unwrap().heat_input_j_per_mm();
    assert!(q.is_finite());
    assert_close(q, 6_000_000.0);

    let below = WeldingParameters {
        travel_speed_mm_s: 0.05,
        ..params
    };
    assert!(matches!(
        below.validate(),
        Err(ValidationError::BelowMinimum { field: "travel_speed", .. })
    ));
}
