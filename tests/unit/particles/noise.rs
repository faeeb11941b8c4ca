use super::*;

#[test]
fn stays_in_range() {
    for i in 0..400 {
        let x = f64::from(i) * 0.173 - 20.0;
        let y = f64::from(i) * 0.311 + 3.0;
        let n = value_noise_2d(7, x, y);
        assert!((-1.0..=1.0).contains(&n), "{n}");
    }
}

#[test]
fn is_deterministic_and_seed_dependent() {
    let a = value_noise_2d(1, 3.4, 9.1);
    assert_eq!(a, value_noise_2d(1, 3.4, 9.1));
    let differs = (0..16).any(|i| {
        let x = f64::from(i) + 0.5;
        value_noise_2d(1, x, 0.5) != value_noise_2d(2, x, 0.5)
    });
    assert!(differs);
}

#[test]
fn is_continuous_across_cell_edges() {
    let left = value_noise_2d(9, 4.0 - 1e-9, 2.25);
    let right = value_noise_2d(9, 4.0, 2.25);
    assert!((left - right).abs() < 1e-6);
}

#[test]
fn lattice_points_hit_lattice_values() {
    let n = value_noise_2d(5, 2.0, -3.0);
    assert_eq!(n, lattice(5, 2, -3));
}

#[test]
fn non_finite_input_is_zero() {
    assert_eq!(value_noise_2d(0, f64::NAN, 1.0), 0.0);
    assert_eq!(value_noise_2d(0, 1.0, f64::INFINITY), 0.0);
}
