/// Earth's mean radius in meters.
///
/// The Earth is modelled as a perfect sphere of this radius; no ellipsoid
/// correction is applied anywhere in the crate.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in meters between two points given in decimal degrees.
///
/// No range validation is done. Longitudes are not wrapped: values past
/// ±180° still produce the great-circle answer because the trig functions are
/// periodic. Non-finite inputs propagate as `NaN`.
pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let sin_d_phi = (d_phi / 2.0).sin();
    let sin_d_lambda = (d_lambda / 2.0).sin();
    let a = sin_d_phi * sin_d_phi + phi1.cos() * phi2.cos() * sin_d_lambda * sin_d_lambda;
    // Rounding can push `a` just past 1 for antipodal points. A comparison
    // keeps NaN intact where `f64::min` would not.
    let a = if a > 1.0 { 1.0 } else { a };
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::{calculate_distance, EARTH_RADIUS_METERS};
    use std::f64::consts::PI;

    #[test]
    fn identical_points_are_exactly_zero() {
        for &(lat, lon) in &[(0.0, 0.0), (-23.5505, -46.6333), (90.0, 180.0), (-89.9, -179.99)] {
            assert_eq!(calculate_distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn sao_paulo_to_rio() {
        let d = calculate_distance(-23.5505, -46.6333, -22.9068, -43.1729);
        assert!((d - 360_748.0).abs() < 360_748.0 * 0.01, "got {d}");
    }

    #[test]
    fn pole_to_pole_is_half_circumference() {
        let d = calculate_distance(90.0, 0.0, -90.0, 0.0);
        assert!((d - PI * EARTH_RADIUS_METERS).abs() < 1e-3);
    }

    #[test]
    fn antimeridian_is_not_the_long_way_round() {
        let d = calculate_distance(0.0, 179.0, 0.0, -179.0);
        assert!(d > 222_000.0 && d < 223_000.0, "got {d}");
    }

    #[test]
    fn near_antipodal_points_stay_bounded() {
        let d = calculate_distance(-5.63, -178.89, 5.63, 1.11);
        assert!(!d.is_nan());
        assert!(d <= PI * EARTH_RADIUS_METERS);
        assert!((d - PI * EARTH_RADIUS_METERS).abs() < 1.0, "got {d}");
    }

    #[test]
    fn non_finite_inputs_yield_nan() {
        assert!(calculate_distance(f64::NAN, 0.0, 1.0, 1.0).is_nan());
        assert!(calculate_distance(0.0, f64::INFINITY, 1.0, 1.0).is_nan());
        assert!(calculate_distance(f64::INFINITY, 0.0, f64::INFINITY, 0.0).is_nan());
    }
}
