//! Spherical geometry for intercept and navigation computations.

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Initial great-circle bearing from point 1 to point 2, in degrees
/// normalized to [0, 360).
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Haversine great-circle distance in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Clamp to [min, max]. Command values always pass through here before
/// reaching the engine.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_cardinal_directions() {
        assert!((initial_bearing(0.0, 0.0, 1.0, 0.0) - 0.0).abs() < 0.01);
        assert!((initial_bearing(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < 0.01);
        assert!((initial_bearing(1.0, 0.0, 0.0, 0.0) - 180.0).abs() < 0.01);
        assert!((initial_bearing(0.0, 1.0, 0.0, 0.0) - 270.0).abs() < 0.01);
    }

    #[test]
    fn bearing_is_always_in_range() {
        for &(lat1, lon1, lat2, lon2) in &[
            (30.0, 120.0, 29.0, 119.0),
            (-45.0, 170.0, -44.0, -170.0),
            (60.0, 0.0, 60.0, 0.0),
        ] {
            let b = initial_bearing(lat1, lon1, lat2, lon2);
            assert!((0.0..360.0).contains(&b), "bearing {b} out of range");
        }
    }

    #[test]
    fn haversine_one_degree_at_equator() {
        // One degree of longitude at the equator is ~111.2 km.
        let d = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111_195.0).abs() < 100.0, "distance was {d}");
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert_eq!(haversine_distance(30.0, 120.0, 30.0, 120.0), 0.0);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(35000.0, 0.0, 30000.0), 30000.0);
        assert_eq!(clamp(-5.0, 0.0, 30000.0), 0.0);
        assert_eq!(clamp(5000.0, 0.0, 30000.0), 5000.0);
    }
}
