use crate::models::order::GeoPoint;

const EARTH_RADIUS_M: f64 = 6_371_000.0;
const MINUTES_PER_KM: f64 = 2.0;

pub fn haversine_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_M * central_angle
}

/// Delivery-time estimate from straight-line distance, ceiling minutes.
pub fn estimate_delivery_minutes(distance_m: f64) -> u32 {
    ((distance_m / 1000.0) * MINUTES_PER_KM).ceil() as u32
}

pub fn point_in_range(point: &GeoPoint) -> bool {
    point.lat.is_finite()
        && point.lng.is_finite()
        && (-90.0..=90.0).contains(&point.lat)
        && (-180.0..=180.0).contains(&point.lng)
}

#[cfg(test)]
mod tests {
    use super::{estimate_delivery_minutes, haversine_m, point_in_range};
    use crate::models::order::GeoPoint;

    #[test]
    fn zero_distance_for_same_point() {
        let p = GeoPoint {
            lat: 53.5511,
            lng: 9.9937,
        };
        let distance = haversine_m(&p, &p);
        assert!(distance < 1e-6);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = GeoPoint {
            lat: 51.5074,
            lng: -0.1278,
        };
        let paris = GeoPoint {
            lat: 48.8566,
            lng: 2.3522,
        };
        let distance = haversine_m(&london, &paris);
        assert!((distance - 343_000.0).abs() < 5_000.0);
    }

    #[test]
    fn one_km_along_a_meridian() {
        let a = GeoPoint { lat: 0.0, lng: 0.0 };
        // 1000 m of arc northwards at the chosen Earth radius.
        let b = GeoPoint {
            lat: (1000.0 / 6_371_000.0_f64).to_degrees(),
            lng: 0.0,
        };
        let distance = haversine_m(&a, &b);
        assert!((distance - 1000.0).abs() < 1.0);
    }

    #[test]
    fn estimate_rounds_minutes_up() {
        assert_eq!(estimate_delivery_minutes(1000.0), 2);
        assert_eq!(estimate_delivery_minutes(1001.0), 3);
        assert_eq!(estimate_delivery_minutes(0.0), 0);
        assert_eq!(estimate_delivery_minutes(4500.0), 9);
    }

    #[test]
    fn point_in_range_rejects_bad_coordinates() {
        assert!(point_in_range(&GeoPoint { lat: 53.55, lng: 9.99 }));
        assert!(!point_in_range(&GeoPoint { lat: 95.0, lng: 0.0 }));
        assert!(!point_in_range(&GeoPoint { lat: 0.0, lng: 181.0 }));
        assert!(!point_in_range(&GeoPoint {
            lat: f64::NAN,
            lng: 0.0,
        }));
    }
}
