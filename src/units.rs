pub mod temperature {
    pub fn f2c(temp_f: f64) -> f64 {
        (temp_f - 32.0) * 5.0 / 9.0
    }

    pub fn c2f(temp_c: f64) -> f64 {
        temp_c * 9.0 / 5.0 + 32.0
    }

    #[test]
    fn test_temperature() {
        assert_eq!(f2c(212.0), 100.0);
        assert_eq!(f2c(32.0), 0.0);
        assert_eq!(c2f(0.0), 32.0);
        assert_eq!(c2f(100.0), 212.0);
    }
}

pub mod speed {
    const MILES_PER_KM: f64 = 0.621371;

    pub fn kph2mph(kph: f64) -> f64 {
        kph * MILES_PER_KM
    }

    #[test]
    fn test_speed() {
        assert!((kph2mph(100.0) - 62.1371).abs() < 1e-9);
        assert_eq!(kph2mph(0.0), 0.0);
    }
}

pub mod direction {
    const COMPASS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    pub fn degree_to_compass<'a>(deg: f32) -> &'a str {
        let deg = (deg % 360.0) + 360.0;
        let val = (deg / 22.5 + 0.5) as usize;
        let idx = val % 16;
        COMPASS[idx]
    }

    /// Bearing in degrees for a 16-point compass abbreviation such as "WSW".
    pub fn compass_to_degrees(dir: &str) -> Option<f32> {
        let dir = dir.trim();
        COMPASS
            .iter()
            .position(|point| point.eq_ignore_ascii_case(dir))
            .map(|idx| idx as f32 * 22.5)
    }

    #[test]
    fn test_degree_to_compass() {
        assert_eq!(degree_to_compass(0.0), "N");
        assert_eq!(degree_to_compass(90.0), "E");
        assert_eq!(degree_to_compass(180.0), "S");
        assert_eq!(degree_to_compass(270.0), "W");
        assert_eq!(degree_to_compass(360.0), "N");
    }

    #[test]
    fn test_compass_to_degrees() {
        assert_eq!(compass_to_degrees("N"), Some(0.0));
        assert_eq!(compass_to_degrees("nne"), Some(22.5));
        assert_eq!(compass_to_degrees("SW"), Some(225.0));
        assert_eq!(compass_to_degrees("NNW"), Some(337.5));
        assert_eq!(compass_to_degrees("north"), None);
        assert_eq!(compass_to_degrees(""), None);
    }

    #[test]
    fn test_compass_round_trip() {
        for point in COMPASS {
            let deg = compass_to_degrees(point).unwrap();
            assert_eq!(degree_to_compass(deg), point);
        }
    }
}

pub mod distance {
    const EARTH_RADIUS_KM: f64 = 6371.0088;

    /// Haversine distance between two points given in decimal degrees.
    pub fn great_circle_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
        let d_phi = (lat2 - lat1).to_radians();
        let d_lambda = (lon2 - lon1).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }

    #[test]
    fn test_great_circle_km() {
        assert_eq!(great_circle_km(14.6, 121.0, 14.6, 121.0), 0.0);

        // One degree of latitude is roughly 111 km.
        let one_degree = great_circle_km(0.0, 0.0, 1.0, 0.0);
        assert!((one_degree - 111.2).abs() < 0.5, "{one_degree}");

        // Manila to Tokyo, about 3000 km.
        let manila_tokyo = great_circle_km(14.5995, 120.9842, 35.6762, 139.6503);
        assert!((2950.0..3050.0).contains(&manila_tokyo), "{manila_tokyo}");
    }
}
