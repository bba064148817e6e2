use serenwalk::shared::geo::{Coordinate, Distance, Error};

#[test]
fn distance_test() {
    let coord_a = Coordinate {
        latitude: 48.85800943005911,
        longitude: 2.3514350059357927,
    };

    let coord_b = Coordinate {
        latitude: 51.5052389927712,
        longitude: -0.12495407345099824,
    };
    let d = coord_a.distance(&coord_b).unwrap();
    assert!((d.as_kilometers() - 343.08).abs() < 0.5);
}

#[test]
fn distance_is_symmetric() {
    let pairs = [
        ((14.6727, 121.0497), (14.5995, 120.9842)),
        ((-33.8688, 151.2093), (40.7128, -74.0060)),
        ((89.9, 0.0), (-89.9, 179.9)),
        ((0.0, -180.0), (0.0, 180.0)),
    ];
    for (a, b) in pairs {
        let a = Coordinate::from(a);
        let b = Coordinate::from(b);
        assert_eq!(a.distance(&b).unwrap(), b.distance(&a).unwrap());
    }
}

#[test]
fn distance_to_self_is_zero() {
    let a = Coordinate::from((14.6727, 121.0497));
    assert_eq!(a.distance(&a).unwrap(), Distance::from_meters(0.0));
}

#[test]
fn distinct_points_are_apart() {
    let a = Coordinate::from((14.6727, 121.0497));
    let b = Coordinate::from((14.6727, 121.04971));
    assert!(a.distance(&b).unwrap() > Distance::from_meters(0.0));
}

#[test]
fn short_distance_in_meters() {
    // One thousandth of a degree of latitude
    let a = Coordinate::from((14.60, 120.98));
    let b = Coordinate::from((14.601, 120.98));
    let d = a.distance(&b).unwrap();
    assert!((d.as_meters() - 111.19).abs() < 0.1);
}

#[test]
fn nan_is_invalid_coordinate() {
    let a = Coordinate::from((f64::NAN, 120.98));
    let b = Coordinate::from((14.60, 120.98));
    assert!(matches!(
        a.distance(&b),
        Err(Error::InvalidCoordinate { .. })
    ));
    assert!(matches!(
        b.distance(&a),
        Err(Error::InvalidCoordinate { .. })
    ));
}

#[test]
fn out_of_range_is_invalid_coordinate() {
    assert!(Coordinate::new(90.5, 0.0).is_err());
    assert!(Coordinate::new(0.0, -180.5).is_err());
    assert!(Coordinate::new(f64::INFINITY, 0.0).is_err());
    assert!(Coordinate::new(-90.0, 180.0).is_ok());
}
