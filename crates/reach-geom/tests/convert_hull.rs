use ndarray::{arr1, arr2, ArrayD, IxDyn};
use reach_core::{ReachError, SetKind};
use reach_geom::{convert, interval_to_zonotope, zonotope_to_interval, GeometrySet, Interval, ZonoTensor};

#[test]
fn hull_radius_is_the_sum_of_absolute_generators() {
    let zono = ZonoTensor::new(arr1(&[0.0]).into_dyn(), arr2(&[[1.0, 1.0]]).into_dyn()).unwrap();
    let hull = zonotope_to_interval(&zono).unwrap();
    assert_eq!(hull.inf(), &arr2(&[[-2.0]]));
    assert_eq!(hull.sup(), &arr2(&[[2.0]]));
}

#[test]
fn hull_of_a_vector_batch_is_a_row_interval() {
    let zono = ZonoTensor::new(
        arr1(&[0.0, 1.0]).into_dyn(),
        arr2(&[[1.0, -1.0], [2.0, 0.0]]).into_dyn(),
    )
    .unwrap();
    let hull = zonotope_to_interval(&zono).unwrap();
    assert_eq!(hull.dim(), Some([1, 2]));
    assert_eq!(hull.inf(), &arr2(&[[-2.0, -1.0]]));
    assert_eq!(hull.sup(), &arr2(&[[2.0, 3.0]]));
}

#[test]
fn hull_of_a_matrix_batch_keeps_its_shape() {
    let zono = ZonoTensor::new(
        arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn(),
        ArrayD::from_elem(IxDyn(&[2, 2, 1]), 0.5),
    )
    .unwrap();
    let hull = zonotope_to_interval(&zono).unwrap();
    assert_eq!(hull.dim(), Some([2, 2]));
    assert_eq!(hull.inf(), &arr2(&[[0.5, 1.5], [2.5, 3.5]]));
    assert_eq!(hull.sup(), &arr2(&[[1.5, 2.5], [3.5, 4.5]]));
}

#[test]
fn hull_of_a_point_zonotope_is_degenerate() {
    let point = ZonoTensor::zeros(0, &[3]);
    let hull = zonotope_to_interval(&point).unwrap();
    assert_eq!(hull.inf(), hull.sup());
}

#[test]
fn hull_rejects_high_rank_batches() {
    let zono = ZonoTensor::zeros(1, &[2, 2, 2]);
    let err = zonotope_to_interval(&zono).unwrap_err();
    assert!(matches!(err, ReachError::NotSupported(_)));
    assert_eq!(err.info().code, "convert.zonotope_to_interval.rank");
}

#[test]
fn hull_rejects_empty_batches() {
    let err = zonotope_to_interval(&ZonoTensor::empty(&[2])).unwrap_err();
    assert!(matches!(err, ReachError::ShapeMismatch(_)));
}

#[test]
fn identity_conversion_returns_the_source_unchanged() {
    let interval = Interval::scalar(0.0, 1.0).unwrap();
    let converted = convert(GeometrySet::Interval(interval.clone()), SetKind::Interval).unwrap();
    assert_eq!(converted, GeometrySet::Interval(interval));

    let zono = ZonoTensor::ones(2, &[2]);
    let converted = convert(GeometrySet::Zonotope(zono.clone()), SetKind::Zonotope).unwrap();
    assert_eq!(converted, GeometrySet::Zonotope(zono));
}

#[test]
fn zonotope_converts_to_its_interval_hull() {
    let zono = ZonoTensor::new(arr1(&[0.0]).into_dyn(), arr2(&[[1.0, 1.0]]).into_dyn()).unwrap();
    let converted = convert(GeometrySet::Zonotope(zono), SetKind::Interval).unwrap();
    assert_eq!(converted.kind(), SetKind::Interval);
    let hull = converted.as_interval().unwrap();
    assert_eq!(hull.inf()[[0, 0]], -2.0);
    assert_eq!(hull.sup()[[0, 0]], 2.0);
}

#[test]
fn interval_to_zonotope_is_an_explicit_gap() {
    let interval = Interval::scalar(0.0, 1.0).unwrap();
    let err = interval_to_zonotope(&interval).unwrap_err();
    assert!(matches!(err, ReachError::NotSupported(_)));
    assert_eq!(err.info().code, "convert.interval_to_zonotope");

    let err = convert(GeometrySet::Interval(interval), SetKind::Zonotope).unwrap_err();
    assert!(matches!(err, ReachError::NotSupported(_)));
}

#[test]
fn undefined_pairs_are_not_supported() {
    let interval = Interval::scalar(0.0, 1.0).unwrap();
    let err = convert(GeometrySet::Interval(interval), SetKind::Polytope).unwrap_err();
    assert!(matches!(err, ReachError::NotSupported(_)));
    assert_eq!(err.info().code, "convert.pair");
}
