use super::*;

const ALL: [Ease; 4] = [Ease::Linear, Ease::InOutQuad, Ease::InOutCubic, Ease::OutCubic];

#[test]
fn endpoints_are_exact() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
        assert_eq!(ease.apply(-3.0), 0.0);
        assert_eq!(ease.apply(7.0), 1.0);
    }
}

#[test]
fn in_out_quad_matches_piecewise_formula() {
    assert_eq!(Ease::InOutQuad.apply(0.25), 0.125);
    assert_eq!(Ease::InOutQuad.apply(0.5), 0.5);
    assert_eq!(Ease::InOutQuad.apply(0.75), 0.875);
}

#[test]
fn curves_are_monotonic_on_a_fine_grid() {
    for ease in ALL {
        let mut prev = ease.apply(0.0);
        for i in 1..=300 {
            let v = ease.apply(f64::from(i) / 300.0);
            assert!(v >= prev, "{ease:?} decreased at step {i}");
            prev = v;
        }
    }
}

#[test]
fn progress_saturates_at_one() {
    assert_eq!(Ease::progress(0, 300), 0.0);
    assert_eq!(Ease::progress(150, 300), 0.5);
    assert_eq!(Ease::progress(900, 300), 1.0);
    assert_eq!(Ease::progress(5, 0), 1.0);
}
