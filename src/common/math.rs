//! Angle helpers shared by the localizers

use std::f64::consts::{PI, TAU};

/// Wrap an angle into `[0, 2π)`
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle % TAU;
    if wrapped < 0.0 {
        // -1e-17 % TAU + TAU rounds to TAU
        let shifted = wrapped + TAU;
        if shifted >= TAU {
            0.0
        } else {
            shifted
        }
    } else {
        wrapped
    }
}

/// Magnitude of the shortest turn between two headings, in `[0, π]`
pub fn smallest_angle_difference(one: f64, two: f64) -> f64 {
    normalize_angle(one - two).min(normalize_angle(two - one))
}

/// `1.0` if the shortest turn from `start` to `end` is counter-clockwise, `-1.0` otherwise
pub fn turn_direction(start: f64, end: f64) -> f64 {
    let turn = normalize_angle(end - start);
    if (0.0..=PI).contains(&turn) {
        1.0
    } else {
        -1.0
    }
}

/// Signed shortest turn from `previous` to `current`
pub fn heading_delta(previous: f64, current: f64) -> f64 {
    turn_direction(previous, current) * smallest_angle_difference(current, previous)
}
