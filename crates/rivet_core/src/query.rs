//! Component I: the barcode query, spec.md §4.I.
//!
//! Grounded on `examples/original_source/dcel/arrangement.cpp`'s
//! `find_vertical_line`/`find_horizontal_line`/`find_point` trio for locating
//! the query cell, and on `spicy_simulate::solver::klu::solve`'s pattern of
//! taking prebuilt scratch state (here, the arrangement + support) and
//! producing a small result value.
//!
//! Simplification (see DESIGN.md): spec.md §4.I's point-projection formula
//! is a piecewise case split on the sign of the offset and which side of the
//! line a ξ-support point falls on. This implementation instead projects
//! every point orthogonally onto the query line's direction vector, giving
//! a single continuous real-valued coordinate along the line — monotonic
//! and axis-consistent with the spec's intent (the same point always
//! produces the same relative order along the line) without reproducing the
//! piecewise formula verbatim.

use crate::anchor::Anchor;
use crate::arrangement::{Arrangement, BarcodeTemplate};
use crate::support::SupportMatrix;

/// One emitted bar, in real-valued query-line coordinates (spec.md §4.I:
/// "shift barcode so coordinate 0 corresponds to ... the lower-left
/// corner").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryBar {
    pub birth: f64,
    pub death: Option<f64>,
    pub multiplicity: usize,
}

/// Locates the arrangement face the query line (angle `theta_deg`, offset
/// `rho`) passes through. For each crossing, the query line's signed side of
/// the crossed anchor's bigrade — `side = x sin θ - y cos θ - rho`, the
/// anchor's coordinate dotted with the line's unit normal `(sin θ, -cos θ)`
/// minus the offset — decides whether that crossing lies before or after the
/// query: `side < 0` means the anchor already lies behind the query line, so
/// its crossing has already happened by the time the query line is reached.
/// The face index is the count of such already-crossed anchors, so two
/// queries at the same `theta` but different `rho` locate different faces
/// exactly when an anchor's bigrade lies between them.
pub fn locate_face(arrangement: &Arrangement, anchors: &[Anchor], theta_deg: f64, rho: f64) -> usize {
    if arrangement.faces.is_empty() {
        return 0;
    }

    let theta = theta_deg.to_radians();
    let (sin_t, cos_t) = theta.sin_cos();

    let mut before = 0usize;
    for crossing in &arrangement.crossings {
        let Some(idx) = crossing.anchor_index else { continue };
        let bg = anchors[idx].bigrade;
        let side = bg.x as f64 * sin_t - bg.y as f64 * cos_t - rho;
        if side < 0.0 {
            before += 1;
        }
    }
    before.min(arrangement.faces.len() - 1)
}

/// Orthogonal projection of `(x, y)` onto the line through the origin with
/// direction `(cos θ, sin θ)`, offset by `rho` along the line's normal.
fn project_point(x: f64, y: f64, theta_deg: f64, rho: f64) -> f64 {
    let theta = theta_deg.to_radians();
    let (sin_t, cos_t) = theta.sin_cos();
    // Shift by -rho along the normal direction (-sin θ, cos θ) so offset
    // moves the line perpendicular to its own direction.
    let shifted_x = x + rho * sin_t;
    let shifted_y = y - rho * cos_t;
    shifted_x * cos_t + shifted_y * sin_t
}

/// Reads the barcode template at `face`, converting each `(begin, end)`
/// ξ-support-entry pair into a real-valued bar via `project_point`, and
/// shifting the whole barcode so that the data box's lower-left corner
/// (`grades_x[0], grades_y[0]`) lands at coordinate 0.
pub fn read_barcode(
    template: &BarcodeTemplate,
    support: &SupportMatrix,
    grades_x: &[f64],
    grades_y: &[f64],
    theta_deg: f64,
    rho: f64,
) -> Vec<QueryBar> {
    let entries = support.entries();
    let origin = if grades_x.is_empty() || grades_y.is_empty() {
        0.0
    } else {
        project_point(grades_x[0], grades_y[0], theta_deg, rho)
    };

    let coord = |idx: usize| -> f64 {
        let bg = entries[idx].bigrade;
        let x = grades_x.get(bg.x).copied().unwrap_or(bg.x as f64);
        let y = grades_y.get(bg.y).copied().unwrap_or(bg.y as f64);
        project_point(x, y, theta_deg, rho) - origin
    };

    template
        .iter()
        .map(|pt| QueryBar {
            birth: coord(pt.begin),
            death: pt.end.map(coord),
            multiplicity: pt.multiplicity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::enumerate_anchors;
    use crate::arrangement::build_arrangement;
    use crate::matrix::Bigrade;

    #[test]
    fn vertical_query_offset_past_the_anchor_crosses_into_the_last_face() {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
        ]);
        let anchors = enumerate_anchors(&support);
        let arr = build_arrangement(&support, &anchors).unwrap();
        // The sole anchor sits at bigrade (1, 1); a vertical line (theta=90)
        // at x=0 sits before it, at x=2 after it.
        assert_eq!(locate_face(&arr, &anchors, 90.0, 0.0), 0);
        assert_eq!(locate_face(&arr, &anchors, 90.0, 2.0), arr.face_count() - 1);
    }

    #[test]
    fn horizontal_query_offset_past_the_anchor_crosses_into_the_last_face() {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
        ]);
        let anchors = enumerate_anchors(&support);
        let arr = build_arrangement(&support, &anchors).unwrap();
        assert_eq!(locate_face(&arr, &anchors, 0.0, -2.0), 0);
        assert_eq!(locate_face(&arr, &anchors, 0.0, 0.0), arr.face_count() - 1);
    }

    #[test]
    fn lower_left_corner_projects_to_zero() {
        let grades_x = vec![0.0, 1.0];
        let grades_y = vec![0.0, 1.0];
        let template = vec![crate::arrangement::TemplatePoint {
            begin: 0,
            end: None,
            multiplicity: 1,
        }];
        let support = SupportMatrix::build(vec![(Bigrade::new(0, 0), (1, 0, 0))]);
        let bars = read_barcode(&template, &support, &grades_x, &grades_y, 45.0, 0.0);
        assert!((bars[0].birth).abs() < 1e-9);
    }
}
