//! `rivet_core`: the computational core of the two-parameter persistence
//! engine (spec.md §2-§5). Pure library, no I/O — `rivet_io` owns the
//! external bifiltration/persistence-format surface, `rivet_cli` the
//! adapter binary.
//!
//! Grounded on `idobenamram-spicy`'s `spicy_simulate` crate split: one
//! module per solver stage (`csc`, `klu::analyze`, `klu::factor`,
//! `klu::solve`), tied together by a thin top-level driver
//! (`spicy_simulate::lib::simulate`). `rivet_core::run` plays that role
//! here.

pub mod anchor;
pub mod arrangement;
pub mod betti;
pub mod error;
pub mod firep;
pub mod matrix;
pub mod path;
pub mod query;
pub mod ru;
pub mod support;
pub mod updater;

use arrangement::BarcodeTemplate;
use error::RivetError;
use firep::Firep;
use support::SupportMatrix;

/// Engine-wide configuration, taken as a plain struct by the caller rather
/// than read from a config file — the teacher's core crates carry no
/// config-file dependency either; `spicy_simulate::SimulationConfig` is the
/// structural analogue.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Which homology dimension to compute (spec.md §4.C's `hom_dim`).
    pub hom_dim: usize,
    /// Upper bound on the anchor count before the computation aborts with
    /// `RivetError::ResourceExceeded` (spec.md §5).
    pub max_anchors: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hom_dim: 0,
            max_anchors: 1_000_000,
        }
    }
}

/// Everything the query layer (component I, `rivet_io`/`rivet_cli`) needs:
/// the graded Betti numbers and, per arrangement face, its barcode
/// template.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub betti: Vec<betti::BettiNumbers>,
    pub templates: Vec<Option<BarcodeTemplate>>,
    pub arrangement: arrangement::Arrangement,
}

/// Builds the ξ-support matrix (component E's input) from the graded Betti
/// numbers (component D's output): one entry per bigrade with nonzero ξ.
/// This is the normal way a caller obtains a `SupportMatrix` — the direct
/// `SupportMatrix::build` constructor exists for tests that want to pin a
/// specific support shape without going through the Betti engine.
pub fn support_from_betti(firep: &Firep) -> SupportMatrix {
    let betti = betti::compute_betti(firep);
    let ny = firep.ny();
    let raw = betti
        .iter()
        .enumerate()
        .filter(|(_, b)| b.xi0 != 0 || b.xi1 != 0 || b.xi2 != 0)
        .map(|(i, b)| {
            let (x, y) = (i / ny, i % ny);
            (matrix::Bigrade::new(x, y), (b.xi0, b.xi1, b.xi2))
        })
        .collect();
    SupportMatrix::build(raw)
}

/// Runs the full pipeline (components D through H) over an already-built
/// Firep and ξ-support matrix: Betti numbers, the augmented arrangement,
/// the path plan, and a barcode template at every arrangement face.
pub fn run(firep: &Firep, support: &SupportMatrix, config: &EngineConfig) -> Result<EngineOutput, RivetError> {
    let betti = betti::compute_betti(firep);

    let mut anchors = anchor::enumerate_anchors(support);
    if anchors.len() > config.max_anchors {
        return Err(RivetError::ResourceExceeded {
            resource: "anchor count",
            limit: config.max_anchors,
        });
    }

    let arr = arrangement::build_arrangement(support, &anchors)?;
    arr.check_invariants().map_err(RivetError::Arrangement)?;

    let weights = updater::dry_run_weights(firep, support, &anchors, &arr);
    for (a, w) in anchors.iter_mut().zip(weights) {
        a.weight = w;
    }

    let adjacency = path::adjacency_from_arrangement(&arr, &anchors);
    let mst = path::minimum_spanning_tree(arr.face_count(), &adjacency);
    let plan = path::euler_tour(arr.face_count(), &mst, 0);

    let templates = updater::run(firep, support, &anchors, &arr, &plan, 0);

    Ok(EngineOutput {
        betti,
        templates,
        arrangement: arr,
    })
}

/// Convenience entry point for callers (`rivet_io`/`rivet_cli`) that only
/// have a Firep: derives the ξ-support matrix via `support_from_betti`,
/// then runs the full pipeline.
pub fn run_from_firep(firep: &Firep, config: &EngineConfig) -> Result<EngineOutput, RivetError> {
    let support = support_from_betti(firep);
    run(firep, &support, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix::{Bigrade, BigradedColumn, BigradedMatrix, SparseColumn};

    fn simplex(rows: Vec<usize>, bigrade: Bigrade) -> BigradedColumn {
        BigradedColumn {
            data: SparseColumn::from_rows(rows),
            dim_index: 0,
            bigrade,
        }
    }

    #[test]
    fn run_produces_a_template_for_every_face() {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
        ]);
        let low = BigradedMatrix::new(
            0,
            vec![simplex(vec![], Bigrade::new(0, 1)), simplex(vec![], Bigrade::new(1, 0))],
        );
        let high = BigradedMatrix::new(2, vec![]);
        let firep = Firep::new(0, 2, 2, low, high);

        let output = run(&firep, &support, &EngineConfig::default()).unwrap();
        assert_eq!(output.betti.len(), 4);
        assert!(output.templates.iter().all(|t| t.is_some()));
    }

    #[test]
    fn resource_limit_rejects_too_many_anchors() {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
        ]);
        let low = BigradedMatrix::new(0, vec![]);
        let high = BigradedMatrix::new(0, vec![]);
        let firep = Firep::new(0, 2, 2, low, high);
        let config = EngineConfig {
            hom_dim: 0,
            max_anchors: 0,
        };
        let err = run(&firep, &support, &config).unwrap_err();
        assert_eq!(err.kind(), "ResourceExceeded");
    }
}

/// The six concrete scenarios spec.md §8 names, each its own parametrized
/// case so a failure names exactly which one broke.
#[cfg(test)]
mod scenarios {
    use super::*;
    use crate::matrix::{Bigrade, BigradedColumn, BigradedMatrix, SparseColumn};
    use crate::query::{locate_face, read_barcode};
    use crate::updater::PersistenceState;
    use rstest::rstest;

    fn simplex(rows: Vec<usize>, bigrade: Bigrade) -> BigradedColumn {
        BigradedColumn {
            data: SparseColumn::from_rows(rows),
            dim_index: 0,
            bigrade,
        }
    }

    /// Scenario 1: a single d-simplex paired with the single (d+1)-simplex
    /// that kills it, both at bigrade (1,1).
    #[rstest]
    fn scenario_1_single_pair_same_bigrade() {
        let low = BigradedMatrix::new(1, vec![simplex(vec![], Bigrade::new(1, 1))]);
        let high = BigradedMatrix::new(1, vec![simplex(vec![0], Bigrade::new(1, 1))]);
        let firep = Firep::new(1, 2, 2, low, high);

        let betti = betti::compute_betti(&firep);
        let at_1_1 = betti[1 * 2 + 1];
        assert_eq!(at_1_1.xi0, 1);
        assert_eq!(at_1_1.xi1, 1);
        assert_eq!(at_1_1.xi2, 0);

        let support = SupportMatrix::build(vec![(Bigrade::new(1, 1), (1, 1, 0))]);
        let anchors = anchor::enumerate_anchors(&support);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].kind, anchor::AnchorKind::NonStrict);

        let arr = arrangement::build_arrangement(&support, &anchors).unwrap();
        assert_eq!(arr.face_count(), 2);
        assert_eq!(arr.crossings.len(), 1);

        // Both ends of the one bar map to the same ξ-support entry, so it is
        // a zero-length bar and spec.md §4.H.5's `a != b` filter drops it.
        let state = PersistenceState::initialize(&firep, &support);
        assert!(state.write_template().is_empty());
    }

    /// Scenario 2: two incomparable supports (0,1) and (1,0), both ξ₀=1,
    /// joined at anchor (1,1); the arrangement splits into two faces across
    /// that anchor's one dual-line crossing.
    #[rstest]
    fn scenario_2_two_incomparable_supports() {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
        ]);
        let low = BigradedMatrix::new(
            0,
            vec![simplex(vec![], Bigrade::new(0, 1)), simplex(vec![], Bigrade::new(1, 0))],
        );
        let high = BigradedMatrix::new(2, vec![]);
        let firep = Firep::new(0, 2, 2, low, high);

        let output = run(&firep, &support, &EngineConfig::default()).unwrap();
        assert_eq!(output.arrangement.face_count(), 2);
        assert_eq!(output.arrangement.crossings.len(), 1);
        // Neither generator is ever killed (no high-dimensional simplex
        // exists to pair against), so both faces carry an essential bar for
        // each support entry.
        for template in output.templates.iter().flatten() {
            assert_eq!(template.len(), 2);
            assert!(template.iter().all(|pt| pt.end.is_none() && pt.multiplicity == 1));
        }
    }

    /// Scenario 3: a diagonal ladder, ξ₀ at (i,i) and ξ₁ at (i+1,i+1) for
    /// i=0..3, resolving into the chain of finite bars (0,1), (1,2), (2,3),
    /// (3,4) along y=x (spec.md §8's "4 essential bars collapse to 3 finite
    /// bars" describes the same chain observed partway through the sweep;
    /// fully resolved, every rung pairs off).
    #[rstest]
    fn scenario_3_diagonal_ladder() {
        let low = BigradedMatrix::new(
            0,
            vec![
                simplex(vec![], Bigrade::new(0, 0)),
                simplex(vec![], Bigrade::new(1, 1)),
                simplex(vec![], Bigrade::new(2, 2)),
                simplex(vec![], Bigrade::new(3, 3)),
            ],
        );
        let high = BigradedMatrix::new(
            4,
            vec![
                simplex(vec![0], Bigrade::new(1, 1)),
                simplex(vec![1], Bigrade::new(2, 2)),
                simplex(vec![2], Bigrade::new(3, 3)),
                simplex(vec![3], Bigrade::new(4, 4)),
            ],
        );
        let firep = Firep::new(0, 5, 5, low, high);
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 0), (1, 0, 0)),
            (Bigrade::new(1, 1), (1, 1, 0)),
            (Bigrade::new(2, 2), (1, 1, 0)),
            (Bigrade::new(3, 3), (1, 1, 0)),
            (Bigrade::new(4, 4), (0, 1, 0)),
        ]);

        let state = PersistenceState::initialize(&firep, &support);
        let template = state.write_template();
        assert_eq!(template.len(), 4);
        assert!(template.iter().all(|pt| pt.multiplicity == 1));
        let bars: std::collections::BTreeSet<(usize, usize)> = template
            .iter()
            .map(|pt| (pt.begin, pt.end.expect("every rung of the ladder pairs off")))
            .collect();
        assert_eq!(
            bars,
            [(0, 1), (1, 2), (2, 3), (3, 4)].into_iter().collect()
        );
    }

    /// Scenario 4: a query against an empty arrangement (no ξ-support, no
    /// anchors) returns without crashing.
    #[rstest]
    fn scenario_4_query_on_empty_arrangement() {
        let support = SupportMatrix::build(vec![]);
        let anchors = anchor::enumerate_anchors(&support);
        assert!(anchors.is_empty());
        let arr = arrangement::build_arrangement(&support, &anchors).unwrap();
        assert_eq!(arr.face_count(), 1);

        assert_eq!(locate_face(&arr, &anchors, 0.0, 0.0), 0);
        assert_eq!(locate_face(&arr, &anchors, 90.0, 5.0), 0);

        let empty_template = Vec::new();
        let bars = read_barcode(&empty_template, &support, &[], &[], 90.0, 0.0);
        assert!(bars.is_empty());
    }

    /// Scenarios 5 and 6: vertical (`theta=90`) and horizontal (`theta=0`)
    /// queries against the same two-incomparable-supports arrangement as
    /// scenario 2, at an offset before and after the one anchor's bigrade.
    #[rstest]
    #[case::scenario_5_vertical(90.0, 0.5, 1.5)]
    #[case::scenario_6_horizontal(0.0, -1.5, -0.5)]
    fn scenarios_5_and_6_query_offset_crosses_the_anchor(
        #[case] theta_deg: f64,
        #[case] rho_before: f64,
        #[case] rho_after: f64,
    ) {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
        ]);
        let anchors = anchor::enumerate_anchors(&support);
        let arr = arrangement::build_arrangement(&support, &anchors).unwrap();

        assert_eq!(locate_face(&arr, &anchors, theta_deg, rho_before), 0);
        assert_eq!(locate_face(&arr, &anchors, theta_deg, rho_after), arr.face_count() - 1);
    }
}
