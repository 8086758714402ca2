//! Randomized cross-checks of the window-sum kernel against the direct kernel.

use depix::lowlevel::{DirectScalar, Kernel, PatchPlan, ReferencePlanes, ScanParams, UniformFill};
use depix::{AveragingMode, Color, PixelGrid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SCORE_TOLERANCE: f64 = 1e-9;

fn random_grid(rng: &mut StdRng, width: usize, height: usize) -> PixelGrid {
    PixelGrid::from_fn(width, height, |_, _| {
        Color::new(rng.random(), rng.random(), rng.random())
    })
    .unwrap()
}

#[test]
fn uniform_scores_match_direct_scores() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..6 {
        let width = rng.random_range(3..30);
        let height = rng.random_range(3..20);
        let reference = random_grid(&mut rng, width, height);

        for mode in [AveragingMode::GammaCorrected, AveragingMode::Linear] {
            let planes = ReferencePlanes::build(&reference, mode).unwrap();
            for _ in 0..4 {
                // Sizes may exceed the reference to exercise black padding.
                let (w, h) = (rng.random_range(1..width + 3), rng.random_range(1..height + 3));
                let fill = Color::new(rng.random(), rng.random(), rng.random());
                let plan = PatchPlan::uniform(fill, w, h, mode).unwrap();
                let fast = UniformFill::score_map(&planes, &plan).unwrap();
                let slow = DirectScalar::score_map(&planes, &plan).unwrap();
                assert_eq!((fast.cols(), fast.rows()), (slow.cols(), slow.rows()));

                for y in 0..fast.rows() {
                    for x in 0..fast.cols() {
                        let f = fast.get(x, y).unwrap();
                        let s = slow.get(x, y).unwrap();
                        assert!(
                            (f - s).abs() < SCORE_TOLERANCE,
                            "{mode} {w}x{h} at ({x}, {y}): {f} vs {s}"
                        );
                        assert!((0.0..=1.0).contains(&f));
                    }
                }
            }
        }
    }
}

#[test]
fn uniform_scan_finds_planted_block() {
    let mut rng = StdRng::seed_from_u64(42);
    let params = ScanParams {
        max_candidates: 8,
        tie_tolerance: SCORE_TOLERANCE,
    };
    for _ in 0..10 {
        let (width, height) = (40, 30);
        let (bw, bh) = (rng.random_range(2..7), rng.random_range(2..7));
        let x0 = rng.random_range(0..=width - bw);
        let y0 = rng.random_range(0..=height - bh);
        // Fill channels stay out of the random range used for the background.
        let fill = Color::new(rng.random_range(0..40), 250, rng.random_range(0..40));
        let reference = PixelGrid::from_fn(width, height, |x, y| {
            if (x0..x0 + bw).contains(&x) && (y0..y0 + bh).contains(&y) {
                fill
            } else {
                Color::new(rng.random(), rng.random_range(0..200), rng.random())
            }
        })
        .unwrap();

        let planes = ReferencePlanes::build(&reference, AveragingMode::GammaCorrected).unwrap();
        let plan = PatchPlan::uniform(fill, bw, bh, AveragingMode::GammaCorrected).unwrap();

        let fast = UniformFill::scan_full(&planes, &plan, params).unwrap();
        let slow = DirectScalar::scan_full(&planes, &plan, params).unwrap();
        assert_eq!(fast.len(), 1);
        assert_eq!((fast[0].x, fast[0].y), (x0, y0));
        let slow_positions: Vec<(usize, usize)> = slow.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(slow_positions, vec![(x0, y0)]);
    }
}

#[test]
fn mirrored_windows_in_opposite_corners_tie_exactly() {
    let (width, height) = (1200, 800);
    let a = Color::new(100, 112, 118);
    let b = Color::new(121, 107, 104);
    let mut rng = StdRng::seed_from_u64(7);
    let reference = PixelGrid::from_fn(width, height, |x, y| match (x, y) {
        (1, 1) => a,
        (2, 1) => b,
        _ if (x, y) == (width - 2, height - 1) => b,
        _ if (x, y) == (width - 1, height - 1) => a,
        _ => Color::new(
            rng.random_range(150..=255),
            rng.random_range(150..=255),
            rng.random_range(150..=255),
        ),
    })
    .unwrap();
    let fill = Color::new(110, 110, 110);
    let far = (width - 2, height - 1);

    for mode in [AveragingMode::GammaCorrected, AveragingMode::Linear] {
        let planes = ReferencePlanes::build(&reference, mode).unwrap();
        let plan = PatchPlan::uniform(fill, 2, 1, mode).unwrap();

        let near_score = UniformFill::score_at(&planes, &plan, 1, 1);
        let far_score = UniformFill::score_at(&planes, &plan, far.0, far.1);
        assert_eq!(near_score, far_score, "{mode}");

        let exact = ScanParams {
            max_candidates: 8,
            tie_tolerance: 0.0,
        };
        let fast = UniformFill::scan_full(&planes, &plan, exact).unwrap();
        let positions: Vec<(usize, usize)> = fast.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(positions, vec![(1, 1), far], "{mode}");

        let first = ScanParams {
            max_candidates: 1,
            tie_tolerance: SCORE_TOLERANCE,
        };
        let single = UniformFill::scan_full(&planes, &plan, first).unwrap();
        assert_eq!((single[0].x, single[0].y), (1, 1), "{mode}");

        let tolerant = ScanParams {
            max_candidates: 8,
            tie_tolerance: SCORE_TOLERANCE,
        };
        let slow = DirectScalar::scan_full(&planes, &plan, tolerant).unwrap();
        let slow_positions: Vec<(usize, usize)> = slow.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(slow_positions, positions, "{mode}");
    }
}
