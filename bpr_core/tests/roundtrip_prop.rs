//! Property tests: the codec laws hold for arbitrary grids, not just the
//! hand-picked scenarios.

use proptest::prelude::*;

use bpr_core::format::{read_varint, write_varint, zigzag_decode, zigzag_encode};
use bpr_core::predict::{predict_at, select_predictor, Predictor};
use bpr_core::residual::{choose_mode, row_residuals, DeltaMode};
use bpr_core::{decode, encode_grid, Grid};

fn arb_grid() -> impl Strategy<Value = Grid> {
    prop::collection::vec(prop::collection::vec(any::<i32>(), 0..40), 0..24)
        .prop_map(|rows| Grid { rows })
}

/// Grids with the correlation the codec is built for: each row drifts a
/// little from its predecessor.
fn arb_smooth_grid() -> impl Strategy<Value = Grid> {
    (1usize..20, 1usize..60, any::<i16>(), any::<u64>()).prop_map(|(r, l, base, seed)| {
        let mut state = seed;
        let mut step = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 60) as i32) - 8
        };
        let mut prev: Vec<i32> = Vec::new();
        let mut rows = Vec::with_capacity(r);
        for _ in 0..r {
            let mut row = Vec::with_capacity(l);
            for j in 0..l {
                let anchor = *prev.get(j).unwrap_or(&(base as i32));
                row.push(anchor.wrapping_add(step()));
            }
            prev = row.clone();
            rows.push(row);
        }
        Grid { rows }
    })
}

fn l1(residuals: &[i32]) -> u64 {
    residuals
        .iter()
        .map(|d| d.unsigned_abs() as u64)
        .fold(0u64, u64::saturating_add)
}

proptest! {
    #[test]
    fn roundtrip_arbitrary_grids(grid in arb_grid()) {
        let mut container = Vec::new();
        encode_grid(&grid, &mut container).unwrap();

        let mut decoded = Vec::new();
        decode(container.as_slice(), &mut decoded).unwrap();

        let mut expected = Vec::new();
        grid.write(&mut expected).unwrap();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn roundtrip_smooth_grids(grid in arb_smooth_grid()) {
        let mut container = Vec::new();
        encode_grid(&grid, &mut container).unwrap();

        let mut decoded = Vec::new();
        decode(container.as_slice(), &mut decoded).unwrap();

        let mut expected = Vec::new();
        grid.write(&mut expected).unwrap();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn zigzag_bijection(n in any::<i32>()) {
        prop_assert_eq!(zigzag_decode(zigzag_encode(n)), n);
    }

    #[test]
    fn zigzag_keeps_small_magnitudes_small(n in any::<i32>()) {
        let z = zigzag_encode(n) as u64;
        let mag = n.unsigned_abs() as u64;
        prop_assert!(mag <= z && z <= 2 * mag + 1);
    }

    #[test]
    fn varint_bijection(v in any::<u64>()) {
        let mut buf = Vec::new();
        write_varint(&mut buf, v).unwrap();
        prop_assert!(!buf.is_empty() && buf.len() <= 10);
        prop_assert_eq!(read_varint(&mut buf.as_slice()).unwrap(), v);
    }

    #[test]
    fn selected_predictor_is_an_argmin(
        row in prop::collection::vec(any::<i32>(), 1..40),
        prev in prop::collection::vec(any::<i32>(), 0..40),
    ) {
        let chosen = select_predictor(&row, Some(&prev));
        let sum_for = |p: Predictor| -> u64 {
            (0..row.len())
                .map(|j| row[j].wrapping_sub(predict_at(p, &row, Some(&prev), j)).unsigned_abs() as u64)
                .fold(0u64, u64::saturating_add)
        };
        for p in Predictor::ALL {
            prop_assert!(sum_for(chosen) <= sum_for(p));
        }
    }

    #[test]
    fn selected_mode_is_an_argmin(
        row in prop::collection::vec(any::<i32>(), 1..40),
        prev in prop::collection::vec(any::<i32>(), 1..40),
    ) {
        let predictor = select_predictor(&row, Some(&prev));
        let (mode, kept) = choose_mode(&row, &prev, predictor);
        let other = match mode {
            DeltaMode::First => DeltaMode::Second,
            DeltaMode::Second => DeltaMode::First,
        };
        let alternative = row_residuals(&row, &prev, predictor, other);
        prop_assert!(l1(&kept) <= l1(&alternative));
    }
}
