#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::{s, Array2};

    use crate::gap_fill::common::error::GapFillError;
    use crate::gap_fill::detector::generate_detector_mask;
    use crate::gap_fill::engine::{fill_gap, Image, Mask, Offset, SecondStage, ShiftedImage};

    fn ones(shape: (usize, usize)) -> Image {
        Array2::ones(shape)
    }

    fn column_gap(shape: (usize, usize), col: usize) -> Mask {
        let mut mask = Mask::zeros(shape);
        mask.column_mut(col).fill(1);
        mask
    }

    #[test]
    fn test_empty_mask_returns_base() {
        let base = Array2::from_shape_fn((5, 7), |(r, c)| (r * 7 + c) as f64 * 1.5);
        let secondary = Array2::from_elem((5, 7), 99.0);
        let ff = ones((5, 7));
        let mask = Mask::zeros((5, 7));

        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(secondary.view(), Offset::new(2.0, -1.0))),
            SecondStage::WithSecondary(ShiftedImage::new(secondary.view(), Offset::new(4.0, -2.0))),
        )
        .unwrap();

        assert_eq!(filled, base);
    }

    #[test]
    fn test_single_pixel_zero_offset() {
        let base = Array2::<f64>::zeros((4, 4));
        let secondary = Array2::from_elem((4, 4), 17.0);
        let ff = ones((4, 4));
        let mut mask = Mask::zeros((4, 4));
        mask[[1, 1]] = 1;

        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(secondary.view(), Offset::new(0.0, 0.0))),
            SecondStage::NoSecondary,
        )
        .unwrap();

        // The secondary's own gap pixel is zeroed before sampling.
        assert_eq!(filled[[1, 1]], 0.0);
        assert!(filled.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_constant_field_fill() {
        let base = Array2::<f64>::zeros((4, 4));
        let secondary = Array2::from_elem((4, 4), 17.0);
        let ff = ones((4, 4));
        let mut mask = Mask::zeros((4, 4));
        mask[[1, 1]] = 1;

        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(secondary.view(), Offset::new(1.0, 1.0))),
            SecondStage::NoSecondary,
        )
        .unwrap();

        for ((r, c), &v) in filled.indexed_iter() {
            let expected = if (r, c) == (1, 1) { 17.0 } else { 0.0 };
            assert_abs_diff_eq!(v, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sub_pixel_step_blend() {
        let base = Array2::from_elem((4, 5), 3.0);
        let step = Array2::from_shape_fn((4, 5), |(_, c)| if c < 2 { 0.0 } else { 100.0 });
        let ff = ones((4, 5));

        // Sample lands halfway between column 1 (0) and column 2 (100).
        let mut mask = Mask::zeros((4, 5));
        mask[[2, 1]] = 1;
        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(step.view(), Offset::new(0.5, 0.0))),
            SecondStage::NoSecondary,
        )
        .unwrap();
        assert_abs_diff_eq!(filled[[2, 1]], 50.0, epsilon = 1e-12);
        assert_eq!(filled[[2, 2]], 3.0);

        // Masked column-2 pixel is zeroed in the secondary, so 2.5 blends 0 and 100.
        let mut mask = Mask::zeros((4, 5));
        mask[[2, 2]] = 1;
        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(step.view(), Offset::new(0.5, 0.0))),
            SecondStage::NoSecondary,
        )
        .unwrap();
        assert_abs_diff_eq!(filled[[2, 2]], 50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_flatfield_scales_base_and_fill() {
        let base = Array2::from_elem((3, 4), 10.0);
        let secondary = Array2::from_elem((3, 4), 6.0);
        let ff = Array2::from_shape_fn((3, 4), |(_, c)| 1.0 + c as f64);
        let mask = column_gap((3, 4), 1);

        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(secondary.view(), Offset::new(1.0, 0.0))),
            SecondStage::NoSecondary,
        )
        .unwrap();

        for r in 0..3 {
            assert_eq!(filled[[r, 0]], 10.0);
            // Sampled from column 2 of the corrected secondary: 6 * 3.
            assert_abs_diff_eq!(filled[[r, 1]], 18.0, epsilon = 1e-12);
            assert_eq!(filled[[r, 3]], 40.0);
        }
    }

    #[test]
    fn test_cascade_uses_second_secondary() {
        let shape = (6, 6);
        let base = Array2::<f64>::zeros(shape);
        let first = Array2::from_elem(shape, 7.0);
        let second = Array2::from_shape_fn(shape, |(_, c)| c as f64 * 10.0);
        let ff = ones(shape);
        let mask = column_gap(shape, 2);

        // dx1 = 0.5 samples half inside the gap column, which flags the pixel.
        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(first.view(), Offset::new(0.5, 0.0))),
            SecondStage::WithSecondary(ShiftedImage::new(second.view(), Offset::new(1.0, 0.0))),
        )
        .unwrap();

        for r in 0..6 {
            assert_abs_diff_eq!(filled[[r, 2]], 30.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cascade_without_second_secondary_keeps_first_sample() {
        let shape = (6, 6);
        let base = Array2::<f64>::zeros(shape);
        let first = Array2::from_elem(shape, 7.0);
        let ff = ones(shape);
        let mask = column_gap(shape, 2);

        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(first.view(), Offset::new(0.5, 0.0))),
            SecondStage::NoSecondary,
        )
        .unwrap();

        for r in 0..6 {
            assert_abs_diff_eq!(filled[[r, 2]], 3.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_clean_first_sample_is_not_resampled() {
        let shape = (6, 6);
        let base = Array2::<f64>::zeros(shape);
        let first = Array2::from_elem(shape, 7.0);
        let second = Array2::from_elem(shape, -1.0);
        let ff = ones(shape);
        let mask = column_gap(shape, 2);

        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(first.view(), Offset::new(1.0, 0.0))),
            SecondStage::WithSecondary(ShiftedImage::new(second.view(), Offset::new(2.0, 0.0))),
        )
        .unwrap();

        assert!(filled.column(2).iter().all(|&v| v == 7.0));
    }

    #[test]
    fn test_small_gap_weight_triggers_second_pass() {
        let shape = (4, 6);
        let base = Array2::<f64>::zeros(shape);
        let first = Array2::from_elem(shape, 7.0);
        let second = Array2::from_elem(shape, 55.0);
        let ff = ones(shape);
        let mask = column_gap(shape, 2);

        // 90% of the weight comes from valid column 3, yet the pixel is resampled.
        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(first.view(), Offset::new(0.9, 0.0))),
            SecondStage::WithSecondary(ShiftedImage::new(second.view(), Offset::new(3.0, 0.0))),
        )
        .unwrap();

        assert!(filled.column(2).iter().all(|&v| v == 55.0));
    }

    #[test]
    fn test_second_secondary_is_not_zeroed_at_gap() {
        let shape = (4, 6);
        let base = Array2::<f64>::zeros(shape);
        let first = Array2::from_elem(shape, 7.0);
        let second = Array2::from_shape_fn(shape, |(_, c)| c as f64 * 10.0);
        let ff = ones(shape);
        let mask = column_gap(shape, 2);

        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(first.view(), Offset::new(0.0, 0.0))),
            SecondStage::WithSecondary(ShiftedImage::new(second.view(), Offset::new(0.0, 0.0))),
        )
        .unwrap();

        assert!(filled.column(2).iter().all(|&v| v == 20.0));
    }

    #[test]
    fn test_out_of_bounds_sample_clamps_to_edge() {
        let base = Array2::<f64>::zeros((4, 4));
        let secondary = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c + 1) as f64);
        let ff = ones((4, 4));
        let mut mask = Mask::zeros((4, 4));
        mask[[1, 2]] = 1;

        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(secondary.view(), Offset::new(0.0, -5.0))),
            SecondStage::NoSecondary,
        )
        .unwrap();

        assert_eq!(filled[[1, 2]], secondary[[0, 2]]);
        assert!(filled[[1, 2]].is_finite());
    }

    #[test]
    fn test_inputs_are_not_modified() {
        let base = Array2::from_elem((3, 3), 2.0);
        let secondary = Array2::from_elem((3, 3), 5.0);
        let ff = Array2::from_elem((3, 3), 2.0);
        let mask = column_gap((3, 3), 1);
        let (base_copy, secondary_copy, ff_copy) = (base.clone(), secondary.clone(), ff.clone());

        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(secondary.view(), Offset::new(1.0, 0.0))),
            SecondStage::NoSecondary,
        )
        .unwrap();

        assert_eq!(base, base_copy);
        assert_eq!(secondary, secondary_copy);
        assert_eq!(ff, ff_copy);
        assert_eq!(filled[[0, 1]], 10.0);
    }

    #[test]
    fn test_flatfield_shape_mismatch() {
        let base = Array2::<f64>::zeros((4, 4));
        let ff = ones((4, 5));
        let mask = Mask::zeros((4, 4));

        let result = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(base.view(), Offset::default())),
            SecondStage::NoSecondary,
        );

        assert!(matches!(
            result,
            Err(GapFillError::ShapeMismatch { what: "flatfield", expected: (4, 4), found: (4, 5) })
        ));
    }

    #[test]
    fn test_mask_and_secondary_shape_mismatch() {
        let base = Array2::<f64>::zeros((4, 4));
        let ff = ones((4, 4));
        let small = Array2::<f64>::zeros((3, 4));

        let result = fill_gap(
            ff.view(),
            Mask::zeros((4, 3)).view(),
            base.view(),
            Some(ShiftedImage::new(base.view(), Offset::default())),
            SecondStage::NoSecondary,
        );
        assert!(matches!(result, Err(GapFillError::ShapeMismatch { what: "mask", .. })));

        let result = fill_gap(
            ff.view(),
            Mask::zeros((4, 4)).view(),
            base.view(),
            Some(ShiftedImage::new(base.view(), Offset::default())),
            SecondStage::WithSecondary(ShiftedImage::new(small.view(), Offset::default())),
        );
        assert!(matches!(result, Err(GapFillError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_missing_first_secondary() {
        let base = Array2::<f64>::zeros((2, 2));
        let result = fill_gap(
            ones((2, 2)).view(),
            Mask::zeros((2, 2)).view(),
            base.view(),
            None,
            SecondStage::NoSecondary,
        );
        assert!(matches!(result, Err(GapFillError::MissingInput(_))));
    }

    #[test]
    fn test_non_finite_offset_rejected() {
        let base = Array2::<f64>::zeros((2, 2));
        let result = fill_gap(
            ones((2, 2)).view(),
            Mask::zeros((2, 2)).view(),
            base.view(),
            Some(ShiftedImage::new(base.view(), Offset::new(f64::NAN, 0.0))),
            SecondStage::NoSecondary,
        );
        assert!(matches!(result, Err(GapFillError::InvalidOffset(_))));
    }

    #[test]
    fn test_detector_mask_band_is_filled() {
        let mask = generate_detector_mask("Pilatus300K").unwrap();
        let shape = mask.dim();
        let base = Array2::from_elem(shape, 1.0);
        let first = Array2::from_elem(shape, 4.0);
        let ff = ones(shape);

        let filled = fill_gap(
            ff.view(),
            mask.view(),
            base.view(),
            Some(ShiftedImage::new(first.view(), Offset::new(0.0, -20.0))),
            SecondStage::NoSecondary,
        )
        .unwrap();

        assert!(filled.slice(s![195..=211, ..]).iter().all(|&v| v == 4.0));
        assert!(filled.slice(s![0..195, ..]).iter().all(|&v| v == 1.0));
    }
}
