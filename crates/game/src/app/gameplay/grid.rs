use engine::Vec2;

/// Placed blocks sit on a grid whose cells are 5% larger than the block, which
/// leaves a visible seam between neighbours.
pub(crate) const GAP_FILL_FACTOR: f32 = 1.05;

/// The overlap probe is this much smaller than the block on each axis so it
/// cannot graze the edges of adjacent cells.
pub(crate) const OVERLAP_PROBE_SHRINK: f32 = 0.5;

pub(crate) fn gap_filled_cell_size(block_size: Vec2) -> Vec2 {
    Vec2 {
        x: block_size.x * GAP_FILL_FACTOR,
        y: block_size.y * GAP_FILL_FACTOR,
    }
}

/// World-space center of the cell one cell-width ahead of `position` in the
/// facing direction. Vertically the target is the cell whose top edge is the
/// first grid line at or above `position.y`, whatever the facing.
///
/// `block_size` must be non-zero on both axes; callers validate it up front.
pub(crate) fn snap_target(position: Vec2, facing_right: bool, block_size: Vec2) -> Vec2 {
    let cell = gap_filled_cell_size(block_size);
    let xi = position.x / cell.x;
    let yi = position.y / cell.y;

    let x = if facing_right {
        (xi.ceil() - 0.5) * cell.x + cell.x
    } else {
        (xi.floor() + 0.5) * cell.x - cell.x
    };
    let y = yi.ceil() * cell.y - cell.y / 2.0;
    Vec2 { x, y }
}

pub(crate) fn overlap_probe_size(block_size: Vec2) -> Vec2 {
    Vec2 {
        x: block_size.x - OVERLAP_PROBE_SHRINK,
        y: block_size.y - OVERLAP_PROBE_SHRINK,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const UNIT: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() <= 1e-5,
            "{actual} vs {expected}"
        );
    }

    #[test]
    fn unit_block_at_origin_facing_right() {
        // (ceil(0) - 0.5) * 1.05 + 1.05
        let target = snap_target(Vec2::ZERO, true, UNIT);
        assert_close(target.x, 0.525);
        assert_close(target.y, -0.525);
    }

    #[test]
    fn unit_block_at_origin_facing_left() {
        let target = snap_target(Vec2::ZERO, false, UNIT);
        assert_close(target.x, -0.525);
        assert_close(target.y, -0.525);
    }

    #[test]
    fn sub_cell_position_does_not_move_the_target() {
        let a = snap_target(Vec2::new(0.1, 0.5), true, UNIT);
        let b = snap_target(Vec2::new(0.9, 0.5), true, UNIT);
        assert_eq!(a, b);
        assert_close(a.x, 1.575);
        assert_close(a.y, 0.525);
    }

    #[test]
    fn vertical_snap_ignores_facing() {
        let position = Vec2::new(3.3, 2.2);
        let right = snap_target(position, true, UNIT);
        let left = snap_target(position, false, UNIT);
        assert_eq!(right.y, left.y);
    }

    #[test]
    fn non_square_block_uses_each_axis() {
        let target = snap_target(Vec2::new(0.0, 1.0), true, Vec2::new(2.0, 0.5));
        // cell = 2.1 x 0.525; yi = 1.904..., ceil = 2
        assert_close(target.x, 1.05);
        assert_close(target.y, 0.7875);
    }

    #[test]
    fn probe_is_shrunk_by_half_a_unit() {
        let probe = overlap_probe_size(Vec2::new(1.0, 2.0));
        assert_close(probe.x, 0.5);
        assert_close(probe.y, 1.5);
    }

    proptest! {
        #[test]
        fn target_is_one_cell_ahead_in_facing_direction(
            px in -100.0f32..100.0,
            py in -100.0f32..100.0,
            w in 0.1f32..10.0,
            h in 0.1f32..10.0,
            facing_right in any::<bool>(),
        ) {
            let position = Vec2::new(px, py);
            let size = Vec2::new(w, h);
            let cell = gap_filled_cell_size(size);
            let target = snap_target(position, facing_right, size);
            let eps = 1e-4 * (1.0 + px.abs().max(py.abs()));

            if facing_right {
                prop_assert!(target.x >= px + 0.5 * cell.x - eps);
                prop_assert!(target.x < px + 1.5 * cell.x + eps);
            } else {
                prop_assert!(target.x <= px - 0.5 * cell.x + eps);
                prop_assert!(target.x > px - 1.5 * cell.x - eps);
            }
            prop_assert!(target.y >= py - 0.5 * cell.y - eps);
            prop_assert!(target.y < py + 0.5 * cell.y + eps);
        }

        #[test]
        fn target_is_a_cell_center(
            px in -100.0f32..100.0,
            py in -100.0f32..100.0,
            w in 0.1f32..10.0,
            h in 0.1f32..10.0,
            facing_right in any::<bool>(),
        ) {
            let size = Vec2::new(w, h);
            let cell = gap_filled_cell_size(size);
            let target = snap_target(Vec2::new(px, py), facing_right, size);
            let x_index = target.x / cell.x - 0.5;
            let y_index = target.y / cell.y - 0.5;
            prop_assert!((x_index - x_index.round()).abs() < 1e-2);
            prop_assert!((y_index - y_index.round()).abs() < 1e-2);
        }

        #[test]
        fn snapping_is_deterministic(
            px in -100.0f32..100.0,
            py in -100.0f32..100.0,
            w in 0.1f32..10.0,
            h in 0.1f32..10.0,
            facing_right in any::<bool>(),
        ) {
            let position = Vec2::new(px, py);
            let size = Vec2::new(w, h);
            prop_assert_eq!(
                snap_target(position, facing_right, size),
                snap_target(position, facing_right, size)
            );
        }
    }
}
