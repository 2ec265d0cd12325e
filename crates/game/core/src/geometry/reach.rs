use crate::config::GameConfig;
use crate::state::Position;

/// Pixel distance between two entities standing on `from` and `to`.
///
/// Each axis is measured edge to edge: the center-to-center offset minus half
/// a tile, never below zero. Adjacent tiles (orthogonal or diagonal) are
/// therefore well inside a single tile width.
pub fn pixel_distance(config: &GameConfig, from: Position, to: Position) -> f32 {
    let (dx, dy) = from.delta_to(to);
    let axis = |delta: i32, size: u32| -> f32 {
        let span = delta.unsigned_abs() as f32 * size as f32 - size as f32 / 2.0;
        span.max(0.0)
    };
    let x = axis(dx, config.tile_width);
    let y = axis(dy, config.tile_height);
    (x * x + y * y).sqrt()
}

/// True if `distance` pixels are covered by a reach of `reach` tile widths.
pub fn within_reach(config: &GameConfig, reach: u32, distance: f32) -> bool {
    distance <= reach as f32 * config.tile_width as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_tile_is_zero() {
        let config = GameConfig::default();
        assert_eq!(pixel_distance(&config, Position::ORIGIN, Position::ORIGIN), 0.0);
    }

    #[test]
    fn reach_one_covers_all_neighbors_only() {
        let config = GameConfig::default();
        let center = Position::new(5, 5);
        for neighbor in center.neighbors() {
            let distance = pixel_distance(&config, center, neighbor);
            assert!(within_reach(&config, 1, distance), "{neighbor}");
        }
        let two_away = pixel_distance(&config, center, Position::new(7, 5));
        assert!(!within_reach(&config, 1, two_away));
    }

    #[test]
    fn legal_iff_distance_within_reach() {
        let config = GameConfig::default().with_tile_size(64, 64);
        // three tiles along x: 3 * 64 - 32 = 160
        let distance = pixel_distance(&config, Position::ORIGIN, Position::new(3, 0));
        assert_eq!(distance, 160.0);
        assert!(within_reach(&config, 3, distance));
        assert!(!within_reach(&config, 2, distance));
    }

    #[test]
    fn huge_reach_covers_the_far_corner() {
        let config = GameConfig::default();
        let far = pixel_distance(&config, Position::new(0, 0), Position::new(10_000, 10_000));
        assert!(within_reach(&config, u32::MAX, far));
        assert!(!within_reach(&config, 0, far));
    }
}
