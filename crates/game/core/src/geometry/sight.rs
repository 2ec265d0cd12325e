use crate::state::{Position, TileField};

/// Returns true if an impassable tile interrupts the straight line between
/// the centers of `origin` and `target`.
///
/// The endpoints themselves are never examined. The walk advances along the
/// axis with the larger displacement and, whenever the line enters a new row
/// of the short axis before leaving the current column, examines the tile it
/// passes through there as well. When the line crosses exactly through a
/// tile corner it steps diagonally, and that step counts as blocked only if
/// both tiles sharing the corner are impassable.
///
/// The test depends on geometry alone, so
/// `is_blocked(grid, a, b) == is_blocked(grid, b, a)`.
pub fn is_blocked(grid: &TileField, origin: Position, target: Position) -> bool {
    let (dx, dy) = origin.delta_to(target);
    if dx == 0 && dy == 0 {
        return false;
    }

    let sign_x = dx.signum();
    let sign_y = dy.signum();
    let x_is_long = dx.abs() >= dy.abs();
    let (long, short) = if x_is_long {
        (dx.abs() as i64, dy.abs() as i64)
    } else {
        (dy.abs() as i64, dx.abs() as i64)
    };

    // Maps normalized (long, short) coordinates back onto the grid.
    let at = |u: i64, v: i64| -> Position {
        let (u, v) = (u as i32, v as i32);
        if x_is_long {
            origin.offset(sign_x * u, sign_y * v)
        } else {
            origin.offset(sign_x * v, sign_y * u)
        }
    };
    let impassable = |u: i64, v: i64| !grid.passable(at(u, v));

    let (mut u, mut row) = (0_i64, 0_i64);
    while u < long {
        // Scaled by 2 * long: the line's short coordinate where it leaves
        // column `u`, and the upper edge of the current row.
        let exit = (2 * u + 1) * short;

        while (2 * row + 1) * long < exit {
            row += 1;
            if (u, row) == (long, short) {
                return false;
            }
            if impassable(u, row) {
                return true;
            }
        }

        if (2 * row + 1) * long == exit {
            if impassable(u + 1, row) && impassable(u, row + 1) {
                return true;
            }
            row += 1;
        }
        u += 1;

        if (u, row) == (long, short) {
            return false;
        }
        if impassable(u, row) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TerrainKind;

    fn open(width: u32, height: u32) -> TileField {
        TileField::new(width, height)
    }

    fn with_walls(width: u32, height: u32, walls: &[(i32, i32)]) -> TileField {
        let mut grid = open(width, height);
        for &(x, y) in walls {
            grid.set_terrain(Position::new(x, y), TerrainKind::Wall);
        }
        grid
    }

    #[test]
    fn same_tile_and_neighbors_are_clear() {
        let grid = with_walls(3, 3, &[(1, 0)]);
        let center = Position::new(1, 1);
        assert!(!is_blocked(&grid, center, center));
        for neighbor in center.neighbors() {
            assert!(!is_blocked(&grid, center, neighbor));
        }
    }

    #[test]
    fn open_field_is_never_blocked() {
        let grid = open(7, 7);
        for a in grid.tiles().map(|tile| tile.position()) {
            for b in grid.tiles().map(|tile| tile.position()) {
                assert!(!is_blocked(&grid, a, b), "{a} -> {b}");
            }
        }
    }

    #[test]
    fn wall_on_straight_line_blocks() {
        let grid = with_walls(6, 3, &[(3, 1)]);
        assert!(is_blocked(&grid, Position::new(0, 1), Position::new(5, 1)));
        assert!(!is_blocked(&grid, Position::new(0, 0), Position::new(5, 0)));
    }

    #[test]
    fn wall_on_shallow_slope_blocks() {
        // The line from (0,0) to (4,1) crosses rows at x = 2.
        let grid = with_walls(5, 2, &[(3, 1)]);
        assert!(is_blocked(&grid, Position::new(0, 0), Position::new(4, 1)));

        let grid = with_walls(5, 2, &[(1, 0)]);
        assert!(is_blocked(&grid, Position::new(0, 0), Position::new(4, 1)));

        let grid = with_walls(5, 2, &[(1, 1), (3, 0)]);
        assert!(!is_blocked(&grid, Position::new(0, 0), Position::new(4, 1)));
    }

    #[test]
    fn diagonal_needs_both_corners_walled() {
        let origin = Position::ORIGIN;
        let target = Position::new(1, 1);

        let grid = with_walls(2, 2, &[(1, 0)]);
        assert!(!is_blocked(&grid, origin, target));

        let grid = with_walls(2, 2, &[(1, 0), (0, 1)]);
        assert!(is_blocked(&grid, origin, target));
    }

    #[test]
    fn wall_on_long_diagonal_blocks() {
        let grid = with_walls(5, 5, &[(2, 2)]);
        assert!(is_blocked(&grid, Position::ORIGIN, Position::new(4, 4)));
        assert!(!is_blocked(&grid, Position::ORIGIN, Position::new(1, 1)));
    }

    #[test]
    fn endpoints_are_not_examined() {
        let grid = with_walls(4, 1, &[(0, 0), (3, 0)]);
        assert!(!is_blocked(&grid, Position::new(0, 0), Position::new(3, 0)));
    }

    #[test]
    fn symmetric_for_every_pair() {
        let grid = with_walls(7, 6, &[(2, 1), (3, 3), (5, 2), (1, 4), (4, 5)]);
        let positions: Vec<_> = grid.tiles().map(|tile| tile.position()).collect();
        for &a in &positions {
            for &b in &positions {
                assert_eq!(
                    is_blocked(&grid, a, b),
                    is_blocked(&grid, b, a),
                    "{a} <-> {b}"
                );
            }
        }
    }

    #[test]
    fn any_single_wall_on_a_clear_line_blocks_it() {
        let origin = Position::new(0, 0);
        let target = Position::new(6, 3);
        let clear = open(7, 4);

        // Collect the tiles the walk examines by walling each tile in turn.
        let on_line: Vec<Position> = clear
            .tiles()
            .map(|tile| tile.position())
            .filter(|&p| p != origin && p != target)
            .filter(|&p| {
                let mut grid = clear.clone();
                grid.set_terrain(p, TerrainKind::Wall);
                is_blocked(&grid, origin, target)
            })
            .collect();

        assert!(!on_line.is_empty());
        assert!(on_line.contains(&Position::new(3, 1)) || on_line.contains(&Position::new(3, 2)));
    }
}
