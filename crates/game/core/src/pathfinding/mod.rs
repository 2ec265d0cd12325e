//! A* search over the tile field with pluggable step costs.
//!
//! A [`Pathfinder`] holds only its cost configuration. Every call to
//! [`Pathfinder::shortest_path`] builds its own frontier, closed set and node
//! table and drops them on return.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::{ErrorSeverity, GameError};
use crate::state::{Position, Tile, TileField};

/// Extra cost charged for stepping from the current node onto a neighbor.
pub type CostTerm = Box<dyn Fn(&SearchNode, Position) -> u32 + Send + Sync>;

/// Precondition violations of a search request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("start {0} does not resolve to a tile")]
    StartNotFound(Position),

    #[error("goal {0} does not resolve to a tile")]
    GoalNotFound(Position),
}

impl GameError for PathError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::StartNotFound(_) => "PATH_START_NOT_FOUND",
            Self::GoalNotFound(_) => "PATH_GOAL_NOT_FOUND",
        }
    }
}

/// Working record for one discovered tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchNode {
    pub position: Position,
    pub g_cost: u32,
    /// Estimate to the goal, computed once when the node is discovered.
    pub h_cost: u32,
    /// Tile this node was reached from; `None` for the start.
    pub parent: Option<Position>,
}

impl SearchNode {
    pub fn f_cost(&self) -> u32 {
        self.g_cost + self.h_cost
    }
}

/// Configurable A* search.
pub struct Pathfinder {
    cost_terms: Vec<CostTerm>,
}

impl Pathfinder {
    /// Cost of any single step before additional terms.
    pub const BASE_COST: u32 = 10;
    /// Added to every diagonal step.
    pub const DIAGONAL_PENALTY: u32 = 4;
    /// Added to diagonal steps once straight lines are preferred.
    pub const STRAIGHT_DIAGONAL_PENALTY: u32 = 26;
    /// Added when a step changes direction relative to the previous one.
    pub const DIRECTION_CHANGE_PENALTY: u32 = 5;

    /// Creates a pathfinder charging the default diagonal penalty.
    pub fn new() -> Self {
        Self {
            cost_terms: vec![Box::new(|node: &SearchNode, next: Position| {
                if is_diagonal(node.position, next) {
                    Self::DIAGONAL_PENALTY
                } else {
                    0
                }
            })],
        }
    }

    /// Prefers straight runs: diagonals become expensive and zig-zagging is
    /// penalized.
    pub fn with_straight_lines(self) -> Self {
        self.with_cost_term(|node, next| {
            if is_diagonal(node.position, next) {
                Self::STRAIGHT_DIAGONAL_PENALTY
            } else {
                0
            }
        })
        .with_cost_term(|node, next| match node.parent {
            Some(parent)
                if parent.delta_to(node.position) != node.position.delta_to(next) =>
            {
                Self::DIRECTION_CHANGE_PENALTY
            }
            _ => 0,
        })
    }

    /// Adds a cost term summed into every step.
    pub fn with_cost_term(
        mut self,
        term: impl Fn(&SearchNode, Position) -> u32 + Send + Sync + 'static,
    ) -> Self {
        self.cost_terms.push(Box::new(term));
        self
    }

    fn step_cost(&self, node: &SearchNode, next: Position) -> u32 {
        self.cost_terms
            .iter()
            .fold(Self::BASE_COST, |cost, term| cost + term(node, next))
    }

    /// Octile estimate using the base and default diagonal costs.
    fn heuristic(from: Position, to: Position) -> u32 {
        let (dx, dy) = from.delta_to(to);
        let (dx, dy) = (dx.unsigned_abs(), dy.unsigned_abs());
        Self::BASE_COST * dx.max(dy) + Self::DIAGONAL_PENALTY * dx.min(dy)
    }

    /// Finds the cheapest route from `start` to `goal`.
    ///
    /// The returned steps exclude `start` and end with `goal`. An empty vector
    /// means no route exists. Tiles other than the endpoints are entered only
    /// if `is_valid` accepts them.
    pub fn shortest_path(
        &self,
        grid: &TileField,
        start: Position,
        goal: Position,
        is_valid: impl Fn(&Tile) -> bool,
    ) -> Result<Vec<Position>, PathError> {
        grid.tile_at(start).ok_or(PathError::StartNotFound(start))?;
        grid.tile_at(goal).ok_or(PathError::GoalNotFound(goal))?;

        let mut nodes: HashMap<Position, SearchNode> = HashMap::new();
        let mut closed: HashSet<Position> = HashSet::new();
        // Ordered by (f, h, position): min f, ties on min h.
        let mut open: BTreeSet<(u32, u32, Position)> = BTreeSet::new();

        let origin = SearchNode {
            position: start,
            g_cost: 0,
            h_cost: Self::heuristic(start, goal),
            parent: None,
        };
        open.insert((origin.f_cost(), origin.h_cost, start));
        nodes.insert(start, origin);

        while let Some((_, _, position)) = open.pop_first() {
            if position == goal {
                return Ok(Self::reconstruct(&nodes, goal));
            }
            closed.insert(position);

            let Some(current) = nodes.get(&position).copied() else {
                continue;
            };

            for next in position.neighbors() {
                if closed.contains(&next) {
                    continue;
                }
                let Some(tile) = grid.tile_at(next) else {
                    continue;
                };
                let g_cost = current.g_cost + self.step_cost(&current, next);

                match nodes.get_mut(&next) {
                    Some(known) => {
                        if g_cost < known.g_cost {
                            open.remove(&(known.f_cost(), known.h_cost, next));
                            known.g_cost = g_cost;
                            known.parent = Some(position);
                            open.insert((known.f_cost(), known.h_cost, next));
                        }
                    }
                    None => {
                        if next != goal && next != start && !is_valid(tile) {
                            continue;
                        }
                        let node = SearchNode {
                            position: next,
                            g_cost,
                            h_cost: Self::heuristic(next, goal),
                            parent: Some(position),
                        };
                        open.insert((node.f_cost(), node.h_cost, next));
                        nodes.insert(next, node);
                    }
                }
            }
        }

        Ok(Vec::new())
    }

    fn reconstruct(nodes: &HashMap<Position, SearchNode>, goal: Position) -> Vec<Position> {
        let mut path = Vec::new();
        let mut cursor = nodes.get(&goal);
        while let Some(node) = cursor {
            let Some(parent) = node.parent else {
                break;
            };
            path.push(node.position);
            cursor = nodes.get(&parent);
        }
        path.reverse();
        path
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Pathfinder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pathfinder")
            .field("cost_terms", &self.cost_terms.len())
            .finish()
    }
}

fn is_diagonal(from: Position, to: Position) -> bool {
    let (dx, dy) = from.delta_to(to);
    dx != 0 && dy != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TerrainKind;

    fn any_tile(tile: &Tile) -> bool {
        tile.is_passable()
    }

    fn walled(width: u32, height: u32, walls: impl IntoIterator<Item = (i32, i32)>) -> TileField {
        let mut grid = TileField::new(width, height);
        for (x, y) in walls {
            grid.set_terrain(Position::new(x, y), TerrainKind::Wall);
        }
        grid
    }

    fn assert_well_formed(path: &[Position], start: Position, goal: Position) {
        assert!(start.is_adjacent(path[0]));
        assert_eq!(path.last(), Some(&goal));
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
        }
    }

    #[test]
    fn open_field_takes_the_diagonal() {
        let grid = TileField::new(5, 5);
        let path = Pathfinder::new()
            .shortest_path(&grid, Position::ORIGIN, Position::new(4, 4), any_tile)
            .unwrap();

        assert_eq!(
            path,
            vec![
                Position::new(1, 1),
                Position::new(2, 2),
                Position::new(3, 3),
                Position::new(4, 4),
            ]
        );
    }

    #[test]
    fn wall_with_gap_forces_detour() {
        let grid = walled(5, 5, (0..4).map(|y| (2, y)));
        let path = Pathfinder::new()
            .shortest_path(&grid, Position::ORIGIN, Position::new(4, 4), any_tile)
            .unwrap();

        assert!(path.len() > 4);
        assert!(path.contains(&Position::new(2, 4)));
        assert_well_formed(&path, Position::ORIGIN, Position::new(4, 4));
        assert!(path.iter().all(|p| grid.passable(*p)));
    }

    #[test]
    fn sealed_goal_yields_empty_path() {
        let grid = walled(5, 5, (0..5).map(|y| (2, y)));
        let path = Pathfinder::new()
            .shortest_path(&grid, Position::ORIGIN, Position::new(4, 4), any_tile)
            .unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn predicate_is_respected_except_at_goal() {
        let grid = TileField::new(5, 3);
        let forbidden = [Position::new(1, 1), Position::new(2, 1), Position::new(3, 1)];
        let goal = Position::new(4, 1);
        let path = Pathfinder::new()
            .shortest_path(&grid, Position::new(0, 1), goal, |tile| {
                !forbidden.contains(&tile.position())
            })
            .unwrap();

        assert_well_formed(&path, Position::new(0, 1), goal);
        assert!(path.iter().all(|p| !forbidden.contains(p)));

        // A goal the predicate rejects is still a valid destination.
        let path = Pathfinder::new()
            .shortest_path(&grid, Position::new(0, 1), Position::new(2, 1), |tile| {
                !forbidden.contains(&tile.position())
            })
            .unwrap();
        assert_eq!(path.last(), Some(&Position::new(2, 1)));
    }

    #[test]
    fn start_equal_to_goal_is_empty() {
        let grid = TileField::new(2, 2);
        let path = Pathfinder::new()
            .shortest_path(&grid, Position::ORIGIN, Position::ORIGIN, any_tile)
            .unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn off_grid_endpoints_are_precondition_errors() {
        let grid = TileField::new(3, 3);
        let finder = Pathfinder::new();
        assert_eq!(
            finder.shortest_path(&grid, Position::new(-1, 0), Position::ORIGIN, any_tile),
            Err(PathError::StartNotFound(Position::new(-1, 0)))
        );
        assert_eq!(
            finder.shortest_path(&grid, Position::ORIGIN, Position::new(3, 3), any_tile),
            Err(PathError::GoalNotFound(Position::new(3, 3)))
        );
    }

    #[test]
    fn straight_lines_avoid_diagonals() {
        let grid = TileField::new(6, 3);
        let goal = Position::new(3, 1);

        let default_path = Pathfinder::new()
            .shortest_path(&grid, Position::ORIGIN, goal, any_tile)
            .unwrap();
        assert_eq!(default_path.len(), 3);

        let straight = Pathfinder::new()
            .with_straight_lines()
            .shortest_path(&grid, Position::ORIGIN, goal, any_tile)
            .unwrap();
        assert_eq!(straight.len(), 4);
        assert_well_formed(&straight, Position::ORIGIN, goal);
        let mut previous = Position::ORIGIN;
        for step in &straight {
            assert!(!is_diagonal(previous, *step));
            previous = *step;
        }
    }

    #[test]
    fn custom_cost_term_steers_the_route() {
        let grid = TileField::new(3, 3);
        // Entering the top row is expensive, so the route dips through row 1.
        let finder = Pathfinder::new().with_cost_term(|_, next| if next.y == 0 { 100 } else { 0 });
        let path = finder
            .shortest_path(&grid, Position::new(0, 0), Position::new(2, 0), any_tile)
            .unwrap();
        assert_eq!(path, vec![Position::new(1, 1), Position::new(2, 0)]);
    }
}
