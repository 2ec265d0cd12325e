use crate::state::{EntityId, GameState, Position};

use super::is_blocked;

/// Rebuilds every tile's seen-by set from scratch.
///
/// Called at the start of each tick: all sets are cleared, then each living
/// entity marks the tiles inside its view radius that it has a clear line to.
pub fn refresh_visibility(state: &mut GameState) {
    state.grid.clear_visibility();

    let viewers: Vec<(EntityId, Position, f32)> = state
        .entities
        .living()
        .map(|entity| (entity.id, entity.position, entity.stats.view_distance))
        .collect();

    for (viewer, position, radius) in viewers {
        mark_visible(state, viewer, position, radius);
    }
}

/// Adds `viewer` to the seen-by sets of the tiles it can currently see
/// without clearing anything first.
pub fn reveal_for(state: &mut GameState, viewer: EntityId) {
    let Some((position, radius)) = state
        .entities
        .get(viewer)
        .filter(|entity| entity.is_alive())
        .map(|entity| (entity.position, entity.stats.view_distance))
    else {
        return;
    };
    mark_visible(state, viewer, position, radius);
}

/// Positions within `radius` tiles of `center` that `center` has a clear line to.
pub fn visible_from(state: &GameState, center: Position, radius: f32) -> Vec<Position> {
    let span = radius.max(0.0).ceil() as i32;
    let mut visible = Vec::new();
    for dy in -span..=span {
        for dx in -span..=span {
            let position = center.offset(dx, dy);
            if !state.grid.contains(position) || center.euclidean_distance(position) > radius {
                continue;
            }
            if !is_blocked(&state.grid, center, position) {
                visible.push(position);
            }
        }
    }
    visible
}

fn mark_visible(state: &mut GameState, viewer: EntityId, center: Position, radius: f32) {
    for position in visible_from(state, center, radius) {
        state.grid.mark_seen(position, viewer);
    }
}
