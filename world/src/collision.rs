//! Tile-level collision lookups across every entity collection of a game.

use tower_defence_core::{
    CellCoord, Collidable, Enemy, EntityKind, GameState, Obstacle, PathTile, Tower,
};

/// Borrowed entity found on a tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collision<'a> {
    /// Obstacle standing on the tile.
    Obstacle(&'a Obstacle),
    /// Path segment running through the tile.
    PathTile(&'a PathTile),
    /// Tower built on the tile.
    Tower(&'a Tower),
    /// Enemy currently on the tile.
    Enemy(&'a Enemy),
}

impl Collision<'_> {
    /// Tile occupied by the colliding entity.
    #[must_use]
    pub fn cell(&self) -> CellCoord {
        match self {
            Self::Obstacle(obstacle) => obstacle.cell(),
            Self::PathTile(tile) => tile.cell(),
            Self::Tower(tower) => tower.cell(),
            Self::Enemy(enemy) => enemy.cell(),
        }
    }

    /// Kind of the colliding entity.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Obstacle(_) => Obstacle::KIND,
            Self::PathTile(_) => PathTile::KIND,
            Self::Tower(_) => Tower::KIND,
            Self::Enemy(_) => Enemy::KIND,
        }
    }
}

pub(crate) fn exists_at<T: Collidable>(items: &[T], cell: CellCoord) -> bool {
    items.iter().any(|item| item.cell() == cell)
}

pub(crate) fn all_at<T: Collidable>(items: &[T], cell: CellCoord) -> Vec<&T> {
    items.iter().filter(|item| item.cell() == cell).collect()
}

/// Every entity on `cell`, ordered obstacles, path tiles, towers, enemies.
///
/// Renderers draw the last entry, so enemies end up on top of the path.
pub(crate) fn collisions(state: &GameState, cell: CellCoord) -> Vec<Collision<'_>> {
    let mut found: Vec<Collision<'_>> = Vec::new();
    found.extend(all_at(&state.obstacles, cell).into_iter().map(Collision::Obstacle));
    found.extend(all_at(&state.path, cell).into_iter().map(Collision::PathTile));
    found.extend(all_at(&state.towers, cell).into_iter().map(Collision::Tower));
    found.extend(all_at(&state.enemies, cell).into_iter().map(Collision::Enemy));
    found
}

pub(crate) fn collisions_of_kind(
    state: &GameState,
    cell: CellCoord,
    kind: EntityKind,
) -> Vec<Collision<'_>> {
    match kind {
        EntityKind::Obstacle => all_at(&state.obstacles, cell)
            .into_iter()
            .map(Collision::Obstacle)
            .collect(),
        EntityKind::PathTile => all_at(&state.path, cell)
            .into_iter()
            .map(Collision::PathTile)
            .collect(),
        EntityKind::Tower => all_at(&state.towers, cell)
            .into_iter()
            .map(Collision::Tower)
            .collect(),
        EntityKind::Enemy => all_at(&state.enemies, cell)
            .into_iter()
            .map(Collision::Enemy)
            .collect(),
    }
}

/// Reports whether any entity occupies `cell` and so blocks construction.
///
/// Enemies count as well as obstacles, path tiles and towers.
pub(crate) fn collides(state: &GameState, cell: CellCoord) -> bool {
    exists_at(&state.obstacles, cell)
        || exists_at(&state.path, cell)
        || exists_at(&state.towers, cell)
        || exists_at(&state.enemies, cell)
}
