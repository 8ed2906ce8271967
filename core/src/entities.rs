//! Entities that populate the playing field and the game state tree.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CellCoord, Direction, EnemyId, ObstacleId, PlayerIndex, TowerId};

/// Kinds of entities that can occupy a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Static blocker removable for a fee.
    Obstacle,
    /// Segment of the enemy route.
    PathTile,
    /// Player-built defence.
    Tower,
    /// Hostile unit walking the path.
    Enemy,
}

/// Capability shared by every entity that lives on a tile.
pub trait Collidable {
    /// Kind reported for the implementing entity.
    const KIND: EntityKind;

    /// Tile currently occupied by the entity.
    fn cell(&self) -> CellCoord;
}

/// How a path tile connects to its neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connection {
    /// The first tile of the path, where enemies appear.
    Start,
    /// The last tile of the path, guarding the base.
    End,
    /// The neighbouring tile in the given heading.
    Heading(Direction),
}

/// Static blocker scattered across the field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Obstacle {
    /// Identifier allocated when the obstacle was generated.
    pub id: ObstacleId,
    /// Tile occupied by the obstacle.
    pub cell: CellCoord,
    /// Coins a player must pay to clear the obstacle.
    pub removal_cost: u32,
}

impl Collidable for Obstacle {
    const KIND: EntityKind = EntityKind::Obstacle;

    fn cell(&self) -> CellCoord {
        self.cell
    }
}

/// Single tile of the enemy route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathTile {
    /// Position of the tile within the route, starting at zero.
    pub index: usize,
    /// Tile occupied by the route segment.
    pub cell: CellCoord,
    /// Side enemies enter from.
    pub entry: Connection,
    /// Side enemies leave through.
    pub exit: Connection,
}

impl Collidable for PathTile {
    const KIND: EntityKind = EntityKind::PathTile;

    fn cell(&self) -> CellCoord {
        self.cell
    }
}

/// Tower built by a player.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    /// Identifier allocated at placement.
    pub id: TowerId,
    /// Tile occupied by the tower.
    pub cell: CellCoord,
    /// Player that paid for the tower.
    pub owner: PlayerIndex,
    /// Catalog name of the tower.
    pub name: String,
    /// Price paid at placement.
    pub cost: u32,
    /// Reach measured in tiles along both axes.
    pub range: u32,
    /// Health removed per shot.
    pub damage: u32,
    /// Reload gained per second of simulated time.
    pub reload_speed: f64,
    /// Accumulated reload; a shot is available once it reaches one.
    pub reload_progress: f64,
    /// Heading in degrees where zero points up.
    pub rotation_degrees: f64,
    /// Path indices within reach, nearest-to-base first.
    pub effective_range: Vec<usize>,
}

impl Collidable for Tower {
    const KIND: EntityKind = EntityKind::Tower;

    fn cell(&self) -> CellCoord {
        self.cell
    }
}

/// Hostile unit walking the path.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Identifier allocated at spawn.
    pub id: EnemyId,
    /// Tile currently occupied.
    pub cell: CellCoord,
    /// Distance walked along the path, in tiles.
    pub progress: f64,
    /// Remaining health.
    pub health: u32,
    /// Health the enemy spawned with.
    pub start_health: u32,
    /// Coins paid to the player that destroys the enemy.
    pub reward: u32,
    /// Time left before the enemy starts walking.
    pub spawn_delay: Duration,
    /// Tiles walked per second of simulated time.
    pub speed_multiplier: f64,
}

impl Enemy {
    /// Reports whether the enemy finished waiting at the spawn tile.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.spawn_delay.is_zero()
    }

    /// Index of the path tile the enemy stands on.
    #[must_use]
    pub fn tile_index(&self) -> usize {
        self.progress.max(0.0).floor() as usize
    }

    /// Fraction of the current tile already walked, for interpolated drawing.
    #[must_use]
    pub fn tile_fraction(&self) -> f64 {
        self.progress.max(0.0).fract()
    }
}

impl Collidable for Enemy {
    const KIND: EntityKind = EntityKind::Enemy;

    fn cell(&self) -> CellCoord {
        self.cell
    }
}

/// Stats of a single enemy released by a wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySpawn {
    /// Starting health.
    pub health: u32,
    /// Coins paid out when the enemy is destroyed.
    pub reward: u32,
    /// Time the enemy waits at the spawn tile.
    pub spawn_delay: Duration,
    /// Tiles walked per second.
    pub speed_multiplier: f64,
}

/// Participant spending coins on the shared field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    /// Join-order index of the player.
    pub index: PlayerIndex,
    /// Current balance.
    pub coins: u32,
}

/// Lifecycle of a game instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Created but not yet started.
    Waiting,
    /// Running.
    Started,
    /// Running but frozen.
    Paused,
    /// Terminated.
    Stopped,
}

impl LifecycleState {
    /// Reports whether the game accepts gameplay commands.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Started | Self::Paused)
    }
}

/// Sub-state of an active game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Placement allowed, no wave in progress.
    Building,
    /// A wave is walking the path.
    Defending,
    /// The base fell.
    Lost,
}

/// Static layout of the field: the enemy path and the scattered obstacles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Field {
    /// Ordered route from spawn to base.
    pub path: Vec<PathTile>,
    /// Obstacles blocking construction.
    pub obstacles: Vec<Obstacle>,
}

/// Canonical state of a game instance.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    /// Lifecycle state.
    pub lifecycle: LifecycleState,
    /// Current phase.
    pub phase: Phase,
    /// Number of the most recent round.
    pub round: u32,
    /// Remaining base health.
    pub base_health: u32,
    /// Obstacles on the field.
    pub obstacles: Vec<Obstacle>,
    /// Enemy route, ordered from spawn to base.
    pub path: Vec<PathTile>,
    /// Towers in placement order.
    pub towers: Vec<Tower>,
    /// Enemies in spawn order.
    pub enemies: Vec<Enemy>,
}

impl GameState {
    /// Creates a waiting game with an empty field.
    #[must_use]
    pub fn new(base_health: u32) -> Self {
        Self {
            lifecycle: LifecycleState::Waiting,
            phase: Phase::Building,
            round: 0,
            base_health,
            obstacles: Vec::new(),
            path: Vec::new(),
            towers: Vec::new(),
            enemies: Vec::new(),
        }
    }
}
