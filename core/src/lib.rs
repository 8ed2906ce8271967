#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tower defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point and reports [`Event`] values describing what changed.
//! Failed commands surface as a [`GameError`] and leave the world untouched.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod config;
mod entities;
mod error;

pub use config::{ConfigError, GameConfig, TowerSpec, WaveSpec};
pub use entities::{
    Collidable, Connection, Enemy, EnemySpawn, EntityKind, Field, GameState, LifecycleState,
    Obstacle, PathTile, Phase, Player, Tower,
};
pub use error::GameError;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs the field and moves a waiting game into the started state.
    Start,
    /// Ends an active game. Stopped games never resume.
    Stop,
    /// Flips an active game between started and paused.
    TogglePause,
    /// Advances the round counter and releases the next wave of enemies.
    StartRound,
    /// Registers a new player holding the configured starting balance.
    AddPlayer,
    /// Requests construction of a catalog tower on a single tile.
    PlaceTower {
        /// Catalog name of the tower to build.
        name: String,
        /// Tile that the tower should occupy.
        cell: CellCoord,
        /// Player paying for and owning the tower.
        player: PlayerIndex,
    },
    /// Requests demolition of the tower standing on a tile.
    DestroyTower {
        /// Tile holding the tower.
        cell: CellCoord,
        /// Player requesting the demolition; must own the tower.
        player: PlayerIndex,
    },
    /// Requests paid removal of the obstacle on a tile.
    DestroyObstacle {
        /// Tile holding the obstacle.
        cell: CellCoord,
        /// Player paying for the removal.
        player: PlayerIndex,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Simulated time elapsed since the previous tick, already scaled by game speed.
        dt: Duration,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the game entered a new lifecycle state.
    LifecycleChanged {
        /// State that became active.
        state: LifecycleState,
    },
    /// Reports the layout installed when the game started.
    FieldGenerated {
        /// Number of tiles composing the enemy path.
        path_length: usize,
        /// Number of obstacles scattered across the field.
        obstacles: usize,
    },
    /// Confirms that a player joined the game.
    PlayerJoined {
        /// Index assigned to the new player.
        player: PlayerIndex,
    },
    /// Confirms that a round started and its wave was spawned.
    RoundStarted {
        /// Round number that began.
        round: u32,
        /// Number of enemies released for the round.
        enemies: usize,
    },
    /// Announces that the game entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// Confirms that a tower was built.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Catalog name of the tower.
        name: String,
        /// Tile occupied by the tower.
        cell: CellCoord,
        /// Player that paid for the tower.
        owner: PlayerIndex,
    },
    /// Confirms that a tower was demolished.
    TowerRemoved {
        /// Identifier of the removed tower.
        tower: TowerId,
        /// Tile the tower used to occupy.
        cell: CellCoord,
        /// Coins returned to the owner.
        refund: u32,
    },
    /// Confirms that an obstacle was cleared.
    ObstacleRemoved {
        /// Identifier of the cleared obstacle.
        obstacle: ObstacleId,
        /// Tile the obstacle used to occupy.
        cell: CellCoord,
        /// Coins paid for the removal.
        cost: u32,
    },
    /// Reports that a tower hit an enemy.
    TowerFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Health removed from the enemy.
        damage: u32,
        /// Heading of the tower after turning toward the enemy, in degrees.
        rotation_degrees: f64,
    },
    /// Reports that an enemy was destroyed by a tower.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Coins paid out for the kill.
        reward: u32,
        /// Player credited with the reward, if any player remained.
        player: Option<PlayerIndex>,
    },
    /// Reports that an enemy reached the base.
    EnemyLeaked {
        /// Enemy that reached the end of the path.
        enemy: EnemyId,
        /// Base health removed by the enemy.
        damage: u32,
    },
}

/// Cardinal headings used while walking the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices ("up").
    North,
    /// Movement toward increasing column indices ("right").
    East,
    /// Movement toward increasing row indices ("down").
    South,
    /// Movement toward decreasing column indices ("left").
    West,
}

impl Direction {
    /// Every heading in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Heading pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Position of a player in join order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerIndex(usize);

impl PlayerIndex {
    /// Wraps a raw join-order index.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the raw join-order index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Hands out identifiers for every entity created by a single game.
///
/// Towers, enemies and obstacles share one counter so no two entities of a game
/// ever carry the same numeric id. Each game owns its own allocator.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Creates an allocator whose first identifier is `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocates an identifier for a new tower.
    pub fn next_tower(&mut self) -> TowerId {
        TowerId::new(self.advance())
    }

    /// Allocates an identifier for a new enemy.
    pub fn next_enemy(&mut self) -> EnemyId {
        EnemyId::new(self.advance())
    }

    /// Allocates an identifier for a new obstacle.
    pub fn next_obstacle(&mut self) -> ObstacleId {
        ObstacleId::new(self.advance())
    }

    fn advance(&mut self) -> u32 {
        let value = self.next;
        self.next = self.next.wrapping_add(1);
        value
    }
}

/// Location of a single field tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index (`x`) of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index (`y`) of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Moves one tile in `direction`, wrapping around the field edges.
    ///
    /// The coordinate must lie within `size`; a zero-sized field returns the
    /// coordinate unchanged.
    #[must_use]
    pub fn step_wrapping(self, direction: Direction, size: FieldSize) -> CellCoord {
        if size.is_empty() {
            return self;
        }

        let (width, height) = (size.width(), size.height());
        match direction {
            Direction::North => {
                let row = if self.row == 0 { height - 1 } else { self.row - 1 };
                CellCoord::new(self.column, row)
            }
            Direction::East => {
                let column = if self.column + 1 >= width { 0 } else { self.column + 1 };
                CellCoord::new(column, self.row)
            }
            Direction::South => {
                let row = if self.row + 1 >= height { 0 } else { self.row + 1 };
                CellCoord::new(self.column, row)
            }
            Direction::West => {
                let column = if self.column == 0 { width - 1 } else { self.column - 1 };
                CellCoord::new(column, self.row)
            }
        }
    }

    /// Offsets the coordinate by a signed delta, returning `None` when the
    /// result leaves the field.
    #[must_use]
    pub fn offset(self, columns: i64, rows: i64, size: FieldSize) -> Option<CellCoord> {
        let column = i64::from(self.column).checked_add(columns)?;
        let row = i64::from(self.row).checked_add(rows)?;
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        let cell = CellCoord::new(column, row);
        size.contains(cell).then_some(cell)
    }
}

/// Dimensions of the rectangular playing field measured in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSize {
    width: u32,
    height: u32,
}

impl FieldSize {
    /// Creates a new field size descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the field contains no tiles at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Reports whether the coordinate lies inside the field.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Iterates every tile in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
    }
}
