#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the tower defence simulation.
//!
//! The world owns the game state, the players and the random source. It is
//! mutated exclusively through [`apply`] and observed through [`query`].

mod collision;
pub mod driver;
mod economy;
mod simulation;

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_defence_core::{
    CellCoord, Command, Enemy, Event, Field, FieldSize, GameConfig, GameError, GameState,
    IdAllocator, LifecycleState, Phase, Player,
};
use tower_defence_system_field_generation::FieldGenerator;
use tower_defence_system_wave_table::{release_window, WaveTable};
use tracing::{debug, info};

pub use collision::Collision;

/// Represents the authoritative state of a single game.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    state: GameState,
    players: Vec<Player>,
    ids: IdAllocator,
    rng: ChaCha8Rng,
    field_generator: FieldGenerator,
    wave_table: WaveTable,
    prepared_field: Option<Field>,
}

impl World {
    /// Creates a waiting world whose field is generated when the game starts.
    ///
    /// The random source is seeded from `config.seed`, or from entropy when no
    /// seed is configured.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            state: GameState::new(config.base_health),
            players: Vec::new(),
            ids: IdAllocator::new(),
            rng,
            field_generator: FieldGenerator::default(),
            wave_table: WaveTable::new(config.waves.clone()),
            prepared_field: None,
            config,
        }
    }

    /// Creates a waiting world that installs `field` instead of generating
    /// one when the game starts.
    ///
    /// Obstacles are re-numbered from the world's own allocator. The layout
    /// is checked by `Start`, which rejects tiles outside the configured field
    /// with [`GameError::OutOfBounds`] and shared tiles with
    /// [`GameError::Occupied`].
    #[must_use]
    pub fn with_field(config: GameConfig, mut field: Field) -> Self {
        let mut world = Self::new(config);
        for obstacle in &mut field.obstacles {
            obstacle.id = world.ids.next_obstacle();
        }
        world.prepared_field = Some(field);
        world
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        if self.state.lifecycle.is_active() {
            Ok(())
        } else {
            Err(GameError::NotActive)
        }
    }

    fn start(&mut self, out_events: &mut Vec<Event>) -> Result<(), GameError> {
        if self.state.lifecycle != LifecycleState::Waiting {
            return Err(GameError::NotWaiting);
        }
        if let Some(field) = &self.prepared_field {
            check_field(field, self.config.field_size())?;
        }

        let field = match self.prepared_field.take() {
            Some(field) => field,
            None => {
                let towers = &self.state.towers;
                let obstacles = &self.state.obstacles;
                self.field_generator.generate(
                    self.config.field_size(),
                    &mut self.rng,
                    &mut self.ids,
                    self.config.obstacle_removal_cost,
                    |cell| {
                        collision::exists_at(obstacles, cell) || collision::exists_at(towers, cell)
                    },
                )
            }
        };

        out_events.push(Event::FieldGenerated {
            path_length: field.path.len(),
            obstacles: field.obstacles.len(),
        });
        self.state.path = field.path;
        self.state.obstacles = field.obstacles;
        self.transition(LifecycleState::Started, out_events);
        Ok(())
    }

    fn stop(&mut self, out_events: &mut Vec<Event>) -> Result<(), GameError> {
        self.ensure_active()?;
        self.transition(LifecycleState::Stopped, out_events);
        Ok(())
    }

    fn toggle_pause(&mut self, out_events: &mut Vec<Event>) -> Result<(), GameError> {
        let next = match self.state.lifecycle {
            LifecycleState::Started => LifecycleState::Paused,
            LifecycleState::Paused => LifecycleState::Started,
            LifecycleState::Waiting | LifecycleState::Stopped => {
                return Err(GameError::NotActive)
            }
        };
        self.transition(next, out_events);
        Ok(())
    }

    fn start_round(&mut self, out_events: &mut Vec<Event>) -> Result<(), GameError> {
        self.ensure_active()?;
        if self.state.phase != Phase::Building {
            return Err(GameError::NotBuilding);
        }

        let round = self.state.round.saturating_add(1);
        let spawns = self.wave_table.wave(round, &mut self.rng);
        let origin = self
            .state
            .path
            .first()
            .map_or(CellCoord::new(0, 0), |tile| tile.cell);

        for spawn in &spawns {
            self.state.enemies.push(Enemy {
                id: self.ids.next_enemy(),
                cell: origin,
                progress: 0.0,
                health: spawn.health,
                start_health: spawn.health,
                reward: spawn.reward,
                spawn_delay: spawn.spawn_delay,
                speed_multiplier: spawn.speed_multiplier,
            });
        }
        self.state.round = round;
        self.state.phase = Phase::Defending;

        info!(
            round,
            enemies = spawns.len(),
            release = ?release_window(&spawns),
            "round started"
        );
        out_events.push(Event::RoundStarted {
            round,
            enemies: spawns.len(),
        });
        out_events.push(Event::PhaseChanged {
            phase: Phase::Defending,
        });
        Ok(())
    }

    fn transition(&mut self, state: LifecycleState, out_events: &mut Vec<Event>) {
        info!(from = ?self.state.lifecycle, to = ?state, "lifecycle changed");
        self.state.lifecycle = state;
        out_events.push(Event::LifecycleChanged { state });
    }
}

/// Rejects a prepared layout with tiles outside `size` or with two entities
/// on one tile.
fn check_field(field: &Field, size: FieldSize) -> Result<(), GameError> {
    let mut claimed: HashSet<CellCoord> = HashSet::new();
    let cells = field
        .path
        .iter()
        .map(|tile| tile.cell)
        .chain(field.obstacles.iter().map(|obstacle| obstacle.cell));

    for cell in cells {
        if !size.contains(cell) {
            return Err(GameError::OutOfBounds(cell));
        }
        if !claimed.insert(cell) {
            return Err(GameError::Occupied(cell));
        }
    }
    Ok(())
}

/// Applies the provided command to the world.
///
/// Successful commands append the events describing their effect to
/// `out_events`. A rejected command returns the reason and leaves both the
/// world and `out_events` untouched.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), GameError> {
    let outcome = match command {
        Command::Start => world.start(out_events),
        Command::Stop => world.stop(out_events),
        Command::TogglePause => world.toggle_pause(out_events),
        Command::StartRound => world.start_round(out_events),
        Command::AddPlayer => {
            economy::add_player(world, out_events);
            Ok(())
        }
        Command::PlaceTower { name, cell, player } => {
            economy::place_tower(world, &name, cell, player, out_events)
        }
        Command::DestroyTower { cell, player } => {
            economy::destroy_tower(world, cell, player, out_events)
        }
        Command::DestroyObstacle { cell, player } => {
            economy::destroy_obstacle(world, cell, player, out_events)
        }
        Command::Tick { dt } => {
            simulation::tick(world, dt, out_events);
            Ok(())
        }
    };

    if let Err(error) = &outcome {
        debug!(%error, "command rejected");
    }
    outcome
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tower_defence_core::{
        CellCoord, Enemy, EntityKind, FieldSize, GameConfig, GameState, LifecycleState, Obstacle,
        PathTile, Phase, Player, PlayerIndex, Tower,
    };

    use super::{collision, Collision, World};

    /// Provides read-only access to the complete game state.
    #[must_use]
    pub fn state(world: &World) -> &GameState {
        &world.state
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn lifecycle(world: &World) -> LifecycleState {
        world.state.lifecycle
    }

    /// Current phase.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.state.phase
    }

    /// Number of the most recent round.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.state.round
    }

    /// Remaining base health.
    #[must_use]
    pub fn base_health(world: &World) -> u32 {
        world.state.base_health
    }

    /// Obstacles currently on the field.
    #[must_use]
    pub fn obstacles(world: &World) -> &[Obstacle] {
        &world.state.obstacles
    }

    /// Enemy route ordered from spawn to base. Empty until the game starts.
    #[must_use]
    pub fn path(world: &World) -> &[PathTile] {
        &world.state.path
    }

    /// Towers in placement order.
    #[must_use]
    pub fn towers(world: &World) -> &[Tower] {
        &world.state.towers
    }

    /// Enemies in spawn order, including those still waiting to walk.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.state.enemies
    }

    /// Players in join order.
    #[must_use]
    pub fn players(world: &World) -> &[Player] {
        &world.players
    }

    /// Looks up a single player.
    #[must_use]
    pub fn player(world: &World, index: PlayerIndex) -> Option<&Player> {
        world.players.get(index.get())
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Dimensions of the playing field.
    #[must_use]
    pub fn field_size(world: &World) -> FieldSize {
        world.config.field_size()
    }

    /// Every entity on `cell`: obstacles, path tiles, towers, then enemies.
    #[must_use]
    pub fn collisions(world: &World, cell: CellCoord) -> Vec<Collision<'_>> {
        collision::collisions(&world.state, cell)
    }

    /// Entities of a single kind on `cell`.
    #[must_use]
    pub fn collisions_of_kind(
        world: &World,
        cell: CellCoord,
        kind: EntityKind,
    ) -> Vec<Collision<'_>> {
        collision::collisions_of_kind(&world.state, cell, kind)
    }
}
