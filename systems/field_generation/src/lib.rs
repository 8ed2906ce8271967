#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomised field generation: the enemy path and the scattered obstacles.
//!
//! Both steps are constrained random walks over the tile grid that avoid
//! earlier placements. They run once when a game starts and never again.

use rand::Rng;
use tower_defence_core::{
    CellCoord, Connection, Direction, Field, FieldSize, IdAllocator, Obstacle, PathTile,
};
use tracing::debug;

const DEFAULT_RETRY_BUDGET: u32 = 8;
const TURN_ROLL_SIDES: usize = 8;

/// Configuration parameters required to construct the field generator.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    retry_budget: u32,
}

impl Config {
    /// Creates a configuration allowing `retry_budget` consecutive rejected
    /// path steps before rejections start consuming the step budget.
    #[must_use]
    pub const fn new(retry_budget: u32) -> Self {
        Self { retry_budget }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_BUDGET)
    }
}

/// Pure system that lays out the enemy path and the obstacles of a field.
#[derive(Clone, Debug, Default)]
pub struct FieldGenerator {
    config: Config,
}

impl FieldGenerator {
    /// Creates a new generator using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Generates a complete field.
    ///
    /// The `is_blocked` closure reports tiles already claimed by obstacles or
    /// towers; neither the path nor the obstacles are placed on them.
    pub fn generate<R, F>(
        &self,
        size: FieldSize,
        rng: &mut R,
        ids: &mut IdAllocator,
        removal_cost: u32,
        mut is_blocked: F,
    ) -> Field
    where
        R: Rng + ?Sized,
        F: FnMut(CellCoord) -> bool,
    {
        let path = self.generate_path(size, rng, &mut is_blocked);
        let obstacles = scatter_obstacles(size, rng, ids, removal_cost, |cell| {
            is_blocked(cell) || path.iter().any(|tile| tile.cell == cell)
        });

        debug!(
            path_length = path.len(),
            obstacles = obstacles.len(),
            "field generated"
        );

        Field { path, obstacles }
    }

    /// Walks a self-avoiding path across the field.
    ///
    /// The walk starts on a random unblocked tile with a random heading and
    /// takes `(width + height) * (1 + U[0,1))` steps, wrapping around the
    /// field edges. Each step keeps the heading or turns, but never reverses.
    /// Steps onto blocked tiles or back onto the path are rejected; rejected
    /// steps are retried for free until the retry budget is exhausted, after
    /// which they consume the step budget so the walk always terminates.
    pub fn generate_path<R, F>(
        &self,
        size: FieldSize,
        rng: &mut R,
        mut is_blocked: F,
    ) -> Vec<PathTile>
    where
        R: Rng + ?Sized,
        F: FnMut(CellCoord) -> bool,
    {
        if size.is_empty() {
            return Vec::new();
        }

        let Some(mut cell) = pick_start(size, rng, &mut is_blocked) else {
            return Vec::new();
        };
        let mut heading = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];

        let steps = (span(size) * (1.0 + rng.gen::<f64>())) as u32;
        let mut path: Vec<PathTile> = Vec::with_capacity(steps as usize);
        let mut rejections = 0;
        let mut step = 0;

        while step < steps {
            let next_heading = turn(heading, rng);
            let candidate = cell.step_wrapping(next_heading, size);

            if candidate == cell
                || is_blocked(candidate)
                || path.iter().any(|tile| tile.cell == candidate)
            {
                rejections += 1;
                if rejections > self.config.retry_budget {
                    step += 1;
                }
                continue;
            }

            path.push(PathTile {
                index: path.len(),
                cell,
                entry: Connection::Heading(heading.opposite()),
                exit: Connection::Heading(next_heading),
            });
            cell = candidate;
            heading = next_heading;
            rejections = 0;
            step += 1;
        }

        if path.is_empty() {
            path.push(PathTile {
                index: 0,
                cell,
                entry: Connection::Start,
                exit: Connection::End,
            });
        }

        if let Some(first) = path.first_mut() {
            first.entry = Connection::Start;
        }
        if let Some(last) = path.last_mut() {
            last.exit = Connection::End;
        }

        path
    }
}

/// Scatters obstacles over random free tiles.
///
/// Makes `(width + height) * U[0,1)` attempts; an attempt landing on a tile
/// reported by `is_occupied` or on an earlier obstacle is skipped.
pub fn scatter_obstacles<R, F>(
    size: FieldSize,
    rng: &mut R,
    ids: &mut IdAllocator,
    removal_cost: u32,
    mut is_occupied: F,
) -> Vec<Obstacle>
where
    R: Rng + ?Sized,
    F: FnMut(CellCoord) -> bool,
{
    if size.is_empty() {
        return Vec::new();
    }

    let attempts = (span(size) * rng.gen::<f64>()) as u32;
    let mut obstacles: Vec<Obstacle> = Vec::new();

    for _ in 0..attempts {
        let cell = random_cell(size, rng);
        if is_occupied(cell) || obstacles.iter().any(|obstacle| obstacle.cell == cell) {
            continue;
        }

        obstacles.push(Obstacle {
            id: ids.next_obstacle(),
            cell,
            removal_cost,
        });
    }

    obstacles
}

fn span(size: FieldSize) -> f64 {
    f64::from(size.width()) + f64::from(size.height())
}

fn random_cell<R>(size: FieldSize, rng: &mut R) -> CellCoord
where
    R: Rng + ?Sized,
{
    CellCoord::new(rng.gen_range(0..size.width()), rng.gen_range(0..size.height()))
}

fn pick_start<R, F>(size: FieldSize, rng: &mut R, is_blocked: &mut F) -> Option<CellCoord>
where
    R: Rng + ?Sized,
    F: FnMut(CellCoord) -> bool,
{
    let attempts = u64::from(size.width()) * u64::from(size.height());
    for _ in 0..attempts {
        let cell = random_cell(size, rng);
        if !is_blocked(cell) {
            return Some(cell);
        }
    }

    size.cells().find(|cell| !is_blocked(*cell))
}

/// Rolls an eight-sided die: the first four faces select a heading, the rest
/// keep the current one. A heading that would reverse the walk is ignored.
fn turn<R>(heading: Direction, rng: &mut R) -> Direction
where
    R: Rng + ?Sized,
{
    match Direction::ALL.get(rng.gen_range(0..TURN_ROLL_SIDES)) {
        Some(&candidate) if candidate != heading.opposite() => candidate,
        _ => heading,
    }
}
