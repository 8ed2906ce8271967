//! Scripted player that builds towers along the path and starts rounds.

use tower_defence_core::{CellCoord, Command, Event, GameError, Phase, PlayerIndex, TowerSpec};
use tower_defence_world::{apply, query, World};
use tracing::{debug, info, warn};

/// Neighbourhood scanned around every path tile for construction sites.
const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug)]
pub(crate) struct Autopilot {
    player: PlayerIndex,
    rounds: u32,
}

impl Autopilot {
    pub(crate) fn new(rounds: u32) -> Self {
        Self {
            player: PlayerIndex::new(0),
            rounds,
        }
    }

    /// Starts the game and registers the autopilot as a player.
    pub(crate) fn join(&mut self, world: &mut World) -> Result<(), GameError> {
        let mut events = Vec::new();
        apply(world, Command::Start, &mut events)?;
        apply(world, Command::AddPlayer, &mut events)?;

        if let Some(player) = events.iter().find_map(|event| match event {
            Event::PlayerJoined { player } => Some(*player),
            _ => None,
        }) {
            self.player = player;
        }
        Ok(())
    }

    /// Reacts to the state reached after a tick.
    pub(crate) fn frame(&mut self, world: &mut World, events: &[Event]) -> Result<(), GameError> {
        for event in events {
            if let Event::PhaseChanged { phase } = event {
                info!(
                    ?phase,
                    round = query::round(world),
                    base_health = query::base_health(world),
                    "phase changed"
                );
            }
        }

        let mut events = Vec::new();
        match query::phase(world) {
            Phase::Defending => Ok(()),
            Phase::Lost => {
                warn!(round = query::round(world), "base destroyed, stopping");
                apply(world, Command::Stop, &mut events)
            }
            Phase::Building if query::round(world) >= self.rounds => {
                info!(rounds = self.rounds, "planned rounds played, stopping");
                apply(world, Command::Stop, &mut events)
            }
            Phase::Building => {
                self.fortify(world);
                apply(world, Command::StartRound, &mut events)
            }
        }
    }

    /// Spends the balance on the priciest affordable towers, closest to the
    /// base first.
    fn fortify(&self, world: &mut World) {
        for cell in construction_sites(world) {
            let Some(coins) = query::player(world, self.player).map(|player| player.coins) else {
                return;
            };
            let Some(name) = strongest_affordable(&query::config(world).towers, coins) else {
                return;
            };

            let mut events = Vec::new();
            let command = Command::PlaceTower {
                name,
                cell,
                player: self.player,
            };
            if let Err(error) = apply(world, command, &mut events) {
                debug!(%error, "autopilot placement skipped");
            }
        }
    }
}

/// Free tiles touching the path, ordered from the base toward the spawn.
fn construction_sites(world: &World) -> Vec<CellCoord> {
    let size = query::field_size(world);
    let mut sites: Vec<CellCoord> = Vec::new();

    for tile in query::path(world).iter().rev() {
        for (columns, rows) in NEIGHBOURS {
            let Some(cell) = tile.cell.offset(columns, rows, size) else {
                continue;
            };
            if sites.contains(&cell) || !query::collisions(world, cell).is_empty() {
                continue;
            }
            sites.push(cell);
        }
    }

    sites
}

fn strongest_affordable(catalog: &[TowerSpec], coins: u32) -> Option<String> {
    catalog
        .iter()
        .filter(|spec| spec.cost <= coins)
        .max_by_key(|spec| (spec.cost, spec.damage))
        .map(|spec| spec.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defence_core::{Connection, Direction, Field, GameConfig, LifecycleState, PathTile};

    fn corridor_world() -> World {
        let path = (0..6)
            .map(|column| PathTile {
                index: column as usize,
                cell: CellCoord::new(column, 2),
                entry: Connection::Heading(Direction::West),
                exit: Connection::Heading(Direction::East),
            })
            .collect();
        let config = GameConfig {
            field_width: 6,
            field_height: 5,
            seed: Some(4),
            ..GameConfig::default()
        };
        World::with_field(
            config,
            Field {
                path,
                obstacles: Vec::new(),
            },
        )
    }

    #[test]
    fn strongest_affordable_prefers_the_priciest_tower() {
        let catalog = TowerSpec::catalog();
        assert_eq!(strongest_affordable(&catalog, 80).as_deref(), Some("Heavy"));
        assert_eq!(strongest_affordable(&catalog, 60).as_deref(), Some("Sniper"));
        assert_eq!(strongest_affordable(&catalog, 24), None);
    }

    #[test]
    fn construction_sites_start_next_to_the_base() {
        let mut world = corridor_world();
        let mut autopilot = Autopilot::new(1);
        autopilot.join(&mut world).expect("join succeeds");

        let sites = construction_sites(&world);

        assert_eq!(sites[0], CellCoord::new(4, 1));
        assert!(sites.iter().all(|cell| cell.row() != 2));
        assert_eq!(sites.len(), 12);
    }

    #[test]
    fn building_phase_fortifies_then_starts_the_round() {
        let mut world = corridor_world();
        let mut autopilot = Autopilot::new(1);
        autopilot.join(&mut world).expect("join succeeds");

        autopilot.frame(&mut world, &[]).expect("frame succeeds");

        assert_eq!(query::towers(&world).len(), 1);
        assert_eq!(query::towers(&world)[0].name, "Heavy");
        assert_eq!(query::phase(&world), Phase::Defending);
    }

    #[test]
    fn autopilot_stops_after_the_planned_rounds() {
        let mut world = corridor_world();
        let mut autopilot = Autopilot::new(0);
        autopilot.join(&mut world).expect("join succeeds");

        autopilot.frame(&mut world, &[]).expect("frame succeeds");

        assert_eq!(query::lifecycle(&world), LifecycleState::Stopped);
    }
}
