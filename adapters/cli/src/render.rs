//! ASCII dump of the field, drawing the topmost entity of every tile.

use std::fmt::Write as _;

use tower_defence_core::{CellCoord, Connection, Direction};
use tower_defence_world::{query, Collision, World};

const EMPTY: char = '.';

pub(crate) fn field(world: &World) -> String {
    let size = query::field_size(world);
    let mut out = String::new();

    for row in 0..size.height() {
        for column in 0..size.width() {
            let collisions = query::collisions(world, CellCoord::new(column, row));
            out.push(collisions.last().map_or(EMPTY, glyph));
        }
        out.push('\n');
    }

    out
}

pub(crate) fn summary(world: &World) -> String {
    let mut line = format!(
        "round {} | base {} | towers {}",
        query::round(world),
        query::base_health(world),
        query::towers(world).len()
    );
    for player in query::players(world) {
        let _ = write!(line, " | player {}: {} coins", player.index.get(), player.coins);
    }
    line
}

fn glyph(collision: &Collision<'_>) -> char {
    match collision {
        Collision::Obstacle(_) => '#',
        Collision::PathTile(tile) => match (tile.entry, tile.exit) {
            (_, Connection::End) => 'B',
            (Connection::Start, _) => 'S',
            (_, Connection::Heading(direction)) => arrow(direction),
            (_, Connection::Start) => 'S',
        },
        Collision::Tower(tower) => tower.name.chars().next().unwrap_or('T'),
        Collision::Enemy(_) => 'e',
    }
}

fn arrow(direction: Direction) -> char {
    match direction {
        Direction::North => '^',
        Direction::East => '>',
        Direction::South => 'v',
        Direction::West => '<',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defence_core::{
        Command, Field, GameConfig, Obstacle, ObstacleId, PathTile, PlayerIndex,
    };
    use tower_defence_world::apply;

    fn world() -> World {
        let path = vec![
            PathTile {
                index: 0,
                cell: CellCoord::new(0, 0),
                entry: Connection::Start,
                exit: Connection::Heading(Direction::East),
            },
            PathTile {
                index: 1,
                cell: CellCoord::new(1, 0),
                entry: Connection::Heading(Direction::West),
                exit: Connection::Heading(Direction::South),
            },
            PathTile {
                index: 2,
                cell: CellCoord::new(1, 1),
                entry: Connection::Heading(Direction::North),
                exit: Connection::End,
            },
        ];
        let obstacles = vec![Obstacle {
            id: ObstacleId::new(1),
            cell: CellCoord::new(2, 1),
            removal_cost: 100,
        }];
        let config = GameConfig {
            field_width: 3,
            field_height: 2,
            seed: Some(2),
            ..GameConfig::default()
        };

        let mut world = World::with_field(config, Field { path, obstacles });
        let mut events = Vec::new();
        apply(&mut world, Command::Start, &mut events).expect("start succeeds");
        apply(&mut world, Command::AddPlayer, &mut events).expect("join succeeds");
        world
    }

    #[test]
    fn field_draws_path_obstacles_and_towers() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                name: "Soldier".to_owned(),
                cell: CellCoord::new(0, 1),
                player: PlayerIndex::new(0),
            },
            &mut events,
        )
        .expect("placement succeeds");

        assert_eq!(field(&world), "Sv.\nSB#\n");
    }

    #[test]
    fn enemies_are_drawn_above_the_path() {
        let mut world = world();
        let mut events = Vec::new();
        apply(&mut world, Command::StartRound, &mut events).expect("round starts");

        assert_eq!(field(&world).lines().next(), Some("ev."));
    }

    #[test]
    fn summary_lists_every_player() {
        let world = world();
        assert_eq!(
            summary(&world),
            "round 0 | base 100 | towers 0 | player 0: 80 coins"
        );
    }
}
