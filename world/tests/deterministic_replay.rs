use std::time::Duration;

use tower_defence_core::{CellCoord, Command, Event, GameConfig, GameState, Phase, PlayerIndex};
use tower_defence_world::{apply, query, World};

const SEED: u64 = 0x1d_2e_3f;
const ROUNDS: u32 = 3;

#[test]
fn deterministic_replay_produces_identical_games() {
    let first = replay(SEED);
    let second = replay(SEED);

    assert_eq!(first.state, second.state, "state diverged between runs");
    assert_eq!(first.events, second.events, "events diverged between runs");
    assert_eq!(first.coins, second.coins);
}

#[test]
fn replay_defends_at_least_one_round() {
    let outcome = replay(SEED);
    assert!(outcome.state.round >= 1);
    assert!(outcome
        .events
        .iter()
        .any(|event| matches!(event, Event::RoundStarted { round: 1, .. })));
}

struct ReplayOutcome {
    state: GameState,
    events: Vec<Event>,
    coins: Vec<u32>,
}

fn replay(seed: u64) -> ReplayOutcome {
    let config = GameConfig {
        seed: Some(seed),
        field_width: 16,
        field_height: 16,
        ..GameConfig::default()
    };
    let mut world = World::new(config);
    let mut log = Vec::new();

    submit(&mut world, Command::Start, &mut log);
    submit(&mut world, Command::AddPlayer, &mut log);
    fortify(&mut world, &mut log);

    for _ in 0..ROUNDS {
        let mut events = Vec::new();
        if apply(&mut world, Command::StartRound, &mut events).is_err() {
            break;
        }
        log.extend(events);

        for _ in 0..2_000 {
            submit(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(50),
                },
                &mut log,
            );
            if query::phase(&world) != Phase::Defending {
                break;
            }
        }
    }

    ReplayOutcome {
        state: query::state(&world).clone(),
        events: log,
        coins: query::players(&world)
            .iter()
            .map(|player| player.coins)
            .collect(),
    }
}

/// Spends the starting balance on soldiers next to the last path tiles.
fn fortify(world: &mut World, log: &mut Vec<Event>) {
    let size = query::field_size(world);
    let candidates: Vec<CellCoord> = query::path(world)
        .iter()
        .rev()
        .flat_map(|tile| {
            [(0, 1), (1, 0), (0, -1), (-1, 0)]
                .into_iter()
                .filter_map(move |(columns, rows)| tile.cell.offset(columns, rows, size))
        })
        .collect();

    for cell in candidates {
        let mut events = Vec::new();
        let placed = apply(
            world,
            Command::PlaceTower {
                name: "Soldier".to_owned(),
                cell,
                player: PlayerIndex::new(0),
            },
            &mut events,
        );
        log.extend(events);
        if placed.is_err() && query::players(world)[0].coins < 25 {
            break;
        }
    }
}

fn submit(world: &mut World, command: Command, log: &mut Vec<Event>) {
    let mut events = Vec::new();
    apply(world, command, &mut events).expect("command succeeds");
    log.extend(events);
}
