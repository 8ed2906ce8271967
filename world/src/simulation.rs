//! Per-tick combat and movement.
//!
//! A tick first lets every loaded tower fire once, then walks the enemies
//! along the path and finally resolves the phase of the round.

use std::time::Duration;

use tower_defence_core::{
    CellCoord, Enemy, Event, GameState, LifecycleState, PathTile, Phase, Player, PlayerIndex,
    Tower,
};
use tracing::{info, trace};

use crate::World;

pub(crate) fn tick(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    if world.state.lifecycle != LifecycleState::Started || world.state.phase != Phase::Defending {
        return;
    }

    fire_towers(&mut world.state, &mut world.players, dt, out_events);
    advance_enemies(&mut world.state, dt, out_events);
    resolve_phase(&mut world.state, world.players.is_empty(), out_events);
}

fn fire_towers(
    state: &mut GameState,
    players: &mut [Player],
    dt: Duration,
    out_events: &mut Vec<Event>,
) {
    let seconds = dt.as_secs_f64();
    let GameState {
        path,
        towers,
        enemies,
        ..
    } = state;

    for tower in towers.iter_mut() {
        if tower.reload_progress < 1.0 {
            tower.reload_progress += seconds * tower.reload_speed;
        }
        if tower.reload_progress < 1.0 {
            continue;
        }

        let Some(target) = acquire_target(tower, path, enemies) else {
            continue;
        };
        let Some(enemy) = enemies.get_mut(target) else {
            continue;
        };

        let damage = enemy.health.min(tower.damage);
        enemy.health -= damage;
        tower.reload_progress -= 1.0;
        tower.rotation_degrees = heading_degrees(tower.cell, enemy.cell);

        trace!(
            tower = tower.id.get(),
            enemy = enemy.id.get(),
            damage,
            remaining = enemy.health,
            "tower fired"
        );
        out_events.push(Event::TowerFired {
            tower: tower.id,
            enemy: enemy.id,
            damage,
            rotation_degrees: tower.rotation_degrees,
        });

        if enemy.health == 0 {
            let (id, reward) = (enemy.id, enemy.reward);
            let credited = credit_reward(players, tower.owner, reward);
            let _ = enemies.remove(target);
            out_events.push(Event::EnemyKilled {
                enemy: id,
                reward,
                player: credited,
            });
        }
    }
}

/// Index of the first active enemy standing on a covered tile, scanning
/// tiles nearest to the base first.
fn acquire_target(tower: &Tower, path: &[PathTile], enemies: &[Enemy]) -> Option<usize> {
    tower
        .effective_range
        .iter()
        .filter_map(|&index| path.get(index))
        .find_map(|tile| {
            enemies
                .iter()
                .position(|enemy| enemy.is_active() && enemy.cell == tile.cell)
        })
}

/// Heading from `from` toward `to` in degrees, zero pointing up and growing
/// clockwise.
fn heading_degrees(from: CellCoord, to: CellCoord) -> f64 {
    let dx = f64::from(to.column()) - f64::from(from.column());
    let dy = f64::from(to.row()) - f64::from(from.row());
    let degrees = dy.atan2(dx).to_degrees() + 90.0;
    if degrees < 0.0 {
        degrees + 360.0
    } else {
        degrees
    }
}

/// Pays `reward` to `owner`, or to the most recent player when the owner
/// index no longer resolves.
fn credit_reward(players: &mut [Player], owner: PlayerIndex, reward: u32) -> Option<PlayerIndex> {
    let index = if owner.get() < players.len() {
        owner.get()
    } else {
        players.len().checked_sub(1)?
    };
    let player = players.get_mut(index)?;
    player.coins = player.coins.saturating_add(reward);
    Some(player.index)
}

fn advance_enemies(state: &mut GameState, dt: Duration, out_events: &mut Vec<Event>) {
    let GameState {
        path,
        enemies,
        base_health,
        ..
    } = state;
    let mut arrived: Vec<usize> = Vec::new();

    for (index, enemy) in enemies.iter_mut().enumerate() {
        let mut walked = dt;
        if !enemy.spawn_delay.is_zero() {
            if enemy.spawn_delay > dt {
                enemy.spawn_delay -= dt;
                continue;
            }
            walked = dt - enemy.spawn_delay;
            enemy.spawn_delay = Duration::ZERO;
        }

        enemy.progress += walked.as_secs_f64() * enemy.speed_multiplier;
        match path.get(enemy.tile_index()) {
            Some(tile) => enemy.cell = tile.cell,
            None => {
                *base_health = base_health.saturating_sub(enemy.health);
                arrived.push(index);
                trace!(
                    enemy = enemy.id.get(),
                    damage = enemy.health,
                    base_health = *base_health,
                    "enemy reached the base"
                );
                out_events.push(Event::EnemyLeaked {
                    enemy: enemy.id,
                    damage: enemy.health,
                });
            }
        }
    }

    for index in arrived.into_iter().rev() {
        let _ = enemies.remove(index);
    }
}

fn resolve_phase(state: &mut GameState, deserted: bool, out_events: &mut Vec<Event>) {
    let phase = if state.base_health == 0 || deserted {
        state.round = state.round.saturating_sub(1);
        info!(round = state.round, "base lost");
        Phase::Lost
    } else if state.enemies.is_empty() {
        info!(round = state.round, "round cleared");
        Phase::Building
    } else {
        return;
    };

    state.phase = phase;
    out_events.push(Event::PhaseChanged { phase });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_points_up_at_zero_and_turns_clockwise() {
        let origin = CellCoord::new(5, 5);
        let close = |left: f64, right: f64| (left - right).abs() < 1e-9;

        assert!(close(heading_degrees(origin, CellCoord::new(5, 2)), 0.0));
        assert!(close(heading_degrees(origin, CellCoord::new(8, 5)), 90.0));
        assert!(close(heading_degrees(origin, CellCoord::new(5, 9)), 180.0));
        assert!(close(heading_degrees(origin, CellCoord::new(1, 5)), 270.0));
    }

    #[test]
    fn heading_stays_within_a_full_turn() {
        let origin = CellCoord::new(3, 3);
        for column in 0..7 {
            for row in 0..7 {
                let degrees = heading_degrees(origin, CellCoord::new(column, row));
                assert!((0.0..360.0).contains(&degrees), "{degrees} out of range");
            }
        }
    }

    #[test]
    fn rewards_fall_back_to_the_last_player() {
        let mut players = vec![
            Player {
                index: PlayerIndex::new(0),
                coins: 0,
            },
            Player {
                index: PlayerIndex::new(1),
                coins: 0,
            },
        ];

        assert_eq!(
            credit_reward(&mut players, PlayerIndex::new(7), 3),
            Some(PlayerIndex::new(1))
        );
        assert_eq!(players[1].coins, 3);
        assert_eq!(credit_reward(&mut [], PlayerIndex::new(0), 3), None);
    }
}
