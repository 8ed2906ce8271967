//! Player economy: tower construction, demolition and obstacle clearing.
//!
//! Every operation validates the whole request before touching the world, so
//! a rejected command never leaves a partial mutation behind.

use tower_defence_core::{
    CellCoord, Event, FieldSize, GameError, PathTile, Player, PlayerIndex, Tower,
};
use tracing::debug;

use crate::{collision, World};

pub(crate) fn add_player(world: &mut World, out_events: &mut Vec<Event>) {
    let index = PlayerIndex::new(world.players.len());
    world.players.push(Player {
        index,
        coins: world.config.starting_coins,
    });

    debug!(player = index.get(), "player joined");
    out_events.push(Event::PlayerJoined { player: index });
}

pub(crate) fn place_tower(
    world: &mut World,
    name: &str,
    cell: CellCoord,
    player: PlayerIndex,
    out_events: &mut Vec<Event>,
) -> Result<(), GameError> {
    world.ensure_active()?;
    let available = balance(&world.players, player)?;

    let size = world.config.field_size();
    if !size.contains(cell) {
        return Err(GameError::OutOfBounds(cell));
    }
    if collision::collides(&world.state, cell) {
        return Err(GameError::Occupied(cell));
    }

    let spec = world
        .config
        .tower(name)
        .ok_or_else(|| GameError::UnknownTowerType(name.to_owned()))?;
    if spec.cost > available {
        return Err(GameError::InsufficientFunds {
            required: spec.cost,
            available,
        });
    }

    let tower = Tower {
        id: world.ids.next_tower(),
        cell,
        owner: player,
        name: spec.name.clone(),
        cost: spec.cost,
        range: spec.range,
        damage: spec.damage,
        reload_speed: spec.reload_speed,
        reload_progress: 0.0,
        rotation_degrees: 0.0,
        effective_range: effective_range(&world.state.path, cell, spec.range, size),
    };

    debit(&mut world.players, player, tower.cost);
    debug!(
        tower = tower.id.get(),
        name = %tower.name,
        column = cell.column(),
        row = cell.row(),
        covered = tower.effective_range.len(),
        "tower placed"
    );
    out_events.push(Event::TowerPlaced {
        tower: tower.id,
        name: tower.name.clone(),
        cell,
        owner: player,
    });
    world.state.towers.push(tower);
    Ok(())
}

pub(crate) fn destroy_tower(
    world: &mut World,
    cell: CellCoord,
    player: PlayerIndex,
    out_events: &mut Vec<Event>,
) -> Result<(), GameError> {
    world.ensure_active()?;
    let _ = balance(&world.players, player)?;

    let (id, owner, cost) = match collision::all_at(&world.state.towers, cell).as_slice() {
        [tower] => (tower.id, tower.owner, tower.cost),
        found => {
            return Err(GameError::InvalidSelection {
                cell,
                found: found.len(),
            })
        }
    };
    if owner != player {
        return Err(GameError::NotOwner { tower: id, player });
    }

    let refund = (f64::from(cost) * world.config.refund_multiplier).floor() as u32;
    world.state.towers.retain(|tower| tower.id != id);
    credit(&mut world.players, player, refund);

    debug!(tower = id.get(), refund, "tower removed");
    out_events.push(Event::TowerRemoved {
        tower: id,
        cell,
        refund,
    });
    Ok(())
}

pub(crate) fn destroy_obstacle(
    world: &mut World,
    cell: CellCoord,
    player: PlayerIndex,
    out_events: &mut Vec<Event>,
) -> Result<(), GameError> {
    world.ensure_active()?;
    let available = balance(&world.players, player)?;

    let (id, cost) = match collision::all_at(&world.state.obstacles, cell).as_slice() {
        [obstacle] => (obstacle.id, obstacle.removal_cost),
        found => {
            return Err(GameError::InvalidSelection {
                cell,
                found: found.len(),
            })
        }
    };
    if cost > available {
        return Err(GameError::InsufficientFunds {
            required: cost,
            available,
        });
    }

    world.state.obstacles.retain(|obstacle| obstacle.id != id);
    debit(&mut world.players, player, cost);

    debug!(obstacle = id.get(), cost, "obstacle removed");
    out_events.push(Event::ObstacleRemoved {
        obstacle: id,
        cell,
        cost,
    });
    Ok(())
}

/// Path indices inside the square of side `2 * range + 1` centred on
/// `origin`, clipped to the field and sorted nearest-to-base first.
pub(crate) fn effective_range(
    path: &[PathTile],
    origin: CellCoord,
    range: u32,
    size: FieldSize,
) -> Vec<usize> {
    let reach = i64::from(range);
    let mut indices: Vec<usize> = Vec::new();

    for rows in -reach..=reach {
        for columns in -reach..=reach {
            let Some(cell) = origin.offset(columns, rows, size) else {
                continue;
            };
            indices.extend(collision::all_at(path, cell).into_iter().map(|tile| tile.index));
        }
    }

    indices.sort_unstable_by(|left, right| right.cmp(left));
    indices
}

fn balance(players: &[Player], player: PlayerIndex) -> Result<u32, GameError> {
    players
        .get(player.get())
        .map(|entry| entry.coins)
        .ok_or(GameError::InvalidPlayer(player))
}

fn debit(players: &mut [Player], player: PlayerIndex, amount: u32) {
    if let Some(entry) = players.get_mut(player.get()) {
        entry.coins = entry.coins.saturating_sub(amount);
    }
}

fn credit(players: &mut [Player], player: PlayerIndex, amount: u32) {
    if let Some(entry) = players.get_mut(player.get()) {
        entry.coins = entry.coins.saturating_add(amount);
    }
}
