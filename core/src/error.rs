//! Typed failures returned by world commands.

use thiserror::Error;

use crate::{CellCoord, PlayerIndex, TowerId};

/// Reasons a command may be rejected by the world.
///
/// Every rejection leaves the game state untouched, so callers are free to
/// retry, pick another tile, or surface the message to the player.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// The game was already started.
    #[error("game state is not waiting")]
    NotWaiting,
    /// The game is neither started nor paused.
    #[error("game state is not started or paused")]
    NotActive,
    /// A round is in progress or the game was lost.
    #[error("game phase is not building")]
    NotBuilding,
    /// Something already occupies the requested tile.
    #[error("tile ({}, {}) is occupied", .0.column(), .0.row())]
    Occupied(CellCoord),
    /// The requested tile lies outside the field.
    #[error("tile ({}, {}) is outside the field", .0.column(), .0.row())]
    OutOfBounds(CellCoord),
    /// No tower with the requested name exists in the catalog.
    #[error("tower type '{0}' does not exist")]
    UnknownTowerType(String),
    /// The player index does not belong to a joined player.
    #[error("player {} is invalid", .0.get())]
    InvalidPlayer(PlayerIndex),
    /// The player cannot afford the requested action.
    #[error("not enough funds: {required} required, {available} available")]
    InsufficientFunds {
        /// Coins the action costs.
        required: u32,
        /// Coins the player holds.
        available: u32,
    },
    /// The tile does not hold exactly one matching entity.
    #[error("selection at ({}, {}) matched {found} entities", .cell.column(), .cell.row())]
    InvalidSelection {
        /// Tile that was selected.
        cell: CellCoord,
        /// Number of matching entities found on the tile.
        found: usize,
    },
    /// The tower belongs to another player.
    #[error("tower {} is not owned by player {}", .tower.get(), .player.get())]
    NotOwner {
        /// Tower that was selected.
        tower: TowerId,
        /// Player that attempted the action.
        player: PlayerIndex,
    },
    /// A driver loop was asked to shut down cleanly.
    #[error("game is exiting")]
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_tile() {
        let error = GameError::Occupied(CellCoord::new(2, 3));
        assert_eq!(error.to_string(), "tile (2, 3) is occupied");

        let error = GameError::InvalidSelection {
            cell: CellCoord::new(4, 1),
            found: 0,
        };
        assert_eq!(error.to_string(), "selection at (4, 1) matched 0 entities");
    }

    #[test]
    fn funds_message_reports_both_amounts() {
        let error = GameError::InsufficientFunds {
            required: 75,
            available: 55,
        };
        assert_eq!(
            error.to_string(),
            "not enough funds: 75 required, 55 available"
        );
    }
}
