//! Input dispatch: one thread per player turning key events into board
//! commands.
//!
//! The coordinator owns the terminal and forwards every key event to every
//! player's channel; each dispatcher keeps the keys of its own layout.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::KeyEvent;
use rand::Rng;
use tracing::{debug, trace};

use duotris_core::{rules, Board, MoveOutcome};
use duotris_input::KeyMap;

use crate::context::MatchContext;
use crate::signals::MatchSignals;
use crate::types::{PlayerCommand, PlayerId};

/// How long a dispatcher waits for a key before re-checking its signals.
pub const INPUT_POLL: Duration = Duration::from_millis(10);

/// Apply one board command. `Quit` is not a board command and is
/// reported as blocked.
pub fn apply_command<R: Rng + ?Sized>(
    board: &mut Board,
    command: PlayerCommand,
    rng: &mut R,
) -> MoveOutcome {
    match command {
        PlayerCommand::MoveLeft => rules::move_piece(board, -1, 0, rng),
        PlayerCommand::MoveRight => rules::move_piece(board, 1, 0, rng),
        PlayerCommand::SoftDrop => rules::move_piece(board, 0, 1, rng),
        PlayerCommand::Rotate => {
            if rules::rotate_piece(board) {
                MoveOutcome::Moved
            } else {
                MoveOutcome::Blocked
            }
        }
        PlayerCommand::HardDrop => rules::hard_drop(board, rng),
        PlayerCommand::Quit => MoveOutcome::Blocked,
    }
}

/// Read keys from `keys` and apply the ones `keymap` knows until the match
/// stops, the board tops out or the channel closes.
pub fn run_input(
    ctx: &MatchContext,
    player: PlayerId,
    keys: Receiver<KeyEvent>,
    keymap: KeyMap,
    signals: &MatchSignals,
) {
    let mut rng = rand::rng();

    loop {
        if signals.should_stop() {
            break;
        }

        let key = match keys.recv_timeout(INPUT_POLL) {
            Ok(key) => key,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        if signals.should_stop() {
            break;
        }

        let Some(command) = keymap.command_for(key) else {
            continue;
        };
        if command == PlayerCommand::Quit {
            debug!(%player, "quit requested");
            signals.request_return_to_menu();
            break;
        }

        let step = ctx.with_board(player, |board| {
            let outcome = apply_command(board, command, &mut rng);
            (outcome, board.game_over())
        });
        let Some((outcome, over)) = step else {
            break;
        };
        trace!(%player, ?command, ?outcome, "command applied");
        if over {
            debug!(%player, "board topped out");
            break;
        }
    }

    debug!(%player, "input stopped");
}
