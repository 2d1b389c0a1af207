//! Gravity: one thread per player pulling its piece down a row at a time.

use std::time::Duration;

use tracing::debug;

use duotris_core::{rules, MoveOutcome};

use crate::context::MatchContext;
use crate::signals::MatchSignals;
use crate::types::{drop_interval_ms, PlayerId};

/// Drop the player's piece every `drop_interval_ms(level)` until the match
/// stops or the board tops out.
pub fn run_gravity(ctx: &MatchContext, player: PlayerId, signals: &MatchSignals) {
    let mut rng = rand::rng();

    loop {
        if signals.should_stop() {
            break;
        }
        let Some(level) = ctx
            .with_board(player, |board| board.playable().then(|| board.level()))
            .flatten()
        else {
            break;
        };

        if !signals.sleep(Duration::from_millis(drop_interval_ms(level))) {
            break;
        }

        let step = ctx.with_board(player, |board| {
            let outcome = rules::move_piece(board, 0, 1, &mut rng);
            (outcome, board.game_over())
        });
        match step {
            Some((MoveOutcome::Settled { rows_cleared }, over)) => {
                debug!(%player, rows_cleared, "piece settled by gravity");
                if over {
                    debug!(%player, "board topped out");
                    break;
                }
            }
            Some((_, false)) => {}
            Some((_, true)) | None => break,
        }
    }

    debug!(%player, "gravity stopped");
}
