//! Rules properties: rejected operations change nothing, rotation is all or
//! nothing, multi-row clears compact correctly, and concurrent gravity and
//! input never put a piece out of bounds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use duotris::core::{rules, Board, Grid, MoveOutcome, Piece};
use duotris::engine::dispatcher::apply_command;
use duotris::engine::MatchContext;
use duotris::types::{PieceKind, PlayerCommand, PlayerId, BOARD_HEIGHT, BOARD_WIDTH};

fn board_with(kind: PieceKind) -> Board {
    let mut board = Board::new();
    assert!(rules::spawn_kind(&mut board, kind));
    board
}

#[test]
fn test_rejected_moves_leave_board_unchanged() {
    let mut rng = StdRng::seed_from_u64(11);

    for kind in PieceKind::ALL {
        let mut board = board_with(kind);
        // Pin against the left wall.
        while rules::move_piece(&mut board, -1, 0, &mut rng) == MoveOutcome::Moved {}
        let before = board.clone();
        assert_eq!(rules::move_piece(&mut board, -1, 0, &mut rng), MoveOutcome::Blocked);
        assert_eq!(board, before, "{kind:?}");

        while rules::move_piece(&mut board, 1, 0, &mut rng) == MoveOutcome::Moved {}
        let before = board.clone();
        assert_eq!(rules::move_piece(&mut board, 1, 0, &mut rng), MoveOutcome::Blocked);
        assert_eq!(board, before, "{kind:?}");
    }
}

#[test]
fn test_moves_on_finished_board_are_rejected() {
    let mut rng = StdRng::seed_from_u64(12);
    let mut grid = Grid::new();
    grid.fill_row(0, 1);
    grid.set(0, 0, None);
    let mut board = Board::with_grid(grid);
    assert!(!rules::spawn_kind(&mut board, PieceKind::O));
    assert!(board.game_over());

    let before = board.clone();
    assert_eq!(rules::move_piece(&mut board, 0, 1, &mut rng), MoveOutcome::Blocked);
    assert!(!rules::rotate_piece(&mut board));
    assert_eq!(rules::hard_drop(&mut board, &mut rng), MoveOutcome::Blocked);
    assert!(!rules::spawn_piece(&mut board, &mut rng));
    assert_eq!(board, before);
}

#[test]
fn test_rotation_commits_only_when_all_cells_fit() {
    // I at (4, 0) rotates into the column x = 4, rows 0..=3.
    let mut board = board_with(PieceKind::I);
    assert!(rules::rotate_piece(&mut board));
    let cells: Vec<_> = board.piece().unwrap().absolute_cells(0, 0).collect();
    assert_eq!(cells, vec![(4, 0), (4, 1), (4, 2), (4, 3)]);

    // One blocked target cell rejects the whole rotation.
    let mut board = board_with(PieceKind::I);
    board.grid_mut().set(4, 2, Some(7));
    let before = board.clone();
    assert!(!rules::rotate_piece(&mut board));
    assert_eq!(board, before);

    // Rotating off the left wall is rejected as well (no wall kicks).
    let mut board = Board::new();
    board.set_piece(Some(Piece {
        x: 0,
        y: 5,
        ..Piece::spawn(PieceKind::T)
    }));
    let before = board.clone();
    assert!(!rules::rotate_piece(&mut board));
    assert_eq!(board, before);
}

#[test]
fn test_four_rotations_return_to_start() {
    for kind in PieceKind::ALL {
        let mut board = Board::new();
        board.set_piece(Some(Piece {
            x: 4,
            y: 8,
            ..Piece::spawn(kind)
        }));
        let start = *board.piece().unwrap();
        for _ in 0..4 {
            assert!(rules::rotate_piece(&mut board), "{kind:?}");
        }
        assert_eq!(*board.piece().unwrap(), start);
    }
}

#[test]
fn test_clearing_rows_three_and_seven() {
    let mut grid = Grid::new();
    grid.fill_row(3, 1);
    grid.fill_row(7, 2);
    grid.set(0, 2, Some(3)); // above both
    grid.set(1, 5, Some(4)); // between
    grid.set(2, 10, Some(5)); // below both
    let mut board = Board::with_grid(grid);

    assert_eq!(rules::clear_full_rows(&mut board), 2);
    assert_eq!(board.score(), 200);
    assert_eq!(board.lines_cleared(), 2);
    assert_eq!(board.level(), 1);

    let grid = board.grid();
    assert_eq!(grid.get(0, 4), Some(Some(3)));
    assert_eq!(grid.get(1, 6), Some(Some(4)));
    assert_eq!(grid.get(2, 10), Some(Some(5)));
    assert_eq!(grid.filled_positions().count(), 3);
    for y in 0..BOARD_HEIGHT as usize {
        assert!(!grid.is_row_full(y));
    }
    assert!(grid.rows().take(2).all(|row| row.iter().all(|c| c.is_none())));
}

#[test]
fn test_adjacent_full_rows_clear_in_one_call() {
    let mut grid = Grid::new();
    for y in 16..20 {
        grid.fill_row(y, 1);
    }
    grid.set(5, 15, Some(2));
    let mut board = Board::with_grid(grid);

    assert_eq!(rules::clear_full_rows(&mut board), 4);
    assert_eq!(board.score(), 400);
    assert_eq!(board.grid().get(5, 19), Some(Some(2)));
    assert_eq!(board.grid().filled_positions().count(), 1);
}

#[test]
fn test_level_follows_lines() {
    let mut board = Board::new();
    for _ in 0..12 {
        board.grid_mut().fill_row(19, 1);
        rules::clear_full_rows(&mut board);
    }
    assert_eq!(board.lines_cleared(), 12);
    assert_eq!(board.level(), 2);
    assert_eq!(board.score(), 1200);
}

#[test]
fn test_soft_drop_into_floor_settles_and_spawns() {
    let mut rng = StdRng::seed_from_u64(13);
    let mut board = board_with(PieceKind::O);
    let mut settled = false;
    for _ in 0..BOARD_HEIGHT {
        if let MoveOutcome::Settled { rows_cleared } = rules::move_piece(&mut board, 0, 1, &mut rng) {
            assert_eq!(rows_cleared, 0);
            settled = true;
            break;
        }
    }
    assert!(settled);
    assert_eq!(board.grid().filled_positions().count(), 4);
    assert!(board.playable());
}

fn assert_consistent(board: &Board) {
    for (x, y) in board.grid().filled_positions() {
        assert!((0..BOARD_WIDTH).contains(&x) && (0..BOARD_HEIGHT).contains(&y));
    }
    match board.piece() {
        Some(piece) => {
            assert!(!board.game_over());
            assert!(!rules::collides(board, piece, 0, 0), "piece overlaps: {piece:?}");
        }
        None => assert!(board.game_over()),
    }
}

#[test]
fn test_concurrent_gravity_and_input_keep_board_consistent() {
    let ctx = MatchContext::new(1);
    ctx.start_match(&mut StdRng::seed_from_u64(21));
    let stop = AtomicBool::new(false);
    let player = PlayerId(0);

    let restart = |board: &mut Board, rng: &mut StdRng| {
        if board.game_over() {
            board.reset();
            rules::spawn_piece(board, rng);
        }
    };

    thread::scope(|s| {
        s.spawn(|| {
            let mut rng = StdRng::seed_from_u64(22);
            while !stop.load(Ordering::Relaxed) {
                ctx.with_board(player, |board| {
                    rules::move_piece(board, 0, 1, &mut rng);
                    assert_consistent(board);
                    restart(board, &mut rng);
                });
            }
        });

        let inputs: Vec<_> = (0..2u64)
            .map(|seed| {
                let ctx = &ctx;
                let restart = &restart;
                s.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(100 + seed);
                    let commands = [
                        PlayerCommand::MoveLeft,
                        PlayerCommand::MoveRight,
                        PlayerCommand::SoftDrop,
                        PlayerCommand::Rotate,
                        PlayerCommand::HardDrop,
                    ];
                    for _ in 0..5_000 {
                        let command = commands[rng.random_range(0..commands.len())];
                        ctx.with_board(player, |board| {
                            apply_command(board, command, &mut rng);
                            assert_consistent(board);
                            restart(board, &mut rng);
                        });
                    }
                })
            })
            .collect();

        let joined: Vec<_> = inputs.into_iter().map(|h| h.join()).collect();
        stop.store(true, Ordering::Relaxed);
        assert!(joined.iter().all(Result::is_ok));
    });
}
