//! Win and draw evaluation over a 3x3 board.
//!
//! `evaluate` is a pure function: no side effects, deterministic, and
//! independent of move history. Win detection takes precedence over draw
//! detection, so a full board containing three-in-a-row is a win.

use crate::{Board, Mark};

/// The eight winning index triples: three rows, three columns, two
/// diagonals of the row-major flattened grid.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Result of evaluating a board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No winning line and at least one empty cell remains.
    InProgress,
    /// `mark` holds all three cells of `line`.
    Win { mark: Mark, line: [usize; 3] },
    /// Board full without a winning line.
    Draw,
}

/// Evaluates a board position.
///
/// Lines are checked first-match-wins; two simultaneous winning lines
/// for different marks cannot arise from legal play, so the order among
/// the eight triples carries no semantics.
pub fn evaluate(board: &Board) -> Outcome {
    let cells = board.cells();
    for line in WIN_LINES {
        let [a, b, c] = line;
        if let Some(mark) = cells[a].mark() {
            if cells[b] == cells[a] && cells[c] == cells[a] {
                return Outcome::Win { mark, line };
            }
        }
    }

    if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
