//! Plain-text views of a board and its probability map.

use core::fmt::Write;

use crate::board::{BoardState, CellStatus};
use crate::probability::ProbabilityMap;

fn header(out: &mut String, n: usize, width: usize) {
    out.push_str("    ");
    for c in 0..n {
        let _ = write!(out, " {:>width$}", c, width = width);
    }
    out.push('\n');
}

/// Board as a grid: `.` unknown, `o` miss, `X` hit, `#` sunk.
pub fn render_board(board: &BoardState) -> String {
    let n = board.size();
    let width = n.saturating_sub(1).to_string().len();
    let mut out = String::new();
    header(&mut out, n, width);
    for r in 0..n {
        let _ = write!(out, "{:>3} ", r);
        for c in 0..n {
            let ch = match board.status((r, c)) {
                Some(CellStatus::Miss) => 'o',
                Some(CellStatus::Hit) => 'X',
                Some(CellStatus::Sunk(_)) => '#',
                _ => '.',
            };
            let _ = write!(out, " {:>width$}", ch, width = width);
        }
        out.push('\n');
    }
    out
}

/// Normalized probabilities with two decimals.
pub fn render_probability(map: &ProbabilityMap) -> String {
    let n = map.size();
    let mut out = String::from("Probability distribution:\n");
    header(&mut out, n, 4);
    for r in 0..n {
        let _ = write!(out, "{:>3} ", r);
        for c in 0..n {
            let _ = write!(out, " {:4.2}", map.probability((r, c)));
        }
        out.push('\n');
    }
    out
}
