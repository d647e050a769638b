#![no_std]

/// The 8 winning triples over a 3x3 grid stored row-major in 9 slots.
pub const WIN_LINES: [(usize, usize, usize); 8] = [
    (0, 1, 2),
    (3, 4, 5),
    (6, 7, 8),
    (0, 3, 6),
    (1, 4, 7),
    (2, 5, 8),
    (0, 4, 8),
    (2, 4, 6),
];

/// Returns the value occupying the first complete line, if any.
///
/// A line is complete when its three slots hold the same value and that
/// value is not `blank`. Lines are checked in `WIN_LINES` order.
///
/// # Arguments
/// * `slots` - The 9 grid slots, row-major
/// * `blank` - The value that never counts towards a line
pub fn line_winner<T: Copy + PartialEq>(slots: &[T; 9], blank: T) -> Option<T> {
    WIN_LINES.iter().find_map(|&(a, b, c)| {
        let v = slots[a];
        if v != blank && v == slots[b] && v == slots[c] {
            Some(v)
        } else {
            None
        }
    })
}

/// Checks whether `player` owns a complete line in `slots`.
pub fn has_line<T: Copy + PartialEq>(slots: &[T; 9], player: T) -> bool {
    WIN_LINES
        .iter()
        .any(|&(a, b, c)| slots[a] == player && slots[b] == player && slots[c] == player)
}
