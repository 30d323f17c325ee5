//! Built-in 5x5 puzzle set.

use super::PuzzleDef;

pub(super) const PUZZLES_5X5: &[PuzzleDef] = &[
    PuzzleDef {
        height: 5,
        width: 5,
        rows: &[&[2, 1], &[5], &[1, 2], &[2, 1], &[3]],
        columns: &[&[2], &[4], &[1, 2], &[3, 1], &[4]],
        solution: "1101011111010110110100111",
    },
    PuzzleDef {
        height: 5,
        width: 5,
        rows: &[&[1], &[2], &[4], &[2, 1], &[2]],
        columns: &[&[2], &[2], &[1], &[2, 1], &[2, 2]],
        solution: "0000100011111101100100011",
    },
    PuzzleDef {
        height: 5,
        width: 5,
        rows: &[&[5], &[1, 3], &[2, 1], &[2], &[1]],
        columns: &[&[3], &[1, 2], &[2, 2], &[3], &[2]],
        solution: "1111110111110100110000100",
    },
    PuzzleDef {
        height: 5,
        width: 5,
        rows: &[&[1, 1], &[1, 1], &[1, 3], &[1, 1], &[2]],
        columns: &[&[1], &[2, 2], &[1, 1], &[3], &[1, 1]],
        solution: "0100101010101110101001100",
    },
    PuzzleDef {
        height: 5,
        width: 5,
        rows: &[&[5], &[1], &[2, 1], &[1, 1, 1], &[1]],
        columns: &[&[2, 1], &[1, 1, 1], &[1, 2], &[1], &[1, 2]],
        solution: "1111110000011011010101000",
    },
    PuzzleDef {
        height: 5,
        width: 5,
        rows: &[&[2, 1], &[1, 3], &[2], &[1], &[3, 1]],
        columns: &[&[1, 1], &[1, 1], &[2, 2], &[2], &[3, 1]],
        solution: "0110110111000110010011101",
    },
    PuzzleDef {
        height: 5,
        width: 5,
        rows: &[&[2, 1], &[2, 1], &[1, 1], &[5], &[1]],
        columns: &[&[3], &[2, 1], &[1, 1], &[3], &[2, 1]],
        solution: "0110111001100101111100010",
    },
    PuzzleDef {
        height: 5,
        width: 5,
        rows: &[&[2], &[1, 1], &[1], &[1, 1], &[3]],
        columns: &[&[2, 1], &[1], &[2], &[2], &[1, 1]],
        solution: "0001110010100000010111100",
    },
    PuzzleDef {
        height: 5,
        width: 5,
        rows: &[&[1, 1], &[1], &[1], &[3], &[1]],
        columns: &[&[2], &[1, 1], &[1], &[1, 1], &[1]],
        solution: "0101000001100001110000010",
    },
    PuzzleDef {
        height: 5,
        width: 5,
        rows: &[&[3], &[5], &[1], &[1, 2], &[2, 1]],
        columns: &[&[1, 1], &[1, 2], &[3], &[2, 1], &[2, 2]],
        solution: "0011111111001000101111001",
    },
];
