//! Built-in 10x10 puzzle set.

use super::PuzzleDef;

pub(super) const PUZZLES_10X10: &[PuzzleDef] = &[
    PuzzleDef {
        height: 10,
        width: 10,
        rows: &[
            &[1, 5], &[4, 1], &[2, 1, 2], &[2, 3], &[3, 2, 3], &[4, 1], &[1, 4], &[1, 1, 2, 1],
            &[1, 2, 2], &[1, 2, 3],
        ],
        columns: &[
            &[3, 1], &[4, 1, 1], &[2, 1, 1], &[1, 1], &[1, 5, 1], &[1, 5, 1], &[1, 1, 4],
            &[1, 4, 1], &[1, 1, 1, 2], &[3, 2, 3],
        ],
        solution:
            "0010011111011110000111000100111100111000111011011100001111010100111100100010110100100110110101100111",
    },
    PuzzleDef {
        height: 10,
        width: 10,
        rows: &[
            &[3, 2, 2], &[2, 5], &[1, 2, 2], &[3], &[2, 1], &[1, 1, 1], &[1, 1, 1], &[2, 1],
            &[1, 2, 2], &[4, 1, 2],
        ],
        columns: &[
            &[2, 1], &[2, 1], &[1, 2, 2, 2], &[1, 2, 1], &[4, 3], &[3, 1, 2], &[2, 1, 1],
            &[1, 1, 1], &[1, 1, 1, 2], &[1, 1, 1, 1],
        ],
        solution:
            "1110011011110111110000101100110011100000000110100000100100101010000100000011000100101101100111101011",
    },
    PuzzleDef {
        height: 10,
        width: 10,
        rows: &[
            &[1, 3, 1], &[1, 3], &[7], &[2, 1], &[1, 5, 2], &[1, 2, 1, 1], &[1, 1, 1, 1],
            &[2, 1, 1], &[2, 2, 2], &[1, 2, 2, 2],
        ],
        columns: &[
            &[1, 2, 1], &[1, 2], &[1, 8], &[4, 1], &[1, 1, 1, 3], &[3, 1, 2], &[5, 1, 1],
            &[2, 1, 2], &[1, 1, 1, 2], &[2, 1],
        ],
        solution:
            "0010111010100001110001111111000011001000101111101110110001010010101010011010010001101101101011011011",
    },
    PuzzleDef {
        height: 10,
        width: 10,
        rows: &[
            &[1, 1], &[4, 2, 1], &[6, 1], &[1, 5, 1], &[1, 2], &[1, 4, 1], &[4, 3, 1], &[7],
            &[3, 2], &[2, 2, 3],
        ],
        columns: &[
            &[1, 3, 2, 1], &[2, 5], &[2, 1, 3], &[9], &[3, 1, 1, 1], &[2, 3], &[1, 1, 3, 1],
            &[2, 1, 1, 2], &[2], &[3, 2],
        ],
        solution:
            "1000000100011110110111111100011001111101101100000001011110011111011101111111100001110001101101101110",
    },
    PuzzleDef {
        height: 10,
        width: 10,
        rows: &[
            &[4, 2], &[1, 3], &[3, 4], &[4, 2], &[1, 1], &[4, 2, 1], &[2, 3], &[4, 1],
            &[1, 1, 1, 1], &[5, 1],
        ],
        columns: &[
            &[1, 1, 2], &[1, 2, 2, 2], &[4, 1, 1], &[1, 7], &[1, 2, 1], &[3, 1], &[2, 1, 2],
            &[4, 1], &[3, 1], &[2, 1, 2],
        ],
        solution:
            "1111000110001000011111100011110111101100000100001011110110011101110000000111100101010010010111110100",
    },
    PuzzleDef {
        height: 10,
        width: 10,
        rows: &[&[3], &[6], &[3, 2], &[2, 3], &[1, 2, 2], &[9], &[7], &[1, 6], &[1, 3], &[10]],
        columns: &[
            &[1, 1, 1], &[1, 2], &[1, 1], &[3, 1], &[7, 1], &[7, 1], &[2, 5], &[2, 7], &[10],
            &[4, 2, 1],
        ],
        solution:
            "0000000111000011111100001110110000110111100011011001111111110001111111100111111001000011101111111111",
    },
    PuzzleDef {
        height: 10,
        width: 10,
        rows: &[
            &[1, 1, 1], &[1, 1, 1], &[1, 6], &[4, 1], &[7], &[6, 1], &[9], &[5, 1, 1], &[5, 3],
            &[1, 2],
        ],
        columns: &[
            &[6], &[9], &[6], &[1, 7], &[8], &[1, 3], &[3, 3], &[1, 1, 2], &[2, 2, 2], &[1, 1],
        ],
        solution:
            "0101000001010010001001011111100111101000111111100011111100101111111110111110100111111011101000000110",
    },
    PuzzleDef {
        height: 10,
        width: 10,
        rows: &[
            &[1, 3], &[2, 1, 3], &[1, 3, 2, 1], &[3, 3], &[5, 1], &[7], &[7], &[9], &[10], &[1, 6],
        ],
        columns: &[
            &[1, 2], &[2, 2], &[2, 2], &[7], &[8], &[1, 7], &[1, 1, 6], &[10], &[2, 1, 5], &[9],
        ],
        solution:
            "0100001110011001011110111011010001110111000111110100011111110001111111011111111111111111111000111111",
    },
    PuzzleDef {
        height: 10,
        width: 10,
        rows: &[
            &[2, 1], &[2, 1, 2], &[1, 1, 1], &[1, 4, 2], &[1, 1], &[2, 2], &[1, 3, 1], &[1, 1, 1],
            &[2, 1, 1, 2], &[5],
        ],
        columns: &[
            &[1], &[1, 1, 4], &[2, 2, 1], &[3, 1], &[1, 4], &[2, 1, 1, 1], &[2, 4], &[1],
            &[1, 3, 1], &[1, 1, 2, 1],
        ],
        solution:
            "0110010000001101001110010010000101111011001000001001100000110100111001010010100001101010110001111100",
    },
    PuzzleDef {
        height: 10,
        width: 10,
        rows: &[
            &[2, 1], &[6, 1], &[9], &[6, 3], &[6, 3], &[1, 7], &[2, 2, 1], &[7, 1], &[1, 1, 1],
            &[2, 2],
        ],
        columns: &[
            &[2], &[6], &[5, 2], &[6, 2], &[7, 1], &[7, 1], &[2, 1, 1], &[9], &[1, 4, 1], &[5, 2],
        ],
        solution:
            "0011000010001111110101111111111111110111111111011101011111110110110100011111110100010001010000110110",
    },
];
