//! Built-in 15x15 puzzle set.

use super::PuzzleDef;

pub(super) const PUZZLES_15X15: &[PuzzleDef] = &[
    PuzzleDef {
        height: 15,
        width: 15,
        rows: &[
            &[5], &[13, 1], &[1, 11], &[14], &[7, 2], &[8], &[7], &[2, 6], &[2, 2], &[2, 4, 2],
            &[7, 5], &[15], &[14], &[14], &[11, 1],
        ],
        columns: &[
            &[5, 5], &[2, 11], &[2, 4, 5], &[2, 12], &[15], &[8, 6], &[7, 6], &[3, 3, 4],
            &[3, 1, 5], &[3, 6], &[3, 6], &[3, 5], &[4, 5], &[3, 3], &[2, 4],
        ],
        solution:
            "011111000000000111111111111101100011111111111111111111111110111111100000110111111110000000011111110000000110111111000000110110000000000110111100110000111111101111100111111111111111011111111111111011111111111111001111111111101",
    },
    PuzzleDef {
        height: 15,
        width: 15,
        rows: &[
            &[1, 1], &[4, 1], &[4, 4, 1], &[1, 1, 4], &[5], &[3, 3], &[1, 8], &[6, 1, 1],
            &[1, 2, 2, 3], &[1, 4, 3], &[7, 3], &[7, 2], &[1, 2, 1, 1], &[1, 1, 3, 1, 3],
            &[1, 7, 1],
        ],
        columns: &[
            &[1, 1], &[3, 1], &[2, 2], &[2, 6], &[3, 2, 2, 1], &[5, 2], &[1, 9], &[1, 3, 6],
            &[3, 7, 1], &[7, 2], &[2, 1, 1], &[11], &[3, 4, 1], &[1, 7, 2], &[1, 1],
        ],
        solution:
            "100000000000001011110001000000011110111100010010010001111000000000000111110000000011101110000010111111110000011111101010000101101101110000101111001110001111111001110001111111001100000100110001010010101110101110100011111110001",
    },
    PuzzleDef {
        height: 15,
        width: 15,
        rows: &[
            &[1, 1], &[6, 2], &[1, 1, 3, 1], &[1, 2, 1, 1, 1], &[1, 2, 1, 1], &[1, 1, 2, 1],
            &[2, 1, 1, 1], &[1, 1, 1, 2, 1], &[1, 1, 2, 2], &[3, 1, 1, 1], &[3, 3, 1, 1],
            &[1, 1, 1, 1, 1], &[3, 1, 1, 1], &[1, 1, 1, 1, 2, 1], &[2, 1, 1, 2],
        ],
        columns: &[
            &[2, 2], &[5, 1, 1, 1], &[1, 1, 1], &[1, 1, 1, 1, 4], &[1, 1, 1, 1, 1, 1],
            &[1, 1, 1, 4], &[6, 1, 1, 1], &[1, 1, 1], &[3, 1, 1, 1, 2], &[1, 1, 3], &[1, 1, 1, 1],
            &[1, 1], &[1, 4], &[8, 1], &[4, 2],
        ],
        solution:
            "000000100100000011111100000110010000101110010010110101000010010001101000010010010110000010001101001000010010010100011010100100011000011111000100000101000111001110101000101000100101000111010100100100101001011001110000101000011",
    },
    PuzzleDef {
        height: 15,
        width: 15,
        rows: &[
            &[1], &[7], &[4, 4], &[4, 2], &[2, 1, 2, 2], &[2, 7, 2], &[2, 4, 1, 2], &[2, 1, 4, 2],
            &[2, 1, 4, 2], &[2, 1, 4, 2], &[2, 1, 2, 2], &[2, 4], &[4, 4], &[7], &[1],
        ],
        columns: &[
            &[1], &[7], &[4, 4], &[2, 2], &[3, 1, 2], &[10, 2], &[2, 2, 2], &[2, 5, 2], &[2, 7, 2],
            &[2, 2, 7], &[2, 5, 3], &[2, 2], &[4, 4], &[7], &[1],
        ],
        solution:
            "000000010000000000011111110000000111101111000001111000001100011001001100110011011111110110011001111010110110001011110011011001011110110011001011110110011001001100110001100000111100000111101111000000011111110000000000010000000",
    },
    PuzzleDef {
        height: 15,
        width: 15,
        rows: &[
            &[7], &[3, 2], &[2, 1, 2], &[1, 1, 2, 2], &[2, 1, 3, 2], &[1, 1, 2, 1], &[1, 1, 3, 1],
            &[2, 3], &[1, 1, 2, 1], &[1, 1, 1], &[3, 3, 1], &[1, 3], &[1, 1, 1], &[3, 3, 3],
            &[2, 2],
        ],
        columns: &[
            &[2], &[3, 1], &[2, 3, 1], &[1, 4, 1, 1], &[2, 1, 1, 2], &[1, 2, 2, 1, 1],
            &[1, 1, 2, 1], &[1, 1, 1, 1, 1, 1], &[1, 2, 1, 1, 2, 1], &[1, 2, 1, 2, 1],
            &[2, 1, 1, 1, 2], &[2, 1, 1, 2, 1], &[2, 1, 2], &[2, 1], &[2],
        ],
        solution:
            "000011111110000001110000011000011001000001100010001001100110110100011100011100100000011001010100111000010000110000111000001001011000100001001000001000001110111001000000000101110000000001000100100001110111011100000011000110000",
    },
    PuzzleDef {
        height: 15,
        width: 15,
        rows: &[
            &[8, 6], &[8, 5], &[7, 5], &[7, 4], &[8, 3], &[4, 1, 3], &[3, 3], &[4, 2, 2],
            &[2, 3, 2], &[2, 3, 2], &[3, 2], &[3, 3], &[4, 3], &[5, 3], &[6, 5],
        ],
        columns: &[
            &[15], &[15], &[8, 5], &[6, 1, 3], &[5, 2], &[5, 3, 1], &[5, 3], &[2, 1, 2], &[1], &[1],
            &[3, 1], &[4, 1], &[7, 4], &[15], &[15],
        ],
        solution:
            "111111110111111111111110011111111111100011111111111100001111111111110000111111100001000111111000000000111111101100000011110001110000011110001110000011111000000000011111000000000111111100000000111111110000000111111111000011111",
    },
    PuzzleDef {
        height: 15,
        width: 15,
        rows: &[
            &[10], &[11], &[12], &[13], &[1, 1], &[1], &[1], &[1, 2], &[13], &[12], &[3, 2],
            &[2, 2, 2], &[3, 7], &[9], &[4],
        ],
        columns: &[
            &[1], &[5, 3], &[4, 7], &[4, 7], &[4, 3, 3], &[4, 2, 2], &[4, 2, 1], &[4, 2, 1],
            &[4, 2, 2], &[4, 2, 2], &[4, 2, 3], &[3, 3, 2], &[2, 3, 1], &[2, 5], &[3],
        ],
        solution:
            "011111111110000011111111111000011111111111100011111111111110010000000000010100000000000000010000000000000010000000001100011111111111110001111111111110001110000000011001100000011011001110001111111001111111110000001111000000000",
    },
    PuzzleDef {
        height: 15,
        width: 15,
        rows: &[
            &[15], &[15], &[15], &[3, 1, 3], &[2, 2], &[2, 2], &[2, 2], &[2, 2], &[3, 3], &[4, 4],
            &[5, 5], &[7, 7], &[15], &[15], &[15],
        ],
        columns: &[
            &[15], &[15], &[4, 7], &[3, 6], &[3, 5], &[3, 4], &[3, 4], &[4, 3], &[3, 4], &[3, 4],
            &[3, 5], &[3, 6], &[4, 7], &[15], &[15],
        ],
        solution:
            "111111111111111111111111111111111111111111111111000010000111110000000000011110000000000011110000000000011110000000000011111000000000111111100000001111111110000011111111111101111111111111111111111111111111111111111111111111111",
    },
    PuzzleDef {
        height: 15,
        width: 15,
        rows: &[
            &[13], &[3, 3], &[3, 3], &[3, 4], &[3, 3], &[3, 3], &[3, 3], &[13], &[13], &[14], &[14],
            &[15], &[15], &[15], &[8],
        ],
        columns: &[
            &[3], &[5], &[14], &[14], &[14], &[1, 7], &[1, 7], &[1, 8], &[1, 8], &[1, 8], &[1, 8],
            &[1, 1, 8], &[15], &[15], &[15],
        ],
        solution:
            "001111111111111001110000000111001110000000111001110000001111001110000000111001110000000111001110000000111001111111111111001111111111111011111111111111011111111111111111111111111111111111111111111111111111111111000000011111111",
    },
    PuzzleDef {
        height: 15,
        width: 15,
        rows: &[
            &[3, 3], &[1, 1, 2], &[7], &[3, 3], &[2, 1], &[2, 2], &[2, 2], &[1], &[2, 2], &[2, 2],
            &[2, 2], &[2, 1], &[2, 2], &[2, 1, 1, 1, 3], &[1, 1, 1, 1, 2],
        ],
        columns: &[
            &[1, 1, 1, 1], &[1, 2, 2, 1], &[1, 2, 2, 1], &[1, 2, 2, 1], &[1, 3], &[2, 1, 1],
            &[1, 1], &[1], &[2, 3], &[1, 1, 3], &[1, 1, 2, 1], &[1, 1, 2, 1], &[1, 3, 1],
            &[1, 4, 1], &[1, 1, 1, 1],
        ],
        solution:
            "011100000111000100000001000011000001111111000000111000000111001100000000010011000000000011110000000000110000000000000100110000000001100011000000011000001100000110000000110000100000000011001100000011010101000111100101001011000",
    },
];
