//! Puzzle corpus
//!
//! Immutable Nonogram definitions. The built-in set is compiled in as static
//! clue/solution tables and materialised into an owned [`PuzzleCorpus`] at
//! start-up, which is then passed by reference to whatever needs it.
//!
//! Every puzzle carries a canonical natural-language rendering of its clues.
//! That text is the prompt sent to a model and, together with the grid size,
//! the input to the puzzle's stable identifier.

mod data_10;
mod data_15;
mod data_5;
pub mod size;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use size::{ParseSizeError, SizeLabel};

/// Result type alias for corpus operations
pub type CorpusResult<T> = Result<T, CorpusError>;

/// Which clue axis an integrity problem refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => write!(f, "row"),
            Self::Column => write!(f, "column"),
        }
    }
}

/// Integrity problems found in a puzzle definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorpusError {
    #[error("puzzle {id}: dimensions must be positive, got {height}x{width}")]
    ZeroDimension { id: String, height: u32, width: u32 },

    #[error("puzzle {id}: solution has {actual} cells, expected {expected}")]
    SolutionLength {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("puzzle {id}: invalid cell '{found}' at index {index}")]
    InvalidCell { id: String, index: usize, found: char },

    #[error("puzzle {id}: {actual} {axis} clues, expected {expected}")]
    ClueCount {
        id: String,
        axis: Axis,
        expected: usize,
        actual: usize,
    },

    #[error("puzzle {id}: {axis} {index} clue {expected:?} does not match solution runs {actual:?}")]
    ClueMismatch {
        id: String,
        axis: Axis,
        index: usize,
        expected: Vec<u32>,
        actual: Vec<u32>,
    },

    #[error("duplicate puzzle id {id}")]
    DuplicateId { id: String },
}

/// Static puzzle definition as compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PuzzleDef {
    pub height: u32,
    pub width: u32,
    pub rows: &'static [&'static [u32]],
    pub columns: &'static [&'static [u32]],
    pub solution: &'static str,
}

/// Row and column clues plus the canonical prompt rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clues {
    pub rows: Vec<Vec<u32>>,
    pub columns: Vec<Vec<u32>>,
    pub canonical: String,
}

/// A single Nonogram puzzle with its known solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Stable identifier derived from the canonical clue text and size.
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub clues: Clues,
    /// Row-major grid of `'0'`/`'1'`, `width * height` characters.
    pub solution: String,
}

impl Puzzle {
    /// Build a puzzle from explicit clues. The canonical text and id are derived.
    pub fn new(
        height: u32,
        width: u32,
        rows: Vec<Vec<u32>>,
        columns: Vec<Vec<u32>>,
        solution: impl Into<String>,
    ) -> Self {
        let canonical = render_canonical(&rows, &columns);
        let id = puzzle_id(height, width, &canonical);
        Self {
            id,
            width,
            height,
            clues: Clues {
                rows,
                columns,
                canonical,
            },
            solution: solution.into(),
        }
    }

    /// Build a puzzle whose clues are read off the given solution grid.
    ///
    /// The solution must already be `height * width` cells of `0`/`1`.
    pub fn from_solution(height: u32, width: u32, solution: impl Into<String>) -> Self {
        let solution = solution.into();
        let cells: Vec<char> = solution.chars().filter(|c| !c.is_whitespace()).collect();
        let (h, w) = (height as usize, width as usize);
        let rows = (0..h)
            .map(|r| clue_runs(cells.iter().skip(r * w).take(w).copied()))
            .collect();
        let columns = (0..w)
            .map(|c| clue_runs((0..h).filter_map(|r| cells.get(r * w + c).copied())))
            .collect();
        Self::new(height, width, rows, columns, solution)
    }

    fn from_def(def: &PuzzleDef) -> Self {
        Self::new(
            def.height,
            def.width,
            def.rows.iter().map(|r| r.to_vec()).collect(),
            def.columns.iter().map(|c| c.to_vec()).collect(),
            def.solution,
        )
    }

    /// Size bucket of this puzzle.
    pub fn size(&self) -> SizeLabel {
        SizeLabel::new(self.height, self.width)
    }

    /// Number of cells the answer must contain.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check that the solution is well-formed and satisfies every clue.
    pub fn validate(&self) -> CorpusResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CorpusError::ZeroDimension {
                id: self.id.clone(),
                height: self.height,
                width: self.width,
            });
        }

        let cells: Vec<char> = self
            .solution
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if cells.len() != self.cell_count() {
            return Err(CorpusError::SolutionLength {
                id: self.id.clone(),
                expected: self.cell_count(),
                actual: cells.len(),
            });
        }
        if let Some((index, &found)) = cells
            .iter()
            .enumerate()
            .find(|(_, c)| **c != '0' && **c != '1')
        {
            return Err(CorpusError::InvalidCell {
                id: self.id.clone(),
                index,
                found,
            });
        }

        let (h, w) = (self.height as usize, self.width as usize);
        self.check_axis(Axis::Row, &self.clues.rows, h, |r| {
            clue_runs(cells[r * w..(r + 1) * w].iter().copied())
        })?;
        self.check_axis(Axis::Column, &self.clues.columns, w, |c| {
            clue_runs((0..h).map(|r| cells[r * w + c]))
        })?;
        Ok(())
    }

    fn check_axis(
        &self,
        axis: Axis,
        clues: &[Vec<u32>],
        expected: usize,
        runs_at: impl Fn(usize) -> Vec<u32>,
    ) -> CorpusResult<()> {
        if clues.len() != expected {
            return Err(CorpusError::ClueCount {
                id: self.id.clone(),
                axis,
                expected,
                actual: clues.len(),
            });
        }
        for (index, clue) in clues.iter().enumerate() {
            let actual = runs_at(index);
            if &actual != clue {
                return Err(CorpusError::ClueMismatch {
                    id: self.id.clone(),
                    axis,
                    index: index + 1,
                    expected: clue.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Lengths of the maximal runs of `'1'` in a line of cells.
pub fn clue_runs(cells: impl IntoIterator<Item = char>) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut current = 0u32;
    for cell in cells {
        if cell == '1' {
            current += 1;
        } else if current > 0 {
            runs.push(current);
            current = 0;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}

/// Render clues as the canonical prompt text.
pub fn render_canonical(rows: &[Vec<u32>], columns: &[Vec<u32>]) -> String {
    fn join(clue: &[u32]) -> String {
        clue.iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    let mut lines = vec!["Row clues:".to_string()];
    for (i, clue) in rows.iter().enumerate() {
        lines.push(format!("  Row {}: {}", i + 1, join(clue)));
    }
    lines.push(String::new());
    lines.push("Column clues:".to_string());
    for (i, clue) in columns.iter().enumerate() {
        lines.push(format!("  Column {}: {}", i + 1, join(clue)));
    }
    lines.join("\n")
}

/// Stable puzzle identifier: 16 hex chars of BLAKE3 over size and canonical text.
pub fn puzzle_id(height: u32, width: u32, canonical: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(format!("{height}x{width}\n").as_bytes());
    hasher.update(canonical.as_bytes());
    hasher.finalize().to_hex()[..16].to_string()
}

/// Immutable, ordered collection of puzzles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PuzzleCorpus {
    puzzles: Vec<Puzzle>,
}

impl PuzzleCorpus {
    pub fn new(puzzles: Vec<Puzzle>) -> Self {
        Self { puzzles }
    }

    /// The compiled-in 5x5, 10x10 and 15x15 sets.
    pub fn builtin() -> Self {
        let puzzles = data_5::PUZZLES_5X5
            .iter()
            .chain(data_10::PUZZLES_10X10)
            .chain(data_15::PUZZLES_15X15)
            .map(Puzzle::from_def)
            .collect();
        Self { puzzles }
    }

    pub fn puzzles(&self) -> &[Puzzle] {
        &self.puzzles
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Puzzle> {
        self.puzzles.iter().find(|p| p.id == id)
    }

    /// Keep only puzzles in the given size buckets.
    pub fn filter_sizes(&self, sizes: &[SizeLabel]) -> Self {
        Self {
            puzzles: self
                .puzzles
                .iter()
                .filter(|p| sizes.contains(&p.size()))
                .cloned()
                .collect(),
        }
    }

    /// Puzzles grouped by size bucket, buckets ascending, corpus order within.
    pub fn size_groups(&self) -> BTreeMap<SizeLabel, Vec<&Puzzle>> {
        let mut groups: BTreeMap<SizeLabel, Vec<&Puzzle>> = BTreeMap::new();
        for puzzle in &self.puzzles {
            groups.entry(puzzle.size()).or_default().push(puzzle);
        }
        groups
    }

    /// Distinct sizes in ascending order.
    pub fn sizes(&self) -> Vec<SizeLabel> {
        self.size_groups().into_keys().collect()
    }

    /// Every integrity problem in the corpus, in corpus order.
    pub fn audit(&self) -> Vec<CorpusError> {
        let mut seen = HashSet::new();
        let mut problems = Vec::new();
        for puzzle in &self.puzzles {
            if !seen.insert(puzzle.id.as_str()) {
                problems.push(CorpusError::DuplicateId {
                    id: puzzle.id.clone(),
                });
            }
            if let Err(e) = puzzle.validate() {
                problems.push(e);
            }
        }
        problems
    }

    /// Fail on the first integrity problem.
    pub fn validate(&self) -> CorpusResult<()> {
        match self.audit().into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_corpus_is_consistent() {
        let corpus = PuzzleCorpus::builtin();
        assert_eq!(corpus.len(), 30);
        assert!(corpus.audit().is_empty(), "{:?}", corpus.audit());
    }

    #[test]
    fn builtin_sizes_are_ascending() {
        let sizes: Vec<String> = PuzzleCorpus::builtin()
            .sizes()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(sizes, vec!["5x5", "10x10", "15x15"]);
    }

    #[test]
    fn canonical_rendering_layout() {
        let text = render_canonical(&[vec![3, 1], vec![2]], &[vec![1], vec![1, 1]]);
        assert_eq!(
            text,
            "Row clues:\n  Row 1: 3 1\n  Row 2: 2\n\nColumn clues:\n  Column 1: 1\n  Column 2: 1 1"
        );
    }

    #[test]
    fn id_is_deterministic_and_size_sensitive() {
        let a = puzzle_id(5, 5, "Row clues:");
        assert_eq!(a, puzzle_id(5, 5, "Row clues:"));
        assert_eq!(a.len(), 16);
        assert_ne!(a, puzzle_id(5, 10, "Row clues:"));
    }

    #[test]
    fn clue_runs_counts_maximal_runs() {
        assert_eq!(clue_runs("1110101011".chars()), vec![3, 1, 1, 2]);
        assert_eq!(clue_runs("00000".chars()), Vec::<u32>::new());
        assert_eq!(clue_runs("01110".chars()), vec![3]);
    }

    #[test]
    fn from_solution_derives_consistent_clues() {
        let puzzle = Puzzle::from_solution(2, 5, "1110101011");
        assert_eq!(puzzle.clues.rows, vec![vec![3, 1], vec![1, 2]]);
        assert_eq!(puzzle.clues.columns.len(), 5);
        assert!(puzzle.validate().is_ok());
    }

    #[test]
    fn validate_flags_clue_mismatch() {
        let puzzle = Puzzle::new(1, 3, vec![vec![2]], vec![vec![1], vec![1], vec![1]], "111");
        match puzzle.validate() {
            Err(CorpusError::ClueMismatch { axis, index, .. }) => {
                assert_eq!(axis, Axis::Row);
                assert_eq!(index, 1);
            }
            other => panic!("expected clue mismatch, got {other:?}"),
        }
    }

    #[test]
    fn validate_flags_bad_length_and_alphabet() {
        let short = Puzzle::new(1, 3, vec![vec![2]], vec![vec![1], vec![1], vec![]], "11");
        assert!(matches!(
            short.validate(),
            Err(CorpusError::SolutionLength { expected: 3, actual: 2, .. })
        ));

        let bad = Puzzle::new(1, 3, vec![vec![2]], vec![vec![1], vec![1], vec![]], "11x");
        assert!(matches!(
            bad.validate(),
            Err(CorpusError::InvalidCell { index: 2, found: 'x', .. })
        ));
    }

    #[test]
    fn audit_reports_duplicates() {
        let p = Puzzle::from_solution(1, 2, "10");
        let corpus = PuzzleCorpus::new(vec![p.clone(), p]);
        assert!(matches!(
            corpus.validate(),
            Err(CorpusError::DuplicateId { .. })
        ));
    }

    #[test]
    fn size_groups_keep_corpus_order() {
        let corpus = PuzzleCorpus::new(vec![
            Puzzle::from_solution(2, 2, "1001"),
            Puzzle::from_solution(1, 1, "1"),
            Puzzle::from_solution(2, 2, "0110"),
        ]);
        let groups = corpus.size_groups();
        let keys: Vec<String> = groups.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["1x1", "2x2"]);
        assert_eq!(groups[&SizeLabel::new(2, 2)][0].solution, "1001");
    }
}
