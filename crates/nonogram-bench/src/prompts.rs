//! System prompt for puzzle solving.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever the instruction text
//! changes, so runs recorded under an older prompt can be told apart in logs.

/// Prompt version. Bump on any instruction content change.
pub const PROMPT_VERSION: &str = "1.0.0";

const RULES: &str = "\
You are solving a nonogram (also known as picross or griddlers).

## Rules
- Each row/column has clues: numbers indicating consecutive groups of filled cells
- Groups are separated by at least one empty cell
- The clues appear in order from left-to-right (for rows) or top-to-bottom (for columns)

## Example
A row clue \"2 1\" on a 5-cell row means: 2 filled cells, then a gap, then 1 filled cell.
Possible solutions: \"11010\" or \"11001\" (but only one will satisfy all column constraints)

## Your Task
Solve the puzzle so ALL row AND column clues are satisfied simultaneously.
";

/// Rules plus the exact output-length contract for a `width` x `height` grid.
pub fn system_instruction(width: u32, height: u32) -> String {
    let cells = width as u64 * height as u64;
    format!(
        "{RULES}
## Output Format
- Output the grid as a single string of {cells} characters
- Use \"1\" for filled cells, \"0\" for empty cells
- Read left-to-right, top-to-bottom (row 1 first, then row 2, etc.)

Respond with only a JSON object:
{{ \"solution\": \"<your {cells}-character string>\" }}

Important: Do not include any other text in your response. Only respond with the JSON object."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_exact_cell_count() {
        let prompt = system_instruction(10, 5);
        assert!(prompt.contains("a single string of 50 characters"));
        assert!(prompt.contains("<your 50-character string>"));
        assert!(prompt.starts_with("You are solving a nonogram"));
    }

    #[test]
    fn json_braces_are_literal() {
        let prompt = system_instruction(5, 5);
        assert!(prompt.contains("{ \"solution\": \"<your 25-character string>\" }"));
    }
}
