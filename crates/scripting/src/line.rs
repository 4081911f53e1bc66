//! Line reader
//!
//! Turns the text of one block into [`Line`] records: comments and blank
//! lines dropped, nesting depth derived from indentation, keyword split from
//! its parameters.

use crate::error::{Result, ScriptError};

/// Columns a tab character counts for
const TAB_WIDTH: usize = 4;

/// One logical script line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Nesting depth, 0 for the block's top-level statements
    pub depth: usize,
    /// Leading keyword
    pub keyword: String,
    /// Parameter text after the keyword, trimmed
    pub params: String,
    /// 1-based line number in the script source
    pub number: usize,
}

/// Read the lines of a block whose first text line is source line `first_line`
pub fn read_lines(text: &str, first_line: usize) -> Result<Vec<Line>> {
    let mut lines = Vec::new();
    // Indentation width of every currently open level, outermost first
    let mut levels: Vec<usize> = Vec::new();

    for (offset, raw) in text.lines().enumerate() {
        let number = first_line + offset;
        let content = strip_comment(raw, number)?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            continue;
        }

        let indent = indentation(content);
        let depth = match levels.last() {
            None => {
                levels.push(indent);
                0
            }
            Some(&current) if indent > current => {
                levels.push(indent);
                levels.len() - 1
            }
            Some(_) => {
                while levels.last().is_some_and(|&open| open > indent) {
                    levels.pop();
                }
                match levels.last() {
                    Some(&open) if open == indent => levels.len() - 1,
                    _ => {
                        return Err(ScriptError::malformed(
                            number,
                            "indentation does not match any enclosing block",
                        ))
                    }
                }
            }
        };

        let (keyword, params) = match trimmed.split_once(char::is_whitespace) {
            Some((keyword, params)) => (keyword, params.trim()),
            None => (trimmed, ""),
        };

        lines.push(Line {
            depth,
            keyword: keyword.to_string(),
            params: params.to_string(),
            number,
        });
    }

    tracing::trace!("Read {} lines starting at line {}", lines.len(), first_line);
    Ok(lines)
}

/// Width of the leading whitespace
fn indentation(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Cut a `//` comment that is outside quotes, checking quote balance on the way
fn strip_comment(line: &str, number: usize) -> Result<&str> {
    let mut in_string = false;
    let mut escaped = false;
    let mut prev_slash = false;

    for (i, ch) in line.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '/' if prev_slash => return Ok(&line[..i - 1]),
            _ => {}
        }
        prev_slash = ch == '/';
    }

    if in_string {
        return Err(ScriptError::malformed(number, "unbalanced quotes"));
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_from_indentation() {
        let text = "\
    if x > 1
        set y = 2
        while y < 4
            add y 1
    log y
";
        let lines = read_lines(text, 10).unwrap();
        let depths: Vec<usize> = lines.iter().map(|l| l.depth).collect();
        assert_eq!(depths, vec![0, 1, 1, 2, 0]);
        assert_eq!(lines[0].number, 10);
        assert_eq!(lines[4].number, 14);
        assert_eq!(lines[1].keyword, "set");
        assert_eq!(lines[1].params, "y = 2");
    }

    #[test]
    fn test_blank_and_comment_lines_dropped() {
        let text = "log 1\n\n   // a comment\nlog 2 // trailing\nlog \"a // b\"\n";
        let lines = read_lines(text, 1).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].params, "2");
        assert_eq!(lines[1].number, 4);
        assert_eq!(lines[2].params, "\"a // b\"");
    }

    #[test]
    fn test_tabs_count_as_four_columns() {
        let text = "if x\n\tlog x\n    log y\n";
        let lines = read_lines(text, 1).unwrap();
        assert_eq!(lines[1].depth, 1);
        assert_eq!(lines[2].depth, 1);
    }

    #[test]
    fn test_unopened_dedent_is_malformed() {
        let text = "if x\n        log x\n    log y\n";
        let err = read_lines(text, 1).unwrap_err();
        assert!(matches!(err, ScriptError::MalformedLine { line: 3, .. }));
    }

    #[test]
    fn test_dedent_below_base_is_malformed() {
        let text = "    log x\n  log y\n";
        let err = read_lines(text, 5).unwrap_err();
        assert!(matches!(err, ScriptError::MalformedLine { line: 6, .. }));
    }

    #[test]
    fn test_unbalanced_quotes() {
        let err = read_lines("name \"Old Man\n", 3).unwrap_err();
        assert!(matches!(err, ScriptError::MalformedLine { line: 3, .. }));

        let lines = read_lines(r#"name "say \"hi\"""#, 1).unwrap();
        assert_eq!(lines[0].params, r#""say \"hi\"""#);
    }

    #[test]
    fn test_keyword_without_params() {
        let lines = read_lines("else\n", 1).unwrap();
        assert_eq!(lines[0].keyword, "else");
        assert_eq!(lines[0].params, "");
    }
}
