//! Cell input for interactive sessions.
//!
//! Cells are read line by line and end at a line holding only `%%`, or at
//! end of input.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// Line that terminates a cell.
pub const CELL_DELIMITER: &str = "%%";

/// Reads cells from a line-oriented source.
pub struct CellReader<R> {
    lines: Lines<R>,
    done: bool,
}

impl<R: AsyncBufRead + Unpin> CellReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            done: false,
        }
    }

    /// Next non-blank cell, or `None` at end of input.
    pub async fn next_cell(&mut self) -> std::io::Result<Option<String>> {
        while !self.done {
            let mut cell = String::new();

            loop {
                match self.lines.next_line().await? {
                    Some(line) if line.trim_end() == CELL_DELIMITER => break,
                    Some(line) => {
                        cell.push_str(&line);
                        cell.push('\n');
                    }
                    None => {
                        self.done = true;
                        break;
                    }
                }
            }

            if !cell.trim().is_empty() {
                return Ok(Some(cell));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cells_split_on_delimiter() {
        let input: &[u8] = b"x = 1\ny = 2\n%%\nprint(x / 0)\n%%\n";
        let mut reader = CellReader::new(input);

        assert_eq!(reader.next_cell().await.unwrap().as_deref(), Some("x = 1\ny = 2\n"));
        assert_eq!(reader.next_cell().await.unwrap().as_deref(), Some("print(x / 0)\n"));
        assert_eq!(reader.next_cell().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_last_cell_without_delimiter() {
        let input: &[u8] = b"a = [1]\n%%\n\n%%\na[3]";
        let mut reader = CellReader::new(input);

        assert_eq!(reader.next_cell().await.unwrap().as_deref(), Some("a = [1]\n"));
        assert_eq!(reader.next_cell().await.unwrap().as_deref(), Some("a[3]\n"));
        assert_eq!(reader.next_cell().await.unwrap(), None);
        assert_eq!(reader.next_cell().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_indentation_preserved() {
        let input: &[u8] = b"def f():\n    return 1/0\nf()\n%%  \n";
        let mut reader = CellReader::new(input);

        assert_eq!(
            reader.next_cell().await.unwrap().as_deref(),
            Some("def f():\n    return 1/0\nf()\n")
        );
    }
}
