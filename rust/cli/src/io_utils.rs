//! Line input for interactive commands.

use std::io::BufRead;

/// Reads a line of input from a buffered reader, blocking until available.
///
/// Trims surrounding whitespace and returns `None` on EOF or read errors.
///
/// ```rust
/// use std::io::Cursor;
/// # use derby_cli::io_utils::read_stdin_line;
///
/// let mut input = Cursor::new("  draw \n");
/// assert_eq!(read_stdin_line(&mut input).as_deref(), Some("draw"));
/// assert_eq!(read_stdin_line(&mut input), None);
/// ```
pub fn read_stdin_line(stdin: &mut dyn BufRead) -> Option<String> {
    let mut line = String::new();
    match stdin.read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn blank_line_is_not_eof() {
        let mut input = Cursor::new("\n\nq\n");
        assert_eq!(read_stdin_line(&mut input).as_deref(), Some(""));
        assert_eq!(read_stdin_line(&mut input).as_deref(), Some(""));
        assert_eq!(read_stdin_line(&mut input).as_deref(), Some("q"));
        assert_eq!(read_stdin_line(&mut input), None);
    }
}
