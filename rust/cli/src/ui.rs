//! UI helper functions for terminal output formatting.
//!
//! Keeps error and warning lines consistent across commands.

use std::io::Write;

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "Error: {}", msg)
}

/// Display a warning message to stderr with "WARNING:" prefix
pub fn display_warning(err: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(err, "WARNING: {}", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_applied() {
        let mut err = Vec::new();
        write_error(&mut err, "deck empty").unwrap();
        display_warning(&mut err, "round over").unwrap();
        let text = String::from_utf8(err).unwrap();
        assert_eq!(text, "Error: deck empty\nWARNING: round over\n");
    }
}
