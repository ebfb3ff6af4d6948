use crate::traits::Prompter;
use std::io::{self, BufRead, Write};

/// Asks on stdout and reads one line from stdin. An empty line means yes;
/// a closed stdin means no.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [Y/n] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        read_answer(io::stdin().lock())
    }
}

/// EOF (e.g. `</dev/null` under cron) is a decline, not an empty answer.
pub fn read_answer<R: BufRead>(mut reader: R) -> bool {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => parse_answer(&line),
    }
}

/// `--yes`
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

pub fn parse_answer(line: &str) -> bool {
    matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "" | "y" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answer_is_yes() {
        assert!(parse_answer("\n"));
        assert!(parse_answer("   "));
        assert!(parse_answer("Y\n"));
        assert!(parse_answer("yes"));
        assert!(!parse_answer("n\n"));
        assert!(!parse_answer("No"));
        assert!(!parse_answer("maybe"));
    }

    #[test]
    fn closed_stdin_declines() {
        assert!(!read_answer(&b""[..]));
        assert!(read_answer(&b"\n"[..]));
        assert!(read_answer(&b"y\n"[..]));
        assert!(!read_answer(&b"n\n"[..]));
    }
}
