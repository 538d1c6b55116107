//! Terminal operator: confirmations on stdin, notices on stdout

use idlerealm_admin::{Confirmation, Notice, NoticeLevel, Operator};
use std::io::{self, BufRead, Write};
use tracing::warn;

pub struct Console {
    assume_yes: bool,
}

impl Console {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

/// Accepts French and English yes
fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "o" | "oui" | "y" | "yes")
}

impl Operator for Console {
    fn confirm(&mut self, request: &Confirmation) -> bool {
        print!("{request}");
        if self.assume_yes {
            println!("(--yes)");
            return true;
        }

        print!("Confirmer ? [o/N] ");
        if let Err(err) = io::stdout().flush() {
            warn!("stdout flush failed: {err}");
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(err) => {
                warn!("could not read confirmation: {err}");
                false
            }
        }
    }

    fn notify(&mut self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Error | NoticeLevel::Warning => eprintln!("{notice}"),
            NoticeLevel::Info | NoticeLevel::Success => println!("{notice}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("o\n"));
        assert!(is_yes(" Oui "));
        assert!(is_yes("y"));
        assert!(!is_yes(""));
        assert!(!is_yes("non"));
    }
}
