//! Interactive yes/no prompts

use std::io::{BufRead, Write};

/// Asks the user to confirm a step of a bulk workflow
pub trait Confirmer {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Prompts on stderr and reads answers from stdin
#[derive(Debug, Default)]
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&mut self, question: &str) -> bool {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stderr();
        yes_no(question, &mut input, &mut output)
    }
}

/// Answers every question the same way (`--yes`, tests)
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirmer for AutoConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        tracing::debug!("auto-answering '{}' with {}", question, self.0);
        self.0
    }
}

fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "ye" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Ask until the answer is yes or no. End of input counts as no.
pub fn yes_no<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> bool {
    loop {
        let _ = write!(output, "{} (y/n): ", question);
        let _ = output.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }

        if let Some(answer) = parse_answer(&line) {
            return answer;
        }
    }
}
