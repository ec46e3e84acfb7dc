//! Line-based prompts on a terminal.

use std::io::{self, BufRead, Write};

use curvelib_library::Interaction;

/// [`Interaction`] reading answers line by line and writing prompts to `output`.
///
/// End of input cancels a prompt. Warnings are printed to `output`.
pub struct TerminalInteraction<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
}

impl TerminalInteraction<io::StdinLock<'static>, io::Stderr> {
    /// Prompts on stderr, answers from stdin.
    pub fn stdio(assume_yes: bool) -> Self {
        Self::new(io::stdin().lock(), io::stderr(), assume_yes)
    }
}

impl<R: BufRead, W: Write> TerminalInteraction<R, W> {
    /// Wrap arbitrary streams. With `assume_yes`, confirmations never block.
    pub fn new(input: R, output: W, assume_yes: bool) -> Self {
        Self {
            input,
            output,
            assume_yes,
        }
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!("failed to read answer: {e}");
                None
            }
        }
    }

    // Prompt output is best effort: a closed terminal just reads as cancel.
    fn say(&mut self, text: &str) {
        let _ = write!(self.output, "{text}");
        let _ = self.output.flush();
    }
}

impl<R: BufRead, W: Write> Interaction for TerminalInteraction<R, W> {
    fn prompt_text(&mut self, title: &str, message: &str, default: &str) -> Option<String> {
        if default.is_empty() {
            self.say(&format!("{title}: {message}: "));
        } else {
            self.say(&format!("{title}: {message} [{default}]: "));
        }
        let answer = self.read_line()?;
        if answer.trim().is_empty() && !default.is_empty() {
            return Some(default.to_string());
        }
        Some(answer)
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        self.say(&format!("{title}: {message} [y/N]: "));
        matches!(
            self.read_line().as_deref().map(str::trim),
            Some("y" | "Y" | "yes" | "Yes")
        )
    }

    fn warn(&mut self, message: &str) {
        self.say(&format!("warning: {message}\n"));
    }
}
