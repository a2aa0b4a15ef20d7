use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Line-oriented question/answer over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Print `label` and read one line without its line ending. `None` at end of input.
    pub fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(
            line.trim_end_matches(|c| c == '\r' || c == '\n').to_string(),
        ))
    }

    /// Yes/no question; only `y` or `Y` counts as yes.
    pub fn confirm(&mut self, label: &str) -> io::Result<Option<bool>> {
        Ok(self
            .ask(label)?
            .map(|answer| answer.trim().eq_ignore_ascii_case("y")))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
