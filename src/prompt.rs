use std::io::{self, BufRead, Write};

/// Line-oriented prompting over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Reads one line without its terminator. `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    pub fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()
    }

    /// Asks `msg`, showing `default` when present. Blank or missing input
    /// yields the default, or an empty string when there is none.
    pub fn ask(&mut self, msg: &str, default: &str) -> io::Result<String> {
        if default.is_empty() {
            self.write(&format!("{msg}: "))?;
        } else {
            self.write(&format!("{msg} [{default}]: "))?;
        }
        let answer = self.read_line()?.unwrap_or_default();
        let answer = answer.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }

    /// Fills `field` by asking only if it is still unset.
    pub fn fill(&mut self, field: &mut Option<String>, msg: &str, default: &str) -> io::Result<String> {
        match field.take().filter(|v| !v.trim().is_empty()) {
            Some(value) => Ok(value.trim().to_string()),
            None => self.ask(msg, default),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
