//! The `:` command line.
//!
//! [CmdLine] is the line being edited; [parse] turns a finished line (typed by the user
//! or received over IPC) into a [LineCommand].

#[derive(Debug, Default, Clone)]
pub struct CmdLine {
    input: String,
}

impl CmdLine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn push(&mut self, c: char) {
        self.input.push(c);
    }

    /// Deletes the last character. Returns `false` if the line was already empty.
    pub fn backspace(&mut self) -> bool {
        self.input.pop().is_some()
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.input)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    Empty,
    Quit,
    Cd(String),
    Shell(String),
    Echo(String),
    Jobs,
}

pub fn parse(line: &str) -> Result<LineCommand, String> {
    let line = line.trim_start_matches(':').trim();
    if line.is_empty() {
        return Ok(LineCommand::Empty);
    }

    if let Some(cmd) = line.strip_prefix('!') {
        let cmd = cmd.trim();
        if cmd.is_empty() {
            return Err("No shell command given".to_string());
        }
        return Ok(LineCommand::Shell(cmd.to_string()));
    }

    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    match name {
        "q" | "quit" => Ok(LineCommand::Quit),
        "cd" => Ok(LineCommand::Cd(if arg.is_empty() { "~" } else { arg }.to_string())),
        "echo" => Ok(LineCommand::Echo(arg.replace("\\n", "\n"))),
        "jobs" => Ok(LineCommand::Jobs),
        _ => Err(format!("Unknown command: {name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse(""), Ok(LineCommand::Empty));
        assert_eq!(parse("q"), Ok(LineCommand::Quit));
        assert_eq!(parse(":quit"), Ok(LineCommand::Quit));
        assert_eq!(parse("cd  /tmp "), Ok(LineCommand::Cd("/tmp".into())));
        assert_eq!(parse("cd"), Ok(LineCommand::Cd("~".into())));
        assert_eq!(parse("!make -j4"), Ok(LineCommand::Shell("make -j4".into())));
        assert_eq!(parse("jobs"), Ok(LineCommand::Jobs));
    }

    #[test]
    fn echo_expands_newlines() {
        assert_eq!(
            parse(r"echo one\ntwo"),
            Ok(LineCommand::Echo("one\ntwo".into()))
        );
    }

    #[test]
    fn rejects_unknown_and_empty_shell() {
        assert_eq!(parse("frobnicate x"), Err("Unknown command: frobnicate".into()));
        assert!(parse("!  ").is_err());
    }

    #[test]
    fn editing() {
        let mut line = CmdLine::new();
        line.push('c');
        line.push('d');
        assert!(line.backspace());
        assert_eq!(line.input(), "c");
        assert_eq!(line.take(), "c");
        assert!(!line.backspace());
    }
}
