use std::io::{self, Write};

use finlearn_core::{ChatError, ChatRelay, Secrets, Transcript};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::ChatArgs;
use crate::error::CliError;

const PROMPT: &str = "you> ";

/// Line-oriented chat session. The transcript lives for this process only.
pub async fn run(args: &ChatArgs, secrets: &Secrets) -> Result<(), CliError> {
    let relay = ChatRelay::from_secrets(secrets)?.with_model(args.model.as_str());
    let mut transcript = Transcript::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();

    writeln!(
        stdout,
        "Chatting with {} - type 'exit' or press Ctrl-D to quit.",
        relay.model()
    )?;

    loop {
        write!(stdout, "{PROMPT}")?;
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(stdout)?;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }

        write!(stdout, "assistant> ")?;
        let mut sink = TokenSink::new(&mut stdout);
        let outcome = relay
            .send(&mut transcript, line, |token| sink.write(token))
            .await;
        sink.finish()?;
        writeln!(stdout)?;

        match outcome {
            Ok(_) => {}
            Err(ChatError::EmptyInput) => {}
            Err(error) => eprintln!("error: {error}"),
        }
    }

    Ok(())
}

fn is_exit(line: &str) -> bool {
    matches!(line.to_ascii_lowercase().as_str(), "exit" | "quit" | "/exit" | "/quit")
}

/// Streams tokens to a writer and keeps the first write error.
///
/// After a failed write the remaining tokens are dropped so a closed stdout
/// ends the session instead of streaming into nothing.
struct TokenSink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TokenSink<W> {
    fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn write(&mut self, token: &str) {
        if self.error.is_some() {
            return;
        }
        let written = self
            .out
            .write_all(token.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(error) = written {
            self.error = Some(error);
        }
    }

    fn finish(self) -> io::Result<()> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_words_are_case_insensitive() {
        assert!(is_exit("Exit"));
        assert!(is_exit("/quit"));
        assert!(!is_exit("exit strategy?"));
    }

    #[test]
    fn sink_passes_tokens_through() {
        let mut sink = TokenSink::new(Vec::new());
        sink.write("Inflation ");
        sink.write("is rising.");

        assert_eq!(sink.out, b"Inflation is rising.");
        assert!(sink.finish().is_ok());
    }

    struct ClosedPipe {
        writes: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_stops_after_first_write_error() {
        let mut sink = TokenSink::new(ClosedPipe { writes: 0 });
        sink.write("Inflation ");
        sink.write("is rising.");

        assert_eq!(sink.out.writes, 1);
        let error = sink.finish().expect_err("broken pipe surfaces");
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }
}
