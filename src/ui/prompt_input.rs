use crate::{error::Result, pipeline::AppState};
use colored::*;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

const QUIT_WORDS: [&str; 3] = ["quit", "exit", ":q"];

/// Line-oriented prompt reader; one line is one submission.
pub struct PromptInput<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> PromptInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }

    /// `None` on end of input or a quit word. Blank lines are returned as-is
    /// so that validation stays with the orchestrator.
    pub async fn read(&mut self) -> Result<Option<String>> {
        match self.lines.next_line().await? {
            Some(line) if QUIT_WORDS.contains(&line.trim().to_ascii_lowercase().as_str()) => {
                Ok(None)
            }
            Some(line) => Ok(Some(line)),
            None => Ok(None),
        }
    }
}

/// The input marker; disabled while a request is in flight.
pub fn render(state: &AppState) -> String {
    if state.loading {
        format!("{} ", "⏳ Generating...".bright_black())
    } else {
        format!(
            "{} {} ",
            "Describe your pixel art (or 'quit'):".bright_white().bold(),
            "›".bright_magenta()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_lines_until_quit() {
        let input = "a cat\n   \nQUIT\nnever read\n".as_bytes();
        let mut prompt = PromptInput::new(input);
        assert_eq!(prompt.read().await.unwrap().as_deref(), Some("a cat"));
        assert_eq!(prompt.read().await.unwrap().as_deref(), Some("   "));
        assert_eq!(prompt.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn end_of_input_stops() {
        let mut prompt = PromptInput::new("a dragon".as_bytes());
        assert_eq!(prompt.read().await.unwrap().as_deref(), Some("a dragon"));
        assert_eq!(prompt.read().await.unwrap(), None);
    }

    #[test]
    fn disabled_while_loading() {
        let mut state = AppState::new();
        assert!(render(&state).contains("Describe your pixel art"));
        state.loading = true;
        assert!(render(&state).contains("Generating..."));
    }
}
