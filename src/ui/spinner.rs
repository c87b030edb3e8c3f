use crate::logger::{self, CLEAR_LINE};
use crate::pipeline::AppState;
use colored::*;
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::{
    wrappers::{IntervalStream, WatchStream},
    StreamExt,
};

pub const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
pub const PLACEHOLDER: &str = "Processing...";
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// One spinner line, or `None` when nothing is loading.
pub fn render(state: &AppState, frame: usize) -> Option<String> {
    if !state.loading {
        return None;
    }
    let label = if state.stage.is_empty() {
        PLACEHOLDER
    } else {
        state.stage.as_str()
    };
    Some(format!(
        "{} {}",
        FRAMES[frame % FRAMES.len()].bright_magenta(),
        label.bright_cyan()
    ))
}

enum Tick {
    State(AppState),
    Frame,
}

/// Animates the loading line on stderr until stopped. While it runs, the
/// logger wipes the line before each record so log output starts at column 0.
pub struct LoadingSpinner {
    handle: JoinHandle<()>,
}

impl LoadingSpinner {
    pub fn start(states: watch::Receiver<AppState>) -> Self {
        logger::set_live_line(true);
        let handle = tokio::spawn(async move {
            let states = WatchStream::new(states).map(Tick::State);
            let frames =
                IntervalStream::new(tokio::time::interval(FRAME_INTERVAL)).map(|_| Tick::Frame);
            let mut ticks = states.merge(frames);

            let mut current = AppState::default();
            let mut frame = 0usize;
            while let Some(tick) = ticks.next().await {
                match tick {
                    Tick::State(state) => current = state,
                    Tick::Frame => frame = frame.wrapping_add(1),
                }
                let mut stderr = std::io::stderr();
                match render(&current, frame) {
                    Some(line) => {
                        let _ = write!(stderr, "{}{}", CLEAR_LINE, line);
                    }
                    None => {
                        let _ = write!(stderr, "{}", CLEAR_LINE);
                    }
                }
                let _ = stderr.flush();
            }
        });
        Self { handle }
    }

    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;
        logger::set_live_line(false);
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{}", CLEAR_LINE);
        let _ = stderr.flush();
    }
}
