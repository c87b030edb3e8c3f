//! Terminal views over `AppState`. Each view maps state to an optional block
//! of text; only the spinner and the image viewer touch the outside world.

pub mod banner;
pub mod error_display;
pub mod image_display;
pub mod prompt_input;
pub mod refined_prompt;
pub mod spinner;

pub use image_display::ImageDisplay;
pub use prompt_input::PromptInput;
pub use spinner::LoadingSpinner;

use crate::{error::Result, pipeline::AppState};

/// Everything shown once a sequence has settled, in page order.
pub fn render_result(state: &AppState, images: &ImageDisplay) -> Result<String> {
    let mut blocks = Vec::new();
    if let Some(error) = error_display::render(state) {
        blocks.push(error);
    }
    if let Some(refined) = refined_prompt::render(state) {
        blocks.push(refined);
    }
    blocks.push(images.render(state)?);
    Ok(blocks.join("\n\n"))
}
