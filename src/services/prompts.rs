use crate::error::{GenieError, Result};

pub const REFINEMENT_INSTRUCTION: &str = "You are an expert prompt engineer for pixel art image generators. \
Rewrite the user's idea as a single, vivid prompt for a retro pixel art image. \
Describe the subject, its pose or action, the setting, and the composition. \
Ask for 8-bit or 16-bit pixel art, a limited color palette, crisp hard-edged pixels, \
no anti-aliasing and no blur. Keep it under 80 words. \
Reply with the prompt only: no preamble, no quotes, no explanations.";

pub const PIXEL_ART_STYLE_SUFFIX: &str =
    "pixel art, 16-bit retro game style, limited color palette, crisp pixels, no anti-aliasing";

/// Single-turn prompt for models without a system slot.
pub fn refinement_prompt(raw_prompt: &str) -> String {
    format!(
        "{}\n\nIdea: {}\n\nPixel art prompt:",
        REFINEMENT_INSTRUCTION,
        raw_prompt.trim()
    )
}

/// Appends the pixel-art style tail unless the prompt already mentions pixel art.
pub fn with_style_suffix(prompt: &str) -> String {
    let prompt = prompt.trim().trim_end_matches(['.', ',']);
    if prompt.to_ascii_lowercase().contains("pixel art") {
        prompt.to_string()
    } else {
        format!("{}, {}", prompt, PIXEL_ART_STYLE_SUFFIX)
    }
}

/// Trims model output and strips a "Prompt:" label or wrapping quotes.
pub fn clean_refined_prompt(raw: &str) -> Result<String> {
    let mut text = raw.trim();

    for label in ["Pixel art prompt:", "Refined prompt:", "Prompt:"] {
        if let Some(head) = text.get(..label.len()) {
            if head.eq_ignore_ascii_case(label) {
                text = text[label.len()..].trim_start();
                break;
            }
        }
    }

    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”'), ('`', '`')] {
        if text.len() > 1 && text.starts_with(open) && text.ends_with(close) {
            text = text[open.len_utf8()..text.len() - close.len_utf8()].trim();
            break;
        }
    }

    if text.is_empty() {
        return Err(GenieError::Response(
            "The text model returned an empty prompt".into(),
        ));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refinement_prompt_embeds_the_idea() {
        let prompt = refinement_prompt("  a cat  ");
        assert!(prompt.starts_with(REFINEMENT_INSTRUCTION));
        assert!(prompt.contains("Idea: a cat\n"));
    }

    #[test]
    fn style_suffix_added_once() {
        assert_eq!(
            with_style_suffix("a knight at dawn."),
            format!("a knight at dawn, {}", PIXEL_ART_STYLE_SUFFIX)
        );
        assert_eq!(
            with_style_suffix("8-bit pixel art of a cat"),
            "8-bit pixel art of a cat"
        );
    }

    #[test]
    fn cleans_labels_and_quotes() {
        assert_eq!(
            clean_refined_prompt("  \"8-bit pixel art of a cat, limited palette\"\n").unwrap(),
            "8-bit pixel art of a cat, limited palette"
        );
        assert_eq!(
            clean_refined_prompt("Prompt: a tiny dragon").unwrap(),
            "a tiny dragon"
        );
        assert_eq!(
            clean_refined_prompt("“a castle”").unwrap(),
            "a castle"
        );
    }

    #[test]
    fn empty_output_is_an_error() {
        assert!(matches!(
            clean_refined_prompt("  \"\"  "),
            Err(GenieError::Response(_))
        ));
        assert!(clean_refined_prompt("").is_err());
    }
}
