use crate::{error::Result, models::EncodedImage, pipeline::AppState};
use chrono::{DateTime, Utc};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const LOADING_PLACEHOLDER: &str = "🎨 Conjuring your pixel art...";
pub const IDLE_PLACEHOLDER: &str = "🖼️  Your pixel art will appear here.";

/// Terminal stand-in for an image viewer: writes the image out and reports it.
pub struct ImageDisplay {
    output_dir: PathBuf,
}

impl ImageDisplay {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn file_name(image: &EncodedImage, at: DateTime<Utc>, id: &Uuid) -> String {
        let id = id.simple().to_string();
        format!(
            "pixel_art_{}_{}.{}",
            at.timestamp(),
            &id[..8],
            image.extension()
        )
    }

    pub fn save(&self, image: &EncodedImage) -> Result<PathBuf> {
        let bytes = image.decode()?;
        fs::create_dir_all(&self.output_dir)?;

        let path = self
            .output_dir
            .join(Self::file_name(image, Utc::now(), &Uuid::new_v4()));
        fs::write(&path, &bytes)?;

        log::info!("💾 Image saved to: {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    pub fn render(&self, state: &AppState) -> Result<String> {
        match &state.generated_image {
            Some(image) => {
                let path = self.save(image)?;
                Ok(format!(
                    "{} {}\n   {} {}",
                    "🖼️ ",
                    path.display().to_string().bright_green().bold(),
                    "alt:".bright_black(),
                    state.alt_text().bright_black()
                ))
            }
            None if state.loading => Ok(LOADING_PLACEHOLDER.bright_black().to_string()),
            None => Ok(IDLE_PLACEHOLDER.bright_black().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pixel-genie-test-{}", Uuid::new_v4()))
    }

    #[test]
    fn file_name_uses_timestamp_and_short_id() {
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            ImageDisplay::file_name(&EncodedImage::png("aGk="), at, &id),
            "pixel_art_1700000000_67e55044.png"
        );
    }

    #[test]
    fn saves_decoded_bytes() {
        let dir = scratch_dir();
        let display = ImageDisplay::new(&dir);
        let path = display.save(&EncodedImage::png("aGVsbG8=")).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn placeholders_without_image() {
        let display = ImageDisplay::new(scratch_dir());
        let mut state = AppState::new();
        assert!(display.render(&state).unwrap().contains(IDLE_PLACEHOLDER));
        state.loading = true;
        assert!(display.render(&state).unwrap().contains(LOADING_PLACEHOLDER));
    }

    #[test]
    fn renders_saved_path_and_alt_text() {
        let dir = scratch_dir();
        let display = ImageDisplay::new(&dir);
        let mut state = AppState::new();
        state.initial_prompt = "a cat".into();
        state.generated_image = Some(EncodedImage::png("aGVsbG8="));

        let rendered = display.render(&state).unwrap();
        assert!(rendered.contains(&dir.display().to_string()));
        assert!(rendered.contains("a cat"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
