use colored::*;

pub const TITLE: &str = "Pixel Art Genie";
pub const TAGLINE: &str = "Let AI transform your ideas into stunning pixel art.";
pub const REPOSITORY_URL: &str = "https://github.com/google/project-idx";

pub fn header() -> String {
    format!(
        "{} {}\n{}",
        "✨",
        TITLE.bright_magenta().bold(),
        TAGLINE.bright_black()
    )
}

pub fn footer(refiner: &str, generator: &str) -> String {
    let powered_by = if refiner == generator {
        format!("Powered by {}.", refiner)
    } else {
        format!("Powered by {} & {}.", refiner, generator)
    };
    format!(
        "{}\n{} {}",
        powered_by.bright_black(),
        "🐙",
        REPOSITORY_URL.bright_black().underline()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_names_both_services() {
        let footer = footer("Gemini", "Imagen");
        assert!(footer.contains("Powered by Gemini & Imagen."));
        assert!(footer.contains(REPOSITORY_URL));
    }

    #[test]
    fn footer_collapses_single_service() {
        assert!(footer("Bedrock", "Bedrock").contains("Powered by Bedrock."));
    }

    #[test]
    fn header_has_title() {
        let header = header();
        assert!(header.contains(TITLE));
        assert!(header.contains(TAGLINE));
    }
}
