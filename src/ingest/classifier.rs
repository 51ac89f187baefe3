//! Derives tag names from the folders between the vault root and a file.

use std::path::{Component, Path};

use crate::ingest::scanner::is_excluded_dir;

/// Applied in order after title-casing.
const CORRECTIONS: &[(&str, &str)] = &[
    ("Nsfw", "NSFW"),
    ("Sfw", "SFW"),
    ("I2V", "i2v"),
    ("I2v", "i2v"),
];

/// Tag names for `file`, one per containing folder below `root`, root to leaf.
///
/// Returns an empty list when `file` is not under `root`.
pub fn classify(file: &Path, root: &Path) -> Vec<String> {
    let Ok(relative) = file.strip_prefix(root) else {
        return Vec::new();
    };
    let Some(folders) = relative.parent() else {
        return Vec::new();
    };

    folders
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .filter(|name| !is_excluded_dir(name))
        .filter_map(|name| clean_folder_name(&name))
        .collect()
}

/// `None` when the cleaned name is shorter than two characters.
pub fn clean_folder_name(folder: &str) -> Option<String> {
    let cleaned = folder.replace(['_', '-'], " ");
    let cleaned = cleaned.trim();
    if cleaned.chars().count() < 2 {
        return None;
    }
    Some(apply_corrections(title_case(cleaned)))
}

/// Uppercases the first letter of every run of letters and lowercases the rest.
/// Digits and punctuation end a run, so `i2v` becomes `I2V`.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn apply_corrections(mut name: String) -> String {
    for (from, to) in CORRECTIONS {
        if name.contains(from) {
            name = name.replace(from, to);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_nested_folders() {
        let tags = classify(
            Path::new("/vault/Ready for upscale/Home/img.jpg"),
            Path::new("/vault"),
        );
        assert_eq!(tags, vec!["Ready For Upscale", "Home"]);
    }

    #[test]
    fn test_classify_file_at_root() {
        assert!(classify(Path::new("/vault/img.jpg"), Path::new("/vault")).is_empty());
    }

    #[test]
    fn test_classify_outside_root() {
        assert!(classify(Path::new("/other/A/img.jpg"), Path::new("/vault")).is_empty());
    }

    #[test]
    fn test_classify_skips_excluded_and_short() {
        let tags = classify(
            Path::new("/vault/cache/x/.git/my_cool-set/thumbs/img.png"),
            Path::new("/vault"),
        );
        assert_eq!(tags, vec!["My Cool Set"]);
    }

    #[test]
    fn test_classify_keeps_duplicates_in_order() {
        let tags = classify(Path::new("/vault/home/Home/img.png"), Path::new("/vault"));
        assert_eq!(tags, vec!["Home", "Home"]);
    }

    #[test]
    fn test_corrections() {
        assert_eq!(clean_folder_name("nsfw").as_deref(), Some("NSFW"));
        assert_eq!(clean_folder_name("sfw_batch").as_deref(), Some("SFW Batch"));
        assert_eq!(clean_folder_name("ready-for-i2v").as_deref(), Some("Ready For i2v"));
        assert_eq!(clean_folder_name(" _a- "), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("hELLO wORLD"), "Hello World");
        assert_eq!(title_case("2nd pass"), "2Nd Pass");
        assert_eq!(title_case("i2v"), "I2V");
    }
}
