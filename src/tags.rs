use crate::constants::TAG_DELIMITER;

/// Split a compound tag string ("Techno|Deep House") into trimmed, non-empty atomic tags.
pub fn split_tags(compound: &str) -> Vec<String> {
    compound
        .split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split every compound string of a multi-valued field, keeping first-seen order.
pub fn split_all<'a, I>(compounds: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut tags: Vec<String> = Vec::new();
    for compound in compounds {
        for tag in split_tags(compound) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_compound() {
        assert_eq!(split_tags("Techno|Deep House"), vec!["Techno", "Deep House"]);
        assert_eq!(split_tags(" Techno | | Deep House |"), vec!["Techno", "Deep House"]);
    }

    #[test]
    fn test_atomic_tag_is_unchanged() {
        assert_eq!(split_tags("Techno"), vec!["Techno"]);
        assert_eq!(split_tags("Hip-Hop/R&B"), vec!["Hip-Hop/R&B"]);
        for tag in split_tags("Techno|Deep House") {
            assert_eq!(split_tags(&tag), vec![tag.clone()]);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(split_tags("").is_empty());
        assert!(split_tags(" | ").is_empty());
    }

    #[test]
    fn test_split_all_dedupes_across_strings() {
        let raw = vec!["Techno|House".to_string(), "House|Afro House".to_string()];
        assert_eq!(split_all(&raw), vec!["Techno", "House", "Afro House"]);
    }
}
