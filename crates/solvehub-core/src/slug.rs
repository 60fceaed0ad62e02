//! Slug derivation for subjects.
//!
//! Slugs are lowercase, accent-free, and contain only `[a-z0-9-]` with no
//! doubled or leading/trailing hyphens. Derived once at subject creation
//! when no explicit slug is given.

/// Fold a single character to its unaccented ASCII lowercase equivalent.
///
/// Covers Latin-1 Supplement and the Latin Extended-A range, which is what
/// subject names in practice contain ("Cálculo II", "Álgebra", "Français").
/// Anything else non-alphanumeric becomes a separator.
fn fold_char(c: char) -> Option<char> {
    // Unicode lowercasing first, so 'Á' folds the same way as 'á'.
    let c = c.to_lowercase().next().unwrap_or(c);
    if c.is_ascii_alphanumeric() {
        return Some(c);
    }
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'š' | 'ś' => 's',
        'ž' | 'ź' | 'ż' => 'z',
        'ß' => 's',
        'æ' => 'a',
        'œ' => 'o',
        'đ' | 'ď' => 'd',
        'ł' => 'l',
        'ř' => 'r',
        'ť' => 't',
        _ => return None,
    };
    Some(folded)
}

/// Derive a slug from a display name.
///
/// `"Cálculo II"` becomes `"calculo-ii"`. Runs of non-foldable characters
/// collapse into a single hyphen; leading and trailing hyphens are dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.trim().chars() {
        match fold_char(c) {
            Some(folded) => {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(folded);
            }
            None => pending_hyphen = true,
        }
    }

    slug
}

/// Return `true` when `value` is already a valid slug.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_accented_subject() {
        assert_eq!(slugify("Cálculo II"), "calculo-ii");
        assert_eq!(slugify("Álgebra Linear"), "algebra-linear");
        assert_eq!(slugify("Français"), "francais");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Data   Structures & Algorithms"), "data-structures-algorithms");
        assert_eq!(slugify("C++ / Systems"), "c-systems");
    }

    #[test]
    fn test_slugify_trims_edge_hyphens() {
        assert_eq!(slugify("  Physics!  "), "physics");
        assert_eq!(slugify("--weird--"), "weird");
    }

    #[test]
    fn test_slugify_output_is_always_valid() {
        for name in [
            "Cálculo II",
            "Straße der Gemüse",
            "日本語", // nothing foldable: empty slug, caller rejects
            "a---b",
            "Ωmega",
        ] {
            let slug = slugify(name);
            assert!(
                slug.is_empty() || is_valid_slug(&slug),
                "invalid slug {:?} from {:?}",
                slug,
                name
            );
        }
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("calculo-ii"));
        assert!(is_valid_slug("algebra2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Calculo"));
        assert!(!is_valid_slug("-calculo"));
        assert!(!is_valid_slug("calculo-"));
        assert!(!is_valid_slug("calculo--ii"));
        assert!(!is_valid_slug("cálculo"));
    }
}
