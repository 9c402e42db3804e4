//! Accent and case folding
//!
//! Matching in Verba is done on a folded form of the text: lowercase, with
//! Portuguese diacritics removed. Stored names and descriptions keep their
//! original spelling; only lookups use the folded form.

/// Fold a single character: lowercase it and strip its diacritic
pub fn fold_char(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Fold a whole string
pub fn fold(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Key used to compare category names: folded, trimmed, single-spaced
pub fn category_key(name: &str) -> String {
    fold(name).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title-case the first letter of a user supplied category name
pub fn capitalize(name: &str) -> String {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_portuguese_diacritics() {
        assert_eq!(fold("Alimentação"), "alimentacao");
        assert_eq!(fold("BALANÇO"), "balanco");
        assert_eq!(fold("Saúde é Vida"), "saude e vida");
    }

    #[test]
    fn test_category_key_collapses_whitespace() {
        assert_eq!(category_key("  Plano   de Saúde "), "plano de saude");
        assert_eq!(category_key("Educação"), category_key("educacao"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("mercado"), "Mercado");
        assert_eq!(capitalize(" ônibus"), "Ônibus");
        assert_eq!(capitalize(""), "");
    }
}
