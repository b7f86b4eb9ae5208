/// Lowercase ASCII slug; runs of other characters collapse to a single `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "quiz".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn collapses_separators_and_trims() {
        assert_eq!(slugify("  Ulangan Harian: Bab 1 "), "ulangan-harian-bab-1");
        assert_eq!(slugify("A--B__C"), "a-b-c");
    }

    #[test]
    fn empty_title_falls_back() {
        assert_eq!(slugify(""), "quiz");
        assert_eq!(slugify("???"), "quiz");
    }
}
