use std::collections::BTreeSet;

/// Trims, drops blanks and deduplicates tag input. Output is sorted so the
/// stored set has a stable order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_and_deduplicates() {
        let tags = normalize_tags(["  tanker ", "tanker", "", "dp2", "   "]);
        assert_eq!(tags, vec!["dp2".to_string(), "tanker".to_string()]);
    }

    #[test]
    fn union_of_normalized_sets_has_no_duplicates() {
        let existing = vec!["b".to_string(), "c".to_string()];
        let merged = normalize_tags(existing.iter().chain(normalize_tags(["a", "b"]).iter()));
        assert_eq!(merged, vec!["a", "b", "c"]);
    }
}
