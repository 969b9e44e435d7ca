//! Grade-scoped free-text lesson search.
//!
//! The index is rebuilt from the catalog on every grade switch. Queries are
//! split on whitespace; an entry matches when every term appears as a
//! case-insensitive substring of its title, unit name, or keyword set.
//! Results keep catalog order and are capped.

use crate::catalog;
use crate::models::Grade;

/// Maximum results returned for a query.
const MAX_RESULTS: usize = 10;

/// Minimum keyword length; shorter words are noise ("of", "a", "to").
const MIN_KEYWORD_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct SearchEntry {
    pub id: String,
    pub title: &'static str,
    pub unit_name: &'static str,
    pub unit_index: usize,
    pub href: String,
    pub keywords: Vec<String>,
    /// Pre-lowered haystack: title + unit + keywords.
    haystack: String,
}

pub struct SearchIndex {
    grade: Grade,
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    /// Build the index for a grade by flattening its catalog.
    pub fn build(grade: Grade) -> Self {
        let entries = catalog::flatten(grade)
            .into_iter()
            .map(|lesson| {
                let keywords = extract_keywords(lesson.title);
                let haystack = format!(
                    "{} {} {}",
                    lesson.title.to_lowercase(),
                    lesson.unit_name.to_lowercase(),
                    keywords.join(" ")
                );
                SearchEntry {
                    id: lesson.id,
                    title: lesson.title,
                    unit_name: lesson.unit_name,
                    unit_index: lesson.unit_index,
                    href: lesson.href,
                    keywords,
                    haystack,
                }
            })
            .collect();

        Self { grade, entries }
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run a query. Empty and whitespace-only queries return nothing.
    pub fn search(&self, query: &str) -> Vec<&SearchEntry> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|entry| terms.iter().all(|term| entry.haystack.contains(term)))
            .take(MAX_RESULTS)
            .collect()
    }
}

/// Lowercase, de-duplicated keywords longer than two characters. Bullet and
/// dash separators inside titles count as whitespace.
fn extract_keywords(title: &str) -> Vec<String> {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '•' | '—' | '–' => ' ',
            other => other,
        })
        .collect();

    let mut keywords = Vec::new();
    for word in cleaned.split_whitespace() {
        if word.chars().count() >= MIN_KEYWORD_LEN && !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_lowercase_deduped_and_filtered() {
        let kw = extract_keywords("Prime Factorization Toolkit (Factors/Multiples • Prime/Composite • Factor Trees • HCF/LCM)");
        assert!(kw.contains(&"prime/composite".to_string()));
        assert!(kw.iter().all(|k| k.chars().count() > 2));
        assert!(kw.iter().all(|k| *k == k.to_lowercase()));
        // "•" separators were treated as whitespace, so no keyword carries one
        assert!(kw.iter().all(|k| !k.contains('•')));
        // Dedup preserves a single instance
        let dupes = extract_keywords("Rotations rotations ROTATIONS");
        assert_eq!(dupes, vec!["rotations".to_string()]);
    }

    #[test]
    fn test_results_capped_at_ten() {
        let index = SearchIndex::build(Grade::Seven);
        // Every grade 7 unit name starts with "Unit", so this matches all 41
        let results = index.search("unit");
        assert_eq!(results.len(), 10);
    }

    #[test]
    fn test_every_term_must_match() {
        let index = SearchIndex::build(Grade::Seven);
        let results = index.search("probability trees");
        assert!(!results.is_empty());
        for entry in &results {
            let haystack = format!(
                "{} {} {}",
                entry.title.to_lowercase(),
                entry.unit_name.to_lowercase(),
                entry.keywords.join(" ")
            );
            assert!(haystack.contains("probability"));
            assert!(haystack.contains("trees"));
        }
    }

    #[test]
    fn test_match_is_case_insensitive_substring() {
        let index = SearchIndex::build(Grade::Eight);
        let results = index.search("PYTHAG");
        assert!(results.iter().any(|e| e.title == "Converse of Pythagoras"));
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let index = SearchIndex::build(Grade::Seven);
        assert!(index.search("").is_empty());
        assert!(index.search("   ").is_empty());
    }

    #[test]
    fn test_index_is_grade_scoped() {
        let g7 = SearchIndex::build(Grade::Seven);
        let g8 = SearchIndex::build(Grade::Eight);

        assert!(g7.search("histograms").is_empty());
        assert!(!g8.search("histograms").is_empty());

        for entry in g8.search("angles") {
            assert!(entry.id.starts_with("grade8"));
        }
    }

    #[test]
    fn test_results_keep_catalog_order() {
        let index = SearchIndex::build(Grade::Seven);
        let results = index.search("equations");
        let positions: Vec<usize> = results
            .iter()
            .map(|e| index.entries.iter().position(|x| x.id == e.id).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }
}
