use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;

use super::artifacts::ArtifactError;
use super::vectorizer::{SparseVector, TfidfVectorizer};
use crate::models::{CatalogRow, Recommendation};

/// Precomputed pairwise similarity between catalog rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    scores: Vec<Vec<f32>>,
}

impl SimilarityMatrix {
    pub fn new(scores: Vec<Vec<f32>>) -> Self {
        Self { scores }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<&[f32]> {
        self.scores.get(idx).map(Vec::as_slice)
    }

    /// The matrix must be square and cover exactly `rows` catalog rows
    pub fn validate(&self, rows: usize) -> Result<(), ArtifactError> {
        if self.scores.len() != rows {
            return Err(ArtifactError::Incompatible(format!(
                "similarity matrix has {} rows but catalog has {}",
                self.scores.len(),
                rows
            )));
        }
        if let Some((i, row)) = self
            .scores
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != rows)
        {
            return Err(ArtifactError::Incompatible(format!(
                "similarity matrix row {} has {} columns, expected {}",
                i,
                row.len(),
                rows
            )));
        }
        Ok(())
    }
}

/// Which lookup produced a set of recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPath {
    /// Title found in the catalog; scores read from the similarity matrix
    Exact(usize),
    /// Title unknown; scores computed from country and genres
    Fallback,
}

impl Display for MatchPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchPath::Exact(_) => write!(f, "exact"),
            MatchPath::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub path: MatchPath,
    pub items: Vec<Recommendation>,
}

/// Resolves similar titles from the catalog artifacts
///
/// Known titles use the precomputed similarity matrix. Unknown titles are
/// vectorized from their country and genres and compared against every
/// catalog row's content vector.
pub struct Recommender {
    catalog: Vec<CatalogRow>,
    /// Normalised title → first catalog row with that title
    title_index: HashMap<String, usize>,
    similarity: SimilarityMatrix,
    vectorizer: TfidfVectorizer,
    content_vectors: Vec<SparseVector>,
}

impl Recommender {
    /// Builds the resolver, checking the artifacts agree on catalog size
    pub fn new(
        catalog: Vec<CatalogRow>,
        similarity: SimilarityMatrix,
        vectorizer: TfidfVectorizer,
    ) -> Result<Self, ArtifactError> {
        similarity.validate(catalog.len())?;
        vectorizer.validate()?;

        let mut title_index = HashMap::with_capacity(catalog.len());
        for (idx, row) in catalog.iter().enumerate() {
            title_index.entry(title_key(&row.title)).or_insert(idx);
        }

        let content_vectors = catalog
            .iter()
            .map(|row| vectorizer.transform(&row.content_text()))
            .collect();

        Ok(Self {
            catalog,
            title_index,
            similarity,
            vectorizer,
            content_vectors,
        })
    }

    pub fn catalog_size(&self) -> usize {
        self.catalog.len()
    }

    /// Case-insensitive exact title lookup
    pub fn find(&self, title: &str) -> Option<usize> {
        self.title_index.get(&title_key(title)).copied()
    }

    /// Top `k` titles similar to `title`, or to `country`/`listed_in` when the
    /// title is not in the catalog
    pub fn recommend(
        &self,
        title: &str,
        country: &str,
        listed_in: &str,
        k: usize,
    ) -> Recommendations {
        match self.find(title) {
            Some(idx) => Recommendations {
                path: MatchPath::Exact(idx),
                items: self.similar_to_row(idx, k),
            },
            None => Recommendations {
                path: MatchPath::Fallback,
                items: self.similar_to_fields(country, listed_in, k),
            },
        }
    }

    /// Rows most similar to catalog row `idx`, never including the row itself
    pub fn similar_to_row(&self, idx: usize, k: usize) -> Vec<Recommendation> {
        let Some(row) = self.similarity.row(idx) else {
            return Vec::new();
        };
        let scored = row
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != idx)
            .map(|(j, score)| (j, *score as f64));
        self.project(top_k(scored, k))
    }

    /// Rows whose content is most similar to `country` and `listed_in`
    pub fn similar_to_fields(
        &self,
        country: &str,
        listed_in: &str,
        k: usize,
    ) -> Vec<Recommendation> {
        let query = self.vectorizer.transform(&format!("{} {}", country, listed_in));
        let scored = self
            .content_vectors
            .iter()
            .enumerate()
            .map(|(j, content)| (j, query.cosine(content)));
        self.project(top_k(scored, k))
    }

    fn project(&self, indices: Vec<usize>) -> Vec<Recommendation> {
        indices
            .into_iter()
            .filter_map(|i| self.catalog.get(i))
            .map(Recommendation::from)
            .collect()
    }
}

/// Lookup key shared by catalog titles and requested titles
fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Descending by score; NaN sorts last
fn by_score_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Indices of the `k` highest scores; equal scores keep their input order
fn top_k(scored: impl Iterator<Item = (usize, f64)>, k: usize) -> Vec<usize> {
    let mut scored: Vec<(usize, f64)> = scored.collect();
    scored.sort_by(|a, b| by_score_desc(a.1, b.1));
    scored.truncate(k);
    scored.into_iter().map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        title: &str,
        title_type: &str,
        year: i32,
        country: &str,
        listed_in: &str,
    ) -> CatalogRow {
        CatalogRow {
            title: title.to_string(),
            title_type: title_type.to_string(),
            release_year: year,
            country: country.to_string(),
            rating: "TV-14".to_string(),
            listed_in: listed_in.to_string(),
            duration_int: 1,
            content: String::new(),
        }
    }

    fn catalog() -> Vec<CatalogRow> {
        vec![
            row("Naruto Shippuden", "TV Show", 2007, "Japan", "Anime Series, International TV Shows"),
            row("Kota Factory", "TV Show", 2019, "India", "International TV Shows, TV Comedies"),
            row("Castlevania", "TV Show", 2020, "United States", "Anime Series, TV Horror"),
            row("Your Name", "Movie", 2016, "Japan", "Anime Features, International Movies"),
            row("Dark", "TV Show", 2020, "Germany", "Crime TV Shows, International TV Shows"),
        ]
    }

    fn vectorizer() -> TfidfVectorizer {
        let terms = [
            "japan", "india", "united", "states", "germany", "anime", "series", "international",
            "tv", "shows", "comedies", "horror", "features", "movies", "crime",
        ];
        let vocabulary = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();
        TfidfVectorizer::new(vocabulary, vec![1.0; terms.len()])
    }

    fn matrix() -> SimilarityMatrix {
        SimilarityMatrix::new(vec![
            vec![1.0, 0.3, 0.6, 0.6, 0.2],
            vec![0.3, 1.0, 0.1, 0.0, 0.4],
            vec![0.6, 0.1, 1.0, 0.2, 0.1],
            vec![0.6, 0.0, 0.2, 1.0, 0.0],
            vec![0.2, 0.4, 0.1, 0.0, 1.0],
        ])
    }

    fn recommender() -> Recommender {
        Recommender::new(catalog(), matrix(), vectorizer()).unwrap()
    }

    fn titles(items: &[Recommendation]) -> Vec<&str> {
        items.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let rec = recommender();
        assert_eq!(rec.find("naruto shippuden"), Some(0));
        assert_eq!(rec.find("NARUTO SHIPPUDEN"), rec.find("Naruto Shippuden"));
        assert_eq!(rec.find("Naruto"), None);
    }

    #[test]
    fn test_find_first_duplicate_wins() {
        let mut rows = catalog();
        rows.push(row("dark", "Movie", 2005, "Canada", "Thrillers"));
        let mut scores = matrix().scores;
        for r in &mut scores {
            r.push(0.0);
        }
        scores.push(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        let rec = Recommender::new(rows, SimilarityMatrix::new(scores), vectorizer()).unwrap();
        assert_eq!(rec.find("DARK"), Some(4));
    }

    #[test]
    fn test_exact_match_excludes_self_and_keeps_ties_in_catalog_order() {
        let rec = recommender();
        let result = rec.recommend("naruto shippuden", "", "", 5);
        assert_eq!(result.path, MatchPath::Exact(0));
        assert_eq!(
            titles(&result.items),
            vec!["Castlevania", "Your Name", "Kota Factory", "Dark"]
        );
    }

    #[test]
    fn test_find_ignores_surrounding_whitespace_in_catalog_titles() {
        let rows = vec![
            row("Dark ", "TV Show", 2020, "Germany", "Crime TV Shows"),
            row("  Kota Factory", "TV Show", 2019, "India", "TV Comedies"),
        ];
        let scores = vec![vec![1.0, 0.2], vec![0.2, 1.0]];
        let rec = Recommender::new(rows, SimilarityMatrix::new(scores), vectorizer()).unwrap();

        assert_eq!(rec.find("Dark "), Some(0));
        assert_eq!(rec.find("dark"), Some(0));
        assert_eq!(rec.find("KOTA FACTORY"), Some(1));

        let result = rec.recommend("Dark ", "", "", 5);
        assert_eq!(result.path, MatchPath::Exact(0));
        assert_eq!(titles(&result.items), vec!["  Kota Factory"]);
    }

    #[test]
    fn test_exact_match_respects_k() {
        let rec = recommender();
        let items = rec.similar_to_row(1, 2);
        assert_eq!(titles(&items), vec!["Dark", "Naruto Shippuden"]);
        assert!(rec.similar_to_row(1, 0).is_empty());
    }

    #[test]
    fn test_exact_match_is_deterministic() {
        let rec = recommender();
        let first = rec.recommend("Dark", "", "", 3);
        let second = rec.recommend("dark", "", "", 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_exact_match_excludes_self_even_when_outscored() {
        let scores = vec![
            vec![0.5, 0.9],
            vec![0.9, 0.5],
        ];
        let rows = catalog().into_iter().take(2).collect();
        let rec = Recommender::new(rows, SimilarityMatrix::new(scores), vectorizer()).unwrap();
        assert_eq!(titles(&rec.similar_to_row(0, 5)), vec!["Kota Factory"]);
    }

    #[test]
    fn test_fallback_ranks_by_field_overlap() {
        let rec = recommender();
        let result = rec.recommend("Naruto", "Japan", "Anime Series, International TV Shows", 5);
        assert_eq!(result.path, MatchPath::Fallback);
        assert_eq!(result.items.len(), 5);
        assert_eq!(result.items[0].title, "Naruto Shippuden");
        assert_eq!(result.items[0].title_type, "TV Show");
        assert_eq!(result.items[0].release_year, 2007);
    }

    #[test]
    fn test_fallback_scores_are_non_increasing() {
        let rec = recommender();
        let query = rec.vectorizer.transform("Japan Anime Series, International TV Shows");
        let result = rec.similar_to_fields("Japan", "Anime Series, International TV Shows", 5);
        let scores: Vec<f64> = result
            .iter()
            .map(|r| {
                let idx = rec.find(&r.title).unwrap();
                query.cosine(&rec.content_vectors[idx])
            })
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_fallback_unknown_terms_keep_catalog_order() {
        let rec = recommender();
        let items = rec.similar_to_fields("Atlantis", "Stand-Up Comedy", 3);
        assert_eq!(titles(&items), vec!["Naruto Shippuden", "Kota Factory", "Castlevania"]);
    }

    #[test]
    fn test_empty_catalog_returns_nothing() {
        let rec = Recommender::new(vec![], SimilarityMatrix::new(vec![]), vectorizer()).unwrap();
        assert_eq!(rec.catalog_size(), 0);
        let result = rec.recommend("Naruto", "Japan", "Anime Series", 5);
        assert_eq!(result.path, MatchPath::Fallback);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_k_larger_than_catalog() {
        let rec = recommender();
        assert_eq!(rec.similar_to_row(2, 50).len(), 4);
        assert_eq!(rec.similar_to_fields("Japan", "Anime", 50).len(), 5);
    }

    #[test]
    fn test_mismatched_matrix_is_rejected() {
        let short = SimilarityMatrix::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert!(matches!(
            Recommender::new(catalog(), short, vectorizer()),
            Err(ArtifactError::Incompatible(_))
        ));

        let ragged = SimilarityMatrix::new(vec![vec![1.0], vec![0.0, 1.0]]);
        let rows = catalog().into_iter().take(2).collect();
        assert!(Recommender::new(rows, ragged, vectorizer()).is_err());
    }

    #[test]
    fn test_top_k_sorts_nan_last() {
        let scored = vec![(0, f64::NAN), (1, 0.2), (2, 0.9), (3, 0.2)];
        assert_eq!(top_k(scored.into_iter(), 4), vec![2, 1, 3, 0]);
    }

    #[test]
    fn test_match_path_display() {
        assert_eq!(MatchPath::Exact(3).to_string(), "exact");
        assert_eq!(MatchPath::Fallback.to_string(), "fallback");
    }
}
