use std::collections::{BTreeMap, BTreeSet, HashSet};

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::FeatureParams;
use crate::constants::features::STOP_WORDS;
use crate::errors::PipelineError;
use crate::types::Term;

/// Sparse feature matrix in compressed-sparse-row form.
///
/// Row count always equals the source document count and column count equals
/// the fitted vocabulary size of the vectorizer that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseMatrix {
    /// Number of rows (documents).
    pub rows: usize,
    /// Number of columns (vocabulary size).
    pub cols: usize,
    /// Row offsets into `indices`/`values`, length `rows + 1`.
    pub indptr: Vec<u64>,
    /// Column indices of stored values, ascending within each row.
    pub indices: Vec<u32>,
    /// Stored values aligned with `indices`.
    pub values: Vec<f32>,
}

impl SparseMatrix {
    /// Column indices and values of row `row`.
    pub fn row(&self, row: usize) -> (&[u32], &[f32]) {
        let start = self.indptr[row] as usize;
        let end = self.indptr[row + 1] as usize;
        (&self.indices[start..end], &self.values[start..end])
    }

    /// Number of stored (non-zero) values.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }
}

/// Persisted sparse matrix record (bitcode, versioned envelope in the store).
#[derive(Clone, Debug, bitcode::Encode, bitcode::Decode)]
pub struct PersistedMatrix {
    /// Number of rows.
    pub rows: u64,
    /// Number of columns.
    pub cols: u64,
    /// CSR row offsets.
    pub indptr: Vec<u64>,
    /// CSR column indices.
    pub indices: Vec<u32>,
    /// CSR stored values.
    pub values: Vec<f32>,
}

impl From<&SparseMatrix> for PersistedMatrix {
    fn from(matrix: &SparseMatrix) -> Self {
        Self {
            rows: matrix.rows as u64,
            cols: matrix.cols as u64,
            indptr: matrix.indptr.clone(),
            indices: matrix.indices.clone(),
            values: matrix.values.clone(),
        }
    }
}

impl TryFrom<PersistedMatrix> for SparseMatrix {
    type Error = PipelineError;

    fn try_from(record: PersistedMatrix) -> Result<Self, Self::Error> {
        let rows = record.rows as usize;
        let cols = record.cols as usize;
        if record.indptr.len() != rows + 1 || record.indptr.first() != Some(&0) {
            return Err(PipelineError::Artifact(format!(
                "matrix record is inconsistent: {} rows but {} row offsets",
                rows,
                record.indptr.len()
            )));
        }
        if record.indices.len() != record.values.len()
            || record.indptr.last() != Some(&(record.indices.len() as u64))
            || record.indptr.windows(2).any(|pair| pair[0] > pair[1])
        {
            return Err(PipelineError::Artifact(format!(
                "matrix record is inconsistent: row offsets do not index {} stored values",
                record.values.len()
            )));
        }
        if record.indices.iter().any(|index| *index as usize >= cols) {
            return Err(PipelineError::Artifact(format!(
                "matrix record is inconsistent: column index out of range for {cols} columns"
            )));
        }
        Ok(Self {
            rows,
            cols,
            indptr: record.indptr,
            indices: record.indices,
            values: record.values,
        })
    }
}

/// Unfitted TF-IDF vectorizer configured with vocabulary bounds.
#[derive(Clone, Debug)]
pub struct TfidfVectorizer {
    params: FeatureParams,
}

impl TfidfVectorizer {
    /// Create a vectorizer from feature-stage parameters.
    pub fn new(params: FeatureParams) -> Self {
        Self { params }
    }

    /// Learn vocabulary and idf weighting from `texts` (the train corpus).
    ///
    /// Terms outside the configured document-frequency bounds are excluded;
    /// when more than `max_features` terms survive, the most document-frequent
    /// terms win (ties broken lexicographically). The final vocabulary is
    /// frozen in lexicographic order.
    pub fn fit<T: AsRef<str>>(&self, texts: &[T]) -> Result<FittedVectorizer, PipelineError> {
        if texts.is_empty() {
            return Err(PipelineError::Config(
                "cannot fit vectorizer on an empty corpus".into(),
            ));
        }
        let (min_n, max_n) = self.params.ngram_range;
        let n_documents = texts.len();

        let mut document_frequency: BTreeMap<Term, usize> = BTreeMap::new();
        for text in texts {
            let terms: BTreeSet<Term> = ngrams(text.as_ref(), min_n, max_n).collect();
            for term in terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let max_df_count = (self.params.max_df * n_documents as f64).floor() as usize;
        let mut retained: Vec<(Term, usize)> = document_frequency
            .into_iter()
            .filter(|(_, df)| *df >= self.params.min_df && *df <= max_df_count)
            .collect();

        if retained.len() > self.params.max_features {
            retained.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            retained.truncate(self.params.max_features);
            retained.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let mut vocabulary = IndexMap::with_capacity(retained.len());
        let mut idf = Vec::with_capacity(retained.len());
        for (index, (term, df)) in retained.into_iter().enumerate() {
            // Smooth idf computed from the fit corpus only.
            idf.push((((1 + n_documents) as f32) / ((1 + df) as f32)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        info!(
            vocabulary = vocabulary.len(),
            documents = n_documents,
            "fitted tf-idf vectorizer"
        );
        Ok(FittedVectorizer {
            vocabulary,
            idf,
            n_documents,
            ngram_range: (min_n, max_n),
        })
    }
}

/// Fitted TF-IDF transform with a frozen vocabulary.
///
/// Immutable once fit: `transform` never updates the vocabulary, and tokens
/// absent from it contribute zero weight instead of failing.
#[derive(Clone, Debug)]
pub struct FittedVectorizer {
    vocabulary: IndexMap<Term, usize>,
    idf: Vec<f32>,
    n_documents: usize,
    ngram_range: (usize, usize),
}

impl FittedVectorizer {
    /// Vocabulary size (feature dimensionality of produced matrices).
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Index of `term` in the frozen vocabulary, if recognized.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Number of documents in the fit corpus.
    pub fn fit_documents(&self) -> usize {
        self.n_documents
    }

    /// Apply the frozen transform to `texts`.
    ///
    /// The result has one row per input text and one column per vocabulary
    /// term; rows are L2-normalized term-frequency times idf.
    pub fn transform<T: AsRef<str>>(&self, texts: &[T]) -> SparseMatrix {
        let (min_n, max_n) = self.ngram_range;
        let mut indptr = Vec::with_capacity(texts.len() + 1);
        let mut indices = Vec::new();
        let mut values = Vec::new();
        indptr.push(0u64);

        for text in texts {
            let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
            for term in ngrams(text.as_ref(), min_n, max_n) {
                if let Some(index) = self.vocabulary.get(term.as_str()) {
                    *counts.entry(*index).or_insert(0.0) += 1.0;
                }
            }
            let mut norm = 0.0f32;
            for (index, count) in &counts {
                let weighted = count * self.idf[*index];
                norm += weighted * weighted;
            }
            let norm = norm.sqrt();
            for (index, count) in counts {
                let weighted = count * self.idf[index];
                indices.push(index as u32);
                values.push(if norm > 0.0 { weighted / norm } else { 0.0 });
            }
            indptr.push(indices.len() as u64);
        }

        debug!(
            rows = texts.len(),
            cols = self.vocabulary.len(),
            nnz = values.len(),
            "transformed corpus"
        );
        SparseMatrix {
            rows: texts.len(),
            cols: self.vocabulary.len(),
            indptr,
            indices,
            values,
        }
    }
}

/// Persisted fitted-vectorizer record (bitcode, versioned envelope in the
/// store). Terms are stored in vocabulary-index order.
#[derive(Clone, Debug, bitcode::Encode, bitcode::Decode)]
pub struct PersistedVectorizer {
    /// Vocabulary terms in index order.
    pub terms: Vec<Term>,
    /// Idf weights aligned with `terms`.
    pub idf: Vec<f32>,
    /// Fit corpus size.
    pub n_documents: u64,
    /// N-gram span the vocabulary was built with.
    pub ngram_range: (u64, u64),
}

impl From<&FittedVectorizer> for PersistedVectorizer {
    fn from(fitted: &FittedVectorizer) -> Self {
        Self {
            terms: fitted.vocabulary.keys().cloned().collect(),
            idf: fitted.idf.clone(),
            n_documents: fitted.n_documents as u64,
            ngram_range: (fitted.ngram_range.0 as u64, fitted.ngram_range.1 as u64),
        }
    }
}

impl TryFrom<PersistedVectorizer> for FittedVectorizer {
    type Error = PipelineError;

    fn try_from(record: PersistedVectorizer) -> Result<Self, Self::Error> {
        if record.terms.len() != record.idf.len() {
            return Err(PipelineError::Artifact(format!(
                "vectorizer record is inconsistent: {} terms, {} idf weights",
                record.terms.len(),
                record.idf.len()
            )));
        }
        let vocabulary: IndexMap<Term, usize> = record
            .terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();
        Ok(Self {
            vocabulary,
            idf: record.idf,
            n_documents: record.n_documents as usize,
            ngram_range: (record.ngram_range.0 as usize, record.ngram_range.1 as usize),
        })
    }
}

/// Iterate the word n-grams of a normalized text.
///
/// Tokenization is a plain split on spaces (the normalizer contract
/// guarantees single-space separation); stop words are removed from the
/// token stream before n-grams are formed.
fn ngrams(text: &str, min_n: usize, max_n: usize) -> impl Iterator<Item = Term> + '_ {
    let stop_words: &HashSet<&str> = stop_word_set();
    let tokens: Vec<&str> = text
        .split(' ')
        .filter(|token| !token.is_empty() && !stop_words.contains(token))
        .collect();
    (min_n..=max_n).flat_map(move |n| {
        let tokens = tokens.clone();
        (0..tokens.len().saturating_sub(n - 1))
            .map(move |start| tokens[start..start + n].join(" "))
            .collect::<Vec<_>>()
    })
}

fn stop_word_set() -> &'static HashSet<&'static str> {
    use std::sync::OnceLock;
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max_features: usize, ngram: (usize, usize), max_df: f64, min_df: usize) -> FeatureParams {
        FeatureParams {
            max_features,
            ngram_range: ngram,
            max_df,
            min_df,
        }
    }

    #[test]
    fn fit_builds_expected_vocabulary() {
        let corpus = ["cat cat dog", "dog dog"];
        let fitted = TfidfVectorizer::new(params(10, (1, 1), 1.0, 1))
            .fit(&corpus)
            .expect("fit");
        assert_eq!(fitted.vocabulary_size(), 2);
        assert_eq!(fitted.term_index("cat"), Some(0));
        assert_eq!(fitted.term_index("dog"), Some(1));
    }

    #[test]
    fn transform_ignores_out_of_vocabulary_tokens() {
        let corpus = ["cat cat dog", "dog dog"];
        let fitted = TfidfVectorizer::new(params(10, (1, 1), 1.0, 1))
            .fit(&corpus)
            .expect("fit");
        let matrix = fitted.transform(&["cat parrot"]);
        assert_eq!(matrix.rows, 1);
        assert_eq!(matrix.cols, 2);
        let (indices, values) = matrix.row(0);
        // Only `cat` contributes; `dog` has zero weight and `parrot` is ignored.
        assert_eq!(indices, &[0]);
        assert!((values[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn document_frequency_bounds_prune_terms() {
        let corpus = ["alpha beta", "alpha gamma", "alpha delta"];
        // min_df=2 keeps only `alpha`; max_df=0.5 then removes it too.
        let fitted = TfidfVectorizer::new(params(10, (1, 1), 1.0, 2))
            .fit(&corpus)
            .expect("fit");
        assert_eq!(fitted.vocabulary_size(), 1);
        assert_eq!(fitted.term_index("alpha"), Some(0));

        let fitted = TfidfVectorizer::new(params(10, (1, 1), 0.5, 1))
            .fit(&corpus)
            .expect("fit");
        assert_eq!(fitted.term_index("alpha"), None);
        assert_eq!(fitted.vocabulary_size(), 3);
    }

    #[test]
    fn max_features_keeps_most_frequent_terms() {
        let corpus = ["common rare", "common", "common other"];
        let fitted = TfidfVectorizer::new(params(1, (1, 1), 1.0, 1))
            .fit(&corpus)
            .expect("fit");
        assert_eq!(fitted.vocabulary_size(), 1);
        assert_eq!(fitted.term_index("common"), Some(0));
    }

    #[test]
    fn bigrams_enter_the_vocabulary() {
        let corpus = ["good movie", "good movie indeed"];
        let fitted = TfidfVectorizer::new(params(10, (1, 2), 1.0, 1))
            .fit(&corpus)
            .expect("fit");
        assert!(fitted.term_index("good movie").is_some());
        assert!(fitted.term_index("movie indeed").is_some());
    }

    #[test]
    fn transform_shape_matches_corpus_and_vocabulary() {
        let corpus = ["one two three", "two three four", "five"];
        let fitted = TfidfVectorizer::new(params(100, (1, 1), 1.0, 1))
            .fit(&corpus)
            .expect("fit");
        let matrix = fitted.transform(&corpus);
        assert_eq!(matrix.rows, corpus.len());
        assert_eq!(matrix.cols, fitted.vocabulary_size());
        assert_eq!(matrix.indptr.len(), corpus.len() + 1);
    }

    #[test]
    fn rows_are_l2_normalized() {
        let corpus = ["cat cat dog", "dog bird"];
        let fitted = TfidfVectorizer::new(params(10, (1, 1), 1.0, 1))
            .fit(&corpus)
            .expect("fit");
        let matrix = fitted.transform(&corpus);
        for row in 0..matrix.rows {
            let (_, values) = matrix.row(row);
            let norm: f32 = values.iter().map(|v| v * v).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "row {row} norm {norm}");
        }
    }

    #[test]
    fn persisted_vectorizer_round_trips() {
        let corpus = ["cat cat dog", "dog dog"];
        let fitted = TfidfVectorizer::new(params(10, (1, 1), 1.0, 1))
            .fit(&corpus)
            .expect("fit");
        let record = PersistedVectorizer::from(&fitted);
        let restored = FittedVectorizer::try_from(record).expect("restore");
        assert_eq!(restored.vocabulary_size(), fitted.vocabulary_size());
        assert_eq!(restored.term_index("dog"), fitted.term_index("dog"));
        assert_eq!(
            restored.transform(&["cat dog"]),
            fitted.transform(&["cat dog"])
        );
    }

    #[test]
    fn persisted_matrix_round_trips() {
        let corpus = ["cat cat dog", "dog bird"];
        let fitted = TfidfVectorizer::new(params(10, (1, 1), 1.0, 1))
            .fit(&corpus)
            .expect("fit");
        let matrix = fitted.transform(&corpus);
        let restored = SparseMatrix::try_from(PersistedMatrix::from(&matrix)).expect("restore");
        assert_eq!(restored, matrix);
    }

    #[test]
    fn truncated_matrix_record_is_rejected() {
        // Row count promises offsets the record does not carry.
        let record = PersistedMatrix {
            rows: 2,
            cols: 3,
            indptr: vec![0],
            indices: vec![],
            values: vec![],
        };
        assert!(SparseMatrix::try_from(record).is_err());
    }

    #[test]
    fn matrix_record_with_misaligned_offsets_is_rejected() {
        let record = PersistedMatrix {
            rows: 1,
            cols: 3,
            indptr: vec![0, 2],
            indices: vec![1],
            values: vec![0.5],
        };
        assert!(SparseMatrix::try_from(record).is_err());

        let record = PersistedMatrix {
            rows: 2,
            cols: 3,
            indptr: vec![0, 2, 1],
            indices: vec![0],
            values: vec![0.5],
        };
        assert!(SparseMatrix::try_from(record).is_err());
    }

    #[test]
    fn matrix_record_with_out_of_range_column_is_rejected() {
        let record = PersistedMatrix {
            rows: 1,
            cols: 2,
            indptr: vec![0, 1],
            indices: vec![2],
            values: vec![0.5],
        };
        assert!(SparseMatrix::try_from(record).is_err());
    }

    #[test]
    fn inconsistent_record_is_rejected() {
        let record = PersistedVectorizer {
            terms: vec!["cat".into()],
            idf: vec![1.0, 2.0],
            n_documents: 1,
            ngram_range: (1, 1),
        };
        assert!(FittedVectorizer::try_from(record).is_err());
    }
}
