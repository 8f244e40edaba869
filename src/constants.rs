/// Constants used by tabular column schemas.
pub mod columns {
    /// Raw review text column expected in the input dataset.
    pub const REVIEW: &str = "review";
    /// Raw sentiment string column expected in the input dataset.
    pub const SENTIMENT: &str = "sentiment";
    /// Normalized review text column added by preprocessing.
    pub const CLEAN_REVIEW: &str = "clean_review";
    /// Integer label column added by preprocessing.
    pub const LABEL: &str = "label";

    /// Columns the validation gate requires in the ingested dataset.
    pub const EXPECTED: [&str; 2] = [REVIEW, SENTIMENT];
    /// Identifying column used for duplicate reporting.
    pub const IDENTIFYING: &str = REVIEW;
}

/// Constants used by sentiment label mapping.
pub mod labels {
    /// Sentiment string mapped to the positive class.
    pub const POSITIVE: &str = "positive";
    /// Sentiment string mapped to the negative class.
    pub const NEGATIVE: &str = "negative";
    /// Integer value of the positive class.
    pub const POSITIVE_CLASS: u8 = 1;
    /// Integer value of the negative class.
    pub const NEGATIVE_CLASS: u8 = 0;
}

/// Constants used by the artifact store layout (paths relative to the root).
pub mod artifacts {
    /// Ingested copy of the external dataset.
    pub const RAW_DATA: &str = "data/raw.csv";
    /// Dataset that passed the validation gate.
    pub const VALIDATED_DATA: &str = "data/validated.csv";
    /// Normalized dataset with `clean_review` and `label` columns.
    pub const CLEAN_DATA: &str = "data/clean.csv";
    /// Train partition of the normalized dataset.
    pub const TRAIN_DATA: &str = "data/train.csv";
    /// Test partition of the normalized dataset.
    pub const TEST_DATA: &str = "data/test.csv";
    /// Train feature matrix (sparse, binary).
    pub const X_TRAIN: &str = "features/x_train.bin";
    /// Train label vector (binary).
    pub const Y_TRAIN: &str = "features/y_train.bin";
    /// Test feature matrix (sparse, binary).
    pub const X_TEST: &str = "features/x_test.bin";
    /// Test label vector (binary).
    pub const Y_TEST: &str = "features/y_test.bin";
    /// Fitted TF-IDF vectorizer (binary).
    pub const VECTORIZER: &str = "features/vectorizer.bin";
    /// Trained classifier (binary).
    pub const MODEL: &str = "models/model.bin";
    /// Machine-readable evaluation metrics.
    pub const METRICS: &str = "metrics.json";
    /// Human-readable classification report.
    pub const REPORT: &str = "classification_report.txt";
    /// Directory for run-tracking output of `FileRunTracker`.
    pub const RUNS_DIR: &str = "runs";
}

/// Constants used by versioned binary artifact encoding.
pub mod encoding {
    /// Prefix marker for bitcode-encoded payloads.
    pub const PAYLOAD_PREFIX: u8 = b'B';
    /// Version tag for persisted sparse feature matrices.
    pub const MATRIX_RECORD_VERSION: u8 = 1;
    /// Version tag for persisted label vectors.
    pub const LABELS_RECORD_VERSION: u8 = 1;
    /// Version tag for persisted fitted vectorizers.
    pub const VECTORIZER_RECORD_VERSION: u8 = 1;
    /// Version tag for persisted trained models.
    pub const MODEL_RECORD_VERSION: u8 = 1;
}

/// Constants used by classifier training.
pub mod train {
    /// Fixed gradient-descent step size.
    pub const LEARNING_RATE: f32 = 0.5;
    /// Gradient-norm threshold below which training is considered converged.
    pub const CONVERGENCE_TOLERANCE: f32 = 1e-4;
    /// Decision threshold applied to predicted probabilities.
    pub const DECISION_THRESHOLD: f32 = 0.5;
}

/// Constants used by text normalization.
pub mod normalize {
    /// Contraction expansion table applied before case folding.
    /// Keys are matched case-insensitively against whole tokens.
    pub const CONTRACTIONS: [(&str, &str); 42] = [
        ("ain't", "is not"),
        ("aren't", "are not"),
        ("can't", "cannot"),
        ("couldn't", "could not"),
        ("didn't", "did not"),
        ("doesn't", "does not"),
        ("don't", "do not"),
        ("hadn't", "had not"),
        ("hasn't", "has not"),
        ("haven't", "have not"),
        ("he'd", "he would"),
        ("he'll", "he will"),
        ("he's", "he is"),
        ("i'd", "i would"),
        ("i'll", "i will"),
        ("i'm", "i am"),
        ("i've", "i have"),
        ("isn't", "is not"),
        ("it'd", "it would"),
        ("it'll", "it will"),
        ("it's", "it is"),
        ("let's", "let us"),
        ("mightn't", "might not"),
        ("mustn't", "must not"),
        ("shan't", "shall not"),
        ("she'd", "she would"),
        ("she'll", "she will"),
        ("she's", "she is"),
        ("shouldn't", "should not"),
        ("that's", "that is"),
        ("there's", "there is"),
        ("they'd", "they would"),
        ("they'll", "they will"),
        ("they're", "they are"),
        ("they've", "they have"),
        ("wasn't", "was not"),
        ("we're", "we are"),
        ("we've", "we have"),
        ("weren't", "were not"),
        ("won't", "will not"),
        ("wouldn't", "would not"),
        ("you're", "you are"),
    ];

    /// Fallback contraction suffixes tried after the exact table.
    /// Applied to the token stem in order, first match wins.
    pub const CONTRACTION_SUFFIXES: [(&str, &str); 6] = [
        ("n't", " not"),
        ("'re", " are"),
        ("'ve", " have"),
        ("'ll", " will"),
        ("'d", " would"),
        ("'s", " is"),
    ];
}

/// Constants used by TF-IDF vocabulary construction.
pub mod features {
    /// English stop words excluded from the vocabulary (unigram filter),
    /// carried over from the original training setup.
    pub const STOP_WORDS: [&str; 89] = [
        "a", "about", "above", "after", "again", "all", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being",
        "below", "between", "both", "but", "by", "did", "do", "does", "doing",
        "down", "during", "each", "few", "for", "from", "further", "had",
        "has", "have", "having", "he", "her", "here", "hers", "him", "his",
        "how", "i", "if", "in", "into", "is", "it", "its", "me", "more",
        "most", "my", "of", "off", "on", "once", "only", "or", "other", "our",
        "out", "over", "own", "she", "so", "some", "such", "than", "that",
        "the", "their", "them", "then", "there", "these", "they", "this",
        "those", "through", "to", "under", "until", "up", "was", "we",
    ];
}
