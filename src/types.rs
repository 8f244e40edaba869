/// Column name in a tabular artifact.
/// Examples: `review`, `sentiment`, `clean_review`, `label`
pub type ColumnName = String;
/// Raw cell value read from a tabular artifact (empty string means null).
pub type CellValue = String;
/// Normalized document text fed to the vectorizer.
/// Example: `this movie was not good`
pub type DocumentText = String;
/// Vocabulary term recognized by a fitted vectorizer (word or joined n-gram).
/// Examples: `movie`, `good movie`
pub type Term = String;
/// Unique identifier for one tracked pipeline run.
/// Example: `20250830T141502123-0`
pub type RunId = String;
