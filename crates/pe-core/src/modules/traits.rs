use super::container::Curve;
use serde::de::DeserializeOwned;

/// Boxed stream of decoded table rows.
pub type RecordStream<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Source of named reference curves, addressed as `<directory>/<name>`.
pub trait CurveSource {
    fn curve(&self, path: &str) -> Option<&Curve>;
}

/// Source of named record tables, addressed as `<directory>/<name>`.
pub trait TableSource {
    /// Number of rows stored in the table, `None` when the table is absent.
    fn entry_count(&self, path: &str) -> Option<usize>;

    /// Rows in storage order. The stream ends at the first row that does not decode.
    fn records<'a, T>(&'a self, path: &str) -> Option<RecordStream<'a, T>>
    where
        T: DeserializeOwned + 'a;
}
