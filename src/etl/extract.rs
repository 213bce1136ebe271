//! Extractor trait for reading a record set from a layer

use crate::error::Result;

/// Extractor trait for extracting a record set from a source
///
/// Implementors define how to read items from a layer, such as:
/// - Raw JSON objects in the landing container
/// - The silver Parquet object
///
/// # Example
/// ```no_run
/// use medallion_etl::etl::Extractor;
/// use medallion_etl::error::Result;
///
/// struct StaticExtractor {
///     items: Vec<String>,
/// }
///
/// impl Extractor for StaticExtractor {
///     type Item = String;
///
///     async fn extract(&self) -> Result<Vec<Self::Item>> {
///         Ok(self.items.clone())
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// Extract every item from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails (I/O, parsing, empty source, etc.)
    fn extract(&self) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}
