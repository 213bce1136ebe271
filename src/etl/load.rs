//! Loader trait for writing a record set to a destination

use crate::error::Result;

/// Loader trait for loading a record set to a destination
///
/// The report type is loader specific: a plain row count for the silver
/// writer, a [`LoadResult`](crate::gold::LoadResult) for the incremental loader.
///
/// # Example
/// ```no_run
/// use medallion_etl::etl::Loader;
/// use medallion_etl::error::Result;
///
/// struct CountingLoader;
///
/// impl Loader for CountingLoader {
///     type Item = String;
///     type Report = usize;
///
///     async fn load(&self, items: Vec<Self::Item>) -> Result<Self::Report> {
///         Ok(items.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The type of items to load
    type Item: Send;

    /// What a successful load reports back
    type Report: Send;

    /// Load items to the destination
    ///
    /// # Errors
    /// Returns an error if loading fails (I/O, sink rejection, missing watermark, etc.)
    fn load(
        &self,
        items: Vec<Self::Item>,
    ) -> impl std::future::Future<Output = Result<Self::Report>> + Send;
}
