//! Transformer trait for record set transformation

use crate::error::Result;

/// Transformer trait for turning one record set into another
///
/// Transformation works on the whole set at once because validation and
/// deduplication are set-level operations. Implementors may:
/// - Validate the schema and reject the set
/// - Drop corrupt rows
/// - Enrich rows with derived columns
/// - Remove duplicates
///
/// # Example
/// ```
/// use medallion_etl::etl::Transformer;
/// use medallion_etl::error::Result;
///
/// struct Uppercase;
///
/// impl Transformer for Uppercase {
///     type Input = String;
///     type Output = String;
///
///     fn transform(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
///         Ok(inputs.into_iter().map(|s| s.to_uppercase()).collect())
///     }
/// }
///
/// let out = Uppercase.transform(vec!["a".to_string()]).unwrap();
/// assert_eq!(out, vec!["A".to_string()]);
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a record set
    ///
    /// # Errors
    /// Returns an error if the set as a whole is invalid
    fn transform(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>>;
}

/// Identity transformer that passes items through unchanged
///
/// The gold job uses this: the silver layer is already clean.
pub struct IdentityTransformer<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for IdentityTransformer<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> IdentityTransformer<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Send + Sync> Transformer for IdentityTransformer<T> {
    type Input = T;
    type Output = T;

    fn transform(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        Ok(inputs)
    }
}
