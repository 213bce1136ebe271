//! Core ETL (Extract, Transform, Load) abstractions
//!
//! Each layer of the pipeline is expressed as one of these stages so the
//! silver and gold jobs share a single sequential runner.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::Pipeline;
pub use transform::{IdentityTransformer, Transformer};
