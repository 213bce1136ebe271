//! Object store capability shared by the raw and intermediate layers

use crate::error::Result;
use async_trait::async_trait;

/// Capability over a container/object storage service.
///
/// Containers hold flat, named objects. The bronze layer only reads from a
/// store; the silver layer both writes and reads its single object.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List the names of objects in `container` starting with `prefix`, sorted
    async fn list_objects(&self, container: &str, prefix: &str) -> Result<Vec<String>>;

    /// Read the full contents of an object
    async fn read_object(&self, container: &str, name: &str) -> Result<Vec<u8>>;

    /// Create `container` if it does not exist yet; an existing container is success
    async fn ensure_container(&self, container: &str) -> Result<()>;

    /// Write an object, replacing any previous object of the same name
    async fn write_object(&self, container: &str, name: &str, data: Vec<u8>) -> Result<()>;
}
