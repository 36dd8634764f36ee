use crate::domain::model::Page;
use crate::utils::error::Result;
use async_trait::async_trait;

/// One page request against the remote record source.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, page: u32, page_size: usize) -> Result<Page>;
}

/// Opaque request signer. Credential generation lives outside this crate;
/// implementations must fail with a typed error before any request is sent
/// when credentials are absent.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, method: &str, url: &str, params: &[(String, String)]) -> Result<String>;

    fn has_credentials(&self) -> bool;
}

/// Advisory invalidation signal raised by the mutation gateway after a
/// successful write. `None` means the whole cached set is out of date.
pub trait Invalidate: Send + Sync {
    fn invalidate(&self, document_key: Option<&str>);
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
