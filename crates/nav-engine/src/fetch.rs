use crate::error::FetchError;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

/// Raw page response before region extraction.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// The network edge of the engine.
///
/// Object-safe so the controller can hold `Arc<dyn PageFetcher>`; the
/// returned future must be `'static` because in-flight requests outlive any
/// single caller.
pub trait PageFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<FetchedPage, FetchError>>;
}

/// Production fetcher over reqwest.
///
/// Sends the `X-Requested-With: XMLHttpRequest` marker the storefront uses
/// to recognize in-app page requests.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::transport(format!("client build failed: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<FetchedPage, FetchError>> {
        let client = self.client.clone();
        let url = url.to_string();

        async move {
            let response = client
                .get(&url)
                .header("X-Requested-With", "XMLHttpRequest")
                .send()
                .await
                .map_err(|e| FetchError::transport(e.to_string()))?;

            let status = response.status().as_u16();
            if !response.status().is_success() {
                return Err(FetchError::Status { status });
            }

            let body = response
                .text()
                .await
                .map_err(|e| FetchError::transport(e.to_string()))?;

            Ok(FetchedPage { url, status, body })
        }
        .boxed()
    }
}
