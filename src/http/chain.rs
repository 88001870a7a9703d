use async_trait::async_trait;
use std::sync::Arc;

use super::{ApiRequest, ApiResponse, HttpError, Transport};

/// Interceptor
///
/// One stage of the request pipeline. A stage may rewrite the request, call
/// `next.run(..)` any number of times (the retry stage calls it repeatedly),
/// and inspect or replace the outcome.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(
        &self,
        request: ApiRequest,
        next: Next<'_>,
    ) -> Result<ApiResponse, HttpError>;
}

/// Next
///
/// The continuation handed to a stage: the remaining stages followed by the
/// transport. It is `Copy`, so a stage can run the rest of the chain more than
/// once.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    pub fn new(interceptors: &'a [Arc<dyn Interceptor>], transport: &'a dyn Transport) -> Self {
        Self {
            interceptors,
            transport,
        }
    }

    pub async fn run(self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        match self.interceptors.split_first() {
            Some((stage, rest)) => {
                stage
                    .intercept(request, Next::new(rest, self.transport))
                    .await
            }
            None => self.transport.send(request).await,
        }
    }
}

/// HttpClient
///
/// The assembled pipeline. Stages run in the order they were added: the first
/// stage is the outermost wrapper and the transport sits innermost.
#[derive(Clone)]
pub struct HttpClient {
    interceptors: Vec<Arc<dyn Interceptor>>,
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            interceptors: Vec::new(),
            transport,
        }
    }

    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn stage_count(&self) -> usize {
        self.interceptors.len()
    }

    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        tracing::trace!(method = %request.method, path = %request.path, "dispatching request");
        Next::new(&self.interceptors, self.transport.as_ref())
            .run(request)
            .await
    }
}
