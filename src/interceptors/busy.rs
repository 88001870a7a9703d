use async_trait::async_trait;

use crate::{
    busy::BusyTracker,
    http::{ApiRequest, ApiResponse, HttpError, Interceptor, Next},
};

/// BusyInterceptor
///
/// Marks the request in flight before handing it on. The guard is released
/// when this future finishes or is dropped, so a failing inner stage or an
/// abandoned navigation cannot leak a count.
pub struct BusyInterceptor {
    tracker: BusyTracker,
}

impl BusyInterceptor {
    pub fn new(tracker: BusyTracker) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl Interceptor for BusyInterceptor {
    async fn intercept(
        &self,
        request: ApiRequest,
        next: Next<'_>,
    ) -> Result<ApiResponse, HttpError> {
        let _guard = self.tracker.begin();
        next.run(request).await
    }
}
