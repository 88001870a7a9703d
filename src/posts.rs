use crate::{
    http::{ApiRequest, HttpClient, HttpError},
    models::{CreatePostRequest, Post, UpdatePostRequest},
    navigation::NavigationTicket,
};

/// ApiError
///
/// Errors of the CRUD client. `Http` is exactly what the chain returned (and,
/// for terminal failures, has already been reported); `Decode` means a 2xx
/// response carried a body of the wrong shape.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Status of the underlying HTTP failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(e) => Some(e.status()),
            ApiError::Decode(_) => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Http(e) if e.is_validation())
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Http(e) => e.server_message(),
            ApiError::Decode(_) => None,
        }
    }
}

/// PostService
///
/// Plain request/response mapping of the `/posts` REST resource on top of the
/// interceptor chain. It holds no state of its own beyond an optional
/// navigation ticket stamped on every request it issues.
#[derive(Clone)]
pub struct PostService {
    http: HttpClient,
    ticket: Option<NavigationTicket>,
}

impl PostService {
    pub fn new(http: HttpClient) -> Self {
        Self { http, ticket: None }
    }

    /// A handle whose requests belong to the given navigation.
    pub fn scoped(&self, ticket: NavigationTicket) -> Self {
        Self {
            http: self.http.clone(),
            ticket: Some(ticket),
        }
    }

    /// GET /posts
    pub async fn get_all(&self) -> Result<Vec<Post>, ApiError> {
        let response = self.http.execute(self.request(ApiRequest::get("/posts"))).await?;
        Ok(response.json()?)
    }

    /// GET /posts/{id}
    pub async fn find(&self, id: u64) -> Result<Post, ApiError> {
        let request = self.request(ApiRequest::get(format!("/posts/{id}")));
        let response = self.http.execute(request).await?;
        Ok(response.json()?)
    }

    /// POST /posts
    pub async fn create(&self, payload: &CreatePostRequest) -> Result<Post, ApiError> {
        let request = self.request(ApiRequest::post("/posts").json(payload)?);
        let response = self.http.execute(request).await?;
        Ok(response.json()?)
    }

    /// PUT /posts/{id}
    pub async fn update(&self, id: u64, payload: &UpdatePostRequest) -> Result<Post, ApiError> {
        let request = self.request(ApiRequest::put(format!("/posts/{id}")).json(payload)?);
        let response = self.http.execute(request).await?;
        Ok(response.json()?)
    }

    /// DELETE /posts/{id}; the response body is ignored.
    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        let request = self.request(ApiRequest::delete(format!("/posts/{id}")));
        self.http.execute(request).await?;
        Ok(())
    }

    fn request(&self, request: ApiRequest) -> ApiRequest {
        request.with_ticket(self.ticket.clone())
    }
}
