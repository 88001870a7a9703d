//! Page state derived from a committed navigation.
//!
//! Pages never report HTTP failures themselves: the interceptor chain has
//! already done that. They only keep local state (error panels, inline form
//! errors) and confirm successful actions.

use crate::{
    auth::{AuthError, AuthService},
    models::{CreatePostRequest, LoginRequest, Post, UpdatePostRequest},
    navigation::{
        ActivatedRoute, DEFAULT_PATH, LOGIN_PATH, NavigationOutcome, Navigator, POST_ID_PARAM,
        Page, parse_post_id,
    },
    notify::NotificationSink,
    posts::{ApiError, PostService},
};

pub const POST_DELETED: &str = "Post deleted";
pub const POST_CREATED: &str = "Post created successfully";
pub const POST_UPDATED: &str = "Post updated successfully";
pub const FORM_INVALID: &str = "Please check the form. Some fields are invalid.";
pub const LOGGED_IN: &str = "Logged in";
pub const LOGIN_FAILED: &str = "Login failed";

/// PostIndexPage
///
/// The post table. A missing list means the resolver failed; the page then
/// shows its error panel instead of an empty table.
#[derive(Debug, Clone, Default)]
pub struct PostIndexPage {
    pub posts: Vec<Post>,
    pub has_error: bool,
}

impl PostIndexPage {
    pub fn from_route(route: &ActivatedRoute) -> Self {
        match route.data.post_list() {
            Some(list) => Self {
                posts: list.to_vec(),
                has_error: false,
            },
            None => Self {
                posts: Vec::new(),
                has_error: true,
            },
        }
    }

    /// Deletes a post and drops its row. On failure the table is left as is.
    pub async fn delete_post(
        &mut self,
        posts: &PostService,
        notifier: &dyn NotificationSink,
        id: u64,
    ) -> Result<(), ApiError> {
        posts.delete(id).await?;
        self.posts.retain(|post| post.id != id);
        notifier.show_success(POST_DELETED);
        Ok(())
    }

    /// Re-runs the route's resolvers by navigating to the same URL.
    pub async fn retry(navigator: &Navigator) -> NavigationOutcome {
        navigator.reload().await
    }

    pub async fn logout(auth: &AuthService, navigator: &Navigator) -> NavigationOutcome {
        auth.logout();
        navigator.navigate(LOGIN_PATH).await
    }
}

/// PostViewPage
#[derive(Debug, Clone, Default)]
pub struct PostViewPage {
    pub post: Option<Post>,
    pub has_error: bool,
}

impl PostViewPage {
    pub fn from_route(route: &ActivatedRoute) -> Self {
        let post = route.data.post().cloned();
        Self {
            has_error: post.is_none(),
            post,
        }
    }

    pub async fn retry(navigator: &Navigator) -> NavigationOutcome {
        navigator.reload().await
    }
}

/// ForbiddenPage
///
/// Shown after a role guard refusal; `from` is the URL that was refused.
#[derive(Debug, Clone, Default)]
pub struct ForbiddenPage {
    pub from: Option<String>,
}

impl ForbiddenPage {
    pub fn from_route(route: &ActivatedRoute) -> Self {
        Self {
            from: route.query_value("from").map(str::to_string),
        }
    }
}

/// A required form field left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    TitleRequired,
    BodyRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(u64),
    /// An edit route whose post never loaded; there is nothing to save.
    Unavailable,
}

/// What a form submission came to.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Stored; the caller moves on to the post list.
    Saved(Post),
    /// Local validation failed; nothing was sent.
    Invalid(Vec<FieldError>),
    /// The server refused the payload (400/422); the message is shown inline.
    Rejected { message: String },
    /// Any other failure, already reported by the chain.
    Failed(ApiError),
    /// The form has no post behind it; nothing was sent.
    Unavailable,
}

/// PostForm
///
/// Shared state of the create and edit pages.
#[derive(Debug, Clone)]
pub struct PostForm {
    pub mode: FormMode,
    pub title: String,
    pub body: String,
    pub server_error: Option<String>,
    pub has_error: bool,
}

impl PostForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            body: String::new(),
            server_error: None,
            has_error: false,
        }
    }

    pub fn edit(post: &Post) -> Self {
        Self {
            mode: FormMode::Edit(post.id),
            title: post.title.clone(),
            body: post.body.clone(),
            server_error: None,
            has_error: false,
        }
    }

    /// Builds the form for the create or edit route. An edit route whose post
    /// could not be resolved (or whose id is malformed) yields an empty,
    /// unsubmittable form in the error state.
    pub fn from_route(route: &ActivatedRoute) -> Self {
        if route.page != Page::PostEdit {
            return Self::create();
        }
        let id = parse_post_id(route.params.get(POST_ID_PARAM).map(String::as_str));
        match (id, route.data.post()) {
            (Some(_), Some(post)) => Self::edit(post),
            _ => Self {
                mode: FormMode::Unavailable,
                has_error: true,
                ..Self::create()
            },
        }
    }

    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::TitleRequired);
        }
        if self.body.trim().is_empty() {
            errors.push(FieldError::BodyRequired);
        }
        errors
    }

    pub async fn submit(
        &mut self,
        posts: &PostService,
        notifier: &dyn NotificationSink,
    ) -> SubmitOutcome {
        if self.mode == FormMode::Unavailable {
            return SubmitOutcome::Unavailable;
        }
        self.server_error = None;

        let errors = self.validate();
        if !errors.is_empty() {
            return SubmitOutcome::Invalid(errors);
        }

        let (result, confirmation) = match self.mode {
            FormMode::Create => {
                let payload = CreatePostRequest {
                    title: self.title.clone(),
                    body: self.body.clone(),
                };
                (posts.create(&payload).await, POST_CREATED)
            }
            FormMode::Edit(id) => {
                let payload = UpdatePostRequest {
                    title: self.title.clone(),
                    body: self.body.clone(),
                };
                (posts.update(id, &payload).await, POST_UPDATED)
            }
            FormMode::Unavailable => return SubmitOutcome::Unavailable,
        };

        match result {
            Ok(post) => {
                notifier.show_success(confirmation);
                SubmitOutcome::Saved(post)
            }
            Err(e) if e.is_validation() => {
                let message = e.server_message().unwrap_or(FORM_INVALID).to_string();
                self.server_error = Some(message.clone());
                SubmitOutcome::Rejected { message }
            }
            Err(e) => SubmitOutcome::Failed(e),
        }
    }
}

#[derive(Debug)]
pub enum LoginOutcome {
    /// Session stored; navigate to `redirect_to`.
    LoggedIn { redirect_to: String },
    /// Form incomplete; nothing was sent.
    Invalid,
    Failed(AuthError),
}

/// LoginPage
#[derive(Debug, Clone, Default)]
pub struct LoginPage {
    pub email: String,
    pub password: String,
}

impl LoginPage {
    pub fn is_valid(&self) -> bool {
        let email = self.email.trim();
        !self.password.is_empty() && email.contains('@') && !email.starts_with('@')
    }

    /// Logs in and picks the destination: `return_url` when it is a local
    /// path, the post list otherwise.
    pub async fn submit(
        &self,
        auth: &AuthService,
        notifier: &dyn NotificationSink,
        return_url: Option<&str>,
    ) -> LoginOutcome {
        if !self.is_valid() {
            return LoginOutcome::Invalid;
        }

        let request = LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        match auth.login(&request).await {
            Ok(response) => {
                auth.handle_login_success(&response);
                notifier.show_success(LOGGED_IN);
                let redirect_to = return_url
                    .filter(|url| url.starts_with('/') && !url.starts_with("//"))
                    .unwrap_or(DEFAULT_PATH)
                    .to_string();
                LoginOutcome::LoggedIn { redirect_to }
            }
            Err(e) => {
                tracing::warn!(error = %e, "login rejected");
                notifier.show_error(LOGIN_FAILED);
                LoginOutcome::Failed(e)
            }
        }
    }
}
