use crate::auth::session::{self, AuthSession};
use crate::dto::{LoginForm, PostForm, RegisterForm};
use crate::{AppState, SharedData, domain};
use axum::Router;
use axum::extract::{Form, Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use std::sync::Arc;
use tracing::{error, info};
use validator::Validate;

/// Adds the server-rendered routes to the application router
pub fn page_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route("/", get(home))
        .route("/register", get(show_register).post(handle_register))
        .route("/login", get(show_login).post(handle_login))
        .route("/logout", get(logout))
        .route("/dashboard", get(dashboard))
        .route("/create_post", get(show_create_post).post(handle_create_post))
        .route("/post/:post_id", get(view_post))
}

/// Error wrapper for page handlers. Missing data renders the 404 page; everything
/// else is logged and renders the 500 page.
#[derive(Debug)]
pub struct PageError(pub domain::Error);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self.0 {
            domain::Error::DoesNotExist => {
                (StatusCode::NOT_FOUND, render::not_found_page()).into_response()
            }
            other => {
                error!("Page request failed: {other}");
                (StatusCode::INTERNAL_SERVER_ERROR, render::error_page()).into_response()
            }
        }
    }
}

impl From<domain::Error> for PageError {
    fn from(value: domain::Error) -> Self {
        Self(value)
    }
}

/// The front page: the newest posts, visible without logging in.
async fn home(State(shared): AppState) -> Result<Html<String>, PageError> {
    let posts = domain::post::front_page_posts(&*shared.store).await?;
    Ok(render::home_page(&posts))
}

async fn show_register() -> Html<String> {
    render::register_page(None)
}

/// Creates the account, or re-renders the form when the input is empty or the
/// username is taken.
async fn handle_register(
    State(shared): AppState,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    info!("Attempt to register user: {form}");
    if form.validate().is_err() {
        return Ok(render::register_page(Some("Username and password are required.")).into_response());
    }

    match domain::user::register(&form.into_new_user(), &*shared.store).await {
        Ok(_) => Ok(Redirect::to("/login").into_response()),
        Err(domain::Error::Duplicate) => {
            Ok(render::register_page(Some("That username is already taken.")).into_response())
        }
        Err(other) => Err(PageError(other)),
    }
}

async fn show_login() -> Html<String> {
    render::login_page(None)
}

/// Checks the credentials and opens a session. A failed match re-renders the form
/// with one message no matter which field was wrong.
async fn handle_login(
    State(shared): AppState,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    info!("Login attempt for user: {}", form.username);
    let matched_user = domain::user::authenticate(&form.into(), &*shared.store).await?;

    let Some(user) = matched_user else {
        return Ok(render::login_page(Some("Invalid credentials.")).into_response());
    };

    let token = shared.sessions.issue(AuthSession {
        user_id: user.id,
        username: user.username,
    });

    Ok((
        AppendHeaders([(SET_COOKIE, session::session_cookie(&token))]),
        Redirect::to("/dashboard"),
    )
        .into_response())
}

/// Ends the session server-side and clears the cookie, no matter whether one was
/// active.
async fn logout(State(shared): AppState, headers: HeaderMap) -> Response {
    if let Some(token) = session::session_token(&headers) {
        shared.sessions.revoke(token);
    }

    (
        AppendHeaders([(SET_COOKIE, session::clear_session_cookie())]),
        Redirect::to("/"),
    )
        .into_response()
}

/// The logged-in user's posts and todos, newest first.
async fn dashboard(
    session: AuthSession,
    State(shared): AppState,
) -> Result<Html<String>, PageError> {
    let posts = domain::post::posts_authored_by(session.user_id, &*shared.store).await?;
    let todos = domain::todo::todos_owned_by(session.user_id, &*shared.store).await?;

    Ok(render::dashboard_page(&session.username, &posts, &todos))
}

async fn show_create_post(_session: AuthSession) -> Html<String> {
    render::create_post_page(None)
}

/// Writes a post attributed to the logged-in user, or re-renders the composer when a
/// field is empty.
async fn handle_create_post(
    session: AuthSession,
    State(shared): AppState,
    Form(form): Form<PostForm>,
) -> Result<Response, PageError> {
    info!("User {} is creating a post", session.user_id);
    if form.validate().is_err() {
        return Ok(render::create_post_page(Some("Title and content are required.")).into_response());
    }

    domain::post::create_post(session.user_id, &form.into(), &*shared.store).await?;

    Ok(Redirect::to("/dashboard").into_response())
}

/// A single post. Unknown ids bounce back to the front page.
async fn view_post(State(shared): AppState, Path(post_id): Path<i32>) -> Result<Response, PageError> {
    match domain::post::post_details(post_id, &*shared.store).await {
        Ok(post) => Ok(render::post_page(&post).into_response()),
        Err(domain::Error::DoesNotExist) => Ok(Redirect::to("/").into_response()),
        Err(other) => Err(PageError(other)),
    }
}

/// Fallback for routes that don't exist.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, render::not_found_page())
}

/// Minimal inline markup for the handful of pages the app serves. Kept deliberately
/// plain; the data contracts live in the handlers, not in the markup.
mod render {
    use crate::domain::post::{Post, PostWithAuthor};
    use crate::domain::todo::TodoItem;
    use axum::response::Html;
    use chrono::NaiveDateTime;
    use std::fmt::Write;

    fn page(title: &str, body: &str) -> Html<String> {
        Html(format!(
            "<!DOCTYPE html>\n<html>\n<head><title>{} - microblog</title></head>\n<body>\n\
             <nav><a href=\"/\">Home</a> <a href=\"/dashboard\">Dashboard</a> \
             <a href=\"/create_post\">New post</a> <a href=\"/logout\">Log out</a></nav>\n\
             {}\n</body>\n</html>\n",
            escape(title),
            body
        ))
    }

    /// Escapes text interpolated into markup. User-supplied titles, contents and
    /// usernames all pass through here.
    fn escape(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                other => escaped.push(other),
            }
        }
        escaped
    }

    fn timestamp(moment: &NaiveDateTime) -> String {
        moment.format("%d.%m.%Y %H:%M").to_string()
    }

    fn error_banner(message: Option<&str>) -> String {
        match message {
            Some(text) => format!("<p class=\"error\">{}</p>\n", escape(text)),
            None => String::new(),
        }
    }

    pub fn home_page(posts: &[PostWithAuthor]) -> Html<String> {
        let mut body = String::from("<h1>Latest posts</h1>\n");
        if posts.is_empty() {
            body.push_str("<p>Nothing here yet.</p>\n");
        }
        for post in posts {
            write!(
                body,
                "<article><h2><a href=\"/post/{}\">{}</a></h2>\
                 <p>by {} on {}</p></article>\n",
                post.id,
                escape(&post.title),
                escape(&post.author),
                timestamp(&post.created_at),
            )
            .expect("writing to a string cannot fail");
        }
        page("Home", &body)
    }

    pub fn register_page(error: Option<&str>) -> Html<String> {
        let body = format!(
            "<h1>Register</h1>\n{}\
             <form method=\"post\" action=\"/register\">\n\
             <input name=\"username\" placeholder=\"Username\">\n\
             <input name=\"password\" type=\"password\" placeholder=\"Password\">\n\
             <input name=\"email\" type=\"email\" placeholder=\"Email (optional)\">\n\
             <button type=\"submit\">Register</button>\n</form>\n",
            error_banner(error)
        );
        page("Register", &body)
    }

    pub fn login_page(error: Option<&str>) -> Html<String> {
        let body = format!(
            "<h1>Log in</h1>\n{}\
             <form method=\"post\" action=\"/login\">\n\
             <input name=\"username\" placeholder=\"Username\">\n\
             <input name=\"password\" type=\"password\" placeholder=\"Password\">\n\
             <button type=\"submit\">Log in</button>\n</form>\n",
            error_banner(error)
        );
        page("Log in", &body)
    }

    pub fn create_post_page(error: Option<&str>) -> Html<String> {
        let body = format!(
            "<h1>New post</h1>\n{}\
             <form method=\"post\" action=\"/create_post\">\n\
             <input name=\"title\" placeholder=\"Title\">\n\
             <textarea name=\"content\" placeholder=\"Content\"></textarea>\n\
             <button type=\"submit\">Publish</button>\n</form>\n",
            error_banner(error)
        );
        page("New post", &body)
    }

    pub fn post_page(post: &PostWithAuthor) -> Html<String> {
        let body = format!(
            "<article><h1>{}</h1><p>by {} on {}</p><div>{}</div></article>\n",
            escape(&post.title),
            escape(&post.author),
            timestamp(&post.created_at),
            escape(&post.content),
        );
        page(&post.title, &body)
    }

    pub fn dashboard_page(username: &str, posts: &[Post], todos: &[TodoItem]) -> Html<String> {
        let mut body = format!("<h1>Welcome, {}</h1>\n<h2>Your posts</h2>\n<ul>\n", escape(username));
        for post in posts {
            write!(
                body,
                "<li><a href=\"/post/{}\">{}</a> ({})</li>\n",
                post.id,
                escape(&post.title),
                timestamp(&post.created_at),
            )
            .expect("writing to a string cannot fail");
        }
        body.push_str("</ul>\n<h2>Your todos</h2>\n<ul>\n");
        for todo in todos {
            write!(
                body,
                "<li>{} {}</li>\n",
                if todo.completed { "[x]" } else { "[ ]" },
                escape(&todo.task),
            )
            .expect("writing to a string cannot fail");
        }
        body.push_str("</ul>\n");
        page("Dashboard", &body)
    }

    pub fn not_found_page() -> Html<String> {
        page("Not found", "<h1>404</h1>\n<p>That page does not exist.</p>\n")
    }

    pub fn error_page() -> Html<String> {
        page(
            "Something went wrong",
            "<h1>500</h1>\n<p>Something went wrong on our end.</p>\n",
        )
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn escape_neutralizes_markup() {
            assert_eq!(
                escape("<script>alert(\"x\") & more</script>"),
                "&lt;script&gt;alert(&quot;x&quot;) &amp; more&lt;/script&gt;"
            );
        }

        #[test]
        fn escape_leaves_plain_text_alone() {
            assert_eq!(escape("buy milk"), "buy milk");
        }
    }
}
