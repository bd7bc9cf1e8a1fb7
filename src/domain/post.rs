use crate::domain::{Error, StoreError};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// How many posts the front page shows.
pub const FRONT_PAGE_POST_COUNT: i64 = 5;

/// A blog post as stored. Posts are immutable once written; there is no update or
/// delete path.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

/// A post joined with its author's username, for the listing and detail views.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct PostWithAuthor {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: NaiveDateTime,
}

#[cfg_attr(test, derive(Clone))]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

/// Storage port for post rows.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, author_id: i32, post: &NewPost) -> Result<i32, StoreError>;

    /// The newest posts joined with their authors, capped at [limit], newest first.
    async fn recent_posts_with_authors(
        &self,
        limit: i64,
    ) -> Result<Vec<PostWithAuthor>, StoreError>;

    async fn post_with_author(&self, post_id: i32) -> Result<Option<PostWithAuthor>, StoreError>;

    /// All posts written by one author, newest first.
    async fn posts_by_author(&self, author_id: i32) -> Result<Vec<Post>, StoreError>;
}

/// The posts shown to everyone on the front page, authenticated or not.
pub async fn front_page_posts(
    posts: &(impl PostStore + ?Sized),
) -> Result<Vec<PostWithAuthor>, Error> {
    posts
        .recent_posts_with_authors(FRONT_PAGE_POST_COUNT)
        .await
        .map_err(|err| err.into_error_trying_to("fetch the front page posts"))
}

/// Writes a new post attributed to the acting user.
pub async fn create_post(
    author_id: i32,
    new_post: &NewPost,
    posts: &(impl PostStore + ?Sized),
) -> Result<i32, Error> {
    posts
        .insert_post(author_id, new_post)
        .await
        .map_err(|err| err.into_error_trying_to("create a post"))
}

/// A single post with its author, or [Error::DoesNotExist].
pub async fn post_details(
    post_id: i32,
    posts: &(impl PostStore + ?Sized),
) -> Result<PostWithAuthor, Error> {
    let post = posts
        .post_with_author(post_id)
        .await
        .map_err(|err| err.into_error_trying_to("fetch a post"))?;

    post.ok_or(Error::DoesNotExist)
}

/// Every post the given user has written, newest first.
pub async fn posts_authored_by(
    author_id: i32,
    posts: &(impl PostStore + ?Sized),
) -> Result<Vec<Post>, Error> {
    posts
        .posts_by_author(author_id)
        .await
        .map_err(|err| err.into_error_trying_to("fetch a user's posts"))
}
