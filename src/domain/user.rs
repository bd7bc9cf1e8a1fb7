use crate::auth::password;
use crate::domain::{Error, StoreError};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// A registered account. The password digest deliberately never leaves the store
/// through this type.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Data for a new registration. The password is still plaintext here; [register]
/// digests it before anything is handed to the store.
#[cfg_attr(test, derive(Clone))]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

/// A login attempt.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Storage port for user rows. Usernames are unique at the store level; inserting a
/// duplicate must surface [StoreError::DuplicateKey], not a backend-specific failure.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(
        &self,
        username: &str,
        password_digest: &str,
        email: Option<&str>,
    ) -> Result<i32, StoreError>;

    /// Finds the user matching both username and digest in a single lookup. A miss on
    /// either field produces the same None, so callers cannot tell which one was wrong.
    async fn user_by_credentials(
        &self,
        username: &str,
        password_digest: &str,
    ) -> Result<Option<User>, StoreError>;
}

/// Creates a new account with the digested password. A taken username comes back as
/// [Error::Duplicate] with no row written.
pub async fn register(new_user: &NewUser, users: &(impl UserStore + ?Sized)) -> Result<i32, Error> {
    let digest = password::digest(&new_user.password);
    let user_id = users
        .insert_user(&new_user.username, &digest, new_user.email.as_deref())
        .await
        .map_err(|err| err.into_error_trying_to("create a new user"))?;

    Ok(user_id)
}

/// Checks a login attempt against the store. Returns the matched user, or None when
/// the credentials don't line up.
pub async fn authenticate(
    credentials: &Credentials,
    users: &(impl UserStore + ?Sized),
) -> Result<Option<User>, Error> {
    let digest = password::digest(&credentials.password);
    users
        .user_by_credentials(&credentials.username, &digest)
        .await
        .map_err(|err| err.into_error_trying_to("look up a user by credentials"))
}
