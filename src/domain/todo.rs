use crate::domain::{Error, StoreError};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// A todo list entry. Only the owner can see or touch it; every query against the
/// store carries the owner filter alongside the id.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct TodoItem {
    pub id: i32,
    pub task: String,
    pub completed: bool,
    pub owner_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[cfg_attr(test, derive(Clone))]
pub struct NewTodo {
    pub task: String,
}

/// Storage port for todo rows. The mutating operations filter on id AND owner in one
/// statement; a non-matching pair affects zero rows and still returns Ok.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert_todo(&self, owner_id: i32, new_todo: &NewTodo) -> Result<i32, StoreError>;

    /// All of one user's todos, newest first.
    async fn todos_for_owner(&self, owner_id: i32) -> Result<Vec<TodoItem>, StoreError>;

    async fn set_todo_completed(
        &self,
        todo_id: i32,
        owner_id: i32,
        completed: bool,
    ) -> Result<(), StoreError>;

    async fn delete_todo(&self, todo_id: i32, owner_id: i32) -> Result<(), StoreError>;
}

/// The acting user's todos, newest first.
pub async fn todos_owned_by(
    owner_id: i32,
    todos: &(impl TodoStore + ?Sized),
) -> Result<Vec<TodoItem>, Error> {
    todos
        .todos_for_owner(owner_id)
        .await
        .map_err(|err| err.into_error_trying_to("fetch a user's todos"))
}

/// Adds a todo owned by the acting user. New entries start uncompleted.
pub async fn create_todo(
    owner_id: i32,
    new_todo: &NewTodo,
    todos: &(impl TodoStore + ?Sized),
) -> Result<i32, Error> {
    todos
        .insert_todo(owner_id, new_todo)
        .await
        .map_err(|err| err.into_error_trying_to("create a todo"))
}

/// Sets the completion flag on one of the acting user's todos. An id that doesn't
/// exist or belongs to someone else matches nothing and the call still succeeds, so a
/// caller probing foreign ids learns nothing from the result.
pub async fn set_completed(
    owner_id: i32,
    todo_id: i32,
    completed: bool,
    todos: &(impl TodoStore + ?Sized),
) -> Result<(), Error> {
    todos
        .set_todo_completed(todo_id, owner_id, completed)
        .await
        .map_err(|err| err.into_error_trying_to("update a todo"))
}

/// Deletes one of the acting user's todos. Same silent no-match policy as
/// [set_completed].
pub async fn remove_todo(
    owner_id: i32,
    todo_id: i32,
    todos: &(impl TodoStore + ?Sized),
) -> Result<(), Error> {
    todos
        .delete_todo(todo_id, owner_id)
        .await
        .map_err(|err| err.into_error_trying_to("delete a todo"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_util::InMemoryStore;
    use speculoos::prelude::*;

    fn task(description: &str) -> NewTodo {
        NewTodo {
            task: description.to_owned(),
        }
    }

    mod create_and_list {
        use super::*;

        #[tokio::test]
        async fn new_todos_start_uncompleted() {
            let store = InMemoryStore::new();
            let ada = store.seed_user("ada", "pw");

            create_todo(ada, &task("buy milk"), &store)
                .await
                .expect("create failed");

            let todos = todos_owned_by(ada, &store).await.expect("list failed");
            assert_that!(todos).matches(|items| {
                matches!(items.as_slice(), [TodoItem { task, completed: false, .. }] if task == "buy milk")
            });
        }

        #[tokio::test]
        async fn lists_newest_first_and_only_the_owners() {
            let store = InMemoryStore::new();
            let ada = store.seed_user("ada", "pw");
            let grace = store.seed_user("grace", "pw");

            create_todo(ada, &task("first"), &store).await.expect("create failed");
            create_todo(ada, &task("second"), &store).await.expect("create failed");
            create_todo(grace, &task("hers"), &store).await.expect("create failed");

            let todos = todos_owned_by(ada, &store).await.expect("list failed");
            let tasks: Vec<&str> = todos.iter().map(|item| item.task.as_str()).collect();
            assert_eq!(tasks, ["second", "first"]);
        }

        #[tokio::test]
        async fn propagates_port_error() {
            let store = InMemoryStore::new();
            store.disconnect();

            let result = todos_owned_by(1, &store).await;
            assert_that!(result)
                .is_err()
                .matches(|err| matches!(err, Error::RetrieveFailure { .. }));
        }
    }

    mod set_completed {
        use super::*;

        #[tokio::test]
        async fn owner_can_toggle_completion() {
            let store = InMemoryStore::new();
            let ada = store.seed_user("ada", "pw");
            let todo_id = create_todo(ada, &task("buy milk"), &store)
                .await
                .expect("create failed");

            set_completed(ada, todo_id, true, &store)
                .await
                .expect("update failed");

            let todos = todos_owned_by(ada, &store).await.expect("list failed");
            assert_that!(todos).matches(|items| {
                matches!(items.as_slice(), [TodoItem { completed: true, .. }])
            });
        }

        #[tokio::test]
        async fn foreign_todo_is_untouched_but_the_call_succeeds() {
            let store = InMemoryStore::new();
            let ada = store.seed_user("ada", "pw");
            let grace = store.seed_user("grace", "pw");
            let adas_todo = create_todo(ada, &task("buy milk"), &store)
                .await
                .expect("create failed");

            let outcome = set_completed(grace, adas_todo, true, &store).await;
            assert_that!(outcome).is_ok();

            let todos = todos_owned_by(ada, &store).await.expect("list failed");
            assert_that!(todos).matches(|items| {
                matches!(items.as_slice(), [TodoItem { completed: false, .. }])
            });
        }
    }

    mod remove_todo {
        use super::*;

        #[tokio::test]
        async fn owner_can_delete() {
            let store = InMemoryStore::new();
            let ada = store.seed_user("ada", "pw");
            let todo_id = create_todo(ada, &task("buy milk"), &store)
                .await
                .expect("create failed");

            remove_todo(ada, todo_id, &store).await.expect("delete failed");

            assert_that!(todos_owned_by(ada, &store).await.expect("list failed")).is_empty();
        }

        #[tokio::test]
        async fn foreign_todo_survives_but_the_call_succeeds() {
            let store = InMemoryStore::new();
            let ada = store.seed_user("ada", "pw");
            let grace = store.seed_user("grace", "pw");
            let adas_todo = create_todo(ada, &task("buy milk"), &store)
                .await
                .expect("create failed");

            let outcome = remove_todo(grace, adas_todo, &store).await;
            assert_that!(outcome).is_ok();

            assert_that!(todos_owned_by(ada, &store).await.expect("list failed")).has_length(1);
        }
    }
}
