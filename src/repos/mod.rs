pub mod error;
pub mod todo_repo;

pub use error::{RepoError, RepoResult};
pub use todo_repo::{PgTodoRepo, TodoRow, TodoStore, TodoUpdate};
