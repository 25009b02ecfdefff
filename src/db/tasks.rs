//! Task CRUD operations.

use super::Database;
use crate::error::{StoreError, StoreResult};
use crate::types::{Task, TaskId, TaskPatch};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

const TASK_SELECT_SQL: &str = "SELECT id, title, completed FROM tasks";

/// Persistence operations for tasks.
///
/// Every mutating call commits before returning.
pub trait TaskStore: Send + Sync {
    /// All tasks, newest id first.
    fn list_tasks(&self) -> StoreResult<Vec<Task>>;

    /// Insert a task with the trimmed title and `completed = false`.
    fn create_task(&self, title: &str) -> StoreResult<Task>;

    fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Apply the supplied fields of `patch` to an existing task.
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> StoreResult<Task>;

    fn delete_task(&self, id: TaskId) -> StoreResult<()>;
}

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        completed: row.get("completed")?,
    })
}

fn get_task_internal(conn: &Connection, id: TaskId) -> StoreResult<Option<Task>> {
    let task = conn
        .query_row(
            &format!("{TASK_SELECT_SQL} WHERE id = ?1"),
            params![id],
            parse_task_row,
        )
        .optional()?;
    Ok(task)
}

impl TaskStore for Database {
    fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} ORDER BY id DESC"))?;
            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    fn create_task(&self, title: &str) -> StoreResult<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (title, completed) VALUES (?1, 0)",
                params![title],
            )?;
            let id = conn.last_insert_rowid();
            debug!(task_id = id, "Created task");
            Ok(Task {
                id,
                title: title.to_string(),
                completed: false,
            })
        })
    }

    fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, id))
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> StoreResult<Task> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let mut task = get_task_internal(&tx, id)?.ok_or(StoreError::NotFound(id))?;
            patch.apply(&mut task);

            tx.execute(
                "UPDATE tasks SET title = ?1, completed = ?2 WHERE id = ?3",
                params![task.title, task.completed, id],
            )?;
            tx.commit()?;

            debug!(task_id = id, completed = task.completed, "Updated task");
            Ok(task)
        })
    }

    fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            if deleted == 0 {
                return Err(StoreError::NotFound(id));
            }
            debug!(task_id = id, "Deleted task");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_rows(db: &Database) -> i64 {
        db.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM tasks", [], |r| r.get(0))?))
            .unwrap()
    }

    #[test]
    fn create_rejects_blank_title_without_writing() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(db.create_task(""), Err(StoreError::EmptyTitle)));
        assert!(matches!(db.create_task(" \t\n"), Err(StoreError::EmptyTitle)));
        assert_eq!(count_rows(&db), 0);
    }

    #[test]
    fn schema_rejects_blank_title_written_directly() {
        let db = Database::open_in_memory().unwrap();
        let result = db.with_conn(|conn| {
            conn.execute("INSERT INTO tasks (title) VALUES ('  ')", [])?;
            Ok(())
        });
        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[test]
    fn update_runs_in_single_transaction() {
        let db = Database::open_in_memory().unwrap();
        let task = db.create_task("Walk dog").unwrap();
        let updated = db
            .update_task(
                task.id,
                &TaskPatch {
                    title: Some("Walk the dog".into()),
                    completed: Some(true),
                },
            )
            .unwrap();
        assert_eq!(db.get_task(task.id).unwrap(), Some(updated));
    }
}
