/*
 * Responsibility
 * - Todo request/response DTOs (camelCase on the wire)
 * - validate() for shape checks before touching the store
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::{TodoRow, TodoUpdate};

const MAX_NAME_LEN: usize = 256;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub name: String,
    pub due_date: String,
}

impl CreateTodoRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err("name must be <= 256 chars");
        }
        if self.due_date.trim().is_empty() {
            return Err("dueDate is required");
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub name: Option<String>,
    pub due_date: Option<String>,
    pub done: Option<bool>,
}

impl UpdateTodoRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.is_none() && self.due_date.is_none() && self.done.is_none() {
            return Err("nothing to update");
        }
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(name) = &self.name
            && name.len() > MAX_NAME_LEN
        {
            return Err("name must be <= 256 chars");
        }
        if let Some(due_date) = &self.due_date
            && due_date.trim().is_empty()
        {
            return Err("dueDate cannot be empty");
        }
        Ok(())
    }

    pub fn into_update(self) -> TodoUpdate {
        TodoUpdate {
            name: self.name,
            due_date: self.due_date,
            done: self.done,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub todo_id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub due_date: String,
    pub done: bool,
    pub attachment_url: Option<String>,
}

impl From<TodoRow> for TodoResponse {
    fn from(row: TodoRow) -> Self {
        Self {
            todo_id: row.todo_id,
            user_id: row.user_id,
            created_at: row.created_at,
            name: row.name,
            due_date: row.due_date,
            done: row.done,
            attachment_url: row.attachment_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TodoItemResponse {
    pub item: TodoResponse,
}

#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub items: Vec<TodoResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_name_and_due_date() {
        let req: CreateTodoRequest =
            serde_json::from_str(r#"{"name":"  ","dueDate":"2026-11-01"}"#).unwrap();
        assert_eq!(req.validate(), Err("name is required"));

        let req: CreateTodoRequest =
            serde_json::from_str(r#"{"name":"Buy milk","dueDate":"2026-11-01"}"#).unwrap();
        assert_eq!(req.validate(), Ok(()));
    }

    #[test]
    fn update_rejects_empty_patch() {
        let req: UpdateTodoRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.validate(), Err("nothing to update"));

        let req: UpdateTodoRequest = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert_eq!(req.validate(), Ok(()));
        assert_eq!(
            req.into_update(),
            TodoUpdate {
                done: Some(true),
                ..TodoUpdate::default()
            }
        );
    }

    #[test]
    fn response_uses_camel_case() {
        let row = TodoRow {
            user_id: "user123".into(),
            todo_id: Uuid::nil(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            name: "Buy milk".into(),
            due_date: "2026-11-01".into(),
            done: false,
            attachment_url: None,
        };
        let json = serde_json::to_value(TodoResponse::from(row)).unwrap();

        assert_eq!(json["todoId"], Uuid::nil().to_string());
        assert_eq!(json["dueDate"], "2026-11-01");
        assert_eq!(json["attachmentUrl"], serde_json::Value::Null);
    }
}
