//! services/app/src/adapters/store.rs
//!
//! This module contains the local store adapter, which is the concrete
//! implementation of the `StorageService` port from the `core` crate. All
//! collections live in a single SQLite key-value table; values are the
//! JSON-serialized domain records themselves.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coursepilot_core::domain::{Course, CourseProgress, Folder, Project, ProjectProgress};
use coursepilot_core::ports::{PortError, PortResult, StorageService};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

// Collection names used as the first half of the key.
const COURSES: &str = "courses";
const FOLDERS: &str = "folders";
const PROJECTS: &str = "projects";
const COURSE_PROGRESS: &str = "course_progress";
const PROJECT_PROGRESS: &str = "project_progress";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A SQLite-backed adapter that implements the `StorageService` port.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new `SqliteStore`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    //-------------------------------------------------------------------------------------
    // Generic key-value helpers shared by every collection
    //-------------------------------------------------------------------------------------

    async fn load_all<T: DeserializeOwned>(&self, collection: &str) -> PortResult<Vec<T>> {
        let rows: Vec<String> =
            sqlx::query_scalar("SELECT data FROM records WHERE collection = ? ORDER BY rowid")
                .bind(collection)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

        rows.iter()
            .map(|data| {
                serde_json::from_str(data).map_err(|e| PortError::Unexpected(e.to_string()))
            })
            .collect()
    }

    async fn get<T: DeserializeOwned>(&self, collection: &str, id: Uuid) -> PortResult<Option<T>> {
        let row: Option<String> =
            sqlx::query_scalar("SELECT data FROM records WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

        row.map(|data| {
            serde_json::from_str(&data).map_err(|e| PortError::Unexpected(e.to_string()))
        })
        .transpose()
    }

    async fn put<T: Serialize>(&self, collection: &str, id: Uuid, value: &T) -> PortResult<()> {
        let data =
            serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query(
            "INSERT INTO records (collection, id, data) VALUES (?, ?, ?) \
             ON CONFLICT (collection, id) DO UPDATE SET data = excluded.data",
        )
        .bind(collection)
        .bind(id.to_string())
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, collection: &str, id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM records WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(())
    }

    /// Replaces the entire contents of a collection in one transaction.
    /// Folders are always written as a whole set.
    async fn replace_all<T, F>(&self, collection: &str, items: &[T], id_of: F) -> PortResult<()>
    where
        T: Serialize,
        F: Fn(&T) -> Uuid,
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query("DELETE FROM records WHERE collection = ?")
            .bind(collection)
            .execute(&mut *tx)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        for item in items {
            let data =
                serde_json::to_string(item).map_err(|e| PortError::Unexpected(e.to_string()))?;
            sqlx::query("INSERT INTO records (collection, id, data) VALUES (?, ?, ?)")
                .bind(collection)
                .bind(id_of(item).to_string())
                .bind(data)
                .execute(&mut *tx)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

//=========================================================================================
// `StorageService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StorageService for SqliteStore {
    async fn load_courses(&self) -> PortResult<Vec<Course>> {
        self.load_all(COURSES).await
    }

    async fn save_course(&self, course: &Course) -> PortResult<()> {
        self.put(COURSES, course.id, course).await
    }

    async fn delete_course(&self, course_id: Uuid) -> PortResult<()> {
        self.remove(COURSES, course_id).await
    }

    async fn load_folders(&self) -> PortResult<Vec<Folder>> {
        self.load_all(FOLDERS).await
    }

    async fn save_folders(&self, folders: &[Folder]) -> PortResult<()> {
        self.replace_all(FOLDERS, folders, |f| f.id).await
    }

    async fn load_projects(&self) -> PortResult<Vec<Project>> {
        self.load_all(PROJECTS).await
    }

    async fn save_project(&self, project: &Project) -> PortResult<()> {
        self.put(PROJECTS, project.id, project).await
    }

    async fn delete_project(&self, project_id: Uuid) -> PortResult<()> {
        self.remove(PROJECTS, project_id).await
    }

    async fn load_course_progress(&self) -> PortResult<Vec<CourseProgress>> {
        self.load_all(COURSE_PROGRESS).await
    }

    async fn toggle_lesson(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
        now: DateTime<Utc>,
    ) -> PortResult<CourseProgress> {
        let mut record: CourseProgress = self
            .get(COURSE_PROGRESS, course_id)
            .await?
            .unwrap_or_else(|| CourseProgress::empty(course_id));

        if record.completed.remove(&lesson_id).is_none() {
            record.completed.insert(lesson_id, now);
        }

        self.put(COURSE_PROGRESS, course_id, &record).await?;
        Ok(record)
    }

    async fn delete_course_progress(&self, course_id: Uuid) -> PortResult<()> {
        self.remove(COURSE_PROGRESS, course_id).await
    }

    async fn load_project_progress(&self) -> PortResult<Vec<ProjectProgress>> {
        self.load_all(PROJECT_PROGRESS).await
    }

    async fn toggle_step(&self, project_id: Uuid, step_id: Uuid) -> PortResult<ProjectProgress> {
        let mut record: ProjectProgress = self
            .get(PROJECT_PROGRESS, project_id)
            .await?
            .unwrap_or_else(|| ProjectProgress::empty(project_id));

        if record.completed.remove(&step_id).is_none() {
            record.completed.insert(step_id, true);
        }

        self.put(PROJECT_PROGRESS, project_id, &record).await?;
        Ok(record)
    }

    async fn delete_project_progress(&self, project_id: Uuid) -> PortResult<()> {
        self.remove(PROJECT_PROGRESS, project_id).await
    }
}
