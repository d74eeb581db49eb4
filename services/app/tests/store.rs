//! Integration tests for the SQLite-backed `StorageService` adapter, run
//! against an in-memory database.

use app_lib::adapters::store::SqliteStore;
use chrono::Utc;
use coursepilot_core::domain::{
    Course, CourseModule, Folder, KnowledgeLevel, Lesson, Project, ProjectStep,
};
use coursepilot_core::ports::StorageService;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

async fn store() -> SqliteStore {
    // A single connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SqliteStore::new(pool);
    store.run_migrations().await.unwrap();
    store
}

fn sample_course() -> Course {
    Course {
        id: Uuid::new_v4(),
        title: "Introduction to Photosynthesis".to_string(),
        topic: "Photosynthesis".to_string(),
        level: KnowledgeLevel::Beginner,
        modules: vec![CourseModule {
            id: Uuid::new_v4(),
            title: "Fundamentals".to_string(),
            lessons: vec![Lesson {
                id: Uuid::new_v4(),
                title: "Overview".to_string(),
                content: "Plants turn light into sugar.".to_string(),
                notes: None,
                flashcards: None,
            }],
        }],
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn courses_round_trip_through_the_store() {
    let store = store().await;
    let course = sample_course();

    store.save_course(&course).await.unwrap();
    let loaded = store.load_courses().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, course.id);
    assert_eq!(loaded[0].modules[0].lessons[0].title, "Overview");

    // Saving again overwrites instead of duplicating.
    let mut renamed = course.clone();
    renamed.title = "Photosynthesis, revisited".to_string();
    store.save_course(&renamed).await.unwrap();
    let loaded = store.load_courses().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "Photosynthesis, revisited");

    store.delete_course(course.id).await.unwrap();
    assert!(store.load_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn folders_are_replaced_as_a_whole_set() {
    let store = store().await;
    let folder_a = Folder {
        id: Uuid::new_v4(),
        name: "A".to_string(),
        course_ids: vec![Uuid::new_v4()],
    };
    let folder_b = Folder {
        id: Uuid::new_v4(),
        name: "B".to_string(),
        course_ids: vec![],
    };

    store
        .save_folders(&[folder_a.clone(), folder_b.clone()])
        .await
        .unwrap();
    assert_eq!(store.load_folders().await.unwrap().len(), 2);

    // Writing a smaller set drops the missing folder.
    store.save_folders(&[folder_b.clone()]).await.unwrap();
    let loaded = store.load_folders().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, folder_b.id);
}

#[tokio::test]
async fn toggle_lesson_is_a_read_modify_write_round_trip() {
    let store = store().await;
    let course_id = Uuid::new_v4();
    let lesson_id = Uuid::new_v4();

    let record = store
        .toggle_lesson(course_id, lesson_id, Utc::now())
        .await
        .unwrap();
    assert!(record.completed.contains_key(&lesson_id));

    // The write is visible to a fresh load.
    let loaded = store.load_course_progress().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded[0].completed.contains_key(&lesson_id));

    // Toggling again removes the entry.
    let record = store
        .toggle_lesson(course_id, lesson_id, Utc::now())
        .await
        .unwrap();
    assert!(record.completed.is_empty());

    store.delete_course_progress(course_id).await.unwrap();
    assert!(store.load_course_progress().await.unwrap().is_empty());
}

#[tokio::test]
async fn toggle_step_flips_project_progress() {
    let store = store().await;
    let project = Project {
        id: Uuid::new_v4(),
        title: "Build a demo".to_string(),
        topic: "Sourdough".to_string(),
        steps: vec![ProjectStep {
            id: Uuid::new_v4(),
            title: "Set up".to_string(),
            description: "Prepare.".to_string(),
        }],
        created_at: Utc::now(),
    };
    store.save_project(&project).await.unwrap();

    let step_id = project.steps[0].id;
    let record = store.toggle_step(project.id, step_id).await.unwrap();
    assert_eq!(record.completed.get(&step_id), Some(&true));

    let record = store.toggle_step(project.id, step_id).await.unwrap();
    assert!(record.completed.is_empty());

    store.delete_project(project.id).await.unwrap();
    store.delete_project_progress(project.id).await.unwrap();
    assert!(store.load_projects().await.unwrap().is_empty());
    assert!(store.load_project_progress().await.unwrap().is_empty());
}

#[tokio::test]
async fn collections_do_not_bleed_into_each_other() {
    let store = store().await;
    let course = sample_course();
    store.save_course(&course).await.unwrap();

    // Same id in a different collection must not collide.
    store
        .toggle_lesson(course.id, Uuid::new_v4(), Utc::now())
        .await
        .unwrap();

    assert_eq!(store.load_courses().await.unwrap().len(), 1);
    assert_eq!(store.load_course_progress().await.unwrap().len(), 1);

    store.delete_course_progress(course.id).await.unwrap();
    assert_eq!(store.load_courses().await.unwrap().len(), 1);
}
