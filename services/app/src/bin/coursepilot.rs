//! services/app/src/bin/coursepilot.rs
//!
//! Wires the adapters to the orchestrator and drives it from a small
//! line-oriented console. The console is a stand-in front end: the real
//! view layer is out of scope, so it renders from `App::snapshot()` and
//! receives transitions through `TracingViewSink`.

use app_lib::{
    adapters::{
        assessment_llm::OpenAiAssessmentAdapter, course_llm::OpenAiCourseAdapter,
        explore_llm::OpenAiExploreAdapter, flashcards_llm::OpenAiFlashcardAdapter,
        store::SqliteStore, tutor_llm::OpenAiTutorAdapter,
    },
    app::{App, Services, TracingViewSink},
    config::Config,
    error::AppError,
};
use async_openai::{config::OpenAIConfig, Client};
use coursepilot_core::domain::{Course, KnowledgeLevel};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting CoursePilot...");

    // --- 2. Open the Local Store & Run Migrations ---
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(SqliteStore::new(pool));
    store.run_migrations().await?;
    info!("Store ready at {}.", config.database_url);

    // --- 3. Initialize Generation Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| AppError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let services = Arc::new(Services {
        store,
        courses: Arc::new(OpenAiCourseAdapter::new(
            openai_client.clone(),
            config.course_model.clone(),
        )),
        flashcards: Arc::new(OpenAiFlashcardAdapter::new(
            openai_client.clone(),
            config.flashcard_model.clone(),
        )),
        explore: Arc::new(OpenAiExploreAdapter::new(
            openai_client.clone(),
            config.explore_model.clone(),
        )),
        assessments: Arc::new(OpenAiAssessmentAdapter::new(
            openai_client.clone(),
            config.test_model.clone(),
        )),
        tutor: Arc::new(OpenAiTutorAdapter::new(
            openai_client,
            config.tutor_model.clone(),
        )),
    });

    // --- 4. Hydrate the Orchestrator ---
    let app = App::load(services, Arc::new(TracingViewSink)).await?;

    // --- 5. Run the Console ---
    run_console(app).await
}

const HELP: &str = "\
Commands:
  course <beginner|intermediate|advanced> <topic>   generate a course
  project <topic>                                   generate a project scaffold
  list                                              list courses and projects
  toggle <course#> <lesson#>                        flip a lesson's completion
  step <project#> <step#>                           flip a step's completion
  cards <course#> <lesson#>                         generate flashcards for a lesson
  ask <course#> <lesson#>                           open a Socratic dialogue on a lesson
  say <text>                                        send a dialogue message
  bye                                               close the dialogue
  explore <topic>                                   suggest related topics
  test <course#>                                    generate a course test
  folder <name>                                     create a folder
  move <course#> <folder#>                          file a course into a folder
  delete <course#>                                  delete a course
  last                                              show the last active course
  quit";

async fn run_console(app: App) -> Result<(), AppError> {
    println!("CoursePilot console. Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => {}
            "help" => println!("{HELP}"),
            "quit" | "exit" => break,
            "course" => {
                let (level_str, topic) = rest.split_once(' ').unwrap_or((rest, ""));
                let level = match level_str {
                    "beginner" => KnowledgeLevel::Beginner,
                    "intermediate" => KnowledgeLevel::Intermediate,
                    "advanced" => KnowledgeLevel::Advanced,
                    _ => {
                        println!("Expected: course <beginner|intermediate|advanced> <topic>");
                        continue;
                    }
                };
                if topic.is_empty() {
                    println!("Expected a topic.");
                    continue;
                }
                app.generate_course(topic, level, None).await?;
                report(&app).await;
            }
            "project" => {
                if rest.is_empty() {
                    println!("Expected a topic.");
                    continue;
                }
                app.generate_project(rest).await?;
                report(&app).await;
            }
            "list" => {
                let data = app.snapshot().await;
                for (i, course) in data.courses.iter().enumerate() {
                    let folder = data
                        .folder_of(course.id)
                        .map(|f| format!(" [{}]", f.name))
                        .unwrap_or_default();
                    println!("course {}: {}{}", i + 1, course.title, folder);
                }
                for (i, project) in data.projects.iter().enumerate() {
                    println!("project {}: {}", i + 1, project.title);
                }
                for (i, folder) in data.folders.iter().enumerate() {
                    println!("folder {}: {} ({} courses)", i + 1, folder.name, folder.course_ids.len());
                }
            }
            "toggle" => {
                if let Some((course, lesson_id)) = pick_lesson(&app, rest).await {
                    app.toggle_lesson(course.id, lesson_id).await?;
                }
            }
            "step" => {
                let data = app.snapshot().await;
                if let Some((project, step_id)) = parse_two(rest).and_then(|(p, s)| {
                    let project = data.projects.get(p.checked_sub(1)?)?;
                    let step = project.steps.get(s.checked_sub(1)?)?;
                    Some((project.clone(), step.id))
                }) {
                    app.toggle_step(project.id, step_id).await?;
                } else {
                    println!("Expected: step <project#> <step#>");
                }
            }
            "cards" => {
                if let Some((course, lesson_id)) = pick_lesson(&app, rest).await {
                    app.generate_lesson_flashcards(course.id, lesson_id).await?;
                    report(&app).await;
                }
            }
            "ask" => {
                if let Some((course, lesson_id)) = pick_lesson(&app, rest).await {
                    let subject = course
                        .find_lesson(lesson_id)
                        .map(|l| l.content.clone())
                        .unwrap_or_default();
                    app.open_dialogue(&subject).await;
                    println!("Dialogue open. Use 'say <text>'.");
                }
            }
            "say" => {
                app.send_dialogue_message(rest).await;
                let data = app.snapshot().await;
                if let Some(turn) = data.dialogue.and_then(|d| d.turns.last().cloned()) {
                    println!("tutor: {}", turn.text);
                }
            }
            "bye" => app.close_dialogue().await,
            "explore" => {
                app.explore_related_topics(rest).await;
                let data = app.snapshot().await;
                if let Some(session) = data.explore {
                    for topic in session.results {
                        println!("{}: {}", topic.title, topic.description);
                    }
                }
            }
            "test" => {
                let data = app.snapshot().await;
                if let Some(course) = rest
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| data.courses.get(n.checked_sub(1)?))
                {
                    app.start_course_test(course.id).await;
                    if let Some(test) = app.take_pending_test().await {
                        println!("Generated a {}-question test.", test.questions.len());
                    }
                    report(&app).await;
                }
            }
            "folder" => {
                let folder = app.create_folder(rest).await?;
                println!("Created folder '{}'.", folder.name);
            }
            "move" => {
                let data = app.snapshot().await;
                if let Some((course_id, folder_id)) = parse_two(rest).and_then(|(c, f)| {
                    Some((
                        data.courses.get(c.checked_sub(1)?)?.id,
                        data.folders.get(f.checked_sub(1)?)?.id,
                    ))
                }) {
                    app.move_course_to_folder(course_id, Some(folder_id)).await?;
                } else {
                    println!("Expected: move <course#> <folder#>");
                }
            }
            "delete" => {
                let data = app.snapshot().await;
                if let Some(course) = rest
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| data.courses.get(n.checked_sub(1)?))
                {
                    app.delete_course(course.id).await?;
                }
            }
            "last" => {
                let data = app.snapshot().await;
                match app.last_active_course().await {
                    Some(id) => {
                        let title = data
                            .find_course(id)
                            .map(|c| c.title.as_str())
                            .unwrap_or("<unknown>");
                        println!("Last active: {title}");
                    }
                    None => println!("No activity yet."),
                }
            }
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
    }
    Ok(())
}

/// Prints the shared error slot if the last operation filled it.
async fn report(app: &App) {
    if let Some(error) = app.snapshot().await.error {
        println!("error: {error}");
    }
}

fn parse_two(rest: &str) -> Option<(usize, usize)> {
    let (a, b) = rest.split_once(' ')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

/// Resolves "course# lesson#" into the course and the lesson's id, counting
/// lessons in reading order across modules.
async fn pick_lesson(app: &App, rest: &str) -> Option<(Course, Uuid)> {
    let data = app.snapshot().await;
    let (c, l) = parse_two(rest).or_else(|| {
        println!("Expected: <course#> <lesson#>");
        None
    })?;
    let course = data.courses.get(c.checked_sub(1)?)?;
    let lesson = course
        .modules
        .iter()
        .flat_map(|m| m.lessons.iter())
        .nth(l.checked_sub(1)?)?;
    Some((course.clone(), lesson.id))
}
