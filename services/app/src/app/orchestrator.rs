//! services/app/src/app/orchestrator.rs
//!
//! The application state orchestrator: one public operation per
//! user-initiated action. Each operation mutates the in-memory state,
//! persists what changed, and sequences generation calls with view
//! transitions. Generation failures are converted into the shared error
//! slot here and never reach the view layer as `Err`; storage failures
//! propagate as `PortError`.

use crate::app::state::{AppData, DialogueSession, ExploreSession, GenerationPhase, Services};
use crate::app::views::{View, ViewSink};
use chrono::Utc;
use coursepilot_core::domain::{
    ChatTurn, Course, CourseProgress, CourseTest, Folder, KnowledgeLevel, Project,
};
use coursepilot_core::ports::PortResult;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Shown in place of a tutor turn when dialogue generation fails.
const DIALOGUE_FALLBACK: &str =
    "I'm sorry, I lost my train of thought there. Could you say that again?";

/// The application orchestrator. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct App {
    services: Arc<Services>,
    data: Arc<Mutex<AppData>>,
    views: Arc<dyn ViewSink>,
}

impl App {
    /// Hydrates the in-memory state from storage and returns a ready app.
    pub async fn load(services: Arc<Services>, views: Arc<dyn ViewSink>) -> PortResult<Self> {
        let mut courses = services.store.load_courses().await?;
        let folders = services.store.load_folders().await?;
        let mut projects = services.store.load_projects().await?;

        // Lists are presented newest first.
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let course_progress = services
            .store
            .load_course_progress()
            .await?
            .into_iter()
            .map(|p| (p.course_id, p))
            .collect();
        let project_progress = services
            .store
            .load_project_progress()
            .await?
            .into_iter()
            .map(|p| (p.project_id, p))
            .collect();

        info!(
            "Loaded {} courses, {} folders, {} projects from storage.",
            courses.len(),
            folders.len(),
            projects.len()
        );

        Ok(Self {
            services,
            data: Arc::new(Mutex::new(AppData {
                courses,
                folders,
                projects,
                course_progress,
                project_progress,
                ..AppData::default()
            })),
            views,
        })
    }

    /// A read-only snapshot of the whole application state, for the view layer.
    pub async fn snapshot(&self) -> AppData {
        self.data.lock().await.clone()
    }

    //=====================================================================================
    // Course & Project Generation
    //=====================================================================================

    /// Generates a course for `topic`, optionally filing it into a folder.
    ///
    /// Transitions: `Generating` immediately, then `CourseDetail` on success
    /// or `Canvas` on generation failure (with the reason formatted into the
    /// shared error slot).
    pub async fn generate_course(
        &self,
        topic: &str,
        level: KnowledgeLevel,
        folder_id: Option<Uuid>,
    ) -> PortResult<()> {
        self.begin_generation(topic).await;

        match self.services.courses.generate_course(topic, level).await {
            Ok(course) => {
                let course_id = course.id;
                if let Err(e) = self.services.store.save_course(&course).await {
                    self.abort_generation(View::Canvas).await;
                    return Err(e);
                }

                let folders_to_save = {
                    let mut data = self.data.lock().await;
                    if let Some(folder_id) = folder_id {
                        if let Some(folder) =
                            data.folders.iter_mut().find(|f| f.id == folder_id)
                        {
                            folder.course_ids.push(course_id);
                        }
                    }
                    data.courses.insert(0, course);
                    data.active_course = Some(course_id);
                    data.phase = GenerationPhase::Idle;
                    folder_id.map(|_| data.folders.clone())
                };
                // The course is live in state either way, so the detail view
                // fires exactly once even if the membership write fails.
                let folder_write = match folders_to_save {
                    Some(folders) => self.services.store.save_folders(&folders).await,
                    None => Ok(()),
                };

                info!("Course {} generated for topic '{}'.", course_id, topic);
                self.views.transition(View::CourseDetail);
                folder_write?;
            }
            Err(e) => {
                let mut data = self.data.lock().await;
                data.error = Some(format!("Failed to generate course: {e}"));
                data.phase = GenerationPhase::Idle;
                drop(data);
                self.views.transition(View::Canvas);
            }
        }
        Ok(())
    }

    /// Generates a project scaffold for `topic`. Same state machine as
    /// course generation; failure lands back on the project list.
    pub async fn generate_project(&self, topic: &str) -> PortResult<()> {
        self.begin_generation(topic).await;

        match self.services.courses.generate_project(topic).await {
            Ok(project) => {
                let project_id = project.id;
                if let Err(e) = self.services.store.save_project(&project).await {
                    self.abort_generation(View::Projects).await;
                    return Err(e);
                }

                let mut data = self.data.lock().await;
                data.projects.insert(0, project);
                data.active_project = Some(project_id);
                data.phase = GenerationPhase::Idle;
                drop(data);

                info!("Project {} generated for topic '{}'.", project_id, topic);
                self.views.transition(View::ProjectDetail);
            }
            Err(e) => {
                let mut data = self.data.lock().await;
                data.error = Some(format!("Failed to generate project: {e}"));
                data.phase = GenerationPhase::Idle;
                drop(data);
                self.views.transition(View::Projects);
            }
        }
        Ok(())
    }

    /// Storage failed after a successful generation: return the state
    /// machine to idle and fall back to the given view, so the error can
    /// propagate without stranding the phase at `Generating`.
    async fn abort_generation(&self, fallback: View) {
        let mut data = self.data.lock().await;
        data.phase = GenerationPhase::Idle;
        drop(data);
        self.views.transition(fallback);
    }

    /// Shared entry of every course/project generation attempt: request the
    /// generating view, clear prior error, and fire the best-effort fun-fact
    /// fetch without waiting for it.
    async fn begin_generation(&self, topic: &str) {
        self.views.transition(View::Generating);
        {
            let mut data = self.data.lock().await;
            data.error = None;
            data.current_topic = topic.to_string();
            data.fun_facts.clear();
            data.phase = GenerationPhase::Generating;
        }

        let explore = self.services.explore.clone();
        let data = self.data.clone();
        let topic = topic.to_string();
        tokio::spawn(async move {
            match explore.fun_facts(&topic).await {
                Ok(facts) => data.lock().await.fun_facts = facts,
                // Decorative content: failure is logged and swallowed.
                Err(e) => warn!("Fun-fact generation failed (ignored): {e}"),
            }
        });
    }

    //=====================================================================================
    // Deletion (cascading)
    //=====================================================================================

    /// Deletes a course, its progress record, and every folder membership.
    /// Memory is mutated first; the storage writes follow per collection.
    pub async fn delete_course(&self, course_id: Uuid) -> PortResult<()> {
        let folders_to_save = {
            let mut data = self.data.lock().await;
            let before = data.courses.len();
            data.courses.retain(|c| c.id != course_id);
            if data.courses.len() == before {
                // Unknown id: no-op.
                return Ok(());
            }

            let mut membership_changed = false;
            for folder in &mut data.folders {
                let len = folder.course_ids.len();
                folder.course_ids.retain(|id| *id != course_id);
                membership_changed |= folder.course_ids.len() != len;
            }
            data.course_progress.remove(&course_id);
            if data.active_course == Some(course_id) {
                data.active_course = None;
            }
            membership_changed.then(|| data.folders.clone())
        };

        self.services.store.delete_course_progress(course_id).await?;
        self.services.store.delete_course(course_id).await?;
        if let Some(folders) = folders_to_save {
            self.services.store.save_folders(&folders).await?;
        }
        info!("Course {} deleted.", course_id);
        Ok(())
    }

    /// Deletes a project and its progress record.
    pub async fn delete_project(&self, project_id: Uuid) -> PortResult<()> {
        {
            let mut data = self.data.lock().await;
            let before = data.projects.len();
            data.projects.retain(|p| p.id != project_id);
            if data.projects.len() == before {
                return Ok(());
            }
            data.project_progress.remove(&project_id);
            if data.active_project == Some(project_id) {
                data.active_project = None;
            }
        }

        self.services.store.delete_project_progress(project_id).await?;
        self.services.store.delete_project(project_id).await?;
        info!("Project {} deleted.", project_id);
        Ok(())
    }

    //=====================================================================================
    // Folders
    //=====================================================================================

    pub async fn create_folder(&self, name: &str) -> PortResult<Folder> {
        let folder = Folder {
            id: Uuid::new_v4(),
            name: name.to_string(),
            course_ids: Vec::new(),
        };

        let folders = {
            let mut data = self.data.lock().await;
            data.folders.push(folder.clone());
            data.folders.clone()
        };
        self.services.store.save_folders(&folders).await?;
        Ok(folder)
    }

    pub async fn rename_folder(&self, folder_id: Uuid, name: &str) -> PortResult<()> {
        let folders = {
            let mut data = self.data.lock().await;
            let Some(folder) = data.folders.iter_mut().find(|f| f.id == folder_id) else {
                return Ok(());
            };
            folder.name = name.to_string();
            data.folders.clone()
        };
        self.services.store.save_folders(&folders).await
    }

    /// Deletes a folder. Its courses survive, merely unfiled.
    pub async fn delete_folder(&self, folder_id: Uuid) -> PortResult<()> {
        let folders = {
            let mut data = self.data.lock().await;
            let before = data.folders.len();
            data.folders.retain(|f| f.id != folder_id);
            if data.folders.len() == before {
                return Ok(());
            }
            data.folders.clone()
        };
        self.services.store.save_folders(&folders).await
    }

    /// Files a course into `folder_id`, or unfiles it when `None`. Prior
    /// memberships are stripped first, so a course id appears in at most
    /// one folder's list.
    pub async fn move_course_to_folder(
        &self,
        course_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> PortResult<()> {
        let folders = {
            let mut data = self.data.lock().await;
            if data.find_course(course_id).is_none() {
                return Ok(());
            }
            for folder in &mut data.folders {
                folder.course_ids.retain(|id| *id != course_id);
            }
            if let Some(folder_id) = folder_id {
                if let Some(folder) = data.folders.iter_mut().find(|f| f.id == folder_id) {
                    folder.course_ids.push(course_id);
                }
            }
            data.folders.clone()
        };
        self.services.store.save_folders(&folders).await
    }

    //=====================================================================================
    // Lessons: notes, progress, flashcards
    //=====================================================================================

    /// Attaches free-text notes to a lesson and re-persists the course.
    pub async fn save_lesson_notes(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
        notes: &str,
    ) -> PortResult<()> {
        let course_to_save = {
            let mut data = self.data.lock().await;
            let Some(course) = data.find_course_mut(course_id) else {
                return Ok(());
            };
            let Some(lesson) = course.find_lesson_mut(lesson_id) else {
                return Ok(());
            };
            lesson.notes = if notes.is_empty() {
                None
            } else {
                Some(notes.to_string())
            };
            course.clone()
        };
        self.services.store.save_course(&course_to_save).await
    }

    /// Flips a lesson's completion state via the store's read-modify-write
    /// toggle, then merges the updated record into memory.
    pub async fn toggle_lesson(&self, course_id: Uuid, lesson_id: Uuid) -> PortResult<()> {
        let updated = self
            .services
            .store
            .toggle_lesson(course_id, lesson_id, Utc::now())
            .await?;
        self.data
            .lock()
            .await
            .course_progress
            .insert(course_id, updated);
        Ok(())
    }

    /// Same toggle semantics for a project step.
    pub async fn toggle_step(&self, project_id: Uuid, step_id: Uuid) -> PortResult<()> {
        let updated = self.services.store.toggle_step(project_id, step_id).await?;
        self.data
            .lock()
            .await
            .project_progress
            .insert(project_id, updated);
        Ok(())
    }

    /// The course holding the globally latest completion timestamp, or
    /// `None` when every progress map is empty. Full scan, recomputed on
    /// demand; ties resolve to an arbitrary contender.
    pub async fn last_active_course(&self) -> Option<Uuid> {
        let data = self.data.lock().await;
        data.course_progress
            .values()
            .filter_map(|p| p.latest_activity().map(|at| (at, p.course_id)))
            .max_by_key(|(at, _)| *at)
            .map(|(_, course_id)| course_id)
    }

    /// Generates flashcards for one lesson. Only one in-flight generation is
    /// tracked: a second invocation overwrites the marker (last write wins).
    /// The marker is cleared on completion or failure either way.
    pub async fn generate_lesson_flashcards(
        &self,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> PortResult<()> {
        let lesson = {
            let mut data = self.data.lock().await;
            let Some(lesson) = data
                .find_course(course_id)
                .and_then(|c| c.find_lesson(lesson_id))
                .cloned()
            else {
                return Ok(());
            };
            data.error = None;
            data.generating_flashcards_for = Some(lesson_id);
            lesson
        };

        let outcome = self.services.flashcards.generate_flashcards(&lesson).await;

        let course_to_save = {
            let mut data = self.data.lock().await;
            data.generating_flashcards_for = None;
            match outcome {
                Ok(cards) => data.find_course_mut(course_id).map(|course| {
                    if let Some(lesson) = course.find_lesson_mut(lesson_id) {
                        lesson.flashcards = Some(cards);
                    }
                    course.clone()
                }),
                Err(e) => {
                    data.error = Some(format!("Failed to generate flashcards: {e}"));
                    None
                }
            }
        };
        if let Some(course) = course_to_save {
            self.services.store.save_course(&course).await?;
        }
        Ok(())
    }

    //=====================================================================================
    // Socratic Dialogue
    //=====================================================================================

    /// Opens a dialogue session anchored to a passage of course text.
    /// Any previous session is discarded.
    pub async fn open_dialogue(&self, subject: &str) {
        self.data.lock().await.dialogue = Some(DialogueSession {
            subject: subject.to_string(),
            turns: Vec::new(),
            loading: false,
        });
    }

    /// Appends the learner's turn, asks the tutor for the next turn seeded
    /// with the full history, and appends the reply — or a fixed fallback
    /// when generation fails. History is append-only within a session.
    pub async fn send_dialogue_message(&self, text: &str) {
        let Some((subject, history)) = ({
            let mut data = self.data.lock().await;
            data.dialogue.as_mut().map(|session| {
                session.turns.push(ChatTurn::user(text));
                session.loading = true;
                (session.subject.clone(), session.turns.clone())
            })
        }) else {
            return;
        };

        let turn = match self.services.tutor.next_turn(&subject, &history).await {
            Ok(turn) => turn,
            Err(e) => {
                warn!("Tutor turn generation failed, using fallback: {e}");
                ChatTurn::model(DIALOGUE_FALLBACK)
            }
        };

        let mut data = self.data.lock().await;
        // The session may have been closed while the tutor was thinking;
        // a reply without a session is dropped.
        if let Some(session) = data.dialogue.as_mut() {
            session.turns.push(turn);
            session.loading = false;
        }
    }

    /// Discards the dialogue session entirely. Nothing is persisted.
    pub async fn close_dialogue(&self) {
        self.data.lock().await.dialogue = None;
    }

    //=====================================================================================
    // Explore & Assessment Sessions
    //=====================================================================================

    /// Opens the related-topics session and fills it in. A generation
    /// failure is swallowed into an empty-result display.
    pub async fn explore_related_topics(&self, topic: &str) {
        self.data.lock().await.explore = Some(ExploreSession {
            topic: topic.to_string(),
            results: Vec::new(),
            loading: true,
        });

        let results = match self.services.explore.related_topics(topic).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Related-topic generation failed (showing empty list): {e}");
                Vec::new()
            }
        };

        let mut data = self.data.lock().await;
        if let Some(session) = data.explore.as_mut() {
            session.results = results;
            session.loading = false;
        }
    }

    pub async fn close_explore(&self) {
        self.data.lock().await.explore = None;
    }

    /// Generates a test for a course. Success preloads the payload and
    /// requests the assessment view; failure writes the shared error slot
    /// and stays put.
    pub async fn start_course_test(&self, course_id: Uuid) {
        let Some(course) = ({
            let mut data = self.data.lock().await;
            data.error = None;
            data.find_course(course_id).cloned()
        }) else {
            return;
        };

        match self.services.assessments.generate_test(&course).await {
            Ok(test) => {
                self.data.lock().await.pending_test = Some(test);
                self.views.transition(View::Assessment);
            }
            Err(e) => {
                self.data.lock().await.error =
                    Some(format!("Failed to generate test: {e}"));
            }
        }
    }

    /// Hands the preloaded test to the assessment view, consuming it.
    pub async fn take_pending_test(&self) -> Option<CourseTest> {
        self.data.lock().await.pending_test.take()
    }

    //=====================================================================================
    // Navigation & Transient State
    //=====================================================================================

    /// Makes a course active and requests its detail view. Unknown id: no-op.
    pub async fn open_course(&self, course_id: Uuid) {
        let known = {
            let mut data = self.data.lock().await;
            let known = data.find_course(course_id).is_some();
            if known {
                data.active_course = Some(course_id);
            }
            known
        };
        if known {
            self.views.transition(View::CourseDetail);
        }
    }

    /// Makes a project active and requests its detail view. Unknown id: no-op.
    pub async fn open_project(&self, project_id: Uuid) {
        let known = {
            let mut data = self.data.lock().await;
            let known = data.find_project(project_id).is_some();
            if known {
                data.active_project = Some(project_id);
            }
            known
        };
        if known {
            self.views.transition(View::ProjectDetail);
        }
    }

    pub async fn set_topic(&self, topic: &str) {
        self.data.lock().await.current_topic = topic.to_string();
    }

    pub async fn clear_error(&self) {
        self.data.lock().await.error = None;
    }

    /// The active course, cloned for display.
    pub async fn active_course(&self) -> Option<Course> {
        let data = self.data.lock().await;
        data.active_course.and_then(|id| data.find_course(id).cloned())
    }

    /// The active project, cloned for display.
    pub async fn active_project(&self) -> Option<Project> {
        let data = self.data.lock().await;
        data.active_project.and_then(|id| data.find_project(id).cloned())
    }

    /// The progress record for one course, cloned for display.
    pub async fn course_progress(&self, course_id: Uuid) -> CourseProgress {
        self.data
            .lock()
            .await
            .course_progress
            .get(&course_id)
            .cloned()
            .unwrap_or_else(|| CourseProgress::empty(course_id))
    }
}
