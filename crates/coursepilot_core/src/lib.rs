pub mod domain;
pub mod ports;

pub use domain::{
    ChatRole, ChatTurn, Course, CourseModule, CourseProgress, CourseTest, Flashcard, Folder,
    KnowledgeLevel, Lesson, Project, ProjectProgress, ProjectStep, RelatedTopic, TestQuestion,
};
pub use ports::{
    AssessmentGenerationService, CourseGenerationService, FlashcardGenerationService, PortError,
    PortResult, StorageService, TopicExplorationService, TutorService,
};
