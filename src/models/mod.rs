pub mod answer;
pub mod loaders;
pub mod question;
pub mod state;

pub use answer::{guess_mime_type, AnswerValue, FileContent, FileHandle};
pub use loaders::{load_registry_from_toml, parse_registry_toml};
pub use question::{
    QuestionDefinition, QuestionKind, QuestionRegistry, DEFAULT_MAX_FILES,
    RESERVED_QUESTION_IDS,
};
pub use state::{Direction, WizardPhase};
