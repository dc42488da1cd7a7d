pub mod answer_store;
pub mod file_encoder;
pub mod submission_client;
pub mod validator;

pub use answer_store::{AnswerStore, RestoredPosition};
pub use file_encoder::{encode_file, encode_files, EncodedFile};
pub use submission_client::{
    Collector, CollectorResponse, HttpCollector, SubmissionClient, SubmissionPayload,
    SubmissionReceipt,
};
pub use validator::{
    check_file_selection, is_answer_present, remove_file, validate_step, FormatRules,
    StepValidation,
};
