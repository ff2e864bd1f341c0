use thiserror::Error;

pub type CrmResult<T> = Result<T, CrmError>;

/// Validation failures raised by the domain. None of these are fatal; they are
/// reported back to whoever attempted the write.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CrmError {
    #[error("stage \"{stage}\" does not exist in funnel \"{funnel}\"")]
    UnknownStage { stage: String, funnel: String },
    #[error("funnel \"{0}\" has no stages")]
    EmptyFunnel(String),
    #[error("stage \"{0}\" appears more than once")]
    DuplicateStage(String),
    #[error("stage names cannot be blank")]
    BlankStage,
    #[error("{setting} references unknown stage \"{stage}\"")]
    UnknownConfiguredStage { setting: &'static str, stage: String },
    #[error("conversion rate {rate} for stage \"{stage}\" exceeds 100")]
    InvalidConversionRate { stage: String, rate: u8 },
    #[error("probability {0} must be between 0 and 100")]
    InvalidProbability(i64),
    #[error("{0} cannot be blank")]
    BlankName(&'static str),
    #[error("color \"{0}\" is not a #RRGGBB value")]
    InvalidColor(String),
    #[error("status \"{0}\" is not valid")]
    InvalidStatus(String),
    #[error("priority \"{0}\" is not valid")]
    InvalidPriority(String),
    #[error("task kind \"{0}\" is not valid")]
    InvalidTaskKind(String),
    #[error("activity kind \"{0}\" cannot be logged")]
    InvalidActivityKind(String),
    #[error("activity result \"{0}\" is not valid")]
    InvalidActivityResult(String),
    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("goal must end after it starts")]
    InvalidGoalWindow,
}
