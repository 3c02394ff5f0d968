pub mod difficulty;
pub mod problem;
pub mod provider;

pub use difficulty::Difficulty;
pub use problem::{
    day_start_utc, Credentials, Problem, ProblemBuilder, ProblemConstraint, ProblemExample,
    MAX_CONSTRAINT_LEN,
};
pub use provider::ProviderKind;
