use serde::Serialize;

/// Position of a pipeline run
///
/// `Failed` is only entered from the fatal stages (generating, writing,
/// building). Execution and reporting problems still end in `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Generating,
    Writing,
    Building,
    Executing,
    Reporting,
    Done,
    Failed,
}

impl PipelineState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether a failure in this state ends the run
    #[must_use]
    pub const fn is_fatal_stage(self) -> bool {
        matches!(self, Self::Generating | Self::Writing | Self::Building)
    }

    /// Whether `next` may follow `self`
    ///
    /// A new run may start from `Idle` or any terminal state, either at
    /// `Generating` or, when test cases are supplied, at `Writing`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Idle | Self::Done | Self::Failed, Self::Generating | Self::Writing) => true,
            (Self::Generating, Self::Writing)
            | (Self::Writing, Self::Building)
            | (Self::Building, Self::Executing)
            | (Self::Executing, Self::Reporting)
            | (Self::Reporting, Self::Done) => true,
            (from, Self::Failed) => from.is_fatal_stage(),
            _ => false,
        }
    }
}
