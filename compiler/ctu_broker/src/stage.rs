use std::fmt;

/// Compilation stages gated by [`Broker::end_stage`](crate::Broker::end_stage).
///
/// Frontends forward their declarations into modules, the broker resolves
/// every declaration, then the validator checks the finished tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Stage {
    #[default]
    Forward,
    Resolve,
    Check,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Forward, Stage::Resolve, Stage::Check];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Forward => "forward",
            Stage::Resolve => "resolve",
            Stage::Check => "check",
        }
    }

    /// The stage after this one, `None` after checking.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Forward => Some(Stage::Resolve),
            Stage::Resolve => Some(Stage::Check),
            Stage::Check => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
