//! Terminal states of a delivered request

use crate::logger::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Reserved prefix or outside the router base, renderer not invoked
    Rejected,
    /// Static asset sent from disk
    Asset,
    /// Client copy is current (304)
    NotModified,
    /// Page sent with a fresh validator (200)
    Serving,
    /// Renderer asked for a redirect
    Redirecting { status: u16 },
    /// Renderer reported or raised an error
    Erroring { status: u16 },
}

impl Outcome {
    /// Level the outcome is logged at
    pub const fn level(self) -> Level {
        match self {
            Self::Erroring { status } if status >= 500 => Level::Error,
            Self::Erroring { .. } => Level::Warn,
            Self::Redirecting { .. } => Level::Info,
            Self::Rejected | Self::Asset | Self::NotModified | Self::Serving => Level::Debug,
        }
    }
}
