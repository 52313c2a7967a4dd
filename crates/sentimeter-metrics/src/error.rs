use thiserror::Error;

/// Why a view could not be computed for the current selection.
///
/// These are reported per section; they never abort the surrounding command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("not enough data for {view}: {reason}")]
    NotEnoughData { view: &'static str, reason: String },

    #[error("no replies match the current filters")]
    Empty,
}

impl ViewError {
    pub(crate) fn not_enough(view: &'static str, reason: impl Into<String>) -> Self {
        Self::NotEnoughData {
            view,
            reason: reason.into(),
        }
    }
}
