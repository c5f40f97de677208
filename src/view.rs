use crate::api::ApiError;

/// Loading/error/success state every screen carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewStatus {
    #[default]
    Idle,
    Loading,
    Failed(String),
    Succeeded(String),
}

impl ViewStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewStatus::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn success(&self) -> Option<&str> {
        match self {
            ViewStatus::Succeeded(msg) => Some(msg),
            _ => None,
        }
    }

    /// Enters `Loading`, refusing while a request is already in flight
    /// (the disabled-button state).
    pub fn begin(&mut self) -> Result<(), ApiError> {
        if self.is_loading() {
            return Err(ApiError::Busy);
        }
        *self = ViewStatus::Loading;
        Ok(())
    }

    /// Records `err` as the screen's banner and hands it back.
    pub fn fail(&mut self, err: ApiError, fallback: &str) -> ApiError {
        *self = ViewStatus::Failed(err.user_message(fallback));
        err
    }
}

/// The explicit confirm step in front of destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// A fixed answer, for `--yes` and for tests.
impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_rejects_duplicate_submission() {
        let mut status = ViewStatus::Idle;
        status.begin().unwrap();
        assert_eq!(status.begin().unwrap_err(), ApiError::Busy);
        assert!(status.is_loading());
    }

    #[test]
    fn fail_keeps_the_error_and_sets_the_banner() {
        let mut status = ViewStatus::Loading;
        let err = status.fail(ApiError::Transport(String::new()), "Failed to load users");
        assert_eq!(err, ApiError::Transport(String::new()));
        assert_eq!(status.error(), Some("Failed to load users"));
    }
}
