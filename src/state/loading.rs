// Loading state for async data.
// Shared by the controller's resources and rendered by the UI panes.

/// Loading state for data fetched from the API.
#[derive(Debug, Clone, Default)]
pub enum LoadingState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> LoadingState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadingState::Loaded(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadingState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadingState::Error(message) => Some(message),
            _ => None,
        }
    }
}
