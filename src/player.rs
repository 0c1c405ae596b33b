/// Single-item playback exclusivity. At most one loop URL is "playing" at a
/// time; starting another one implicitly stops the first. Exclusivity is
/// enforced by comparing the playing URL against each row's URL. Actual
/// audio output belongs to whatever media player the caller delegates to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlayerState {
    #[default]
    Idle,
    Playing(String),
}

impl PlayerState {
    /// Transition to playing the given URL, stopping whatever was playing.
    pub fn play(&mut self, url: impl Into<String>) {
        *self = PlayerState::Playing(url.into());
    }

    pub fn stop(&mut self) {
        *self = PlayerState::Idle;
    }

    /// Whether the given URL is the one currently playing.
    pub fn is_playing(&self, url: &str) -> bool {
        matches!(self, PlayerState::Playing(current) if current == url)
    }

    pub fn current(&self) -> Option<&str> {
        match self {
            PlayerState::Idle => None,
            PlayerState::Playing(url) => Some(url),
        }
    }
}
