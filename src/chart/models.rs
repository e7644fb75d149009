use serde::{Deserialize, Serialize};

/// Read-only chart metadata consumed by rating calculators. Owned and
/// populated by the catalog side of the system, never written from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartInfo {
    pub id: String,
    pub song_title: String,
    /// Difficulty rating on the game's own scale.
    pub level: f64,
    pub note_count: u32,
    /// Whether the chart belongs to the game's current version. Profile
    /// calculators that split candidates into hot/cold subsets key off this.
    pub is_hot: bool,
}

impl ChartInfo {
    pub fn new(id: &str, song_title: &str, level: f64, note_count: u32) -> Self {
        Self {
            id: id.to_string(),
            song_title: song_title.to_string(),
            level,
            note_count,
            is_hot: false,
        }
    }

    pub fn hot(mut self) -> Self {
        self.is_hot = true;
        self
    }
}
