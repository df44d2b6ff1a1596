use std::fmt;

/// One of the three fixed infrastructure layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InfraKey {
    Health,
    Police,
    Roads,
}

impl InfraKey {
    /// All keys, in column order.
    pub const ALL: [InfraKey; 3] = [InfraKey::Health, InfraKey::Police, InfraKey::Roads];

    /// Short name used in column names.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfraKey::Health => "health",
            InfraKey::Police => "police",
            InfraKey::Roads => "roads",
        }
    }

    /// Name of the nearest-distance column, e.g. `dist_health`.
    #[inline] pub fn distance_column(&self) -> String { format!("dist_{}", self.as_str()) }

    /// Name of the proximity score column, e.g. `health_score`.
    #[inline] pub fn score_column(&self) -> String { format!("{}_score", self.as_str()) }
}

impl fmt::Display for InfraKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
