use std::{fmt, num::NonZeroU8};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeveloperId(pub u64);

impl fmt::Display for DeveloperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Developer {
    pub id: DeveloperId,
    pub name: String,
    pub specialty: String,
    pub experience_years: u8,
    pub rating: f32,
    pub completed_games: u32,
    pub current_projects: u8,
    pub max_projects: NonZeroU8,
}

impl Developer {
    pub fn has_capacity(&self) -> bool {
        self.current_projects < self.max_projects.get()
    }
}

#[derive(Debug)]
pub struct NewDeveloper {
    pub name: String,
    pub specialty: String,
    pub experience_years: u8,
    pub rating: f32,
    pub completed_games: u32,
    pub current_projects: u8,
    pub max_projects: NonZeroU8,
}

/// The snapshot of a developer that gets attached to a submission on
/// assignment. Kept small on purpose so later stages can show who is building
/// the game without another lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignedDeveloper {
    pub id: DeveloperId,
    pub name: String,
    pub specialty: String,
}

impl From<&Developer> for AssignedDeveloper {
    fn from(developer: &Developer) -> Self {
        AssignedDeveloper {
            id: developer.id,
            name: developer.name.clone(),
            specialty: developer.specialty.clone(),
        }
    }
}
