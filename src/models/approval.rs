use strum::{Display, EnumIter, EnumString};

use super::types::UtcDateTime;

/// Where an approved game can be released. The serialized forms double as the
/// stable ids used in persistence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum DistributionChannel {
    #[strum(serialize = "steam")]
    Steam,
    #[strum(serialize = "google-play")]
    GooglePlay,
    #[strum(serialize = "app-store")]
    AppStore,
    #[strum(serialize = "board-game-geek")]
    BoardGameGeek,
    #[strum(serialize = "retail-stores")]
    RetailStores,
}

impl DistributionChannel {
    pub fn display_name(&self) -> &'static str {
        use DistributionChannel::*;

        match self {
            Steam => "Steam",
            GooglePlay => "Google Play",
            AppStore => "App Store",
            BoardGameGeek => "BoardGameGeek",
            RetailStores => "Retail stores",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReleaseChecklist {
    pub quality_checked: bool,
    pub legal_checked: bool,
    pub marketing_approved: bool,
}

impl ReleaseChecklist {
    pub fn is_complete(&self) -> bool {
        self.quality_checked && self.legal_checked && self.marketing_approved
    }
}

/// The operator's final-approval draft. Everything is optional until the gate
/// freezes it into an [`ApprovalRecord`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApprovalForm {
    pub final_price: Option<f64>,
    pub release_date: Option<UtcDateTime>,
    pub distribution_channels: Vec<DistributionChannel>,
    pub marketing_plan: String,
    pub notes: String,
    pub checklist: ReleaseChecklist,
}

/// The frozen final-approval decision. Only produced by the approval gate, so
/// its fields are always complete.
#[derive(Clone, Debug, PartialEq)]
pub struct ApprovalRecord {
    pub final_price: f64,
    pub release_date: UtcDateTime,
    pub distribution_channels: Vec<DistributionChannel>,
    pub marketing_plan: String,
    pub notes: String,
    pub checklist: ReleaseChecklist,
}
