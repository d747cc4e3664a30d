//! Research question catalogue

use serde::Serialize;

/// The seven fixed research questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ResearchQuestion {
    #[serde(rename = "RQ01")]
    Maturity,
    #[serde(rename = "RQ02")]
    ExternalContribution,
    #[serde(rename = "RQ03")]
    ReleaseFrequency,
    #[serde(rename = "RQ04")]
    UpdateFrequency,
    #[serde(rename = "RQ05")]
    LanguagePopularity,
    #[serde(rename = "RQ06")]
    ClosedIssueRatio,
    #[serde(rename = "RQ07")]
    ByLanguage,
}

impl ResearchQuestion {
    pub const ALL: [Self; 7] = [
        Self::Maturity,
        Self::ExternalContribution,
        Self::ReleaseFrequency,
        Self::UpdateFrequency,
        Self::LanguagePopularity,
        Self::ClosedIssueRatio,
        Self::ByLanguage,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Maturity => "RQ01",
            Self::ExternalContribution => "RQ02",
            Self::ReleaseFrequency => "RQ03",
            Self::UpdateFrequency => "RQ04",
            Self::LanguagePopularity => "RQ05",
            Self::ClosedIssueRatio => "RQ06",
            Self::ByLanguage => "RQ07",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Maturity => "Are popular repositories mature?",
            Self::ExternalContribution => "Do popular repositories receive many external contributions?",
            Self::ReleaseFrequency => "Do popular repositories release frequently?",
            Self::UpdateFrequency => "Are popular repositories updated frequently?",
            Self::LanguagePopularity => "Are popular repositories written in the most popular languages?",
            Self::ClosedIssueRatio => "Do popular repositories have a high share of closed issues?",
            Self::ByLanguage => "Do the most popular languages get more contributions, releases and updates?",
        }
    }
}

impl std::fmt::Display for ResearchQuestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
