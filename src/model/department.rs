use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Organizational units employees clock in under. Closed set: anything not
/// listed here is rejected at the request boundary, never stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
    ToSchema,
)]
pub enum Department {
    #[serde(rename = "Tech Team Alpha")]
    #[strum(serialize = "Tech Team Alpha")]
    TechTeamAlpha,
    #[serde(rename = "Tech Team Charlie")]
    #[strum(serialize = "Tech Team Charlie")]
    TechTeamCharlie,
    #[serde(rename = "Human Resources Team")]
    #[strum(serialize = "Human Resources Team")]
    HumanResources,
    #[serde(rename = "Marketing Team")]
    #[strum(serialize = "Marketing Team")]
    Marketing,
    #[serde(rename = "Sales Team")]
    #[strum(serialize = "Sales Team")]
    Sales,
    #[serde(rename = "Founder's Office")]
    #[strum(serialize = "Founder's Office")]
    FoundersOffice,
    #[serde(rename = "Content Factory")]
    #[strum(serialize = "Content Factory")]
    ContentFactory,
    #[serde(rename = "Social Media & Content")]
    #[strum(serialize = "Social Media & Content")]
    SocialMedia,
    #[serde(rename = "Customer Support")]
    #[strum(serialize = "Customer Support")]
    CustomerSupport,
    #[serde(rename = "Other")]
    #[strum(serialize = "Other")]
    Other,
}
