//! The draft: the full case record of one dossier.
//!
//! Client-owned form sections are plain data. The `workflow` section holds
//! admin-owned state: the top-level [`WorkflowStatus`] and, for the SRL
//! track, the [`SrlWorkflow`] stage record.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::stages::SrlWorkflow;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// Registration track. Fixed when the dossier is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    /// Private limited company.
    Srl,
    /// Sole proprietor.
    Pp,
}

impl Track {
    pub const ALL: [Track; 2] = [Self::Srl, Self::Pp];

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "srl" => Ok(Self::Srl),
            "pp" => Ok(Self::Pp),
            _ => Err(CoreError::Validation(format!(
                "Invalid track '{s}'. Must be one of: srl, pp"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Srl => "srl",
            Self::Pp => "pp",
        }
    }
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

/// Client-side lifecycle of the onboarding form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaStatus {
    #[default]
    Draft,
    Submitted,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default)]
    pub status: MetaStatus,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub promo_code: Option<String>,
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Top-level dossier status, set by admins and by payment completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    New,
    InProgress,
    Approved,
    Cancelled,
}

impl WorkflowStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "approved" => Ok(Self::Approved),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(format!(
                "Invalid workflow status '{s}'. Must be one of: new, in_progress, approved, cancelled"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Approved => "approved",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workflow {
    /// `None` when the stored draft predates the status key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkflowStatus>,
    pub srl: Option<SrlWorkflow>,
}

// ---------------------------------------------------------------------------
// Client-owned sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Identite {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub nationality: String,
    pub national_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Adresse {
    pub street: String,
    pub number: String,
    #[serde(rename = "box")]
    pub box_number: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Activite {
    pub company_name: String,
    pub description: String,
    pub nace_codes: Vec<String>,
    pub start_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Shareholder {
    pub name: String,
    pub share_percent: f64,
}

/// Track-specific answers (capital and shareholders for SRL, VAT regime for PP).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Specifics {
    #[serde(rename = "capitalEUR")]
    pub capital_eur: Option<f64>,
    pub shareholders: Vec<Shareholder>,
    pub vat_regime: Option<String>,
    pub secondary_activity: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CapitalAdvisor {
    pub wants_advice: bool,
    pub preferred_contact: Option<String>,
    pub notes: String,
}

/// Uploaded supporting documents, tracked by file name only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Docs {
    pub identity: Vec<String>,
    pub address_proof: Vec<String>,
    pub diplomas: Vec<String>,
    pub other: Vec<String>,
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(rename = "type")]
    pub track: Track,
    pub meta: Meta,
    #[serde(default)]
    pub identite: Identite,
    #[serde(default)]
    pub adresse: Adresse,
    #[serde(default)]
    pub activite: Activite,
    #[serde(default)]
    pub specifics: Specifics,
    #[serde(default)]
    pub capital_advisor: CapitalAdvisor,
    #[serde(default)]
    pub docs: Docs,
    #[serde(default)]
    pub workflow: Workflow,
}

impl Draft {
    /// Top-level workflow status.
    pub fn status(&self) -> WorkflowStatus {
        self.workflow.status.unwrap_or_default()
    }

    pub fn set_status(&mut self, status: WorkflowStatus) {
        self.workflow.status = Some(status);
    }

    pub fn srl(&self) -> Option<&SrlWorkflow> {
        self.workflow.srl.as_ref()
    }

    pub fn srl_mut(&mut self) -> Option<&mut SrlWorkflow> {
        self.workflow.srl.as_mut()
    }

    pub fn updated_at(&self) -> Timestamp {
        self.meta.updated_at
    }

    pub fn touch(&mut self, now: Timestamp) {
        self.meta.updated_at = now;
    }
}
