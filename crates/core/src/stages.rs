//! SRL stage definitions and the per-stage status machine.
//!
//! An SRL dossier moves through twelve named stages. Every stage carries a
//! [`StageStatus`] and an optional admin note; the remaining fields are
//! stage-specific and split between admin-owned and client-owned values
//! (see [`crate::sanitize`] for the ownership rules).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Stage status
// ---------------------------------------------------------------------------

/// Status of a single stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Pending,
    Incomplete,
    Done,
}

impl StageStatus {
    /// Parse a status string from the database or a request path.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "incomplete" => Ok(Self::Incomplete),
            "done" => Ok(Self::Done),
            _ => Err(CoreError::Validation(format!(
                "Invalid stage status '{s}'. Must be one of: pending, incomplete, done"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Incomplete => "incomplete",
            Self::Done => "done",
        }
    }

    pub fn is_done(self) -> bool {
        self == Self::Done
    }

    /// Whether `self -> next` follows the natural progression.
    ///
    /// `pending` may go to `incomplete` or straight to `done`, and
    /// `incomplete` may go to `done`. Anything else moves a stage backwards,
    /// which admins may do; the service logs it.
    pub fn is_forward_transition(self, next: StageStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Incomplete)
                | (Self::Pending, Self::Done)
                | (Self::Incomplete, Self::Done)
        )
    }
}

// ---------------------------------------------------------------------------
// Stage identifiers
// ---------------------------------------------------------------------------

/// The twelve SRL stages, in workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageId {
    Dossier,
    PlanFinancier,
    Banque,
    Domiciliation,
    Comptable,
    Notaire,
    RendezVous,
    FactureNotaire,
    NumeroEntreprise,
    Tva,
    Affiliation,
    FinalDelivery,
}

/// Total number of SRL stages.
pub const STAGE_COUNT: usize = 12;

impl StageId {
    /// All stages in workflow order.
    pub const ALL: [StageId; STAGE_COUNT] = [
        Self::Dossier,
        Self::PlanFinancier,
        Self::Banque,
        Self::Domiciliation,
        Self::Comptable,
        Self::Notaire,
        Self::RendezVous,
        Self::FactureNotaire,
        Self::NumeroEntreprise,
        Self::Tva,
        Self::Affiliation,
        Self::FinalDelivery,
    ];

    /// 1-based position of the stage.
    pub fn number(self) -> u8 {
        match self {
            Self::Dossier => 1,
            Self::PlanFinancier => 2,
            Self::Banque => 3,
            Self::Domiciliation => 4,
            Self::Comptable => 5,
            Self::Notaire => 6,
            Self::RendezVous => 7,
            Self::FactureNotaire => 8,
            Self::NumeroEntreprise => 9,
            Self::Tva => 10,
            Self::Affiliation => 11,
            Self::FinalDelivery => 12,
        }
    }

    /// Convert a 1-based stage number.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|id| id.number() == n)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid stage number {n}. Must be between 1 and {STAGE_COUNT}"
                ))
            })
    }

    /// Key of the stage inside the `workflow.srl` object.
    pub fn key(self) -> &'static str {
        match self {
            Self::Dossier => "dossier",
            Self::PlanFinancier => "planFinancier",
            Self::Banque => "banque",
            Self::Domiciliation => "domiciliation",
            Self::Comptable => "comptable",
            Self::Notaire => "notaire",
            Self::RendezVous => "rendezVous",
            Self::FactureNotaire => "factureNotaire",
            Self::NumeroEntreprise => "numeroEntreprise",
            Self::Tva => "tva",
            Self::Affiliation => "affiliation",
            Self::FinalDelivery => "finalDelivery",
        }
    }

    /// Parse a stage key (`"planFinancier"`) or number (`"2"`).
    pub fn from_key(key: &str) -> Result<Self, CoreError> {
        if let Ok(n) = key.parse::<u8>() {
            return Self::from_number(n);
        }
        Self::ALL
            .into_iter()
            .find(|id| id.key() == key)
            .ok_or_else(|| CoreError::Validation(format!("Unknown stage '{key}'")))
    }

    /// Label shown to the client.
    pub fn label(self) -> &'static str {
        match self {
            Self::Dossier => "Dossier",
            Self::PlanFinancier => "Plan financier",
            Self::Banque => "Attestation bancaire",
            Self::Domiciliation => "Domiciliation",
            Self::Comptable => "Choix du comptable",
            Self::Notaire => "Notaire",
            Self::RendezVous => "Rendez-vous chez le notaire",
            Self::FactureNotaire => "Facture du notaire",
            Self::NumeroEntreprise => "Numéro d'entreprise",
            Self::Tva => "Activation TVA",
            Self::Affiliation => "Affiliation sociale",
            Self::FinalDelivery => "Livraison finale",
        }
    }

    /// Stages on which the client may write some fields.
    pub fn accepts_client_input(self) -> bool {
        matches!(self, Self::Banque | Self::Domiciliation | Self::Comptable)
    }
}

// ---------------------------------------------------------------------------
// Stage payloads
// ---------------------------------------------------------------------------

/// Stage 1: the administrative review of the submitted file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DossierStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    /// Items the admin still needs from the client.
    pub blockers: Vec<String>,
}

/// Stage 2: financial plan prepared by the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanFinancierStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    pub plan_file_name: Option<String>,
    pub delivered_at: Option<String>,
}

/// Stage 3: bank attestation of the paid-up capital.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BanqueStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    pub recommended_bank: Option<String>,
    pub attestation_file_name: Option<String>,
    pub alternative_within3_months: bool,
}

/// How the registered office is provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomiciliationChoice {
    OwnAddress,
    Provider,
}

/// Stage 4: registered office.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomiciliationStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    pub choice: Option<DomiciliationChoice>,
    pub provider_name: Option<String>,
    pub lease_file_name: Option<String>,
    pub contract_file_name: Option<String>,
    #[serde(rename = "monthlyFeeEUR")]
    pub monthly_fee_eur: Option<f64>,
}

/// One accountant offer presented to the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountantProposal {
    pub id: String,
    pub name: String,
    pub firm: String,
    #[serde(rename = "monthlyFeeEUR")]
    pub monthly_fee_eur: Option<f64>,
}

/// Stage 5: accountant choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComptableStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    /// `None` means the stored draft predates proposals.
    pub proposals: Option<Vec<AccountantProposal>>,
    pub selected_proposal_id: Option<String>,
    pub own_accountant_name: Option<String>,
    pub engagement_letter_file_name: Option<String>,
}

/// Stage 6: notary assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotaireStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    pub notary_name: Option<String>,
    pub notary_email: Option<String>,
    pub draft_deed_file_name: Option<String>,
}

/// Stage 7: signing appointment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RendezVousStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    pub appointment_at: Option<String>,
    pub location: Option<String>,
}

/// Stage 8: notary invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FactureNotaireStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    pub invoice_file_name: Option<String>,
    #[serde(rename = "amountDueEUR")]
    pub amount_due_eur: Option<f64>,
    pub paid_at: Option<String>,
}

/// Stage 9: enterprise number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumeroEntrepriseStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    pub enterprise_number: Option<String>,
    pub registration_file_name: Option<String>,
}

/// Stage 10: VAT activation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TvaStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    pub vat_number: Option<String>,
    pub activation_date: Option<String>,
}

/// Stage 11: social insurance fund affiliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AffiliationStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    pub fund_name: Option<String>,
    pub amount_due: Option<f64>,
    pub certificate_file_name: Option<String>,
}

/// Stage 12: delivery of the final archive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinalDeliveryStage {
    pub status: StageStatus,
    pub admin_note: Option<String>,
    pub available_days: Option<u32>,
    pub archive_file_name: Option<String>,
    pub delivered_at: Option<String>,
}

/// Fields every stage carries.
pub trait StageCommon {
    fn status(&self) -> StageStatus;
    fn status_mut(&mut self) -> &mut StageStatus;
    fn admin_note(&self) -> Option<&str>;
    fn admin_note_mut(&mut self) -> &mut Option<String>;
}

macro_rules! impl_stage_common {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl StageCommon for $ty {
                fn status(&self) -> StageStatus {
                    self.status
                }

                fn status_mut(&mut self) -> &mut StageStatus {
                    &mut self.status
                }

                fn admin_note(&self) -> Option<&str> {
                    self.admin_note.as_deref()
                }

                fn admin_note_mut(&mut self) -> &mut Option<String> {
                    &mut self.admin_note
                }
            }
        )+
    };
}

impl_stage_common!(
    DossierStage,
    PlanFinancierStage,
    BanqueStage,
    DomiciliationStage,
    ComptableStage,
    NotaireStage,
    RendezVousStage,
    FactureNotaireStage,
    NumeroEntrepriseStage,
    TvaStage,
    AffiliationStage,
    FinalDeliveryStage,
);

// ---------------------------------------------------------------------------
// SRL workflow
// ---------------------------------------------------------------------------

/// The ordered record of all twelve SRL stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SrlWorkflow {
    pub dossier: DossierStage,
    pub plan_financier: PlanFinancierStage,
    pub banque: BanqueStage,
    pub domiciliation: DomiciliationStage,
    pub comptable: ComptableStage,
    pub notaire: NotaireStage,
    pub rendez_vous: RendezVousStage,
    pub facture_notaire: FactureNotaireStage,
    pub numero_entreprise: NumeroEntrepriseStage,
    pub tva: TvaStage,
    pub affiliation: AffiliationStage,
    pub final_delivery: FinalDeliveryStage,
}

impl SrlWorkflow {
    pub fn stage(&self, id: StageId) -> &dyn StageCommon {
        match id {
            StageId::Dossier => &self.dossier,
            StageId::PlanFinancier => &self.plan_financier,
            StageId::Banque => &self.banque,
            StageId::Domiciliation => &self.domiciliation,
            StageId::Comptable => &self.comptable,
            StageId::Notaire => &self.notaire,
            StageId::RendezVous => &self.rendez_vous,
            StageId::FactureNotaire => &self.facture_notaire,
            StageId::NumeroEntreprise => &self.numero_entreprise,
            StageId::Tva => &self.tva,
            StageId::Affiliation => &self.affiliation,
            StageId::FinalDelivery => &self.final_delivery,
        }
    }

    pub fn stage_mut(&mut self, id: StageId) -> &mut dyn StageCommon {
        match id {
            StageId::Dossier => &mut self.dossier,
            StageId::PlanFinancier => &mut self.plan_financier,
            StageId::Banque => &mut self.banque,
            StageId::Domiciliation => &mut self.domiciliation,
            StageId::Comptable => &mut self.comptable,
            StageId::Notaire => &mut self.notaire,
            StageId::RendezVous => &mut self.rendez_vous,
            StageId::FactureNotaire => &mut self.facture_notaire,
            StageId::NumeroEntreprise => &mut self.numero_entreprise,
            StageId::Tva => &mut self.tva,
            StageId::Affiliation => &mut self.affiliation,
            StageId::FinalDelivery => &mut self.final_delivery,
        }
    }

    pub fn status_of(&self, id: StageId) -> StageStatus {
        self.stage(id).status()
    }

    pub fn is_done(&self, id: StageId) -> bool {
        self.status_of(id).is_done()
    }

    /// Set a stage status. Admin writes are not constrained to forward moves.
    pub fn set_status(&mut self, id: StageId, status: StageStatus) {
        *self.stage_mut(id).status_mut() = status;
    }

    pub fn set_admin_note(&mut self, id: StageId, note: Option<String>) {
        *self.stage_mut(id).admin_note_mut() = note;
    }

    /// `(stage, status)` pairs in workflow order.
    pub fn statuses(&self) -> Vec<(StageId, StageStatus)> {
        StageId::ALL
            .into_iter()
            .map(|id| (id, self.status_of(id)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
