//! Onboarding form validation.
//!
//! Each step of the client form is checked on "save and advance". Problems
//! come back as field-level violations so the form can show them inline.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::draft::{Draft, Track};
use crate::error::CoreError;

/// Steps of the onboarding form, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Identite,
    Adresse,
    Activite,
    Specifics,
    Docs,
    Recap,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 6] = [
        Self::Identite,
        Self::Adresse,
        Self::Activite,
        Self::Specifics,
        Self::Docs,
        Self::Recap,
    ];

    /// Zero-based position in the form.
    pub fn index(self) -> u32 {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .map_or(0, |i| i as u32)
    }

    pub fn from_index(index: u32) -> Result<Self, CoreError> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or_else(|| CoreError::Validation(format!("Unknown onboarding step {index}")))
    }
}

/// One problem on one field. `field` is the dotted wire path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub(crate) fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

static POSTAL_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{3}$").expect("valid regex"));

fn require(out: &mut Vec<FieldViolation>, field: &str, value: &str) {
    if value.trim().is_empty() {
        out.push(FieldViolation::new(field, "Ce champ est obligatoire"));
    }
}

/// Validate one step of the form. An empty result means the step is complete.
pub fn validate_step(step: OnboardingStep, draft: &Draft) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    match step {
        OnboardingStep::Identite => check_identite(draft, &mut out),
        OnboardingStep::Adresse => check_adresse(draft, &mut out),
        OnboardingStep::Activite => check_activite(draft, &mut out),
        OnboardingStep::Specifics => check_specifics(draft, &mut out),
        OnboardingStep::Docs => check_docs(draft, &mut out),
        OnboardingStep::Recap => {
            check_identite(draft, &mut out);
            check_adresse(draft, &mut out);
            check_activite(draft, &mut out);
            check_specifics(draft, &mut out);
            check_docs(draft, &mut out);
        }
    }
    out
}

fn check_identite(draft: &Draft, out: &mut Vec<FieldViolation>) {
    let id = &draft.identite;
    require(out, "identite.firstName", &id.first_name);
    require(out, "identite.lastName", &id.last_name);
    let email = id.email.trim().to_string();
    if email.is_empty() {
        out.push(FieldViolation::new("identite.email", "Ce champ est obligatoire"));
    } else if !email.validate_email() {
        out.push(FieldViolation::new("identite.email", "Adresse e-mail invalide"));
    }
}

fn check_adresse(draft: &Draft, out: &mut Vec<FieldViolation>) {
    let a = &draft.adresse;
    require(out, "adresse.street", &a.street);
    require(out, "adresse.number", &a.number);
    require(out, "adresse.city", &a.city);

    let postal = a.postal_code.trim();
    let belgian = a.country.trim().is_empty() || a.country.trim().eq_ignore_ascii_case("BE");
    if postal.is_empty() {
        out.push(FieldViolation::new("adresse.postalCode", "Ce champ est obligatoire"));
    } else if belgian && !POSTAL_CODE_PATTERN.is_match(postal) {
        out.push(FieldViolation::new(
            "adresse.postalCode",
            "Le code postal doit comporter 4 chiffres",
        ));
    }
}

fn check_activite(draft: &Draft, out: &mut Vec<FieldViolation>) {
    if draft.track == Track::Srl {
        require(out, "activite.companyName", &draft.activite.company_name);
    }
    require(out, "activite.description", &draft.activite.description);
}

fn check_specifics(draft: &Draft, out: &mut Vec<FieldViolation>) {
    let s = &draft.specifics;
    match draft.track {
        Track::Srl => {
            match s.capital_eur {
                None => out.push(FieldViolation::new(
                    "specifics.capitalEUR",
                    "Ce champ est obligatoire",
                )),
                Some(c) if !c.is_finite() || c < 0.0 => out.push(FieldViolation::new(
                    "specifics.capitalEUR",
                    "Le capital ne peut pas être négatif",
                )),
                Some(_) => {}
            }
            for (i, holder) in s.shareholders.iter().enumerate() {
                require(out, &format!("specifics.shareholders.{i}.name"), &holder.name);
                if !(0.0..=100.0).contains(&holder.share_percent) {
                    out.push(FieldViolation::new(
                        &format!("specifics.shareholders.{i}.sharePercent"),
                        "La part doit être comprise entre 0 et 100",
                    ));
                }
            }
        }
        Track::Pp => {
            if s.vat_regime.as_deref().map_or(true, |v| v.trim().is_empty()) {
                out.push(FieldViolation::new(
                    "specifics.vatRegime",
                    "Ce champ est obligatoire",
                ));
            }
        }
    }
}

fn check_docs(draft: &Draft, out: &mut Vec<FieldViolation>) {
    if !draft.docs.identity.iter().any(|f| !f.trim().is_empty()) {
        out.push(FieldViolation::new(
            "docs.identity",
            "Ajoutez au moins une pièce d'identité",
        ));
    }
}
