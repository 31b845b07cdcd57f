//! Content of the notifications sent to dossier owners.

use crate::stages::StageId;

/// Rendered notification content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub subject: String,
    pub text: String,
}

/// Notification for a stage that just became visible to the client.
pub fn unlock_notification(stage: StageId) -> NotificationContent {
    NotificationContent {
        subject: format!("Nouvelle étape disponible : {}", stage.label()),
        text: format!(
            "Bonjour,\n\nL'étape {} « {} » de votre dossier est maintenant disponible.\n\
             Connectez-vous à votre espace pour la consulter.\n",
            stage.number(),
            stage.label()
        ),
    }
}

/// One notification covering several unlocked stages.
pub fn unlock_digest(stages: &[StageId]) -> Option<NotificationContent> {
    match stages {
        [] => None,
        [single] => Some(unlock_notification(*single)),
        many => {
            let lines: Vec<String> = many
                .iter()
                .map(|s| format!("- {}. {}", s.number(), s.label()))
                .collect();
            Some(NotificationContent {
                subject: format!("{} nouvelles étapes disponibles", many.len()),
                text: format!(
                    "Bonjour,\n\nLes étapes suivantes de votre dossier sont maintenant disponibles :\n{}\n",
                    lines.join("\n")
                ),
            })
        }
    }
}
