use serde_json::Value;

use crate::database::repositories::{ProfileRepository, UserRepository};

/// Outbound templates, one per state transition that notifies someone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    TimesheetSubmitted,
    TimesheetApproved,
    TimesheetRejected,
    VacationSubmitted,
    VacationApproved,
    VacationRejected,
}

impl NotificationKind {
    pub fn template_key(&self) -> &'static str {
        match self {
            NotificationKind::TimesheetSubmitted => "timesheet-submitted",
            NotificationKind::TimesheetApproved => "timesheet-approved",
            NotificationKind::TimesheetRejected => "timesheet-rejected",
            NotificationKind::VacationSubmitted => "vacation-submitted",
            NotificationKind::VacationApproved => "vacation-approved",
            NotificationKind::VacationRejected => "vacation-rejected",
        }
    }
}

/// Fire-and-forget notification dispatch. Every send runs on a detached
/// task after the triggering transition has committed; failures are logged
/// and never reach the caller.
#[derive(Clone)]
pub struct Notifier {
    user_repository: UserRepository,
    profile_repository: ProfileRepository,
}

impl Notifier {
    pub fn new(user_repository: UserRepository, profile_repository: ProfileRepository) -> Self {
        Self {
            user_repository,
            profile_repository,
        }
    }

    /// Notify a single user, honouring their email-notification preference.
    pub fn notify_user(&self, user_id: String, kind: NotificationKind, payload: Value) {
        let users = self.user_repository.clone();
        let profiles = self.profile_repository.clone();

        tokio::spawn(async move {
            let user = match users.find_by_id(&user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    log::warn!("notification '{}' dropped: user {} not found", kind.template_key(), user_id);
                    return;
                }
                Err(err) => {
                    log::warn!("notification '{}' failed: {}", kind.template_key(), err);
                    return;
                }
            };

            match profiles.get_by_user_id(&user_id).await {
                Ok(Some(profile)) if !profile.email_notifications => {
                    log::debug!(
                        "notification '{}' suppressed: {} opted out",
                        kind.template_key(),
                        user.email
                    );
                    return;
                }
                Err(err) => {
                    log::warn!("notification '{}' failed: {}", kind.template_key(), err);
                    return;
                }
                _ => {}
            }

            if !deliver(&user.email, kind, &payload) {
                log::warn!(
                    "notification '{}' to {} was not delivered",
                    kind.template_key(),
                    user.email
                );
            }
        });
    }

    /// Fan a notification out to every manager and admin.
    pub fn notify_reviewers(&self, kind: NotificationKind, payload: Value) {
        let users = self.user_repository.clone();

        tokio::spawn(async move {
            let reviewers = match users.get_reviewers().await {
                Ok(reviewers) => reviewers,
                Err(err) => {
                    log::warn!("notification '{}' fan-out failed: {}", kind.template_key(), err);
                    return;
                }
            };

            for reviewer in reviewers {
                if !deliver(&reviewer.email, kind, &payload) {
                    log::warn!(
                        "notification '{}' to {} was not delivered",
                        kind.template_key(),
                        reviewer.email
                    );
                }
            }
        });
    }
}

/// The delivery provider. SMTP is out of scope; this logs the outbound
/// message and reports success so the dispatch path stays observable.
fn deliver(recipient: &str, kind: NotificationKind, payload: &Value) -> bool {
    if recipient.is_empty() {
        return false;
    }

    log::info!(
        "notify {} template={} payload={}",
        recipient,
        kind.template_key(),
        payload
    );
    true
}
