use crate::domain::models::{JournalEntry, Role, VerificationStatus};
use serde::Serialize;

/// Minimum trimmed content length for a journal body, shared by the
/// draft gate and submission.
pub const MIN_CONTENT_LEN: usize = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("action {action:?} is not allowed from state {from:?}")]
    IllegalTransition {
        from: VerificationStatus,
        action: JournalAction,
    },
    #[error("action {0:?} requires a reviewer role")]
    NotPermitted(JournalAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalAction {
    SaveDraft,
    Submit,
    MarkRead,
    Approve,
    RequestRevision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JournalPermissions {
    pub can_edit: bool,
    pub can_delete: bool,
    pub is_locked: bool,
}

/// What the actor may do with an entry in the given state.
///
/// Reviewers keep an unconditional override; the owning employee loses
/// write access once a reviewer has read or approved the entry.
pub fn permissions(state: VerificationStatus, actor: Role) -> JournalPermissions {
    if actor.is_reviewer() {
        return JournalPermissions {
            can_edit: true,
            can_delete: true,
            is_locked: false,
        };
    }

    let writable = matches!(
        state,
        VerificationStatus::Draft | VerificationStatus::Submitted | VerificationStatus::NeedRevision
    );
    JournalPermissions {
        can_edit: writable,
        can_delete: writable,
        is_locked: !writable,
    }
}

/// The minimum-length gate shared by drafts and submissions.
pub fn validate_content(content: &str) -> Result<(), WorkflowError> {
    if content.trim().chars().count() < MIN_CONTENT_LEN {
        return Err(WorkflowError::Validation(format!(
            "journal content must be at least {MIN_CONTENT_LEN} characters"
        )));
    }
    Ok(())
}

/// Applies a workflow action and returns the updated entry.
///
/// The state graph is draft -> submitted -> {read, need_revision} ->
/// approved, with need_revision -> submitted as the only backward edge.
/// Approved is terminal. The function is pure: timestamps are left to
/// the storage layer.
pub fn transition(
    entry: &JournalEntry,
    action: JournalAction,
    actor: Role,
    note: Option<&str>,
) -> Result<JournalEntry, WorkflowError> {
    use VerificationStatus::*;

    let from = entry.verification_status;
    let illegal = || WorkflowError::IllegalTransition { from, action };

    let mut next = entry.clone();
    match action {
        JournalAction::SaveDraft => {
            if from == Approved {
                return Err(illegal());
            }
            validate_content(&entry.content)?;
            // Editing does not move the workflow; a draft stays a
            // draft and an entry under revision stays under revision.
        }
        JournalAction::Submit => {
            if !matches!(from, Draft | NeedRevision) {
                return Err(illegal());
            }
            validate_content(&entry.content)?;
            next.verification_status = Submitted;
        }
        JournalAction::MarkRead => {
            if !actor.is_reviewer() {
                return Err(WorkflowError::NotPermitted(action));
            }
            if from != Submitted {
                return Err(illegal());
            }
            next.verification_status = Read;
        }
        JournalAction::Approve => {
            if !actor.is_reviewer() {
                return Err(WorkflowError::NotPermitted(action));
            }
            if !matches!(from, Submitted | Read | NeedRevision) {
                return Err(illegal());
            }
            next.verification_status = Approved;
            if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
                next.manager_notes = Some(note.to_string());
            }
        }
        JournalAction::RequestRevision => {
            if !actor.is_reviewer() {
                return Err(WorkflowError::NotPermitted(action));
            }
            if !matches!(from, Submitted | Read) {
                return Err(illegal());
            }
            let note = note.map(str::trim).filter(|n| !n.is_empty()).ok_or_else(|| {
                WorkflowError::Validation(
                    "a revision request needs a note describing the correction".to_string(),
                )
            })?;
            next.verification_status = NeedRevision;
            next.manager_notes = Some(note.to_string());
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn entry(state: VerificationStatus, content: &str) -> JournalEntry {
        let now = Utc::now();
        JournalEntry {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            activity_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            content: content.to_string(),
            work_result: crate::domain::models::WorkResult::InProgress,
            obstacles: None,
            mood: None,
            duration_minutes: 420,
            verification_status: state,
            manager_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn approved_entry_is_locked_for_employee() {
        let perms = permissions(VerificationStatus::Approved, Role::Employee);
        assert!(!perms.can_edit);
        assert!(!perms.can_delete);
        assert!(perms.is_locked);
    }

    #[test]
    fn read_entry_is_locked_for_employee_but_not_reviewer() {
        let employee = permissions(VerificationStatus::Read, Role::Employee);
        assert!(!employee.can_edit);
        assert!(employee.is_locked);

        let manager = permissions(VerificationStatus::Read, Role::Manager);
        assert!(manager.can_edit);
        assert!(manager.can_delete);
        assert!(!manager.is_locked);
    }

    #[test]
    fn reviewer_keeps_override_on_approved_entries() {
        for role in [Role::Manager, Role::Admin] {
            let perms = permissions(VerificationStatus::Approved, role);
            assert!(perms.can_edit);
            assert!(perms.can_delete);
        }
    }

    #[test]
    fn submit_enforces_minimum_content_length() {
        let short = entry(VerificationStatus::Draft, "123456789");
        assert!(matches!(
            transition(&short, JournalAction::Submit, Role::Employee, None),
            Err(WorkflowError::Validation(_))
        ));

        let exact = entry(VerificationStatus::Draft, "1234567890");
        let next = transition(&exact, JournalAction::Submit, Role::Employee, None).unwrap();
        assert_eq!(next.verification_status, VerificationStatus::Submitted);
    }

    #[test]
    fn submit_trims_before_measuring() {
        let padded = entry(VerificationStatus::Draft, "   short    ");
        assert!(matches!(
            transition(&padded, JournalAction::Submit, Role::Employee, None),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn resubmission_is_the_only_backward_edge() {
        let revised = entry(VerificationStatus::NeedRevision, "rewrote the summary");
        let next = transition(&revised, JournalAction::Submit, Role::Employee, None).unwrap();
        assert_eq!(next.verification_status, VerificationStatus::Submitted);

        let read = entry(VerificationStatus::Read, "rewrote the summary");
        assert!(matches!(
            transition(&read, JournalAction::Submit, Role::Employee, None),
            Err(WorkflowError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn revision_request_requires_a_note() {
        let submitted = entry(VerificationStatus::Submitted, "finished the migration");
        assert!(matches!(
            transition(
                &submitted,
                JournalAction::RequestRevision,
                Role::Manager,
                Some("")
            ),
            Err(WorkflowError::Validation(_))
        ));
        assert!(matches!(
            transition(&submitted, JournalAction::RequestRevision, Role::Manager, None),
            Err(WorkflowError::Validation(_))
        ));

        let next = transition(
            &submitted,
            JournalAction::RequestRevision,
            Role::Manager,
            Some("add the ticket numbers"),
        )
        .unwrap();
        assert_eq!(next.verification_status, VerificationStatus::NeedRevision);
        assert_eq!(next.manager_notes.as_deref(), Some("add the ticket numbers"));
    }

    #[test]
    fn approve_is_reviewer_only_and_terminal() {
        let submitted = entry(VerificationStatus::Submitted, "finished the migration");
        assert!(matches!(
            transition(&submitted, JournalAction::Approve, Role::Employee, None),
            Err(WorkflowError::NotPermitted(_))
        ));

        let approved =
            transition(&submitted, JournalAction::Approve, Role::Manager, Some("good")).unwrap();
        assert_eq!(approved.verification_status, VerificationStatus::Approved);
        assert_eq!(approved.manager_notes.as_deref(), Some("good"));

        assert!(matches!(
            transition(&approved, JournalAction::Approve, Role::Manager, None),
            Err(WorkflowError::IllegalTransition { .. })
        ));
        assert!(matches!(
            transition(&approved, JournalAction::SaveDraft, Role::Employee, None),
            Err(WorkflowError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn mark_read_only_from_submitted() {
        let submitted = entry(VerificationStatus::Submitted, "finished the migration");
        let read = transition(&submitted, JournalAction::MarkRead, Role::Manager, None).unwrap();
        assert_eq!(read.verification_status, VerificationStatus::Read);

        assert!(matches!(
            transition(&read, JournalAction::MarkRead, Role::Manager, None),
            Err(WorkflowError::IllegalTransition { .. })
        ));
    }
}
