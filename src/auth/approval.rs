use crate::auth::gate::{AuthError, Authenticator, BiometricGate};
use crate::memo::models::{MemoAction, MemoStatus};
use crate::storage::{KvBackend, MemoStore};
use log::{info, warn};

/// When the biometric prompt has to be passed before a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatePolicy {
    /// Prompt; refuse the change if the device cannot authenticate.
    #[default]
    Required,
    /// Prompt when possible; commit without a prompt on devices with no biometrics.
    BypassWhenUnavailable,
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Committed(MemoAction),
    /// Confirmed, but the store rejected the write. The memo keeps its old status.
    WriteFailed(MemoAction),
    MemoNotFound,
    GateUnavailable,
    /// The prompt failed or was dismissed. Nothing was written.
    Declined { error: AuthError, alert: bool },
}

/// Runs the confirmation prompt and commits the status change only behind it.
pub struct ApprovalDesk<'a, B, A> {
    store: &'a MemoStore<B>,
    gate: &'a BiometricGate<A>,
    policy: GatePolicy,
}

impl<'a, B: KvBackend, A: Authenticator> ApprovalDesk<'a, B, A> {
    pub fn new(store: &'a MemoStore<B>, gate: &'a BiometricGate<A>, policy: GatePolicy) -> Self {
        Self {
            store,
            gate,
            policy,
        }
    }

    pub async fn decide(
        &self,
        memo_id: &str,
        status: MemoStatus,
        comment: Option<String>,
    ) -> Decision {
        if self.store.memo(memo_id).is_none() {
            return Decision::MemoNotFound;
        }

        match self.policy {
            GatePolicy::Disabled => {}
            policy => {
                if !self.gate.is_available().await {
                    if policy != GatePolicy::BypassWhenUnavailable {
                        return Decision::GateUnavailable;
                    }
                    info!("Biometrics unavailable, committing memo {memo_id} without a prompt");
                } else {
                    let outcome = self.gate.authenticate_for_memo_action(status.verb()).await;
                    if !outcome.success {
                        let error = outcome.error.unwrap_or(AuthError::Failed);
                        warn!("Memo {memo_id} {status} not confirmed: {error}");
                        let alert = error.should_alert();
                        return Decision::Declined { error, alert };
                    }
                }
            }
        }

        match self.store.change_memo_status(memo_id, status, comment) {
            Some(change) if change.saved => Decision::Committed(change.action),
            Some(change) => Decision::WriteFailed(change.action),
            None => Decision::MemoNotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::gate::Platform;
    use crate::auth::gate::tests::ScriptedAuthenticator;
    use crate::memo::seed::seed_sample_data;
    use crate::storage::MemoryKv;
    use crate::storage::tests::ReadOnlyKv;

    fn seeded() -> MemoStore<MemoryKv> {
        let store = MemoStore::new(MemoryKv::new());
        seed_sample_data(&store);
        store
    }

    #[tokio::test]
    async fn successful_prompt_commits_the_change() {
        let store = seeded();
        let gate = BiometricGate::new(ScriptedAuthenticator::succeeding(), Platform::Ios);
        let desk = ApprovalDesk::new(&store, &gate, GatePolicy::Required);

        let decision = desk.decide("5", MemoStatus::Approved, Some("ok".into())).await;

        let action = match decision {
            Decision::Committed(action) => action,
            other => panic!("expected a committed decision, got {other:?}"),
        };
        assert_eq!(action.comment.as_deref(), Some("ok"));
        assert_eq!(store.memo("5").unwrap().status, MemoStatus::Approved);
        let prompts = gate.authenticator().prompts.lock().unwrap();
        assert_eq!(prompts[0].prompt_message, "Use Biometrics to approve this memo");
    }

    #[tokio::test]
    async fn rejected_write_is_not_reported_as_committed() {
        let store = MemoStore::new(ReadOnlyKv::from_store(seeded()));
        let gate = BiometricGate::new(ScriptedAuthenticator::succeeding(), Platform::Ios);
        let desk = ApprovalDesk::new(&store, &gate, GatePolicy::Required);

        let decision = desk.decide("1", MemoStatus::Approved, None).await;

        assert!(matches!(
            decision,
            Decision::WriteFailed(ref action) if action.action == MemoStatus::Approved
        ));
        assert_eq!(store.memo("1").unwrap().status, MemoStatus::Pending);
        assert!(store.actions().is_empty());
    }

    #[tokio::test]
    async fn cancelled_prompt_writes_nothing() {
        let store = seeded();
        let gate = BiometricGate::new(ScriptedAuthenticator::failing("UserCancel"), Platform::Ios);
        let desk = ApprovalDesk::new(&store, &gate, GatePolicy::Required);

        let decision = desk.decide("1", MemoStatus::Rejected, None).await;

        assert_eq!(
            decision,
            Decision::Declined {
                error: AuthError::Cancelled,
                alert: false
            }
        );
        assert_eq!(store.memo("1").unwrap().status, MemoStatus::Pending);
        assert!(store.actions().is_empty());
    }

    #[tokio::test]
    async fn failed_prompt_asks_for_an_alert() {
        let store = seeded();
        let gate = BiometricGate::new(
            ScriptedAuthenticator::failing("AuthenticationFailed"),
            Platform::Android,
        );
        let desk = ApprovalDesk::new(&store, &gate, GatePolicy::BypassWhenUnavailable);

        let decision = desk.decide("1", MemoStatus::Approved, None).await;

        assert_eq!(
            decision,
            Decision::Declined {
                error: AuthError::Failed,
                alert: true
            }
        );
        assert!(store.actions().is_empty());
    }

    #[tokio::test]
    async fn unavailable_gate_blocks_unless_bypass_is_allowed() {
        let store = seeded();
        let gate = BiometricGate::new(ScriptedAuthenticator::unavailable(), Platform::Ios);

        let strict = ApprovalDesk::new(&store, &gate, GatePolicy::Required);
        assert_eq!(
            strict.decide("4", MemoStatus::Approved, None).await,
            Decision::GateUnavailable
        );
        assert_eq!(store.memo("4").unwrap().status, MemoStatus::Pending);

        let lenient = ApprovalDesk::new(&store, &gate, GatePolicy::BypassWhenUnavailable);
        assert!(matches!(
            lenient.decide("4", MemoStatus::Approved, None).await,
            Decision::Committed(_)
        ));
        assert_eq!(store.memo("4").unwrap().status, MemoStatus::Approved);
        assert_eq!(gate.authenticator().prompt_count(), 0);
    }

    #[tokio::test]
    async fn disabled_gate_never_prompts() {
        let store = seeded();
        let gate = BiometricGate::new(ScriptedAuthenticator::failing("UserCancel"), Platform::Ios);
        let desk = ApprovalDesk::new(&store, &gate, GatePolicy::Disabled);

        assert!(matches!(
            desk.decide("3", MemoStatus::Archived, None).await,
            Decision::Committed(_)
        ));
        assert_eq!(gate.authenticator().prompt_count(), 0);
    }

    #[tokio::test]
    async fn missing_memo_is_reported_before_prompting() {
        let store = seeded();
        let gate = BiometricGate::new(ScriptedAuthenticator::succeeding(), Platform::Ios);
        let desk = ApprovalDesk::new(&store, &gate, GatePolicy::Required);

        assert_eq!(
            desk.decide("nonexistent", MemoStatus::Approved, None).await,
            Decision::MemoNotFound
        );
        assert_eq!(gate.authenticator().prompt_count(), 0);
        assert!(store.actions().is_empty());
    }
}
