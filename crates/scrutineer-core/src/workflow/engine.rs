//! Approval workflow engine.
//!
//! Sequences checker, proposer, gate and ledger for one run, driving the pure
//! state machine in [`super::state_machine`]. Runs suspend at the gate by
//! parking a [`SuspendedRun`] in the session; [`ApprovalWorkflow::resume`]
//! picks them up again, possibly in another process.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use scrutineer_state::{MemoryEntry, MemoryEntryKind, MemoryService};

use super::state_machine::{transition, WorkflowEvent, WorkflowState};
use crate::checker::{CheckOutcome, ComplianceChecker, ComplianceJudge};
use crate::domain::{CommitPath, ComplianceVerdict, Result, RunOutcome, WorkflowError};
use crate::hitl::{confirm_suggestion, ConfirmationDecision, ConfirmationRequest, GateResponse};
use crate::obs;
use crate::proposer::{propose_alternative, AlternativeProposer};
use crate::rules::RuleStore;
use crate::session::{SessionState, SuspendedRun};

/// States visited by one run.
struct Trail {
    run_id: Uuid,
    states: Vec<WorkflowState>,
}

impl Trail {
    fn start(run_id: Uuid) -> Self {
        Self {
            run_id,
            states: vec![WorkflowState::Checking],
        }
    }

    fn resume(run: &SuspendedRun) -> Self {
        Self {
            run_id: run.run_id,
            states: run.trail.clone(),
        }
    }

    fn current(&self) -> WorkflowState {
        self.states
            .last()
            .copied()
            .unwrap_or(WorkflowState::Checking)
    }

    fn advance(&mut self, event: WorkflowEvent) -> Result<WorkflowState> {
        let next = transition(self.current(), event)?;
        tracing::debug!(
            run_id = %self.run_id,
            from = %self.current(),
            event = %event,
            to = %next,
            "transition"
        );
        self.states.push(next);
        Ok(next)
    }

    /// Record a collaborator failure, then hand the error back.
    fn fail(&mut self, err: WorkflowError) -> WorkflowError {
        if let Err(e) = self.advance(WorkflowEvent::Failed) {
            tracing::debug!(run_id = %self.run_id, error = %e, "failure in terminal state");
        }
        obs::emit_run_failed(&self.run_id, &err);
        err
    }
}

/// The multi-agent approval workflow.
///
/// Owns the collaborators; session state is passed in by the caller so that
/// ledger appends are serialized by whoever holds `&mut SessionState`.
pub struct ApprovalWorkflow {
    checker: ComplianceChecker,
    proposer: Arc<dyn AlternativeProposer>,
    memory: Option<Arc<dyn MemoryService>>,
    revalidate_alternatives: bool,
    memory_writes: Mutex<Vec<JoinHandle<()>>>,
}

impl ApprovalWorkflow {
    pub fn new(
        rules: Arc<RuleStore>,
        judge: Arc<dyn ComplianceJudge>,
        proposer: Arc<dyn AlternativeProposer>,
    ) -> Self {
        Self {
            checker: ComplianceChecker::new(rules, judge),
            proposer,
            memory: None,
            revalidate_alternatives: false,
            memory_writes: Mutex::new(Vec::new()),
        }
    }

    /// Write a session snapshot to long-term memory after every run.
    pub fn with_memory(mut self, memory: Arc<dyn MemoryService>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Re-check suggested replacements and attach the verdict to the request.
    pub fn with_revalidation(mut self, enabled: bool) -> Self {
        self.revalidate_alternatives = enabled;
        self
    }

    pub fn rules(&self) -> &RuleStore {
        self.checker.rules()
    }

    /// Start a run for a new task.
    ///
    /// Returns once the run is committed, stopped, or suspended at the gate.
    pub async fn submit(
        &self,
        session: &mut SessionState,
        category: &str,
        task: &str,
    ) -> Result<RunOutcome> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        let outcome = async {
            obs::emit_run_started(&run_id, session.session_id.as_str(), category);
            let mut trail = Trail::start(run_id);
            self.drive_submit(&mut trail, session, category, task).await
        }
        .instrument(obs::run_span(&run_id))
        .await?;

        self.finish(session, &outcome, started);
        Ok(outcome)
    }

    /// Resume a suspended run with a reviewer decision.
    ///
    /// # Errors
    ///
    /// `WorkflowError::UnknownRun` if the session has no such suspended run.
    pub async fn resume(
        &self,
        session: &mut SessionState,
        run_id: Uuid,
        decision: ConfirmationDecision,
    ) -> Result<RunOutcome> {
        let started = Instant::now();
        let suspended = session
            .pending_run(&run_id)
            .cloned()
            .ok_or(WorkflowError::UnknownRun(run_id))?;

        let outcome = async {
            obs::emit_run_resumed(&run_id, session.session_id.as_str());
            let mut trail = Trail::resume(&suspended);
            self.drive_resume(&mut trail, session, suspended.request, &decision)
        }
        .instrument(obs::run_span(&run_id))
        .await?;

        self.finish(session, &outcome, started);
        Ok(outcome)
    }

    /// Memory writes scheduled but not yet reaped.
    pub fn pending_memory_writes(&self) -> usize {
        self.memory_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Wait for every outstanding long-term memory write.
    pub async fn flush_memory(&self) {
        let handles: Vec<_> = {
            let mut writes = self
                .memory_writes
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            writes.drain(..).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(event = "memory.write_join_error", error = %e);
            }
        }
    }

    // -- private helpers -----------------------------------------------------

    async fn drive_submit(
        &self,
        trail: &mut Trail,
        session: &mut SessionState,
        category: &str,
        task: &str,
    ) -> Result<RunOutcome> {
        let run_id = trail.run_id;

        let check = self
            .checker
            .check(category, task)
            .await
            .map_err(|e| trail.fail(WorkflowError::Judge(e)))?;

        let (category, verdict) = match check {
            CheckOutcome::CategoryNotFound(not_found) => {
                trail.advance(WorkflowEvent::CategoryNotFound)?;
                return Ok(RunOutcome::CategoryNotFound { run_id, not_found });
            }
            CheckOutcome::Verdict { category, verdict } => (category, verdict),
        };

        if verdict.compliant {
            trail.advance(WorkflowEvent::Compliant)?;
            let ack = session.append(task);
            obs::emit_task_committed(&run_id, session.tasks.len());
            trail.advance(WorkflowEvent::Committed)?;
            return Ok(RunOutcome::Committed {
                run_id,
                category,
                task: task.to_string(),
                path: CommitPath::Compliant,
                ack,
                message: None,
            });
        }

        trail.advance(WorkflowEvent::NonCompliant)?;
        let replacement = propose_alternative(self.proposer.as_ref(), task, &verdict.reason)
            .await
            .map_err(|e| trail.fail(e))?;

        let recheck = if self.revalidate_alternatives {
            let verdict = self
                .recheck(&category, &replacement)
                .await
                .map_err(|e| trail.fail(e))?;
            Some(verdict)
        } else {
            None
        };
        obs::emit_alternative_proposed(&run_id, recheck.as_ref().map(|v| v.compliant));

        let mut request = ConfirmationRequest::new(
            run_id,
            category,
            task,
            replacement,
            verdict.reason,
            Utc::now(),
        )
        .map_err(|e| trail.fail(e.into()))?;
        if let Some(v) = recheck {
            request = request.with_suggestion_check(v);
        }

        trail.advance(WorkflowEvent::ProposalReady)?;
        match confirm_suggestion(&request, None)? {
            GateResponse::PendingApproval => {
                session.suspend(SuspendedRun {
                    run_id,
                    request: request.clone(),
                    trail: trail.states.clone(),
                    suspended_at: Utc::now(),
                });
                Ok(RunOutcome::AwaitingConfirmation { run_id, request })
            }
            resolved => {
                let err = WorkflowError::InvalidTransition {
                    from: trail.current(),
                    event: if resolved.allows_proceed() {
                        WorkflowEvent::Approved
                    } else {
                        WorkflowEvent::Rejected
                    },
                };
                Err(trail.fail(err))
            }
        }
    }

    fn drive_resume(
        &self,
        trail: &mut Trail,
        session: &mut SessionState,
        request: ConfirmationRequest,
        decision: &ConfirmationDecision,
    ) -> Result<RunOutcome> {
        let run_id = trail.run_id;
        let response = confirm_suggestion(&request, Some(decision))?;

        match response {
            GateResponse::Approved { message } => {
                trail.advance(WorkflowEvent::Approved)?;
                session.resolve(&run_id);
                let ack = session.append(request.suggested_replacement.as_str());
                obs::emit_task_committed(&run_id, session.tasks.len());
                trail.advance(WorkflowEvent::Committed)?;
                Ok(RunOutcome::Committed {
                    run_id,
                    category: request.category,
                    task: request.suggested_replacement,
                    path: CommitPath::ApprovedReplacement,
                    ack,
                    message: Some(message),
                })
            }
            GateResponse::Rejected { message } => {
                trail.advance(WorkflowEvent::Rejected)?;
                session.resolve(&run_id);
                Ok(RunOutcome::Rejected {
                    run_id,
                    request,
                    message,
                })
            }
            GateResponse::PendingApproval => Err(WorkflowError::InvalidTransition {
                from: trail.current(),
                event: WorkflowEvent::ProposalReady,
            }),
        }
    }

    async fn recheck(&self, category: &str, replacement: &str) -> Result<ComplianceVerdict> {
        match self
            .checker
            .check(category, replacement)
            .await
            .map_err(WorkflowError::Judge)?
        {
            CheckOutcome::Verdict { verdict, .. } => Ok(verdict),
            CheckOutcome::CategoryNotFound(nf) => {
                Ok(ComplianceVerdict::non_compliant(nf.to_string()))
            }
        }
    }

    /// Log the resting state and schedule the memory write.
    fn finish(&self, session: &SessionState, outcome: &RunOutcome, started: Instant) {
        let run_id = outcome.run_id();
        obs::emit_run_finished(
            &run_id,
            &outcome.state(),
            started.elapsed().as_millis() as u64,
        );

        let Some(memory) = self.memory.clone() else {
            return;
        };

        let entries = vec![
            MemoryEntry::new(
                session.session_id.clone(),
                Some(run_id.to_string()),
                MemoryEntryKind::RunOutcome,
                outcome.summary(),
            ),
            MemoryEntry::new(
                session.session_id.clone(),
                Some(run_id.to_string()),
                MemoryEntryKind::SessionSnapshot,
                session.snapshot_text(),
            ),
        ];

        let handle = tokio::spawn(
            async move {
                for entry in entries {
                    if let Err(e) = memory.add_session_to_memory(entry).await {
                        obs::emit_memory_persist_error(&run_id, &e);
                    }
                }
            }
            .instrument(obs::run_span(&run_id)),
        );

        let mut writes = self
            .memory_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        writes.retain(|h| !h.is_finished());
        writes.push(handle);
    }
}
