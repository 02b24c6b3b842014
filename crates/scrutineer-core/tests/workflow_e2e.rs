//! End-to-end approval runs with scripted judgment ports.

use std::sync::Arc;

use scrutineer_core::domain::{CommitPath, ComplianceVerdict, RunOutcome, WorkflowError};
use scrutineer_core::fakes::{ScriptedJudge, ScriptedProposer};
use scrutineer_core::hitl::{ConfirmationDecision, HitlError};
use scrutineer_core::rules::RuleStore;
use scrutineer_core::session::SessionState;
use scrutineer_core::workflow::{transition, ApprovalWorkflow, WorkflowEvent, WorkflowState};
use scrutineer_state::fakes::{FailingMemoryService, InMemoryMemoryService, MemorySessionStore};
use scrutineer_state::{
    FsSessionStore, MemoryEntryKind, MemoryQuery, MemoryService, SessionId, SessionStore,
    StorageError,
};
use uuid::Uuid;

const RESTRICTOR_22: &str = "Fit a 22mm intake restrictor to the gasoline engine";
const RESTRICTOR_20: &str = "Fit a 20mm intake restrictor to the gasoline engine";
const GASOLINE_REASON: &str =
    "Violates 'Restrictor Diameter (Gasoline)': maximum restrictor diameter is 20mm.";

fn session() -> SessionState {
    SessionState::new(SessionId::new("team-alpha").unwrap())
}

fn restrictor_judge() -> ScriptedJudge {
    ScriptedJudge::always(ComplianceVerdict::compliant("Within all Powertrain rules."))
        .when_contains("22mm", ComplianceVerdict::non_compliant(GASOLINE_REASON))
}

fn workflow(judge: ScriptedJudge, proposer: ScriptedProposer) -> ApprovalWorkflow {
    ApprovalWorkflow::new(
        Arc::new(RuleStore::builtin()),
        Arc::new(judge),
        Arc::new(proposer),
    )
}

fn pending_request_id(outcome: &RunOutcome) -> (Uuid, String) {
    match outcome {
        RunOutcome::AwaitingConfirmation { run_id, request } => {
            (*run_id, request.request_id.clone())
        }
        other => panic!("expected AwaitingConfirmation, got {other:?}"),
    }
}

#[tokio::test]
async fn compliant_task_is_committed_as_is() {
    let wf = workflow(restrictor_judge(), ScriptedProposer::always("unused"));
    let mut s = session();
    s.append("Earlier task");

    let outcome = wf
        .submit(&mut s, "Chassis", "Use 25mm steel tubing for the main hoop")
        .await
        .unwrap();

    match &outcome {
        RunOutcome::Committed {
            path,
            ack,
            message,
            category,
            ..
        } => {
            assert_eq!(*path, CommitPath::Compliant);
            assert_eq!(category, "Chassis");
            assert_eq!(
                ack,
                "Task 'Use 25mm steel tubing for the main hoop' added to the ledger."
            );
            assert!(message.is_none());
        }
        other => panic!("expected Committed, got {other:?}"),
    }
    assert_eq!(outcome.state(), WorkflowState::Done);
    assert_eq!(
        s.list(),
        ["Earlier task", "Use 25mm steel tubing for the main hoop"]
    );
}

#[tokio::test]
async fn non_compliant_task_suspends_without_touching_ledger() {
    let proposer = Arc::new(ScriptedProposer::always(RESTRICTOR_20));
    let wf = ApprovalWorkflow::new(
        Arc::new(RuleStore::builtin()),
        Arc::new(restrictor_judge()),
        proposer.clone(),
    );
    let mut s = session();

    let outcome = wf
        .submit(&mut s, "Powertrain", RESTRICTOR_22)
        .await
        .unwrap();

    let RunOutcome::AwaitingConfirmation { run_id, request } = &outcome else {
        panic!("expected AwaitingConfirmation, got {outcome:?}");
    };
    assert_eq!(request.original_task, RESTRICTOR_22);
    assert_eq!(request.suggested_replacement, RESTRICTOR_20);
    assert!(request.reason.contains("Restrictor Diameter (Gasoline)"));
    assert!(request.suggestion_check.is_none());
    assert!(s.list().is_empty());
    assert!(s.pending_run(run_id).is_some());
    assert_eq!(
        proposer.calls(),
        vec![(RESTRICTOR_22.to_string(), GASOLINE_REASON.to_string())]
    );
}

#[tokio::test]
async fn rejected_replacement_leaves_ledger_unchanged() {
    let wf = workflow(restrictor_judge(), ScriptedProposer::always(RESTRICTOR_20));
    let mut s = session();
    s.append("Existing");

    let outcome = wf.submit(&mut s, "Powertrain", RESTRICTOR_22).await.unwrap();
    let (run_id, request_id) = pending_request_id(&outcome);

    let decision = ConfirmationDecision::reject(request_id)
        .with_comment(Some("Keep the stock part".to_string()));
    let outcome = wf.resume(&mut s, run_id, decision).await.unwrap();

    match &outcome {
        RunOutcome::Rejected { message, .. } => {
            assert_eq!(message, "User rejected. Comment: Keep the stock part");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(outcome.state(), WorkflowState::Stopped);
    assert_eq!(s.list(), ["Existing"]);
    assert!(s.pending.is_empty());
}

#[tokio::test]
async fn approved_replacement_is_committed_instead_of_original() {
    let wf = workflow(restrictor_judge(), ScriptedProposer::always(RESTRICTOR_20));
    let mut s = session();

    let outcome = wf.submit(&mut s, "Powertrain", RESTRICTOR_22).await.unwrap();
    let (run_id, request_id) = pending_request_id(&outcome);

    let outcome = wf
        .resume(&mut s, run_id, ConfirmationDecision::approve(request_id))
        .await
        .unwrap();

    match &outcome {
        RunOutcome::Committed {
            task,
            path,
            message,
            ..
        } => {
            assert_eq!(task, RESTRICTOR_20);
            assert_eq!(*path, CommitPath::ApprovedReplacement);
            assert_eq!(
                message.as_deref(),
                Some(
                    "User approved. Proceeding with: \
                     'Fit a 20mm intake restrictor to the gasoline engine'."
                )
            );
        }
        other => panic!("expected Committed, got {other:?}"),
    }
    assert_eq!(s.list(), [RESTRICTOR_20]);
    assert!(s.list().iter().all(|t| !t.contains("22mm")));
    assert!(s.pending.is_empty());
}

#[tokio::test]
async fn unknown_category_stops_without_asking_the_judge() {
    let judge = Arc::new(restrictor_judge());
    let wf = ApprovalWorkflow::new(
        Arc::new(RuleStore::builtin()),
        judge.clone(),
        Arc::new(ScriptedProposer::always("unused")),
    );
    let mut s = session();

    let outcome = wf.submit(&mut s, "Nonexistent", "Anything").await.unwrap();

    match &outcome {
        RunOutcome::CategoryNotFound { not_found, .. } => {
            assert_eq!(not_found.valid_categories.len(), 8);
        }
        other => panic!("expected CategoryNotFound, got {other:?}"),
    }
    assert_eq!(outcome.state(), WorkflowState::Stopped);
    assert!(judge.calls().is_empty());
    assert!(s.list().is_empty());
}

#[tokio::test]
async fn suspended_run_survives_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let sid = SessionId::new("garage").unwrap();

    let (run_id, request_id) = {
        let store = FsSessionStore::new(dir.path()).unwrap();
        let wf = workflow(restrictor_judge(), ScriptedProposer::always(RESTRICTOR_20));
        let mut s = SessionState::load(&store, &sid).await.unwrap();
        let outcome = wf.submit(&mut s, "powertrain", RESTRICTOR_22).await.unwrap();
        s.save(&store).await.unwrap();
        pending_request_id(&outcome)
    };

    // A fresh store and workflow, as a second process would have.
    let store = FsSessionStore::new(dir.path()).unwrap();
    assert_eq!(store.list_sessions().await.unwrap(), vec![sid.clone()]);
    let wf = workflow(restrictor_judge(), ScriptedProposer::always("unused"));
    let mut s = SessionState::load(&store, &sid).await.unwrap();
    let pending = s.pending_run(&run_id).unwrap();
    assert_eq!(
        pending.trail.last(),
        Some(&WorkflowState::AwaitingConfirmation)
    );

    let outcome = wf
        .resume(&mut s, run_id, ConfirmationDecision::approve(request_id))
        .await
        .unwrap();
    s.save(&store).await.unwrap();

    assert_eq!(outcome.state(), WorkflowState::Done);
    let reloaded = SessionState::load(&store, &sid).await.unwrap();
    assert_eq!(reloaded.list(), [RESTRICTOR_20]);
    assert!(reloaded.pending.is_empty());
}

#[tokio::test]
async fn failing_memory_service_does_not_change_outcome() {
    let memory = Arc::new(FailingMemoryService::new());
    let wf = workflow(restrictor_judge(), ScriptedProposer::always(RESTRICTOR_20))
        .with_memory(memory.clone());
    let mut s = session();

    let outcome = wf
        .submit(&mut s, "Aerodynamics", "Mount the rear wing 1.1m above ground")
        .await
        .unwrap();
    wf.flush_memory().await;

    assert_eq!(outcome.state(), WorkflowState::Done);
    assert_eq!(s.list(), ["Mount the rear wing 1.1m above ground"]);
    assert_eq!(memory.attempts(), 2);
}

#[tokio::test]
async fn every_resting_state_is_written_to_memory() {
    let memory = Arc::new(InMemoryMemoryService::new());
    let wf = workflow(restrictor_judge(), ScriptedProposer::always(RESTRICTOR_20))
        .with_memory(memory.clone());
    let mut s = session();

    let outcome = wf.submit(&mut s, "Powertrain", RESTRICTOR_22).await.unwrap();
    let (run_id, request_id) = pending_request_id(&outcome);
    wf.resume(&mut s, run_id, ConfirmationDecision::approve(request_id))
        .await
        .unwrap();
    wf.flush_memory().await;

    // One outcome plus one snapshot for the suspension and again for the commit.
    assert_eq!(memory.len(), 4);
    let outcomes = memory
        .search(&MemoryQuery::all().with_kind(MemoryEntryKind::RunOutcome))
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    let run_id = run_id.to_string();
    assert!(outcomes
        .iter()
        .all(|e| e.run_id.as_deref() == Some(run_id.as_str())));

    let hits = memory
        .search(
            &MemoryQuery::all()
                .with_text("20mm")
                .with_kind(MemoryEntryKind::SessionSnapshot),
        )
        .await
        .unwrap();
    assert!(hits
        .iter()
        .any(|e| e.content.contains(&format!("1. {RESTRICTOR_20}"))));
}

#[tokio::test]
async fn finished_memory_writes_are_reaped() {
    let memory = Arc::new(InMemoryMemoryService::new());
    let wf = workflow(restrictor_judge(), ScriptedProposer::always(RESTRICTOR_20))
        .with_memory(memory.clone());
    let mut s = session();

    for i in 1..=25 {
        let task = format!("Gusset joint {i}");
        wf.submit(&mut s, "Chassis", &task).await.unwrap();
        while memory.len() < 2 * i {
            tokio::task::yield_now().await;
        }
        assert_eq!(wf.pending_memory_writes(), 1);
    }

    wf.flush_memory().await;
    assert_eq!(wf.pending_memory_writes(), 0);
    assert_eq!(s.list().len(), 25);
}

#[tokio::test]
async fn revalidation_attaches_recheck_verdict() {
    let judge = ScriptedJudge::always(ComplianceVerdict::compliant("20mm is within limits."))
        .when_contains("22mm", ComplianceVerdict::non_compliant(GASOLINE_REASON));
    let wf = workflow(judge, ScriptedProposer::always(RESTRICTOR_20)).with_revalidation(true);
    let mut s = session();

    let outcome = wf.submit(&mut s, "Powertrain", RESTRICTOR_22).await.unwrap();

    let RunOutcome::AwaitingConfirmation { request, .. } = outcome else {
        panic!("expected AwaitingConfirmation");
    };
    let check = request.suggestion_check.unwrap();
    assert!(check.compliant);
    assert_eq!(check.reason, "20mm is within limits.");
}

#[tokio::test]
async fn judge_failure_stops_run_and_keeps_ledger() {
    let wf = workflow(
        ScriptedJudge::failing("model quota exhausted"),
        ScriptedProposer::always("unused"),
    );
    let mut s = session();
    s.append("Existing");

    let err = wf
        .submit(&mut s, "Powertrain", RESTRICTOR_22)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Judge(_)));
    assert_eq!(s.list(), ["Existing"]);
    assert!(s.pending.is_empty());
}

#[tokio::test]
async fn blank_proposal_is_an_error() {
    let wf = workflow(restrictor_judge(), ScriptedProposer::always("   "));
    let mut s = session();

    let err = wf
        .submit(&mut s, "Powertrain", RESTRICTOR_22)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::BlankProposal { .. }));
    assert!(s.list().is_empty());
    assert!(s.pending.is_empty());
}

#[tokio::test]
async fn resume_unknown_run_is_an_error() {
    let wf = workflow(restrictor_judge(), ScriptedProposer::always(RESTRICTOR_20));
    let mut s = session();
    let missing = Uuid::new_v4();

    let err = wf
        .resume(&mut s, missing, ConfirmationDecision::approve("req"))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::UnknownRun(id) if id == missing));
}

#[tokio::test]
async fn mismatched_decision_keeps_run_pending() {
    let wf = workflow(restrictor_judge(), ScriptedProposer::always(RESTRICTOR_20));
    let mut s = session();

    let outcome = wf.submit(&mut s, "Powertrain", RESTRICTOR_22).await.unwrap();
    let (run_id, _) = pending_request_id(&outcome);

    let err = wf
        .resume(
            &mut s,
            run_id,
            ConfirmationDecision::approve("someone-elses-request"),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Hitl(HitlError::RequestMismatch { .. })
    ));
    assert!(s.pending_run(&run_id).is_some());
    assert!(s.list().is_empty());
}

#[tokio::test]
async fn resolved_run_cannot_be_resumed_twice() {
    let wf = workflow(restrictor_judge(), ScriptedProposer::always(RESTRICTOR_20));
    let mut s = session();

    let outcome = wf.submit(&mut s, "Powertrain", RESTRICTOR_22).await.unwrap();
    let (run_id, request_id) = pending_request_id(&outcome);
    wf.resume(&mut s, run_id, ConfirmationDecision::approve(request_id.clone()))
        .await
        .unwrap();

    let err = wf
        .resume(&mut s, run_id, ConfirmationDecision::approve(request_id))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownRun(_)));
    assert_eq!(s.list(), [RESTRICTOR_20]);
}

#[tokio::test]
async fn concurrent_writers_on_one_session_do_not_lose_commits() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsSessionStore::new(dir.path()).unwrap();
    let sid = SessionId::new("garage").unwrap();
    let wf = workflow(restrictor_judge(), ScriptedProposer::always("unused"));

    let mut first = SessionState::load(&store, &sid).await.unwrap();
    let mut second = SessionState::load(&store, &sid).await.unwrap();
    wf.submit(&mut first, "Chassis", "Use 25mm steel tubing")
        .await
        .unwrap();
    wf.submit(&mut second, "Drafting", "Submit the cost report")
        .await
        .unwrap();

    first.save(&store).await.unwrap();
    let err = second.save(&store).await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Session(StorageError::Conflict { .. })
    ));

    // The losing writer reloads and replays its task on top.
    let mut second = SessionState::load(&store, &sid).await.unwrap();
    wf.submit(&mut second, "Drafting", "Submit the cost report")
        .await
        .unwrap();
    second.save(&store).await.unwrap();

    let reloaded = SessionState::load(&store, &sid).await.unwrap();
    assert_eq!(
        reloaded.list(),
        ["Use 25mm steel tubing", "Submit the cost report"]
    );
}

#[tokio::test]
async fn commit_made_while_awaiting_confirmation_survives_resume() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsSessionStore::new(dir.path()).unwrap();
    let sid = SessionId::new("garage").unwrap();
    let wf = workflow(restrictor_judge(), ScriptedProposer::always(RESTRICTOR_20));

    let mut waiting = SessionState::load(&store, &sid).await.unwrap();
    let outcome = wf
        .submit(&mut waiting, "Powertrain", RESTRICTOR_22)
        .await
        .unwrap();
    waiting.save(&store).await.unwrap();
    let (run_id, request_id) = pending_request_id(&outcome);

    // Another writer commits while the first is waiting on the operator.
    let mut other = SessionState::load(&store, &sid).await.unwrap();
    wf.submit(&mut other, "Chassis", "Use 25mm steel tubing")
        .await
        .unwrap();
    other.save(&store).await.unwrap();

    // Resuming from the stale copy would drop the other commit.
    let mut stale = waiting.clone();
    wf.resume(
        &mut stale,
        run_id,
        ConfirmationDecision::approve(request_id.clone()),
    )
    .await
    .unwrap();
    assert!(stale.save(&store).await.is_err());

    let mut fresh = SessionState::load(&store, &sid).await.unwrap();
    wf.resume(&mut fresh, run_id, ConfirmationDecision::approve(request_id))
        .await
        .unwrap();
    fresh.save(&store).await.unwrap();

    let reloaded = SessionState::load(&store, &sid).await.unwrap();
    assert_eq!(reloaded.list(), ["Use 25mm steel tubing", RESTRICTOR_20]);
    assert!(reloaded.pending.is_empty());
}

#[tokio::test]
async fn sessions_are_isolated() {
    let store = MemorySessionStore::new();
    let wf = workflow(restrictor_judge(), ScriptedProposer::always(RESTRICTOR_20));

    let a_id = SessionId::new("a").unwrap();
    let b_id = SessionId::new("b").unwrap();
    let mut a = SessionState::load(&store, &a_id).await.unwrap();
    let mut b = SessionState::load(&store, &b_id).await.unwrap();
    wf.submit(&mut a, "Drafting", "Submit the cost report")
        .await
        .unwrap();
    a.save(&store).await.unwrap();
    b.save(&store).await.unwrap();

    let b = SessionState::load(&store, &b_id).await.unwrap();
    assert!(b.list().is_empty());
    let a = SessionState::load(&store, &a_id).await.unwrap();
    assert_eq!(a.list(), ["Submit the cost report"]);
}

#[test]
fn invalid_transitions_are_errors() {
    let err = transition(WorkflowState::Checking, WorkflowEvent::Approved).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidTransition {
            from: WorkflowState::Checking,
            event: WorkflowEvent::Approved,
        }
    ));
    assert!(transition(WorkflowState::Done, WorkflowEvent::Committed).is_err());
    assert!(
        transition(WorkflowState::AwaitingConfirmation, WorkflowEvent::Compliant).is_err()
    );
}
