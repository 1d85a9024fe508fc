use std::error::Error;

use shadowdag::dag::{Dag, DagBuilder, JobState};
use shadowdag::errors::DagError;
use shadowdag::jslog::{JobEvent, JobStateRecord};

type TestResult = Result<(), Box<dyn Error>>;

fn apply(dag: &Dag, job: &str, event: JobEvent) -> Result<(), DagError> {
    dag.apply_record(&JobStateRecord::new(job, event))
}

#[test]
fn successful_job_rejects_further_events() -> TestResult {
    let mut builder = DagBuilder::new();
    builder.add_job("A", 0.0)?;
    let dag = builder.build()?;

    apply(&dag, "A", JobEvent::Submit)?;
    apply(&dag, "A", JobEvent::Execute)?;
    apply(&dag, "A", JobEvent::JobSuccess)?;

    let err = apply(&dag, "A", JobEvent::PostScriptStarted).unwrap_err();
    assert!(matches!(err, DagError::TerminalJob { .. }), "got {err}");

    // Even informational markers are rejected once terminal.
    let err = apply(&dag, "A", JobEvent::JobTerminated).unwrap_err();
    assert!(matches!(err, DagError::TerminalJob { .. }), "got {err}");

    Ok(())
}

#[test]
fn failed_job_rejects_further_events() -> TestResult {
    let mut builder = DagBuilder::new();
    builder.add_job("A", 0.0)?;
    let dag = builder.build()?;

    apply(&dag, "A", JobEvent::Submit)?;
    apply(&dag, "A", JobEvent::Execute)?;
    apply(&dag, "A", JobEvent::JobFailure)?;

    let err = apply(&dag, "A", JobEvent::Submit).unwrap_err();
    assert!(matches!(err, DagError::TerminalJob { .. }), "got {err}");

    Ok(())
}

#[test]
fn unknown_job_is_fatal() -> TestResult {
    let mut builder = DagBuilder::new();
    builder.add_job("A", 0.0)?;
    let dag = builder.build()?;

    let err = apply(&dag, "nope", JobEvent::Submit).unwrap_err();
    assert!(matches!(err, DagError::UnknownJob(ref name) if name == "nope"));

    Ok(())
}

#[test]
fn premature_child_activity_is_a_readiness_violation() -> TestResult {
    let mut builder = DagBuilder::new();
    builder.add_job("A", 0.0)?;
    builder.add_job("B", 0.0)?;
    builder.add_edge("A", "B")?;
    let dag = builder.build()?;

    // B is submitted out of causal order while still UNREADY.
    apply(&dag, "B", JobEvent::Submit)?;
    assert_eq!(dag.job_state("B"), Some(JobState::Queued));

    apply(&dag, "A", JobEvent::Submit)?;
    apply(&dag, "A", JobEvent::Execute)?;

    // A's success finds B already past UNREADY: fatal, no reconciliation.
    let err = apply(&dag, "A", JobEvent::JobSuccess).unwrap_err();
    assert!(matches!(err, DagError::ChildNotUnready { .. }), "got {err}");

    Ok(())
}

#[test]
fn builder_rejects_edges_to_unknown_jobs() -> TestResult {
    let mut builder = DagBuilder::new();
    builder.add_job("A", 0.0)?;

    let err = builder.add_edge("A", "ghost").unwrap_err();
    assert!(matches!(err, DagError::UnknownJob(ref name) if name == "ghost"));

    Ok(())
}

#[test]
fn builder_rejects_duplicate_jobs() -> TestResult {
    let mut builder = DagBuilder::new();
    builder.add_job("A", 0.0)?;

    let err = builder.add_job("A", 1.0).unwrap_err();
    assert!(matches!(err, DagError::DuplicateJob(ref name) if name == "A"));

    Ok(())
}

#[test]
fn builder_rejects_cycles() -> TestResult {
    let mut builder = DagBuilder::new();
    builder.add_job("A", 0.0)?;
    builder.add_job("B", 0.0)?;
    builder.add_edge("A", "B")?;
    builder.add_edge("B", "A")?;

    let err = builder.build().unwrap_err();
    assert!(matches!(err, DagError::Cycle(_)), "got {err}");

    Ok(())
}
