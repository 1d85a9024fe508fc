use std::error::Error;
use std::fs;
use std::path::Path;

use shadowdag::dag::{JobState, parse_dag};
use shadowdag::errors::DagError;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn write_submit(dir: &Path, name: &str, contents: &str) -> Result<(), Box<dyn Error>> {
    fs::write(dir.join(name), contents)?;
    Ok(())
}

#[test]
fn parses_jobs_edges_scripts_and_runtimes() -> TestResult {
    let dir = tempdir()?;

    write_submit(
        dir.path(),
        "stage_in.sub",
        "universe = vanilla\n+job_runtime = 12.5\nqueue\n",
    )?;
    write_submit(dir.path(), "analyze.sub", "universe = vanilla\nqueue\n")?;
    write_submit(dir.path(), "cleanup.sub", "+job_runtime = \"3\"\n")?;

    let dag_path = dir.path().join("workflow.dag");
    fs::write(
        &dag_path,
        "# generated workflow\n\
         JOB stage_in stage_in.sub\n\
         JOB analyze analyze.sub\n\
         JOB cleanup cleanup.sub\n\
         \n\
         PARENT stage_in CHILD analyze\n\
         PARENT analyze CHILD cleanup\n\
         SCRIPT PRE analyze check_inputs.sh\n\
         SCRIPT POST analyze validate.sh -f out.dat\n\
         RETRY analyze 3\n\
         MAXJOBS transfer 4\n",
    )?;

    let dag = parse_dag(&dag_path)?;

    assert_eq!(dag.job_count(), 3);
    assert_eq!(dag.job_state("stage_in"), Some(JobState::Ready));
    assert_eq!(dag.job_state("analyze"), Some(JobState::Unready));
    assert_eq!(dag.job_state("cleanup"), Some(JobState::Unready));

    let stage_in = dag.job("stage_in").unwrap();
    assert_eq!(stage_in.runtime, 12.5);
    assert_eq!(stage_in.children, vec!["analyze".to_string()]);

    let analyze = dag.job("analyze").unwrap();
    // No +job_runtime attribute: defaults to 0.
    assert_eq!(analyze.runtime, 0.0);
    assert!(analyze.has_prescript);
    assert!(analyze.has_postscript);
    assert_eq!(analyze.parents, vec!["stage_in".to_string()]);
    assert_eq!(analyze.children, vec!["cleanup".to_string()]);

    let cleanup = dag.job("cleanup").unwrap();
    assert_eq!(cleanup.runtime, 3.0);

    Ok(())
}

#[test]
fn multiple_edge_declarations_accumulate_parents() -> TestResult {
    let dir = tempdir()?;
    for name in ["a.sub", "b.sub", "d.sub"] {
        write_submit(dir.path(), name, "queue\n")?;
    }

    let dag_path = dir.path().join("workflow.dag");
    fs::write(
        &dag_path,
        "JOB a a.sub\nJOB b b.sub\nJOB d d.sub\n\
         PARENT a CHILD d\n\
         PARENT b CHILD d\n",
    )?;

    let dag = parse_dag(&dag_path)?;
    let d = dag.job("d").unwrap();
    assert_eq!(d.parents, vec!["a".to_string(), "b".to_string()]);

    Ok(())
}

#[test]
fn unrecognized_directive_is_fatal() -> TestResult {
    let dir = tempdir()?;
    write_submit(dir.path(), "a.sub", "queue\n")?;

    let dag_path = dir.path().join("workflow.dag");
    fs::write(&dag_path, "JOB a a.sub\nFROBNICATE a now\n")?;

    let err = parse_dag(&dag_path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DagError>(),
        Some(DagError::UnrecognizedDirective(_))
    ));

    Ok(())
}

#[test]
fn unrecognized_script_type_is_fatal() -> TestResult {
    let dir = tempdir()?;
    write_submit(dir.path(), "a.sub", "queue\n")?;

    let dag_path = dir.path().join("workflow.dag");
    fs::write(&dag_path, "JOB a a.sub\nSCRIPT DURING a thing.sh\n")?;

    let err = parse_dag(&dag_path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DagError>(),
        Some(DagError::UnrecognizedScriptType(t)) if t == "DURING"
    ));

    Ok(())
}

#[test]
fn edge_to_undeclared_job_is_fatal() -> TestResult {
    let dir = tempdir()?;
    write_submit(dir.path(), "a.sub", "queue\n")?;

    let dag_path = dir.path().join("workflow.dag");
    fs::write(&dag_path, "JOB a a.sub\nPARENT a CHILD ghost\n")?;

    let err = parse_dag(&dag_path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DagError>(),
        Some(DagError::UnknownJob(n)) if n == "ghost"
    ));

    Ok(())
}

#[test]
fn duplicate_job_declaration_is_fatal() -> TestResult {
    let dir = tempdir()?;
    write_submit(dir.path(), "a.sub", "queue\n")?;

    let dag_path = dir.path().join("workflow.dag");
    fs::write(&dag_path, "JOB a a.sub\nJOB a a.sub\n")?;

    let err = parse_dag(&dag_path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DagError>(),
        Some(DagError::DuplicateJob(_))
    ));

    Ok(())
}

#[test]
fn malformed_edge_declaration_is_fatal() -> TestResult {
    let dir = tempdir()?;
    write_submit(dir.path(), "a.sub", "queue\n")?;
    write_submit(dir.path(), "b.sub", "queue\n")?;

    let dag_path = dir.path().join("workflow.dag");
    fs::write(&dag_path, "JOB a a.sub\nJOB b b.sub\nPARENT a b\n")?;

    let err = parse_dag(&dag_path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DagError>(),
        Some(DagError::MalformedDirective(_))
    ));

    Ok(())
}

#[test]
fn dependency_cycle_is_fatal() -> TestResult {
    let dir = tempdir()?;
    write_submit(dir.path(), "a.sub", "queue\n")?;
    write_submit(dir.path(), "b.sub", "queue\n")?;

    let dag_path = dir.path().join("workflow.dag");
    fs::write(
        &dag_path,
        "JOB a a.sub\nJOB b b.sub\nPARENT a CHILD b\nPARENT b CHILD a\n",
    )?;

    let err = parse_dag(&dag_path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DagError>(),
        Some(DagError::Cycle(_))
    ));

    Ok(())
}

#[test]
fn missing_submit_file_is_fatal() -> TestResult {
    let dir = tempdir()?;

    let dag_path = dir.path().join("workflow.dag");
    fs::write(&dag_path, "JOB a missing.sub\n")?;

    assert!(parse_dag(&dag_path).is_err());

    Ok(())
}
