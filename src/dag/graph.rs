// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::job::{Job, JobState};
use crate::errors::DagError;
use crate::jslog::JobStateRecord;

/// The raw job table: every job in the workflow, keyed by name.
///
/// Edges live on the jobs themselves as name lists, mutually consistent
/// (`p` in `c.parents` ⇔ `c` in `p.children`). Because edges are names
/// rather than pointers, a structural clone of the table is already a
/// fully detached deep copy.
#[derive(Debug, Clone, Default)]
struct JobTable {
    jobs: HashMap<String, Job>,
}

impl JobTable {
    fn apply(&mut self, record: &JobStateRecord) -> Result<(), DagError> {
        let job = self
            .jobs
            .get_mut(&record.job)
            .ok_or_else(|| DagError::UnknownJob(record.job.clone()))?;

        let new_state = job.apply_event(record.event)?;

        if new_state == JobState::Successful {
            let parent = job.name.clone();
            let children = job.children.clone();
            self.mark_ready_children(&parent, &children)?;
        }

        Ok(())
    }

    /// Readiness cascade, run once when `parent` turns SUCCESSFUL.
    ///
    /// Every child must still be UNREADY. A child whose parents are now all
    /// SUCCESSFUL becomes READY. Readiness is recomputed from the live
    /// parent states rather than counted, so parents may complete in any
    /// order. This is the only path out of UNREADY.
    fn mark_ready_children(&mut self, parent: &str, children: &[String]) -> Result<(), DagError> {
        for child_name in children {
            let child = self
                .jobs
                .get(child_name)
                .ok_or_else(|| DagError::UnknownJob(child_name.clone()))?;

            if child.state != JobState::Unready {
                return Err(DagError::ChildNotUnready {
                    parent: parent.to_string(),
                    child: child_name.clone(),
                    state: child.state,
                });
            }

            // Decide first, then mutate.
            let mut ready = true;
            for parent_name in &child.parents {
                let up = self
                    .jobs
                    .get(parent_name)
                    .ok_or_else(|| DagError::UnknownJob(parent_name.clone()))?;
                if up.state != JobState::Successful {
                    ready = false;
                    break;
                }
            }

            if ready {
                if let Some(child) = self.jobs.get_mut(child_name) {
                    debug!(job = %child.name, "all parents successful; marking READY");
                    child.state = JobState::Ready;
                }
            }
        }

        Ok(())
    }
}

/// Shared, live view of a workflow's execution state.
///
/// One coarse mutex guards the whole job table; every public operation is
/// synchronous and holds the lock for its full duration. The readiness
/// cascade touches a variable-size neighborhood of jobs per event, so
/// per-job locking would need a deadlock-free acquisition order over an
/// arbitrary subgraph; a single lock keeps the consistency argument
/// trivial and event application is only O(children) per event.
///
/// Consumers that need extended read access should [`Dag::snapshot`] once
/// and read the copy lock-free.
#[derive(Debug)]
pub struct Dag {
    inner: Mutex<JobTable>,
}

impl Dag {
    fn new(jobs: HashMap<String, Job>) -> Self {
        Self {
            inner: Mutex::new(JobTable { jobs }),
        }
    }

    /// Apply one jobstate record to the graph.
    ///
    /// Fails fatally on an unknown job, an event delivered to a terminal
    /// job, or a readiness-invariant violation; after any error the
    /// instance must be considered invalid.
    pub fn apply_record(&self, record: &JobStateRecord) -> Result<(), DagError> {
        self.lock().apply(record)
    }

    /// Per-state job counts, for reporting.
    pub fn aggregate_state(&self) -> BTreeMap<JobState, usize> {
        let table = self.lock();
        let mut stats = BTreeMap::new();
        for job in table.jobs.values() {
            *stats.entry(job.state).or_insert(0) += 1;
        }
        stats
    }

    /// Names of jobs currently READY, sorted for stable output.
    pub fn ready_jobs(&self) -> Vec<String> {
        let table = self.lock();
        let mut ready: Vec<String> = table
            .jobs
            .values()
            .filter(|j| j.state == JobState::Ready)
            .map(|j| j.name.clone())
            .collect();
        ready.sort();
        ready
    }

    /// Sum of runtime estimates over all non-terminal jobs.
    pub fn remaining_runtime(&self) -> f64 {
        let table = self.lock();
        table
            .jobs
            .values()
            .filter(|j| !j.state.is_terminal())
            .map(|j| j.runtime)
            .sum()
    }

    pub fn job_count(&self) -> usize {
        self.lock().jobs.len()
    }

    /// Current state of a job, or `None` if the name is unknown.
    pub fn job_state(&self, name: &str) -> Option<JobState> {
        self.lock().jobs.get(name).map(|j| j.state)
    }

    /// A detached copy of one job, or `None` if the name is unknown.
    pub fn job(&self, name: &str) -> Option<Job> {
        self.lock().jobs.get(name).cloned()
    }

    /// Detached copies of every job, sorted by name.
    pub fn jobs(&self) -> Vec<Job> {
        let table = self.lock();
        let mut jobs: Vec<Job> = table.jobs.values().cloned().collect();
        jobs.sort_by(|a, b| a.name.cmp(&b.name));
        jobs
    }

    /// Take a consistent point-in-time copy of the whole graph.
    ///
    /// The copy shares nothing with the original (fresh mutex, own job
    /// table) and can be traversed without serializing against live
    /// updates.
    pub fn snapshot(&self) -> Dag {
        let table = self.lock();
        Dag {
            inner: Mutex::new(table.clone()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, JobTable> {
        // Every error in this engine is already fatal to the instance, so
        // poisoning carries no extra information worth propagating.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Incremental construction of a [`Dag`], used by the workflow loader and
/// by embedders that build graphs programmatically.
#[derive(Debug, Default)]
pub struct DagBuilder {
    jobs: HashMap<String, Job>,
}

impl DagBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a job. Duplicate names are fatal.
    pub fn add_job(&mut self, name: &str, runtime: f64) -> Result<(), DagError> {
        if self.jobs.contains_key(name) {
            return Err(DagError::DuplicateJob(name.to_string()));
        }
        let mut job = Job::new(name);
        job.runtime = runtime;
        self.jobs.insert(name.to_string(), job);
        Ok(())
    }

    /// Append one parent→child edge, bidirectionally.
    ///
    /// Each call declares exactly one edge; multiple calls naming the same
    /// job accumulate multiple parents/children.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<(), DagError> {
        if !self.jobs.contains_key(parent) {
            return Err(DagError::UnknownJob(parent.to_string()));
        }
        if !self.jobs.contains_key(child) {
            return Err(DagError::UnknownJob(child.to_string()));
        }
        if let Some(p) = self.jobs.get_mut(parent) {
            p.children.push(child.to_string());
        }
        if let Some(c) = self.jobs.get_mut(child) {
            c.parents.push(parent.to_string());
        }
        Ok(())
    }

    pub fn set_prescript(&mut self, name: &str) -> Result<(), DagError> {
        let job = self
            .jobs
            .get_mut(name)
            .ok_or_else(|| DagError::UnknownJob(name.to_string()))?;
        job.has_prescript = true;
        Ok(())
    }

    pub fn set_postscript(&mut self, name: &str) -> Result<(), DagError> {
        let job = self
            .jobs
            .get_mut(name)
            .ok_or_else(|| DagError::UnknownJob(name.to_string()))?;
        job.has_postscript = true;
        Ok(())
    }

    /// Verify acyclicity, seed roots READY, and produce the graph.
    ///
    /// Roots have no predecessor event to trigger the readiness cascade,
    /// so this is the one place READY is set directly.
    pub fn build(mut self) -> Result<Dag, DagError> {
        self.check_acyclic()?;

        for job in self.jobs.values_mut() {
            if job.parents.is_empty() {
                job.state = JobState::Ready;
            }
        }

        Ok(Dag::new(self.jobs))
    }

    /// A topological sort fails exactly when there is a cycle.
    fn check_acyclic(&self) -> Result<(), DagError> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in self.jobs.keys() {
            graph.add_node(name.as_str());
        }
        for job in self.jobs.values() {
            for child in &job.children {
                graph.add_edge(job.name.as_str(), child.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(DagError::Cycle(cycle.node_id().to_string())),
        }
    }
}
