//! Loop controller for `campaign loop`.
//!
//! Runs `CheckingCompletion -> DispatchingWorker -> IdleWait` until the
//! campaign is complete. The worker invocation is the only blocking step; the
//! registry is reloaded from disk on every check.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::io::config::CampaignConfig;
use crate::io::init::CampaignPaths;
use crate::io::prompt::{PromptEngine, PromptInputs, PromptRole, compose_prompt};
use crate::io::registry_store::{Completion, check_completion, load_registry};
use crate::io::worker::{DispatchRequest, Worker};
use crate::select::{NextOutcome, next_outcome};

/// Controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    CheckingCompletion,
    DispatchingWorker,
    IdleWait,
}

/// Reason why `run_loop` stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStop {
    /// Every task is completed.
    Complete,
    /// The configured `max_iterations` was reached.
    MaxIterationsExceeded { max_iterations: u32 },
}

/// Progress notifications for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// No store exists yet; the planner prompt is being dispatched.
    Planning,
    /// A store already exists; planning is skipped.
    PlanningSkipped,
    /// The worker is being dispatched for the given (1-based) iteration.
    Dispatch { iteration: u32, pending: usize },
}

/// Summary of a loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    /// Whether the planner prompt was dispatched.
    pub planned: bool,
    /// Worker dispatches after planning.
    pub dispatches: u32,
    pub stop: LoopStop,
}

/// Run the planning phase (if needed) and then dispatch the worker until the
/// campaign completes or the iteration limit is reached.
///
/// A store that exists but cannot be loaded, or that has no targets, stops the
/// loop with an error instead of dispatching forever.
pub fn run_loop<W: Worker, F: FnMut(&LoopEvent)>(
    paths: &CampaignPaths,
    worker: &W,
    engine: &PromptEngine,
    inputs: &PromptInputs,
    config: &CampaignConfig,
    mut on_event: F,
) -> Result<LoopOutcome> {
    let planned = plan_if_missing(paths, worker, engine, inputs, config, &mut on_event)?;

    let mut dispatches = 0u32;
    let mut pending = 0usize;
    let mut state = LoopState::CheckingCompletion;
    loop {
        debug!(?state, dispatches, "loop state");
        state = match state {
            LoopState::CheckingCompletion => match check_completion(paths)
                .context("check campaign completion")?
            {
                Completion::Complete => {
                    info!(dispatches, "campaign complete");
                    return Ok(LoopOutcome {
                        planned,
                        dispatches,
                        stop: LoopStop::Complete,
                    });
                }
                Completion::Missing => bail!(
                    "campaign store {} disappeared",
                    paths.state_path.display()
                ),
                Completion::Empty => bail!(
                    "campaign {} has no targets (re-run init)",
                    paths.state_path.display()
                ),
                Completion::Pending(count) => {
                    pending = count;
                    LoopState::DispatchingWorker
                }
            },
            LoopState::DispatchingWorker => {
                if let Some(max_iterations) = config.max_iterations
                    && dispatches >= max_iterations
                {
                    return Ok(LoopOutcome {
                        planned,
                        dispatches,
                        stop: LoopStop::MaxIterationsExceeded { max_iterations },
                    });
                }
                dispatches += 1;
                on_event(&LoopEvent::Dispatch {
                    iteration: dispatches,
                    pending,
                });
                let prompt = worker_prompt(paths, engine, inputs)?;
                worker.dispatch(&request(paths, prompt, config))?;
                LoopState::IdleWait
            }
            LoopState::IdleWait => {
                idle(config.idle());
                LoopState::CheckingCompletion
            }
        };
    }
}

fn plan_if_missing<W: Worker, F: FnMut(&LoopEvent)>(
    paths: &CampaignPaths,
    worker: &W,
    engine: &PromptEngine,
    inputs: &PromptInputs,
    config: &CampaignConfig,
    on_event: &mut F,
) -> Result<bool> {
    if paths.state_path.exists() {
        on_event(&LoopEvent::PlanningSkipped);
        return Ok(false);
    }
    on_event(&LoopEvent::Planning);
    let prompt = engine.render(paths.kind, PromptRole::Planner, inputs)?;
    worker.dispatch(&request(paths, prompt, config))?;
    if !paths.state_path.exists() {
        bail!(
            "planning finished but {} was not created",
            paths.state_path.display()
        );
    }
    Ok(true)
}

/// Worker template followed by the current pending excerpt.
fn worker_prompt(
    paths: &CampaignPaths,
    engine: &PromptEngine,
    inputs: &PromptInputs,
) -> Result<String> {
    let registry = load_registry(paths)?;
    let inputs = PromptInputs {
        goal: registry.goal.clone().or_else(|| inputs.goal.clone()),
        ..inputs.clone()
    };
    let template = engine.render(paths.kind, PromptRole::Worker, &inputs)?;
    Ok(match next_outcome(&registry, paths.kind) {
        NextOutcome::Pending { excerpt, .. } => compose_prompt(&template, &excerpt),
        NextOutcome::Complete => template,
    })
}

fn request(paths: &CampaignPaths, prompt: String, config: &CampaignConfig) -> DispatchRequest {
    DispatchRequest {
        workdir: paths.root.clone(),
        prompt,
        timeout: config.iteration_timeout(),
    }
}

fn idle(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
