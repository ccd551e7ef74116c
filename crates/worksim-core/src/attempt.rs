//! Attempt state machine.
//!
//! An [`Attempt`] walks a candidate through a category's tasks in order.
//! Each task ends in exactly one [`Submission`] (answered, skipped, or
//! captured on expiry) and the attempt finishes exactly once, either when
//! the last task is submitted or when the global timer runs out.
//!
//! All mutation goes through `&mut self`; callers on a multi-threaded
//! runtime share an attempt behind a single mutex (see [`crate::engine`]).

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{AttemptScore, SubmissionReceipt};
use crate::error::EngineError;
use crate::model::{Answer, Candidate, InputMode, Submission, Task};
use crate::scoring;
use crate::timer::{secs_between, Clock, TickOutcome, TimerController, TimerState};

/// Lifecycle phase of an attempt.
///
/// `Submitting` and `Submitted` are sub-states of a finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptPhase {
    Active,
    Finished,
    Submitting,
    Submitted,
}

impl AttemptPhase {
    pub fn is_active(self) -> bool {
        self == AttemptPhase::Active
    }
}

/// Why an attempt finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    /// The last task was submitted or skipped.
    Completed,
    /// The global timer ran out.
    Expired,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Completed => write!(f, "completed"),
            FinishReason::Expired => write!(f, "expired"),
        }
    }
}

/// What happened after a submit or skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The next task is now in focus.
    Next { task_index: usize },
    /// That was the last task.
    Finished(FinishReason),
}

/// Point-in-time view of an attempt, for status displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptProgress {
    pub task_index: usize,
    pub total_tasks: usize,
    pub submitted: usize,
    pub remaining_secs: u64,
    pub timer: TimerState,
    pub phase: AttemptPhase,
}

/// One candidate's run through a category.
pub struct Attempt {
    id: Uuid,
    category_id: String,
    candidate: Candidate,
    tasks: Vec<Task>,
    task_index: usize,
    submissions: Vec<Submission>,
    draft: Answer,
    timer: TimerController,
    clock: Arc<dyn Clock>,
    started_at: DateTime<Utc>,
    task_shown_at: DateTime<Utc>,
    phase: AttemptPhase,
    finish_reason: Option<FinishReason>,
    score: Option<AttemptScore>,
    receipt: Option<SubmissionReceipt>,
}

impl fmt::Debug for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attempt")
            .field("id", &self.id)
            .field("category_id", &self.category_id)
            .field("task_index", &self.task_index)
            .field("total_tasks", &self.tasks.len())
            .field("submissions", &self.submissions.len())
            .field("timer", &self.timer)
            .field("phase", &self.phase)
            .field("finish_reason", &self.finish_reason)
            .finish()
    }
}

impl Attempt {
    /// Start an attempt and show the first task.
    ///
    /// Returns `None` when there are no tasks to run.
    pub fn new(
        category_id: impl Into<String>,
        candidate: Candidate,
        tasks: Vec<Task>,
        time_limit_secs: u64,
        clock: Arc<dyn Clock>,
    ) -> Option<Self> {
        if tasks.is_empty() {
            return None;
        }

        let now = clock.now();
        let mut attempt = Self {
            id: Uuid::new_v4(),
            category_id: category_id.into(),
            candidate,
            tasks,
            task_index: 0,
            submissions: Vec::new(),
            draft: Answer::default(),
            timer: TimerController::new(time_limit_secs),
            clock,
            started_at: now,
            task_shown_at: now,
            phase: AttemptPhase::Active,
            finish_reason: None,
            score: None,
            receipt: None,
        };

        tracing::info!(
            attempt = %attempt.id,
            category = %attempt.category_id,
            tasks = attempt.tasks.len(),
            time_limit_secs,
            "attempt started"
        );

        if attempt.timer.state() == TimerState::Expired {
            attempt.auto_submit_on_expiry();
        }

        Some(attempt)
    }

    // -- reads --------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn catalog_len(&self) -> usize {
        self.tasks.len()
    }

    pub fn task_index(&self) -> usize {
        self.task_index
    }

    /// The task in focus, if the attempt is still active.
    pub fn current_task(&self) -> Option<&Task> {
        if self.phase.is_active() {
            self.tasks.get(self.task_index)
        } else {
            None
        }
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn draft(&self) -> &Answer {
        &self.draft
    }

    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    /// The aggregated score, once results have been computed.
    pub fn score(&self) -> Option<AttemptScore> {
        self.score
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.timer.remaining_secs()
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Current time on the attempt's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Wall-clock seconds since the current task was shown.
    pub fn task_elapsed_secs(&self) -> u64 {
        secs_between(self.task_shown_at, self.clock.now())
    }

    pub fn progress(&self) -> AttemptProgress {
        AttemptProgress {
            task_index: self.task_index,
            total_tasks: self.tasks.len(),
            submitted: self.submissions.len(),
            remaining_secs: self.timer.remaining_secs(),
            timer: self.timer.state(),
            phase: self.phase,
        }
    }

    // -- draft editing ------------------------------------------------------

    /// Mutable access to the in-progress answer. `None` once finished.
    pub fn draft_mut(&mut self) -> Option<&mut Answer> {
        if self.phase.is_active() {
            Some(&mut self.draft)
        } else {
            None
        }
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        if let Some(draft) = self.draft_mut() {
            draft.mode = mode;
        }
    }

    /// Append a line to the active channel of the draft.
    pub fn append_line(&mut self, line: &str) {
        if let Some(draft) = self.draft_mut() {
            let content = draft.active_content_mut();
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(line);
        }
    }

    pub fn attach_file(&mut self, name: impl Into<String>) {
        if let Some(draft) = self.draft_mut() {
            draft.files.push(name.into());
        }
    }

    // -- transitions --------------------------------------------------------

    /// Submit an answer for the current task and advance.
    pub fn submit(&mut self, answer: Answer) -> Result<Step, EngineError> {
        self.ensure_active("submit")?;
        if answer.is_empty() {
            return Err(EngineError::Validation(
                "answer is empty: write a response or attach a file".into(),
            ));
        }

        let task = &self.tasks[self.task_index];
        let score = scoring::score(answer.active_content(), task);
        let now = self.clock.now();
        let submission = Submission {
            task_id: task.id.clone(),
            time_spent_secs: secs_between(self.task_shown_at, now),
            answer,
            score,
            skipped: false,
            auto_submitted: false,
            submitted_at: now,
        };
        tracing::debug!(
            task = %submission.task_id,
            score,
            time_spent_secs = submission.time_spent_secs,
            "task submitted"
        );
        Ok(self.record(submission))
    }

    /// Submit the in-progress draft. The draft is kept if validation fails.
    pub fn submit_draft(&mut self) -> Result<Step, EngineError> {
        self.ensure_active("submit")?;
        if self.draft.is_empty() {
            return Err(EngineError::Validation(
                "answer is empty: write a response or attach a file".into(),
            ));
        }
        let answer = std::mem::take(&mut self.draft);
        self.submit(answer)
    }

    /// Record an explicit null attempt for the current task and advance.
    pub fn skip(&mut self) -> Result<Step, EngineError> {
        self.ensure_active("skip")?;

        let task = &self.tasks[self.task_index];
        let submission = Submission {
            task_id: task.id.clone(),
            answer: Answer::default(),
            time_spent_secs: 0,
            score: 0,
            skipped: true,
            auto_submitted: false,
            submitted_at: self.clock.now(),
        };
        tracing::debug!(task = %submission.task_id, "task skipped");
        Ok(self.record(submission))
    }

    /// Advance the global timer by one second.
    ///
    /// The tick that exhausts the timer captures the current draft and
    /// finishes the attempt.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.phase.is_active() {
            return TickOutcome::Stopped;
        }
        let outcome = self.timer.tick();
        if outcome == TickOutcome::Expired {
            self.auto_submit_on_expiry();
        }
        outcome
    }

    /// Capture whatever is in progress and force the attempt to finish.
    ///
    /// Tasks after the current one get no submission. Returns `false` if
    /// the attempt had already finished.
    pub fn auto_submit_on_expiry(&mut self) -> bool {
        if !self.phase.is_active() {
            return false;
        }

        let answer = std::mem::take(&mut self.draft);
        let task = &self.tasks[self.task_index];
        let score = if answer.is_empty() {
            0
        } else {
            scoring::score(answer.active_content(), task)
        };
        let now = self.clock.now();
        let submission = Submission {
            task_id: task.id.clone(),
            time_spent_secs: secs_between(self.task_shown_at, now),
            answer,
            score,
            skipped: false,
            auto_submitted: true,
            submitted_at: now,
        };
        tracing::warn!(
            attempt = %self.id,
            task = %submission.task_id,
            unattempted = self.tasks.len() - self.task_index - 1,
            "time expired, submitting work in progress"
        );

        self.submissions.push(submission);
        self.task_index += 1;
        self.finish(FinishReason::Expired);
        true
    }

    /// Pause the global timer. Returns `true` if it was running.
    pub fn pause(&mut self) -> bool {
        self.phase.is_active() && self.timer.pause()
    }

    /// Resume the global timer. Returns `true` if it was paused.
    pub fn resume(&mut self) -> bool {
        self.phase.is_active() && self.timer.resume()
    }

    // -- result hand-off (driven by the engine) ------------------------------

    pub(crate) fn begin_submitting(&mut self) -> Result<(), EngineError> {
        match self.phase {
            // `Submitting` here means an earlier hand-off never settled; the
            // retry takes it over.
            AttemptPhase::Finished | AttemptPhase::Submitting => {
                self.phase = AttemptPhase::Submitting;
                Ok(())
            }
            AttemptPhase::Active => Err(EngineError::NotFinished),
            AttemptPhase::Submitted => Err(EngineError::AlreadySubmitted),
        }
    }

    /// Keep the first computed score so a retry sends identical data.
    pub(crate) fn set_score(&mut self, score: AttemptScore) {
        self.score.get_or_insert(score);
    }

    pub(crate) fn complete_submission(&mut self, receipt: SubmissionReceipt) {
        self.phase = AttemptPhase::Submitted;
        self.receipt = Some(receipt);
    }

    pub(crate) fn abort_submission(&mut self) {
        if self.phase == AttemptPhase::Submitting {
            self.phase = AttemptPhase::Finished;
        }
    }

    // -- internals ----------------------------------------------------------

    fn ensure_active(&self, action: &'static str) -> Result<(), EngineError> {
        if self.phase.is_active() {
            Ok(())
        } else {
            tracing::debug!(attempt = %self.id, action, "ignoring action on finished attempt");
            Err(EngineError::ExpiryRace { action })
        }
    }

    fn record(&mut self, submission: Submission) -> Step {
        self.submissions.push(submission);
        self.task_index += 1;
        self.draft = Answer::default();

        if self.task_index == self.tasks.len() {
            self.finish(FinishReason::Completed);
            Step::Finished(FinishReason::Completed)
        } else {
            self.task_shown_at = self.clock.now();
            Step::Next {
                task_index: self.task_index,
            }
        }
    }

    fn finish(&mut self, reason: FinishReason) {
        self.phase = AttemptPhase::Finished;
        self.finish_reason = Some(reason);
        self.timer.halt();
        tracing::info!(
            attempt = %self.id,
            %reason,
            submitted = self.submissions.len(),
            total = self.tasks.len(),
            "attempt finished"
        );
    }
}
