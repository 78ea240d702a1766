//! How each link type constrains its endpoints.
//!
//! `StartAnchored` reads FF like FS and SF like SS on the forward side and
//! never clamps. `Exact` anchors FF and SF on the successor's finish, SS and
//! SF on the predecessor's start in the backward direction, and keeps every
//! task inside `[0, project_finish]`.

use crate::dependency::DependencyType;
use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintMode {
    #[default]
    Exact,
    StartAnchored,
}

impl ConstraintMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintMode::Exact => "exact",
            ConstraintMode::StartAnchored => "start_anchored",
        }
    }

    pub fn clamps(&self) -> bool {
        matches!(self, ConstraintMode::Exact)
    }
}

/// Start/finish pair in day offsets from the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Span {
    pub start: f64,
    pub finish: f64,
}

impl Span {
    pub fn new(start: f64, finish: f64) -> Self {
        Self { start, finish }
    }

    pub fn duration(&self) -> f64 {
        self.finish - self.start
    }
}

/// Lower bound a link puts on the successor's early start.
pub fn forward_start(
    mode: ConstraintMode,
    kind: DependencyType,
    lag: f64,
    pred: Span,
    succ_duration: f64,
) -> f64 {
    match (mode, kind) {
        (_, DependencyType::FinishToStart) => pred.finish + lag,
        (_, DependencyType::StartToStart) => pred.start + lag,
        (ConstraintMode::StartAnchored, DependencyType::FinishToFinish) => pred.finish + lag,
        (ConstraintMode::StartAnchored, DependencyType::StartToFinish) => pred.start + lag,
        (ConstraintMode::Exact, DependencyType::FinishToFinish) => pred.finish + lag - succ_duration,
        (ConstraintMode::Exact, DependencyType::StartToFinish) => pred.start + lag - succ_duration,
    }
}

/// Upper bound a link puts on the predecessor's late finish.
pub fn backward_finish(
    mode: ConstraintMode,
    kind: DependencyType,
    lag: f64,
    succ: Span,
    pred_duration: f64,
) -> f64 {
    match (mode, kind) {
        (_, DependencyType::FinishToStart) => succ.start - lag,
        (_, DependencyType::FinishToFinish) => succ.finish - lag,
        (ConstraintMode::StartAnchored, DependencyType::StartToStart) => succ.start - lag,
        (ConstraintMode::StartAnchored, DependencyType::StartToFinish) => succ.finish - lag,
        (ConstraintMode::Exact, DependencyType::StartToStart) => succ.start - lag + pred_duration,
        (ConstraintMode::Exact, DependencyType::StartToFinish) => succ.finish - lag + pred_duration,
    }
}

/// Room the predecessor has on one outgoing link before it pushes the
/// successor's early dates.
pub fn link_slack(
    mode: ConstraintMode,
    kind: DependencyType,
    lag: f64,
    pred: Span,
    succ: Span,
) -> f64 {
    match mode {
        ConstraintMode::StartAnchored => succ.start - pred.finish,
        ConstraintMode::Exact => match kind {
            DependencyType::FinishToStart => succ.start - lag - pred.finish,
            DependencyType::StartToStart => succ.start - lag - pred.start,
            DependencyType::FinishToFinish => succ.finish - lag - pred.finish,
            DependencyType::StartToFinish => succ.finish - lag - pred.start,
        },
    }
}

/// Calendar form of [`forward_start`] used by the cascade: the earliest start
/// date the successor may take given its predecessor's planned dates.
/// `None` when the result falls outside chrono's date range.
pub fn cascade_start(
    mode: ConstraintMode,
    kind: DependencyType,
    lag_days: i64,
    pred_start: NaiveDate,
    pred_end: NaiveDate,
    succ_span_days: i64,
) -> Option<NaiveDate> {
    let (anchor, offset) = match (mode, kind) {
        (_, DependencyType::FinishToStart) => (pred_end, lag_days),
        (_, DependencyType::StartToStart) => (pred_start, lag_days),
        (ConstraintMode::StartAnchored, DependencyType::FinishToFinish) => (pred_end, lag_days),
        (ConstraintMode::StartAnchored, DependencyType::StartToFinish) => (pred_start, lag_days),
        (ConstraintMode::Exact, DependencyType::FinishToFinish) => {
            (pred_end, lag_days.checked_sub(succ_span_days)?)
        }
        (ConstraintMode::Exact, DependencyType::StartToFinish) => {
            (pred_start, lag_days.checked_sub(succ_span_days)?)
        }
    };
    anchor.checked_add_signed(TimeDelta::try_days(offset)?)
}
