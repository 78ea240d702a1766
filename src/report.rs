//! Tabular view of a schedule's computed fields.

use crate::schedule::ProjectSchedule;
use crate::task::ScheduleTask;
use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;

/// One row per task, ordered by WBS code and then id.
pub fn cpm_frame(schedule: &ProjectSchedule) -> PolarsResult<DataFrame> {
    let mut tasks: Vec<&ScheduleTask> = schedule.tasks.iter().collect();
    tasks.sort_by(|a, b| {
        wbs_key(a.wbs_code.as_deref())
            .cmp(&wbs_key(b.wbs_code.as_deref()))
            .then(a.id.cmp(&b.id))
    });

    let day = |value: Option<DateTime<Utc>>| value.map(|v| v.date_naive());
    let ids: Vec<i64> = tasks.iter().map(|t| t.id.get()).collect();
    let names: Vec<String> = tasks.iter().map(|t| t.name.clone()).collect();
    let wbs: Vec<Option<String>> = tasks.iter().map(|t| t.wbs_code.clone()).collect();
    let kinds: Vec<&str> = tasks.iter().map(|t| t.task_type.as_str()).collect();
    let durations: Vec<i64> = tasks.iter().map(|t| t.duration_days).collect();
    let planned_start: Vec<Option<NaiveDate>> = tasks.iter().map(|t| t.planned_start).collect();
    let planned_end: Vec<Option<NaiveDate>> = tasks.iter().map(|t| t.planned_end).collect();
    let early_start: Vec<Option<NaiveDate>> = tasks.iter().map(|t| day(t.early_start)).collect();
    let early_finish: Vec<Option<NaiveDate>> = tasks.iter().map(|t| day(t.early_finish)).collect();
    let late_start: Vec<Option<NaiveDate>> = tasks.iter().map(|t| day(t.late_start)).collect();
    let late_finish: Vec<Option<NaiveDate>> = tasks.iter().map(|t| day(t.late_finish)).collect();
    let total_float: Vec<Option<i64>> = tasks.iter().map(|t| t.total_float).collect();
    let free_float: Vec<Option<i64>> = tasks.iter().map(|t| t.free_float).collect();
    let critical: Vec<bool> = tasks.iter().map(|t| t.is_critical).collect();

    df!(
        "id" => ids,
        "wbs" => wbs,
        "name" => names,
        "type" => kinds,
        "duration" => durations,
        "planned_start" => planned_start,
        "planned_end" => planned_end,
        "early_start" => early_start,
        "early_finish" => early_finish,
        "late_start" => late_start,
        "late_finish" => late_finish,
        "total_float" => total_float,
        "free_float" => free_float,
        "critical" => critical,
    )
}

fn wbs_key(code: Option<&str>) -> (bool, Vec<u32>) {
    match code {
        Some(code) => (
            false,
            code.split('.').map(|part| part.parse().unwrap_or(u32::MAX)).collect(),
        ),
        None => (true, Vec::new()),
    }
}

/// Plain-text grid rendering of a frame for terminal output.
pub fn render_frame(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let rows: Vec<Vec<String>> = (0..df.height())
        .map(|row| {
            columns
                .iter()
                .map(|column| match column.get(row) {
                    Ok(AnyValue::Null) | Err(_) => String::new(),
                    Ok(AnyValue::String(value)) => value.to_string(),
                    Ok(AnyValue::StringOwned(value)) => value.to_string(),
                    Ok(value) => value.to_string(),
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = names.iter().map(|n| n.len()).collect();
    for row in &rows {
        for (ci, value) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(value.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let line = |values: &[String]| {
        let mut out = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            out.push(' ');
            out.push_str(value);
            out.push_str(&" ".repeat(pad));
            out.push_str(" |");
        }
        out
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&line(&names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}
