use super::{
    PersistenceError, PersistenceResult, ScheduleRepository, ScheduleWork, engine_error,
    missing_schedule, validate_schedule,
};
use crate::dependency::TaskDependency;
use crate::error;
use crate::ids::{ScheduleId, TaskId};
use crate::metadata::ScheduleMetadata;
use crate::schedule::ProjectSchedule;
use crate::task::ScheduleTask;
use crate::writer::{CpmUpdate, TaskDateUpdate, WbsAssignment, apply_task_dates, apply_wbs_codes};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use std::path::Path;
use std::time::Duration;

/// How long a writer waits for another connection's write transaction.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// SQLite-backed repository. Rows carry JSON payloads; task and dependency
/// ids are unique across schedules. Updates run in `BEGIN IMMEDIATE`
/// transactions, so writers on other connections to the same file queue up
/// behind them.
pub struct SqliteScheduleStore {
    connection: Mutex<Connection>,
}

impl SqliteScheduleStore {
    pub fn new<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        connection.busy_timeout(BUSY_TIMEOUT)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS schedules (
                id INTEGER PRIMARY KEY,
                metadata_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS schedule_tasks (
                id INTEGER PRIMARY KEY,
                schedule_id INTEGER NOT NULL REFERENCES schedules(id) ON DELETE CASCADE,
                task_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS schedule_tasks_by_schedule
                ON schedule_tasks (schedule_id);
            CREATE TABLE IF NOT EXISTS task_dependencies (
                id INTEGER PRIMARY KEY,
                schedule_id INTEGER NOT NULL REFERENCES schedules(id) ON DELETE CASCADE,
                dependency_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS task_dependencies_by_schedule
                ON task_dependencies (schedule_id);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn read_schedule(
        connection: &Connection,
        schedule_id: ScheduleId,
    ) -> PersistenceResult<Option<ProjectSchedule>> {
        let metadata_json: Option<String> = connection
            .query_row(
                "SELECT metadata_json FROM schedules WHERE id = ?1",
                params![schedule_id.get()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(metadata_json) = metadata_json else {
            return Ok(None);
        };
        let metadata: ScheduleMetadata = serde_json::from_str(&metadata_json)?;
        let mut schedule = ProjectSchedule::new_with_metadata(schedule_id, metadata);

        let mut stmt = connection
            .prepare("SELECT task_json FROM schedule_tasks WHERE schedule_id = ?1 ORDER BY id ASC")?;
        let rows = stmt.query_map(params![schedule_id.get()], |row| row.get::<_, String>(0))?;
        for json in rows {
            let task: ScheduleTask = serde_json::from_str(&json?)?;
            schedule.tasks.push(task);
        }

        let mut stmt = connection.prepare(
            "SELECT dependency_json FROM task_dependencies WHERE schedule_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![schedule_id.get()], |row| row.get::<_, String>(0))?;
        for json in rows {
            let dependency: TaskDependency = serde_json::from_str(&json?)?;
            schedule.dependencies.push(dependency);
        }

        validate_schedule(&schedule)?;
        Ok(Some(schedule))
    }

    fn write_metadata(tx: &Transaction, schedule: &ProjectSchedule) -> PersistenceResult<()> {
        let json = serde_json::to_string(&schedule.metadata)?;
        tx.execute(
            "INSERT INTO schedules (id, metadata_json) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET metadata_json = excluded.metadata_json",
            params![schedule.id.get(), json],
        )?;
        Ok(())
    }

    fn write_tasks<'a>(
        tx: &Transaction,
        schedule_id: ScheduleId,
        tasks: impl IntoIterator<Item = &'a ScheduleTask>,
    ) -> PersistenceResult<()> {
        let mut stmt = tx.prepare(
            "INSERT INTO schedule_tasks (id, schedule_id, task_json) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                schedule_id = excluded.schedule_id,
                task_json = excluded.task_json",
        )?;
        for task in tasks {
            let json = serde_json::to_string(task)?;
            stmt.execute(params![task.id.get(), schedule_id.get(), json])?;
        }
        Ok(())
    }

    fn write_dependencies<'a>(
        tx: &Transaction,
        schedule_id: ScheduleId,
        dependencies: impl IntoIterator<Item = &'a TaskDependency>,
    ) -> PersistenceResult<()> {
        let mut stmt = tx.prepare(
            "INSERT INTO task_dependencies (id, schedule_id, dependency_json) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                schedule_id = excluded.schedule_id,
                dependency_json = excluded.dependency_json",
        )?;
        for dependency in dependencies {
            let json = serde_json::to_string(dependency)?;
            stmt.execute(params![dependency.id.get(), schedule_id.get(), json])?;
        }
        Ok(())
    }

    /// Load, mutate and write back inside one immediate transaction. An error
    /// anywhere drops the transaction, which rolls it back.
    fn modify<E, F>(&self, schedule_id: ScheduleId, apply: F) -> Result<(), E>
    where
        E: From<PersistenceError>,
        F: FnOnce(&mut ProjectSchedule) -> Result<(), E>,
    {
        let mut conn = self.connection.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(PersistenceError::from)?;
        let mut schedule =
            Self::read_schedule(&tx, schedule_id)?.ok_or_else(|| missing_schedule(schedule_id))?;
        apply(&mut schedule)?;
        validate_schedule(&schedule)?;
        Self::write_metadata(&tx, &schedule)?;
        Self::write_tasks(&tx, schedule_id, &schedule.tasks)?;
        Self::write_dependencies(&tx, schedule_id, &schedule.dependencies)?;
        tx.commit().map_err(PersistenceError::from)?;
        Ok(())
    }
}

impl ScheduleRepository for SqliteScheduleStore {
    fn load_schedule(&self, schedule_id: ScheduleId) -> PersistenceResult<Option<ProjectSchedule>> {
        let conn = self.connection.lock();
        Self::read_schedule(&conn, schedule_id)
    }

    fn schedule_of_task(&self, task_id: TaskId) -> PersistenceResult<Option<ScheduleId>> {
        let conn = self.connection.lock();
        let schedule_id: Option<i64> = conn
            .query_row(
                "SELECT schedule_id FROM schedule_tasks WHERE id = ?1",
                params![task_id.get()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(schedule_id.map(ScheduleId))
    }

    fn schedule_ids(&self) -> PersistenceResult<Vec<ScheduleId>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare("SELECT id FROM schedules ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        let mut ids = Vec::new();
        for id in rows {
            ids.push(ScheduleId(id?));
        }
        Ok(ids)
    }

    fn save_schedule(&self, schedule: &ProjectSchedule) -> PersistenceResult<()> {
        validate_schedule(schedule)?;
        let mut conn = self.connection.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Self::write_metadata(&tx, schedule)?;
        tx.execute(
            "DELETE FROM schedule_tasks WHERE schedule_id = ?1",
            params![schedule.id.get()],
        )?;
        tx.execute(
            "DELETE FROM task_dependencies WHERE schedule_id = ?1",
            params![schedule.id.get()],
        )?;
        Self::write_tasks(&tx, schedule.id, &schedule.tasks)?;
        Self::write_dependencies(&tx, schedule.id, &schedule.dependencies)?;
        tx.commit()?;
        Ok(())
    }

    fn update_schedule(&self, schedule_id: ScheduleId, work: &mut ScheduleWork<'_>) -> error::Result<()> {
        self.modify(schedule_id, |schedule| work(schedule))
            .map_err(|err| engine_error(schedule_id, err))
    }

    fn commit_cpm(&self, update: &CpmUpdate) -> PersistenceResult<()> {
        self.modify(update.schedule_id, |schedule| update.apply_to(schedule))
    }

    fn commit_task_dates(
        &self,
        schedule_id: ScheduleId,
        updates: &[TaskDateUpdate],
    ) -> PersistenceResult<()> {
        self.modify(schedule_id, |schedule| apply_task_dates(schedule, updates))
    }

    fn commit_wbs_codes(
        &self,
        schedule_id: ScheduleId,
        assignments: &[WbsAssignment],
    ) -> PersistenceResult<()> {
        self.modify(schedule_id, |schedule| apply_wbs_codes(schedule, assignments))
    }
}

impl std::fmt::Debug for SqliteScheduleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteScheduleStore").finish_non_exhaustive()
    }
}

