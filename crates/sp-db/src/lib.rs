//! Storage layer for the study planner.
//!
//! Persists modules, assignments, study settings and bank holidays using
//! `rusqlite`. The planning engine never touches the database; callers load
//! snapshots from here and hand them to [`sp_core::build_study_plan`].
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Use one `Database` per thread, or wrap it in a `Mutex`.
//!
//! # Schema
//!
//! Dates are stored as TEXT in `YYYY-MM-DD` form, so lexicographic ordering
//! matches chronological ordering. Deleting a module cascades to its
//! assignments. Study-day hours live in their own table keyed by lowercase
//! weekday name; scalar settings live in a key/value table.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use sp_core::{Assignment, BankHoliday, DATE_FORMAT, Module, StudySettings, default_bank_holidays};
use thiserror::Error;

const LEAVE_DAYS_KEY: &str = "leave_days";
const HOLIDAYS_SEEDED_KEY: &str = "holidays_seeded";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored date could not be parsed.
    #[error("invalid date in {table}: {value}")]
    DateParse {
        table: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored setting could not be parsed.
    #[error("invalid value for setting {key}: {value}")]
    InvalidSetting { key: &'static str, value: String },
    /// An assignment referenced a module that does not exist.
    #[error("module {0} does not exist")]
    UnknownModule(i64),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is initialized and the default bank holidays are seeded on
    /// first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let mut db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS modules (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                hours_required REAL NOT NULL,
                days_before INTEGER NOT NULL,
                due_date TEXT,
                assignment_count INTEGER
            );

            -- due_date: YYYY-MM-DD
            CREATE TABLE IF NOT EXISTS assignments (
                id INTEGER PRIMARY KEY,
                module_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                due_date TEXT NOT NULL,
                study_hours REAL NOT NULL DEFAULT 0,
                submission_hours REAL NOT NULL DEFAULT 0,
                FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_assignments_module ON assignments(module_id);
            CREATE INDEX IF NOT EXISTS idx_assignments_due ON assignments(due_date);

            CREATE TABLE IF NOT EXISTS study_days (
                weekday TEXT PRIMARY KEY,
                hours INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS bank_holidays (
                date TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                selected INTEGER NOT NULL DEFAULT 0,
                hours INTEGER NOT NULL DEFAULT 0
            );
            ",
        )?;

        let first_open = self.conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?, '1')",
            [HOLIDAYS_SEEDED_KEY],
        )? == 1;
        if first_open {
            tracing::debug!("seeding default bank holidays");
            self.replace_holidays(&default_bank_holidays())?;
        }
        Ok(())
    }

    // ========== Modules ==========

    /// Next unused module ID.
    pub fn next_module_id(&self) -> Result<i64, DbError> {
        let id = self
            .conn
            .query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM modules", [], |row| {
                row.get(0)
            })?;
        Ok(id)
    }

    /// Inserts a module, or updates the existing one with the same ID.
    ///
    /// Updating keeps the module's assignments.
    pub fn save_module(&self, module: &Module) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO modules (id, name, hours_required, days_before, due_date, assignment_count)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                hours_required = excluded.hours_required,
                days_before = excluded.days_before,
                due_date = excluded.due_date,
                assignment_count = excluded.assignment_count
            ",
            params![
                module.id,
                module.name,
                module.hours_required,
                module.days_before,
                module.due_date.map(format_date),
                module.assignments,
            ],
        )?;
        Ok(())
    }

    /// Lists modules ordered by ID.
    pub fn list_modules(&self) -> Result<Vec<Module>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, hours_required, days_before, due_date, assignment_count
            FROM modules
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], ModuleRow::from_row)?;
        let mut modules = Vec::new();
        for row in rows {
            modules.push(row?.into_module()?);
        }
        Ok(modules)
    }

    pub fn get_module(&self, id: i64) -> Result<Option<Module>, DbError> {
        let row = self
            .conn
            .query_row(
                "
                SELECT id, name, hours_required, days_before, due_date, assignment_count
                FROM modules
                WHERE id = ?
                ",
                [id],
                ModuleRow::from_row,
            )
            .optional()?;
        row.map(ModuleRow::into_module).transpose()
    }

    /// Deletes a module and its assignments. Returns false if it did not exist.
    pub fn delete_module(&self, id: i64) -> Result<bool, DbError> {
        let deleted = self.conn.execute("DELETE FROM modules WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    // ========== Assignments ==========

    /// Next unused assignment ID.
    pub fn next_assignment_id(&self) -> Result<i64, DbError> {
        let id = self.conn.query_row(
            "SELECT COALESCE(MAX(id), 0) + 1 FROM assignments",
            [],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Inserts an assignment, or updates the existing one with the same ID.
    pub fn save_assignment(&self, assignment: &Assignment) -> Result<(), DbError> {
        if self.get_module(assignment.module_id)?.is_none() {
            return Err(DbError::UnknownModule(assignment.module_id));
        }
        self.conn.execute(
            "
            INSERT INTO assignments (id, module_id, name, due_date, study_hours, submission_hours)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                module_id = excluded.module_id,
                name = excluded.name,
                due_date = excluded.due_date,
                study_hours = excluded.study_hours,
                submission_hours = excluded.submission_hours
            ",
            params![
                assignment.id,
                assignment.module_id,
                assignment.name,
                format_date(assignment.due_date),
                assignment.study_hours,
                assignment.submission_hours,
            ],
        )?;
        Ok(())
    }

    /// Lists all assignments ordered by ID.
    pub fn list_assignments(&self) -> Result<Vec<Assignment>, DbError> {
        self.query_assignments(
            "
            SELECT id, module_id, name, due_date, study_hours, submission_hours
            FROM assignments
            ORDER BY id ASC
            ",
            [],
        )
    }

    /// Lists one module's assignments ordered by ID.
    pub fn list_assignments_for_module(&self, module_id: i64) -> Result<Vec<Assignment>, DbError> {
        self.query_assignments(
            "
            SELECT id, module_id, name, due_date, study_hours, submission_hours
            FROM assignments
            WHERE module_id = ?
            ORDER BY id ASC
            ",
            [module_id],
        )
    }

    pub fn get_assignment(&self, id: i64) -> Result<Option<Assignment>, DbError> {
        let mut assignments = self.query_assignments(
            "
            SELECT id, module_id, name, due_date, study_hours, submission_hours
            FROM assignments
            WHERE id = ?
            ",
            [id],
        )?;
        Ok(assignments.pop())
    }

    /// Deletes an assignment. Returns false if it did not exist.
    pub fn delete_assignment(&self, id: i64) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM assignments WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    fn query_assignments<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Assignment>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
            ))
        })?;
        let mut assignments = Vec::new();
        for row in rows {
            let (id, module_id, name, due_date, study_hours, submission_hours) = row?;
            assignments.push(Assignment {
                id,
                module_id,
                name,
                due_date: parse_date("assignments", &due_date)?,
                study_hours,
                submission_hours,
            });
        }
        Ok(assignments)
    }

    // ========== Settings ==========

    /// Loads study settings. Missing values fall back to defaults.
    pub fn load_settings(&self) -> Result<StudySettings, DbError> {
        let mut settings = StudySettings::default();

        let mut stmt = self
            .conn
            .prepare("SELECT weekday, hours FROM study_days ORDER BY weekday ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;
        for row in rows {
            let (weekday, hours) = row?;
            settings.study_days.insert(weekday, hours);
        }

        let leave_days: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                [LEAVE_DAYS_KEY],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(value) = leave_days {
            settings.leave_days = value.parse().map_err(|_| DbError::InvalidSetting {
                key: LEAVE_DAYS_KEY,
                value,
            })?;
        }

        Ok(settings)
    }

    /// Replaces the stored study settings.
    pub fn save_settings(&mut self, settings: &StudySettings) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM study_days", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO study_days (weekday, hours) VALUES (?, ?)")?;
            for (weekday, hours) in &settings.study_days {
                stmt.execute(params![weekday, hours])?;
            }
        }
        tx.execute(
            "
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
            params![LEAVE_DAYS_KEY, settings.leave_days.to_string()],
        )?;
        tx.commit()?;
        Ok(())
    }

    // ========== Bank holidays ==========

    /// Lists bank holidays ordered by date.
    pub fn list_holidays(&self) -> Result<Vec<BankHoliday>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT date, name, selected, hours
            FROM bank_holidays
            ORDER BY date ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, u32>(3)?,
            ))
        })?;
        let mut holidays = Vec::new();
        for row in rows {
            let (date, name, selected, hours) = row?;
            holidays.push(BankHoliday {
                date: parse_date("bank_holidays", &date)?,
                name,
                selected,
                hours,
            });
        }
        Ok(holidays)
    }

    /// Updates selection and hours of an existing holiday. Returns false if
    /// no holiday exists on that date.
    pub fn set_holiday(&self, date: NaiveDate, selected: bool, hours: u32) -> Result<bool, DbError> {
        let updated = self.conn.execute(
            "UPDATE bank_holidays SET selected = ?, hours = ? WHERE date = ?",
            params![selected, hours, format_date(date)],
        )?;
        Ok(updated > 0)
    }

    /// Inserts or updates a single holiday.
    pub fn save_holiday(&self, holiday: &BankHoliday) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO bank_holidays (date, name, selected, hours) VALUES (?, ?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                name = excluded.name,
                selected = excluded.selected,
                hours = excluded.hours
            ",
            params![
                format_date(holiday.date),
                holiday.name,
                holiday.selected,
                holiday.hours
            ],
        )?;
        Ok(())
    }

    /// Deletes the holiday on `date`. Returns false if there was none.
    pub fn delete_holiday(&self, date: NaiveDate) -> Result<bool, DbError> {
        let deleted = self.conn.execute(
            "DELETE FROM bank_holidays WHERE date = ?",
            [format_date(date)],
        )?;
        Ok(deleted > 0)
    }

    /// Replaces the whole holiday list.
    pub fn replace_holidays(&mut self, holidays: &[BankHoliday]) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM bank_holidays", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO bank_holidays (date, name, selected, hours) VALUES (?, ?, ?, ?)",
            )?;
            for holiday in holidays {
                stmt.execute(params![
                    format_date(holiday.date),
                    holiday.name,
                    holiday.selected,
                    holiday.hours
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// Raw module columns before date parsing.
struct ModuleRow {
    id: i64,
    name: String,
    hours_required: f64,
    days_before: i64,
    due_date: Option<String>,
    assignment_count: Option<u32>,
}

impl ModuleRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            hours_required: row.get(2)?,
            days_before: row.get(3)?,
            due_date: row.get(4)?,
            assignment_count: row.get(5)?,
        })
    }

    fn into_module(self) -> Result<Module, DbError> {
        let due_date = self
            .due_date
            .as_deref()
            .map(|value| parse_date("modules", value))
            .transpose()?;
        Ok(Module {
            id: self.id,
            name: self.name,
            hours_required: self.hours_required,
            days_before: self.days_before,
            due_date,
            assignments: self.assignment_count,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(table: &'static str, value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| DbError::DateParse {
        table,
        value: value.to_string(),
        source,
    })
}
