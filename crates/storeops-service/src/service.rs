//! # StoreService
//!
//! The single store-wide owner of the carton ledger, the task index and the
//! employee directory. Every operation takes the caller's identity and
//! checks the access policy against the directory's record for that
//! employee, never against the role or name the identity carries.
//!
//! ## Access policy
//!
//! | Operation                              | Minimum role |
//! |----------------------------------------|--------------|
//! | carton add / remove, total, history    | employee     |
//! | carton set / reset / undo              | shift_lead   |
//! | schedule task                          | shift_lead   |
//! | own tasks: list, mark, summary         | employee     |
//! | another employee's tasks               | shift_lead   |
//! | all pending / overdue / store summary  | shift_lead   |
//! | list employees                         | employee     |
//! | register / deactivate employee         | admin        |
//!
//! Registering an employee additionally requires the caller to hold at
//! least the role being granted. The very first employee may be registered
//! without a caller while the directory has no active employees.
//!
//! ## Mutations
//!
//! A change is applied to a copy of the affected structure, the snapshot is
//! written from that copy, and only then is the copy swapped in. If the
//! write fails the caller gets the error and memory is exactly as before,
//! so a retry is safe. Mutations hold the ledger lock throughout, and locks
//! are always taken in the order ledger, tasks, directory.
//!
//! ## Halting
//!
//! If the ledger ever reports an invariant violation the service stops
//! accepting carton changes and returns [`ServiceError::LedgerHalted`]
//! until the process restarts. Reads keep working.

use parking_lot::{Mutex, RwLock};

use storeops_core::{has_access_by_name, EmployeeId, Role, StoreError, TaskId, Timestamp};
use storeops_ledger::{CartonAction, CartonChange, CartonLedger, CartonLedgerEntry, LedgerError};
use storeops_state::{TaskDueIndex, TaskLog, TaskStatus, TaskSummary};

use crate::auth::{require_role, CallerIdentity, Employee, EmployeeDirectory, EmployeeProfile};
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::snapshot::StoreSnapshot;

struct LedgerSlot {
    ledger: CartonLedger,
    halted: Option<String>,
}

impl LedgerSlot {
    fn ensure_running(&self) -> Result<(), ServiceError> {
        match &self.halted {
            Some(reason) => Err(ServiceError::LedgerHalted(reason.clone())),
            None => Ok(()),
        }
    }

    fn halt(&mut self, err: &LedgerError) -> ServiceError {
        let reason = err.to_string();
        tracing::error!(error = %reason, "carton ledger invariant violated, halting");
        self.halted = Some(reason.clone());
        ServiceError::Store(StoreError::InvariantViolation(reason))
    }
}

/// Store-wide service object. Construct once and share by reference.
pub struct StoreService {
    config: ServiceConfig,
    ledger: Mutex<LedgerSlot>,
    tasks: RwLock<TaskDueIndex>,
    directory: RwLock<EmployeeDirectory>,
}

impl std::fmt::Debug for StoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreService")
            .field("data_dir", &self.config.data_dir)
            .field("history_limit", &self.config.history_limit)
            .finish_non_exhaustive()
    }
}

impl StoreService {
    /// An empty in-memory service with default configuration.
    pub fn in_memory() -> Self {
        Self::from_parts(
            ServiceConfig::default(),
            CartonLedger::new(),
            TaskDueIndex::new(),
            EmployeeDirectory::new(),
        )
    }

    /// Open the service described by `config`.
    ///
    /// Loads the snapshot from `data_dir` if one exists, then registers any
    /// configured employee whose name has no active record.
    ///
    /// # Errors
    ///
    /// - `InvariantViolation` if the stored ledger or directory does not
    ///   verify.
    /// - `Persistence` or `Io` if the snapshot cannot be read, or cannot be
    ///   written after seeding.
    /// - `InvalidInput` if a configured employee has a malformed or
    ///   duplicate PIN.
    pub fn open(config: ServiceConfig) -> Result<Self, ServiceError> {
        let (ledger, tasks, mut directory) = match &config.data_dir {
            Some(dir) => match StoreSnapshot::load(dir)? {
                Some(snapshot) => snapshot.into_parts()?,
                None => Default::default(),
            },
            None => Default::default(),
        };

        let mut seeded = 0usize;
        for seed in &config.employees {
            if directory.find_by_name(&seed.name).is_none() {
                directory.register(&seed.name, seed.role, &seed.pin)?;
                seeded += 1;
            }
        }
        if seeded > 0 {
            if let Some(dir) = &config.data_dir {
                StoreSnapshot::capture(&ledger, &tasks, &directory).save(dir)?;
            }
        }

        tracing::info!(
            data_dir = ?config.data_dir,
            entries = ledger.len(),
            total = ledger.total(),
            tasks = tasks.len(),
            employees = directory.active_count(),
            seeded,
            "store service opened"
        );

        Ok(Self::from_parts(config, ledger, tasks, directory))
    }

    fn from_parts(
        config: ServiceConfig,
        ledger: CartonLedger,
        tasks: TaskDueIndex,
        directory: EmployeeDirectory,
    ) -> Self {
        Self {
            config,
            ledger: Mutex::new(LedgerSlot {
                ledger,
                halted: None,
            }),
            tasks: RwLock::new(tasks),
            directory: RwLock::new(directory),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ── Access ──────────────────────────────────────────────────────────

    /// Resolve a PIN to a caller identity.
    pub fn login(&self, pin: &str) -> Result<CallerIdentity, ServiceError> {
        self.directory.read().login(pin)
    }

    /// Role check by name, for callers holding untyped role strings.
    pub fn has_access(&self, held: &str, required: Option<&str>) -> bool {
        has_access_by_name(held, required)
    }

    /// Look the caller up in the directory and check `minimum` against the
    /// role on record. Returns the directory's view of the caller.
    ///
    /// Must be called with no state lock held.
    fn authorize(
        &self,
        caller: &CallerIdentity,
        minimum: Role,
    ) -> Result<CallerIdentity, ServiceError> {
        let current = self
            .directory
            .read()
            .get(&caller.employee_id())
            .filter(|e| e.active)
            .map(Employee::identity);
        let Some(current) = current else {
            tracing::warn!(employee = %caller.employee_id(), "caller is not an active employee");
            return Err(ServiceError::Unauthorized(format!(
                "{} is not an active employee",
                caller.employee_id()
            )));
        };
        require_role(&current, minimum)?;
        Ok(current)
    }

    // ── Employee directory ──────────────────────────────────────────────

    /// Add an employee.
    ///
    /// With `caller == None` this succeeds only while the directory has no
    /// active employees. That check and the insert happen under one write
    /// lock, so concurrent bootstraps register at most one employee.
    pub fn register_employee(
        &self,
        caller: Option<&CallerIdentity>,
        name: &str,
        role: Role,
        pin: &str,
    ) -> Result<EmployeeProfile, ServiceError> {
        let granted_by = match caller {
            Some(caller) => {
                let current = self.authorize(caller, Role::Admin)?;
                require_role(&current, role)?;
                Some(current.employee_id())
            }
            None => None,
        };

        let slot = self.ledger.lock();
        let tasks = self.tasks.read();
        let mut directory = self.directory.write();
        if granted_by.is_none() && directory.active_count() > 0 {
            return Err(ServiceError::Unauthorized(
                "registering without a PIN is only allowed for the first employee".into(),
            ));
        }
        let mut staged = directory.clone();
        let employee = staged.register(name, role, pin)?;
        self.persist(&slot.ledger, &tasks, &staged)?;
        *directory = staged;

        tracing::info!(
            employee = %employee.id,
            name = %employee.name,
            role = %employee.role,
            by = ?granted_by,
            "employee registered"
        );
        Ok(employee.profile())
    }

    /// Deactivate an employee. Returns `false` for an unknown id.
    pub fn deactivate_employee(
        &self,
        caller: &CallerIdentity,
        id: &EmployeeId,
    ) -> Result<bool, ServiceError> {
        let current = self.authorize(caller, Role::Admin)?;
        if current.employee_id() == *id {
            return Err(ServiceError::invalid("employees cannot deactivate themselves"));
        }

        let slot = self.ledger.lock();
        let tasks = self.tasks.read();
        let mut directory = self.directory.write();
        let mut staged = directory.clone();
        if !staged.deactivate(id) {
            return Ok(false);
        }
        self.persist(&slot.ledger, &tasks, &staged)?;
        *directory = staged;

        tracing::info!(employee = %id, by = %current.employee_id(), "employee deactivated");
        Ok(true)
    }

    /// Every employee record, without credentials.
    pub fn list_employees(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<EmployeeProfile>, ServiceError> {
        self.authorize(caller, Role::Employee)?;
        Ok(self.directory.read().list())
    }

    // ── Carton ledger ───────────────────────────────────────────────────

    fn required_for(action: CartonAction) -> Role {
        match action {
            CartonAction::Add | CartonAction::Remove => Role::Employee,
            CartonAction::Set | CartonAction::Reset => Role::ShiftLead,
        }
    }

    /// Record a carton change under the caller's name from the directory.
    pub fn record_cartons(
        &self,
        caller: &CallerIdentity,
        action: CartonAction,
        amount: Option<u32>,
        note: &str,
    ) -> Result<CartonLedgerEntry, ServiceError> {
        let current = self.authorize(caller, Self::required_for(action))?;
        let change = CartonChange::new(action, amount, current.name(), note)?;

        let mut slot = self.ledger.lock();
        slot.ensure_running()?;
        let mut staged = slot.ledger.clone();
        let entry = match staged.append(change) {
            Ok(entry) => entry,
            Err(e) if e.is_invariant_violation() => return Err(slot.halt(&e)),
            Err(e) => return Err(e.into()),
        };
        self.persist(&staged, &self.tasks.read(), &self.directory.read())?;
        slot.ledger = staged;
        drop(slot);

        tracing::info!(
            employee = %current.name(),
            action = %entry.action,
            delta = entry.delta,
            total = entry.total_after,
            clamped = entry.was_clamped(),
            "carton change recorded"
        );
        Ok(entry)
    }

    /// Undo the most recent carton entry. Returns the removed entry, or
    /// `None` if the ledger is empty.
    pub fn undo_last_carton(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Option<CartonLedgerEntry>, ServiceError> {
        let current = self.authorize(caller, Role::ShiftLead)?;

        let mut slot = self.ledger.lock();
        slot.ensure_running()?;
        let mut staged = slot.ledger.clone();
        let Some(removed) = staged.pop_last() else {
            tracing::debug!("undo requested on empty carton ledger");
            return Ok(None);
        };
        self.persist(&staged, &self.tasks.read(), &self.directory.read())?;
        slot.ledger = staged;
        let total = slot.ledger.total();
        drop(slot);

        tracing::info!(
            by = %current.name(),
            undone = %removed.id,
            total,
            "carton entry undone"
        );
        Ok(Some(removed))
    }

    /// Current carton total.
    pub fn carton_total(&self, caller: &CallerIdentity) -> Result<i64, ServiceError> {
        self.authorize(caller, Role::Employee)?;
        Ok(self.ledger.lock().ledger.total())
    }

    /// Most recent entries first. `None` uses the configured history limit.
    pub fn carton_history(
        &self,
        caller: &CallerIdentity,
        limit: Option<usize>,
    ) -> Result<Vec<CartonLedgerEntry>, ServiceError> {
        self.authorize(caller, Role::Employee)?;
        let limit = limit.unwrap_or(self.config.history_limit);
        Ok(self.ledger.lock().ledger.history(limit))
    }

    /// Re-verify the in-memory ledger chain, halting on failure.
    pub fn verify_ledger(&self) -> Result<(), ServiceError> {
        let mut slot = self.ledger.lock();
        match slot.ledger.verify_chain() {
            Ok(()) => Ok(()),
            Err(e) => Err(slot.halt(&e)),
        }
    }

    /// Whether carton changes are currently refused.
    pub fn is_ledger_halted(&self) -> bool {
        self.ledger.lock().halted.is_some()
    }

    // ── Tasks ───────────────────────────────────────────────────────────

    /// Create a pending task for an active employee.
    pub fn schedule_task(
        &self,
        caller: &CallerIdentity,
        assignee: EmployeeId,
        title: &str,
        due_at: Timestamp,
        now: Timestamp,
    ) -> Result<TaskLog, ServiceError> {
        self.authorize(caller, Role::ShiftLead)?;

        let slot = self.ledger.lock();
        let mut tasks = self.tasks.write();
        let directory = self.directory.read();
        if !directory.get(&assignee).is_some_and(|e| e.active) {
            return Err(ServiceError::invalid(format!(
                "{assignee} is not an active employee"
            )));
        }
        let mut staged = tasks.clone();
        let task = staged.schedule(assignee, title, due_at, now)?;
        self.persist(&slot.ledger, &staged, &directory)?;
        *tasks = staged;

        tracing::info!(task = %task.id, assigned_to = %assignee, due_at = %task.due_at, "task scheduled");
        Ok(task)
    }

    /// The caller's own pending tasks, earliest due first.
    pub fn my_pending_tasks(&self, caller: &CallerIdentity) -> Result<Vec<TaskLog>, ServiceError> {
        self.pending_for(caller, caller.employee_id())
    }

    /// Pending tasks for `employee`. Other employees' lists need shift_lead.
    pub fn pending_for(
        &self,
        caller: &CallerIdentity,
        employee: EmployeeId,
    ) -> Result<Vec<TaskLog>, ServiceError> {
        self.authorize(caller, Self::required_for_employee(caller, employee))?;
        Ok(self.tasks.read().pending_for(employee))
    }

    /// Every pending task in the store.
    pub fn all_pending(&self, caller: &CallerIdentity) -> Result<Vec<TaskLog>, ServiceError> {
        self.authorize(caller, Role::ShiftLead)?;
        Ok(self.tasks.read().all_pending())
    }

    /// Pending tasks due strictly before `now`.
    pub fn overdue(
        &self,
        caller: &CallerIdentity,
        now: Timestamp,
    ) -> Result<Vec<TaskLog>, ServiceError> {
        self.authorize(caller, Role::ShiftLead)?;
        Ok(self.tasks.read().overdue(now))
    }

    /// Set a task's status. `Ok(None)` for an unknown task id.
    pub fn mark_task(
        &self,
        caller: &CallerIdentity,
        id: &TaskId,
        status: TaskStatus,
        now: Timestamp,
    ) -> Result<Option<TaskLog>, ServiceError> {
        let current = self.authorize(caller, Role::Employee)?;

        let slot = self.ledger.lock();
        let mut tasks = self.tasks.write();
        let Some(task) = tasks.get(id) else {
            return Ok(None);
        };
        if task.assigned_to != current.employee_id() {
            require_role(&current, Role::ShiftLead)?;
        }
        let before = task.status;
        let mut staged = tasks.clone();
        let Some(updated) = staged.mark_status(id, status, now) else {
            return Ok(None);
        };
        self.persist(&slot.ledger, &staged, &self.directory.read())?;
        *tasks = staged;
        drop(tasks);
        drop(slot);

        if before != updated.status {
            tracing::info!(task = %updated.id, from = %before, to = %updated.status, by = %current.name(), "task status changed");
        }
        Ok(Some(updated))
    }

    /// Outcome counts for one employee, or for the whole store with `None`.
    pub fn task_summary(
        &self,
        caller: &CallerIdentity,
        employee: Option<EmployeeId>,
        now: Timestamp,
    ) -> Result<TaskSummary, ServiceError> {
        let minimum = match employee {
            Some(id) => Self::required_for_employee(caller, id),
            None => Role::ShiftLead,
        };
        self.authorize(caller, minimum)?;
        Ok(self.tasks.read().summary(employee, now))
    }

    fn required_for_employee(caller: &CallerIdentity, employee: EmployeeId) -> Role {
        if caller.employee_id() == employee {
            Role::Employee
        } else {
            Role::ShiftLead
        }
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Capture the current state. Locks ledger, tasks, directory in order.
    pub fn snapshot(&self) -> StoreSnapshot {
        let slot = self.ledger.lock();
        let tasks = self.tasks.read();
        let directory = self.directory.read();
        StoreSnapshot::capture(&slot.ledger, &tasks, &directory)
    }

    /// Write staged state if a data directory is configured. The caller
    /// holds the ledger lock, so snapshots land in commit order.
    fn persist(
        &self,
        ledger: &CartonLedger,
        tasks: &TaskDueIndex,
        directory: &EmployeeDirectory,
    ) -> Result<(), ServiceError> {
        let Some(dir) = &self.config.data_dir else {
            return Ok(());
        };
        StoreSnapshot::capture(ledger, tasks, directory)
            .save(dir)
            .map_err(|e| {
                tracing::error!(error = %e, dir = %dir.display(), "snapshot write failed, change discarded");
                e
            })
    }
}
