//! In-memory store
//!
//! Used by tests and by the server's development fallback. Writes are
//! applied in place with an undo log; a failed commit is rolled back in
//! reverse so it leaves nothing behind.

use std::collections::HashMap;

use async_trait::async_trait;
use hr_core::traits::Id;
use hr_models::{
    Branch, Department, Employee, KpiScorecard, OvertimeProfile, OvertimeRecord, UserProfile,
};
use parking_lot::RwLock;

use crate::batch::{WriteBatch, WriteOp};
use crate::repository::{OvertimeFilter, RepositoryError, RepositoryResult, Store};

#[derive(Debug, Default)]
struct Tables {
    branches: HashMap<Id, Branch>,
    departments: HashMap<Id, Department>,
    employees: HashMap<Id, Employee>,
    scorecards: HashMap<Id, KpiScorecard>,
    overtime_profiles: HashMap<Id, OvertimeProfile>,
    overtime_records: HashMap<Id, OvertimeRecord>,
    users: HashMap<Id, UserProfile>,
}

/// Previous value of one key, restored if a later write in the batch fails
enum Undo {
    Branch(Id, Option<Branch>),
    Department(Id, Option<Department>),
    Employee(Id, Option<Employee>),
    Scorecard(Id, Option<KpiScorecard>),
    OvertimeProfile(Id, Option<OvertimeProfile>),
    OvertimeRecord(Id, Option<OvertimeRecord>),
    User(Id, Option<UserProfile>),
    Nothing,
}

fn restore<T>(table: &mut HashMap<Id, T>, id: Id, previous: Option<T>) {
    match previous {
        Some(value) => {
            table.insert(id, value);
        }
        None => {
            table.remove(&id);
        }
    }
}

impl Tables {
    fn apply(&mut self, op: WriteOp) -> RepositoryResult<Undo> {
        let undo = match op {
            WriteOp::UpsertBranch(branch) => {
                if self
                    .branches
                    .values()
                    .any(|b| b.id != branch.id && b.title == branch.title)
                {
                    return Err(RepositoryError::Conflict(format!(
                        "branch '{}' already exists",
                        branch.title
                    )));
                }
                let id = branch.id;
                Undo::Branch(id, self.branches.insert(id, branch))
            }
            WriteOp::DeleteBranch(id) => Undo::Branch(id, self.branches.remove(&id)),
            WriteOp::UpsertDepartment(dept) => {
                if self.departments.values().any(|d| {
                    d.id != dept.id && d.branch == dept.branch && d.title == dept.title
                }) {
                    return Err(RepositoryError::Conflict(format!(
                        "department '{}' already exists in '{}'",
                        dept.title, dept.branch
                    )));
                }
                let id = dept.id;
                Undo::Department(id, self.departments.insert(id, dept))
            }
            WriteOp::EnsureDepartment(dept) => {
                let taken = self
                    .departments
                    .values()
                    .any(|d| d.branch == dept.branch && d.title == dept.title);
                if taken {
                    Undo::Nothing
                } else {
                    let id = dept.id;
                    Undo::Department(id, self.departments.insert(id, dept))
                }
            }
            WriteOp::DeleteDepartment(id) => Undo::Department(id, self.departments.remove(&id)),
            WriteOp::UpsertEmployee(employee) => {
                let id = employee.id;
                Undo::Employee(id, self.employees.insert(id, employee))
            }
            WriteOp::DeleteEmployee(id) => Undo::Employee(id, self.employees.remove(&id)),
            WriteOp::UpsertScorecard(scorecard) => {
                let id = scorecard.employee_id;
                Undo::Scorecard(id, self.scorecards.insert(id, scorecard))
            }
            WriteOp::DeleteScorecard(id) => Undo::Scorecard(id, self.scorecards.remove(&id)),
            WriteOp::UpsertOvertimeProfile(profile) => {
                let id = profile.employee_id;
                Undo::OvertimeProfile(id, self.overtime_profiles.insert(id, profile))
            }
            WriteOp::DeleteOvertimeProfile(id) => {
                Undo::OvertimeProfile(id, self.overtime_profiles.remove(&id))
            }
            WriteOp::UpsertOvertimeRecord(record) => {
                let id = record.id;
                Undo::OvertimeRecord(id, self.overtime_records.insert(id, record))
            }
            WriteOp::DeleteOvertimeRecord(id) => {
                Undo::OvertimeRecord(id, self.overtime_records.remove(&id))
            }
            WriteOp::UpsertUser(user) => {
                if self
                    .users
                    .values()
                    .any(|u| u.id != user.id && u.email == user.email)
                {
                    return Err(RepositoryError::Conflict(format!(
                        "email '{}' is already registered",
                        user.email
                    )));
                }
                let id = user.id;
                Undo::User(id, self.users.insert(id, user))
            }
            WriteOp::DeleteUser(id) => Undo::User(id, self.users.remove(&id)),
        };
        Ok(undo)
    }

    fn revert(&mut self, undo: Undo) {
        match undo {
            Undo::Branch(id, previous) => restore(&mut self.branches, id, previous),
            Undo::Department(id, previous) => restore(&mut self.departments, id, previous),
            Undo::Employee(id, previous) => restore(&mut self.employees, id, previous),
            Undo::Scorecard(id, previous) => restore(&mut self.scorecards, id, previous),
            Undo::OvertimeProfile(id, previous) => {
                restore(&mut self.overtime_profiles, id, previous)
            }
            Undo::OvertimeRecord(id, previous) => {
                restore(&mut self.overtime_records, id, previous)
            }
            Undo::User(id, previous) => restore(&mut self.users, id, previous),
            Undo::Nothing => {}
        }
    }
}

/// `Store` backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_opt(value: &str, wanted: &Option<String>) -> bool {
    wanted.as_deref().map_or(true, |w| value == w)
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_branch(&self, id: Id) -> RepositoryResult<Option<Branch>> {
        Ok(self.tables.read().branches.get(&id).cloned())
    }

    async fn find_branch_by_title(&self, title: &str) -> RepositoryResult<Option<Branch>> {
        Ok(self
            .tables
            .read()
            .branches
            .values()
            .find(|b| b.title == title)
            .cloned())
    }

    async fn list_branches(&self) -> RepositoryResult<Vec<Branch>> {
        let mut branches: Vec<Branch> = self.tables.read().branches.values().cloned().collect();
        branches.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(branches)
    }

    async fn get_department(&self, id: Id) -> RepositoryResult<Option<Department>> {
        Ok(self.tables.read().departments.get(&id).cloned())
    }

    async fn find_department(
        &self,
        branch: &str,
        title: &str,
    ) -> RepositoryResult<Option<Department>> {
        Ok(self
            .tables
            .read()
            .departments
            .values()
            .find(|d| d.branch == branch && d.title == title)
            .cloned())
    }

    async fn list_departments(&self, branch: Option<String>) -> RepositoryResult<Vec<Department>> {
        let mut departments: Vec<Department> = self
            .tables
            .read()
            .departments
            .values()
            .filter(|d| matches_opt(&d.branch, &branch))
            .cloned()
            .collect();
        departments.sort_by(|a, b| (&a.branch, &a.title).cmp(&(&b.branch, &b.title)));
        Ok(departments)
    }

    async fn get_employee(&self, id: Id) -> RepositoryResult<Option<Employee>> {
        Ok(self.tables.read().employees.get(&id).cloned())
    }

    async fn list_employees(
        &self,
        branch: Option<String>,
        department: Option<String>,
    ) -> RepositoryResult<Vec<Employee>> {
        let mut employees: Vec<Employee> = self
            .tables
            .read()
            .employees
            .values()
            .filter(|e| matches_opt(&e.branch, &branch) && matches_opt(&e.department, &department))
            .cloned()
            .collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(employees)
    }

    async fn get_scorecard(&self, employee_id: Id) -> RepositoryResult<Option<KpiScorecard>> {
        Ok(self.tables.read().scorecards.get(&employee_id).cloned())
    }

    async fn list_scorecards(
        &self,
        branch: Option<String>,
        department: Option<String>,
    ) -> RepositoryResult<Vec<KpiScorecard>> {
        let mut scorecards: Vec<KpiScorecard> = self
            .tables
            .read()
            .scorecards
            .values()
            .filter(|s| matches_opt(&s.branch, &branch) && matches_opt(&s.department, &department))
            .cloned()
            .collect();
        scorecards.sort_by(|a, b| a.employee_name.cmp(&b.employee_name));
        Ok(scorecards)
    }

    async fn get_overtime_profile(
        &self,
        employee_id: Id,
    ) -> RepositoryResult<Option<OvertimeProfile>> {
        Ok(self.tables.read().overtime_profiles.get(&employee_id).cloned())
    }

    async fn list_overtime_profiles(
        &self,
        branch: Option<String>,
    ) -> RepositoryResult<Vec<OvertimeProfile>> {
        let mut profiles: Vec<OvertimeProfile> = self
            .tables
            .read()
            .overtime_profiles
            .values()
            .filter(|p| matches_opt(&p.branch, &branch))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.employee_name.cmp(&b.employee_name));
        Ok(profiles)
    }

    async fn get_overtime_record(&self, id: Id) -> RepositoryResult<Option<OvertimeRecord>> {
        Ok(self.tables.read().overtime_records.get(&id).cloned())
    }

    async fn list_overtime_records(
        &self,
        filter: OvertimeFilter,
    ) -> RepositoryResult<Vec<OvertimeRecord>> {
        let mut records: Vec<OvertimeRecord> = self
            .tables
            .read()
            .overtime_records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(records)
    }

    async fn get_user(&self, id: Id) -> RepositoryResult<Option<UserProfile>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserProfile>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> RepositoryResult<Vec<UserProfile>> {
        let mut users: Vec<UserProfile> = self.tables.read().users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn commit(&self, batch: WriteBatch) -> RepositoryResult<()> {
        let mut tables = self.tables.write();
        let count = batch.len();
        let mut undo = Vec::with_capacity(count);
        for op in batch {
            match tables.apply(op) {
                Ok(entry) => undo.push(entry),
                Err(err) => {
                    for entry in undo.into_iter().rev() {
                        tables.revert(entry);
                    }
                    return Err(err);
                }
            }
        }
        tracing::debug!(writes = count, "memory batch committed");
        Ok(())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
