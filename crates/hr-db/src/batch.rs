//! Atomic write batches

use hr_core::traits::Id;
use hr_models::{
    Branch, Department, Employee, KpiScorecard, OvertimeProfile, OvertimeRecord, UserProfile,
};

/// A single write inside a batch
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    UpsertBranch(Branch),
    DeleteBranch(Id),
    UpsertDepartment(Department),
    /// Insert unless (branch, title) is already taken
    EnsureDepartment(Department),
    DeleteDepartment(Id),
    UpsertEmployee(Employee),
    DeleteEmployee(Id),
    UpsertScorecard(KpiScorecard),
    DeleteScorecard(Id),
    UpsertOvertimeProfile(OvertimeProfile),
    DeleteOvertimeProfile(Id),
    UpsertOvertimeRecord(OvertimeRecord),
    DeleteOvertimeRecord(Id),
    UpsertUser(UserProfile),
    DeleteUser(Id),
}

impl WriteOp {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            WriteOp::UpsertBranch(_) => "upsert_branch",
            WriteOp::DeleteBranch(_) => "delete_branch",
            WriteOp::UpsertDepartment(_) => "upsert_department",
            WriteOp::EnsureDepartment(_) => "ensure_department",
            WriteOp::DeleteDepartment(_) => "delete_department",
            WriteOp::UpsertEmployee(_) => "upsert_employee",
            WriteOp::DeleteEmployee(_) => "delete_employee",
            WriteOp::UpsertScorecard(_) => "upsert_scorecard",
            WriteOp::DeleteScorecard(_) => "delete_scorecard",
            WriteOp::UpsertOvertimeProfile(_) => "upsert_overtime_profile",
            WriteOp::DeleteOvertimeProfile(_) => "delete_overtime_profile",
            WriteOp::UpsertOvertimeRecord(_) => "upsert_overtime_record",
            WriteOp::DeleteOvertimeRecord(_) => "delete_overtime_record",
            WriteOp::UpsertUser(_) => "upsert_user",
            WriteOp::DeleteUser(_) => "delete_user",
        }
    }
}

/// Ordered list of writes committed together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn upsert_branch(&mut self, branch: Branch) -> &mut Self {
        self.push(WriteOp::UpsertBranch(branch))
    }

    pub fn delete_branch(&mut self, id: Id) -> &mut Self {
        self.push(WriteOp::DeleteBranch(id))
    }

    pub fn upsert_department(&mut self, department: Department) -> &mut Self {
        self.push(WriteOp::UpsertDepartment(department))
    }

    pub fn ensure_department(&mut self, department: Department) -> &mut Self {
        self.push(WriteOp::EnsureDepartment(department))
    }

    pub fn delete_department(&mut self, id: Id) -> &mut Self {
        self.push(WriteOp::DeleteDepartment(id))
    }

    pub fn upsert_employee(&mut self, employee: Employee) -> &mut Self {
        self.push(WriteOp::UpsertEmployee(employee))
    }

    pub fn delete_employee(&mut self, id: Id) -> &mut Self {
        self.push(WriteOp::DeleteEmployee(id))
    }

    pub fn upsert_scorecard(&mut self, scorecard: KpiScorecard) -> &mut Self {
        self.push(WriteOp::UpsertScorecard(scorecard))
    }

    pub fn delete_scorecard(&mut self, employee_id: Id) -> &mut Self {
        self.push(WriteOp::DeleteScorecard(employee_id))
    }

    pub fn upsert_overtime_profile(&mut self, profile: OvertimeProfile) -> &mut Self {
        self.push(WriteOp::UpsertOvertimeProfile(profile))
    }

    pub fn delete_overtime_profile(&mut self, employee_id: Id) -> &mut Self {
        self.push(WriteOp::DeleteOvertimeProfile(employee_id))
    }

    pub fn upsert_overtime_record(&mut self, record: OvertimeRecord) -> &mut Self {
        self.push(WriteOp::UpsertOvertimeRecord(record))
    }

    pub fn delete_overtime_record(&mut self, id: Id) -> &mut Self {
        self.push(WriteOp::DeleteOvertimeRecord(id))
    }

    pub fn upsert_user(&mut self, user: UserProfile) -> &mut Self {
        self.push(WriteOp::UpsertUser(user))
    }

    pub fn delete_user(&mut self, id: Id) -> &mut Self {
        self.push(WriteOp::DeleteUser(id))
    }

    /// Delete an employee together with every denormalized copy
    pub fn delete_employee_everywhere(
        &mut self,
        employee_id: Id,
        overtime_record_ids: impl IntoIterator<Item = Id>,
    ) -> &mut Self {
        self.delete_employee(employee_id);
        self.delete_overtime_profile(employee_id);
        self.delete_scorecard(employee_id);
        for id in overtime_record_ids {
            self.delete_overtime_record(id);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_delete_employee_everywhere() {
        let employee_id = Uuid::new_v4();
        let records = [Uuid::new_v4(), Uuid::new_v4()];

        let mut batch = WriteBatch::new();
        batch.delete_employee_everywhere(employee_id, records);

        assert_eq!(batch.len(), 5);
        let kinds: Vec<_> = batch.ops().iter().map(WriteOp::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "delete_employee",
                "delete_overtime_profile",
                "delete_scorecard",
                "delete_overtime_record",
                "delete_overtime_record",
            ]
        );
    }

    #[test]
    fn test_builder_chains() {
        let mut batch = WriteBatch::new();
        batch
            .upsert_branch(Branch::new("Bole"))
            .delete_department(Uuid::new_v4());
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
    }
}
