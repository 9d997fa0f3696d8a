//! Shared fixtures for service tests

use hr_contracts::UserContext;
use hr_core::traits::Id;
use hr_db::{MemoryStore, Store, WriteBatch};
use hr_models::{Branch, Department, Role};
use uuid::Uuid;

pub struct MockUser {
    pub id: Id,
    pub role: Role,
    pub branch: Option<String>,
}

impl MockUser {
    pub fn admin() -> Self {
        Self::with_role(Role::Admin)
    }

    pub fn approver(branch: Option<&str>) -> Self {
        Self {
            branch: branch.map(Into::into),
            ..Self::with_role(Role::Approver)
        }
    }

    pub fn viewer() -> Self {
        Self::with_role(Role::Viewer)
    }

    fn with_role(role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            branch: None,
        }
    }
}

impl UserContext for MockUser {
    fn id(&self) -> Id {
        self.id
    }

    fn role(&self) -> Role {
        self.role
    }

    fn branch_id(&self) -> Option<&str> {
        self.branch.as_deref()
    }
}

pub async fn seed_branch(store: &MemoryStore, title: &str) -> Branch {
    let branch = Branch::new(title);
    let mut batch = WriteBatch::new();
    batch.upsert_branch(branch.clone());
    store.commit(batch).await.unwrap();
    branch
}

pub async fn seed_department(store: &MemoryStore, branch: &str, title: &str) -> Department {
    let department = Department::new(branch, title);
    let mut batch = WriteBatch::new();
    batch.upsert_department(department.clone());
    store.commit(batch).await.unwrap();
    department
}
