// Method-level security: which role each gateway operation requires

use crate::domain::{Principal, Role};
use crate::error::{AppError, Result};

/// Every operation exposed by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Health,
    Register,
    Login,
    WhoAmI,
    ProfileGet,
    ProfileUpdate,
    ProfileDelete,
    ProfileList,
    TaskCreate,
    TaskGet,
    TaskList,
    TaskUpdate,
    TaskTransition,
    TaskDelete,
    TaskSummary,
    AdminStats,
    AdminMaintenance,
}

impl Operation {
    pub const ALL: [Operation; 17] = [
        Operation::Health,
        Operation::Register,
        Operation::Login,
        Operation::WhoAmI,
        Operation::ProfileGet,
        Operation::ProfileUpdate,
        Operation::ProfileDelete,
        Operation::ProfileList,
        Operation::TaskCreate,
        Operation::TaskGet,
        Operation::TaskList,
        Operation::TaskUpdate,
        Operation::TaskTransition,
        Operation::TaskDelete,
        Operation::TaskSummary,
        Operation::AdminStats,
        Operation::AdminMaintenance,
    ];

    /// JSON-RPC method name
    pub fn method(&self) -> &'static str {
        match self {
            Operation::Health => "system.health.v1",
            Operation::Register => "auth.register.v1",
            Operation::Login => "auth.login.v1",
            Operation::WhoAmI => "auth.whoami.v1",
            Operation::ProfileGet => "profile.get.v1",
            Operation::ProfileUpdate => "profile.update.v1",
            Operation::ProfileDelete => "profile.delete.v1",
            Operation::ProfileList => "profile.list.v1",
            Operation::TaskCreate => "task.create.v1",
            Operation::TaskGet => "task.get.v1",
            Operation::TaskList => "task.list.v1",
            Operation::TaskUpdate => "task.update.v1",
            Operation::TaskTransition => "task.transition.v1",
            Operation::TaskDelete => "task.delete.v1",
            Operation::TaskSummary => "task.summary.v1",
            Operation::AdminStats => "admin.stats.v1",
            Operation::AdminMaintenance => "admin.maintenance.v1",
        }
    }

    /// `None` means the operation is open to anonymous callers
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Operation::Health | Operation::Register | Operation::Login => None,
            Operation::ProfileDelete
            | Operation::ProfileList
            | Operation::AdminStats
            | Operation::AdminMaintenance => Some(Role::Admin),
            _ => Some(Role::User),
        }
    }
}

/// Check a (possibly anonymous) caller against the operation's role
pub fn authorize(principal: Option<&Principal>, op: Operation) -> Result<()> {
    let Some(role) = op.required_role() else {
        return Ok(());
    };
    match principal {
        None => Err(AppError::Unauthorized(format!(
            "{} requires authentication",
            op.method()
        ))),
        Some(p) if p.has_role(role) => Ok(()),
        Some(p) => Err(AppError::Forbidden(format!(
            "{} requires role {} (caller: {})",
            op.method(),
            role,
            p.username
        ))),
    }
}
