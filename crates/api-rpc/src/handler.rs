//! RPC Method Handlers
//!
//! Every method runs the same guard: resolve the caller from its access
//! token, throttle per caller, check the operation's required role, then
//! delegate to the application service.

use crate::error::{throttled, to_rpc_error};
use crate::rate_limiter::{RateLimiter, ThrottleConfig, ANONYMOUS};
use crate::types::{
    Authenticated, DeleteResponse, HealthResponse, LoginRequest, MaintenanceRequest,
    MaintenanceResponse, NoParams, PageRequest, ProfileListResponse, ProfileRequest,
    ProfileUpdateRequest, RegisterResponse, StatsResponse, StatusCount, TaskListResponse,
    TaskRequest, TaskSummaryResponse, TaskTransitionRequest, TaskUpdateRequest, WhoAmIResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use std::time::Instant;
use taskhub_core::application::auth::RegisterRequest;
use taskhub_core::application::task::CreateTaskRequest;
use taskhub_core::application::{authorize, AuthService, Operation, ProfileService, TaskService};
use taskhub_core::domain::{Principal, Profile, Task};
use taskhub_core::port::repository::DEFAULT_PAGE_SIZE;
use taskhub_core::port::{AccessToken, Maintenance, MaintenanceConfig, TaskFilter};
use tracing::debug;

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// Application services the gateway routes to
pub struct GatewayServices {
    pub auth: Arc<AuthService>,
    pub profiles: Arc<ProfileService>,
    pub tasks: Arc<TaskService>,
    pub maintenance: Arc<dyn Maintenance>,
    pub maintenance_config: MaintenanceConfig,
}

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    services: GatewayServices,
    rate_limiter: RateLimiter,
    start_time: Instant,
}

impl RpcHandler {
    pub fn new(services: GatewayServices, throttle: ThrottleConfig) -> Self {
        Self {
            services,
            rate_limiter: RateLimiter::new(throttle),
            start_time: Instant::now(),
        }
    }

    fn throttle(&self, key: &str) -> RpcResult<()> {
        if self.rate_limiter.check(key) {
            Ok(())
        } else {
            debug!(caller = %key, "Request throttled");
            Err(throttled())
        }
    }

    /// Guard for operations open to anonymous callers
    fn open(&self, op: Operation) -> RpcResult<()> {
        self.throttle(ANONYMOUS)?;
        authorize(None, op).map_err(to_rpc_error)
    }

    /// Guard for protected operations
    async fn guard(&self, op: Operation, access_token: &str) -> RpcResult<Principal> {
        let principal = match self.services.auth.authenticate(access_token).await {
            Ok(principal) => principal,
            Err(e) => {
                // Rejected tokens spend from the anonymous bucket
                self.throttle(ANONYMOUS)?;
                return Err(to_rpc_error(e));
            }
        };
        self.throttle(&principal.account_id)?;
        authorize(Some(&principal), op).map_err(to_rpc_error)?;
        debug!(method = op.method(), caller = %principal.account_id, "Authorized");
        Ok(principal)
    }

    /// system.health.v1
    pub async fn health(&self, _params: NoParams) -> RpcResult<HealthResponse> {
        self.open(Operation::Health)?;
        Ok(HealthResponse {
            status: "ok".to_string(),
            version: taskhub_core::VERSION.to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }

    /// auth.register.v1
    pub async fn register(&self, params: RegisterRequest) -> RpcResult<RegisterResponse> {
        self.open(Operation::Register)?;
        let registration = self
            .services
            .auth
            .register(params)
            .await
            .map_err(to_rpc_error)?;

        Ok(RegisterResponse {
            account_id: registration.account.id,
            username: registration.account.username,
            roles: registration.account.roles,
            profile: registration.profile,
        })
    }

    /// auth.login.v1
    pub async fn login(&self, params: LoginRequest) -> RpcResult<AccessToken> {
        self.open(Operation::Login)?;
        self.services
            .auth
            .login(&params.username, &params.password)
            .await
            .map_err(to_rpc_error)
    }

    /// auth.whoami.v1
    pub async fn whoami(&self, params: Authenticated<NoParams>) -> RpcResult<WhoAmIResponse> {
        let principal = self.guard(Operation::WhoAmI, &params.access_token).await?;
        let account = self
            .services
            .auth
            .whoami(&principal)
            .await
            .map_err(to_rpc_error)?;

        Ok(WhoAmIResponse {
            account_id: account.id,
            username: account.username,
            roles: account.roles,
            created_at: account.created_at,
        })
    }

    /// profile.get.v1
    pub async fn profile_get(&self, params: Authenticated<ProfileRequest>) -> RpcResult<Profile> {
        let principal = self.guard(Operation::ProfileGet, &params.access_token).await?;
        self.services
            .profiles
            .get(&principal, &params.body.user_id)
            .await
            .map_err(to_rpc_error)
    }

    /// profile.update.v1
    pub async fn profile_update(
        &self,
        params: Authenticated<ProfileUpdateRequest>,
    ) -> RpcResult<Profile> {
        let principal = self
            .guard(Operation::ProfileUpdate, &params.access_token)
            .await?;
        self.services
            .profiles
            .update(&principal, &params.body.user_id, params.body.patch)
            .await
            .map_err(to_rpc_error)
    }

    /// profile.delete.v1
    pub async fn profile_delete(
        &self,
        params: Authenticated<ProfileRequest>,
    ) -> RpcResult<DeleteResponse> {
        let principal = self
            .guard(Operation::ProfileDelete, &params.access_token)
            .await?;
        self.services
            .profiles
            .delete(&principal, &params.body.user_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(DeleteResponse {
            id: params.body.user_id,
            deleted: true,
        })
    }

    /// profile.list.v1
    pub async fn profile_list(
        &self,
        params: Authenticated<PageRequest>,
    ) -> RpcResult<ProfileListResponse> {
        let principal = self.guard(Operation::ProfileList, &params.access_token).await?;
        let profiles = self
            .services
            .profiles
            .list(
                &principal,
                params.body.limit.unwrap_or(DEFAULT_PAGE_SIZE),
                params.body.offset.unwrap_or(0),
            )
            .await
            .map_err(to_rpc_error)?;

        Ok(ProfileListResponse {
            count: profiles.len(),
            profiles,
        })
    }

    /// task.create.v1
    pub async fn task_create(&self, params: Authenticated<CreateTaskRequest>) -> RpcResult<Task> {
        let principal = self.guard(Operation::TaskCreate, &params.access_token).await?;
        self.services
            .tasks
            .create(&principal, params.body)
            .await
            .map_err(to_rpc_error)
    }

    /// task.get.v1
    pub async fn task_get(&self, params: Authenticated<TaskRequest>) -> RpcResult<Task> {
        let principal = self.guard(Operation::TaskGet, &params.access_token).await?;
        self.services
            .tasks
            .get(&principal, &params.body.task_id)
            .await
            .map_err(to_rpc_error)
    }

    /// task.list.v1
    pub async fn task_list(&self, params: Authenticated<TaskFilter>) -> RpcResult<TaskListResponse> {
        let principal = self.guard(Operation::TaskList, &params.access_token).await?;
        let tasks = self
            .services
            .tasks
            .list(&principal, params.body)
            .await
            .map_err(to_rpc_error)?;

        Ok(TaskListResponse {
            count: tasks.len(),
            tasks,
        })
    }

    /// task.update.v1
    pub async fn task_update(&self, params: Authenticated<TaskUpdateRequest>) -> RpcResult<Task> {
        let principal = self.guard(Operation::TaskUpdate, &params.access_token).await?;
        self.services
            .tasks
            .update(&principal, &params.body.task_id, params.body.patch)
            .await
            .map_err(to_rpc_error)
    }

    /// task.transition.v1
    pub async fn task_transition(
        &self,
        params: Authenticated<TaskTransitionRequest>,
    ) -> RpcResult<Task> {
        let principal = self
            .guard(Operation::TaskTransition, &params.access_token)
            .await?;
        self.services
            .tasks
            .transition(&principal, &params.body.task_id, params.body.action)
            .await
            .map_err(to_rpc_error)
    }

    /// task.delete.v1
    pub async fn task_delete(&self, params: Authenticated<TaskRequest>) -> RpcResult<DeleteResponse> {
        let principal = self.guard(Operation::TaskDelete, &params.access_token).await?;
        self.services
            .tasks
            .delete(&principal, &params.body.task_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(DeleteResponse {
            id: params.body.task_id,
            deleted: true,
        })
    }

    /// task.summary.v1
    pub async fn task_summary(
        &self,
        params: Authenticated<NoParams>,
    ) -> RpcResult<TaskSummaryResponse> {
        let principal = self.guard(Operation::TaskSummary, &params.access_token).await?;
        let counts = self
            .services
            .tasks
            .summary(&principal)
            .await
            .map_err(to_rpc_error)?;

        Ok(TaskSummaryResponse {
            total: counts.iter().map(|(_, n)| n).sum(),
            by_status: counts
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
        })
    }

    /// admin.stats.v1
    pub async fn stats(&self, params: Authenticated<NoParams>) -> RpcResult<StatsResponse> {
        self.guard(Operation::AdminStats, &params.access_token).await?;
        let stats = self
            .services
            .maintenance
            .get_stats()
            .await
            .map_err(to_rpc_error)?;

        Ok(StatsResponse {
            accounts: stats.account_count,
            profiles: stats.profile_count,
            tasks: stats.task_count,
            outbox_pending: stats.outbox_pending,
            outbox_delivered: stats.outbox_delivered,
            outbox_failed: stats.outbox_failed,
            db_size_bytes: stats.db_size_bytes,
            fragmentation_percent: stats.fragmentation_percent,
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }

    /// admin.maintenance.v1
    pub async fn maintenance(
        &self,
        params: Authenticated<MaintenanceRequest>,
    ) -> RpcResult<MaintenanceResponse> {
        self.guard(Operation::AdminMaintenance, &params.access_token)
            .await?;
        let report = self
            .services
            .maintenance
            .run_full_maintenance(&self.services.maintenance_config, params.body.force_vacuum)
            .await
            .map_err(to_rpc_error)?;

        Ok(MaintenanceResponse {
            purged_events: report.purged_events,
            vacuum_run: report.vacuum_run,
            db_size_before: report.db_size_before,
            db_size_after: report.db_size_after,
        })
    }
}
