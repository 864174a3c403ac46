//! JSON-RPC Server
//!
//! Implements the JSON-RPC 2.0 gateway over HTTP.

use crate::handler::{GatewayServices, RpcHandler};
use crate::rate_limiter::ThrottleConfig;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::error::INVALID_PARAMS_CODE;
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::RpcModule;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use taskhub_core::application::Operation;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

/// RPC Server Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 picks an ephemeral port (see `RunningServer::addr`)
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// A started server: bound address plus the handle used to stop it
pub struct RunningServer {
    pub addr: SocketAddr,
    pub handle: ServerHandle,
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

fn invalid_params(err: serde_json::Error) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(INVALID_PARAMS_CODE, err.to_string(), None::<()>)
}

/// Register `op` so its params are parsed into `P` and handed to `call`
fn route<P, R, F, Fut>(
    module: &mut RpcModule<()>,
    handler: &Arc<RpcHandler>,
    op: Operation,
    call: F,
) -> Result<(), String>
where
    P: DeserializeOwned + Send + 'static,
    R: Serialize + Clone + Send + 'static,
    F: Fn(Arc<RpcHandler>, P) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ErrorObjectOwned>> + Send + 'static,
{
    let handler = handler.clone();
    module
        .register_async_method(op.method(), move |params, _, _| {
            let handler = handler.clone();
            let call = call.clone();
            async move {
                // Absent params behave like an empty object
                let raw = params.as_str().unwrap_or("{}");
                let req: P = serde_json::from_str(raw).map_err(invalid_params)?;
                call(handler, req).await
            }
        })
        .map_err(|e| e.to_string())?;
    Ok(())
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        services: GatewayServices,
        throttle: ThrottleConfig,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(services, throttle)),
        }
    }

    /// Build the method table
    pub fn module(&self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());
        let h = &self.handler;

        route(&mut module, h, Operation::Health, |h, p| async move {
            h.health(p).await
        })?;
        route(&mut module, h, Operation::Register, |h, p| async move {
            h.register(p).await
        })?;
        route(&mut module, h, Operation::Login, |h, p| async move {
            h.login(p).await
        })?;
        route(&mut module, h, Operation::WhoAmI, |h, p| async move {
            h.whoami(p).await
        })?;

        route(&mut module, h, Operation::ProfileGet, |h, p| async move {
            h.profile_get(p).await
        })?;
        route(&mut module, h, Operation::ProfileUpdate, |h, p| async move {
            h.profile_update(p).await
        })?;
        route(&mut module, h, Operation::ProfileDelete, |h, p| async move {
            h.profile_delete(p).await
        })?;
        route(&mut module, h, Operation::ProfileList, |h, p| async move {
            h.profile_list(p).await
        })?;

        route(&mut module, h, Operation::TaskCreate, |h, p| async move {
            h.task_create(p).await
        })?;
        route(&mut module, h, Operation::TaskGet, |h, p| async move {
            h.task_get(p).await
        })?;
        route(&mut module, h, Operation::TaskList, |h, p| async move {
            h.task_list(p).await
        })?;
        route(&mut module, h, Operation::TaskUpdate, |h, p| async move {
            h.task_update(p).await
        })?;
        route(&mut module, h, Operation::TaskTransition, |h, p| async move {
            h.task_transition(p).await
        })?;
        route(&mut module, h, Operation::TaskDelete, |h, p| async move {
            h.task_delete(p).await
        })?;
        route(&mut module, h, Operation::TaskSummary, |h, p| async move {
            h.task_summary(p).await
        })?;

        // Admin APIs
        route(&mut module, h, Operation::AdminStats, |h, p| async move {
            h.stats(p).await
        })?;
        route(&mut module, h, Operation::AdminMaintenance, |h, p| async move {
            h.maintenance(p).await
        })?;

        Ok(module)
    }

    /// Start the JSON-RPC server
    pub async fn start(self) -> Result<RunningServer, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let bound = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.module()?;
        info!(
            addr = %bound,
            methods = Operation::ALL.len(),
            "JSON-RPC server started successfully"
        );

        Ok(RunningServer {
            addr: bound,
            handle: server.start(module),
        })
    }
}
