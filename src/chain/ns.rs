//! Chain elements that run the rest of the chain inside another network namespace

use super::{CallOptions, Connection, NetworkServiceClient, NetworkServiceRequest, NetworkServiceServer};
use crate::netns::{run_pinned, LinuxNetns, NamespaceSwitcher, NetnsGuard, NetnsHandle};
use crate::telemetry::NetnsMetrics;
use crate::Result;
use std::sync::Arc;
use tracing::error;

/// Run `op` with the calling thread inside `target`, then switch back.
///
/// The thread is restored on every path out of `op`, including a panic. The
/// result of `op` is returned unchanged unless the restore fails, in which
/// case the restore error wins: the thread is stranded in `target` and the
/// caller must retire it.
pub fn invoke_in<S, T, F>(switcher: &S, target: &S::Handle, op: F) -> Result<T>
where
    S: NamespaceSwitcher,
    F: FnOnce() -> Result<T>,
{
    invoke_counted(switcher, target, None, op)
}

fn invoke_counted<S, T, F>(
    switcher: &S,
    target: &S::Handle,
    metrics: Option<&NetnsMetrics>,
    op: F,
) -> Result<T>
where
    S: NamespaceSwitcher,
    F: FnOnce() -> Result<T>,
{
    if let Some(m) = metrics {
        m.invocations.inc();
    }

    let guard = NetnsGuard::enter(switcher, target).map_err(|e| {
        if let Some(m) = metrics {
            if e.is_fatal() {
                m.restore_failures.inc();
            } else {
                m.switch_failures.inc();
            }
        }
        e
    })?;

    let result = op();
    if result.is_err() {
        if let Some(m) = metrics {
            m.downstream_failures.inc();
        }
    }

    if let Err(e) = guard.restore() {
        if let Some(m) = metrics {
            m.restore_failures.inc();
        }
        error!("{}; discarding downstream result", e);
        return Err(e);
    }
    result
}

/// Client element forwarding requests and closes from inside a namespace
pub struct NsClient<C, S: NamespaceSwitcher = LinuxNetns> {
    next: C,
    switcher: S,
    target: S::Handle,
    metrics: Option<Arc<NetnsMetrics>>,
}

impl<C> NsClient<C> {
    pub fn new(next: C, target: NetnsHandle) -> Self {
        Self::with_switcher(next, LinuxNetns, target)
    }
}

impl<C, S: NamespaceSwitcher> NsClient<C, S> {
    pub fn with_switcher(next: C, switcher: S, target: S::Handle) -> Self {
        Self {
            next,
            switcher,
            target,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<NetnsMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl<C, S> NetworkServiceClient for NsClient<C, S>
where
    C: NetworkServiceClient,
    S: NamespaceSwitcher,
{
    fn request(&self, request: &NetworkServiceRequest, opts: &CallOptions) -> Result<Connection> {
        invoke_counted(&self.switcher, &self.target, self.metrics.as_deref(), || {
            self.next.request(request, opts)
        })
    }

    fn close(&self, conn: &Connection, opts: &CallOptions) -> Result<()> {
        invoke_counted(&self.switcher, &self.target, self.metrics.as_deref(), || {
            self.next.close(conn, opts)
        })
    }
}

impl<C, S> NsClient<C, S>
where
    C: NetworkServiceClient + Send + Sync + 'static,
    S: NamespaceSwitcher + Send + Sync + 'static,
    S::Handle: Send + Sync,
{
    /// `request` on a dedicated thread, for callers on an async runtime
    pub async fn request_pinned(
        self: Arc<Self>,
        request: NetworkServiceRequest,
        opts: CallOptions,
    ) -> Result<Connection> {
        run_pinned("netns-request", move || {
            NetworkServiceClient::request(&*self, &request, &opts)
        })
        .await
    }

    pub async fn close_pinned(self: Arc<Self>, conn: Connection, opts: CallOptions) -> Result<()> {
        run_pinned("netns-close", move || {
            NetworkServiceClient::close(&*self, &conn, &opts)
        })
        .await
    }
}

/// Server element handling requests and closes from inside a namespace
pub struct NsServer<N, S: NamespaceSwitcher = LinuxNetns> {
    next: N,
    switcher: S,
    target: S::Handle,
    metrics: Option<Arc<NetnsMetrics>>,
}

impl<N> NsServer<N> {
    pub fn new(next: N, target: NetnsHandle) -> Self {
        Self::with_switcher(next, LinuxNetns, target)
    }
}

impl<N, S: NamespaceSwitcher> NsServer<N, S> {
    pub fn with_switcher(next: N, switcher: S, target: S::Handle) -> Self {
        Self {
            next,
            switcher,
            target,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<NetnsMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl<N, S> NetworkServiceServer for NsServer<N, S>
where
    N: NetworkServiceServer,
    S: NamespaceSwitcher,
{
    fn request(&self, request: &NetworkServiceRequest) -> Result<Connection> {
        invoke_counted(&self.switcher, &self.target, self.metrics.as_deref(), || {
            self.next.request(request)
        })
    }

    fn close(&self, conn: &Connection) -> Result<()> {
        invoke_counted(&self.switcher, &self.target, self.metrics.as_deref(), || {
            self.next.close(conn)
        })
    }
}

impl<N, S> NsServer<N, S>
where
    N: NetworkServiceServer + Send + Sync + 'static,
    S: NamespaceSwitcher + Send + Sync + 'static,
    S::Handle: Send + Sync,
{
    pub async fn request_pinned(self: Arc<Self>, request: NetworkServiceRequest) -> Result<Connection> {
        run_pinned("netns-request", move || {
            NetworkServiceServer::request(&*self, &request)
        })
        .await
    }

    pub async fn close_pinned(self: Arc<Self>, conn: Connection) -> Result<()> {
        run_pinned("netns-close", move || NetworkServiceServer::close(&*self, &conn)).await
    }
}
