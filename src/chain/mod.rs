//! Request-processing chain
//!
//! Each element handles a request or close and hands it to the next one.
//! Only the types the namespace-scoped elements touch are modelled here.

mod ns;

pub use ns::{invoke_in, NsClient, NsServer};

use crate::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// An established (or requested) connection between a client and a network service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connection {
    pub id: String,
    pub network_service: String,
    /// Selected mechanism, e.g. `vxlan`
    pub mechanism: Option<String>,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkServiceRequest {
    pub connection: Connection,
    /// Mechanisms the client accepts, most preferred first
    pub mechanism_preferences: Vec<String>,
}

/// Per-call options forwarded unchanged along a client chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    pub timeout: Option<Duration>,
    pub metadata: BTreeMap<String, String>,
}

/// Client-side chain element
pub trait NetworkServiceClient {
    fn request(&self, request: &NetworkServiceRequest, opts: &CallOptions) -> Result<Connection>;
    fn close(&self, conn: &Connection, opts: &CallOptions) -> Result<()>;
}

/// Server-side chain element
pub trait NetworkServiceServer {
    fn request(&self, request: &NetworkServiceRequest) -> Result<Connection>;
    fn close(&self, conn: &Connection) -> Result<()>;
}

impl<T: NetworkServiceClient + ?Sized> NetworkServiceClient for Arc<T> {
    fn request(&self, request: &NetworkServiceRequest, opts: &CallOptions) -> Result<Connection> {
        (**self).request(request, opts)
    }

    fn close(&self, conn: &Connection, opts: &CallOptions) -> Result<()> {
        (**self).close(conn, opts)
    }
}

impl<T: NetworkServiceServer + ?Sized> NetworkServiceServer for Arc<T> {
    fn request(&self, request: &NetworkServiceRequest) -> Result<Connection> {
        (**self).request(request)
    }

    fn close(&self, conn: &Connection) -> Result<()> {
        (**self).close(conn)
    }
}
