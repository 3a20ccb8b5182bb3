//! Dataplane configuration
//!
//! Derives the startup configuration (interface, static neighbors, default
//! routes, VXLAN ACL) from host state and hands it to a driver.

mod builder;
mod config;
mod driver;
mod pipeline;

pub use builder::{apply_pipeline, DataplaneConfigBuilder};
pub use config::{
    Acl, AclAction, AclProtocol, AclRule, ArpEntry, DataplaneConfig, InterfaceEntry,
    InterfaceKind, PortRange, Route, RouteKind, VXLAN_PORT,
};
pub use driver::{DataplaneDriver, FileDriver};
pub use pipeline::{
    firewall_step, interface_step, neighbor_step, route_step, ConfigDelta, HostState, Step,
    PIPELINE,
};
