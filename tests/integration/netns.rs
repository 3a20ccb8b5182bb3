//! Namespace-scoped chain elements against the real kernel

use nix::sched::{unshare, CloneFlags};
use std::sync::{Arc, Mutex};
use vxagent::chain::{CallOptions, Connection, NetworkServiceClient, NetworkServiceRequest, NsClient};
use vxagent::netns::{switch_pending, LinuxNetns, NamespaceSwitcher, NetnsHandle};
use vxagent::{Error, Result};

/// Downstream client recording the namespace it was called in
#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<NetnsHandle>>,
    fail: bool,
}

impl NetworkServiceClient for Recorder {
    fn request(&self, request: &NetworkServiceRequest, _: &CallOptions) -> Result<Connection> {
        self.seen.lock().unwrap().push(NetnsHandle::current()?);
        if self.fail {
            return Err(Error::Chain("refused".into()));
        }
        Ok(request.connection.clone())
    }

    fn close(&self, _: &Connection, _: &CallOptions) -> Result<()> {
        self.seen.lock().unwrap().push(NetnsHandle::current()?);
        Ok(())
    }
}

/// Create a fresh namespace on a throwaway thread and return a handle to it
fn scratch_namespace() -> NetnsHandle {
    std::thread::spawn(|| {
        unshare(CloneFlags::CLONE_NEWNET).expect("unshare");
        NetnsHandle::current().expect("handle")
    })
    .join()
    .unwrap()
}

#[test]
#[ignore] // Requires CAP_SYS_ADMIN
fn test_request_runs_in_target_and_restores() {
    let target = scratch_namespace();
    let before = LinuxNetns.current().unwrap();
    assert_ne!(before, target);

    let recorder = Arc::new(Recorder::default());
    let client = NsClient::new(recorder.clone(), target.clone());
    let request = NetworkServiceRequest::default();
    let conn = client.request(&request, &CallOptions::default()).unwrap();
    assert_eq!(conn, request.connection);
    assert_eq!(*recorder.seen.lock().unwrap(), vec![target]);

    assert_eq!(LinuxNetns.current().unwrap(), before);
    assert!(!switch_pending());
}

#[test]
#[ignore] // Requires CAP_SYS_ADMIN
fn test_failed_request_restores() {
    let target = scratch_namespace();
    let before = LinuxNetns.current().unwrap();

    let recorder = Arc::new(Recorder {
        fail: true,
        ..Default::default()
    });
    let client = NsClient::new(recorder.clone(), target.clone());
    let err = client
        .request(&NetworkServiceRequest::default(), &CallOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Chain(_)));
    assert_eq!(*recorder.seen.lock().unwrap(), vec![target]);
    assert_eq!(LinuxNetns.current().unwrap(), before);
}

#[tokio::test]
#[ignore] // Requires CAP_SYS_ADMIN
async fn test_pinned_close() {
    let target = scratch_namespace();
    let recorder = Arc::new(Recorder::default());
    let client = Arc::new(NsClient::new(recorder.clone(), target.clone()));
    client
        .close_pinned(Connection::default(), CallOptions::default())
        .await
        .unwrap();
    assert_eq!(*recorder.seen.lock().unwrap(), vec![target]);
    assert!(!switch_pending());
}
