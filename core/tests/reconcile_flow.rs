//! End-to-end flow: status feed -> supervisor -> reconciler -> views.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use portsync_core::ports::{PortStatusFeed, StatusSubscription};
use portsync_core::views::{PortPanelModel, PortTreeModel, StatusSummary};
use portsync_core::{
    ExposedInfo, PortStatus, PortVisibility, PortsSnapshot, Reconciler, Result,
    StatusStreamSupervisor, SupervisorConfig, TunnelDescriptor,
};

/// Feed backed by a channel the test pushes snapshots into. The stream ends
/// cleanly when the sender is dropped; later resubscribes stay pending.
struct ChannelFeed {
    rx: Mutex<Option<mpsc::UnboundedReceiver<Result<PortsSnapshot>>>>,
}

impl ChannelFeed {
    fn new() -> (Arc<Self>, mpsc::UnboundedSender<Result<PortsSnapshot>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                rx: Mutex::new(Some(rx)),
            }),
            tx,
        )
    }
}

struct ChannelSubscription {
    rx: mpsc::UnboundedReceiver<Result<PortsSnapshot>>,
}

impl StatusSubscription for ChannelSubscription {
    async fn next_snapshot(&mut self) -> Option<Result<PortsSnapshot>> {
        self.rx.recv().await
    }
}

impl PortStatusFeed for ChannelFeed {
    type Subscription = ChannelSubscription;

    async fn subscribe(&self) -> Result<Self::Subscription> {
        let rx = self.rx.lock().take();
        match rx {
            Some(rx) => Ok(ChannelSubscription { rx }),
            // The single scripted stream was consumed; stay connecting.
            None => std::future::pending().await,
        }
    }
}

fn served(port: u16) -> PortStatus {
    PortStatus {
        served: true,
        ..PortStatus::new(port)
    }
}

fn exposed_served(port: u16) -> PortStatus {
    PortStatus {
        exposed: Some(ExposedInfo::new(
            format!("https://{port}-ws.example.dev"),
            PortVisibility::Public,
        )),
        ..served(port)
    }
}

#[tokio::test(start_paused = true)]
async fn feed_updates_flow_through_to_all_views() {
    let (feed, tx) = ChannelFeed::new();
    let reconciler = Arc::new(Reconciler::new());

    let tree = Arc::new(PortTreeModel::new());
    let panel = Arc::new(PortPanelModel::new());
    let summary = Arc::new(StatusSummary::new());
    let _tree_sub = tree.attach(&reconciler);
    let _panel_sub = panel.attach(&reconciler);
    let _summary_sub = summary.attach(&reconciler);

    let accessible_events = Arc::new(AtomicUsize::new(0));
    let event_count = Arc::clone(&accessible_events);
    let _event_sub = reconciler.on_port_accessible(move |record| {
        assert_eq!(record.local_port, 80);
        event_count.fetch_add(1, Ordering::SeqCst);
    });

    let supervisor = StatusStreamSupervisor::new(feed, SupervisorConfig::default());
    let sink = Arc::clone(&reconciler);
    let handle = supervisor.observe(move |snapshot| sink.update_ports_status(snapshot));

    // First snapshot: one plain served port, one already exposed.
    tx.send(Ok(PortsSnapshot::new(vec![served(80), exposed_served(3000)])))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(reconciler.len(), 2);
    assert_eq!(tree.len(), 2);
    assert_eq!(panel.entries().len(), 2);
    assert_eq!(summary.current().text, "Ports: 3000");
    // Port 3000 was born exposed-served; no transition happened.
    assert_eq!(accessible_events.load(Ordering::SeqCst), 0);

    // The host opens a tunnel for port 80: it becomes accessible.
    reconciler.update_tunnels(vec![TunnelDescriptor::host(80, "127.0.0.1", 8000)]);
    assert_eq!(accessible_events.load(Ordering::SeqCst), 1);
    let rows = tree.items();
    assert_eq!(rows[0].label, "80:8000");
    assert_eq!(rows[0].context_value, "host-served-port");

    // Next snapshot omits port 80: every view drops it.
    tx.send(Ok(PortsSnapshot::new(vec![exposed_served(3000)])))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(reconciler.len(), 1);
    assert!(reconciler.get_port(80).is_none());
    assert_eq!(tree.items().len(), 1);
    assert_eq!(tree.items()[0].local_port, 3000);
    assert_eq!(panel.entries().len(), 1);
    assert_eq!(summary.current().text, "Ports: 3000");

    // Dispose: snapshots sent afterwards no longer reach the reconciler.
    handle.shutdown().await;
    let _ = tx.send(Ok(PortsSnapshot::new(vec![served(5432)])));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(reconciler.get_port(5432).is_none());
    assert_eq!(reconciler.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn clean_stream_end_triggers_resubscribe_attempts() {
    let (feed, tx) = ChannelFeed::new();
    let reconciler = Arc::new(Reconciler::new());

    let supervisor = StatusStreamSupervisor::new(Arc::clone(&feed), SupervisorConfig::default());
    let sink = Arc::clone(&reconciler);
    let handle = supervisor.observe(move |snapshot| sink.update_ports_status(snapshot));

    tx.send(Ok(PortsSnapshot::new(vec![served(3000)]))).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(reconciler.len(), 1);

    // Dropping the sender ends the stream cleanly; the supervisor backs off
    // and tries to resubscribe instead of giving up. The port list simply
    // goes stale - no error, no data loss.
    drop(tx);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(reconciler.len(), 1);
    assert!(!handle.is_stopped());

    handle.dispose();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(handle.is_stopped());
}
