use std::time::Duration;
use tokio::time::sleep;

use super::{launch_scripted, launch_seeded};
use crate::config::SimulationConfig;
use crate::display::RenderEvent;
use crate::simulation::{Controller, Phase, SimulationSnapshot};
use crate::types::DeviceStatus;

fn assert_initial(snapshot: &SimulationSnapshot, rate: u32) {
    assert_eq!(snapshot.phase, Phase::Initial);
    assert!(!snapshot.running);
    assert!(!snapshot.stop_requested);
    assert_eq!(snapshot.rate_per_second, rate);
    assert_eq!(snapshot.sequence_counter, 0);
    assert_eq!(snapshot.packets_generated, 0);
    assert_eq!(snapshot.packets_delivered, 0);
    assert_eq!(snapshot.queued_lines, 0);
    assert!(snapshot.devices.values().all(DeviceStatus::is_idle));
}

/// Tests reset in the middle of a busy run:
/// - Counters, devices and the log are back to the first-launch state
/// - Tasks spawned before the reset never touch the display again
/// - A second reset is indistinguishable from the first
#[tokio::test(start_paused = true)]
async fn test_reset_mid_run_restores_initial_state() {
    let config = SimulationConfig { rate_per_second: 6, ..SimulationConfig::default() };
    let harness = launch_seeded(config, 5).await;
    let initial = harness.node.snapshot().await;
    assert_initial(&initial, 6);

    harness.node.start().await;
    sleep(Duration::from_millis(4500)).await;
    assert!(harness.node.snapshot().await.packets_delivered > 0);

    harness.node.reset().await;
    let after_first = harness.node.snapshot().await;
    assert_initial(&after_first, 6);
    assert_eq!(after_first, initial);
    assert!(harness.sink.lines().is_empty());
    assert_eq!(harness.renderer.events().last(), Some(&RenderEvent::Reset));
    let events_at_reset = harness.renderer.events().len();

    // old animations and deliveries run into cancelled tokens
    sleep(Duration::from_millis(5000)).await;
    harness.node.wait_settled().await;
    assert!(harness.sink.lines().is_empty());
    assert_eq!(harness.renderer.events().len(), events_at_reset);
    assert!(harness.renderer.live_packets().is_empty());

    harness.node.reset().await;
    let after_second = harness.node.snapshot().await;
    assert_eq!(after_second, after_first);
    assert!(harness.sink.lines().is_empty());
    assert_eq!(harness.sink.clear_count(), 2);
}

/// Tests that reset restores the configured rate and a fresh start begins
/// again at packet 1
#[tokio::test(start_paused = true)]
async fn test_start_after_reset_begins_at_one() {
    let harness = launch_scripted(SimulationConfig::default()).await;
    harness.node.set_rate(9).await;
    harness.node.start().await;
    sleep(Duration::from_millis(500)).await;
    assert!(harness.node.snapshot().await.sequence_counter > 1);

    harness.node.reset().await;
    assert_eq!(harness.node.snapshot().await.rate_per_second, 3);

    harness.node.start().await;
    sleep(Duration::from_millis(50)).await;
    let snapshot = harness.node.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Running);
    assert_eq!(snapshot.sequence_counter, 1);

    harness.node.stop().await;
    harness.node.wait_settled().await;
    assert!(harness.sink.contains("Packet #1: PC2 -> PC1, Size: 450 bytes"));
    assert!(harness.sink.contains("Total packets sent: 1"));
}

/// Tests reset before anything was started
#[tokio::test(start_paused = true)]
async fn test_reset_when_idle() {
    let harness = launch_scripted(SimulationConfig::default()).await;
    harness.node.reset().await;
    assert_initial(&harness.node.snapshot().await, 3);
    assert_eq!(harness.renderer.events(), vec![RenderEvent::Reset]);
}

/// Tests shutdown: pending lines are flushed, later commands are ignored and
/// a second shutdown is an error
#[tokio::test(start_paused = true)]
async fn test_shutdown() {
    let harness = launch_scripted(SimulationConfig::default()).await;
    harness.node.start().await;
    sleep(Duration::from_millis(100)).await;

    harness.node.shutdown().await.expect("first shutdown must succeed");
    let lines = harness.sink.lines();
    assert!(lines.contains(&"Total packets sent: 1".to_string()));
    assert_eq!(harness.node.snapshot().await.queued_lines, 0);

    harness.node.start().await;
    harness.node.reset().await;
    assert_eq!(harness.node.snapshot().await.phase, Phase::Stopped);
    assert_eq!(harness.sink.lines(), lines);

    assert!(matches!(
        harness.node.shutdown().await,
        Err(crate::simulation::SimulationError::AlreadyShutDown)
    ));
}
