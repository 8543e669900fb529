use futures::future::join_all;
use std::time::Duration;
use tokio::time::sleep;

use netterm::{
    clock::{ScriptedRandom, UniformRange},
    config::{DevicePlacement, TopologyConfig},
    display::{MemorySink, RecordingRenderer},
    simulation::Phase,
    types::DeviceStatus,
    utils::logging,
    Controller, SimulationConfig, SimulationNode,
};

async fn launch(config: SimulationConfig) -> (SimulationNode, MemorySink, RecordingRenderer) {
    let sink = MemorySink::new();
    let renderer = RecordingRenderer::new();
    let node = SimulationNode::launch(config, Box::new(renderer.clone()), Box::new(sink.clone()))
        .await
        .expect("Failed to launch simulation");
    (node, sink, renderer)
}

/// Tests a full session through the public API:
/// - Start, rate change, stop, restart, reset
/// - The console shows both banners and the final count
/// - Every device is idle once the tasks have settled
#[tokio::test(start_paused = true)]
async fn test_full_session() {
    logging::init_logging();
    logging::log("TEST", "=== Starting test_full_session ===");
    let config = SimulationConfig { seed: Some(2024), ..SimulationConfig::default() };
    let (node, sink, renderer) = launch(config).await;

    node.start().await;
    sleep(Duration::from_millis(1500)).await;
    node.set_rate(6).await;
    sleep(Duration::from_millis(3000)).await;
    node.stop().await;
    node.wait_settled().await;

    let snapshot = node.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Stopped);
    assert!(snapshot.packets_delivered > 0);
    assert!(snapshot.packets_delivered <= snapshot.packets_generated);
    assert!(sink.contains("Packet transmission started"));
    assert!(sink.contains(&format!("Total packets sent: {}", snapshot.packets_generated)));
    assert!(snapshot.devices.values().all(DeviceStatus::is_idle));
    assert!(renderer.live_packets().is_empty());

    node.reset().await;
    assert_eq!(node.snapshot().await.phase, Phase::Initial);
    assert!(sink.lines().is_empty());

    node.shutdown().await.expect("Failed to shut down");
    logging::log("TEST", "=== Completed test_full_session ===");
}

/// Tests that controller calls issued concurrently from many callers leave a
/// consistent state: one run, one start banner
#[tokio::test(start_paused = true)]
async fn test_concurrent_controller_calls() {
    logging::init_logging();
    let (node, sink, _renderer) = launch(SimulationConfig { seed: Some(1), ..SimulationConfig::default() }).await;

    join_all((0..16).map(|_| {
        let node = node.clone();
        async move { node.start().await }
    }))
    .await;
    sleep(Duration::from_millis(50)).await;
    assert_eq!(node.snapshot().await.packets_generated, 1);

    join_all((0..16).map(|i| {
        let node = node.clone();
        async move { node.set_rate(i).await }
    }))
    .await;
    join_all((0..16).map(|_| {
        let node = node.clone();
        async move { node.stop().await }
    }))
    .await;
    node.wait_settled().await;

    let lines = sink.lines();
    assert_eq!(lines.iter().filter(|l| *l == "Packet transmission started").count(), 1);
    assert_eq!(lines.iter().filter(|l| l.ends_with("Packet transmission stopped")).count(), 1);
    let rate = node.snapshot().await.rate_per_second;
    assert!((1..16).contains(&rate));
}

/// Tests a custom three-endpoint topology loaded from TOML
#[tokio::test(start_paused = true)]
async fn test_custom_topology_from_toml() {
    logging::init_logging();
    let config: SimulationConfig = toml::from_str(
        r#"
        rate_per_second = 4
        delay = { min = 2000, max = 2000 }

        [topology]
        switch = { name = "CORE", x = 50.0, y = 50.0 }
        endpoints = [
            { name = "A", x = 0.0, y = 0.0 },
            { name = "B", x = 100.0, y = 0.0 },
            { name = "C", x = 50.0, y = 100.0 },
        ]
        "#,
    )
    .expect("Failed to parse config");
    assert_eq!(config.delay, UniformRange::new(2000, 2000));

    let sink = MemorySink::new();
    let node = SimulationNode::launch_with_random(
        config,
        Box::new(RecordingRenderer::new()),
        Box::new(sink.clone()),
        Box::new(ScriptedRandom::new(vec![0.9, 0.9, 0.0, 0.0, 0.0])),
    )
    .await
    .expect("Failed to launch simulation");
    assert_eq!(node.topology().endpoints().len(), 3);

    node.start().await;
    sleep(Duration::from_millis(2100)).await;
    node.stop().await;
    node.wait_settled().await;

    // source index 2 is C; the other endpoints are A and B, 0.9 picks B
    assert!(sink.contains("Packet #1: C -> B, Size: 100 bytes"));
    assert!(sink.contains("Packet #1 delivered on B (delay: 2000 ms)"));
    assert!(sink.contains("Packet #1 reached CORE"));
}

/// Tests that an invalid configuration is rejected at launch
#[tokio::test]
async fn test_invalid_config_rejected() {
    let config = SimulationConfig {
        topology: Some(TopologyConfig {
            endpoints: vec![
                DevicePlacement { name: "A".into(), x: 0.0, y: 0.0 },
                DevicePlacement { name: "A".into(), x: 1.0, y: 0.0 },
            ],
            switch: DevicePlacement { name: "SW".into(), x: 0.5, y: 0.5 },
        }),
        ..SimulationConfig::default()
    };
    let result = SimulationNode::launch(config, Box::new(RecordingRenderer::new()), Box::new(MemorySink::new())).await;
    assert!(matches!(result, Err(netterm::SimulationError::Config(_))));
}

/// Tests that a delay range spanning the whole u64 domain is rejected at
/// launch instead of reaching the generator
#[tokio::test]
async fn test_unbounded_delay_rejected() {
    let config = SimulationConfig { delay: UniformRange::new(0, u64::MAX), ..SimulationConfig::default() };
    let result = SimulationNode::launch(config, Box::new(RecordingRenderer::new()), Box::new(MemorySink::new())).await;
    assert!(matches!(result, Err(netterm::SimulationError::Config(_))));
}
