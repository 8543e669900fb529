use indicatif::ProgressBar;

use netterm::simulation::Phase;
use simulator::{config::Config, run_simulation};

/// Tests a scripted scenario end to end on paused time:
/// - Rate changes are applied while running
/// - Statistics parsed from the console agree with the engine counters
/// - The seed is recorded and the run can be repeated exactly
#[tokio::test(start_paused = true)]
async fn test_scenario_with_rate_change() {
    let config = Config::parse(
        r#"
        [simulation]
        rate_per_second = 2
        seed = 99

        [scenario]
        duration_secs = 6.0
        stop_grace_ms = 400
        rate_changes = [{ at_secs = 3.0, rate = 5 }]
        "#,
    )
    .expect("Failed to parse scenario");

    let results = run_simulation(config.clone(), ProgressBar::hidden()).await.expect("Simulation failed");
    let stats = &results.stats;
    let snapshot = &results.final_snapshot;

    assert_eq!(results.parameters.seed, 99);
    assert_eq!(snapshot.phase, Phase::Stopped);
    assert_eq!(snapshot.rate_per_second, 5);
    assert_eq!(stats.packets_generated, snapshot.packets_generated);
    assert_eq!(stats.packets_delivered, snapshot.packets_delivered);
    assert_eq!(stats.reported_total, Some(snapshot.packets_generated));
    assert_eq!(stats.last_packet_id, stats.packets_generated);
    // 2/s for three seconds, then 5/s for three more
    assert!((18..=24).contains(&stats.packets_generated), "generated {}", stats.packets_generated);
    let delays = stats.delays.clone().expect("some packets must be delivered");
    assert!(delays.min_ms >= 2000 && delays.max_ms <= 4000);
    assert_eq!(stats.out_of_order_switch_lines, stats.packets_delivered);

    let again = run_simulation(config, ProgressBar::hidden()).await.expect("Simulation failed");
    assert_eq!(again.stats, results.stats);
}

/// Tests that reset at the end still reports the statistics of the run
#[tokio::test(start_paused = true)]
async fn test_reset_at_end_keeps_statistics() {
    let config = Config::parse(
        r#"
        [simulation]
        seed = 5

        [scenario]
        duration_secs = 3.0
        reset_at_end = true
        "#,
    )
    .expect("Failed to parse scenario");

    let results = run_simulation(config, ProgressBar::hidden()).await.expect("Simulation failed");
    assert!(results.stats.packets_generated >= 9);
    assert_eq!(results.stats.reported_total, Some(results.stats.packets_generated));
    assert!(results.parameters.reset_at_end);
}
