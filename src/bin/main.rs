use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};

use netterm::{
    display::{ConsoleSink, TraceRenderer},
    utils::logging,
    Controller, SimulationNode, SimulationSnapshot,
};

mod config;

fn print_help() {
    println!("Commands:");
    println!("  start              begin sending packets");
    println!("  stop               stop sending packets");
    println!("  rate <n>           packets per second (values below 1 become 1)");
    println!("  reset              stop and return to the initial state");
    println!("  status [json]      show counters and device statuses");
    println!("  help");
    println!("  exit");
    println!(" ");
}

fn print_status(snapshot: &SimulationSnapshot) {
    println!("=== Simulation Status ===");
    println!("  Phase: {:?}", snapshot.phase);
    println!("  Rate: {} packets/s", snapshot.rate_per_second);
    println!("  Packets sent: {}", snapshot.packets_generated);
    println!("  Packets delivered: {}", snapshot.packets_delivered);
    println!("  Queued console lines: {}", snapshot.queued_lines);
    println!("\nDevices:");
    for (device, status) in &snapshot.devices {
        println!("  {}: {} ({})", device, status, status.indicator_color());
    }
    println!("=========================");
    println!(" ");
}

fn prompt() {
    print!("> ");
    // a closed stdout only loses the prompt
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let config_path = std::env::args().nth(1);
    let config = config::load(config_path.as_deref())?;

    let mut sink = ConsoleSink::new();
    sink.print_header();
    let node = SimulationNode::launch(config, Box::new(TraceRenderer), Box::new(sink)).await?;

    println!("=== Network Terminal Shell ===");
    println!("Type 'help' for commands.");
    prompt();

    let stdin = BufReader::new(io::stdin());
    let mut lines = stdin.lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        let mut parts = input.split_whitespace();
        match parts.next() {
            Some("exit") | Some("quit") => {
                println!("Exiting shell.");
                break;
            }
            Some("help") => print_help(),
            Some("start") => node.start().await,
            Some("stop") => node.stop().await,
            Some("rate") => match parts.next().map(str::parse::<u32>) {
                Some(Ok(rate)) => {
                    node.set_rate(rate).await;
                    println!("[shell] Rate set to {} packets/s", rate.max(1));
                }
                Some(Err(_)) => println!("[shell] Error: Invalid rate value"),
                None => println!("Usage: rate <packets per second>"),
            },
            Some("reset") => node.reset().await,
            Some("status") => {
                let snapshot = node.snapshot().await;
                if parts.next() == Some("json") {
                    println!("{}", serde_json::to_string_pretty(&snapshot)?);
                } else {
                    print_status(&snapshot);
                }
            }
            Some(other) => {
                println!("[shell] Unknown command: {}", other);
                print_help();
            }
            None => {}
        }
        prompt();
    }

    node.shutdown().await?;
    Ok(())
}
