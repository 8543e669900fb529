use std::sync::Arc;
use std::time::Duration;

use super::node::SimulationContext;
use super::{pause, RunTokens};
use crate::utils::logging;

/// The generator loop of one run: create a packet, launch its tasks, sleep
/// `1 / rate` seconds, repeat until the run token is cancelled.
///
/// The rate is read when each packet is created, so `set_rate` takes effect
/// from the next cycle on. Returns how many packets this run generated.
pub(crate) async fn run(ctx: Arc<SimulationContext>, tokens: RunTokens) -> u64 {
    logging::log("GENERATOR", "Generator loop started");
    let poll = ctx.config.poll_slice();
    let mut generated = 0;

    loop {
        let Ok(permit) = ctx.acquire_slot(&tokens.run).await else {
            break;
        };
        let Some(next) = ctx.next_packet(&tokens.run).await else {
            break;
        };
        let interval = Duration::from_secs_f64(1.0 / next.rate_per_second.max(1) as f64);
        ctx.launch_packet(&tokens, next, permit);
        generated += 1;

        if !pause(interval, poll, &tokens.run).await {
            break;
        }
    }

    logging::log("GENERATOR", &format!("Generator loop exiting after {} packets", generated));
    generated
}
