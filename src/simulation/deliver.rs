use std::sync::Arc;
use std::time::Duration;

use super::node::{InFlightPermit, SimulationContext};
use super::{pause, RunTokens};
use crate::log_queue::LogLine;
use crate::types::Packet;

/// Wait out the transit `delay` of `packet`, then log its delivery.
///
/// Returns the delivered packet, or `None` when the run was stopped or reset
/// first; a cancelled delivery logs nothing and counts nothing.
pub(crate) async fn run(
    ctx: Arc<SimulationContext>,
    tokens: RunTokens,
    mut packet: Packet,
    delay: Duration,
    _permit: InFlightPermit,
) -> Option<Packet> {
    if !pause(delay, ctx.config.poll_slice(), &tokens.run).await {
        return None;
    }
    packet.mark_delivered(ctx.clock.now());
    let delay_ms = packet.delay_ms()?;
    let switch_time = packet.switch_time()?;
    let delivered_at = packet.delivered_at?;

    // The switch line is only written once the whole delay has elapsed, so it
    // reaches the sink after the delivery line while carrying the earlier
    // midpoint timestamp. Whether it was meant to be emitted at the midpoint
    // instead is unresolved; keep it here until that is settled.
    let lines = vec![
        LogLine::stamped(
            delivered_at,
            format!("Packet #{} delivered on {} (delay: {} ms)", packet.id, packet.destination, delay_ms),
        ),
        LogLine::stamped(switch_time, format!("Packet #{} reached {}", packet.id, ctx.topology.switch().id)),
    ];

    let mut control = ctx.control.lock().await;
    if !ctx.queue.push_all_if(&tokens.run, lines).await {
        return None;
    }
    control.state.packets_delivered += 1;
    Some(packet)
}
