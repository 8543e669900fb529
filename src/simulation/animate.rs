use std::sync::Arc;
use std::time::Duration;

use super::node::{InFlightPermit, SimulationContext};
use super::{pause, RunTokens};
use crate::config::AnimationConfig;
use crate::types::{DeviceId, DeviceStatus, Packet, Position};
use crate::utils::logging;

/// Which half of the path a packet is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    ToSwitch,
    ToDestination,
}

/// Where a packet stops between legs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    Switch,
    Destination,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Move { leg: Leg, position: Position },
    Pause { at: Hop, duration: Duration },
}

/// The path of one packet: `steps` interpolated positions from the source to
/// the switch, the switch pause, `steps` positions on to the destination and
/// the arrival pause. Consumed once.
#[derive(Debug, Clone)]
pub struct Trajectory {
    from: Position,
    via: Position,
    to: Position,
    steps: u32,
    switch_pause: Duration,
    arrival_pause: Duration,
    cursor: u32,
}

impl Trajectory {
    pub fn new(from: Position, via: Position, to: Position, animation: &AnimationConfig) -> Self {
        Self {
            from,
            via,
            to,
            steps: animation.steps.max(1),
            switch_pause: animation.switch_pause(),
            arrival_pause: animation.arrival_pause(),
            cursor: 0,
        }
    }

    fn total(&self) -> u32 {
        2 * self.steps + 2
    }
}

impl Iterator for Trajectory {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let steps = self.steps;
        let fraction = |i: u32| (i + 1) as f64 / steps as f64;
        let step = match self.cursor {
            c if c < steps => Step::Move {
                leg: Leg::ToSwitch,
                position: self.from.lerp(&self.via, fraction(c)),
            },
            c if c == steps => Step::Pause { at: Hop::Switch, duration: self.switch_pause },
            c if c <= 2 * steps => Step::Move {
                leg: Leg::ToDestination,
                position: self.via.lerp(&self.to, fraction(c - steps - 1)),
            },
            c if c == 2 * steps + 1 => Step::Pause { at: Hop::Destination, duration: self.arrival_pause },
            _ => return None,
        };
        self.cursor += 1;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total().saturating_sub(self.cursor) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Trajectory {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// The packet reached its destination and was removed
    Completed,
    /// The run was stopped or reset on the way
    Cancelled,
}

/// One packet's walk along its trajectory, with the device statuses it holds
struct PacketAnimation<'a> {
    ctx: &'a SimulationContext,
    tokens: &'a RunTokens,
    packet: &'a Packet,
    switch: DeviceId,
    held: Vec<(DeviceId, DeviceStatus)>,
    drawn: bool,
}

impl<'a> PacketAnimation<'a> {
    async fn hold(&mut self, device: DeviceId, status: DeviceStatus) -> bool {
        if !self.ctx.registry.acquire(&self.tokens.run, &device, status).await {
            return false;
        }
        self.held.push((device, status));
        true
    }

    async fn let_go(&mut self, device: &DeviceId, status: DeviceStatus) {
        if let Some(index) = self.held.iter().position(|(d, s)| d == device && *s == status) {
            self.held.remove(index);
            self.ctx.registry.release(&self.tokens.session, device, status).await;
        }
    }

    async fn play(&mut self, trajectory: Trajectory) -> AnimationOutcome {
        let tokens = self.tokens;
        let run = &tokens.run;
        let poll = self.ctx.config.poll_slice();
        let step_pause = self.ctx.config.animation.step();
        let source = self.packet.source.clone();
        let destination = self.packet.destination.clone();
        let origin = trajectory.from;

        if !self.hold(source.clone(), DeviceStatus::Sending).await {
            return AnimationOutcome::Cancelled;
        }
        if !self.ctx.registry.draw_packet(run, self.packet.id, self.packet.color, origin).await {
            return AnimationOutcome::Cancelled;
        }
        self.drawn = true;

        for step in trajectory {
            if run.is_cancelled() {
                return AnimationOutcome::Cancelled;
            }
            match step {
                Step::Move { position, .. } => {
                    if !self.ctx.registry.move_packet(run, self.packet.id, position).await {
                        return AnimationOutcome::Cancelled;
                    }
                    if !pause(step_pause, poll, run).await {
                        return AnimationOutcome::Cancelled;
                    }
                }
                Step::Pause { at: Hop::Switch, duration } => {
                    self.let_go(&source, DeviceStatus::Sending).await;
                    let switch = self.switch.clone();
                    if !self.hold(switch.clone(), DeviceStatus::Processing).await {
                        return AnimationOutcome::Cancelled;
                    }
                    if !pause(duration, poll, run).await {
                        return AnimationOutcome::Cancelled;
                    }
                    self.let_go(&switch, DeviceStatus::Processing).await;
                    if !self.hold(destination.clone(), DeviceStatus::Receiving).await {
                        return AnimationOutcome::Cancelled;
                    }
                }
                Step::Pause { at: Hop::Destination, duration } => {
                    if !pause(duration, poll, run).await {
                        return AnimationOutcome::Cancelled;
                    }
                }
            }
        }
        AnimationOutcome::Completed
    }

    /// Remove the packet and give back every status still held. Guarded by
    /// the session token: after a reset there is nothing left to tidy.
    async fn finish(&mut self) {
        let tokens = self.tokens;
        let session = &tokens.session;
        if self.drawn {
            self.ctx.registry.remove_packet(session, self.packet.id).await;
            self.drawn = false;
        }
        for (device, status) in std::mem::take(&mut self.held).into_iter().rev() {
            self.ctx.registry.release(session, &device, status).await;
        }
    }
}

/// Animate `packet` from its source through the switch to its destination.
/// On cancellation the packet disappears and the devices it touched go back
/// to idle, unless a reset already wiped them.
pub(crate) async fn run(
    ctx: Arc<SimulationContext>,
    tokens: RunTokens,
    packet: Packet,
    _permit: InFlightPermit,
) -> AnimationOutcome {
    let topology = &ctx.topology;
    let switch = topology.switch();
    let (Some(from), Some(to)) = (topology.position(&packet.source), topology.position(&packet.destination)) else {
        logging::warn("ANIMATE", &format!("Packet #{} has an endpoint outside the topology", packet.id));
        return AnimationOutcome::Cancelled;
    };
    let trajectory = Trajectory::new(from, switch.position, to, &ctx.config.animation);

    let mut animation = PacketAnimation {
        ctx: &ctx,
        tokens: &tokens,
        packet: &packet,
        switch: switch.id.clone(),
        held: Vec::new(),
        drawn: false,
    };
    let outcome = animation.play(trajectory).await;
    animation.finish().await;

    if outcome == AnimationOutcome::Cancelled {
        logging::log("ANIMATE", &format!("Packet #{} animation cancelled", packet.id));
    }
    outcome
}
