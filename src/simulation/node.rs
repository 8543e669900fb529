use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::{animate, deliver, generator, Controller, Phase, RunTokens, SimulationError, SimulationState};
use crate::clock::{Clock, DelayModel, RandomSource, SeededRandom};
use crate::config::{clamp_rate, SimulationConfig};
use crate::display::{LogSink, Renderer};
use crate::log_queue::{LogDrain, LogLine, LogQueue, SharedSink};
use crate::registry::DeviceRegistry;
use crate::types::constants::{BANNER_WIDTH, PACKET_PALETTE};
use crate::types::{DeviceId, DeviceStatus, Packet, PacketColor, PacketId, Topology};
use crate::utils::logging;

/// Everything the controller serializes: run state, cancellation tokens and
/// the random source
pub(crate) struct ControlState {
    pub(crate) state: SimulationState,
    session: CancellationToken,
    run: Option<CancellationToken>,
    random: Box<dyn RandomSource>,
    shut_down: bool,
}

/// Shared by the controller and every task it spawns
pub(crate) struct SimulationContext {
    pub(crate) config: SimulationConfig,
    pub(crate) topology: Topology,
    pub(crate) clock: Clock,
    pub(crate) delay_model: DelayModel,
    pub(crate) registry: DeviceRegistry,
    pub(crate) queue: Arc<LogQueue>,
    pub(crate) sink: SharedSink,
    pub(crate) control: Mutex<ControlState>,
    pub(crate) tracker: TaskTracker,
    in_flight: Option<Arc<Semaphore>>,
}

/// A packet freshly drawn by the generator, with the delay its deliver task
/// will simulate
pub(crate) struct GeneratedPacket {
    pub(crate) packet: Packet,
    pub(crate) delay: Duration,
    pub(crate) rate_per_second: u32,
}

/// Held by both tasks of a packet while `max_in_flight` is set
pub(crate) type InFlightPermit = Option<Arc<OwnedSemaphorePermit>>;

impl SimulationContext {
    /// Create the next packet unless `run` is cancelled. Runs entirely under
    /// the control lock so a concurrent `stop` either counts and logs this
    /// packet before its banner, or prevents it.
    pub(crate) async fn next_packet(&self, run: &CancellationToken) -> Option<GeneratedPacket> {
        let mut control = self.control.lock().await;
        if run.is_cancelled() || !control.state.running {
            return None;
        }
        let endpoints = self.topology.endpoints();
        let random = control.random.as_mut();
        let source = random.pick_index(endpoints.len());
        // uniform over the other endpoints
        let mut destination = random.pick_index(endpoints.len() - 1);
        if destination >= source {
            destination += 1;
        }
        let size_bytes = self.config.size.sample(random);
        let color = PacketColor(PACKET_PALETTE[random.pick_index(PACKET_PALETTE.len())]);
        let delay = self.delay_model.sample(random);

        control.state.sequence_counter += 1;
        control.state.packets_generated += 1;
        let packet = Packet::new(
            PacketId(control.state.sequence_counter),
            endpoints[source].id.clone(),
            endpoints[destination].id.clone(),
            size_bytes,
            color,
            self.clock.now(),
        );
        self.queue.push(LogLine::stamped(packet.created_at, packet.to_string())).await;

        Some(GeneratedPacket {
            packet,
            delay,
            rate_per_second: control.state.rate_per_second,
        })
    }

    /// Wait for an in-flight slot when the number of travelling packets is bounded
    pub(crate) async fn acquire_slot(&self, run: &CancellationToken) -> Result<InFlightPermit, ()> {
        let Some(semaphore) = &self.in_flight else {
            return Ok(None);
        };
        tokio::select! {
            _ = run.cancelled() => Err(()),
            permit = semaphore.clone().acquire_owned() => permit.map(|p| Some(Arc::new(p))).map_err(|_| ()),
        }
    }

    /// Spawn the animate and deliver tasks of a packet without waiting for them
    pub(crate) fn launch_packet(self: &Arc<Self>, tokens: &RunTokens, generated: GeneratedPacket, permit: InFlightPermit) {
        let GeneratedPacket { packet, delay, .. } = generated;
        self.tracker.spawn(animate::run(self.clone(), tokens.clone(), packet.clone(), permit.clone()));
        self.tracker.spawn(deliver::run(self.clone(), tokens.clone(), packet, delay, permit));
    }
}

/// Point-in-time view of the simulation for status displays and tests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    pub phase: Phase,
    pub running: bool,
    pub stop_requested: bool,
    pub rate_per_second: u32,
    pub sequence_counter: u64,
    pub packets_generated: u64,
    pub packets_delivered: u64,
    pub devices: BTreeMap<DeviceId, DeviceStatus>,
    pub queued_lines: usize,
}

/// The packet simulation: the controller handle plus the background log drain.
///
/// Cloning is cheap; every clone controls the same simulation.
#[derive(Clone)]
pub struct SimulationNode {
    ctx: Arc<SimulationContext>,
    drain_shutdown: CancellationToken,
    drain: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SimulationNode {
    /// Build the simulation and start its log drain. The random source is
    /// seeded from `config.seed`.
    pub async fn launch(
        config: SimulationConfig,
        renderer: Box<dyn Renderer>,
        sink: Box<dyn LogSink>,
    ) -> Result<Self, SimulationError> {
        let random = Box::new(SeededRandom::new(config.seed));
        Self::launch_with_random(config, renderer, sink, random).await
    }

    /// Like [`SimulationNode::launch`] with an injected random source
    pub async fn launch_with_random(
        config: SimulationConfig,
        renderer: Box<dyn Renderer>,
        sink: Box<dyn LogSink>,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let topology = config.build_topology()?;
        let registry = DeviceRegistry::new(&topology, renderer);
        let rate = clamp_rate(config.rate_per_second);
        let queue = Arc::new(LogQueue::new());
        let sink: SharedSink = Arc::new(Mutex::new(sink));

        let ctx = Arc::new(SimulationContext {
            delay_model: config.delay_model(),
            in_flight: config.max_in_flight.map(|n| Arc::new(Semaphore::new(n))),
            config,
            topology,
            clock: Clock::new(),
            registry,
            queue: queue.clone(),
            sink: sink.clone(),
            control: Mutex::new(ControlState {
                state: SimulationState::initial(rate),
                session: CancellationToken::new(),
                run: None,
                random,
                shut_down: false,
            }),
            tracker: TaskTracker::new(),
        });

        let drain_shutdown = CancellationToken::new();
        let drain = LogDrain::new(queue, sink, ctx.config.poll_slice());
        let handle = tokio::spawn(drain.run(drain_shutdown.clone()));
        logging::log("SIM", &format!("Simulation launched with {} endpoints at {} packets/s", ctx.topology.endpoints().len(), rate));

        Ok(Self {
            ctx,
            drain_shutdown,
            drain: Arc::new(Mutex::new(Some(handle))),
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.ctx.topology
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.ctx.config
    }

    pub async fn snapshot(&self) -> SimulationSnapshot {
        let state = self.ctx.control.lock().await.state.clone();
        SimulationSnapshot {
            phase: state.phase,
            running: state.running,
            stop_requested: state.stop_requested,
            rate_per_second: state.rate_per_second,
            sequence_counter: state.sequence_counter,
            packets_generated: state.packets_generated,
            packets_delivered: state.packets_delivered,
            devices: self.ctx.registry.snapshot().await,
            queued_lines: self.ctx.queue.len().await,
        }
    }

    /// Stop the run, wait for every packet task, then stop the log drain
    /// after it has forwarded everything still queued.
    pub async fn shutdown(&self) -> Result<(), SimulationError> {
        self.stop().await;
        {
            let mut control = self.ctx.control.lock().await;
            if control.shut_down {
                return Err(SimulationError::AlreadyShutDown);
            }
            control.shut_down = true;
            control.session.cancel();
        }
        self.ctx.tracker.close();
        self.ctx.tracker.wait().await;

        self.drain_shutdown.cancel();
        if let Some(handle) = self.drain.lock().await.take() {
            handle.await.map_err(|e| SimulationError::Task(e.to_string()))?;
        }
        logging::log("SIM", "Simulation shut down");
        Ok(())
    }

    /// Wait until the generator and every packet task have finished, then
    /// forward all queued lines to the sink. Only returns once the run is
    /// stopped.
    #[cfg(any(test, feature = "test"))]
    pub async fn wait_settled(&self) {
        self.ctx.tracker.close();
        self.ctx.tracker.wait().await;
        self.ctx.tracker.reopen();
        let mut sink = self.ctx.sink.lock().await;
        self.ctx.queue.flush_into(sink.as_mut()).await;
    }

    #[cfg(test)]
    pub(crate) fn context(&self) -> &Arc<SimulationContext> {
        &self.ctx
    }

    fn banner(rule: char) -> String {
        std::iter::repeat(rule).take(BANNER_WIDTH).collect()
    }
}

#[async_trait]
impl Controller for SimulationNode {
    async fn start(&self) {
        let mut control = self.ctx.control.lock().await;
        if control.shut_down {
            logging::warn("SIM", "start ignored: simulation is shut down");
            return;
        }
        if control.state.running {
            return;
        }
        control.state.running = true;
        control.state.stop_requested = false;
        control.state.phase = Phase::Running;
        let run = control.session.child_token();
        control.run = Some(run.clone());

        for line in ["".to_string(), Self::banner('='), "Packet transmission started".to_string(), Self::banner('=')] {
            self.ctx.queue.push(LogLine::plain(line)).await;
        }
        let tokens = RunTokens { run, session: control.session.clone() };
        self.ctx.tracker.spawn(generator::run(self.ctx.clone(), tokens));
        logging::log("SIM", &format!("Transmission started at {} packets/s", control.state.rate_per_second));
    }

    async fn stop(&self) {
        let mut control = self.ctx.control.lock().await;
        if !control.state.running {
            return;
        }
        control.state.stop_requested = true;
        if let Some(run) = control.run.take() {
            run.cancel();
        }
        control.state.running = false;
        control.state.phase = Phase::Stopped;

        let total = control.state.packets_generated;
        let now = self.ctx.clock.now();
        for line in [
            "".to_string(),
            format!("[{}] Packet transmission stopped", now.format_seconds()),
            format!("Total packets sent: {}", total),
            Self::banner('-'),
        ] {
            self.ctx.queue.push(LogLine::plain(line)).await;
        }
        logging::log("SIM", &format!("Transmission stopped after {} packets", total));
    }

    async fn set_rate(&self, rate_per_second: u32) {
        let rate = clamp_rate(rate_per_second);
        let mut control = self.ctx.control.lock().await;
        if control.shut_down {
            logging::warn("SIM", "set_rate ignored: simulation is shut down");
            return;
        }
        control.state.rate_per_second = rate;
        if rate != rate_per_second {
            logging::log("SIM", &format!("Rate {} clamped to {}", rate_per_second, rate));
        } else {
            logging::log("SIM", &format!("Rate set to {} packets/s", rate));
        }
    }

    async fn reset(&self) {
        let mut control = self.ctx.control.lock().await;
        if control.shut_down {
            logging::warn("SIM", "reset ignored: simulation is shut down");
            return;
        }
        if let Some(run) = control.run.take() {
            run.cancel();
        }
        // everything spawned before this point loses the right to touch shared state
        control.session.cancel();
        control.session = CancellationToken::new();
        control.state = SimulationState::initial(clamp_rate(self.ctx.config.rate_per_second));

        {
            let mut sink = self.ctx.sink.lock().await;
            let dropped = self.ctx.queue.clear().await;
            sink.clear();
            logging::log("SIM", &format!("Reset dropped {} queued lines", dropped));
        }
        self.ctx.registry.reset().await;
    }
}
