mod reset;

use crate::clock::{RandomSource, ScriptedRandom, SeededRandom};
use crate::config::SimulationConfig;
use crate::display::{MemorySink, RecordingRenderer};
use crate::simulation::SimulationNode;
use crate::utils::logging;

/// A launched simulation with handles on its sink and renderer
pub(crate) struct Harness {
    pub node: SimulationNode,
    pub sink: MemorySink,
    pub renderer: RecordingRenderer,
}

pub(crate) async fn launch(config: SimulationConfig, random: Box<dyn RandomSource>) -> Harness {
    logging::init_logging();
    let sink = MemorySink::new();
    let renderer = RecordingRenderer::new();
    let node = SimulationNode::launch_with_random(config, Box::new(renderer.clone()), Box::new(sink.clone()), random)
        .await
        .expect("Failed to launch simulation");
    Harness { node, sink, renderer }
}

/// Every draw is 0.25: PC2 -> PC1, 450 bytes, 2500 ms delay
pub(crate) async fn launch_scripted(config: SimulationConfig) -> Harness {
    launch(config, Box::new(ScriptedRandom::new(vec![0.25]))).await
}

pub(crate) async fn launch_seeded(config: SimulationConfig, seed: u64) -> Harness {
    launch(config, Box::new(SeededRandom::new(Some(seed)))).await
}

/// A generated-packet line split into (id, source, destination, size)
pub(crate) fn parse_generated(line: &str) -> Option<(u64, String, String, u64)> {
    let rest = line.split_once("] Packet #")?.1;
    let (id, rest) = rest.split_once(": ")?;
    let (source, rest) = rest.split_once(" -> ")?;
    let (destination, rest) = rest.split_once(", Size: ")?;
    let size = rest.strip_suffix(" bytes")?;
    Some((id.parse().ok()?, source.to_string(), destination.to_string(), size.parse().ok()?))
}

/// The delay of a delivery line, in milliseconds
pub(crate) fn parse_delay_ms(line: &str) -> Option<u64> {
    let rest = line.split_once("(delay: ")?.1;
    rest.strip_suffix(" ms)")?.parse().ok()
}
