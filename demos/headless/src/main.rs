//! `headless` — drive a boid flock with no renderer attached.
//!
//! Spawns the configured population around the origin, steps it at a fixed
//! 60 Hz, and prints the flock centroid and spread at intervals.
//!
//! Run with:
//!   cargo run -p headless --release -- [CONFIG.json] [FRAMES]
//!   cargo run -p headless --release --features gpu -- [CONFIG.json] [FRAMES] [KERNEL.wgsl]
//!
//! `CONFIG.json` is a serialized `FlockConfig`; pass `-` for the defaults.
//! Set `RUST_LOG=debug` to see per-step dispatch logs.

// Use mimalloc to keep the per-frame transient buffers cheap.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[cfg_attr(feature = "gpu", allow(dead_code))]
mod kernel;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec3;
use memory_stats::memory_stats;
use tracing::info;

use fl_agent::AgentView;
use fl_compute::ComputeDevice;
use fl_core::{FlockConfig, Frame};
use fl_sim::{FlockBuilder, FlockObserver};
use fl_transform::SimTransformFactory;

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_FRAMES: u64 = 600;
const FRAME_SECS:     f32 = 1.0 / 60.0;
/// Print a summary line every N frames.
const REPORT_EVERY:   u64 = 60;

// ── Memory helper ─────────────────────────────────────────────────────────────

fn mem_mb() -> f64 {
    memory_stats()
        .map(|s| s.physical_mem as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0)
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Prints centroid and spread of the flock every `REPORT_EVERY` frames.
struct SpreadPrinter;

impl FlockObserver for SpreadPrinter {
    fn on_step_end(&mut self, frame: Frame, agents: AgentView<'_>) {
        if agents.is_empty() || !frame.0.is_multiple_of(REPORT_EVERY) {
            return;
        }
        let n = agents.len() as f32;
        let centroid = agents.iter().map(|a| a.position).sum::<Vec3>() / n;
        let spread = agents
            .iter()
            .map(|a| a.position.distance(centroid))
            .fold(0.0_f32, f32::max);
        println!(
            "  {frame}  centroid ({:>7.2}, {:>7.2}, {:>7.2})  spread {spread:>7.2}",
            centroid.x, centroid.y, centroid.z
        );
    }

    fn on_spawn(&mut self, first: fl_core::AgentId, count: usize) {
        info!(%first, count, "initial population spawned");
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_config(arg: Option<&str>) -> Result<FlockConfig> {
    let config = match arg {
        None | Some("-") => FlockConfig::default(),
        Some(path) => {
            let text = std::fs::read_to_string(Path::new(path))
                .with_context(|| format!("reading config {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))?
        }
    };
    config.validate()?;
    Ok(config)
}

fn run<D: ComputeDevice>(config: FlockConfig, device: D, frames: u64) -> Result<()> {
    let backend = device.name();
    let t0 = Instant::now();
    let mut observer = SpreadPrinter;
    let mut flock = FlockBuilder::new(config, device, SimTransformFactory::new())
        .build_observed(&mut observer)?;
    println!(
        "Flock ready: {} agents on {backend} in {:.1} ms  (mem {:.1} MB)",
        flock.agent_count(),
        t0.elapsed().as_secs_f64() * 1e3,
        mem_mb()
    );

    let t1 = Instant::now();
    for _ in 0..frames {
        flock.step_observed(FRAME_SECS, &mut observer)?;
    }
    let wall = t1.elapsed().as_secs_f64();

    println!();
    println!(
        "{frames} frames ({:.1} simulated s) in {wall:.2} s  →  {:.0} frames/s",
        flock.clock().elapsed_secs,
        frames as f64 / wall.max(f64::EPSILON)
    );
    println!(
        "Dispatches: {}  |  capacity {}  |  mem {:.1} MB",
        flock.coordinator().steps(),
        flock.capacity(),
        mem_mb()
    );
    Ok(())
}

#[cfg(feature = "gpu")]
fn make_device(kernel_path: Option<&str>) -> Result<fl_compute::WgpuDevice> {
    let source = match kernel_path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading kernel {path}"))?,
        None => include_str!("../kernels/boids.wgsl").to_owned(),
    };
    Ok(fl_compute::WgpuDevice::new(&source)?)
}

#[cfg(not(feature = "gpu"))]
fn make_device(_kernel_path: Option<&str>) -> Result<fl_compute::HostDevice<kernel::BoidsKernel>> {
    Ok(fl_compute::HostDevice::new(kernel::BoidsKernel))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = load_config(args.first().map(String::as_str))?;
    let frames = match args.get(1) {
        Some(s) => s.parse().with_context(|| format!("invalid frame count {s:?}"))?,
        None => DEFAULT_FRAMES,
    };

    println!("=== headless — rust_flock ===");
    println!(
        "Agents: {}  |  Frames: {frames}  |  Seed: {}",
        config.initial_agent_count, config.seed
    );
    println!();

    run(config, make_device(args.get(2).map(String::as_str))?, frames)
}
