//! Plasma Field Simulation
//!
//! Headless frame loop: ticks the plasma field at display rate while a
//! synthetic pointer sweeps across the viewport, and logs what the field is
//! doing. Pass the run length in seconds as the first argument.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use plasma_simulation::{FieldParams, PlasmaSimulation, PointerTracker, SimulationHandle};

const FRAME_RATE: u32 = 60;
const DEFAULT_RUN_SECONDS: u64 = 12;
const VIEWPORT: (u32, u32) = (1920, 1080);
const POINTER_RATE: Duration = Duration::from_millis(16);

/// Move a fake cursor around a Lissajous curve until told to stop
fn spawn_pointer_sweep(
    handle: SimulationHandle,
    running: Arc<AtomicBool>,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("pointer-sweep".into())
        .spawn(move || {
            let tracker = PointerTracker::new(VIEWPORT.0, VIEWPORT.1);
            let (w, h) = (VIEWPORT.0 as f32, VIEWPORT.1 as f32);
            let start = Instant::now();

            while running.load(Ordering::Relaxed) {
                let t = start.elapsed().as_secs_f32();
                let x = w * (0.5 + 0.4 * (t * 0.7).sin());
                let y = h * (0.5 + 0.4 * (t * 1.1).cos());

                if tracker.pointer_moved(x, y, &handle).is_none() {
                    break;
                }
                thread::sleep(POINTER_RATE);
            }
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger (RUST_LOG=debug for instability events)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let run_seconds: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RUN_SECONDS);

    log::info!("Starting plasma field simulation for {}s...", run_seconds);

    let mut simulation = PlasmaSimulation::new(FieldParams::default())?;
    let stats = simulation.stats();
    log::info!(
        "✓ {} particles ({} ions, {} electrons)",
        stats.count,
        stats.positive,
        stats.count - stats.positive
    );

    let running = Arc::new(AtomicBool::new(true));
    let sweep = spawn_pointer_sweep(simulation.handle(), Arc::clone(&running))?;

    simulation.start()?;

    let frame_budget = Duration::from_secs_f64(1.0 / FRAME_RATE as f64);
    let total_frames = run_seconds * FRAME_RATE as u64;
    let mut frame_times: VecDeque<f32> = VecDeque::with_capacity(100);
    let mut last_frame_time = Instant::now();

    for frame in 1..=total_frames {
        let frame_start = Instant::now();
        simulation.tick();

        // Stand-in for the renderer consuming the frame
        let vertices = simulation.vertices();
        debug_assert_eq!(vertices.len(), simulation.len());

        let now = Instant::now();
        let frame_time = (now - last_frame_time).as_secs_f32() * 1000.0;
        last_frame_time = now;

        frame_times.push_back(frame_time);
        if frame_times.len() > 100 {
            frame_times.pop_front();
        }

        if frame % FRAME_RATE as u64 == 0 {
            let avg_frame_time = frame_times.iter().sum::<f32>() / frame_times.len() as f32;
            let stats = simulation.stats();
            let pointer = simulation.pointer();
            log::info!(
                "t={:>3}s  {:.2} ms/frame  mean |v|={:.4}  max r={:.2}  pointer=({:.1}, {:.1})  instabilities={}",
                frame / FRAME_RATE as u64,
                avg_frame_time,
                stats.mean_speed,
                stats.max_radius,
                pointer.x,
                pointer.y,
                simulation.instability_count()
            );
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            thread::sleep(frame_budget - elapsed);
        }
    }

    running.store(false, Ordering::Relaxed);
    simulation.stop();
    if sweep.join().is_err() {
        log::error!("Pointer sweep thread panicked");
    }

    log::info!("Done after {} frames", simulation.frame());
    Ok(())
}
