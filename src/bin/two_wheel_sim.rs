use anyhow::{Context, Result};
use log::{info, warn};
use prometheus_localization::common::Pose;
use prometheus_localization::config::PrometheusConfig;
use prometheus_localization::perception::localization::TwoWheelLocalizer;
use prometheus_localization::perception::sensors::sim::SimulatedRobot;
use prometheus_localization::perception::PerceptionStack;
use prometheus_localization::{LocalizationError, PrometheusCore};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

const RUN_TIME: Duration = Duration::from_secs(7);

/// Scripted robot-frame command (forward in/s, strafe in/s, turn rad/s)
fn command_at(elapsed: Duration) -> (f64, f64, f64) {
    match elapsed.as_secs_f64() {
        t if t < 2.0 => (24.0, 0.0, 0.0),
        t if t < 4.0 => (18.0, 0.0, 0.8),
        t if t < 5.0 => (0.0, 12.0, 0.0),
        t if t < 6.0 => (0.0, 0.0, -1.5),
        _ => (0.0, 0.0, 0.0),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PrometheusConfig::load(Path::new(&path))
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => PrometheusConfig::default(),
    };

    let start = Pose::default();
    let (mut robot, hardware) = SimulatedRobot::new(&config.two_wheel, start);
    let localizer = TwoWheelLocalizer::with_start_pose(hardware, config.two_wheel.clone(), start)
        .context("Failed to create two-wheel localizer")?;

    let mut core = PrometheusCore::new();
    core.register(PerceptionStack::new(localizer, config.perception.clone()));

    // Configuring blocks while the IMU settles
    let mut core = tokio::task::spawn_blocking(move || {
        core.init()?;
        Ok::<_, LocalizationError>(core)
    })
    .await
    .context("Core initialization task failed")?
    .context("Failed to initialize core")?;

    let period = config.control_loop.period();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Running control loop every {:?} for {:?}", period, RUN_TIME);
    let mut elapsed = Duration::ZERO;
    let mut cycles: u64 = 0;
    while elapsed < RUN_TIME {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                warn!("Interrupted after {} cycles", cycles);
                break;
            }
        }

        let (forward, strafe, turn) = command_at(elapsed);
        robot.step(forward, strafe, turn, period);
        elapsed += period;

        let perception = core
            .perception_stack_mut()
            .context("Perception stack is not registered")?;
        perception.update().context("Localization update failed")?;
        cycles += 1;

        if cycles % 100 == 0 {
            let velocity = perception.get_velocity_vector();
            info!(
                "t={:.2}s estimate={:?} truth={:?} speed={:.2}in/s",
                elapsed.as_secs_f64(),
                perception.get_pose(),
                robot.pose(),
                velocity.magnitude()
            );
        }
    }

    let perception = core
        .perception_stack_mut()
        .context("Perception stack is not registered")?;
    let estimate = perception.get_pose();
    let truth = robot.pose();
    info!(
        "Final estimate {:?}, truth {:?}, position error {:.4}in, total heading {:.4}rad",
        estimate,
        truth,
        (estimate - truth).vector().magnitude(),
        perception.localizer().total_heading()
    );

    core.shutdown().context("Failed to shut down core")?;
    Ok(())
}
