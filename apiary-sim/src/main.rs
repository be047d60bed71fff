//! Apiary - host simulator
//!
//! Runs one device variant on the desktop: simulated pins, a real TCP
//! line server, and the same scheduler loop the boards run. Connect with
//! any line-oriented client (`telnet localhost 4999`) and type commands.
//!
//! Usage: `apiary-sim [config.toml]`. Without an argument the embedded
//! `sim.toml` is used. Set `RUST_LOG=device=debug` to see device chatter.

use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;

use apiary_core::controller::{Controller, TableError};
use apiary_core::net::Multiplexer;
use apiary_core::scheduler::{Action, Scheduler, SchedulerError};
use apiary_core::Shared;
use apiary_devices::{Focuser, Sampler, TemperatureReporter};
use embassy_executor::Spawner;
use embassy_time::Timer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod debug;
mod hardware;
mod net;

use crate::config::{DeviceKind, SimConfig};
use crate::debug::TracingSink;
use crate::hardware::{SimClock, SimSoundBoard, SimStepperBoard, SimThermometer};
use crate::net::TcpServer;

/// Reasons the runner cannot start
#[derive(Debug)]
enum StartupError {
    Bind(std::io::Error),
    Tables(TableError),
    Scheduler(SchedulerError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Bind(e) => write!(f, "cannot listen: {}", e),
            StartupError::Tables(e) => write!(f, "device tables rejected: {}", e),
            StartupError::Scheduler(e) => write!(f, "cannot schedule actions: {}", e),
        }
    }
}

impl From<TableError> for StartupError {
    fn from(e: TableError) -> Self {
        StartupError::Tables(e)
    }
}

impl From<SchedulerError> for StartupError {
    fn from(e: SchedulerError) -> Self {
        StartupError::Scheduler(e)
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    init_tracing();
    info!("Apiary simulator starting...");

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match SimConfig::load(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!(
        kind = ?config.device.kind,
        port = config.network.port,
        "Configuration loaded"
    );

    match run(config).await {
        Ok(never) => match never {},
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn banner(kind: DeviceKind) -> &'static str {
    match kind {
        DeviceKind::Sampler => "# Apiary sound sampler\n",
        DeviceKind::Focuser => "# Apiary focuser\n",
    }
}

/// Build the configured device and run it forever
async fn run(config: SimConfig) -> Result<Infallible, StartupError> {
    let server = TcpServer::bind(config.network.address()).map_err(StartupError::Bind)?;
    let mux = RefCell::new(Multiplexer::new(
        server,
        TracingSink::new("net"),
        banner(config.device.kind),
    ));
    let net = Shared::new(&mux);

    let reporter = config.device.report_temperature.then(|| {
        TemperatureReporter::new(net, SimThermometer::new(), TracingSink::new("temperature"))
    });

    match config.device.kind {
        DeviceKind::Sampler => {
            let sampler = Sampler::new(
                net,
                SimSoundBoard::new(),
                TracingSink::new("sampler"),
                SimClock::new(),
                config.sampler,
            );
            serve(net, Controller::new(sampler)?, reporter).await
        }
        DeviceKind::Focuser => {
            info!(build = config.focuser.build.name(), "Focuser build selected");
            let focuser = Focuser::new(
                net,
                SimStepperBoard::new(config.focuser.start_position),
                TracingSink::new("focuser"),
                config.focuser.build.params(),
            );
            serve(net, Controller::new(focuser)?, reporter).await
        }
    }
}

/// Tick the scheduler and sleep for whatever it asks
async fn serve<N, C, R>(
    mut net: N,
    mut controller: C,
    mut reporter: Option<R>,
) -> Result<Infallible, StartupError>
where
    N: Action,
    C: Action,
    R: Action,
{
    let mut scheduler: Scheduler<'_> = Scheduler::new();
    scheduler.register(&mut net)?;
    scheduler.register(&mut controller)?;
    if let Some(reporter) = reporter.as_mut() {
        scheduler.register(reporter)?;
    }
    for name in scheduler.names() {
        info!("Scheduled action: {}", name);
    }
    info!("Scheduler running {} actions", scheduler.len());

    loop {
        let delay_us = scheduler.tick();
        if delay_us != 0 {
            Timer::after_micros(u64::from(delay_us)).await;
        }
    }
}
