//! Acquire the target, poll it until it goes away, repeat.

use std::convert::Infallible;

use tracing::{info, warn};

use crate::bridge::SharedRegion;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::gamepad::Gamepads;
use crate::layout::GPIO_OFFSET;
use crate::locator::{find_module, find_target};
use crate::pattern::NamePattern;
use crate::poller::Poller;
use crate::process::{ProcessApi, RemoteMemory};
use crate::scanner::find_shared_region;
use crate::ticker::{Ticker, TickerFactory};

/// How one acquisition attempt ended.
#[derive(Debug)]
pub enum Attempt {
    /// A session ran and ended with this remote memory error.
    Detached(Error),
    /// Locating the target, its module or the shared region failed, or the
    /// frame timer couldn't be started.
    Failed(Error),
}

pub struct Supervisor<P, G, F> {
    api: P,
    gamepads: G,
    tickers: F,
    config: Config,
    pattern: NamePattern,
}

impl<P, G, F> Supervisor<P, G, F>
where
    P: ProcessApi,
    G: Gamepads,
    F: TickerFactory,
{
    pub fn new(api: P, gamepads: G, tickers: F, config: Config) -> Self {
        let pattern = config.pattern();
        Self {
            api,
            gamepads,
            tickers,
            config,
            pattern,
        }
    }

    pub fn gamepads(&self) -> &G {
        &self.gamepads
    }

    /// Retry acquisition every scan interval, forever.
    ///
    /// Only returns if the scan timer can't be created at startup. Every later
    /// failure, including a frame timer that won't start, is logged and retried.
    pub fn run(&mut self) -> Result<Infallible> {
        let mut scan = self.tickers.periodic(self.config.scan_interval())?;
        info!(pattern = %self.pattern, "waiting for target process");
        loop {
            match self.attempt() {
                Attempt::Detached(e) => info!("lost target process: {e}"),
                Attempt::Failed(e) if e.is_not_found() => info!("{e}"),
                Attempt::Failed(e) => warn!("{e}"),
            }
            if let Err(e) = scan.wait() {
                warn!("scan timer wait failed: {e}");
            }
        }
    }

    /// One acquisition followed by one polling session.
    ///
    /// The process handle is closed before this returns, whatever the outcome.
    pub fn attempt(&mut self) -> Attempt {
        let process = match find_target(&self.api, &self.pattern) {
            Ok(process) => process,
            Err(e) => return Attempt::Failed(e),
        };
        let pid = process.pid();
        info!(pid, "found target process");

        let module = match find_module(&self.api, &process, &self.pattern) {
            Ok(module) => module,
            Err(e) => return Attempt::Failed(e),
        };
        info!(
            pid,
            base = format_args!("{:#x}", module.base),
            size = format_args!("{:#x}", module.size),
            "found target module"
        );

        let address = match find_shared_region(&process, module) {
            Ok(address) => address,
            Err(e) => return Attempt::Failed(e),
        };
        if let Some(ram) = address.checked_sub(GPIO_OFFSET) {
            info!(pid, "cartridge RAM at {ram:#x}");
        }
        info!(pid, "Pinput region at {address:#x}");

        let mut ticker = match self.tickers.periodic(self.config.tick_period()) {
            Ok(ticker) => ticker,
            Err(e) => return Attempt::Failed(e),
        };
        let region = SharedRegion::new(&process, address);
        let mut poller = Poller::new(region, &mut self.gamepads, self.config.recheck_interval);
        Attempt::Detached(poller.run(&mut ticker))
    }
}
