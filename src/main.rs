use std::process::ExitCode;

use tracing::error;

use pinput::{logger, Config};

fn main() -> ExitCode {
    logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    run(config)
}

#[cfg(target_os = "windows")]
fn run(config: Config) -> ExitCode {
    use pinput::backends::windows::{WaitableTimers, Win32Processes, XInputGamepads};
    use pinput::Supervisor;

    let mut supervisor = Supervisor::new(
        Win32Processes::new(),
        XInputGamepads::new(),
        WaitableTimers,
        config,
    );
    match supervisor.run() {
        Ok(never) => match never {},
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn run(_config: Config) -> ExitCode {
    error!("{}", pinput::Error::Unsupported);
    ExitCode::FAILURE
}
