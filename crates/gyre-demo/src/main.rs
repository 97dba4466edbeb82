use std::process::ExitCode;

use gyre_engine::logging::{LoggingConfig, init_logging};
use gyre_engine::render::RendererKind;
use gyre_engine::window::{Runtime, RuntimeConfig};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    // Optional positional argument: the renderer key.
    let renderer = match std::env::args().nth(1) {
        None => RendererKind::default(),
        Some(key) => match key.parse::<RendererKind>() {
            Ok(kind) => kind,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let config = RuntimeConfig {
        title: format!("gyre · {renderer}"),
        renderer,
        ..RuntimeConfig::default()
    };

    match Runtime::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("gyre runtime error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
