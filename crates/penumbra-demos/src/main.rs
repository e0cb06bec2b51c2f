mod app;
mod camera;
mod demo;
mod gallery;
mod grid;
mod scene;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use penumbra_engine::device::GpuInit;
use penumbra_engine::logging::{LoggingConfig, init_logging};
use penumbra_engine::window::{Runtime, RuntimeConfig};

use crate::app::DemoApp;
use crate::demo::Demo;
use crate::gallery::GalleryDemo;
use crate::grid::GridDemo;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum DemoKind {
    /// 10x10 objects, one colored spot light each.
    Grid,
    /// Material showcase with directional, point and spot lights.
    Gallery,
}

/// Deferred shading demos.
#[derive(Debug, Parser)]
#[command(name = "penumbra-demos", version, about)]
struct Args {
    /// Scene to run.
    #[arg(long, value_enum, default_value_t = DemoKind::Grid)]
    demo: DemoKind,

    /// Open borderless fullscreen on this monitor index.
    #[arg(long, value_name = "MONITOR")]
    fullscreen: Option<usize>,

    /// Window width in logical pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in logical pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Log filter, env_logger syntax (overrides RUST_LOG).
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,

    /// Seed for the grid's light colors.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl Args {
    fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::new(format!("penumbra: {:?}", self.demo).to_lowercase())
            .with_size(self.width as f64, self.height as f64)
            .with_fullscreen(self.fullscreen)
    }

    fn build_demo(&self) -> Result<Box<dyn Demo>> {
        Ok(match self.demo {
            DemoKind::Grid => Box::new(GridDemo::new(self.seed)?),
            DemoKind::Gallery => Box::new(GalleryDemo::new()?),
        })
    }
}

fn run(args: Args) -> Result<()> {
    let demo = args.build_demo()?;
    Runtime::run(args.runtime_config(), GpuInit::default(), DemoApp::new(demo))
}

fn main() {
    let args = Args::parse();
    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    if let Err(err) = run(args) {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_grid_scene() {
        let args = Args::try_parse_from(["penumbra-demos"]).unwrap();
        assert_eq!(args.demo, DemoKind::Grid);
        assert_eq!((args.width, args.height), (1280, 720));
        assert_eq!(args.fullscreen, None);
        assert_eq!(args.runtime_config().title, "penumbra: grid");
    }

    #[test]
    fn all_flags_parse() {
        let args = Args::try_parse_from([
            "penumbra-demos",
            "--demo",
            "gallery",
            "--fullscreen",
            "1",
            "--width",
            "640",
            "--height",
            "480",
            "--log",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.demo, DemoKind::Gallery);
        let cfg = args.runtime_config();
        assert_eq!(cfg.fullscreen_monitor, Some(1));
        assert_eq!(args.log.as_deref(), Some("debug"));
    }

    #[test]
    fn unknown_demo_is_rejected() {
        assert!(Args::try_parse_from(["penumbra-demos", "--demo", "teapot"]).is_err());
    }
}
