mod app;
mod assets;
mod camera;
mod config;
mod engine;
mod error;
mod renderer;
mod sampling;
mod scene;
mod ui;

use app::PcssApp;
use clap::Parser;
use config::{SceneConfig, DEFAULT_DIRECTIONAL_BIAS, DEFAULT_POINT_BIAS, SCREEN_HEIGHT, SCREEN_WIDTH};
use engine::window::AppWindow;
use error::AppError;

#[derive(Parser)]
#[command(name = "pcss", about = "Percentage-closer soft shadows demo")]
struct Args {
    /// OBJ file to render, relative to media/
    mesh: String,
    /// Depth bias for directional-light shadow maps
    directional_bias: Option<f32>,
    /// Depth bias for point-light shadow maps
    point_bias: Option<f32>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> error::Result<()> {
    let sdl = sdl2::init().map_err(AppError::Sdl)?;
    let mut window = AppWindow::new(&sdl, "PCSS", SCREEN_WIDTH, SCREEN_HEIGHT)?;

    let config = SceneConfig::new(
        args.directional_bias.unwrap_or(DEFAULT_DIRECTIONAL_BIAS),
        args.point_bias.unwrap_or(DEFAULT_POINT_BIAS),
    );
    let app = PcssApp::new(&args.mesh, config)?;
    app.run(&sdl, &mut window)
}
