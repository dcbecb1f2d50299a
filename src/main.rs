//! Jelly Membrane entry point
//!
//! In the browser this mounts every `[data-jelly]` element. Natively it runs a
//! scripted pointer session headless and prints a JSON frame report.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    log::info!("Jelly Membrane starting...");
    let count = jelly_membrane::platform::mount_all()?;
    log::info!("Mounted {count} jelly container(s)");
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use serde::Serialize;

    use jelly_membrane::renderer::PathRecorder;
    use jelly_membrane::sim::{CornerRadii, StepStats};
    use jelly_membrane::{Jelly, JellyConfig, JellyError};

    const WIDTH: f32 = 320.0;
    const HEIGHT: f32 = 180.0;
    const RADIUS: f32 = 24.0;
    const FRAMES: u64 = 180;
    const FRAME_MS: f64 = 1000.0 / 60.0;
    const SAMPLE_EVERY: u64 = 10;

    /// Scripted pointer input, keyed by frame
    enum Input {
        Enter(f32, f32),
        Move(f32, f32),
        Down(f32, f32),
        Up,
        Leave,
    }

    fn script(frame: u64) -> Option<Input> {
        match frame {
            10 => Some(Input::Enter(0.0, HEIGHT / 2.0)),
            11..=70 => Some(Input::Move((frame - 10) as f32 * 4.0, HEIGHT / 2.0)),
            80 => Some(Input::Down(WIDTH / 2.0, HEIGHT / 2.0)),
            84 => Some(Input::Up),
            100 => Some(Input::Leave),
            _ => None,
        }
    }

    #[derive(Serialize)]
    struct FrameSample {
        frame: u64,
        time: f32,
        #[serde(flatten)]
        stats: StepStats,
    }

    #[derive(Serialize)]
    struct Report {
        width: u32,
        height: u32,
        nodes: usize,
        bleed: f32,
        clip_path: bool,
        frames: u64,
        peak_out: f32,
        peak_in: f32,
        samples: Vec<FrameSample>,
        final_path: String,
    }

    fn load_config(path: Option<&str>) -> Result<JellyConfig, JellyError> {
        let Some(path) = path else {
            return Ok(JellyConfig::default());
        };
        let json = std::fs::read_to_string(path)
            .map_err(|e| JellyError::Host(format!("{path}: {e}")))?;
        let config = JellyConfig::from_json(&json)?;
        log::info!("Loaded config from {path} (preset {})", config.preset.as_str());
        Ok(config)
    }

    pub fn run(config_path: Option<&str>) -> Result<(), JellyError> {
        let config = load_config(config_path)?;
        let mut jelly = Jelly::new(config, true);
        jelly.resize(WIDTH, HEIGHT, CornerRadii::uniform(RADIUS));

        let mut sink = PathRecorder::default();
        let mut samples = Vec::new();
        let (mut peak_out, mut peak_in) = (0.0f32, 0.0f32);

        for frame in 0..FRAMES {
            match script(frame) {
                Some(Input::Enter(x, y)) => jelly.pointer_enter(x, y),
                Some(Input::Move(x, y)) => jelly.pointer_move(x, y),
                Some(Input::Down(x, y)) => jelly.pointer_down(x, y),
                Some(Input::Up) => jelly.pointer_up(),
                Some(Input::Leave) => jelly.pointer_leave(),
                None => {}
            }

            let Some(stats) = jelly.frame(frame as f64 * FRAME_MS, &mut sink) else {
                continue;
            };
            peak_out = peak_out.max(stats.max_out);
            peak_in = peak_in.min(stats.max_in);
            if frame % SAMPLE_EVERY == 0 {
                samples.push(FrameSample {
                    frame,
                    time: jelly.context().time,
                    stats,
                });
            }
        }

        let layout = jelly
            .layout()
            .ok_or_else(|| JellyError::Host("no layout after resize".into()))?;
        let report = Report {
            width: layout.width,
            height: layout.height,
            nodes: jelly.context().boundary.len(),
            bleed: layout.bleed,
            clip_path: sink.clip.is_some(),
            frames: jelly.context().frame,
            peak_out,
            peak_in,
            samples,
            final_path: sink.outline.unwrap_or_default(),
        };

        log::info!(
            "Ran {} frames, peak offsets +{:.2} / {:.2} px",
            report.frames,
            report.peak_out,
            report.peak_in
        );
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Jelly Membrane (native) headless demo");

    let config_path = std::env::args().nth(1);
    if let Err(err) = demo::run(config_path.as_deref()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}
