//! `mist [--breathe] [image path or URL]`
//!
//! Shows the warp over the given image, or over the built-in one. With `--breathe` a
//! background thread swells and relaxes the distortion, the way a slider would.

use std::{thread, time::Duration};

use mist_warp::{Controller, MistConfig, ParamUpdate, TextureSource};

fn source_from_arg(arg: String) -> TextureSource {
    if arg.starts_with("http://") || arg.starts_with("https://") {
        TextureSource::Url(arg)
    } else {
        TextureSource::File(arg.into())
    }
}

fn breathe(controller: Controller) {
    thread::spawn(move || {
        let mut t: f32 = 0.0;
        loop {
            let distortion = 0.05 + 0.04 * t.sin();
            if controller.set(ParamUpdate::Distortion(distortion)).is_err() {
                break;
            }
            t += 0.05;
            thread::sleep(Duration::from_millis(50));
        }
        log::debug!("Render loop gone, breathing stopped");
    });
}

fn main() -> anyhow::Result<()> {
    let mut breathing = false;
    let mut config = MistConfig::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--breathe" => breathing = true,
            _ => config = config.with_texture(source_from_arg(arg)),
        }
    }

    mist_warp::run_with(config, |controller| {
        if breathing {
            breathe(controller);
        }
    })
}
