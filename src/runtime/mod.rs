use std::env;
use std::io::{self, BufRead};
use std::time::Duration;

use tracing::{info, warn};

use crate::control::{self, ControlListener};
use crate::device::{AudioDevice, RodioDevice};
use crate::player::PlayerController;

mod logging;
mod settings;

struct Args {
    music_dir: Option<String>,
    print_config: bool,
}

impl Args {
    fn from_env() -> Self {
        let mut args = Args {
            music_dir: None,
            print_config: false,
        };
        for arg in env::args().skip(1) {
            if arg == "--print-config" {
                args.print_config = true;
            } else if args.music_dir.is_none() {
                args.music_dir = Some(arg);
            }
        }
        args
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_env();
    let (settings, settings_problem) = settings::load_settings();

    if args.print_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    logging::init_logging(&settings.logging);
    if let Some(problem) = settings_problem {
        warn!("{problem}");
    }

    let dir = args
        .music_dir
        .unwrap_or_else(|| settings.library.music_dir.clone());

    let device = RodioDevice::open(Duration::from_millis(settings.player.poll_interval_ms))?;
    let player = PlayerController::with_settings(device, &settings);

    match player.append_songs_from_folder(&dir) {
        Ok(0) => warn!(%dir, "no songs found"),
        Ok(_) => {}
        Err(e) => warn!(%dir, error = %e, "could not scan music folder"),
    }

    if settings.player.autoplay {
        player.play()?;
    }

    let listener = if settings.control.enabled {
        Some(ControlListener::spawn(settings.control.address(), player.clone())?)
    } else {
        None
    };

    let quit = serve_stdin(&player)?;

    match listener {
        Some(listener) if !quit => {
            info!("stdin closed, serving control connections only");
            listener.join();
        }
        _ => {
            player.stop()?;
        }
    }
    Ok(())
}

/// Treat each stdin line as a control command, echoing the reply.
///
/// Returns `true` when the user asked to quit, `false` on end of input.
fn serve_stdin<D: AudioDevice>(player: &PlayerController<D>) -> io::Result<bool> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            return Ok(true);
        }
        println!("{}", control::respond(player, line));
    }
    Ok(false)
}
