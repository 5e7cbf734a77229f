//! Line-based TCP control channel.
//!
//! Each inbound line is one command; each command gets one reply line:
//! the resulting playback state (`playing`, `paused`, `stopped`), or
//! `error: <message>`. `status` replies `<state> <index>` with `-` when no
//! song is selected.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::str::FromStr;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::device::AudioDevice;
use crate::player::{PlayerController, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Play,
    Stop,
    Pause,
    Unpause,
    Next,
    Prev,
    Status,
}

impl FromStr for ControlCmd {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "play" => Ok(ControlCmd::Play),
            "stop" => Ok(ControlCmd::Stop),
            "pause" => Ok(ControlCmd::Pause),
            "unpause" | "resume" => Ok(ControlCmd::Unpause),
            "next" => Ok(ControlCmd::Next),
            "previous" | "prev" => Ok(ControlCmd::Prev),
            "status" => Ok(ControlCmd::Status),
            other => Err(format!("unknown command {other}")),
        }
    }
}

fn dispatch<D: AudioDevice>(player: &PlayerController<D>, cmd: ControlCmd) -> Result<String> {
    match cmd {
        ControlCmd::Play => player.play()?,
        ControlCmd::Stop => player.stop()?,
        ControlCmd::Pause => player.pause()?,
        ControlCmd::Unpause => player.unpause()?,
        ControlCmd::Next => player.next_song()?,
        ControlCmd::Prev => player.previous_song()?,
        ControlCmd::Status => {
            let index = player
                .current_index()
                .map_or_else(|| "-".to_string(), |i| i.to_string());
            return Ok(format!("{} {index}", player.state()));
        }
    };
    Ok(player.state().to_string())
}

/// Run one command line against `player` and build the reply line.
pub fn respond<D: AudioDevice>(player: &PlayerController<D>, line: &str) -> String {
    let cmd = match line.parse::<ControlCmd>() {
        Ok(cmd) => cmd,
        Err(msg) => return format!("error: {msg}"),
    };
    match dispatch(player, cmd) {
        Ok(reply) => reply,
        Err(e) => {
            warn!(?cmd, error = %e, "control command failed");
            format!("error: {e}")
        }
    }
}

pub struct ControlListener {
    local_addr: SocketAddr,
    join: JoinHandle<()>,
}

impl ControlListener {
    /// Bind `addr` and serve commands for `player` on a background thread.
    pub fn spawn<D: AudioDevice>(
        addr: impl ToSocketAddrs,
        player: PlayerController<D>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "control listener ready");

        let join = thread::Builder::new()
            .name("segue-control".into())
            .spawn(move || accept_loop(listener, player))?;

        Ok(Self { local_addr, join })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Block until the accept loop ends.
    pub fn join(self) {
        let _ = self.join.join();
    }
}

fn accept_loop<D: AudioDevice>(listener: TcpListener, player: PlayerController<D>) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to accept control connection");
                continue;
            }
        };
        let player = player.clone();
        let spawned = thread::Builder::new()
            .name("segue-control-conn".into())
            .spawn(move || {
                let peer = stream.peer_addr().ok();
                if let Err(e) = serve_connection(stream, &player) {
                    debug!(?peer, error = %e, "control connection closed with error");
                }
            });
        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn control connection thread");
        }
    }
}

fn serve_connection<D: AudioDevice>(
    stream: TcpStream,
    player: &PlayerController<D>,
) -> io::Result<()> {
    debug!(peer = ?stream.peer_addr().ok(), "control connection opened");
    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = respond(player, line);
        debug!(command = line, reply = %reply, "control command");
        writeln!(writer, "{reply}")?;
        writer.flush()?;
    }
    Ok(())
}
