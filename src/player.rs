// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! External media player for `/play?token=` routes.

use crate::api::StrixApi;
use crate::config::PlayerConfig;
use crate::context::Route;
use anyhow::{Context, Result, bail};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Stream URL behind a player route; other routes have none.
pub fn stream_url(api: &StrixApi, route: &Route) -> Option<String> {
    match route {
        Route::Play { token } => Some(api.stream_url(token)),
        _ => None,
    }
}

#[derive(Clone)]
pub struct Player {
    config: PlayerConfig,
    current_process: Arc<Mutex<Option<Child>>>,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            current_process: Arc::new(Mutex::new(None)),
        }
    }

    fn command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args);
        cmd.arg(url);
        cmd
    }

    /// Runs the player in the foreground until it exits.
    pub fn play(&self, url: &str) -> Result<()> {
        info!("Starting player: {} {}", self.config.command, url);

        let status = self.command(url).status().with_context(|| {
            format!("Failed to execute player command: {}", self.config.command)
        })?;

        if !status.success() {
            bail!("Player process failed with exit code: {}", status);
        }

        debug!("Player exited successfully");
        Ok(())
    }

    /// Starts the player detached from the terminal, replacing any player
    /// this instance started before.
    pub async fn play_background(&self, url: &str) -> Result<()> {
        self.stop().await;

        let mut cmd = self.command(url);
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null());

        let child = tokio::task::spawn_blocking(move || cmd.spawn())
            .await
            .with_context(|| "Failed to spawn blocking task")?
            .with_context(|| format!("Failed to start player: {}", self.config.command))?;

        info!("Player started in background (pid {})", child.id());
        *self.current_process.lock().await = Some(child);
        Ok(())
    }

    pub async fn stop(&self) {
        if let Some(mut child) = self.current_process.lock().await.take() {
            if let Err(e) = child.kill() {
                warn!("Failed to stop player: {}", e);
            }
        }
    }

    pub async fn is_playing(&self) -> bool {
        let mut guard = self.current_process.lock().await;
        let running = match guard.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(Ok(Some(_))) | Some(Err(_)) => false,
            None => return false,
        };
        if !running {
            *guard = None;
        }
        running
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.config.command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::models::MediaType;

    #[test]
    fn url_is_appended_after_configured_args() {
        let player = Player::new(PlayerConfig {
            command: "mpv".to_string(),
            args: vec!["--fs".to_string()],
        });
        let cmd = player.command("http://h/stream/t");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(cmd.get_program(), "mpv");
        assert_eq!(args, vec!["--fs", "http://h/stream/t"]);
    }

    #[test]
    fn only_play_routes_have_stream_urls() {
        let api = StrixApi::new(&ApiConfig {
            base_url: "http://localhost:8080".to_string(),
            image_base_url: String::new(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(
            stream_url(&api, &Route::play("abc")).as_deref(),
            Some("http://localhost:8080/stream/abc")
        );
        assert_eq!(stream_url(&api, &Route::media(MediaType::Movie, 1)), None);
    }

    #[tokio::test]
    async fn idle_player_is_not_playing() {
        let player = Player::new(PlayerConfig {
            command: "true".to_string(),
            args: Vec::new(),
        });
        assert!(!player.is_playing().await);
        player.stop().await;
    }
}
