// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod app;
pub mod event;
pub mod ui;
pub mod widgets;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;

use crate::api::StrixApi;
use crate::config::Config;
use crate::context::Route;
use crate::page::Page;
use crate::player::Player;
use crate::prefs::ThemeStore;

pub use app::App;
pub use event::{ChannelSurface, Event, EventHandler};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    pub event_handler: EventHandler,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        let event_handler = EventHandler::new(250);
        Ok(Self {
            terminal,
            event_handler,
        })
    }

    pub fn init(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn draw(&mut self, app: &App) -> Result<()> {
        self.terminal.draw(|frame| ui::draw(frame, app))?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

pub async fn run_tui(config: Config, start: Route) -> Result<()> {
    // Spinners would tear the alternate screen.
    let mut api = StrixApi::new(&config.api)?;
    api.disable_progress();
    let api = Arc::new(api);

    let mut tui = Tui::new()?;
    let surface: Arc<ChannelSurface> = Arc::new(tui.event_handler.surface());
    let themes = ThemeStore::new(ThemeStore::default_path(), &config.ui.default_theme);
    let page = Arc::new(Page::new(api.clone(), surface.clone(), &config, themes));
    let player = Player::new(config.player.clone());

    let mut app = App::new(&config, api, surface, page, player.clone());

    tui.init()?;
    app.open(start);
    let res = run_app(&mut tui, &mut app).await;

    player.stop().await;
    tui.exit()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    tui.draw(app)?;

    loop {
        let should_redraw = match tui.event_handler.next().await? {
            Event::Key(key_event) => match app.handle_key_event(key_event).await {
                Some(app::Action::Quit) => break,
                None => true,
            },
            Event::Paint(paint) => {
                app.apply(paint);
                true
            }
            Event::Resize(_, _) => true,
            // Only redraw on ticks that expired a notice.
            Event::Tick => app.tick(),
        };

        if should_redraw {
            tui.draw(app)?;
        }
    }

    Ok(())
}
