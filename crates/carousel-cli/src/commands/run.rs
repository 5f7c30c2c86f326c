use std::io;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use tracing::info;

use carousel_core::AppConfig;
use carousel_tui::{
    animation::AnimationConfigExt,
    event::{AppEvent, EventHandler},
    input::{handle_key_event, handle_mouse_event, Action},
    widgets::{CarouselWidget, StatusBarWidget},
    App,
};

use super::load_items;

pub async fn run(config: AppConfig) -> Result<()> {
    let items = load_items(config.general.items_file.as_deref())?;
    info!(count = items.len(), "Starting carousel");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Carousel"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, config, items);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, config: AppConfig, items: Vec<String>) -> Result<()> {
    let size = terminal.size()?;
    let event_handler = EventHandler::new(
        config.ui.tick_rate_ms,
        config.ui.animation.animation_tick_duration(),
    );
    let mut app = App::new(
        config,
        items,
        Rect::new(0, 0, size.width, size.height),
        Instant::now(),
    );

    loop {
        app.tick(Instant::now());

        terminal.draw(|frame| {
            let (main, status) = App::areas(frame.area());
            CarouselWidget::render(frame, main, &app);
            StatusBarWidget::render(frame, status, &app);
        })?;

        // Poll faster while something is moving or a timer is armed
        let event = if app.needs_fast_update() || app.carousel.next_deadline().is_some() {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };

        if let Some(event) = event {
            let now = Instant::now();
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key);
                    if action != Action::None {
                        app.clear_status();
                    }
                    app.dispatch(action, now);
                }
                AppEvent::Mouse(mouse) => {
                    let action = handle_mouse_event(mouse, &app);
                    app.dispatch(action, now);
                }
                AppEvent::Resize(width, height) => {
                    app.resize(Rect::new(0, 0, width, height), now);
                }
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
