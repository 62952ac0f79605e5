mod app;
mod catalog;
mod config;
mod engine;
mod event;
mod logging;
mod session;
mod store;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tracing::{error, info, warn};

use app::{App, AppScreen};
use catalog::custom::load_custom_file;
use catalog::{CUSTOM_CATEGORY, Catalog};
use config::Config;
use event::{AppEvent, EventHandler};
use store::json_store::JsonStore;
use store::progress::category_progress;
use store::schema::ExportData;
use ui::components::dashboard::Dashboard;
use ui::components::falling_word::FallingWord;
use ui::components::progress_bar::ProgressBar;
use ui::components::set_list::SetList;
use ui::layout::{GameLayout, centered_rect, pack_hint_lines};

#[derive(Parser)]
#[command(
    name = "wordfall",
    version,
    about = "Falling-word vocabulary game for the terminal"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, requires = "set", help = "Category id to play (with --set)")]
    category: Option<String>,

    #[arg(short, long, requires = "category", help = "Set name to play (with --category)")]
    set: Option<String>,

    #[arg(
        long,
        value_name = "FILE",
        conflicts_with = "category",
        help = "Play a word set from a JSON file"
    )]
    custom: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write config, progress and custom sets to a JSON file
    Export { file: PathBuf },
    /// Replace local progress and custom sets with an export file
    Import { file: PathBuf },
    /// Print every category and set with completion and best score
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }

    let _log_guard = logging::init(&config.log_level, &logging::default_log_dir());
    info!(version = env!("CARGO_PKG_VERSION"), "wordfall starting");
    if let Some(e) = config_error {
        let detail = format!("{e:#}");
        warn!(
            path = %Config::config_path().display(),
            error = %detail,
            "config unreadable; using defaults"
        );
    }

    if let Some(command) = cli.command {
        return run_command(command, &config);
    }

    // Fail before taking over the terminal so the error is readable.
    let custom = match cli.custom {
        Some(path) => Some(
            load_custom_file(&path)
                .with_context(|| format!("cannot play {}", path.display()))?,
        ),
        None => None,
    };

    let mut app = App::new(config);
    if let Some(reference) = custom {
        app.play_custom_reference(reference);
    } else if let (Some(category), Some(set)) = (cli.category, cli.set) {
        app.start_game(&category, &set);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(event::poll_interval(app.config.tick_interval()));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %err, "event loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_command(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Export { file } => {
            let store = JsonStore::new()?;
            let data = store.export_all(config);
            let json = serde_json::to_string_pretty(&data)?;
            fs::write(&file, json)
                .with_context(|| format!("failed to write {}", file.display()))?;
            println!(
                "Exported {} progress records and {} custom sets to {}",
                data.progress.records.len(),
                data.custom_sets.sets.len(),
                file.display()
            );
        }
        Command::Import { file } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let data: ExportData = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a wordfall export", file.display()))?;
            let mut store = JsonStore::new()?;
            store.import_all(&data)?;

            let mut imported = data.config.clone();
            imported.validate();
            imported.save()?;
            println!(
                "Imported {} progress records and {} custom sets",
                data.progress.records.len(),
                data.custom_sets.sets.len()
            );
        }
        Command::List => {
            let store = JsonStore::new()?;
            let catalog = Catalog::load();
            for category in catalog.categories() {
                let progress = category_progress(&store, &category.id, &category.set_names());
                println!(
                    "{} ({})  {}/{} completed",
                    category.title, category.id, progress.completed, progress.total
                );
                for set in &category.sets {
                    let mark = if progress.is_completed(&set.name) { "x" } else { " " };
                    println!(
                        "  [{mark}] {}  ({} words, best {})",
                        set.name,
                        set.words.len(),
                        progress.best_score(&set.name)
                    );
                }
            }

            let custom = match config.custom_sets_path() {
                Some(path) => JsonStore::load_custom_sets_from(&path),
                None => store.load_custom_sets(),
            };
            if !custom.sets.is_empty() {
                let names: Vec<&str> = custom.sets.keys().map(String::as_str).collect();
                let progress = category_progress(&store, CUSTOM_CATEGORY, &names);
                println!("Custom sets ({CUSTOM_CATEGORY})");
                for set in custom.sets.values() {
                    let mark = if progress.is_completed(&set.set_name) { "x" } else { " " };
                    println!("  [{mark}] {}  ({} words)", set.set_name, set.words.len());
                }
            }
        }
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize => {}
        }
        app.on_tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Home => handle_home_key(app, key),
        AppScreen::SetList | AppScreen::CustomSets => handle_set_list_key(app, key),
        AppScreen::Game => handle_game_key(app, key),
        AppScreen::GameOver => handle_game_over_key(app, key),
        AppScreen::NotFound => handle_not_found_key(app, key),
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.menu_activate(),
        KeyCode::Char(ch) => {
            if app.menu.select_key(ch) {
                app.menu_activate();
            }
        }
        _ => {}
    }
}

fn handle_set_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') => app.go_home(),
        KeyCode::Up | KeyCode::Char('k') => app.set_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.set_next(),
        KeyCode::Enter => app.set_activate(),
        _ => {}
    }
}

fn handle_game_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Esc => app.back_to_set_list(),
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace if ctrl || alt => app.delete_word(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char('w') if ctrl => app.delete_word(),
        KeyCode::Char('u') if ctrl => app.clear_input(),
        KeyCode::Char(ch) if !ctrl && !alt => app.type_char(ch),
        _ => {}
    }
}

fn handle_game_over_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Enter => app.restart(),
        KeyCode::Char('s') | KeyCode::Esc => app.back_to_set_list(),
        KeyCode::Char('h') => app.go_home(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_not_found_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('s') => app.back_to_set_list(),
        KeyCode::Char('h') => app.go_home(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Home => render_home(frame, app),
        AppScreen::SetList | AppScreen::CustomSets => render_set_list(frame, app),
        AppScreen::Game => render_game(frame, app),
        AppScreen::GameOver => render_game_over(frame, app),
        AppScreen::NotFound => render_not_found(frame, app),
    }
}

fn header_line<'a>(title: &'a str, info: String, app: &App) -> Paragraph<'a> {
    let colors = &app.theme.colors;
    Paragraph::new(Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()))
}

fn footer_line(hints: &[&str], width: u16, app: &App) -> Paragraph<'static> {
    let text = pack_hint_lines(hints, width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(app.theme.colors.text_pending()),
    )))
}

fn render_home(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let (completed, total) = app
        .catalog
        .categories()
        .iter()
        .map(|c| app.category_progress(&c.id))
        .fold((0, 0), |(done, all), p| (done + p.completed, all + p.total));
    let info = format!(
        " {} categories | {completed}/{total} sets completed",
        app.catalog.categories().len()
    );
    frame.render_widget(header_line(" wordfall ", info, app), layout[0]);

    let menu_area = centered_rect(60, 90, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    let footer = footer_line(
        &["[1-9] Category", "[c] Custom sets", "[Enter] Open", "[q] Quit"],
        area.width,
        app,
    );
    frame.render_widget(footer, layout[2]);
}

fn render_set_list(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let category_id = app.category_id.as_deref().unwrap_or_default();
    let title = if app.screen == AppScreen::CustomSets {
        "Custom Sets".to_string()
    } else {
        app.catalog
            .category(category_id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| category_id.to_string())
    };

    let rows = app.set_rows();
    let info = format!(" {title} | {} sets", rows.len());
    frame.render_widget(header_line(" wordfall ", info, app), layout[0]);

    let list_area = centered_rect(60, 90, layout[1]);
    let list = SetList::new(&title, &rows, app.set_selected, app.theme)
        .empty_hint("No custom sets yet. Add them to custom_sets.json or run with --custom FILE.");
    frame.render_widget(list, list_area);

    let footer = footer_line(
        &["[j/k] Move", "[Enter] Play", "[Esc] Home", "[Ctrl-C] Quit"],
        area.width,
        app,
    );
    frame.render_widget(footer, layout[2]);
}

fn render_game(frame: &mut ratatui::Frame, app: &App) {
    let Some(ref game) = app.game else {
        return;
    };
    let area = frame.area();
    let colors = &app.theme.colors;
    let layout = GameLayout::new(area);

    let set = game.set();
    let category = app
        .catalog
        .category(&set.category_id)
        .map(|c| c.title.as_str())
        .unwrap_or("Custom");
    let title = format!(" {category} / {} ", set.set_name);
    let info = format!(
        " Score {}/{} | Word {}/{}",
        game.score(),
        game.max_score(),
        (game.current_index() + 1).min(game.word_count()),
        game.word_count()
    );
    frame.render_widget(header_line(&title, info, app), layout.header);

    frame.render_widget(FallingWord::new(game, app.theme), layout.field);

    let accepting = game.accepts_input();
    let answer_block = Block::bordered()
        .title(" Answer ")
        .border_style(Style::default().fg(if accepting {
            colors.border_focused()
        } else {
            colors.border()
        }));
    let mut spans = vec![Span::styled(game.input(), Style::default().fg(colors.fg()))];
    if accepting {
        spans.push(Span::styled(
            "\u{2588}",
            Style::default().fg(colors.accent()),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(answer_block),
        layout.answer,
    );

    if let Some(progress_area) = layout.progress {
        let done = game.current_index();
        let ratio = done as f64 / game.word_count().max(1) as f64;
        let bar = ProgressBar::new("Words", ratio, app.theme)
            .caption(format!("{done}/{}", game.word_count()));
        frame.render_widget(bar, progress_area);
    }

    let footer = footer_line(
        &[
            "[Enter] Submit",
            "[Ctrl-W] Delete word",
            "[Ctrl-U] Clear",
            "[Esc] Back to sets",
        ],
        area.width,
        app,
    );
    frame.render_widget(footer, layout.footer);
}

fn render_game_over(frame: &mut ratatui::Frame, app: &App) {
    let (Some(game), Some(summary)) = (app.game.as_ref(), app.last_summary.as_ref()) else {
        return;
    };
    let centered = centered_rect(60, 70, frame.area());
    let dashboard = Dashboard::new(&game.set().set_name, summary, app.best_score(), app.theme);
    frame.render_widget(dashboard, centered);
}

fn render_not_found(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let centered = centered_rect(50, 30, frame.area());

    let block = Block::bordered()
        .title(" Set not found ")
        .border_style(Style::default().fg(colors.error()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let message = match app.not_found {
        Some(ref set) => format!(
            "No words found for \"{}\" in \"{}\".",
            set.set_name, set.category_id
        ),
        None => "No words found.".to_string(),
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(colors.fg()))),
        Line::from(""),
        Line::from(Span::styled(
            "[Esc] Back to sets  [h] Home  [q] Quit",
            Style::default().fg(colors.accent()),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(inner, frame.buffer_mut());
}
