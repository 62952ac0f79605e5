use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::catalog::{
    CUSTOM_CATEGORY, Catalog, CustomSetLibrary, CustomSetReference, CustomSetSlot, WordResolver,
    WordSource,
};
use crate::config::Config;
use crate::engine::schedule::Scheduler;
use crate::session::game::{
    DeferredToken, GameSession, Resolution, SubmitOutcome, TickOutcome,
};
use crate::session::input;
use crate::session::result::SessionSummary;
use crate::session::word::SetRef;
use crate::store::json_store::JsonStore;
use crate::store::progress::{
    CategoryProgress, MemoryProgressStore, ProgressStore, category_progress,
};
use crate::store::schema::ProgressRecord;
use crate::ui::components::menu::{Menu, MenuItem};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Home,
    SetList,
    CustomSets,
    Game,
    GameOver,
    NotFound,
}

/// One row of a set list, built fresh for every frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetRow {
    pub name: String,
    pub word_count: usize,
    pub completed: bool,
    pub best_score: u32,
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub menu: Menu<'static>,
    pub catalog: Catalog,
    pub custom_library: CustomSetLibrary,
    pub custom_slot: CustomSetSlot,
    /// Category whose set list is shown (or was left for the game).
    pub category_id: Option<String>,
    pub set_selected: usize,
    pub game: Option<GameSession>,
    pub last_summary: Option<SessionSummary>,
    pub last_record: Option<ProgressRecord>,
    pub not_found: Option<SetRef>,
    pub should_quit: bool,
    progress: Box<dyn ProgressStore>,
    scheduler: Scheduler<DeferredToken>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let store = match JsonStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(error = %e, "data directory unavailable; progress will not be saved");
                None
            }
        };
        if let Some(ref s) = store {
            if s.check_interrupted_import() {
                warn!("cleaned up files from an interrupted import");
            }
        }

        let custom_sets = match config.custom_sets_path() {
            Some(path) => JsonStore::load_custom_sets_from(&path),
            None => store
                .as_ref()
                .map(JsonStore::load_custom_sets)
                .unwrap_or_default(),
        };

        let progress: Box<dyn ProgressStore> = match store {
            Some(s) => Box::new(s),
            None => Box::new(MemoryProgressStore::new()),
        };

        Self::with_parts(
            config,
            theme,
            Catalog::load(),
            CustomSetLibrary::new(custom_sets),
            progress,
        )
    }

    pub fn with_parts(
        config: Config,
        theme: &'static Theme,
        catalog: Catalog,
        custom_library: CustomSetLibrary,
        progress: Box<dyn ProgressStore>,
    ) -> Self {
        let scheduler = Scheduler::new(config.tick_interval());
        let mut app = Self {
            screen: AppScreen::Home,
            config,
            theme,
            menu: Menu::new(Vec::new(), theme),
            catalog,
            custom_library,
            custom_slot: CustomSetSlot::default(),
            category_id: None,
            set_selected: 0,
            game: None,
            last_summary: None,
            last_record: None,
            not_found: None,
            should_quit: false,
            progress,
            scheduler,
        };
        app.refresh_menu();
        app
    }

    pub fn progress_store(&self) -> &dyn ProgressStore {
        self.progress.as_ref()
    }

    // --- navigation ---

    pub fn go_home(&mut self) {
        self.end_game();
        self.category_id = None;
        self.refresh_menu();
        self.screen = AppScreen::Home;
    }

    pub fn open_category(&mut self, category_id: &str) {
        if self.catalog.category(category_id).is_none() {
            return;
        }
        self.end_game();
        self.category_id = Some(category_id.to_string());
        self.set_selected = 0;
        self.screen = AppScreen::SetList;
    }

    pub fn open_custom_sets(&mut self) {
        self.end_game();
        self.category_id = Some(CUSTOM_CATEGORY.to_string());
        self.set_selected = 0;
        self.screen = AppScreen::CustomSets;
    }

    /// Leave the game (or the not-found screen) for the list it came from.
    pub fn back_to_set_list(&mut self) {
        let origin = self
            .game
            .as_ref()
            .map(|g| g.set().category_id.clone())
            .or_else(|| self.not_found.as_ref().map(|s| s.category_id.clone()))
            .or_else(|| self.category_id.clone());
        match origin.as_deref() {
            Some(CUSTOM_CATEGORY) => self.open_custom_sets(),
            Some(id) if self.catalog.category(id).is_some() => {
                let id = id.to_string();
                let selected = self.set_selected;
                self.open_category(&id);
                self.set_selected = selected.min(self.set_rows().len().saturating_sub(1));
            }
            _ => self.go_home(),
        }
    }

    pub fn menu_activate(&mut self) {
        let selected = self.menu.selected;
        let count = self.catalog.categories().len();
        let id = self.catalog.categories().get(selected).map(|c| c.id.clone());
        match id {
            Some(id) => self.open_category(&id),
            None if selected == count => self.open_custom_sets(),
            None => {}
        }
    }

    pub fn set_next(&mut self) {
        let len = self.set_rows().len();
        if len > 0 {
            self.set_selected = (self.set_selected + 1) % len;
        }
    }

    pub fn set_prev(&mut self) {
        let len = self.set_rows().len();
        if len > 0 {
            self.set_selected = (self.set_selected + len - 1) % len;
        }
    }

    pub fn set_activate(&mut self) {
        let Some(row) = self.set_rows().into_iter().nth(self.set_selected) else {
            return;
        };
        match self.screen {
            AppScreen::CustomSets => {
                self.start_custom_set(&row.name);
            }
            AppScreen::SetList => {
                if let Some(id) = self.category_id.clone() {
                    self.start_game(&id, &row.name);
                }
            }
            _ => {}
        }
    }

    /// Rows for the current set list, with completion and best scores.
    pub fn set_rows(&self) -> Vec<SetRow> {
        let Some(ref id) = self.category_id else {
            return Vec::new();
        };
        let sets: Vec<(String, usize)> = if id == CUSTOM_CATEGORY {
            self.custom_library
                .sets()
                .iter()
                .map(|s| (s.set_name.clone(), s.words.len()))
                .collect()
        } else {
            match self.catalog.category(id) {
                Some(c) => c.sets.iter().map(|s| (s.name.clone(), s.words.len())).collect(),
                None => Vec::new(),
            }
        };

        let names: Vec<&str> = sets.iter().map(|(n, _)| n.as_str()).collect();
        let progress = category_progress(self.progress.as_ref(), id, &names);
        sets.iter()
            .map(|(name, word_count)| SetRow {
                name: name.clone(),
                word_count: *word_count,
                completed: progress.is_completed(name),
                best_score: progress.best_score(name),
            })
            .collect()
    }

    pub fn category_progress(&self, category_id: &str) -> CategoryProgress {
        let names: Vec<String> = if category_id == CUSTOM_CATEGORY {
            self.custom_library
                .sets()
                .iter()
                .map(|s| s.set_name.clone())
                .collect()
        } else {
            self.catalog
                .category(category_id)
                .map(|c| c.sets.iter().map(|s| s.name.clone()).collect())
                .unwrap_or_default()
        };
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        category_progress(self.progress.as_ref(), category_id, &refs)
    }

    fn refresh_menu(&mut self) {
        let mut items: Vec<MenuItem> = Vec::new();
        for (i, category) in self.catalog.categories().iter().enumerate() {
            let progress = self.category_progress(&category.id);
            let key = if i < 9 {
                (i + 1).to_string()
            } else {
                " ".to_string()
            };
            items.push(MenuItem {
                key,
                label: category.title.clone(),
                description: format!(
                    "{}/{} sets completed  {}",
                    progress.completed, progress.total, category.description
                ),
            });
        }
        items.push(MenuItem {
            key: "c".to_string(),
            label: "Custom Sets".to_string(),
            description: format!("{} saved sets", self.custom_library.len()),
        });
        let selected = self.menu.selected.min(items.len().saturating_sub(1));
        self.menu.items = items;
        self.menu.selected = selected;
    }

    // --- game lifecycle ---

    /// Start a session on `(category_id, set_name)`. An unknown set shows the
    /// not-found screen and returns false.
    pub fn start_game(&mut self, category_id: &str, set_name: &str) -> bool {
        self.end_game();
        let set = SetRef::new(category_id, set_name);
        let words = WordResolver {
            catalog: &self.catalog,
            custom: &self.custom_slot,
        }
        .get_words(category_id, set_name);

        match GameSession::new(set.clone(), words, self.config.session_rules()) {
            Some(session) => {
                self.category_id = Some(category_id.to_string());
                self.game = Some(session);
                self.not_found = None;
                self.last_summary = None;
                self.last_record = None;
                self.scheduler.start_ticking(Instant::now());
                self.screen = AppScreen::Game;
                true
            }
            None => {
                warn!(category = %category_id, set = %set_name, "word set not found");
                self.not_found = Some(set);
                self.screen = AppScreen::NotFound;
                false
            }
        }
    }

    /// Stage a saved custom set and play it.
    pub fn start_custom_set(&mut self, set_name: &str) -> bool {
        match self.custom_library.get(set_name) {
            Some(reference) => self.custom_slot.stage(reference),
            None => self.custom_slot.clear(),
        }
        self.start_game(CUSTOM_CATEGORY, set_name)
    }

    /// Stage a set that came from outside the library (e.g. `--custom FILE`),
    /// remember it for this run, and play it.
    pub fn play_custom_reference(&mut self, reference: CustomSetReference) -> bool {
        self.custom_library.insert(&reference);
        let name = reference.set_name.clone();
        self.custom_slot.stage(reference);
        self.start_game(CUSTOM_CATEGORY, &name)
    }

    pub fn restart(&mut self) {
        let Some(ref mut game) = self.game else {
            return;
        };
        if game.restart() {
            self.scheduler.cancel_all();
            self.scheduler.start_ticking(Instant::now());
            self.last_summary = None;
            self.last_record = None;
            self.screen = AppScreen::Game;
        }
    }

    fn end_game(&mut self) {
        self.scheduler.cancel_all();
        if let Some(game) = self.game.take() {
            if !game.is_over() {
                info!(set = %game.set().set_name, index = game.current_index(), "session abandoned");
            }
        }
    }

    // --- answer field ---

    pub fn type_char(&mut self, ch: char) {
        if let Some(ref mut game) = self.game {
            input::process_char(game, ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(ref mut game) = self.game {
            input::process_backspace(game);
        }
    }

    pub fn delete_word(&mut self) {
        if let Some(ref mut game) = self.game {
            input::process_delete_word(game);
        }
    }

    pub fn clear_input(&mut self) {
        if let Some(ref mut game) = self.game {
            input::process_clear(game);
        }
    }

    pub fn submit(&mut self) {
        self.submit_at(Instant::now());
    }

    pub fn submit_at(&mut self, now: Instant) {
        let Some(ref mut game) = self.game else {
            return;
        };
        match game.submit() {
            SubmitOutcome::Correct(deferred) | SubmitOutcome::Incorrect(deferred) => {
                self.scheduler.stop_ticking();
                self.scheduler.defer(now + deferred.delay, deferred.token);
            }
            SubmitOutcome::Ignored => {}
        }
    }

    // --- clock ---

    /// Drive the session clock: fire due deferred transitions, then replay
    /// elapsed fall ticks.
    pub fn on_tick(&mut self, now: Instant) {
        let Some(ref mut game) = self.game else {
            return;
        };

        for token in self.scheduler.take_due(now) {
            match game.resolve(token) {
                Resolution::Stale => {}
                Resolution::Resumed | Resolution::Advanced(_) => {
                    self.scheduler.cancel_all();
                    self.scheduler.start_ticking(now);
                }
                Resolution::Finished(summary) => {
                    self.scheduler.cancel_all();
                    match game.persist_progress(self.progress.as_mut(), Utc::now()) {
                        Ok(record) => self.last_record = record,
                        Err(e) => warn!(error = %e, "failed to save progress"),
                    }
                    self.last_summary = Some(summary);
                    self.screen = AppScreen::GameOver;
                }
            }
        }

        for _ in 0..self.scheduler.due_ticks(now) {
            if let TickOutcome::GroundReached(deferred) = game.tick() {
                self.scheduler.stop_ticking();
                self.scheduler.defer(now + deferred.delay, deferred.token);
                break;
            }
        }
    }

    /// Best stored score for the set of the current (or last) game.
    pub fn best_score(&self) -> Option<u32> {
        let game = self.game.as_ref()?;
        self.progress
            .load(&game.set().progress_key())
            .map(|r| r.score)
    }
}
