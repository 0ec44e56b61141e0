use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::UserDirs;
use log::{debug, error, info, warn};
use ratatui::{DefaultTerminal, Frame, widgets::ListState};

use crate::bell::{Bell, TerminalBell};
use crate::clock::{Clock, SystemClock};
use crate::config::{self, SOUNDS, TICK_RATE, TOPIC_COLORS, find_sound};
use crate::error::{Result, StudyError};
use crate::event::{AppEvent, EventSource};
use crate::models::{SessionCredit, SessionLog, Settings, Topic, TopicId};
use crate::store::{JsonFileStore, Snapshot, SnapshotStore, export_to_dir, import_file};
use crate::timer::{Completion, Mode, SessionEngine, TimerError};
use crate::ui::{
    render_confirm_modal, render_dashboard, render_import_modal, render_settings_modal,
    render_timer, render_topic_modal, render_topics,
};
use crate::validation::{parse_goal_hours, validate_new_topic_name, validate_session_minutes};

/// Minutes added or removed by the +/- keys
const MINUTE_STEP: i64 = 5;

/// The current view/screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Timer,
    Topics,
    Dashboard,
}

impl View {
    pub fn next(&self) -> Self {
        match self {
            View::Timer => View::Topics,
            View::Topics => View::Dashboard,
            View::Dashboard => View::Timer,
        }
    }
}

/// The current modal state - only one modal can be open at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    None,
    Topic,
    Settings,
    Import,
    ConfirmReset,
}

/// Which field is focused in the topic modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopicField {
    #[default]
    Name,
    Color,
    Goal,
}

impl TopicField {
    /// Next field; the name is fixed once a topic exists
    pub fn next(&self, editing: bool) -> Self {
        match self {
            TopicField::Name => TopicField::Color,
            TopicField::Color => TopicField::Goal,
            TopicField::Goal if editing => TopicField::Color,
            TopicField::Goal => TopicField::Name,
        }
    }
}

/// Topic modal state, used for both creating and editing
#[derive(Debug, Clone, Default)]
pub struct TopicForm {
    pub field: TopicField,
    pub name: String,
    pub color_index: usize,
    pub goal: String,
    /// Set when editing an existing topic
    pub editing: Option<TopicId>,
}

/// Which field is focused in the settings modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsField {
    #[default]
    FocusMinutes,
    BreakMinutes,
    AlarmSeconds,
    InfiniteAlarm,
    DailyGoal,
    Sound,
    Theme,
}

impl SettingsField {
    pub fn next(&self) -> Self {
        match self {
            SettingsField::FocusMinutes => SettingsField::BreakMinutes,
            SettingsField::BreakMinutes => SettingsField::AlarmSeconds,
            SettingsField::AlarmSeconds => SettingsField::InfiniteAlarm,
            SettingsField::InfiniteAlarm => SettingsField::DailyGoal,
            SettingsField::DailyGoal => SettingsField::Sound,
            SettingsField::Sound => SettingsField::Theme,
            SettingsField::Theme => SettingsField::FocusMinutes,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SettingsField::FocusMinutes => SettingsField::Theme,
            SettingsField::BreakMinutes => SettingsField::FocusMinutes,
            SettingsField::AlarmSeconds => SettingsField::BreakMinutes,
            SettingsField::InfiniteAlarm => SettingsField::AlarmSeconds,
            SettingsField::DailyGoal => SettingsField::InfiniteAlarm,
            SettingsField::Sound => SettingsField::DailyGoal,
            SettingsField::Theme => SettingsField::Sound,
        }
    }

    /// Fields changed with ←/→ instead of typed
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            SettingsField::InfiniteAlarm | SettingsField::Sound | SettingsField::Theme
        )
    }
}

/// Settings modal state
#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub field: SettingsField,
    pub editing_value: String,
    pub editing: Settings,
}

/// Severity of a footer notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A message shown in the footer until the next key press
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

/// The main application state
pub struct App {
    pub running: bool,
    pub view: View,
    pub modal: ModalState,
    pub engine: SessionEngine,

    // Persisted data
    pub topics: Vec<Topic>,
    pub log: SessionLog,
    pub settings: Settings,

    // Modal state
    pub topic_form: TopicForm,
    pub settings_form: SettingsForm,
    pub import_path: String,

    // Topics view state
    pub topic_list: ListState,

    pub notification: Option<Notification>,

    store: Option<Box<dyn SnapshotStore>>,
    clock: Box<dyn Clock>,
    bell: Box<dyn Bell>,
}

impl App {
    /// Create a new application instance backed by the default data file
    pub fn new() -> color_eyre::Result<Self> {
        let store: Option<Box<dyn SnapshotStore>> = match JsonFileStore::open() {
            Ok(store) => {
                info!("Using data file {}", store.path().display());
                Some(Box::new(store))
            }
            Err(e) => {
                // Continue without persistence
                warn!("Could not open data file: {}", e);
                None
            }
        };

        Ok(Self::with_parts(
            store,
            Box::new(SystemClock),
            Box::new(TerminalBell),
        ))
    }

    /// Create an application from an explicit store, clock and bell
    pub fn with_parts(
        store: Option<Box<dyn SnapshotStore>>,
        clock: Box<dyn Clock>,
        bell: Box<dyn Bell>,
    ) -> Self {
        let settings = Settings::default();
        let mut app = Self {
            running: false,
            view: View::Timer,
            modal: ModalState::None,
            engine: SessionEngine::new(settings.session_defaults(), settings.alarm()),
            topics: Vec::new(),
            log: SessionLog::new(),
            settings,
            topic_form: TopicForm::default(),
            settings_form: SettingsForm::default(),
            import_path: String::new(),
            topic_list: ListState::default(),
            notification: None,
            store,
            clock,
            bell,
        };

        match app.store.as_ref().map(|s| s.load()) {
            Some(Ok(Some(snapshot))) => {
                info!(
                    "Loaded {} topics and {} sessions",
                    snapshot.topics.len(),
                    snapshot.history.len()
                );
                app.apply_snapshot(snapshot);
            }
            Some(Ok(None)) => info!("No saved data, starting fresh"),
            Some(Err(e)) => {
                error!("Failed to load data: {}", e);
                app.notify(NotificationLevel::Error, format!("Failed to load data: {}", e));
            }
            None => {}
        }

        app
    }

    /// Run the application's main loop
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        let mut events = EventSource::new(TICK_RATE);

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            if let Some(event) = events.next()? {
                match event {
                    AppEvent::Key(key) => self.handle_key_event(key),
                    AppEvent::Tick => self.handle_tick(),
                }
            }
        }

        Ok(())
    }

    /// The current local date, used for all statistics
    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    /// Look up a topic by id
    pub fn topic(&self, id: TopicId) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    /// Everything that gets persisted
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            topics: self.topics.clone(),
            history: self.log.records().to_vec(),
            settings: self.settings.clone(),
        }
    }

    /// Render the current view
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        match self.view {
            View::Timer => render_timer(frame, area, self),
            View::Topics => render_topics(frame, area, self),
            View::Dashboard => render_dashboard(frame, area, self),
        }

        // Render modal on top if visible
        match self.modal {
            ModalState::None => {}
            ModalState::Topic => render_topic_modal(frame, area, self),
            ModalState::Settings => render_settings_modal(frame, area, self),
            ModalState::Import => render_import_modal(frame, area, self),
            ModalState::ConfirmReset => render_confirm_modal(frame, area, self),
        }
    }

    /// Handle a key event
    fn handle_key_event(&mut self, key: KeyEvent) {
        self.notification = None;

        // Any key silences a ringing alarm
        if self.engine.alarm_playing() {
            self.engine.stop_alarm();
            return;
        }

        // Handle modal input first
        match self.modal {
            ModalState::Topic => return self.handle_topic_modal_key(key),
            ModalState::Settings => return self.handle_settings_modal_key(key),
            ModalState::Import => return self.handle_import_modal_key(key),
            ModalState::ConfirmReset => return self.handle_confirm_key(key),
            ModalState::None => {}
        }

        // Global keys
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => self.quit(),
            (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => self.quit(),
            (_, KeyCode::Tab) => self.view = self.view.next(),
            (_, KeyCode::Char('1')) => self.view = View::Timer,
            (_, KeyCode::Char('2')) => self.view = View::Topics,
            (_, KeyCode::Char('3')) => self.view = View::Dashboard,
            (_, KeyCode::Char('c')) => self.open_settings(),
            _ => {
                // View-specific keys
                match self.view {
                    View::Timer => self.handle_timer_key(key),
                    View::Topics => self.handle_topics_key(key),
                    View::Dashboard => self.handle_dashboard_key(key),
                }
            }
        }
    }

    /// Handle timer view keys
    fn handle_timer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('s') | KeyCode::Char(' ') => {
                if self.engine.is_running() {
                    self.pause_timer();
                } else {
                    self.start_timer();
                }
            }
            KeyCode::Char('p') => self.pause_timer(),
            KeyCode::Char('r') => self.reset_timer(),
            KeyCode::Char('f') => self.switch_mode(Mode::Focus),
            KeyCode::Char('b') => self.switch_mode(Mode::Break),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_minutes(MINUTE_STEP),
            KeyCode::Char('-') => self.adjust_minutes(-MINUTE_STEP),
            KeyCode::Char(']') => self.cycle_topic(1),
            KeyCode::Char('[') => self.cycle_topic(-1),
            _ => {}
        }
    }

    /// Handle topics view keys
    fn handle_topics_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.topics.len();
                if len > 0 {
                    let i = self.topic_list.selected().map(|i| (i + 1) % len);
                    self.topic_list.select(i.or(Some(0)));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let len = self.topics.len();
                if len > 0 {
                    let i = self
                        .topic_list
                        .selected()
                        .map(|i| if i == 0 { len - 1 } else { i - 1 });
                    self.topic_list.select(i.or(Some(0)));
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.highlighted_topic() {
                    self.select_topic(id);
                }
            }
            KeyCode::Char('n') => self.open_new_topic(),
            KeyCode::Char('e') => self.open_edit_topic(),
            KeyCode::Char('d') => self.delete_highlighted_topic(),
            _ => {}
        }
    }

    /// Handle dashboard keys
    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('i') => {
                self.import_path.clear();
                self.modal = ModalState::Import;
            }
            KeyCode::Char('X') => self.modal = ModalState::ConfirmReset,
            _ => {}
        }
    }

    /// Handle topic modal keys
    fn handle_topic_modal_key(&mut self, key: KeyEvent) {
        let form = &mut self.topic_form;
        match key.code {
            KeyCode::Esc => self.modal = ModalState::None,
            KeyCode::Tab => form.field = form.field.next(form.editing.is_some()),
            KeyCode::Enter => self.submit_topic(),
            KeyCode::Left if form.field == TopicField::Color => {
                form.color_index = form
                    .color_index
                    .checked_sub(1)
                    .unwrap_or(TOPIC_COLORS.len() - 1);
            }
            KeyCode::Right if form.field == TopicField::Color => {
                form.color_index = (form.color_index + 1) % TOPIC_COLORS.len();
            }
            KeyCode::Backspace => match form.field {
                TopicField::Name => {
                    form.name.pop();
                }
                TopicField::Goal => {
                    form.goal.pop();
                }
                TopicField::Color => {}
            },
            KeyCode::Char(c) => match form.field {
                TopicField::Name => form.name.push(c),
                TopicField::Goal if c.is_ascii_digit() || c == '.' => form.goal.push(c),
                _ => {}
            },
            _ => {}
        }
    }

    /// Handle settings modal keys
    fn handle_settings_modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.modal = ModalState::None;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.apply_editing_value();
                self.settings_form.field = self.settings_form.field.next();
                self.settings_form.editing_value = self.get_editing_field_value();
            }
            KeyCode::Up => {
                self.apply_editing_value();
                self.settings_form.field = self.settings_form.field.prev();
                self.settings_form.editing_value = self.get_editing_field_value();
            }
            KeyCode::Enter => {
                self.save_settings();
                self.modal = ModalState::None;
            }
            KeyCode::Left => self.change_choice(false),
            KeyCode::Right | KeyCode::Char(' ') => self.change_choice(true),
            KeyCode::Backspace => {
                self.settings_form.editing_value.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                if !self.settings_form.field.is_choice() {
                    self.settings_form.editing_value.push(c);
                }
            }
            _ => {}
        }
    }

    /// Handle import modal keys
    fn handle_import_modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.modal = ModalState::None,
            KeyCode::Enter => {
                self.modal = ModalState::None;
                let path = expand_home(self.import_path.trim());
                self.import_from(path);
            }
            KeyCode::Backspace => {
                self.import_path.pop();
            }
            KeyCode::Char(c) => self.import_path.push(c),
            _ => {}
        }
    }

    /// Handle the data reset confirmation
    fn handle_confirm_key(&mut self, key: KeyEvent) {
        self.modal = ModalState::None;
        if key.code == KeyCode::Char('y') {
            self.reset_data();
        }
    }

    /// Handle a countdown tick
    fn handle_tick(&mut self) {
        let now = self.clock.now();

        let completion = match self.engine.deadline() {
            // Deadline passed between ticks (suspend, slow terminal)
            Some(deadline) if now >= deadline => self.engine.complete(now),
            _ => self.engine.tick(now),
        };
        if let Some(completion) = completion {
            self.on_completion(completion);
        }

        if self.engine.alarm_playing() {
            if self.engine.poll_alarm(now) {
                debug!("Alarm finished");
            } else {
                self.ring_bell();
            }
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        let message = match completion.finished {
            Mode::Focus => "Focus session complete, time for a break",
            Mode::Break => "Break over, back to focus",
        };
        self.notify(NotificationLevel::Info, message);
        self.record(completion.credit);
    }

    /// Ring the bell with the selected sound
    fn ring_bell(&mut self) {
        let sound = find_sound(&self.settings.selected_sound_id);
        self.bell.ring(sound.pulses);
    }

    /// Start or resume the timer
    fn start_timer(&mut self) {
        match self.engine.start(self.clock.now()) {
            Ok(()) => {}
            Err(TimerError::MissingTopic) => self.notify(
                NotificationLevel::Warning,
                "Select a topic first: [ / ] here or Enter in Topics",
            ),
            Err(e) => self.notify(NotificationLevel::Warning, e.to_string()),
        }
    }

    /// Pause the timer, crediting the minutes studied so far
    fn pause_timer(&mut self) {
        let was_focus = self.engine.mode() == Mode::Focus;
        match self.engine.pause(self.clock.now()) {
            Ok(credit) => {
                if was_focus && credit.is_none() {
                    debug!("Paused within the first minute, nothing credited");
                }
                self.record(credit);
            }
            Err(e) => debug!("Pause ignored: {}", e),
        }
    }

    fn reset_timer(&mut self) {
        if let Err(e) = self.engine.reset() {
            self.notify(NotificationLevel::Warning, e.to_string());
        }
    }

    /// Switch to a phase with its default length
    fn switch_mode(&mut self, mode: Mode) {
        let minutes = self.engine.defaults().minutes_for(mode);
        if let Err(e) = self.engine.configure(mode, minutes) {
            self.notify(NotificationLevel::Warning, e.to_string());
        }
    }

    /// Change the current phase length by `delta` minutes
    fn adjust_minutes(&mut self, delta: i64) {
        let minutes = (i64::from(self.engine.configured_minutes()) + delta).clamp(1, 600) as u32;
        if let Err(e) = self.engine.configure(self.engine.mode(), minutes) {
            self.notify(NotificationLevel::Warning, e.to_string());
        }
    }

    /// Select the next or previous topic for the timer
    fn cycle_topic(&mut self, step: isize) {
        if self.topics.is_empty() {
            self.notify(NotificationLevel::Warning, "Create a topic first (Topics view)");
            return;
        }

        let len = self.topics.len() as isize;
        let current = self
            .engine
            .selected_topic()
            .and_then(|id| self.topics.iter().position(|t| t.id == id));
        let next = match current {
            Some(i) => (i as isize + step).rem_euclid(len) as usize,
            None => 0,
        };
        self.select_topic(self.topics[next].id);
    }

    fn select_topic(&mut self, id: TopicId) {
        if let Err(e) = self.engine.select_topic(Some(id)) {
            self.notify(NotificationLevel::Warning, e.to_string());
        }
    }

    fn highlighted_topic(&self) -> Option<TopicId> {
        self.topic_list
            .selected()
            .and_then(|i| self.topics.get(i))
            .map(|t| t.id)
    }

    fn open_new_topic(&mut self) {
        self.topic_form = TopicForm {
            color_index: self.topics.len() % TOPIC_COLORS.len(),
            ..TopicForm::default()
        };
        self.modal = ModalState::Topic;
    }

    fn open_edit_topic(&mut self) {
        let Some(topic) = self.highlighted_topic().and_then(|id| self.topic(id)) else {
            return;
        };

        self.topic_form = TopicForm {
            field: TopicField::Color,
            name: topic.name.clone(),
            color_index: TOPIC_COLORS
                .iter()
                .position(|c| c.eq_ignore_ascii_case(&topic.color))
                .unwrap_or(0),
            goal: match topic.goal_hours {
                Some(hours) if topic.has_goal => hours.to_string(),
                _ => String::new(),
            },
            editing: Some(topic.id),
        };
        self.modal = ModalState::Topic;
    }

    /// Create or update a topic from the modal
    fn submit_topic(&mut self) {
        let goal = match parse_goal_hours(&self.topic_form.goal) {
            Ok(goal) => goal,
            Err(msg) => return self.notify(NotificationLevel::Warning, msg),
        };
        let color = TOPIC_COLORS[self.topic_form.color_index % TOPIC_COLORS.len()];

        if let Some(id) = self.topic_form.editing {
            if let Some(topic) = self.topics.iter_mut().find(|t| t.id == id) {
                topic.color = color.to_string();
                topic.set_goal(goal);
                info!("Updated topic {}", topic.name);
            }
        } else {
            let name = self.topic_form.name.clone();
            if let Err(e) = self.create_topic(&name, color, goal) {
                return self.notify(NotificationLevel::Warning, e.to_string());
            }
        }

        self.modal = ModalState::None;
        self.persist();
    }

    /// Add a topic with a unique, trimmed name. The timer picks it up when
    /// nothing is selected yet.
    fn create_topic(&mut self, name: &str, color: &str, goal: Option<f64>) -> Result<TopicId> {
        let name = name.trim();
        validate_new_topic_name(name, &self.topics).map_err(StudyError::Invalid)?;

        let id = TopicId::next(&self.topics, self.clock.now());
        info!("Created topic {} ({})", name, id);
        self.topics.push(Topic::new(id, name, color).with_goal(goal));
        self.topic_list.select(Some(self.topics.len() - 1));

        if self.engine.selected_topic().is_none() && !self.engine.is_running() {
            self.engine.select_topic(Some(id))?;
        }
        Ok(id)
    }

    /// Delete the highlighted topic. Its history stays in the log.
    fn delete_highlighted_topic(&mut self) {
        let Some(index) = self.topic_list.selected().filter(|&i| i < self.topics.len()) else {
            return;
        };

        let topic = self.topics.remove(index);
        info!("Deleted topic {} ({})", topic.name, topic.id);

        if self.engine.selected_topic() == Some(topic.id) && !self.engine.is_running() {
            let _ = self.engine.select_topic(None);
        }

        let selected = match self.topics.len() {
            0 => None,
            len => Some(index.min(len - 1)),
        };
        self.topic_list.select(selected);

        self.notify(
            NotificationLevel::Info,
            format!("Deleted {}, its sessions stay in history", topic.name),
        );
        self.persist();
    }

    fn open_settings(&mut self) {
        self.settings_form = SettingsForm {
            field: SettingsField::FocusMinutes,
            editing_value: String::new(),
            editing: self.settings.clone(),
        };
        self.settings_form.editing_value = self.get_editing_field_value();
        self.modal = ModalState::Settings;
    }

    /// Get the current value for the selected settings field
    fn get_editing_field_value(&self) -> String {
        let editing = &self.settings_form.editing;
        match self.settings_form.field {
            SettingsField::FocusMinutes => editing.focus_minutes.to_string(),
            SettingsField::BreakMinutes => editing.break_minutes.to_string(),
            SettingsField::AlarmSeconds => editing.alarm_duration.to_string(),
            SettingsField::DailyGoal => editing.daily_goal_hours.to_string(),
            SettingsField::InfiniteAlarm | SettingsField::Sound | SettingsField::Theme => {
                String::new()
            }
        }
    }

    /// Apply the current editing value to the edited settings
    fn apply_editing_value(&mut self) {
        let form = &mut self.settings_form;
        let value = form.editing_value.trim();
        match form.field {
            SettingsField::FocusMinutes | SettingsField::BreakMinutes => {
                if let Ok(minutes) = value.parse::<u32>()
                    && validate_session_minutes(minutes).is_ok()
                {
                    if form.field == SettingsField::FocusMinutes {
                        form.editing.focus_minutes = minutes;
                    } else {
                        form.editing.break_minutes = minutes;
                    }
                }
            }
            SettingsField::AlarmSeconds => {
                if let Ok(secs) = value.parse::<u32>()
                    && secs > 0
                {
                    form.editing.alarm_duration = secs;
                }
            }
            SettingsField::DailyGoal => {
                if let Ok(hours) = value.parse::<f64>()
                    && (0.0..=24.0).contains(&hours)
                {
                    form.editing.daily_goal_hours = hours;
                }
            }
            SettingsField::InfiniteAlarm | SettingsField::Sound | SettingsField::Theme => {}
        }
    }

    /// Cycle a choice field
    fn change_choice(&mut self, forward: bool) {
        let editing = &mut self.settings_form.editing;
        match self.settings_form.field {
            SettingsField::InfiniteAlarm => editing.infinite_alarm = !editing.infinite_alarm,
            SettingsField::Theme => editing.theme = editing.theme.toggle(),
            SettingsField::Sound => {
                let current = SOUNDS
                    .iter()
                    .position(|s| s.id == editing.selected_sound_id)
                    .unwrap_or(0);
                let next = if forward {
                    (current + 1) % SOUNDS.len()
                } else {
                    current.checked_sub(1).unwrap_or(SOUNDS.len() - 1)
                };
                editing.selected_sound_id = SOUNDS[next].id.to_string();
            }
            _ => {}
        }
    }

    /// Save all settings and apply them to the engine
    fn save_settings(&mut self) {
        // Apply the current field's value before committing
        self.apply_editing_value();
        self.settings = self.settings_form.editing.clone();

        self.engine.apply_defaults(self.settings.session_defaults());
        self.engine.set_alarm_duration(self.settings.alarm());
        info!("Settings saved");

        self.persist();
    }

    /// Write an export file to the export directory
    fn export(&mut self) {
        let result = config::get_export_dir()
            .and_then(|dir| export_to_dir(&dir, &self.snapshot(), self.clock.now()));
        match result {
            Ok(path) => self.notify(
                NotificationLevel::Info,
                format!("Exported to {}", path.display()),
            ),
            Err(e) => {
                error!("Export failed: {}", e);
                self.notify(NotificationLevel::Error, format!("Export failed: {}", e));
            }
        }
    }

    /// Replace topics, history and settings with an imported file
    fn import_from(&mut self, path: PathBuf) {
        match self.try_import(&path) {
            Ok(()) => self.notify(
                NotificationLevel::Info,
                format!("Imported {}", path.display()),
            ),
            Err(e) => {
                // In-memory data stays untouched
                error!("Import of {} failed: {}", path.display(), e);
                self.notify(NotificationLevel::Error, format!("Import failed: {}", e));
            }
        }
    }

    fn try_import(&mut self, path: &Path) -> Result<()> {
        if self.engine.is_running() {
            return Err(TimerError::Running.into());
        }
        let snapshot = import_file(path)?;
        self.apply_snapshot(snapshot);
        self.persist();
        Ok(())
    }

    /// Clear all topics and history; settings are kept
    fn reset_data(&mut self) {
        if self.engine.is_running() {
            self.notify(NotificationLevel::Warning, TimerError::Running.to_string());
            return;
        }

        warn!(
            "Resetting data: {} topics, {} sessions",
            self.topics.len(),
            self.log.len()
        );
        self.topics.clear();
        self.log.clear();
        self.topic_list.select(None);
        let _ = self.engine.select_topic(None);

        self.notify(NotificationLevel::Info, "All topics and history cleared");
        self.persist();
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.topics = snapshot.topics;
        self.log = SessionLog::from_records(snapshot.history);
        self.settings = snapshot.settings;

        self.engine.apply_defaults(self.settings.session_defaults());
        self.engine.set_alarm_duration(self.settings.alarm());

        if let Some(id) = self.engine.selected_topic()
            && self.topic(id).is_none()
        {
            let _ = self.engine.select_topic(None);
        }

        let selected = if self.topics.is_empty() { None } else { Some(0) };
        self.topic_list.select(selected);
    }

    /// Store a credited session and save
    fn record(&mut self, credit: Option<SessionCredit>) {
        let Some(credit) = credit else {
            return;
        };
        let Some(record) = self.log.record(credit, self.clock.now()) else {
            return;
        };
        info!(
            "Recorded {} min for topic {} on {}",
            record.minutes, record.topic_id, record.date
        );

        self.persist();
    }

    /// Save the snapshot, reporting failures in the footer
    fn persist(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(&self.snapshot()) {
            error!("Failed to save data: {}", e);
            self.notify(NotificationLevel::Error, format!("Failed to save data: {}", e));
        }
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            level,
        });
    }

    /// Quit the application, crediting a running focus session first
    fn quit(&mut self) {
        if self.engine.is_running() {
            self.pause_timer();
        }
        self.running = false;
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(dirs) = UserDirs::new()
    {
        return dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bell::RecordingBell;
    use crate::clock::FixedClock;
    use crate::models::{SessionId, SessionRecord, Theme};
    use crate::store::MemoryStore;
    use chrono::{Duration, Local, NaiveDate, TimeZone};
    use crossterm::event::KeyEventKind;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        let mut event = KeyEvent::new(code, KeyModifiers::NONE);
        event.kind = KeyEventKind::Press;
        event
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    fn make_app() -> (App, MemoryStore, FixedClock) {
        let (app, store, clock, _) = make_app_with_bell();
        (app, store, clock)
    }

    fn make_app_with_bell() -> (App, MemoryStore, FixedClock, RecordingBell) {
        let store = MemoryStore::default();
        let clock = FixedClock::at(Local.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap());
        let bell = RecordingBell::default();
        let app = App::with_parts(
            Some(Box::new(store.clone())),
            Box::new(clock.clone()),
            Box::new(bell.clone()),
        );
        (app, store, clock, bell)
    }

    fn add_topic(app: &mut App, name: &str) {
        app.view = View::Topics;
        app.handle_key_event(key(KeyCode::Char('n')));
        type_text(app, name);
        app.handle_key_event(key(KeyCode::Enter));
    }

    #[test]
    fn test_create_topic_selects_it_and_saves() {
        let (mut app, store, _) = make_app();
        add_topic(&mut app, "Math");

        assert_eq!(app.modal, ModalState::None);
        assert_eq!(app.topics.len(), 1);
        assert_eq!(app.engine.active_topic(), Some(app.topics[0].id));

        let saved = store.saved.borrow().clone().unwrap();
        assert_eq!(saved.topics[0].name, "Math");
    }

    #[test]
    fn test_create_topic_with_empty_name_keeps_modal_open() {
        let (mut app, _, _) = make_app();
        add_topic(&mut app, "   ");

        assert_eq!(app.modal, ModalState::Topic);
        assert!(app.topics.is_empty());
        assert_eq!(
            app.notification.as_ref().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
    }

    #[test]
    fn test_start_without_topic_warns() {
        let (mut app, _, _) = make_app();
        app.handle_key_event(key(KeyCode::Char('s')));

        assert!(!app.engine.is_running());
        assert_eq!(
            app.notification.as_ref().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
    }

    #[test]
    fn test_full_focus_session_is_recorded() {
        let (mut app, store, clock) = make_app();
        add_topic(&mut app, "Math");
        app.view = View::Timer;

        app.handle_key_event(key(KeyCode::Char('s')));
        assert!(app.engine.is_running());

        clock.advance(Duration::minutes(25));
        app.handle_tick();

        assert_eq!(app.engine.mode(), Mode::Break);
        assert!(app.engine.alarm_playing());
        assert_eq!(app.log.len(), 1);

        let record = &app.log.records()[0];
        assert_eq!(record.minutes, 25);
        assert_eq!(record.topic_id, app.topics[0].id);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        let saved = store.saved.borrow().clone().unwrap();
        assert_eq!(saved.history.len(), 1);

        // Any key stops the alarm without doing anything else
        app.handle_key_event(key(KeyCode::Char('s')));
        assert!(!app.engine.alarm_playing());
        assert!(!app.engine.is_running());
    }

    #[test]
    fn test_pause_in_first_minute_records_nothing() {
        let (mut app, _, clock) = make_app();
        add_topic(&mut app, "Math");
        app.view = View::Timer;

        app.handle_key_event(key(KeyCode::Char('s')));
        clock.advance(Duration::seconds(40));
        app.handle_key_event(key(KeyCode::Char('p')));

        assert!(!app.engine.is_running());
        assert!(app.log.is_empty());
    }

    #[test]
    fn test_quit_credits_running_session() {
        let (mut app, _, clock) = make_app();
        add_topic(&mut app, "Math");
        app.view = View::Timer;
        app.running = true;

        app.handle_key_event(key(KeyCode::Char('s')));
        clock.advance(Duration::minutes(12));
        app.handle_key_event(key(KeyCode::Char('q')));

        assert!(!app.running);
        assert_eq!(app.log.records()[0].minutes, 12);
    }

    #[test]
    fn test_mode_switch_rejected_while_running() {
        let (mut app, _, _) = make_app();
        add_topic(&mut app, "Math");
        app.view = View::Timer;

        app.handle_key_event(key(KeyCode::Char('s')));
        app.handle_key_event(key(KeyCode::Char('b')));

        assert_eq!(app.engine.mode(), Mode::Focus);
        assert!(app.engine.is_running());
    }

    #[test]
    fn test_adjust_minutes() {
        let (mut app, _, _) = make_app();
        app.handle_key_event(key(KeyCode::Char('+')));
        assert_eq!(app.engine.configured_minutes(), 30);
        for _ in 0..10 {
            app.handle_key_event(key(KeyCode::Char('-')));
        }
        assert_eq!(app.engine.configured_minutes(), 1);
    }

    #[test]
    fn test_delete_topic_keeps_history() {
        let (mut app, store, clock) = make_app();
        add_topic(&mut app, "Math");
        app.view = View::Timer;
        app.handle_key_event(key(KeyCode::Char('s')));
        clock.advance(Duration::minutes(25));
        app.handle_tick();
        app.handle_key_event(key(KeyCode::Esc)); // silence alarm

        app.view = View::Topics;
        app.topic_list.select(Some(0));
        app.handle_key_event(key(KeyCode::Char('d')));

        assert!(app.topics.is_empty());
        assert_eq!(app.engine.selected_topic(), None);
        assert_eq!(app.log.len(), 1);

        let saved = store.saved.borrow().clone().unwrap();
        assert!(saved.topics.is_empty());
        assert_eq!(saved.history.len(), 1);
    }

    #[test]
    fn test_edit_topic_goal_and_color() {
        let (mut app, _, _) = make_app();
        add_topic(&mut app, "Math");
        app.topic_list.select(Some(0));

        app.handle_key_event(key(KeyCode::Char('e')));
        assert_eq!(app.topic_form.field, TopicField::Color);
        app.handle_key_event(key(KeyCode::Right));
        app.handle_key_event(key(KeyCode::Tab));
        type_text(&mut app, "6");
        app.handle_key_event(key(KeyCode::Enter));

        let topic = &app.topics[0];
        assert_eq!(topic.name, "Math");
        assert_eq!(topic.color, TOPIC_COLORS[1]);
        assert_eq!(topic.weekly_goal_minutes(), Some(360));
    }

    #[test]
    fn test_cycle_topic() {
        let (mut app, _, _) = make_app();
        add_topic(&mut app, "Math");
        add_topic(&mut app, "History");
        app.view = View::Timer;

        assert_eq!(app.engine.selected_topic(), Some(app.topics[0].id));
        app.handle_key_event(key(KeyCode::Char(']')));
        assert_eq!(app.engine.selected_topic(), Some(app.topics[1].id));
        app.handle_key_event(key(KeyCode::Char(']')));
        assert_eq!(app.engine.selected_topic(), Some(app.topics[0].id));
        app.handle_key_event(key(KeyCode::Char('[')));
        assert_eq!(app.engine.selected_topic(), Some(app.topics[1].id));
    }

    #[test]
    fn test_settings_save_applies_to_engine() {
        let (mut app, store, _) = make_app();
        app.handle_key_event(key(KeyCode::Char('c')));
        assert_eq!(app.modal, ModalState::Settings);

        // Focus minutes: replace 25 with 45
        app.handle_key_event(key(KeyCode::Backspace));
        app.handle_key_event(key(KeyCode::Backspace));
        type_text(&mut app, "45");

        // Move to the theme and toggle it
        for _ in 0..6 {
            app.handle_key_event(key(KeyCode::Down));
        }
        assert_eq!(app.settings_form.field, SettingsField::Theme);
        app.handle_key_event(key(KeyCode::Right));
        app.handle_key_event(key(KeyCode::Enter));

        assert_eq!(app.settings.focus_minutes, 45);
        assert_eq!(app.settings.theme, Theme::Light);
        assert_eq!(app.engine.configured_minutes(), 45);

        let saved = store.saved.borrow().clone().unwrap();
        assert_eq!(saved.settings.focus_minutes, 45);
    }

    #[test]
    fn test_settings_cancel_discards_changes() {
        let (mut app, _, _) = make_app();
        app.handle_key_event(key(KeyCode::Char('c')));
        type_text(&mut app, "0");
        app.handle_key_event(key(KeyCode::Esc));

        assert_eq!(app.settings.focus_minutes, 25);
        assert_eq!(app.modal, ModalState::None);
    }

    #[test]
    fn test_settings_rejects_invalid_minutes() {
        let (mut app, _, _) = make_app();
        app.handle_key_event(key(KeyCode::Char('c')));
        app.handle_key_event(key(KeyCode::Backspace));
        app.handle_key_event(key(KeyCode::Backspace));
        type_text(&mut app, "0");
        app.handle_key_event(key(KeyCode::Enter));

        assert_eq!(app.settings.focus_minutes, 25);
    }

    #[test]
    fn test_load_restores_saved_snapshot() {
        let store = MemoryStore::default();
        let snapshot = Snapshot {
            topics: vec![Topic::new(TopicId(1), "Math", "#60A5FA")],
            history: vec![SessionRecord {
                id: SessionId(5),
                topic_id: TopicId(1),
                minutes: 50,
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            }],
            settings: Settings {
                break_minutes: 15,
                ..Settings::default()
            },
        };
        store.save(&snapshot).unwrap();

        let clock = FixedClock::at(Local.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap());
        let app = App::with_parts(
            Some(Box::new(store)),
            Box::new(clock),
            Box::new(RecordingBell::default()),
        );

        assert_eq!(app.snapshot(), snapshot);
        assert_eq!(app.engine.defaults().break_minutes, 15);
        assert_eq!(app.topic_list.selected(), Some(0));
    }

    #[test]
    fn test_import_malformed_file_keeps_state() {
        let (mut app, _, _) = make_app();
        add_topic(&mut app, "Math");

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{ nope").unwrap();

        app.import_from(path);
        assert_eq!(app.topics.len(), 1);
        assert_eq!(
            app.notification.as_ref().map(|n| n.level),
            Some(NotificationLevel::Error)
        );
    }

    #[test]
    fn test_import_replaces_data() {
        let (mut app, store, _) = make_app();
        add_topic(&mut app, "Math");

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("backup.json");
        let imported = Snapshot {
            topics: vec![Topic::new(TopicId(42), "Biology", "#34D399")],
            ..Snapshot::default()
        };
        let now = Local.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        std::fs::write(&path, imported.export(now).unwrap()).unwrap();

        app.import_from(path);
        assert_eq!(app.topics[0].name, "Biology");
        // The previously selected topic no longer exists
        assert_eq!(app.engine.selected_topic(), None);
        assert_eq!(store.saved.borrow().clone().unwrap(), imported);
    }

    #[test]
    fn test_reset_data_requires_confirmation() {
        let (mut app, _, _) = make_app();
        add_topic(&mut app, "Math");
        app.view = View::Dashboard;

        app.handle_key_event(key(KeyCode::Char('X')));
        app.handle_key_event(key(KeyCode::Char('n')));
        assert_eq!(app.topics.len(), 1);

        app.handle_key_event(key(KeyCode::Char('X')));
        app.handle_key_event(key(KeyCode::Char('y')));
        assert!(app.topics.is_empty());
        assert!(app.log.is_empty());
    }

    #[test]
    fn test_alarm_expires_on_tick() {
        let (mut app, _, clock) = make_app();
        app.engine.configure(Mode::Break, 1).unwrap();
        app.engine.start(clock.now()).unwrap();

        clock.advance(Duration::minutes(1));
        app.handle_tick();
        assert!(app.engine.alarm_playing());
        assert_eq!(app.engine.mode(), Mode::Focus);
        assert!(app.log.is_empty());

        clock.advance(Duration::seconds(i64::from(config::DEFAULT_ALARM_SECONDS)));
        app.handle_tick();
        assert!(!app.engine.alarm_playing());
    }

    #[test]
    fn test_bell_rings_each_tick_while_alarm_plays() {
        let (mut app, _, clock, bell) = make_app_with_bell();
        app.settings.selected_sound_id = "double".to_string();
        app.engine.configure(Mode::Break, 1).unwrap();
        app.engine.start(clock.now()).unwrap();

        app.handle_tick();
        assert_eq!(bell.pulses(), 0);

        clock.advance(Duration::minutes(1));
        app.handle_tick();
        assert_eq!(bell.pulses(), 2);

        clock.advance(Duration::seconds(1));
        app.handle_tick();
        assert_eq!(bell.pulses(), 4);

        // Stopping the alarm silences later ticks
        app.handle_key_event(key(KeyCode::Char('x')));
        clock.advance(Duration::seconds(1));
        app.handle_tick();
        assert_eq!(bell.pulses(), 4);
    }

    #[test]
    fn test_view_navigation() {
        let (mut app, _, _) = make_app();
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.view, View::Topics);
        app.handle_key_event(key(KeyCode::Char('3')));
        assert_eq!(app.view, View::Dashboard);
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.view, View::Timer);
    }
}
