//! Command interpreter over the fixed filesystem and simulated network.
//!
//! A [`TerminalSession`] owns all of its state. Rendering layers feed it raw
//! lines, advance its clock, and drain [`TerminalEvent`]s; nothing in here
//! draws or sleeps.

mod commands;
mod schedule;

use std::{
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use log::{debug, info, warn};

pub use schedule::Scheduler;

use crate::{
    config::{Difficulty, Settings, TerminalConfig},
    data::hosts::{Host, MinigameKind},
    error::{CommandError, ConfigError},
};
use commands::Step;

pub const USER_PROMPT: &str = "[USER@SYSTEM]$";
pub const ADMIN_PROMPT: &str = "[ADMIN@SYSTEM]#";

const BOOT_BANNER: &[&str] = &[
    "================================",
    "  CYBER-T SYSTEM INITIALIZATION",
    "================================",
    "",
    "Loading microkernel............ OK",
    "Checking memory................ OK",
    "Initializing devices........... OK",
    "Checking filesystem............ OK",
    "Loading security services...... OK",
    "Connecting to network.......... WARNING",
    "Suspicious packets detected",
    "Packet interception enabled",
    "",
    "System ready. Type \"help\" for a list of commands.",
    "================================",
    "",
];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineStyle {
    #[default]
    Normal,
    /// The prompt plus what the user typed.
    Echo,
    Error,
    Directory,
    File,
    Success,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub style: LineStyle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalEvent {
    Output(OutputLine),
    Clear,
    PromptChanged(String),
    /// The session is suspended until [`TerminalSession::resolve_minigame`].
    LaunchMinigame {
        kind: MinigameKind,
        host: Host,
        difficulty: Difficulty,
    },
    SessionEnded,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MinigameOutcome {
    Success,
    Failure,
}

/// What happened to a submitted line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Dispatched,
    /// Held until the delayed output in flight has played out.
    Queued,
    /// Dropped because a breach minigame is outstanding.
    Busy,
    /// Dropped because the session has ended.
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalState {
    pub booted: bool,
    pub current_directory: String,
    pub admin: bool,
    /// `None` until the first `scan` completes.
    pub discovered_hosts: Option<Vec<Host>>,
    pub current_host: Option<Host>,
    pub history: Vec<String>,
    pub hacked_hosts: Vec<String>,
    pub decrypted_files: Vec<String>,
}

impl TerminalState {
    pub fn new(home_directory: &str) -> Self {
        Self {
            booted: false,
            current_directory: home_directory.to_string(),
            admin: false,
            discovered_hosts: None,
            current_host: None,
            history: Vec::new(),
            hacked_hosts: Vec::new(),
            decrypted_files: Vec::new(),
        }
    }

    pub fn discovered(&self, address: &str) -> Option<&Host> {
        self.discovered_hosts
            .as_ref()?
            .iter()
            .find(|host| host.address == address)
    }
}

pub type CommandHandler = Rc<dyn Fn(&mut TerminalSession, &[String]) -> Result<(), CommandError>>;

#[derive(Clone)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    pub usage: Option<String>,
    handler: CommandHandler,
}

pub struct TerminalSession {
    config: TerminalConfig,
    settings: Settings,
    state: TerminalState,
    prompt: String,
    commands: Vec<CommandSpec>,
    command_index: HashMap<String, usize>,
    scrollback: VecDeque<OutputLine>,
    events: Vec<TerminalEvent>,
    scheduler: Scheduler<Step>,
    queued: VecDeque<String>,
    pending_breach: Option<Host>,
    history_cursor: usize,
    ended: bool,
}

impl TerminalSession {
    pub fn new(config: TerminalConfig) -> Self {
        let settings = config.settings.clone();
        let state = TerminalState::new(&config.home_directory);
        let mut session = Self {
            config,
            settings,
            state,
            prompt: USER_PROMPT.to_string(),
            commands: Vec::new(),
            command_index: HashMap::new(),
            scrollback: VecDeque::new(),
            events: Vec::new(),
            scheduler: Scheduler::default(),
            queued: VecDeque::new(),
            pending_breach: None,
            history_cursor: 0,
            ended: false,
        };
        commands::register_builtins(&mut session);
        session.boot();
        session
    }

    /// Validates the configuration first, so a zero-line scrollback or a
    /// relative home directory never reaches a running session.
    pub fn try_new(config: TerminalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    fn boot(&mut self) {
        self.write_lines(BOOT_BANNER, LineStyle::Normal);
        self.set_prompt(USER_PROMPT);
        self.state.booted = true;
        info!(
            "terminal booted in {} with {} commands",
            self.state.current_directory,
            self.commands.len()
        );
    }

    /// Adds a command, replacing any earlier one with the same name.
    pub fn register_command<F>(
        &mut self,
        name: &str,
        description: &str,
        handler: F,
        usage: Option<&str>,
    ) where
        F: Fn(&mut TerminalSession, &[String]) -> Result<(), CommandError> + 'static,
    {
        let name = name.to_lowercase();
        let spec = CommandSpec {
            name: name.clone(),
            description: description.to_string(),
            usage: usage.map(str::to_string),
            handler: Rc::new(handler),
        };
        match self.command_index.get(&name) {
            Some(&idx) => self.commands[idx] = spec,
            None => {
                self.command_index.insert(name, self.commands.len());
                self.commands.push(spec);
            }
        }
    }

    /// Registered commands in registration order.
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn process_line(&mut self, raw: &str) -> Submission {
        if self.ended {
            self.write_styled("Session closed.", LineStyle::Error);
            return Submission::Closed;
        }
        if self.pending_breach.is_some() {
            self.write_styled(
                "Terminal is busy: a breach is in progress.",
                LineStyle::Error,
            );
            return Submission::Busy;
        }

        let line = raw.trim();
        if !line.is_empty() {
            self.state.history.push(line.to_string());
            self.history_cursor = self.state.history.len();
        }

        if self.is_busy() {
            debug!("queued \"{line}\" behind {} pending steps", self.scheduler.len());
            self.queued.push_back(line.to_string());
            return Submission::Queued;
        }
        self.dispatch(line);
        Submission::Dispatched
    }

    fn dispatch(&mut self, line: &str) {
        let echo = if line.is_empty() {
            self.prompt.clone()
        } else {
            format!("{} {line}", self.prompt)
        };
        self.write_styled(&echo, LineStyle::Echo);

        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return;
        };
        let command = command.to_lowercase();
        let args: Vec<String> = parts.map(str::to_string).collect();

        let Some(&idx) = self.command_index.get(&command) else {
            self.write_styled(
                &format!("Command not found: {command}. Type \"help\" for a list of commands."),
                LineStyle::Error,
            );
            return;
        };
        debug!("dispatching {command} {args:?}");
        let handler = Rc::clone(&self.commands[idx].handler);
        if let Err(err) = handler(self, &args) {
            warn!("command {command} failed: {err}");
            self.write_styled(
                &format!("Command execution error: {err}"),
                LineStyle::Error,
            );
        }
    }

    /// Moves the virtual clock forward, running every step that falls due.
    pub fn advance(&mut self, elapsed_ms: u64) {
        let deadline = self.scheduler.now_ms() + elapsed_ms;
        loop {
            if let Some(step) = self.scheduler.pop_due(deadline) {
                commands::run_step(self, step);
                continue;
            }
            if !self.dispatch_queued() {
                break;
            }
        }
        self.scheduler.settle(deadline);
    }

    /// Runs every delayed step and queued line regardless of time.
    pub fn run_pending(&mut self) {
        loop {
            if let Some(step) = self.scheduler.pop_next() {
                commands::run_step(self, step);
                continue;
            }
            if !self.dispatch_queued() {
                break;
            }
        }
    }

    fn dispatch_queued(&mut self) -> bool {
        if self.ended {
            if !self.queued.is_empty() {
                debug!("dropping {} lines queued past session end", self.queued.len());
                self.queued.clear();
            }
            return false;
        }
        if self.pending_breach.is_some() || !self.scheduler.is_empty() {
            return false;
        }
        match self.queued.pop_front() {
            Some(line) => {
                self.dispatch(&line);
                true
            }
            None => false,
        }
    }

    /// Reports the result of the breach minigame. Returns `false` when no
    /// breach was waiting.
    pub fn resolve_minigame(&mut self, outcome: MinigameOutcome) -> bool {
        let Some(host) = self.pending_breach.take() else {
            warn!("minigame outcome {outcome:?} with no breach pending");
            return false;
        };
        info!("breach of {} resolved: {outcome:?}", host.address);
        commands::finish_breach(self, host, outcome);
        true
    }

    pub fn drain_events(&mut self) -> Vec<TerminalEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn scrollback(&self) -> &VecDeque<OutputLine> {
        &self.scrollback
    }

    pub fn state(&self) -> &TerminalState {
        &self.state
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn pending_breach(&self) -> Option<&Host> {
        self.pending_breach.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        !self.scheduler.is_empty() || !self.queued.is_empty()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Steps back through history, stopping at the oldest entry.
    pub fn history_previous(&mut self) -> Option<&str> {
        if self.state.history.is_empty() {
            return None;
        }
        self.history_cursor = self.history_cursor.saturating_sub(1);
        self.state.history.get(self.history_cursor).map(String::as_str)
    }

    /// Steps forward through history; `None` means the input line is blank.
    pub fn history_next(&mut self) -> Option<&str> {
        if self.history_cursor + 1 < self.state.history.len() {
            self.history_cursor += 1;
            return self.state.history.get(self.history_cursor).map(String::as_str);
        }
        self.history_cursor = self.state.history.len();
        None
    }

    pub(crate) fn config(&self) -> &TerminalConfig {
        &self.config
    }

    pub(crate) fn state_mut(&mut self) -> &mut TerminalState {
        &mut self.state
    }

    /// Prints `text` in the default style. Embedded newlines start new lines.
    pub fn write(&mut self, text: &str) {
        self.write_styled(text, LineStyle::Normal);
    }

    pub fn write_styled(&mut self, text: &str, style: LineStyle) {
        for part in text.split('\n') {
            let line = OutputLine {
                text: part.to_string(),
                style,
            };
            self.scrollback.push_back(line.clone());
            self.events.push(TerminalEvent::Output(line));
        }
        while self.scrollback.len() > self.config.max_lines {
            self.scrollback.pop_front();
        }
    }

    pub fn write_lines(&mut self, lines: &[&str], style: LineStyle) {
        for line in lines {
            self.write_styled(line, style);
        }
    }

    pub(crate) fn clear_screen(&mut self) {
        self.scrollback.clear();
        self.events.push(TerminalEvent::Clear);
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
        self.events.push(TerminalEvent::PromptChanged(self.prompt.clone()));
    }

    pub(crate) fn schedule(&mut self, delay_ms: u64, step: Step) {
        self.scheduler.schedule(delay_ms, step);
    }

    pub(crate) fn begin_breach(&mut self, host: Host, kind: MinigameKind) {
        info!("launching {} minigame against {}", kind.as_str(), host.address);
        self.events.push(TerminalEvent::LaunchMinigame {
            kind,
            host: host.clone(),
            difficulty: self.settings.difficulty,
        });
        self.pending_breach = Some(host);
    }

    pub(crate) fn end(&mut self) {
        info!("terminal session ended");
        self.ended = true;
        self.events.push(TerminalEvent::SessionEnded);
    }
}
