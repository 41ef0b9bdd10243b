// App state and main event loop.
// Dispatches fetches to background tasks and routes keyboard input to the panes.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::cache::ResourceType;
use crate::error::Result;
use crate::github::{GitHubClient, RateLimit, RepoId};
use crate::state::{
    Activation, Completion, DEFAULT_BRANCH, ExplorerState, FetchOutcome, LoadingState, Lookup,
    RepositoryDataController, perform,
};
use crate::ui;

/// Pane receiving navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Tree,
    Viewer,
}

impl Focus {
    pub fn toggle(&self) -> Self {
        match self {
            Focus::Tree => Focus::Viewer,
            Focus::Viewer => Focus::Tree,
        }
    }
}

/// A finished background fetch.
struct FetchMessage {
    outcome: FetchOutcome,
    rate_limit: RateLimit,
}

/// Main application state.
pub struct App {
    pub controller: RepositoryDataController,
    pub explorer: ExplorerState,
    client: GitHubClient,
    /// Rate limit reported by the most recent response.
    pub rate_limit: RateLimit,
    pub focus: Focus,
    /// Vertical scroll offset of the file viewer.
    pub viewer_scroll: u16,
    /// Selected index while the branch picker is open.
    pub branch_picker: Option<usize>,
    /// Text typed into the open-repository prompt while it is shown.
    pub repo_prompt: Option<String>,
    /// Why the last submitted repository was rejected.
    pub prompt_error: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
    fetch_tx: UnboundedSender<FetchMessage>,
    fetch_rx: UnboundedReceiver<FetchMessage>,
}

impl App {
    pub fn new(controller: RepositoryDataController, client: GitHubClient) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            explorer: ExplorerState::new(),
            client,
            rate_limit: RateLimit::default(),
            focus: Focus::default(),
            viewer_scroll: 0,
            branch_picker: None,
            repo_prompt: None,
            prompt_error: None,
            show_help: false,
            should_quit: false,
            fetch_tx,
            fetch_rx,
        }
    }

    /// Main event loop. Must run inside a tokio runtime.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        self.load_repository();

        while !self.should_quit {
            self.drain_fetches();
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events()?;
        }
        Ok(())
    }

    /// Request structure and branches for the active repository.
    pub fn load_repository(&mut self) {
        let structure = self.controller.request_structure();
        self.dispatch(ResourceType::Structure, structure);
        let branches = self.controller.request_branches();
        self.dispatch(ResourceType::Branches, branches);
    }

    fn open_file(&mut self, path: &str) {
        self.viewer_scroll = 0;
        let lookup = self.controller.request_content(path);
        self.dispatch(ResourceType::Content, lookup);
    }

    /// Replace the active repository, starting on the default branch.
    fn open_repository(&mut self, repo: RepoId) {
        self.controller.open_repository(repo, DEFAULT_BRANCH);
        self.explorer = ExplorerState::new();
        self.focus = Focus::Tree;
        self.viewer_scroll = 0;
        self.load_repository();
    }

    fn switch_branch(&mut self, branch: &str) {
        if self.controller.switch_branch(branch) {
            self.explorer.clear();
            self.viewer_scroll = 0;
            self.load_repository();
        }
    }

    fn refresh(&mut self) {
        self.controller.refresh();
        self.explorer.clear();
        self.viewer_scroll = 0;
        self.load_repository();
    }

    /// Apply a cache hit now, or start the fetch in the background.
    fn dispatch(&mut self, resource: ResourceType, lookup: Result<Lookup>) {
        match lookup {
            Ok(Lookup::Cached) if resource == ResourceType::Structure => self.sync_tree(),
            Ok(Lookup::Cached) => {}
            Ok(Lookup::Fetch(ticket)) => {
                let mut client = self.client.clone();
                let tx = self.fetch_tx.clone();
                tokio::spawn(async move {
                    let outcome = perform(&mut client, ticket).await;
                    let rate_limit = client.rate_limit().clone();
                    // Receiver only goes away on shutdown
                    let _ = tx.send(FetchMessage {
                        outcome,
                        rate_limit,
                    });
                });
            }
            Err(e) => tracing::warn!(error = %e, "request not issued"),
        }
    }

    /// Apply finished fetches.
    fn drain_fetches(&mut self) {
        while let Ok(message) = self.fetch_rx.try_recv() {
            if message.rate_limit.limit > 0 {
                self.rate_limit = message.rate_limit;
            }

            let resource = message.outcome.ticket.resource();
            let completion = self.controller.complete(message.outcome);
            if completion == Completion::Applied && resource == ResourceType::Structure {
                self.sync_tree();
            }
        }
    }

    /// Rebuild the tree from the controller's current structure.
    fn sync_tree(&mut self) {
        match self.controller.entries() {
            Some(entries) => self.explorer.rebuild(entries),
            None => self.explorer.clear(),
        }
    }

    /// Handle keyboard and other events.
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.branch_picker.is_some() {
            self.handle_branch_picker_key(key.code);
            return;
        }

        if self.repo_prompt.is_some() {
            self.handle_repo_prompt_key(key.code);
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab | KeyCode::BackTab => self.focus = self.focus.toggle(),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('b') => self.open_branch_picker(),
            KeyCode::Char('o') => {
                self.repo_prompt = Some(String::new());
                self.prompt_error = None;
            }
            _ => match self.focus {
                Focus::Tree => self.handle_tree_key(key.code),
                Focus::Viewer => self.handle_viewer_key(key),
            },
        }
    }

    fn handle_tree_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.explorer.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.explorer.select_next(),
            KeyCode::Home | KeyCode::Char('g') => self.explorer.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.explorer.select_last(),
            KeyCode::Right | KeyCode::Char('l') => self.explorer.expand_selected(),
            KeyCode::Left | KeyCode::Char('h') => self.explorer.collapse_selected(),
            KeyCode::Char('C') => self.explorer.collapse_all(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(Activation::OpenFile(path)) = self.explorer.activate_selected() {
                    self.open_file(&path);
                }
            }
            _ => {}
        }
    }

    fn handle_viewer_key(&mut self, key: KeyEvent) {
        let page = 20;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_viewer(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_viewer(1),
            KeyCode::PageUp => self.scroll_viewer(-page),
            KeyCode::PageDown => self.scroll_viewer(page),
            KeyCode::Char('u') if ctrl => self.scroll_viewer(-page),
            KeyCode::Char('d') if ctrl => self.scroll_viewer(page),
            KeyCode::Home | KeyCode::Char('g') => self.viewer_scroll = 0,
            KeyCode::End | KeyCode::Char('G') => self.viewer_scroll = self.viewer_max_scroll(),
            KeyCode::Esc => self.focus = Focus::Tree,
            _ => {}
        }
    }

    fn viewer_max_scroll(&self) -> u16 {
        self.controller
            .content()
            .data()
            .map(|view| view.content.lines().count().saturating_sub(1))
            .map(|lines| u16::try_from(lines).unwrap_or(u16::MAX))
            .unwrap_or(0)
    }

    fn scroll_viewer(&mut self, delta: i32) {
        let next = (i32::from(self.viewer_scroll) + delta).max(0);
        let next = u16::try_from(next).unwrap_or(u16::MAX);
        self.viewer_scroll = next.min(self.viewer_max_scroll());
    }

    fn open_branch_picker(&mut self) {
        if matches!(
            self.controller.branches(),
            LoadingState::Idle | LoadingState::Error(_)
        ) {
            let lookup = self.controller.request_branches();
            self.dispatch(ResourceType::Branches, lookup);
        }

        let current = self.controller.branch().to_string();
        let selection = self
            .controller
            .branches()
            .data()
            .and_then(|branches| branches.iter().position(|b| b.name == current))
            .unwrap_or(0);
        self.branch_picker = Some(selection);
    }

    fn handle_branch_picker_key(&mut self, code: KeyCode) {
        let count = self
            .controller
            .branches()
            .data()
            .map(|branches| branches.len())
            .unwrap_or(0);
        let Some(selection) = self.branch_picker else {
            return;
        };

        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.branch_picker = None,
            KeyCode::Up | KeyCode::Char('k') => {
                self.branch_picker = Some(selection.saturating_sub(1));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if selection + 1 < count {
                    self.branch_picker = Some(selection + 1);
                }
            }
            KeyCode::Enter => {
                let chosen = self
                    .controller
                    .branches()
                    .data()
                    .and_then(|branches| branches.get(selection))
                    .map(|branch| branch.name.clone());
                self.branch_picker = None;
                if let Some(branch) = chosen {
                    self.switch_branch(&branch);
                }
            }
            _ => {}
        }
    }

    fn handle_repo_prompt_key(&mut self, code: KeyCode) {
        let Some(input) = self.repo_prompt.as_mut() else {
            return;
        };

        match code {
            KeyCode::Esc => {
                self.repo_prompt = None;
                self.prompt_error = None;
            }
            KeyCode::Backspace => {
                input.pop();
                self.prompt_error = None;
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.prompt_error = None;
            }
            KeyCode::Enter => match RepoId::parse(input) {
                Ok(repo) => {
                    self.repo_prompt = None;
                    self.prompt_error = None;
                    self.open_repository(repo);
                }
                Err(e) => self.prompt_error = Some(e.user_message()),
            },
            _ => {}
        }
    }
}
