//! Interactive terminal browser and team builder.
//!
//! All interaction state lives in [`BrowserState`], which never touches the
//! terminal; [`run`] owns the terminal and redraws after every key.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use super::components;
use crate::app::AppContext;
use crate::filter::MonsterFilter;
use crate::loader::LookupKind;
use crate::query::{Dataset, MonsterDetail, MonsterRow};
use crate::team::{TeamSelection, TeamStats, TeamSummary};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Browse,
    Team,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Filters,
    Monsters,
    Roster,
    SavedTeams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Continue,
    Quit,
}

/// A saved team brought back into view
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTeam {
    pub name: String,
    pub slugs: Vec<String>,
}

pub struct BrowserState {
    pub view: View,
    pub focus: Focus,
    pub filter: MonsterFilter,
    /// Every filterable (category, value) pair
    pub filter_options: Vec<(LookupKind, String)>,
    pub filter_cursor: usize,
    pub monster_cursor: usize,
    /// Detail of the expanded monster, by id
    pub detail: Option<(i64, MonsterDetail)>,
    pub roster_cursor: usize,
    pub selection: TeamSelection,
    /// Team name being typed, if the save prompt is open
    pub name_input: Option<String>,
    pub saved_teams: Vec<TeamSummary>,
    pub saved_cursor: usize,
    pub loaded_team: Option<LoadedTeam>,
    pub status: Option<StatusMessage>,
}

impl BrowserState {
    pub fn new(dataset: &Dataset) -> Self {
        let filter_options = LookupKind::ALL
            .iter()
            .flat_map(|&kind| {
                dataset
                    .options(kind)
                    .into_iter()
                    .map(move |value| (kind, value.to_string()))
            })
            .collect();

        Self {
            view: View::Browse,
            focus: Focus::Monsters,
            filter: MonsterFilter::new(),
            filter_options,
            filter_cursor: 0,
            monster_cursor: 0,
            detail: None,
            roster_cursor: 0,
            selection: TeamSelection::new(),
            name_input: None,
            saved_teams: Vec::new(),
            saved_cursor: 0,
            loaded_team: None,
            status: None,
        }
    }

    pub fn filtered<'a>(&self, dataset: &'a Dataset) -> Vec<&'a MonsterRow> {
        self.filter.apply(dataset.rows())
    }

    pub fn team_members<'a>(&self, dataset: &'a Dataset) -> Vec<&'a MonsterRow> {
        self.selection
            .slugs()
            .iter()
            .filter_map(|slug| dataset.by_slug(slug))
            .collect()
    }

    pub fn team_stats(&self, dataset: &Dataset) -> Option<TeamStats> {
        TeamStats::compute(&self.team_members(dataset))
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn refresh_saved_teams(&mut self, ctx: &AppContext) {
        match ctx.list_teams() {
            Ok(teams) => {
                self.saved_teams = teams;
                let last = self.saved_teams.len().saturating_sub(1);
                self.saved_cursor = self.saved_cursor.min(last);
            }
            Err(e) => self.error(e.to_string()),
        }
    }

    /// Apply one key press. Errors are reported in the status line.
    pub fn handle_key(&mut self, key: KeyCode, ctx: &AppContext, dataset: &Dataset) -> Action {
        if self.name_input.is_some() {
            self.handle_name_input(key, ctx);
            return Action::Continue;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Tab => self.switch_view(),
            _ => match self.view {
                View::Browse => self.handle_browse_key(key, ctx, dataset),
                View::Team => self.handle_team_key(key, ctx, dataset),
            },
        }
        Action::Continue
    }

    fn switch_view(&mut self) {
        (self.view, self.focus) = match self.view {
            View::Browse => (View::Team, Focus::Roster),
            View::Team => (View::Browse, Focus::Monsters),
        };
    }

    fn handle_browse_key(&mut self, key: KeyCode, ctx: &AppContext, dataset: &Dataset) {
        match (self.focus, key) {
            (_, KeyCode::Left) => self.focus = Focus::Filters,
            (_, KeyCode::Right) => self.focus = Focus::Monsters,
            (_, KeyCode::Char('c')) => {
                self.filter.clear();
                self.monster_cursor = 0;
                self.info("Filters cleared");
            }
            (Focus::Filters, KeyCode::Up) => {
                self.filter_cursor = self.filter_cursor.saturating_sub(1);
            }
            (Focus::Filters, KeyCode::Down) => {
                self.filter_cursor = step(self.filter_cursor, self.filter_options.len());
            }
            (Focus::Filters, KeyCode::Char(' ') | KeyCode::Enter) => {
                if let Some((kind, value)) = self.filter_options.get(self.filter_cursor) {
                    self.filter.toggle(*kind, value);
                    self.monster_cursor = 0;
                    self.detail = None;
                }
            }
            (Focus::Monsters, KeyCode::Up) => {
                self.monster_cursor = self.monster_cursor.saturating_sub(1);
                self.detail = None;
            }
            (Focus::Monsters, KeyCode::Down) => {
                self.monster_cursor = step(self.monster_cursor, self.filtered(dataset).len());
                self.detail = None;
            }
            (Focus::Monsters, KeyCode::Enter | KeyCode::Char(' ')) => {
                self.toggle_detail(ctx, dataset);
            }
            _ => {}
        }
    }

    fn toggle_detail(&mut self, ctx: &AppContext, dataset: &Dataset) {
        if self.detail.take().is_some() {
            return;
        }
        let filtered = self.filtered(dataset);
        let Some(monster) = filtered.get(self.monster_cursor) else {
            return;
        };
        match ctx.detail(monster) {
            Ok(detail) => self.detail = Some((monster.id, detail)),
            Err(e) => self.error(format!("Failed to load {}: {}", monster.slug, e)),
        }
    }

    fn handle_team_key(&mut self, key: KeyCode, ctx: &AppContext, dataset: &Dataset) {
        match (self.focus, key) {
            (_, KeyCode::Left) => self.focus = Focus::Roster,
            (_, KeyCode::Right) => {
                self.focus = Focus::SavedTeams;
                self.refresh_saved_teams(ctx);
            }
            (_, KeyCode::Char('s')) => {
                if self.selection.is_empty() {
                    self.error("Pick at least one monster before saving");
                } else {
                    self.name_input = Some(String::new());
                }
            }
            (_, KeyCode::Char('x')) => {
                self.selection.clear();
                self.info("Selection cleared");
            }
            (Focus::Roster, KeyCode::Up) => {
                self.roster_cursor = self.roster_cursor.saturating_sub(1);
            }
            (Focus::Roster, KeyCode::Down) => {
                self.roster_cursor = step(self.roster_cursor, dataset.len());
            }
            (Focus::Roster, KeyCode::Char(' ') | KeyCode::Enter) => {
                if let Some(monster) = dataset.rows().get(self.roster_cursor) {
                    if let Err(e) = self.selection.toggle(&monster.slug) {
                        self.error(e.to_string());
                    }
                }
            }
            (Focus::SavedTeams, KeyCode::Up) => {
                self.saved_cursor = self.saved_cursor.saturating_sub(1);
            }
            (Focus::SavedTeams, KeyCode::Down) => {
                self.saved_cursor = step(self.saved_cursor, self.saved_teams.len());
            }
            (Focus::SavedTeams, KeyCode::Enter) => self.load_selected_team(ctx),
            _ => {}
        }
    }

    fn handle_name_input(&mut self, key: KeyCode, ctx: &AppContext) {
        let Some(input) = self.name_input.as_mut() else {
            return;
        };
        match key {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Esc => self.name_input = None,
            KeyCode::Enter => {
                let name = input.clone();
                match ctx.save_team(&name, &self.selection) {
                    Ok(_) => {
                        self.name_input = None;
                        self.info(format!("Team '{}' saved!", name.trim()));
                        self.refresh_saved_teams(ctx);
                    }
                    // Keep the prompt open so the name can be fixed
                    Err(e) if e.is_user_error() => self.error(e.to_string()),
                    Err(e) => {
                        self.name_input = None;
                        self.error(e.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    fn load_selected_team(&mut self, ctx: &AppContext) {
        let Some(team) = self.saved_teams.get(self.saved_cursor).cloned() else {
            return;
        };
        match ctx.load_team(team.id) {
            Ok(members) => {
                self.loaded_team = Some(LoadedTeam {
                    name: team.team_name.clone(),
                    slugs: members.iter().map(|m| m.slug.clone()).collect(),
                });
                self.info(format!("Loaded team '{}'", team.team_name));
            }
            Err(e) => self.error(e.to_string()),
        }
    }
}

/// Move a cursor down one row, staying inside `len`
fn step(cursor: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (cursor + 1).min(len - 1)
    }
}

/// Run the browser until the user quits
pub fn run(ctx: &AppContext) -> Result<()> {
    let dataset = ctx.dataset()?;
    let mut state = BrowserState::new(dataset);
    state.refresh_saved_teams(ctx);

    let mut terminal = BrowserTerminal::enter()?;

    loop {
        terminal.draw(&state, dataset)?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
            if kind != KeyEventKind::Press {
                continue;
            }
            if state.handle_key(code, ctx, dataset) == Action::Quit {
                break;
            }
        }
    }

    terminal.restore()
}

/// Terminal in raw mode on the alternate screen
struct BrowserTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl BrowserTerminal {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, state: &BrowserState, dataset: &Dataset) -> Result<()> {
        self.terminal
            .draw(|frame| components::render(frame, state, dataset))?;
        Ok(())
    }

    fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for BrowserTerminal {
    fn drop(&mut self) {
        // Best effort cleanup
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::loader::{apply_monster, LoadSummary};
    use crate::parser::parse_monster;

    fn context(monsters: &[(&str, &str)]) -> AppContext {
        let db = Database::open_in_memory().unwrap();
        for (slug, ty) in monsters {
            let record = parse_monster(&format!(
                r#"{{"slug": "{slug}", "category": "c", "shape": "s", "stage": "basic",
                    "height": 10, "weight": 5, "catch_rate": 50,
                    "lower_catch_resistance": 1, "upper_catch_resistance": 1,
                    "types": ["{ty}"]}}"#
            ))
            .unwrap();
            apply_monster(db.conn(), &record, &mut LoadSummary::default()).unwrap();
        }
        AppContext::new(db)
    }

    fn press(state: &mut BrowserState, ctx: &AppContext, keys: &[KeyCode]) {
        let dataset = ctx.dataset().unwrap();
        for key in keys {
            state.handle_key(*key, ctx, dataset);
        }
    }

    #[test]
    fn test_filter_toggle_narrows_list() {
        let ctx = context(&[("aardart", "wood"), ("bigfin", "water")]);
        let dataset = ctx.dataset().unwrap();
        let mut state = BrowserState::new(dataset);
        assert_eq!(state.filtered(dataset).len(), 2);

        // Filter options are sorted: water, wood
        press(&mut state, &ctx, &[KeyCode::Left, KeyCode::Char(' ')]);
        let slugs: Vec<_> = state.filtered(dataset).iter().map(|m| m.slug.clone()).collect();
        assert_eq!(slugs, vec!["bigfin"]);

        press(&mut state, &ctx, &[KeyCode::Char('c')]);
        assert_eq!(state.filtered(dataset).len(), 2);
    }

    #[test]
    fn test_seventh_member_is_rejected_in_status() {
        let names = ["a", "b", "c", "d", "e", "f", "g"];
        let monsters: Vec<_> = names.iter().map(|n| (*n, "fire")).collect();
        let ctx = context(&monsters);
        let mut state = BrowserState::new(ctx.dataset().unwrap());

        press(&mut state, &ctx, &[KeyCode::Tab]);
        for _ in 0..7 {
            press(&mut state, &ctx, &[KeyCode::Char(' '), KeyCode::Down]);
        }

        assert_eq!(state.selection.len(), 6);
        assert!(state.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_save_prompt_then_load() {
        let ctx = context(&[("aardart", "wood"), ("bigfin", "water")]);
        let mut state = BrowserState::new(ctx.dataset().unwrap());

        press(&mut state, &ctx, &[KeyCode::Tab, KeyCode::Char(' '), KeyCode::Char('s')]);
        assert!(state.name_input.is_some());

        // Empty name keeps the prompt open and writes nothing
        press(&mut state, &ctx, &[KeyCode::Enter]);
        assert!(state.name_input.is_some());
        assert!(state.status.as_ref().unwrap().is_error);
        assert_eq!(ctx.db().count("teams").unwrap(), 0);

        press(&mut state, &ctx, &[KeyCode::Char('Z'), KeyCode::Enter]);
        assert!(state.name_input.is_none());
        assert_eq!(state.saved_teams.len(), 1);

        press(&mut state, &ctx, &[KeyCode::Right, KeyCode::Enter]);
        let loaded = state.loaded_team.as_ref().unwrap();
        assert_eq!(loaded.name, "Z");
        assert_eq!(loaded.slugs, vec!["aardart"]);
    }
}
