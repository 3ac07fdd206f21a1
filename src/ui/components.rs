//! Widgets for the interactive browser

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use super::browser::{BrowserState, Focus, View};
use crate::query::{Dataset, MonsterDetail, MonsterRow};
use crate::team::MAX_TEAM_SIZE;

/// Draw the whole screen
pub fn render(frame: &mut Frame, state: &BrowserState, dataset: &Dataset) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(5),    // View body
            Constraint::Length(3), // Status line
        ])
        .split(frame.area());

    render_tabs(frame, chunks[0], state);
    match state.view {
        View::Browse => render_browse(frame, chunks[1], state, dataset),
        View::Team => render_team(frame, chunks[1], state, dataset),
    }
    render_status(frame, chunks[2], state);
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    let color = if focused { Color::Cyan } else { Color::Blue };
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .border_style(Style::default().fg(color))
}

fn highlight() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn render_tabs(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let selected = match state.view {
        View::Browse => 0,
        View::Team => 1,
    };
    let tabs = Tabs::new(vec!["Browse Tuxemon", "Build a Team"])
        .select(selected)
        .block(panel("Tuxemon", false))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn render_browse(frame: &mut Frame, area: Rect, state: &BrowserState, dataset: &Dataset) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(30),
            Constraint::Percentage(45),
        ])
        .split(area);

    // Filters
    let items: Vec<ListItem> = state
        .filter_options
        .iter()
        .map(|(kind, value)| {
            let mark = checkbox(state.filter.is_selected(*kind, value));
            ListItem::new(format!("{} {}: {}", mark, kind.label(), value))
        })
        .collect();
    let mut list_state = ListState::default().with_selected(Some(state.filter_cursor));
    let list = List::new(items)
        .block(panel("Filters", state.focus == Focus::Filters))
        .highlight_style(highlight());
    frame.render_stateful_widget(list, columns[0], &mut list_state);

    // Monsters
    let filtered = state.filtered(dataset);
    let title = format!("Showing {} of {} monsters", filtered.len(), dataset.len());
    let items: Vec<ListItem> = filtered
        .iter()
        .map(|m| ListItem::new(m.display_name()))
        .collect();
    let mut list_state = ListState::default().with_selected(Some(state.monster_cursor));
    let list = List::new(items)
        .block(panel(&title, state.focus == Focus::Monsters))
        .highlight_style(highlight());
    frame.render_stateful_widget(list, columns[1], &mut list_state);

    // Detail
    let lines = match filtered.get(state.monster_cursor) {
        Some(monster) => {
            let detail = state
                .detail
                .as_ref()
                .filter(|(id, _)| *id == monster.id)
                .map(|(_, detail)| detail);
            detail_lines(monster, detail, dataset)
        }
        None => vec![Line::from("No monsters match the current filters")],
    };
    let paragraph = Paragraph::new(lines)
        .block(panel("Detail", false))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, columns[2]);
}

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)))
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(value),
    ])
}

fn detail_lines<'a>(
    monster: &'a MonsterRow,
    detail: Option<&'a MonsterDetail>,
    dataset: &'a Dataset,
) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled(
            monster.display_name(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        field("Category", monster.category.clone()),
        field("Shape", monster.shape.clone()),
        field("Stage", monster.stage.clone()),
        field("Height", format!("{} cm", monster.height)),
        field("Weight", format!("{} kg", monster.weight)),
        field("Catch Rate", monster.catch_rate.to_string()),
        field("Types", monster.types.join(", ")),
        field("Tags", monster.tags.join(", ")),
        field("Terrains", monster.terrains.join(", ")),
    ];

    let Some(detail) = detail else {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: show moves and evolutions",
            Style::default().fg(Color::DarkGray),
        )));
        return lines;
    };

    lines.push(Line::from(""));
    lines.push(heading("Moveset"));
    for mv in &detail.moveset {
        lines.push(Line::from(format!("  Lv {:>3}  {}", mv.level_learned, mv.technique)));
    }

    lines.push(heading("Evolutions"));
    for (evo, target) in detail.resolved_evolutions(dataset) {
        let level = evo
            .at_level
            .map(|l| format!("Lv {}", l))
            .unwrap_or_else(|| "-".to_string());
        let name = match target {
            Some(target) => format!("{} ({})", target.display_name(), target.types.join(", ")),
            None => format!("{} (not loaded)", evo.evolves_to_slug),
        };
        lines.push(Line::from(format!("  {}  {}", level, name)));
    }

    lines.push(heading("History"));
    for h in &detail.history {
        lines.push(Line::from(format!("  {}  {}", h.evo_stage, h.mon_slug)));
    }

    lines
}

fn member_line(monster: &MonsterRow) -> Line<'static> {
    Line::from(vec![
        Span::styled(monster.display_name(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" - {}", monster.types.join(", "))),
    ])
}

fn render_team(frame: &mut Frame, area: Rect, state: &BrowserState, dataset: &Dataset) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(area);

    // Roster of every monster
    let items: Vec<ListItem> = dataset
        .rows()
        .iter()
        .map(|m| {
            let mark = checkbox(state.selection.contains(&m.slug));
            ListItem::new(format!("{} {}", mark, m.display_name()))
        })
        .collect();
    let title = format!(
        "Choose up to {} ({}/{})",
        MAX_TEAM_SIZE,
        state.selection.len(),
        MAX_TEAM_SIZE
    );
    let mut list_state = ListState::default().with_selected(Some(state.roster_cursor));
    let list = List::new(items)
        .block(panel(&title, state.focus == Focus::Roster))
        .highlight_style(highlight());
    frame.render_stateful_widget(list, columns[0], &mut list_state);

    // Overview of the current selection
    let mut lines = Vec::new();
    match state.team_stats(dataset) {
        Some(stats) => {
            for (label, value) in stats.display_fields() {
                lines.push(field(label, value));
            }
            lines.push(Line::from(""));
            lines.extend(state.team_members(dataset).into_iter().map(member_line));
        }
        None => lines.push(Line::from("Select monsters with Space")),
    }
    if let Some(input) = &state.name_input {
        lines.push(Line::from(""));
        lines.push(field("Team Name", format!("{}_", input)));
        lines.push(Line::from(Span::styled(
            "Enter: save  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )));
    }
    let paragraph = Paragraph::new(lines)
        .block(panel("Team Overview", false))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, columns[1]);

    // Saved teams and the loaded one
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[2]);

    let items: Vec<ListItem> = state
        .saved_teams
        .iter()
        .map(|t| {
            ListItem::new(format!(
                "{}  ({})",
                t.team_name,
                t.created_at.format("%Y-%m-%d %H:%M")
            ))
        })
        .collect();
    let mut list_state = ListState::default().with_selected(Some(state.saved_cursor));
    let list = List::new(items)
        .block(panel("Load a Saved Team", state.focus == Focus::SavedTeams))
        .highlight_style(highlight());
    frame.render_stateful_widget(list, rows[0], &mut list_state);

    let (title, lines): (String, Vec<Line>) = match &state.loaded_team {
        Some(team) => (
            format!("Team: {}", team.name),
            team.slugs
                .iter()
                .filter_map(|slug| dataset.by_slug(slug))
                .map(member_line)
                .collect(),
        ),
        None => ("Team".to_string(), vec![Line::from("Enter on a saved team")]),
    };
    frame.render_widget(Paragraph::new(lines).block(panel(&title, false)), rows[1]);
}

fn render_status(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let help = match state.view {
        View::Browse => {
            "Tab: team  ←/→: focus  Space: toggle  Enter: detail  c: clear  q: quit"
        }
        View::Team => {
            "Tab: browse  ←/→: focus  Space: pick  s: save  x: clear  Enter: load  q: quit"
        }
    };
    let line = match &state.status {
        Some(status) => {
            let color = if status.is_error { Color::Red } else { Color::Green };
            Line::from(Span::styled(status.text.as_str(), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(help, Style::default().fg(Color::Gray))),
    };
    let paragraph = Paragraph::new(line).block(panel("Status", false));
    frame.render_widget(paragraph, area);
}
