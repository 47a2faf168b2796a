use std::io::Write;

use crate::terminal::Terminal;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use unicode_width::UnicodeWidthStr;

use fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher};
use tui_input::{backend::crossterm::EventHandler, Input};

const INFO_TEXT_NORMAL_MODE: &str =
    "(Esc) quit | (↑) move up | (↓) move down | (Enter) select | (/) search";
const INFO_TEXT_SEARCH_MODE: &str =
    "(Esc) quit search | (↑) move up | (↓) move down | (Enter) select";
const SEARCH_SYMBOL: &str = "/ ";
const MAX_ROWS: u16 = 15;

enum Mode {
    Normal,
    Search,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Pending,
    Picked(String),
    Cancelled,
}

/// Inline alias picker with fuzzy search.
pub struct SelectBox {
    hosts: Vec<String>,
    state: TableState,
    search: Input,
    mode: Mode,
}

impl SelectBox {
    pub fn new(hosts: Vec<String>) -> Self {
        Self {
            state: TableState::default().with_selected(Some(0)),
            search: Input::default(),
            mode: Mode::Normal,
            hosts,
        }
    }

    /// Viewport height: rows, table border and header, search box, help line.
    pub fn height(&self) -> u16 {
        (self.hosts.len() as u16).min(MAX_ROWS) + 3 + 3 + 1
    }

    pub fn select(&mut self, terminal: &mut Terminal<impl Write>) -> anyhow::Result<Option<String>> {
        loop {
            terminal.draw(|frame| self.ui(frame))?;
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match self.handle_key(key) {
                    Outcome::Pending => {}
                    Outcome::Picked(host) => {
                        terminal.clear()?;
                        return Ok(Some(host));
                    }
                    Outcome::Cancelled => {
                        terminal.clear()?;
                        return Ok(None);
                    }
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Outcome::Cancelled;
        }
        match key.code {
            KeyCode::Down => self.down(),
            KeyCode::Up => self.up(),
            KeyCode::Enter => {
                let visible = self.visible();
                if let Some((idx, _)) = self.state.selected().and_then(|i| visible.get(i)) {
                    return Outcome::Picked(self.hosts[*idx].clone());
                }
            }
            KeyCode::Esc => match self.mode {
                Mode::Normal => return Outcome::Cancelled,
                Mode::Search => {
                    self.search.reset();
                    self.mode = Mode::Normal;
                    self.reset_selection();
                }
            },
            KeyCode::Char('/') if matches!(self.mode, Mode::Normal) => {
                self.mode = Mode::Search;
                self.search.reset();
            }
            _ => {
                if matches!(self.mode, Mode::Search) {
                    self.search.handle_event(&Event::Key(key));
                    self.reset_selection();
                }
            }
        }
        Outcome::Pending
    }

    /// Indices of hosts matching the search, each with its matched chars.
    fn visible(&self) -> Vec<(usize, Vec<usize>)> {
        let pattern = self.search.value();
        if pattern.is_empty() {
            return (0..self.hosts.len()).map(|i| (i, Vec::new())).collect();
        }

        let matcher = SkimMatcherV2::default();
        self.hosts
            .iter()
            .enumerate()
            .filter_map(|(i, host)| {
                matcher
                    .fuzzy_indices(host, pattern)
                    .map(|(_, indices)| (i, indices))
            })
            .collect()
    }

    fn reset_selection(&mut self) {
        let selected = if self.visible().is_empty() { None } else { Some(0) };
        self.state.select(selected);
    }

    fn up(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => (i - 1).min(len - 1),
        };
        self.state.select(Some(i))
    }

    fn down(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i))
    }

    fn ui(&mut self, f: &mut Frame) {
        let header = Row::new(vec![
            Cell::from("Host").style(Style::default().add_modifier(Modifier::UNDERLINED))
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .visible()
            .into_iter()
            .map(|(i, indices)| {
                Row::new([Text::from(Line::from(Self::get_highlight_spans(
                    &self.hosts[i],
                    &indices,
                )))])
            })
            .collect();

        let width = self
            .hosts
            .iter()
            .map(|h| UnicodeWidthStr::width(h.as_str()))
            .max()
            .unwrap_or(0) as u16;

        let table = Table::new(rows, [Constraint::Min(width + 1)])
            .header(header)
            .block(Block::default().borders(Borders::TOP))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_spacing(HighlightSpacing::Always);

        let (info, search_height) = match self.mode {
            Mode::Normal => (INFO_TEXT_NORMAL_MODE, 0),
            Mode::Search => (INFO_TEXT_SEARCH_MODE, 3),
        };
        let recs = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(search_height),
            Constraint::Length(1),
        ])
        .split(f.size());

        f.render_stateful_widget(table, recs[0], &mut self.state);
        f.render_widget(Paragraph::new(Line::from(info)).centered(), recs[2]);

        if matches!(self.mode, Mode::Search) {
            let input = Paragraph::new(
                Text::from(format!("{SEARCH_SYMBOL}{}", self.search.value()))
                    .style(Style::default().fg(Color::Cyan)),
            )
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(input, recs[1]);

            let cursor = UnicodeWidthStr::width(SEARCH_SYMBOL) + self.search.visual_cursor();
            f.set_cursor(recs[1].x + 1 + cursor as u16, recs[1].y + 1);
        }
    }

    fn get_highlight_spans(input: &str, indices: &[usize]) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        let mut current_segment = String::new();

        let highlight_style = Style::default()
            .fg(Color::Rgb(250, 0, 0))
            .bg(Color::Rgb(0xFF, 0xFC, 0x67))
            .add_modifier(Modifier::BOLD);
        for (i, c) in input.chars().enumerate() {
            if indices.contains(&i) {
                if !current_segment.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_segment)));
                }
                spans.push(Span::styled(c.to_string(), highlight_style));
            } else {
                current_segment.push(c);
            }
        }

        if !current_segment.is_empty() {
            spans.push(Span::raw(current_segment));
        }

        spans
    }
}
