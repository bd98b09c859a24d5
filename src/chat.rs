use std::sync::Arc;

use api::{ApiError, Config, SearchResponse};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::app::Response;
use crate::ui::{inner_height, inner_width, input_view, SPINNER};

const WELCOME: &str = "Hi, I am your assistant. Ask me anything about the doc.";
const NO_COLLECTION_NOTICE: &str =
    "No collection selected. Open a collection from the docs screen to start a chat.";
const MISSING_COLLECTION_ERROR: &str = "Missing collection id in route. Cannot query collection.";
const GENERIC_ERROR_REPLY: &str = "Sorry, an error occurred.";

pub enum ChatAction {
    None,
    Back,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub text: String,
}

/// Conversation over the search endpoint for one collection. The message log
/// is append-only and lives only as long as the screen.
pub struct ChatScreen {
    pub collection_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    next_id: u64,
    pub input: String,
    pub cursor: usize,
    pub sending: bool,
    pub error: Option<String>,
    pub scroll: usize,
    pub auto_scroll: bool,
    pub content_len: usize,
    pub view_height: usize,
}

impl ChatScreen {
    pub fn new(collection_id: Option<String>) -> Self {
        let mut screen = Self {
            collection_id,
            messages: Vec::new(),
            next_id: 0,
            input: String::new(),
            cursor: 0,
            sending: false,
            error: None,
            scroll: 0,
            auto_scroll: true,
            content_len: 0,
            view_height: 0,
        };
        screen.push(Role::Assistant, WELCOME.to_string());
        if screen.collection_id.is_none() {
            screen.push(Role::Assistant, NO_COLLECTION_NOTICE.to_string());
        }
        screen
    }

    fn push(&mut self, role: Role, text: String) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage { id, role, text });
        self.auto_scroll = true;
    }

    pub fn send(&mut self, cfg: &Arc<Config>, tx: &mpsc::UnboundedSender<Response>) {
        if self.input.trim().is_empty() || self.sending {
            return;
        }
        let text = self.input.clone();
        self.input.clear();
        self.cursor = 0;

        // The user message is always shown, regardless of outcome.
        self.push(Role::User, text.clone());
        self.sending = true;
        self.error = None;

        let Some(collection_id) = self.collection_id.clone() else {
            self.error = Some(MISSING_COLLECTION_ERROR.to_string());
            self.push(Role::Assistant, MISSING_COLLECTION_ERROR.to_string());
            self.sending = false;
            return;
        };

        let cfg = cfg.clone();
        let tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            let _ = tx.send(Response::Search(api::search(
                &cfg,
                &collection_id,
                &text,
                cfg.top_k,
            )));
        });
    }

    pub fn handle_search_response(&mut self, res: Result<SearchResponse, ApiError>) {
        self.sending = false;
        match res {
            Ok(resp) => self.push(Role::Assistant, resp.reply_text()),
            Err(err) => {
                tracing::error!(error = %err, "chat error");
                self.error = Some(err.to_string());
                self.push(Role::Assistant, GENERIC_ERROR_REPLY.to_string());
            }
        }
    }

    fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_boundary(&self.input, self.cursor);
        self.input.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn move_left(&mut self) {
        self.cursor = prev_boundary(&self.input, self.cursor);
    }

    fn move_right(&mut self) {
        self.cursor = next_boundary(&self.input, self.cursor);
    }

    fn scroll_up(&mut self, by: usize) {
        self.scroll = self.scroll.saturating_sub(by);
        self.auto_scroll = false;
    }

    fn scroll_down(&mut self, by: usize) {
        let max_scroll = self.content_len.saturating_sub(self.view_height);
        self.scroll = (self.scroll + by).min(max_scroll);
    }

    pub fn on_key(
        &mut self,
        key: KeyEvent,
        cfg: &Arc<Config>,
        tx: &mpsc::UnboundedSender<Response>,
    ) -> ChatAction {
        let input_enabled = self.collection_id.is_some();
        match key.code {
            KeyCode::Esc => return ChatAction::Back,
            KeyCode::Enter if key.modifiers == KeyModifiers::NONE => {
                if input_enabled {
                    self.send(cfg, tx);
                }
            }
            // Enter with a modifier held inserts a newline instead.
            KeyCode::Enter => {
                if input_enabled {
                    self.insert_char('\n');
                }
            }
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.clear();
                self.cursor = 0;
            }
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(self.view_height.max(1)),
            KeyCode::PageDown => self.scroll_down(self.view_height.max(1)),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Backspace => {
                if input_enabled {
                    self.delete_char();
                }
            }
            KeyCode::Char(ch) => {
                if input_enabled {
                    self.insert_char(ch);
                }
            }
            _ => {}
        }
        ChatAction::None
    }

    pub fn draw(&mut self, frame: &mut Frame, spinner_idx: usize) {
        let title_style = Style::default().add_modifier(Modifier::BOLD);
        let border = Style::default().fg(Color::DarkGray);

        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);

        let transcript_title = match &self.collection_id {
            Some(id) => format!("Chat With File  Collection: {id}"),
            None => "Chat With File  Collection: (none)".to_string(),
        };
        let transcript_block = Block::bordered()
            .title(transcript_title)
            .title_style(title_style)
            .border_style(border);

        let mut lines: Vec<Line> = Vec::new();
        for m in &self.messages {
            let label = match m.role {
                Role::User => Span::styled(
                    "You",
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                ),
                Role::Assistant => Span::styled(
                    "Assistant",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            };
            lines.push(Line::from(label));
            for text_line in m.text.lines() {
                lines.push(Line::from(format!("  {text_line}")));
            }
            lines.push(Line::default());
        }
        if self.sending {
            lines.push(Line::from(Span::styled(
                format!("{} Loading...", SPINNER[spinner_idx]),
                Style::default().fg(Color::DarkGray),
            )));
        }

        self.view_height = inner_height(chunks[0]);
        self.content_len = lines.len();
        let max_scroll = self.content_len.saturating_sub(self.view_height);
        if self.auto_scroll {
            self.scroll = max_scroll;
            self.auto_scroll = false;
        } else if self.scroll > max_scroll {
            self.scroll = max_scroll;
        }

        let transcript = Paragraph::new(lines)
            .scroll((self.scroll as u16, 0))
            .wrap(Wrap { trim: false })
            .block(transcript_block);
        frame.render_widget(transcript, chunks[0]);

        let mut scrollbar_state = ScrollbarState::new(self.content_len).position(self.scroll);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .track_style(Style::default().fg(Color::DarkGray))
            .thumb_style(Style::default().fg(Color::Blue));
        frame.render_stateful_widget(
            scrollbar,
            chunks[0].inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );

        let input_title = match (&self.collection_id, &self.error) {
            (None, _) => "Message (no collection, navigate from docs)".to_string(),
            (_, Some(err)) => format!("Message  Error: {err}"),
            _ => "Message".to_string(),
        };
        let input_block = Block::bordered()
            .title(input_title)
            .title_style(if self.error.is_some() {
                Style::default().fg(Color::Red)
            } else {
                title_style
            })
            .border_style(border);
        let (view, cursor_x) = input_view(&self.input, self.cursor, inner_width(chunks[1]));
        let input = Paragraph::new(view.replace('\n', " "))
            .style(Style::default().fg(Color::White))
            .block(input_block);
        frame.render_widget(input, chunks[1]);
        if self.collection_id.is_some() {
            let x = chunks[1].x + 1 + cursor_x as u16;
            let y = chunks[1].y + 1;
            frame.set_cursor_position((x, y));
        }

        let help = Paragraph::new(
            "Enter: Send | Alt+Enter: Newline | Ctrl+L: Clear input | Up/Down/PgUp/PgDn: Scroll | Esc: Back | Ctrl+C: Quit",
        )
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true })
        .block(
            Block::bordered()
                .title("Controls")
                .title_style(title_style)
                .border_style(border),
        );
        frame.render_widget(help, chunks[2]);
    }
}

fn prev_boundary(s: &str, idx: usize) -> usize {
    s[..idx].char_indices().last().map(|(i, _)| i).unwrap_or(0)
}

fn next_boundary(s: &str, idx: usize) -> usize {
    s[idx..].chars().next().map(|c| idx + c.len_utf8()).unwrap_or(idx)
}
