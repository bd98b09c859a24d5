use std::path::Path;
use std::sync::Arc;

use api::{ApiError, Config, FileListing, FileRecord, TaskStatus, UploadResponse};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::app::Response;
use crate::route::{chat_path, Route};
use crate::ui::{centered_rect, input_view, inner_width, SPINNER};

pub enum DocsAction {
    None,
    Open(Route),
    Quit,
}

/// Read-only projection of a backend file record for display. Rebuilt from
/// scratch on every reload.
#[derive(Clone, Debug)]
pub struct DocItem {
    pub title: String,
    pub snippet: String,
    pub modified: String,
    pub owner: String,
    pub file_size: Option<u64>,
    pub status: Option<String>,
    /// Empty when the backend has not produced a searchable index yet.
    pub collection_key: String,
}

impl DocItem {
    pub fn from_record(f: &FileRecord) -> Self {
        Self {
            title: non_empty(&f.filerealname)
                .or_else(|| non_empty(&f.uuid_filename))
                .unwrap_or_else(|| "Untitled".to_string()),
            snippet: non_empty(&f.file_uuid)
                .or_else(|| non_empty(&f.task_id))
                .unwrap_or_default(),
            modified: f.created_at.as_deref().map(format_timestamp).unwrap_or_default(),
            owner: "You".to_string(),
            file_size: f.file_size,
            status: f.status.clone(),
            collection_key: f.file_uuid.clone().unwrap_or_default(),
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<String> {
    field.clone().filter(|s| !s.is_empty())
}

fn format_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Case-insensitive substring filter over title, snippet and owner. An empty
/// query returns the full list unchanged.
fn doc_matches(q: &str, d: &DocItem) -> bool {
    d.title.to_lowercase().contains(q)
        || d.snippet.to_lowercase().contains(q)
        || d.owner.to_lowercase().contains(q)
}

pub fn filter_docs<'a>(query: &str, docs: &'a [DocItem]) -> Vec<&'a DocItem> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return docs.iter().collect();
    }
    docs.iter().filter(|d| doc_matches(&q, d)).collect()
}

/// One ingestion-status poll. At most one session exists per upload; dropping
/// it cancels polling.
pub struct PollSession {
    pub task_id: String,
    pub attempts: u32,
    pub in_flight: bool,
    pub last_status: Option<TaskStatus>,
}

pub struct DocsScreen {
    pub query: String,
    pub docs: Vec<DocItem>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: usize,
    pub show_upload: bool,
    pub file_path: String,
    pub uploading: bool,
    pub upload_error: Option<String>,
    pub poll: Option<PollSession>,
}

impl DocsScreen {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            docs: Vec::new(),
            loading: false,
            error: None,
            selected: 0,
            show_upload: false,
            file_path: String::new(),
            uploading: false,
            upload_error: None,
            poll: None,
        }
    }

    pub fn reload(&mut self, cfg: &Arc<Config>, tx: &mpsc::UnboundedSender<Response>) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.error = None;
        let cfg = cfg.clone();
        let tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            let _ = tx.send(Response::Files(api::list_files(&cfg, cfg.list_limit)));
        });
    }

    pub fn handle_files_response(&mut self, res: Result<FileListing, ApiError>) {
        self.loading = false;
        match res {
            Ok(listing) => {
                self.docs = listing.files.iter().map(DocItem::from_record).collect();
                self.selected = 0;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    pub fn open_selected(&self) -> Option<Route> {
        let filtered = filter_docs(&self.query, &self.docs);
        let item = filtered.get(self.selected)?;
        if item.collection_key.is_empty() {
            return None;
        }
        Some(Route::parse(&chat_path(&item.collection_key)))
    }

    /// Client-side hide; the record comes back on the next reload. Removal
    /// is by position in the filtered view, not by id, since ids may be
    /// absent and duplicated.
    pub fn hide_selected(&mut self) {
        let q = self.query.trim().to_lowercase();
        let Some(idx) = self
            .docs
            .iter()
            .enumerate()
            .filter(|(_, d)| q.is_empty() || doc_matches(&q, d))
            .nth(self.selected)
            .map(|(idx, _)| idx)
        else {
            return;
        };
        self.docs.remove(idx);
        let count = filter_docs(&self.query, &self.docs).len();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    pub fn start_upload(&mut self, cfg: &Arc<Config>, tx: &mpsc::UnboundedSender<Response>) {
        let path = self.file_path.trim().to_string();
        if path.is_empty() || self.uploading {
            return;
        }
        self.uploading = true;
        self.upload_error = None;
        self.poll = None;
        let cfg = cfg.clone();
        let tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            let _ = tx.send(Response::Upload(api::upload_pdf(&cfg, Path::new(&path))));
        });
    }

    pub fn handle_upload_response(&mut self, res: Result<UploadResponse, ApiError>) {
        match res {
            Ok(resp) => match resp.task_id() {
                Some(task_id) => {
                    tracing::info!(%task_id, "upload accepted, polling");
                    self.poll = Some(PollSession {
                        task_id: task_id.to_string(),
                        attempts: 0,
                        in_flight: false,
                        last_status: None,
                    });
                }
                None => {
                    tracing::warn!("upload response carries no task id");
                    self.uploading = false;
                    self.upload_error =
                        Some("Upload accepted but the response carried no task id.".to_string());
                }
            },
            Err(err) => {
                self.uploading = false;
                self.upload_error = Some(err.to_string());
            }
        }
    }

    pub fn poll_tick(&mut self, cfg: &Arc<Config>, tx: &mpsc::UnboundedSender<Response>) {
        let Some(poll) = self.poll.as_mut() else {
            return;
        };
        // Skip the tick while the previous status request is unresolved.
        if poll.in_flight {
            return;
        }
        if let Some(max) = cfg.poll_max_attempts {
            if poll.attempts >= max {
                tracing::warn!(task_id = %poll.task_id, max, "giving up on status poll");
                self.poll = None;
                self.uploading = false;
                self.upload_error =
                    Some("Processing did not finish in time; reload the list later.".to_string());
                return;
            }
        }
        poll.in_flight = true;
        poll.attempts += 1;
        let task_id = poll.task_id.clone();
        let cfg = cfg.clone();
        let tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            let _ = tx.send(Response::Task(api::get_task_status(&cfg, &task_id)));
        });
    }

    /// A terminal status ends the session and yields the chat route for the
    /// new collection. Poll errors keep the session alive.
    pub fn handle_task_response(&mut self, res: Result<TaskStatus, ApiError>) -> Option<Route> {
        let poll = self.poll.as_mut()?;
        poll.in_flight = false;
        match res {
            Ok(status) => {
                poll.last_status = Some(status.clone());
                if status.is_complete() {
                    self.poll = None;
                    self.uploading = false;
                    match status.collection_id() {
                        Some(id) => {
                            tracing::info!(collection = %id, "ingestion complete");
                            self.show_upload = false;
                            self.file_path.clear();
                            return Some(Route::Chat {
                                collection_id: Some(id.to_string()),
                            });
                        }
                        None => {
                            self.upload_error =
                                Some("Task finished but reported no collection id.".to_string());
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "poll error");
            }
        }
        None
    }

    /// Screen teardown: drops the poll session so no timer outlives the view.
    pub fn teardown(&mut self) {
        self.poll = None;
        self.uploading = false;
    }

    pub fn on_key(
        &mut self,
        key: KeyEvent,
        cfg: &Arc<Config>,
        tx: &mpsc::UnboundedSender<Response>,
    ) -> DocsAction {
        if self.show_upload {
            self.on_upload_key(key, cfg, tx);
            return DocsAction::None;
        }
        match key.code {
            KeyCode::Esc => return DocsAction::Quit,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let count = filter_docs(&self.query, &self.docs).len();
                if self.selected + 1 < count {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(route) = self.open_selected() {
                    return DocsAction::Open(route);
                }
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.show_upload = true;
                self.upload_error = None;
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reload(cfg, tx);
            }
            KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.hide_selected();
            }
            KeyCode::Backspace => {
                self.query.pop();
                self.selected = 0;
            }
            KeyCode::Char(ch) => {
                self.query.push(ch);
                self.selected = 0;
            }
            _ => {}
        }
        DocsAction::None
    }

    fn on_upload_key(
        &mut self,
        key: KeyEvent,
        cfg: &Arc<Config>,
        tx: &mpsc::UnboundedSender<Response>,
    ) {
        match key.code {
            KeyCode::Esc => {
                // Cancel is disabled while an upload is in progress.
                if !self.uploading {
                    self.show_upload = false;
                    self.file_path.clear();
                    self.upload_error = None;
                }
            }
            KeyCode::Enter => self.start_upload(cfg, tx),
            KeyCode::Backspace => {
                self.file_path.pop();
            }
            KeyCode::Char(ch) => self.file_path.push(ch),
            _ => {}
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, spinner_idx: usize) {
        let title_style = Style::default().add_modifier(Modifier::BOLD);
        let border = Style::default().fg(Color::DarkGray);

        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        let search_block = Block::bordered()
            .title("Search your documents")
            .title_style(title_style)
            .border_style(border);
        let search = Paragraph::new(self.query.as_str())
            .style(Style::default().fg(Color::White))
            .block(search_block);
        frame.render_widget(search, chunks[0]);

        let status_text = if self.loading {
            "Loading...".to_string()
        } else if let Some(err) = &self.error {
            format!("Error: {err}")
        } else {
            format!("{} files fetched", self.docs.len())
        };
        let status = Paragraph::new(status_text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(status, chunks[1].inner(Margin { vertical: 0, horizontal: 1 }));

        let filtered = filter_docs(&self.query, &self.docs);
        let list_block = Block::bordered()
            .title(format!("Your documents ({})", filtered.len()))
            .title_style(title_style)
            .border_style(border);
        if filtered.is_empty() {
            let empty = Paragraph::new("No documents match. Try a different search or upload a PDF.")
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true })
                .block(list_block);
            frame.render_widget(empty, chunks[2]);
        } else {
            let items: Vec<ListItem> = filtered
                .iter()
                .map(|d| {
                    let mut line = d.title.clone();
                    if !d.snippet.is_empty() {
                        line.push_str("  [");
                        line.push_str(&d.snippet);
                        line.push(']');
                    }
                    if !d.modified.is_empty() {
                        line.push_str("  ");
                        line.push_str(&d.modified);
                    }
                    if let Some(status) = &d.status {
                        line.push_str("  (");
                        line.push_str(status);
                        line.push(')');
                    }
                    ListItem::new(line)
                })
                .collect();
            let list = List::new(items)
                .block(list_block)
                .highlight_style(
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");
            let mut state = ListState::default();
            state.select(Some(self.selected.min(filtered.len() - 1)));
            frame.render_stateful_widget(list, chunks[2], &mut state);
        }

        let help = Paragraph::new(
            "Enter: Open chat | Ctrl+U: Upload PDF | Ctrl+R: Reload | Ctrl+X: Hide | Up/Down: Select | Esc: Quit",
        )
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true })
        .block(
            Block::bordered()
                .title("Controls")
                .title_style(title_style)
                .border_style(border),
        );
        frame.render_widget(help, chunks[3]);

        if self.show_upload {
            self.draw_upload_modal(frame, spinner_idx);
        }
    }

    fn draw_upload_modal(&mut self, frame: &mut Frame, spinner_idx: usize) {
        let area = centered_rect(60, 10, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::bordered()
            .title("Upload PDF")
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(Color::Blue));
        frame.render_widget(block, area);

        let inner = area.inner(Margin {
            vertical: 1,
            horizontal: 2,
        });
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let hint = Paragraph::new("Path to a PDF file (only PDFs are accepted):")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, rows[0]);

        let (view, cursor_x) = input_view(&self.file_path, self.file_path.len(), inner_width(area));
        let path = Paragraph::new(view).style(Style::default().fg(Color::White));
        frame.render_widget(path, rows[1]);
        if !self.uploading {
            frame.set_cursor_position((rows[1].x + cursor_x as u16, rows[1].y));
        }

        if self.uploading {
            let (task, status) = match self.poll.as_ref() {
                Some(poll) => (
                    poll.task_id.clone(),
                    poll.last_status
                        .as_ref()
                        .and_then(|s| s.status.clone())
                        .unwrap_or_else(|| "pending".to_string()),
                ),
                None => ("...".to_string(), "pending".to_string()),
            };
            let progress = Paragraph::new(format!(
                "{} Processing task: {task}  Status: {status}",
                SPINNER[spinner_idx]
            ))
            .style(Style::default().fg(Color::Blue));
            frame.render_widget(progress, rows[3]);
        }

        if let Some(err) = &self.upload_error {
            let error = Paragraph::new(err.as_str()).style(Style::default().fg(Color::Red));
            frame.render_widget(error, rows[4]);
        }

        let help = Paragraph::new(if self.uploading {
            "Uploading..."
        } else {
            "Enter: Upload | Esc: Cancel"
        })
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[5]);
    }
}
