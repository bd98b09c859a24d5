use std::sync::Arc;

use api::{ApiError, Config, FileListing, SearchResponse, TaskStatus, UploadResponse};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::chat::{ChatAction, ChatScreen};
use crate::docs::{DocsAction, DocsScreen};
use crate::route::Route;

/// Results of background HTTP calls, delivered into the event loop.
pub enum Response {
    Files(Result<FileListing, ApiError>),
    Upload(Result<UploadResponse, ApiError>),
    Task(Result<TaskStatus, ApiError>),
    Search(Result<SearchResponse, ApiError>),
}

pub struct App {
    pub cfg: Arc<Config>,
    pub tx: mpsc::UnboundedSender<Response>,
    pub route: Route,
    pub docs: DocsScreen,
    pub chat: Option<ChatScreen>,
    pub spinner_idx: usize,
}

impl App {
    pub fn new(cfg: Arc<Config>, tx: mpsc::UnboundedSender<Response>, initial: Route) -> Self {
        let mut app = Self {
            cfg,
            tx,
            route: Route::Docs,
            docs: DocsScreen::new(),
            chat: None,
            spinner_idx: 0,
        };
        app.navigate(initial);
        app
    }

    /// Switch screens. Entering the docs screen refetches the list so a
    /// freshly ingested file shows up; a fetch already in flight is not
    /// duplicated. Leaving it drops any active poll. The chat screen is
    /// rebuilt from scratch so its message log resets.
    pub fn navigate(&mut self, route: Route) {
        match &route {
            Route::Docs => {
                self.chat = None;
                self.docs.reload(&self.cfg, &self.tx);
            }
            Route::Chat { collection_id } => {
                self.docs.teardown();
                self.chat = Some(ChatScreen::new(collection_id.clone()));
            }
        }
        self.route = route;
    }

    pub fn is_busy(&self) -> bool {
        self.docs.loading
            || self.docs.uploading
            || self.chat.as_ref().is_some_and(|c| c.sending)
    }

    pub fn handle_response(&mut self, resp: Response) {
        let next = match resp {
            Response::Files(res) => {
                self.docs.handle_files_response(res);
                None
            }
            Response::Upload(res) => {
                self.docs.handle_upload_response(res);
                None
            }
            Response::Task(res) => self.docs.handle_task_response(res),
            Response::Search(res) => {
                if let Some(chat) = self.chat.as_mut() {
                    chat.handle_search_response(res);
                }
                None
            }
        };
        if let Some(route) = next {
            self.navigate(route);
        }
    }

    /// Returns true when the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        if matches!(self.route, Route::Docs) {
            match self.docs.on_key(key, &self.cfg, &self.tx) {
                DocsAction::Quit => return true,
                DocsAction::Open(route) => self.navigate(route),
                DocsAction::None => {}
            }
        } else {
            let action = match self.chat.as_mut() {
                Some(chat) => chat.on_key(key, &self.cfg, &self.tx),
                None => ChatAction::None,
            };
            if matches!(action, ChatAction::Back) {
                self.navigate(Route::Docs);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_app() -> (App, mpsc::UnboundedReceiver<Response>) {
        let cfg = Arc::new(Config {
            base_url: "http://127.0.0.1:1".to_string(),
            list_limit: 100,
            top_k: 5,
            poll_interval: Duration::from_secs(5),
            poll_max_attempts: None,
        });
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(cfg, tx, Route::Docs), rx)
    }

    #[tokio::test]
    async fn opening_docs_triggers_exactly_one_initial_load() {
        let (mut app, mut rx) = test_app();
        assert!(app.docs.loading);
        app.navigate(Route::Docs);
        assert!(app.docs.loading);

        // Exactly one request was spawned across both navigations.
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());

        app.handle_response(Response::Files(Ok(FileListing::default())));
        assert!(!app.docs.loading);
    }

    #[tokio::test]
    async fn returning_from_chat_refetches_the_document_list() {
        let (mut app, mut rx) = test_app();
        assert!(rx.recv().await.is_some());
        app.handle_response(Response::Files(Ok(FileListing::default())));
        assert!(!app.docs.loading);

        app.navigate(Route::Chat {
            collection_id: Some("c1".to_string()),
        });
        app.navigate(Route::Docs);

        // A fresh fetch starts so a just-ingested file shows up.
        assert!(app.docs.loading);
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn navigating_to_chat_tears_down_the_docs_poll() {
        let (mut app, _rx) = test_app();
        app.docs.uploading = true;
        app.docs.poll = Some(crate::docs::PollSession {
            task_id: "t1".to_string(),
            attempts: 0,
            in_flight: false,
            last_status: None,
        });

        app.navigate(Route::Chat {
            collection_id: Some("c1".to_string()),
        });
        assert!(app.docs.poll.is_none());
        assert!(app.chat.is_some());
    }

    #[tokio::test]
    async fn terminal_task_response_navigates_to_the_new_collection() {
        let (mut app, _rx) = test_app();
        app.docs.uploading = true;
        app.docs.poll = Some(crate::docs::PollSession {
            task_id: "t1".to_string(),
            attempts: 1,
            in_flight: true,
            last_status: None,
        });

        let done: TaskStatus = serde_json::from_value(serde_json::json!({
            "status": "success",
            "result": {"file_id": "c42"}
        }))
        .unwrap();
        app.handle_response(Response::Task(Ok(done)));

        assert_eq!(
            app.route,
            Route::Chat {
                collection_id: Some("c42".to_string())
            }
        );
        let chat = app.chat.as_ref().expect("chat screen built");
        assert_eq!(chat.collection_id.as_deref(), Some("c42"));
    }

    #[tokio::test]
    async fn stale_search_response_after_leaving_chat_is_dropped() {
        let (mut app, _rx) = test_app();
        app.navigate(Route::Chat {
            collection_id: Some("c1".to_string()),
        });
        app.navigate(Route::Docs);
        // Must not panic or touch any screen.
        app.handle_response(Response::Search(Ok(SearchResponse(serde_json::json!({
            "result": "late"
        })))));
        assert!(app.chat.is_none());
    }
}
