use std::sync::Arc;
use std::time::Instant;

use parley_core::assist::{self, AssistRequest};
use parley_core::extractor::{self, ConversationExtractor, PageSource};
use parley_core::{
    ApiKeyForm, ChatLog, ChatLogEntry, Clipboard, CompletionClient, Config, CopyConfirmation,
    MessageType, PanelView, SettingsStore,
};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Panel,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

type RequestTask = JoinHandle<parley_core::Result<Option<ChatLogEntry>>>;

/// A completion call that has been issued and not yet applied.
struct PendingRequest {
    request: AssistRequest,
    task: RequestTask,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub panel: PanelView,

    // Composer
    pub input: String,
    pub cursor: usize,

    // Chat state
    pub chat_log: ChatLog,
    pub context: Vec<String>,
    pub active_type: MessageType,
    pub selected_entry: Option<usize>,
    pub copy: CopyConfirmation,
    pub alert: Option<String>,
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Loading state
    pub message_loading: usize,
    pub category_loading: Option<MessageType>,
    pub animation_frame: u8,

    // Settings screen
    pub api_key_form: ApiKeyForm,

    // Collaborators
    pub client: CompletionClient,
    pub store: Arc<dyn SettingsStore>,
    pub clipboard: Arc<dyn Clipboard>,
    pub extractor: ConversationExtractor,
    pub page_source: Option<PageSource>,

    pending: Vec<PendingRequest>,
}

impl App {
    pub fn new(
        config: &Config,
        store: Arc<dyn SettingsStore>,
        clipboard: Arc<dyn Clipboard>,
        page_source: Option<PageSource>,
    ) -> parley_core::Result<Self> {
        let extractor = ConversationExtractor::from_config(config)?;
        let client = CompletionClient::from_config(store.clone(), config);

        let mut api_key_form = ApiKeyForm::new();
        api_key_form.load(store.as_ref());

        Ok(Self {
            should_quit: false,
            screen: Screen::Panel,
            input_mode: InputMode::Normal,
            panel: PanelView::default(),

            input: String::new(),
            cursor: 0,

            chat_log: ChatLog::new(),
            context: Vec::new(),
            active_type: config.message_type,
            selected_entry: None,
            copy: CopyConfirmation::new(),
            alert: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            message_loading: 0,
            category_loading: None,
            animation_frame: 0,

            api_key_form,

            client,
            store,
            clipboard,
            extractor,
            page_source,

            pending: Vec::new(),
        })
    }

    /// Re-read the page and replace the conversation context.
    pub async fn refresh_context(&mut self) {
        let Some(source) = self.page_source.clone() else {
            tracing::debug!("no page source configured, conversation context stays empty");
            return;
        };

        match extractor::extract_from(&self.extractor, &source).await {
            Ok(messages) => {
                tracing::info!(source = %source, count = messages.len(), "conversation context refreshed");
                self.context = messages;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read conversation page");
                self.alert = Some(format!("Failed to read conversation page: {}", source));
            }
        }
    }

    /// Send the composer text: log it, then ask for an input review and a
    /// full rewrite at the same time. Ignored while a previous send is
    /// still generating.
    pub fn send_message(&mut self) {
        if self.input.trim().is_empty() || self.is_generating() {
            return;
        }

        let text = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.chat_log.push(ChatLogEntry::user(text.clone()));

        self.dispatch(AssistRequest::InputReview { input: text.clone() });
        self.dispatch(AssistRequest::Rewrite {
            message_type: self.active_type,
            input: Some(text),
        });
        self.scroll_chat_to_bottom();
    }

    /// Request suggestions for a category. Ignored while another category
    /// request is outstanding.
    pub fn select_message_type(&mut self, message_type: MessageType) {
        if self.category_loading.is_some() {
            return;
        }
        tracing::info!(message_type = message_type.as_str(), "category selected");
        self.active_type = message_type;
        self.dispatch(AssistRequest::Category(message_type));
    }

    pub fn dispatch(&mut self, request: AssistRequest) {
        match request {
            AssistRequest::Category(message_type) => self.category_loading = Some(message_type),
            _ => self.message_loading += 1,
        }

        tracing::debug!(kind = request.kind(), "dispatching request");
        let client = self.client.clone();
        let context = self.context.clone();
        let task_request = request.clone();
        let task = tokio::spawn(async move { assist::run(&client, &task_request, &context).await });
        self.pending.push(PendingRequest { request, task });
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Apply every request that finished since the last poll.
    pub async fn poll_tasks(&mut self) {
        let mut still_running = Vec::with_capacity(self.pending.len());
        let mut finished = Vec::new();
        for pending in self.pending.drain(..) {
            if pending.task.is_finished() {
                finished.push(pending);
            } else {
                still_running.push(pending);
            }
        }
        self.pending = still_running;

        for PendingRequest { request, task } in finished {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(kind = request.kind(), error = %e, "request task failed");
                    Err(parley_core::AssistantError::Task(e.to_string()))
                }
            };
            self.complete_request(&request, result);
        }
    }

    /// Record the outcome of one request. Loading state is always released.
    pub fn complete_request(
        &mut self,
        request: &AssistRequest,
        result: parley_core::Result<Option<ChatLogEntry>>,
    ) {
        match request {
            AssistRequest::Category(_) => self.category_loading = None,
            _ => self.message_loading = self.message_loading.saturating_sub(1),
        }

        match result {
            Ok(Some(entry)) => {
                self.chat_log.push(entry);
                self.scroll_chat_to_bottom();
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(kind = request.kind(), error = %e, "request failed");
                self.alert = Some(request.failure_message(&e));
            }
        }
    }

    /// Copy the selected entry's rewrite (or original input).
    pub fn copy_selected(&mut self, now: Instant) {
        let Some(index) = self.selected_entry else {
            return;
        };
        let Some(text) = self.chat_log.get(index).and_then(|e| e.copy_text()) else {
            return;
        };

        match self.clipboard.write_text(text) {
            Ok(()) => self.copy.confirm(index, now),
            Err(e) => {
                tracing::warn!(error = %e, "copy to clipboard failed");
                self.alert = Some("Failed to copy to clipboard.".to_string());
            }
        }
    }

    /// True while a send's rewrite or input review is outstanding.
    pub fn is_generating(&self) -> bool {
        self.message_loading > 0
    }

    pub fn is_loading(&self) -> bool {
        self.message_loading > 0 || self.category_loading.is_some()
    }

    /// Tick animation frame and expire transient indicators.
    pub fn tick(&mut self, now: Instant) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.copy.tick(now);
        self.api_key_form.tick(now);
    }

    pub fn save_api_key(&mut self, now: Instant) {
        self.api_key_form.save(self.store.as_ref(), now);
    }

    pub fn open_settings(&mut self) {
        self.api_key_form = ApiKeyForm::new();
        self.api_key_form.load(self.store.as_ref());
        self.screen = Screen::Settings;
    }

    // Log navigation
    pub fn select_next_entry(&mut self) {
        let len = self.chat_log.len();
        if len == 0 {
            return;
        }
        self.selected_entry = Some(match self.selected_entry {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        });
    }

    pub fn select_prev_entry(&mut self) {
        if self.chat_log.is_empty() {
            return;
        }
        self.selected_entry = Some(match self.selected_entry {
            Some(i) => i.saturating_sub(1),
            None => self.chat_log.len() - 1,
        });
    }

    /// Scroll so the last rendered row of the log is visible. Before the
    /// first draw the panel size is unknown, so a nominal size is assumed.
    pub fn scroll_chat_to_bottom(&mut self) {
        let width = if self.chat_width > 0 { self.chat_width } else { 48 };
        let visible = if self.chat_height > 0 { self.chat_height } else { 20 };
        let total = crate::ui::chat_lines(self, width).len();
        self.chat_scroll = u16::try_from(total).unwrap_or(u16::MAX).saturating_sub(visible);
    }
}
