use std::sync::Arc;

use chatbot_core::{ChatClient, ChatError, ChatSession};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::debug;

pub type QueryTask = JoinHandle<Result<String, ChatError>>;

pub struct App {
    pub should_quit: bool,

    // Conversation, prompt and loading flag
    pub session: ChatSession,
    pub input_cursor: usize,

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub chat_area: Option<Rect>,
    pub animation_frame: u8,

    // In-flight completion request, if any
    pub query_task: Option<QueryTask>,

    pub model: String,
    client: Arc<dyn ChatClient>,
}

impl App {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            session: ChatSession::new(),
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            animation_frame: 0,
            query_task: None,
            model: model.into(),
            client,
        }
    }

    /// Submit the prompt and start the completion request in the background.
    ///
    /// Blank prompts and submissions while a request is outstanding are ignored.
    pub fn submit(&mut self) {
        if self.query_task.is_some() {
            return;
        }
        let Some(history) = self.session.begin_submit() else {
            return;
        };

        debug!(turns = history.len(), "spawning completion request");
        let client = Arc::clone(&self.client);
        self.query_task = Some(tokio::spawn(async move { client.complete(&history).await }));

        // Scroll to bottom so "Thinking..." is visible
        self.scroll_to_bottom();
    }

    /// Apply the outcome of a finished request task. Returns whether one finished.
    pub async fn poll_query(&mut self) -> bool {
        if !self.query_task.as_ref().is_some_and(|task| task.is_finished()) {
            return false;
        }
        let Some(task) = self.query_task.take() else {
            return false;
        };

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(ChatError::Task(e.to_string())),
        };
        self.session.finish(outcome);

        // The prompt may have been cleared under the cursor
        self.input_cursor = self.input_cursor.min(self.session.prompt().chars().count());
        self.scroll_to_bottom();
        true
    }

    /// Abort any in-flight request; used on quit
    pub fn shutdown(&mut self) {
        if let Some(task) = self.query_task.take() {
            debug!("aborting in-flight completion request");
            task.abort();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max_scroll = self.total_chat_lines().saturating_sub(self.visible_chat_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn half_page(&self) -> u16 {
        (self.visible_chat_height() / 2).max(1)
    }

    /// Scroll chat to bottom so the latest message is visible
    pub fn scroll_to_bottom(&mut self) {
        let total_lines = self.total_chat_lines();
        let visible_height = self.visible_chat_height();

        if total_lines > visible_height {
            self.chat_scroll = total_lines - visible_height;
        }
    }

    fn visible_chat_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Estimate of rendered chat lines, matching the layout in `ui::render_chat`
    fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.session.messages() {
            total_lines = total_lines.saturating_add(1); // Label line ("Question:" or "Answer:")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 { 1 } else { char_count.div_ceil(wrap_width) };
                total_lines = total_lines.saturating_add(u16::try_from(wrapped).unwrap_or(u16::MAX));
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.session.is_loading() {
            total_lines = total_lines.saturating_add(2); // "Answer:" + "Thinking..."
        }

        total_lines
    }
}
