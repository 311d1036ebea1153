use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::tui::AppEvent;

/// Lines scrolled per mouse wheel notch
const WHEEL_SCROLL_LINES: u16 = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => app.scroll_to_bottom(),
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            app.should_quit = true;
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.submit(),

        // Chat scrolling
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => {
            let lines = app.half_page();
            app.scroll_up(lines);
        }
        KeyCode::PageDown => {
            let lines = app.half_page();
            app.scroll_down(lines);
        }

        // Prompt editing
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let prompt = app.session.prompt_mut();
                let byte_pos = char_to_byte_index(prompt, app.input_cursor);
                prompt.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let prompt = app.session.prompt_mut();
            if app.input_cursor < prompt.chars().count() {
                let byte_pos = char_to_byte_index(prompt, app.input_cursor);
                prompt.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.session.prompt().chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.session.prompt().chars().count();
        }
        KeyCode::Char(c) => {
            let prompt = app.session.prompt_mut();
            let byte_pos = char_to_byte_index(prompt, app.input_cursor);
            prompt.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_SCROLL_LINES),
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_SCROLL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        let s = "héllo";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 2), 3);
        assert_eq!(char_to_byte_index(s, 10), s.len());
    }

    #[test]
    fn test_typing_and_cursor_editing() {
        let mut app = test_app(false);
        type_text(&mut app, "helo");
        press(&mut app, KeyCode::Left);
        type_text(&mut app, "l");
        assert_eq!(app.session.prompt(), "hello");
        assert_eq!(app.input_cursor, 4);

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.session.prompt(), "hell");

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.session.prompt(), "ell");
        assert_eq!(app.input_cursor, 0);

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.session.prompt(), "ell");
    }

    #[test]
    fn test_editing_non_ascii() {
        let mut app = test_app(false);
        type_text(&mut app, "¿qué?");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.session.prompt(), "¿qu?");
    }

    #[test]
    fn test_enter_on_blank_prompt_does_nothing() {
        let mut app = test_app(false);
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert!(app.query_task.is_none());
        assert!(app.session.messages().is_empty());
        assert!(!app.session.is_loading());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app(false);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);

        let mut app = test_app(false);
        let ctrl_c = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        handle_event(&mut app, AppEvent::Key(ctrl_c));
        assert!(app.should_quit);
        assert_eq!(app.session.prompt(), "");
    }

    #[test]
    fn test_tick_animates_only_while_loading() {
        let mut app = test_app(false);
        handle_event(&mut app, AppEvent::Tick);
        assert_eq!(app.animation_frame, 0);

        app.session.set_prompt("hi");
        app.session.begin_submit();
        handle_event(&mut app, AppEvent::Tick);
        handle_event(&mut app, AppEvent::Tick);
        assert_eq!(app.animation_frame, 2);
        handle_event(&mut app, AppEvent::Tick);
        assert_eq!(app.animation_frame, 0);
    }

    #[test]
    fn test_resize_keeps_latest_message_visible() {
        let mut app = test_app(false);
        app.chat_height = 4;
        app.chat_width = 10;
        app.session.set_prompt("x".repeat(25));
        app.session.begin_submit();
        assert_eq!(app.chat_scroll, 0);

        handle_event(&mut app, AppEvent::Resize);
        assert_eq!(app.chat_scroll, 3);
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 2, 4, 3);
        assert!(point_in_rect(2, 2, rect));
        assert!(point_in_rect(5, 4, rect));
        assert!(!point_in_rect(6, 4, rect));
        assert!(!point_in_rect(1, 3, rect));
    }
}
