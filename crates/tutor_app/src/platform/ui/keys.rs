use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tutor_core::Msg;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Dispatch(Msg),
    Redraw,
    Quit,
    Ignore,
}

/// Maps a terminal event to a core message, given the current input line.
pub fn map_event(event: &Event, input: &str) -> KeyAction {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => map_key(key, input),
        Event::Paste(text) => {
            let pasted = text.replace(['\r', '\n'], " ");
            KeyAction::Dispatch(Msg::InputChanged(format!("{input}{pasted}")))
        }
        Event::Resize(..) => KeyAction::Redraw,
        _ => KeyAction::Ignore,
    }
}

fn map_key(key: &KeyEvent, input: &str) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Char('u') if ctrl => KeyAction::Dispatch(Msg::InputChanged(String::new())),
        KeyCode::Enter => KeyAction::Dispatch(Msg::InputSubmitted),
        KeyCode::Tab => KeyAction::Dispatch(Msg::AgentCycled),
        KeyCode::F(2) => KeyAction::Dispatch(Msg::TopicCycled),
        KeyCode::Backspace => {
            let mut next = input.to_string();
            match next.pop() {
                Some(_) => KeyAction::Dispatch(Msg::InputChanged(next)),
                None => KeyAction::Ignore,
            }
        }
        KeyCode::Char(c) if !ctrl => KeyAction::Dispatch(Msg::InputChanged(format!("{input}{c}"))),
        _ => KeyAction::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn typing_extends_the_input() {
        assert_eq!(
            map_event(&press(KeyCode::Char('s')), "hi"),
            KeyAction::Dispatch(Msg::InputChanged("his".to_string()))
        );
    }

    #[test]
    fn backspace_on_empty_input_is_ignored() {
        assert_eq!(map_event(&press(KeyCode::Backspace), ""), KeyAction::Ignore);
        assert_eq!(
            map_event(&press(KeyCode::Backspace), "héé"),
            KeyAction::Dispatch(Msg::InputChanged("hé".to_string()))
        );
    }

    #[test]
    fn navigation_keys_map_to_core_messages() {
        assert_eq!(
            map_event(&press(KeyCode::Enter), "x"),
            KeyAction::Dispatch(Msg::InputSubmitted)
        );
        assert_eq!(
            map_event(&press(KeyCode::Tab), ""),
            KeyAction::Dispatch(Msg::AgentCycled)
        );
        assert_eq!(
            map_event(&press(KeyCode::F(2)), ""),
            KeyAction::Dispatch(Msg::TopicCycled)
        );
        assert_eq!(map_event(&press(KeyCode::Esc), ""), KeyAction::Quit);
    }

    #[test]
    fn ctrl_c_quits_instead_of_typing() {
        let event = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&event, "abc"), KeyAction::Quit);
    }

    #[test]
    fn paste_flattens_newlines() {
        let event = Event::Paste("line one\nline two".to_string());
        assert_eq!(
            map_event(&event, "> "),
            KeyAction::Dispatch(Msg::InputChanged("> line one line two".to_string()))
        );
    }

    #[test]
    fn key_release_is_ignored() {
        let mut key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_event(&Event::Key(key), ""), KeyAction::Ignore);
    }
}
