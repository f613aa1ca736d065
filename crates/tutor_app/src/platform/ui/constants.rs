use ratatui::style::Color;

pub const TITLE_AGENTS: &str = " Agents ";
pub const TITLE_CHAT: &str = " Conversation ";
pub const INPUT_PROMPT: &str = "> ";
pub const KEY_HINT: &str = "Enter send | Tab agent | F2 topic | /help | Esc quit";
pub const NO_STATUS_YET: &str = "no status received yet";

pub const STATUS_ROW_HEIGHT: u16 = 3;
pub const INPUT_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 1;

pub const COLOR_ONLINE: Color = Color::Green;
pub const COLOR_BUSY: Color = Color::Yellow;
pub const COLOR_OFFLINE: Color = Color::Red;
pub const COLOR_UNKNOWN: Color = Color::Gray;

pub const COLOR_USER: Color = Color::Cyan;
pub const COLOR_ASSISTANT: Color = Color::White;
pub const COLOR_SYSTEM: Color = Color::DarkGray;
pub const COLOR_NOTICE: Color = Color::Red;
