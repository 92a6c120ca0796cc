//! Fixed strings shown by the widget

use serde::Serialize;

/// First turn of every transcript
pub const GREETING: &str = "Hi there! 👋🏻 Thanks for visiting my website. Feel free to ask me anything about programming, web development, or my experiences in tech. Let me know how I can help!";

/// Bot turn appended when the answering service fails
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong! ❌";

pub const BOT_NAME: &str = "Yuri";
pub const STATUS: &str = "Online";
pub const DISCLAIMER: &str = "This AI is currently in its training phase (beta version). While it's learning and improving, it may not be fully polished yet. Your feedback and patience are appreciated!";
pub const TYPING_LABEL: &str = "Typing...";
pub const INPUT_PLACEHOLDER: &str = "Type a message...";

/// Header and indicator strings for the page
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Persona {
    pub name: &'static str,
    pub status: &'static str,
    pub disclaimer: &'static str,
    pub typing_label: &'static str,
    pub input_placeholder: &'static str,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: BOT_NAME,
            status: STATUS,
            disclaimer: DISCLAIMER,
            typing_label: TYPING_LABEL,
            input_placeholder: INPUT_PLACEHOLDER,
        }
    }
}
