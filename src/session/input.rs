use crate::session::game::GameSession;

/// Longest answer the field accepts, in chars.
pub const MAX_ANSWER_CHARS: usize = 64;

pub fn process_char(session: &mut GameSession, ch: char) -> bool {
    if ch.is_control() {
        return false;
    }
    match session.input_mut() {
        Some(input) if input.chars().count() < MAX_ANSWER_CHARS => {
            input.push(ch);
            true
        }
        _ => false,
    }
}

pub fn process_backspace(session: &mut GameSession) -> bool {
    match session.input_mut() {
        Some(input) => input.pop().is_some(),
        None => false,
    }
}

/// Delete the last word (unix-word-rubout: trailing whitespace, then the
/// word before it).
pub fn process_delete_word(session: &mut GameSession) -> bool {
    let Some(input) = session.input_mut() else {
        return false;
    };
    let before = input.len();
    let trimmed = input.trim_end_matches(char::is_whitespace).len();
    input.truncate(trimmed);
    let cut = input
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    input.truncate(cut);
    input.len() != before
}

pub fn process_clear(session: &mut GameSession) -> bool {
    match session.input_mut() {
        Some(input) if !input.is_empty() => {
            input.clear();
            true
        }
        _ => false,
    }
}
