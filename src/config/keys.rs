//! Key bindings and vim-style key notation ("C-x", "M-S-w", "<Left>")

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

use crate::ui::action::Action;

/// A key combination (key code + modifiers)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Normalize a key event to the form produced by [`parse_key_notation`]:
    /// uppercase characters become lowercase + SHIFT, so "G" in config
    /// matches Shift+g. Shifted symbols ("?", "$") already carry the shift
    /// in the character and drop the modifier.
    pub fn from_key_event(event: &KeyEvent) -> Self {
        match event.code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => Self {
                code: KeyCode::Char(c.to_ascii_lowercase()),
                modifiers: event.modifiers | KeyModifiers::SHIFT,
            },
            KeyCode::Char(c) if !c.is_alphabetic() => Self {
                code: event.code,
                modifiers: event.modifiers.difference(KeyModifiers::SHIFT),
            },
            _ => Self {
                code: event.code,
                modifiers: event.modifiers,
            },
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("C".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("M".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("S".to_string());
        }

        let key = match self.code {
            KeyCode::Char(' ') => "<Space>".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "<CR>".to_string(),
            KeyCode::Esc => "<Esc>".to_string(),
            KeyCode::Tab => "<Tab>".to_string(),
            KeyCode::Backspace => "<BS>".to_string(),
            KeyCode::Up => "<Up>".to_string(),
            KeyCode::Down => "<Down>".to_string(),
            KeyCode::Left => "<Left>".to_string(),
            KeyCode::Right => "<Right>".to_string(),
            KeyCode::PageUp => "<PageUp>".to_string(),
            KeyCode::PageDown => "<PageDown>".to_string(),
            KeyCode::Home => "<Home>".to_string(),
            KeyCode::End => "<End>".to_string(),
            KeyCode::F(n) => format!("<F{n}>"),
            other => format!("{other:?}"),
        };
        parts.push(key);
        write!(f, "{}", parts.join("-"))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("empty key notation")]
    Empty,
    #[error("no key specified")]
    NoKey,
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("invalid modifier: {0}")]
    InvalidModifier(String),
    #[error("invalid special key: {0}")]
    InvalidSpecialKey(String),
}

/// Key → action table
#[derive(Debug, Clone, Default)]
pub struct KeybindingConfig {
    pub bindings: HashMap<KeyCombo, Action>,
}

impl KeybindingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `notation` to `action`. Invalid notation is reported and nothing
    /// is bound.
    pub fn bind(&mut self, notation: &str, action: Action) -> Result<(), KeyParseError> {
        let combo = parse_key_notation(notation)?;
        self.bindings.insert(combo, action);
        Ok(())
    }

    pub fn get_action(&self, key: &KeyCombo) -> Option<Action> {
        self.bindings.get(key).copied()
    }

    /// Resolve a raw key event
    pub fn action_for(&self, event: &KeyEvent) -> Option<Action> {
        self.get_action(&KeyCombo::from_key_event(event))
    }

    /// Keys bound to `action`, sorted for display
    pub fn keys_for(&self, action: Action) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| k.to_string())
            .collect();
        keys.sort();
        keys
    }

    /// Layer user bindings on top of these
    pub fn merge(&mut self, other: KeybindingConfig) {
        self.bindings.extend(other.bindings);
    }
}

/// Parse a vim-style key notation string.
///
/// - `C-x` Ctrl, `M-x` Alt, `S-x` Shift, combinable (`C-S-x`)
/// - uppercase letters imply Shift (`G` = `S-g`)
/// - `<CR>`, `<Esc>`, `<Tab>`, `<BS>`, `<Space>`, `<Up>`, `<Down>`, `<Left>`,
///   `<Right>`, `<PageUp>`, `<PageDown>`, `<Home>`, `<End>`, `<F1>`..`<F12>`,
///   with optional modifiers inside the brackets (`<S-Left>`)
pub fn parse_key_notation(s: &str) -> Result<KeyCombo, KeyParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(KeyParseError::Empty);
    }
    if s.starts_with('<') && s.ends_with('>') && s.len() > 2 {
        return parse_special_key(&s[1..s.len() - 1]);
    }

    // A lone "-" is the minus key, not an empty modifier list.
    if s == "-" {
        return Ok(KeyCombo::new(KeyCode::Char('-'), KeyModifiers::NONE));
    }

    let parts: Vec<&str> = s.split('-').collect();
    let (key_part, modifier_parts) = parts.split_last().ok_or(KeyParseError::NoKey)?;
    let mut modifiers = parse_modifiers(modifier_parts)?;

    if key_part.is_empty() {
        return Err(KeyParseError::NoKey);
    }
    let code = if key_part.starts_with('<') && key_part.ends_with('>') && key_part.len() > 2 {
        let special = parse_special_key(&key_part[1..key_part.len() - 1])?;
        modifiers |= special.modifiers;
        special.code
    } else {
        let (code, needs_shift) = parse_key_code(key_part)?;
        if needs_shift {
            modifiers |= KeyModifiers::SHIFT;
        }
        code
    };
    Ok(KeyCombo::new(code, modifiers))
}

fn parse_modifiers(parts: &[&str]) -> Result<KeyModifiers, KeyParseError> {
    let mut modifiers = KeyModifiers::NONE;
    for part in parts {
        match *part {
            "C" => modifiers |= KeyModifiers::CONTROL,
            "M" | "A" => modifiers |= KeyModifiers::ALT,
            "S" => modifiers |= KeyModifiers::SHIFT,
            other => return Err(KeyParseError::InvalidModifier(other.to_string())),
        }
    }
    Ok(modifiers)
}

/// Bracketed key name without the brackets, e.g. `S-Left`
fn parse_special_key(inner: &str) -> Result<KeyCombo, KeyParseError> {
    let parts: Vec<&str> = inner.split('-').collect();
    let (name, modifier_parts) = parts.split_last().ok_or(KeyParseError::NoKey)?;
    let modifiers = parse_modifiers(modifier_parts)?;

    let code = match name.to_uppercase().as_str() {
        "CR" | "ENTER" | "RETURN" => KeyCode::Enter,
        "ESC" | "ESCAPE" => KeyCode::Esc,
        "TAB" => KeyCode::Tab,
        "BS" | "BACKSPACE" => KeyCode::Backspace,
        "UP" => KeyCode::Up,
        "DOWN" => KeyCode::Down,
        "LEFT" => KeyCode::Left,
        "RIGHT" => KeyCode::Right,
        "PAGEUP" | "PGUP" => KeyCode::PageUp,
        "PAGEDOWN" | "PGDN" => KeyCode::PageDown,
        "HOME" => KeyCode::Home,
        "END" => KeyCode::End,
        "SPACE" => KeyCode::Char(' '),
        n if n.starts_with('F') && n.len() > 1 => {
            let num: u8 = n[1..]
                .parse()
                .map_err(|_| KeyParseError::InvalidSpecialKey(name.to_string()))?;
            if num == 0 || num > 12 {
                return Err(KeyParseError::InvalidSpecialKey(name.to_string()));
            }
            KeyCode::F(num)
        }
        _ => return Err(KeyParseError::InvalidSpecialKey(name.to_string())),
    };
    Ok(KeyCombo::new(code, modifiers))
}

/// Single character key. Returns whether SHIFT is implied.
fn parse_key_code(s: &str) -> Result<(KeyCode, bool), KeyParseError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok((KeyCode::Char(c.to_ascii_lowercase()), c.is_ascii_uppercase())),
        _ => match s.to_uppercase().as_str() {
            "SPACE" => Ok((KeyCode::Char(' '), false)),
            "TAB" => Ok((KeyCode::Tab, false)),
            "ENTER" | "CR" => Ok((KeyCode::Enter, false)),
            "ESC" => Ok((KeyCode::Esc, false)),
            _ => Err(KeyParseError::InvalidKey(s.to_string())),
        },
    }
}

impl FromStr for KeyCombo {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key_notation(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_parse_simple_and_modified_keys() {
        let key = parse_key_notation("a").unwrap();
        assert_eq!(key, KeyCombo::new(KeyCode::Char('a'), KeyModifiers::NONE));

        let key = parse_key_notation("C-x").unwrap();
        assert_eq!(key, KeyCombo::new(KeyCode::Char('x'), KeyModifiers::CONTROL));

        let key = parse_key_notation("M-S-w").unwrap();
        assert_eq!(key.modifiers, KeyModifiers::ALT | KeyModifiers::SHIFT);
    }

    #[test]
    fn test_parse_special_keys() {
        assert_eq!(parse_key_notation("<Left>").unwrap().code, KeyCode::Left);
        assert_eq!(parse_key_notation("<End>").unwrap().code, KeyCode::End);
        assert_eq!(parse_key_notation("<Space>").unwrap().code, KeyCode::Char(' '));
        assert_eq!(parse_key_notation("<F5>").unwrap().code, KeyCode::F(5));

        let key = parse_key_notation("<S-Right>").unwrap();
        assert_eq!(key, KeyCombo::new(KeyCode::Right, KeyModifiers::SHIFT));
        let key = parse_key_notation("S-<Left>").unwrap();
        assert_eq!(key, KeyCombo::new(KeyCode::Left, KeyModifiers::SHIFT));
    }

    #[test]
    fn test_parse_punctuation() {
        assert_eq!(parse_key_notation("[").unwrap().code, KeyCode::Char('['));
        assert_eq!(parse_key_notation("-").unwrap().code, KeyCode::Char('-'));
        assert_eq!(parse_key_notation("?").unwrap().code, KeyCode::Char('?'));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_key_notation("  "), Err(KeyParseError::Empty));
        assert_eq!(parse_key_notation("C-"), Err(KeyParseError::NoKey));
        assert!(matches!(
            parse_key_notation("X-a"),
            Err(KeyParseError::InvalidModifier(_))
        ));
        assert!(matches!(
            parse_key_notation("<Hyper>"),
            Err(KeyParseError::InvalidSpecialKey(_))
        ));
        assert!(matches!(
            parse_key_notation("<F13>"),
            Err(KeyParseError::InvalidSpecialKey(_))
        ));
        assert!(matches!(
            parse_key_notation("abc"),
            Err(KeyParseError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_uppercase_implies_shift() {
        let upper = parse_key_notation("G").unwrap();
        assert_eq!(upper, KeyCombo::new(KeyCode::Char('g'), KeyModifiers::SHIFT));
        assert_ne!(upper, parse_key_notation("g").unwrap());

        let combo = KeyCombo::from_key_event(&event(KeyCode::Char('G'), KeyModifiers::SHIFT));
        assert_eq!(combo, upper);
    }

    #[test]
    fn test_shifted_symbol_matches_plain_notation() {
        let combo = KeyCombo::from_key_event(&event(KeyCode::Char('?'), KeyModifiers::SHIFT));
        assert_eq!(combo, parse_key_notation("?").unwrap());
    }

    #[test]
    fn test_from_key_event_leaves_special_keys() {
        let combo = KeyCombo::from_key_event(&event(KeyCode::Left, KeyModifiers::SHIFT));
        assert_eq!(combo, KeyCombo::new(KeyCode::Left, KeyModifiers::SHIFT));
    }

    #[test]
    fn test_display_round_trips() {
        for notation in ["C-x", "<CR>", "S-<Left>", "<Space>", "g", "<F3>"] {
            let combo = parse_key_notation(notation).unwrap();
            assert_eq!(parse_key_notation(&combo.to_string()).unwrap(), combo);
        }
        let key = KeyCombo::new(KeyCode::Char('w'), KeyModifiers::CONTROL | KeyModifiers::SHIFT);
        assert_eq!(key.to_string(), "C-S-w");
    }

    #[test]
    fn test_merge_overrides_and_keeps_defaults() {
        let mut base = KeybindingConfig::new();
        base.bind("q", Action::Quit).unwrap();
        base.bind("<Left>", Action::StepBack).unwrap();

        let mut user = KeybindingConfig::new();
        user.bind("<Left>", Action::StepBackMany).unwrap();
        user.bind("h", Action::StepBack).unwrap();
        base.merge(user);

        let left = parse_key_notation("<Left>").unwrap();
        assert_eq!(base.get_action(&left), Some(Action::StepBackMany));
        assert_eq!(base.keys_for(Action::StepBack), vec!["h".to_string()]);
        assert_eq!(
            base.action_for(&event(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(Action::Quit)
        );
    }
}
