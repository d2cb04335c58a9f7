//! Keyboard layout - packs buttons into bounded row/column grids

use serde::{Deserialize, Serialize};

use super::Callback;

/// Column bound used when an inline keyboard leaves `columns` at zero
pub const DEFAULT_COLUMNS: u8 = 3;
/// Row bound used when an inline keyboard leaves `rows` at zero
pub const DEFAULT_ROWS: u8 = 8;
/// Buttons per row used when a reply keyboard leaves `columns` at zero
pub const DEFAULT_REPLY_COLUMNS: usize = 1;

/// Inline button as sent to the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    pub fn is_empty(&self) -> bool {
        self.inline_keyboard.iter().all(Vec::is_empty)
    }

    pub fn button_count(&self) -> usize {
        self.inline_keyboard.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

/// Any markup that can accompany an outgoing text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Inline(InlineKeyboardMarkup),
    Reply(ReplyKeyboardMarkup),
}

impl From<InlineKeyboardMarkup> for ReplyMarkup {
    fn from(markup: InlineKeyboardMarkup) -> Self {
        ReplyMarkup::Inline(markup)
    }
}

impl From<ReplyKeyboardMarkup> for ReplyMarkup {
    fn from(markup: ReplyKeyboardMarkup) -> Self {
        ReplyMarkup::Reply(markup)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Button {
    label: String,
    value: String,
    stand_alone: bool,
}

/// Builder for inline keyboards.
///
/// Buttons are laid out left to right, at most `columns` per row. A
/// stand-alone button always gets a row of its own. Once `rows` rows have
/// been filled, the remaining buttons are dropped.
#[derive(Debug, Clone, Default)]
pub struct InlineKeyboard {
    buttons: Vec<Button>,
    pub columns: u8,
    pub rows: u8,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, columns: u8) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_rows(mut self, rows: u8) -> Self {
        self.rows = rows;
        self
    }

    pub fn add_button(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.buttons.push(Button {
            label: label.into(),
            value: value.into(),
            stand_alone: false,
        });
    }

    pub fn add_stand_alone_button(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.buttons.push(Button {
            label: label.into(),
            value: value.into(),
            stand_alone: true,
        });
    }

    /// Add a button whose value is the encoded callback
    pub fn add_callback_button(&mut self, label: impl Into<String>, callback: &Callback) {
        self.add_button(label, callback.encode());
    }

    fn effective_columns(&self) -> usize {
        usize::from(if self.columns == 0 { DEFAULT_COLUMNS } else { self.columns })
    }

    fn effective_rows(&self) -> usize {
        usize::from(if self.rows == 0 { DEFAULT_ROWS } else { self.rows })
    }

    pub fn to_markup(&self) -> InlineKeyboardMarkup {
        let columns = self.effective_columns();
        let max_rows = self.effective_rows();

        let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::with_capacity(max_rows);
        // Fill of the current row; `columns` marks it as closed
        let mut fill = columns;
        let mut processed = 0usize;

        for btn in &self.buttons {
            let mark = InlineKeyboardButton {
                text: btn.label.clone(),
                callback_data: btn.value.clone(),
            };

            if btn.stand_alone || fill >= columns {
                if rows.len() >= max_rows {
                    break;
                }
                rows.push(Vec::with_capacity(columns));
                fill = 0;
            }

            if let Some(row) = rows.last_mut() {
                row.push(mark);
            }

            if btn.stand_alone {
                fill = columns;
                continue;
            }

            fill += 1;
            processed += 1;
        }

        let placed: usize = rows.iter().map(Vec::len).sum();
        if placed < self.buttons.len() {
            tracing::debug!(
                "Keyboard truncated at {} rows: {} of {} buttons placed ({} regular)",
                max_rows,
                placed,
                self.buttons.len(),
                processed
            );
        }

        InlineKeyboardMarkup { inline_keyboard: rows }
    }
}

/// Builder for reply (non-inline) keyboards. Wraps every `columns` keys.
#[derive(Debug, Clone)]
pub struct Keyboard {
    keys: Vec<String>,
    pub columns: usize,
    pub resize_keyboard: bool,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            columns: 0,
            resize_keyboard: true,
        }
    }
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn add_key(&mut self, value: impl Into<String>) {
        self.keys.push(value.into());
    }

    pub fn to_markup(&self) -> ReplyKeyboardMarkup {
        let columns = if self.columns == 0 { DEFAULT_REPLY_COLUMNS } else { self.columns };

        let keyboard = self
            .keys
            .chunks(columns)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|k| KeyboardButton { text: k.clone() })
                    .collect()
            })
            .collect();

        ReplyKeyboardMarkup {
            keyboard,
            resize_keyboard: self.resize_keyboard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(markup: &InlineKeyboardMarkup) -> Vec<Vec<&str>> {
        markup
            .inline_keyboard
            .iter()
            .map(|row| row.iter().map(|b| b.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_row_bound_drops_remaining_buttons() {
        let mut kb = InlineKeyboard::new().with_columns(3).with_rows(2);
        for i in 1..=7 {
            kb.add_button(format!("b{}", i), format!("v{}", i));
        }

        let markup = kb.to_markup();
        assert_eq!(
            labels(&markup),
            vec![vec!["b1", "b2", "b3"], vec!["b4", "b5", "b6"]]
        );
    }

    #[test]
    fn test_stand_alone_button_gets_own_row() {
        let mut kb = InlineKeyboard::new().with_columns(2);
        kb.add_button("a", "a");
        kb.add_button("b", "b");
        kb.add_stand_alone_button("c", "c");
        kb.add_button("d", "d");

        let markup = kb.to_markup();
        assert_eq!(labels(&markup), vec![vec!["a", "b"], vec!["c"], vec!["d"]]);
    }

    #[test]
    fn test_stand_alone_breaks_partial_row() {
        let mut kb = InlineKeyboard::new().with_columns(3);
        kb.add_button("a", "a");
        kb.add_stand_alone_button("b", "b");
        kb.add_button("c", "c");
        kb.add_button("d", "d");

        assert_eq!(labels(&kb.to_markup()), vec![vec!["a"], vec!["b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_stand_alone_counts_toward_row_bound() {
        let mut kb = InlineKeyboard::new().with_columns(3).with_rows(2);
        kb.add_stand_alone_button("x", "x");
        kb.add_stand_alone_button("y", "y");
        kb.add_button("z", "z");

        assert_eq!(labels(&kb.to_markup()), vec![vec!["x"], vec!["y"]]);
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let mut kb = InlineKeyboard::new();
        for i in 0..30 {
            kb.add_button(i.to_string(), i.to_string());
        }

        let markup = kb.to_markup();
        assert_eq!(markup.inline_keyboard.len(), DEFAULT_ROWS as usize);
        assert!(markup
            .inline_keyboard
            .iter()
            .all(|row| row.len() == DEFAULT_COLUMNS as usize));
        assert_eq!(kb.columns, 0);
    }

    #[test]
    fn test_empty_keyboard_has_no_rows() {
        let markup = InlineKeyboard::new().to_markup();
        assert!(markup.inline_keyboard.is_empty());
        assert!(markup.is_empty());
    }

    #[test]
    fn test_values_are_kept() {
        let mut kb = InlineKeyboard::new();
        kb.add_button("Yes", "answer:yes");

        let markup = kb.to_markup();
        assert_eq!(markup.inline_keyboard[0][0].callback_data, "answer:yes");
    }

    #[test]
    fn test_reply_keyboard_wraps_every_n() {
        let mut kb = Keyboard::new().with_columns(2);
        for key in ["a", "b", "c", "d", "e"] {
            kb.add_key(key);
        }

        let markup = kb.to_markup();
        let rows: Vec<Vec<&str>> = markup
            .keyboard
            .iter()
            .map(|row| row.iter().map(|k| k.text.as_str()).collect())
            .collect();
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]);
        assert!(markup.resize_keyboard);
    }

    #[test]
    fn test_reply_keyboard_defaults_to_one_column() {
        let mut kb = Keyboard::new();
        kb.add_key("a");
        kb.add_key("b");

        assert_eq!(kb.to_markup().keyboard.len(), 2);
    }

    #[test]
    fn test_markup_serializes_for_telegram() {
        let mut kb = InlineKeyboard::new();
        kb.add_button("Go", "go");
        let markup: ReplyMarkup = kb.to_markup().into();

        let json = serde_json::to_value(&markup).unwrap();
        assert_eq!(json["inline_keyboard"][0][0]["text"], "Go");
        assert_eq!(json["inline_keyboard"][0][0]["callback_data"], "go");
    }
}
