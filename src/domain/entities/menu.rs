//! Menus - named pages rendered into inline keyboards

use std::fmt;
use std::sync::Arc;

use super::{Callback, InlineKeyboard, InlineKeyboardMarkup, MAX_CALLBACK_DATA};
use crate::application::errors::ConfigError;

/// A renderable menu page.
///
/// Rendering must be a pure function of the menu's own state.
pub trait Menu: Send + Sync + fmt::Debug {
    /// Unique name used as a transition target
    fn name(&self) -> &str;

    /// Text sent above the keyboard
    fn title(&self) -> &str;

    /// Render the current page
    fn page(&self) -> InlineKeyboardMarkup;

    fn title_for(&self, _locale: Option<&str>) -> &str {
        self.title()
    }

    fn page_for(&self, _locale: Option<&str>) -> InlineKeyboardMarkup {
        self.page()
    }

    /// Menus reachable from this one that must be registered with it
    fn submenus(&self) -> Vec<Arc<dyn Menu>> {
        Vec::new()
    }

    /// Reject pages the transport could not deliver
    fn validate(&self) -> Result<(), ConfigError> {
        check_payloads(self.name(), &self.page())
    }
}

/// Every button value must fit the transport's callback data field
fn check_payloads(menu: &str, markup: &InlineKeyboardMarkup) -> Result<(), ConfigError> {
    for button in markup.inline_keyboard.iter().flatten() {
        if button.callback_data.len() > MAX_CALLBACK_DATA {
            return Err(ConfigError::InvalidValue(format!(
                "menu {}: button '{}' carries {} bytes of callback data, limit is {}",
                menu,
                button.text,
                button.callback_data.len(),
                MAX_CALLBACK_DATA
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct MenuItem {
    label: String,
    callback: Callback,
    stand_alone: bool,
}

/// A plain menu page
#[derive(Debug, Clone)]
pub struct MenuPage {
    name: String,
    title: String,
    items: Vec<MenuItem>,
    children: Vec<Arc<dyn Menu>>,
    columns: u8,
    rows: u8,
}

impl MenuPage {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            items: Vec::new(),
            children: Vec::new(),
            columns: 0,
            rows: 0,
        }
    }

    /// Grid bounds; zero keeps the keyboard defaults
    pub fn with_layout(mut self, columns: u8, rows: u8) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    fn push(mut self, label: impl Into<String>, callback: Callback, stand_alone: bool) -> Self {
        self.items.push(MenuItem {
            label: label.into(),
            callback,
            stand_alone,
        });
        self
    }

    /// Button running a command as if the user typed it
    pub fn command(self, label: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        self.push(label, Callback::call_command(command, args), false)
    }

    /// Button moving to another page by name
    pub fn link(self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.push(label, Callback::transit_to(target), false)
    }

    /// Stand-alone button moving to another page, usually "back"
    pub fn back(self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.push(label, Callback::transit_to(target), true)
    }

    /// Button opening a nested menu, registered together with this one
    pub fn submenu(mut self, label: impl Into<String>, menu: impl Menu + 'static) -> Self {
        let target = menu.name().to_string();
        self.children.push(Arc::new(menu));
        self.push(label, Callback::open_menu(target), false)
    }

    pub fn button(self, label: impl Into<String>, callback: Callback) -> Self {
        self.push(label, callback, false)
    }

    pub fn stand_alone_button(self, label: impl Into<String>, callback: Callback) -> Self {
        self.push(label, callback, true)
    }
}

impl Menu for MenuPage {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn page(&self) -> InlineKeyboardMarkup {
        let mut kb = InlineKeyboard::new()
            .with_columns(self.columns)
            .with_rows(self.rows);
        for item in &self.items {
            if item.stand_alone {
                kb.add_stand_alone_button(&item.label, item.callback.encode());
            } else {
                kb.add_callback_button(&item.label, &item.callback);
            }
        }
        kb.to_markup()
    }

    fn submenus(&self) -> Vec<Arc<dyn Menu>> {
        self.children.clone()
    }
}

/// A menu with one variant per locale.
///
/// The locale is an opaque selector: unknown or missing locales fall back
/// to the default variant.
#[derive(Debug, Clone)]
pub struct LocalizedMenu {
    name: String,
    default_locale: String,
    variants: Vec<(String, Arc<dyn Menu>)>,
}

impl LocalizedMenu {
    pub fn new(name: impl Into<String>, default_locale: impl Into<String>, default: impl Menu + 'static) -> Self {
        let default_locale = default_locale.into();
        Self {
            name: name.into(),
            variants: vec![(default_locale.clone(), Arc::new(default))],
            default_locale,
        }
    }

    pub fn with_variant(mut self, locale: impl Into<String>, menu: impl Menu + 'static) -> Self {
        self.variants.push((locale.into(), Arc::new(menu)));
        self
    }

    fn variant(&self, locale: Option<&str>) -> &dyn Menu {
        let wanted = locale.unwrap_or(&self.default_locale);
        // `new` always stores the default variant first
        self.variants
            .iter()
            .find(|(l, _)| l == wanted)
            .unwrap_or(&self.variants[0])
            .1
            .as_ref()
    }
}

impl Menu for LocalizedMenu {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        self.variant(None).title()
    }

    fn page(&self) -> InlineKeyboardMarkup {
        self.variant(None).page()
    }

    fn title_for(&self, locale: Option<&str>) -> &str {
        self.variant(locale).title()
    }

    fn page_for(&self, locale: Option<&str>) -> InlineKeyboardMarkup {
        self.variant(locale).page()
    }

    /// Same-named children of the variants are merged into one localized
    /// submenu; the first locale that has a child becomes its default.
    fn submenus(&self) -> Vec<Arc<dyn Menu>> {
        let mut merged: Vec<LocalizedMenu> = Vec::new();
        for (locale, variant) in &self.variants {
            for child in variant.submenus() {
                // A name repeated within one locale stays separate so
                // registration reports it as a duplicate
                let slot = merged.iter_mut().find(|m| {
                    m.name == child.name() && m.variants.iter().all(|(l, _)| l != locale)
                });
                match slot {
                    Some(menu) => menu.variants.push((locale.clone(), child)),
                    None => merged.push(LocalizedMenu {
                        name: child.name().to_string(),
                        default_locale: locale.clone(),
                        variants: vec![(locale.clone(), child)],
                    }),
                }
            }
        }

        merged
            .into_iter()
            .map(|mut menu| match menu.variants.len() {
                1 => menu.variants.remove(0).1,
                _ => Arc::new(menu) as Arc<dyn Menu>,
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.variants.iter().try_for_each(|(_, v)| v.validate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CallbackType;

    fn decoded(markup: &InlineKeyboardMarkup, row: usize, col: usize) -> Callback {
        Callback::decode(&markup.inline_keyboard[row][col].callback_data).unwrap()
    }

    #[test]
    fn test_page_encodes_item_callbacks() {
        let page = MenuPage::new("root", "Main menu")
            .command("Help", "help", vec!["short".to_string()])
            .link("Settings", "settings");

        let markup = page.page();
        let help = decoded(&markup, 0, 0);
        assert_eq!(help.kind, CallbackType::CallCommand);
        assert_eq!(help.args, vec!["short"]);

        let settings = decoded(&markup, 0, 1);
        assert_eq!(settings.kind, CallbackType::TransitToMenu);
        assert_eq!(settings.command, "settings");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let page = MenuPage::new("root", "Main")
            .command("A", "a", vec![])
            .back("Back", "home");
        assert_eq!(page.page(), page.page());
    }

    #[test]
    fn test_back_button_is_stand_alone() {
        let page = MenuPage::new("list", "List")
            .with_layout(2, 0)
            .command("1", "one", vec![])
            .back("Back", "root")
            .command("2", "two", vec![]);

        let rows: Vec<usize> = page.page().inline_keyboard.iter().map(Vec::len).collect();
        assert_eq!(rows, vec![1, 1, 1]);
    }

    #[test]
    fn test_submenu_is_exposed_for_registration() {
        let page = MenuPage::new("root", "Main")
            .submenu("Settings", MenuPage::new("settings", "Settings"));

        let subs = page.submenus();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name(), "settings");
        assert_eq!(decoded(&page.page(), 0, 0).kind, CallbackType::OpenMenu);
    }

    #[test]
    fn test_localized_menu_selects_variant() {
        let menu = LocalizedMenu::new(
            "root",
            "en",
            MenuPage::new("root", "Menu").command("Help", "help", vec![]),
        )
        .with_variant("ru", MenuPage::new("root", "Меню").command("Помощь", "help", vec![]));

        assert_eq!(menu.title_for(Some("ru")), "Меню");
        assert_eq!(menu.page_for(Some("ru")).inline_keyboard[0][0].text, "Помощь");
        assert_eq!(menu.title_for(Some("de")), "Menu");
        assert_eq!(menu.title(), "Menu");
    }

    #[test]
    fn test_localized_submenus_keep_every_locale() {
        let menu = LocalizedMenu::new(
            "root",
            "en",
            MenuPage::new("root", "Menu").submenu("More", MenuPage::new("more", "More")),
        )
        .with_variant(
            "ru",
            MenuPage::new("root", "Меню").submenu("Ещё", MenuPage::new("more", "Ещё")),
        );

        let subs = menu.submenus();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name(), "more");
        assert_eq!(subs[0].title_for(Some("ru")), "Ещё");
        assert_eq!(subs[0].title_for(Some("en")), "More");
        assert_eq!(subs[0].title_for(None), "More");
    }

    #[test]
    fn test_submenu_of_one_locale_is_kept_as_is() {
        let menu = LocalizedMenu::new("root", "en", MenuPage::new("root", "Menu"))
            .with_variant(
                "ru",
                MenuPage::new("root", "Меню").submenu("Ещё", MenuPage::new("extra", "Ещё")),
            );

        let subs = menu.submenus();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].title_for(Some("en")), "Ещё");
    }

    #[test]
    fn test_repeated_name_within_a_locale_is_not_merged() {
        let menu = LocalizedMenu::new(
            "root",
            "en",
            MenuPage::new("root", "Menu")
                .submenu("A", MenuPage::new("dup", "A"))
                .submenu("B", MenuPage::new("dup", "B")),
        );
        assert_eq!(menu.submenus().len(), 2);
    }

    #[test]
    fn test_long_button_payload_is_rejected() {
        let page = MenuPage::new("subs", "Subscriptions").command(
            "Subscribe",
            "subscribe",
            vec![
                "notifications-weekly-digest".to_string(),
                "europe-central-region".to_string(),
                "daily".to_string(),
            ],
        );

        let err = page.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref msg) if msg.contains("Subscribe")));
    }

    #[test]
    fn test_every_locale_is_validated() {
        let long = "x".repeat(MAX_CALLBACK_DATA);
        let menu = LocalizedMenu::new("root", "en", MenuPage::new("root", "Menu").link("Ok", "short"))
            .with_variant("ru", MenuPage::new("root", "Меню").link("Длинно", long));

        assert!(MenuPage::new("root", "Menu").link("Ok", "short").validate().is_ok());
        assert!(matches!(menu.validate(), Err(ConfigError::InvalidValue(_))));
    }
}
