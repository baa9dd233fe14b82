//! User interface: main screen, menu and editing pages.

pub mod main_screen;
pub mod menu;
pub mod page;
pub mod pages;

pub use main_screen::MainScreen;
pub use menu::{MenuController, MenuItem, MenuItemKind, MenuState, MENU_ITEMS};
pub use page::{Editor, InputElement, Mode, Role, Verdict};
pub use pages::{Page, SystemConfig};
