pub mod shortcut_table;

pub use shortcut_table::ShortcutTable;
