pub mod listener;
pub mod states;
pub mod themed_table;
pub mod update;
pub mod view;
pub mod view_table_row;

pub use listener::{StatusLine, TableListener};
pub use states::{PageStep, TableModel, TableUi};
pub use update::{Effect, KeyOutcome, TableAction, handle_key, update};
pub use view::TableView;
