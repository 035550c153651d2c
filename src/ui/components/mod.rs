pub mod confirm;
pub mod progress_bar;
pub mod results;
pub mod settings_form;
pub mod table_grid;
