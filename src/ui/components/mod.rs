pub mod dashboard;
pub mod falling_word;
pub mod menu;
pub mod progress_bar;
pub mod set_list;
