pub mod filter_panel;
pub mod header;
pub mod hours_bar;
