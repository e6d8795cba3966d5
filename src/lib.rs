pub mod anatomy;
