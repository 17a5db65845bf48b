pub mod connection;
pub mod headless;

pub use connection::connect_to_browser_and_page;
pub use headless::{find_chromium_binary, launch_headless_browser};
