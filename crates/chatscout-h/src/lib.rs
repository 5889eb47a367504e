pub mod browser;
pub mod cdp;
pub mod driver;
pub mod inject;

pub use browser::{HeadlessBrowser, NavigationResult};
pub use cdp::{LaunchOptions, request_timeout_for};
pub use driver::CdpPage;
