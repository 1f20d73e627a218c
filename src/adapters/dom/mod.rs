//! Rendered-page Adapter
//!
//! Sub-modules:
//! - `webdriver`: W3C WebDriver session client with scoped cleanup
//! - `source`: `PriceSource` implementation driven by page profiles

pub mod source;
pub mod webdriver;

pub use source::DomRenderSource;
pub use webdriver::WebDriverClient;
