//! Browser extension entry points for Animation Builder
//!
//! One wasm module serves every realm of the extension; each realm's JS
//! shell constructs the matching entry point:
//!
//! | Realm | Entry point | Role |
//! |---|---|---|
//! | injected `<script>` | [`InjectedScript`] | selector engine and executor |
//! | content script | [`ContentScript`] | broadcast bridge, page scan |
//! | service worker | [`BackgroundWorker`] | tab routing, on-demand injection |
//! | popup | [`PopupController`] | state, timeline, export |
//!
//! ## Module Structure
//!
//! - `util` - Console logging, timers, JSON conversion
//! - `chrome` - Extension API bindings
//! - `page` - [`WebPage`], the `web-sys` page backend

mod background;
mod chrome;
mod content;
mod injected;
mod page;
mod popup;
pub(crate) mod util;

pub use background::BackgroundWorker;
pub use content::ContentScript;
pub use injected::InjectedScript;
pub use page::WebPage;
pub use popup::PopupController;
