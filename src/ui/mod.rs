//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]** — application state, keyboard event loop, pane focus, autoplay
//! - **[`panes`]** — stateless render functions for each visible pane (source,
//!   narrative, console, call stack, queues, status bar)
//! - **[`theme`]** — centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with an
//! [`Example`] and a starting step index and call [`App::run`] to start the
//! event loop. The app owns no scheduling logic; every state it renders
//! comes out of a fresh [`replay`](crate::replay::replay) call.
//!
//! [`Example`]: crate::trace::Example
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
