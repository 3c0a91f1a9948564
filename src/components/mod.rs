pub mod host_screen;
pub mod result_panel;
pub mod reveal_overlay;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use host_screen::{HostScreen, HostScreenProps};
pub use result_panel::{ResultPanel, ResultPanelProps};
pub use reveal_overlay::{RevealOverlay, RevealOverlayProps};
