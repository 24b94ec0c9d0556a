// Chart session services: state, reconciliation, rendering seam and driver
pub mod chart_session;
pub mod driver;
pub mod events;
pub mod indicator_engine;
pub mod render;
pub mod stream_reconciler;

pub use chart_session::ChartSession;
pub use driver::{SessionDriver, SessionHandle};
pub use events::{SessionCommand, SessionEvent, TransportEvent};
pub use indicator_engine::IndicatorEngine;
pub use render::{RenderSink, TracingSink};
pub use stream_reconciler::StreamReconciler;
