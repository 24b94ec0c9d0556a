// Live streaming handlers for a chart session
use super::ChartSession;
use crate::feed::{LiveSample, Subscription};
use crate::services::events::{SessionCommand, TransportEvent};
use crate::services::render::RenderSink;
use shared::models::ConnectionStatus;

impl ChartSession {
    fn publish_status(&self, before: ConnectionStatus, sink: &mut dyn RenderSink) {
        let status = self.reconciler.status();
        if status != before {
            sink.connection_status(status);
        }
    }

    pub(super) fn set_streaming(&mut self, enabled: bool, sink: &mut dyn RenderSink) -> Vec<SessionCommand> {
        let before = self.reconciler.status();
        let commands = if enabled { self.reconciler.enable() } else { self.reconciler.disable() };
        self.publish_status(before, sink);
        commands
    }

    pub(super) fn resubscribe(&mut self, sink: &mut dyn RenderSink) -> Vec<SessionCommand> {
        let before = self.reconciler.status();
        let commands = self.reconciler.resubscribe(Subscription::new(self.symbol.clone(), self.timeframe));
        self.publish_status(before, sink);
        commands
    }

    pub(super) fn on_transport(&mut self, attempt: u64, event: TransportEvent, sink: &mut dyn RenderSink) -> Vec<SessionCommand> {
        let before = self.reconciler.status();
        let commands = self.reconciler.on_transport(attempt, event);
        self.publish_status(before, sink);
        commands
    }

    pub(super) fn on_reconnect_due(&mut self, attempt: u64, sink: &mut dyn RenderSink) -> Vec<SessionCommand> {
        let before = self.reconciler.status();
        let commands = self.reconciler.on_reconnect_due(attempt);
        self.publish_status(before, sink);
        commands
    }

    pub(super) fn on_tick(&mut self, attempt: u64, sample: &LiveSample, sink: &mut dyn RenderSink) -> Vec<SessionCommand> {
        if let Some((candle, update)) = self.reconciler.reconcile(attempt, sample, &mut self.series) {
            tracing::trace!(time = candle.time, close = candle.close, ?update, closed = sample.is_closed, "Applied live tick");
            sink.update_tail(&candle);
            self.recompute(sink);
        }
        Vec::new()
    }
}
