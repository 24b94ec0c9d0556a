// Live stream lifecycle and tick-to-series reconciliation
use crate::data::{CandleSeries, TailUpdate};
use crate::feed::{LiveSample, Subscription, NORMAL_CLOSURE};
use crate::services::events::{SessionCommand, TransportEvent};
use shared::models::{Candle, ConnectionStatus};
use std::time::Duration;

/// Tracks one logical live subscription across transport attempts.
///
/// Each opened transport gets a fresh attempt number. Events tagged with any
/// other attempt belong to a connection that has already been torn down and
/// are ignored.
#[derive(Debug)]
pub struct StreamReconciler {
    status: ConnectionStatus,
    enabled: bool,
    attempt: u64,
    subscription: Subscription,
    reconnect_delay: Duration,
}

impl StreamReconciler {
    pub fn new(subscription: Subscription, reconnect_delay: Duration) -> Self {
        Self { status: ConnectionStatus::Disconnected, enabled: false, attempt: 0, subscription, reconnect_delay }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn is_live(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connecting | ConnectionStatus::Connected)
    }

    fn open(&mut self) -> SessionCommand {
        self.attempt += 1;
        self.status = ConnectionStatus::Connecting;
        tracing::debug!(attempt = self.attempt, stream = %self.subscription.stream_name(), "Opening live transport");
        SessionCommand::OpenTransport { attempt: self.attempt, subscription: self.subscription.clone() }
    }

    pub fn enable(&mut self) -> Vec<SessionCommand> {
        self.enabled = true;
        if self.is_live() {
            return Vec::new();
        }
        vec![self.open()]
    }

    /// Closes the current transport with the normal closure code. No
    /// reconnect follows, including one already scheduled.
    pub fn disable(&mut self) -> Vec<SessionCommand> {
        self.enabled = false;
        let was_live = self.is_live();
        self.status = ConnectionStatus::Disconnected;
        if was_live {
            vec![SessionCommand::CloseTransport { attempt: self.attempt }]
        } else {
            Vec::new()
        }
    }

    /// Switches to a new symbol/timeframe. A streaming session tears down the
    /// old transport and opens one for the new subscription straight away.
    pub fn resubscribe(&mut self, subscription: Subscription) -> Vec<SessionCommand> {
        if subscription == self.subscription {
            return Vec::new();
        }
        self.subscription = subscription;
        if !self.enabled {
            return Vec::new();
        }
        let mut commands = Vec::new();
        if self.is_live() {
            commands.push(SessionCommand::CloseTransport { attempt: self.attempt });
        }
        commands.push(self.open());
        commands
    }

    pub fn on_transport(&mut self, attempt: u64, event: TransportEvent) -> Vec<SessionCommand> {
        if attempt != self.attempt || !self.is_live() {
            tracing::trace!(attempt, current = self.attempt, ?event, "Ignoring event from inactive transport");
            return Vec::new();
        }
        match event {
            TransportEvent::Opened => {
                if self.status == ConnectionStatus::Connecting {
                    tracing::info!(attempt, stream = %self.subscription.stream_name(), "Live stream connected");
                    self.status = ConnectionStatus::Connected;
                }
                Vec::new()
            }
            TransportEvent::Closed { code: Some(NORMAL_CLOSURE) } => {
                tracing::info!(attempt, "Live stream closed normally");
                self.status = ConnectionStatus::Disconnected;
                Vec::new()
            }
            TransportEvent::Closed { code } => {
                tracing::warn!(attempt, ?code, "Live stream closed abnormally");
                self.fail()
            }
            TransportEvent::Failed(reason) => {
                tracing::warn!(attempt, %reason, "Live stream failed");
                self.fail()
            }
        }
    }

    fn fail(&mut self) -> Vec<SessionCommand> {
        self.status = ConnectionStatus::Error;
        if !self.enabled {
            return Vec::new();
        }
        tracing::info!(attempt = self.attempt, delay_ms = self.reconnect_delay.as_millis() as u64, "Scheduling reconnect");
        vec![SessionCommand::ScheduleReconnect { attempt: self.attempt, delay: self.reconnect_delay }]
    }

    pub fn on_reconnect_due(&mut self, attempt: u64) -> Vec<SessionCommand> {
        if !self.enabled || self.status != ConnectionStatus::Error || attempt != self.attempt {
            tracing::debug!(attempt, current = self.attempt, status = %self.status, "Reconnect no longer needed");
            return Vec::new();
        }
        vec![self.open()]
    }

    /// Applies a live sample to the series when it comes from the connected
    /// transport and matches the subscription. Returns the candle written and
    /// whether it replaced the tail or was appended.
    pub fn reconcile(&self, attempt: u64, sample: &LiveSample, series: &mut CandleSeries) -> Option<(Candle, TailUpdate)> {
        if attempt != self.attempt || self.status != ConnectionStatus::Connected {
            tracing::trace!(attempt, status = %self.status, "Dropping tick while not connected");
            return None;
        }
        if !self.subscription.matches(sample) {
            tracing::debug!(symbol = %sample.symbol, timeframe = %sample.timeframe, "Dropping tick for another subscription");
            return None;
        }
        let candle = sample.to_candle();
        let update = series.replace_or_append_tail(candle);
        Some((candle, update))
    }
}
