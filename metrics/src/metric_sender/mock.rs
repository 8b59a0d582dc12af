use std::{
    convert::Infallible,
    fmt::Debug,
    sync::{Arc, Mutex, PoisonError},
};

use crate::metrics::{Metric, MetricEvent};

use super::MetricEventTx;

#[derive(Default, Clone, Copy)]
pub struct MockMetricEventTx;

impl MockMetricEventTx {
    fn push_inner(&self, ev: impl Debug) {
        log::debug!("mock metric received: {ev:?}");
    }
}

impl MetricEventTx for MockMetricEventTx {
    type Error = Infallible;

    async fn push<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> Result<(), Self::Error> {
        self.push_inner(ev);

        Ok(())
    }
}

/// Keeps the tags of every pushed event, for asserting on what was sent
#[derive(Default, Clone)]
pub struct RecordingMetricTx {
    tags: Arc<Mutex<Vec<String>>>,
}

impl RecordingMetricTx {
    pub fn tags(&self) -> Vec<String> {
        self.tags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MetricEventTx for RecordingMetricTx {
    type Error = Infallible;

    async fn push<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> Result<(), Self::Error> {
        self.tags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ev.tag);

        Ok(())
    }
}

#[derive(Clone)]
pub enum MaybeMockMetricEventTx<Tx> {
    Mock(MockMetricEventTx),
    Real(Tx),
}

impl<Tx> Default for MaybeMockMetricEventTx<Tx> {
    fn default() -> Self {
        Self::Mock(MockMetricEventTx)
    }
}

impl<Tx: MetricEventTx + Sync> MetricEventTx for MaybeMockMetricEventTx<Tx> {
    type Error = Tx::Error;

    async fn push<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> Result<(), Self::Error> {
        match self {
            Self::Mock(m) => {
                m.push_inner(ev);
                Ok(())
            }
            Self::Real(m) => m.push(ev).await,
        }
    }
}
