//! Opens event sockets and pushes their initial watch-list.

use std::sync::Arc;
use url::form_urlencoded;
use url::Url;

use crate::config::{
    fill_template, HancockConfig, ADDRESS_PLACEHOLDER, CONSUMER_PLACEHOLDER, DLT_PLACEHOLDER,
    SENDER_PLACEHOLDER, STATUS_PLACEHOLDER,
};
use crate::error::{codes, HancockResult};
use crate::ledger::Ledger;
use crate::socket::{EventKind, EventSocket, SocketStatus, WatchTarget};

/// Builds broker subscriptions for one ledger.
#[derive(Clone)]
pub struct SubscriptionOrchestrator {
    config: Arc<HancockConfig>,
    ledger: Arc<dyn Ledger>,
}

impl SubscriptionOrchestrator {
    pub fn new(config: Arc<HancockConfig>, ledger: Arc<dyn Ledger>) -> Self {
        Self { config, ledger }
    }

    /// Broker URL for `consumer`; the status parameter is omitted when unset.
    pub fn build_url(&self, consumer: &str, status: Option<SocketStatus>) -> HancockResult<String> {
        let mut template = self.config.broker.resources.events.clone();
        if status.is_none() {
            template = template
                .replace(&format!("&status={}", STATUS_PLACEHOLDER), "")
                .replace(&format!("status={}", STATUS_PLACEHOLDER), "");
        }

        let consumer: String = form_urlencoded::byte_serialize(consumer.as_bytes()).collect();
        let resource = fill_template(
            &template,
            &[
                (DLT_PLACEHOLDER, self.ledger.dlt().as_str()),
                (ADDRESS_PLACEHOLDER, ""),
                (SENDER_PLACEHOLDER, ""),
                (CONSUMER_PLACEHOLDER, &consumer),
                (STATUS_PLACEHOLDER, status.map(|s| s.as_str()).unwrap_or("")),
            ],
        );
        let url = self.config.broker.url(&resource);

        Url::parse(&url).map_err(|e| {
            codes::FORMAT_PARAMETER
                .build()
                .with_message(format!("Invalid broker url '{}'", url))
                .with_extended(e)
        })?;
        Ok(url)
    }

    /// Open a socket watching `entries` for `target`. Returns once the
    /// connection task is started; the watch-list goes out on `ready`.
    pub fn subscribe(
        &self,
        target: WatchTarget,
        entries: Vec<String>,
        consumer: &str,
        status: Option<SocketStatus>,
    ) -> HancockResult<EventSocket> {
        self.subscribe_with(target, entries, consumer, status, |_| {})
    }

    /// Like [`subscribe`](Self::subscribe), calling `register` before the
    /// connection starts so its listeners see every event.
    pub fn subscribe_with<F>(
        &self,
        target: WatchTarget,
        entries: Vec<String>,
        consumer: &str,
        status: Option<SocketStatus>,
        register: F,
    ) -> HancockResult<EventSocket>
    where
        F: FnOnce(&EventSocket),
    {
        let url = self.build_url(consumer, status)?;
        let consumer = Some(consumer.to_string()).filter(|c| !c.is_empty());
        let socket = EventSocket::new(url, consumer, status, self.ledger.clone());

        register(&socket);

        let sender = socket.sender();
        socket.once(EventKind::Ready, move |_| {
            if !entries.is_empty() {
                sender.watch(target, &entries);
            }
        });

        tracing::info!(
            dlt = %self.ledger.dlt(),
            socket_id = %socket.id(),
            target = ?target,
            "Subscribing"
        );
        socket.connect()?;
        Ok(socket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Bitcoin, Ethereum};

    fn orchestrator(ledger: Arc<dyn Ledger>) -> SubscriptionOrchestrator {
        SubscriptionOrchestrator::new(Arc::new(HancockConfig::default()), ledger)
    }

    #[test]
    fn test_build_url_without_status() {
        let url = orchestrator(Arc::new(Ethereum::default()))
            .build_url("consumerA", None)
            .unwrap();
        assert_eq!(
            url,
            "ws://localhost:3002/ethereum/subscribe?address=&sender=&consumer=consumerA"
        );
    }

    #[test]
    fn test_build_url_with_status_and_encoding() {
        let url = orchestrator(Arc::new(Bitcoin::default()))
            .build_url("my app", Some(SocketStatus::Mined))
            .unwrap();
        assert_eq!(
            url,
            "ws://localhost:3002/bitcoin/subscribe?address=&sender=&consumer=my+app&status=mined"
        );
    }

    #[test]
    fn test_build_url_rejects_bad_host() {
        let mut config = HancockConfig::default();
        config.broker.host = "not a host".to_string();
        let err = SubscriptionOrchestrator::new(Arc::new(config), Arc::new(Ethereum::default()))
            .build_url("", None)
            .unwrap_err();
        assert_eq!(err.internal_code(), "SDKINT_50003");
    }

    #[test]
    fn test_subscribe_outside_runtime_fails() {
        let err = orchestrator(Arc::new(Ethereum::default()))
            .subscribe(WatchTarget::Transfers, vec![], "", None)
            .unwrap_err();
        assert_eq!(err.internal_code(), "SDKINT_50006");
    }
}
