//! Wiring of the concrete adapters into a running sentinel.

use std::sync::Arc;

use tracing::Instrument;

use sentinel_chain::{ChainClient, RpcChainClient};
use sentinel_governance::Sentinel;
use sentinel_store::Store;
use sentinel_store_lmdb::{LmdbEnvironment, LmdbStore};
use sentinel_types::{NetworkId, SystemClock};

use crate::config::{NetworkChoice, SentinelConfig};
use crate::scheduler::Scheduler;
use crate::shutdown::ShutdownController;
use crate::tracing_spans::startup_span;
use crate::NodeError;

/// Decide which network's address rules apply.
///
/// A pinned choice wins; otherwise the chain node is asked.
pub async fn resolve_network<C: ChainClient>(
    choice: NetworkChoice,
    chain: &C,
) -> Result<NetworkId, NodeError> {
    if let Some(network) = choice.pinned() {
        return Ok(network);
    }
    match chain.is_testnet().await? {
        Some(true) => Ok(NetworkId::Test),
        Some(false) => Ok(NetworkId::Main),
        None => Err(NodeError::NetworkUndetected),
    }
}

/// Log every outbox event that needs an operator.
pub fn report_errored_events<S: Store, C: ChainClient>(
    sentinel: &Sentinel<S, C>,
) -> Result<usize, NodeError> {
    let errored = sentinel.errored_events()?;
    for event in &errored {
        tracing::warn!(
            event_id = event.id.map(|id| id.raw()).unwrap_or_default(),
            object_id = %event.governance_object_id,
            message = %event.error_message,
            "outbox event is errored and will not be retried"
        );
    }
    Ok(errored.len())
}

/// A sentinel backed by LMDB and the node's JSON-RPC interface.
pub struct SentinelNode {
    pub config: SentinelConfig,
    pub sentinel: Sentinel<LmdbStore, RpcChainClient>,
    pub shutdown: Arc<ShutdownController>,
    // Keeps the environment open for the store handles.
    _env: LmdbEnvironment,
}

impl SentinelNode {
    /// Open the store, connect to the chain node and settle the network.
    pub async fn new(config: SentinelConfig) -> Result<Self, NodeError> {
        config.validate()?;
        async {
            let env = LmdbEnvironment::open(&config.store.data_dir, config.store.map_size)?;
            let chain = RpcChainClient::new(config.chain.rpc_config())?;
            let network = resolve_network(config.chain.network, &chain).await?;
            tracing::info!(
                network = network.as_str(),
                data_dir = %config.store.data_dir.display(),
                "sentinel configured"
            );

            let sentinel = Sentinel::new(env.store(), chain, config.governance.clone(), network)?;
            Ok::<_, NodeError>(Self {
                sentinel,
                shutdown: Arc::new(ShutdownController::new()),
                _env: env,
                config: config.clone(),
            })
        }
        .instrument(startup_span(&config.chain.rpc_url))
        .await
    }

    /// Run the scheduler until shutdown is triggered.
    pub async fn run(&self) -> Result<(), NodeError> {
        let errored = report_errored_events(&self.sentinel)?;
        if errored > 0 {
            tracing::warn!(count = errored, "errored outbox events need operator attention");
        }

        let mut scheduler = Scheduler::from_config(&self.config.scheduler, SystemClock);
        scheduler.run(&self.sentinel, self.shutdown.subscribe()).await;
        tracing::info!("sentinel stopped");
        Ok(())
    }
}
