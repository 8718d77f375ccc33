//! deploy-ledger: despliega MedicineLedger en el nodo configurado, escribe el
//! descriptor para los clientes y corre el smoke test.
//!
//! Código de salida 0 sólo si las tres fases terminan bien; 1 en cualquier
//! otro caso, con el motivo en stderr.
use std::process::ExitCode;
use std::sync::Arc;

use ledger_adapters::{load_service_definition, resolve_accounts, EvmEnvironment, EvmLedgerService, JsonRpcClient};
use ledger_core::{ConsoleReporter, InterruptSignal, Progress};
use ledger_persistence::FsArtifactStore;
use medledger_harness::{run_harness, watch_interrupts, HarnessConfig, HarnessError, HarnessSettings, InterruptOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter_layer)
                             .with_target(false)
                             .with_writer(std::io::stderr)
                             .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("deploy-ledger: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), HarnessError> {
    let config = HarnessConfig::from_env()?;
    info!("using node {} ({})", config.rpc_url, config.network);

    let definition = load_service_definition(&config.contract_artifact, &config.contract_name)?;
    let rpc = Arc::new(JsonRpcClient::new(config.rpc_url.clone()));
    let accounts = resolve_accounts(&rpc, config.from_account.as_deref(), config.counterparty.as_deref()).await?;
    info!("sender {}, counterparty {}", accounts.sender, accounts.counterparty);

    let environment = EvmEnvironment::new(rpc.clone(), accounts.sender.clone());
    let store = FsArtifactStore::new(config.artifact_dir.clone(), config.contract_name.clone());
    let progress = Progress::new(Arc::new(ConsoleReporter));

    // Primer Ctrl-C: terminar la mutación en vuelo y cortar entre steps.
    // Segundo Ctrl-C: salir ya.
    let (interrupt, signal) = InterruptSignal::channel();
    tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, interrupt).await == InterruptOutcome::Forced {
            eprintln!("deploy-ledger: aborted by second interrupt");
            std::process::exit(1);
        }
    });

    let settings = HarnessSettings { environment_label: config.network.clone(),
                                     deployer: config.deployer_config(),
                                     counterparty: accounts.counterparty.clone() };
    let policy = config.confirmation_policy();
    let sender = accounts.sender.clone();

    let outcome = run_harness(&environment, &definition, &store, &settings, &progress, Some(signal), |handle| {
                      EvmLedgerService::attach(rpc.clone(), handle, sender, policy)
                  }).await?;

    info!("run {} finished: {}", progress.run_id(), outcome.run.final_counters);
    Ok(())
}
