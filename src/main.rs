use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use spawn_sdk::{
    ActorBuilder, ActorRegistry, Message, SpawnConfig, SpawnRuntime, Stateless, Value,
};
use tracing::{Level, event};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spawn-sdk")]
#[command(about = "Hosts a demo echo actor for a Spawn actor fabric")]
struct Cli {
    /// Actor system name; falls back to PROXY_ACTOR_SYSTEM_NAME
    #[arg(long)]
    system: Option<String>,

    /// Interface for the action endpoint
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    proxy_host: Option<String>,

    #[arg(long)]
    proxy_port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Message)]
#[message(type_name = "demo.EchoMessage")]
struct EchoMessage {
    text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Message)]
#[message(type_name = "demo.CounterState")]
struct CounterState {
    hits: u64,
}

struct Echo;
struct Counter;

impl Cli {
    fn into_config(self) -> Result<SpawnConfig> {
        let mut config = match SpawnConfig::from_env() {
            Ok(config) => config,
            Err(_) if self.system.is_some() => SpawnConfig::default(),
            Err(err) => return Err(err).context("loading configuration from environment"),
        };
        if let Some(system) = self.system {
            config.system = system;
        }
        if let Some(host) = self.host {
            config.transport.host = host;
        }
        if let Some(port) = self.port {
            config.transport.port = port;
        }
        if let Some(proxy_host) = self.proxy_host {
            config.transport.proxy_host = proxy_host;
        }
        if let Some(proxy_port) = self.proxy_port {
            config.transport.proxy_port = proxy_port;
        }
        Ok(config)
    }
}

fn registry() -> spawn_sdk::Result<ActorRegistry> {
    let echo = ActorBuilder::stateless("Echo", || Ok(Echo))
        .action("Echo", |_, _, message: EchoMessage| {
            Ok(Value::<Stateless, EchoMessage>::at().response(message).reply())
        })
        .build()?;

    let counter = ActorBuilder::<Counter, CounterState>::stateful("Counter", || Ok(Counter))
        .action_no_args("Hit", |_, ctx| {
            let mut state = ctx.state().cloned().unwrap_or_default();
            state.hits += 1;
            Ok(Value::<CounterState, CounterState>::at()
                .state(state.clone())
                .response(state)
                .reply())
        })
        .build()?;

    ActorRegistry::from_descriptors([echo, counter])
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = Cli::parse().into_config()?;
    event!(Level::INFO, system = %config.system, "starting spawn runtime");

    let runtime = SpawnRuntime::with_http(config, registry()?)?;
    runtime
        .start(shutdown_signal())
        .await
        .context("runtime error")?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spawn_sdk=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        event!(Level::ERROR, error = %err, "unable to install ctrl+c handler");
    }
}
