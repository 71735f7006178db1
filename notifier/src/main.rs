//! `notify` command: send one admin push notification from the shell.
//!
//! Delivery failures are logged and do not change the exit status; only
//! invalid input or unreadable configuration exits non-zero.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
#[cfg(feature = "metrics")]
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use notifier::config::DispatchSettings;
use notifier::domain::{Amount, DispatchResult, Dispatcher, NotificationService};
use notifier::outbound::fcm::shared_transport;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `notify` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "notify",
    about = "Send an admin push notification for a new order or user",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    event: Event,
}

#[derive(Debug, Subcommand)]
enum Event {
    /// Announce a new order on the admin orders topic.
    Order {
        /// Order identifier shown to admins.
        #[arg(long = "id", value_name = "id")]
        order_id: String,
        /// Order total in rupees, at most two decimal places.
        #[arg(long, value_name = "amount")]
        amount: String,
        /// Customer display name.
        #[arg(long = "customer", value_name = "name")]
        customer_name: String,
    },
    /// Announce a newly registered user on the admin users topic.
    User {
        /// User display name.
        #[arg(long, value_name = "name")]
        name: String,
        /// User email address.
        #[arg(long, value_name = "email")]
        email: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build notify runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let settings = DispatchSettings::load_from_iter([OsString::from("notify")])
        .map_err(|error| eyre!("failed to load dispatch settings: {error}"))?;
    settings
        .fcm_endpoint()
        .wrap_err("invalid dispatch settings")?;
    settings
        .metadata_token_url()
        .wrap_err("invalid dispatch settings")?;

    let transport = shared_transport(&DefaultEnv::new(), &settings);
    let service = NotificationService::new(transport, dispatcher(&settings)?);

    let result = match args.event {
        Event::Order {
            order_id,
            amount,
            customer_name,
        } => {
            let total: Amount = amount.parse().wrap_err("invalid order amount")?;
            service
                .notify_new_order(order_id, total, &customer_name)
                .await
                .wrap_err("invalid order notification")?
        }
        Event::User { name, email } => service
            .notify_new_user(&name, &email)
            .await
            .wrap_err("invalid user notification")?,
    };

    report(&result);
    Ok(())
}

#[cfg(feature = "metrics")]
fn dispatcher(settings: &DispatchSettings) -> Result<Dispatcher> {
    use notifier::outbound::metrics::PrometheusDispatchMetrics;

    let metrics = PrometheusDispatchMetrics::new(prometheus::default_registry())
        .wrap_err("failed to register dispatch metrics")?;
    Ok(Dispatcher::with_metrics(
        Arc::new(metrics),
        settings.dispatcher_config(),
    ))
}

#[cfg(not(feature = "metrics"))]
#[expect(
    clippy::unnecessary_wraps,
    reason = "mirrors the metrics-enabled constructor"
)]
fn dispatcher(settings: &DispatchSettings) -> Result<Dispatcher> {
    Ok(Dispatcher::new(settings.dispatcher_config()))
}

fn report(result: &DispatchResult) {
    match result {
        DispatchResult::Sent => info!(outcome = "sent", "notification delivered"),
        DispatchResult::Skipped { reason } => {
            warn!(outcome = "skipped", reason = %reason, "notification not delivered");
        }
        DispatchResult::Failed { reason } => {
            error!(outcome = "failed", reason = %reason, "notification not delivered");
        }
    }
}
