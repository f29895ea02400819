//! Tag Manager connector binary.
//!
//! ```text
//! idsync-tagmanager --access-token "$TOKEN" validate
//! idsync-tagmanager list account
//! idsync-tagmanager list container --parent account:123
//! idsync-tagmanager grants --account 123 --container 9
//! idsync-tagmanager grant --account 123 --user alice@example.com --permission admin
//! idsync-tagmanager revoke --account 123 --container 9 --user alice@example.com --permission edit
//! ```

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use idsync_core::{
    Entitlement, Grant, Resource, ResourceId, ResourceProvisioner as _, ResourceSyncer, Token,
    grants_all, list_all,
};
use idsync_tagmanager::{TagManagerConfig, TagManagerConnector, TagManagerSyncer, resource_types};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Sync Tag Manager account and container permissions.
#[derive(Parser, Debug)]
#[command(name = "idsync-tagmanager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, short = 'c', env = "IDSYNC_TAGMANAGER_CONFIG")]
    config: Option<PathBuf>,

    /// API base URL.
    #[arg(long, env = "IDSYNC_TAGMANAGER_BASE_URL")]
    base_url: Option<String>,

    /// OAuth bearer token.
    #[arg(long, env = "IDSYNC_TAGMANAGER_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Restrict account listing to these ids (repeatable).
    #[arg(long = "only-account")]
    accounts: Vec<String>,

    /// Emit logs as JSON.
    #[arg(long, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check credentials with one account listing.
    Validate,
    /// List every resource of one type under a parent, as JSON lines.
    List {
        /// Resource type id (`account`, `container`, `user`, `role`).
        resource_type: String,
        /// Parent as `type:id`, e.g. `account:123`.
        #[arg(long)]
        parent: Option<String>,
    },
    /// Print the entitlements of an account or container.
    Entitlements(Target),
    /// Print the grants held on an account or container.
    Grants(Target),
    /// Grant a permission to a user.
    Grant(Change),
    /// Revoke a permission from a user.
    Revoke(Change),
}

#[derive(Args, Debug)]
struct Target {
    /// Account id.
    #[arg(long)]
    account: String,
    /// Container id; omit to target the account itself.
    #[arg(long)]
    container: Option<String>,
}

#[derive(Args, Debug)]
struct Change {
    #[command(flatten)]
    target: Target,
    /// User email.
    #[arg(long)]
    user: String,
    /// Permission name from the account or container vocabulary.
    #[arg(long)]
    permission: String,
}

impl Target {
    fn resource(&self) -> Resource {
        let account = Resource::new(&self.account, &resource_types::account(), &self.account);
        match &self.container {
            Some(container) => Resource::new(container, &resource_types::container(), container)
                .with_parent(account.id),
            None => account,
        }
    }

    const fn resource_type(&self) -> &'static str {
        if self.container.is_some() {
            resource_types::CONTAINER
        } else {
            resource_types::ACCOUNT
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn load_config(cli: &Cli) -> Result<TagManagerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            TagManagerConfig::from_toml_str(&raw)?
        }
        None => TagManagerConfig::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(token) = &cli.access_token {
        config.access_token = Some(token.clone());
    }
    if !cli.accounts.is_empty() {
        config.accounts.clone_from(&cli.accounts);
    }
    Ok(config)
}

fn parse_parent(raw: &str) -> Result<ResourceId> {
    let (resource_type, resource) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("parent must be 'type:id', got '{raw}'"))?;
    Ok(ResourceId::new(resource_type, resource))
}

fn print_lines<T: Serialize>(items: &[T]) -> Result<()> {
    for item in items {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}

fn syncer(connector: &TagManagerConnector, resource_type: &str) -> Result<TagManagerSyncer> {
    connector
        .syncer(resource_type)
        .ok_or_else(|| anyhow!("unknown resource type '{resource_type}'"))
}

async fn run(cli: Cli) -> Result<()> {
    let connector = TagManagerConnector::new(load_config(&cli)?)?;

    let cancel = connector.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            cancel.cancel();
        }
    });

    match cli.command {
        Command::Validate => {
            connector.validate().await?;
            let meta = connector.metadata();
            println!("{}", serde_json::to_string(&meta)?);
        }
        Command::List {
            resource_type,
            parent,
        } => {
            let parent = parent.as_deref().map(parse_parent).transpose()?;
            let syncer = syncer(&connector, &resource_type)?;
            let resources = list_all(&syncer, parent.as_ref()).await?;
            info!(count = resources.len(), resource_type = %resource_type, "listed");
            print_lines(&resources)?;
        }
        Command::Entitlements(target) => {
            let syncer = syncer(&connector, target.resource_type())?;
            let page = syncer
                .entitlements(&target.resource(), &Token::first())
                .await?;
            print_lines(&page.items)?;
        }
        Command::Grants(target) => {
            let syncer = syncer(&connector, target.resource_type())?;
            let grants = grants_all(&syncer, &target.resource()).await?;
            print_lines(&grants)?;
        }
        Command::Grant(change) => {
            let (syncer, principal, entitlement) = change_parts(&connector, &change)?;
            let Some(provisioner) = syncer.provisioner() else {
                bail!("resource type does not accept grants");
            };
            provisioner.grant(&principal, &entitlement).await?;
            info!(user = %change.user, permission = %change.permission, "grant applied");
        }
        Command::Revoke(change) => {
            let (syncer, principal, entitlement) = change_parts(&connector, &change)?;
            let Some(provisioner) = syncer.provisioner() else {
                bail!("resource type does not accept revokes");
            };
            let grant = Grant::new(&entitlement.resource, &entitlement.slug, principal.id);
            provisioner.revoke(&grant).await?;
            info!(user = %change.user, permission = %change.permission, "revoke applied");
        }
    }

    Ok(())
}

fn change_parts(
    connector: &TagManagerConnector,
    change: &Change,
) -> Result<(TagManagerSyncer, Resource, Entitlement)> {
    let syncer = syncer(connector, change.target.resource_type())?;
    let resource = change.target.resource();
    let account_id = ResourceId::new(resource_types::ACCOUNT, &change.target.account);
    let principal = idsync_tagmanager::projector::user_resource(&change.user, &account_id);
    let entitlement = Entitlement::permission(&resource, &change.permission);
    Ok((syncer, principal, entitlement))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    run(cli).await
}
