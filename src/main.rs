//! CLI entry point for shopctl.

mod cli;

use clap::Parser;
use shopctl::auth::{default_session_path, SessionStore};
use shopctl::config::load_config;
use shopctl::error::ApiError;
use shopctl::gateway::{Gateway, SessionEvents};
use shopctl::render::Renderer;
use shopctl::services::{AuthService, ProductService, SaleService, ShopService};
use shopctl::transport::ReqwestTransport;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Tells the user their session is gone when the gateway gives up on it.
struct ExpiredSessionNotice;

impl SessionEvents for ExpiredSessionNotice {
    fn auth_expired(&self) {
        eprintln!("Session expired. Run `shopctl login <email>` to sign in again.");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SHOPCTL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let renderer = Renderer::new(!args.no_color);

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            renderer.error(&e.to_string());
            std::process::exit(1);
        }
    };
    if let Some(url) = &args.base_url {
        config.api.base_url = url.clone();
    }
    if config.api.base_url.is_empty() {
        renderer.error(
            "No API base URL configured. Set api.base_url in shopctl.toml or the SHOPCTL_API_URL env var.",
        );
        std::process::exit(1);
    }

    let store = match default_session_path() {
        Some(path) => match SessionStore::open(path) {
            Ok(store) => store,
            Err(e) => {
                renderer.error(&format!("failed to open session store: {e}"));
                std::process::exit(1);
            }
        },
        None => SessionStore::in_memory(),
    };

    let transport = match ReqwestTransport::new(&config.api.base_url, config.network.timeout()) {
        Ok(transport) => transport,
        Err(e) => {
            renderer.error(&e.to_string());
            std::process::exit(1);
        }
    };
    let gateway = Gateway::new(Arc::new(transport), store)
        .with_events(Arc::new(ExpiredSessionNotice))
        .with_refresh_timeout(config.network.refresh_timeout());

    if let Err(e) = run_command(&args.command, &gateway, &renderer).await {
        renderer.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run_command(
    command: &cli::Command,
    gateway: &Gateway,
    renderer: &Renderer,
) -> Result<(), ApiError> {
    match command {
        cli::Command::Login { email } => {
            let password = rpassword::prompt_password("Password: ")
                .map_err(|e| ApiError::Failed(format!("failed to read password: {e}")))?;
            let user = AuthService::new(gateway).login(email, &password).await?;
            let display = user.name.as_deref().unwrap_or(&user.email);
            renderer.success(&format!("Logged in as {display}."));
            if let Some(shop) = gateway.store().current_shop() {
                let name = shop.name.unwrap_or_else(|| format!("#{}", shop.id));
                renderer.info(&format!("Active shop: {name}"));
            }
        }
        cli::Command::Logout => {
            AuthService::new(gateway).logout()?;
            renderer.info("Logged out.");
        }
        cli::Command::Whoami => match gateway.store().user() {
            Some(user) => {
                let role = user.role.as_deref().unwrap_or("unknown role");
                renderer.info(&format!("{} ({role})", user.email));
                match gateway.store().current_shop() {
                    Some(shop) => {
                        let name = shop.name.unwrap_or_else(|| format!("#{}", shop.id));
                        renderer.info(&format!("Active shop: {name}"));
                    }
                    None => renderer.warn("No active shop selected; run `shopctl shops`."),
                }
            }
            None => renderer.info("Not logged in."),
        },
        cli::Command::Shops => {
            let shops = ShopService::new(gateway).list(&[]).await?;
            let active = gateway.store().current_shop().map(|s| s.id);
            for shop in shops {
                let marker = if Some(shop.id) == active { "*" } else { " " };
                let name = shop.name.unwrap_or_default();
                renderer.info(&format!("{marker} {:>4}  {name}", shop.id));
            }
        }
        cli::Command::UseShop { id } => {
            let shop = ShopService::new(gateway).select(*id).await?;
            let name = shop.name.unwrap_or_else(|| format!("#{}", shop.id));
            renderer.success(&format!("Active shop set to {name}."));
        }
        cli::Command::Products { search } => {
            let mut query: Vec<(String, String)> = Vec::new();
            if let Some(shop) = gateway.store().current_shop() {
                query.push(("shop_id".into(), shop.id.to_string()));
            }
            if let Some(search) = search {
                query.push(("search".into(), search.clone()));
            }
            let query: Vec<(&str, &str)> =
                query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let products = ProductService::new(gateway).list(&query).await?;
            for product in products {
                let sku = product.sku.unwrap_or_default();
                let price = product
                    .price
                    .map(|p| format!("{p:.2}"))
                    .unwrap_or_else(|| "-".into());
                renderer.info(&format!(
                    "{:>5}  {:<12} {:>10}  {}",
                    product.id, sku, price, product.name
                ));
            }
        }
        cli::Command::Sales => {
            let query: Vec<(String, String)> = gateway
                .store()
                .current_shop()
                .map(|shop| vec![("shop_id".to_string(), shop.id.to_string())])
                .unwrap_or_default();
            let query: Vec<(&str, &str)> =
                query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let sales = SaleService::new(gateway).list(&query).await?;
            for sale in sales {
                let status = sale.status.unwrap_or_default();
                let total = sale
                    .total
                    .map(|t| format!("{t:.2}"))
                    .unwrap_or_else(|| "-".into());
                let created = sale.created_at.unwrap_or_default();
                renderer.info(&format!(
                    "{:>6}  {:>10}  {:<10} {created}",
                    sale.id, total, status
                ));
            }
        }
    }
    Ok(())
}
