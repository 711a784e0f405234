// Provisioning CLI: create (or adopt) a managed Supabase project and print
// the environment values the rest of the stack needs, as JSON on stdout.
// Logs go to stderr so the output stays pipeable.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use supabase::management::{ApiKey, ManagementClient};
use uuid::Uuid;

const KEY_NAME: &str = "default";

const CONFIRMATION_SUBJECT: &str = "Confirm your email";

const CONFIRMATION_TEMPLATE: &str = r#"<h2>Confirm your email</h2>
<p>Follow this link to confirm your address and activate your account:</p>
<p><a href="{{ .ConfirmationURL }}">Confirm your email</a></p>
<p>If you did not create this account, you can ignore this message.</p>
"#;

#[derive(Parser, Debug)]
#[command(name = "provision", about = "Provision a managed Supabase project")]
struct Args {
    /// Project name shown in the management dashboard
    #[arg(long)]
    name: String,

    /// Region to create the project in
    #[arg(long, default_value = "us-east-1")]
    region: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let bearer_token = std::env::var("SUPABASE_BEARER_TOKEN")
        .context("SUPABASE_BEARER_TOKEN is required (a management API personal access token)")?;
    let org_id =
        std::env::var("SUPABASE_ORG_ID").context("SUPABASE_ORG_ID is required in env")?;
    let client = ManagementClient::new(bearer_token);

    // An existing ref + password in the environment means adopt, not create.
    let (project_ref, db_password) = match (
        std::env::var("SUPABASE_PROJECT_REF").ok(),
        std::env::var("SUPABASE_DB_PASSWORD").ok(),
    ) {
        (Some(project_ref), Some(db_password)) => {
            tracing::info!(project = %project_ref, "reusing existing project");
            (project_ref, db_password)
        }
        (Some(_), None) | (None, Some(_)) => {
            bail!("SUPABASE_PROJECT_REF and SUPABASE_DB_PASSWORD must be set together");
        }
        (None, None) => {
            let db_password = Uuid::new_v4().to_string();

            tracing::info!(name = %args.name, region = %args.region, "creating project");
            let project = client
                .create_project(&args.name, &org_id, &args.region, &db_password)
                .await
                .context("project creation failed")?;
            tracing::info!(project = %project.id, "project created");
            (project.id, db_password)
        }
    };

    tracing::info!("configuring confirmation email template");
    client
        .configure_confirmation_template(&project_ref, CONFIRMATION_SUBJECT, CONFIRMATION_TEMPLATE)
        .await
        .context("confirmation template configuration failed")?;

    // Keys already in the environment are reused as-is; nothing is rotated.
    let publishable_env = std::env::var("SUPABASE_PUBLISHABLE_KEY").ok();
    let secret_env = std::env::var("SUPABASE_SECRET_KEY").ok();

    let keys = if publishable_env.is_none() || secret_env.is_none() {
        client
            .list_api_keys(&project_ref)
            .await
            .context("API key listing failed")?
    } else {
        Vec::new()
    };

    let publishable_key = match publishable_env {
        Some(key) => key,
        None => ensure_publishable_key(&client, &project_ref, &keys).await?,
    };
    let secret_key = match secret_env {
        Some(key) => key,
        None => recreate_secret_key(&client, &project_ref, &keys).await?,
    };

    let output = json!({
        "SUPABASE_PROJECT_REF": project_ref,
        "SUPABASE_DB_PASSWORD": db_password,
        "SUPABASE_URL": format!("https://{project_ref}.supabase.co"),
        "SUPABASE_PUBLISHABLE_KEY": publishable_key,
        "SUPABASE_SECRET_KEY": secret_key,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// The `default` publishable key listed with its material, if any.
fn existing_publishable_key(keys: &[ApiKey]) -> Option<String> {
    keys.iter()
        .find(|k| k.key_type == "publishable" && k.name == KEY_NAME)
        .and_then(|k| k.api_key.clone())
}

/// The `default` secret key, which must be recreated to get its material.
fn stale_default_secret(keys: &[ApiKey]) -> Option<&ApiKey> {
    keys.iter()
        .find(|k| k.key_type == "secret" && k.name == KEY_NAME)
}

/// Reuse the existing publishable key when the listing reveals its material,
/// otherwise mint a fresh one.
async fn ensure_publishable_key(
    client: &ManagementClient,
    project_ref: &str,
    keys: &[ApiKey],
) -> Result<String> {
    if let Some(key) = existing_publishable_key(keys) {
        tracing::info!("reusing publishable key");
        return Ok(key);
    }

    tracing::info!("creating publishable key");
    let key = client
        .create_api_key(project_ref, "publishable", KEY_NAME, true)
        .await
        .context("publishable key creation failed")?;
    key.api_key
        .context("management API returned a publishable key without material")
}

/// Secret key material is only revealed at creation time, so an existing
/// `default` secret key is useless here. Delete it and mint a new one.
async fn recreate_secret_key(
    client: &ManagementClient,
    project_ref: &str,
    keys: &[ApiKey],
) -> Result<String> {
    if let Some(key) = stale_default_secret(keys) {
        tracing::info!(key = %key.id, "deleting stale secret key");
        client
            .delete_api_key(project_ref, &key.id)
            .await
            .context("secret key deletion failed")?;
    }

    tracing::info!("creating secret key");
    let key = client
        .create_api_key(project_ref, "secret", KEY_NAME, true)
        .await
        .context("secret key creation failed")?;
    key.api_key
        .context("management API returned a secret key without material")
}
