use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skill_persistence::config::{
    create_client, Settings, ATTRIBUTES_KEY_NAME_VAR, AUTO_CREATE_TABLE_VAR, ENDPOINT_URL_VAR,
    PARTITION_KEY_NAME_VAR, REGION_VAR, TABLE_NAME_VAR,
};
use skill_persistence::{
    partition_keys, AdapterConfig, AttributeMap, DynamoDbPersistenceAdapter, EnsureTableOutcome,
    PersistenceAdapter, RequestEnvelope,
};

/// Log filter used when `RUST_LOG` is unset: this binary and the library.
const DEFAULT_LOG_FILTER: &str = "skill_attributes=info,skill_persistence=info";

/// skill-attributes - Inspect and manage persisted skill attributes
#[derive(Parser, Debug)]
#[command(name = "skill-attributes")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Table holding the attributes
    #[arg(long, global = true, env = TABLE_NAME_VAR)]
    table: Option<String>,

    /// Partition key attribute name [default: id]
    #[arg(long, global = true, env = PARTITION_KEY_NAME_VAR)]
    partition_key_name: Option<String>,

    /// Attributes attribute name [default: attributes]
    #[arg(long, global = true, env = ATTRIBUTES_KEY_NAME_VAR)]
    attributes_key_name: Option<String>,

    /// Create the table before get/put/delete when it is missing
    #[arg(
        long,
        global = true,
        env = AUTO_CREATE_TABLE_VAR,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    auto_create_table: Option<String>,

    /// DynamoDB endpoint (e.g., http://localhost:8000 for DynamoDB Local)
    #[arg(long, global = true, env = ENDPOINT_URL_VAR)]
    endpoint_url: Option<String>,

    /// AWS region [default: us-east-1]
    #[arg(long, global = true, env = REGION_VAR)]
    region: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the attributes table if it doesn't exist
    EnsureTable,
    /// Print the attributes stored for a user or device
    Get(KeyArgs),
    /// Replace the attributes stored for a user or device
    Put {
        #[command(flatten)]
        key: KeyArgs,

        /// Attributes as a JSON object
        #[arg(long)]
        json: String,
    },
    /// Delete the attributes stored for a user or device
    Delete(KeyArgs),
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// User ID the attributes belong to
    #[arg(long)]
    user_id: String,

    /// Key by device instead of user
    #[arg(long)]
    device_id: Option<String>,
}

impl KeyArgs {
    fn envelope(&self) -> RequestEnvelope {
        match &self.device_id {
            Some(device_id) => RequestEnvelope::for_device(&self.user_id, device_id),
            None => RequestEnvelope::for_user(&self.user_id),
        }
    }
}

impl Cli {
    /// Settings from the flags, which clap already filled from the environment.
    fn settings(&self) -> Result<Settings> {
        let settings = Settings::from_lookup(|var| match var {
            TABLE_NAME_VAR => self.table.clone(),
            PARTITION_KEY_NAME_VAR => self.partition_key_name.clone(),
            ATTRIBUTES_KEY_NAME_VAR => self.attributes_key_name.clone(),
            AUTO_CREATE_TABLE_VAR => self.auto_create_table.clone(),
            ENDPOINT_URL_VAR => self.endpoint_url.clone(),
            REGION_VAR => self.region.clone(),
            _ => None,
        })?;
        Ok(settings)
    }

    fn key(&self) -> Option<&KeyArgs> {
        match &self.command {
            Command::EnsureTable => None,
            Command::Get(key) | Command::Delete(key) | Command::Put { key, .. } => Some(key),
        }
    }

    fn adapter_config(&self, settings: &Settings) -> Result<AdapterConfig> {
        let config = settings.adapter_config()?;
        Ok(match self.key() {
            Some(KeyArgs {
                device_id: Some(_), ..
            }) => config.with_partition_key_generator(partition_keys::device_id),
            _ => config,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = cli.settings().context("Invalid settings")?;
    let config = cli.adapter_config(&settings)?;

    tracing::debug!(target_env = %settings.aws.target_display(), "Connecting");
    let client = create_client(&settings.aws).await;

    // Only data commands honour auto-create; ensure-table reports what it did.
    let adapter = match cli.key() {
        Some(_) => DynamoDbPersistenceAdapter::initialize(client, config).await?,
        None => DynamoDbPersistenceAdapter::new(client, config),
    };

    match &cli.command {
        Command::EnsureTable => {
            let table_name = adapter.config().table().table_name();
            match adapter.ensure_table().await? {
                EnsureTableOutcome::Created => println!("Created table {}", table_name),
                EnsureTableOutcome::AlreadyExists => {
                    println!("Table {} already exists", table_name)
                }
            }
        }
        Command::Get(key) => match adapter.get_attributes(&key.envelope()).await? {
            Some(attributes) => println!("{}", serde_json::to_string_pretty(&attributes)?),
            None => {
                tracing::info!(user_id = %key.user_id, "No attributes stored");
                println!("null");
            }
        },
        Command::Put { key, json } => {
            let attributes = parse_attributes(json)?;
            adapter.save_attributes(&key.envelope(), &attributes).await?;
            tracing::info!(user_id = %key.user_id, "Saved attributes");
        }
        Command::Delete(key) => {
            adapter.delete_attributes(&key.envelope()).await?;
            tracing::info!(user_id = %key.user_id, "Deleted attributes");
        }
    }

    Ok(())
}

/// Parses `--json` into an attribute map; anything but an object is rejected.
fn parse_attributes(json: &str) -> Result<AttributeMap> {
    serde_json::from_str(json).context("--json must be a JSON object")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_default_log_filter_enables_binary_events() {
        let binary_crate = module_path!().split("::").next().unwrap();
        let targets: Vec<&str> = DEFAULT_LOG_FILTER
            .split(',')
            .filter_map(|directive| directive.split('=').next())
            .collect();

        assert!(targets.contains(&binary_crate));
        assert!(targets.contains(&"skill_persistence"));
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_parse_attributes() {
        let attributes = parse_attributes(r#"{"count": 3, "name": "x"}"#).unwrap();

        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes["count"], serde_json::json!(3));
    }

    #[test]
    fn test_parse_attributes_rejects_non_object() {
        assert!(parse_attributes("[1, 2]").is_err());
        assert!(parse_attributes("not json").is_err());
    }

    #[test]
    fn test_get_command() {
        let cli = parse(&[
            "skill-attributes",
            "--table",
            "SkillAttributes",
            "--partition-key-name",
            "id",
            "get",
            "--user-id",
            "amzn1.ask.account.ABC",
        ]);

        let Command::Get(key) = &cli.command else {
            panic!("expected get, got {:?}", cli.command);
        };
        assert_eq!(key.envelope().user_id(), Some("amzn1.ask.account.ABC"));

        let config = cli.adapter_config(&cli.settings().unwrap()).unwrap();
        assert_eq!(config.table().table_name(), "SkillAttributes");
        assert_eq!(
            config.partition_key(&key.envelope()).unwrap(),
            "amzn1.ask.account.ABC"
        );
    }

    #[test]
    fn test_device_key() {
        let cli = parse(&[
            "skill-attributes",
            "--table",
            "SkillAttributes",
            "delete",
            "--user-id",
            "amzn1.ask.account.ABC",
            "--device-id",
            "amzn1.ask.device.XYZ",
        ]);

        let Command::Delete(key) = &cli.command else {
            panic!("expected delete, got {:?}", cli.command);
        };
        let config = cli.adapter_config(&cli.settings().unwrap()).unwrap();

        assert_eq!(
            config.partition_key(&key.envelope()).unwrap(),
            "amzn1.ask.device.XYZ"
        );
    }

    #[test]
    fn test_flags_flow_through_settings() {
        let cli = parse(&[
            "skill-attributes",
            "ensure-table",
            "--table",
            "SkillAttributes",
            "--partition-key-name",
            "userId",
            "--attributes-key-name",
            "data",
            "--auto-create-table",
            "--endpoint-url",
            "http://localhost:8000",
            "--region",
            "eu-west-1",
        ]);

        let settings = cli.settings().unwrap();
        let config = cli.adapter_config(&settings).unwrap();

        assert_eq!(config.table().partition_key_name(), "userId");
        assert_eq!(config.table().attributes_key_name(), "data");
        assert!(config.auto_create_table());
        assert_eq!(
            settings.aws.endpoint_url.as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(settings.aws.region, "eu-west-1");
    }

    #[test]
    fn test_auto_create_flag_takes_explicit_value() {
        let cli = parse(&[
            "skill-attributes",
            "--table",
            "SkillAttributes",
            "--auto-create-table=false",
            "get",
            "--user-id",
            "amzn1.ask.account.ABC",
        ]);

        assert!(!cli.settings().unwrap().auto_create_table);
    }

    #[test]
    fn test_invalid_auto_create_value_is_rejected() {
        let cli = parse(&[
            "skill-attributes",
            "--table",
            "SkillAttributes",
            "--auto-create-table=sometimes",
            "ensure-table",
        ]);

        assert!(cli.settings().is_err());
    }
}
