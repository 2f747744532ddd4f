use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use strongbox_core::diagnostic::{Diagnostic, has_errors};
use strongbox_core::provider::{Provider, ProviderError, ResourceType};
use strongbox_core::resource::{Resource, ResourceId, State, Value, attributes_from_json, attributes_to_json};
use strongbox_core::schema::ResourceSchema;
use strongbox_provider_ibm::config::{EndpointType, ProviderConfig};
use strongbox_provider_ibm::resources::resource_type;
use strongbox_provider_ibm::{IbmSmProvider, convert, schemas};

/// Local name given to resources addressed from the command line
const RESOURCE_NAME: &str = "cli";

#[derive(Parser)]
#[command(name = "strongbox")]
#[command(about = "Manage IBM Cloud Secrets Manager secrets and secret groups", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Default)]
struct ConnectionArgs {
    /// JSON provider configuration file; flags override its values
    #[arg(long, env = "SM_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Full instance URL (e.g., https://<id>.<region>.secrets-manager.appdomain.cloud)
    #[arg(long, env = "SM_SERVICE_URL", global = true)]
    service_url: Option<String>,

    #[arg(long, env = "SM_INSTANCE_ID", global = true)]
    instance_id: Option<String>,

    #[arg(long, env = "SM_REGION", global = true)]
    region: Option<String>,

    /// "public" or "private"
    #[arg(long, env = "SM_ENDPOINT_TYPE", global = true)]
    endpoint_type: Option<String>,

    #[arg(long, env = "IBMCLOUD_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "SM_BEARER_TOKEN", global = true, hide_env_values = true)]
    bearer_token: Option<String>,

    #[arg(long, env = "IAM_URL", global = true)]
    iam_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "SM_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// Page size for listing secrets
    #[arg(long, env = "SM_PAGE_SIZE", global = true)]
    page_size: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List resource types, or show the schema of one
    Schema {
        resource_type: Option<String>,
    },
    /// Read a resource by its identifier (also imports it)
    Read { resource_type: String, id: String },
    /// Create a resource from a JSON attribute file
    Create {
        resource_type: String,
        #[arg(long, short)]
        file: PathBuf,
    },
    /// Update a resource in place from a JSON attribute file
    Update {
        resource_type: String,
        id: String,
        #[arg(long, short)]
        file: PathBuf,
    },
    /// Delete a resource
    Delete { resource_type: String, id: String },
    /// Read a data source
    Data { resource_type: String },
    /// Validate a JSON attribute file without contacting the service
    Validate {
        resource_type: String,
        #[arg(long, short)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Schema { resource_type } => run_schema(resource_type.as_deref()),
        Commands::Validate {
            resource_type,
            file,
        } => run_validate(&resource_type, &file),
        Commands::Read { resource_type, id } => run_read(&cli.connection, &resource_type, &id).await,
        Commands::Create {
            resource_type,
            file,
        } => run_create(&cli.connection, &resource_type, &file).await,
        Commands::Update {
            resource_type,
            id,
            file,
        } => run_update(&cli.connection, &resource_type, &id, &file).await,
        Commands::Delete { resource_type, id } => {
            run_delete(&cli.connection, &resource_type, &id).await
        }
        Commands::Data { resource_type } => run_data(&cli.connection, &resource_type).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_config(args: &ConnectionArgs) -> Result<ProviderConfig, String> {
    let mut config = match &args.config {
        Some(path) => ProviderConfig::from_file(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?,
        None => ProviderConfig::default(),
    };

    if args.service_url.is_some() {
        config.service_url = args.service_url.clone();
    }
    if args.instance_id.is_some() {
        config.instance_id = args.instance_id.clone();
    }
    if args.region.is_some() {
        config.region = args.region.clone();
    }
    if let Some(endpoint_type) = &args.endpoint_type {
        config.endpoint_type = endpoint_type
            .parse::<EndpointType>()
            .map_err(|e| e.to_string())?;
    }
    if args.api_key.is_some() {
        config.api_key = args.api_key.clone();
    }
    if args.bearer_token.is_some() {
        config.bearer_token = args.bearer_token.clone();
    }
    if let Some(iam_url) = &args.iam_url {
        config.iam_url = iam_url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }

    Ok(config)
}

fn get_provider(args: &ConnectionArgs) -> Result<Box<dyn Provider>, String> {
    let config = build_config(args)?;
    let provider = IbmSmProvider::new(&config).map_err(|e| report(&e))?;
    Ok(Box::new(provider))
}

fn report(err: &ProviderError) -> String {
    Diagnostic::from(err).to_string()
}

fn get_schema(name: &str, want_data_source: bool) -> Result<ResourceSchema, String> {
    let resource_type =
        resource_type(name).ok_or_else(|| format!("Unknown resource type: {}", name))?;
    match (resource_type.is_data_source(), want_data_source) {
        (true, false) => Err(format!("{} is a data source; use `strongbox data {}`", name, name)),
        (false, true) => Err(format!("{} is a resource, not a data source", name)),
        _ => Ok(resource_type.schema()),
    }
}

fn load_attributes(file: &Path) -> Result<HashMap<String, Value>, String> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", file.display(), e))?;
    attributes_from_json(&json)
        .ok_or_else(|| format!("{} must contain a JSON object", file.display()))
}

fn print_state(state: &State) {
    if !state.exists {
        println!("{}", format!("{} not found.", state.id).yellow());
        return;
    }
    let output = serde_json::json!({
        "id": state.identifier,
        "attributes": attributes_to_json(&state.attributes),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
    );
}

fn run_schema(name: Option<&str>) -> Result<(), String> {
    let Some(name) = name else {
        for schema in schemas::all_schemas() {
            let short = schema
                .resource_type
                .strip_prefix(schemas::SCHEMA_PREFIX)
                .unwrap_or(&schema.resource_type);
            println!(
                "  • {} - {}",
                short.bold(),
                schema.description.as_deref().unwrap_or("")
            );
        }
        return Ok(());
    };

    let schema = schemas::get_schema(name).ok_or_else(|| format!("Unknown resource type: {}", name))?;
    println!("{}", schema.resource_type.cyan().bold());
    if let Some(description) = &schema.description {
        println!("{}", description);
    }
    println!();

    let mut attributes: Vec<_> = schema.attributes.values().collect();
    attributes.sort_by(|a, b| a.name.cmp(&b.name));
    for attr in attributes {
        let mut flags = Vec::new();
        if attr.required {
            flags.push("required");
        }
        if attr.optional {
            flags.push("optional");
        }
        if attr.computed {
            flags.push("computed");
        }
        if attr.force_new {
            flags.push("force-new");
        }
        println!(
            "  {} ({}) [{}]",
            attr.name.green(),
            attr.attr_type,
            flags.join(", ")
        );
        if let Some(description) = &attr.description {
            println!("      {}", description.dimmed());
        }
    }
    Ok(())
}

fn run_validate(name: &str, file: &Path) -> Result<(), String> {
    let schema = get_schema(name, false)?;
    let attributes = load_attributes(file)?;

    println!("{}", "Validating...".cyan());

    let mut diagnostics: Vec<Diagnostic> = match schema.validate(&attributes) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(Diagnostic::from).collect(),
    };
    if has_errors(&diagnostics) {
        let messages: Vec<String> = diagnostics.iter().map(Diagnostic::to_string).collect();
        return Err(messages.join("\n"));
    }

    let mut defaulted = attributes.clone();
    schema.apply_defaults(&mut defaulted);
    let checked = match name {
        schemas::sm_secret::RESOURCE_TYPE => {
            convert::prototype_from_attributes(&defaulted).map(|_| ())
        }
        _ => convert::group_prototype_from_attributes(&defaulted).map(|_| ()),
    };
    checked.map_err(|e| e.to_string())?;

    let mut filled = Vec::new();
    defaulted_members(&attributes, &defaulted, "", &mut filled);
    filled.sort();
    diagnostics.extend(filled.into_iter().map(|member| {
        Diagnostic::warning(format!("{} not set; the default applies", member))
            .with_attribute(member)
    }));
    for diagnostic in &diagnostics {
        println!("  {}", diagnostic.to_string().yellow());
    }

    println!(
        "{}",
        format!("✓ {} validated successfully.", file.display())
            .green()
            .bold()
    );
    Ok(())
}

/// Dotted paths of members that exist only after defaults were applied
fn defaulted_members(
    before: &HashMap<String, Value>,
    after: &HashMap<String, Value>,
    path: &str,
    out: &mut Vec<String>,
) {
    for (name, value) in after {
        let member = if path.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", path, name)
        };
        match before.get(name) {
            None => out.push(member),
            Some(prev) => {
                if let (Some(b), Some(a)) = (prev.first_block(), value.first_block()) {
                    defaulted_members(b, a, &member, out);
                }
            }
        }
    }
}

async fn run_read(args: &ConnectionArgs, name: &str, identifier: &str) -> Result<(), String> {
    get_schema(name, false)?;
    let provider = get_provider(args)?;
    let state = provider
        .read(&ResourceId::new(name, RESOURCE_NAME), Some(identifier))
        .await
        .map_err(|e| report(&e))?;
    print_state(&state);
    Ok(())
}

async fn run_create(args: &ConnectionArgs, name: &str, file: &Path) -> Result<(), String> {
    get_schema(name, false)?;
    let attributes = load_attributes(file)?;
    let provider = get_provider(args)?;

    let resource = Resource::new(name, RESOURCE_NAME).with_attributes(attributes);
    let state = provider.create(&resource).await.map_err(|e| report(&e))?;
    println!("  {} {} created", "✓".green(), state.id);
    print_state(&state);
    Ok(())
}

async fn run_update(
    args: &ConnectionArgs,
    name: &str,
    identifier: &str,
    file: &Path,
) -> Result<(), String> {
    get_schema(name, false)?;
    let attributes = load_attributes(file)?;
    let provider = get_provider(args)?;

    let id = ResourceId::new(name, RESOURCE_NAME);
    let current = provider
        .read(&id, Some(identifier))
        .await
        .map_err(|e| report(&e))?;
    if !current.exists {
        return Err(format!("{} {} not found", name, identifier));
    }

    let desired = Resource::new(name, RESOURCE_NAME).with_attributes(attributes);
    let state = provider
        .update(&id, identifier, &current, &desired)
        .await
        .map_err(|e| report(&e))?;
    println!("  {} {} updated", "✓".green(), state.id);
    print_state(&state);
    Ok(())
}

async fn run_delete(args: &ConnectionArgs, name: &str, identifier: &str) -> Result<(), String> {
    get_schema(name, false)?;
    let provider = get_provider(args)?;
    let id = ResourceId::new(name, RESOURCE_NAME);
    provider
        .delete(&id, identifier)
        .await
        .map_err(|e| report(&e))?;
    println!("  {} {} {} deleted", "✓".green(), name, identifier);
    Ok(())
}

async fn run_data(args: &ConnectionArgs, name: &str) -> Result<(), String> {
    get_schema(name, true)?;
    let provider = get_provider(args)?;
    let resource = Resource::new(name, RESOURCE_NAME).with_read_only(true);
    let state = provider
        .read_data_source(&resource)
        .await
        .map_err(|e| report(&e))?;
    print_state(&state);
    Ok(())
}
