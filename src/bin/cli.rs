use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input};
use dotenvy::dotenv;
use serde_json::Value;
use validator::Validate;

use tonerdesk::modules::custom_fields::admin::CustomFieldAdmin;
use tonerdesk::modules::custom_fields::{CustomFieldStore, PgCustomFieldRepository};
use tonerdesk_auth::create_access_token;
use tonerdesk_config::{DatabaseConfig, JwtConfig};
use tonerdesk_core::Actor;
use tonerdesk_db::{PgPool, init_db_pool};
use tonerdesk_models::custom_fields::{CreateCustomFieldDto, CustomFieldFilterParams, FieldType};
use tonerdesk_models::entity::EntityRef;
use tonerdesk_models::ids::CustomFieldId;
use tonerdesk_observability::init_basic_console_logging;

#[derive(Parser)]
#[command(name = "tonerdesk-cli")]
#[command(about = "TonerDesk CLI - custom fields, permission checks and dev tokens", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage custom field definitions
    Fields {
        #[command(subcommand)]
        command: FieldsCommand,
    },
    /// Read and write custom field values of one entity
    Values {
        #[command(subcommand)]
        command: ValuesCommand,
    },
    /// Evaluate an actor's permissions without touching the database
    Access {
        /// JSON file with page_permissions, location_permissions and read_write_permissions
        #[arg(short = 'a', long)]
        actor: PathBuf,

        #[command(subcommand)]
        check: AccessCheck,
    },
    /// Issue a development access token carrying an actor's permissions
    Token {
        #[arg(short = 'a', long)]
        actor: PathBuf,

        #[arg(short = 's', long, default_value = "1")]
        subject: String,

        #[arg(short = 'e', long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
enum FieldsCommand {
    /// List definitions, ordered by entity type and position
    List {
        #[arg(short = 'e', long)]
        entity_type: Option<String>,
    },
    /// Define a new custom field
    Define {
        /// printer, consumable or order
        #[arg(short = 'e', long)]
        entity_type: String,

        /// Display name (prompted if not provided)
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// text, number, date, select, checkbox or textarea
        #[arg(short = 't', long = "type", default_value = "text")]
        field_type: FieldType,

        /// Comma-separated choices for select fields
        #[arg(short = 'o', long, value_delimiter = ',')]
        options: Option<Vec<String>>,

        #[arg(long)]
        required: bool,
    },
    /// Delete a definition and every value stored for it
    Delete {
        id: CustomFieldId,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ValuesCommand {
    /// Print one value
    Get {
        /// Entity reference such as printer:7
        #[arg(short = 'e', long)]
        entity: EntityRef,

        #[arg(short = 's', long)]
        slug: String,
    },
    /// Store one value; omit --value to clear it
    Set {
        #[arg(short = 'e', long)]
        entity: EntityRef,

        #[arg(short = 's', long)]
        slug: String,

        #[arg(short = 'v', long)]
        value: Option<String>,
    },
    /// Print every stored value of an entity
    Show {
        #[arg(short = 'e', long)]
        entity: EntityRef,
    },
}

#[derive(Subcommand)]
enum AccessCheck {
    Page { name: String },
    Province { id: i64 },
    Site { id: i64 },
    Department { id: i64 },
    Write { module: String },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_basic_console_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Access { actor, check } => handle_access(&actor, check),
        Commands::Token {
            actor,
            subject,
            email,
        } => handle_token(&actor, &subject, email),
        Commands::Fields { command } => handle_fields(&connect().await?, command).await,
        Commands::Values { command } => handle_values(connect().await?, command).await,
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let config = DatabaseConfig::from_env()?;
    init_db_pool(&config)
        .await
        .context("Failed to connect to database")
}

fn read_actor(actor_file: &Path) -> anyhow::Result<Actor> {
    let raw = std::fs::read_to_string(actor_file)
        .with_context(|| format!("Failed to read {}", actor_file.display()))?;
    serde_json::from_str(&raw).context("Invalid actor JSON")
}

fn handle_access(actor_file: &Path, check: AccessCheck) -> anyhow::Result<()> {
    let actor = read_actor(actor_file)?;

    let (label, allowed) = match check {
        AccessCheck::Page { name } => (format!("page {}", name), actor.can_access_page(&name)),
        AccessCheck::Province { id } => (format!("province {}", id), actor.can_view_province(id)),
        AccessCheck::Site { id } => (format!("site {}", id), actor.can_view_site(id)),
        AccessCheck::Department { id } => {
            (format!("department {}", id), actor.can_view_department(id))
        }
        AccessCheck::Write { module } => (format!("write {}", module), actor.can_write(&module)),
    };

    println!("{}: {}", label, if allowed { "allowed" } else { "denied" });
    Ok(())
}

fn handle_token(actor_file: &Path, subject: &str, email: Option<String>) -> anyhow::Result<()> {
    let actor = read_actor(actor_file)?;
    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email address")
            .interact_text()
            .context("Failed to read email")?,
    };

    let token = create_access_token(subject, &email, &actor, &JwtConfig::from_env())
        .map_err(|e| e.error)?;
    println!("{}", token);
    Ok(())
}

async fn handle_fields(pool: &PgPool, command: FieldsCommand) -> anyhow::Result<()> {
    match command {
        FieldsCommand::List { entity_type } => {
            let fields = CustomFieldAdmin::list(pool, CustomFieldFilterParams { entity_type })
                .await
                .map_err(|e| e.error)?;

            if fields.is_empty() {
                println!("No custom fields defined");
            }
            for field in fields {
                println!(
                    "{:>5}  {:<11} {:<28} {:<9} {}",
                    field.id.into_inner(),
                    field.entity_type,
                    field.slug,
                    field.field_type.as_str(),
                    if field.is_active { "" } else { "(inactive)" }
                );
            }
        }
        FieldsCommand::Define {
            entity_type,
            name,
            field_type,
            options,
            required,
        } => {
            let name = match name {
                Some(name) => name,
                None => Input::new()
                    .with_prompt("Field name")
                    .interact_text()
                    .context("Failed to read field name")?,
            };

            let dto = CreateCustomFieldDto {
                entity_type,
                name,
                field_type,
                options,
                is_required: Some(required),
                order: None,
                help_text: None,
                show_in_table: None,
                table_order: None,
                show_in_creation_wizard: None,
            };
            dto.validate()?;

            let field = CustomFieldAdmin::create(pool, dto)
                .await
                .map_err(|e| e.error)?;
            println!("\n✅ Custom field created");
            println!("   ID:   {}", field.id);
            println!("   Slug: {}", field.slug);
        }
        FieldsCommand::Delete { id, yes } => {
            let field = CustomFieldAdmin::get(pool, id).await.map_err(|e| e.error)?;

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Delete '{}' ({}) and all of its values?",
                        field.name, field.entity_type
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
                if !confirmed {
                    return Err(anyhow!("Aborted"));
                }
            }

            CustomFieldAdmin::delete(pool, id).await.map_err(|e| e.error)?;
            println!("\n✅ Custom field '{}' deleted", field.slug);
        }
    }
    Ok(())
}

async fn handle_values(pool: PgPool, command: ValuesCommand) -> anyhow::Result<()> {
    let store = CustomFieldStore::new(PgCustomFieldRepository::new(pool));

    match command {
        ValuesCommand::Get { entity, slug } => {
            match store.get_custom_field_value(&entity, &slug).await? {
                Some(value) => println!("{}", value),
                None => println!("(null)"),
            }
        }
        ValuesCommand::Set {
            entity,
            slug,
            value,
        } => {
            let value = value.map(Value::String).unwrap_or(Value::Null);
            store.set_custom_field_value(&entity, &slug, value).await?;

            let stored = store.get_custom_field_value(&entity, &slug).await?;
            println!("{} {} = {}", entity, slug, stored.as_deref().unwrap_or("(null)"));
        }
        ValuesCommand::Show { entity } => {
            let values = store.custom_field_map(&entity).await?;
            if values.is_empty() {
                println!("No custom field values stored for {}", entity);
            }
            for (slug, value) in values {
                println!("{:<28} {}", slug, value.as_deref().unwrap_or("(null)"));
            }
        }
    }
    Ok(())
}
