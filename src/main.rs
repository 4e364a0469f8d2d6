//! Shelter CLI - catalog and editor for the pet shelter database

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use shelter_provider::contract::{self, Gender};
use shelter_provider::editor::{self, EditorMode, PetForm, SaveOutcome};
use shelter_provider::{PetProvider, ProviderConfig};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "shelter")]
#[command(version)]
#[command(about = "Keep track of the pets in a shelter")]
#[command(long_about = r#"
Lists, adds, edits and deletes pets stored in a local SQLite database.

Example usage:
  shelter seed
  shelter add --name Binx --gender female --breed Tabby --weight 4
  shelter edit 2 --weight 5
  shelter list
"#)]
struct Cli {
   /// Enable verbose logging
   #[arg(short, long, global = true)]
   verbose: bool,

   /// Path to the database file (overrides the config file)
   #[arg(short, long, global = true)]
   database: Option<PathBuf>,

   /// Path to a TOML config file
   #[arg(short, long, global = true)]
   config: Option<PathBuf>,

   #[command(subcommand)]
   command: Commands,
}

#[derive(Subcommand)]
enum Commands {
   /// List every pet
   List,

   /// Show one pet
   Show {
      /// Pet id
      id: i64,
   },

   /// Add a new pet
   Add {
      #[arg(long)]
      name: String,

      /// unknown, male or female
      #[arg(long, default_value = "unknown")]
      gender: Gender,

      #[arg(long)]
      breed: Option<String>,

      /// Weight in kg (defaults to 0)
      #[arg(long, allow_hyphen_values = true)]
      weight: Option<i64>,
   },

   /// Change the fields of an existing pet
   Edit {
      /// Pet id
      id: i64,

      #[arg(long)]
      name: Option<String>,

      /// unknown, male or female
      #[arg(long)]
      gender: Option<Gender>,

      /// Empty string clears the breed
      #[arg(long)]
      breed: Option<String>,

      #[arg(long, allow_hyphen_values = true)]
      weight: Option<i64>,
   },

   /// Delete one pet
   Delete {
      /// Pet id
      id: i64,
   },

   /// Delete every pet
   DeleteAll,

   /// Insert a dummy pet
   Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
   let cli = Cli::parse();

   // Initialize logging
   let filter = if cli.verbose {
      EnvFilter::new("debug")
   } else {
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
   };

   tracing_subscriber::registry()
      .with(fmt::layer().with_writer(std::io::stderr))
      .with(filter)
      .init();

   let mut config = match &cli.config {
      Some(path) => ProviderConfig::load(path)
         .with_context(|| format!("failed to load config from {}", path.display()))?,
      None => ProviderConfig::default(),
   };
   if let Some(database) = cli.database {
      config = config.with_database_path(database);
   }

   let provider = PetProvider::open(&config)
      .await
      .with_context(|| format!("failed to open {}", config.database_path.display()))?;

   let result = run(&provider, cli.command).await;
   provider.close().await?;
   result
}

async fn run(provider: &PetProvider, command: Commands) -> anyhow::Result<()> {
   match command {
      Commands::List => {
         let pets = provider.list_pets().await?;
         println!("The pets table contains {} pets.", pets.len());
         for pet in pets {
            println!("{pet}");
         }
      }

      Commands::Show { id } => match provider.get_pet(id).await? {
         Some(pet) => println!("{pet}"),
         None => bail!("no pet with id {id}"),
      },

      Commands::Add {
         name,
         gender,
         breed,
         weight,
      } => {
         let form = PetForm {
            name: Some(name),
            breed,
            gender: Some(gender),
            weight,
         };
         report(editor::save_pet(provider, &EditorMode::Add, &form).await?)?;
      }

      Commands::Edit {
         id,
         name,
         gender,
         breed,
         weight,
      } => {
         let mode = EditorMode::Edit(contract::item_uri(id));
         let form = PetForm {
            name,
            breed,
            gender,
            weight,
         };
         match editor::save_pet(provider, &mode, &form).await? {
            SaveOutcome::Updated(0) => bail!("no pet with id {id} (or nothing to change)"),
            outcome => report(outcome)?,
         }
      }

      Commands::Delete { id } => {
         let mode = EditorMode::Edit(contract::item_uri(id));
         match editor::delete_pet(provider, &mode).await? {
            0 => bail!("no pet with id {id}"),
            _ => println!("Pet deleted"),
         }
      }

      Commands::DeleteAll => {
         let deleted = provider.delete(&contract::content_uri()).await?;
         println!("Deleted {deleted} pets");
      }

      Commands::Seed => {
         let form = PetForm {
            name: Some("Toto".into()),
            breed: Some("Terrier".into()),
            gender: Some(Gender::Male),
            weight: Some(7),
         };
         report(editor::save_pet(provider, &EditorMode::Add, &form).await?)?;
      }
   }

   Ok(())
}

fn report(outcome: SaveOutcome) -> anyhow::Result<()> {
   match outcome {
      SaveOutcome::Inserted(id) => println!("Pet saved with id {id}"),
      SaveOutcome::Updated(_) => println!("Pet updated"),
      SaveOutcome::Discarded => println!("Nothing saved: a pet needs a name"),
      SaveOutcome::Failed => bail!("error with saving pet"),
   }
   Ok(())
}
