use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use profile_sync::domain::edit_buffer::{PreferenceField, ProfileField};
use profile_sync::domain::error::DomainError;
use profile_sync::domain::view::ProfileTab;
use profile_sync::{build_service, MountOutcome, ProfileEditor, ProfileSyncConfig, Service};
use runtime::{AppConfig, CliArgs};

mod render;

const MODULE_NAME: &str = "profile_sync";

/// Roommate profile - view and edit your roommate-matching profile
#[derive(Parser)]
#[command(name = "roommate-profile")]
#[command(about = "Roommate profile - view and edit your roommate-matching profile")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the profile API (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the signed-in user's profile
    Show {
        /// Section to show: info, preferences or interests
        #[arg(long, default_value = "info")]
        tab: ProfileTab,
        /// Print profile and stats as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change profile fields and save
    Edit {
        /// Profile field, e.g. --set city=Hue (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        fields: Vec<String>,
        /// Roommate preference, e.g. --pref budget=3tr (repeatable)
        #[arg(long = "pref", value_name = "FIELD=VALUE")]
        prefs: Vec<String>,
        /// Toggle an interest tag (repeatable)
        #[arg(long = "interest", value_name = "TAG")]
        interests: Vec<String>,
        /// Toggle a lifestyle habit (repeatable)
        #[arg(long = "lifestyle", value_name = "TAG")]
        lifestyle: Vec<String>,
        /// Print the edited profile without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// List the suggested interests and lifestyle habits
    Catalog,
    /// Forget the cached sign-in on this device
    Logout,
    /// Check configuration
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);
    if let Some(url) = &cli.api_url {
        override_api_url(&mut config, url)?;
    }

    let logging_config = config
        .logging
        .clone()
        .unwrap_or_else(runtime::default_logging_config);
    runtime::logging::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::info!("roommate-profile starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let module_cfg: ProfileSyncConfig = config.module_config(MODULE_NAME)?;
    let home = config.home_dir();

    match cli.command.unwrap_or(Commands::Show {
        tab: ProfileTab::Info,
        json: false,
    }) {
        Commands::Show { tab, json } => show(&module_cfg, &home, tab, json).await,
        Commands::Edit {
            fields,
            prefs,
            interests,
            lifestyle,
            dry_run,
        } => {
            let edits = Edits::parse(&fields, &prefs, interests, lifestyle)?;
            edit(&module_cfg, &home, edits, dry_run).await
        }
        Commands::Catalog => {
            print!("{}", render::Catalog);
            Ok(())
        }
        Commands::Logout => {
            service(&module_cfg, &home)?.sign_out()?;
            println!("Signed out");
            Ok(())
        }
        Commands::Check => {
            service(&module_cfg, &home)?;
            println!("Configuration is valid");
            Ok(())
        }
    }
}

/// Write `--api-url` into the module section so it wins over file and env.
fn override_api_url(config: &mut AppConfig, url: &str) -> Result<()> {
    let section = config
        .modules
        .entry(MODULE_NAME.to_string())
        .or_insert_with(|| serde_json::json!({}));
    let map = section
        .as_object_mut()
        .ok_or_else(|| anyhow!("modules.{MODULE_NAME} must be a mapping"))?;
    map.insert("api_base_url".into(), serde_json::Value::from(url));
    Ok(())
}

fn service(cfg: &ProfileSyncConfig, home: &Path) -> Result<Arc<Service>> {
    Ok(Arc::new(build_service(cfg, home)?))
}

async fn open_editor(cfg: &ProfileSyncConfig, home: &Path) -> Result<ProfileEditor> {
    let mut editor = ProfileEditor::new(service(cfg, home)?);
    match editor.mount().await {
        MountOutcome::Loaded => Ok(editor),
        MountOutcome::RedirectToLogin => {
            bail!("Not signed in. Log in with the roommate web app first.")
        }
    }
}

async fn show(cfg: &ProfileSyncConfig, home: &Path, tab: ProfileTab, json: bool) -> Result<()> {
    let mut editor = open_editor(cfg, home).await?;
    editor.select_tab(tab);

    if json {
        let out = render::JsonView::new(&editor);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render::Page::new(&editor));
    }
    if let Some(note) = editor.view().notification() {
        eprintln!("{}", render::Note(note));
    }
    Ok(())
}

/// Mutations requested on the command line, validated before any request.
struct Edits {
    fields: Vec<(ProfileField, String)>,
    prefs: Vec<(PreferenceField, String)>,
    interests: Vec<String>,
    lifestyle: Vec<String>,
}

impl Edits {
    fn parse(
        fields: &[String],
        prefs: &[String],
        interests: Vec<String>,
        lifestyle: Vec<String>,
    ) -> Result<Self> {
        let fields = fields
            .iter()
            .map(|raw| assignment::<ProfileField>(raw))
            .collect::<Result<Vec<_>>>()?;
        if let Some((field, _)) = fields.iter().find(|(f, _)| f.is_read_only()) {
            bail!("Field '{field}' cannot be changed");
        }
        let prefs = prefs
            .iter()
            .map(|raw| assignment::<PreferenceField>(raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            fields,
            prefs,
            interests,
            lifestyle,
        })
    }

    fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.prefs.is_empty()
            && self.interests.is_empty()
            && self.lifestyle.is_empty()
    }

    fn apply(self, editor: &mut ProfileEditor) -> Result<(), DomainError> {
        for (field, value) in self.fields {
            editor.set_field(field, value)?;
        }
        for (field, value) in self.prefs {
            editor.set_preference_field(field, value)?;
        }
        for tag in &self.interests {
            editor.toggle_interest(tag)?;
        }
        for tag in &self.lifestyle {
            editor.toggle_lifestyle(tag)?;
        }
        Ok(())
    }
}

fn assignment<F>(raw: &str) -> Result<(F, String)>
where
    F: FromStr<Err = DomainError>,
{
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected FIELD=VALUE, got '{raw}'"))?;
    let field = name.trim().parse::<F>()?;
    Ok((field, value.to_string()))
}

async fn edit(cfg: &ProfileSyncConfig, home: &Path, edits: Edits, dry_run: bool) -> Result<()> {
    if edits.is_empty() {
        bail!("Nothing to change. Use --set, --pref, --interest or --lifestyle.");
    }

    let mut editor = open_editor(cfg, home).await?;
    if !editor.view().profile_ready() {
        if let Some(note) = editor.view().notification() {
            eprintln!("{}", render::Note(note));
        }
        bail!("Profile could not be loaded; refusing to overwrite it");
    }
    // A not-found lookup leaves a blank buffer; saving it would wipe the stored email.
    if editor.view().edit().saved().email.trim().is_empty() {
        if let Some(note) = editor.view().notification() {
            eprintln!("{}", render::Note(note));
        }
        bail!("No profile exists for this account; refusing to save a blank one");
    }

    editor.begin_edit();
    edits.apply(&mut editor)?;

    if dry_run {
        println!(
            "{}",
            serde_json::to_string_pretty(editor.view().edit().working())?
        );
        return Ok(());
    }

    let saved = editor.save().await;
    if let Some(note) = editor.view().notification() {
        eprintln!("{}", render::Note(note));
    }
    saved.context("Profile was not saved")?;
    print!("{}", render::Page::new(&editor));
    Ok(())
}
