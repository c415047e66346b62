mod api;
mod cache;
mod config;
mod debounce;
mod form;
mod format;
mod models;
mod notify;
mod pages;
mod pagination;
mod tags;
mod telemetry;
#[cfg(test)]
mod testing;
mod tui;
mod upload;

use anyhow::{Context, Result, anyhow, bail};
use api::{HttpApi, ScreeningApi};
use cache::SystemClock;
use clap::{Args, Parser, Subcommand};
use config::ConsoleConfig;
use form::ConditionForm;
use format::{format_optional_date, truncate};
use models::{Condition, Talent};
use notify::ConsoleNotifier;
use pages::talents::TalentSearch;
use pages::{ConditionsPage, LoadOutcome, Page, PageContext, TalentsPage, UploadPage};
use std::path::PathBuf;
use tags::TagInput;
use telemetry::LogTarget;

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "Candidate screening console - manage conditions, screen resumes, browse talents")]
struct Cli {
    /// Base URL of the screening API (overrides SCREENER_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage screening conditions
    Conditions {
        #[command(subcommand)]
        command: ConditionCommands,
    },

    /// Browse screened talents
    Talents {
        #[command(subcommand)]
        command: TalentCommands,
    },

    /// Upload a resume and screen it
    Upload {
        /// Path to a PDF, DOCX or DOC file (max 10 MB)
        file: PathBuf,

        /// Screen against this condition ID
        #[arg(short, long)]
        condition: Option<i64>,
    },

    /// Open the interactive console (default)
    Console,
}

#[derive(Subcommand)]
enum ConditionCommands {
    /// List conditions
    List {
        /// Filter by name
        #[arg(short, long)]
        name: Option<String>,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Create a condition
    Create(ConditionArgs),

    /// Replace a condition with the given fields
    Update {
        /// Condition ID
        id: i64,

        #[command(flatten)]
        fields: ConditionArgs,
    },

    /// Delete a condition
    Delete {
        /// Condition ID
        id: i64,
    },

    /// Turn a plain-language description into condition fields
    Parse {
        /// e.g. "Backend engineer, bachelor or above, 3 years, Python"
        text: String,

        /// Save the parsed condition right away
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args)]
struct ConditionArgs {
    /// Condition name
    #[arg(short, long)]
    name: String,

    /// Description
    #[arg(short, long)]
    description: Option<String>,

    /// Create the condition disabled
    #[arg(long)]
    inactive: bool,

    /// Minimum education (associate, bachelor, master, doctorate)
    #[arg(short, long)]
    education: Option<String>,

    /// Minimum years of experience
    #[arg(short = 'y', long)]
    experience: Option<u32>,

    /// School tier (top, key, regular)
    #[arg(long)]
    school_tier: Option<String>,

    /// Required skill (repeatable)
    #[arg(short, long = "skill")]
    skills: Vec<String>,

    /// Accepted major (repeatable)
    #[arg(short, long = "major")]
    majors: Vec<String>,
}

impl ConditionArgs {
    fn into_form(self, editing_id: Option<i64>) -> ConditionForm {
        ConditionForm {
            editing_id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            is_active: !self.inactive,
            education_level: self.education,
            experience_years: self.experience.map(|y| y.to_string()).unwrap_or_default(),
            school_tier: self.school_tier,
            skills: TagInput::from_values(&self.skills),
            major: TagInput::from_values(&self.majors),
            ..ConditionForm::new()
        }
    }
}

#[derive(Subcommand)]
enum TalentCommands {
    /// List talents
    List {
        /// Filter by name
        #[arg(short, long)]
        name: Option<String>,

        /// Filter by education level
        #[arg(short, long)]
        education: Option<String>,

        /// Filter by screening status (pending, qualified, unqualified)
        #[arg(short, long)]
        status: Option<String>,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show talent details
    Show {
        /// Talent ID
        id: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConsoleConfig::load()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }

    let command = cli.command.unwrap_or(Commands::Console);
    let log_target = match command {
        Commands::Console => LogTarget::File(telemetry::default_log_file()),
        _ => LogTarget::Stderr,
    };
    telemetry::init(&config.log_level, log_target)?;
    tracing::debug!(api_url = %config.api_url, "configuration loaded");

    let api = HttpApi::new(&config).context("Failed to build HTTP client")?;
    let mut notifier = ConsoleNotifier;
    let mut ctx = PageContext::new(&api, &mut notifier);

    match command {
        Commands::Conditions { command } => {
            let mut page = ConditionsPage::new(config.page_size, Box::new(SystemClock));
            match command {
                ConditionCommands::List { name, page: number } => {
                    load_conditions(&mut page, name.as_deref(), number, &mut ctx)?;
                    print_conditions(page.items());
                    println!("\n{}", page.pagination().summary());
                }

                ConditionCommands::Create(fields) => {
                    page.open_create();
                    if let Some(form) = page.form_mut() {
                        *form = fields.into_form(None);
                    }
                    if !page.submit_form(&mut ctx) {
                        bail!("Condition was not created");
                    }
                }

                ConditionCommands::Update { id, fields } => {
                    page.open_create();
                    if let Some(form) = page.form_mut() {
                        *form = fields.into_form(Some(id));
                    }
                    if !page.submit_form(&mut ctx) {
                        bail!("Condition #{} was not updated", id);
                    }
                }

                ConditionCommands::Delete { id } => {
                    if !page.delete(id, &mut ctx) {
                        bail!("Condition #{} was not deleted", id);
                    }
                }

                ConditionCommands::Parse { text, save } => {
                    if !page.parse_natural_language(&text, &mut ctx) {
                        bail!("Could not parse the description");
                    }
                    if let Some(form) = page.form() {
                        print_form(form);
                    }
                    if save && !page.submit_form(&mut ctx) {
                        bail!("Parsed condition was not saved");
                    }
                }
            }
        }

        Commands::Talents { command } => {
            let mut page = TalentsPage::new(config.page_size);
            match command {
                TalentCommands::List {
                    name,
                    education,
                    status,
                    page: number,
                } => {
                    let search = TalentSearch {
                        name,
                        education_level: education,
                        screening_status: status,
                    };
                    load_talents(&mut page, search, number, &mut ctx)?;
                    print_talents(page.items());
                    println!("\n{}", page.pagination().summary());
                }

                TalentCommands::Show { id } => {
                    page.show_detail(id, &mut ctx);
                    match page.detail() {
                        Some(talent) => print_talent(talent),
                        None => bail!("Talent #{} could not be loaded", id),
                    }
                }
            }
        }

        Commands::Upload { file, condition } => {
            let mut page = UploadPage::new();
            page.activate(&mut ctx);
            if let Some(id) = condition {
                if !page.select_condition(Some(id)) {
                    bail!("Condition #{} is not an active screening condition", id);
                }
            }
            if !page.select_file(&file, &mut ctx) {
                bail!("File {} was rejected", file.display());
            }
            if !page.submit(&mut ctx) {
                bail!("Screening failed");
            }
            let result = page.result().ok_or_else(|| anyhow!("No screening result"))?;

            println!("File: {}", page.file_summary().unwrap_or_default());
            if let Some(condition) = page.selected_condition() {
                println!("Condition: {}", condition.name);
            }
            println!(
                "Result: {}",
                if result.is_qualified { "QUALIFIED" } else { "NOT QUALIFIED" }
            );
            if let Some(id) = result.talent_id {
                println!("Talent: #{}", id);
            }
            if let Some(status) = &result.workflow_status {
                println!("Workflow status: {}", status);
            }
            if let Some(secs) = result.processing_time {
                println!("Processing time: {:.2}s", secs);
            }
            if let Some(reason) = &result.qualification_reason {
                println!("\n--- Reason ---\n{}", textwrap::fill(reason, 80));
            }
        }

        Commands::Console => {
            tui::run_console(&api as &dyn ScreeningApi, config.page_size)?;
        }
    }

    Ok(())
}

/// A failed fetch is an error for scripts, not an empty list.
fn load_conditions(
    page: &mut ConditionsPage,
    name: Option<&str>,
    number: u32,
    ctx: &mut PageContext<'_>,
) -> Result<()> {
    if page.open_at(name, number, ctx) == LoadOutcome::Failed {
        bail!("Could not load conditions");
    }
    Ok(())
}

fn load_talents(
    page: &mut TalentsPage,
    search: TalentSearch,
    number: u32,
    ctx: &mut PageContext<'_>,
) -> Result<()> {
    if page.search_at(search, number, ctx) == LoadOutcome::Failed {
        bail!("Could not load talents");
    }
    Ok(())
}

fn print_conditions(conditions: &[Condition]) {
    if conditions.is_empty() {
        println!("No conditions found.");
        return;
    }
    println!(
        "{:<6} {:<28} {:<7} {:<10} {:<4} {:<28} {:<16}",
        "ID", "NAME", "ACTIVE", "EDUCATION", "EXP", "SKILLS", "CREATED"
    );
    println!("{}", "-".repeat(104));
    for c in conditions {
        println!(
            "{:<6} {:<28} {:<7} {:<10} {:<4} {:<28} {:<16}",
            c.id,
            truncate(&c.name, 26),
            if c.is_active { "yes" } else { "no" },
            c.config.education_level.as_deref().unwrap_or("-"),
            c.config
                .experience_years
                .map(|y| y.to_string())
                .unwrap_or_else(|| "-".to_string()),
            truncate(&c.config.skills.join(", "), 26),
            format_optional_date(c.created_at.as_deref())
        );
    }
}

fn print_form(form: &ConditionForm) {
    println!("Name: {}", form.name);
    if !form.description.is_empty() {
        println!("Description: {}", form.description);
    }
    if let Some(level) = &form.education_level {
        println!("Education: {}", level);
    }
    if !form.experience_years.is_empty() {
        println!("Experience: {}+ years", form.experience_years);
    }
    if let Some(tier) = &form.school_tier {
        println!("School tier: {}", tier);
    }
    if !form.skills.is_empty() {
        println!("Skills: {}", form.skills.values().join(", "));
    }
    if !form.major.is_empty() {
        println!("Majors: {}", form.major.values().join(", "));
    }
}

fn print_talents(talents: &[Talent]) {
    if talents.is_empty() {
        println!("No talents found.");
        return;
    }
    println!(
        "{:<6} {:<18} {:<10} {:<22} {:<18} {:>5} {:<12}",
        "ID", "NAME", "EDUCATION", "SCHOOL", "MAJOR", "YEARS", "STATUS"
    );
    println!("{}", "-".repeat(97));
    for t in talents {
        println!(
            "{:<6} {:<18} {:<10} {:<22} {:<18} {:>5} {:<12}",
            t.id,
            truncate(&t.name, 16),
            t.education_level.as_deref().unwrap_or("-"),
            truncate(t.school.as_deref().unwrap_or("-"), 20),
            truncate(t.major.as_deref().unwrap_or("-"), 16),
            t.work_years
                .map(|y| format!("{:.1}", y))
                .unwrap_or_else(|| "-".to_string()),
            t.screening_status.as_deref().unwrap_or("-")
        );
    }
}

fn print_talent(talent: &Talent) {
    println!("Talent #{}", talent.id);
    println!("Name: {}", talent.name);
    let fields = [
        ("Education", &talent.education_level),
        ("School", &talent.school),
        ("Major", &talent.major),
        ("Graduated", &talent.graduation_date),
        ("Phone", &talent.phone),
        ("Email", &talent.email),
        ("Status", &talent.screening_status),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label, value);
        }
    }
    if let Some(years) = talent.work_years {
        println!("Work years: {:.1}", years);
    }
    if talent.screening_date.is_some() {
        println!(
            "Screened: {}",
            format_optional_date(talent.screening_date.as_deref())
        );
    }
    if !talent.skills.is_empty() {
        println!("\n--- Skills ---\n{}", textwrap::fill(&talent.skills.join(", "), 80));
    }
}
