//! Command line interface.

use std::collections::HashSet;
use std::io::Write;

use anyhow::Context;
use clap::builder::NonEmptyStringValueParser;
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::fetch::{self, DEFAULT_MAX_SIZE};
use crate::table::TextTable;
use crate::vars::{self, Vars};

const BANNER: &str = r"
╔╦╗  ╔╗    ╔╦╗
 ║   ╠╩╗    ║║
 ╩ o ╚═╝ e ═╩╝ efined";

#[derive(Debug, Parser)]
#[command(
    name = "tbd",
    version,
    about = "A really simple way to create text templates with placeholders.",
    before_help = BANNER
)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// Options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Placeholder start delimiter
    #[arg(
        long,
        global = true,
        env = "TBD_START_TAG",
        default_value = "{{",
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub start_tag: String,

    /// Placeholder end delimiter
    #[arg(
        long,
        global = true,
        env = "TBD_END_TAG",
        default_value = "}}",
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub end_tag: String,

    /// Maximum size, in bytes, of a template or variable file
    #[arg(long, global = true, env = "TBD_MAX_SIZE", default_value_t = DEFAULT_MAX_SIZE)]
    pub max_size: u64,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Combines a template with one or more env files
    Merge {
        /// Template location: a path, an http(s) URL or `-` for stdin
        #[arg(value_name = "TEMPLATE")]
        template: String,

        /// Variable files, applied in order
        #[arg(value_name = "ENV_FILE")]
        env_files: Vec<String>,

        /// Remove placeholders with no value instead of keeping them
        #[arg(long)]
        drop_unknown: bool,
    },

    /// Shows all placeholders defined in the specified template
    Marks {
        #[arg(value_name = "TEMPLATE")]
        template: String,

        /// Print each placeholder once
        #[arg(long)]
        unique: bool,
    },

    /// Shows all built-in (and eventually user defined) variables
    Vars {
        #[arg(value_name = "ENV_FILE")]
        env_files: Vec<String>,
    },
}

impl Cli {
    /// Runs the selected command, writing its output to `out`.
    pub fn run(self, out: &mut dyn Write) -> anyhow::Result<()> {
        let settings = self.settings;
        match self.command {
            Some(Command::Merge {
                template,
                env_files,
                drop_unknown,
            }) => merge(&settings, &template, &env_files, drop_unknown, out),
            Some(Command::Marks { template, unique }) => marks(&settings, &template, unique, out),
            Some(Command::Vars { env_files }) => show_vars(&settings, &env_files, out),
            None => {
                Cli::command().write_help(&mut &mut *out)?;
                Ok(())
            }
        }
    }
}

fn load_vars(settings: &Settings, env_files: &[String]) -> anyhow::Result<Vars> {
    let cwd = std::env::current_dir().ok();
    let mut vars = vars::builtin_vars(cwd.as_deref());
    vars::load_user_vars(&mut vars, env_files, settings.max_size)?;
    Ok(vars)
}

fn load_template(settings: &Settings, uri: &str) -> anyhow::Result<String> {
    let data = fetch::fetch(uri, settings.max_size)?;
    String::from_utf8(data).with_context(|| format!("template '{uri}' is not valid UTF-8"))
}

fn merge(
    settings: &Settings,
    template: &str,
    env_files: &[String],
    drop_unknown: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let vars = load_vars(settings, env_files)?;
    let tpl = load_template(settings, template)?;
    tracing::info!(template, vars = vars.len(), drop_unknown, "merging");

    let (start, end) = (settings.start_tag.as_str(), settings.end_tag.as_str());
    let written = if drop_unknown {
        tbd_template::execute(&tpl, start, end, out, &vars)
    } else {
        tbd_template::execute_keep_unknown(&tpl, start, end, out, &vars)
    }
    .with_context(|| format!("failed to merge '{template}'"))?;
    out.flush()?;

    tracing::debug!(written, "merge complete");
    Ok(())
}

fn marks(settings: &Settings, template: &str, unique: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let tpl = load_template(settings, template)?;
    let mut tags = tbd_template::marks(&tpl, &settings.start_tag, &settings.end_tag);
    if unique {
        let mut seen = HashSet::new();
        tags.retain(|tag| seen.insert(tag.clone()));
    }
    for tag in tags {
        writeln!(out, "{tag}")?;
    }
    Ok(())
}

fn show_vars(settings: &Settings, env_files: &[String], out: &mut dyn Write) -> anyhow::Result<()> {
    let vars = load_vars(settings, env_files)?;

    let mut table = TextTable::new();
    table.set_header(["Label", "Value"])?;
    for (label, value) in &vars {
        table.add_row([label.clone(), value.to_string()])?;
    }
    writeln!(out, "{}", table.draw())?;
    Ok(())
}
