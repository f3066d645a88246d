use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::{info, LevelFilter};
use oscloud_core::storage::config::{load_store, save_store};
use oscloud_core::{
    CloudConfig, CloudForm, CloudProfile, CloudProfileStore, ConnectionValidator, KeystoneClient,
    ProbeTimeouts, SlaveTemplate, StoreError, ValidationVerdict,
};

/// Exit code when a connection test reports ERROR.
const EXIT_VERDICT_ERROR: i32 = 1;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "oscloud", version, subcommand_required = true)]
pub struct Args {
    /// Cloud configuration file (defaults to the user config dir)
    #[arg(long, global = true, env = "OSCLOUD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Upper bound for a connection test, in seconds
    #[arg(
        long,
        global = true,
        default_value_t = 20,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check connection parameters without saving anything
    TestConnection(ConnectionArgs),
    /// Test the connection of a configured cloud
    Verify {
        name: String,
    },
    /// List configured clouds
    List,
    /// Show one cloud (the credential is masked)
    Show {
        name: String,
    },
    /// Add a cloud, or replace it with --replace
    Add(AddArgs),
    /// Delete a cloud
    Remove {
        name: String,
    },
    /// Manage the agent templates of a cloud
    #[command(subcommand)]
    Template(TemplateCommand),
}

#[derive(ClapArgs, Debug)]
pub struct ConnectionArgs {
    /// Region; optional
    #[arg(long)]
    pub region: Option<String>,
    /// Identity endpoint URL, e.g. https://keystone.example.com:5000/v3
    #[arg(long)]
    pub endpoint_url: Option<String>,
    /// User name
    #[arg(long)]
    pub identity: Option<String>,
    /// Password
    #[arg(long, env = "OSCLOUD_CREDENTIAL", hide_env_values = true)]
    pub credential: Option<String>,
    /// Project name
    #[arg(long)]
    pub project: Option<String>,
    /// Domain name
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct AddArgs {
    /// Unique cloud name
    #[arg(long)]
    pub name: String,
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// Maximum number of instances; empty or 0 means unlimited
    #[arg(long, default_value = "")]
    pub instance_cap: String,
    /// Minutes an idle agent is kept
    #[arg(long, default_value = "")]
    pub retention_time: String,
    /// Milliseconds allowed for the init script
    #[arg(long, default_value = "")]
    pub script_timeout: String,
    /// Milliseconds allowed for an instance to boot
    #[arg(long, default_value = "")]
    pub start_timeout: String,
    /// Pool to allocate floating IPs from
    #[arg(long)]
    pub floating_ip_pool: Option<String>,
    /// Assign floating IPs to new instances
    #[arg(long)]
    pub floating_ips: bool,
    /// Overwrite an existing cloud with the same name
    #[arg(long)]
    pub replace: bool,
    /// Refuse to save unless the connection test passes
    #[arg(long)]
    pub test_connection: bool,
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// List the templates of a cloud
    List { cloud: String },
    /// Add or replace a template
    Add {
        cloud: String,
        #[arg(long)]
        name: String,
        /// Space separated labels
        #[arg(long, default_value = "")]
        labels: String,
        #[arg(long)]
        image_id: String,
        /// Flavor
        #[arg(long)]
        hardware_id: String,
        #[arg(long, default_value = "")]
        network_id: String,
        #[arg(long)]
        key_pair_name: Option<String>,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        num_executors: u32,
        /// 0 means unlimited
        #[arg(long, default_value_t = 0)]
        instance_cap: u32,
    },
    /// Delete a template
    Remove { cloud: String, name: String },
}

impl AddArgs {
    fn into_form(self) -> CloudForm {
        let c = self.connection;
        CloudForm {
            name: self.name,
            identity: c.identity.unwrap_or_default(),
            credential: c.credential.unwrap_or_default(),
            end_point_url: c.endpoint_url.unwrap_or_default(),
            project: c.project.unwrap_or_default(),
            domain: c.domain.unwrap_or_default(),
            zone: c.region.unwrap_or_default(),
            instance_cap: self.instance_cap,
            retention_time: self.retention_time,
            script_timeout: self.script_timeout,
            start_timeout: self.start_timeout,
            floating_ip_pool: self.floating_ip_pool.unwrap_or_default(),
            floating_ips: self.floating_ips,
        }
    }
}

struct CliState {
    path: PathBuf,
    store: CloudProfileStore,
    timeouts: ProbeTimeouts,
}

impl CliState {
    fn validator(&self) -> Result<ConnectionValidator> {
        let client = KeystoneClient::new(self.timeouts).context("building HTTP client")?;
        Ok(ConnectionValidator::new(Arc::new(client)))
    }

    fn save(&self) -> Result<()> {
        save_store(&self.store, &self.path)
            .with_context(|| format!("saving clouds to {}", self.path.display()))
    }

    fn cloud(&self, name: &str) -> Result<CloudProfile> {
        match self.store.get_by_name(name) {
            Ok(p) => Ok(p),
            Err(StoreError::NotFound(_)) => bail!("no such cloud: '{name}'"),
            Err(e) => Err(e.into()),
        }
    }
}

/// Prints the verdict and maps it to the process exit code.
fn report(verdict: &ValidationVerdict) -> i32 {
    println!("{verdict}");
    if verdict.is_ok() {
        0
    } else {
        EXIT_VERDICT_ERROR
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "********"
    }
}

fn print_profile(p: &CloudProfile) {
    println!("name:           {}", p.name);
    println!("endPointUrl:    {}", p.end_point_url);
    println!("identity:       {}", p.identity);
    println!("credential:     {}", mask(&p.credential));
    println!("project:        {}", p.project);
    println!("domain:         {}", p.domain);
    println!("zone:           {}", p.zone.as_deref().unwrap_or("-"));
    if p.is_unlimited() {
        println!("instanceCap:    unlimited");
    } else {
        println!("instanceCap:    {}", p.instance_cap);
    }
    println!("retentionTime:  {} min", p.retention_time);
    println!("scriptTimeout:  {} ms", p.script_timeout);
    println!("startTimeout:   {} ms", p.start_timeout);
    println!("floatingIpPool: {}", p.floating_ip_pool.as_deref().unwrap_or("-"));
    println!("floatingIps:    {}", p.floating_ips);
    println!("templates:      {}", p.templates.len());
}

fn print_template(t: &SlaveTemplate) {
    println!(
        "{}\tlabels=[{}] image={} flavor={} executors={} cap={}",
        t.name,
        t.labels,
        t.image_id,
        t.hardware_id,
        t.num_executors,
        if t.instance_cap == 0 {
            "unlimited".to_string()
        } else {
            t.instance_cap.to_string()
        }
    );
}

pub async fn run_cli(args: Args) -> Result<i32> {
    let path = match args.config {
        Some(path) => path,
        None => CloudConfig::default_path()?,
    };
    let store =
        load_store(&path).with_context(|| format!("loading clouds from {}", path.display()))?;
    let state = CliState {
        path,
        store,
        timeouts: ProbeTimeouts {
            total: Duration::from_secs(args.timeout_secs),
            ..ProbeTimeouts::default()
        },
    };

    match args.command {
        Command::TestConnection(c) => {
            let verdict = state
                .validator()?
                .validate(
                    c.region.as_deref(),
                    c.endpoint_url.as_deref(),
                    c.identity.as_deref(),
                    c.credential.as_deref(),
                    c.project.as_deref(),
                    c.domain.as_deref(),
                )
                .await;
            Ok(report(&verdict))
        }
        Command::Verify { name } => {
            let profile = state.cloud(&name)?;
            let verdict = state.validator()?.validate_profile(&profile).await;
            Ok(report(&verdict))
        }
        Command::List => {
            for p in state.store.list_all() {
                println!("{}\t{}\t{}", p.name, p.end_point_url, p.identity);
            }
            Ok(0)
        }
        Command::Show { name } => {
            print_profile(&state.cloud(&name)?);
            Ok(0)
        }
        Command::Add(add) => run_add(&state, add).await,
        Command::Remove { name } => {
            if !state.store.remove(&name) {
                bail!("no such cloud: '{name}'");
            }
            state.save()?;
            println!("Deleted cloud '{name}'");
            Ok(0)
        }
        Command::Template(cmd) => run_template(&state, cmd),
    }
}

async fn run_add(state: &CliState, add: AddArgs) -> Result<i32> {
    let replace = add.replace;
    let test_connection = add.test_connection;
    let name = add.name.trim().to_string();

    let templates = match state.store.get_by_name(&name) {
        Ok(existing) if replace => existing.templates,
        Ok(_) => bail!("a cloud named '{name}' already exists; pass --replace to overwrite it"),
        Err(_) => Vec::new(),
    };
    let profile = add.into_form().submit(templates)?;

    if test_connection {
        let verdict = state.validator()?.validate_profile(&profile).await;
        if !verdict.is_ok() {
            println!("{verdict}");
            println!("Not saved.");
            return Ok(EXIT_VERDICT_ERROR);
        }
        info!("Connection test for '{}' passed", profile.name);
    }

    if replace {
        state.store.add(profile)?;
    } else {
        state.store.create(profile)?;
    }
    state.save()?;
    println!("Saved cloud '{name}'");
    Ok(0)
}

fn run_template(state: &CliState, cmd: TemplateCommand) -> Result<i32> {
    match cmd {
        TemplateCommand::List { cloud } => {
            for t in &state.cloud(&cloud)?.templates {
                print_template(t);
            }
        }
        TemplateCommand::Add {
            cloud,
            name,
            labels,
            image_id,
            hardware_id,
            network_id,
            key_pair_name,
            num_executors,
            instance_cap,
        } => {
            let mut profile = state.cloud(&cloud)?;
            let template = SlaveTemplate {
                name,
                labels,
                image_id,
                hardware_id,
                network_id,
                key_pair_name,
                num_executors,
                instance_cap,
            };
            match profile.templates.iter_mut().find(|t| t.name == template.name) {
                Some(slot) => *slot = template,
                None => profile.templates.push(template),
            }
            state.store.add(profile)?;
            state.save()?;
        }
        TemplateCommand::Remove { cloud, name } => {
            let mut profile = state.cloud(&cloud)?;
            let before = profile.templates.len();
            profile.templates.retain(|t| t.name != name);
            if profile.templates.len() == before {
                bail!("cloud '{cloud}' has no template '{name}'");
            }
            state.store.add(profile)?;
            state.save()?;
        }
    }
    Ok(0)
}
