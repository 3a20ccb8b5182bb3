use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::info;
use vxagent::config::{self, AgentConfig};
use vxagent::dataplane::{DataplaneConfigBuilder, DataplaneDriver, FileDriver};
use vxagent::endpoint::select_endpoint;
use vxagent::host::{HostNetworkInspector, LinuxHost};
use vxagent::telemetry::init_logging;

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG: &str = "vxagent.toml";

#[derive(Parser)]
#[command(name = "vxagent")]
#[command(about = "Tunnel endpoint agent for a userspace dataplane")]
struct Cli {
    /// Path to vxagent.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dataplane configuration from host state
    Init {
        /// Tunnel IP to use instead of probing the host
        #[arg(long)]
        tunnel_ip: Option<IpAddr>,

        /// Output path for the dataplane configuration (`-` for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show host network state
    Inspect {
        #[command(subcommand)]
        target: InspectTarget,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum InspectTarget {
    /// Interfaces and their addresses
    Interfaces,
    /// Neighbor table entries for one interface
    Neighbors {
        #[arg(short, long)]
        interface: String,
    },
    /// Default routes
    Routes,
    /// Selected tunnel endpoint
    Endpoint {
        #[arg(long)]
        tunnel_ip: Option<IpAddr>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate the effective configuration
    Validate,
    /// Print the effective configuration
    Show,
}

fn main() {
    let cli = Cli::parse();

    let cfg = match load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_logging(None);
            eprintln!("[ERROR] {}", e);
            std::process::exit(1);
        }
    };
    init_logging(Some(&cfg.log));

    let result = match cli.command {
        Commands::Init { tunnel_ip, output } => cmd_init(cfg, tunnel_ip, output),
        Commands::Inspect { target } => cmd_inspect(&cfg, target),
        Commands::Config { action } => match action {
            ConfigAction::Validate => cmd_config_validate(&cfg),
            ConfigAction::Show => cmd_config_show(&cfg),
        },
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

/// Defaults, then the config file, then `NSM_*` variables
fn load_config(path: Option<&Path>) -> Result<AgentConfig, String> {
    let mut cfg = match path {
        Some(path) => config::load(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?,
        None if Path::new(DEFAULT_CONFIG).exists() => config::load(DEFAULT_CONFIG)
            .map_err(|e| format!("Failed to load {}: {}", DEFAULT_CONFIG, e))?,
        None => AgentConfig::default(),
    };
    cfg.apply_process_env().map_err(|e| e.to_string())?;
    Ok(cfg)
}

fn cmd_init(
    mut cfg: AgentConfig,
    tunnel_ip: Option<IpAddr>,
    output: Option<PathBuf>,
) -> Result<(), String> {
    if tunnel_ip.is_some() {
        cfg.tunnel_ip = tunnel_ip;
    }
    if let Some(output) = output {
        cfg.output = output;
    }

    let result = config::validate(&cfg);
    result.print_diagnostics();
    if result.has_errors() {
        return Err("Configuration has errors".to_string());
    }

    info!("{} building dataplane configuration...", cfg.name);
    let host = LinuxHost::new(cfg.host.clone());
    let dataplane = DataplaneConfigBuilder::new(&host)
        .tunnel_ip(cfg.tunnel_ip)
        .build()
        .map_err(|e| format!("Failed to build dataplane config: {}", e))?;

    let mut driver = FileDriver::new(&cfg.output, &cfg.name);
    driver
        .apply(dataplane)
        .map_err(|e| format!("Failed to hand off dataplane config: {}", e))
}

fn cmd_inspect(cfg: &AgentConfig, target: InspectTarget) -> Result<(), String> {
    let host = LinuxHost::new(cfg.host.clone());

    match target {
        InspectTarget::Interfaces => {
            for iface in host.interfaces().map_err(|e| e.to_string())? {
                let mac = iface
                    .hardware_addr
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{} {}", iface.name, mac);
                for net in &iface.networks {
                    println!("    {}", net);
                }
            }
        }
        InspectTarget::Neighbors { interface } => {
            for entry in host.neighbors_on(&interface).map_err(|e| e.to_string())? {
                println!("{} {} {}", entry.ip, entry.hardware_addr, entry.interface);
            }
        }
        InspectTarget::Routes => {
            let routes = host.default_routes().map_err(|e| e.to_string())?;
            if routes.is_empty() {
                println!("no default routes");
            }
            for route in routes {
                println!(
                    "{} via {} dev {}",
                    route.destination(),
                    route.gateway,
                    route.interface
                );
            }
        }
        InspectTarget::Endpoint { tunnel_ip } => {
            let endpoint = select_endpoint(&host, tunnel_ip.or(cfg.tunnel_ip))
                .map_err(|e| e.to_string())?;
            println!("{} dev {}", endpoint.ip, endpoint.interface.name);
        }
    }
    Ok(())
}

fn cmd_config_validate(cfg: &AgentConfig) -> Result<(), String> {
    let result = config::validate(cfg);
    result.print_diagnostics();

    if result.has_errors() {
        return Err("Configuration has errors".to_string());
    }

    println!("Configuration is valid.");
    Ok(())
}

fn cmd_config_show(cfg: &AgentConfig) -> Result<(), String> {
    let text = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    print!("{}", text);
    Ok(())
}
