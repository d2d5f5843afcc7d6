use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use condo_console::{
    auth::{Capability, RouteGuard},
    config::{self, Settings},
    middleware,
    models::PaymentBreakdown,
    services::LoginOutcome,
    ConsoleContext,
};

/// Condominium console client
#[derive(Parser, Debug)]
#[command(name = "condo-console")]
#[command(version, about, long_about = None)]
struct Args {
    /// API base URL (also: CONDO_API_URL)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Session file path (also: CONDO_SESSION_FILE)
    #[arg(long, value_name = "PATH")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for a session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CONDO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check one capability for the signed-in role
    Can { capability: String },
    /// List every capability granted to the signed-in role
    Capabilities,
    /// List the console routes the signed-in role may open
    Routes,
    /// Show payments
    Payments {
        /// Every payment in the condominium
        #[arg(long, conflicts_with = "user")]
        all: bool,
        /// Breakdown of another resident
        #[arg(long, value_name = "ID")]
        user: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration first, CLI flags win over env
    let mut settings = Settings::new()?;
    if let Some(url) = &args.api_url {
        settings.api_base_url = config::normalize_base_url(url);
    }
    if let Some(path) = args.session_file {
        settings.session_file = path;
    }

    middleware::init_logging(&settings.log_level, &settings.log_format)?;
    tracing::debug!(api = %settings.api_base_url, "starting condo-console v{}", env!("CARGO_PKG_VERSION"));

    let ctx = ConsoleContext::new(settings).await?;

    match args.command {
        Command::Login { email, password } => match ctx.auth.login(&email, &password).await {
            LoginOutcome::Success(user) => {
                println!("Signed in as {} <{}> ({})", user.name, user.email, user.role);
            }
            LoginOutcome::Failure { kind, message } => {
                eprintln!("Login failed ({}): {}", kind, message);
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Logout => {
            ctx.auth.logout().await;
            println!("Signed out");
        }
        Command::Whoami => match ctx.session.session() {
            Some(session) => {
                let user = &session.profile;
                println!("{} <{}>", user.name, user.email);
                println!("id:      {}", user.id);
                println!("role:    {}", user.role);
                println!("expires: {}", session.expires_at);
            }
            None => {
                eprintln!("Not signed in");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Can { capability } => {
            if Capability::from_str(&capability).is_none() {
                eprintln!("Unknown capability: {}", capability);
                return Ok(ExitCode::FAILURE);
            }
            let allowed = ctx.permissions().check_named(&capability);
            println!("{}", allowed);
            if !allowed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Capabilities => {
            for capability in ctx.permissions().granted() {
                println!("{}", capability);
            }
        }
        Command::Routes => {
            let Some(role) = ctx.session.role() else {
                eprintln!("Not signed in, or role not recognised");
                return Ok(ExitCode::FAILURE);
            };
            for route in RouteGuard::allowed_routes(role) {
                println!("{}", route);
            }
        }
        Command::Payments { all, user } => {
            if all {
                let list = ctx.pagos.fetch_all().await?;
                for pago in &list.pagos {
                    println!(
                        "#{} {} ({}) {:.0} via {} on {}",
                        pago.id,
                        pago.usuario_nombre,
                        pago.vivienda,
                        pago.monto_pagado,
                        pago.metodo_pago,
                        pago.fecha_pago.as_deref().unwrap_or("-"),
                    );
                }
                println!("{} payments, total {:.0}", list.total, list.total_monto);
            } else {
                let breakdown = match user {
                    Some(id) => ctx.pagos.fetch_breakdown(id).await?,
                    None => ctx.pagos.fetch_own_breakdown().await?,
                };
                print_breakdown(&breakdown);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_breakdown(breakdown: &PaymentBreakdown) {
    println!("viviendas: {:?}", breakdown.viviendas);
    println!("cargo fijo: {} UF", breakdown.cargo_fijo_uf);
    for gasto in &breakdown.gastos_comunes {
        println!(
            "gasto comun {:02}/{} vivienda {}: {:.0} [{}]",
            gasto.mes,
            gasto.ano,
            gasto.vivienda_id,
            gasto.monto_total,
            gasto.estado.as_deref().unwrap_or("-"),
        );
    }
    for multa in &breakdown.multas {
        println!("multa vivienda {}: {:.0} {}", multa.vivienda_id, multa.monto, multa.descripcion);
    }
    for reserva in &breakdown.reservas {
        println!(
            "reserva #{}: {:.0} [{}]",
            reserva.id,
            reserva.monto_pago,
            reserva.estado_pago.as_deref().unwrap_or("-"),
        );
    }
    println!("total: {:.0}", breakdown.total_due());
}
