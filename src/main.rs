//! jellypot entry point.
//!
//! Invoked either by hand (`register`, `unregister`) or by the shell as the
//! `jellypot://` protocol handler with the link as the only argument.

#[cfg(windows)]
#[tokio::main]
async fn main() {
  use clap::Parser;

  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("jellypot=info"))
    .init();

  let args = jellypot::cli::Cli::parse();
  if let Err(error) = dispatch(args).await {
    log::error!("{:#}", error);
    // The console was opened just for this handler; give the user a chance
    // to read the failure before it closes.
    wait_for_enter();
    std::process::exit(1);
  }
}

#[cfg(windows)]
async fn dispatch(args: jellypot::cli::Cli) -> anyhow::Result<()> {
  use clap::CommandFactory;
  use jellypot::cli::{parse_item_id, Cli, Command};
  use jellypot::registry;

  match (args.command, args.url) {
    (Some(Command::Register), _) => registry::register_protocol()?,
    (Some(Command::Unregister), _) => registry::unregister_protocol()?,
    (None, Some(url)) => {
      let item_id = parse_item_id(&url)?;
      jellypot::app::run(&item_id).await?;
    }
    (None, None) => {
      Cli::command().print_help()?;
    }
  }
  Ok(())
}

#[cfg(windows)]
fn wait_for_enter() {
  use std::io::Write;

  print!("Press Enter to exit...");
  let _ = std::io::stdout().flush();
  let mut line = String::new();
  let _ = std::io::stdin().read_line(&mut line);
}

#[cfg(not(windows))]
fn main() {
  eprintln!("jellypot is Windows-only; it drives PotPlayer through window messages.");
  std::process::exit(1);
}
