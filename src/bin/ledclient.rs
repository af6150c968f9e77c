//! Command line access to the led server: send effects directly, or save them to redis and trigger
//! them later by id.

use clap::Parser;
use std::io;

use ledclient::codec::{registry::REGISTRY, text};
use ledclient::config::Configuration;
use ledclient::store::{RedisStore, Repository};
use ledclient::{Controller, Effect};

#[derive(clap::Subcommand)]
enum CliCommand {
  /// Lists the known effects with their fields and defaults.
  Effects,

  /// Sends an effect built from its defaults and `field=value` overrides.
  Send {
    name: String,

    #[arg(short = 's', long = "set")]
    fields: Vec<String>,
  },

  /// Saves an effect built from its defaults and `field=value` overrides, printing its id.
  Save {
    name: String,

    #[arg(short = 's', long = "set")]
    fields: Vec<String>,
  },

  /// Lists saved effects.
  List,

  /// Prints a saved effect and its json.
  Show { id: u64 },

  /// Deletes a saved effect.
  Delete { id: u64 },

  /// Sends a saved effect.
  Trigger { id: u64 },
}

#[derive(clap::Parser)]
#[command(author, version = option_env!("LEDCLIENT_VERSION").unwrap_or("dev"), about, long_about = None)]
struct CommandLineOptions {
  #[arg(short = 'c', long)]
  config: String,

  /// Overrides `controller.server_url` from the config file.
  #[arg(long)]
  server: Option<String>,

  #[command(subcommand)]
  command: CliCommand,
}

fn build(name: &str, fields: &[String]) -> io::Result<Effect> {
  let pairs = fields
    .iter()
    .map(|field| {
      text::split_pair(field).ok_or_else(|| {
        io::Error::new(
          io::ErrorKind::InvalidInput,
          format!("expected 'field=value', got '{field}'"),
        )
      })
    })
    .collect::<io::Result<Vec<(&str, &str)>>>()?;

  Ok(text::assemble(name, pairs)?)
}

fn repository(config: &Configuration) -> io::Result<Repository<RedisStore>> {
  let redis = config.redis.clone().ok_or_else(|| {
    log::warn!("persistence requested without a [redis] config section");
    io::Error::new(io::ErrorKind::NotFound, "missing redis configuration")
  })?;

  Ok(Repository::new(RedisStore::new(redis)))
}

async fn run(args: CommandLineOptions, config: Configuration) -> io::Result<()> {
  let controller = match args.server {
    Some(server_url) => Controller::new(server_url),
    None => Controller::from(config.controller.clone()),
  };

  match args.command {
    CliCommand::Effects => {
      for entry in REGISTRY.entries() {
        let defaults = entry.default_effect().encode()?;
        let fields = entry
          .fields()
          .iter()
          .map(|field| {
            let default = defaults.get(field.name).map(|value| value.to_string()).unwrap_or_default();
            let role = if field.is_color() {
              "color".to_string()
            } else {
              field.kind.to_string()
            };
            format!("{}: {role} = {default}", field.name)
          })
          .collect::<Vec<String>>();
        println!("{} ({})", entry.name(), fields.join(", "));
      }
    }

    CliCommand::Send { name, fields } => {
      let effect = build(&name, &fields)?;
      controller.send(&effect).await?;
      println!("sent {effect}");
    }

    CliCommand::Save { name, fields } => {
      let effect = build(&name, &fields)?;
      let id = repository(&config)?.insert(&effect).await?;
      println!("{id}");
    }

    CliCommand::List => {
      for (id, effect) in repository(&config)?.all().await? {
        println!("{id}\t{effect}");
      }
    }

    CliCommand::Show { id } => {
      let effect = repository(&config)?.get(id).await?;
      println!("{effect}\n{} {}", effect.name(), effect.to_json_string()?);
    }

    CliCommand::Delete { id } => {
      repository(&config)?.delete(id).await?;
      log::info!("deleted stored effect {id}");
    }

    CliCommand::Trigger { id } => {
      let effect = repository(&config)?.get(id).await?;
      controller.send(&effect).await?;
      println!("sent {effect}");
    }
  }

  Ok(())
}

fn main() -> io::Result<()> {
  if dotenv::dotenv().is_err() {
    eprintln!("warning: no '.env' file detected'");
  }

  env_logger::init();
  let args = CommandLineOptions::parse();

  async_std::task::block_on(async {
    let config = Configuration::load(&args.config).await?;
    run(args, config).await
  })
}
